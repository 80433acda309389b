// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Aggregations over a snapshot of one user's transactions.
//!
//! Nothing here talks to a store: callers fetch the snapshot (already scoped
//! to an owner and, where relevant, a period) and hand it in. Every function
//! returns a value for any input; malformed amounts count as zero, and an
//! amount that would overflow a total is left out of that total.

use crate::models::{
    Category, DEFAULT_CATEGORY_COLOR, DEFAULT_CATEGORY_ICON, Transaction, TransactionType,
};
use rust_decimal::Decimal;
use serde::{Serialize, Serializer};
use std::collections::HashMap;
use std::fmt;

pub const UNCATEGORIZED_NAME: &str = "Sem categoria";

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Summary {
    pub total_income: Decimal,
    pub total_expense: Decimal,
    pub balance: Decimal,
    pub transaction_count: usize,
    pub income_count: usize,
    pub expense_count: usize,
}

/// Grouping key for the category breakdown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CategoryKey {
    Category(i64),
    Uncategorized,
}

impl From<Option<i64>> for CategoryKey {
    fn from(id: Option<i64>) -> Self {
        id.map_or(CategoryKey::Uncategorized, CategoryKey::Category)
    }
}

impl fmt::Display for CategoryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CategoryKey::Category(id) => write!(f, "{}", id),
            CategoryKey::Uncategorized => f.write_str("uncategorized"),
        }
    }
}

impl Serialize for CategoryKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryTotal {
    pub category_id: CategoryKey,
    pub category_name: String,
    pub category_icon: String,
    pub category_color: String,
    pub total: Decimal,
    pub count: usize,
}

impl CategoryTotal {
    /// Percentage of `grand_total` this group accounts for, rounded to 0 dp.
    /// Zero when `grand_total` is zero or the ratio does not fit a `Decimal`.
    pub fn share_of(&self, grand_total: Decimal) -> Decimal {
        if grand_total.is_zero() {
            return Decimal::ZERO;
        }
        match self
            .total
            .checked_div(grand_total)
            .and_then(|r| r.checked_mul(Decimal::ONE_HUNDRED))
        {
            Some(pct) => pct.round_dp(0),
            None => {
                tracing::warn!(total = %self.total, %grand_total, "category share out of range");
                Decimal::ZERO
            }
        }
    }
}

/// Explicit join table from category id to its display data.
#[derive(Debug, Clone, Default)]
pub struct CategoryIndex {
    by_id: HashMap<i64, Category>,
}

impl CategoryIndex {
    pub fn new(categories: &[Category]) -> Self {
        let by_id = categories.iter().map(|c| (c.id, c.clone())).collect();
        Self { by_id }
    }

    pub fn get(&self, id: Option<i64>) -> Option<&Category> {
        id.and_then(|id| self.by_id.get(&id))
    }

    pub fn len(&self) -> usize {
        self.by_id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_id.is_empty()
    }
}

/// Parse a stored amount, plain or scientific notation.
pub fn try_parse_amount(raw: &str) -> Option<Decimal> {
    let raw = raw.trim();
    raw.parse::<Decimal>()
        .or_else(|_| Decimal::from_scientific(raw))
        .ok()
}

/// Parse a stored amount, treating anything unparseable as zero.
pub fn parse_amount(raw: &str) -> Decimal {
    try_parse_amount(raw).unwrap_or_else(|| {
        tracing::warn!(amount = raw, "unparseable amount counted as zero");
        Decimal::ZERO
    })
}

/// Add `amount` to a running total. An amount that would overflow the total
/// is left out of it.
fn accumulate(total: Decimal, amount: Decimal) -> Decimal {
    total.checked_add(amount).unwrap_or_else(|| {
        tracing::warn!(%total, %amount, "amount overflows running total, left out");
        total
    })
}

pub fn summarize(transactions: &[Transaction]) -> Summary {
    let mut summary = Summary {
        transaction_count: transactions.len(),
        ..Summary::default()
    };
    for t in transactions {
        let amount = parse_amount(&t.amount);
        match t.r#type {
            TransactionType::Income => {
                summary.total_income = accumulate(summary.total_income, amount);
                summary.income_count += 1;
            }
            TransactionType::Expense => {
                summary.total_expense = accumulate(summary.total_expense, amount);
                summary.expense_count += 1;
            }
        }
    }
    summary.balance = summary
        .total_income
        .checked_sub(summary.total_expense)
        .unwrap_or_else(|| {
            tracing::warn!("balance out of range, saturated");
            if summary.total_income > summary.total_expense {
                Decimal::MAX
            } else {
                Decimal::MIN
            }
        });
    summary
}

/// Group `transactions` by category, largest total first.
///
/// The input is expected to hold expenses only; no type filtering happens
/// here. Groups with equal totals keep the order in which they were first
/// seen.
pub fn expenses_by_category(
    transactions: &[Transaction],
    categories: &CategoryIndex,
) -> Vec<CategoryTotal> {
    let mut groups: Vec<CategoryTotal> = Vec::new();
    let mut slot: HashMap<CategoryKey, usize> = HashMap::new();

    for t in transactions {
        let key = CategoryKey::from(t.category_id);
        let idx = *slot.entry(key).or_insert_with(|| {
            let (name, icon, color) = match categories.get(t.category_id) {
                Some(c) => (c.name.clone(), c.icon.clone(), c.color.clone()),
                None => (
                    UNCATEGORIZED_NAME.to_string(),
                    DEFAULT_CATEGORY_ICON.to_string(),
                    DEFAULT_CATEGORY_COLOR.to_string(),
                ),
            };
            groups.push(CategoryTotal {
                category_id: key,
                category_name: name,
                category_icon: icon,
                category_color: color,
                total: Decimal::ZERO,
                count: 0,
            });
            groups.len() - 1
        });
        let group = &mut groups[idx];
        group.total = accumulate(group.total, parse_amount(&t.amount));
        group.count += 1;
    }

    // sort_by is stable
    groups.sort_by(|a, b| b.total.cmp(&a.total));
    groups
}

pub fn grand_total(groups: &[CategoryTotal]) -> Decimal {
    groups
        .iter()
        .fold(Decimal::ZERO, |acc, g| accumulate(acc, g.total))
}

/// The expense with the highest amount; equal amounts go to the lowest id.
pub fn largest_expense(transactions: &[Transaction]) -> Option<&Transaction> {
    transactions
        .iter()
        .map(|t| (parse_amount(&t.amount), t))
        .max_by(|(a, ta), (b, tb)| a.cmp(b).then_with(|| tb.id.cmp(&ta.id)))
        .map(|(_, t)| t)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_amount_accepts_plain_and_scientific() {
        assert_eq!(parse_amount("12.50"), Decimal::new(1250, 2));
        assert_eq!(parse_amount(" 7 "), Decimal::new(7, 0));
        assert_eq!(parse_amount("1e2"), Decimal::new(100, 0));
    }

    #[test]
    fn parse_amount_falls_back_to_zero() {
        assert_eq!(parse_amount("twelve"), Decimal::ZERO);
        assert_eq!(parse_amount(""), Decimal::ZERO);
    }

    #[test]
    fn share_of_zero_total_is_zero() {
        let g = CategoryTotal {
            category_id: CategoryKey::Uncategorized,
            category_name: UNCATEGORIZED_NAME.into(),
            category_icon: DEFAULT_CATEGORY_ICON.into(),
            category_color: DEFAULT_CATEGORY_COLOR.into(),
            total: Decimal::new(10, 0),
            count: 1,
        };
        assert_eq!(g.share_of(Decimal::ZERO), Decimal::ZERO);
        assert_eq!(g.share_of(Decimal::new(40, 0)), Decimal::new(25, 0));
    }

    #[test]
    fn category_key_renders_sentinel() {
        assert_eq!(CategoryKey::from(None).to_string(), "uncategorized");
        assert_eq!(CategoryKey::from(Some(4)).to_string(), "4");
    }
}
