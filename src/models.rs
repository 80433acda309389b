// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

pub const DEFAULT_CATEGORY_ICON: &str = "📁";
pub const DEFAULT_CATEGORY_COLOR: &str = "#6366F1";

#[derive(Debug, Error, PartialEq, Eq)]
#[error("Unknown {kind} '{value}'")]
pub struct UnknownVariant {
    pub kind: &'static str,
    pub value: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionType {
    Income,
    Expense,
}

impl TransactionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionType::Income => "income",
            TransactionType::Expense => "expense",
        }
    }
}

impl fmt::Display for TransactionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TransactionType {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "income" => Ok(TransactionType::Income),
            "expense" => Ok(TransactionType::Expense),
            other => Err(UnknownVariant {
                kind: "transaction type",
                value: other.to_string(),
            }),
        }
    }
}

/// Which transaction types a category may be attached to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CategoryType {
    Income,
    Expense,
    Both,
}

impl CategoryType {
    pub fn as_str(&self) -> &'static str {
        match self {
            CategoryType::Income => "income",
            CategoryType::Expense => "expense",
            CategoryType::Both => "both",
        }
    }

    pub fn accepts(&self, kind: TransactionType) -> bool {
        matches!(
            (self, kind),
            (CategoryType::Both, _)
                | (CategoryType::Income, TransactionType::Income)
                | (CategoryType::Expense, TransactionType::Expense)
        )
    }
}

impl fmt::Display for CategoryType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CategoryType {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "income" => Ok(CategoryType::Income),
            "expense" => Ok(CategoryType::Expense),
            "both" => Ok(CategoryType::Both),
            other => Err(UnknownVariant {
                kind: "category type",
                value: other.to_string(),
            }),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Category {
    pub id: i64,
    pub owner_id: String,
    pub name: String,
    pub icon: String,
    pub color: String,
    pub r#type: CategoryType,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Attachment {
    pub url: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: i64,
    pub owner_id: String,
    pub r#type: TransactionType,
    /// Amount exactly as the store returned it; parsed at aggregation time.
    pub amount: String,
    pub category_id: Option<i64>,
    pub description: String,
    pub date: NaiveDate,
    pub attachment: Option<Attachment>,
    pub notes: String,
}

impl Transaction {
    pub fn is_expense(&self) -> bool {
        self.r#type == TransactionType::Expense
    }
}

/// Field values for creating or fully replacing a transaction.
#[derive(Debug, Clone, PartialEq)]
pub struct TransactionDraft {
    pub r#type: TransactionType,
    pub amount: Decimal,
    pub category_id: Option<i64>,
    pub description: String,
    pub date: NaiveDate,
    pub attachment: Option<Attachment>,
    pub notes: String,
}

impl TransactionDraft {
    pub fn new(r#type: TransactionType, amount: Decimal, date: NaiveDate) -> Self {
        Self {
            r#type,
            amount,
            category_id: None,
            description: String::new(),
            date,
            attachment: None,
            notes: String::new(),
        }
    }

    pub fn with_category(mut self, category_id: Option<i64>) -> Self {
        self.category_id = category_id;
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = notes.into();
        self
    }

    pub fn with_attachment(mut self, attachment: Option<Attachment>) -> Self {
        self.attachment = attachment;
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CategoryDraft {
    pub name: String,
    pub icon: Option<String>,
    pub color: Option<String>,
    pub r#type: Option<CategoryType>,
}

impl CategoryDraft {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            icon: None,
            color: None,
            r#type: None,
        }
    }

    pub fn icon(&self) -> &str {
        self.icon.as_deref().unwrap_or(DEFAULT_CATEGORY_ICON)
    }

    pub fn color(&self) -> &str {
        self.color.as_deref().unwrap_or(DEFAULT_CATEGORY_COLOR)
    }

    pub fn kind(&self) -> CategoryType {
        self.r#type.unwrap_or(CategoryType::Both)
    }
}

/// Partial update; `None` leaves the stored value alone.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CategoryChanges {
    pub name: Option<String>,
    pub icon: Option<String>,
    pub color: Option<String>,
    pub r#type: Option<CategoryType>,
}

impl CategoryChanges {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.icon.is_none() && self.color.is_none() && self.r#type.is_none()
    }
}

/// The user every store call is scoped to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub user_id: String,
}

impl Session {
    pub fn new(user_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
        }
    }

    pub fn owner(&self) -> &str {
        &self.user_id
    }
}

/// Stock categories seeded for a new user.
pub fn default_categories() -> Vec<CategoryDraft> {
    const EXPENSE: [(&str, &str, &str); 8] = [
        ("Alimentação", "🍔", "#F59E0B"),
        ("Transporte", "🚗", "#3B82F6"),
        ("Moradia", "🏠", "#8B5CF6"),
        ("Saúde", "⚕️", "#EF4444"),
        ("Educação", "📚", "#10B981"),
        ("Lazer", "🎮", "#EC4899"),
        ("Compras", "🛍️", "#F97316"),
        ("Contas", "📄", "#6366F1"),
    ];
    const INCOME: [(&str, &str, &str); 4] = [
        ("Salário", "💰", "#10B981"),
        ("Freelance", "💼", "#3B82F6"),
        ("Investimentos", "📈", "#8B5CF6"),
        ("Outros", "💵", "#6366F1"),
    ];

    fn seed(kind: CategoryType, rows: &[(&str, &str, &str)]) -> Vec<CategoryDraft> {
        rows.iter()
            .map(|(name, icon, color)| CategoryDraft {
                name: name.to_string(),
                icon: Some(icon.to_string()),
                color: Some(color.to_string()),
                r#type: Some(kind),
            })
            .collect()
    }

    let mut drafts = seed(CategoryType::Expense, &EXPENSE);
    drafts.extend(seed(CategoryType::Income, &INCOME));
    drafts
}
