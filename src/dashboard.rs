// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Period views: fetch a snapshot through the store, then aggregate it.

use crate::engine::{self, CategoryIndex, CategoryTotal, Summary};
use crate::error::StoreResult;
use crate::models::{Session, Transaction, TransactionType};
use crate::period::Period;
use crate::store::{Store, TransactionFilter};
use rust_decimal::Decimal;
use serde::Serialize;

pub const RECENT_LIMIT: usize = 5;
pub const TOP_CATEGORIES: usize = 5;

pub fn financial_summary(
    store: &dyn Store,
    session: &Session,
    period: &Period,
) -> StoreResult<Summary> {
    let snapshot =
        store.fetch_transactions(session.owner(), &TransactionFilter::default().within(period))?;
    Ok(engine::summarize(&snapshot))
}

pub fn expenses_by_category(
    store: &dyn Store,
    session: &Session,
    period: &Period,
) -> StoreResult<Vec<CategoryTotal>> {
    let expenses = store.fetch_transactions(
        session.owner(),
        &TransactionFilter::default()
            .of_type(TransactionType::Expense)
            .within(period),
    )?;
    let index = CategoryIndex::new(&store.fetch_categories(session.owner())?);
    Ok(engine::expenses_by_category(&expenses, &index))
}

pub fn largest_expense(
    store: &dyn Store,
    session: &Session,
    period: &Period,
) -> StoreResult<Option<Transaction>> {
    let expenses = store.fetch_transactions(
        session.owner(),
        &TransactionFilter::default()
            .of_type(TransactionType::Expense)
            .within(period),
    )?;
    Ok(engine::largest_expense(&expenses).cloned())
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Dashboard {
    pub period: Period,
    pub summary: Summary,
    pub recent: Vec<Transaction>,
    pub top_categories: Vec<CategoryTotal>,
    /// Sum over every expense group, not only the ones shown.
    pub expense_total: Decimal,
    pub largest_expense: Option<Transaction>,
}

impl Dashboard {
    pub fn empty(period: Period) -> Self {
        Self {
            period,
            summary: Summary::default(),
            recent: Vec::new(),
            top_categories: Vec::new(),
            expense_total: Decimal::ZERO,
            largest_expense: None,
        }
    }
}

/// Everything the dashboard shows, derived from one snapshot of the period.
pub fn load_dashboard(
    store: &dyn Store,
    session: &Session,
    period: Period,
) -> StoreResult<Dashboard> {
    let snapshot =
        store.fetch_transactions(session.owner(), &TransactionFilter::default().within(&period))?;
    let index = CategoryIndex::new(&store.fetch_categories(session.owner())?);
    tracing::debug!(
        owner = session.owner(),
        %period,
        transactions = snapshot.len(),
        categories = index.len(),
        "dashboard snapshot loaded"
    );

    let expenses: Vec<Transaction> = snapshot.iter().filter(|t| t.is_expense()).cloned().collect();
    let mut groups = engine::expenses_by_category(&expenses, &index);
    let expense_total = engine::grand_total(&groups);
    groups.truncate(TOP_CATEGORIES);

    Ok(Dashboard {
        period,
        summary: engine::summarize(&snapshot),
        largest_expense: engine::largest_expense(&expenses).cloned(),
        recent: snapshot.into_iter().take(RECENT_LIMIT).collect(),
        top_categories: groups,
        expense_total,
    })
}
