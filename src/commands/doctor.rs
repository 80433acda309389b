// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use super::App;
use crate::engine::{CategoryIndex, try_parse_amount};
use crate::store::TransactionFilter;
use crate::utils::pretty_table;
use anyhow::Result;
use rust_decimal::Decimal;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Issue {
    pub kind: &'static str,
    pub detail: String,
}

pub fn handle(app: &App) -> Result<()> {
    let issues = find_issues(app)?;
    if issues.is_empty() {
        println!("✅ doctor: no issues found");
    } else {
        let rows = issues
            .into_iter()
            .map(|i| vec![i.kind.to_string(), i.detail])
            .collect();
        println!("{}", pretty_table(&["Issue", "Detail"], rows));
    }
    Ok(())
}

pub fn find_issues(app: &App) -> Result<Vec<Issue>> {
    let transactions = app
        .store
        .fetch_transactions(app.owner(), &TransactionFilter::default())?;
    let index = CategoryIndex::new(&app.store.fetch_categories(app.owner())?);
    let mut issues = Vec::new();

    for t in &transactions {
        // 1) Amounts the aggregations would silently count as zero
        match try_parse_amount(&t.amount) {
            Some(d) if d < Decimal::ZERO => issues.push(Issue {
                kind: "negative_amount",
                detail: format!("tx {} on {}: {}", t.id, t.date, t.amount),
            }),
            Some(_) => {}
            None => issues.push(Issue {
                kind: "malformed_amount",
                detail: format!("tx {} on {}: '{}'", t.id, t.date, t.amount),
            }),
        }

        // 2) Category references that no longer resolve or do not fit the type
        if let Some(cid) = t.category_id {
            match index.get(Some(cid)) {
                None => issues.push(Issue {
                    kind: "missing_category",
                    detail: format!("tx {} references category {}", t.id, cid),
                }),
                Some(c) if !c.r#type.accepts(t.r#type) => issues.push(Issue {
                    kind: "category_type_mismatch",
                    detail: format!(
                        "tx {} is {} but '{}' is for {}",
                        t.id, t.r#type, c.name, c.r#type
                    ),
                }),
                Some(_) => {}
            }
        }
    }
    Ok(issues)
}
