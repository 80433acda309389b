// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use super::App;
use crate::engine::CategoryIndex;
use crate::store::TransactionFilter;
use crate::utils::date_bounds;
use anyhow::{Result, bail};
use serde_json::json;

pub fn handle(app: &App, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("transactions", sub)) => export_transactions(app, sub),
        _ => Ok(()),
    }
}

fn export_transactions(app: &App, sub: &clap::ArgMatches) -> Result<()> {
    let fmt = sub.get_one::<String>("format").unwrap().trim().to_lowercase();
    let out = sub.get_one::<String>("out").unwrap();
    if fmt != "csv" && fmt != "json" {
        bail!("Unknown format: {} (use csv|json)", fmt);
    }

    let (start, end) = date_bounds(sub)?;
    let filter = TransactionFilter::default().between(start, end);
    let mut data = app.store.fetch_transactions(app.owner(), &filter)?;
    // oldest first in files
    data.reverse();
    let index = CategoryIndex::new(&app.store.fetch_categories(app.owner())?);
    let category = |id: Option<i64>| index.get(id).map(|c| c.name.clone()).unwrap_or_default();

    match fmt.as_str() {
        "csv" => {
            let mut wtr = csv::Writer::from_path(out)?;
            wtr.write_record([
                "id", "date", "type", "amount", "category", "description", "notes", "attachment",
            ])?;
            for t in &data {
                wtr.write_record([
                    t.id.to_string(),
                    t.date.to_string(),
                    t.r#type.to_string(),
                    t.amount.clone(),
                    category(t.category_id),
                    t.description.clone(),
                    t.notes.clone(),
                    t.attachment
                        .as_ref()
                        .map(|a| a.url.clone())
                        .unwrap_or_default(),
                ])?;
            }
            wtr.flush()?;
        }
        _ => {
            let items: Vec<serde_json::Value> = data
                .iter()
                .map(|t| {
                    json!({
                        "id": t.id,
                        "date": t.date.to_string(),
                        "type": t.r#type,
                        "amount": t.amount,
                        "category": index.get(t.category_id).map(|c| c.name.as_str()),
                        "description": t.description,
                        "notes": t.notes,
                        "attachment": t.attachment,
                    })
                })
                .collect();
            std::fs::write(out, serde_json::to_string_pretty(&items)?)?;
        }
    }
    tracing::info!(count = data.len(), %out, "transactions exported");
    println!("Exported {} transactions to {}", data.len(), out);
    Ok(())
}
