// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use super::App;
use super::reports::{category_rows, summary_rows};
use crate::dashboard::{Dashboard, load_dashboard};
use crate::engine::parse_amount;
use crate::period::Period;
use crate::utils::{fmt_money, maybe_print_json, pretty_table};
use anyhow::{Context, Result};

pub fn handle(app: &App, m: &clap::ArgMatches) -> Result<()> {
    let period = match m.get_one::<String>("month") {
        Some(month) => Period::parse_month(month)?,
        None => Period::current(),
    };
    match load_dashboard(app.store, &app.session, period) {
        Ok(d) => render(app, m, &d),
        Err(err) => {
            tracing::error!(%err, owner = app.owner(), "dashboard reads failed");
            render(app, m, &Dashboard::empty(period))?;
            Err(err).context("Failed to load dashboard data")
        }
    }
}

fn render(app: &App, m: &clap::ArgMatches, d: &Dashboard) -> Result<()> {
    if maybe_print_json(m.get_flag("json"), m.get_flag("jsonl"), d)? {
        return Ok(());
    }
    let ccy = app.currency.as_str();
    println!("{}", d.period);
    println!("{}", pretty_table(&["", "Value"], summary_rows(&d.summary, ccy)));

    if d.top_categories.is_empty() {
        println!("No expenses recorded in this period");
    } else {
        println!(
            "{}",
            pretty_table(
                &["Category", "Spent", "Entries", "Share"],
                category_rows(&d.top_categories, d.expense_total, ccy),
            )
        );
    }

    if let Some(t) = &d.largest_expense {
        println!(
            "Largest expense: {} on {} {}",
            fmt_money(&parse_amount(&t.amount), ccy),
            t.date,
            t.description
        );
    }

    if !d.recent.is_empty() {
        let rows: Vec<Vec<String>> = d
            .recent
            .iter()
            .map(|t| {
                vec![
                    t.date.to_string(),
                    t.r#type.to_string(),
                    fmt_money(&parse_amount(&t.amount), ccy),
                    t.description.clone(),
                ]
            })
            .collect();
        println!(
            "{}",
            pretty_table(&["Date", "Type", "Amount", "Description"], rows)
        );
    }
    Ok(())
}
