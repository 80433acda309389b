// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use super::App;
use crate::dashboard;
use crate::engine::{self, CategoryTotal, Summary};
use crate::period::Period;
use crate::utils::{fmt_money, maybe_print_json, period_arg, pretty_table};
use anyhow::Result;
use rust_decimal::Decimal;

pub fn handle(app: &App, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("summary", sub)) => summary(app, sub)?,
        Some(("categories", sub)) => categories(app, sub)?,
        Some(("largest", sub)) => largest(app, sub)?,
        _ => {}
    }
    Ok(())
}

fn period_or_current(sub: &clap::ArgMatches) -> Result<Period> {
    Ok(period_arg(sub)?.unwrap_or_else(Period::current))
}

pub fn summary_rows(summary: &Summary, ccy: &str) -> Vec<Vec<String>> {
    vec![
        vec!["Income".into(), fmt_money(&summary.total_income, ccy)],
        vec!["Expense".into(), fmt_money(&summary.total_expense, ccy)],
        vec!["Balance".into(), fmt_money(&summary.balance, ccy)],
        vec!["Transactions".into(), summary.transaction_count.to_string()],
        vec!["Income entries".into(), summary.income_count.to_string()],
        vec!["Expense entries".into(), summary.expense_count.to_string()],
    ]
}

fn summary(app: &App, sub: &clap::ArgMatches) -> Result<()> {
    let period = period_or_current(sub)?;
    let s = dashboard::financial_summary(app.store, &app.session, &period)?;
    if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &s)? {
        println!("{}", period);
        println!("{}", pretty_table(&["", "Value"], summary_rows(&s, &app.currency)));
    }
    Ok(())
}

pub fn category_rows(
    groups: &[CategoryTotal],
    grand_total: Decimal,
    ccy: &str,
) -> Vec<Vec<String>> {
    groups
        .iter()
        .map(|g| {
            vec![
                format!("{} {}", g.category_icon, g.category_name),
                fmt_money(&g.total, ccy),
                g.count.to_string(),
                format!("{}%", g.share_of(grand_total)),
            ]
        })
        .collect()
}

/// Expense breakdown for the period; `--top` limits the rows shown, shares
/// stay relative to every expense in the period.
pub fn category_report(
    app: &App,
    sub: &clap::ArgMatches,
) -> Result<(Vec<CategoryTotal>, Decimal)> {
    let period = period_or_current(sub)?;
    let mut groups = dashboard::expenses_by_category(app.store, &app.session, &period)?;
    let grand_total = engine::grand_total(&groups);
    if let Some(top) = sub.get_one::<usize>("top") {
        groups.truncate(*top);
    }
    Ok((groups, grand_total))
}

fn categories(app: &App, sub: &clap::ArgMatches) -> Result<()> {
    let (groups, grand_total) = category_report(app, sub)?;
    if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &groups)? {
        println!(
            "{}",
            pretty_table(
                &["Category", "Spent", "Entries", "Share"],
                category_rows(&groups, grand_total, &app.currency),
            )
        );
    }
    Ok(())
}

fn largest(app: &App, sub: &clap::ArgMatches) -> Result<()> {
    let period = period_or_current(sub)?;
    let found = dashboard::largest_expense(app.store, &app.session, &period)?;
    if maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &found)? {
        return Ok(());
    }
    match found {
        Some(t) => println!(
            "{}",
            pretty_table(
                &["ID", "Date", "Amount", "Description"],
                vec![vec![
                    t.id.to_string(),
                    t.date.to_string(),
                    fmt_money(&engine::parse_amount(&t.amount), &app.currency),
                    t.description,
                ]],
            )
        ),
        None => println!("No expenses between {}", period),
    }
    Ok(())
}
