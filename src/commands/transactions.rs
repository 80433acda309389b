// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use super::App;
use crate::engine::{CategoryIndex, UNCATEGORIZED_NAME, parse_amount, try_parse_amount};
use crate::models::{Attachment, Transaction, TransactionDraft, TransactionType};
use crate::store::TransactionFilter;
use crate::utils::{
    category_by_name, date_bounds, fmt_money, maybe_print_json, parse_amount_arg, parse_date,
    parse_id, pretty_table,
};
use anyhow::{Context, Result, bail};
use rust_decimal::Decimal;
use std::path::Path;

pub fn handle(app: &App, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("add", sub)) => {
            add(app, sub)?;
        }
        Some(("list", sub)) => list(app, sub)?,
        Some(("show", sub)) => show(app, sub)?,
        Some(("edit", sub)) => {
            edit(app, sub)?;
        }
        Some(("rm", sub)) => rm(app, sub)?,
        _ => {}
    }
    Ok(())
}

/// Resolve `--category` to an id the transaction type may use.
fn resolve_category(
    app: &App,
    name: Option<&String>,
    kind: TransactionType,
) -> Result<Option<i64>> {
    let Some(name) = name else {
        return Ok(None);
    };
    let category = category_by_name(app.store, &app.session, name)?;
    if !category.r#type.accepts(kind) {
        bail!(
            "Category '{}' is for {} transactions, not {}",
            category.name,
            category.r#type,
            kind
        );
    }
    Ok(Some(category.id))
}

fn upload(app: &App, path: &str) -> Result<Attachment> {
    let path = Path::new(path.trim());
    let bytes = std::fs::read(path).with_context(|| format!("Read {}", path.display()))?;
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .with_context(|| format!("'{}' is not a file", path.display()))?;
    Ok(app.store.upload_attachment(app.owner(), &file_name, &bytes)?)
}

fn discard(app: &App, attachment: &Attachment) {
    if let Err(err) = app.store.delete_attachment(attachment) {
        tracing::warn!(url = %attachment.url, %err, "could not remove attachment");
    }
}

pub fn add(app: &App, sub: &clap::ArgMatches) -> Result<Transaction> {
    let kind = sub.get_one::<String>("type").unwrap().parse::<TransactionType>()?;
    let amount = parse_amount_arg(sub.get_one::<String>("amount").unwrap())?;
    let date = match sub.get_one::<String>("date") {
        Some(d) => parse_date(d)?,
        None => chrono::Local::now().date_naive(),
    };
    let category_id = resolve_category(app, sub.get_one::<String>("category"), kind)?;
    let attachment = sub
        .get_one::<String>("attach")
        .map(|p| upload(app, p))
        .transpose()?;

    let draft = TransactionDraft::new(kind, amount, date)
        .with_category(category_id)
        .with_description(
            sub.get_one::<String>("description")
                .map(|s| s.trim().to_string())
                .unwrap_or_default(),
        )
        .with_notes(
            sub.get_one::<String>("notes")
                .map(|s| s.trim().to_string())
                .unwrap_or_default(),
        )
        .with_attachment(attachment.clone());

    let created = match app.store.create_transaction(app.owner(), &draft) {
        Ok(t) => t,
        Err(err) => {
            if let Some(a) = &attachment {
                discard(app, a);
            }
            return Err(err.into());
        }
    };
    println!(
        "Recorded {} {} on {} (id {})",
        kind,
        fmt_money(&amount, &app.currency),
        date,
        created.id
    );
    Ok(created)
}

fn list(app: &App, sub: &clap::ArgMatches) -> Result<()> {
    let json_flag = sub.get_flag("json");
    let jsonl_flag = sub.get_flag("jsonl");
    let data = query_rows(app, sub)?;
    if !maybe_print_json(json_flag, jsonl_flag, &data)? {
        let index = CategoryIndex::new(&app.store.fetch_categories(app.owner())?);
        let rows: Vec<Vec<String>> = data
            .iter()
            .map(|t| {
                vec![
                    t.id.to_string(),
                    t.date.to_string(),
                    t.r#type.to_string(),
                    fmt_money(&parse_amount(&t.amount), &app.currency),
                    category_label(&index, t),
                    t.description.clone(),
                    t.attachment
                        .as_ref()
                        .map(|a| a.name.clone())
                        .unwrap_or_default(),
                ]
            })
            .collect();
        println!(
            "{}",
            pretty_table(
                &["ID", "Date", "Type", "Amount", "Category", "Description", "Attachment"],
                rows,
            )
        );
    }
    Ok(())
}

fn category_label(index: &CategoryIndex, t: &Transaction) -> String {
    index
        .get(t.category_id)
        .map(|c| format!("{} {}", c.icon, c.name))
        .unwrap_or_else(|| UNCATEGORIZED_NAME.to_string())
}

pub fn query_rows(app: &App, sub: &clap::ArgMatches) -> Result<Vec<Transaction>> {
    let mut filter = TransactionFilter::default();
    if let Some(t) = sub.get_one::<String>("type") {
        filter = filter.of_type(t.parse()?);
    }
    if let Some(cat) = sub.get_one::<String>("category") {
        filter = filter.in_category(category_by_name(app.store, &app.session, cat)?.id);
    }
    let (start, end) = date_bounds(sub)?;
    filter = filter.between(start, end);
    let mut data = app.store.fetch_transactions(app.owner(), &filter)?;
    if let Some(limit) = sub.get_one::<usize>("limit") {
        data.truncate(*limit);
    }
    Ok(data)
}

fn show(app: &App, sub: &clap::ArgMatches) -> Result<()> {
    let id = parse_id(sub.get_one::<String>("id").unwrap())?;
    let t = app.store.fetch_transaction(app.owner(), id)?;
    if maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &t)? {
        return Ok(());
    }
    let index = CategoryIndex::new(&app.store.fetch_categories(app.owner())?);
    let rows = vec![
        vec!["ID".to_string(), t.id.to_string()],
        vec!["Date".into(), t.date.to_string()],
        vec!["Type".into(), t.r#type.to_string()],
        vec!["Amount".into(), fmt_money(&parse_amount(&t.amount), &app.currency)],
        vec!["Category".into(), category_label(&index, &t)],
        vec!["Description".into(), t.description.clone()],
        vec!["Notes".into(), t.notes.clone()],
        vec![
            "Attachment".into(),
            t.attachment
                .as_ref()
                .map(|a| format!("{} ({})", a.name, a.url))
                .unwrap_or_default(),
        ],
    ];
    println!("{}", pretty_table(&["Field", "Value"], rows));
    Ok(())
}

/// Fields not given on the command line keep their stored values.
pub fn edit(app: &App, sub: &clap::ArgMatches) -> Result<Transaction> {
    let id = parse_id(sub.get_one::<String>("id").unwrap())?;
    let current = app.store.fetch_transaction(app.owner(), id)?;

    let kind = match sub.get_one::<String>("type") {
        Some(t) => t.parse::<TransactionType>()?,
        None => current.r#type,
    };
    let amount = match sub.get_one::<String>("amount") {
        Some(a) => parse_amount_arg(a)?,
        None => try_parse_amount(&current.amount)
            .filter(|d| *d > Decimal::ZERO)
            .with_context(|| {
                format!("Stored amount of transaction {} is unusable; pass --amount", id)
            })?,
    };
    let date = match sub.get_one::<String>("date") {
        Some(d) => parse_date(d)?,
        None => current.date,
    };
    let category_id = match sub.get_one::<String>("category") {
        _ if sub.get_flag("uncategorize") => None,
        Some(name) => resolve_category(app, Some(name), kind)?,
        None => current.category_id,
    };
    let new_attachment = sub
        .get_one::<String>("attach")
        .map(|p| upload(app, p))
        .transpose()?;

    let draft = TransactionDraft::new(kind, amount, date)
        .with_category(category_id)
        .with_description(
            sub.get_one::<String>("description")
                .map(|s| s.trim().to_string())
                .unwrap_or_else(|| current.description.clone()),
        )
        .with_notes(
            sub.get_one::<String>("notes")
                .map(|s| s.trim().to_string())
                .unwrap_or_else(|| current.notes.clone()),
        )
        .with_attachment(new_attachment.clone().or_else(|| current.attachment.clone()));

    let updated = match app.store.update_transaction(app.owner(), id, &draft) {
        Ok(t) => t,
        Err(err) => {
            if let Some(a) = &new_attachment {
                discard(app, a);
            }
            return Err(err.into());
        }
    };
    if let (Some(_), Some(old)) = (&new_attachment, &current.attachment) {
        discard(app, old);
    }
    println!("Updated transaction {}", id);
    Ok(updated)
}

fn rm(app: &App, sub: &clap::ArgMatches) -> Result<()> {
    let id = parse_id(sub.get_one::<String>("id").unwrap())?;
    let t = app.store.fetch_transaction(app.owner(), id)?;
    app.store.delete_transaction(app.owner(), id)?;
    if let Some(a) = &t.attachment {
        discard(app, a);
    }
    println!("Removed transaction {}", id);
    Ok(())
}
