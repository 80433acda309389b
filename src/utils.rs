// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::models::{Category, Session};
use crate::period::Period;
use crate::store::Store;
use anyhow::{Context, Result, anyhow, bail};
use chrono::NaiveDate;
use comfy_table::{Cell, Table, presets::UTF8_FULL};
use once_cell::sync::Lazy;
use regex::Regex;
use rust_decimal::Decimal;

static COLOR_TOKEN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^#[0-9A-Fa-f]{6}$").expect("color token pattern is valid")
});

pub fn parse_date(s: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
        .with_context(|| format!("Invalid date '{}', expected YYYY-MM-DD", s))
}

pub fn parse_decimal(s: &str) -> Result<Decimal> {
    s.trim()
        .parse::<Decimal>()
        .with_context(|| format!("Invalid decimal '{}'", s))
}

/// Amounts entered by the user must be strictly positive.
pub fn parse_amount_arg(s: &str) -> Result<Decimal> {
    let d = parse_decimal(s)?;
    if d <= Decimal::ZERO {
        bail!("Amount must be greater than zero, got '{}'", s.trim());
    }
    Ok(d)
}

pub fn parse_color(s: &str) -> Result<String> {
    let s = s.trim();
    if !COLOR_TOKEN.is_match(s) {
        bail!("Invalid color '{}', expected #RRGGBB", s);
    }
    Ok(s.to_uppercase())
}

pub fn parse_name(s: &str) -> Result<String> {
    let s = s.trim();
    if s.is_empty() {
        bail!("Category name is required");
    }
    Ok(s.to_string())
}

pub fn fmt_money(d: &Decimal, ccy: &str) -> String {
    format!("{} {:.2}", ccy, d.round_dp(2))
}

pub fn pretty_table(headers: &[&str], rows: Vec<Vec<String>>) -> Table {
    let mut t = Table::new();
    t.load_preset(UTF8_FULL);
    t.set_header(headers.iter().map(|h| Cell::new(*h)));
    for r in rows {
        t.add_row(r.into_iter().map(Cell::new));
    }
    t
}

pub fn category_by_name(store: &dyn Store, session: &Session, name: &str) -> Result<Category> {
    let wanted = name.trim();
    store
        .fetch_categories(session.owner())?
        .into_iter()
        .find(|c| c.name.eq_ignore_ascii_case(wanted))
        .ok_or_else(|| anyhow!("Category '{}' not found", wanted))
}

pub fn parse_id(raw: &str) -> Result<i64> {
    raw.trim()
        .parse::<i64>()
        .with_context(|| format!("Invalid id '{}'", raw))
}

/// Resolve `--from/--to` or `--month`; `None` when neither was given.
pub fn period_arg(sub: &clap::ArgMatches) -> Result<Option<Period>> {
    let from = sub.get_one::<String>("from");
    let to = sub.get_one::<String>("to");
    let month = sub.get_one::<String>("month");
    match (from, to, month) {
        (Some(f), Some(t), None) => Ok(Some(Period::new(parse_date(f)?, parse_date(t)?)?)),
        (None, None, Some(m)) => Ok(Some(Period::parse_month(m)?)),
        (None, None, None) => Ok(None),
        (_, _, Some(_)) => bail!("Use either --month or --from/--to, not both"),
        _ => bail!("--from and --to must be given together"),
    }
}

/// Date bounds for listings: `--month`, or `--from` and/or `--to`, either of
/// which may be left open.
pub fn date_bounds(sub: &clap::ArgMatches) -> Result<(Option<NaiveDate>, Option<NaiveDate>)> {
    let from = sub.get_one::<String>("from").map(|s| parse_date(s)).transpose()?;
    let to = sub.get_one::<String>("to").map(|s| parse_date(s)).transpose()?;
    match (from, to, sub.get_one::<String>("month")) {
        (None, None, Some(m)) => {
            let p = Period::parse_month(m)?;
            Ok((Some(p.start), Some(p.end)))
        }
        (_, _, Some(_)) => bail!("Use either --month or --from/--to, not both"),
        (Some(f), Some(t), None) => {
            let p = Period::new(f, t)?;
            Ok((Some(p.start), Some(p.end)))
        }
        (f, t, None) => Ok((f, t)),
    }
}

pub fn maybe_print_json<T: serde::Serialize>(
    json_flag: bool,
    jsonl_flag: bool,
    v: &T,
) -> Result<bool> {
    if json_flag {
        println!("{}", serde_json::to_string_pretty(v)?);
        return Ok(true);
    }
    if jsonl_flag {
        // If v is an array, stream each element; else stream single line
        let val = serde_json::to_value(v)?;
        if let Some(arr) = val.as_array() {
            for item in arr {
                println!("{}", serde_json::to_string(item)?);
            }
        } else {
            println!("{}", serde_json::to_string(&val)?);
        }
        return Ok(true);
    }
    Ok(false)
}
