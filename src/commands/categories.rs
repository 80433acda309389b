// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use super::App;
use crate::models::{
    Category, CategoryChanges, CategoryDraft, CategoryType, TransactionType, default_categories,
};
use crate::utils::{parse_color, parse_id, parse_name, pretty_table};
use anyhow::{Result, bail};

pub fn handle(app: &App, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("add", sub)) => {
            let draft = CategoryDraft {
                name: parse_name(sub.get_one::<String>("name").unwrap())?,
                icon: sub
                    .get_one::<String>("icon")
                    .map(|s| s.trim().to_string())
                    .filter(|s| !s.is_empty()),
                color: sub
                    .get_one::<String>("color")
                    .map(|s| parse_color(s))
                    .transpose()?,
                r#type: sub
                    .get_one::<String>("type")
                    .map(|s| s.parse::<CategoryType>())
                    .transpose()?,
            };
            let c = app.store.create_category(app.owner(), &draft)?;
            println!("Added category '{}' ({}, id {})", c.name, c.r#type, c.id);
        }
        Some(("list", sub)) => {
            let data = list_rows(app, sub)?;
            let rows: Vec<Vec<String>> = data
                .into_iter()
                .map(|c| {
                    vec![
                        c.id.to_string(),
                        c.icon,
                        c.name,
                        c.r#type.to_string(),
                        c.color,
                    ]
                })
                .collect();
            println!(
                "{}",
                pretty_table(&["ID", "Icon", "Category", "Type", "Color"], rows)
            );
        }
        Some(("edit", sub)) => {
            let id = parse_id(sub.get_one::<String>("id").unwrap())?;
            let changes = CategoryChanges {
                name: sub
                    .get_one::<String>("name")
                    .map(|s| parse_name(s))
                    .transpose()?,
                icon: sub.get_one::<String>("icon").map(|s| s.trim().to_string()),
                color: sub
                    .get_one::<String>("color")
                    .map(|s| parse_color(s))
                    .transpose()?,
                r#type: sub
                    .get_one::<String>("type")
                    .map(|s| s.parse::<CategoryType>())
                    .transpose()?,
            };
            if changes.is_empty() {
                bail!("Nothing to change for category {}", id);
            }
            let c = app.store.update_category(app.owner(), id, &changes)?;
            println!("Updated category '{}'", c.name);
        }
        Some(("rm", sub)) => {
            let id = parse_id(sub.get_one::<String>("id").unwrap())?;
            app.store.delete_category(app.owner(), id)?;
            println!("Removed category {}", id);
        }
        Some(("defaults", _)) => {
            let created = seed_defaults(app)?;
            println!("Added {} default categories", created.len());
        }
        _ => {}
    }
    Ok(())
}

pub fn list_rows(app: &App, sub: &clap::ArgMatches) -> Result<Vec<Category>> {
    let data = match sub.get_one::<String>("type") {
        Some(t) => {
            let kind = t.parse::<TransactionType>()?;
            app.store.fetch_categories_by_type(app.owner(), kind)?
        }
        None => app.store.fetch_categories(app.owner())?,
    };
    Ok(data)
}

/// Create whichever stock categories the user does not have yet.
pub fn seed_defaults(app: &App) -> Result<Vec<Category>> {
    let existing = app.store.fetch_categories(app.owner())?;
    let missing: Vec<CategoryDraft> = default_categories()
        .into_iter()
        .filter(|d| !existing.iter().any(|c| c.name.eq_ignore_ascii_case(&d.name)))
        .collect();
    if missing.is_empty() {
        return Ok(Vec::new());
    }
    Ok(app.store.create_categories(app.owner(), &missing)?)
}
