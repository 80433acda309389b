// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::{Context, Result};
use std::path::Path;

use pocketbook::commands::{self, App};
use pocketbook::models::Session;
use pocketbook::settings::Settings;
use pocketbook::{cli, db, logging, store};

fn main() -> Result<()> {
    let matches = cli::build_cli().get_matches();

    let settings = Settings::load(matches.get_one::<String>("config").map(Path::new))?;
    logging::init(&settings.log_level, matches.get_count("verbose"));

    if let Some(("init", _)) = matches.subcommand() {
        let path = settings.database_path()?;
        db::open_or_init(&path)?;
        println!("Database initialized at {}", path.display());
        return Ok(());
    }

    let Some((name, sub)) = matches.subcommand() else {
        cli::build_cli().print_help()?;
        println!();
        return Ok(());
    };

    let user = matches
        .get_one::<String>("user")
        .cloned()
        .or_else(|| settings.user.clone())
        .filter(|u| !u.trim().is_empty())
        .context("No user given; pass --user or set `user` in the configuration")?;
    let store = store::open(&settings)?;
    let app = App::new(store.as_ref(), Session::new(user.trim())).with_currency(&settings.currency);
    tracing::debug!(command = name, owner = app.owner(), "dispatching");

    match name {
        "category" => commands::categories::handle(&app, sub)?,
        "tx" => commands::transactions::handle(&app, sub)?,
        "report" => commands::reports::handle(&app, sub)?,
        "dashboard" => commands::dashboard::handle(&app, sub)?,
        "export" => commands::exporter::handle(&app, sub)?,
        "doctor" => commands::doctor::handle(&app)?,
        _ => {
            cli::build_cli().print_help()?;
            println!();
        }
    }
    Ok(())
}
