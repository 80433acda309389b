// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use pocketbook::cli;
use pocketbook::commands::{App, categories};
use pocketbook::models::{CategoryType, Session};
use pocketbook::store::{SqliteStore, Store};

fn run(app: &App, args: &[&str]) -> anyhow::Result<()> {
    let mut argv = vec!["pocketbook", "category"];
    argv.extend_from_slice(args);
    let matches = cli::build_cli().get_matches_from(argv);
    let Some(("category", m)) = matches.subcommand() else {
        panic!("category subcommand missing");
    };
    categories::handle(app, m)
}

#[test]
fn add_applies_defaults_and_normalizes_color() {
    let store = SqliteStore::open_in_memory().unwrap();
    let app = App::new(&store, Session::new("ana"));
    run(&app, &["add", "--name", "  Pets  ", "--color", "#a1b2c3"]).unwrap();
    run(&app, &["add", "--name", "Rent", "--type", "expense", "--icon", "🏠"]).unwrap();

    let cats = store.fetch_categories("ana").unwrap();
    assert_eq!(cats.len(), 2);
    let pets = cats.iter().find(|c| c.name == "Pets").unwrap();
    assert_eq!(pets.color, "#A1B2C3");
    assert_eq!(pets.icon, "📁");
    assert_eq!(pets.r#type, CategoryType::Both);
    let rent = cats.iter().find(|c| c.name == "Rent").unwrap();
    assert_eq!(rent.icon, "🏠");
    assert_eq!(rent.r#type, CategoryType::Expense);
}

#[test]
fn add_rejects_blank_name_and_bad_color() {
    let store = SqliteStore::open_in_memory().unwrap();
    let app = App::new(&store, Session::new("ana"));
    let err = run(&app, &["add", "--name", "   "]).unwrap_err();
    assert!(err.to_string().contains("Category name is required"));
    assert!(run(&app, &["add", "--name", "X", "--color", "red"]).is_err());
    assert!(store.fetch_categories("ana").unwrap().is_empty());
}

#[test]
fn list_by_type_includes_shared_categories() {
    let store = SqliteStore::open_in_memory().unwrap();
    let app = App::new(&store, Session::new("ana"));
    run(&app, &["add", "--name", "Salary", "--type", "income"]).unwrap();
    run(&app, &["add", "--name", "Rent", "--type", "expense"]).unwrap();
    run(&app, &["add", "--name", "Gifts"]).unwrap();

    let m =
        cli::build_cli().get_matches_from(["pocketbook", "category", "list", "--type", "income"]);
    let Some(("category", m)) = m.subcommand() else {
        panic!()
    };
    let Some(("list", sub)) = m.subcommand() else {
        panic!()
    };
    let names: Vec<String> = categories::list_rows(&app, sub)
        .unwrap()
        .into_iter()
        .map(|c| c.name)
        .collect();
    assert_eq!(names, vec!["Gifts", "Salary"]);
}

#[test]
fn defaults_seed_twelve_categories_once() {
    let store = SqliteStore::open_in_memory().unwrap();
    let app = App::new(&store, Session::new("ana"));
    let created = categories::seed_defaults(&app).unwrap();
    assert_eq!(created.len(), 12);
    assert_eq!(
        created
            .iter()
            .filter(|c| c.r#type == CategoryType::Expense)
            .count(),
        8
    );
    assert_eq!(
        created
            .iter()
            .filter(|c| c.r#type == CategoryType::Income)
            .count(),
        4
    );
    assert!(created.iter().all(|c| c.owner_id == "ana"));

    // second run adds nothing
    assert!(categories::seed_defaults(&app).unwrap().is_empty());
    assert_eq!(store.fetch_categories("ana").unwrap().len(), 12);
}

#[test]
fn defaults_skip_names_the_user_already_has() {
    let store = SqliteStore::open_in_memory().unwrap();
    let app = App::new(&store, Session::new("ana"));
    run(&app, &["add", "--name", "transporte", "--type", "expense"]).unwrap();
    let created = categories::seed_defaults(&app).unwrap();
    assert_eq!(created.len(), 11);
}

#[test]
fn edit_and_remove() {
    let store = SqliteStore::open_in_memory().unwrap();
    let app = App::new(&store, Session::new("ana"));
    run(&app, &["add", "--name", "Food"]).unwrap();
    let id = store.fetch_categories("ana").unwrap()[0].id.to_string();

    run(&app, &["edit", "--id", &id, "--name", "Groceries", "--type", "expense"]).unwrap();
    let c = &store.fetch_categories("ana").unwrap()[0];
    assert_eq!(c.name, "Groceries");
    assert_eq!(c.r#type, CategoryType::Expense);

    assert!(run(&app, &["edit", "--id", &id]).is_err());

    // another user cannot remove it
    let bob = App::new(&store, Session::new("bob"));
    assert!(run(&bob, &["rm", "--id", &id]).is_err());

    run(&app, &["rm", "--id", &id]).unwrap();
    assert!(store.fetch_categories("ana").unwrap().is_empty());
}
