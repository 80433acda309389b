// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use pocketbook::commands::{App, doctor};
use pocketbook::models::{CategoryDraft, CategoryType, Session};
use pocketbook::store::{SqliteStore, Store};
use rusqlite::params;

fn insert_raw(store: &SqliteStore, kind: &str, amount: &str, category_id: Option<i64>) {
    store
        .conn()
        .execute(
            "INSERT INTO transactions(user_id, type, amount, category_id, date) \
             VALUES ('ana', ?1, ?2, ?3, '2025-03-01')",
            params![kind, amount, category_id],
        )
        .unwrap();
}

#[test]
fn clean_data_has_no_issues() {
    let store = SqliteStore::open_in_memory().unwrap();
    insert_raw(&store, "income", "100.00", None);
    insert_raw(&store, "expense", "1e2", None);
    let app = App::new(&store, Session::new("ana"));
    assert!(doctor::find_issues(&app).unwrap().is_empty());
}

#[test]
fn reports_bad_amounts_and_category_problems() {
    let store = SqliteStore::open_in_memory().unwrap();
    let salary = store
        .create_category(
            "ana",
            &CategoryDraft {
                r#type: Some(CategoryType::Income),
                ..CategoryDraft::named("Salary")
            },
        )
        .unwrap();
    store
        .conn()
        .execute_batch("PRAGMA foreign_keys = OFF;")
        .unwrap();

    insert_raw(&store, "expense", "abc", None);
    insert_raw(&store, "expense", "-3", None);
    insert_raw(&store, "expense", "10", Some(salary.id));
    insert_raw(&store, "expense", "10", Some(4242));

    let app = App::new(&store, Session::new("ana"));
    let mut kinds: Vec<&str> = doctor::find_issues(&app)
        .unwrap()
        .into_iter()
        .map(|i| i.kind)
        .collect();
    kinds.sort();
    assert_eq!(
        kinds,
        vec![
            "category_type_mismatch",
            "malformed_amount",
            "missing_category",
            "negative_amount"
        ]
    );

    // another owner sees none of it
    let bob = App::new(&store, Session::new("bob"));
    assert!(doctor::find_issues(&bob).unwrap().is_empty());
}
