// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use chrono::NaiveDate;
use pocketbook::error::StoreError;
use pocketbook::models::{
    CategoryChanges, CategoryDraft, CategoryType, TransactionDraft, TransactionType,
};
use pocketbook::period::Period;
use pocketbook::store::{SqliteStore, Store, TransactionFilter, attachment_key};
use rust_decimal::Decimal;

fn d(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
}

fn draft(kind: TransactionType, amount: i64, date: &str) -> TransactionDraft {
    TransactionDraft::new(kind, Decimal::new(amount, 0), d(date))
}

fn typed(name: &str, kind: CategoryType) -> CategoryDraft {
    CategoryDraft {
        r#type: Some(kind),
        ..CategoryDraft::named(name)
    }
}

#[test]
fn fetch_is_scoped_to_owner() {
    let store = SqliteStore::open_in_memory().unwrap();
    store
        .create_transaction("ana", &draft(TransactionType::Income, 100, "2025-03-01"))
        .unwrap();
    let bob = store
        .create_transaction("bob", &draft(TransactionType::Expense, 40, "2025-03-02"))
        .unwrap();

    let ana = store
        .fetch_transactions("ana", &TransactionFilter::default())
        .unwrap();
    assert_eq!(ana.len(), 1);
    assert!(ana.iter().all(|t| t.owner_id == "ana"));

    let err = store.fetch_transaction("ana", bob.id).unwrap_err();
    assert!(err.is_not_found());
    assert!(store.delete_transaction("ana", bob.id).unwrap_err().is_not_found());
    assert_eq!(
        store
            .fetch_transactions("bob", &TransactionFilter::default())
            .unwrap()
            .len(),
        1
    );
}

#[test]
fn period_bounds_are_inclusive_and_newest_first() {
    let store = SqliteStore::open_in_memory().unwrap();
    for date in ["2025-02-28", "2025-03-01", "2025-03-15", "2025-03-31", "2025-04-01"] {
        store
            .create_transaction("ana", &draft(TransactionType::Expense, 10, date))
            .unwrap();
    }
    let period = Period::month(2025, 3).unwrap();
    let data = store
        .fetch_transactions("ana", &TransactionFilter::default().within(&period))
        .unwrap();
    let dates: Vec<String> = data.iter().map(|t| t.date.to_string()).collect();
    assert_eq!(dates, vec!["2025-03-31", "2025-03-15", "2025-03-01"]);
}

#[test]
fn same_day_rows_order_by_highest_id() {
    let store = SqliteStore::open_in_memory().unwrap();
    let a = store
        .create_transaction("ana", &draft(TransactionType::Expense, 1, "2025-03-05"))
        .unwrap();
    let b = store
        .create_transaction("ana", &draft(TransactionType::Expense, 2, "2025-03-05"))
        .unwrap();
    let data = store
        .fetch_transactions("ana", &TransactionFilter::default())
        .unwrap();
    assert_eq!(data[0].id, b.id);
    assert_eq!(data[1].id, a.id);
}

#[test]
fn type_and_category_filters() {
    let store = SqliteStore::open_in_memory().unwrap();
    let food = store
        .create_category("ana", &typed("Food", CategoryType::Expense))
        .unwrap();
    store
        .create_transaction(
            "ana",
            &draft(TransactionType::Expense, 30, "2025-03-02").with_category(Some(food.id)),
        )
        .unwrap();
    store
        .create_transaction("ana", &draft(TransactionType::Expense, 5, "2025-03-03"))
        .unwrap();
    store
        .create_transaction("ana", &draft(TransactionType::Income, 500, "2025-03-04"))
        .unwrap();

    let expenses = store
        .fetch_transactions(
            "ana",
            &TransactionFilter::default().of_type(TransactionType::Expense),
        )
        .unwrap();
    assert_eq!(expenses.len(), 2);
    assert!(expenses.iter().all(|t| t.is_expense()));

    let filter = TransactionFilter::default().in_category(food.id);
    let in_food = store.fetch_transactions("ana", &filter).unwrap();
    assert_eq!(in_food.len(), 1);
    assert_eq!(in_food[0].amount, "30");
    assert!(filter.matches(&in_food[0]));
}

#[test]
fn amounts_round_trip_as_text() {
    let store = SqliteStore::open_in_memory().unwrap();
    let t = store
        .create_transaction(
            "ana",
            &TransactionDraft::new(TransactionType::Expense, Decimal::new(1999, 2), d("2025-03-01"))
                .with_description("Lunch")
                .with_notes("with team"),
        )
        .unwrap();
    assert_eq!(t.amount, "19.99");
    assert_eq!(t.description, "Lunch");
    assert_eq!(t.notes, "with team");
    assert_eq!(t.category_id, None);
}

#[test]
fn category_must_fit_transaction_type() {
    let store = SqliteStore::open_in_memory().unwrap();
    let salary = store
        .create_category("ana", &typed("Salary", CategoryType::Income))
        .unwrap();
    let err = store
        .create_transaction(
            "ana",
            &draft(TransactionType::Expense, 10, "2025-03-01").with_category(Some(salary.id)),
        )
        .unwrap_err();
    assert!(matches!(err, StoreError::Invalid(_)));

    let shared = store.create_category("ana", &CategoryDraft::named("Misc")).unwrap();
    assert_eq!(shared.r#type, CategoryType::Both);
    for kind in [TransactionType::Income, TransactionType::Expense] {
        store
            .create_transaction(
                "ana",
                &draft(kind, 10, "2025-03-01").with_category(Some(shared.id)),
            )
            .unwrap();
    }
}

#[test]
fn cannot_use_another_owners_category() {
    let store = SqliteStore::open_in_memory().unwrap();
    let theirs = store.create_category("bob", &CategoryDraft::named("Bob's")).unwrap();
    let err = store
        .create_transaction(
            "ana",
            &draft(TransactionType::Expense, 10, "2025-03-01").with_category(Some(theirs.id)),
        )
        .unwrap_err();
    assert!(err.is_not_found());
}

#[test]
fn categories_by_type_include_both() {
    let store = SqliteStore::open_in_memory().unwrap();
    store
        .create_categories(
            "ana",
            &[
                typed("Rent", CategoryType::Expense),
                typed("Salary", CategoryType::Income),
                typed("Gifts", CategoryType::Both),
            ],
        )
        .unwrap();
    let names: Vec<String> = store
        .fetch_categories_by_type("ana", TransactionType::Expense)
        .unwrap()
        .into_iter()
        .map(|c| c.name)
        .collect();
    assert_eq!(names, vec!["Gifts", "Rent"]);
}

#[test]
fn new_categories_get_default_style() {
    let store = SqliteStore::open_in_memory().unwrap();
    let c = store.create_category("ana", &CategoryDraft::named("Pets")).unwrap();
    assert_eq!(c.icon, "📁");
    assert_eq!(c.color, "#6366F1");
    assert!(store.create_category("ana", &CategoryDraft::named("Pets")).is_err());
    // names are unique per owner only
    store.create_category("bob", &CategoryDraft::named("Pets")).unwrap();
}

#[test]
fn update_category_changes_only_given_fields() {
    let store = SqliteStore::open_in_memory().unwrap();
    let c = store
        .create_category("ana", &typed("Food", CategoryType::Expense))
        .unwrap();
    let updated = store
        .update_category(
            "ana",
            c.id,
            &CategoryChanges {
                color: Some("#112233".into()),
                ..Default::default()
            },
        )
        .unwrap();
    assert_eq!(updated.name, "Food");
    assert_eq!(updated.color, "#112233");
    assert_eq!(updated.r#type, CategoryType::Expense);

    let missing = store.update_category("bob", c.id, &CategoryChanges::default());
    assert!(missing.unwrap_err().is_not_found());
}

#[test]
fn deleting_category_uncategorizes_its_transactions() {
    let store = SqliteStore::open_in_memory().unwrap();
    let food = store.create_category("ana", &CategoryDraft::named("Food")).unwrap();
    let t = store
        .create_transaction(
            "ana",
            &draft(TransactionType::Expense, 12, "2025-03-01").with_category(Some(food.id)),
        )
        .unwrap();
    store.delete_category("ana", food.id).unwrap();
    assert_eq!(store.fetch_transaction("ana", t.id).unwrap().category_id, None);
    assert!(store.fetch_categories("ana").unwrap().is_empty());
    assert!(store.delete_category("ana", food.id).unwrap_err().is_not_found());
}

#[test]
fn update_replaces_every_field() {
    let store = SqliteStore::open_in_memory().unwrap();
    let t = store
        .create_transaction(
            "ana",
            &draft(TransactionType::Expense, 12, "2025-03-01").with_description("old"),
        )
        .unwrap();
    let updated = store
        .update_transaction(
            "ana",
            t.id,
            &draft(TransactionType::Income, 80, "2025-03-09").with_description("new"),
        )
        .unwrap();
    assert_eq!(updated.r#type, TransactionType::Income);
    assert_eq!(updated.amount, "80");
    assert_eq!(updated.date, d("2025-03-09"));
    assert_eq!(updated.description, "new");

    let err = store
        .update_transaction("bob", t.id, &draft(TransactionType::Income, 1, "2025-03-09"))
        .unwrap_err();
    assert!(err.is_not_found());
}

#[test]
fn attachments_live_under_owner_directory() {
    let dir = tempfile::tempdir().unwrap();
    let store = SqliteStore::open_in_memory()
        .unwrap()
        .with_attachment_dir(dir.path());

    let a = store.upload_attachment("ana", "receipt.pdf", b"%PDF").unwrap();
    let b = store.upload_attachment("ana", "receipt.pdf", b"%PDF").unwrap();
    assert_ne!(a.url, b.url);
    assert_eq!(a.name, "receipt.pdf");
    assert!(a.url.ends_with(".pdf"));
    assert!(std::path::Path::new(&a.url).starts_with(dir.path().join("ana")));
    assert_eq!(std::fs::read(&a.url).unwrap(), b"%PDF");

    store.delete_attachment(&a).unwrap();
    assert!(!std::path::Path::new(&a.url).exists());
    // deleting twice is fine
    store.delete_attachment(&a).unwrap();
}

#[test]
fn attachments_outside_the_directory_are_refused() {
    let dir = tempfile::tempdir().unwrap();
    let store = SqliteStore::open_in_memory()
        .unwrap()
        .with_attachment_dir(dir.path().join("files"));
    let outside = pocketbook::models::Attachment {
        url: dir.path().join("elsewhere.txt").display().to_string(),
        name: "elsewhere.txt".into(),
    };
    let err = store.delete_attachment(&outside).unwrap_err();
    assert!(matches!(err, StoreError::Invalid(_)));
}

#[test]
fn attachment_keys() {
    assert_eq!(attachment_key("ana", "photo.jpg", 1700), "ana/1700.jpg");
    assert_eq!(attachment_key("ana", "README", 5), "ana/5");
    assert_eq!(attachment_key("a/../b", "x.png", 1), "a_.._b/1.png");
    assert_eq!(attachment_key("..", "x.png", 1), "__/1.png");
    assert_eq!(attachment_key(".", "x.png", 1), "_/1.png");
    assert_eq!(attachment_key("", "x.png", 1), "_/1.png");
}

#[test]
fn dot_owners_stay_inside_the_attachment_directory() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path().join("files");
    let store = SqliteStore::open_in_memory()
        .unwrap()
        .with_attachment_dir(&root);
    for owner in ["..", "."] {
        let a = store.upload_attachment(owner, "x.txt", b"x").unwrap();
        let path = std::path::Path::new(&a.url);
        assert!(path.starts_with(&root));
        assert_eq!(path.parent().unwrap().parent().unwrap(), root.as_path());
        store.delete_attachment(&a).unwrap();
    }
}

#[test]
fn parent_segments_in_attachment_urls_are_refused() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path().join("files");
    std::fs::write(dir.path().join("keep.txt"), b"keep").unwrap();
    let store = SqliteStore::open_in_memory()
        .unwrap()
        .with_attachment_dir(&root);
    let sneaky = pocketbook::models::Attachment {
        url: root.join("..").join("keep.txt").display().to_string(),
        name: "keep.txt".into(),
    };
    let err = store.delete_attachment(&sneaky).unwrap_err();
    assert!(matches!(err, StoreError::Invalid(_)));
    assert!(dir.path().join("keep.txt").exists());
}
