// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Record accessors: where transactions and categories live.
//!
//! [`Store`] is the only way the rest of the crate reads or writes records.
//! Every call takes the owner explicitly; implementations must never return
//! another user's rows.

pub mod remote;
pub mod sqlite;

use crate::error::StoreResult;
use crate::models::{
    Attachment, Category, CategoryChanges, CategoryDraft, Transaction, TransactionDraft,
    TransactionType,
};
use crate::period::Period;
use crate::settings::{Backend, Settings};
use anyhow::{Context, Result};
use chrono::NaiveDate;

pub use remote::RemoteStore;
pub use sqlite::SqliteStore;

/// Equality and inclusive range filters applied to a transaction fetch.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TransactionFilter {
    pub r#type: Option<TransactionType>,
    pub category_id: Option<i64>,
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
}

impl TransactionFilter {
    pub fn of_type(mut self, kind: TransactionType) -> Self {
        self.r#type = Some(kind);
        self
    }

    pub fn in_category(mut self, category_id: i64) -> Self {
        self.category_id = Some(category_id);
        self
    }

    /// Open-ended on whichever side is `None`.
    pub fn between(mut self, start: Option<NaiveDate>, end: Option<NaiveDate>) -> Self {
        self.start = start;
        self.end = end;
        self
    }

    pub fn within(mut self, period: &Period) -> Self {
        self.start = Some(period.start);
        self.end = Some(period.end);
        self
    }

    pub fn matches(&self, t: &Transaction) -> bool {
        self.r#type.is_none_or(|k| k == t.r#type)
            && self.category_id.is_none_or(|c| t.category_id == Some(c))
            && self.start.is_none_or(|s| t.date >= s)
            && self.end.is_none_or(|e| t.date <= e)
    }
}

pub trait Store {
    /// Transactions matching `filter`, newest date first, then highest id.
    fn fetch_transactions(
        &self,
        owner: &str,
        filter: &TransactionFilter,
    ) -> StoreResult<Vec<Transaction>>;

    fn fetch_transaction(&self, owner: &str, id: i64) -> StoreResult<Transaction>;

    fn create_transaction(&self, owner: &str, draft: &TransactionDraft)
    -> StoreResult<Transaction>;

    fn update_transaction(
        &self,
        owner: &str,
        id: i64,
        draft: &TransactionDraft,
    ) -> StoreResult<Transaction>;

    fn delete_transaction(&self, owner: &str, id: i64) -> StoreResult<()>;

    /// All of the owner's categories, ordered by name.
    fn fetch_categories(&self, owner: &str) -> StoreResult<Vec<Category>>;

    fn create_categories(
        &self,
        owner: &str,
        drafts: &[CategoryDraft],
    ) -> StoreResult<Vec<Category>>;

    fn update_category(
        &self,
        owner: &str,
        id: i64,
        changes: &CategoryChanges,
    ) -> StoreResult<Category>;

    /// Transactions that referenced the category become uncategorized.
    fn delete_category(&self, owner: &str, id: i64) -> StoreResult<()>;

    fn upload_attachment(
        &self,
        owner: &str,
        file_name: &str,
        bytes: &[u8],
    ) -> StoreResult<Attachment>;

    fn delete_attachment(&self, attachment: &Attachment) -> StoreResult<()>;

    /// Categories usable for `kind`, i.e. of that type or `both`.
    fn fetch_categories_by_type(
        &self,
        owner: &str,
        kind: TransactionType,
    ) -> StoreResult<Vec<Category>> {
        Ok(self
            .fetch_categories(owner)?
            .into_iter()
            .filter(|c| c.r#type.accepts(kind))
            .collect())
    }

    fn create_category(&self, owner: &str, draft: &CategoryDraft) -> StoreResult<Category> {
        self.create_categories(owner, std::slice::from_ref(draft))?
            .into_iter()
            .next()
            .ok_or_else(|| crate::error::StoreError::Invalid("store returned no category".into()))
    }
}

/// Storage key for an uploaded file: `<owner>/<unix-millis>.<ext>`.
///
/// The owner always becomes a single plain path segment: separators turn
/// into `_`, and an empty or all-dot owner is replaced with underscores.
pub fn attachment_key(owner: &str, file_name: &str, millis: i64) -> String {
    let mut owner: String = owner
        .chars()
        .map(|c| if c == '/' || c == '\\' { '_' } else { c })
        .collect();
    if owner.chars().all(|c| c == '.') {
        owner = "_".repeat(owner.len().max(1));
    }
    match file_name.rsplit_once('.') {
        Some((_, ext)) if !ext.is_empty() => format!("{}/{}.{}", owner, millis, ext),
        _ => format!("{}/{}", owner, millis),
    }
}

/// Open the store selected by `settings`.
pub fn open(settings: &Settings) -> Result<Box<dyn Store>> {
    match settings.backend {
        Backend::Sqlite => {
            let path = settings.database_path()?;
            let conn = crate::db::open_or_init(&path)?;
            let dir = path
                .parent()
                .map(|p| p.join("attachments"))
                .context("Database path has no parent directory")?;
            tracing::debug!(db = %path.display(), "using sqlite store");
            Ok(Box::new(SqliteStore::new(conn).with_attachment_dir(dir)))
        }
        Backend::Remote => {
            let remote = settings
                .remote
                .as_ref()
                .context("backend = \"remote\" requires a [remote] section")?;
            tracing::debug!(url = %remote.url, "using remote store");
            Ok(Box::new(RemoteStore::new(remote)?))
        }
    }
}
