// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use super::{Store, TransactionFilter, attachment_key};
use crate::error::{StoreError, StoreResult};
use crate::models::{
    Attachment, Category, CategoryChanges, CategoryDraft, CategoryType, Transaction,
    TransactionDraft, TransactionType,
};
use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ToSqlOutput, Value, ValueRef};
use rusqlite::{Connection, OptionalExtension, Row, ToSql, params, params_from_iter};
use std::fs;
use std::io::ErrorKind;
use std::path::{Component, Path, PathBuf};

const TRANSACTION_COLUMNS: &str = "id, user_id, type, amount, category_id, description, date, \
     attachment_url, attachment_name, notes";
const CATEGORY_COLUMNS: &str = "id, user_id, name, icon, color, type";

impl ToSql for TransactionType {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.as_str()))
    }
}

impl FromSql for TransactionType {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        value
            .as_str()?
            .parse()
            .map_err(|e| FromSqlError::Other(Box::new(e)))
    }
}

impl ToSql for CategoryType {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.as_str()))
    }
}

impl FromSql for CategoryType {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        value
            .as_str()?
            .parse()
            .map_err(|e| FromSqlError::Other(Box::new(e)))
    }
}

/// Local store backed by a SQLite database created by [`crate::db::init_schema`].
pub struct SqliteStore {
    conn: Connection,
    attachment_dir: PathBuf,
}

impl SqliteStore {
    pub fn new(conn: Connection) -> Self {
        Self {
            conn,
            attachment_dir: PathBuf::from("attachments"),
        }
    }

    pub fn open_in_memory() -> anyhow::Result<Self> {
        let conn = Connection::open_in_memory()?;
        crate::db::init_schema(&conn)?;
        Ok(Self::new(conn))
    }

    pub fn with_attachment_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.attachment_dir = dir.into();
        self
    }

    pub fn conn(&self) -> &Connection {
        &self.conn
    }

    pub fn attachment_dir(&self) -> &Path {
        &self.attachment_dir
    }

    fn fetch_category(&self, owner: &str, id: i64) -> StoreResult<Category> {
        self.conn
            .query_row(
                &format!("SELECT {CATEGORY_COLUMNS} FROM categories WHERE id=?1 AND user_id=?2"),
                params![id, owner],
                category_from_row,
            )
            .optional()?
            .ok_or_else(|| StoreError::not_found(format!("Category {}", id)))
    }

    /// A referenced category must belong to `owner` and accept `kind`.
    fn check_category(
        &self,
        owner: &str,
        category_id: Option<i64>,
        kind: TransactionType,
    ) -> StoreResult<()> {
        let Some(id) = category_id else {
            return Ok(());
        };
        let category = self.fetch_category(owner, id)?;
        if !category.r#type.accepts(kind) {
            return Err(StoreError::Invalid(format!(
                "category '{}' is for {} transactions, not {}",
                category.name, category.r#type, kind
            )));
        }
        Ok(())
    }
}

fn amount_text(value: ValueRef<'_>) -> String {
    match value {
        ValueRef::Text(t) => String::from_utf8_lossy(t).into_owned(),
        ValueRef::Integer(i) => i.to_string(),
        ValueRef::Real(f) => f.to_string(),
        ValueRef::Null | ValueRef::Blob(_) => String::new(),
    }
}

fn transaction_from_row(r: &Row<'_>) -> rusqlite::Result<Transaction> {
    let url: Option<String> = r.get(7)?;
    let name: Option<String> = r.get(8)?;
    let attachment = url.map(|url| Attachment {
        name: name.unwrap_or_default(),
        url,
    });
    Ok(Transaction {
        id: r.get(0)?,
        owner_id: r.get(1)?,
        r#type: r.get(2)?,
        amount: amount_text(r.get_ref(3)?),
        category_id: r.get(4)?,
        description: r.get::<_, Option<String>>(5)?.unwrap_or_default(),
        date: r.get(6)?,
        attachment,
        notes: r.get::<_, Option<String>>(9)?.unwrap_or_default(),
    })
}

fn category_from_row(r: &Row<'_>) -> rusqlite::Result<Category> {
    Ok(Category {
        id: r.get(0)?,
        owner_id: r.get(1)?,
        name: r.get(2)?,
        icon: r.get(3)?,
        color: r.get(4)?,
        r#type: r.get(5)?,
    })
}

impl Store for SqliteStore {
    fn fetch_transactions(
        &self,
        owner: &str,
        filter: &TransactionFilter,
    ) -> StoreResult<Vec<Transaction>> {
        let mut sql = format!("SELECT {TRANSACTION_COLUMNS} FROM transactions WHERE user_id=?");
        let mut values: Vec<Value> = vec![Value::Text(owner.to_string())];

        if let Some(kind) = filter.r#type {
            sql.push_str(" AND type=?");
            values.push(Value::Text(kind.as_str().into()));
        }
        if let Some(cat) = filter.category_id {
            sql.push_str(" AND category_id=?");
            values.push(Value::Integer(cat));
        }
        if let Some(start) = filter.start {
            sql.push_str(" AND date>=?");
            values.push(Value::Text(start.to_string()));
        }
        if let Some(end) = filter.end {
            sql.push_str(" AND date<=?");
            values.push(Value::Text(end.to_string()));
        }
        sql.push_str(" ORDER BY date DESC, id DESC");
        tracing::debug!(%sql, owner, "fetching transactions");

        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map(params_from_iter(values.iter()), transaction_from_row)?;
        let mut data = Vec::new();
        for row in rows {
            data.push(row?);
        }
        Ok(data)
    }

    fn fetch_transaction(&self, owner: &str, id: i64) -> StoreResult<Transaction> {
        self.conn
            .query_row(
                &format!(
                    "SELECT {TRANSACTION_COLUMNS} FROM transactions WHERE id=?1 AND user_id=?2"
                ),
                params![id, owner],
                transaction_from_row,
            )
            .optional()?
            .ok_or_else(|| StoreError::not_found(format!("Transaction {}", id)))
    }

    fn create_transaction(
        &self,
        owner: &str,
        draft: &TransactionDraft,
    ) -> StoreResult<Transaction> {
        self.check_category(owner, draft.category_id, draft.r#type)?;
        let (url, name) = match &draft.attachment {
            Some(a) => (Some(a.url.as_str()), Some(a.name.as_str())),
            None => (None, None),
        };
        self.conn.execute(
            "INSERT INTO transactions(user_id, type, amount, category_id, description, date,
             attachment_url, attachment_name, notes)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
            params![
                owner,
                draft.r#type,
                draft.amount.to_string(),
                draft.category_id,
                draft.description,
                draft.date.to_string(),
                url,
                name,
                draft.notes
            ],
        )?;
        let id = self.conn.last_insert_rowid();
        tracing::info!(
            id,
            owner,
            kind = %draft.r#type,
            amount = %draft.amount,
            "transaction created"
        );
        self.fetch_transaction(owner, id)
    }

    fn update_transaction(
        &self,
        owner: &str,
        id: i64,
        draft: &TransactionDraft,
    ) -> StoreResult<Transaction> {
        self.check_category(owner, draft.category_id, draft.r#type)?;
        let (url, name) = match &draft.attachment {
            Some(a) => (Some(a.url.as_str()), Some(a.name.as_str())),
            None => (None, None),
        };
        let changed = self.conn.execute(
            "UPDATE transactions SET type=?1, amount=?2, category_id=?3, description=?4, date=?5,
             attachment_url=?6, attachment_name=?7, notes=?8
             WHERE id=?9 AND user_id=?10",
            params![
                draft.r#type,
                draft.amount.to_string(),
                draft.category_id,
                draft.description,
                draft.date.to_string(),
                url,
                name,
                draft.notes,
                id,
                owner
            ],
        )?;
        if changed == 0 {
            return Err(StoreError::not_found(format!("Transaction {}", id)));
        }
        tracing::info!(id, owner, "transaction updated");
        self.fetch_transaction(owner, id)
    }

    fn delete_transaction(&self, owner: &str, id: i64) -> StoreResult<()> {
        let changed = self.conn.execute(
            "DELETE FROM transactions WHERE id=?1 AND user_id=?2",
            params![id, owner],
        )?;
        if changed == 0 {
            return Err(StoreError::not_found(format!("Transaction {}", id)));
        }
        tracing::info!(id, owner, "transaction deleted");
        Ok(())
    }

    fn fetch_categories(&self, owner: &str) -> StoreResult<Vec<Category>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {CATEGORY_COLUMNS} FROM categories WHERE user_id=?1 ORDER BY name, id"
        ))?;
        let rows = stmt.query_map(params![owner], category_from_row)?;
        let mut data = Vec::new();
        for row in rows {
            data.push(row?);
        }
        Ok(data)
    }

    fn create_categories(
        &self,
        owner: &str,
        drafts: &[CategoryDraft],
    ) -> StoreResult<Vec<Category>> {
        let tx = self.conn.unchecked_transaction()?;
        let mut ids = Vec::with_capacity(drafts.len());
        for d in drafts {
            tx.execute(
                "INSERT INTO categories(user_id, name, icon, color, type)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![owner, d.name, d.icon(), d.color(), d.kind()],
            )?;
            ids.push(tx.last_insert_rowid());
        }
        tx.commit()?;
        tracing::info!(owner, count = ids.len(), "categories created");
        ids.into_iter()
            .map(|id| self.fetch_category(owner, id))
            .collect()
    }

    fn update_category(
        &self,
        owner: &str,
        id: i64,
        changes: &CategoryChanges,
    ) -> StoreResult<Category> {
        let changed = self.conn.execute(
            "UPDATE categories SET name=COALESCE(?1, name), icon=COALESCE(?2, icon),
             color=COALESCE(?3, color), type=COALESCE(?4, type)
             WHERE id=?5 AND user_id=?6",
            params![
                changes.name,
                changes.icon,
                changes.color,
                changes.r#type,
                id,
                owner
            ],
        )?;
        if changed == 0 {
            return Err(StoreError::not_found(format!("Category {}", id)));
        }
        tracing::info!(id, owner, "category updated");
        self.fetch_category(owner, id)
    }

    fn delete_category(&self, owner: &str, id: i64) -> StoreResult<()> {
        let tx = self.conn.unchecked_transaction()?;
        tx.execute(
            "UPDATE transactions SET category_id=NULL WHERE category_id=?1 AND user_id=?2",
            params![id, owner],
        )?;
        let changed = tx.execute(
            "DELETE FROM categories WHERE id=?1 AND user_id=?2",
            params![id, owner],
        )?;
        if changed == 0 {
            return Err(StoreError::not_found(format!("Category {}", id)));
        }
        tx.commit()?;
        tracing::info!(id, owner, "category deleted");
        Ok(())
    }

    fn upload_attachment(
        &self,
        owner: &str,
        file_name: &str,
        bytes: &[u8],
    ) -> StoreResult<Attachment> {
        let mut millis = chrono::Utc::now().timestamp_millis();
        let mut path = self
            .attachment_dir
            .join(attachment_key(owner, file_name, millis));
        while path.exists() {
            millis += 1;
            path = self
                .attachment_dir
                .join(attachment_key(owner, file_name, millis));
        }
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir)?;
        }
        fs::write(&path, bytes)?;
        tracing::info!(owner, path = %path.display(), size = bytes.len(), "attachment stored");
        Ok(Attachment {
            url: path.display().to_string(),
            name: file_name.to_string(),
        })
    }

    fn delete_attachment(&self, attachment: &Attachment) -> StoreResult<()> {
        let path = Path::new(&attachment.url);
        let inside = path
            .strip_prefix(&self.attachment_dir)
            .is_ok_and(|rest| rest.components().all(|c| matches!(c, Component::Normal(_))));
        if !inside {
            return Err(StoreError::Invalid(format!(
                "attachment '{}' is outside {}",
                attachment.url,
                self.attachment_dir.display()
            )));
        }
        match fs::remove_file(path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                tracing::warn!(path = %path.display(), "attachment already gone");
                Ok(())
            }
            Err(e) => Err(e.into()),
        }
    }
}
