// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Hosted backend speaking the PostgREST and Storage HTTP dialects.
//!
//! Tables are reached under `<url>/rest/v1/` and files under
//! `<url>/storage/v1/object/attachments/`. Row-level ownership is also
//! enforced server side, but every query still carries `user_id=eq.<owner>`.

use super::{Store, TransactionFilter, attachment_key};
use crate::error::{StoreError, StoreResult};
use crate::models::{
    Attachment, Category, CategoryChanges, CategoryDraft, CategoryType, Transaction,
    TransactionDraft, TransactionType,
};
use crate::settings::RemoteSettings;
use chrono::NaiveDate;
use reqwest::blocking::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use serde_json::{Map, Value, json};

const UA: &str = concat!("pocketbook/", env!("CARGO_PKG_VERSION"));
const BUCKET: &str = "attachments";

pub struct RemoteStore {
    client: Client,
    base_url: String,
    api_key: String,
    access_token: Option<String>,
}

/// Query pairs for a transaction fetch, in the order they are sent.
pub fn transaction_query(owner: &str, filter: &TransactionFilter) -> Vec<(String, String)> {
    let mut q = vec![
        ("select".to_string(), "*".to_string()),
        ("user_id".to_string(), format!("eq.{}", owner)),
    ];
    if let Some(kind) = filter.r#type {
        q.push(("type".into(), format!("eq.{}", kind)));
    }
    if let Some(cat) = filter.category_id {
        q.push(("category_id".into(), format!("eq.{}", cat)));
    }
    if let Some(start) = filter.start {
        q.push(("date".into(), format!("gte.{}", start)));
    }
    if let Some(end) = filter.end {
        q.push(("date".into(), format!("lte.{}", end)));
    }
    q.push(("order".into(), "date.desc,id.desc".into()));
    q
}

/// Body for inserting or replacing a transaction row.
pub fn transaction_body(owner: &str, draft: &TransactionDraft) -> Value {
    json!({
        "user_id": owner,
        "type": draft.r#type,
        "amount": draft.amount.to_string(),
        "category_id": draft.category_id,
        "description": draft.description,
        "date": draft.date.to_string(),
        "attachment_url": draft.attachment.as_ref().map(|a| a.url.as_str()),
        "attachment_name": draft.attachment.as_ref().map(|a| a.name.as_str()),
        "notes": draft.notes,
    })
}

/// Only the fields that are set; PostgREST leaves the rest untouched.
pub fn category_patch(changes: &CategoryChanges) -> Value {
    let mut body = Map::new();
    if let Some(name) = &changes.name {
        body.insert("name".into(), json!(name));
    }
    if let Some(icon) = &changes.icon {
        body.insert("icon".into(), json!(icon));
    }
    if let Some(color) = &changes.color {
        body.insert("color".into(), json!(color));
    }
    if let Some(kind) = changes.r#type {
        body.insert("type".into(), json!(kind));
    }
    Value::Object(body)
}

/// `numeric` columns come back as JSON numbers or strings depending on the
/// server's settings; keep whatever text was sent.
fn amount_text<'de, D: Deserializer<'de>>(d: D) -> Result<String, D::Error> {
    Ok(match Value::deserialize(d)? {
        Value::String(s) => s,
        Value::Null => String::new(),
        other => other.to_string(),
    })
}

#[derive(Debug, Deserialize)]
pub struct TransactionRow {
    id: i64,
    user_id: String,
    #[serde(rename = "type")]
    kind: TransactionType,
    #[serde(deserialize_with = "amount_text")]
    amount: String,
    category_id: Option<i64>,
    #[serde(default)]
    description: Option<String>,
    date: NaiveDate,
    #[serde(default)]
    attachment_url: Option<String>,
    #[serde(default)]
    attachment_name: Option<String>,
    #[serde(default)]
    notes: Option<String>,
}

impl From<TransactionRow> for Transaction {
    fn from(r: TransactionRow) -> Self {
        let attachment = r.attachment_url.map(|url| Attachment {
            url,
            name: r.attachment_name.unwrap_or_default(),
        });
        Transaction {
            id: r.id,
            owner_id: r.user_id,
            r#type: r.kind,
            amount: r.amount,
            category_id: r.category_id,
            description: r.description.unwrap_or_default(),
            date: r.date,
            attachment,
            notes: r.notes.unwrap_or_default(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct CategoryRow {
    id: i64,
    user_id: String,
    name: String,
    icon: Option<String>,
    color: Option<String>,
    #[serde(rename = "type")]
    kind: Option<CategoryType>,
}

impl From<CategoryRow> for Category {
    fn from(r: CategoryRow) -> Self {
        Category {
            id: r.id,
            owner_id: r.user_id,
            name: r.name,
            icon: r
                .icon
                .unwrap_or_else(|| crate::models::DEFAULT_CATEGORY_ICON.into()),
            color: r
                .color
                .unwrap_or_else(|| crate::models::DEFAULT_CATEGORY_COLOR.into()),
            r#type: r.kind.unwrap_or(CategoryType::Both),
        }
    }
}

impl RemoteStore {
    pub fn new(settings: &RemoteSettings) -> StoreResult<Self> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(settings.timeout_secs))
            .user_agent(UA)
            .build()?;
        Ok(Self {
            client,
            base_url: settings.url.trim_end_matches('/').to_string(),
            api_key: settings.api_key.clone(),
            access_token: settings.access_token.clone(),
        })
    }

    fn table(&self, name: &str) -> String {
        format!("{}/rest/v1/{}", self.base_url, name)
    }

    fn object_url(&self, key: &str) -> String {
        format!("{}/storage/v1/object/{}/{}", self.base_url, BUCKET, key)
    }

    pub fn public_url(&self, key: &str) -> String {
        format!("{}/storage/v1/object/public/{}/{}", self.base_url, BUCKET, key)
    }

    /// Storage key of an attachment previously returned by [`Self::public_url`].
    pub fn key_of(&self, attachment: &Attachment) -> Option<String> {
        let prefix = self.public_url("");
        attachment
            .url
            .strip_prefix(&prefix)
            .filter(|k| !k.is_empty())
            .map(str::to_string)
    }

    fn authed(&self, rb: RequestBuilder) -> RequestBuilder {
        let bearer = self.access_token.as_deref().unwrap_or(&self.api_key);
        rb.header("apikey", &self.api_key).bearer_auth(bearer)
    }

    fn send(&self, rb: RequestBuilder) -> StoreResult<reqwest::blocking::Response> {
        let resp = self.authed(rb).send()?;
        let status = resp.status();
        if !status.is_success() {
            let message = resp.text().unwrap_or_default();
            tracing::warn!(status = status.as_u16(), %message, "remote store request failed");
            return Err(StoreError::Remote {
                status: status.as_u16(),
                message,
            });
        }
        Ok(resp)
    }

    fn send_json<T: DeserializeOwned>(&self, rb: RequestBuilder) -> StoreResult<T> {
        let text = self.send(rb)?.text()?;
        Ok(serde_json::from_str(&text)?)
    }

    /// Writes with `return=representation` answer with the affected rows.
    fn write_rows<R: DeserializeOwned>(&self, rb: RequestBuilder) -> StoreResult<Vec<R>> {
        self.send_json(rb.header("Prefer", "return=representation"))
    }

    fn single<R, T>(rows: Vec<R>, what: String) -> StoreResult<T>
    where
        T: From<R>,
    {
        rows.into_iter()
            .next()
            .map(T::from)
            .ok_or_else(|| StoreError::not_found(what))
    }
}

fn scope(owner: &str, id: i64) -> [(&'static str, String); 2] {
    [("id", format!("eq.{}", id)), ("user_id", format!("eq.{}", owner))]
}

impl Store for RemoteStore {
    fn fetch_transactions(
        &self,
        owner: &str,
        filter: &TransactionFilter,
    ) -> StoreResult<Vec<Transaction>> {
        let query = transaction_query(owner, filter);
        tracing::debug!(?query, "fetching remote transactions");
        let rows: Vec<TransactionRow> =
            self.send_json(self.client.get(self.table("transactions")).query(&query))?;
        Ok(rows.into_iter().map(Transaction::from).collect())
    }

    fn fetch_transaction(&self, owner: &str, id: i64) -> StoreResult<Transaction> {
        let rows: Vec<TransactionRow> = self.send_json(
            self.client
                .get(self.table("transactions"))
                .query(&[("select", "*")])
                .query(&scope(owner, id)),
        )?;
        Self::single(rows, format!("Transaction {}", id))
    }

    fn create_transaction(
        &self,
        owner: &str,
        draft: &TransactionDraft,
    ) -> StoreResult<Transaction> {
        let rows: Vec<TransactionRow> = self.write_rows(
            self.client
                .post(self.table("transactions"))
                .json(&json!([transaction_body(owner, draft)])),
        )?;
        let created: Transaction = Self::single(rows, "Created transaction".into())?;
        tracing::info!(id = created.id, owner, "transaction created");
        Ok(created)
    }

    fn update_transaction(
        &self,
        owner: &str,
        id: i64,
        draft: &TransactionDraft,
    ) -> StoreResult<Transaction> {
        let rows: Vec<TransactionRow> = self.write_rows(
            self.client
                .patch(self.table("transactions"))
                .query(&scope(owner, id))
                .json(&transaction_body(owner, draft)),
        )?;
        Self::single(rows, format!("Transaction {}", id))
    }

    fn delete_transaction(&self, owner: &str, id: i64) -> StoreResult<()> {
        let rows: Vec<TransactionRow> = self.write_rows(
            self.client
                .delete(self.table("transactions"))
                .query(&scope(owner, id)),
        )?;
        if rows.is_empty() {
            return Err(StoreError::not_found(format!("Transaction {}", id)));
        }
        Ok(())
    }

    fn fetch_categories(&self, owner: &str) -> StoreResult<Vec<Category>> {
        let query = [
            ("select", "*".to_string()),
            ("user_id", format!("eq.{}", owner)),
            ("order", "name.asc".to_string()),
        ];
        let rows: Vec<CategoryRow> =
            self.send_json(self.client.get(self.table("categories")).query(&query))?;
        Ok(rows.into_iter().map(Category::from).collect())
    }

    fn create_categories(
        &self,
        owner: &str,
        drafts: &[CategoryDraft],
    ) -> StoreResult<Vec<Category>> {
        let body: Vec<Value> = drafts
            .iter()
            .map(|d| {
                json!({
                    "user_id": owner,
                    "name": d.name,
                    "icon": d.icon(),
                    "color": d.color(),
                    "type": d.kind(),
                })
            })
            .collect();
        let rows: Vec<CategoryRow> =
            self.write_rows(self.client.post(self.table("categories")).json(&body))?;
        tracing::info!(owner, count = rows.len(), "categories created");
        Ok(rows.into_iter().map(Category::from).collect())
    }

    fn update_category(
        &self,
        owner: &str,
        id: i64,
        changes: &CategoryChanges,
    ) -> StoreResult<Category> {
        let rows: Vec<CategoryRow> = self.write_rows(
            self.client
                .patch(self.table("categories"))
                .query(&scope(owner, id))
                .json(&category_patch(changes)),
        )?;
        Self::single(rows, format!("Category {}", id))
    }

    fn delete_category(&self, owner: &str, id: i64) -> StoreResult<()> {
        let rows: Vec<CategoryRow> = self.write_rows(
            self.client
                .delete(self.table("categories"))
                .query(&scope(owner, id)),
        )?;
        if rows.is_empty() {
            return Err(StoreError::not_found(format!("Category {}", id)));
        }
        Ok(())
    }

    fn upload_attachment(
        &self,
        owner: &str,
        file_name: &str,
        bytes: &[u8],
    ) -> StoreResult<Attachment> {
        let key = attachment_key(owner, file_name, chrono::Utc::now().timestamp_millis());
        self.send(
            self.client
                .post(self.object_url(&key))
                .header("Content-Type", "application/octet-stream")
                .body(bytes.to_vec()),
        )?;
        tracing::info!(owner, %key, size = bytes.len(), "attachment uploaded");
        Ok(Attachment {
            url: self.public_url(&key),
            name: file_name.to_string(),
        })
    }

    fn delete_attachment(&self, attachment: &Attachment) -> StoreResult<()> {
        let key = self.key_of(attachment).ok_or_else(|| {
            StoreError::Invalid(format!("'{}' is not a stored attachment", attachment.url))
        })?;
        self.send(
            self.client
                .delete(format!("{}/storage/v1/object/{}", self.base_url, BUCKET))
                .json(&json!({ "prefixes": [key] })),
        )?;
        Ok(())
    }
}
