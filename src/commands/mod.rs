// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

pub mod categories;
pub mod dashboard;
pub mod doctor;
pub mod exporter;
pub mod reports;
pub mod transactions;

use crate::models::Session;
use crate::store::Store;

/// What every command handler needs: the store, who is asking, and how to
/// print money.
pub struct App<'a> {
    pub store: &'a dyn Store,
    pub session: Session,
    pub currency: String,
}

impl<'a> App<'a> {
    pub fn new(store: &'a dyn Store, session: Session) -> Self {
        Self {
            store,
            session,
            currency: "BRL".to_string(),
        }
    }

    pub fn with_currency(mut self, currency: impl Into<String>) -> Self {
        self.currency = currency.into();
        self
    }

    pub fn owner(&self) -> &str {
        self.session.owner()
    }
}
