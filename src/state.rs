// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use crate::settings::SettingsHandle;
use crate::storage::Database;

#[derive(Clone)]
pub struct AppState {
    pub db: Database,
    pub settings: SettingsHandle,
}

impl AppState {
    pub fn new(db: Database, settings: SettingsHandle) -> Self {
        Self { db, settings }
    }
}
