// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Todo API - Multi-tenant Todo List Service
//!
//! Callers authenticate with RapidAPI proxy headers or a provisioned API key
//! and manage their own todo lists and items, stored in SQLite.
//!
//! ## Modules
//!
//! - `api` - HTTP API handlers and router (Axum)
//! - `auth` - Principal resolution from request headers
//! - `settings` - Runtime settings refreshed from a remote document
//! - `storage` - SQLite repositories (sqlx)

pub mod api;
pub mod auth;
pub mod config;
pub mod error;
pub mod models;
pub mod settings;
pub mod state;
pub mod storage;
pub mod tls;
