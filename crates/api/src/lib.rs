//! Gem Shop API library.
//!
//! User accounts, admin bootstrap and login, and product listings over a
//! JSON HTTP API. Exposed as a library so the CLI and integration tests can
//! reuse the store, services and router.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod db;
pub mod error;
pub mod extract;
pub mod models;
pub mod routes;
pub mod services;
pub mod state;
