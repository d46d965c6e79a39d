//! FoodieFinds web application library.
//!
//! Server-rendered UI over a Manifest backend. Exposed as a library so the
//! router can be driven from tests.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod error;
pub mod filters;
pub mod manifest;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod state;
