//! FoodieFinds Core - Shared domain types.
//!
//! This crate provides the types shared by the FoodieFinds components:
//! - `web` - The server-rendered restaurant UI
//! - `integration-tests` - Router-level and live-backend tests
//!
//! # Architecture
//!
//! The core crate contains only types and pure state transitions - no I/O,
//! no HTTP clients. All persistence lives in the external backend; these
//! types describe what the backend returns and what the UI keeps locally.
//!
//! # Modules
//!
//! - [`types`] - IDs, roles, cuisines, users, restaurants, photos, and the
//!   session lifecycle

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
