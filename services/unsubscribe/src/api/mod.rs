//! Unsubscribe HTTP API module.
//!
//! # Purpose
//! Exposes the route handler modules and the shared payload and error types.
pub mod error;
pub mod openapi;
pub mod page;
pub mod system;
pub mod types;
pub mod unsubscribe;
