//! # Taskboard Shared Library
//!
//! This crate contains the types and business logic shared by the taskboard
//! API server: database models, the connection pool, and the authentication
//! and authorization primitives.
//!
//! ## Module Organization
//!
//! - `models`: Database models (`User`, `Task`) and their CRUD operations
//! - `auth`: Password hashing, JWT tokens, request authentication, access policy
//! - `db`: Connection pool and migration runner

pub mod auth;
pub mod db;
pub mod models;

/// Current version of the taskboard shared library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
