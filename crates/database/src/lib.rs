//! # Diet Plan Database Crate
//!
//! This crate acts as a high-level, application-specific interface to the
//! PostgreSQL database that stores diet plans, their meals and their foods.
//!
//! ## Architectural Principles
//!
//! - **Adapter:** This crate encapsulates all database-specific logic behind the
//!   [`DietStore`] trait. Callers never see SQL.
//! - **Transaction per operation:** Every operation takes its own transaction
//!   from the pool and either commits all of its effects or none of them.
//! - **Explicit cascade:** Deleting a diet plan removes its foods, then its
//!   meals, then the plan, in one routine shared by both delete paths. The
//!   schema's `ON DELETE CASCADE` foreign keys enforce the same end state.
//!
//! ## Public API
//!
//! - `connect`: Builds the `PgPool` from [`configuration::DatabaseSettings`].
//! - `init_schema`: Creates the tables if they are absent.
//! - `DietStore`: The persistence operations the HTTP layer depends on.
//! - `DbRepository`: The PostgreSQL implementation of `DietStore`.
//! - `DbError`: The specific error types that can be returned from this crate.

// Declare the modules that constitute this crate.
pub mod connection;
pub mod error;
pub mod repository;
pub mod store;

// Re-export the key components to create a clean, public-facing API.
pub use connection::{connect, init_schema};
pub use error::DbError;
pub use repository::DbRepository;
pub use store::DietStore;
