//! Shared database repository test infrastructure
//!
//! Tests are organized as shared async functions that take `&dyn XxxRepo`,
//! plus SQLite-specific wrappers that run them against fast in-memory
//! databases with the real migrations applied.

mod files;
