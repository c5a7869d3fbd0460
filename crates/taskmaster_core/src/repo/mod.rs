//! Repository layer abstractions and persistence implementations.
//!
//! # Responsibility
//! - Define the durable CRUD contract the task service depends on.
//! - Isolate SQLite query details from service/business orchestration.
//!
//! # Invariants
//! - Repository APIs return semantic errors (`NotFound`) in addition to DB
//!   transport errors.

pub mod task_store;
