//! Core use-case services.
//!
//! # Responsibility
//! - Validate caller input and orchestrate store calls into use-case APIs.
//! - Keep presentation layers decoupled from storage details.

pub mod task_service;
pub mod task_view;
