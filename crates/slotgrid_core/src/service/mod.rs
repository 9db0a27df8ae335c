//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate expander and repository calls into use-case level APIs.
//! - Keep callers decoupled from storage details.

pub mod deletion_service;
pub mod materializer;
pub mod schedule_service;
pub mod template_service;
