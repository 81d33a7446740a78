//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate repository calls into use-case level APIs.
//! - Keep callers (HTTP, admin tooling) decoupled from storage details.

pub mod project_service;
