//! Core use-case services.
//!
//! # Responsibility
//! - Gate every write behind the field validator.
//! - Orchestrate repository calls into use-case level APIs.
//! - Keep UI/FFI layers decoupled from storage details.

pub mod auth_service;
pub mod person_service;
