//! Domain model for person records and their communication address.
//!
//! # Responsibility
//! - Define raw input, validated, and read-side shapes for person data.
//! - Own the field validation rules that gate every write.
//!
//! # Invariants
//! - Validated shapes can only be produced by `validation`.
//! - Read-side views never carry a password.

pub mod person;
pub mod validation;
