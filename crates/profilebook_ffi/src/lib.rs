//! UI-facing bridge over `profilebook_core`.

pub mod api;
