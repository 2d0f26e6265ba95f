//! Domain layer containing business logic and domain types.
//!
//! # Module Organization
//!
//! - `receipt` - Extracted receipts, validation rules, provider output parsing, prompts

pub mod receipt;
