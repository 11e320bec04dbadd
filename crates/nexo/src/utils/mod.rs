//! Shared utility functions.
//!
//! - `format`: human-readable formatting (sizes, money, dates)
//! - `de`: lenient deserializers for RPC boundary types

mod format;
pub mod de;

pub use format::{format_date, format_money, format_percent, format_size};
