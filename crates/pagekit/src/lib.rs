//! Pagekit: small helpers for browser pages.
//!
//! Each module is self-contained:
//!
//! - [`script_loader`] inserts external scripts at most once and fans
//!   completion callbacks out to every requester.
//! - [`debounce`] delays a function until calls stop arriving.
//! - [`price`] formats prices with locale-aware separators.
//! - [`viewport`] tests element visibility and measures the scrollbar.
//! - [`chunks`] walks a slice in sequential chunks with a failure policy.
//! - [`prop_scale`] builds a UI prop descriptor for scale values.
//! - [`clone`] deep-copies values through their JSON form.
//!
//! The host page is reached through the traits in [`dom`].

pub mod chunks;
pub mod clone;
pub mod config;
pub mod debounce;
pub mod dom;
pub mod error;
pub mod price;
pub mod prop_scale;
pub mod script_loader;
pub mod telemetry;
pub mod viewport;

pub use config::Config;
pub use error::{Error, Result};
