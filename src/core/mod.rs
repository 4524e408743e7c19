//! Core module - Settings and error types shared by the `qchess` binary
//!
//! ## Module Organization
//!
//! - `error` - [`CoreError`] and [`CoreResult`]
//! - `settings_persistence` - Loading and saving [`Settings`] in the platform
//!   config directory

pub mod error;
pub mod settings_persistence;

pub use error::{CoreError, CoreResult};
pub use settings_persistence::{settings_path, Settings};
