pub mod core;
pub mod play;

pub use core::{CoreError, CoreResult, Settings};
pub use play::{run_session, SessionSummary};
