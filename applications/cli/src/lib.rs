//! Preludio CLI - command-line host for the session player
//!
//! Runs scripted sessions against a simulated embed, persisting state to a
//! directory the way a page persists it to `localStorage`, so consecutive
//! invocations behave like page reloads.

pub mod config;
pub mod error;
pub mod script;
pub mod session;

pub use config::CliConfig;
pub use error::{CliError, Result};
pub use script::{parse_script, Command};
pub use session::Session;
