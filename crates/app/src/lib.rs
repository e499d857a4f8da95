//! Roomly - command-line client for the hotel booking backend
//!
//! Wires the session layer to the reqwest transport and the session file,
//! and drives it from CLI subcommands.

pub mod app;
pub mod cli;
pub mod error;
pub mod shell;

pub use app::Roomly;
pub use cli::{Cli, Commands};
pub use error::AppError;
pub use shell::{AppShell, Navigator, route_allowed};
