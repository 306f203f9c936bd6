//! # csvmesh app
//!
//! Command line front-end for the CSV to FBX converter.
//!
//! - [`CliArgs`] - clap arguments resolved into [`ConvertOptions`](csvmesh_core::ConvertOptions)
//! - [`run`] - Initializes logging, dispatches the conversion to a worker
//!   thread and reports its status until it completes
//!
//! ## Example
//!
//! ```ignore
//! use clap::Parser;
//! use csvmesh_app::{CliArgs, run};
//!
//! fn main() -> std::process::ExitCode {
//!     run(CliArgs::parse())
//! }
//! ```

mod args;
mod error;
mod runner;

pub use args::CliArgs;
pub use error::AppError;
pub use runner::{POLL_INTERVAL, STATUS_INTERVAL, execute, run};

/// App version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
