//! Command-line front end for AI failure autopsy
//!
//! The `autopsy` binary is a thin shell over [`Pipeline`]: it parses
//! [`Cli`], resolves config, builds an Ollama provider and hands the chosen
//! [`Command`] to [`commands::execute`].

#![warn(missing_docs)]
#![warn(unreachable_pub)]

pub mod cli;
pub mod commands;
pub mod logging;
pub mod pipeline;

pub use cli::{Cli, Command};
pub use pipeline::{Pipeline, RunReport};
