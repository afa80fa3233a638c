//! A Starlark shell with host-interaction builtins.
//!
//! This crate embeds the [`starlark`] interpreter and extends it with a small set of
//! builtins that let scripts talk to the host: `sh` runs a shell script with an
//! environment built from a Starlark dict, and `file.read` / `file.write` move text
//! in and out of files.
//!
//! The interesting parts live in three modules:
//! - [`env`] flattens a nested [`Value`] into `NAME=VALUE` entries for a child process.
//! - [`external`] spawns the shell, captures its output and reports its exit code.
//! - [`call`] turns command-line words into a Starlark call expression, so that
//!   `starish build.star deploy --env prod` invokes `deploy(env="prod")`.
//!
//! [`Interpreter`] ties them together and is what the `starish` binary drives.

pub mod builtins;
pub mod call;
pub mod command;
pub mod config;
pub mod env;
mod error;
pub mod external;
mod interpreter;
mod io_adapters;
pub mod repl;
pub mod value;

pub use error::Error;
/// Just a convenient re-export of the script runner.
///
/// See [`Interpreter`] for the high-level API.
pub use interpreter::{Interpreter, Profile, public_globals};
pub use value::Value;
