//! Configuration file.
//!
//! ```toml
//! [sh]
//! shell = "/bin/bash"
//! sep = "__"
//!
//! [env]
//! GREETING = "hi"
//! db = { host = "localhost", port = 5432 }
//! ```
//!
//! `[sh]` sets the defaults of the `sh` keyword arguments and `[env]` is the environment
//! dict `sh` flattens when a call passes no `env=`.

use crate::builtins::Context;
use crate::command::ShellOptions;
use crate::value::Value;
use anyhow::{Context as _, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub sh: ShellOptions,
    pub env: toml::Table,
}

impl Config {
    pub fn parse(text: &str) -> Result<Self> {
        Ok(toml::from_str(text)?)
    }

    /// Load configuration.
    ///
    /// An explicit `path` must exist. Without one, `~/.config/starish/config.toml` is used
    /// when present and built-in defaults otherwise.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path = match path {
            Some(p) => p.to_path_buf(),
            None => match Self::default_path() {
                Some(p) if p.is_file() => p,
                _ => {
                    tracing::debug!("no config file, using defaults");
                    return Ok(Self::default());
                }
            },
        };
        let text = std::fs::read_to_string(&path)
            .with_context(|| format!("can't read config {}", path.display()))?;
        let config = Self::parse(&text)
            .with_context(|| format!("invalid config {}", path.display()))?;
        tracing::debug!(path = %path.display(), "loaded config");
        Ok(config)
    }

    fn default_path() -> Option<PathBuf> {
        let home = std::env::var_os("HOME")?;
        Some(Path::new(&home).join(".config/starish/config.toml"))
    }

    /// The builtin context this configuration describes.
    pub fn into_context(self) -> Context {
        Context {
            options: self.sh,
            env: Value::from(self.env),
        }
    }
}
