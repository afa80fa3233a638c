//! Host builtins registered into the interpreter's globals.
//!
//! - `sh(script, shell=?, shield_env=?, silent=?, sep=?, env=?)` runs `script` and returns
//!   `[stdout, stderr, exit_code]`.
//! - `file.read(path)` returns a file's contents.
//! - `file.write(path, content)` replaces a file's contents.
//!
//! Defaults for `sh` come from the [`Context`] the host attaches to the evaluator.

use crate::command::ShellOptions;
use crate::env::flatten;
use crate::error::Error;
use crate::external;
use crate::value::Value;
use starlark::any::ProvidesStaticType;
use starlark::environment::{Globals, GlobalsBuilder, LibraryExtension};
use starlark::eval::Evaluator;
use starlark::starlark_module;
use starlark::values::Value as StarlarkValue;
use starlark::values::list::AllocList;
use starlark::values::none::NoneType;
use std::fs::File;
use std::io::Write;
use std::path::Path;

/// Host state visible to builtins, attached to each evaluator through `Evaluator::extra`.
#[derive(Debug, Clone, ProvidesStaticType)]
pub struct Context {
    /// Options used when `sh` is called without the corresponding keyword.
    pub options: ShellOptions,
    /// Environment dict used when `sh` is called without `env=`.
    pub env: Value,
}

impl Default for Context {
    fn default() -> Self {
        Self {
            options: ShellOptions::default(),
            env: Value::Dict(Vec::new()),
        }
    }
}

/// The standard globals plus `sh` and the `file` namespace.
pub fn globals() -> Globals {
    GlobalsBuilder::extended_by(&[
        LibraryExtension::StructType,
        LibraryExtension::SetType,
        LibraryExtension::Json,
        LibraryExtension::Print,
        LibraryExtension::Map,
        LibraryExtension::Filter,
        LibraryExtension::Partial,
    ])
    .with(register)
    .build()
}

/// Register the host builtins into `builder`.
pub fn register(builder: &mut GlobalsBuilder) {
    sh_builtin(builder);
    builder.namespace("file", file_builtins);
}

fn expect_str<'v>(
    builtin: &'static str,
    what: &str,
    value: StarlarkValue<'v>,
) -> Result<&'v str, Error> {
    value.unpack_str().ok_or_else(|| {
        Error::arity(
            builtin,
            format!("{what} must be a string, got {}", value.get_type()),
        )
    })
}

#[starlark_module]
fn sh_builtin(builder: &mut GlobalsBuilder) {
    /// Run `script` with `shell -c` and return `[stdout, stderr, exit_code]`.
    ///
    /// `env` (a dict) is flattened into environment variables, nested keys joined with
    /// `sep`. A negative exit code is the number of the signal that killed the shell.
    fn sh<'v>(
        #[starlark(require = pos)] script: StarlarkValue<'v>,
        #[starlark(require = named)] shell: Option<&str>,
        #[starlark(require = named)] shield_env: Option<bool>,
        #[starlark(require = named)] silent: Option<bool>,
        #[starlark(require = named)] sep: Option<&str>,
        #[starlark(require = named)] env: Option<StarlarkValue<'v>>,
        eval: &mut Evaluator<'v, '_, '_>,
    ) -> anyhow::Result<StarlarkValue<'v>> {
        let script = expect_str("sh", "script", script)?;
        let context = eval
            .extra
            .and_then(|extra| extra.downcast_ref::<Context>())
            .cloned()
            .unwrap_or_default();

        let mut options = context.options;
        if let Some(shell) = shell {
            options.shell = shell.to_string();
        }
        if let Some(shield_env) = shield_env {
            options.shield_env = shield_env;
        }
        if let Some(silent) = silent {
            options.silent = silent;
        }
        if let Some(sep) = sep {
            options.sep = sep.to_string();
        }

        let heap = eval.heap();
        let env = match env {
            Some(env) => Value::from_starlark(env, heap)?,
            None => context.env,
        };
        let entries = flatten(&env, &options.sep)?;
        let out = external::run(script, &entries, &options)?;

        Ok(heap.alloc(AllocList([
            heap.alloc(out.stdout),
            heap.alloc(out.stderr),
            heap.alloc(out.exit_code),
        ])))
    }
}

#[starlark_module]
fn file_builtins(builder: &mut GlobalsBuilder) {
    /// Return the contents of the file at `path`.
    fn read<'v>(#[starlark(require = pos)] path: StarlarkValue<'v>) -> anyhow::Result<String> {
        let path = Path::new(expect_str("file.read", "path", path)?);
        let content = std::fs::read_to_string(path).map_err(|source| Error::FileIo {
            builtin: "file.read",
            path: path.to_path_buf(),
            source,
        })?;
        Ok(content)
    }

    /// Create or truncate the file at `path` and write `content` to it.
    fn write<'v>(
        #[starlark(require = pos)] path: StarlarkValue<'v>,
        #[starlark(require = pos)] content: StarlarkValue<'v>,
    ) -> anyhow::Result<NoneType> {
        let path = Path::new(expect_str("file.write", "path", path)?);
        let content = expect_str("file.write", "content", content)?;
        let io_error = |source| Error::FileIo {
            builtin: "file.write",
            path: path.to_path_buf(),
            source,
        };
        let mut f = File::create(path).map_err(io_error)?;
        f.write_all(content.as_bytes()).map_err(io_error)?;
        f.sync_all().map_err(io_error)?;
        Ok(NoneType)
    }
}
