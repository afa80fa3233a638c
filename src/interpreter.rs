use crate::builtins::{self, Context};
use crate::call;
use anyhow::{Context as _, Result};
use starlark::environment::{FrozenModule, Globals, Module};
use starlark::eval::{Evaluator, ProfileMode, ReturnFileLoader};
use starlark::syntax::{AstModule, Dialect};
use std::collections::HashMap;
use std::path::PathBuf;

/// Where and how to profile script execution.
pub struct Profile {
    pub mode: ProfileMode,
    pub path: PathBuf,
}

/// Runs Starlark programs with the host builtins available.
///
/// The interpreter owns the globals and the [`Context`] handed to builtins. Programs are
/// evaluated into caller-provided [`Module`]s so that their globals can be inspected, fed
/// to a REPL, or frozen and loaded by a generated call.
///
/// Example
/// ```
/// use starish::Interpreter;
/// use starlark::environment::Module;
///
/// let interp = Interpreter::default();
/// let module = Module::new();
/// interp.exec("demo.star", "x = 1 + 2".to_string(), &module).unwrap();
/// assert_eq!(module.get("x").unwrap().unpack_i32(), Some(3));
/// ```
pub struct Interpreter {
    globals: Globals,
    context: Context,
    profile: Option<Profile>,
}

impl Interpreter {
    /// Create an interpreter whose builtins use `context` for their defaults.
    pub fn new(context: Context) -> Self {
        Self {
            globals: builtins::globals(),
            context,
            profile: None,
        }
    }

    /// Profile every subsequent evaluation, overwriting `profile.path` each time.
    ///
    /// The profiler lives in a single evaluator, so a host that both executes a script
    /// and calls into it attaches the profile to the one evaluation it wants measured.
    pub fn with_profile(mut self, profile: Profile) -> Self {
        self.profile = Some(profile);
        self
    }

    pub fn dialect() -> Dialect {
        Dialect::Extended
    }

    /// Execute `source` as the body of `module`.
    ///
    /// Returns the value of the last statement if it was an expression other than `None`,
    /// rendered with `repr`.
    pub fn exec(&self, filename: &str, source: String, module: &Module) -> Result<Option<String>> {
        let ast = AstModule::parse(filename, source, &Self::dialect()).map_err(starlark::Error::into_anyhow)?;
        let mut eval = Evaluator::new(module);
        eval.extra = Some(&self.context);
        self.eval(&mut eval, ast)
    }

    /// Freeze `module` (the result of executing `filename`) and call `target` in it with
    /// arguments built from command-line words.
    ///
    /// The call runs as a separate program that `load`s `target` from `filename`.
    pub fn call(
        &self,
        filename: &str,
        module: Module,
        target: &str,
        args: &[String],
    ) -> Result<Option<String>> {
        let frozen: FrozenModule = module.freeze()?;
        let expr = call::build(target, args);
        let program = call::program(filename, target, &expr);
        tracing::debug!(%program, "calling target");

        let modules = HashMap::from([(filename, &frozen)]);
        let loader = ReturnFileLoader { modules: &modules };
        let ast = AstModule::parse("<call>", program, &Self::dialect()).map_err(starlark::Error::into_anyhow)?;

        let caller = Module::new();
        let mut eval = Evaluator::new(&caller);
        eval.extra = Some(&self.context);
        eval.set_loader(&loader);
        self.eval(&mut eval, ast)
            .with_context(|| format!("calling {expr}"))
    }

    fn eval(&self, eval: &mut Evaluator, ast: AstModule) -> Result<Option<String>> {
        if let Some(profile) = &self.profile {
            eval.enable_profile(&profile.mode)?;
        }
        let value = eval.eval_module(ast, &self.globals).map_err(starlark::Error::into_anyhow)?;
        let shown = if value.is_none() {
            None
        } else {
            Some(value.to_repr())
        };
        if let Some(profile) = &self.profile {
            eval.gen_profile().map_err(starlark::Error::into_anyhow)?.write(&profile.path).map_err(starlark::Error::into_anyhow)?;
            tracing::info!(path = %profile.path.display(), "wrote profile");
        }
        Ok(shown)
    }
}

impl Default for Interpreter {
    fn default() -> Self {
        Self::new(Context::default())
    }
}

/// Globals of `module` that do not start with `_`, sorted by name, as `(name, repr)`.
pub fn public_globals(module: &Module) -> Vec<(String, String)> {
    let mut names: Vec<String> = module
        .names()
        .map(|name| name.as_str().to_string())
        .filter(|name| !name.starts_with('_'))
        .collect();
    names.sort();
    names
        .into_iter()
        .filter_map(|name| module.get(&name).map(|v| (name, v.to_repr())))
        .collect()
}
