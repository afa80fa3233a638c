//! starish CLI entry point.
//!
//! Usage:
//!   starish                               # Interactive REPL
//!   starish -c <prog> [FUNCTION ARGS...]  # Execute program text
//!   starish script.star                   # Run a script
//!   starish script.star deploy --env prod # Run a script, then call deploy(env="prod")

use anyhow::{Context, Result, bail};
use argh::FromArgs;
use starish::config::Config;
use starish::{Interpreter, Profile, public_globals, repl};
use starlark::environment::Module;
use starlark::eval::ProfileMode;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

#[derive(FromArgs)]
/// A Starlark shell with `sh`, `file.read` and `file.write` builtins.
///
/// Without a file or -c, starts an interactive session.
struct Args {
    #[argh(option, short = 'c')]
    /// execute program text; positional words then name a function and its arguments
    program: Option<String>,

    #[argh(switch, short = 'i')]
    /// start the interactive session after executing the file or program
    interactive: bool,

    #[argh(switch)]
    /// on success, print the final global environment to stderr
    showenv: bool,

    #[argh(option)]
    /// configuration file (default: ~/.config/starish/config.toml)
    config: Option<PathBuf>,

    #[argh(option)]
    /// gather a time flame profile in this file
    profile: Option<PathBuf>,

    #[argh(option)]
    /// gather a per-statement profile in this file
    cpuprofile: Option<PathBuf>,

    #[argh(option)]
    /// gather a heap allocation summary in this file
    memprofile: Option<PathBuf>,

    #[argh(positional, greedy)]
    /// script file (unless -c is given), then a function to call and its arguments;
    /// options must come before these words
    words: Vec<String>,
}

impl Args {
    /// Split the positional words into the script file and the call that follows it.
    ///
    /// With -c there is no file and every word belongs to the call.
    fn script_and_call(&self) -> (Option<&str>, &[String]) {
        match (&self.program, self.words.split_first()) {
            (Some(_), _) => (None, &self.words),
            (None, Some((file, call))) => (Some(file.as_str()), call),
            (None, None) => (None, &[]),
        }
    }

    fn profile(&self) -> Result<Option<Profile>> {
        let requested = [
            (ProfileMode::TimeFlame, &self.profile),
            (ProfileMode::Statement, &self.cpuprofile),
            (ProfileMode::HeapSummaryAllocated, &self.memprofile),
        ];
        let mut chosen = None;
        for (mode, path) in requested {
            let Some(path) = path else { continue };
            if chosen.is_some() {
                bail!("only one of --profile, --cpuprofile and --memprofile may be given");
            }
            chosen = Some(Profile {
                mode,
                path: path.clone(),
            });
        }
        Ok(chosen)
    }
}

fn main() -> ExitCode {
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::try_from_env("STARISH_LOG").unwrap_or_else(|_| EnvFilter::new("warn")))
        .init();

    let args: Args = argh::from_env();
    match run(args) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("starish: {e:?}");
            ExitCode::FAILURE
        }
    }
}

fn run(args: Args) -> Result<ExitCode> {
    let config = Config::load(args.config.as_deref())?;
    let mut interp = Interpreter::new(config.into_context());
    let mut profile = args.profile()?;

    let (file, call) = args.script_and_call();
    let (filename, source) = match (&args.program, file) {
        (Some(program), _) => ("cmdline".to_string(), program.clone()),
        (None, Some(file)) => {
            let source = std::fs::read_to_string(file)
                .with_context(|| format!("can't read {file}"))?;
            (file.to_string(), source)
        }
        (None, None) => {
            if let Some(profile) = profile {
                interp = interp.with_profile(profile);
            }
            println!("Welcome to Starish {}", env!("CARGO_PKG_VERSION"));
            repl::run(&interp, &Module::new())?;
            return Ok(ExitCode::SUCCESS);
        }
    };

    if args.interactive && !call.is_empty() {
        bail!("-i cannot be combined with a function call");
    }

    // When a function is called, the profile covers the call instead of the script body.
    if call.is_empty() {
        if let Some(profile) = profile.take() {
            interp = interp.with_profile(profile);
        }
    }

    let module = Module::new();
    if let Err(e) = interp.exec(&filename, source, &module) {
        eprintln!("{e:?}");
        return Ok(ExitCode::FAILURE);
    }

    if args.showenv {
        for (name, repr) in public_globals(&module) {
            eprintln!("{name} = {repr}");
        }
    }

    if args.interactive {
        repl::run(&interp, &module)?;
        return Ok(ExitCode::SUCCESS);
    }

    if let Some((target, words)) = call.split_first() {
        if let Some(profile) = profile {
            interp = interp.with_profile(profile);
        }
        match interp.call(&filename, module, target, words) {
            Ok(Some(repr)) => println!("{repr}"),
            Ok(None) => {}
            Err(e) => {
                eprintln!("{e:?}");
                return Ok(ExitCode::FAILURE);
            }
        }
    }

    Ok(ExitCode::SUCCESS)
}
