//! Running scripts in an external shell.

use crate::command::{ExitCode, ShellOptions, ShellOutput};
use crate::env::EnvEntry;
use crate::error::Error;
use crate::io_adapters::Tee;
use std::ffi::OsStr;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use std::process::{Command, ExitStatus, Stdio};
use std::thread;

/// Run `script` with `options.shell -c`, capturing stdout, stderr and the exit code.
///
/// The child environment is the host's environment overlaid with `env`, or just `env`
/// when `options.shield_env` is set. Unless `options.silent` is set, output is also
/// mirrored to the host's stdout and stderr while the script runs.
///
/// A script that exits non-zero is still a successful run; only a shell that cannot be
/// started at all is an error.
pub fn run(script: &str, env: &[EnvEntry], options: &ShellOptions) -> Result<ShellOutput, Error> {
    if options.silent {
        run_mirrored(script, env, options, None::<io::Stdout>, None::<io::Stderr>)
    } else {
        run_mirrored(
            script,
            env,
            options,
            Some(io::stdout()),
            Some(io::stderr()),
        )
    }
}

/// Like [`run`], but mirrors output into the given sinks instead of the host's streams.
///
/// `options.silent` is not consulted; pass `None` to capture without mirroring.
pub fn run_mirrored<O, E>(
    script: &str,
    env: &[EnvEntry],
    options: &ShellOptions,
    stdout_mirror: Option<O>,
    stderr_mirror: Option<E>,
) -> Result<ShellOutput, Error>
where
    O: Write + Send,
    E: Write + Send,
{
    let spawn_error = |source: io::Error| Error::ShellExecution {
        shell: options.shell.clone(),
        source,
    };

    let search_paths = std::env::var_os("PATH").unwrap_or_default();
    let shell = resolve_shell(&search_paths, &options.shell)
        .ok_or_else(|| spawn_error(io::Error::from(io::ErrorKind::NotFound)))?;

    let mut cmd = Command::new(&shell);
    cmd.arg("-c")
        .arg(script)
        .stdin(Stdio::inherit())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped());
    if options.shield_env {
        cmd.env_clear();
    }
    cmd.envs(env.iter().map(|e| (e.name.as_str(), e.value.as_str())));

    tracing::debug!(
        shell = %shell.display(),
        vars = env.len(),
        shield_env = options.shield_env,
        "spawning shell"
    );
    let mut child = cmd.spawn().map_err(spawn_error)?;

    let child_stdout = child.stdout.take();
    let child_stderr = child.stderr.take();
    let (stdout, stderr) = thread::scope(|s| {
        let out = s.spawn(move || drain(child_stdout, Tee::new(stdout_mirror)));
        let err = s.spawn(move || drain(child_stderr, Tee::new(stderr_mirror)));
        (join(out), join(err))
    });
    let status = child.wait().map_err(spawn_error)?;

    let exit_code = match status.code() {
        Some(x) => x,
        None => terminated_by_signal(status),
    };
    tracing::debug!(exit_code, "shell finished");

    Ok(ShellOutput {
        stdout,
        stderr,
        exit_code,
    })
}

/// Read `pipe` to the end. The shell already runs, so a failed read only truncates
/// what was captured.
fn drain<R: Read, W: Write>(pipe: Option<R>, mut tee: Tee<W>) -> String {
    if let Some(mut pipe) = pipe {
        if let Err(e) = io::copy(&mut pipe, &mut tee) {
            tracing::warn!(error = %e, "reading shell output failed");
        }
    }
    tee.into_string()
}

fn join(handle: thread::ScopedJoinHandle<'_, String>) -> String {
    handle.join().unwrap_or_else(|_| {
        tracing::warn!("output reader panicked");
        String::new()
    })
}

#[cfg(unix)]
fn terminated_by_signal(exit_status: ExitStatus) -> ExitCode {
    use std::os::unix::process::ExitStatusExt;
    match ExitStatusExt::signal(&exit_status) {
        Some(signal) => -signal,
        None => -1,
    }
}

#[cfg(not(unix))]
fn terminated_by_signal(_exit_status: ExitStatus) -> ExitCode {
    -1
}

/// Locate the shell executable.
///
/// A name containing a path separator is used as given and must exist. A bare name such
/// as `bash` is looked up in each directory of `search_paths`, first match wins.
pub fn resolve_shell(search_paths: &OsStr, shell: &str) -> Option<PathBuf> {
    let shell = Path::new(shell);
    match shell.components().count() {
        0 => None,
        1 if !shell.is_absolute() => std::env::split_paths(search_paths)
            .map(|dir| dir.join(shell))
            .find(|candidate| candidate.is_file()),
        _ => shell.exists().then(|| shell.to_path_buf()),
    }
}
