use serde::Deserialize;

/// Conventional process exit code type used by this crate.
///
/// A value of 0 indicates success and a positive value is the status the script exited
/// with. A negative value means the process was killed by the signal with that number,
/// so `-9` is SIGKILL.
pub type ExitCode = i32;

/// How `sh` should run a script.
///
/// Each field can be overridden per call by the keyword argument of the same name, and
/// the defaults can be set in the `[sh]` table of the configuration file.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ShellOptions {
    /// Shell executable. A bare name is looked up on `PATH`.
    pub shell: String,
    /// When false, output is mirrored to the host's stdout/stderr while it is captured.
    pub silent: bool,
    /// When true, the child sees only the flattened environment.
    pub shield_env: bool,
    /// Separator joining nested keys into variable names.
    pub sep: String,
}

impl Default for ShellOptions {
    fn default() -> Self {
        Self {
            shell: "/bin/sh".to_string(),
            silent: false,
            shield_env: false,
            sep: "_".to_string(),
        }
    }
}

/// Everything a finished shell invocation produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShellOutput {
    pub stdout: String,
    pub stderr: String,
    pub exit_code: ExitCode,
}
