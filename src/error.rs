use std::io;
use std::path::PathBuf;

/// Errors raised by the host builtins.
///
/// Every variant is recoverable: when a builtin fails, the error is handed back to the
/// interpreter, which reports it as an ordinary call error at the offending call site.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The environment passed to `sh` was not a dict.
    #[error("sh: environment must be a dict, got {0}")]
    InvalidEnvironmentShape(String),

    /// A value passed to `sh` contains itself, so it has no finite flattening.
    #[error("sh: environment {0} contains itself")]
    CyclicValue(String),

    /// A builtin was called with the wrong number or type of arguments.
    #[error("{builtin}: {message}")]
    Arity {
        builtin: &'static str,
        message: String,
    },

    /// The shell process could not be started at all.
    #[error("sh: cannot run {shell}: {source}")]
    ShellExecution {
        shell: String,
        #[source]
        source: io::Error,
    },

    /// Reading or writing a file failed.
    #[error("{builtin}: {}: {source}", .path.display())]
    FileIo {
        builtin: &'static str,
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl Error {
    pub(crate) fn arity(builtin: &'static str, message: impl Into<String>) -> Self {
        Error::Arity {
            builtin,
            message: message.into(),
        }
    }
}
