use std::time::Duration;

/// Everything that can go wrong while evaluating one test case.
///
/// The runner's recovery policy hangs off these variants: `Incomplete` and
/// `MalformedTranscript` skip the case, `Unimplemented` skips the rest of
/// the containing suite, and the remaining variants abort the whole run.
#[derive(Debug, thiserror::Error)]
pub enum RunError {
    /// The transcript did not split into the expected number of
    /// prompt-delimited segments, so no pass/fail verdict is possible.
    #[error("couldn't evaluate {cmd:?}: expected {expected} output segments, got {got}")]
    MalformedTranscript {
        cmd: String,
        expected: usize,
        got: usize,
        stdout: String,
    },

    /// The command on its own does not form a complete toplevel statement
    /// (it swallowed the quit directive), likely a missing `;;`.
    #[error("incomplete OCaml expression: {cmd:?}")]
    Incomplete { cmd: String },

    /// A "not implemented" stub exception.
    #[error("{diagnostic}: {cmd:?}")]
    Unimplemented { diagnostic: String, cmd: String },

    /// A genuine interpreter error or raised exception.
    #[error("{diagnostic}")]
    Fault { diagnostic: String },

    /// The interpreter did not exit within the bound.
    #[error("interpreter timed out after {:?}", .limit)]
    Timeout { limit: Duration },

    #[error("failed to start interpreter '{program}'")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl RunError {
    /// Fatal conditions terminate the entire remaining run; the rest are
    /// recovered with a case- or suite-scoped skip.
    pub fn is_fatal(&self) -> bool {
        !matches!(
            self,
            RunError::MalformedTranscript { .. }
                | RunError::Incomplete { .. }
                | RunError::Unimplemented { .. }
        )
    }
}
