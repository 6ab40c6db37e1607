/// Failure category for a forecast run.
///
/// Every fallible operation maps into exactly one of these, so callers
/// (and tests) can tell a bad local payload from a remote failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Missing/invalid startup configuration (credentials, flags, paths).
    Config,
    /// User-supplied payload (inline JSON or history CSV) is unusable.
    MalformedInput,
    /// Transport-level failure before an HTTP status was obtained.
    Network,
    /// The remote service answered with a non-2xx status.
    RemoteModel,
    /// The response body could not be decoded into forecast rows.
    Parse,
}

impl ErrorKind {
    /// Process exit code for CLI runs.
    pub fn exit_code(self) -> u8 {
        match self {
            ErrorKind::Config | ErrorKind::MalformedInput => 2,
            ErrorKind::Network => 4,
            ErrorKind::RemoteModel => 5,
            ErrorKind::Parse => 6,
        }
    }
}

#[derive(Clone)]
pub struct AppError {
    kind: ErrorKind,
    message: String,
}

impl AppError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    pub fn exit_code(&self) -> u8 {
        self.kind.exit_code()
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::fmt::Debug for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppError")
            .field("kind", &self.kind)
            .field("message", &self.message)
            .finish()
    }
}

impl std::error::Error for AppError {}
