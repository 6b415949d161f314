// whisper-relay - util/error.rs
//
// Typed error hierarchy with context-preserving error chains.
// No string-based error propagation; every error keeps its causal chain
// for diagnostic logging.

use std::fmt;
use std::io;
use std::path::PathBuf;

/// Top-level error type for all whisper-relay operations.
/// Errors are categorised by the subsystem that produced them.
#[derive(Debug)]
pub enum WhisperRelayError {
    /// Locating the game client log failed.
    Locate(LocateError),

    /// Tailing the client log failed.
    Tail(TailError),

    /// A Telegram API call failed.
    Telegram(TelegramError),

    /// Window focus or input synthesis failed.
    Automation(AutomationError),
}

impl fmt::Display for WhisperRelayError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Locate(e) => write!(f, "Client lookup error: {e}"),
            Self::Tail(e) => write!(f, "Tail error: {e}"),
            Self::Telegram(e) => write!(f, "Telegram error: {e}"),
            Self::Automation(e) => write!(f, "Automation error: {e}"),
        }
    }
}

impl std::error::Error for WhisperRelayError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Locate(e) => Some(e),
            Self::Tail(e) => Some(e),
            Self::Telegram(e) => Some(e),
            Self::Automation(e) => Some(e),
        }
    }
}

// ---------------------------------------------------------------------------
// Locate errors
// ---------------------------------------------------------------------------

/// Errors from the one-shot client log lookup. All are fatal at startup.
#[derive(Debug)]
pub enum LocateError {
    /// No running process matched the known client executable names.
    ClientNotRunning,

    /// A client process was found but the derived log path does not exist.
    LogMissing { path: PathBuf },
}

impl fmt::Display for LocateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ClientNotRunning => {
                write!(f, "No running Path of Exile client process found")
            }
            Self::LogMissing { path } => {
                write!(
                    f,
                    "Client process found but log file '{}' does not exist",
                    path.display()
                )
            }
        }
    }
}

impl std::error::Error for LocateError {}

impl From<LocateError> for WhisperRelayError {
    fn from(e: LocateError) -> Self {
        Self::Locate(e)
    }
}

// ---------------------------------------------------------------------------
// Tail errors
// ---------------------------------------------------------------------------

/// Errors from the log tail reader. Fatal to the pipeline loop: the file is
/// never reopened, the operator restarts the process.
#[derive(Debug)]
pub enum TailError {
    /// I/O error with path context.
    Io {
        path: PathBuf,
        operation: &'static str,
        source: io::Error,
    },
}

impl fmt::Display for TailError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io {
                path,
                operation,
                source,
            } => write!(
                f,
                "I/O error during {operation} on '{}': {source}",
                path.display()
            ),
        }
    }
}

impl std::error::Error for TailError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
        }
    }
}

impl From<TailError> for WhisperRelayError {
    fn from(e: TailError) -> Self {
        Self::Tail(e)
    }
}

// ---------------------------------------------------------------------------
// Telegram errors
// ---------------------------------------------------------------------------

/// Errors from the Telegram Bot API. Always logged and swallowed at the
/// call site: a failed send is dropped, never retried or queued.
#[derive(Debug)]
pub enum TelegramError {
    /// The HTTP request itself failed (connection, TLS, ...).
    Transport(reqwest::Error),

    /// The API answered with a non-success status.
    Status { status: u16, body: String },

    /// The getUpdates response did not have the expected shape.
    MalformedUpdate { reason: String },
}

impl fmt::Display for TelegramError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Transport(e) => write!(f, "Transport failure: {e}"),
            Self::Status { status, body } => {
                write!(f, "API returned status {status}: {body}")
            }
            Self::MalformedUpdate { reason } => {
                write!(f, "Malformed getUpdates response: {reason}")
            }
        }
    }
}

impl std::error::Error for TelegramError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Transport(e) => Some(e),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for TelegramError {
    fn from(e: reqwest::Error) -> Self {
        Self::Transport(e)
    }
}

impl From<TelegramError> for WhisperRelayError {
    fn from(e: TelegramError) -> Self {
        Self::Telegram(e)
    }
}

// ---------------------------------------------------------------------------
// Automation errors
// ---------------------------------------------------------------------------

/// Errors from window focus and input synthesis. Callers distinguish the
/// variants: a missing window is expected while the game is closed, a
/// rejected input batch points at OS-level input blocking.
#[derive(Debug)]
pub enum AutomationError {
    /// No visible top-level window matched the game title fragment.
    WindowNotFound,

    /// The window exists but could not be brought to the foreground.
    FocusDenied,

    /// The OS accepted fewer synthesized input events than were sent.
    InputRejected { sent: usize, expected: usize },

    /// Input synthesis is not available on this platform.
    Unsupported,
}

impl fmt::Display for AutomationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::WindowNotFound => write!(f, "Game window not found"),
            Self::FocusDenied => write!(f, "Game window could not be focused"),
            Self::InputRejected { sent, expected } => {
                write!(f, "OS accepted {sent} of {expected} input events")
            }
            Self::Unsupported => {
                write!(f, "Window automation is not supported on this platform")
            }
        }
    }
}

impl std::error::Error for AutomationError {}

impl From<AutomationError> for WhisperRelayError {
    fn from(e: AutomationError) -> Self {
        Self::Automation(e)
    }
}

/// Convenience type alias for whisper-relay results.
pub type Result<T> = std::result::Result<T, WhisperRelayError>;
