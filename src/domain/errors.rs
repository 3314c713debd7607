use std::fmt;

// Failure reported by the hosted backend collaborator.
#[derive(Debug, Clone, PartialEq)]
pub enum BackendError {
    Transport(String),
    Upstream {
        status: u16,
        message: Option<String>,
    },
    Decode(String),
}

impl fmt::Display for BackendError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BackendError::Transport(err) => write!(f, "backend transport error: {err}"),
            BackendError::Upstream { status, message } => {
                if let Some(message) = message {
                    write!(f, "backend upstream error {status}: {message}")
                } else {
                    write!(f, "backend upstream error {status}")
                }
            }
            BackendError::Decode(err) => write!(f, "backend response decode error: {err}"),
        }
    }
}

impl std::error::Error for BackendError {}

// Domain-level errors for ledger workflows.
#[derive(Debug, Clone, PartialEq)]
pub enum LedgerError {
    MissingName,
    IncompleteCredit,
    InvalidAmount,
    PlayerNotFound,
    SessionUnavailable(BackendError),
    Backend(BackendError),
    // The deposit row was written but the balance write failed after it.
    BalanceNotUpdated(BackendError),
}

impl fmt::Display for LedgerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LedgerError::MissingName => write!(f, "player name is required"),
            LedgerError::IncompleteCredit => write!(f, "player and amount are required"),
            LedgerError::InvalidAmount => write!(f, "amount must be a finite number"),
            LedgerError::PlayerNotFound => write!(f, "player is not in the loaded list"),
            LedgerError::SessionUnavailable(err) => write!(f, "session unavailable: {err}"),
            LedgerError::Backend(err) => write!(f, "{err}"),
            LedgerError::BalanceNotUpdated(err) => {
                write!(f, "deposit recorded but balance update failed: {err}")
            }
        }
    }
}

impl std::error::Error for LedgerError {}
