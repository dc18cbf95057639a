use std::fmt;

use crate::colony::ledger::Amounts;

#[derive(Debug)]
pub enum Error {
    NotFound { kind: &'static str, id: String },
    UnlockNotMet { reason: String },
    InsufficientResources { needed: Amounts },
    InvalidPlacement { x: i32, y: i32 },
    NothingPending,
    MaxLevel { level: u32 },
    GameOver,
    BadRequest { message: String },
    Config { message: String },
    Save { message: String },
    Io(std::io::Error),
    Json(serde_json::Error),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::NotFound { kind, id } => write!(f, "unknown {kind}: {id}"),
            Error::UnlockNotMet { reason } => write!(f, "not unlocked: {reason}"),
            Error::InsufficientResources { needed } => {
                write!(f, "insufficient resources, needed:")?;
                for (id, amount) in needed {
                    write!(f, " {id}={amount}")?;
                }
                Ok(())
            }
            Error::InvalidPlacement { x, y } => write!(f, "cannot place building at ({x}, {y})"),
            Error::NothingPending => write!(f, "no building is waiting to be placed"),
            Error::MaxLevel { level } => write!(f, "building is already at max level {level}"),
            Error::GameOver => write!(f, "the colony is dead, reset to play again"),
            Error::BadRequest { message } => write!(f, "bad request: {message}"),
            Error::Config { message } => write!(f, "config error: {message}"),
            Error::Save { message } => write!(f, "save error: {message}"),
            Error::Io(e) => write!(f, "io error: {e}"),
            Error::Json(e) => write!(f, "json error: {e}"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Io(e) => Some(e),
            Error::Json(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Error::Io(e)
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Json(e)
    }
}
