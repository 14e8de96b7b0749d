use chrono::NaiveDate;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RoomError {
    #[error("not initialized: run 'drinkroom init'")]
    NotInitialized,

    #[error("room for {date} already decided; draw again with force_reroll to reopen it")]
    AlreadyDecided { date: NaiveDate },

    #[error("vendor already exists: {0}")]
    VendorExists(String),

    #[error("no active vendors in region '{region}'")]
    NoEligibleVendors { region: String },

    #[error("session not found: {0}")]
    SessionNotFound(String),

    #[error("vendor not found: {0}")]
    VendorNotFound(String),

    #[error("invalid order: {0}")]
    Validation(String),

    #[error("invalid sweetness '{0}'")]
    InvalidSweetness(String),

    #[error("invalid ice level '{0}'")]
    InvalidIceLevel(String),

    #[error("invalid topping '{0}'")]
    InvalidTopping(String),

    #[error("invalid date '{0}': expected YYYY-MM-DD")]
    InvalidDate(String),

    #[error("storage error: {0}")]
    Persistence(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

/// Coarse classification callers branch on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Conflict,
    NotFound,
    Validation,
    Persistence,
}

impl RoomError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            RoomError::AlreadyDecided { .. } | RoomError::VendorExists(_) => ErrorKind::Conflict,
            RoomError::NoEligibleVendors { .. }
            | RoomError::SessionNotFound(_)
            | RoomError::VendorNotFound(_) => ErrorKind::NotFound,
            RoomError::NotInitialized
            | RoomError::Validation(_)
            | RoomError::InvalidSweetness(_)
            | RoomError::InvalidIceLevel(_)
            | RoomError::InvalidTopping(_)
            | RoomError::InvalidDate(_) => ErrorKind::Validation,
            RoomError::Persistence(_)
            | RoomError::Io(_)
            | RoomError::Yaml(_)
            | RoomError::Json(_) => ErrorKind::Persistence,
        }
    }

    pub(crate) fn storage(e: impl std::fmt::Display) -> Self {
        RoomError::Persistence(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, RoomError>;
