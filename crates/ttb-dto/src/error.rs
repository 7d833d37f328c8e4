use serde::Deserialize;
use serde::Serialize;
use std::collections::BTreeMap;

/// Error taxonomy for request handlers (spec §7).
///
/// Every variant carries a stable `code()` for clients and a human-readable
/// `Display` message. Validation failures additionally carry field-level
/// `details`.
#[derive(Debug, Clone, thiserror::Error, Serialize, Deserialize)]
#[serde(tag = "code", content = "message", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ApiError {
    #[error("validation failed: {0}")]
    Validation(String),
    #[error("room not found")]
    RoomNotFound,
    #[error("room is not accepting players")]
    RoomNotAcceptingPlayers,
    #[error("room is full")]
    RoomFull,
    #[error("room cannot be started: {0}")]
    CannotStart(String),
    #[error("player not found")]
    PlayerNotFound,
    #[error("player is already in a game")]
    PlayerAlreadyInGame,
    #[error("invalid game state: {0}")]
    InvalidGameState(String),
    #[error("invalid action")]
    InvalidAction,
    #[error("tetris logic error: {0}")]
    TetrisLogic(String),
    #[error("store error: {0}")]
    StoreError(String),
}

impl ApiError {
    /// Stable machine-readable code for the `{success:false,error:{code,...}}` envelope.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Validation(_) => "VALIDATION",
            Self::RoomNotFound => "ROOM_NOT_FOUND",
            Self::RoomNotAcceptingPlayers => "ROOM_NOT_ACCEPTING_PLAYERS",
            Self::RoomFull => "ROOM_FULL",
            Self::CannotStart(_) => "CANNOT_START",
            Self::PlayerNotFound => "PLAYER_NOT_FOUND",
            Self::PlayerAlreadyInGame => "PLAYER_ALREADY_IN_GAME",
            Self::InvalidGameState(_) => "INVALID_GAME_STATE",
            Self::InvalidAction => "INVALID_ACTION",
            Self::TetrisLogic(_) => "TETRIS_LOGIC",
            Self::StoreError(_) => "STORE_ERROR",
        }
    }

    /// Validation error carrying field-level detail, per spec §7.
    pub fn validation(field: impl Into<String>, reason: impl Into<String>) -> Self {
        let field = field.into();
        let reason = reason.into();
        Self::Validation(format!("{field}: {reason}"))
    }
}

/// The `{success:false, error:{code, message}}` envelope shape (spec §6.1/§7).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorEnvelope {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<BTreeMap<String, String>>,
}

impl From<&ApiError> for ErrorEnvelope {
    fn from(err: &ApiError) -> Self {
        Self {
            code: err.code().to_string(),
            message: err.to_string(),
            details: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_are_stable() {
        assert_eq!(ApiError::RoomFull.code(), "ROOM_FULL");
        assert_eq!(ApiError::PlayerNotFound.code(), "PLAYER_NOT_FOUND");
    }

    #[test]
    fn validation_embeds_field() {
        let err = ApiError::validation("name", "must not be empty");
        assert!(err.to_string().contains("name"));
    }
}
