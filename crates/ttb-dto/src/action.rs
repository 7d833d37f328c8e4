use serde::Deserialize;
use serde::Serialize;

/// The closed set of actions a client may issue against their own
/// `PlayerGameState` (spec §4.3, §9). Anything that doesn't decode into one
/// of these variants is rejected as `ApiError::InvalidAction` rather than
/// accepted as a duck-typed string — the original's `action: string` field
/// is explicitly not reproduced here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PlayerAction {
    MoveLeft,
    MoveRight,
    MoveDown,
    Rotate,
    HardDrop,
    Hold,
}

impl std::fmt::Display for PlayerAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        std::fmt::Debug::fmt(self, f)
    }
}

impl std::str::FromStr for PlayerAction {
    type Err = ();
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "moveLeft" => Ok(Self::MoveLeft),
            "moveRight" => Ok(Self::MoveRight),
            "moveDown" => Ok(Self::MoveDown),
            "rotate" => Ok(Self::Rotate),
            "hardDrop" => Ok(Self::HardDrop),
            "hold" => Ok(Self::Hold),
            _ => Err(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_action_string_is_rejected() {
        assert!("attack".parse::<PlayerAction>().is_err());
    }

    #[test]
    fn round_trips_through_json() {
        let action = PlayerAction::HardDrop;
        let json = serde_json::to_string(&action).unwrap();
        assert_eq!(json, "\"hardDrop\"");
        let back: PlayerAction = serde_json::from_str(&json).unwrap();
        assert_eq!(back, action);
    }
}
