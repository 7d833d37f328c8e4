use crate::PlayerState;
use ttb_dto::GameStateSnapshot;

/// Wire projection of a `PlayerState` (spec §3.1 `PlayerGameState`). Lives
/// here, rather than alongside `GameStateSnapshot` in `ttb-dto`, because
/// `PlayerState` is the local type in this `impl From` — `ttb-dto` has no
/// dependency on `ttb-simulation` (that would be circular, since this crate
/// already depends on `ttb-dto` for `PlayerAction`).
impl From<&PlayerState> for GameStateSnapshot {
    fn from(state: &PlayerState) -> Self {
        Self {
            player_id: state.player_id,
            room_id: state.room_id,
            board: state.board.clone(),
            current_piece: state.current_piece,
            next_piece: state.next_piece,
            held_piece: state.held_piece,
            can_hold: state.can_hold,
            ghost_piece: state.ghost_piece,
            score: state.score,
            level: state.level,
            lines_cleared: state.lines_cleared,
            game_over: state.game_over,
            paused: state.paused,
            game_started: state.game_started,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ttb_core::Id;

    #[test]
    fn snapshot_mirrors_player_state_fields() {
        let state = PlayerState::initial(Id::default(), Id::default()).start();
        let snapshot = GameStateSnapshot::from(&state);
        assert_eq!(snapshot.player_id, state.player_id);
        assert_eq!(snapshot.score, state.score);
        assert_eq!(snapshot.current_piece, state.current_piece);
    }
}
