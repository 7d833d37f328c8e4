use crate::PlayerState;
use ttb_tetris::ActivePiece;
use ttb_tetris::ghost;

/// Fallback spawn offsets tried, in order, when the active piece's standard
/// spawn position collides (spec §4.3 Repair operations).
pub const FALLBACK_SPAWN_OFFSETS: [(i32, i32); 6] = [(3, 0), (2, 0), (4, 0), (3, 1), (2, 1), (4, 1)];

impl PlayerState {
    /// Rebuilds a missing `ghostPiece` when there is an active piece to
    /// project (spec §4.3). A no-op if the ghost is already present or
    /// there is no active piece to shadow.
    pub fn repair_missing_ghost(&self) -> Self {
        let mut next = self.clone();
        if next.ghost_piece.is_none() {
            if let Some(piece) = next.current_piece {
                next.ghost_piece = Some(ghost(&piece, &next.board));
            }
        }
        next
    }

    /// Drops a stray `ghostPiece` left behind with no active piece to
    /// justify it (spec §4.3).
    pub fn repair_stray_ghost(&self) -> Self {
        let mut next = self.clone();
        if next.current_piece.is_none() && next.ghost_piece.is_some() {
            next.ghost_piece = None;
        }
        next
    }

    /// If the active piece's current position collides with the board,
    /// searches `FALLBACK_SPAWN_OFFSETS` for the first offset that fits and
    /// relocates the piece there (rotation reset to `0`, matching a fresh
    /// spawn). If none fits, the player transitions to a clean game-over
    /// (spec §4.3).
    pub fn repair_spawn_collision(&self) -> Self {
        let mut next = self.clone();
        let Some(piece) = next.current_piece else { return next };
        if next.board.is_valid(&piece, 0, 0) {
            return next;
        }
        let fallback = FALLBACK_SPAWN_OFFSETS.iter().find_map(|&(x, y)| {
            let candidate = ActivePiece { kind: piece.kind, rotation: 0, x, y };
            next.board.is_valid(&candidate, 0, 0).then_some(candidate)
        });
        match fallback {
            Some(candidate) => {
                next.current_piece = Some(candidate);
                next.ghost_piece = Some(ghost(&candidate, &next.board));
                next
            }
            None => next.force_clean_game_over(),
        }
    }

    /// Regenerates the bag if `bagIndex` has drifted out of `0..=7`
    /// (spec §4.3).
    pub fn repair_bag_index(&self) -> Self {
        let mut next = self.clone();
        if next.bag_index > next.tetromino_bag.len() {
            next.bag_number += 1;
            next.tetromino_bag = ttb_tetris::bag_for_bag_number(next.game_seed, next.bag_number);
            next.bag_index = 0;
        }
        next
    }

    /// Forces a clean game-over regardless of board state: drops the
    /// active piece and ghost and sets the terminal flag. `nextPiece` is
    /// left as the last drawn value — the struct models it as a non-optional
    /// `PieceType` (spec §3.1's data model table), so the spec's "nextPiece
    /// := ∅" wording is realized as "stops mattering", not a sentinel write.
    pub fn force_clean_game_over(&self) -> Self {
        let mut next = self.clone();
        next.current_piece = None;
        next.ghost_piece = None;
        next.game_over = true;
        next
    }

    /// Runs every repair operation in sequence: ghost bookkeeping, spawn
    /// collision resolution, then bag-index sanity. Intended for
    /// server-initiated reconciliation of a state pulled back from the
    /// store, never for a client-triggered action.
    pub fn repair(&self) -> Self {
        self.repair_missing_ghost()
            .repair_stray_ghost()
            .repair_spawn_collision()
            .repair_bag_index()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ttb_core::Id;

    fn started() -> PlayerState {
        PlayerState::initial(Id::default(), Id::default()).start()
    }

    #[test]
    fn repair_rebuilds_missing_ghost() {
        let mut s = started();
        s.ghost_piece = None;
        let repaired = s.repair_missing_ghost();
        assert!(repaired.ghost_piece.is_some());
    }

    #[test]
    fn repair_drops_stray_ghost() {
        let mut s = started();
        s.current_piece = None;
        let repaired = s.repair_stray_ghost();
        assert!(repaired.ghost_piece.is_none());
    }

    #[test]
    fn repair_spawn_collision_falls_back_to_clean_spawn() {
        use ttb_core::BOARD_WIDTH;
        let mut s = started();
        for row in s.board.0.iter_mut() {
            *row = [0u8; BOARD_WIDTH];
        }
        // block the default spawn column only
        s.board.0[0][s.current_piece.unwrap().x as usize] = 1;
        s.board.0[0][s.current_piece.unwrap().x as usize + 1] = 1;
        let repaired = s.repair_spawn_collision();
        assert!(!repaired.game_over);
        assert!(repaired.current_piece.is_some());
    }

    #[test]
    fn repair_spawn_collision_forces_game_over_when_fully_boxed() {
        use ttb_core::BOARD_WIDTH;
        let mut s = started();
        for row in s.board.0.iter_mut() {
            *row = [1u8; BOARD_WIDTH];
        }
        let repaired = s.repair_spawn_collision();
        assert!(repaired.game_over);
        assert!(repaired.current_piece.is_none());
    }

    #[test]
    fn repair_bag_index_regenerates_when_out_of_range() {
        let mut s = started();
        s.bag_index = 99;
        let repaired = s.repair_bag_index();
        assert_eq!(repaired.bag_index, 0);
        assert_eq!(repaired.bag_number, s.bag_number + 1);
    }
}
