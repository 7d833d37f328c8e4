use crate::seed::generate_seed;
use serde::Deserialize;
use serde::Serialize;
use ttb_core::Id;
use ttb_core::Player;
use ttb_core::Room;
use ttb_tetris::ActivePiece;
use ttb_tetris::Board;
use ttb_tetris::PieceType;
use ttb_tetris::bag_for_bag_number;
use ttb_tetris::ghost;

/// The per-player functional core: board, active/held/next piece, bag
/// progression, score, and lifecycle flags. A value-type-plus-`apply`
/// shape — mutation happens on an owned clone inside `apply_action`, never
/// on `&mut self` from outside this crate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerState {
    pub player_id: Id<Player>,
    pub room_id: Id<Room>,
    pub board: Board,
    pub current_piece: Option<ActivePiece>,
    pub next_piece: PieceType,
    pub held_piece: Option<PieceType>,
    pub can_hold: bool,
    pub ghost_piece: Option<ActivePiece>,
    pub score: u32,
    pub level: u32,
    pub lines_cleared: u32,
    pub game_over: bool,
    pub paused: bool,
    pub game_started: bool,
    pub tetromino_bag: [PieceType; 7],
    pub bag_index: usize,
    pub bag_number: i32,
    pub game_seed: i32,
}

impl PlayerState {
    /// Initial state on join: empty board, no active piece, a fresh first
    /// bag, `bagNumber = 1`, `bagIndex = 1` (bag slot 0 is already
    /// earmarked as `nextPiece`), game not yet started.
    pub fn initial(player_id: Id<Player>, room_id: Id<Room>) -> Self {
        let game_seed = generate_seed(player_id, room_id);
        let bag = bag_for_bag_number(game_seed, 1);
        Self {
            player_id,
            room_id,
            board: Board::empty(),
            current_piece: None,
            next_piece: bag[0],
            held_piece: None,
            can_hold: true,
            ghost_piece: None,
            score: 0,
            level: 0,
            lines_cleared: 0,
            game_over: false,
            paused: false,
            game_started: false,
            tetromino_bag: bag,
            bag_index: 1,
            bag_number: 1,
            game_seed,
        }
    }

    /// The join-to-playing transition: materializes the first piece from
    /// the bag, advances `nextPiece`/`bagIndex`, computes the ghost, and
    /// flips `gameStarted`.
    pub fn start(&self) -> Self {
        let mut next = self.clone();
        next.current_piece = Some(ActivePiece::spawn(next.tetromino_bag[0]));
        next.next_piece = next.tetromino_bag[1];
        next.bag_index = 2;
        next.game_started = true;
        next.recompute_ghost();
        next
    }

    /// Draws the next piece from the bag, regenerating it when exhausted.
    fn draw_piece(&mut self) -> PieceType {
        if self.bag_index >= self.tetromino_bag.len() {
            self.bag_number += 1;
            self.tetromino_bag = bag_for_bag_number(self.game_seed, self.bag_number);
            self.bag_index = 0;
        }
        let piece = self.tetromino_bag[self.bag_index];
        self.bag_index += 1;
        piece
    }

    fn recompute_ghost(&mut self) {
        self.ghost_piece = self.current_piece.as_ref().map(|p| ghost(p, &self.board));
    }

    /// Locks the active piece (the soft-lock pipeline, shared by `moveDown`
    /// collision and `hardDrop`): stamps it to the board, clears lines,
    /// scores, advances level, spawns the next piece, resets hold, and
    /// evaluates game-over on the authoritative spawn-test definition.
    /// Returns whether the level changed.
    fn lock_active_piece(&mut self) -> bool {
        let piece = self.current_piece.take().expect("lock called without an active piece");
        self.board = self.board.place(&piece);
        let (cleared_board, cleared) = self.board.clear_lines();
        self.board = cleared_board;
        self.score += ttb_tetris::score(cleared, self.level);
        self.lines_cleared += cleared as u32;
        let new_level = ttb_tetris::level(self.lines_cleared);
        let level_changed = new_level != self.level;
        self.level = new_level;

        let spawned_kind = self.next_piece;
        self.current_piece = Some(ActivePiece::spawn(spawned_kind));
        self.next_piece = self.draw_piece();
        self.can_hold = true;

        if ttb_tetris::is_game_over(&self.board) {
            self.enter_game_over();
        } else {
            self.recompute_ghost();
        }
        level_changed
    }

    /// Transitions to a clean game-over: drops the active piece and ghost
    /// and sets the terminal flag.
    fn enter_game_over(&mut self) {
        self.current_piece = None;
        self.ghost_piece = None;
        self.game_over = true;
    }

    fn try_translate(&mut self, dx: i32, dy: i32) {
        let Some(piece) = self.current_piece else { return };
        if self.board.is_valid(&piece, dx, dy) {
            self.current_piece = Some(piece.translated(dx, dy));
            self.recompute_ghost();
        }
    }

    /// A downward move: translate if possible; otherwise run the lock
    /// pipeline. Returns `(locked, level_changed)`.
    fn move_down_or_lock(&mut self) -> (bool, bool) {
        let Some(piece) = self.current_piece else { return (false, false) };
        if self.board.is_valid(&piece, 0, 1) {
            self.current_piece = Some(piece.translated(0, 1));
            self.recompute_ghost();
            (false, false)
        } else {
            let level_changed = self.lock_active_piece();
            (true, level_changed)
        }
    }

    fn try_rotate(&mut self) {
        let Some(piece) = self.current_piece else { return };
        match ttb_tetris::rotate_with_wall_kick(&piece, &self.board) {
            Ok(rotated) => {
                self.current_piece = Some(rotated);
                self.recompute_ghost();
            }
            Err(_) => log::debug!("player {}: rotation blocked", self.player_id),
        }
    }

    /// A hard drop: fall to the floor, award `distance * 2`, then run the
    /// lock pipeline. Returns `(locked, level_changed)`.
    fn hard_drop(&mut self) -> (bool, bool) {
        let Some(piece) = self.current_piece else { return (false, false) };
        let (landed, distance) = ttb_tetris::hard_drop(&piece, &self.board);
        self.current_piece = Some(landed);
        self.score += ttb_tetris::hard_drop_bonus(self.level, distance);
        let level_changed = self.lock_active_piece();
        (true, level_changed)
    }

    /// Holds the active piece, only when `can_hold`. Swaps it into the hold
    /// slot, drawing a replacement from the queue (or from the
    /// previously-held piece if one exists).
    fn hold(&mut self) {
        if !self.can_hold {
            return;
        }
        let Some(piece) = self.current_piece else { return };
        match self.held_piece {
            Some(held) => {
                self.held_piece = Some(piece.kind);
                self.current_piece = Some(ActivePiece::spawn(held));
            }
            None => {
                self.held_piece = Some(piece.kind);
                let drawn = self.next_piece;
                self.current_piece = Some(ActivePiece::spawn(drawn));
                self.next_piece = self.draw_piece();
            }
        }
        self.can_hold = false;
        self.recompute_ghost();
    }

    /// Applies one client action from the closed action set. A game-over
    /// player's actions are silently ignored with a log line — not an
    /// error. Returns the resulting state plus bookkeeping flags the
    /// gravity scheduler and gateway need: whether a lock happened,
    /// whether the level changed (restart the ticker), and whether this
    /// action is what pushed the player into game-over (fire the
    /// game-over handler).
    pub fn apply_action(&self, action: ttb_dto::PlayerAction) -> ActionOutcome {
        if self.game_over {
            log::debug!("player {}: ignoring {action} on a finished game", self.player_id);
            return ActionOutcome {
                state: self.clone(),
                locked: false,
                level_changed: false,
                entered_game_over: false,
            };
        }
        let mut next = self.clone();
        let (locked, level_changed) = match action {
            ttb_dto::PlayerAction::MoveLeft => {
                next.try_translate(-1, 0);
                (false, false)
            }
            ttb_dto::PlayerAction::MoveRight => {
                next.try_translate(1, 0);
                (false, false)
            }
            ttb_dto::PlayerAction::MoveDown => next.move_down_or_lock(),
            ttb_dto::PlayerAction::Rotate => {
                next.try_rotate();
                (false, false)
            }
            ttb_dto::PlayerAction::HardDrop => next.hard_drop(),
            ttb_dto::PlayerAction::Hold => {
                next.hold();
                (false, false)
            }
        };
        ActionOutcome {
            entered_game_over: next.game_over,
            state: next,
            locked,
            level_changed,
        }
    }

    /// The gravity ticker's auto-drop: identical to a client `moveDown`,
    /// run on the ticker's own interval instead of an inbound message.
    pub fn auto_drop(&self) -> ActionOutcome {
        self.apply_action(ttb_dto::PlayerAction::MoveDown)
    }
}

/// Result of applying one action or auto-drop tick: the next state plus the
/// flags the owning room/ticker needs to react correctly.
#[derive(Debug, Clone)]
pub struct ActionOutcome {
    pub state: PlayerState,
    pub locked: bool,
    pub level_changed: bool,
    pub entered_game_over: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state() -> PlayerState {
        PlayerState::initial(Id::default(), Id::default())
    }

    #[test]
    fn initial_state_is_not_started_and_has_full_hold() {
        let s = state();
        assert!(!s.game_started);
        assert!(s.can_hold);
        assert!(s.current_piece.is_none());
    }

    #[test]
    fn start_materializes_current_and_next_piece() {
        let started = state().start();
        assert!(started.game_started);
        assert!(started.current_piece.is_some());
        assert!(started.ghost_piece.is_some());
        assert_eq!(started.bag_index, 2);
    }

    #[test]
    fn hard_drop_on_empty_board_scores_distance_times_two() {
        let started = state().start();
        let piece = started.current_piece.unwrap();
        let (_, distance) = ttb_tetris::hard_drop(&piece, &started.board);
        let outcome = started.apply_action(ttb_dto::PlayerAction::HardDrop);
        assert_eq!(outcome.state.score, distance as u32 * 2);
        assert_eq!(outcome.state.lines_cleared, 0);
        assert_eq!(outcome.state.level, 0);
        assert!(outcome.locked);
    }

    #[test]
    fn auto_drop_with_no_player_input_locks_the_piece_at_the_bottom() {
        use ttb_core::BOARD_HEIGHT;
        let mut s = state().start();
        let mut ticks = 0;
        loop {
            let outcome = s.auto_drop();
            s = outcome.state;
            ticks += 1;
            if outcome.locked {
                break;
            }
            assert!(ticks < 25, "piece should lock well before this many ticks on an empty board");
        }
        assert_eq!(s.score, 0);
        assert_eq!(s.lines_cleared, 0);
        assert!(!s.game_over);
        assert!(s.board.0[BOARD_HEIGHT - 1].iter().any(|&cell| cell != 0));
    }

    #[test]
    fn game_over_actions_are_ignored() {
        let mut s = state().start();
        s.enter_game_over();
        let outcome = s.apply_action(ttb_dto::PlayerAction::MoveLeft);
        assert!(outcome.state.game_over);
        assert!(!outcome.locked);
    }

    #[test]
    fn hold_swaps_piece_and_clears_can_hold() {
        let started = state().start();
        let original_kind = started.current_piece.unwrap().kind;
        let outcome = started.apply_action(ttb_dto::PlayerAction::Hold);
        assert_eq!(outcome.state.held_piece, Some(original_kind));
        assert!(!outcome.state.can_hold);
    }

    #[test]
    fn hold_twice_without_lock_is_a_no_op_second_time() {
        let started = state().start();
        let once = started.apply_action(ttb_dto::PlayerAction::Hold).state;
        let twice = once.apply_action(ttb_dto::PlayerAction::Hold).state;
        assert_eq!(once.held_piece, twice.held_piece);
        assert_eq!(once.current_piece, twice.current_piece);
    }

    #[test]
    fn line_clear_at_level_zero_awards_standard_score() {
        use ttb_core::BOARD_WIDTH;
        let mut s = state().start();
        // fill the bottom row except the rightmost column
        for x in 0..BOARD_WIDTH - 1 {
            s.board.0[19][x] = 1;
        }
        // force an I piece positioned to complete the row via a vertical drop
        s.current_piece = Some(ttb_tetris::ActivePiece {
            kind: PieceType::I,
            rotation: 1,
            x: (BOARD_WIDTH - 1) as i32 - 2,
            y: 16,
        });
        let outcome = s.apply_action(ttb_dto::PlayerAction::HardDrop);
        assert_eq!(outcome.state.lines_cleared, 1);
        assert_eq!(outcome.state.score, 100);
    }
}
