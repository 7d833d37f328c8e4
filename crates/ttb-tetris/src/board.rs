use crate::ActivePiece;
use serde::Deserialize;
use serde::Serialize;
use ttb_core::BOARD_HEIGHT;
use ttb_core::BOARD_WIDTH;

/// The playfield: 10 columns × 20 rows, row-major, row 0 at the top.
/// Every cell is `0` (empty) or `1` (filled).
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Board(pub Vec<[u8; BOARD_WIDTH]>);

impl Default for Board {
    fn default() -> Self {
        Self(vec![[0u8; BOARD_WIDTH]; BOARD_HEIGHT])
    }
}

impl Board {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn rows(&self) -> &[[u8; BOARD_WIDTH]] {
        &self.0
    }

    /// Cell occupancy at board coordinates. Cells above the visible grid
    /// (`y < 0`, the spawn zone) read as empty; cells outside the left,
    /// right, or bottom edges read as filled so collision checks reject
    /// them uniformly.
    fn filled_at(&self, x: i32, y: i32) -> bool {
        if y < 0 {
            return false;
        }
        if x < 0 || x >= BOARD_WIDTH as i32 || y >= BOARD_HEIGHT as i32 {
            return true;
        }
        self.0[y as usize][x as usize] != 0
    }

    /// `true` if `piece` translated by `(dx, dy)` fits: every cell is
    /// inside the grid on the sides/bottom (cells with `y < 0` are exempt)
    /// and doesn't overlap a filled cell.
    pub fn is_valid(&self, piece: &ActivePiece, dx: i32, dy: i32) -> bool {
        piece
            .translated(dx, dy)
            .cells()
            .into_iter()
            .all(|(x, y)| x >= 0 && x < BOARD_WIDTH as i32 && y < BOARD_HEIGHT as i32 && !self.filled_at(x, y))
    }

    /// Stamps `piece`'s filled cells onto a fresh board. Cells with `y < 0`
    /// are discarded.
    pub fn place(&self, piece: &ActivePiece) -> Self {
        let mut next = self.clone();
        for (x, y) in piece.cells() {
            if y < 0 || y >= BOARD_HEIGHT as i32 || x < 0 || x >= BOARD_WIDTH as i32 {
                continue;
            }
            next.0[y as usize][x as usize] = 1;
        }
        next
    }

    /// Removes every fully-filled row, prepending empty rows to keep the
    /// height constant. Returns the new board and the count cleared.
    /// Relative order of surviving rows is preserved.
    pub fn clear_lines(&self) -> (Self, usize) {
        let survivors: Vec<[u8; BOARD_WIDTH]> =
            self.0.iter().filter(|row| row.contains(&0)).cloned().collect();
        let cleared = self.0.len() - survivors.len();
        let mut rows = vec![[0u8; BOARD_WIDTH]; cleared];
        rows.extend(survivors);
        (Self(rows), cleared)
    }
}

impl std::fmt::Debug for Board {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list()
            .entries(self.0.iter().map(|row| {
                row.iter()
                    .map(|c| if *c == 0 { '.' } else { '#' })
                    .collect::<String>()
            }))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::PieceType;

    #[test]
    fn board_is_10_by_20_and_empty() {
        let board = Board::empty();
        assert_eq!(board.rows().len(), BOARD_HEIGHT);
        assert!(board.rows().iter().all(|r| r.iter().all(|&c| c == 0)));
    }

    #[test]
    fn clear_lines_preserves_dimensions() {
        let mut board = Board::empty();
        board.0[19] = [1u8; BOARD_WIDTH];
        let (cleared_board, n) = board.clear_lines();
        assert_eq!(n, 1);
        assert_eq!(cleared_board.rows().len(), BOARD_HEIGHT);
        assert!(cleared_board.rows()[19].iter().all(|&c| c == 0));
    }

    #[test]
    fn clear_lines_keeps_survivor_order() {
        let mut board = Board::empty();
        board.0[18] = [1u8; BOARD_WIDTH];
        board.0[19][0] = 1; // row 19 not full
        let (cleared_board, n) = board.clear_lines();
        assert_eq!(n, 1);
        assert_eq!(cleared_board.rows()[19][0], 1);
    }

    #[test]
    fn spawn_zone_above_board_never_collides() {
        let board = Board::empty();
        let spawned = crate::ActivePiece::spawn(PieceType::I).translated(0, -5);
        assert!(board.is_valid(&spawned, 0, 0));
    }
}
