use serde::Deserialize;
use serde::Serialize;

/// The seven standard tetromino types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PieceType {
    I,
    O,
    T,
    S,
    Z,
    J,
    L,
}

impl PieceType {
    pub const ALL: [PieceType; 7] = [
        PieceType::I,
        PieceType::O,
        PieceType::T,
        PieceType::S,
        PieceType::Z,
        PieceType::J,
        PieceType::L,
    ];

    /// Width, in columns, of this piece's local bounding box.
    pub fn box_width(self) -> i32 {
        match self {
            PieceType::I => 4,
            PieceType::O => 2,
            _ => 3,
        }
    }

    /// Cells occupied at rotation `r` (0..4), in local bounding-box
    /// coordinates with row 0 at the top. Standard SRS shape table, indexed
    /// by a plain `0..3` rotation state over a row-major, row-0-at-top board.
    pub fn cells(self, r: u8) -> [(i32, i32); 4] {
        let r = (r % 4) as usize;
        match self {
            PieceType::I => [
                [(0, 1), (1, 1), (2, 1), (3, 1)],
                [(2, 0), (2, 1), (2, 2), (2, 3)],
                [(0, 2), (1, 2), (2, 2), (3, 2)],
                [(1, 0), (1, 1), (1, 2), (1, 3)],
            ][r],
            PieceType::O => [(1, 0), (2, 0), (1, 1), (2, 1)],
            PieceType::T => [
                [(1, 0), (0, 1), (1, 1), (2, 1)],
                [(1, 0), (1, 1), (2, 1), (1, 2)],
                [(0, 1), (1, 1), (2, 1), (1, 2)],
                [(1, 0), (0, 1), (1, 1), (1, 2)],
            ][r],
            PieceType::S => [
                [(1, 0), (2, 0), (0, 1), (1, 1)],
                [(1, 0), (1, 1), (2, 1), (2, 2)],
                [(1, 1), (2, 1), (0, 2), (1, 2)],
                [(0, 0), (0, 1), (1, 1), (1, 2)],
            ][r],
            PieceType::Z => [
                [(0, 0), (1, 0), (1, 1), (2, 1)],
                [(2, 0), (1, 1), (2, 1), (1, 2)],
                [(0, 1), (1, 1), (1, 2), (2, 2)],
                [(1, 0), (0, 1), (1, 1), (0, 2)],
            ][r],
            PieceType::J => [
                [(0, 0), (0, 1), (1, 1), (2, 1)],
                [(1, 0), (2, 0), (1, 1), (1, 2)],
                [(0, 1), (1, 1), (2, 1), (2, 2)],
                [(1, 0), (1, 1), (0, 2), (1, 2)],
            ][r],
            PieceType::L => [
                [(2, 0), (0, 1), (1, 1), (2, 1)],
                [(1, 0), (1, 1), (1, 2), (2, 2)],
                [(0, 1), (1, 1), (2, 1), (0, 2)],
                [(0, 0), (1, 0), (1, 1), (1, 2)],
            ][r],
        }
    }

    /// Standard spawn column for this piece type: near the top-center,
    /// adjusted per type so each piece's footprint sits the same way.
    pub fn spawn_x(self) -> i32 {
        match self {
            PieceType::O => 4,
            _ => 3,
        }
    }
}

impl std::fmt::Display for PieceType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            PieceType::I => "I",
            PieceType::O => "O",
            PieceType::T => "T",
            PieceType::S => "S",
            PieceType::Z => "Z",
            PieceType::J => "J",
            PieceType::L => "L",
        };
        f.write_str(s)
    }
}

/// A piece in play: its type, rotation state, and board-relative position.
/// Position is the top-left corner of the piece's local bounding box.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivePiece {
    pub kind: PieceType,
    pub rotation: u8,
    pub x: i32,
    pub y: i32,
}

impl ActivePiece {
    /// Standard spawn position for a fresh piece.
    pub fn spawn(kind: PieceType) -> Self {
        Self {
            kind,
            rotation: 0,
            x: kind.spawn_x(),
            y: 0,
        }
    }

    /// Board-absolute cells this piece currently occupies.
    pub fn cells(&self) -> [(i32, i32); 4] {
        self.kind.cells(self.rotation).map(|(dx, dy)| (self.x + dx, self.y + dy))
    }

    /// A copy of this piece translated by `(dx, dy)`.
    pub fn translated(&self, dx: i32, dy: i32) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
            ..*self
        }
    }

    /// A copy of this piece with naive rotation applied (no wall kick).
    pub fn rotated(&self, steps: i32) -> Self {
        Self {
            rotation: ((self.rotation as i32 + steps).rem_euclid(4)) as u8,
            ..*self
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_piece_has_four_cells_at_every_rotation() {
        for kind in PieceType::ALL {
            for r in 0..4u8 {
                assert_eq!(kind.cells(r).len(), 4);
            }
        }
    }

    #[test]
    fn spawn_places_piece_at_top() {
        let piece = ActivePiece::spawn(PieceType::T);
        assert_eq!(piece.y, 0);
        assert_eq!(piece.rotation, 0);
    }

    #[test]
    fn rotated_four_times_returns_to_start() {
        let piece = ActivePiece::spawn(PieceType::L);
        let full_turn = piece.rotated(1).rotated(1).rotated(1).rotated(1);
        assert_eq!(full_turn.rotation, piece.rotation);
    }
}
