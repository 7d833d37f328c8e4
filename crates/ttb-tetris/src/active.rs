use crate::kicks::kicks_for;
use crate::ActivePiece;
use crate::Board;
use crate::PieceType;

/// Reasons a rotation attempt can fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RotationBlocked;

/// Naive rotation; does not attempt wall kicks.
pub fn rotate(piece: &ActivePiece) -> ActivePiece {
    piece.rotated(1)
}

/// Attempts rotation, trying the naive rotation first, then the per-type
/// SRS kick offsets for the (from, to) rotation pair in order. Returns the
/// first piece that fits, or `RotationBlocked` if none do.
pub fn rotate_with_wall_kick(
    piece: &ActivePiece,
    board: &Board,
) -> Result<ActivePiece, RotationBlocked> {
    let from = piece.rotation;
    let rotated = piece.rotated(1);
    let to = rotated.rotation;
    for (dx, dy) in kicks_for(piece.kind, from, to) {
        let candidate = rotated.translated(*dx, *dy);
        if board.is_valid(&candidate, 0, 0) {
            return Ok(candidate);
        }
    }
    Err(RotationBlocked)
}

/// Projects `piece` down to its hard-drop landing position — the ghost
/// piece preview.
pub fn ghost(piece: &ActivePiece, board: &Board) -> ActivePiece {
    let mut landed = *piece;
    while board.is_valid(&landed, 0, 1) {
        landed = landed.translated(0, 1);
    }
    landed
}

/// Drops `piece` to the bottom, returning the landed piece and the number
/// of rows traveled.
pub fn hard_drop(piece: &ActivePiece, board: &Board) -> (ActivePiece, i32) {
    let landed = ghost(piece, board);
    (landed, landed.y - piece.y)
}

/// `true` iff none of the seven piece types can be spawn-placed on `board`
/// at its standard spawn position. Deliberately not a "row 0 has a filled
/// cell" check — that heuristic misclassifies boards with an open spawn
/// column under an otherwise-full top row.
pub fn is_game_over(board: &Board) -> bool {
    PieceType::ALL
        .into_iter()
        .map(ActivePiece::spawn)
        .all(|piece| !board.is_valid(&piece, 0, 0))
}
