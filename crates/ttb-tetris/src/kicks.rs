use crate::PieceType;

/// Per-(from,to)-rotation wall kick offsets, tried in order until one fits.
/// Expressed for a board whose `y` increases downward (row-major, row 0 at
/// top); kick tables are conventionally written for a y-increases-upward
/// system, so every `dy` component here is negated relative to that form.
fn jlstz_kicks(from: u8, to: u8) -> &'static [(i32, i32)] {
    match (from, to) {
        (0, 1) => &[(0, 0), (-1, 0), (-1, -1), (0, 2), (-1, 2)],
        (1, 0) => &[(0, 0), (1, 0), (1, 1), (0, -2), (1, -2)],
        (1, 2) => &[(0, 0), (1, 0), (1, 1), (0, -2), (1, -2)],
        (2, 1) => &[(0, 0), (-1, 0), (-1, -1), (0, 2), (-1, 2)],
        (2, 3) => &[(0, 0), (1, 0), (1, -1), (0, 2), (1, 2)],
        (3, 2) => &[(0, 0), (-1, 0), (-1, 1), (0, -2), (-1, -2)],
        (3, 0) => &[(0, 0), (-1, 0), (-1, 1), (0, -2), (-1, -2)],
        _ => &[(0, 0), (1, 0), (1, -1), (0, 2), (1, 2)],
    }
}

fn i_kicks(from: u8, to: u8) -> &'static [(i32, i32)] {
    match (from, to) {
        (0, 1) => &[(0, 0), (-2, 0), (1, 0), (-2, 1), (1, -2)],
        (1, 0) => &[(0, 0), (2, 0), (-1, 0), (2, -1), (-1, 2)],
        (1, 2) => &[(0, 0), (-1, 0), (2, 0), (-1, -2), (2, 1)],
        (2, 1) => &[(0, 0), (1, 0), (-2, 0), (1, 2), (-2, -1)],
        (2, 3) => &[(0, 0), (2, 0), (-1, 0), (2, -1), (-1, 2)],
        (3, 2) => &[(0, 0), (-2, 0), (1, 0), (-2, 1), (1, -2)],
        (3, 0) => &[(0, 0), (1, 0), (-2, 0), (1, 2), (-2, -1)],
        _ => &[(0, 0), (-1, 0), (2, 0), (-1, -2), (2, 1)],
    }
}

/// Wall kick candidates for the `from -> to` rotation transition of `kind`,
/// tried in order. The O piece is always a single naive-fit attempt (spec
/// §4.1: "O-piece is always a no-op failure if naive fit fails").
pub fn kicks_for(kind: PieceType, from: u8, to: u8) -> &'static [(i32, i32)] {
    match kind {
        PieceType::O => &[(0, 0)],
        PieceType::I => i_kicks(from % 4, to % 4),
        _ => jlstz_kicks(from % 4, to % 4),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_kick_list_tries_naive_fit_first() {
        for kind in PieceType::ALL {
            for from in 0..4u8 {
                let to = (from + 1) % 4;
                assert_eq!(kicks_for(kind, from, to)[0], (0, 0));
            }
        }
    }

    #[test]
    fn o_piece_has_no_kicks() {
        assert_eq!(kicks_for(PieceType::O, 0, 1), &[(0, 0)]);
    }
}
