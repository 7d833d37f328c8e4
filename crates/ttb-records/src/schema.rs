/// Table holding one row per finished game (spec §4.3 `handleGameOver`).
#[rustfmt::skip]
pub const GAME_RESULTS: &str = "game_results";

/// DDL for `game_results`, following the teacher's `const_format::concatcp!`
/// table-name-interpolation style (`rbp_records::participant::schema`).
pub const CREATE_GAME_RESULTS: &str = const_format::concatcp!(
    "CREATE TABLE IF NOT EXISTS ",
    GAME_RESULTS,
    " (
        id            UUID PRIMARY KEY DEFAULT gen_random_uuid(),
        player_id     UUID NOT NULL,
        room_id       UUID NOT NULL,
        score         INTEGER NOT NULL,
        level         INTEGER NOT NULL,
        lines_cleared INTEGER NOT NULL,
        finished_at   TIMESTAMPTZ NOT NULL DEFAULT now()
    );"
);

pub const INDEX_GAME_RESULTS_PLAYER: &str = const_format::concatcp!(
    "CREATE INDEX IF NOT EXISTS idx_game_results_player ON ",
    GAME_RESULTS,
    " (player_id);"
);
