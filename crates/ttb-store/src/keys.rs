//! Key and channel namespace constants (spec §4.6), mirroring the
//! teacher's table-name-constant convention in `rbp_pg` (`ABSTRACTION`,
//! `ACTIONS`, ... as `&'static str` consts rather than a format string
//! scattered across call sites).
use ttb_core::Id;
use ttb_core::Player;
use ttb_core::Room;

/// Set of every currently-live room id.
pub const ACTIVE_ROOMS: &str = "active_rooms";
/// Set of every currently-connected player id.
pub const PLAYERS: &str = "players";
/// Set of every game (== room) that has ever been started.
pub const GAMES: &str = "games";

pub fn room_key(id: Id<Room>) -> String {
    format!("room:{id}")
}
pub fn player_key(id: Id<Player>) -> String {
    format!("player:{id}")
}
pub fn player_game_key(id: Id<Player>) -> String {
    format!("player_game:{id}")
}
pub fn socket_key(socket_id: &str) -> String {
    format!("socket:{socket_id}")
}
pub fn game_players_key(room_id: Id<Room>) -> String {
    format!("game:{room_id}:players")
}

pub fn channel_game_state_update(player_id: Id<Player>) -> String {
    format!("game_state_update:{player_id}")
}
pub fn channel_game_started(player_id: Id<Player>) -> String {
    format!("game_started:{player_id}")
}
pub fn channel_player_state_changed(room_id: Id<Room>) -> String {
    format!("player_state_changed:{room_id}")
}
pub fn channel_room_state_update(room_id: Id<Room>) -> String {
    format!("room_state_update:{room_id}")
}
/// Legacy map channel, kept for clients still negotiating the network-sync
/// protocol (spec §4.6, §9).
pub fn channel_tetris_legacy(game_id: &str) -> String {
    format!("tetris:{game_id}")
}

/// Subscription patterns the gateway registers once at startup (spec §4.7):
/// one per outbound channel family, each matching every room/player.
pub const PATTERN_GAME_STATE_UPDATE: &str = "game_state_update:*";
pub const PATTERN_GAME_STARTED: &str = "game_started:*";
pub const PATTERN_PLAYER_STATE_CHANGED: &str = "player_state_changed:*";
pub const PATTERN_ROOM_STATE_UPDATE: &str = "room_state_update:*";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keys_embed_the_id() {
        let id = Id::<Room>::default();
        assert!(room_key(id).starts_with("room:"));
        assert!(room_key(id).contains(&id.to_string()));
    }
}
