use std::collections::hash_map::DefaultHasher;
use std::hash::Hash;
use std::hash::Hasher;
use std::time::SystemTime;
use std::time::UNIX_EPOCH;
use ttb_core::Id;
use ttb_core::Player;
use ttb_core::Room;

/// Mints the per-player `gameSeed` on join (spec §4.3): mixes wall-clock
/// time, microsecond-resolution time, two process-RNG draws, and the
/// player/room identity hashes, reduces to a 31-bit positive int, and
/// avoids degenerate seeds. The exact mixing formula is an open question in
/// the source (spec §9); this realizes it with the ingredients spec.md
/// names and documents the clamp as a decision in `DESIGN.md`.
pub fn generate_seed(player_id: Id<Player>, room_id: Id<Room>) -> i32 {
    let mut player_hasher = DefaultHasher::new();
    player_id.inner().hash(&mut player_hasher);
    let player_hash = player_hasher.finish();

    let mut room_hasher = DefaultHasher::new();
    room_id.inner().hash(&mut room_hasher);
    let room_hash = room_hasher.finish();

    let now = SystemTime::now().duration_since(UNIX_EPOCH).unwrap_or_default();
    let millis = now.as_millis() as u64;
    let micros = now.subsec_micros() as u64;

    let r1: u32 = rand::random();
    let r2: u32 = rand::random();

    let mixed = millis
        .wrapping_add(r1 as u64)
        .wrapping_add(player_hash ^ room_hash)
        .wrapping_add(micros)
        .wrapping_add(r2 as u64);

    clamp_seed((mixed & 0x7FFF_FFFF) as i32)
}

/// Lifts a raw mixed value into a usable seed: zero is forced to `12345`,
/// anything below `1000` is lifted into `[10000, 2^31)` (spec §4.3).
fn clamp_seed(raw: i32) -> i32 {
    if raw == 0 {
        12345
    } else if raw < 1000 {
        10000i32.saturating_add(raw.rem_euclid(i32::MAX - 10000))
    } else {
        raw
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_is_forced_to_fixed_constant() {
        assert_eq!(clamp_seed(0), 12345);
    }

    #[test]
    fn small_values_are_lifted_into_range() {
        let lifted = clamp_seed(42);
        assert!(lifted >= 10000);
    }

    #[test]
    fn values_at_or_above_threshold_pass_through() {
        assert_eq!(clamp_seed(1000), 1000);
        assert_eq!(clamp_seed(999_999), 999_999);
    }

    #[test]
    fn generated_seeds_are_positive() {
        let player = Id::<Player>::default();
        let room = Id::<Room>::default();
        for _ in 0..16 {
            assert!(generate_seed(player, room) > 0);
        }
    }
}
