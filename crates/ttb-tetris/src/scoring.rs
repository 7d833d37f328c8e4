/// Score awarded for clearing `lines` lines at `level`.
pub fn score(lines: usize, level: u32) -> u32 {
    const BASE: [u32; 5] = [0, 100, 300, 500, 800];
    let base = BASE.get(lines).copied().unwrap_or(*BASE.last().unwrap());
    base * (level + 1)
}

/// Bonus added for a hard drop of `distance` rows at `level`.
/// Distance-scaled; level does not factor into the hard-drop bonus itself.
pub fn hard_drop_bonus(_level: u32, distance: i32) -> u32 {
    (distance.max(0) as u32) * 2
}

/// Level derived from total lines cleared.
pub fn level(total_lines: u32) -> u32 {
    total_lines / 10
}

/// Gravity drop interval in milliseconds for `level`, the standard Tetris
/// formula clamped to `[50, 1000]`.
pub fn drop_interval_ms(level: u32) -> u64 {
    if level == 0 {
        return 1000;
    }
    if level >= 29 {
        return 50;
    }
    let l = level as f64;
    let ms = (0.8 - (l - 1.0) * 0.007).powf(l - 1.0) * 1000.0;
    ms.clamp(50.0, 1000.0) as u64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn score_uses_standard_base_table() {
        assert_eq!(score(0, 0), 0);
        assert_eq!(score(1, 0), 100);
        assert_eq!(score(4, 0), 800);
    }

    #[test]
    fn score_multiplies_by_level_plus_one() {
        assert_eq!(score(1, 1), 200);
        assert_eq!(score(2, 2), 900);
    }

    #[test]
    fn hard_drop_bonus_is_double_distance() {
        assert_eq!(hard_drop_bonus(0, 5), 10);
        assert_eq!(hard_drop_bonus(3, 0), 0);
    }

    #[test]
    fn level_is_lines_over_ten() {
        assert_eq!(level(0), 0);
        assert_eq!(level(9), 0);
        assert_eq!(level(10), 1);
        assert_eq!(level(25), 2);
    }

    #[test]
    fn drop_interval_has_documented_edges() {
        assert_eq!(drop_interval_ms(0), 1000);
        assert_eq!(drop_interval_ms(29), 50);
        assert_eq!(drop_interval_ms(50), 50);
    }

    #[test]
    fn drop_interval_is_monotone_non_increasing() {
        let mut prev = drop_interval_ms(1);
        for level in 2..30 {
            let cur = drop_interval_ms(level);
            assert!(cur <= prev, "level {level}: {cur} > {prev}");
            prev = cur;
        }
    }
}
