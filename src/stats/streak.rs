//! Calendar-day streak rule

use chrono::NaiveDate;

/// Result of advancing a streak for one play day
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StreakUpdate {
    pub current: u32,
    pub longest: u32,
}

/// Advance a daily streak given that the user played `today`.
///
/// First play ever starts at 1. A second play on the same day changes
/// nothing. Playing the day after the last play extends the streak; any
/// longer gap resets it to 1. A stored date in the future (clock skew) is
/// treated as today. Pure function of its inputs.
pub fn advance_streak(
    today: NaiveDate,
    last_played: Option<NaiveDate>,
    current: u32,
    longest: u32,
) -> StreakUpdate {
    let current = match last_played {
        None => 1,
        Some(last) => match (today - last).num_days() {
            days if days <= 0 => current.max(1),
            1 => current + 1,
            _ => 1,
        },
    };
    StreakUpdate {
        current,
        longest: longest.max(current),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn test_first_play_starts_streak() {
        let update = advance_streak(day("2026-03-14"), None, 0, 0);
        assert_eq!(update, StreakUpdate { current: 1, longest: 1 });
    }

    #[test]
    fn test_same_day_play_changes_nothing() {
        let update = advance_streak(day("2026-03-14"), Some(day("2026-03-14")), 4, 6);
        assert_eq!(update, StreakUpdate { current: 4, longest: 6 });
    }

    #[test]
    fn test_yesterday_extends_by_exactly_one() {
        let update = advance_streak(day("2026-03-14"), Some(day("2026-03-13")), 4, 4);
        assert_eq!(update, StreakUpdate { current: 5, longest: 5 });
    }

    #[test]
    fn test_three_day_gap_resets() {
        let update = advance_streak(day("2026-03-14"), Some(day("2026-03-11")), 9, 12);
        assert_eq!(update, StreakUpdate { current: 1, longest: 12 });
    }

    #[test]
    fn test_future_last_played_counts_as_today() {
        let update = advance_streak(day("2026-03-14"), Some(day("2026-03-20")), 4, 6);
        assert_eq!(update, StreakUpdate { current: 4, longest: 6 });
    }

    #[test]
    fn test_month_boundary_is_one_day() {
        let update = advance_streak(day("2026-04-01"), Some(day("2026-03-31")), 2, 2);
        assert_eq!(update, StreakUpdate { current: 3, longest: 3 });
    }
}
