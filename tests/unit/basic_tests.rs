/// Basic unit tests to verify core functionality
use chrono::{Duration, NaiveDate, TimeZone, Utc};
use habit_streaks::engine::*;
use habit_streaks::*;
use tempfile::NamedTempFile;

#[cfg(test)]
mod basic_unit_tests {
    use super::*;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, d).unwrap()
    }

    fn habit(goal: i64) -> Habit {
        Habit::new(UserId::new(), "Test Habit".to_string(), None, Frequency::Daily, goal).unwrap()
    }

    #[test]
    fn test_count_never_exceeds_goal() {
        let goal = 3;
        let mut h = habit(goal);
        for submitted in [0u32, 1, 3, 4, 50, u32::MAX] {
            h = record_completion(&h, day(10), CountUpdate::Set(submitted));
            let stored = find_record(&h.completions, day(10)).unwrap().count;
            assert!(stored <= goal as u32, "submitted {} stored {}", submitted, stored);
        }
    }

    #[test]
    fn test_same_day_is_upserted() {
        let h = habit(3);
        let h = record_completion(&h, day(10), CountUpdate::Set(1));
        let h = record_completion(&h, day(10), CountUpdate::Set(3));

        assert_eq!(h.completions, vec![CompletionRecord::new(day(10), 3)]);
    }

    #[test]
    fn test_streak_walks_back_to_first_gap() {
        let completions = vec![
            CompletionRecord::new(day(10), 1),
            CompletionRecord::new(day(9), 1),
            CompletionRecord::new(day(8), 1),
            CompletionRecord::new(day(6), 1),
        ];
        assert_eq!(compute_current_streak(&completions, 1, day(10)), 3);
    }

    #[test]
    fn test_missing_today_counts_from_yesterday() {
        let completions = vec![CompletionRecord::new(day(9), 1)];
        assert_eq!(compute_current_streak(&completions, 1, day(10)), 1);
        assert_eq!(compute_current_streak(&completions, 1, day(11)), 0);
        assert_eq!(compute_current_streak(&[], 1, day(10)), 0);
    }

    #[test]
    fn test_progress_is_monotonic_and_full_only_at_goal() {
        for goal in [1u32, 3, 7, 200, 1000] {
            let mut previous = 0;
            for count in 0..=goal {
                let completions = vec![CompletionRecord::new(day(1), count)];
                let progress = compute_daily_progress(&completions, goal, day(1));
                assert!(progress >= previous);
                assert_eq!(progress == 100, count >= goal, "goal {} count {}", goal, count);
                previous = progress;
            }
        }
        assert_eq!(compute_daily_progress(&[], 4, day(1)), 0);
    }

    #[test]
    fn test_trend_direction_follows_series() {
        let series = |values: &[u8]| -> Vec<ProgressPoint> {
            values
                .iter()
                .enumerate()
                .map(|(i, progress)| ProgressPoint { day: day(i as u32 + 1), progress: *progress })
                .collect()
        };

        assert!(compute_series_statistics(&series(&[10, 20, 30, 40])).unwrap().trend > 0.0);
        assert!(compute_series_statistics(&series(&[90, 60, 30])).unwrap().trend < 0.0);
        assert_eq!(compute_series_statistics(&series(&[50, 50, 50, 50])).unwrap().trend, 0.0);
        assert!(compute_series_statistics(&[]).is_none());
    }

    #[test]
    fn test_empty_calendar_has_one_unmet_entry_per_day() {
        let calendar = build_calendar(&[], 2, day(1), day(31));
        assert_eq!(calendar.len(), 31);
        assert!(calendar.iter().all(|entry| !entry.met && entry.progress == 0));
    }

    #[test]
    fn test_derivations_are_pure() {
        let completions = vec![CompletionRecord::new(day(10), 2), CompletionRecord::new(day(9), 1)];
        assert_eq!(
            compute_current_streak(&completions, 1, day(10)),
            compute_current_streak(&completions, 1, day(10))
        );
        assert_eq!(
            compute_daily_progress(&completions, 3, day(10)),
            compute_daily_progress(&completions, 3, day(10))
        );
    }

    #[test]
    fn test_cached_streak_matches_recomputation() {
        // Met submissions made on the day itself, with a gap on day 4
        let mut h = habit(2);
        for offset in [0, 1, 2, 4, 5] {
            let today = day(1) + Duration::days(offset);
            h = record_completion(&h, today, CountUpdate::Set(2));
            assert_eq!(h.streak, compute_current_streak(&h.completions, h.goal, today));
        }
        assert_eq!(h.streak, 2);
    }

    #[test]
    fn test_normalize_day_uses_utc() {
        let late_evening = chrono::FixedOffset::west_opt(5 * 3600)
            .unwrap()
            .with_ymd_and_hms(2024, 3, 9, 22, 0, 0)
            .unwrap();
        assert_eq!(normalize_day(&late_evening), day(10));
        assert_eq!(normalize_day(&Utc.with_ymd_and_hms(2024, 3, 10, 0, 0, 0).unwrap()), day(10));
    }

    #[test]
    fn test_invalid_goal_and_malformed_date() {
        assert!(matches!(
            Habit::new(UserId::new(), "x".to_string(), None, Frequency::Daily, 0),
            Err(DomainError::InvalidGoal(_))
        ));
        assert!(matches!(parse_day("03/10/2024"), Err(DomainError::MalformedDate(_))));
        assert_eq!(parse_day("2024-03-10").unwrap(), day(10));
    }

    #[tokio::test]
    async fn test_server_creation() {
        let temp_file = NamedTempFile::new().expect("Failed to create temp file");
        let config = ServerConfig {
            database: temp_file.path().to_path_buf(),
            jwt_secret: "unit-secret".to_string(),
            token_ttl_days: 30,
            bcrypt_cost: 4,
        };
        let server = HabitServer::new(&config).await;
        assert!(server.is_ok());
    }

    #[test]
    fn test_storage_creation() {
        let temp_file = NamedTempFile::new().expect("Failed to create temp file");
        let storage = SqliteStorage::new(temp_file.path().to_path_buf());
        assert!(storage.is_ok());
    }
}
