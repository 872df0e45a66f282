use std::cmp::Ordering;

use crate::protocol::ResultRecord;

pub const DEFAULT_LIMIT: usize = 10;
pub const MAX_LIMIT: usize = 100;

/// Highest WPM first, accuracy breaks ties, then the newer record wins.
pub fn compare(a: &ResultRecord, b: &ResultRecord) -> Ordering {
    b.results
        .wpm
        .total_cmp(&a.results.wpm)
        .then_with(|| b.results.accuracy.total_cmp(&a.results.accuracy))
        .then_with(|| b.created_at.cmp(&a.created_at))
}

pub fn rank(mut records: Vec<ResultRecord>, limit: usize) -> Vec<ResultRecord> {
    records.sort_by(compare);
    records.truncate(limit);
    records
}

/// Clamp a client-supplied limit into `1..=MAX_LIMIT`.
pub fn clamp_limit(limit: Option<usize>) -> usize {
    limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::ResultPayload;
    use chrono::{Duration, Utc};
    use uuid::Uuid;

    fn entry(name: &str, wpm: f64, accuracy: f64, age_secs: i64) -> ResultRecord {
        ResultRecord {
            id: Uuid::nil(),
            name: name.to_string(),
            usn: format!("usn-{name}"),
            results: ResultPayload {
                wpm,
                cpm: wpm * 5.0,
                accuracy,
                error: 100.0 - accuracy,
                total_time: 30_000,
                total_characters: 100,
            },
            created_at: Utc::now() - Duration::seconds(age_secs),
        }
    }

    #[test]
    fn test_rank_order() {
        let ranked = rank(
            vec![
                entry("slow", 20.0, 99.0, 0),
                entry("fast_sloppy", 60.0, 80.0, 0),
                entry("fast_clean", 60.0, 95.0, 0),
            ],
            DEFAULT_LIMIT,
        );
        let names: Vec<_> = ranked.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, ["fast_clean", "fast_sloppy", "slow"]);
    }

    #[test]
    fn test_full_tie_prefers_newer() {
        let ranked = rank(vec![entry("old", 40.0, 90.0, 60), entry("new", 40.0, 90.0, 1)], 10);
        assert_eq!(ranked[0].name, "new");
    }

    #[test]
    fn test_limit() {
        let records = (0..5).map(|i| entry(&i.to_string(), i as f64, 90.0, 0)).collect();
        let ranked = rank(records, 2);
        assert_eq!(ranked.len(), 2);
        assert_eq!(ranked[0].name, "4");
        assert_eq!(clamp_limit(None), DEFAULT_LIMIT);
        assert_eq!(clamp_limit(Some(0)), 1);
        assert_eq!(clamp_limit(Some(1_000)), MAX_LIMIT);
    }
}
