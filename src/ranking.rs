use std::cmp::Ordering;

use crate::types::{CandidateResult, ResultRecord};

/// Display order: score desc, then duration asc, then earlier `created_at`.
pub fn rank_cmp(a: &ResultRecord, b: &ResultRecord) -> Ordering {
    b.score
        .cmp(&a.score)
        .then_with(|| a.duration_ms.cmp(&b.duration_ms))
        .then_with(|| a.created_at.cmp(&b.created_at))
}

pub fn sort_ranked(records: &mut [ResultRecord]) {
    records.sort_by(rank_cmp);
}

/// Sorts the full candidate set, then truncates.
pub fn top_n(mut records: Vec<ResultRecord>, limit: usize) -> Vec<ResultRecord> {
    sort_ranked(&mut records);
    records.truncate(limit);
    records
}

/// Merge policy. Narrower than `rank_cmp`: timestamps never make a result
/// better, so an identical resubmission keeps the stored record.
pub fn is_better(candidate: &CandidateResult, existing: Option<&ResultRecord>) -> bool {
    let Some(existing) = existing else {
        return true;
    };
    match candidate.score.cmp(&existing.score) {
        Ordering::Greater => true,
        Ordering::Less => false,
        Ordering::Equal => candidate.duration_ms < existing.duration_ms,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Mode;
    use chrono::DateTime;

    fn record(name: &str, score: i64, duration_ms: i64, created_at_s: i64) -> ResultRecord {
        ResultRecord {
            id: None,
            mode: Mode::Skeleton,
            player_name: name.to_string(),
            score,
            max_score: 100,
            duration_ms,
            accuracy_percent: score as u8,
            created_at: DateTime::from_timestamp(created_at_s, 0).expect("timestamp"),
        }
    }

    fn candidate(score: i64, duration_ms: i64) -> CandidateResult {
        CandidateResult {
            mode: Mode::Skeleton,
            player_name: "Ann".to_string(),
            score,
            max_score: 100,
            duration_ms,
            accuracy_percent: score as u8,
        }
    }

    #[test]
    fn higher_score_ranks_first() {
        let ranked = top_n(vec![record("a", 50, 100, 1), record("b", 90, 900, 2)], 10);
        assert_eq!(ranked[0].player_name, "b");
        assert_eq!(ranked[1].player_name, "a");
    }

    #[test]
    fn ties_break_on_duration_then_creation() {
        let ranked = top_n(
            vec![
                record("slow", 70, 900, 1),
                record("late", 70, 500, 9),
                record("early", 70, 500, 3),
            ],
            10,
        );
        let names: Vec<_> = ranked.iter().map(|r| r.player_name.as_str()).collect();
        assert_eq!(names, ["early", "late", "slow"]);
    }

    #[test]
    fn ordering_is_total_for_distinct_keys() {
        let records = [
            record("a", 10, 5, 1),
            record("b", 10, 5, 2),
            record("c", 10, 6, 1),
            record("d", 11, 9, 0),
        ];
        for a in &records {
            for b in &records {
                let forward = rank_cmp(a, b);
                let backward = rank_cmp(b, a);
                assert_eq!(forward, backward.reverse());
                if a.player_name != b.player_name {
                    assert_ne!(forward, Ordering::Equal);
                }
            }
        }
    }

    #[test]
    fn identical_keys_compare_equal_without_panicking() {
        let mut records = vec![record("x", 1, 1, 1), record("y", 1, 1, 1)];
        sort_ranked(&mut records);
        assert_eq!(records.len(), 2);
        assert_eq!(rank_cmp(&records[0], &records[1]), Ordering::Equal);
    }

    #[test]
    fn truncation_happens_after_sorting() {
        let records = (0..15)
            .map(|idx| record(&format!("p{idx}"), idx, 100, idx))
            .collect();
        let ranked = top_n(records, 3);
        let scores: Vec<_> = ranked.iter().map(|r| r.score).collect();
        assert_eq!(scores, [14, 13, 12]);
    }

    #[test]
    fn anything_beats_no_record() {
        assert!(is_better(&candidate(0, 999_999), None));
    }

    #[test]
    fn score_decides_before_duration() {
        let existing = record("Ann", 80, 5000, 1);
        assert!(is_better(&candidate(90, 6000), Some(&existing)));
        assert!(!is_better(&candidate(70, 100), Some(&existing)));
    }

    #[test]
    fn equal_score_needs_strictly_faster_duration() {
        let existing = record("Ann", 90, 6000, 1);
        assert!(is_better(&candidate(90, 5999), Some(&existing)));
        assert!(!is_better(&candidate(90, 6000), Some(&existing)));
        assert!(!is_better(&candidate(90, 7000), Some(&existing)));
    }
}
