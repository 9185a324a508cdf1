//! Entry score aggregation

use serde::{Deserialize, Serialize};

use crate::judging::JudgeScore;

/// Arithmetic mean of the judges' weighted totals; no scores means no score
#[inline]
pub fn aggregate_scores(scores: &[JudgeScore]) -> Option<f64> {
    if scores.is_empty() {
        return None;
    }
    let sum: f64 = scores.iter().map(|s| s.total_score).sum();
    Some(sum / scores.len() as f64)
}

/// Summary of the scores an entry received
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoreStatistics {
    pub judge_count: usize,
    pub mean: f64,
    pub min: f64,
    pub max: f64,
    /// `max - min`; large spreads point at judges disagreeing
    pub spread: f64,
}

impl ScoreStatistics {
    pub fn from_scores(scores: &[JudgeScore]) -> Option<Self> {
        let mean = aggregate_scores(scores)?;
        let (min, max) = scores
            .iter()
            .map(|s| s.total_score)
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
                (lo.min(v), hi.max(v))
            });

        Some(Self {
            judge_count: scores.len(),
            mean,
            min,
            max,
            spread: max - min,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::competition::{EntryId, JudgeId, SessionId};
    use crate::config::JudgingCriteria;
    use crate::judging::ScoreBreakdown;
    use chrono::{TimeZone, Utc};

    fn score(judge: &str, raw: f64) -> JudgeScore {
        JudgeScore::new(
            JudgeId::new(judge),
            EntryId::new("e"),
            SessionId::new("s"),
            ScoreBreakdown::new(raw, raw, raw, raw).unwrap(),
            &JudgingCriteria::default(),
            "",
            Utc.with_ymd_and_hms(2025, 6, 20, 0, 0, 0).unwrap(),
        )
    }

    #[test]
    fn test_no_scores_is_none_not_zero() {
        assert_eq!(aggregate_scores(&[]), None);
        assert!(ScoreStatistics::from_scores(&[]).is_none());
    }

    #[test]
    fn test_mean_and_statistics() {
        let scores = [score("a", 60.0), score("b", 90.0), score("c", 75.0)];
        let mean = aggregate_scores(&scores).unwrap();
        assert!((mean - 75.0).abs() < 1e-9);

        let stats = ScoreStatistics::from_scores(&scores).unwrap();
        assert_eq!(stats.judge_count, 3);
        assert!((stats.min - 60.0).abs() < 1e-9);
        assert!((stats.max - 90.0).abs() < 1e-9);
        assert!((stats.spread - 30.0).abs() < 1e-9);
    }
}
