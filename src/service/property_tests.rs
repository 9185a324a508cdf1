//! Property tests for leaderboard projections

use proptest::prelude::*;

use crate::competition::{CompetitionId, EntryId};
use crate::scoring::rank_entries;
use crate::scoring::test_support::accepted_entry;
use crate::service::{render_score_bar, LeaderboardView};

proptest! {
    /// Walking every page yields each ranked entry exactly once, in rank order
    #[test]
    fn prop_pages_cover_standings(
        scores in prop::collection::vec(0..=100u32, 0..40),
        page_size in 1..12usize,
    ) {
        let entries: Vec<_> = scores
            .iter()
            .enumerate()
            .map(|(i, raw)| accepted_entry(&format!("e-{:02}", i), "open", *raw as f64, i as i64))
            .collect();
        let standings = rank_entries(&entries);
        let id = CompetitionId::new("c");

        let first = LeaderboardView::paginate(id.clone(), None, false, &standings, 1, page_size);
        let mut seen: Vec<EntryId> = Vec::new();
        let mut ranks: Vec<u32> = Vec::new();
        for page in 1..=first.total_pages {
            let view = LeaderboardView::paginate(id.clone(), None, false, &standings, page, page_size);
            prop_assert!(view.rows.len() <= page_size);
            prop_assert!(!view.rows.is_empty());
            seen.extend(view.rows.iter().map(|r| r.entry_id.clone()));
            ranks.extend(view.rows.iter().map(|r| r.rank));
        }

        prop_assert_eq!(seen.len(), standings.len());
        let expected: Vec<u32> = (1..=standings.len() as u32).collect();
        prop_assert_eq!(ranks, expected);
    }

    /// The score bar always has ten cells
    #[test]
    fn prop_score_bar_width(score in -50.0f64..150.0) {
        prop_assert_eq!(render_score_bar(score).chars().count(), 10);
    }
}
