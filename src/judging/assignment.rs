//! Randomized judge assignment

use rand::seq::SliceRandom;
use rand::Rng;
use std::cmp::Ordering;
use std::sync::Arc;

use crate::competition::{EntryId, JudgeId};
use crate::config::CompetitionType;
use crate::error::{CompetitionError, Result};
use crate::judging::JudgeSlot;

/// Entries one judge should review in a single session
#[derive(Debug, Clone, PartialEq)]
pub struct JudgeAssignment {
    pub judge_id: JudgeId,
    pub entries: Vec<EntryId>,
}

/// Give every entry `judges_per_entry` distinct judges.
///
/// Entries are shuffled so no entry is always reviewed first. Judges without free capacity
/// are skipped; among the rest, specialists in `competition_type` and more reliable
/// judges are preferred, and the load is spread so no judge gets far more entries than
/// the others. A judge for whom `already_judging(judge, entry)` holds is never given that
/// entry again.
pub fn plan_assignments<R, F>(
    entries: &[EntryId],
    judges: &[Arc<JudgeSlot>],
    judges_per_entry: usize,
    competition_type: CompetitionType,
    already_judging: F,
    rng: &mut R,
) -> Result<Vec<JudgeAssignment>>
where
    R: Rng + ?Sized,
    F: Fn(&JudgeId, &EntryId) -> bool,
{
    if entries.is_empty() {
        return Ok(Vec::new());
    }

    let mut candidates: Vec<&Arc<JudgeSlot>> =
        judges.iter().filter(|slot| slot.free_capacity() > 0).collect();
    if judges_per_entry == 0 || candidates.len() < judges_per_entry {
        return Err(CompetitionError::NotEnoughJudges {
            required: judges_per_entry,
            available: candidates.len(),
        });
    }
    candidates.sort_by(|a, b| preference(a, b, competition_type));

    let mut order: Vec<&EntryId> = entries.iter().collect();
    order.shuffle(rng);

    let mut loads: Vec<Vec<EntryId>> = vec![Vec::new(); candidates.len()];
    let mut by_load: Vec<usize> = (0..candidates.len()).collect();
    for entry in order {
        // stable: equal loads keep preference order
        by_load.sort_by_key(|&i| loads[i].len());
        let chosen: Vec<usize> = by_load
            .iter()
            .copied()
            .filter(|&i| !already_judging(candidates[i].id(), entry))
            .take(judges_per_entry)
            .collect();
        if chosen.len() < judges_per_entry {
            return Err(CompetitionError::NotEnoughJudges {
                required: judges_per_entry,
                available: chosen.len(),
            });
        }
        for i in chosen {
            loads[i].push(entry.clone());
        }
    }

    Ok(candidates
        .into_iter()
        .zip(loads)
        .filter(|(_, entries)| !entries.is_empty())
        .map(|(slot, entries)| JudgeAssignment {
            judge_id: slot.id().clone(),
            entries,
        })
        .collect())
}

fn preference(a: &JudgeSlot, b: &JudgeSlot, competition_type: CompetitionType) -> Ordering {
    let (ja, jb) = (a.judge(), b.judge());
    jb.specializes_in(competition_type)
        .cmp(&ja.specializes_in(competition_type))
        .then_with(|| jb.reliability_score.total_cmp(&ja.reliability_score))
        .then_with(|| ja.id.cmp(&jb.id))
}
