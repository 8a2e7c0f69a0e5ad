//! Grouping of sample rows into respondent and (respondent, stimulus)
//! partitions.
//!
//! Partitions borrow from the loaded table and keep file order, which is
//! timestamp order within a recording.

use std::collections::HashMap;

use aoi_core::models::SampleRow;

// ── Partitions ────────────────────────────────────────────────────────────────

/// All gaze rows recorded for one respondent.
#[derive(Debug, Clone)]
pub struct RespondentPartition<'a> {
    pub respondent: &'a str,
    /// Event rows already removed. May be empty.
    pub rows: Vec<&'a SampleRow>,
}

/// The gaze rows of one respondent while one stimulus was shown.
#[derive(Debug, Clone)]
pub struct StimulusPartition<'a> {
    pub respondent: &'a str,
    pub stimulus: &'a str,
    pub rows: Vec<&'a SampleRow>,
}

// ── Partitioner ───────────────────────────────────────────────────────────────

/// Stateless helper that splits rows by respondent, then by stimulus.
pub struct Partitioner;

impl Partitioner {
    /// One partition per respondent, in order of first appearance.
    ///
    /// A respondent whose rows are all events still gets an (empty)
    /// partition.
    pub fn by_respondent(rows: &[SampleRow]) -> Vec<RespondentPartition<'_>> {
        Self::group_ordered(rows.iter(), |row| row.respondent.as_str())
            .into_iter()
            .map(|(respondent, rows)| RespondentPartition {
                respondent,
                rows: rows.into_iter().filter(|row| !row.is_event).collect(),
            })
            .collect()
    }

    /// Split a respondent's gaze rows by stimulus, in order of first
    /// appearance.
    pub fn by_stimulus<'a>(partition: &RespondentPartition<'a>) -> Vec<StimulusPartition<'a>> {
        Self::group_ordered(partition.rows.iter().copied(), |row| row.stimulus.as_str())
            .into_iter()
            .map(|(stimulus, rows)| StimulusPartition {
                respondent: partition.respondent,
                stimulus,
                rows,
            })
            .collect()
    }

    // ── Private ───────────────────────────────────────────────────────────────

    /// Group by `key_fn`, keeping first-appearance order of keys and input
    /// order within each group.
    fn group_ordered<'a>(
        rows: impl Iterator<Item = &'a SampleRow>,
        key_fn: impl Fn(&'a SampleRow) -> &'a str,
    ) -> Vec<(&'a str, Vec<&'a SampleRow>)> {
        let mut groups: Vec<(&'a str, Vec<&'a SampleRow>)> = Vec::new();
        let mut positions: HashMap<&'a str, usize> = HashMap::new();

        for row in rows {
            let key = key_fn(row);
            let idx = *positions.entry(key).or_insert_with(|| {
                groups.push((key, Vec::new()));
                groups.len() - 1
            });
            groups[idx].1.push(row);
        }

        groups
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
