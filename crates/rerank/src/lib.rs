//! Ranking and value scoring for filtered records.
//!
//! Orders matches by performance score (highest first), breaking ties by
//! price (cheapest first), and annotates each with its value score.

use laptopscope_model::{NormalizedRecord, RankedRecord};
use std::cmp::Ordering;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RankError {
    /// A record with a zero score cannot be given a value score.
    #[error("Record #{position} ('{name}') has a zero performance score")]
    ZeroScore { position: usize, name: String },
}

/// Price per performance point (lower = better value).
pub fn value_score(record: &NormalizedRecord) -> Option<f64> {
    if record.score == 0 {
        return None;
    }
    Some(record.price as f64 / f64::from(record.score))
}

/// Score descending, then price ascending.
pub fn rank_order(a: &NormalizedRecord, b: &NormalizedRecord) -> Ordering {
    b.score.cmp(&a.score).then_with(|| a.price.cmp(&b.price))
}

/// Rank filtered records.
///
/// The sort is stable: records with equal score and price keep their input
/// order. Fails if any record has a zero score.
pub fn rank(matches: &[NormalizedRecord]) -> Result<Vec<RankedRecord>, RankError> {
    let mut ranked = matches
        .iter()
        .enumerate()
        .map(|(position, record)| {
            let value_score = value_score(record).ok_or_else(|| RankError::ZeroScore {
                position,
                name: record.name.clone(),
            })?;
            tracing::trace!(name = %record.name, value_score, "Scored record");

            Ok(RankedRecord {
                record: record.clone(),
                value_score,
            })
        })
        .collect::<Result<Vec<_>, RankError>>()?;

    ranked.sort_by(|a, b| rank_order(&a.record, &b.record));

    Ok(ranked)
}

/// The record offering the most performance per rupee.
///
/// Ties go to the earliest record.
pub fn best_value(ranked: &[RankedRecord]) -> Option<&RankedRecord> {
    ranked.iter().fold(None, |best: Option<&RankedRecord>, candidate| match best {
        Some(current) if current.value_score <= candidate.value_score => Some(current),
        _ => Some(candidate),
    })
}
