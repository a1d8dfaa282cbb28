use crate::index::ResultIndex;
use crate::model::{Category, ResultRecord};
use crate::tally::TallySession;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub mod display;
pub mod export;

#[derive(Debug, thiserror::Error)]
pub enum ReportError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("Expected a {expected} index, got a {found} index")]
    WrongCategory { expected: Category, found: Category },
}

pub type ReportResult<T> = std::result::Result<T, ReportError>;

/// Record with the most votes. `None` when the index is empty or was not
/// built for `category`. Among tied records the smallest id wins.
pub fn leader(index: &ResultIndex, category: Category) -> Option<&ResultRecord> {
    if index.category() != category {
        return None;
    }
    // In-order walk, so keeping the first maximum keeps the smallest id.
    index.iter().fold(None::<&ResultRecord>, |best, record| match best {
        Some(best) if best.votes >= record.votes => Some(best),
        _ => Some(record),
    })
}

/// Record with the fewest votes, smallest id among ties.
pub fn trailing(index: &ResultIndex, category: Category) -> Option<&ResultRecord> {
    if index.category() != category {
        return None;
    }
    index.iter().fold(None::<&ResultRecord>, |best, record| match best {
        Some(best) if best.votes <= record.votes => Some(best),
        _ => Some(record),
    })
}

/// Records with strictly more than `min_votes` votes, ascending by id.
pub fn above_threshold(index: &ResultIndex, min_votes: u64) -> impl Iterator<Item = &ResultRecord> + '_ {
    index.iter().filter(move |record| record.votes > min_votes)
}

pub fn ranking(index: &ResultIndex, descending: bool) -> Vec<&ResultRecord> {
    index.ranked(descending)
}

/// Outcome of re-summing the candidate and center trees.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum IntegrityStatus {
    Ok {
        total: u64,
    },
    Mismatch {
        candidate_votes: u64,
        center_votes: u64,
        expected: u64,
    },
}

impl IntegrityStatus {
    pub fn is_ok(&self) -> bool {
        matches!(self, IntegrityStatus::Ok { .. })
    }
}

/// Re-sum every record of both trees and compare against the externally
/// tracked valid-vote counter. A mismatch is reported, never repaired.
pub fn validate_integrity(
    candidates: &ResultIndex,
    centers: &ResultIndex,
    expected: u64,
) -> ReportResult<IntegrityStatus> {
    ensure_category(candidates, Category::Candidate)?;
    ensure_category(centers, Category::Center)?;

    let candidate_votes = candidates.recount();
    let center_votes = centers.recount();

    if candidate_votes == expected && center_votes == expected {
        Ok(IntegrityStatus::Ok { total: expected })
    } else {
        Ok(IntegrityStatus::Mismatch {
            candidate_votes,
            center_votes,
            expected,
        })
    }
}

fn ensure_category(index: &ResultIndex, expected: Category) -> ReportResult<()> {
    if index.category() == expected {
        Ok(())
    } else {
        Err(ReportError::WrongCategory {
            expected,
            found: index.category(),
        })
    }
}

/// Leading record of one category
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LeaderSummary {
    pub id: i64,
    pub name: String,
    pub votes: u64,
    pub percentage: f64,
}

impl LeaderSummary {
    fn of(index: &ResultIndex) -> Option<LeaderSummary> {
        leader(index, index.category()).map(|record| LeaderSummary {
            id: record.id,
            name: record.name.clone(),
            votes: record.votes,
            percentage: index.percentage_of(record),
        })
    }
}

/// Session-wide summary for reports and the console
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TallySummary {
    pub generated_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub snapshot_digest: Option<String>,
    pub total_voters: u64,
    pub valid_votes: u64,
    pub ballots_processed: u64,
    pub participation: f64,
    pub candidate_leader: Option<LeaderSummary>,
    pub center_leader: Option<LeaderSummary>,
    pub region_leader: Option<LeaderSummary>,
    pub integrity: IntegrityStatus,
}

pub fn summarize(session: &TallySession, snapshot_digest: Option<String>) -> ReportResult<TallySummary> {
    Ok(TallySummary {
        generated_at: Utc::now(),
        snapshot_digest,
        total_voters: session.total_voters(),
        valid_votes: session.valid_votes(),
        ballots_processed: session.ballots_processed(),
        participation: session.participation(),
        candidate_leader: LeaderSummary::of(session.candidates()),
        center_leader: LeaderSummary::of(session.centers()),
        region_leader: LeaderSummary::of(session.regions()),
        integrity: session.validate_integrity()?,
    })
}
