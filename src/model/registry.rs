//! Read-only snapshots of the registries the tally engine consumes.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandidateEntry {
    pub number: i64,
    pub name: String,
    #[serde(default)]
    pub party: String,
    #[serde(default)]
    pub region: String,
    #[serde(default)]
    pub votes: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CenterEntry {
    pub id: i64,
    pub location: String,
    pub region: String,
    #[serde(default)]
    pub voters_served: u64,
}

/// Candidate list, center list and the registered voter count, as seen at
/// the start of a tallying session.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RegistrySnapshot {
    #[serde(default)]
    pub candidates: Vec<CandidateEntry>,
    #[serde(default)]
    pub centers: Vec<CenterEntry>,
    #[serde(default)]
    pub total_voters: u64,
}

impl RegistrySnapshot {
    pub fn candidate(&self, number: i64) -> Option<&CandidateEntry> {
        self.candidates.iter().find(|c| c.number == number)
    }

    pub fn center(&self, id: i64) -> Option<&CenterEntry> {
        self.centers.iter().find(|c| c.id == id)
    }

    /// Copy of this snapshot with every carried tally reset to zero.
    pub fn zeroed(&self) -> RegistrySnapshot {
        RegistrySnapshot {
            candidates: self
                .candidates
                .iter()
                .map(|c| CandidateEntry {
                    votes: 0,
                    ..c.clone()
                })
                .collect(),
            centers: self
                .centers
                .iter()
                .map(|c| CenterEntry {
                    voters_served: 0,
                    ..c.clone()
                })
                .collect(),
            total_voters: self.total_voters,
        }
    }
}

/// One accepted vote, as emitted by the voting workflow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoteEvent {
    pub voter_id: i64,
    pub candidate_number: i64,
    pub center_id: i64,
}
