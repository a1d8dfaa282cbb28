pub mod registry;

use serde::{Deserialize, Serialize};
use std::fmt;

/// Longest name a result record keeps, in characters.
pub const MAX_NAME_LEN: usize = 99;

/// The three independent tallying dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Candidate,
    Center,
    Region,
}

impl Category {
    pub const ALL: [Category; 3] = [Category::Candidate, Category::Center, Category::Region];

    /// Label used in the `Category` column of CSV exports.
    pub fn label(&self) -> &'static str {
        match self {
            Category::Candidate => "CANDIDATE",
            Category::Center => "CENTER",
            Category::Region => "REGION",
        }
    }

    /// Plural name, used for the JSON `category` field and export file names.
    pub fn plural(&self) -> &'static str {
        match self {
            Category::Candidate => "candidates",
            Category::Center => "centers",
            Category::Region => "regions",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Category::Candidate => write!(f, "candidate"),
            Category::Center => write!(f, "center"),
            Category::Region => write!(f, "region"),
        }
    }
}

/// One tallied subject: a candidate, a polling center or a region.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultRecord {
    pub id: i64,
    pub name: String,
    pub category: Category,
    pub votes: u64,
    pub percentage: f64,
}

impl ResultRecord {
    /// Build a record with a zero percentage. Names longer than
    /// [`MAX_NAME_LEN`] characters are truncated.
    pub fn new(id: i64, name: &str, category: Category, votes: u64) -> Self {
        Self {
            id,
            name: bounded_name(name),
            category,
            votes,
            percentage: 0.0,
        }
    }

    pub fn candidate(entry: &registry::CandidateEntry) -> Self {
        Self::new(entry.number, &entry.name, Category::Candidate, entry.votes)
    }

    /// A center's tally counts ballots processed there, not a candidate choice.
    pub fn center(entry: &registry::CenterEntry) -> Self {
        Self::new(entry.id, &entry.location, Category::Center, entry.voters_served)
    }

    pub fn with_votes(mut self, votes: u64) -> Self {
        self.votes = votes;
        self
    }
}

/// Share of `votes` in `total`, as a percentage. Zero when `total` is zero.
pub fn share(votes: u64, total: u64) -> f64 {
    if total == 0 {
        0.0
    } else {
        votes as f64 / total as f64 * 100.0
    }
}

fn bounded_name(name: &str) -> String {
    name.chars().take(MAX_NAME_LEN).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn long_names_are_truncated() {
        let long = "x".repeat(150);
        let record = ResultRecord::new(1, &long, Category::Candidate, 0);
        assert_eq!(record.name.chars().count(), MAX_NAME_LEN);
    }

    #[test]
    fn share_of_empty_total_is_zero() {
        assert_eq!(share(0, 0), 0.0);
        assert_eq!(share(5, 0), 0.0);
        assert!((share(1, 3) - 33.333_333).abs() < 1e-4);
    }
}
