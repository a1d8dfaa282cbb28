//! Aggregation of registry snapshots and accepted votes into per-category
//! result indices.

pub mod region;

pub use region::{normalize_region_name, region_key, RegionCollisionPolicy};

use crate::index::{IndexError, ResultIndex};
use crate::model::registry::{RegistrySnapshot, VoteEvent};
use crate::model::{share, Category, ResultRecord};
use crate::reports::{self, IntegrityStatus, ReportResult};
use log::debug;

#[derive(Debug, thiserror::Error)]
pub enum TallyError {
    #[error("Index error: {0}")]
    Index(#[from] IndexError),
    #[error("Unknown candidate number: {0}")]
    UnknownCandidate(i64),
    #[error("Unknown center id: {0}")]
    UnknownCenter(i64),
    #[error("Center {0} has an empty region name")]
    EmptyRegion(i64),
}

pub type Result<T> = std::result::Result<T, TallyError>;

/// When percentages are brought up to date after a single vote.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PercentageRefresh {
    /// Recompute the touched indices after every vote. O(n) per vote.
    Eager,
    /// Leave indices stale; percentages are derived on read and stored on
    /// the next [`TallySession::refresh_percentages`].
    Deferred,
}

/// Tally options
#[derive(Debug, Clone)]
pub struct TallyOptions {
    pub percentages: PercentageRefresh,
    pub region_collisions: RegionCollisionPolicy,
}

impl Default for TallyOptions {
    fn default() -> Self {
        Self {
            percentages: PercentageRefresh::Deferred,
            region_collisions: RegionCollisionPolicy::Merge,
        }
    }
}

/// Percentage of registered voters whose ballots were processed.
pub fn compute_participation(total_voters: u64, voters_served: u64) -> f64 {
    share(voters_served, total_voters)
}

/// Build a fresh index for `category` from a registry snapshot, with
/// percentages computed.
pub fn build_category_index(
    category: Category,
    snapshot: &RegistrySnapshot,
    options: &TallyOptions,
) -> Result<ResultIndex> {
    let mut index = ResultIndex::new(category);

    match category {
        Category::Candidate => {
            for candidate in &snapshot.candidates {
                index.insert(ResultRecord::candidate(candidate))?;
            }
        }
        Category::Center => {
            for center in &snapshot.centers {
                index.insert(ResultRecord::center(center))?;
            }
        }
        Category::Region => {
            // Centers of the same region merge on insert.
            for center in &snapshot.centers {
                let record = region::region_record(
                    &index,
                    center.id,
                    &center.region,
                    center.voters_served,
                    options.region_collisions,
                )?;
                index.insert(record)?;
            }
        }
    }

    index.recompute_percentages();
    debug!(
        "Built {} index: {} records, {} votes, height {}",
        category,
        index.len(),
        index.total_votes(),
        index.height()
    );
    Ok(index)
}

/// One tallying session: the three category indices plus the counters the
/// voting workflow keeps alongside them.
#[derive(Debug)]
pub struct TallySession {
    candidates: ResultIndex,
    centers: ResultIndex,
    regions: ResultIndex,
    valid_votes: u64,
    ballots_processed: u64,
    total_voters: u64,
    options: TallyOptions,
}

impl TallySession {
    /// Empty session, ready for incremental votes.
    pub fn new(options: TallyOptions) -> Self {
        Self {
            candidates: ResultIndex::new(Category::Candidate),
            centers: ResultIndex::new(Category::Center),
            regions: ResultIndex::new(Category::Region),
            valid_votes: 0,
            ballots_processed: 0,
            total_voters: 0,
            options,
        }
    }

    /// Batch tally of a registry snapshot.
    pub fn from_snapshot(snapshot: &RegistrySnapshot, options: TallyOptions) -> Result<Self> {
        let mut session = Self::new(options);
        session.rebuild(snapshot)?;
        Ok(session)
    }

    /// Replace every index with one rebuilt from `snapshot`. The session is
    /// left as it was if any category fails to build.
    pub fn rebuild(&mut self, snapshot: &RegistrySnapshot) -> Result<()> {
        let candidates = build_category_index(Category::Candidate, snapshot, &self.options)?;
        let centers = build_category_index(Category::Center, snapshot, &self.options)?;
        let regions = build_category_index(Category::Region, snapshot, &self.options)?;

        self.valid_votes = candidates.total_votes();
        self.ballots_processed = centers.total_votes();
        self.total_voters = snapshot.total_voters;
        self.candidates = candidates;
        self.centers = centers;
        self.regions = regions;

        debug!(
            "Rebuilt session: {} valid votes, {} ballots processed, {} registered voters",
            self.valid_votes, self.ballots_processed, self.total_voters
        );
        Ok(())
    }

    /// Apply one accepted vote without rebuilding.
    ///
    /// Candidates and centers missing from their index are synthesised from
    /// `registry` with this single vote. The center's region, when the
    /// registry knows the center, gains the vote as well. A vote naming an
    /// unknown candidate or center is rejected and nothing changes.
    pub fn apply_vote(&mut self, vote: &VoteEvent, registry: &RegistrySnapshot) -> Result<()> {
        // Resolve everything up front so a rejected vote leaves no trace.
        let candidate = if self.candidates.contains(vote.candidate_number) {
            None
        } else {
            let entry = registry
                .candidate(vote.candidate_number)
                .ok_or(TallyError::UnknownCandidate(vote.candidate_number))?;
            let record = ResultRecord::candidate(entry).with_votes(1);
            self.candidates.accepts(&record)?;
            Some(record)
        };

        let center_entry = registry.center(vote.center_id);
        let center = if self.centers.contains(vote.center_id) {
            None
        } else {
            let entry = center_entry.ok_or(TallyError::UnknownCenter(vote.center_id))?;
            let record = ResultRecord::center(entry).with_votes(1);
            self.centers.accepts(&record)?;
            Some(record)
        };

        let region = match center_entry {
            Some(entry) => Some(region::region_record(
                &self.regions,
                entry.id,
                &entry.region,
                1,
                self.options.region_collisions,
            )?),
            None => None,
        };

        self.candidates.check_add(vote.candidate_number, 1)?;
        self.centers.check_add(vote.center_id, 1)?;
        if let Some(record) = &region {
            self.regions.check_add(record.id, 1)?;
        }

        match candidate {
            Some(record) => {
                debug!("Candidate {} tallied lazily", record.id);
                self.candidates.insert(record)?;
            }
            None => {
                self.candidates.add_votes(vote.candidate_number, 1)?;
            }
        }
        match center {
            Some(record) => {
                self.centers.insert(record)?;
            }
            None => {
                self.centers.add_votes(vote.center_id, 1)?;
            }
        }
        if let Some(record) = region {
            self.regions.insert(record)?;
        }

        self.valid_votes += 1;
        self.ballots_processed += 1;

        if self.options.percentages == PercentageRefresh::Eager {
            self.refresh_percentages();
        }

        debug!(
            "Voter {} voted for {} at center {} ({} valid votes)",
            vote.voter_id, vote.candidate_number, vote.center_id, self.valid_votes
        );
        Ok(())
    }

    /// Recompute stored percentages of every stale index.
    pub fn refresh_percentages(&mut self) {
        for index in [&mut self.candidates, &mut self.centers, &mut self.regions] {
            if index.percentages_stale() {
                index.recompute_percentages();
            }
        }
    }

    /// Re-sum both the candidate and center trees against the valid-vote
    /// counter.
    pub fn validate_integrity(&self) -> ReportResult<IntegrityStatus> {
        reports::validate_integrity(&self.candidates, &self.centers, self.valid_votes)
    }

    pub fn index(&self, category: Category) -> &ResultIndex {
        match category {
            Category::Candidate => &self.candidates,
            Category::Center => &self.centers,
            Category::Region => &self.regions,
        }
    }

    pub fn candidates(&self) -> &ResultIndex {
        &self.candidates
    }

    pub fn centers(&self) -> &ResultIndex {
        &self.centers
    }

    pub fn regions(&self) -> &ResultIndex {
        &self.regions
    }

    /// Running count of valid votes.
    pub fn valid_votes(&self) -> u64 {
        self.valid_votes
    }

    pub fn ballots_processed(&self) -> u64 {
        self.ballots_processed
    }

    pub fn total_voters(&self) -> u64 {
        self.total_voters
    }

    /// Override the registered voter count, e.g. when a session starts empty.
    pub fn set_total_voters(&mut self, total_voters: u64) {
        self.total_voters = total_voters;
    }

    pub fn participation(&self) -> f64 {
        compute_participation(self.total_voters, self.ballots_processed)
    }

    pub fn options(&self) -> &TallyOptions {
        &self.options
    }
}
