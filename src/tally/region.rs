use super::{Result, TallyError};
use crate::index::ResultIndex;
use crate::model::{Category, ResultRecord};
use lazy_static::lazy_static;
use log::warn;
use regex::Regex;

/// How region names whose keys collide are told apart.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegionCollisionPolicy {
    /// Distinct names sharing a key fold into the record inserted first.
    Merge,
    /// A colliding name takes the next free key, in order of first appearance.
    Probe,
}

/// Trim a region name and collapse internal whitespace runs to one space.
pub fn normalize_region_name(name: &str) -> String {
    lazy_static! {
        static ref WHITESPACE_RX: Regex = Regex::new(r"\s+").unwrap();
    }
    WHITESPACE_RX.replace_all(name.trim(), " ").into_owned()
}

/// Sum of the Unicode scalar values of `name`. Deterministic, but distinct
/// names can share a key ("Amor" and "Roma" both map to 399).
pub fn region_key(name: &str) -> i64 {
    name.chars().map(|c| c as i64).sum()
}

/// Build the region record that `votes` ballots from `center_id` contribute
/// to, with its key resolved against what `index` already holds.
pub(crate) fn region_record(
    index: &ResultIndex,
    center_id: i64,
    region: &str,
    votes: u64,
    policy: RegionCollisionPolicy,
) -> Result<ResultRecord> {
    let name = normalize_region_name(region);
    if name.is_empty() {
        return Err(TallyError::EmptyRegion(center_id));
    }

    let mut record = ResultRecord::new(region_key(&name), &name, Category::Region, votes);
    match policy {
        RegionCollisionPolicy::Merge => {
            if let Some(existing) = index.get(record.id) {
                if existing.name != record.name {
                    warn!(
                        "Region '{}' shares key {} with '{}'; votes are merged",
                        record.name, record.id, existing.name
                    );
                }
            }
        }
        RegionCollisionPolicy::Probe => {
            while let Some(existing) = index.get(record.id) {
                if existing.name == record.name {
                    break;
                }
                record.id += 1;
            }
        }
    }
    Ok(record)
}
