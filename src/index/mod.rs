//! Height-balanced ordered index of the result records of one category.

mod node;
mod traverse;

pub use node::{InsertOutcome, NodeRef};
pub use traverse::{TraversalOrder, Traverse};

use crate::model::{share, Category, ResultRecord};
use itertools::Itertools;
use node::Link;

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum IndexError {
    #[error("Invalid id {0}: ids must be positive")]
    InvalidId(i64),
    #[error("Category mismatch: index holds {expected} records, got a {found} record")]
    CategoryMismatch { expected: Category, found: Category },
    #[error("Vote total overflow while adding to id {0}")]
    VoteOverflow(i64),
}

pub type Result<T> = std::result::Result<T, IndexError>;

/// AVL tree of [`ResultRecord`]s keyed by id.
///
/// The index owns every record, keeps the category vote total in step with
/// every mutation and tracks whether stored percentages are stale.
#[derive(Debug)]
pub struct ResultIndex {
    root: Link,
    category: Category,
    total_votes: u64,
    len: usize,
    stale: bool,
}

impl ResultIndex {
    pub fn new(category: Category) -> Self {
        Self {
            root: None,
            category,
            total_votes: 0,
            len: 0,
            stale: false,
        }
    }

    pub fn category(&self) -> Category {
        self.category
    }

    /// Sum of the votes of all records, maintained incrementally.
    pub fn total_votes(&self) -> u64 {
        self.total_votes
    }

    /// Number of records (nodes).
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.root.is_none()
    }

    pub fn height(&self) -> i32 {
        node::height(&self.root)
    }

    /// Insert a record, or add its votes to the record already stored under
    /// the same id. Nothing is modified when an error is returned.
    pub fn insert(&mut self, mut record: ResultRecord) -> Result<InsertOutcome> {
        self.accepts(&record)?;
        record.percentage = 0.0;
        let total = self.checked_total(record.id, record.votes)?;

        let votes = record.votes;
        let mut outcome = InsertOutcome::Inserted;
        self.root = Some(node::insert(self.root.take(), record, &mut outcome));

        if outcome == InsertOutcome::Inserted {
            self.len += 1;
        }
        self.total_votes = total;
        self.stale = self.stale || votes > 0;
        Ok(outcome)
    }

    /// Add `votes` to the record stored under `id` in place. Returns `None`
    /// when no such record exists.
    pub fn add_votes(&mut self, id: i64, votes: u64) -> Result<Option<&ResultRecord>> {
        let total = self.checked_total(id, votes)?;

        match node::find_mut(&mut self.root, id) {
            Some(record) => {
                record.votes += votes;
                self.total_votes = total;
                self.stale = self.stale || votes > 0;
                Ok(Some(&*record))
            }
            None => Ok(None),
        }
    }

    pub fn get(&self, id: i64) -> Option<&ResultRecord> {
        node::find(&self.root, id)
    }

    pub fn contains(&self, id: i64) -> bool {
        self.get(id).is_some()
    }

    /// First record named `name` in pre-order (root, left, right). Linear in
    /// the size of the index; names are not indexed.
    pub fn find_by_name(&self, name: &str) -> Option<&ResultRecord> {
        node::find_by_name(&self.root, name)
    }

    /// Remove the record stored under `id`. Its votes leave the category total.
    pub fn remove(&mut self, id: i64) -> Option<ResultRecord> {
        let mut removed = None;
        self.root = node::remove(self.root.take(), id, &mut removed);

        if let Some(record) = &removed {
            self.len -= 1;
            self.total_votes -= record.votes;
            self.stale = true;
        }
        removed
    }

    /// Drop every record and reset the total.
    pub fn clear(&mut self) {
        self.root = None;
        self.total_votes = 0;
        self.len = 0;
        self.stale = false;
    }

    /// Records in ascending id order.
    pub fn iter(&self) -> Traverse<'_> {
        self.traverse(TraversalOrder::InOrder)
    }

    pub fn traverse(&self, order: TraversalOrder) -> Traverse<'_> {
        Traverse::new(self.root.as_deref(), order)
    }

    /// In-order walk restricted to `category`. Every record of an index
    /// already shares its category, so this only filters foreign records out
    /// of a walk that is handed an arbitrary category.
    pub fn iter_category(&self, category: Category) -> impl Iterator<Item = &ResultRecord> + '_ {
        self.iter().filter(move |record| record.category == category)
    }

    /// All records sorted by votes. Records with equal votes keep ascending id
    /// order whichever direction is requested.
    pub fn ranked(&self, descending: bool) -> Vec<&ResultRecord> {
        if descending {
            self.iter().sorted_by(|a, b| b.votes.cmp(&a.votes)).collect()
        } else {
            self.iter().sorted_by(|a, b| a.votes.cmp(&b.votes)).collect()
        }
    }

    /// Recompute every stored percentage from the current category total.
    pub fn recompute_percentages(&mut self) {
        node::refresh_percentages(&mut self.root, self.total_votes);
        self.stale = false;
    }

    /// True when votes changed since the last [`recompute_percentages`](Self::recompute_percentages).
    pub fn percentages_stale(&self) -> bool {
        self.stale
    }

    /// Percentage of `record` within this index: the stored value when fresh,
    /// otherwise derived from its votes and the current total.
    pub fn percentage_of(&self, record: &ResultRecord) -> f64 {
        if self.stale {
            share(record.votes, self.total_votes)
        } else {
            record.percentage
        }
    }

    /// Re-sum the votes of every record by walking the tree, independently of
    /// the maintained total.
    pub fn recount(&self) -> u64 {
        self.iter().map(|record| record.votes).sum()
    }

    pub fn root(&self) -> Option<NodeRef<'_>> {
        self.root.as_deref().map(NodeRef)
    }

    /// Check that adding `votes` under `id` would not overflow the category
    /// total.
    pub fn check_add(&self, id: i64, votes: u64) -> Result<()> {
        self.checked_total(id, votes).map(|_| ())
    }

    fn checked_total(&self, id: i64, votes: u64) -> Result<u64> {
        self.total_votes
            .checked_add(votes)
            .ok_or(IndexError::VoteOverflow(id))
    }

    /// Check that `record` could be inserted: positive id, matching category.
    pub fn accepts(&self, record: &ResultRecord) -> Result<()> {
        if record.id <= 0 {
            return Err(IndexError::InvalidId(record.id));
        }
        if record.category != self.category {
            return Err(IndexError::CategoryMismatch {
                expected: self.category,
                found: record.category,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candidate(id: i64, votes: u64) -> ResultRecord {
        ResultRecord::new(id, &format!("Candidate {}", id), Category::Candidate, votes)
    }

    /// Walk the tree checking stored heights and balance factors; returns the
    /// subtree height.
    fn assert_balanced(node: Option<NodeRef<'_>>) -> i32 {
        match node {
            None => 0,
            Some(node) => {
                let left = assert_balanced(node.left());
                let right = assert_balanced(node.right());
                assert_eq!(node.height(), 1 + left.max(right), "stale height at {}", node.record().id);
                assert!(
                    (left - right).abs() <= 1,
                    "balance factor {} at {}",
                    left - right,
                    node.record().id
                );
                node.height()
            }
        }
    }

    fn assert_height_bound(index: &ResultIndex) {
        let n = index.len() as f64;
        let bound = 1.44 * (n + 2.0).log2();
        assert!(
            (index.height() as f64) <= bound,
            "height {} exceeds {} for {} nodes",
            index.height(),
            bound,
            index.len()
        );
    }

    fn ids(index: &ResultIndex) -> Vec<i64> {
        index.iter().map(|r| r.id).collect()
    }

    #[test]
    fn ascending_inserts_stay_balanced() {
        let mut index = ResultIndex::new(Category::Candidate);
        for id in 1..=1000 {
            index.insert(candidate(id, 1)).unwrap();
            if id % 97 == 0 {
                assert_balanced(index.root());
            }
        }
        assert_balanced(index.root());
        assert_height_bound(&index);
        assert_eq!(index.len(), 1000);
        assert_eq!(index.total_votes(), 1000);
    }

    #[test]
    fn mixed_inserts_and_removals_stay_balanced() {
        let mut index = ResultIndex::new(Category::Candidate);
        // 7919 is prime, so this visits every id in 1..=1000 once in a scrambled order.
        let scrambled: Vec<i64> = (0..1000).map(|i| (i * 7919) % 1000 + 1).collect();
        for &id in &scrambled {
            index.insert(candidate(id, id as u64)).unwrap();
        }
        assert_balanced(index.root());
        assert_height_bound(&index);

        for &id in scrambled.iter().step_by(3) {
            assert_eq!(index.remove(id).map(|r| r.id), Some(id));
            assert_balanced(index.root());
        }
        assert_height_bound(&index);

        let remaining = ids(&index);
        assert!(remaining.windows(2).all(|w| w[0] < w[1]));
        assert_eq!(remaining.len(), index.len());
        assert_eq!(index.total_votes(), index.recount());
    }

    #[test]
    fn zigzag_inserts_trigger_double_rotations() {
        let mut index = ResultIndex::new(Category::Candidate);
        for id in [30, 10, 20] {
            index.insert(candidate(id, 0)).unwrap();
        }
        assert_eq!(index.root().unwrap().record().id, 20);

        let mut index = ResultIndex::new(Category::Candidate);
        for id in [10, 30, 20] {
            index.insert(candidate(id, 0)).unwrap();
        }
        assert_eq!(index.root().unwrap().record().id, 20);
        assert_balanced(index.root());
    }

    #[test]
    fn duplicate_id_merges_votes() {
        let mut index = ResultIndex::new(Category::Candidate);
        assert_eq!(index.insert(candidate(7, 3)).unwrap(), InsertOutcome::Inserted);
        assert_eq!(index.insert(candidate(7, 4)).unwrap(), InsertOutcome::Merged);

        assert_eq!(index.len(), 1);
        assert_eq!(index.get(7).unwrap().votes, 7);
        assert_eq!(index.total_votes(), 7);
    }

    #[test]
    fn rejects_invalid_ids_and_foreign_categories() {
        let mut index = ResultIndex::new(Category::Candidate);
        assert_eq!(index.insert(candidate(0, 1)), Err(IndexError::InvalidId(0)));
        assert_eq!(index.insert(candidate(-4, 1)), Err(IndexError::InvalidId(-4)));

        let center = ResultRecord::new(1, "School", Category::Center, 1);
        assert_eq!(
            index.insert(center),
            Err(IndexError::CategoryMismatch {
                expected: Category::Candidate,
                found: Category::Center,
            })
        );
        assert!(index.is_empty());
        assert_eq!(index.total_votes(), 0);
    }

    #[test]
    fn overflow_leaves_index_untouched() {
        let mut index = ResultIndex::new(Category::Candidate);
        index.insert(candidate(1, u64::MAX - 1)).unwrap();
        assert_eq!(index.insert(candidate(2, 5)), Err(IndexError::VoteOverflow(2)));
        assert_eq!(index.add_votes(1, 2), Err(IndexError::VoteOverflow(1)));
        assert_eq!(index.check_add(7, 2), Err(IndexError::VoteOverflow(7)));
        assert_eq!(index.check_add(1, 1), Ok(()));

        assert_eq!(index.len(), 1);
        assert_eq!(index.get(1).unwrap().votes, u64::MAX - 1);
        assert_eq!(index.total_votes(), u64::MAX - 1);
    }

    #[test]
    fn add_votes_updates_record_and_total() {
        let mut index = ResultIndex::new(Category::Candidate);
        index.insert(candidate(1, 1)).unwrap();
        index.recompute_percentages();

        assert_eq!(index.add_votes(1, 2).unwrap().map(|r| r.votes), Some(3));
        assert_eq!(index.add_votes(9, 2).unwrap(), None);
        assert_eq!(index.total_votes(), 3);
        assert!(index.percentages_stale());
    }

    #[test]
    fn percentages_follow_category_total() {
        let mut index = ResultIndex::new(Category::Candidate);
        for (id, votes) in [(1, 3), (2, 5), (3, 0), (4, 11)] {
            index.insert(candidate(id, votes)).unwrap();
        }
        index.recompute_percentages();

        let total = index.total_votes() as f64;
        for record in index.iter() {
            assert!((record.percentage - record.votes as f64 / total * 100.0).abs() < 1e-6);
        }
        assert!(!index.percentages_stale());
    }

    #[test]
    fn percentages_are_zero_without_votes() {
        let mut index = ResultIndex::new(Category::Candidate);
        index.insert(candidate(1, 0)).unwrap();
        index.insert(candidate(2, 0)).unwrap();
        index.recompute_percentages();
        assert!(index.iter().all(|r| r.percentage == 0.0));
    }

    #[test]
    fn stale_percentages_are_derived_on_read() {
        let mut index = ResultIndex::new(Category::Candidate);
        index.insert(candidate(1, 1)).unwrap();
        index.insert(candidate(2, 1)).unwrap();
        index.recompute_percentages();
        index.add_votes(1, 2).unwrap();

        let record = index.get(1).unwrap();
        assert_eq!(record.percentage, 50.0);
        assert_eq!(index.percentage_of(record), 75.0);
    }

    #[test]
    fn traversal_orders() {
        let mut index = ResultIndex::new(Category::Candidate);
        for id in [4, 2, 6, 1, 3, 5, 7] {
            index.insert(candidate(id, 0)).unwrap();
        }
        let walk = |order: TraversalOrder| index.traverse(order).map(|r| r.id).collect::<Vec<_>>();

        assert_eq!(walk(TraversalOrder::InOrder), vec![1, 2, 3, 4, 5, 6, 7]);
        assert_eq!(walk(TraversalOrder::PreOrder), vec![4, 2, 1, 3, 6, 5, 7]);
        assert_eq!(walk(TraversalOrder::PostOrder), vec![1, 3, 2, 5, 7, 6, 4]);
    }

    #[test]
    fn traversal_is_restartable() {
        let mut index = ResultIndex::new(Category::Candidate);
        for id in 1..=5 {
            index.insert(candidate(id, 0)).unwrap();
        }
        let mut walk = index.iter();
        walk.next();
        let fork = walk.clone();

        assert_eq!(walk.map(|r| r.id).collect::<Vec<_>>(), vec![2, 3, 4, 5]);
        assert_eq!(fork.map(|r| r.id).collect::<Vec<_>>(), vec![2, 3, 4, 5]);
        assert_eq!(index.iter().count(), 5);
        assert_eq!(index.iter_category(Category::Candidate).count(), 5);
        assert_eq!(index.iter_category(Category::Region).count(), 0);
    }

    #[test]
    fn ranking_is_stable_by_ascending_id() {
        let mut index = ResultIndex::new(Category::Candidate);
        for (id, votes) in [(5, 2), (3, 9), (1, 2), (4, 9), (2, 0)] {
            index.insert(candidate(id, votes)).unwrap();
        }

        let descending: Vec<_> = index.ranked(true).iter().map(|r| r.id).collect();
        assert_eq!(descending, vec![3, 4, 1, 5, 2]);

        let ascending: Vec<_> = index.ranked(false).iter().map(|r| r.id).collect();
        assert_eq!(ascending, vec![2, 1, 5, 3, 4]);
    }

    #[test]
    fn find_by_name_prefers_pre_order() {
        let mut index = ResultIndex::new(Category::Candidate);
        index.insert(ResultRecord::new(2, "Twin", Category::Candidate, 0)).unwrap();
        index.insert(ResultRecord::new(1, "Twin", Category::Candidate, 0)).unwrap();
        index.insert(ResultRecord::new(3, "Solo", Category::Candidate, 0)).unwrap();

        assert_eq!(index.find_by_name("Twin").map(|r| r.id), Some(2));
        assert_eq!(index.find_by_name("Solo").map(|r| r.id), Some(3));
        assert!(index.find_by_name("Nobody").is_none());
    }

    #[test]
    fn empty_index_queries_are_empty() {
        let index = ResultIndex::new(Category::Region);
        assert!(index.get(1).is_none());
        assert!(index.find_by_name("North").is_none());
        assert!(index.ranked(true).is_empty());
        assert_eq!(index.iter().count(), 0);
        assert_eq!(index.height(), 0);
    }

    #[test]
    fn remove_leaf_then_two_child_parent() {
        let mut index = ResultIndex::new(Category::Candidate);
        for id in [50, 30, 70, 20, 40, 60, 80, 35] {
            index.insert(candidate(id, 1)).unwrap();
        }
        // 35 is a leaf under 40; 30 has children 20 and 40.
        assert_eq!(index.remove(35).map(|r| r.id), Some(35));
        assert_balanced(index.root());
        assert_eq!(index.remove(30).map(|r| r.id), Some(30));
        assert_balanced(index.root());

        assert_eq!(ids(&index), vec![20, 40, 50, 60, 70, 80]);
        assert_eq!(index.total_votes(), 6);
        assert_eq!(index.len(), 6);
    }

    #[test]
    fn remove_missing_id_is_not_found() {
        let mut index = ResultIndex::new(Category::Candidate);
        index.insert(candidate(1, 4)).unwrap();
        assert!(index.remove(2).is_none());
        assert_eq!(index.total_votes(), 4);
        assert_eq!(index.len(), 1);
    }

    #[test]
    fn clear_resets_everything() {
        let mut index = ResultIndex::new(Category::Center);
        index.insert(ResultRecord::new(1, "School", Category::Center, 10)).unwrap();
        index.clear();
        assert!(index.is_empty());
        assert_eq!(index.total_votes(), 0);
        assert_eq!(index.len(), 0);
    }
}
