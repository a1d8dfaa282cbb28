use crate::model::ResultRecord;
use std::cmp::{max, Ordering};

pub(crate) type Link = Option<Box<Node>>;

#[derive(Debug)]
pub(crate) struct Node {
    pub(crate) record: ResultRecord,
    pub(crate) height: i32,
    pub(crate) left: Link,
    pub(crate) right: Link,
}

/// Whether an insert created a node or merged into an existing one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertOutcome {
    Inserted,
    Merged,
}

impl Node {
    fn leaf(record: ResultRecord) -> Box<Node> {
        Box::new(Node {
            record,
            height: 1,
            left: None,
            right: None,
        })
    }

    fn update_height(&mut self) {
        self.height = 1 + max(height(&self.left), height(&self.right));
    }

    fn balance_factor(&self) -> i32 {
        height(&self.left) - height(&self.right)
    }
}

pub(crate) fn height(link: &Link) -> i32 {
    link.as_ref().map_or(0, |node| node.height)
}

fn rotate_right(mut y: Box<Node>) -> Box<Node> {
    let mut x = match y.left.take() {
        Some(x) => x,
        None => return y,
    };
    y.left = x.right.take();
    y.update_height();
    x.right = Some(y);
    x.update_height();
    x
}

fn rotate_left(mut x: Box<Node>) -> Box<Node> {
    let mut y = match x.right.take() {
        Some(y) => y,
        None => return x,
    };
    x.right = y.left.take();
    x.update_height();
    y.left = Some(x);
    y.update_height();
    y
}

/// Restore the AVL invariant at `node`, assuming both subtrees satisfy it
/// and differ in height by at most two.
fn rebalance(mut node: Box<Node>) -> Box<Node> {
    node.update_height();
    let balance = node.balance_factor();

    if balance > 1 {
        // Left-right case
        if node.left.as_ref().map_or(0, |l| l.balance_factor()) < 0 {
            node.left = node.left.take().map(rotate_left);
        }
        return rotate_right(node);
    }

    if balance < -1 {
        // Right-left case
        if node.right.as_ref().map_or(0, |r| r.balance_factor()) > 0 {
            node.right = node.right.take().map(rotate_right);
        }
        return rotate_left(node);
    }

    node
}

/// Insert `record` below `link`, merging its votes into an existing node with
/// the same id. Returns the new subtree root.
pub(crate) fn insert(link: Link, record: ResultRecord, outcome: &mut InsertOutcome) -> Box<Node> {
    let mut node = match link {
        Some(node) => node,
        None => {
            *outcome = InsertOutcome::Inserted;
            return Node::leaf(record);
        }
    };

    match record.id.cmp(&node.record.id) {
        Ordering::Less => node.left = Some(insert(node.left.take(), record, outcome)),
        Ordering::Greater => node.right = Some(insert(node.right.take(), record, outcome)),
        Ordering::Equal => {
            node.record.votes += record.votes;
            *outcome = InsertOutcome::Merged;
            return node;
        }
    }

    rebalance(node)
}

/// Remove the node keyed by `id` below `link`. The removed record, if any, is
/// handed back through `removed`.
pub(crate) fn remove(link: Link, id: i64, removed: &mut Option<ResultRecord>) -> Link {
    let mut node = link?;

    match id.cmp(&node.record.id) {
        Ordering::Less => node.left = remove(node.left.take(), id, removed),
        Ordering::Greater => node.right = remove(node.right.take(), id, removed),
        Ordering::Equal => match (node.left.take(), node.right.take()) {
            (None, None) => {
                *removed = Some(node.record);
                return None;
            }
            (Some(child), None) | (None, Some(child)) => {
                *removed = Some(node.record);
                return Some(child);
            }
            (Some(left), Some(right)) => {
                let (right, successor) = take_min(right);
                node.left = Some(left);
                node.right = right;
                *removed = Some(std::mem::replace(&mut node.record, successor));
            }
        },
    }

    Some(rebalance(node))
}

/// Detach the minimum record of a subtree, rebalancing on the way back up.
fn take_min(mut node: Box<Node>) -> (Link, ResultRecord) {
    match node.left.take() {
        None => {
            let right = node.right.take();
            (right, node.record)
        }
        Some(left) => {
            let (left, min) = take_min(left);
            node.left = left;
            (Some(rebalance(node)), min)
        }
    }
}

pub(crate) fn find(link: &Link, id: i64) -> Option<&ResultRecord> {
    let mut current = link.as_deref();
    while let Some(node) = current {
        current = match id.cmp(&node.record.id) {
            Ordering::Less => node.left.as_deref(),
            Ordering::Greater => node.right.as_deref(),
            Ordering::Equal => return Some(&node.record),
        };
    }
    None
}

pub(crate) fn find_mut(link: &mut Link, id: i64) -> Option<&mut ResultRecord> {
    let mut current = link.as_deref_mut();
    while let Some(node) = current {
        current = match id.cmp(&node.record.id) {
            Ordering::Less => node.left.as_deref_mut(),
            Ordering::Greater => node.right.as_deref_mut(),
            Ordering::Equal => return Some(&mut node.record),
        };
    }
    None
}

/// Pre-order walk: root, then left subtree, then right subtree.
pub(crate) fn find_by_name<'a>(link: &'a Link, name: &str) -> Option<&'a ResultRecord> {
    let node = link.as_deref()?;
    if node.record.name == name {
        return Some(&node.record);
    }
    find_by_name(&node.left, name).or_else(|| find_by_name(&node.right, name))
}

pub(crate) fn refresh_percentages(link: &mut Link, total: u64) {
    if let Some(node) = link {
        node.record.percentage = crate::model::share(node.record.votes, total);
        refresh_percentages(&mut node.left, total);
        refresh_percentages(&mut node.right, total);
    }
}

/// Read-only view of one tree node, for callers that care about shape.
#[derive(Debug, Clone, Copy)]
pub struct NodeRef<'a>(pub(crate) &'a Node);

impl<'a> NodeRef<'a> {
    pub fn record(&self) -> &'a ResultRecord {
        &self.0.record
    }

    pub fn left(&self) -> Option<NodeRef<'a>> {
        self.0.left.as_deref().map(NodeRef)
    }

    pub fn right(&self) -> Option<NodeRef<'a>> {
        self.0.right.as_deref().map(NodeRef)
    }

    pub fn height(&self) -> i32 {
        self.0.height
    }

    /// height(left) - height(right)
    pub fn balance_factor(&self) -> i32 {
        self.0.balance_factor()
    }
}
