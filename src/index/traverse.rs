use super::node::Node;
use crate::model::ResultRecord;

/// Visiting order for [`Traverse`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TraversalOrder {
    /// Ascending by id.
    InOrder,
    PreOrder,
    PostOrder,
}

#[derive(Debug, Clone, Copy)]
enum Frame<'a> {
    Expand(&'a Node),
    Emit(&'a Node),
}

/// Lazy walk over the records of a [`ResultIndex`](super::ResultIndex).
///
/// Keeps an explicit stack, so a walk never recurses and costs O(height)
/// extra space. Cloning a `Traverse` forks the walk at its current position.
#[derive(Debug, Clone)]
pub struct Traverse<'a> {
    order: TraversalOrder,
    stack: Vec<Frame<'a>>,
}

impl<'a> Traverse<'a> {
    pub(crate) fn new(root: Option<&'a Node>, order: TraversalOrder) -> Self {
        Self {
            order,
            stack: root.map(Frame::Expand).into_iter().collect(),
        }
    }
}

impl<'a> Iterator for Traverse<'a> {
    type Item = &'a ResultRecord;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let node = match self.stack.pop()? {
                Frame::Emit(node) => return Some(&node.record),
                Frame::Expand(node) => node,
            };

            // Frames are popped in reverse push order.
            let left = node.left.as_deref().map(Frame::Expand);
            let right = node.right.as_deref().map(Frame::Expand);
            match self.order {
                TraversalOrder::InOrder => {
                    self.stack.extend(right);
                    self.stack.push(Frame::Emit(node));
                    self.stack.extend(left);
                }
                TraversalOrder::PreOrder => {
                    self.stack.extend(right);
                    self.stack.extend(left);
                    self.stack.push(Frame::Emit(node));
                }
                TraversalOrder::PostOrder => {
                    self.stack.push(Frame::Emit(node));
                    self.stack.extend(right);
                    self.stack.extend(left);
                }
            }
        }
    }
}
