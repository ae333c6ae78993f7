//! Exclusive writer handed to change blocks.

use smol_str::SmolStr;

use super::document::{Document, RootElement};
use super::node::{Fragment, Node};
use crate::error::ModelError;

/// Insertion point inside a root, counted in child nodes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Position {
    Offset(usize),
    End,
}

/// A range of child nodes of one root.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RootRange {
    root: SmolStr,
    start: usize,
    end: usize,
}

impl RootRange {
    pub fn root(&self) -> &str {
        &self.root
    }

    pub fn start(&self) -> usize {
        self.start
    }

    pub fn end(&self) -> usize {
        self.end
    }

    pub fn is_collapsed(&self) -> bool {
        self.start == self.end
    }
}

/// Mutation access to the document for the duration of one batch.
///
/// Every operation validates its arguments before touching the tree, so a
/// failed operation leaves the document as it was. Each applied operation
/// bumps the document version.
pub struct Writer<'a> {
    document: &'a mut Document,
    applied: usize,
}

impl<'a> Writer<'a> {
    pub(crate) fn new(document: &'a mut Document) -> Self {
        Self {
            document,
            applied: 0,
        }
    }

    /// Number of operations applied through this writer.
    pub(crate) fn applied(&self) -> usize {
        self.applied
    }

    pub fn root(&self, name: &str) -> Option<&RootElement> {
        self.document.root(name)
    }

    /// Insert `fragment` into `root` at `position`.
    pub fn insert(
        &mut self,
        fragment: impl Into<Fragment>,
        root: &str,
        position: Position,
    ) -> Result<(), ModelError> {
        let fragment = fragment.into();
        let target = self.document.root_mut(root)?;
        let len = target.child_count();
        let offset = match position {
            Position::Offset(offset) if offset > len => {
                return Err(ModelError::OutOfRange {
                    root: SmolStr::new(root),
                    offset,
                    len,
                });
            }
            Position::Offset(offset) => offset,
            Position::End => len,
        };

        if fragment.is_empty() {
            return Ok(());
        }

        target
            .children_mut()
            .splice(offset..offset, fragment.into_nodes());
        self.mark_applied();
        Ok(())
    }

    /// Range covering all children of `root`.
    pub fn create_range_in(&self, root: &str) -> Result<RootRange, ModelError> {
        let target = self.document.root(root).ok_or_else(|| ModelError::UnknownRoot {
            name: SmolStr::new(root),
        })?;
        Ok(RootRange {
            root: SmolStr::new(root),
            start: 0,
            end: target.child_count(),
        })
    }

    /// Remove the nodes in `range`, returning them.
    pub fn remove(&mut self, range: RootRange) -> Result<Vec<Node>, ModelError> {
        let target = self.document.root_mut(&range.root)?;
        let len = target.child_count();
        if range.start > range.end || range.end > len {
            return Err(ModelError::OutOfRange {
                root: range.root,
                offset: range.end,
                len,
            });
        }

        if range.is_collapsed() {
            return Ok(Vec::new());
        }

        let removed = target.children_mut().drain(range.start..range.end).collect();
        self.mark_applied();
        Ok(removed)
    }

    fn mark_applied(&mut self) {
        self.applied += 1;
        self.document.bump_version();
    }
}
