//! Document model with named roots and queued, exclusive mutation.
//!
//! All tree mutation goes through change blocks that receive a `Writer`.
//! At most one block runs at a time: a block enqueued while another one is
//! running is deferred until the running one completes, then the queue is
//! drained in FIFO order. Once the queue is empty and at least one operation
//! was applied, the `change:data` listeners fire once.

mod document;
mod node;
mod writer;

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::fmt;

use smol_str::SmolStr;
use tracing::{debug, trace, warn};

use crate::error::ModelError;
use crate::observable::{Emitter, SubscriptionId};

pub use document::{Document, ROOT_ELEMENT_TYPE, RootElement};
pub use node::{Element, Fragment, Node, Text};
pub use writer::{Position, RootRange, Writer};

/// Root names and version as of the last completed block.
#[derive(Debug, Default)]
struct Committed {
    version: u64,
    roots: Vec<SmolStr>,
}

type PendingChange = Box<dyn FnOnce(&mut Writer<'_>) -> Result<(), ModelError>>;

/// Marks the model as busy for the lifetime of the guard.
struct ChangeGuard<'a>(&'a Cell<bool>);

impl<'a> ChangeGuard<'a> {
    fn enter(flag: &'a Cell<bool>) -> Self {
        flag.set(true);
        Self(flag)
    }
}

impl Drop for ChangeGuard<'_> {
    fn drop(&mut self) {
        self.0.set(false);
    }
}

/// The document model shared by every root of an editor.
#[derive(Default)]
pub struct Model {
    document: RefCell<Document>,
    pending: RefCell<VecDeque<PendingChange>>,
    in_change: Cell<bool>,
    committed: RefCell<Committed>,
    change_data: Emitter<u64>,
}

impl fmt::Debug for Model {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let committed = self.committed.borrow();
        f.debug_struct("Model")
            .field("version", &committed.version)
            .field("roots", &committed.roots)
            .field("in_change", &self.in_change.get())
            .finish_non_exhaustive()
    }
}

impl Model {
    pub fn new() -> Self {
        Self::default()
    }

    /// Document version as of the last completed change.
    pub fn version(&self) -> u64 {
        self.committed.borrow().version
    }

    /// Bump the document version by one, returning the new value.
    pub fn bump_version(&self) -> Result<u64, ModelError> {
        let mut document = self
            .document
            .try_borrow_mut()
            .map_err(|_| ModelError::ChangeInProgress)?;
        let version = document.bump_version();
        drop(document);
        self.commit();
        Ok(version)
    }

    /// True while a change block is executing.
    pub fn is_changing(&self) -> bool {
        self.in_change.get()
    }

    /// Read the document.
    ///
    /// Fails with `ChangeInProgress` from inside a change block; use the
    /// block's writer there.
    pub fn read<R>(&self, f: impl FnOnce(&Document) -> R) -> Result<R, ModelError> {
        let document = self
            .document
            .try_borrow()
            .map_err(|_| ModelError::ChangeInProgress)?;
        Ok(f(&document))
    }

    /// Roots cannot be created or detached inside a change block, so this is
    /// accurate at any time.
    pub fn has_root(&self, name: &str) -> bool {
        self.committed.borrow().roots.iter().any(|root| root == name)
    }

    pub fn root_names(&self) -> Vec<SmolStr> {
        self.committed.borrow().roots.clone()
    }

    /// Clone of the named root.
    pub fn root(&self, name: &str) -> Result<RootElement, ModelError> {
        self.read(|document| document.root(name).cloned())?
            .ok_or_else(|| ModelError::UnknownRoot {
                name: SmolStr::new(name),
            })
    }

    /// Add an empty root to the document.
    pub fn create_root(&self, root_type: &str, name: &str) -> Result<(), ModelError> {
        let mut document = self
            .document
            .try_borrow_mut()
            .map_err(|_| ModelError::ChangeInProgress)?;
        document.create_root(root_type, name)?;
        drop(document);
        self.commit();
        debug!(root = %name, root_type, "created model root");
        Ok(())
    }

    /// Take a root out of the document and return it.
    ///
    /// This does not bump the version; callers decide how to account for it.
    pub fn detach_root(&self, name: &str) -> Result<RootElement, ModelError> {
        if self.in_change.get() {
            return Err(ModelError::ChangeInProgress);
        }
        let mut document = self
            .document
            .try_borrow_mut()
            .map_err(|_| ModelError::ChangeInProgress)?;
        let root = document
            .detach_root(name)
            .ok_or_else(|| ModelError::UnknownRoot {
                name: SmolStr::new(name),
            })?;
        drop(document);
        self.commit();
        debug!(root = %name, "detached model root");
        Ok(root)
    }

    /// Queue a change block.
    ///
    /// When no block is running the queue is drained right away and the first
    /// error of the drained blocks is returned. When called from inside a
    /// running block the change is deferred and `Ok(())` is returned; its
    /// outcome is reported to whoever drains the queue.
    pub fn enqueue_change<F>(&self, change: F) -> Result<(), ModelError>
    where
        F: FnOnce(&mut Writer<'_>) -> Result<(), ModelError> + 'static,
    {
        self.pending.borrow_mut().push_back(Box::new(change));
        if self.in_change.get() {
            trace!(
                queued = self.pending.borrow().len(),
                "change deferred until the running block completes"
            );
            return Ok(());
        }

        let mut changed = false;
        let result = {
            let _guard = ChangeGuard::enter(&self.in_change);
            self.drain_pending(&mut changed)
        };
        if changed {
            self.fire_change_data();
        }
        result
    }

    /// Run a change block immediately and return its value.
    ///
    /// Blocks enqueued from inside it run after it, before this returns.
    pub fn change<R>(
        &self,
        change: impl FnOnce(&mut Writer<'_>) -> Result<R, ModelError>,
    ) -> Result<R, ModelError> {
        if self.in_change.get() {
            return Err(ModelError::ChangeInProgress);
        }

        let mut changed = false;
        let result = {
            let _guard = ChangeGuard::enter(&self.in_change);
            let (applied, result) = self.run_block(change);
            changed |= applied > 0;
            let queued = self.drain_pending(&mut changed);
            result.and_then(|value| queued.map(|()| value))
        };
        if changed {
            self.fire_change_data();
        }
        result
    }

    /// Listen for committed data changes. The listener receives the version.
    pub fn on_change_data(&self, listener: impl Fn(&u64) + 'static) -> SubscriptionId {
        self.change_data.subscribe(listener)
    }

    pub fn off_change_data(&self, id: SubscriptionId) -> bool {
        self.change_data.unsubscribe(id)
    }

    /// Drop all roots, pending blocks and listeners.
    pub fn destroy(&self) -> Result<(), ModelError> {
        let mut document = self
            .document
            .try_borrow_mut()
            .map_err(|_| ModelError::ChangeInProgress)?;
        document.clear();
        drop(document);
        self.pending.borrow_mut().clear();
        self.change_data.clear();
        self.commit();
        debug!("model destroyed");
        Ok(())
    }

    fn drain_pending(&self, changed: &mut bool) -> Result<(), ModelError> {
        let mut first_error = None;
        loop {
            let next = self.pending.borrow_mut().pop_front();
            let Some(change) = next else { break };
            let (applied, result) = self.run_block(change);
            *changed |= applied > 0;
            if let Err(err) = result {
                warn!(error = %err, "queued change failed");
                first_error.get_or_insert(err);
            }
        }
        first_error.map_or(Ok(()), Err)
    }

    fn run_block<R>(
        &self,
        change: impl FnOnce(&mut Writer<'_>) -> Result<R, ModelError>,
    ) -> (usize, Result<R, ModelError>) {
        let (applied, result) = {
            let Ok(mut document) = self.document.try_borrow_mut() else {
                return (0, Err(ModelError::ChangeInProgress));
            };
            let mut writer = Writer::new(&mut document);
            let result = change(&mut writer);
            (writer.applied(), result)
        };
        if applied > 0 {
            self.commit();
        }
        (applied, result)
    }

    fn commit(&self) {
        let document = self.document.borrow();
        let mut committed = self.committed.borrow_mut();
        committed.version = document.version();
        committed.roots = document.root_names().cloned().collect();
    }

    fn fire_change_data(&self) {
        let version = self.version();
        trace!(version, "change:data");
        self.change_data.emit(&version);
    }
}
