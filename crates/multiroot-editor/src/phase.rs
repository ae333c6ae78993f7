//! Sequential async phases.
//!
//! Editor creation and teardown are ordered lists of named phases. A phase
//! starts only after the previous one resolved; the first failure stops the
//! run and is handed back unchanged.

use std::fmt;
use std::future::Future;

use futures_util::FutureExt;
use futures_util::future::LocalBoxFuture;
use tracing::{debug, warn};

type Phase<S, E> = Box<dyn FnOnce(S) -> LocalBoxFuture<'static, Result<(), E>>>;

pub struct PhaseRunner<S, E> {
    label: &'static str,
    phases: Vec<(&'static str, Phase<S, E>)>,
}

impl<S, E> fmt::Debug for PhaseRunner<S, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PhaseRunner")
            .field("label", &self.label)
            .field("phases", &self.names())
            .finish()
    }
}

impl<S, E> PhaseRunner<S, E> {
    pub fn names(&self) -> Vec<&'static str> {
        self.phases.iter().map(|(name, _)| *name).collect()
    }
}

impl<S, E> PhaseRunner<S, E>
where
    S: Clone + 'static,
    E: fmt::Display + 'static,
{
    pub fn new(label: &'static str) -> Self {
        Self {
            label,
            phases: Vec::new(),
        }
    }

    /// Append a phase. It receives a clone of the run state.
    pub fn phase<F, Fut>(mut self, name: &'static str, phase: F) -> Self
    where
        F: FnOnce(S) -> Fut + 'static,
        Fut: Future<Output = Result<(), E>> + 'static,
    {
        self.phases
            .push((name, Box::new(move |state| phase(state).boxed_local())));
        self
    }

    pub async fn run(self, state: S) -> Result<(), E> {
        let Self { label, phases } = self;
        for (name, phase) in phases {
            debug!(run = label, phase = name, "phase started");
            if let Err(err) = phase(state.clone()).await {
                warn!(run = label, phase = name, error = %err, "phase failed");
                return Err(err);
            }
        }
        debug!(run = label, "all phases completed");
        Ok(())
    }
}
