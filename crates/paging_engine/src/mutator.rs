use std::fmt;
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};

use engine_logging::{engine_debug, engine_trace, engine_warn};
use tokio::sync::Mutex;
use tokio_util::sync::{CancellationToken, DropGuard};

use crate::PagingError;

static NEXT_MUTATOR_ID: AtomicU64 = AtomicU64::new(1);

tokio::task_local! {
    /// Mutators whose blocks enclose the current task, innermost last.
    static MUTATE_FRAMES: Vec<MutateFrame>;
}

/// Execution mode of a block running under a [`Mutator`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MutateKind {
    /// Exclusive: registered, cancellable, preempted by the next `mutate`.
    Mutate,
    /// Serialized with exclusive blocks but never cancelled.
    Effect,
}

impl fmt::Display for MutateKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MutateKind::Mutate => write!(f, "mutate"),
            MutateKind::Effect => write!(f, "effect"),
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct MutateFrame {
    mutator: u64,
    kind: MutateKind,
}

/// Handle passed to an exclusive block.
///
/// Cancellation is cooperative: the block observes preemption through
/// [`MutateScope::ensure_active`] and [`MutateScope::run`]. Dropping the
/// caller's future cancels the block as well.
#[derive(Debug, Clone)]
pub struct MutateScope {
    token: CancellationToken,
}

impl MutateScope {
    pub fn is_active(&self) -> bool {
        !self.token.is_cancelled()
    }

    /// Returns `Err(Cancelled)` once this mutation has been cancelled.
    pub fn ensure_active(&self) -> Result<(), PagingError> {
        if self.token.is_cancelled() {
            Err(PagingError::Cancelled)
        } else {
            Ok(())
        }
    }

    /// Drives `future` until it completes or this mutation is cancelled.
    ///
    /// On cancellation the future is dropped without being polled again.
    pub async fn run<F: Future>(&self, future: F) -> Result<F::Output, PagingError> {
        tokio::select! {
            biased;
            _ = self.token.cancelled() => Err(PagingError::Cancelled),
            output = future => Ok(output),
        }
    }

    /// Resolves when this mutation is cancelled.
    pub async fn cancelled(&self) {
        self.token.cancelled().await;
    }
}

#[derive(Debug)]
struct ActiveMutation {
    id: u64,
    token: CancellationToken,
    finished: CancellationToken,
}

impl ActiveMutation {
    fn is_active(&self) -> bool {
        !self.token.is_cancelled() && !self.finished.is_cancelled()
    }

    async fn cancel_and_join(&self) {
        self.token.cancel();
        self.finished.cancelled().await;
    }
}

/// Clears the slot when an exclusive mutation ends, however it ends.
struct Registration<'a> {
    mutator: &'a Mutator,
    id: u64,
    _finished: DropGuard,
}

impl Drop for Registration<'_> {
    fn drop(&mut self) {
        // A preempting caller holds the slot while joining us and replaces the entry itself.
        if let Ok(mut active) = self.mutator.active.try_lock() {
            if active.as_ref().is_some_and(|mutation| mutation.id == self.id) {
                *active = None;
            }
        }
    }
}

/// Serializes state mutation in two modes.
///
/// `mutate` and `try_mutate` run exclusive, cancellable blocks; a new
/// `mutate` cancels the registered block and waits for it to unwind before
/// starting. `effect` blocks share the same body lock but never occupy the
/// registration slot, so they are never cancelled and a `mutate` issued
/// while one runs simply waits for it.
///
/// Invoking any of these from inside a block of the same mutator fails with
/// [`PagingError::Nested`].
///
/// The nesting marker is task-local and is not inherited by `tokio::spawn`.
/// A block that spawns a task calling back into the same mutator and then
/// awaits that task deadlocks on the body lock instead of failing with
/// `Nested`. Call the mutator directly from the block, or do not await the
/// spawned task inside it.
#[derive(Debug)]
pub struct Mutator {
    id: u64,
    next_mutation: AtomicU64,
    active: Mutex<Option<ActiveMutation>>,
    body: Mutex<()>,
}

impl Default for Mutator {
    fn default() -> Self {
        Self::new()
    }
}

impl Mutator {
    pub fn new() -> Self {
        Self {
            id: NEXT_MUTATOR_ID.fetch_add(1, Ordering::Relaxed),
            next_mutation: AtomicU64::new(1),
            active: Mutex::new(None),
            body: Mutex::new(()),
        }
    }

    /// True while an exclusive block is registered and neither cancelled nor finished.
    pub async fn is_mutating(&self) -> bool {
        self.active
            .lock()
            .await
            .as_ref()
            .is_some_and(ActiveMutation::is_active)
    }

    /// Runs `block` exclusively, cancelling and awaiting any registered block first.
    pub async fn mutate<T, F, Fut>(&self, block: F) -> Result<T, PagingError>
    where
        F: FnOnce(MutateScope) -> Fut,
        Fut: Future<Output = Result<T, PagingError>>,
    {
        self.check_nested()?;
        self.run_exclusive(false, block).await
    }

    /// Like [`Mutator::mutate`], but fails with `Cancelled` instead of
    /// preempting when an exclusive block is already running.
    pub async fn try_mutate<T, F, Fut>(&self, block: F) -> Result<T, PagingError>
    where
        F: FnOnce(MutateScope) -> Fut,
        Fut: Future<Output = Result<T, PagingError>>,
    {
        self.check_nested()?;
        self.run_exclusive(true, block).await
    }

    /// Runs `block` serialized with exclusive blocks, outside the registration slot.
    pub async fn effect<T, F, Fut>(&self, block: F) -> Result<T, PagingError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = T>,
    {
        self.check_nested()?;
        let _body = self.body.lock().await;
        engine_trace!("mutator {} running effect", self.id);
        Ok(self
            .with_frame(MutateKind::Effect, async move { block().await })
            .await)
    }

    /// Cancels the registered exclusive block, if any, and waits for it to finish.
    ///
    /// Running effects are not affected.
    pub async fn cancel_mutate(&self) -> Result<(), PagingError> {
        if let Some(MutateKind::Mutate) = self.enclosing_kind() {
            return Err(PagingError::Nested(MutateKind::Mutate));
        }
        let mut active = self.active.lock().await;
        if let Some(mutation) = active.take() {
            engine_debug!("mutator {} cancelling mutation {}", self.id, mutation.id);
            mutation.cancel_and_join().await;
        }
        Ok(())
    }

    async fn run_exclusive<T, F, Fut>(
        &self,
        reject_if_active: bool,
        block: F,
    ) -> Result<T, PagingError>
    where
        F: FnOnce(MutateScope) -> Fut,
        Fut: Future<Output = Result<T, PagingError>>,
    {
        let id = self.next_mutation.fetch_add(1, Ordering::Relaxed);
        let token = CancellationToken::new();
        let finished = CancellationToken::new();

        {
            let mut active = self.active.lock().await;
            if reject_if_active && active.as_ref().is_some_and(ActiveMutation::is_active) {
                engine_debug!("mutator {} rejected mutation {}: busy", self.id, id);
                return Err(PagingError::Cancelled);
            }
            if let Some(previous) = active.take() {
                engine_debug!(
                    "mutator {} preempting mutation {} for {}",
                    self.id,
                    previous.id,
                    id
                );
                previous.cancel_and_join().await;
            }
            *active = Some(ActiveMutation {
                id,
                token: token.clone(),
                finished: finished.clone(),
            });
        }
        let _registration = Registration {
            mutator: self,
            id,
            _finished: finished.drop_guard(),
        };

        let _body = tokio::select! {
            biased;
            _ = token.cancelled() => {
                engine_debug!("mutator {} mutation {} cancelled before start", self.id, id);
                return Err(PagingError::Cancelled);
            }
            body = self.body.lock() => body,
        };

        let scope = MutateScope { token };
        scope.ensure_active()?;
        engine_trace!("mutator {} running mutation {}", self.id, id);
        let body = self.with_frame(MutateKind::Mutate, async move { block(scope).await });
        body.await
    }

    async fn with_frame<Fut: Future>(&self, kind: MutateKind, future: Fut) -> Fut::Output {
        let mut frames = MUTATE_FRAMES
            .try_with(|frames| frames.clone())
            .unwrap_or_default();
        frames.push(MutateFrame {
            mutator: self.id,
            kind,
        });
        MUTATE_FRAMES.scope(frames, future).await
    }

    fn enclosing_kind(&self) -> Option<MutateKind> {
        MUTATE_FRAMES
            .try_with(|frames| {
                frames
                    .iter()
                    .rev()
                    .find(|frame| frame.mutator == self.id)
                    .map(|frame| frame.kind)
            })
            .ok()
            .flatten()
    }

    fn check_nested(&self) -> Result<(), PagingError> {
        match self.enclosing_kind() {
            Some(kind) => {
                engine_warn!("mutator {}: nested invoke inside {}", self.id, kind);
                Err(PagingError::Nested(kind))
            }
            None => Ok(()),
        }
    }
}
