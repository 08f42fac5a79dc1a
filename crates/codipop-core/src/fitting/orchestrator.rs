//! Composition request orchestrator.
//!
//! Drives one fitting session: holds the subject image and garment selection,
//! validates preconditions, checks the daily quota, and submits a single
//! request at a time to the compositor.
//!
//! State machine: `Idle -> Validating -> Submitting -> {Succeeded, Failed} -> Idle`.
//! `Succeeded` and `Failed` are reported through the return value of
//! [`FittingOrchestrator::try_on`].
//!
//! Each session carries a generation number and a cancellation token. Starting
//! a new session bumps the generation and cancels the token, so a response for
//! the previous session is dropped instead of being recorded.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

use codipop_types::error::{CompositionError, FittingError};
use codipop_types::fitting::{
    CompositionRequest, FittingPhase, FittingResult, FittingResultId, ImageSource, TryOnOutcome,
};
use codipop_types::session::UserSession;
use tokio_util::sync::CancellationToken;

use crate::clock::Clock;
use crate::fitting::compositor::{output_url, Compositor};
use crate::quota::QuotaStore;
use crate::repository::fitting_result::FittingResultRepository;
use crate::repository::wardrobe::WardrobeRepository;
use crate::selection::{SelectionSet, ToggleOutcome};
use crate::storage::kv_store::KvStore;

/// Mutable per-session state. Never held across an `.await`.
struct SessionState {
    phase: FittingPhase,
    subject: Option<String>,
    selection: SelectionSet,
    last_result: Option<FittingResult>,
    cancellation: CancellationToken,
}

/// Coordinates one user's fitting sessions.
///
/// Generic over its collaborators so tests can inject in-memory fakes; the
/// acting user is passed in explicitly at construction.
pub struct FittingOrchestrator<C, K, H, W, Clk>
where
    C: Compositor,
    K: KvStore,
    H: FittingResultRepository,
    W: WardrobeRepository,
    Clk: Clock,
{
    compositor: C,
    quota: QuotaStore<K, Clk>,
    history: H,
    wardrobe: W,
    session: UserSession,
    request_timeout: Duration,
    generation: AtomicU64,
    state: Mutex<SessionState>,
}

impl<C, K, H, W, Clk> FittingOrchestrator<C, K, H, W, Clk>
where
    C: Compositor,
    K: KvStore,
    H: FittingResultRepository,
    W: WardrobeRepository,
    Clk: Clock,
{
    /// Create an orchestrator with an empty session.
    ///
    /// - `max_selection`: garment cap for the selection set
    /// - `request_timeout`: client-side limit on a single compositor call
    pub fn new(
        compositor: C,
        quota: QuotaStore<K, Clk>,
        history: H,
        wardrobe: W,
        session: UserSession,
        max_selection: usize,
        request_timeout: Duration,
    ) -> Self {
        Self {
            compositor,
            quota,
            history,
            wardrobe,
            session,
            request_timeout,
            generation: AtomicU64::new(0),
            state: Mutex::new(SessionState {
                phase: FittingPhase::Idle,
                subject: None,
                selection: SelectionSet::new(max_selection),
                last_result: None,
                cancellation: CancellationToken::new(),
            }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, SessionState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn phase(&self) -> FittingPhase {
        self.lock().phase
    }

    pub fn quota(&self) -> &QuotaStore<K, Clk> {
        &self.quota
    }

    pub fn compositor(&self) -> &C {
        &self.compositor
    }

    pub fn subject(&self) -> Option<String> {
        self.lock().subject.clone()
    }

    /// Selected garment ids in attachment order.
    pub fn selection(&self) -> Vec<String> {
        self.lock().selection.ids().to_vec()
    }

    /// Most recent result of the current session.
    pub fn last_result(&self) -> Option<FittingResult> {
        self.lock().last_result.clone()
    }

    /// Set the subject image. Swapping to a different image clears the selection.
    pub fn set_subject(&self, image_uri: impl Into<String>) {
        let image_uri = image_uri.into();
        let mut state = self.lock();
        if state.subject.as_deref().is_some_and(|s| s != image_uri) {
            state.selection.clear();
        }
        state.subject = Some(image_uri);
    }

    /// Toggle a garment in the selection. `accepted = false` means the
    /// selection is full and the caller should tell the user.
    pub fn toggle_garment(&self, garment_id: &str) -> ToggleOutcome {
        self.lock().selection.toggle(garment_id)
    }

    pub fn clear_selection(&self) {
        self.lock().selection.clear();
    }

    /// Start a new session.
    ///
    /// Clears the subject, selection and last result and returns to `Idle`.
    /// An in-flight request is cancelled and its result discarded.
    pub fn new_session(&self) {
        let mut state = self.lock();
        self.generation.fetch_add(1, Ordering::SeqCst);
        state.cancellation.cancel();
        state.cancellation = CancellationToken::new();
        state.phase = FittingPhase::Idle;
        state.subject = None;
        state.selection.clear();
        state.last_result = None;
    }

    /// Run one composition for the current subject and selection.
    ///
    /// Returns `Ok(Ignored)` if a request is already in flight and
    /// `Ok(Discarded)` if the session was reset while this one was pending.
    /// Validation, quota and compositor failures leave the subject and
    /// selection in place so the user can retry.
    pub async fn try_on(&self) -> Result<TryOnOutcome, FittingError> {
        let (generation, subject, ids, cancellation) = {
            let mut state = self.lock();
            if state.phase != FittingPhase::Idle {
                tracing::debug!(phase = %state.phase, "try-on already in progress, ignoring");
                return Ok(TryOnOutcome::Ignored);
            }
            state.phase = FittingPhase::Validating;
            (
                self.generation.load(Ordering::SeqCst),
                state.subject.clone(),
                state.selection.ids().to_vec(),
                state.cancellation.clone(),
            )
        };

        // Every exit from here on, including the caller dropping this future,
        // returns the phase to `Idle` for this generation.
        let _idle_on_exit = IdleOnDrop {
            state: &self.state,
            current: &self.generation,
            generation,
        };

        let request = match self.validate(generation, subject, ids).await? {
            Some(request) => request,
            None => return Ok(TryOnOutcome::Discarded),
        };

        if self.quota.remaining().await == 0 {
            return Err(FittingError::QuotaExceeded {
                limit: self.quota.limit(),
            });
        }

        if !self.advance(generation, FittingPhase::Submitting) {
            return Ok(TryOnOutcome::Discarded);
        }

        tracing::info!(
            user = %self.session.user_id,
            garments = request.clothing_count(),
            "submitting try-on request"
        );

        let response = tokio::select! {
            _ = cancellation.cancelled() => {
                tracing::debug!("try-on superseded by a new session, discarding");
                return Ok(TryOnOutcome::Discarded);
            }
            response = tokio::time::timeout(self.request_timeout, self.compositor.compose(&request)) => response,
        };

        let outcome = match response {
            Err(_) => Err(CompositionError::Timeout {
                secs: self.request_timeout.as_secs(),
            }),
            Ok(Err(e)) => Err(e),
            Ok(Ok(body)) => output_url(body),
        };

        if self.generation.load(Ordering::SeqCst) != generation {
            tracing::debug!("try-on response arrived for a previous session, discarding");
            return Ok(TryOnOutcome::Discarded);
        }

        let image_url = match outcome {
            Ok(url) => url,
            Err(e) => {
                tracing::warn!("try-on failed: {e}");
                return Err(FittingError::Composition(e));
            }
        };

        if !self.quota.try_consume().await {
            tracing::warn!("quota exhausted by a concurrent session; showing result anyway");
        }

        let result = match self.history.append(&self.session, &image_url).await {
            Ok(result) => result,
            Err(e) => {
                tracing::warn!("failed to record try-on result in history: {e}");
                FittingResult {
                    id: FittingResultId::new(),
                    image_url,
                    created_at: chrono::Utc::now(),
                    is_liked: false,
                }
            }
        };

        tracing::info!(result_id = %result.id, "try-on completed");

        {
            let mut state = self.lock();
            if self.generation.load(Ordering::SeqCst) == generation {
                state.last_result = Some(result.clone());
            }
        }

        Ok(TryOnOutcome::Completed(result))
    }

    /// Check subject and selection and build the request.
    ///
    /// Returns `Ok(None)` if the session was reset during the wardrobe lookup.
    async fn validate(
        &self,
        generation: u64,
        subject: Option<String>,
        ids: Vec<String>,
    ) -> Result<Option<CompositionRequest>, FittingError> {
        let subject = subject.ok_or_else(|| {
            FittingError::Validation("select a subject image first".to_string())
        })?;

        if ids.is_empty() {
            return Err(FittingError::Validation(
                "select at least one garment first".to_string(),
            ));
        }

        let garments = self
            .wardrobe
            .get_many(&self.session, &ids)
            .await
            .map_err(|e| {
                FittingError::Validation(format!("selected garments could not be loaded: {e}"))
            })?;

        {
            let mut state = self.lock();
            if self.generation.load(Ordering::SeqCst) != generation {
                return Ok(None);
            }
            if garments.len() != ids.len() {
                tracing::debug!(
                    dropped = ids.len() - garments.len(),
                    "dropping deleted garments from selection"
                );
                let existing: Vec<&str> = garments.iter().map(|g| g.id.as_str()).collect();
                state.selection.retain_existing(&existing);
            }
        }

        if garments.is_empty() {
            return Err(FittingError::Validation(
                "selected garments are no longer in the wardrobe".to_string(),
            ));
        }

        Ok(Some(CompositionRequest {
            person: ImageSource::subject(subject),
            clothing: garments
                .into_iter()
                .map(|g| ImageSource::garment(g.id, g.image_url))
                .collect(),
        }))
    }

    /// Move to `phase` if the session has not been reset. Returns false otherwise.
    fn advance(&self, generation: u64, phase: FittingPhase) -> bool {
        let mut state = self.lock();
        if self.generation.load(Ordering::SeqCst) != generation {
            return false;
        }
        state.phase = phase;
        true
    }
}

/// Puts the phase back to `Idle` when a `try_on` call ends, unless a newer
/// session has already taken over.
struct IdleOnDrop<'a> {
    state: &'a Mutex<SessionState>,
    current: &'a AtomicU64,
    generation: u64,
}

impl Drop for IdleOnDrop<'_> {
    fn drop(&mut self) {
        let mut state = self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        if self.current.load(Ordering::SeqCst) == self.generation {
            state.phase = FittingPhase::Idle;
        }
    }
}
