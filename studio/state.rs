use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use netpulse::{MockClassifier, Prediction, Session, SharedAnimator};

// ---------------------------------------------------------------------------
// Flash messages
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub enum FlashKind { Success, Error }

#[derive(Debug, Clone)]
pub struct FlashMessage {
    pub kind: FlashKind,
    pub text: String,
}

impl FlashMessage {
    pub fn success(text: impl Into<String>) -> Self {
        FlashMessage { kind: FlashKind::Success, text: text.into() }
    }
    pub fn error(text: impl Into<String>) -> Self {
        FlashMessage { kind: FlashKind::Error, text: text.into() }
    }
}

// ---------------------------------------------------------------------------
// Main state struct
// ---------------------------------------------------------------------------

pub struct StudioState {
    /// The one network visualization this studio serves.
    pub session:    Session,
    /// Pretend backend behind the classifier page.
    pub classifier: Arc<Mutex<MockClassifier>>,
    /// Last successful classification, shown until reset.
    pub prediction: Option<Prediction>,
    /// One-shot flash message for the next page render.
    pub flash:      Option<FlashMessage>,
}

impl StudioState {
    pub fn new(session: Session, classifier: MockClassifier) -> Self {
        StudioState {
            session,
            classifier: Arc::new(Mutex::new(classifier)),
            prediction: None,
            flash: None,
        }
    }

    /// Handle to the animator that outlives this lock guard.
    pub fn animator(&self) -> SharedAnimator {
        self.session.animator()
    }

    /// Takes and returns the current flash message, clearing it.
    pub fn take_flash(&mut self) -> Option<FlashMessage> {
        self.flash.take()
    }
}

/// Shared state type, an `Arc<Mutex<StudioState>>` passed to every handler.
pub type SharedState = Arc<Mutex<StudioState>>;

/// Locks the studio state, recovering the guard if a handler thread panicked.
pub fn lock(state: &SharedState) -> MutexGuard<'_, StudioState> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}
