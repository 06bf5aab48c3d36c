use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use rand::Rng;
use rand_chacha::ChaCha8Rng;
use tracing::{info, warn};

use crate::animator::animator::Animator;
use crate::animator::event::TickOutcome;
use crate::animator::ticker::Ticker;
use crate::error::NetResult;

/// Animator shared between its session, its timer thread and any readers.
pub type SharedAnimator<R = ChaCha8Rng> = Arc<Mutex<Animator<R>>>;

/// Locks a shared animator, recovering the guard if a previous holder panicked.
pub fn lock<R>(animator: &Mutex<Animator<R>>) -> MutexGuard<'_, Animator<R>> {
    animator.lock().unwrap_or_else(PoisonError::into_inner)
}

/// One visualization session: an animator plus the timer that drives it.
///
/// The timer is registered exactly while the animator is enabled. Disabling
/// the animator through the session, or dropping the session, stops and
/// joins the timer before control returns. A timer that finds the animator
/// paused by another holder of the shared handle ends on its own.
pub struct Session<R = ChaCha8Rng>
where
    R: Rng + Send + 'static,
{
    animator: SharedAnimator<R>,
    tick_interval: Duration,
    ticker: Option<Ticker>,
}

impl<R> Session<R>
where
    R: Rng + Send + 'static,
{
    /// Wraps an initialized animator. Fails with `NotInitialized` otherwise.
    pub fn start(animator: Animator<R>, tick_interval: Duration) -> NetResult<Session<R>> {
        animator.topology()?;
        let mut session = Session {
            animator: Arc::new(Mutex::new(animator)),
            tick_interval,
            ticker: None,
        };
        session.sync_ticker();
        Ok(session)
    }

    pub fn animator(&self) -> SharedAnimator<R> {
        self.animator.clone()
    }

    pub fn tick_interval(&self) -> Duration {
        self.tick_interval
    }

    pub fn is_ticking(&self) -> bool {
        self.ticker.as_ref().map_or(false, Ticker::is_running)
    }

    /// Runs `f` against the animator, then brings the timer in line with the
    /// animator's `enabled` flag.
    pub fn with<T, F>(&mut self, f: F) -> T
    where
        F: FnOnce(&mut Animator<R>) -> T,
    {
        let out = {
            let mut animator = lock(&self.animator);
            f(&mut animator)
        };
        self.sync_ticker();
        out
    }

    pub fn toggle_enabled(&mut self) -> NetResult<bool> {
        self.with(|animator| animator.toggle_enabled())
    }

    fn sync_ticker(&mut self) {
        if self.ticker.as_ref().map_or(false, |t| !t.is_running()) {
            if let Some(finished) = self.ticker.take() {
                finished.stop();
            }
        }
        let enabled = lock(&self.animator).is_enabled().unwrap_or(false);
        match (enabled, self.ticker.is_some()) {
            (true, false) => {
                let animator = self.animator.clone();
                self.ticker = Some(Ticker::start(self.tick_interval, move || {
                    match lock(&animator).tick() {
                        Ok(TickOutcome::Paused) => {
                            info!("animator paused elsewhere; stopping animation timer");
                            false
                        }
                        Ok(_) => true,
                        Err(e) => {
                            warn!(error = %e, "tick failed; stopping animation timer");
                            false
                        }
                    }
                }));
                info!("animation resumed");
            }
            (false, true) => {
                // Must not hold the animator lock here: the timer thread may be
                // waiting on it to finish its current tick.
                if let Some(ticker) = self.ticker.take() {
                    ticker.stop();
                }
                info!("animation paused");
            }
            _ => {}
        }
    }
}

impl<R> Drop for Session<R>
where
    R: Rng + Send + 'static,
{
    fn drop(&mut self) {
        if let Some(ticker) = self.ticker.take() {
            ticker.stop();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::animator::event::AnimatorEvent;
    use crate::error::NetError;
    use crate::network::topology::Topology;

    fn animator() -> Animator {
        let mut a = Animator::seeded(77);
        a.initialize(Topology::default());
        a
    }

    #[test]
    fn uninitialized_animator_is_rejected() {
        let result = Session::start(Animator::seeded(1), Duration::from_millis(5));
        assert!(matches!(result, Err(NetError::NotInitialized)));
    }

    #[test]
    fn ticks_arrive_through_subscription() {
        let mut paused = animator();
        paused.toggle_enabled().unwrap();
        let mut session = Session::start(paused, Duration::from_millis(5)).unwrap();
        let rx = session.with(|a| a.subscribe());
        session.toggle_enabled().unwrap();
        assert!(session.is_ticking());

        let wait = Duration::from_secs(5);
        assert_eq!(rx.recv_timeout(wait).unwrap(), AnimatorEvent::EnabledChanged { enabled: true });
        assert_eq!(
            rx.recv_timeout(wait).unwrap(),
            AnimatorEvent::Tick { cursor: 1, propagated_layer: Some(1) }
        );
    }

    #[test]
    fn disabling_releases_the_timer_and_freezes_the_cursor() {
        let mut session = Session::start(animator(), Duration::from_millis(2)).unwrap();
        std::thread::sleep(Duration::from_millis(20));

        assert_eq!(session.toggle_enabled(), Ok(false));
        assert!(!session.is_ticking());
        let frozen = session.with(|a| a.cursor().unwrap());
        std::thread::sleep(Duration::from_millis(20));
        assert_eq!(session.with(|a| a.cursor().unwrap()), frozen);

        assert_eq!(session.toggle_enabled(), Ok(true));
        assert!(session.is_ticking());
    }

    #[test]
    fn disabled_animator_starts_without_a_timer() {
        let mut a = animator();
        a.toggle_enabled().unwrap();
        let session = Session::start(a, Duration::from_millis(1)).unwrap();
        assert!(!session.is_ticking());
    }

    #[test]
    fn dropping_the_session_stops_ticking() {
        let session = Session::start(animator(), Duration::from_millis(2)).unwrap();
        let shared = session.animator();
        let rx = lock(&shared).subscribe();
        drop(session);

        // Anything already queued was sent before the join; afterwards silence.
        while rx.try_recv().is_ok() {}
        std::thread::sleep(Duration::from_millis(20));
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn pausing_through_the_shared_handle_ends_the_timer() {
        let mut session = Session::start(animator(), Duration::from_millis(2)).unwrap();
        assert!(session.is_ticking());

        let shared = session.animator();
        assert_eq!(lock(&shared).toggle_enabled(), Ok(false));

        let deadline = std::time::Instant::now() + Duration::from_secs(2);
        while session.is_ticking() && std::time::Instant::now() < deadline {
            std::thread::sleep(Duration::from_millis(2));
        }
        assert!(!session.is_ticking());

        // Re-enabling through the session must start a fresh timer.
        assert_eq!(session.toggle_enabled(), Ok(true));
        assert!(session.is_ticking());
        let rx = lock(&shared).subscribe();
        assert!(matches!(
            rx.recv_timeout(Duration::from_secs(5)).unwrap(),
            AnimatorEvent::Tick { .. }
        ));
    }
}
