//! # Login attempt guard
//!
//! Tracks how many times the user tried to sign in, raises a CAPTCHA lockout
//! once the count passes [`MAX_ATTEMPTS`], and owns the transient error shown
//! under the form.
//!
//! ## States
//!
//! | State | Meaning |
//! |-------|---------|
//! | [`GuardState::Idle`] | No attempt recorded since start or since the last lockout. |
//! | [`GuardState::Attempting`] | At least one attempt recorded, threshold not reached. |
//! | [`GuardState::Locked`] | CAPTCHA required. |
//!
//! With [`LockoutMode::Flash`] (the default) the `Locked` state is left again
//! in the same transition that entered it: the lockout message is shown,
//! `captcha_required` flips back to `false` and the counter restarts at zero.
//! [`LockoutMode::Cooldown`] keeps the guard locked until the cooldown elapses
//! or [`LoginAttemptGuard::solve_captcha`] is called; attempts made meanwhile
//! are rejected and not counted.
//!
//! ## Error auto-clear
//!
//! Every error set through the guard schedules a clear after
//! [`GuardSettings::error_clear_after`]. Setting a newer error (or recording a
//! new attempt) aborts the pending timer under the same lock that updates the
//! error, and bumps a generation counter the timer checks before clearing, so
//! only the latest error is ever cleared and never early.

use std::sync::{Arc, Mutex, Weak};
use std::time::Duration;

use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tokio::time::Instant;

/// Attempts allowed before the lockout is raised.
pub const MAX_ATTEMPTS: u32 = 3;

/// How long an error stays visible.
pub const ERROR_CLEAR_DELAY: Duration = Duration::from_secs(3);

/// Message shown when the lockout is raised.
pub const LOCKOUT_MESSAGE: &str = "Too many login attempts. Please try again later.";

/// How long a raised lockout lasts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LockoutMode {
    /// Lockout is raised and released in the same transition.
    #[default]
    Flash,
    /// Lockout holds until the duration elapses or the CAPTCHA is solved.
    Cooldown(Duration),
}

/// Tunables for [`LoginAttemptGuard`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GuardSettings {
    pub max_attempts: u32,
    pub error_clear_after: Duration,
    pub lockout: LockoutMode,
}

impl Default for GuardSettings {
    fn default() -> Self {
        Self {
            max_attempts: MAX_ATTEMPTS,
            error_clear_after: ERROR_CLEAR_DELAY,
            lockout: LockoutMode::default(),
        }
    }
}

impl GuardSettings {
    /// Builder method to switch to a sustained lockout.
    pub fn with_cooldown(mut self, cooldown: Duration) -> Self {
        self.lockout = LockoutMode::Cooldown(cooldown);
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardState {
    Idle,
    Attempting,
    Locked,
}

/// Result of [`LoginAttemptGuard::record_attempt`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttemptOutcome {
    /// The attempt was counted and may proceed.
    Recorded { attempt_count: u32 },
    /// This attempt crossed the threshold and raised the lockout.
    LockedOut,
    /// The guard is locked; the attempt was not counted and must not proceed.
    Blocked,
}

impl AttemptOutcome {
    /// Whether the caller should go on with the login.
    pub fn may_proceed(&self) -> bool {
        !matches!(self, AttemptOutcome::Blocked)
    }
}

/// The error currently displayed, with the moment it was set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LastError {
    pub message: String,
    pub at: Instant,
}

/// Snapshot of the guard's observable state.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoginAttemptState {
    pub attempt_count: u32,
    pub captcha_required: bool,
    pub last_error: Option<LastError>,
}

/// Notifications for whoever renders the guard's state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardEvent {
    AttemptRecorded(u32),
    LockoutRaised,
    LockoutReleased,
    ErrorSet(String),
    ErrorCleared(String),
}

#[derive(Debug, Default)]
struct Inner {
    state: LoginAttemptState,
    locked_until: Option<Instant>,
    error_generation: u64,
    clear_timer: Option<JoinHandle<()>>,
}

impl Drop for Inner {
    fn drop(&mut self) {
        if let Some(timer) = self.clear_timer.take() {
            timer.abort();
        }
    }
}

/// Attempt counter, lockout and transient error, shared by cheap clones.
///
/// Errors are cleared by a tokio task, so the guard must be used from within
/// a tokio runtime for the auto-clear to happen.
#[derive(Debug, Clone)]
pub struct LoginAttemptGuard {
    inner: Arc<Mutex<Inner>>,
    settings: GuardSettings,
    events: broadcast::Sender<GuardEvent>,
}

impl Default for LoginAttemptGuard {
    fn default() -> Self {
        Self::new(GuardSettings::default())
    }
}

impl LoginAttemptGuard {
    pub fn new(settings: GuardSettings) -> Self {
        let (events, _) = broadcast::channel(64);
        Self {
            inner: Arc::new(Mutex::new(Inner::default())),
            settings,
            events,
        }
    }

    pub fn settings(&self) -> &GuardSettings {
        &self.settings
    }

    /// Receive every event emitted from now on.
    pub fn subscribe(&self) -> broadcast::Receiver<GuardEvent> {
        self.events.subscribe()
    }

    /// Count a login attempt. Clears any displayed error first.
    pub fn record_attempt(&self) -> AttemptOutcome {
        let mut inner = self.inner.lock().unwrap();
        self.expire_lockout(&mut inner);

        if inner.state.captcha_required {
            tracing::debug!("Login attempt rejected while locked");
            return AttemptOutcome::Blocked;
        }

        self.clear_error_locked(&mut inner);

        inner.state.attempt_count += 1;
        let attempt_count = inner.state.attempt_count;
        self.emit(GuardEvent::AttemptRecorded(attempt_count));

        if attempt_count <= self.settings.max_attempts {
            return AttemptOutcome::Recorded { attempt_count };
        }

        tracing::warn!(attempt_count, "Too many login attempts, CAPTCHA required");
        inner.state.captcha_required = true;
        self.emit(GuardEvent::LockoutRaised);
        self.set_error_locked(&mut inner, LOCKOUT_MESSAGE.to_string());

        match self.settings.lockout {
            LockoutMode::Flash => self.release_lockout(&mut inner),
            LockoutMode::Cooldown(cooldown) => {
                // Out of range means only `solve_captcha` can release it.
                inner.locked_until = Instant::now().checked_add(cooldown);
            }
        }

        AttemptOutcome::LockedOut
    }

    /// Show `message` and schedule it to be cleared.
    pub fn report_failure(&self, message: impl Into<String>) {
        let mut inner = self.inner.lock().unwrap();
        self.set_error_locked(&mut inner, message.into());
    }

    /// Remove the displayed error now, cancelling its timer.
    pub fn clear_error(&self) {
        let mut inner = self.inner.lock().unwrap();
        self.clear_error_locked(&mut inner);
    }

    /// Release a held lockout. Returns `false` if the guard was not locked.
    pub fn solve_captcha(&self) -> bool {
        let mut inner = self.inner.lock().unwrap();
        if !inner.state.captcha_required {
            return false;
        }
        self.release_lockout(&mut inner);
        true
    }

    pub fn state(&self) -> GuardState {
        let mut inner = self.inner.lock().unwrap();
        self.expire_lockout(&mut inner);

        if inner.state.captcha_required {
            GuardState::Locked
        } else if inner.state.attempt_count > 0 {
            GuardState::Attempting
        } else {
            GuardState::Idle
        }
    }

    pub fn snapshot(&self) -> LoginAttemptState {
        let mut inner = self.inner.lock().unwrap();
        self.expire_lockout(&mut inner);
        inner.state.clone()
    }

    pub fn last_error(&self) -> Option<String> {
        self.inner
            .lock()
            .unwrap()
            .state
            .last_error
            .as_ref()
            .map(|e| e.message.clone())
    }

    fn emit(&self, event: GuardEvent) {
        // Nobody listening is fine.
        let _ = self.events.send(event);
    }

    fn expire_lockout(&self, inner: &mut Inner) {
        if inner.locked_until.is_some_and(|until| Instant::now() >= until) {
            self.release_lockout(inner);
        }
    }

    fn release_lockout(&self, inner: &mut Inner) {
        inner.state.captcha_required = false;
        inner.state.attempt_count = 0;
        inner.locked_until = None;
        self.emit(GuardEvent::LockoutReleased);
    }

    fn clear_error_locked(&self, inner: &mut Inner) {
        if let Some(timer) = inner.clear_timer.take() {
            timer.abort();
        }
        inner.error_generation += 1;
        if let Some(error) = inner.state.last_error.take() {
            self.emit(GuardEvent::ErrorCleared(error.message));
        }
    }

    fn set_error_locked(&self, inner: &mut Inner, message: String) {
        if let Some(timer) = inner.clear_timer.take() {
            timer.abort();
        }
        inner.error_generation += 1;
        inner.state.last_error = Some(LastError {
            message: message.clone(),
            at: Instant::now(),
        });
        self.emit(GuardEvent::ErrorSet(message));

        let Ok(runtime) = tokio::runtime::Handle::try_current() else {
            tracing::warn!("No tokio runtime, error will not be cleared automatically");
            return;
        };
        inner.clear_timer = Some(runtime.spawn(clear_after(
            Arc::downgrade(&self.inner),
            self.events.clone(),
            inner.error_generation,
            self.settings.error_clear_after,
        )));
    }
}

async fn clear_after(
    inner: Weak<Mutex<Inner>>,
    events: broadcast::Sender<GuardEvent>,
    generation: u64,
    delay: Duration,
) {
    tokio::time::sleep(delay).await;

    let Some(inner) = inner.upgrade() else {
        return;
    };
    let mut inner = inner.lock().unwrap();
    if inner.error_generation != generation {
        return;
    }
    // Dropping our own handle; the task is already finishing.
    inner.clear_timer = None;
    if let Some(error) = inner.state.last_error.take() {
        let _ = events.send(GuardEvent::ErrorCleared(error.message));
    }
}
