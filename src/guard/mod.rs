//! Login attempt guard: a circuit breaker in front of `AuthApi::login`.
//!
//! Two independent counters feed one lock deadline:
//!
//! - a short window held in memory: `window_max_failures` failures within
//!   `window` lock for `window_lock`;
//! - a cumulative count in the persisted [`LoginAttemptRecord`]:
//!   `max_failures` failures since the last reset lock for `lock`.
//!
//! When both fire on the same failure the later deadline wins. The lock
//! deadline lives in the persisted record, so a restarted process that
//! calls [`LoginGuard::load`] sees the same lock.

mod clock;
mod storage;

use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use thiserror::Error;
use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::config::LoginGuardConfig;
use crate::gateway::{AuthApi, GatewayError, Session, SessionInfo};
use crate::model::{AuthResponse, LoginRequest};

pub use clock::{Clock, ManualClock, SystemClock};
pub use storage::{AttemptStorage, FileAttemptStorage, LoginAttemptRecord, MemoryAttemptStorage, StorageError};

/// Thresholds, in milliseconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GuardPolicy {
    pub window_ms: u64,
    pub window_max_failures: u32,
    pub window_lock_ms: u64,
    pub max_failures: u32,
    pub lock_ms: u64,
}

impl From<&LoginGuardConfig> for GuardPolicy {
    fn from(config: &LoginGuardConfig) -> Self {
        Self {
            window_ms: config.window_seconds.saturating_mul(1000),
            window_max_failures: config.window_max_failures,
            window_lock_ms: config.window_lock_seconds.saturating_mul(1000),
            max_failures: config.max_failures,
            lock_ms: config.lock_seconds.saturating_mul(1000),
        }
    }
}

impl Default for GuardPolicy {
    fn default() -> Self {
        Self::from(&LoginGuardConfig::default())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardState {
    Open,
    Locked { until: u64 },
}

/// A submit refused locally while the lock holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("Too many failed attempts. Please wait {remaining_secs} seconds.")]
pub struct LockoutRejection {
    pub remaining_secs: u64,
}

/// What a failed backend attempt did to the guard.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureOutcome {
    /// A counter hit its threshold.
    Locked { until: u64, lock_ms: u64 },
    /// Still inside the window.
    Remaining { attempts_left: u32 },
    /// The previous window had elapsed; counting restarted at 1.
    WindowRestarted,
}

impl FailureOutcome {
    pub fn message(&self) -> String {
        match self {
            FailureOutcome::Locked { lock_ms, .. } => format!(
                "Too many failed attempts. Account locked for {}.",
                describe_duration(*lock_ms)
            ),
            FailureOutcome::Remaining { attempts_left } => {
                format!("Invalid credentials. {} attempts remaining.", attempts_left)
            }
            FailureOutcome::WindowRestarted => "Invalid email or password.".to_string(),
        }
    }
}

fn describe_duration(ms: u64) -> String {
    let secs = ms / 1000;
    match secs {
        60 => "1 minute".to_string(),
        s if s > 0 && s % 60 == 0 => format!("{} minutes", s / 60),
        1 => "1 second".to_string(),
        s => format!("{} seconds", s),
    }
}

#[derive(Debug, Error)]
pub enum LoginError {
    #[error(transparent)]
    Locked(#[from] LockoutRejection),

    /// The backend refused or could not be reached. Counted as a failure.
    #[error("{message}")]
    Rejected {
        message: String,
        #[source]
        source: GatewayError,
    },
}

#[derive(Debug, Clone, Copy)]
struct Window {
    count: u32,
    started_at: u64,
}

#[derive(Debug, Default)]
struct GuardInner {
    record: LoginAttemptRecord,
    window: Option<Window>,
    message: Option<String>,
}

/// Shared handle to the guard. Clones observe the same state.
#[derive(Clone)]
pub struct LoginGuard {
    inner: Arc<Mutex<GuardInner>>,
    storage: Arc<dyn AttemptStorage>,
    clock: Arc<dyn Clock>,
    policy: GuardPolicy,
    remaining: Arc<watch::Sender<u64>>,
}

impl LoginGuard {
    /// Build a guard from whatever `storage` currently holds.
    ///
    /// An unreadable record is logged and treated as empty.
    pub fn load(storage: Arc<dyn AttemptStorage>, clock: Arc<dyn Clock>, policy: GuardPolicy) -> Self {
        let record = match storage.load() {
            Ok(record) => record.unwrap_or_default(),
            Err(e) => {
                tracing::warn!(error = %e, "Ignoring unreadable login attempt record");
                LoginAttemptRecord::default()
            }
        };
        if record.locked_until.is_some() {
            tracing::info!(count = record.count, locked_until = ?record.locked_until, "Restored login lock");
        }

        let (tx, _) = watch::channel(0);
        let guard = Self {
            inner: Arc::new(Mutex::new(GuardInner {
                record,
                ..GuardInner::default()
            })),
            storage,
            clock,
            policy,
            remaining: Arc::new(tx),
        };
        guard.tick();
        guard
    }

    pub fn policy(&self) -> GuardPolicy {
        self.policy
    }

    pub fn state(&self) -> GuardState {
        let now = self.clock.now_ms();
        match self.inner.lock().record.locked_until {
            Some(until) if now < until => GuardState::Locked { until },
            _ => GuardState::Open,
        }
    }

    pub fn is_locked(&self) -> bool {
        matches!(self.state(), GuardState::Locked { .. })
    }

    /// Copy of the persisted record as currently held.
    pub fn record(&self) -> LoginAttemptRecord {
        self.inner.lock().record.clone()
    }

    /// Last user-facing message, cleared on success and on unlock.
    pub fn message(&self) -> Option<String> {
        self.inner.lock().message.clone()
    }

    pub fn remaining_secs(&self) -> u64 {
        *self.remaining.borrow()
    }

    /// Remaining lock seconds, refreshed by [`LoginGuard::tick`].
    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.remaining.subscribe()
    }

    /// Gate a submit. Refuses while locked; otherwise clears an expired
    /// lock or an elapsed window so the attempt can proceed.
    pub fn check(&self) -> Result<(), LockoutRejection> {
        let now = self.clock.now_ms();
        let mut inner = self.inner.lock();

        let locked_until = inner.record.locked_until;
        if let Some(until) = locked_until {
            if now < until {
                let rejection = LockoutRejection {
                    remaining_secs: ceil_secs(until - now),
                };
                inner.message = Some(rejection.to_string());
                return Err(rejection);
            }
            *inner = GuardInner::default();
            drop(inner);
            tracing::debug!("Login lock expired, record reset");
            self.remaining.send_replace(0);
            self.clear_storage();
            return Ok(());
        }

        if inner
            .window
            .is_some_and(|w| now.saturating_sub(w.started_at) > self.policy.window_ms)
        {
            inner.window = None;
        }
        inner.message = None;
        Ok(())
    }

    /// Count a failed backend attempt.
    pub fn record_failure(&self) -> FailureOutcome {
        let now = self.clock.now_ms();
        let mut inner = self.inner.lock();

        let (window, restarted) = match inner.window {
            Some(w) if now.saturating_sub(w.started_at) <= self.policy.window_ms => (
                Window {
                    count: w.count + 1,
                    started_at: w.started_at,
                },
                false,
            ),
            previous => (
                Window {
                    count: 1,
                    started_at: now,
                },
                previous.is_some(),
            ),
        };
        inner.window = Some(window);

        let record = &mut inner.record;
        record.count += 1;
        if record.first_attempt_at == 0 {
            record.first_attempt_at = now;
        }

        let window_lock = (window.count >= self.policy.window_max_failures)
            .then(|| (now.saturating_add(self.policy.window_lock_ms), self.policy.window_lock_ms));
        let count_lock = (record.count >= self.policy.max_failures)
            .then(|| (now.saturating_add(self.policy.lock_ms), self.policy.lock_ms));

        let outcome = match window_lock.into_iter().chain(count_lock).max() {
            Some((until, lock_ms)) => {
                record.locked_until = Some(until);
                FailureOutcome::Locked { until, lock_ms }
            }
            None if restarted => FailureOutcome::WindowRestarted,
            None => FailureOutcome::Remaining {
                attempts_left: self.policy.window_max_failures - window.count,
            },
        };

        let snapshot = record.clone();
        inner.message = Some(outcome.message());
        drop(inner);

        match outcome {
            FailureOutcome::Locked { until, .. } => {
                tracing::warn!(count = snapshot.count, window_count = window.count, until, "Login locked");
                self.remaining.send_replace(ceil_secs(until - now));
            }
            _ => tracing::debug!(count = snapshot.count, window_count = window.count, "Login attempt failed"),
        }
        self.persist(&snapshot);
        outcome
    }

    /// Clear everything after a successful login.
    pub fn record_success(&self) {
        {
            let mut inner = self.inner.lock();
            *inner = GuardInner::default();
        }
        self.remaining.send_replace(0);
        self.clear_storage();
    }

    /// Recompute the remaining lock seconds and publish them. Reopens the
    /// guard once the deadline has passed. Returns the remaining seconds.
    pub fn tick(&self) -> u64 {
        let now = self.clock.now_ms();
        let mut inner = self.inner.lock();

        let locked_until = inner.record.locked_until;
        let remaining = match locked_until {
            Some(until) if now < until => ceil_secs(until - now),
            Some(_) => {
                *inner = GuardInner::default();
                drop(inner);
                tracing::info!("Login lock expired");
                self.clear_storage();
                0
            }
            None => 0,
        };
        self.remaining.send_replace(remaining);
        remaining
    }

    /// Tick once per second on the current tokio runtime until aborted.
    pub fn spawn_ticker(&self) -> JoinHandle<()> {
        let guard = self.clone();
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(Duration::from_secs(1));
            loop {
                interval.tick().await;
                guard.tick();
            }
        })
    }

    /// Run a login attempt through the guard and, on success, install the
    /// session.
    pub async fn login(
        &self,
        auth: &dyn AuthApi,
        session: &Session,
        request: &LoginRequest,
    ) -> Result<AuthResponse, LoginError> {
        self.check()?;

        let result = auth.login(request).await.and_then(|response| {
            SessionInfo::from_auth(&response)
                .map(|info| (response, info))
                .ok_or_else(|| GatewayError::Decode {
                    message: "login response carried no token or user id".to_string(),
                })
        });

        match result {
            Ok((response, info)) => {
                self.record_success();
                session.sign_in(info);
                Ok(response)
            }
            Err(source) => {
                let outcome = self.record_failure();
                Err(LoginError::Rejected {
                    message: outcome.message(),
                    source,
                })
            }
        }
    }

    fn persist(&self, record: &LoginAttemptRecord) {
        if let Err(e) = self.storage.save(record) {
            tracing::warn!(error = %e, "Failed to persist login attempt record");
        }
    }

    fn clear_storage(&self) {
        if let Err(e) = self.storage.clear() {
            tracing::warn!(error = %e, "Failed to clear login attempt record");
        }
    }
}

fn ceil_secs(ms: u64) -> u64 {
    ms.div_ceil(1000)
}
