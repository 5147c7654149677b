//! Per-caller sliding-window quota gate.
//!
//! One `QuotaWindow` is tracked per unauthenticated caller key (source IP).
//! Windows live only in process memory; expired windows are detected lazily
//! on access and additionally evicted by a periodic background sweep so the
//! map stays bounded. The sweep is a liveness optimization, not a
//! correctness requirement.

use crate::types::{AuthDecision, QuotaStatus};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use tracing::debug;

/// One caller's request count within the current window.
#[derive(Debug, Clone, Copy)]
struct QuotaWindow {
    count: u32,
    /// Epoch millisecond at which this window lapses.
    reset_at: u64,
}

/// Mutex-protected table of quota windows keyed by caller.
///
/// Created at process start and handed to the engine by reference; tests
/// substitute an isolated store instead of relying on ambient globals.
pub struct QuotaStore {
    windows: Mutex<HashMap<String, QuotaWindow>>,
    window_length: Duration,
}

fn now_epoch_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

impl QuotaStore {
    pub fn new(window_length: Duration) -> Self {
        Self {
            windows: Mutex::new(HashMap::new()),
            window_length,
        }
    }

    /// Gate one request for `caller_key` against `ceiling`.
    ///
    /// Authenticated callers (any mode) are fully exempt and never tracked.
    /// Otherwise the caller's window is created, advanced, or — once the
    /// count is at the ceiling — left unchanged with `allowed = false`.
    pub fn check(&self, caller_key: &str, auth: &AuthDecision, ceiling: u32) -> QuotaStatus {
        self.check_at(caller_key, auth, ceiling, now_epoch_ms())
    }

    /// `check` with an explicit clock, used by tests.
    fn check_at(
        &self,
        caller_key: &str,
        auth: &AuthDecision,
        ceiling: u32,
        now_ms: u64,
    ) -> QuotaStatus {
        let window_ms = self.window_length.as_millis() as u64;

        if auth.authenticated {
            // Exempt callers report count 0 and are never entered in the map.
            return QuotaStatus {
                allowed: true,
                count: 0,
                reset_at: now_ms + window_ms,
            };
        }

        let mut windows = self.windows.lock().expect("quota store lock poisoned");

        match windows.get(caller_key).copied() {
            Some(existing) if now_ms <= existing.reset_at => {
                if existing.count >= ceiling {
                    debug!(caller = %caller_key, count = existing.count, "quota ceiling reached");
                    return QuotaStatus {
                        allowed: false,
                        count: existing.count,
                        reset_at: existing.reset_at,
                    };
                }
                let advanced = QuotaWindow {
                    count: existing.count + 1,
                    reset_at: existing.reset_at,
                };
                windows.insert(caller_key.to_string(), advanced);
                QuotaStatus {
                    allowed: true,
                    count: advanced.count,
                    reset_at: advanced.reset_at,
                }
            }
            // Fresh caller, or the existing window has lapsed: start over.
            _ => {
                let fresh = QuotaWindow {
                    count: 1,
                    reset_at: now_ms + window_ms,
                };
                windows.insert(caller_key.to_string(), fresh);
                QuotaStatus {
                    allowed: true,
                    count: 1,
                    reset_at: fresh.reset_at,
                }
            }
        }
    }

    /// Remove every window whose reset time has passed.
    pub fn sweep_expired(&self) {
        self.sweep_expired_at(now_epoch_ms())
    }

    fn sweep_expired_at(&self, now_ms: u64) {
        let mut windows = self.windows.lock().expect("quota store lock poisoned");
        let before = windows.len();
        windows.retain(|_, w| now_ms <= w.reset_at);
        let evicted = before - windows.len();
        if evicted > 0 {
            debug!(evicted, remaining = windows.len(), "swept expired quota windows");
        }
    }

    /// Number of windows currently tracked.
    pub fn tracked_callers(&self) -> usize {
        self.windows.lock().expect("quota store lock poisoned").len()
    }
}

/// Run `sweep_expired` on a fixed interval until the store is dropped.
///
/// The sweep holds the map lock only for the retain pass, so request-path
/// checks are never blocked longer than one eviction walk.
pub fn spawn_sweeper(store: Arc<QuotaStore>, interval: Duration) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        // The first tick fires immediately; skip it so a fresh engine
        // doesn't sweep an empty map at startup.
        ticker.tick().await;
        loop {
            ticker.tick().await;
            store.sweep_expired();
        }
    })
}
