use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use dashmap::DashMap;
use tokio::sync::{Mutex, OwnedMutexGuard};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use recall_core::{Notification, OwnerId, ReminderKey};
use recall_store::ReminderStore;

use crate::{
    error::Result,
    policy::{IntervalPolicy, FIRST_STEP},
    sink::NotificationSink,
    types::{Firing, ScheduledTimer, Slot, TimerInfo},
};

/// Drives every reminder chain: one Tokio timer task per live key.
///
/// All operations on a key (`schedule`, `cancel`, and each firing including
/// its store lookup and delivery) run under that key's async mutex, so they
/// are totally ordered per key while different keys proceed concurrently.
///
/// Cheap to clone; clones share the same timer table.
#[derive(Clone)]
pub struct ReminderScheduler {
    inner: Arc<Inner>,
}

struct Inner {
    store: Arc<dyn ReminderStore>,
    sink: Arc<dyn NotificationSink>,
    policy: IntervalPolicy,
    slots: DashMap<ReminderKey, Arc<Mutex<Slot>>>,
    next_generation: AtomicU64,
}

impl ReminderScheduler {
    pub fn new(
        store: Arc<dyn ReminderStore>,
        sink: Arc<dyn NotificationSink>,
        policy: IntervalPolicy,
    ) -> Self {
        Self {
            inner: Arc::new(Inner {
                store,
                sink,
                policy,
                slots: DashMap::new(),
                next_generation: AtomicU64::new(1),
            }),
        }
    }

    pub fn policy(&self) -> &IntervalPolicy {
        &self.inner.policy
    }

    /// Start (or restart) the chain for `(owner, subject)` at step 1.
    ///
    /// The entry must already be in the store. Any live timer for the key is
    /// cancelled first, so repeated calls leave exactly one timer behind.
    pub async fn schedule(&self, subject: &str, owner: OwnerId) -> TimerInfo {
        let key = ReminderKey::new(owner, subject);
        let mut slot = self.lock_slot(&key).await;
        if let Some(old) = slot.timer.take() {
            old.handle.cancel();
            debug!(%owner, subject, old_step = old.step, "replacing live timer");
        }
        let info = self.arm(&mut slot, &key, FIRST_STEP);
        info!(%owner, subject, fire_at = %info.fire_at, "reminder chain scheduled");
        info
    }

    /// Drop the live timer for `(owner, subject)`, if any.
    ///
    /// Returns whether a timer was cancelled. The store is not touched.
    pub async fn cancel(&self, subject: &str, owner: OwnerId) -> bool {
        let key = ReminderKey::new(owner, subject);
        let mut slot = self.lock_slot(&key).await;
        let cancelled = match slot.timer.take() {
            Some(timer) => {
                timer.handle.cancel();
                info!(%owner, subject, step = timer.step, "reminder chain cancelled");
                true
            }
            None => false,
        };
        self.release(&key, slot);
        cancelled
    }

    /// Reschedule every persisted entry from step 1.
    ///
    /// Steps are not persisted, so a restart begins every chain anew.
    pub async fn resume(&self) -> Result<usize> {
        let entries = self.inner.store.entries()?;
        for entry in &entries {
            self.schedule(&entry.subject, entry.owner).await;
        }
        if !entries.is_empty() {
            info!(count = entries.len(), "reminder chains resumed");
        }
        Ok(entries.len())
    }

    /// Cancel every live timer without touching the store.
    pub async fn shutdown(&self) -> usize {
        let slots: Vec<_> = self
            .inner
            .slots
            .iter()
            .map(|entry| (entry.key().clone(), Arc::clone(entry.value())))
            .collect();
        let mut cancelled = 0;
        for (key, slot) in slots {
            let mut guard = slot.lock_owned().await;
            if let Some(timer) = guard.timer.take() {
                timer.handle.cancel();
                cancelled += 1;
            }
            self.release(&key, guard);
        }
        info!(cancelled, "scheduler shut down");
        cancelled
    }

    /// Step and due time of the live timer for `(owner, subject)`.
    pub async fn timer(&self, subject: &str, owner: OwnerId) -> Option<TimerInfo> {
        let key = ReminderKey::new(owner, subject);
        let slot = self.lock_slot(&key).await;
        let info = slot.timer.as_ref().map(ScheduledTimer::info);
        self.release(&key, slot);
        info
    }

    /// Number of keys with a live timer.
    pub async fn live_timers(&self) -> usize {
        let slots: Vec<_> = self
            .inner
            .slots
            .iter()
            .map(|entry| Arc::clone(entry.value()))
            .collect();
        let mut live = 0;
        for slot in slots {
            if slot.lock().await.timer.is_some() {
                live += 1;
            }
        }
        live
    }

    // --- private helpers ---------------------------------------------------

    /// Handle a timer that reached its due time.
    async fn on_fire(&self, firing: Firing) {
        let Firing {
            key,
            step,
            generation,
        } = firing;
        let owner = key.owner;
        let subject = key.subject.as_str();

        let mut slot = self.lock_slot(&key).await;
        // A cancel or re-schedule may have won the lock after the sleep ended.
        match slot.timer.as_ref() {
            Some(timer) if timer.generation == generation => {}
            _ => {
                debug!(%owner, subject, step, "stale firing dropped");
                self.release(&key, slot);
                return;
            }
        }
        slot.timer = None;

        let note = match self.inner.store.fetch(subject, owner) {
            Ok(note) => note,
            Err(e) if e.is_not_found() => {
                debug!(%owner, subject, step, "entry removed before firing; chain stopped");
                self.release(&key, slot);
                return;
            }
            Err(e) => {
                // Keep the chain alive; retry the same step after its delay.
                error!(%owner, subject, step, "store lookup failed: {e}");
                self.arm(&mut slot, &key, step);
                self.release(&key, slot);
                return;
            }
        };

        let next_step = step + 1;
        let next_delay = self.inner.policy.next_delay(next_step);
        let notification = Notification {
            owner,
            subject: key.subject.clone(),
            has_note: note.as_deref().is_some_and(|n| !n.is_empty()),
            terminal: next_delay.is_none(),
            step,
        };

        info!(%owner, subject, step, terminal = notification.terminal, "reminder firing");
        if let Err(e) = self.inner.sink.deliver(&notification).await {
            warn!(%owner, subject, step, "notification delivery failed: {e}");
        }

        match next_delay {
            None => {
                if let Err(e) = self.inner.store.remove(subject, owner) {
                    error!(%owner, subject, "failed to remove completed entry: {e}");
                }
                info!(%owner, subject, "reminder chain complete");
            }
            Some(_) => {
                self.arm(&mut slot, &key, next_step);
            }
        }
        self.release(&key, slot);
    }

    /// Install a fresh timer for `step` in `slot` and spawn its sleeper.
    ///
    /// The caller must have cleared any previous timer.
    fn arm(&self, slot: &mut Slot, key: &ReminderKey, step: u8) -> TimerInfo {
        let delay = self
            .inner
            .policy
            .next_delay(step)
            .unwrap_or(Duration::ZERO);
        let generation = self.inner.next_generation.fetch_add(1, Ordering::Relaxed);
        let handle = CancellationToken::new();
        let fire_at =
            Utc::now() + chrono::Duration::from_std(delay).unwrap_or(chrono::Duration::zero());

        let timer = ScheduledTimer {
            step,
            fire_at,
            generation,
            handle: handle.clone(),
        };
        let info = timer.info();
        slot.timer = Some(timer);

        let this = self.clone();
        let firing = Firing {
            key: key.clone(),
            step,
            generation,
        };
        tokio::spawn(async move {
            tokio::select! {
                _ = handle.cancelled() => {}
                _ = tokio::time::sleep(delay) => this.on_fire(firing).await,
            }
        });

        debug!(owner = %key.owner, subject = %key.subject, step, "timer armed");
        info
    }

    /// Lock the slot for `key`, creating it if absent.
    async fn lock_slot(&self, key: &ReminderKey) -> OwnedMutexGuard<Slot> {
        loop {
            let slot = self.inner.slots.entry(key.clone()).or_default().value().clone();
            let guard = slot.lock_owned().await;
            if !guard.retired {
                return guard;
            }
        }
    }

    /// Unlock `slot`, unlinking it from the table when it holds no timer.
    fn release(&self, key: &ReminderKey, mut slot: OwnedMutexGuard<Slot>) {
        if slot.timer.is_none() {
            slot.retired = true;
            let this = OwnedMutexGuard::mutex(&slot);
            self.inner
                .slots
                .remove_if(key, |_, value| Arc::ptr_eq(value, this));
        }
    }
}
