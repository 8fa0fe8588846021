use dspu_core::cluster::{NodeId, Role, RoleState};
use tokio::sync::watch;

use super::config::ElectionConfig;
use super::session::ElectionSession;

/// Handle held by callers (the HTTP gateway, the binary's shutdown path)
/// that never touch the election session directly.
#[derive(Clone)]
pub struct ElectionHandle {
    shutdown_tx: watch::Sender<bool>,
    role_rx: watch::Receiver<RoleState>,
}

impl ElectionHandle {
    /// The most recently published snapshot.
    pub fn role_state(&self) -> RoleState {
        self.role_rx.borrow().clone()
    }

    /// A receiver that can be awaited for subsequent changes.
    pub fn subscribe(&self) -> watch::Receiver<RoleState> {
        self.role_rx.clone()
    }

    /// Request the loop to stop. Does not block; see [`ElectionLoop::run`]
    /// for the bounded join window this unblocks.
    pub fn stop(&self) {
        let _ = self.shutdown_tx.send(true);
    }
}

/// The background election task described in the state machine: `INIT` →
/// `STANDBY` ⇄ `LEADER` → `STOPPED`. Owns the dedicated [`ElectionSession`]
/// exclusively; nothing else ever touches it.
pub struct ElectionLoop {
    database_url: String,
    config: ElectionConfig,
    role_tx: watch::Sender<RoleState>,
    shutdown_rx: watch::Receiver<bool>,
}

/// Local leadership memory kept across ticks without re-reading the store
/// on every republish while already LEADER.
#[derive(Clone, Copy)]
enum Held {
    Standby,
    Leader { epoch: i64 },
}

/// What a single tick learned, independent of whether the DB round trip
/// that produced it succeeded.
enum TickOutcome {
    Leader { epoch: i64 },
    Standby {
        leader_epoch: Option<i64>,
        leader_id: Option<String>,
    },
}

impl ElectionLoop {
    pub fn new(database_url: impl Into<String>, config: ElectionConfig) -> (Self, ElectionHandle) {
        let initial = RoleState::initial(NodeId::new(config.node_id.clone()));
        let (role_tx, role_rx) = watch::channel(initial);
        let (shutdown_tx, shutdown_rx) = watch::channel(false);

        let loop_ = Self {
            database_url: database_url.into(),
            config,
            role_tx,
            shutdown_rx,
        };
        let handle = ElectionHandle {
            shutdown_tx,
            role_rx,
        };
        (loop_, handle)
    }

    /// Run until `stop()` is called on the paired handle. Reconnects the
    /// session transparently on any backing-store error, always dropping
    /// to STANDBY first per the session-discipline invariant.
    pub async fn run(mut self) {
        let mut session: Option<ElectionSession> = None;
        let mut held = Held::Standby;

        loop {
            if *self.shutdown_rx.borrow() {
                break;
            }

            if session.is_none() {
                match ElectionSession::connect(&self.database_url).await {
                    Ok(s) => session = Some(s),
                    Err(e) => {
                        tracing::warn!(error = %e, "election session connect failed, retrying");
                        held = Held::Standby;
                        self.publish_standby(None, None);
                        if self.sleep_or_shutdown().await {
                            break;
                        }
                        continue;
                    }
                }
            }

            let node_id = self.config.node_id.clone();
            let lock_key = self.config.lock_key;
            let conn = session.as_mut().expect("session populated above");

            match Self::tick(conn, &node_id, lock_key, held).await {
                Ok(TickOutcome::Leader { epoch }) => {
                    held = Held::Leader { epoch };
                    self.publish_leader(epoch);
                }
                Ok(TickOutcome::Standby {
                    leader_epoch,
                    leader_id,
                }) => {
                    held = Held::Standby;
                    self.publish_standby(leader_epoch, leader_id);
                }
                Err(e) => {
                    // Session error: drop to STANDBY and force a reconnect
                    // next tick. Never republish LEADER without a fresh
                    // successful acquisition.
                    tracing::warn!(error = %e, "election tick failed, dropping session");
                    held = Held::Standby;
                    self.publish_standby(None, None);
                    if let Some(s) = session.take() {
                        let _ = s.close().await;
                    }
                }
            }

            if self.sleep_or_shutdown().await {
                break;
            }
        }

        if let Held::Leader { .. } = held {
            if let Some(s) = session.as_mut() {
                let _ = s.release_lock(self.config.lock_key).await;
            }
        }
        if let Some(s) = session {
            let _ = s.close().await;
        }
    }

    /// One tick of the algorithm described in the state machine table.
    async fn tick(
        session: &mut ElectionSession,
        node_id: &str,
        lock_key: i64,
        held: Held,
    ) -> dspu_core::error::Result<TickOutcome> {
        if let Held::Leader { epoch } = held {
            // Already LEADER: no DB traffic required per tick.
            return Ok(TickOutcome::Leader { epoch });
        }

        if session.try_acquire_lock(lock_key).await? {
            return match session.bump_epoch(node_id).await {
                Ok(epoch) => Ok(TickOutcome::Leader { epoch }),
                Err(e) => {
                    // Must not publish LEADER with an unwritten epoch.
                    let _ = session.release_lock(lock_key).await;
                    Err(e)
                }
            };
        }

        // Lost the race (or lock still held elsewhere): best-effort read
        // of the current epoch/leader_id for introspection only. A read
        // failure here does not affect safety, so it degrades to epoch
        // `0` / leader_id absent rather than propagating as a tick error.
        let (leader_epoch, leader_id) = session
            .read_epoch_and_leader()
            .await
            .unwrap_or((Some(0), None));
        Ok(TickOutcome::Standby {
            leader_epoch,
            leader_id,
        })
    }

    fn publish_leader(&self, epoch: i64) {
        let state = RoleState {
            node_id: NodeId::new(self.config.node_id.clone()),
            role: Role::Leader,
            leader_epoch: Some(epoch),
            leader_id: Some(self.config.node_id.clone()),
        };
        let _ = self.role_tx.send(state);
    }

    fn publish_standby(&self, leader_epoch: Option<i64>, leader_id: Option<String>) {
        let state = RoleState {
            node_id: NodeId::new(self.config.node_id.clone()),
            role: Role::Standby,
            leader_epoch,
            leader_id,
        };
        let _ = self.role_tx.send(state);
    }

    /// Sleeps for one poll interval, waking early on shutdown. Returns
    /// `true` when shutdown was observed.
    async fn sleep_or_shutdown(&mut self) -> bool {
        tokio::select! {
            _ = tokio::time::sleep(self.config.poll_interval) => false,
            _ = self.shutdown_rx.changed() => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn initial_handle_state_is_standby() {
        let config = ElectionConfig::new("node-a", 42, Duration::from_millis(10));
        let (_loop_, handle) = ElectionLoop::new("postgres://unused/unused", config);
        let state = handle.role_state();
        assert_eq!(state.role, Role::Standby);
        assert!(state.leader_epoch.is_none());
    }

    #[tokio::test]
    async fn stop_is_observed_by_shutdown_receiver() {
        let config = ElectionConfig::new("node-a", 42, Duration::from_millis(10));
        let (loop_, handle) = ElectionLoop::new("postgres://unused/unused", config);
        let mut shutdown_rx = loop_.shutdown_rx.clone();
        handle.stop();
        shutdown_rx.changed().await.unwrap();
        assert!(*shutdown_rx.borrow());
    }
}
