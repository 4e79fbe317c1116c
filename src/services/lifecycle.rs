//! End-to-end transition orchestration.

use std::collections::HashMap;
use std::sync::atomic::Ordering;
use std::sync::{Arc, Mutex, PoisonError};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::domain::errors::{ConsoleError, ConsoleResult};
use crate::domain::models::{PollingConfig, ServerInstance, TransitionKey, TransitionOutcome};
use crate::domain::ports::{HostInventoryStore, InstanceView};
use crate::services::convergence_poller::{ConvergencePoller, PollOutcome};
use crate::services::event_bus::{ConsoleEvent, EventBus, StaleDomain};
use crate::services::instance_filter::{EntityFilter, GroupCriterion};
use crate::services::reload_tracker::ReloadTracker;
use crate::services::selection::HostSelection;
use crate::services::snapshot_store::SnapshotStore;

type ActivePollers = Arc<Mutex<HashMap<TransitionKey, Arc<ConvergencePoller>>>>;

/// Handle to one in-flight transition watch.
///
/// The outcome resolves exactly once: await [`TransitionHandle::wait`]
/// for it, or call [`TransitionHandle::cancel`] to stop the watch
/// before its next tick.
pub struct TransitionHandle {
    id: Uuid,
    key: TransitionKey,
    poller: Arc<ConvergencePoller>,
    task: JoinHandle<ConsoleResult<TransitionOutcome>>,
}

impl TransitionHandle {
    /// Unique id of this transition request.
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// The (host, server) pair being transitioned.
    pub fn key(&self) -> &TransitionKey {
        &self.key
    }

    /// Cancel the watch. Takes effect before the next scheduled tick;
    /// an in-flight fetch completes but its result is discarded.
    pub fn cancel(&self) {
        self.poller.cancel();
    }

    /// Wait for the terminal outcome.
    pub async fn wait(self) -> ConsoleResult<TransitionOutcome> {
        self.task
            .await
            .map_err(|e| ConsoleError::InvalidState(format!("transition watch aborted: {e}")))?
    }
}

impl std::fmt::Debug for TransitionHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TransitionHandle")
            .field("id", &self.id)
            .field("key", &self.key)
            .finish_non_exhaustive()
    }
}

/// Orchestrates instance lifecycle transitions end to end.
///
/// A transition request issues the remote start/stop command and, on
/// acceptance, launches a [`ConvergencePoller`] whose probe re-fetches
/// the host's instance list until the target instance reaches the
/// desired state or the direction-specific budget runs out. The
/// coordinator is the single writer of the snapshot store while a
/// transition is in flight.
pub struct LifecycleCoordinator {
    inventory: Arc<dyn HostInventoryStore>,
    view: Arc<dyn InstanceView>,
    snapshots: Arc<SnapshotStore>,
    reload: Arc<ReloadTracker>,
    events: Arc<EventBus>,
    selection: Arc<HostSelection>,
    polling: PollingConfig,
    filter: EntityFilter<ServerInstance>,
    active: ActivePollers,
}

impl LifecycleCoordinator {
    /// Wire up a coordinator with its collaborators.
    pub fn new(
        inventory: Arc<dyn HostInventoryStore>,
        view: Arc<dyn InstanceView>,
        snapshots: Arc<SnapshotStore>,
        reload: Arc<ReloadTracker>,
        events: Arc<EventBus>,
        selection: Arc<HostSelection>,
        polling: PollingConfig,
    ) -> Self {
        Self {
            inventory,
            view,
            snapshots,
            reload,
            events,
            selection,
            polling,
            filter: EntityFilter::new(),
            active: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// The shared selection context.
    pub fn selection(&self) -> &Arc<HostSelection> {
        &self.selection
    }

    /// The pending-transition tracker.
    pub fn reload_tracker(&self) -> &Arc<ReloadTracker> {
        &self.reload
    }

    /// The snapshot store.
    pub fn snapshots(&self) -> &Arc<SnapshotStore> {
        &self.snapshots
    }

    /// The event bus.
    pub fn events(&self) -> &Arc<EventBus> {
        &self.events
    }

    /// Select a host and broadcast the change.
    pub fn select_host(&self, host: &str) {
        self.selection.set_host(host);
        info!(host, "host selected");
        self.events.publish(ConsoleEvent::SelectionChanged {
            host: host.to_string(),
            server: None,
        });
    }

    /// Select a server within the currently selected host.
    pub fn select_server(&self, server: &str) -> ConsoleResult<()> {
        let host = self.require_host()?;
        self.selection.set_server(server);
        self.events.publish(ConsoleEvent::SelectionChanged {
            host,
            server: Some(server.to_string()),
        });
        Ok(())
    }

    /// Fetch the instance list for the selected host, store the
    /// snapshot, and push it to the view.
    pub async fn load_instances(&self) -> ConsoleResult<Vec<ServerInstance>> {
        let host = self.require_host()?;
        let instances = self.inventory.fetch_instances(&host).await?;
        self.snapshots.put(host.clone(), instances.clone());
        self.view.on_instances_updated(&host, &instances);
        debug!(host, count = instances.len(), "instances loaded");
        Ok(instances)
    }

    /// Push a group-filtered view of the current snapshot. The stored
    /// snapshot itself is left untouched; an empty group name matches
    /// every instance.
    pub fn filter_by_group(&self, group: &str) -> ConsoleResult<Vec<ServerInstance>> {
        let host = self.require_host()?;
        let snapshot = self.snapshots.get(&host).unwrap_or_default();
        let filtered = self.filter.apply(&GroupCriterion::new(group), &snapshot);
        self.view.on_instances_updated(&host, &filtered);
        Ok(filtered)
    }

    /// Request a start (`desired_running = true`) or stop transition
    /// for one instance and watch it to convergence.
    ///
    /// At most one watch per (host, server) pair may be in flight; a
    /// second request while one is pending is rejected with
    /// [`ConsoleError::ConflictingTransition`] rather than superseding
    /// it. If the remote command fails or is rejected, the pending
    /// marker is cleared and no poller is started.
    pub async fn request_transition(
        &self,
        host: &str,
        server: &str,
        desired_running: bool,
    ) -> ConsoleResult<TransitionHandle> {
        let key = TransitionKey::new(host, server);
        let budget = self.polling.budget_for(desired_running);
        let poller = Arc::new(ConvergencePoller::new(self.polling.delay(), budget));

        {
            let mut active = self.active.lock().unwrap_or_else(PoisonError::into_inner);
            if active.contains_key(&key) {
                return Err(ConsoleError::ConflictingTransition {
                    host: host.to_string(),
                    server: server.to_string(),
                });
            }
            active.insert(key.clone(), Arc::clone(&poller));
        }
        self.reload.mark_pending(server);

        let accepted = match self
            .inventory
            .set_running(host, server, desired_running)
            .await
        {
            Ok(accepted) => accepted,
            Err(e) => {
                self.abandon(&key);
                return Err(e);
            }
        };
        if !accepted {
            self.abandon(&key);
            return Err(ConsoleError::TransitionRejected {
                host: host.to_string(),
                server: server.to_string(),
            });
        }

        info!(%key, desired_running, budget, "transition accepted, watching for convergence");

        let id = Uuid::new_v4();
        let task = tokio::spawn(Self::watch(
            Arc::clone(&self.inventory),
            Arc::clone(&self.view),
            Arc::clone(&self.snapshots),
            Arc::clone(&self.reload),
            Arc::clone(&self.events),
            Arc::clone(&self.active),
            Arc::clone(&poller),
            key.clone(),
            desired_running,
        ));

        Ok(TransitionHandle {
            id,
            key,
            poller,
            task,
        })
    }

    /// Cancel the in-flight transition for a (host, server) pair, if
    /// any. Used when the owning view is torn down or the selection
    /// moves away from the instance's host.
    pub fn cancel_transition(&self, host: &str, server: &str) -> bool {
        let key = TransitionKey::new(host, server);
        let active = self.active.lock().unwrap_or_else(PoisonError::into_inner);
        match active.get(&key) {
            Some(poller) => {
                poller.cancel();
                true
            }
            None => false,
        }
    }

    /// Whether a transition watch is currently in flight for the pair.
    pub fn is_transition_active(&self, host: &str, server: &str) -> bool {
        self.active
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(&TransitionKey::new(host, server))
    }

    fn require_host(&self) -> ConsoleResult<String> {
        self.selection
            .host()
            .ok_or_else(|| ConsoleError::InvalidState("host selection not set".to_string()))
    }

    fn abandon(&self, key: &TransitionKey) {
        self.active
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(key);
        self.reload.clear(&key.server);
    }

    /// The poll-to-termination body, run as a spawned task so the
    /// requester gets its handle back immediately.
    #[allow(clippy::too_many_arguments)]
    async fn watch(
        inventory: Arc<dyn HostInventoryStore>,
        view: Arc<dyn InstanceView>,
        snapshots: Arc<SnapshotStore>,
        reload: Arc<ReloadTracker>,
        events: Arc<EventBus>,
        active: ActivePollers,
        poller: Arc<ConvergencePoller>,
        key: TransitionKey,
        desired_running: bool,
    ) -> ConsoleResult<TransitionOutcome> {
        let cancel_flag = poller.cancel_flag();
        let host = key.host.clone();
        let server = key.server.clone();

        let result = poller
            .run(|_tick| {
                let inventory = Arc::clone(&inventory);
                let view = Arc::clone(&view);
                let snapshots = Arc::clone(&snapshots);
                let cancel_flag = Arc::clone(&cancel_flag);
                let host = host.clone();
                let server = server.clone();
                async move {
                    let instances = inventory.fetch_instances(&host).await?;
                    if cancel_flag.load(Ordering::SeqCst) {
                        // Cancelled while the fetch was in flight: the
                        // result must not reach shared state.
                        return Ok(false);
                    }
                    // Observers always see the latest known state,
                    // converged or not.
                    snapshots.put(host.clone(), instances.clone());
                    view.on_instances_updated(&host, &instances);

                    // A transiently missing entry is "not yet
                    // converged", not a terminal condition.
                    let keep_polling = instances
                        .iter()
                        .find(|instance| instance.name == server)
                        .is_none_or(|instance| {
                            if desired_running {
                                !instance.running
                            } else {
                                instance.running
                            }
                        });
                    Ok(keep_polling)
                }
            })
            .await;

        active
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&key);
        reload.clear(&server);
        events.publish(ConsoleEvent::ModelStale {
            domain: StaleDomain::Instances,
        });

        match result {
            Ok(PollOutcome::Converged { ticks }) => {
                let instances = snapshots.get(&host).unwrap_or_default();
                view.on_instances_updated(&host, &instances);
                info!(%key, ticks, "transition converged");
                Ok(TransitionOutcome::Converged { ticks, instances })
            }
            Ok(PollOutcome::Exhausted { ticks }) => {
                let instances = snapshots.get(&host).unwrap_or_default();
                view.on_instances_updated(&host, &instances);
                warn!(%key, ticks, "gave up polling before convergence");
                Ok(TransitionOutcome::GaveUp { ticks, instances })
            }
            Ok(PollOutcome::Cancelled { ticks }) => {
                debug!(%key, ticks, "transition watch cancelled");
                Ok(TransitionOutcome::Cancelled { ticks })
            }
            Err(e) => {
                warn!(%key, "transition watch failed: {e}");
                Err(e)
            }
        }
    }
}

impl std::fmt::Debug for LifecycleCoordinator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LifecycleCoordinator")
            .field("polling", &self.polling)
            .finish_non_exhaustive()
    }
}
