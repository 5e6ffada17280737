//! Execution orchestrator
//!
//! Owns the single authoritative in-memory graph for one pipeline and turns
//! components into running compute sessions. Execution is strictly serial:
//! at most one event subscription is open at a time, and during a
//! whole-pipeline run the next component is launched only from the terminal
//! event of the previous one.
//!
//! Run order is the array order of the graph's nodes. Dependency edges are
//! a separate, user-visible layer that the scheduler never consults.

use std::sync::Arc;
use uuid::Uuid;

use crate::artifacts;
use crate::config::ExecutorConfig;
use crate::error::{EngineError, Result};
use crate::lifecycle::{LifecycleMachine, RunOutcome, Transition};
use crate::notify::NotificationSink;
use crate::registry::{self, EdgeToggle};
use crate::store::PipelineStore;
use gantry_client::{EventSource, SessionService};
use gantry_core::domain::graph::{ComponentNode, PipelineGraph};
use gantry_core::domain::pipeline::PipelineDefinition;
use gantry_core::domain::run::{ExecutionContext, RunQueue};
use gantry_core::dto::component::ComponentDraft;
use gantry_core::dto::session::{CreateSessionRequest, SessionHandle};
use gantry_core::slug::slugify;

/// One open session subscription
struct ActiveRun {
    ctx: ExecutionContext,
    machine: LifecycleMachine,
    events: Box<dyn EventSource>,
    /// A destroy request has already been issued for this session
    terminating: bool,
}

/// Sequential execution engine for one pipeline
pub struct PipelineExecutor {
    folder: String,
    definition: PipelineDefinition,
    graph: PipelineGraph,
    queue: RunQueue,
    store: PipelineStore,
    sessions: Arc<dyn SessionService>,
    sink: Arc<dyn NotificationSink>,
    config: ExecutorConfig,
    active: Option<ActiveRun>,
}

impl PipelineExecutor {
    /// Open an existing pipeline, loading its definition and graph
    pub async fn open(
        folder: impl Into<String>,
        store: PipelineStore,
        sessions: Arc<dyn SessionService>,
        sink: Arc<dyn NotificationSink>,
        config: ExecutorConfig,
    ) -> Result<Self> {
        let folder = folder.into();
        let definition = store.load_definition(&folder).await?;
        let graph = store.load_graph(&folder).await?;

        Ok(Self {
            folder,
            definition,
            graph,
            queue: RunQueue::new(),
            store,
            sessions,
            sink,
            config,
            active: None,
        })
    }

    pub fn folder(&self) -> &str {
        &self.folder
    }

    pub fn definition(&self) -> &PipelineDefinition {
        &self.definition
    }

    pub fn graph(&self) -> &PipelineGraph {
        &self.graph
    }

    /// Components still queued for the current whole-pipeline run
    pub fn queued(&self) -> usize {
        self.queue.len()
    }

    /// Whether a session subscription is currently open
    pub fn is_running(&self) -> bool {
        self.active.is_some()
    }

    /// Re-download the graph, discarding the in-memory copy
    ///
    /// The persisted artifact is the sole source of truth; after an
    /// external-looking failure the cache must be rebuilt from it.
    pub async fn reload(&mut self) -> Result<()> {
        self.graph = self.store.load_graph(&self.folder).await?;
        Ok(())
    }

    // =============================================================================
    // Structural edits
    // =============================================================================

    /// Add a component and persist the graph
    pub async fn add_component(&mut self, draft: &ComponentDraft) -> Result<ComponentNode> {
        let node = registry::add_node(&mut self.graph, draft)?;
        self.store.save_graph(&self.folder, &self.graph).await?;
        Ok(node)
    }

    /// Update a component in place and persist the graph
    pub async fn update_component(
        &mut self,
        id: Uuid,
        draft: &ComponentDraft,
    ) -> Result<ComponentNode> {
        let node = registry::update_node(&mut self.graph, id, draft)?;
        self.store.save_graph(&self.folder, &self.graph).await?;
        Ok(node)
    }

    /// Remove components (and their edges) and persist the graph
    pub async fn remove_components(&mut self, ids: &[Uuid]) -> Result<()> {
        registry::delete_nodes(&mut self.graph, ids);
        self.store.save_graph(&self.folder, &self.graph).await
    }

    /// Toggle the edge between two components and persist the graph
    pub async fn toggle_dependency(&mut self, a: Uuid, b: Uuid) -> Result<EdgeToggle> {
        let toggle = registry::toggle_edge(&mut self.graph, a, b)?;
        self.store.save_graph(&self.folder, &self.graph).await?;
        Ok(toggle)
    }

    /// Upload a component's source file
    ///
    /// Editing the code invalidates the node's last run, so `executed` is
    /// reset before the graph is persisted.
    pub async fn push_source(&mut self, id: Uuid, code: &str) -> Result<()> {
        let index = self
            .graph
            .node_index(id)
            .ok_or(EngineError::UnknownComponent(id))?;
        let node = self.graph.nodes[index].clone();

        let storage = self.store.storage().clone();
        artifacts::ensure_component_folder(storage.as_ref(), &self.folder, &node).await?;
        storage
            .upload(&self.folder, &artifacts::main_path(&node), code.as_bytes())
            .await
            .map_err(EngineError::Artifact)?;

        self.graph.nodes[index].executed = false;
        self.store.save_graph(&self.folder, &self.graph).await
    }

    /// Download a component's current source file
    pub async fn component_source(&self, id: Uuid) -> Result<String> {
        let node = self
            .graph
            .node(id)
            .ok_or(EngineError::UnknownComponent(id))?;
        let storage = self.store.storage().clone();
        artifacts::ensure_main_source(storage.as_ref(), &self.folder, node).await
    }

    /// Download the archived logs of a component's last run
    pub async fn component_logs(&self, id: Uuid) -> Result<String> {
        let node = self
            .graph
            .node(id)
            .ok_or(EngineError::UnknownComponent(id))?;
        let bytes = self
            .store
            .storage()
            .download(&self.folder, &artifacts::log_path(node))
            .await?;
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }

    // =============================================================================
    // Execution
    // =============================================================================

    /// Persist the current graph without running anything
    pub async fn save_pipeline(&self) -> Result<()> {
        self.store.save_graph(&self.folder, &self.graph).await
    }

    /// Launch a single component by array index
    ///
    /// Returns as soon as the session is queued and its event subscription
    /// is open; completion is observed through [`step`](Self::step) or
    /// [`drive`](Self::drive). Any synchronous launch failure is surfaced
    /// to the notification sink and clears a pending run queue.
    pub async fn run_component(&mut self, index: usize) -> Result<()> {
        if self.active.is_some() {
            return Err(EngineError::AlreadyInProgress);
        }

        match self.launch(index).await {
            Ok(run) => {
                self.active = Some(run);
                Ok(())
            }
            Err(e) => {
                self.queue.clear();
                self.sink.indicator_done();
                self.sink.toast(&format!("Failed to launch component: {}", e));
                Err(e)
            }
        }
    }

    /// Run the whole pipeline from the top
    ///
    /// Resets every node's `executed` flag, persists, queues everything
    /// after the first node and launches index 0. Later components launch
    /// only from the terminal event of their predecessor.
    pub async fn run_pipeline(&mut self) -> Result<()> {
        if self.active.is_some() {
            return Err(EngineError::AlreadyInProgress);
        }
        if self.graph.nodes.is_empty() {
            self.sink.toast("Pipeline has no components to run");
            return Ok(());
        }

        for node in &mut self.graph.nodes {
            node.executed = false;
        }
        self.store.save_graph(&self.folder, &self.graph).await?;

        self.queue.seed(self.graph.nodes.iter().skip(1).map(|n| n.id));
        self.run_component(0).await
    }

    /// Consume one event from the open subscription
    ///
    /// Returns whether a subscription is still open afterwards. A stream
    /// failure or premature close counts as a terminated run with a failed
    /// outcome.
    pub async fn step(&mut self) -> Result<bool> {
        let transition = {
            let Some(run) = self.active.as_mut() else {
                return Ok(false);
            };

            match run.events.next_event().await {
                Ok(Some(event)) => {
                    tracing::debug!(event = event.event_name(), "Session event");
                    run.machine.apply(&event)
                }
                Ok(None) => {
                    self.sink
                        .toast("Event stream closed before the session terminated");
                    run.machine.interrupt()
                }
                Err(e) => {
                    self.sink.toast(&format!("Event stream failed: {}", e));
                    run.machine.interrupt()
                }
            }
        };

        self.perform(transition).await?;
        Ok(self.active.is_some())
    }

    /// Drive the current run (and any chained components) to completion
    pub async fn drive(&mut self) -> Result<()> {
        while self.step().await? {}
        Ok(())
    }

    /// Ask the service to destroy the session of the current run
    ///
    /// The run still ends through its terminal event, which the service
    /// emits while tearing the session down. A second request for the same
    /// session is rejected instead of issued twice.
    pub async fn abort_run(&mut self) -> Result<()> {
        let Some(run) = self.active.as_mut() else {
            return Err(EngineError::NotRunning);
        };
        if run.terminating {
            return Err(EngineError::AlreadyInProgress);
        }
        run.terminating = true;

        let session_id = run.ctx.session_id.clone();
        self.sessions.destroy_session(&session_id).await?;
        Ok(())
    }

    async fn perform(&mut self, transition: Transition) -> Result<()> {
        match transition {
            Transition::Ignored => Ok(()),
            Transition::Notify(message) => {
                self.sink.toast(&message);
                Ok(())
            }
            Transition::MarkExecuted => {
                let Some(run) = self.active.as_ref() else {
                    return Ok(());
                };
                if let Some(node) = self.graph.nodes.get_mut(run.ctx.node_index) {
                    node.executed = true;
                }
                self.store.save_graph(&self.folder, &self.graph).await
            }
            Transition::Finalize {
                outcome,
                session_name,
            } => self.finalize(outcome, session_name).await,
        }
    }

    /// Terminal step of one run: archive logs, close the subscription and
    /// advance or clear the queue
    ///
    /// The final notification uses the session name carried by the terminal
    /// event when one was delivered.
    async fn finalize(&mut self, outcome: RunOutcome, session_name: Option<String>) -> Result<()> {
        let Some(run) = self.active.take() else {
            return Ok(());
        };
        let session_name = session_name.unwrap_or_else(|| run.ctx.session_name.clone());

        match self.sessions.task_logs(&run.ctx.kernel_id).await {
            Ok(text) => {
                if let Some(node) = self.graph.nodes.get(run.ctx.node_index) {
                    let storage = self.store.storage().clone();
                    if let Err(e) =
                        artifacts::upload_logs(storage.as_ref(), &self.folder, node, &text).await
                    {
                        tracing::warn!("Failed to archive session logs: {}", e);
                    }
                }
            }
            Err(e) => {
                tracing::warn!("Failed to fetch task logs: {}", e);
            }
        }

        self.sink.indicator_done();

        match outcome {
            RunOutcome::Succeeded => {
                self.sink
                    .toast(&format!("Session {} finished successfully", session_name));
                if let Some(next) = self.queue.pop() {
                    match self.graph.node_index(next) {
                        Some(index) => {
                            self.run_component(index).await?;
                        }
                        None => {
                            tracing::warn!(
                                "Queued component {} is no longer in the graph; clearing run queue",
                                next
                            );
                            self.queue.clear();
                        }
                    }
                }
            }
            RunOutcome::Failed => {
                self.sink.toast(&format!("Session {} failed", session_name));
                self.queue.clear();
            }
        }

        Ok(())
    }

    async fn launch(&mut self, index: usize) -> Result<ActiveRun> {
        let node = self
            .graph
            .nodes
            .get(index)
            .ok_or(EngineError::UnknownIndex(index))?
            .clone();

        // Prerequisite check is by array position, not by edges
        if let Some(pending) = self.graph.nodes[..index].iter().find(|n| !n.executed) {
            return Err(EngineError::PrerequisiteNotMet {
                title: pending.title.clone(),
            });
        }

        self.sink
            .indicator(&format!("Preparing files for '{}'", node.title));
        let storage = self.store.storage().clone();
        artifacts::ensure_component_folder(storage.as_ref(), &self.folder, &node).await?;
        artifacts::ensure_main_source(storage.as_ref(), &self.folder, &node).await?;

        let session_name = format!(
            "{}-{}-{}",
            slugify(&self.folder),
            node.path,
            &Uuid::new_v4().simple().to_string()[..8]
        );
        let request = CreateSessionRequest {
            image: self.definition.image(),
            name: session_name,
            domain: self.config.domain.clone(),
            group_name: self.config.group.clone(),
            session_type: "batch".to_string(),
            enqueue_only: true,
            startup_command: format!(
                "cd {}/{}/{}; python {}",
                self.config.mount_prefix, self.folder, node.path, artifacts::MAIN_FILE
            ),
            max_wait_seconds: 0,
            mounts: vec![self.folder.clone()],
            scaling_group: self.definition.scaling_group.clone(),
            cpu: node.resources.cpu,
            mem: format!("{}g", node.resources.mem),
            fgpu: node.resources.gpu,
        };

        self.sink
            .indicator(&format!("Requesting a session for '{}'", node.title));
        let handle = self.sessions.create_session(&request).await?;

        let kernel_id = self.await_kernel(&handle).await?;

        let events = self.sessions.subscribe(&handle.session_name).await?;

        self.sink.toast(&format!(
            "Session {} queued for component '{}'",
            handle.session_name, node.title
        ));
        self.sink.indicator_done();

        Ok(ActiveRun {
            ctx: ExecutionContext {
                session_id: handle.session_id,
                session_name: handle.session_name,
                kernel_id,
                node_index: index,
            },
            machine: LifecycleMachine::new(),
            events,
            terminating: false,
        })
    }

    /// Bounded wait for the service to assign a kernel to the session
    ///
    /// The subscription is only opened once a kernel id is known; if none
    /// appears within the poll bound the launch is aborted.
    async fn await_kernel(&self, handle: &SessionHandle) -> Result<String> {
        for attempt in 0..self.config.kernel_poll_attempts {
            if attempt > 0 {
                tokio::time::sleep(self.config.kernel_poll_interval).await;
            }

            match self.sessions.get_session(&handle.session_id).await {
                Ok(status) => {
                    if let Some(kernel_id) = status.kernel_id {
                        return Ok(kernel_id);
                    }
                }
                // The session may not be visible yet right after enqueueing
                Err(e) if e.is_not_found() => {}
                Err(e) => return Err(e.into()),
            }

            tracing::debug!(
                attempt = attempt + 1,
                session = %handle.session_name,
                "Session has no kernel yet"
            );
        }

        Err(EngineError::SessionNotReady(handle.session_name.clone()))
    }
}
