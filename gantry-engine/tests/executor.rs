//! Executor behavior tests
//!
//! Exercise the orchestrator and lifecycle interpreter end to end against
//! an in-memory storage service and a scripted session service.

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use gantry_client::{ClientError, EventSource, MemoryFolderService, SessionService};
use gantry_core::domain::pipeline::PipelineDefinition;
use gantry_core::domain::session::SessionEvent;
use gantry_core::dto::component::ComponentDraft;
use gantry_core::dto::session::{CreateSessionRequest, SessionHandle, SessionStatus};
use gantry_engine::{
    EngineError, ExecutorConfig, NotificationSink, PipelineExecutor, PipelineStore,
};

// =============================================================================
// Test doubles
// =============================================================================

/// One launch's worth of scripted lifecycle events
struct Script {
    events: Vec<&'static str>,
    /// Injected after the scripted events are drained
    error: Option<ClientError>,
}

fn script(events: &[&'static str]) -> Script {
    Script {
        events: events.to_vec(),
        error: None,
    }
}

struct ScriptedEvents {
    events: VecDeque<SessionEvent>,
    error: Option<ClientError>,
}

#[async_trait]
impl EventSource for ScriptedEvents {
    async fn next_event(&mut self) -> gantry_client::Result<Option<SessionEvent>> {
        if let Some(event) = self.events.pop_front() {
            return Ok(Some(event));
        }
        if let Some(err) = self.error.take() {
            return Err(err);
        }
        Ok(None)
    }
}

/// Session service double that records calls and replays scripted events
struct ScriptedSessions {
    scripts: Mutex<VecDeque<Script>>,
    requests: Mutex<Vec<CreateSessionRequest>>,
    created: AtomicUsize,
    subscribed: AtomicUsize,
    destroyed: AtomicUsize,
    kernels_ready: bool,
}

impl ScriptedSessions {
    fn new(scripts: Vec<Script>) -> Self {
        Self {
            scripts: Mutex::new(scripts.into()),
            requests: Mutex::new(Vec::new()),
            created: AtomicUsize::new(0),
            subscribed: AtomicUsize::new(0),
            destroyed: AtomicUsize::new(0),
            kernels_ready: true,
        }
    }

    fn without_kernels(mut self) -> Self {
        self.kernels_ready = false;
        self
    }

    fn created(&self) -> usize {
        self.created.load(Ordering::SeqCst)
    }

    fn subscribed(&self) -> usize {
        self.subscribed.load(Ordering::SeqCst)
    }

    fn destroyed(&self) -> usize {
        self.destroyed.load(Ordering::SeqCst)
    }

    fn requests(&self) -> Vec<CreateSessionRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl SessionService for ScriptedSessions {
    async fn create_session(
        &self,
        req: &CreateSessionRequest,
    ) -> gantry_client::Result<SessionHandle> {
        let n = self.created.fetch_add(1, Ordering::SeqCst) + 1;
        self.requests.lock().unwrap().push(req.clone());
        Ok(SessionHandle {
            session_id: format!("sid-{}", n),
            session_name: req.name.clone(),
        })
    }

    async fn get_session(&self, session_id: &str) -> gantry_client::Result<SessionStatus> {
        Ok(SessionStatus {
            session_id: session_id.to_string(),
            name: String::new(),
            status: "PREPARING".to_string(),
            kernel_id: self
                .kernels_ready
                .then(|| format!("{}-kernel", session_id)),
        })
    }

    async fn destroy_session(&self, _session_id: &str) -> gantry_client::Result<()> {
        self.destroyed.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn task_logs(&self, kernel_id: &str) -> gantry_client::Result<String> {
        Ok(format!("captured logs of {}\n", kernel_id))
    }

    async fn subscribe(
        &self,
        session_name: &str,
    ) -> gantry_client::Result<Box<dyn EventSource>> {
        self.subscribed.fetch_add(1, Ordering::SeqCst);
        let script = self
            .scripts
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| script(&[]));

        let events = script
            .events
            .iter()
            .map(|name| SessionEvent::from_wire(name, session_name.to_string()).unwrap())
            .collect();

        Ok(Box::new(ScriptedEvents {
            events,
            error: script.error,
        }))
    }
}

#[derive(Default)]
struct CollectingSink {
    toasts: Mutex<Vec<String>>,
}

impl CollectingSink {
    fn toasts(&self) -> Vec<String> {
        self.toasts.lock().unwrap().clone()
    }
}

impl NotificationSink for CollectingSink {
    fn toast(&self, message: &str) {
        self.toasts.lock().unwrap().push(message.to_string());
    }

    fn indicator(&self, _text: &str) {}

    fn indicator_done(&self) {}
}

// =============================================================================
// Harness
// =============================================================================

const FOLDER: &str = "demo";

fn definition() -> PipelineDefinition {
    PipelineDefinition {
        title: "demo".to_string(),
        description: None,
        environment: "python".to_string(),
        version: "3.11".to_string(),
        scaling_group: "default".to_string(),
        storage_host: "local:volume1".to_string(),
        created_at: chrono::Utc::now(),
    }
}

fn test_config() -> ExecutorConfig {
    let mut config = ExecutorConfig::new("default", "default");
    config.kernel_poll_attempts = 2;
    config.kernel_poll_interval = Duration::from_millis(1);
    config
}

struct Harness {
    storage: MemoryFolderService,
    sessions: Arc<ScriptedSessions>,
    sink: Arc<CollectingSink>,
    executor: PipelineExecutor,
}

async fn harness(titles: &[&str], sessions: ScriptedSessions) -> Harness {
    let storage = MemoryFolderService::new();
    let store = PipelineStore::new(Arc::new(storage.clone()));
    store.create_pipeline(FOLDER, &definition()).await.unwrap();

    let sessions = Arc::new(sessions);
    let sink = Arc::new(CollectingSink::default());
    let mut executor = PipelineExecutor::open(
        FOLDER,
        store,
        sessions.clone(),
        sink.clone(),
        test_config(),
    )
    .await
    .unwrap();

    for title in titles {
        executor
            .add_component(&ComponentDraft::new(*title))
            .await
            .unwrap();
    }

    Harness {
        storage,
        sessions,
        sink,
        executor,
    }
}

// =============================================================================
// Tests
// =============================================================================

#[tokio::test]
async fn test_prerequisite_not_met_never_calls_service() {
    let mut h = harness(&["a", "b"], ScriptedSessions::new(vec![])).await;

    let err = h.executor.run_component(1).await.unwrap_err();

    assert!(matches!(err, EngineError::PrerequisiteNotMet { .. }));
    assert_eq!(h.sessions.created(), 0);
    assert_eq!(h.sessions.subscribed(), 0);
    assert!(!h.executor.is_running());
}

#[tokio::test]
async fn test_single_component_success() {
    let mut h = harness(
        &["a"],
        ScriptedSessions::new(vec![script(&[
            "kernel_pulling",
            "session_started",
            "session_success",
            "session_terminated",
        ])]),
    )
    .await;

    h.executor.run_component(0).await.unwrap();
    assert!(h.executor.is_running());

    h.executor.drive().await.unwrap();

    assert_eq!(h.sessions.created(), 1);
    assert!(h.executor.graph().nodes[0].executed);
    assert!(!h.executor.is_running());
    // Logs were archived into the component's folder
    assert!(h.storage.has_file(FOLDER, "a/execution_logs.txt"));
}

#[tokio::test]
async fn test_run_pipeline_chains_components() {
    let mut h = harness(
        &["a", "b"],
        ScriptedSessions::new(vec![
            script(&["session_started", "session_success", "session_terminated"]),
            script(&["session_started", "session_success", "session_terminated"]),
        ]),
    )
    .await;

    h.executor.run_pipeline().await.unwrap();

    // First component launched immediately, second still queued
    assert_eq!(h.sessions.created(), 1);
    assert_eq!(h.executor.queued(), 1);
    assert!(!h.executor.graph().nodes[0].executed);

    h.executor.drive().await.unwrap();

    assert_eq!(h.sessions.created(), 2);
    assert_eq!(h.executor.queued(), 0);
    assert!(h.executor.graph().nodes.iter().all(|n| n.executed));

    // The persisted graph agrees with the in-memory one
    let store = PipelineStore::new(Arc::new(h.storage.clone()));
    let persisted = store.load_graph(FOLDER).await.unwrap();
    assert_eq!(&persisted, h.executor.graph());
}

#[tokio::test]
async fn test_failure_clears_queue_and_keeps_executed_false() {
    let mut h = harness(
        &["a", "b", "c"],
        ScriptedSessions::new(vec![script(&[
            "session_started",
            "session_failure",
            "session_terminated",
        ])]),
    )
    .await;

    h.executor.run_pipeline().await.unwrap();
    assert_eq!(h.executor.queued(), 2);

    h.executor.drive().await.unwrap();

    // No later component was launched or silently skipped
    assert_eq!(h.sessions.created(), 1);
    assert_eq!(h.executor.queued(), 0);
    assert!(h.executor.graph().nodes.iter().all(|n| !n.executed));
    // Logs are still archived for the failed run
    assert!(h.storage.has_file(FOLDER, "a/execution_logs.txt"));
    assert!(h.sink.toasts().iter().any(|t| t.contains("failed")));
}

#[tokio::test]
async fn test_chaining_skips_component_deleted_mid_run() {
    let mut h = harness(
        &["a", "b"],
        ScriptedSessions::new(vec![script(&[
            "session_started",
            "session_success",
            "session_terminated",
        ])]),
    )
    .await;

    h.executor.run_pipeline().await.unwrap();

    // Delete the queued component while the first one is running
    let b = h.executor.graph().nodes[1].id;
    h.executor.remove_components(&[b]).await.unwrap();

    h.executor.drive().await.unwrap();

    assert_eq!(h.sessions.created(), 1);
    assert_eq!(h.executor.queued(), 0);
    assert!(!h.executor.is_running());
}

#[tokio::test]
async fn test_run_while_running_is_rejected() {
    let mut h = harness(
        &["a"],
        ScriptedSessions::new(vec![script(&["session_success", "session_terminated"])]),
    )
    .await;

    h.executor.run_component(0).await.unwrap();

    assert!(matches!(
        h.executor.run_component(0).await.unwrap_err(),
        EngineError::AlreadyInProgress
    ));
    assert!(matches!(
        h.executor.run_pipeline().await.unwrap_err(),
        EngineError::AlreadyInProgress
    ));

    // Only the original launch reached the service
    assert_eq!(h.sessions.created(), 1);
}

#[tokio::test]
async fn test_session_not_ready_clears_queue() {
    let mut h = harness(
        &["a", "b"],
        ScriptedSessions::new(vec![]).without_kernels(),
    )
    .await;

    let err = h.executor.run_pipeline().await.unwrap_err();

    assert!(matches!(err, EngineError::SessionNotReady(_)));
    assert_eq!(h.executor.queued(), 0);
    // The subscription was never opened
    assert_eq!(h.sessions.subscribed(), 0);
    assert!(!h.executor.is_running());
}

#[tokio::test]
async fn test_stream_error_counts_as_failed_run() {
    let mut h = harness(
        &["a", "b"],
        ScriptedSessions::new(vec![Script {
            events: vec!["session_started"],
            error: Some(ClientError::Stream("connection reset".to_string())),
        }]),
    )
    .await;

    h.executor.run_pipeline().await.unwrap();
    h.executor.drive().await.unwrap();

    assert_eq!(h.sessions.created(), 1);
    assert_eq!(h.executor.queued(), 0);
    assert!(!h.executor.graph().nodes[0].executed);
    assert!(h.sink.toasts().iter().any(|t| t.contains("Event stream failed")));
}

#[tokio::test]
async fn test_run_pipeline_resets_executed_flags() {
    let mut h = harness(
        &["a"],
        ScriptedSessions::new(vec![
            script(&["session_success", "session_terminated"]),
            script(&["session_success", "session_terminated"]),
        ]),
    )
    .await;

    h.executor.run_component(0).await.unwrap();
    h.executor.drive().await.unwrap();
    assert!(h.executor.graph().nodes[0].executed);

    h.executor.run_pipeline().await.unwrap();
    // The restart invalidated the previous run before launching
    assert!(!h.executor.graph().nodes[0].executed);

    h.executor.drive().await.unwrap();
    assert!(h.executor.graph().nodes[0].executed);
}

#[tokio::test]
async fn test_push_source_resets_executed() {
    let mut h = harness(
        &["a"],
        ScriptedSessions::new(vec![script(&["session_success", "session_terminated"])]),
    )
    .await;

    h.executor.run_component(0).await.unwrap();
    h.executor.drive().await.unwrap();
    assert!(h.executor.graph().nodes[0].executed);

    let a = h.executor.graph().nodes[0].id;
    h.executor.push_source(a, "print('edited')").await.unwrap();

    assert!(!h.executor.graph().nodes[0].executed);
    assert_eq!(h.executor.component_source(a).await.unwrap(), "print('edited')");
}

#[tokio::test]
async fn test_abort_run_destroys_session_once() {
    let mut h = harness(
        &["a"],
        ScriptedSessions::new(vec![script(&["session_started", "session_terminated"])]),
    )
    .await;

    assert!(matches!(
        h.executor.abort_run().await.unwrap_err(),
        EngineError::NotRunning
    ));

    h.executor.run_component(0).await.unwrap();

    h.executor.abort_run().await.unwrap();
    assert!(matches!(
        h.executor.abort_run().await.unwrap_err(),
        EngineError::AlreadyInProgress
    ));
    assert_eq!(h.sessions.destroyed(), 1);

    // The run still ends through its terminal event, as a failure
    h.executor.drive().await.unwrap();
    assert!(!h.executor.graph().nodes[0].executed);
    assert!(!h.executor.is_running());
}

#[tokio::test]
async fn test_session_request_contents() {
    let mut h = harness(
        &["Load Data"],
        ScriptedSessions::new(vec![script(&["session_success", "session_terminated"])]),
    )
    .await;

    h.executor.run_component(0).await.unwrap();
    h.executor.drive().await.unwrap();

    let requests = h.sessions.requests();
    assert_eq!(requests.len(), 1);
    let req = &requests[0];

    assert_eq!(req.image, "python:3.11");
    assert_eq!(req.session_type, "batch");
    assert!(req.enqueue_only);
    assert_eq!(req.cpu, 1);
    assert_eq!(req.mem, "0.5g");
    assert_eq!(req.fgpu, 0.0);
    assert_eq!(req.mounts, vec![FOLDER.to_string()]);
    assert_eq!(req.scaling_group, "default");
    assert_eq!(
        req.startup_command,
        "cd /home/work/demo/load-data; python main.py"
    );
    assert!(req.name.starts_with("demo-load-data-"));
}
