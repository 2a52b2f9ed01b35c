//! Shared test utilities and fake backends.

#![allow(dead_code, unused_imports)]

pub mod mock_backend;

use std::net::TcpListener;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tempfile::TempDir;
use tokio::sync::{mpsc, oneshot};

use matchfeed::api::{
    Candidate, DiscoveryApi, FeedError, FeedPage, PageRequest, SwipeRequest, SwipeResponse,
};
use matchfeed::criteria::{CriteriaStore, MemoryKeyValueStore};
use matchfeed::{FeedController, FeedSettings, FeedState};

const WAIT_TIMEOUT: Duration = Duration::from_secs(5);

/// Find an available port for testing.
pub fn free_port() -> u16 {
    let listener = TcpListener::bind("127.0.0.1:0").expect("Failed to bind to free port");
    listener.local_addr().unwrap().port()
}

/// Create a temporary config pointing at `base_url`, with preferences stored
/// inside the same temp dir.
pub fn temp_config(base_url: &str) -> (TempDir, PathBuf) {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let config_path = temp_dir.path().join("config.toml");
    let prefs_path = temp_dir.path().join("preferences.json");

    let content = format!(
        r#"[api]
base_url = "{}"
auth_type = "bearer"
auth_token = "test-token"
timeout_seconds = 5
connect_timeout_seconds = 2

[feed]
page_size = 4
low_water_mark = 1

[storage]
preferences_path = "{}"
"#,
        base_url,
        toml_path(&prefs_path)
    );

    std::fs::write(&config_path, content).expect("Failed to write config");
    (temp_dir, config_path)
}

fn toml_path(path: &Path) -> String {
    path.display().to_string().replace('\\', "\\\\")
}

/// `count` candidates `{prefix}{start}..`, each with a founder and a project.
pub fn candidates(prefix: &str, start: usize, count: usize) -> Vec<Candidate> {
    (start..start + count)
        .map(|i| {
            Candidate::new(format!("{}{}", prefix, i), format!("f-{}{}", prefix, i))
                .with_project(format!("p-{}{}", prefix, i))
        })
        .collect()
}

pub fn ids(state: &FeedState) -> Vec<String> {
    state.candidates.iter().map(|c| c.id.clone()).collect()
}

/// Poll the controller until `pred` holds.
pub async fn wait_for_state(
    controller: &FeedController,
    pred: impl Fn(&FeedState) -> bool,
) -> FeedState {
    tokio::time::timeout(WAIT_TIMEOUT, async {
        loop {
            let state = controller.snapshot();
            if pred(&state) {
                return state;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    })
    .await
    .expect("Timed out waiting for feed state")
}

// -- Gated fake backend -------------------------------------------------------

/// A fetch the controller is waiting on. Drop it to abandon the request.
pub struct PendingFetch {
    pub request: PageRequest,
    respond: oneshot::Sender<Result<FeedPage, FeedError>>,
}

impl PendingFetch {
    /// Reply with `candidates`; exhaustion follows the requested page size.
    pub fn reply(self, candidates: Vec<Candidate>) -> bool {
        let page = FeedPage::from_response(candidates, self.request.page_size);
        self.respond.send(Ok(page)).is_ok()
    }

    pub fn fail(self, error: FeedError) -> bool {
        self.respond.send(Err(error)).is_ok()
    }
}

/// A swipe the controller is waiting on.
pub struct PendingSwipe {
    pub request: SwipeRequest,
    respond: oneshot::Sender<Result<SwipeResponse, FeedError>>,
}

impl PendingSwipe {
    pub fn accept(self, match_created: bool) -> bool {
        self.respond
            .send(Ok(SwipeResponse { match_created }))
            .is_ok()
    }

    pub fn fail(self, error: FeedError) -> bool {
        self.respond.send(Err(error)).is_ok()
    }
}

/// Backend whose every call blocks until the test answers it.
pub struct FakeApi {
    fetches: mpsc::UnboundedSender<PendingFetch>,
    swipes: mpsc::UnboundedSender<PendingSwipe>,
}

/// Test side of [`FakeApi`].
pub struct FakeBackend {
    fetches: mpsc::UnboundedReceiver<PendingFetch>,
    swipes: mpsc::UnboundedReceiver<PendingSwipe>,
}

impl FakeApi {
    pub fn new() -> (Arc<Self>, FakeBackend) {
        let (fetch_tx, fetch_rx) = mpsc::unbounded_channel();
        let (swipe_tx, swipe_rx) = mpsc::unbounded_channel();
        (
            Arc::new(Self {
                fetches: fetch_tx,
                swipes: swipe_tx,
            }),
            FakeBackend {
                fetches: fetch_rx,
                swipes: swipe_rx,
            },
        )
    }
}

#[async_trait]
impl DiscoveryApi for FakeApi {
    async fn fetch_page(&self, request: &PageRequest) -> Result<FeedPage, FeedError> {
        let (tx, rx) = oneshot::channel();
        self.fetches
            .send(PendingFetch {
                request: request.clone(),
                respond: tx,
            })
            .map_err(|_| FeedError::network("fake backend closed"))?;
        rx.await
            .unwrap_or_else(|_| Err(FeedError::network("fetch abandoned")))
    }

    async fn record_swipe(&self, request: &SwipeRequest) -> Result<SwipeResponse, FeedError> {
        let (tx, rx) = oneshot::channel();
        self.swipes
            .send(PendingSwipe {
                request: request.clone(),
                respond: tx,
            })
            .map_err(|_| FeedError::network("fake backend closed"))?;
        rx.await
            .unwrap_or_else(|_| Err(FeedError::network("swipe abandoned")))
    }
}

impl FakeBackend {
    pub async fn next_fetch(&mut self) -> PendingFetch {
        tokio::time::timeout(WAIT_TIMEOUT, self.fetches.recv())
            .await
            .expect("Timed out waiting for a fetch")
            .expect("Fake backend dropped")
    }

    pub fn try_next_fetch(&mut self) -> Option<PendingFetch> {
        self.fetches.try_recv().ok()
    }

    pub async fn next_swipe(&mut self) -> PendingSwipe {
        tokio::time::timeout(WAIT_TIMEOUT, self.swipes.recv())
            .await
            .expect("Timed out waiting for a swipe")
            .expect("Fake backend dropped")
    }

    pub fn try_next_swipe(&mut self) -> Option<PendingSwipe> {
        self.swipes.try_recv().ok()
    }
}

/// Controller over a gated fake backend and in-memory preferences.
pub fn fake_controller(settings: FeedSettings) -> (FeedController, FakeBackend) {
    let (api, backend) = FakeApi::new();
    let criteria = CriteriaStore::open(Arc::new(MemoryKeyValueStore::new()));
    (FeedController::new(api, criteria, settings), backend)
}

pub fn settings(page_size: usize, low_water_mark: usize) -> FeedSettings {
    FeedSettings {
        page_size,
        low_water_mark,
        search_debounce: Duration::from_millis(500),
        swipe_exit_delay: Duration::ZERO,
    }
}

/// Refresh and answer the first page with `page`.
pub async fn load_first_page(
    controller: &FeedController,
    backend: &mut FakeBackend,
    page: Vec<Candidate>,
) {
    let this = controller.clone();
    let refresh = tokio::spawn(async move { this.refresh().await });
    backend.next_fetch().await.reply(page);
    refresh
        .await
        .expect("refresh task panicked")
        .expect("refresh failed");
}
