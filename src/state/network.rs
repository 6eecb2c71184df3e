use crate::app::MenuItem;
use crate::state::messages::{NetworkRequest, NetworkResponse, PageData};
use bodega_api::{ApiClient, ApiResult, Health};
use log::{debug, error, warn};
use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

const SPINNER_CHARS: [char; 10] = ['⠋', '⠙', '⠹', '⠸', '⠼', '⠴', '⠦', '⠧', '⠇', '⠏'];
pub const ERROR_CHAR: char = '!';

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct LoadingState {
    pub is_loading: bool,
    pub spinner_char: char,
}

impl Default for LoadingState {
    fn default() -> Self {
        Self { is_loading: false, spinner_char: ' ' }
    }
}

/// Spinner shared by every in-flight load; spins while at least one runs.
#[derive(Clone)]
struct Spinner {
    responses: mpsc::Sender<NetworkResponse>,
    in_flight: Arc<AtomicUsize>,
}

impl Spinner {
    async fn start(&self) {
        if self.in_flight.fetch_add(1, Ordering::SeqCst) > 0 {
            return;
        }

        let mut loading_state = LoadingState { is_loading: true, spinner_char: SPINNER_CHARS[0] };
        let _ = self
            .responses
            .send(NetworkResponse::LoadingStateChanged { loading_state })
            .await;

        let responses = self.responses.clone();
        let in_flight = self.in_flight.clone();

        tokio::spawn(async move {
            let mut spinner_index = 1;
            let mut interval = tokio::time::interval(Duration::from_millis(33));
            loop {
                interval.tick().await;
                if in_flight.load(Ordering::SeqCst) == 0 {
                    break;
                }
                loading_state.spinner_char = SPINNER_CHARS[spinner_index];
                spinner_index = (spinner_index + 1) % SPINNER_CHARS.len();
                let _ = responses
                    .send(NetworkResponse::LoadingStateChanged { loading_state })
                    .await;
            }
        });
    }

    async fn stop(&self, is_ok: bool) {
        if self.in_flight.fetch_sub(1, Ordering::SeqCst) > 1 {
            return;
        }
        tokio::time::sleep(Duration::from_millis(15)).await;

        let spinner_char = if is_ok { ' ' } else { ERROR_CHAR };
        let _ = self
            .responses
            .send(NetworkResponse::LoadingStateChanged {
                loading_state: LoadingState { is_loading: false, spinner_char },
            })
            .await;
    }
}

pub struct NetworkWorker {
    client: ApiClient,
    requests: mpsc::Receiver<NetworkRequest>,
    responses: mpsc::Sender<NetworkResponse>,
    spinner: Spinner,
    /// Token of the view load currently in flight.
    current: Option<CancellationToken>,
}

impl NetworkWorker {
    pub fn new(
        client: ApiClient,
        requests: mpsc::Receiver<NetworkRequest>,
        responses: mpsc::Sender<NetworkResponse>,
    ) -> Self {
        let spinner = Spinner {
            responses: responses.clone(),
            in_flight: Arc::new(AtomicUsize::new(0)),
        };
        Self {
            client,
            requests,
            responses,
            spinner,
            current: None,
        }
    }

    pub async fn run(mut self) {
        while let Some(request) = self.requests.recv().await {
            debug!("network request: {request:?}");
            match request {
                NetworkRequest::Load { tab } => {
                    self.spawn_scoped(tab, move |client| async move { load_tab(&client, tab).await });
                }
                NetworkRequest::Search { query } => {
                    self.spawn_scoped(MenuItem::Search, move |client| async move {
                        let results = client.search(&query).await?;
                        Ok(PageData::Search { query, results })
                    });
                }
                NetworkRequest::Cancel => self.cancel_current(),
                NetworkRequest::CheckHealth => self.spawn_health_check(),
            }
        }
        self.cancel_current();
    }

    fn cancel_current(&mut self) {
        if let Some(token) = self.current.take() {
            token.cancel();
        }
    }

    /// Run `fetch` on its own task under a fresh token. Any earlier load is
    /// cancelled and a result that arrives after cancellation is dropped.
    fn spawn_scoped<F, Fut>(&mut self, tab: MenuItem, fetch: F)
    where
        F: FnOnce(ApiClient) -> Fut + Send + 'static,
        Fut: Future<Output = ApiResult<PageData>> + Send + 'static,
    {
        self.cancel_current();
        let token = CancellationToken::new();
        self.current = Some(token.clone());

        let client = self.client.scoped(token.clone());
        let responses = self.responses.clone();
        let spinner = self.spinner.clone();

        tokio::spawn(async move {
            spinner.start().await;
            let result = fetch(client).await;
            let cancelled = token.is_cancelled();
            spinner.stop(result.is_ok() || cancelled).await;

            if cancelled {
                debug!("dropping stale {tab:?} load");
                return;
            }

            let response = match result {
                Ok(data) => NetworkResponse::PageLoaded { data },
                Err(e) => NetworkResponse::Error { tab, message: e.to_string() },
            };
            if let Err(e) = responses.send(response).await {
                error!("Failed to send network response: {e}");
            }
        });
    }

    fn spawn_health_check(&self) {
        let client = self.client.clone();
        let responses = self.responses.clone();
        tokio::spawn(async move {
            let health = client.check_health().await.unwrap_or_else(|e| {
                warn!("health check failed: {e}");
                Health::unreachable()
            });
            let _ = responses.send(NetworkResponse::HealthChecked { health }).await;
        });
    }
}

async fn load_tab(client: &ApiClient, tab: MenuItem) -> ApiResult<PageData> {
    Ok(match tab {
        MenuItem::Players => PageData::Players(client.load_players_page().await?),
        MenuItem::Teams => PageData::Teams(client.load_teams_page().await?),
        MenuItem::Events => PageData::Events(client.load_events_page().await?),
        MenuItem::Matches => PageData::Matches(client.load_matches_page().await?),
        MenuItem::Analytics => PageData::Analytics(client.load_analytics().await?),
        // Search and Help have no loader of their own.
        MenuItem::Overview | MenuItem::Search | MenuItem::Help => {
            PageData::Overview(client.load_overview().await?)
        }
    })
}
