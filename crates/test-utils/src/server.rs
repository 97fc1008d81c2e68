//! In-process HTTP server for upstream document fixtures.
//!
//! Each path is mapped to a queue of canned responses. A request pops the
//! front of its path's queue; the last response stays in place and answers
//! every later request. Unmapped paths answer 404. Every request is counted
//! per path so tests can assert on how often a document was fetched.

use std::collections::{HashMap, VecDeque};
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::{
    extract::Extension,
    http::{header, StatusCode, Uri},
    response::{IntoResponse, Response},
    Router,
};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

/// A canned HTTP response.
#[derive(Debug, Clone)]
pub struct FixtureResponse {
    pub status: u16,
    pub body: String,
    pub delay: Option<Duration>,
}

impl FixtureResponse {
    /// 200 with a JSON body.
    pub fn json(body: impl Into<String>) -> Self {
        Self {
            status: 200,
            body: body.into(),
            delay: None,
        }
    }

    /// Empty body with the given status.
    pub fn status(status: u16) -> Self {
        Self {
            status,
            body: String::new(),
            delay: None,
        }
    }

    /// Wait before answering.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }
}

impl From<serde_json::Value> for FixtureResponse {
    fn from(value: serde_json::Value) -> Self {
        Self::json(value.to_string())
    }
}

#[derive(Default)]
struct Routes {
    responses: HashMap<String, VecDeque<FixtureResponse>>,
    hits: HashMap<String, usize>,
}

type SharedRoutes = Arc<Mutex<Routes>>;

/// HTTP server bound to an ephemeral port on 127.0.0.1.
///
/// The server task is aborted when the value is dropped.
pub struct FixtureServer {
    addr: SocketAddr,
    routes: SharedRoutes,
    handle: JoinHandle<()>,
}

impl FixtureServer {
    pub async fn start() -> Self {
        let routes: SharedRoutes = Arc::new(Mutex::new(Routes::default()));

        let app = Router::new()
            .fallback(serve_fixture)
            .layer(Extension(routes.clone()));

        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind fixture server");
        let addr = listener.local_addr().expect("fixture server address");

        let handle = tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });

        Self {
            addr,
            routes,
            handle,
        }
    }

    /// `http://127.0.0.1:<port>`
    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url(), path.trim_start_matches('/'))
    }

    /// Replace every response for `path` with `response`.
    pub fn set(&self, path: &str, response: impl Into<FixtureResponse>) {
        let mut routes = self.routes.lock().expect("fixture routes lock");
        routes
            .responses
            .insert(normalize(path), VecDeque::from([response.into()]));
    }

    /// Append a response to `path`'s queue.
    pub fn enqueue(&self, path: &str, response: impl Into<FixtureResponse>) {
        let mut routes = self.routes.lock().expect("fixture routes lock");
        routes
            .responses
            .entry(normalize(path))
            .or_default()
            .push_back(response.into());
    }

    /// Number of requests received for `path`.
    pub fn hits(&self, path: &str) -> usize {
        let routes = self.routes.lock().expect("fixture routes lock");
        routes.hits.get(&normalize(path)).copied().unwrap_or(0)
    }
}

impl Drop for FixtureServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

fn normalize(path: &str) -> String {
    format!("/{}", path.trim_start_matches('/'))
}

async fn serve_fixture(Extension(routes): Extension<SharedRoutes>, uri: Uri) -> Response {
    let path = uri.path().to_string();

    let fixture = {
        let mut routes = routes.lock().expect("fixture routes lock");
        *routes.hits.entry(path.clone()).or_insert(0) += 1;
        routes.responses.get_mut(&path).and_then(|queue| {
            if queue.len() > 1 {
                queue.pop_front()
            } else {
                queue.front().cloned()
            }
        })
    };

    let Some(fixture) = fixture else {
        return StatusCode::NOT_FOUND.into_response();
    };

    if let Some(delay) = fixture.delay {
        tokio::time::sleep(delay).await;
    }

    let status = StatusCode::from_u16(fixture.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    (status, [(header::CONTENT_TYPE, "application/json")], fixture.body).into_response()
}
