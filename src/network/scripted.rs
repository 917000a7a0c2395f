// Scripted transport shared by unit and integration tests
//
// Every request is parked until the test answers it, so tests decide the
// order in which responses arrive. Integration tests include this file
// through `#[path]`, so it only names its crate types through `super`.

use super::{ApiRequest, HttpTransport, NetworkError, RawResponse};
use async_trait::async_trait;
use serde_json::{json, Value};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, oneshot, Mutex};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(2);

/// `GET /photos` item
pub fn photo_json(id: &str, liked: bool) -> Value {
    json!({
        "id": id,
        "width": 400,
        "height": 300,
        "created_at": "2024-01-02T03:04:05Z",
        "description": format!("photo {}", id),
        "urls": {
            "thumb": format!("https://img.test/{}/thumb.jpg", id),
            "full": format!("https://img.test/{}/full.jpg", id)
        },
        "liked_by_user": liked
    })
}

/// `GET /photos` body with unliked photos
pub fn page_json<S: AsRef<str>>(ids: &[S]) -> Value {
    Value::Array(ids.iter().map(|id| photo_json(id.as_ref(), false)).collect())
}

/// A request parked inside ScriptedTransport
pub struct PendingRequest {
    pub request: ApiRequest,
    responder: oneshot::Sender<Result<RawResponse, NetworkError>>,
}

impl PendingRequest {
    pub fn respond(self, response: RawResponse) {
        let _ = self.responder.send(Ok(response));
    }

    pub fn respond_json(self, value: Value) {
        self.respond(RawResponse::json(200, &value));
    }

    pub fn respond_status(self, status: u16) {
        self.respond(RawResponse::new(status, "{}"));
    }

    pub fn fail(self, error: NetworkError) {
        let _ = self.responder.send(Err(error));
    }
}

/// Transport whose responses are supplied by the test
pub struct ScriptedTransport {
    tx: mpsc::UnboundedSender<PendingRequest>,
    rx: Mutex<mpsc::UnboundedReceiver<PendingRequest>>,
    sent: AtomicUsize,
}

impl ScriptedTransport {
    pub fn new() -> Arc<Self> {
        let (tx, rx) = mpsc::unbounded_channel();
        Arc::new(Self {
            tx,
            rx: Mutex::new(rx),
            sent: AtomicUsize::new(0),
        })
    }

    /// Wait for the next request to reach the transport
    pub async fn next_request(&self) -> PendingRequest {
        let mut rx = self.rx.lock().await;
        tokio::time::timeout(REQUEST_TIMEOUT, rx.recv())
            .await
            .expect("timed out waiting for a request")
            .expect("transport channel closed")
    }

    /// Let spawned tasks run, then assert nothing new was sent
    pub async fn assert_no_request(&self) {
        for _ in 0..20 {
            tokio::task::yield_now().await;
        }
        assert!(
            self.rx.lock().await.try_recv().is_err(),
            "unexpected request reached the transport"
        );
    }

    pub fn sent_count(&self) -> usize {
        self.sent.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl HttpTransport for ScriptedTransport {
    async fn send(&self, request: ApiRequest) -> Result<RawResponse, NetworkError> {
        self.sent.fetch_add(1, Ordering::SeqCst);

        let (responder, response) = oneshot::channel();
        let _ = self.tx.send(PendingRequest { request, responder });

        response.await.unwrap_or(Err(NetworkError::UrlSessionError))
    }
}
