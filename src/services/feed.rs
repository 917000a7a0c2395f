// Photo feed service: paginated, deduplicated photo collection with likes
//
// Design Decision: actor-confined state
//
// One tokio task (FeedActor) owns the collection, the page counter and the
// in-flight bookkeeping. Public operations are commands sent over an
// unbounded channel; network requests run on their own tasks and report
// back through the same channel. Every mutation therefore happens on the
// actor task, in command order, without locks around the photo list.
//
// Stale completions: each request carries a generation number. A result is
// applied only if its generation matches the request currently recorded as
// in flight; anything else (superseded like, fetch cancelled by reset) is
// dropped.
//
// Readers get the latest state synchronously from a watch channel and are
// told about changes through the event bus (source "photo_feed").

use super::traits::TokenStore;
use crate::config::UnsplashConfig;
use crate::endpoints;
use crate::error::{ImageFeedError, NetworkError, Result};
use crate::events::{Event, EventBus, EventKind, Subscription, FEED_SOURCE};
use crate::models::{LikeResponse, Photo, PhotoResult};
use crate::network::{ApiRequest, HttpExecutor};
use serde::de::DeserializeOwned;
use std::collections::HashSet;
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot, watch};
use tokio::task::AbortHandle;

/// Point-in-time view of the feed
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FeedSnapshot {
    /// Deduplicated photos in first-seen order
    pub photos: Arc<Vec<Photo>>,
    /// Last page fetched successfully; None before the first page
    pub last_loaded_page: Option<u32>,
    /// True while a page fetch is in flight
    pub is_loading: bool,
}

impl FeedSnapshot {
    pub fn len(&self) -> usize {
        self.photos.len()
    }

    pub fn is_empty(&self) -> bool {
        self.photos.is_empty()
    }

    pub fn photo(&self, id: &str) -> Option<&Photo> {
        self.photos.iter().find(|photo| photo.id == id)
    }
}

enum FeedCommand {
    FetchNextPage,
    ChangeLike {
        photo_id: String,
        is_liked: bool,
        reply: oneshot::Sender<Result<()>>,
    },
    Reset {
        done: oneshot::Sender<()>,
    },
    Sync {
        reply: oneshot::Sender<FeedSnapshot>,
    },
    PageFinished {
        generation: u64,
        page: u32,
        result: std::result::Result<Vec<PhotoResult>, NetworkError>,
    },
    LikeFinished {
        generation: u64,
        result: std::result::Result<LikeResponse, NetworkError>,
    },
}

struct FeedContext {
    executor: HttpExecutor,
    config: Arc<UnsplashConfig>,
    tokens: Arc<dyn TokenStore>,
}

struct PendingPage {
    generation: u64,
    page: u32,
    abort: AbortHandle,
}

struct PendingLike {
    generation: u64,
    photo_id: String,
    is_liked: bool,
    abort: AbortHandle,
    reply: oneshot::Sender<Result<()>>,
}

struct FeedActor {
    context: Arc<FeedContext>,
    events: Arc<EventBus>,
    commands: mpsc::WeakUnboundedSender<FeedCommand>,
    snapshot: watch::Sender<FeedSnapshot>,
    photos: Arc<Vec<Photo>>,
    last_loaded_page: Option<u32>,
    generation: u64,
    page: Option<PendingPage>,
    like: Option<PendingLike>,
}

/// Keep the first occurrence of every photo id, preserving order
fn dedup_by_id(photos: &mut Vec<Photo>) {
    let mut seen = HashSet::with_capacity(photos.len());
    photos.retain(|photo| seen.insert(photo.id.clone()));
}

fn cancelled() -> ImageFeedError {
    NetworkError::cancelled().into()
}

fn stopped() -> ImageFeedError {
    ImageFeedError::ServiceUnavailable("photo feed service stopped".to_string())
}

impl FeedActor {
    async fn run(mut self, mut commands: mpsc::UnboundedReceiver<FeedCommand>) {
        while let Some(command) = commands.recv().await {
            self.handle(command);
        }

        self.cancel_in_flight();
        tracing::debug!("Photo feed service stopped");
    }

    fn handle(&mut self, command: FeedCommand) {
        match command {
            FeedCommand::FetchNextPage => self.fetch_next_page(),
            FeedCommand::ChangeLike {
                photo_id,
                is_liked,
                reply,
            } => self.change_like(photo_id, is_liked, reply),
            FeedCommand::Reset { done } => {
                self.reset();
                let _ = done.send(());
            }
            FeedCommand::Sync { reply } => {
                let _ = reply.send(self.current());
            }
            FeedCommand::PageFinished {
                generation,
                page,
                result,
            } => self.page_finished(generation, page, result),
            FeedCommand::LikeFinished { generation, result } => {
                self.like_finished(generation, result)
            }
        }
    }

    fn next_generation(&mut self) -> u64 {
        self.generation += 1;
        self.generation
    }

    fn current(&self) -> FeedSnapshot {
        FeedSnapshot {
            photos: self.photos.clone(),
            last_loaded_page: self.last_loaded_page,
            is_loading: self.page.is_some(),
        }
    }

    fn publish(&self) {
        self.snapshot.send_replace(self.current());
    }

    /// Run `request` on its own task and feed the decoded result back
    fn spawn_request<T, F>(&self, request: ApiRequest, finish: F) -> Option<AbortHandle>
    where
        T: DeserializeOwned + Send + 'static,
        F: FnOnce(std::result::Result<T, NetworkError>) -> FeedCommand + Send + 'static,
    {
        let commands = self.commands.upgrade()?;
        let context = self.context.clone();

        let handle = tokio::spawn(async move {
            let token = context.tokens.token().await;
            let request = request.with_optional_bearer(token.as_deref());
            let result = context.executor.object::<T>(request).await;
            let _ = commands.send(finish(result));
        });

        Some(handle.abort_handle())
    }

    fn fetch_next_page(&mut self) {
        if self.page.is_some() {
            tracing::debug!("Page fetch already in flight, ignoring");
            return;
        }

        let page = self.last_loaded_page.map_or(1, |last| last + 1);
        let per_page = self.context.config.page_size;

        let config = &self.context.config;
        let request = match endpoints::photos_page(config, page, per_page, None) {
            Ok(request) => request,
            Err(e) => {
                tracing::error!(
                    "Cannot build photos request page={} per_page={}: {}",
                    page,
                    per_page,
                    e
                );
                return;
            }
        };

        let generation = self.next_generation();
        let abort = self.spawn_request(request, move |result| FeedCommand::PageFinished {
            generation,
            page,
            result,
        });

        if let Some(abort) = abort {
            tracing::debug!("Fetching photos page={} per_page={}", page, per_page);
            self.page = Some(PendingPage {
                generation,
                page,
                abort,
            });
            self.publish();
        }
    }

    fn page_finished(
        &mut self,
        generation: u64,
        page: u32,
        result: std::result::Result<Vec<PhotoResult>, NetworkError>,
    ) {
        if self.page.as_ref().map(|pending| pending.generation) != Some(generation) {
            tracing::debug!("Discarding stale result for page={}", page);
            return;
        }
        self.page = None;

        match result {
            Ok(items) => {
                let received = items.len();
                let photos = Arc::make_mut(&mut self.photos);
                photos.extend(items.into_iter().map(Photo::from));
                dedup_by_id(photos);
                self.last_loaded_page = Some(page);

                tracing::info!(
                    "Loaded photos page={} received={} total={}",
                    page,
                    received,
                    self.photos.len()
                );

                self.publish();
                self.events
                    .notify(FEED_SOURCE, EventKind::FeedChanged { updated_id: None });
            }
            Err(e) => {
                // Page counter stays put so the next call retries this page
                tracing::warn!("Failed to load photos page={}: {}", page, e);
                self.publish();
            }
        }
    }

    fn change_like(
        &mut self,
        photo_id: String,
        is_liked: bool,
        reply: oneshot::Sender<Result<()>>,
    ) {
        if let Some(prior) = self.like.take() {
            tracing::debug!(
                "Superseding like request photo_id={} is_liked={}",
                prior.photo_id,
                prior.is_liked
            );
            prior.abort.abort();
            let _ = prior.reply.send(Err(cancelled()));
        }

        let config = &self.context.config;
        let request = match endpoints::change_like(config, &photo_id, is_liked, None) {
            Ok(request) => request,
            Err(e) => {
                tracing::error!(
                    "Cannot build like request photo_id={} is_liked={}: {}",
                    photo_id,
                    is_liked,
                    e
                );
                let _ = reply.send(Err(e.into()));
                return;
            }
        };

        let generation = self.next_generation();
        let abort = self.spawn_request(request, move |result| FeedCommand::LikeFinished {
            generation,
            result,
        });

        match abort {
            Some(abort) => {
                self.like = Some(PendingLike {
                    generation,
                    photo_id,
                    is_liked,
                    abort,
                    reply,
                });
            }
            None => {
                let _ = reply.send(Err(stopped()));
            }
        }
    }

    fn like_finished(
        &mut self,
        generation: u64,
        result: std::result::Result<LikeResponse, NetworkError>,
    ) {
        let pending = match self.like.take() {
            Some(pending) if pending.generation == generation => pending,
            other => {
                self.like = other;
                tracing::debug!("Discarding stale like result");
                return;
            }
        };

        match result {
            Ok(response) => {
                let updated = Photo::from(response.photo);
                let is_liked = updated.is_liked;

                match self.photos.iter().position(|photo| photo.id == pending.photo_id) {
                    Some(index) => Arc::make_mut(&mut self.photos)[index] = updated,
                    None => {
                        tracing::debug!("Liked photo_id={} is not in the feed", pending.photo_id)
                    }
                }

                tracing::info!("Like changed photo_id={} is_liked={}", pending.photo_id, is_liked);

                self.publish();
                self.events.notify(
                    FEED_SOURCE,
                    EventKind::FeedChanged {
                        updated_id: Some(pending.photo_id.clone()),
                    },
                );
                let _ = pending.reply.send(Ok(()));
            }
            Err(e) => {
                tracing::warn!(
                    "Failed to change like photo_id={} is_liked={}: {}",
                    pending.photo_id,
                    pending.is_liked,
                    e
                );
                let _ = pending.reply.send(Err(e.into()));
            }
        }
    }

    fn cancel_in_flight(&mut self) {
        if let Some(page) = self.page.take() {
            tracing::debug!("Cancelling fetch of page={}", page.page);
            page.abort.abort();
        }
        if let Some(like) = self.like.take() {
            like.abort.abort();
            let _ = like.reply.send(Err(cancelled()));
        }
    }

    fn reset(&mut self) {
        self.cancel_in_flight();
        self.photos = Arc::new(Vec::new());
        self.last_loaded_page = None;

        tracing::info!("Photo feed reset");
        self.publish();
    }
}

/// Handle to the photo feed actor
///
/// Cheap to clone; all clones drive the same feed. The actor stops once
/// every handle is dropped and no request is outstanding.
///
/// Usage:
///     let feed = PhotoFeedService::new(executor, config, tokens, events);
///     let _sub = feed.on_change(|_| println!("feed changed"));
///     feed.fetch_next_page();
#[derive(Clone)]
pub struct PhotoFeedService {
    commands: mpsc::UnboundedSender<FeedCommand>,
    snapshot: watch::Receiver<FeedSnapshot>,
    events: Arc<EventBus>,
}

impl PhotoFeedService {
    /// Start the feed actor on the current tokio runtime
    pub fn new(
        executor: HttpExecutor,
        config: Arc<UnsplashConfig>,
        tokens: Arc<dyn TokenStore>,
        events: Arc<EventBus>,
    ) -> Self {
        let (commands, receiver) = mpsc::unbounded_channel();
        let (snapshot_tx, snapshot) = watch::channel(FeedSnapshot::default());

        let actor = FeedActor {
            context: Arc::new(FeedContext {
                executor,
                config,
                tokens,
            }),
            events: events.clone(),
            commands: commands.downgrade(),
            snapshot: snapshot_tx,
            photos: Arc::new(Vec::new()),
            last_loaded_page: None,
            generation: 0,
            page: None,
            like: None,
        };
        tokio::spawn(actor.run(receiver));

        Self {
            commands,
            snapshot,
            events,
        }
    }

    fn send(&self, command: FeedCommand) -> Result<()> {
        self.commands.send(command).map_err(|_| stopped())
    }

    /// Request the next page
    ///
    /// No-op while a page fetch is already in flight. Failures are logged
    /// and leave the feed untouched; calling again retries the same page.
    pub fn fetch_next_page(&self) {
        if let Err(e) = self.send(FeedCommand::FetchNextPage) {
            tracing::error!("Cannot fetch next page: {}", e);
        }
    }

    /// Request the next page and wait until no page fetch is in flight
    pub async fn load_next_page(&self) -> Result<FeedSnapshot> {
        self.send(FeedCommand::FetchNextPage)?;
        self.sync().await?;

        let mut snapshot = self.snapshot.clone();
        let idle = snapshot
            .wait_for(|state| !state.is_loading)
            .await
            .map_err(|_| stopped())?;
        Ok(idle.clone())
    }

    /// Like (`true`) or unlike (`false`) a photo
    ///
    /// Supersedes any like request still in flight; the superseded caller
    /// receives the cancelled error. On failure local state is unchanged.
    pub async fn change_like(&self, photo_id: &str, is_liked: bool) -> Result<()> {
        let (reply, response) = oneshot::channel();
        self.send(FeedCommand::ChangeLike {
            photo_id: photo_id.to_string(),
            is_liked,
            reply,
        })?;

        response.await.map_err(|_| stopped())?
    }

    /// Cancel outstanding requests and return to the initial empty state
    pub async fn reset(&self) -> Result<()> {
        let (done, finished) = oneshot::channel();
        self.send(FeedCommand::Reset { done })?;
        finished.await.map_err(|_| stopped())
    }

    /// Wait until every previously issued command has been handled
    pub async fn sync(&self) -> Result<FeedSnapshot> {
        let (reply, response) = oneshot::channel();
        self.send(FeedCommand::Sync { reply })?;
        response.await.map_err(|_| stopped())
    }

    /// Current photos
    pub fn photos(&self) -> Arc<Vec<Photo>> {
        self.snapshot.borrow().photos.clone()
    }

    /// Current state
    pub fn snapshot(&self) -> FeedSnapshot {
        self.snapshot.borrow().clone()
    }

    /// Receiver that observes every published state
    pub fn watch(&self) -> watch::Receiver<FeedSnapshot> {
        self.snapshot.clone()
    }

    /// Register a callback for feed change notifications
    pub fn on_change<F>(&self, callback: F) -> Subscription
    where
        F: FnMut(Event) + Send + 'static,
    {
        self.events.on(Some(FEED_SOURCE), callback)
    }
}
