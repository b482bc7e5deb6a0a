//! Background search requests.
//!
//! Each request runs on its own thread with a private copy of the board and
//! answers on its own channel. The only shared state is the request's cancel
//! flag. Dropping a request's receiver discards whatever its thread sends
//! later, and a thread that dies without answering closes the channel.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{channel, Receiver, TryRecvError};
use std::sync::Arc;
use std::thread;

use kickoff_core::Board;
use thiserror::Error;
use tracing::{debug, warn};

use crate::alphabeta::{search, SearchConfig};

/// Monotonically increasing per worker, starting at 1.
pub type RequestId = u64;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SearchReply {
    pub request: RequestId,
    /// The searched board with the chosen turn pushed but not committed.
    pub board: Board,
    pub score: i32,
    pub nodes: u64,
}

#[derive(Error, Debug)]
pub enum SearchError {
    #[error("failed to spawn search thread: {0}")]
    Spawn(#[from] std::io::Error),
}

struct ActiveRequest {
    id: RequestId,
    cancel: Arc<AtomicBool>,
    /// Yields exactly one message, None when the search produced no move.
    receiver: Receiver<Option<SearchReply>>,
}

pub struct SearchWorker {
    config: SearchConfig,
    next_id: RequestId,
    active: Option<ActiveRequest>,
}

impl SearchWorker {
    pub fn new(config: SearchConfig) -> Self {
        Self {
            config,
            next_id: 1,
            active: None,
        }
    }

    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    pub fn active_request(&self) -> Option<RequestId> {
        self.active.as_ref().map(|active| active.id)
    }

    /// Starts searching `board`, cancelling whatever was running before.
    pub fn start(&mut self, board: &Board) -> Result<RequestId, SearchError> {
        let board = board.clone();
        let config = self.config;
        self.spawn_request(move |id, cancel| {
            search(&board, &config, cancel).map(|outcome| SearchReply {
                request: id,
                board: outcome.apply(&board),
                score: outcome.score,
                nodes: outcome.nodes,
            })
        })
    }

    fn spawn_request<F>(&mut self, job: F) -> Result<RequestId, SearchError>
    where
        F: FnOnce(RequestId, &AtomicBool) -> Option<SearchReply> + Send + 'static,
    {
        self.cancel();

        let id = self.next_id;
        self.next_id += 1;

        let cancel = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&cancel);
        let (sender, receiver) = channel();

        thread::Builder::new()
            .name(format!("search-{id}"))
            .spawn(move || {
                let reply = job(id, &flag);
                // the request may be cancelled or the worker gone already
                let _ = sender.send(reply);
            })?;

        debug!(request = id, "search started");
        self.active = Some(ActiveRequest { id, cancel, receiver });
        Ok(id)
    }

    /// Raises the active request's flag and forgets the request. The thread
    /// winds down on its own.
    pub fn cancel(&mut self) {
        if let Some(active) = self.active.take() {
            active.cancel.store(true, Ordering::Relaxed);
            debug!(request = active.id, "search cancelled");
        }
    }

    /// Reply of the active request if it has arrived. Never blocks.
    pub fn poll(&mut self) -> Option<SearchReply> {
        let active = self.active.as_ref()?;
        let reply = match active.receiver.try_recv() {
            Ok(reply) => reply,
            Err(TryRecvError::Empty) => return None,
            Err(TryRecvError::Disconnected) => {
                warn!(request = active.id, "search thread ended without a reply");
                None
            }
        };
        self.finish(reply)
    }

    /// Blocks until the active request ends. None without an active request,
    /// when the search produced no move or when its thread died.
    pub fn wait(&mut self) -> Option<SearchReply> {
        let active = self.active.as_ref()?;
        let reply = match active.receiver.recv() {
            Ok(reply) => reply,
            Err(_) => {
                warn!(request = active.id, "search thread ended without a reply");
                None
            }
        };
        self.finish(reply)
    }

    fn finish(&mut self, reply: Option<SearchReply>) -> Option<SearchReply> {
        let active = self.active.take()?;
        debug!(
            request = active.id,
            score = reply.as_ref().map(|r| r.score),
            "search reply"
        );
        reply
    }
}

impl Drop for SearchWorker {
    fn drop(&mut self) {
        self.cancel();
    }
}
