//! Off-thread rendering with stale-result suppression
//!
//! Every request gets a token from `LatestRequest`. Renders are never
//! cancelled; a finished render whose token is no longer the latest is
//! dropped on receipt.

use crossbeam::channel::{unbounded, Receiver, RecvTimeoutError, Sender};
use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use crate::cache::CacheKey;
use crate::core::error::Result;
use crate::markdown::renderer::Renderer;
use crate::markdown::style::StyledDocument;

/// Token of the most recent request
#[derive(Debug, Clone, Default)]
pub struct LatestRequest(Arc<AtomicU64>);

impl LatestRequest {
    pub fn advance(&self) -> u64 {
        self.0.fetch_add(1, Ordering::SeqCst) + 1
    }

    pub fn current(&self) -> u64 {
        self.0.load(Ordering::SeqCst)
    }

    pub fn is_current(&self, token: u64) -> bool {
        self.current() == token
    }
}

#[derive(Debug, Clone)]
pub struct RenderOutput {
    pub token: u64,
    /// `None` when a requested file could not be read
    pub document: Option<Arc<StyledDocument>>,
}

enum Source {
    Text { raw: String, key: Option<CacheKey> },
    File(PathBuf),
}

pub struct RenderDispatcher {
    renderer: Renderer,
    latest: LatestRequest,
    results_tx: Sender<RenderOutput>,
    results_rx: Receiver<RenderOutput>,
}

impl RenderDispatcher {
    pub fn new(renderer: Renderer) -> Self {
        let (results_tx, results_rx) = unbounded();
        Self {
            renderer,
            latest: LatestRequest::default(),
            results_tx,
            results_rx,
        }
    }

    pub fn latest(&self) -> &LatestRequest {
        &self.latest
    }

    /// Render in-memory text on a worker thread
    pub fn request(&self, raw: String, key: Option<CacheKey>) -> Result<u64> {
        self.spawn(Source::Text { raw, key })
    }

    /// Read and render a file on a worker thread
    pub fn request_file(&self, path: PathBuf) -> Result<u64> {
        self.spawn(Source::File(path))
    }

    fn spawn(&self, source: Source) -> Result<u64> {
        let token = self.latest.advance();
        let renderer = self.renderer.clone();
        let tx = self.results_tx.clone();

        thread::Builder::new()
            .name(format!("mdscope-render-{token}"))
            .spawn(move || {
                let document = match source {
                    Source::Text { raw, key } => Some(renderer.render(&raw, key.as_ref())),
                    Source::File(path) => renderer.render_file(&path),
                };
                // Receiver gone means nobody is waiting any more
                let _ = tx.send(RenderOutput { token, document });
            })?;
        Ok(token)
    }

    /// Wait for the result of the latest request, discarding stale ones.
    ///
    /// Returns `None` if it does not arrive within `timeout`.
    pub fn recv_latest(&self, timeout: Duration) -> Option<RenderOutput> {
        let deadline = Instant::now() + timeout;
        loop {
            match self.results_rx.recv_deadline(deadline) {
                Ok(output) if self.latest.is_current(output.token) => return Some(output),
                Ok(output) => {
                    tracing::debug!(token = output.token, "discarding stale render");
                }
                Err(RecvTimeoutError::Timeout) | Err(RecvTimeoutError::Disconnected) => {
                    return None
                }
            }
        }
    }
}
