//! Dedicated scan worker
//!
//! One thread owns the scanner and executes requests strictly one after
//! another. Callers talk to it over channels: `submit` a configuration, then
//! receive `ScanReport`s tagged with the ticket they were given. A periodic
//! worker also scans on every tick; ticks that fire while a scan is running
//! are coalesced by the tick channel.

use chrono::{DateTime, Utc};
use crossbeam::channel::{never, select, tick, unbounded, Receiver, RecvTimeoutError, Sender};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crate::core::error::{Error, Result};
use crate::core::model::{ScanConfig, ScanOutcome};
use crate::scan::scanner::DirectoryScanner;

struct ScanRequest {
    ticket: u64,
    config: ScanConfig,
}

/// Result of one scan pass run by the worker
#[derive(Debug, Clone)]
pub struct ScanReport {
    /// Monotonic per worker; larger tickets were requested later
    pub ticket: u64,
    pub outcome: ScanOutcome,
    pub finished_at: DateTime<Utc>,
}

impl ScanReport {
    /// Last-writer-wins check against the report currently displayed
    pub fn supersedes(&self, current: Option<&ScanReport>) -> bool {
        current.map_or(true, |c| self.ticket > c.ticket)
    }
}

pub struct ScanWorker {
    requests: Option<Sender<ScanRequest>>,
    reports: Receiver<ScanReport>,
    tickets: Arc<AtomicU64>,
    handle: Option<JoinHandle<()>>,
}

impl ScanWorker {
    /// Start a worker that only scans on request
    pub fn spawn() -> Result<Self> {
        Self::start(None)
    }

    /// Start a worker that scans `config` immediately and then every `interval`
    pub fn spawn_periodic(config: ScanConfig, interval: Duration) -> Result<Self> {
        Self::start(Some((config, interval)))
    }

    fn start(periodic: Option<(ScanConfig, Duration)>) -> Result<Self> {
        let (request_tx, request_rx) = unbounded();
        let (report_tx, report_rx) = unbounded();
        let tickets = Arc::new(AtomicU64::new(1));

        let worker_tickets = tickets.clone();
        let handle = thread::Builder::new()
            .name("mdscope-scan".to_string())
            .spawn(move || run(request_rx, report_tx, periodic, worker_tickets))?;

        Ok(Self {
            requests: Some(request_tx),
            reports: report_rx,
            tickets,
            handle: Some(handle),
        })
    }

    /// Queue a scan; returns the ticket its report will carry
    pub fn submit(&self, config: ScanConfig) -> Result<u64> {
        let ticket = self.tickets.fetch_add(1, Ordering::SeqCst);
        let sender = self
            .requests
            .as_ref()
            .ok_or(Error::WorkerDisconnected("scan"))?;
        sender
            .send(ScanRequest { ticket, config })
            .map_err(|_| Error::WorkerDisconnected("scan"))?;
        Ok(ticket)
    }

    /// Block until the next report arrives
    pub fn recv(&self) -> Result<ScanReport> {
        self.reports
            .recv()
            .map_err(|_| Error::WorkerDisconnected("scan"))
    }

    /// Wait up to `timeout` for the next report
    pub fn recv_timeout(&self, timeout: Duration) -> Result<Option<ScanReport>> {
        match self.reports.recv_timeout(timeout) {
            Ok(report) => Ok(Some(report)),
            Err(RecvTimeoutError::Timeout) => Ok(None),
            Err(RecvTimeoutError::Disconnected) => Err(Error::WorkerDisconnected("scan")),
        }
    }

    /// Receiver for use in the caller's own `select!`
    pub fn reports(&self) -> &Receiver<ScanReport> {
        &self.reports
    }

    /// Stop accepting requests and wait for the in-flight scan to finish
    pub fn shutdown(mut self) {
        self.stop();
    }

    fn stop(&mut self) {
        self.requests.take();
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                tracing::error!("scan worker panicked");
            }
        }
    }
}

impl Drop for ScanWorker {
    fn drop(&mut self) {
        self.stop();
    }
}

fn run(
    requests: Receiver<ScanRequest>,
    reports: Sender<ScanReport>,
    periodic: Option<(ScanConfig, Duration)>,
    tickets: Arc<AtomicU64>,
) {
    let scanner = DirectoryScanner::new();
    let scan = |ticket: u64, config: &ScanConfig| {
        tracing::debug!(ticket, roots = config.roots.len(), "scan started");
        ScanReport {
            ticket,
            outcome: scanner.scan(config),
            finished_at: Utc::now(),
        }
    };

    let (ticker, periodic_config) = match periodic {
        Some((config, interval)) => (tick(interval), Some(config)),
        None => (never(), None),
    };

    if let Some(config) = &periodic_config {
        let ticket = tickets.fetch_add(1, Ordering::SeqCst);
        if reports.send(scan(ticket, config)).is_err() {
            return;
        }
    }

    loop {
        // None: every sender is gone
        let woke: Option<Option<ScanRequest>> = select! {
            recv(requests) -> msg => msg.ok().map(Some),
            recv(ticker) -> _ => Some(None),
        };

        let report = match woke {
            None => break,
            Some(Some(request)) => scan(request.ticket, &request.config),
            Some(None) => match &periodic_config {
                Some(config) => scan(tickets.fetch_add(1, Ordering::SeqCst), config),
                None => continue,
            },
        };

        if reports.send(report).is_err() {
            break;
        }
    }

    tracing::debug!("scan worker stopped");
}
