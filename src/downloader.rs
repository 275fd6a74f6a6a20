//! Simulated download: a cosmetic progress ticker and a one-shot completion timer that records a history row.

use crate::{
    metadata::VideoMetadata,
    model::{DownloadHistoryRecord, NewDownloadRecord},
    platform::Quality,
    progress::advance_progress,
    store::{HistoryStore, StoreError},
};

use std::{sync::Arc, time::Duration};
use tokio::{
    runtime::Handle,
    sync::mpsc::{unbounded_channel, UnboundedReceiver, UnboundedSender},
    task::JoinHandle,
    time::{self, Instant},
};
use tracing::{event, Level};

/// Interval between two progress increments
pub const TICK_INTERVAL: Duration = Duration::from_millis(200);
/// Delay after which the download is declared complete, regardless of progress
pub const COMPLETION_DELAY: Duration = Duration::from_millis(2200);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SimulationState {
    Idle,
    Running,
    Completed,
}

/// What a simulated download is about
#[derive(Debug, Clone)]
pub struct DownloadRequest {
    /// Raw text of the URL input
    pub url: String,
    pub metadata: VideoMetadata,
    pub quality: Quality,
}

#[derive(Debug)]
enum SimulationEvent {
    Progress(u8),
    Finished(Result<DownloadHistoryRecord, StoreError>),
}

/// Timer tasks of one attempt; dropping it cancels both
struct Attempt {
    ticker: JoinHandle<()>,
    completion: JoinHandle<()>,
}

impl Drop for Attempt {
    fn drop(&mut self) {
        self.ticker.abort();
        self.completion.abort();
    }
}

pub struct DownloadSimulator {
    runtime: Handle,
    store: Arc<dyn HistoryStore>,
    state: SimulationState,
    progress: u8,
    /// Bumped on every start and reset; events tagged with an older value are stale
    generation: u64,
    attempt: Option<Attempt>,
    events_tx: UnboundedSender<(u64, SimulationEvent)>,
    events_rx: UnboundedReceiver<(u64, SimulationEvent)>,
    last_outcome: Option<Result<DownloadHistoryRecord, StoreError>>,
}

impl DownloadSimulator {
    pub fn new(runtime: Handle, store: Arc<dyn HistoryStore>) -> Self {
        let (events_tx, events_rx) = unbounded_channel();

        Self {
            runtime,
            store,
            state: SimulationState::Idle,
            progress: 0,
            generation: 0,
            attempt: None,
            events_tx,
            events_rx,
            last_outcome: None,
        }
    }

    pub fn state(&self) -> SimulationState {
        self.state
    }

    pub fn is_running(&self) -> bool {
        self.state == SimulationState::Running
    }

    /// Cosmetic progress in percent
    pub fn progress(&self) -> u8 {
        self.progress
    }

    /// Store outcome of the last completed attempt
    pub fn last_outcome(&self) -> Option<&Result<DownloadHistoryRecord, StoreError>> {
        self.last_outcome.as_ref()
    }

    /// File name of the record the last completed attempt stored, if the write succeeded
    pub fn stored_file_name(&self) -> Option<&str> {
        match self.last_outcome()? {
            Ok(record) => Some(&record.file_name),
            Err(_) => None,
        }
    }

    /// Starts a new attempt. Returns `false` without touching the current one when already running.
    pub fn start(&mut self, request: DownloadRequest) -> bool {
        if self.is_running() {
            event!(Level::DEBUG, "Download already running, ignoring trigger");
            return false;
        }

        self.generation += 1;
        self.state = SimulationState::Running;
        self.progress = 0;

        event!(
            Level::DEBUG,
            generation = self.generation,
            platform = %request.metadata.platform,
            quality = %request.quality,
            "Simulated download started"
        );

        let ticker = self.runtime.spawn(run_ticker(self.generation, self.events_tx.clone()));
        let completion = self.runtime.spawn(run_completion(
            self.generation,
            request,
            Arc::clone(&self.store),
            self.events_tx.clone(),
        ));
        self.attempt = Some(Attempt { ticker, completion });

        true
    }

    /// Cancels a running attempt and forgets a finished one.
    pub fn reset(&mut self) {
        if self.is_running() {
            event!(Level::DEBUG, generation = self.generation, "Simulated download cancelled");
        }

        self.attempt = None;
        self.generation += 1;
        self.state = SimulationState::Idle;
        self.progress = 0;
        self.last_outcome = None;
    }

    /// Applies timer events received since the last call
    pub fn poll(&mut self) {
        while let Ok((generation, sim_event)) = self.events_rx.try_recv() {
            if generation != self.generation || !self.is_running() {
                continue;
            }

            match sim_event {
                SimulationEvent::Progress(progress) => self.progress = progress,
                SimulationEvent::Finished(outcome) => {
                    event!(Level::DEBUG, generation, "Simulated download completed");

                    self.attempt = None;
                    self.state = SimulationState::Completed;
                    self.progress = 0;
                    self.last_outcome = Some(outcome);
                }
            }
        }
    }
}

async fn run_ticker(generation: u64, events_tx: UnboundedSender<(u64, SimulationEvent)>) {
    let mut interval = time::interval_at(Instant::now() + TICK_INTERVAL, TICK_INTERVAL);
    let mut progress = 0;

    while let Some(next) = advance_progress(progress) {
        interval.tick().await;
        progress = next;

        if events_tx.send((generation, SimulationEvent::Progress(progress))).is_err() {
            break;
        }
    }
}

async fn run_completion(
    generation: u64,
    request: DownloadRequest,
    store: Arc<dyn HistoryStore>,
    events_tx: UnboundedSender<(u64, SimulationEvent)>,
) {
    time::sleep(COMPLETION_DELAY).await;

    let record = NewDownloadRecord::new(request.url, &request.metadata, request.quality);
    let outcome = store.insert(record).await;

    // Completion is reported either way
    if let Err(err) = &outcome {
        event!(Level::WARN, %err, "Download finished but its history record was not stored");
    }

    let _ = events_tx.send((generation, SimulationEvent::Finished(outcome)));
}
