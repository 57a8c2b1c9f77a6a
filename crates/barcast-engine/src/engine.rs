//! Ingestion and heartbeat paths over a shared store.

use barcast_aggregate::{
    AggregationRecord, AggregationStore, EmitTrigger, EngineConfig, Heartbeat, Processed,
    TickProcessor,
};
use barcast_format::Emitter;
use barcast_types::{ConfigError, Trade};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::{Mutex, mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tracing::{debug, info, trace, warn};

use crate::{SystemClock, WallClock};

/// Counters describing what the engine has done so far.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EngineStats {
    /// Trades folded into the store.
    pub ticks: u64,
    /// Bars written successfully.
    pub emissions: u64,
    /// Bars the sink failed to write.
    pub write_failures: u64,
}

/// Aggregation engine shared by the ingestion and heartbeat paths.
///
/// The store sits behind one async mutex. Every read and write of the store
/// happens while holding it, and it is never held across an await on the
/// feed or the timer. Bars are emitted after the lock is released.
pub struct AggregationEngine {
    store: Mutex<AggregationStore>,
    processor: TickProcessor,
    schedule: Heartbeat,
    emitter: Arc<dyn Emitter>,
    clock: Arc<dyn WallClock>,
    ticks: AtomicU64,
    emissions: AtomicU64,
    write_failures: AtomicU64,
}

impl std::fmt::Debug for AggregationEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AggregationEngine")
            .field("processor", &self.processor)
            .field("schedule", &self.schedule)
            .field("clock", &self.clock)
            .field("stats", &self.stats())
            .finish_non_exhaustive()
    }
}

impl AggregationEngine {
    /// Creates an engine driven by the system clock.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid.
    pub fn new(config: &EngineConfig, emitter: Arc<dyn Emitter>) -> Result<Self, ConfigError> {
        Self::with_clock(config, emitter, Arc::new(SystemClock))
    }

    /// Creates an engine that reads "now" from `clock`.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid.
    pub fn with_clock(
        config: &EngineConfig,
        emitter: Arc<dyn Emitter>,
        clock: Arc<dyn WallClock>,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            store: Mutex::new(AggregationStore::new()),
            processor: TickProcessor::from_config(config)?,
            schedule: Heartbeat::from_config(config)?,
            emitter,
            clock,
            ticks: AtomicU64::new(0),
            emissions: AtomicU64::new(0),
            write_failures: AtomicU64::new(0),
        })
    }

    /// Folds one trade into the store, emitting the bucket immediately if
    /// the emission gate fires.
    pub async fn ingest(&self, trade: &Trade) -> Processed {
        let now = self.clock.now();
        let processed = {
            let mut store = self.store.lock().await;
            self.processor.process(trade, &mut store, now)
        };
        self.ticks.fetch_add(1, Ordering::Relaxed);

        trace!(
            price = trade.price,
            timestamp = %trade.timestamp,
            bucket = %processed.record.bucket_start,
            volume = processed.record.volume,
            emit_now = processed.emit_now,
            "Processed trade"
        );

        if processed.emit_now {
            self.emit(&processed.record, EmitTrigger::Settled);
        }
        processed
    }

    /// Reports the most recently settled bucket and applies the retention
    /// window, if any.
    pub async fn heartbeat(&self, trigger: EmitTrigger) -> AggregationRecord {
        let now = self.clock.now();
        let (record, evicted) = {
            let mut store = self.store.lock().await;
            let record = self.schedule.report(&store, now);
            let evicted = self
                .schedule
                .retention_cutoff(now)
                .map_or(0, |cutoff| store.evict_before(cutoff));
            (record, evicted)
        };

        if evicted > 0 {
            debug!(evicted, "Evicted buckets past retention");
        }
        debug!(
            %trigger,
            bucket = %record.bucket_start,
            volume = record.volume,
            "Heartbeat"
        );
        self.emit(&record, trigger);
        record
    }

    /// Returns a copy of every stored record, oldest bucket first.
    pub async fn snapshot(&self) -> Vec<AggregationRecord> {
        self.store.lock().await.iter().cloned().collect()
    }

    /// Returns the number of buckets currently stored.
    pub async fn bucket_count(&self) -> usize {
        self.store.lock().await.len()
    }

    /// Returns the engine counters.
    #[must_use]
    pub fn stats(&self) -> EngineStats {
        EngineStats {
            ticks: self.ticks.load(Ordering::Relaxed),
            emissions: self.emissions.load(Ordering::Relaxed),
            write_failures: self.write_failures.load(Ordering::Relaxed),
        }
    }

    /// Spawns the heartbeat task. The first report fires one bucket length
    /// after the call; the task ends when `shutdown` changes.
    pub fn spawn_heartbeat(self: &Arc<Self>, mut shutdown: watch::Receiver<bool>) -> JoinHandle<()> {
        let engine = Arc::clone(self);
        let period = self.schedule.period();

        tokio::spawn(async move {
            let mut ticker = tokio::time::interval_at(Instant::now() + period, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        engine.heartbeat(EmitTrigger::Heartbeat).await;
                    }
                    _ = shutdown.changed() => break,
                }
            }
        })
    }

    /// Runs both paths until `shutdown` changes or the trade channel closes,
    /// then flushes one final report.
    pub async fn run(
        self: Arc<Self>,
        mut trades: mpsc::Receiver<Trade>,
        mut shutdown: watch::Receiver<bool>,
    ) -> EngineStats {
        info!(period = ?self.schedule.period(), "Aggregation engine started");
        let ticker = self.spawn_heartbeat(shutdown.clone());

        loop {
            tokio::select! {
                trade = trades.recv() => match trade {
                    Some(trade) => {
                        self.ingest(&trade).await;
                    }
                    None => {
                        debug!("Trade channel closed");
                        break;
                    }
                },
                _ = shutdown.changed() => break,
            }
        }

        ticker.abort();
        if let Err(e) = ticker.await
            && !e.is_cancelled()
        {
            warn!(error = %e, "Heartbeat task failed");
        }

        self.heartbeat(EmitTrigger::Shutdown).await;
        let stats = self.stats();
        info!(
            ticks = stats.ticks,
            emissions = stats.emissions,
            write_failures = stats.write_failures,
            "Aggregation engine stopped"
        );
        stats
    }

    fn emit(&self, record: &AggregationRecord, trigger: EmitTrigger) {
        match self.emitter.emit(record, trigger) {
            Ok(()) => {
                self.emissions.fetch_add(1, Ordering::Relaxed);
            }
            Err(e) => {
                self.write_failures.fetch_add(1, Ordering::Relaxed);
                warn!(error = %e, %trigger, bucket = %record.bucket_start, "Failed to write bar");
            }
        }
    }
}
