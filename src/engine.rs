//! Chemistry simulation engine.
//!
//! [`SimulationCore`] owns the levels, the rolling buffers and the random
//! source, and advances them one tick at a time. [`ChemistrySimulationEngine`]
//! wraps a core with a repeating tokio timer that can be started and stopped
//! any number of times, and publishes an [`EngineSnapshot`] after every change.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use chrono::Local;
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::buffers::{EventLog, History, HistoryPoint, LogEntry};
use crate::chemistry::ChemistryState;
use crate::interaction::InteractionKind;
use crate::recommendation::{derive_recommendations, Recommendation};

pub const DEFAULT_TICK_INTERVAL: Duration = Duration::from_millis(2000);

/// One consistent read of everything a presenter shows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineSnapshot {
    pub session_id: Uuid,
    pub running: bool,
    pub ticks: u64,
    pub state: ChemistryState,
    pub history: Vec<HistoryPoint>,
    pub log: Vec<LogEntry>,
    pub recommendations: Vec<Recommendation>,
}

/// Result of a single tick.
#[derive(Debug, Clone, PartialEq)]
pub struct TickOutcome {
    pub event: InteractionKind,
    pub previous: ChemistryState,
    pub current: ChemistryState,
    pub log_id: u64,
}

#[derive(Debug)]
pub struct SimulationCore {
    state: ChemistryState,
    history: History,
    log: EventLog,
    recommendations: Vec<Recommendation>,
    ticks: u64,
    rng: StdRng,
}

impl SimulationCore {
    pub fn new(rng: StdRng) -> Self {
        let state = ChemistryState::BASELINE;
        SimulationCore {
            state,
            history: History::new(),
            log: EventLog::new(),
            recommendations: derive_recommendations(&state),
            ticks: 0,
            rng,
        }
    }

    /// Draws an interaction and applies it.
    pub fn tick(&mut self, timestamp: String) -> TickOutcome {
        let event = InteractionKind::draw(&mut self.rng);
        self.apply(event, timestamp)
    }

    /// Applies a given interaction through the same path as a timed tick.
    pub fn apply(&mut self, event: InteractionKind, timestamp: String) -> TickOutcome {
        let previous = self.state;
        let current = previous.apply(event);

        self.state = current;
        let log_id = self.log.record(event, previous, timestamp.clone());
        self.history.push(current, timestamp);
        self.recommendations = derive_recommendations(&current);
        self.ticks += 1;

        TickOutcome {
            event,
            previous,
            current,
            log_id,
        }
    }

    pub fn reset(&mut self) {
        self.state = ChemistryState::BASELINE;
        self.history.clear();
        self.log.clear();
        self.recommendations = derive_recommendations(&self.state);
        self.ticks = 0;
    }

    pub fn state(&self) -> ChemistryState {
        self.state
    }

    pub fn history(&self) -> Vec<HistoryPoint> {
        self.history.points()
    }

    pub fn log(&self) -> Vec<LogEntry> {
        self.log.entries()
    }

    pub fn recommendations(&self) -> Vec<Recommendation> {
        self.recommendations.clone()
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }
}

#[derive(Debug)]
struct Shared {
    session_id: Uuid,
    core: SimulationCore,
    running: bool,
    /// Bumped on every start and stop; a timer task only ticks while the
    /// generation it was spawned with is still current.
    generation: u64,
}

impl Shared {
    fn snapshot(&self) -> EngineSnapshot {
        EngineSnapshot {
            session_id: self.session_id,
            running: self.running,
            ticks: self.core.ticks(),
            state: self.core.state(),
            history: self.core.history(),
            log: self.core.log(),
            recommendations: self.core.recommendations(),
        }
    }
}

fn lock(shared: &Mutex<Shared>) -> MutexGuard<'_, Shared> {
    shared.lock().unwrap_or_else(PoisonError::into_inner)
}

fn wall_clock() -> String {
    Local::now().format("%H:%M:%S").to_string()
}

pub struct ChemistrySimulationEngine {
    interval: Duration,
    shared: Arc<Mutex<Shared>>,
    updates: Arc<watch::Sender<EngineSnapshot>>,
    timer: Option<JoinHandle<()>>,
}

impl ChemistrySimulationEngine {
    pub fn new() -> Self {
        Self::with_rng(StdRng::from_entropy())
    }

    /// Engine whose interaction draws are reproducible.
    pub fn with_seed(seed: u64) -> Self {
        Self::with_rng(StdRng::seed_from_u64(seed))
    }

    pub fn with_rng(rng: StdRng) -> Self {
        let shared = Shared {
            session_id: Uuid::new_v4(),
            core: SimulationCore::new(rng),
            running: false,
            generation: 0,
        };
        let (updates, _) = watch::channel(shared.snapshot());

        ChemistrySimulationEngine {
            interval: DEFAULT_TICK_INTERVAL,
            shared: Arc::new(Mutex::new(shared)),
            updates: Arc::new(updates),
            timer: None,
        }
    }

    /// Overrides the tick period. Takes effect on the next `start`.
    pub fn with_interval(mut self, interval: Duration) -> Self {
        if interval.is_zero() {
            warn!("Ignoring zero tick interval, keeping {:?}", self.interval);
        } else {
            self.interval = interval;
        }
        self
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Starts the repeating tick. Returns `false` without doing anything if
    /// the engine is already running or no tokio runtime is available.
    pub fn start(&mut self) -> bool {
        let runtime = match tokio::runtime::Handle::try_current() {
            Ok(handle) => handle,
            Err(_) => {
                warn!("start() called outside a tokio runtime, engine stays idle");
                return false;
            }
        };

        let generation = {
            let mut shared = lock(&self.shared);
            if shared.running {
                return false;
            }
            shared.running = true;
            shared.generation += 1;
            self.updates.send_replace(shared.snapshot());
            shared.generation
        };

        // A previous timer is already dead (its generation is stale); make sure
        // it is gone before replacing the handle.
        if let Some(old) = self.timer.take() {
            old.abort();
        }

        let period = self.interval;
        let shared = Arc::clone(&self.shared);
        let updates = Arc::clone(&self.updates);

        self.timer = Some(runtime.spawn(async move {
            let mut ticker = tokio::time::interval_at(Instant::now() + period, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                ticker.tick().await;

                let mut guard = lock(&shared);
                if !guard.running || guard.generation != generation {
                    break;
                }
                let outcome = guard.core.tick(wall_clock());
                debug!(
                    "tick #{} {} -> {}",
                    outcome.log_id,
                    outcome.event.label(),
                    outcome.current
                );
                updates.send_replace(guard.snapshot());
            }
        }));

        info!("Simulation started (every {:?})", period);
        true
    }

    /// Stops the repeating tick. No tick is committed after this returns.
    /// Returns `false` if the engine was already idle.
    pub fn stop(&mut self) -> bool {
        {
            let mut shared = lock(&self.shared);
            if !shared.running {
                return false;
            }
            shared.running = false;
            shared.generation += 1;
            self.updates.send_replace(shared.snapshot());
        }

        if let Some(timer) = self.timer.take() {
            timer.abort();
        }

        info!("Simulation stopped");
        true
    }

    pub fn is_running(&self) -> bool {
        lock(&self.shared).running
    }

    /// Runs one tick immediately with a random interaction.
    pub fn step(&self) -> TickOutcome {
        self.commit(|core| core.tick(wall_clock()))
    }

    /// Runs one tick immediately with the given interaction.
    pub fn apply(&self, event: InteractionKind) -> TickOutcome {
        self.commit(|core| core.apply(event, wall_clock()))
    }

    fn commit(&self, f: impl FnOnce(&mut SimulationCore) -> TickOutcome) -> TickOutcome {
        let mut shared = lock(&self.shared);
        let outcome = f(&mut shared.core);
        self.updates.send_replace(shared.snapshot());
        outcome
    }

    /// Back to baseline with empty buffers. The running flag is untouched.
    pub fn reset(&self) {
        let mut shared = lock(&self.shared);
        shared.core.reset();
        self.updates.send_replace(shared.snapshot());
    }

    pub fn get_state(&self) -> ChemistryState {
        lock(&self.shared).core.state()
    }

    pub fn get_history(&self) -> Vec<HistoryPoint> {
        lock(&self.shared).core.history()
    }

    pub fn get_log(&self) -> Vec<LogEntry> {
        lock(&self.shared).core.log()
    }

    pub fn get_recommendations(&self) -> Vec<Recommendation> {
        lock(&self.shared).core.recommendations()
    }

    pub fn ticks(&self) -> u64 {
        lock(&self.shared).core.ticks()
    }

    pub fn snapshot(&self) -> EngineSnapshot {
        lock(&self.shared).snapshot()
    }

    /// Receiver that sees a fresh snapshot after every tick, start, stop and reset.
    pub fn subscribe(&self) -> watch::Receiver<EngineSnapshot> {
        self.updates.subscribe()
    }
}

impl Default for ChemistrySimulationEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for ChemistrySimulationEngine {
    fn drop(&mut self) {
        {
            let mut shared = lock(&self.shared);
            shared.running = false;
            shared.generation += 1;
        }
        if let Some(timer) = self.timer.take() {
            timer.abort();
        }
    }
}
