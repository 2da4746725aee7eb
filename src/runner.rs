//! Dedicated logic thread
//!
//! Runs the simulation at the fixed tick rate and publishes an immutable
//! snapshot after every committed tick. Readers never see a half-applied tick.

use std::io;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, RwLock};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use crate::consts::TICK_RATE;
use crate::settings::MatchConfig;
use crate::sim::{SimulationState, Snapshot, TickInput, tick};

/// State shared between the logic thread and its handle
struct Shared {
    input: Mutex<TickInput>,
    config: Mutex<MatchConfig>,
    snapshot: RwLock<Arc<Snapshot>>,
    running: AtomicBool,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl Shared {
    /// Copy the input for this tick, consuming one-shot flags
    fn take_input(&self) -> TickInput {
        let mut pending = lock(&self.input);
        let input = pending.clone();
        pending.pause = false;
        pending.restart = false;
        input
    }

    fn publish(&self, snapshot: Snapshot) {
        let mut slot = self.snapshot.write().unwrap_or_else(PoisonError::into_inner);
        *slot = Arc::new(snapshot);
    }
}

/// Handle to the running logic thread. Dropping it stops the thread.
pub struct LogicThread {
    shared: Arc<Shared>,
    handle: Option<JoinHandle<SimulationState>>,
}

impl LogicThread {
    /// Start a fresh match on a new thread
    pub fn spawn(config: MatchConfig, seed: u64) -> io::Result<Self> {
        let config = config.sanitized();
        let state = SimulationState::new(&config, seed);
        Self::spawn_with_state(state, config)
    }

    /// Resume a saved or prepared state on a new thread
    pub fn spawn_with_state(state: SimulationState, config: MatchConfig) -> io::Result<Self> {
        let config = config.sanitized();
        let shared = Arc::new(Shared {
            input: Mutex::new(TickInput::default()),
            config: Mutex::new(config),
            snapshot: RwLock::new(Arc::new(state.snapshot())),
            running: AtomicBool::new(true),
        });

        let worker = Arc::clone(&shared);
        let handle = thread::Builder::new()
            .name("fire-pong-logic".into())
            .spawn(move || run_loop(state, worker))?;

        Ok(Self {
            shared,
            handle: Some(handle),
        })
    }

    /// Replace the held input. Key state is overwritten; pause and restart
    /// stay latched until a tick consumes them.
    pub fn set_input(&self, input: TickInput) {
        let mut pending = lock(&self.shared.input);
        let pause = pending.pause || input.pause;
        let restart = pending.restart || input.restart;
        *pending = TickInput {
            pause,
            restart,
            ..input
        };
    }

    /// Edit the held input in place
    pub fn update_input(&self, f: impl FnOnce(&mut TickInput)) {
        f(&mut lock(&self.shared.input));
    }

    /// New configuration, picked up at the next tick
    pub fn set_config(&self, config: MatchConfig) {
        *lock(&self.shared.config) = config.sanitized();
    }

    /// Latest committed snapshot
    pub fn snapshot(&self) -> Arc<Snapshot> {
        let slot = self.shared.snapshot.read().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(&slot)
    }

    pub fn is_running(&self) -> bool {
        self.shared.running.load(Ordering::Acquire)
            && self.handle.as_ref().is_some_and(|h| !h.is_finished())
    }

    /// Stop the thread and hand back the final state. `None` if the thread
    /// already stopped or panicked.
    pub fn shutdown(mut self) -> Option<SimulationState> {
        self.stop()
    }

    fn stop(&mut self) -> Option<SimulationState> {
        self.shared.running.store(false, Ordering::Release);
        let handle = self.handle.take()?;
        match handle.join() {
            Ok(state) => Some(state),
            Err(_) => {
                log::error!("Logic thread panicked");
                None
            }
        }
    }
}

impl Drop for LogicThread {
    fn drop(&mut self) {
        self.stop();
    }
}

fn run_loop(mut state: SimulationState, shared: Arc<Shared>) -> SimulationState {
    let tick_duration = Duration::from_secs(1) / TICK_RATE;
    let mut next_tick = Instant::now() + tick_duration;
    log::info!("Logic thread started at {} Hz", TICK_RATE);

    while shared.running.load(Ordering::Acquire) {
        let now = Instant::now();
        if now < next_tick {
            thread::sleep(next_tick - now);
        }
        if !shared.running.load(Ordering::Acquire) {
            break;
        }

        // Skip ticks we fell behind on instead of bursting to catch up
        let now = Instant::now();
        if now > next_tick + tick_duration {
            let behind = now - next_tick;
            let missed = (behind.as_nanos() / tick_duration.as_nanos()) as u32;
            next_tick += tick_duration * missed;
            log::debug!("Logic thread skipped {} ticks", missed);
        }
        next_tick += tick_duration;

        let input = shared.take_input();
        let config = lock(&shared.config).clone();
        tick(&mut state, &config, &input);
        shared.publish(state.snapshot());
    }

    log::info!("Logic thread stopped at tick {}", state.tick);
    state
}
