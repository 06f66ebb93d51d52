//! The simulation engine and its background stepper.
//!
//! All simulation state lives in one [`World`] behind a mutex. The stepper
//! thread takes that lock for the whole of each tick, and every engine
//! operation that reads or mutates particles takes it too, so no mutation
//! ever interleaves with a tick in flight.
//!
//! The run state is an atomic flag. It is only written while the world lock
//! is held, and the stepper reads it after acquiring the lock, so a tick
//! never runs against a stale decision to play. Shutting the stepper down
//! goes through a separate channel that doubles as the tick timer.

use crate::bounds::Bounds;
use crate::config::EngineConfig;
use crate::electrode::Electrode;
use crate::error::{DepError, Result};
use crate::integrator;
use crate::medium::Medium;
use crate::particle::{check_frequency, clausius_mossotti, Particle};
use crate::vector::Vector;
use log::{debug, error, info, warn};
use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::mpsc::{self, RecvTimeoutError};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::thread::{self, JoinHandle};
use std::time::Duration;

/// Slowest speed multiplier reachable through [`SimulationEngine::slower`]
pub const SPEED_MIN: f64 = 0.25;

/// Fastest speed multiplier reachable through [`SimulationEngine::faster`]
pub const SPEED_MAX: f64 = 8.0;

/// Transport state of the engine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum RunState {
    Stopped = 0,
    Playing = 1,
    Paused = 2,
}

impl RunState {
    fn from_u8(value: u8) -> Self {
        match value {
            1 => RunState::Playing,
            2 => RunState::Paused,
            _ => RunState::Stopped,
        }
    }
}

/// Why the stepper thread ended
#[derive(Debug, Clone, PartialEq)]
pub enum StepperExit {
    /// Shut down on request by `reset`, `shutdown` or drop
    Cancelled,
    /// A tick failed; the engine was stopped
    Failed(DepError),
}

/// Everything a tick reads or writes
#[derive(Debug)]
struct World {
    particles: Vec<Particle>,
    initial_positions: Vec<Vector>,
    electrode: Electrode,
    medium: Medium,
    frequency: f64,
    bounds: Bounds,
    base_time_step: f64,
    delta_time: f64,
    speed_multiplier: f64,
    ticks: u64,
}

impl World {
    fn step(&mut self) -> Result<()> {
        integrator::step(
            &mut self.particles,
            &self.electrode,
            &self.bounds,
            self.delta_time,
        )?;
        self.ticks += 1;
        Ok(())
    }

    /// Clausius–Mossotti factors of every particle against a candidate
    /// medium and frequency, without touching the particles
    fn fcm_for(&self, medium: &Medium, frequency: f64) -> Result<Vec<(f64, f64)>> {
        check_frequency(frequency)?;
        self.particles
            .iter()
            .map(|particle| {
                clausius_mossotti(
                    particle.permittivity(),
                    particle.conductivity(),
                    medium,
                    frequency,
                )
            })
            .collect()
    }

    fn apply_fcm(&mut self, factors: Vec<(f64, f64)>) {
        for (particle, factor) in self.particles.iter_mut().zip(factors) {
            particle.set_fcm(factor);
        }
    }

    fn set_speed(&mut self, multiplier: f64) {
        self.speed_multiplier = multiplier;
        self.delta_time = self.base_time_step * multiplier;
    }
}

/// State shared between the engine handle and its stepper thread
#[derive(Debug)]
struct Shared {
    world: Mutex<World>,
    run_state: AtomicU8,
    exit: Mutex<Option<StepperExit>>,
    tick_interval: Duration,
}

impl Shared {
    fn world(&self) -> MutexGuard<'_, World> {
        lock(&self.world)
    }

    fn run_state(&self) -> RunState {
        RunState::from_u8(self.run_state.load(Ordering::Acquire))
    }

    fn set_run_state(&self, state: RunState) {
        self.run_state.store(state as u8, Ordering::Release);
    }

    fn tick(&self) -> Result<()> {
        let mut world = self.world();
        if self.run_state() != RunState::Playing {
            return Ok(());
        }
        world.step()
    }
}

/// Handle to a running stepper thread
#[derive(Debug)]
struct Stepper {
    shutdown: mpsc::Sender<()>,
    handle: JoinHandle<()>,
}

impl Stepper {
    fn stop(self) {
        // The stepper may already have exited after a failed tick
        let _ = self.shutdown.send(());
        if self.handle.join().is_err() {
            error!("stepper thread panicked outside a tick");
        }
    }
}

/// A dielectrophoresis simulation with play/pause/stop/reset transport
/// controls over a background stepper thread.
///
/// Dropping the engine shuts the stepper down.
#[derive(Debug)]
pub struct SimulationEngine {
    shared: Arc<Shared>,
    stepper: Mutex<Option<Stepper>>,
}

impl Default for SimulationEngine {
    fn default() -> Self {
        Self::from_valid_config(EngineConfig::default())
    }
}

impl SimulationEngine {
    pub fn new(config: EngineConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self::from_valid_config(config))
    }

    fn from_valid_config(config: EngineConfig) -> Self {
        let world = World {
            particles: Vec::new(),
            initial_positions: Vec::new(),
            electrode: config.electrode,
            medium: config.medium,
            frequency: config.frequency,
            bounds: config.bounds,
            base_time_step: config.base_time_step,
            delta_time: config.base_time_step,
            speed_multiplier: 1.0,
            ticks: 0,
        };

        Self {
            shared: Arc::new(Shared {
                world: Mutex::new(world),
                run_state: AtomicU8::new(RunState::Stopped as u8),
                exit: Mutex::new(None),
                tick_interval: config.tick_interval,
            }),
            stepper: Mutex::new(None),
        }
    }

    // ---- transport ----

    /// Start or resume stepping.
    ///
    /// Does nothing while there are no particles. The stepper thread is
    /// spawned on the first call and reused afterwards.
    pub fn play(&self) -> Result<()> {
        {
            let world = self.shared.world();
            if world.particles.is_empty() {
                debug!("play ignored: no particles");
                return Ok(());
            }
            self.shared.set_run_state(RunState::Playing);
        }

        if let Err(error) = self.ensure_stepper() {
            self.shared.set_run_state(RunState::Stopped);
            return Err(error);
        }
        info!("playing");
        Ok(())
    }

    /// Keep the stepper alive but skip physics until the next `play`
    pub fn pause(&self) {
        let _world = self.shared.world();
        if self.shared.run_state() == RunState::Playing {
            self.shared.set_run_state(RunState::Paused);
            info!("paused");
        }
    }

    /// Halt, put every particle back where it was added, and return to 1× speed
    pub fn stop(&self) {
        let mut world = self.shared.world();
        self.shared.set_run_state(RunState::Stopped);

        let World {
            particles,
            initial_positions,
            ..
        } = &mut *world;
        for (particle, initial) in particles.iter_mut().zip(initial_positions.iter()) {
            particle.set_position(*initial);
            particle.set_velocity(0.0);
        }
        world.set_speed(1.0);

        info!("stopped; {} particles restored", world.particles.len());
    }

    /// Halt, remove every particle and end the stepper thread
    ///
    /// The stepper slot stays locked throughout, so a concurrent `play`
    /// cannot spawn a new stepper until the reset has finished, and then
    /// finds the engine stopped.
    pub fn reset(&self) {
        let mut slot = lock(&self.stepper);
        if let Some(stepper) = slot.take() {
            stepper.stop();
        }

        let mut world = self.shared.world();
        self.shared.set_run_state(RunState::Stopped);
        world.particles.clear();
        world.initial_positions.clear();
        world.ticks = 0;

        info!("reset");
    }

    /// End the stepper thread, leaving all state in place
    pub fn shutdown(&self) {
        self.stop_stepper();
    }

    /// Run a single physics step now, whatever the run state
    pub fn step_once(&self) -> Result<()> {
        self.shared.world().step()
    }

    /// Double the speed multiplier, up to [`SPEED_MAX`]. Returns the new multiplier.
    pub fn faster(&self) -> f64 {
        let mut world = self.shared.world();
        if world.speed_multiplier < SPEED_MAX {
            let multiplier = world.speed_multiplier * 2.0;
            world.set_speed(multiplier);
            debug!("speed {}x", multiplier);
        }
        world.speed_multiplier
    }

    /// Halve the speed multiplier, down to [`SPEED_MIN`]. Returns the new multiplier.
    pub fn slower(&self) -> f64 {
        let mut world = self.shared.world();
        if world.speed_multiplier > SPEED_MIN {
            let multiplier = world.speed_multiplier / 2.0;
            world.set_speed(multiplier);
            debug!("speed {}x", multiplier);
        }
        world.speed_multiplier
    }

    // ---- configuration ----

    /// Place `particle` at the container center and remember that spot as
    /// its initial position. Returns the particle's index.
    pub fn add_particle(&self, mut particle: Particle) -> Result<usize> {
        let mut world = self.shared.world();
        let center = world.bounds.center();

        particle.set_position(center);
        particle.calc_fcm(&world.medium, world.frequency)?;

        world.particles.push(particle);
        world.initial_positions.push(center);

        let index = world.particles.len() - 1;
        debug!("added {} as particle {}", world.particles[index].kind(), index);
        Ok(index)
    }

    pub fn set_electrode(&self, electrode: impl Into<Electrode>) {
        let electrode = electrode.into();
        info!("electrode set to {}", electrode.kind());
        self.shared.world().electrode = electrode;
    }

    /// Replace the medium and recompute every particle's fCM
    pub fn set_medium(&self, medium: Medium) -> Result<()> {
        let mut world = self.shared.world();
        let factors = world.fcm_for(&medium, world.frequency)?;
        world.apply_fcm(factors);
        world.medium = medium;
        debug!("medium changed; {} particles recomputed", world.particles.len());
        Ok(())
    }

    /// Replace the drive frequency and recompute every particle's fCM.
    ///
    /// A negative or non-finite frequency is rejected and nothing changes.
    pub fn set_frequency(&self, frequency: f64) -> Result<()> {
        let mut world = self.shared.world();
        let factors = world.fcm_for(&world.medium, frequency).inspect_err(|error| {
            warn!("frequency rejected: {}", error);
        })?;
        world.apply_fcm(factors);
        world.frequency = frequency;
        debug!("frequency set to {} Hz", frequency);
        Ok(())
    }

    /// Drive the active electrode at `voltage`
    pub fn set_voltage(&self, voltage: f64) -> Result<()> {
        if !voltage.is_finite() {
            return Err(DepError::invalid_argument(format!(
                "voltage must be finite, got {}",
                voltage
            )));
        }
        self.shared.world().electrode.set_voltage(voltage)?;
        debug!("voltage set to {} V", voltage);
        Ok(())
    }

    /// Simulated seconds per step. The next speed change or `stop`
    /// recomputes it from the base time step.
    pub fn set_delta_time(&self, delta_time: f64) -> Result<()> {
        if !delta_time.is_finite() || delta_time <= 0.0 {
            return Err(DepError::invalid_argument(format!(
                "time step must be positive, got {}",
                delta_time
            )));
        }
        self.shared.world().delta_time = delta_time;
        Ok(())
    }

    pub fn set_low_bounds(&self, low: Vector) -> Result<()> {
        self.shared.world().bounds.set_low(low)
    }

    pub fn set_high_bounds(&self, high: Vector) -> Result<()> {
        self.shared.world().bounds.set_high(high)
    }

    // ---- accessors ----

    pub fn run_state(&self) -> RunState {
        self.shared.run_state()
    }

    /// Snapshot of the particles
    pub fn particles(&self) -> Vec<Particle> {
        self.shared.world().particles.clone()
    }

    pub fn particle_count(&self) -> usize {
        self.shared.world().particles.len()
    }

    /// Snapshot of the initial positions, index-aligned with [`Self::particles`]
    pub fn initial_positions(&self) -> Vec<Vector> {
        self.shared.world().initial_positions.clone()
    }

    pub fn electrode(&self) -> Electrode {
        self.shared.world().electrode.clone()
    }

    pub fn medium(&self) -> Medium {
        self.shared.world().medium.clone()
    }

    pub fn frequency(&self) -> f64 {
        self.shared.world().frequency
    }

    pub fn delta_time(&self) -> f64 {
        self.shared.world().delta_time
    }

    pub fn base_time_step(&self) -> f64 {
        self.shared.world().base_time_step
    }

    pub fn speed_multiplier(&self) -> f64 {
        self.shared.world().speed_multiplier
    }

    pub fn bounds(&self) -> Bounds {
        self.shared.world().bounds
    }

    pub fn low_bounds(&self) -> Vector {
        self.bounds().low()
    }

    pub fn high_bounds(&self) -> Vector {
        self.bounds().high()
    }

    /// Center of the container, where new particles are placed
    pub fn center(&self) -> Vector {
        self.bounds().center()
    }

    /// Physics steps executed since construction or the last reset
    pub fn ticks(&self) -> u64 {
        self.shared.world().ticks
    }

    pub fn tick_interval(&self) -> Duration {
        self.shared.tick_interval
    }

    /// How the most recent stepper thread ended, if it has
    pub fn stepper_exit(&self) -> Option<StepperExit> {
        lock(&self.shared.exit).clone()
    }

    pub fn is_stepper_running(&self) -> bool {
        lock(&self.stepper)
            .as_ref()
            .is_some_and(|stepper| !stepper.handle.is_finished())
    }

    // ---- stepper lifecycle ----

    fn ensure_stepper(&self) -> Result<()> {
        let mut slot = lock(&self.stepper);
        // A reset, stop or pause may have landed since `play` set the state
        if self.shared.run_state() != RunState::Playing {
            debug!("play superseded before the stepper started");
            return Ok(());
        }
        if let Some(stepper) = slot.as_ref() {
            if !stepper.handle.is_finished() {
                return Ok(());
            }
        }
        // A previous stepper died on a failed tick; reap it before replacing it
        if let Some(stale) = slot.take() {
            stale.stop();
        }

        *lock(&self.shared.exit) = None;

        let (shutdown, receiver) = mpsc::channel();
        let shared = Arc::clone(&self.shared);
        let handle = thread::Builder::new()
            .name("depsim-stepper".into())
            .spawn(move || run_stepper(shared, receiver))
            .map_err(|error| DepError::StepperPanicked {
                message: format!("failed to spawn stepper: {}", error),
            })?;

        *slot = Some(Stepper { shutdown, handle });
        debug!("stepper spawned");
        Ok(())
    }

    fn stop_stepper(&self) {
        let stepper = lock(&self.stepper).take();
        if let Some(stepper) = stepper {
            stepper.stop();
        }
    }
}

impl Drop for SimulationEngine {
    fn drop(&mut self) {
        self.stop_stepper();
    }
}

fn run_stepper(shared: Arc<Shared>, shutdown: mpsc::Receiver<()>) {
    let exit = loop {
        match shutdown.recv_timeout(shared.tick_interval) {
            Err(RecvTimeoutError::Timeout) => {}
            Ok(()) | Err(RecvTimeoutError::Disconnected) => break StepperExit::Cancelled,
        }

        match panic::catch_unwind(AssertUnwindSafe(|| shared.tick())) {
            Ok(Ok(())) => {}
            Ok(Err(error)) => break StepperExit::Failed(error),
            Err(payload) => {
                break StepperExit::Failed(DepError::StepperPanicked {
                    message: panic_message(payload.as_ref()),
                })
            }
        }
    };

    match &exit {
        StepperExit::Cancelled => debug!("stepper cancelled"),
        StepperExit::Failed(error) => {
            error!("stepper stopped: {}", error);
            shared.set_run_state(RunState::Stopped);
        }
    }
    *lock(&shared.exit) = Some(exit);
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}

/// A panicking tick poisons the world lock; the data is still usable
fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
