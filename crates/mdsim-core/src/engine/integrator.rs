use super::config::{KineticMode, SimulationConfig};
use super::error::EngineError;
use super::molecule::Molecule;
use super::output::{OutputSink, RunInfo};
use super::progress::{Progress, ProgressReporter};
use crate::core::forcefield::term::EnergyBreakdown;
use crate::core::models::atom::Atom;
use nalgebra::Vector3;
use rand::prelude::*;
use rand_distr::StandardNormal;
use std::time::Instant;
use tracing::{debug, info, instrument};

/// Converts kcal/(mol·Å·amu) to Å/ps².
pub const ACCELERATION_CONVERSION: f64 = 418.4;
/// Molar gas constant in amu·Å²/(ps²·K).
pub const GAS_CONSTANT: f64 = 0.83144598;
/// Value output timers are reset to after each write.
const TIMER_RESET: f64 = 1e-10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IntegratorState {
    Uninitialized,
    Initialized,
    Running,
    Terminated,
}

/// Velocity-rescaling thermostat driven by a moving average of the temperature.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Thermostat {
    desired: f64,
    rate: f64,
    estimate: f64,
}

impl Thermostat {
    pub fn new(desired: f64, rate: f64) -> Self {
        Self {
            desired,
            rate,
            estimate: desired,
        }
    }

    /// The running temperature estimate in Kelvin.
    pub fn estimate(&self) -> f64 {
        self.estimate
    }

    /// Folds `temperature` into the estimate and returns the velocity scale.
    pub fn update(&mut self, temperature: f64, time_step: f64) -> f64 {
        let weight = 10.0 * time_step;
        self.estimate = (self.estimate + weight * temperature) / (1.0 + weight);

        if self.estimate <= 0.0 || self.desired <= 0.0 {
            return 1.0;
        }
        let window = time_step.max(self.rate);
        let time_scale = if window > 0.0 { time_step / window } else { 0.0 };
        1.0 + time_scale * ((self.desired / self.estimate).sqrt() - 1.0)
    }

    pub fn apply(&mut self, atoms: &mut [Atom], temperature: f64, time_step: f64) {
        let scale = self.update(temperature, time_step);
        for atom in atoms {
            atom.velocity *= scale;
        }
    }
}

/// Outcome of a completed trajectory.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RunSummary {
    pub steps: usize,
    pub simulated_time: f64,
    pub energies: EnergyBreakdown,
    pub temperature: f64,
}

/// Leapfrog molecular dynamics over any [`Molecule`], writing to any [`OutputSink`].
pub struct MolecularDynamics<'a, M: Molecule, S: OutputSink> {
    molecule: M,
    sink: S,
    config: SimulationConfig,
    rng: StdRng,
    state: IntegratorState,
    thermostat: Thermostat,
    current_time: f64,
    steps: usize,
    energy_timer: f64,
    geometry_timer: f64,
    last_status: Instant,
    reporter: ProgressReporter<'a>,
}

impl<'a, M: Molecule, S: OutputSink> MolecularDynamics<'a, M, S> {
    pub fn new(molecule: M, sink: S, config: SimulationConfig) -> Self {
        Self {
            rng: StdRng::seed_from_u64(config.random_seed),
            thermostat: Thermostat::new(config.desired_temperature, config.equilibration_rate),
            molecule,
            sink,
            config,
            state: IntegratorState::Uninitialized,
            current_time: 0.0,
            steps: 0,
            energy_timer: TIMER_RESET,
            geometry_timer: TIMER_RESET,
            last_status: Instant::now(),
            reporter: ProgressReporter::new(),
        }
    }

    pub fn with_reporter(mut self, reporter: ProgressReporter<'a>) -> Self {
        self.reporter = reporter;
        self
    }

    pub fn state(&self) -> IntegratorState {
        self.state
    }

    pub fn molecule(&self) -> &M {
        &self.molecule
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn current_time(&self) -> f64 {
        self.current_time
    }

    pub fn reporter(&self) -> &ProgressReporter<'a> {
        &self.reporter
    }

    pub fn thermostat(&self) -> &Thermostat {
        &self.thermostat
    }

    /// Hands back the molecule and sink once the integrator is no longer needed.
    pub fn into_parts(self) -> (M, S) {
        (self.molecule, self.sink)
    }

    /// Writes the header, draws initial velocities, evaluates the starting
    /// forces, and emits the first output.
    #[instrument(skip_all, name = "md_initialize")]
    pub fn initialize(&mut self) -> Result<(), EngineError> {
        if self.state != IntegratorState::Uninitialized {
            return Err(EngineError::InvalidState {
                state: self.state,
                action: "initialize",
            });
        }
        let info = RunInfo {
            atom_count: self.molecule.atoms().len(),
            term_count: self.molecule.term_count(),
        };
        self.sink.write_header(&self.config, &info)?;
        self.energy_timer = TIMER_RESET;
        self.geometry_timer = TIMER_RESET;
        self.last_status = Instant::now();

        self.initialize_velocities();

        self.molecule.calculate_energy(KineticMode::Current);
        self.molecule.calculate_temperature();
        self.molecule.calculate_gradient(self.config.gradient_mode);
        self.update_accelerations();

        self.state = IntegratorState::Initialized;
        self.check_output(0.0, true)?;
        info!(
            "Initialized {} atoms at {:.2} K.",
            info.atom_count,
            self.molecule.temperature()
        );
        Ok(())
    }

    /// Runs the trajectory to completion, initializing first if needed.
    #[instrument(skip_all, name = "md_run")]
    pub fn run(&mut self) -> Result<RunSummary, EngineError> {
        match self.state {
            IntegratorState::Uninitialized => self.initialize()?,
            IntegratorState::Initialized => {}
            state => {
                return Err(EngineError::InvalidState { state, action: "run" });
            }
        }

        let total_time = self.config.total_time;
        let time_step = self.config.time_step;
        self.reporter.report(Progress::TaskStart { total_time });

        if total_time > 0.0 {
            self.kick(0.5 * time_step);
            while self.current_time < total_time {
                self.step()?;
            }
        }
        self.terminate()?;
        self.reporter.report(Progress::TaskFinish);

        Ok(RunSummary {
            steps: self.steps,
            simulated_time: self.current_time,
            energies: *self.molecule.energies(),
            temperature: self.molecule.temperature(),
        })
    }

    /// Advances the trajectory by one time step.
    pub fn step(&mut self) -> Result<(), EngineError> {
        match self.state {
            IntegratorState::Initialized | IntegratorState::Running => {}
            state => {
                return Err(EngineError::InvalidState { state, action: "step" });
            }
        }
        self.state = IntegratorState::Running;
        let time_step = self.config.time_step;

        self.drift(time_step);
        self.molecule.calculate_gradient(self.config.gradient_mode);
        self.update_accelerations();
        self.kick(time_step);
        self.molecule.calculate_energy(KineticMode::Leapfrog);
        let temperature = self.molecule.calculate_temperature();

        if self.current_time < self.config.equilibration_time {
            self.thermostat
                .apply(self.molecule.atoms_mut(), temperature, time_step);
        }

        self.check_output(time_step, false)?;
        self.current_time += time_step;
        self.steps += 1;
        self.reporter.report(Progress::TaskAdvance {
            time: self.current_time,
        });
        Ok(())
    }

    fn terminate(&mut self) -> Result<(), EngineError> {
        if self.steps > 0 {
            self.check_output(self.config.time_step, true)?;
        }
        self.sink.flush()?;
        self.state = IntegratorState::Terminated;
        info!(
            "Finished {} steps ({:.4} ps).",
            self.steps, self.current_time
        );
        Ok(())
    }

    fn initialize_velocities(&mut self) {
        let desired = self.config.desired_temperature;
        if desired <= 0.0 {
            return;
        }
        let sigma_base = (2.0 * GAS_CONSTANT * desired / 3.0).sqrt();
        for atom in self.molecule.atoms_mut() {
            if atom.mass <= 0.0 {
                continue;
            }
            let sigma = sigma_base / atom.mass.sqrt();
            for axis in 0..3 {
                let z: f64 = self.rng.sample(StandardNormal);
                atom.velocity[axis] = sigma * z;
            }
        }

        self.molecule.calculate_energy(KineticMode::Current);
        let temperature = self.molecule.calculate_temperature();
        if temperature > 0.0 {
            let scale = (desired / temperature).sqrt();
            for atom in self.molecule.atoms_mut() {
                atom.velocity *= scale;
            }
        }
        debug!("Drew initial velocities at {:.2} K before rescaling.", temperature);
    }

    fn update_accelerations(&mut self) {
        let gradient = self.molecule.gradient().to_vec();
        for (atom, g) in self.molecule.atoms_mut().iter_mut().zip(gradient) {
            atom.previous_acceleration = atom.acceleration;
            atom.acceleration = if atom.mass > 0.0 {
                -ACCELERATION_CONVERSION * g / atom.mass
            } else {
                Vector3::zeros()
            };
        }
    }

    fn kick(&mut self, dt: f64) {
        for atom in self.molecule.atoms_mut() {
            atom.previous_velocity = atom.velocity;
            atom.velocity += atom.acceleration * dt;
        }
    }

    fn drift(&mut self, dt: f64) {
        for atom in self.molecule.atoms_mut() {
            atom.position += atom.velocity * dt;
        }
        self.molecule.update_internals();
    }

    fn check_output(&mut self, time_step: f64, force: bool) -> Result<(), EngineError> {
        if force || self.energy_timer >= self.config.energy_wait_time {
            self.sink
                .write_energy(self.current_time, self.molecule.energies())?;
            self.energy_timer = TIMER_RESET;
        }
        if force || self.geometry_timer >= self.config.geometry_wait_time {
            self.sink
                .write_frame(self.current_time, self.molecule.atoms())?;
            self.geometry_timer = TIMER_RESET;
        }
        if force || self.last_status.elapsed().as_secs_f64() > self.config.status_wait_time {
            self.report_status()?;
            self.last_status = Instant::now();
        }
        self.energy_timer += time_step;
        self.geometry_timer += time_step;
        Ok(())
    }

    fn report_status(&mut self) -> Result<(), EngineError> {
        let total_energy = self.molecule.energies().total();
        let temperature = self.molecule.temperature();
        info!(
            "{:.4}/{:.4} ps, T = {:.2} K, E = {:.4} kcal/mol",
            self.current_time, self.config.total_time, temperature, total_energy
        );
        self.reporter.report(Progress::Status {
            time: self.current_time,
            total_time: self.config.total_time,
            temperature,
            total_energy,
        });
        self.sink.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::forcefield::params::ForceField;
    use crate::core::io::fixtures::ethane;
    use crate::engine::config::BackendKind;
    use crate::engine::output::MemorySink;
    use crate::engine::state::MolecularState;
    use std::path::PathBuf;

    const TOLERANCE: f64 = 1e-9;
    const DT: f64 = 0.0009765625;

    fn f64_approx_equal(a: f64, b: f64) -> bool {
        (a - b).abs() < TOLERANCE
    }

    fn config(total_time: f64, seed: u64) -> SimulationConfig {
        SimulationConfig::builder()
            .input_path(PathBuf::from("ethane.pqr"))
            .total_time(total_time)
            .time_step(DT)
            .energy_wait_time(2.0 * DT)
            .geometry_wait_time(2.0 * DT)
            .status_wait_time(3600.0)
            .random_seed(seed)
            .backend(BackendKind::Scalar)
            .build()
            .unwrap()
    }

    fn dynamics(config: SimulationConfig) -> MolecularDynamics<'static, MolecularState, MemorySink> {
        let state = MolecularState::from_system(ethane(), &ForceField::new(), config.state.clone());
        MolecularDynamics::new(state, MemorySink::new(), config)
    }

    #[test]
    fn zero_total_time_initializes_and_terminates_without_steps() {
        let mut md = dynamics(config(0.0, 1));
        let start: Vec<_> = md.molecule().atoms().iter().map(|a| a.position).collect();
        let summary = md.run().unwrap();

        assert_eq!(summary.steps, 0);
        assert_eq!(summary.simulated_time, 0.0);
        assert_eq!(md.state(), IntegratorState::Terminated);
        let sink = md.sink();
        assert_eq!(sink.energies.len(), 1);
        assert_eq!(sink.frames.len(), 1);
        assert_eq!(sink.frames[0].1, start);
        assert!(sink.flush_count >= 1);
        assert_eq!(sink.header.len(), 18);
    }

    #[test]
    fn initialization_rescales_to_desired_temperature() {
        let mut md = dynamics(config(0.0, 5));
        md.initialize().unwrap();
        assert!((md.molecule().temperature() - 298.15).abs() < 1e-6);
        assert_eq!(md.state(), IntegratorState::Initialized);
    }

    #[test]
    fn zero_desired_temperature_keeps_atoms_at_rest() {
        let mut cfg = config(0.0, 5);
        cfg.desired_temperature = 0.0;
        let mut md = dynamics(cfg);
        md.initialize().unwrap();
        assert_eq!(md.molecule().temperature(), 0.0);
        assert!(md.molecule().atoms().iter().all(|a| a.velocity == Vector3::zeros()));
    }

    #[test]
    fn short_run_steps_and_gates_output() {
        let mut md = dynamics(config(4.0 * DT, 7));
        let summary = md.run().unwrap();

        assert_eq!(summary.steps, 4);
        assert!(f64_approx_equal(summary.simulated_time, 4.0 * DT));
        // Initial output, one gated write at step three, and the final forced write.
        assert_eq!(md.sink().energies.len(), 3);
        assert_eq!(md.sink().frames.len(), 3);
        assert!(summary.energies.total().is_finite());
        assert!(summary.temperature > 0.0);
    }

    #[test]
    fn same_seed_reproduces_trajectory() {
        let mut first = dynamics(config(3.0 * DT, 42));
        let mut second = dynamics(config(3.0 * DT, 42));
        first.run().unwrap();
        second.run().unwrap();
        assert_eq!(first.sink().frames, second.sink().frames);

        let mut other = dynamics(config(3.0 * DT, 43));
        other.run().unwrap();
        assert_ne!(first.sink().frames, other.sink().frames);
    }

    #[test]
    fn lifecycle_rejects_out_of_order_calls() {
        let mut md = dynamics(config(0.0, 1));
        assert!(matches!(
            md.step(),
            Err(EngineError::InvalidState {
                state: IntegratorState::Uninitialized,
                ..
            })
        ));
        md.run().unwrap();
        assert!(matches!(md.run(), Err(EngineError::InvalidState { .. })));
        assert!(matches!(md.initialize(), Err(EngineError::InvalidState { .. })));
    }

    #[test]
    fn equilibration_applies_thermostat_during_window() {
        let mut cfg = config(2.0 * DT, 9);
        cfg.equilibration_time = 10.0 * DT;
        let mut md = dynamics(cfg);
        md.run().unwrap();
        assert!(md.thermostat().estimate() != 298.15);
    }

    #[test]
    fn thermostat_is_idempotent_at_zero_time_step() {
        let mut atoms = vec![Atom::new(1, "CT", nalgebra::Point3::origin())];
        atoms[0].velocity = Vector3::new(1.0, -2.0, 0.5);
        let mut thermostat = Thermostat::new(300.0, 2.0);
        thermostat.apply(&mut atoms, 150.0, 0.0);
        thermostat.apply(&mut atoms, 150.0, 0.0);
        assert_eq!(atoms[0].velocity, Vector3::new(1.0, -2.0, 0.5));
        assert_eq!(thermostat.estimate(), 300.0);
    }

    #[test]
    fn thermostat_heats_a_cold_system() {
        let mut thermostat = Thermostat::new(300.0, 0.0);
        let scale = thermostat.update(100.0, 0.1);
        assert!(f64_approx_equal(thermostat.estimate(), (300.0 + 100.0) / 2.0));
        assert!(f64_approx_equal(scale, (300.0f64 / 200.0).sqrt()));
    }

    #[test]
    fn thermostat_is_a_no_op_without_target() {
        let mut thermostat = Thermostat::new(0.0, 1.0);
        assert_eq!(thermostat.update(100.0, 0.1), 1.0);
    }
}
