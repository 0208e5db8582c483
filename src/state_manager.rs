// State Manager - Session state and request commands
// Holds the live simulation and maps each request onto one core operation

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, warn};

use crate::config::SimulatorConfig;
use crate::error::{SimError, SimResult};
use crate::integrator::Integrator;
use crate::physics_engine::OrbitalElements;
use crate::prediction::{SampleTimes, Trajectory};
use crate::simulation::{BodyUpdate, PartialState, Simulation, StateReport};
use crate::storage::SimulationStore;

// =============================================================================
// SESSION STATE
// =============================================================================

/// The one live simulation of a service plus what it needs to persist it.
///
/// Passed explicitly to every command; nothing here is global.
pub struct AppState {
    pub simulation: Arc<RwLock<Simulation>>,
    pub store: SimulationStore,
    pub config: SimulatorConfig,
}

impl AppState {
    /// Starts with an unnamed, empty simulation.
    pub fn new(config: SimulatorConfig) -> Self {
        Self {
            simulation: Arc::new(RwLock::new(Simulation::with_config(
                "",
                config.integrator.clone(),
            ))),
            store: SimulationStore::new(config.storage_root.clone()),
            config,
        }
    }

    pub fn from_env() -> SimResult<Self> {
        Ok(Self::new(SimulatorConfig::from_env()?))
    }

    /// Save after a successful mutation; unnamed sessions live in memory only.
    ///
    /// The mutation has already happened when this runs, so a failed save
    /// leaves the session ahead of its slot and the message says so.
    fn persist(&self, simulation: &Simulation) -> Result<(), String> {
        if !simulation.is_named() {
            debug!("unnamed simulation, skipping save");
            return Ok(());
        }
        self.store.save(simulation).map_err(|err| {
            warn!(simulation = simulation.name(), error = %err, "save failed after mutation");
            format!(
                "Change applied in memory but simulation {} was not saved: {err}",
                simulation.name()
            )
        })
    }

    /// Rejects a request whose integration would take more engine steps
    /// than `max_integration_steps`.
    fn check_step_budget(&self, steps: f64) -> Result<(), String> {
        let limit = self.config.max_integration_steps;
        if steps > limit as f64 {
            return Err(format!(
                "Request needs about {steps:.0} integration steps, limit is {limit}"
            ));
        }
        Ok(())
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new(SimulatorConfig::default())
    }
}

// =============================================================================
// REQUESTS
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulationRequest {
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PrimaryRequest {
    #[serde(rename = "hash")]
    pub label: String,
    #[serde(rename = "m")]
    pub mass: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BodyRequest {
    #[serde(rename = "hash")]
    pub label: String,
    #[serde(rename = "m")]
    pub mass: f64,
    #[serde(flatten)]
    pub state: PartialState,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrbitalElementsRequest {
    #[serde(rename = "hash")]
    pub label: String,
    #[serde(rename = "m")]
    pub mass: f64,
    #[serde(rename = "P")]
    pub period: f64,
    #[serde(rename = "e")]
    pub eccentricity: f64,
    #[serde(rename = "M")]
    pub mean_anomaly: f64,
    #[serde(rename = "a", default)]
    pub semi_major_axis: Option<f64>,
    #[serde(rename = "inc", default)]
    pub inclination: Option<f64>,
    #[serde(rename = "omega", default)]
    pub argument_periapsis: Option<f64>,
    #[serde(rename = "Omega", default)]
    pub longitude_ascending_node: Option<f64>,
}

impl OrbitalElementsRequest {
    pub fn elements(&self) -> OrbitalElements {
        OrbitalElements {
            period: self.period,
            eccentricity: self.eccentricity,
            mean_anomaly: self.mean_anomaly,
            semi_major_axis: self.semi_major_axis,
            inclination: self.inclination,
            argument_periapsis: self.argument_periapsis,
            longitude_ascending_node: self.longitude_ascending_node,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BodyUpdateRequest {
    #[serde(rename = "hash")]
    pub label: String,
    #[serde(rename = "m", default)]
    pub mass: Option<f64>,
    #[serde(flatten)]
    pub state: PartialState,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimeRequest {
    pub time: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PredictionRequest {
    pub time: f64,
    #[serde(default)]
    pub target: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrajectoryRequest {
    pub end_time: f64,
    pub time_step: f64,
    #[serde(default)]
    pub target: Option<String>,
}

// =============================================================================
// RESPONSES
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CommandResponse {
    pub status: String,
    pub message: String,
}

impl CommandResponse {
    fn success(message: String) -> Self {
        Self {
            status: "success".to_string(),
            message,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BodySummary {
    pub label: String,
    pub mass: f64,
    pub position: [f64; 3], // m
    pub velocity: [f64; 3], // m/s
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulationSummary {
    pub name: String,
    pub time: f64,
    pub primary: Option<String>,
    pub bodies: Vec<BodySummary>,
    pub total_energy: f64,
}

impl Simulation {
    pub fn to_summary(&self) -> SimResult<SimulationSummary> {
        let bodies = self
            .engine()
            .bodies()
            .iter()
            .map(|b| {
                Ok(BodySummary {
                    label: self.registry().resolve(b.handle)?.to_string(),
                    mass: b.mass,
                    position: b.state.position.to_array(),
                    velocity: b.state.velocity.to_array(),
                })
            })
            .collect::<SimResult<Vec<_>>>()?;

        Ok(SimulationSummary {
            name: self.name().to_string(),
            time: self.time(),
            primary: self.primary_label().map(str::to_string),
            bodies,
            total_energy: self.total_energy(),
        })
    }
}

// =============================================================================
// VALIDATION
// =============================================================================

fn check_label(label: &str) -> Result<(), String> {
    if label.trim().is_empty() {
        return Err("Body label cannot be empty".to_string());
    }
    Ok(())
}

fn check_mass(mass: f64) -> Result<(), String> {
    if !(mass.is_finite() && mass >= 0.0) {
        return Err(format!("Mass must be finite and non-negative, got {mass}"));
    }
    Ok(())
}

fn check_finite(field: &str, value: f64) -> Result<(), String> {
    if !value.is_finite() {
        return Err(format!("{field} must be finite, got {value}"));
    }
    Ok(())
}

fn check_state(state: &PartialState) -> Result<(), String> {
    let fields = [
        ("x", state.x),
        ("y", state.y),
        ("z", state.z),
        ("vx", state.vx),
        ("vy", state.vy),
        ("vz", state.vz),
    ];
    for (field, value) in fields {
        if let Some(value) = value {
            check_finite(field, value)?;
        }
    }
    Ok(())
}

fn message(err: SimError) -> String {
    err.to_string()
}

// =============================================================================
// COMMANDS
// =============================================================================

pub fn create_simulation(
    state: &AppState,
    request: SimulationRequest,
) -> Result<CommandResponse, String> {
    let simulation = state
        .store
        .create(&request.name, state.config.integrator.clone())
        .map_err(message)?;
    *state.simulation.write() = simulation;

    Ok(CommandResponse::success(format!(
        "Simulation {} created",
        request.name
    )))
}

pub fn load_simulation(
    state: &AppState,
    request: SimulationRequest,
) -> Result<CommandResponse, String> {
    let simulation = state.store.load(&request.name).map_err(message)?;
    *state.simulation.write() = simulation;

    Ok(CommandResponse::success(format!(
        "Simulation {} loaded",
        request.name
    )))
}

pub fn add_primary(state: &AppState, request: PrimaryRequest) -> Result<CommandResponse, String> {
    check_label(&request.label)?;
    check_mass(request.mass)?;

    let mut sim = state.simulation.write();
    sim.add_primary(request.mass, &request.label)
        .map_err(message)?;
    state.persist(&sim)?;

    Ok(CommandResponse::success(format!("{} added", request.label)))
}

pub fn add_object(state: &AppState, request: BodyRequest) -> Result<CommandResponse, String> {
    check_label(&request.label)?;
    check_mass(request.mass)?;
    check_state(&request.state)?;

    let mut sim = state.simulation.write();
    sim.add_body(request.mass, &request.label, &request.state)
        .map_err(message)?;
    state.persist(&sim)?;

    Ok(CommandResponse::success(format!("{} added", request.label)))
}

pub fn add_from_orbital_elements(
    state: &AppState,
    request: OrbitalElementsRequest,
) -> Result<CommandResponse, String> {
    check_label(&request.label)?;
    check_mass(request.mass)?;
    check_finite("P", request.period)?;
    check_finite("e", request.eccentricity)?;
    check_finite("M", request.mean_anomaly)?;

    let mut sim = state.simulation.write();
    sim.add_body_from_elements(request.mass, &request.label, &request.elements())
        .map_err(message)?;
    state.persist(&sim)?;

    Ok(CommandResponse::success(format!("{} added", request.label)))
}

pub fn update_object(
    state: &AppState,
    request: BodyUpdateRequest,
) -> Result<CommandResponse, String> {
    check_label(&request.label)?;
    if let Some(mass) = request.mass {
        check_mass(mass)?;
    }
    check_state(&request.state)?;

    let update = BodyUpdate {
        mass: request.mass,
        state: request.state,
    };
    let mut sim = state.simulation.write();
    sim.update_body(&request.label, &update).map_err(message)?;
    state.persist(&sim)?;

    Ok(CommandResponse::success(format!("{} updated", request.label)))
}

pub fn integrate(state: &AppState, request: TimeRequest) -> Result<CommandResponse, String> {
    check_finite("time", request.time)?;

    let mut sim = state.simulation.write();
    state.check_step_budget(sim.engine().steps_to(request.time))?;
    sim.integrate(request.time).map_err(message)?;
    state.persist(&sim)?;

    Ok(CommandResponse::success(format!(
        "Simulation {} integrated to {}",
        sim.name(),
        request.time
    )))
}

pub fn get_prediction(state: &AppState, request: PredictionRequest) -> Result<StateReport, String> {
    check_finite("time", request.time)?;

    let sim = state.simulation.read();
    state.check_step_budget(sim.engine().steps_to(request.time))?;
    sim.predict(request.time, request.target.as_deref())
        .map_err(message)
}

pub fn get_trajectory(state: &AppState, request: TrajectoryRequest) -> Result<Trajectory, String> {
    check_finite("end_time", request.end_time)?;
    check_finite("time_step", request.time_step)?;

    let sim = state.simulation.read();
    let samples = SampleTimes::new(sim.time(), request.end_time, request.time_step).estimated_len();
    let limit = state.config.max_trajectory_samples;
    if samples > limit {
        return Err(format!(
            "Trajectory would produce {samples} samples, limit is {limit}"
        ));
    }
    // Each sample can add one shortened step on top of the full span
    if samples > 0 {
        state.check_step_budget(sim.engine().steps_to(request.end_time) + samples as f64)?;
    }

    sim.trajectory(request.end_time, request.time_step, request.target.as_deref())
        .map_err(message)
}

pub fn get_simulation_state(state: &AppState) -> Result<SimulationSummary, String> {
    state.simulation.read().to_summary().map_err(message)
}

pub fn list_simulations(state: &AppState) -> Result<Vec<String>, String> {
    state.store.list().map_err(message)
}

// =============================================================================
// TESTS
// =============================================================================
