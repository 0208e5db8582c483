// Simulation - Named aggregate of an engine and its body registry
// Body catalog invariants, in-place integration and snapshot copies

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{IntegratorError, SimError, SimResult};
use crate::integrator::Integrator;
use crate::physics_engine::{
    Body, BodyHandle, IntegratorConfig, NBodyEngine, OrbitalElements, StateVector, Vector3,
};
use crate::registry::IdentityRegistry;

// =============================================================================
// OPERATION INPUTS
// =============================================================================

/// Cartesian components supplied by a caller; omitted ones keep their
/// current value (or zero for a new body).
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq)]
pub struct PartialState {
    pub x: Option<f64>,
    pub y: Option<f64>,
    pub z: Option<f64>,
    pub vx: Option<f64>,
    pub vy: Option<f64>,
    pub vz: Option<f64>,
}

impl PartialState {
    pub fn from_vectors(position: Vector3, velocity: Vector3) -> Self {
        Self {
            x: Some(position.x),
            y: Some(position.y),
            z: Some(position.z),
            vx: Some(velocity.x),
            vy: Some(velocity.y),
            vz: Some(velocity.z),
        }
    }

    pub fn apply_to(&self, state: &mut StateVector) {
        let fields = [
            (self.x, &mut state.position.x),
            (self.y, &mut state.position.y),
            (self.z, &mut state.position.z),
            (self.vx, &mut state.velocity.x),
            (self.vy, &mut state.velocity.y),
            (self.vz, &mut state.velocity.z),
        ];
        for (value, slot) in fields {
            if let Some(value) = value {
                *slot = value;
            }
        }
    }

    pub fn to_state(&self) -> StateVector {
        let mut state = StateVector::zero();
        self.apply_to(&mut state);
        state
    }
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq)]
pub struct BodyUpdate {
    pub mass: Option<f64>,
    pub state: PartialState,
}

// =============================================================================
// REPORTS
// =============================================================================

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct Kinematics {
    pub position: Vector3,
    pub velocity: Vector3,
}

impl From<&StateVector> for Kinematics {
    fn from(state: &StateVector) -> Self {
        Self {
            position: state.position,
            velocity: state.velocity,
        }
    }
}

/// Body states at one clock value, keyed by label in catalog order.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StateReport {
    pub time: f64,
    pub bodies: IndexMap<String, Kinematics>,
}

// =============================================================================
// SIMULATION
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Simulation<E = NBodyEngine> {
    name: String,
    engine: E,
    registry: IdentityRegistry,
    primary: Option<BodyHandle>,
}

impl Simulation<NBodyEngine> {
    /// An empty simulation; an empty `name` makes it unnamed.
    pub fn new(name: impl Into<String>) -> Self {
        Self::with_engine(name, NBodyEngine::default())
    }

    pub fn with_config(name: impl Into<String>, config: IntegratorConfig) -> Self {
        Self::with_engine(name, NBodyEngine::new(config))
    }

    pub fn total_energy(&self) -> f64 {
        self.engine.total_energy()
    }
}

impl<E: Integrator> Simulation<E> {
    pub fn with_engine(name: impl Into<String>, engine: E) -> Self {
        Self {
            name: name.into(),
            engine,
            registry: IdentityRegistry::new(),
            primary: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_named(&self) -> bool {
        !self.name.is_empty()
    }

    pub fn time(&self) -> f64 {
        self.engine.time()
    }

    pub fn len(&self) -> usize {
        self.engine.bodies().len()
    }

    pub fn is_empty(&self) -> bool {
        self.engine.bodies().is_empty()
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    pub fn registry(&self) -> &IdentityRegistry {
        &self.registry
    }

    pub fn primary(&self) -> Option<BodyHandle> {
        self.primary
    }

    pub fn primary_label(&self) -> Option<&str> {
        self.primary
            .and_then(|handle| self.registry.resolve(handle).ok())
    }

    /// Independent snapshot: deep engine copy plus a copy of the registry.
    pub fn copy(&self) -> Self {
        self.clone()
    }

    pub fn body(&self, label: &str) -> SimResult<&Body> {
        let handle = self.registry.handle_of(label)?;
        self.engine
            .body(handle)
            .ok_or(SimError::UnknownHandle { handle })
    }

    /// Add the primary body at the engine's reference state.
    pub fn add_primary(&mut self, mass: f64, label: &str) -> SimResult<BodyHandle> {
        if self.primary.is_some() || !self.is_empty() {
            return Err(SimError::PrimaryAlreadyExists);
        }
        self.registry.ensure_available(label)?;

        let handle = self.engine.add_body(mass, StateVector::zero())?;
        self.registry.register(handle, label)?;
        self.primary = Some(handle);

        debug!(simulation = %self.name, label, %handle, mass, "added primary");
        Ok(handle)
    }

    pub fn add_body(&mut self, mass: f64, label: &str, state: &PartialState) -> SimResult<BodyHandle> {
        self.registry.ensure_available(label)?;

        let handle = self.engine.add_body(mass, state.to_state())?;
        self.registry.register(handle, label)?;

        debug!(simulation = %self.name, label, %handle, mass, "added body");
        Ok(handle)
    }

    /// Add a body from elements relative to the primary's current state.
    pub fn add_body_from_elements(
        &mut self,
        mass: f64,
        label: &str,
        elements: &OrbitalElements,
    ) -> SimResult<BodyHandle> {
        let primary = self.primary.ok_or(SimError::NoPrimary)?;
        self.registry.ensure_available(label)?;

        let handle = self.engine.add_from_elements(mass, elements, primary)?;
        self.registry.register(handle, label)?;

        debug!(simulation = %self.name, label, %handle, mass, "added body from orbital elements");
        Ok(handle)
    }

    /// Overwrite the supplied fields of an existing body.
    pub fn update_body(&mut self, label: &str, update: &BodyUpdate) -> SimResult<()> {
        let handle = self.registry.handle_of(label)?;
        let body = self
            .engine
            .body_mut(handle)
            .ok_or(SimError::UnknownHandle { handle })?;

        let mass = update.mass.unwrap_or(body.mass);
        let mut state = body.state;
        update.state.apply_to(&mut state);

        if !(mass.is_finite() && mass >= 0.0) {
            return Err(IntegratorError::InvalidBody {
                reason: format!("mass must be finite and non-negative, got {mass}"),
            }
            .into());
        }
        if !state.is_finite() {
            return Err(IntegratorError::InvalidBody {
                reason: "position and velocity must be finite".to_string(),
            }
            .into());
        }

        body.mass = mass;
        body.state = state;
        debug!(simulation = %self.name, label, "updated body");
        Ok(())
    }

    /// Advance the live simulation to `time` and report every body.
    pub fn integrate(&mut self, time: f64) -> SimResult<StateReport> {
        debug!(simulation = %self.name, from = self.time(), to = time, "integrating");
        self.engine.integrate(time)?;
        self.report()
    }

    /// Current state of every body, without integrating.
    pub fn report(&self) -> SimResult<StateReport> {
        let mut bodies = IndexMap::with_capacity(self.len());
        for body in self.engine.bodies() {
            let label = self.registry.resolve(body.handle)?;
            bodies.insert(label.to_string(), Kinematics::from(&body.state));
        }

        Ok(StateReport {
            time: self.time(),
            bodies,
        })
    }

    /// Current state of a single body.
    pub fn report_for(&self, label: &str) -> SimResult<StateReport> {
        let body = self.body(label)?;
        let mut bodies = IndexMap::with_capacity(1);
        bodies.insert(label.to_string(), Kinematics::from(&body.state));

        Ok(StateReport {
            time: self.time(),
            bodies,
        })
    }
}

// =============================================================================
// TESTS
// =============================================================================
