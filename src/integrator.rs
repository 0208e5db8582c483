// Integrator - Contract between the simulation core and a gravity engine
// The core owns handles only; every body and the clock live in the engine

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::IntegratorError;
use crate::physics_engine::{Body, BodyHandle, OrbitalElements, StateVector};

/// A gravitational integration engine.
///
/// `Clone` must produce a deep copy: the clone owns its bodies and clock and
/// shares nothing mutable with the original. Prediction relies on this.
/// The serde bounds let the persistence gateway store the engine as part of
/// a simulation.
pub trait Integrator: Clone + Serialize + DeserializeOwned {
    /// Current absolute simulation time.
    fn time(&self) -> f64;

    /// All bodies, in insertion order.
    fn bodies(&self) -> &[Body];

    fn body_mut(&mut self, handle: BodyHandle) -> Option<&mut Body>;

    fn body(&self, handle: BodyHandle) -> Option<&Body> {
        self.bodies().iter().find(|b| b.handle == handle)
    }

    /// Create a body with the given mass and Cartesian state.
    fn add_body(&mut self, mass: f64, state: StateVector) -> Result<BodyHandle, IntegratorError>;

    /// Create a body from osculating elements relative to `primary`'s
    /// current state.
    fn add_from_elements(
        &mut self,
        mass: f64,
        elements: &OrbitalElements,
        primary: BodyHandle,
    ) -> Result<BodyHandle, IntegratorError>;

    /// Advance every body to the absolute time `time`.
    ///
    /// On error the engine may be left partially advanced.
    fn integrate(&mut self, time: f64) -> Result<(), IntegratorError>;
}
