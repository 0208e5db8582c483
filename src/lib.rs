// Orrery - Persistent named N-body simulations
// Library entry point: core model, prediction, storage and session commands

pub mod config;
pub mod error;
pub mod integrator;
pub mod physics_engine;
pub mod prediction;
pub mod registry;
pub mod simulation;
pub mod state_manager;
pub mod storage;

pub use config::SimulatorConfig;
pub use error::{IntegratorError, SimError, SimResult};
pub use integrator::Integrator;
pub use physics_engine::{
    Body, BodyHandle, IntegratorConfig, NBodyEngine, OrbitalElements, StateVector, Vector3,
};
pub use prediction::{SampleTimes, Trajectory, TrajectoryPoint};
pub use registry::IdentityRegistry;
pub use simulation::{BodyUpdate, Kinematics, PartialState, Simulation, StateReport};
pub use state_manager::AppState;
pub use storage::SimulationStore;
