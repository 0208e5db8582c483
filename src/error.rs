// Errors - Simulation, storage and integrator failures
// Every core operation returns these synchronously to its caller

use thiserror::Error;

use crate::physics_engine::BodyHandle;

/// Failures raised by the gravitational integration engine.
///
/// The simulation core never inspects these; they travel to the caller
/// unchanged inside [`SimError::Integrator`].
#[derive(Debug, Error)]
pub enum IntegratorError {
    #[error("Invalid body: {reason}")]
    InvalidBody { reason: String },

    #[error("Invalid orbital elements: {reason}")]
    InvalidElements { reason: String },

    #[error("Cannot integrate to non-finite time {time}")]
    NonFiniteTime { time: f64 },

    #[error("Integration diverged at t = {time}")]
    Diverged { time: f64 },
}

#[derive(Debug, Error)]
pub enum SimError {
    // -- catalog invariants --
    #[error("Primary already exists")]
    PrimaryAlreadyExists,

    #[error("Primary particle must be set before adding particles with orbital elements")]
    NoPrimary,

    #[error("Label '{label}' is already in use")]
    DuplicateLabel { label: String },

    #[error("Handle {handle} is already registered")]
    HandleInUse { handle: BodyHandle },

    // -- lookups --
    #[error("Unknown body label '{label}'")]
    UnknownLabel { label: String },

    #[error("Unknown body handle {handle}")]
    UnknownHandle { handle: BodyHandle },

    // -- storage --
    #[error("Unnamed simulations cannot be persisted")]
    NoName,

    #[error("Invalid simulation name '{name}'")]
    InvalidName { name: String },

    #[error("Simulation '{name}' not found")]
    NotFound { name: String },

    #[error("Unsupported save format version {found} (expected {expected})")]
    UnsupportedFormat { found: u32, expected: u32 },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    // -- configuration --
    #[error("Invalid configuration value for {key}: '{value}'")]
    Config { key: String, value: String },

    #[error(transparent)]
    Integrator(#[from] IntegratorError),
}

pub type SimResult<T> = Result<T, SimError>;
