//! # Tello Dry-Run Simulator
//! This crate lets you try out a flight plan for a DJI Tello before sending it to a real drone.
//! Commands are validated against the simulated flight state, the resulting path, heading and
//! altitude are tracked, and every accepted command is kept in a replayable command log.
//! ## Features
//! - Airborne/grounded state machine with argument validation
//! - 2D path tracking from relative moves and rotations
//! - Command log persistence (JSON, or a flat CSV table) and replay
//! - Deployment of the command log to a real Tello over UDP
//! - Integration with the `rerun` crate for visualization
//! ## Example
//! ```
//! use tello_sim::{config::SimulatorConfig, render::NullRenderer, Simulator, SimulationError};
//! let mut drone = Simulator::new(SimulatorConfig::default(), Box::new(NullRenderer))?;
//! drone.takeoff()?;
//! drone.forward(130)?;
//! drone.ccw(90)?;
//! drone.forward(80)?;
//! drone.land()?;
//! assert_eq!(drone.state().bearing, -90);
//! # Ok::<(), SimulationError>(())
//! ```
pub mod command;
pub mod command_log;
pub mod config;
pub mod driver;
pub mod geometry;
pub mod render;
pub mod simulator;
pub mod state;

pub use command::{Argument, CommandRecord, FlipDirection};
pub use command_log::{CommandLog, LogFormat};
pub use simulator::Simulator;
pub use state::{FlightMode, FlightState};

#[derive(thiserror::Error, Debug)]
/// Represents errors that can occur while simulating or replaying commands
/// # Example
/// ```
/// use tello_sim::SimulationError;
/// let error = SimulationError::Precondition("not airborne".to_string());
/// assert_eq!(error.to_string(), "Precondition failed: not airborne");
/// ```
pub enum SimulationError {
    /// An airborne-only command was issued while grounded
    #[error("Precondition failed: {0}")]
    Precondition(String),
    /// A command argument is not a whole number or not an accepted token
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
    /// A replayed record names an unknown command or has the wrong arity
    #[error("Malformed command: {0}")]
    MalformedCommand(String),
    /// Error reading or writing a file
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    /// Error related to the JSON command log
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    /// Error related to the CSV command log
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    /// Error related to the YAML configuration
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
    /// Error talking to the real drone
    #[error("Driver error: {0}")]
    Driver(String),
    /// Error related to Rerun visualization
    #[error("Rerun error: {0}")]
    RerunError(#[from] rerun::RecordingStreamError),
    /// Other general errors
    #[error("Other error: {0}")]
    OtherError(String),
}
