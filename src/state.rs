use nalgebra::Vector2;

use crate::SimulationError;

/// The two states of the command state machine
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FlightMode {
    /// Altitude is zero, only `takeoff` is accepted
    Grounded,
    /// Altitude is non-zero, all flight commands are accepted
    Airborne,
}

/// Represents the simulated state of the drone
/// # Example
/// ```
/// use tello_sim::{FlightMode, FlightState};
/// let state = FlightState::new();
/// assert_eq!(state.mode(), FlightMode::Grounded);
/// assert_eq!(state.path_history.len(), 1);
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct FlightState {
    /// Altitude above the takeoff point in centimeters, zero when landed
    pub altitude: i64,
    /// Position relative to the takeoff point in centimeters
    pub position: Vector2<f64>,
    /// Accumulated heading in degrees, clockwise from the takeoff heading, never wrapped
    pub bearing: i64,
    /// Altitude after each altitude-changing command
    pub altitude_history: Vec<i64>,
    /// Position after each horizontal move, starting at the origin
    pub path_history: Vec<Vector2<f64>>,
    /// Positions where a flip was performed
    pub flip_history: Vec<Vector2<f64>>,
}

impl Default for FlightState {
    fn default() -> Self {
        Self::new()
    }
}

impl FlightState {
    /// Create a landed state at the origin
    pub fn new() -> Self {
        Self {
            altitude: 0,
            position: Vector2::zeros(),
            bearing: 0,
            altitude_history: Vec::new(),
            path_history: vec![Vector2::zeros()],
            flip_history: Vec::new(),
        }
    }

    /// Current state machine mode, derived from the altitude
    pub fn mode(&self) -> FlightMode {
        if self.altitude == 0 {
            FlightMode::Grounded
        } else {
            FlightMode::Airborne
        }
    }

    pub fn is_airborne(&self) -> bool {
        self.mode() == FlightMode::Airborne
    }

    /// Check that the drone has taken off
    /// # Errors
    /// * `Precondition` if the drone is grounded
    /// # Example
    /// ```
    /// use tello_sim::FlightState;
    /// let mut state = FlightState::new();
    /// assert!(state.require_airborne().is_err());
    /// state.altitude = 81;
    /// assert!(state.require_airborne().is_ok());
    /// ```
    pub fn require_airborne(&self) -> Result<(), SimulationError> {
        if !self.is_airborne() {
            return Err(SimulationError::Precondition(
                "not airborne: I can't do that unless I take off first!".to_string(),
            ));
        }
        log::info!(
            "I am flying at {} centimeters above my takeoff altitude.",
            self.altitude
        );
        Ok(())
    }

    /// Record a new altitude
    pub(crate) fn set_altitude(&mut self, altitude: i64) {
        self.altitude = altitude;
        self.altitude_history.push(altitude);
    }

    /// Record a new horizontal position
    pub(crate) fn move_to(&mut self, position: Vector2<f64>) {
        self.position = position;
        self.path_history.push(position);
    }

    /// Record a flip at the current position
    pub(crate) fn record_flip(&mut self) {
        self.flip_history.push(self.position);
    }
}
