//! Command engine
//!
//! [`Simulator`] is the state machine behind the Tello command surface. Every flight command
//! checks its preconditions and arguments first, then updates the [`FlightState`], appends to the
//! [`CommandLog`] and finally asks the renderer to redraw. A rejected command changes nothing.
use std::path::Path;

use crate::command::{require_integer, require_valid_flip_direction, Argument, CommandRecord};
use crate::command_log::CommandLog;
use crate::config::{DriverConfig, SimulatorConfig};
use crate::driver::{DriverAdapter, DriverConnector, TelloConnector};
use crate::geometry::{translate, BACK_OFFSET, FORWARD_OFFSET, LEFT_OFFSET, RIGHT_OFFSET};
use crate::render::FlightRenderer;
use crate::state::{FlightMode, FlightState};
use crate::SimulationError;

/// Name of the implicit command that puts the drone into SDK mode
pub const ENTER_COMMAND_MODE: &str = "command";

/// Check that a record carries exactly `N` arguments
fn expect_arguments<const N: usize>(
    record: &CommandRecord,
) -> Result<&[Argument; N], SimulationError> {
    record.arguments.as_slice().try_into().map_err(|_| {
        SimulationError::MalformedCommand(format!(
            "`{}` expects {} argument(s), got {}",
            record.command,
            N,
            record.arguments.len()
        ))
    })
}

/// A dry-run session for one drone
/// # Example
/// ```
/// use tello_sim::{config::SimulatorConfig, render::NullRenderer, Simulator, SimulationError};
/// let mut drone = Simulator::new(SimulatorConfig::default(), Box::new(NullRenderer))?;
/// assert!(drone.forward(100).is_err()); // must take off first
/// drone.takeoff()?;
/// drone.forward(100)?;
/// assert_eq!(drone.log().serialized(), vec!["command", "takeoff", "forward 100"]);
/// # Ok::<(), SimulationError>(())
/// ```
pub struct Simulator {
    config: SimulatorConfig,
    state: FlightState,
    log: CommandLog,
    error_bar_width: i64,
    renderer: Box<dyn FlightRenderer>,
    connector: Box<dyn DriverConnector>,
    driver: Option<Box<dyn DriverAdapter>>,
}

impl Simulator {
    /// Create a grounded session and enter command mode
    /// The session deploys to a Tello at the default address unless
    /// [`Simulator::with_connector`] is used.
    /// # Arguments
    /// * `config` - Simulator configuration
    /// * `renderer` - Where the flight plots go
    /// # Errors
    /// * `InvalidArgument` if the takeoff altitude is not positive or the error bar width is negative
    pub fn new(
        config: SimulatorConfig,
        renderer: Box<dyn FlightRenderer>,
    ) -> Result<Self, SimulationError> {
        if config.takeoff_altitude <= 0 {
            return Err(SimulationError::InvalidArgument(format!(
                "takeoff altitude must be positive, got {}",
                config.takeoff_altitude
            )));
        }
        let mut simulator = Self {
            error_bar_width: 0,
            config,
            state: FlightState::new(),
            log: CommandLog::new(),
            renderer,
            connector: Box::new(TelloConnector::new(DriverConfig::default())),
            driver: None,
        };
        simulator.set_error_bar_width(simulator.config.error_bar_width)?;
        simulator.command();
        Ok(simulator)
    }

    /// Replace the connector used by [`Simulator::deploy`]
    pub fn with_connector(mut self, connector: Box<dyn DriverConnector>) -> Self {
        self.connector = connector;
        self.driver = None;
        self
    }

    pub fn state(&self) -> &FlightState {
        &self.state
    }

    pub fn log(&self) -> &CommandLog {
        &self.log
    }

    pub fn mode(&self) -> FlightMode {
        self.state.mode()
    }

    pub fn error_bar_width(&self) -> i64 {
        self.error_bar_width
    }

    /// Set the width of the uncertainty band drawn by the renderer
    /// # Errors
    /// * `InvalidArgument` if the width is not a non-negative whole number
    pub fn set_error_bar_width(
        &mut self,
        width: impl Into<Argument>,
    ) -> Result<(), SimulationError> {
        let width = require_integer("error bar width", &width.into())?;
        if width < 0 {
            return Err(SimulationError::InvalidArgument(format!(
                "error bar width must not be negative, got {width}"
            )));
        }
        self.error_bar_width = width;
        Ok(())
    }

    /// Append a validated command to the log and wait out the pacing delay
    fn send_command(&mut self, command: &str, arguments: Vec<Argument>) {
        self.log.record(command, arguments);
        if let Some(record) = self.log.last() {
            log::info!("I am running your \"{}\" command.", record);
        }
        let delay = self.config.command_delay();
        if !delay.is_zero() {
            std::thread::sleep(delay);
        }
    }

    fn render_path(&mut self) {
        if let Err(e) = self.renderer.render_path(
            &self.state.path_history,
            &self.state.flip_history,
            self.state.bearing,
            self.error_bar_width,
        ) {
            log::warn!("Failed to render the flight path: {e}");
        }
    }

    fn render_altitude(&mut self) {
        if let Err(e) = self
            .renderer
            .render_altitude(&self.state.altitude_history, self.error_bar_width)
        {
            log::warn!("Failed to render the altitude profile: {e}");
        }
    }

    /// Enter command mode, fired on construction and reset
    pub fn command(&mut self) {
        log::info!("Hi! My name is TelloSim and I am your training drone.");
        log::info!("I help you try out your flight plan before sending it to a real Tello.");
        log::info!("I am now ready to take off.");
        self.send_command(ENTER_COMMAND_MODE, vec![]);
    }

    /// Take off to the configured takeoff altitude
    /// Taking off while already airborne only reports the current altitude.
    pub fn takeoff(&mut self) -> Result<(), SimulationError> {
        if self.state.is_airborne() {
            log::info!(
                "My current altitude is {} centimeters, so I can't takeoff again!",
                self.state.altitude
            );
            return Ok(());
        }
        log::info!("Get ready for takeoff!");
        self.state.set_altitude(self.config.takeoff_altitude);
        self.send_command("takeoff", vec![]);
        log::info!(
            "My estimated takeoff altitude is {} centimeters",
            self.state.altitude
        );
        Ok(())
    }

    /// Land and draw the flight
    /// # Errors
    /// * `Precondition` if the drone is grounded
    pub fn land(&mut self) -> Result<(), SimulationError> {
        self.state.require_airborne()?;
        log::info!("Get ready for landing!");
        self.state.set_altitude(0);
        self.send_command("land", vec![]);
        log::info!("Here are the graphs of your flight! I can't wait to try this for real.");
        self.render_path();
        self.render_altitude();
        Ok(())
    }

    fn climb(&mut self, command: &str, sign: i64, dist: Argument) -> Result<(), SimulationError> {
        self.state.require_airborne()?;
        let dist = require_integer("dist", &dist)?;
        let altitude = dist
            .checked_mul(sign)
            .and_then(|delta| self.state.altitude.checked_add(delta))
            .ok_or_else(|| {
                SimulationError::InvalidArgument(format!(
                    "I can't {command} {dist} centimeters from an altitude of {} centimeters",
                    self.state.altitude
                ))
            })?;
        log::info!("My current bearing is {} degrees.", self.state.bearing);
        self.state.set_altitude(altitude);
        if self.state.altitude <= 0 {
            log::warn!(
                "I am now {} centimeters above my takeoff altitude.",
                self.state.altitude
            );
        }
        self.send_command(command, vec![Argument::Int(dist)]);
        self.render_altitude();
        Ok(())
    }

    /// Fly up `dist` centimeters
    /// # Errors
    /// * `Precondition` if the drone is grounded
    /// * `InvalidArgument` if `dist` is not a whole number
    /// # Example
    /// ```
    /// use tello_sim::{config::SimulatorConfig, render::NullRenderer, Simulator, SimulationError};
    /// let mut drone = Simulator::new(SimulatorConfig::default(), Box::new(NullRenderer))?;
    /// drone.takeoff()?;
    /// assert!(matches!(drone.up(10.5), Err(SimulationError::InvalidArgument(_))));
    /// drone.up(10)?;
    /// assert_eq!(drone.state().altitude, 91);
    /// # Ok::<(), SimulationError>(())
    /// ```
    pub fn up(&mut self, dist: impl Into<Argument>) -> Result<(), SimulationError> {
        self.climb("up", 1, dist.into())
    }

    /// Fly down `dist` centimeters
    pub fn down(&mut self, dist: impl Into<Argument>) -> Result<(), SimulationError> {
        self.climb("down", -1, dist.into())
    }

    fn fly(&mut self, command: &str, offset: i64, dist: Argument) -> Result<(), SimulationError> {
        self.state.require_airborne()?;
        let dist = require_integer("dist", &dist)?;
        log::info!("My current bearing is {} degrees.", self.state.bearing);
        let position = translate(
            self.state.position,
            (self.state.bearing + offset) as f64,
            dist as f64,
        );
        self.state.move_to(position);
        log::debug!("Path so far: {:?}", self.state.path_history);
        self.send_command(command, vec![Argument::Int(dist)]);
        self.render_path();
        Ok(())
    }

    /// Fly `dist` centimeters along the current heading
    /// # Errors
    /// * `Precondition` if the drone is grounded
    /// * `InvalidArgument` if `dist` is not a whole number
    pub fn forward(&mut self, dist: impl Into<Argument>) -> Result<(), SimulationError> {
        self.fly("forward", FORWARD_OFFSET, dist.into())
    }

    /// Fly `dist` centimeters opposite to the current heading
    pub fn back(&mut self, dist: impl Into<Argument>) -> Result<(), SimulationError> {
        self.fly("back", BACK_OFFSET, dist.into())
    }

    /// Fly `dist` centimeters to the left of the current heading
    pub fn left(&mut self, dist: impl Into<Argument>) -> Result<(), SimulationError> {
        self.fly("left", LEFT_OFFSET, dist.into())
    }

    /// Fly `dist` centimeters to the right of the current heading
    pub fn right(&mut self, dist: impl Into<Argument>) -> Result<(), SimulationError> {
        self.fly("right", RIGHT_OFFSET, dist.into())
    }

    fn rotate(&mut self, command: &str, sign: i64, degr: Argument) -> Result<(), SimulationError> {
        self.state.require_airborne()?;
        let degr = require_integer("degr", &degr)?;
        log::info!("My current bearing is {} degrees.", self.state.bearing);
        // Only the rotation is reduced modulo 360, the bearing keeps accumulating
        self.state.bearing += sign * degr.rem_euclid(360);
        self.send_command(command, vec![Argument::Int(degr)]);
        log::info!("My new bearing is {} degrees.", self.state.bearing);
        Ok(())
    }

    /// Rotate clockwise by `degr` degrees
    /// # Errors
    /// * `Precondition` if the drone is grounded
    /// * `InvalidArgument` if `degr` is not a whole number
    /// # Example
    /// ```
    /// use tello_sim::{config::SimulatorConfig, render::NullRenderer, Simulator, SimulationError};
    /// let mut drone = Simulator::new(SimulatorConfig::default(), Box::new(NullRenderer))?;
    /// drone.takeoff()?;
    /// for _ in 0..4 {
    ///     drone.cw(90)?;
    /// }
    /// assert_eq!(drone.state().bearing, 360);
    /// # Ok::<(), SimulationError>(())
    /// ```
    pub fn cw(&mut self, degr: impl Into<Argument>) -> Result<(), SimulationError> {
        self.rotate("cw", 1, degr.into())
    }

    /// Rotate counter clockwise by `degr` degrees
    pub fn ccw(&mut self, degr: impl Into<Argument>) -> Result<(), SimulationError> {
        self.rotate("ccw", -1, degr.into())
    }

    /// Flip in one of four directions: `f`orward, `b`ack, `r`ight or `l`eft
    /// The flip is recorded at the current position; position, heading and altitude are unchanged.
    /// # Errors
    /// * `Precondition` if the drone is grounded
    /// * `InvalidArgument` if the direction is not one of the four tokens
    pub fn flip(&mut self, direction: impl Into<Argument>) -> Result<(), SimulationError> {
        self.state.require_airborne()?;
        let direction = require_valid_flip_direction(&direction.into())?;
        self.send_command("flip", vec![direction.into()]);
        self.state.record_flip();
        self.render_path();
        Ok(())
    }

    /// Reset to a landed drone with an empty command log, then enter command mode again
    pub fn reset(&mut self) {
        log::info!("Resetting simulator state...");
        self.state = FlightState::new();
        self.log.clear();
        self.command();
    }

    /// Save the command log to a file
    /// The format is CSV for a `.csv` extension and JSON otherwise.
    /// # Errors
    /// * If the file cannot be written
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), SimulationError> {
        let path = path.as_ref();
        log::info!("Saving commands to {}", path.display());
        self.log.save(path)
    }

    /// Replace the session with the commands stored in a file
    /// The state and log are cleared, then every record is replayed as if issued live. The file
    /// carries its own `command` record. Replay stops at the first failing record and keeps
    /// whatever was applied before it.
    /// # Errors
    /// * If the file cannot be read or decoded
    /// * `MalformedCommand` for an unknown command or a wrong number or type of arguments
    /// * Any error the replayed command itself raises
    pub fn load(&mut self, path: impl AsRef<Path>) -> Result<(), SimulationError> {
        let path = path.as_ref();
        log::info!("Loading commands from {}", path.display());
        let records = CommandLog::read_file(path)?;
        self.state = FlightState::new();
        self.log.clear();
        self.replay(&records)
    }

    /// Apply records in order, stopping at the first error
    pub fn replay(&mut self, records: &[CommandRecord]) -> Result<(), SimulationError> {
        records.iter().try_for_each(|record| self.apply(record))
    }

    /// Invoke the operation a record names
    /// # Errors
    /// * `MalformedCommand` if the name is unknown or the argument count or type does not match
    /// # Example
    /// ```
    /// use tello_sim::{config::SimulatorConfig, render::NullRenderer};
    /// use tello_sim::{CommandRecord, Simulator, SimulationError};
    /// let mut drone = Simulator::new(SimulatorConfig::default(), Box::new(NullRenderer))?;
    /// drone.apply(&CommandRecord::parse("takeoff")?)?;
    /// drone.apply(&CommandRecord::parse("cw 90")?)?;
    /// assert_eq!(drone.state().bearing, 90);
    /// let err = drone.apply(&CommandRecord::parse("hover")?).unwrap_err();
    /// assert!(matches!(err, SimulationError::MalformedCommand(_)));
    /// # Ok::<(), SimulationError>(())
    /// ```
    pub fn apply(&mut self, record: &CommandRecord) -> Result<(), SimulationError> {
        match record.command.as_str() {
            ENTER_COMMAND_MODE => {
                expect_arguments::<0>(record)?;
                self.command();
                Ok(())
            }
            "takeoff" => {
                expect_arguments::<0>(record)?;
                self.takeoff()
            }
            "land" => {
                expect_arguments::<0>(record)?;
                self.land()
            }
            "up" | "down" | "forward" | "back" | "left" | "right" | "cw" | "ccw" | "flip" => {
                let [argument] = expect_arguments::<1>(record)?;
                let well_typed = match record.command.as_str() {
                    "flip" => matches!(argument, Argument::Text(_)),
                    _ => matches!(argument, Argument::Int(_)),
                };
                if !well_typed {
                    return Err(SimulationError::MalformedCommand(format!(
                        "`{}` cannot take {} as its argument",
                        record.command, argument
                    )));
                }
                let argument = argument.clone();
                match record.command.as_str() {
                    "up" => self.up(argument),
                    "down" => self.down(argument),
                    "forward" => self.forward(argument),
                    "back" => self.back(argument),
                    "left" => self.left(argument),
                    "right" => self.right(argument),
                    "cw" => self.cw(argument),
                    "ccw" => self.ccw(argument),
                    _ => self.flip(argument),
                }
            }
            other => Err(SimulationError::MalformedCommand(format!(
                "Unknown command: {other}"
            ))),
        }
    }

    /// Send the command log to a real drone
    /// The driver is connected on the first deployment and reused afterwards. Neither the flight
    /// state nor the command log is changed.
    /// # Errors
    /// * If the driver cannot connect or a command cannot be sent
    pub async fn deploy(&mut self) -> Result<(), SimulationError> {
        log::info!("Deploying your commands to a real Tello drone!");
        let driver = match self.driver.take() {
            Some(driver) => driver,
            None => self.connector.connect().await?,
        };
        let driver = self.driver.insert(driver);
        for record in self.log.entries() {
            driver.send(&record.serialize()).await?;
        }
        Ok(())
    }
}
