//! Configuration module
//!
//! This module contains the configuration for the simulator, the visualization and the driver
//! that relays the command log to a real Tello.
//! The configuration is loaded from a YAML file using the serde library. Every section falls back
//! to its defaults when missing.

use std::time::Duration;

#[derive(Clone, Debug, Default, serde::Deserialize)]
#[serde(default)]
/// Configuration for a simulator session
pub struct Config {
    /// Simulator configuration
    pub simulator: SimulatorConfig,
    /// Visualization configuration
    pub render: RenderConfig,
    /// Real drone driver configuration
    pub driver: DriverConfig,
}

#[derive(Clone, Debug, serde::Deserialize)]
#[serde(default)]
/// Configuration for the command engine
pub struct SimulatorConfig {
    /// Estimated altitude right after takeoff in centimeters
    pub takeoff_altitude: i64,
    /// Pause after each logged command in milliseconds, emulating transmission latency
    pub command_delay_ms: u64,
    /// Width of the uncertainty band drawn around the path and altitude plots in centimeters
    pub error_bar_width: i64,
}

impl Default for SimulatorConfig {
    fn default() -> Self {
        SimulatorConfig {
            takeoff_altitude: 81,
            command_delay_ms: 0,
            error_bar_width: 25,
        }
    }
}

impl SimulatorConfig {
    pub fn command_delay(&self) -> Duration {
        Duration::from_millis(self.command_delay_ms)
    }
}

#[derive(Clone, Debug, serde::Deserialize)]
#[serde(default)]
/// Configuration for the flight plots
pub struct RenderConfig {
    /// Use rerun.io for the plots, otherwise they are summarized in the log
    pub use_rerun: bool,
    /// Application id of the rerun recording
    pub recording_name: String,
}

impl Default for RenderConfig {
    fn default() -> Self {
        RenderConfig {
            use_rerun: false,
            recording_name: "tello_sim".to_string(),
        }
    }
}

#[derive(Clone, Debug, serde::Deserialize)]
#[serde(default)]
/// Configuration for the UDP link to a real Tello
pub struct DriverConfig {
    /// Address of the Tello command port
    pub tello_address: String,
    /// Local address the driver binds to, the Tello replies to this port
    pub local_address: String,
    /// How long to wait for the drone to acknowledge a command in milliseconds
    pub response_timeout_ms: u64,
}

impl Default for DriverConfig {
    fn default() -> Self {
        DriverConfig {
            tello_address: String::from("192.168.10.1:8889"),
            local_address: String::from("0.0.0.0:8889"),
            response_timeout_ms: 7000,
        }
    }
}

impl DriverConfig {
    pub fn response_timeout(&self) -> Duration {
        Duration::from_millis(self.response_timeout_ms)
    }
}

/// Implementation of the Config struct
impl Config {
    /// Load configuration from a YAML file.
    /// # Arguments
    /// * `filename` - The name of the file to load.
    /// # Returns
    /// * The configuration object.
    /// # Errors
    /// * If the file cannot be read or the YAML cannot be parsed.
    pub fn from_yaml(filename: &str) -> Result<Self, crate::SimulationError> {
        let contents = std::fs::read_to_string(filename)?;
        Ok(serde_yaml::from_str(&contents)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    #[test]
    fn test_base_config() {
        let config = Config::from_yaml("tests/testdata/test_config_base.yaml").unwrap();
        assert_eq!(config.simulator.takeoff_altitude, 81);
        assert_eq!(config.simulator.command_delay(), Duration::from_secs(2));
        assert_eq!(config.simulator.error_bar_width, 25);
        assert!(!config.render.use_rerun);
        assert_eq!(config.driver.tello_address, "192.168.10.1:8889");
        assert_eq!(config.driver.response_timeout(), Duration::from_secs(7));
    }

    #[test]
    fn test_partial_config() {
        let config = Config::from_yaml("tests/testdata/test_config_partial.yaml").unwrap();
        assert_eq!(config.simulator.takeoff_altitude, 100);
        assert_eq!(config.simulator.command_delay_ms, 0);
        assert!(config.render.use_rerun);
        assert_eq!(config.render.recording_name, "tello_sim");
        assert_eq!(config.driver.local_address, "0.0.0.0:8889");
    }

    #[test]
    fn test_missing_config() {
        assert!(matches!(
            Config::from_yaml("tests/testdata/does_not_exist.yaml"),
            Err(crate::SimulationError::Io(_))
        ));
    }
}
