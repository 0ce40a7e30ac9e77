//! Driver for a real Tello
//!
//! The Tello accepts plain-text SDK commands over UDP and answers each one with `ok`, `error`
//! or a value. A [`DriverConnector`] opens the link once; the resulting [`DriverAdapter`] is
//! owned by the simulator session and reused for every deployment.
use async_trait::async_trait;
use tokio::net::UdpSocket;
use tokio::time::timeout;

use crate::config::DriverConfig;
use crate::SimulationError;

/// Maximum size of a Tello response datagram
const RESPONSE_BUFFER_SIZE: usize = 1518;

/// A connected link to a drone
/// # Example
/// ```
/// use async_trait::async_trait;
/// use tello_sim::driver::DriverAdapter;
/// use tello_sim::SimulationError;
/// struct PrintDriver;
/// #[async_trait]
/// impl DriverAdapter for PrintDriver {
///     async fn send(&mut self, command: &str) -> Result<(), SimulationError> {
///         println!("{command}");
///         Ok(())
///     }
/// }
/// ```
#[async_trait]
pub trait DriverAdapter: Send {
    /// Forward one serialized command to the drone
    async fn send(&mut self, command: &str) -> Result<(), SimulationError>;
}

/// Opens a [`DriverAdapter`]
#[async_trait]
pub trait DriverConnector: Send + Sync {
    async fn connect(&self) -> Result<Box<dyn DriverAdapter>, SimulationError>;
}

/// Connects to a Tello over UDP
pub struct TelloConnector {
    pub config: DriverConfig,
}

impl TelloConnector {
    pub fn new(config: DriverConfig) -> Self {
        Self { config }
    }
}

#[async_trait]
impl DriverConnector for TelloConnector {
    async fn connect(&self) -> Result<Box<dyn DriverAdapter>, SimulationError> {
        let driver = TelloDriver::connect(&self.config).await?;
        Ok(Box::new(driver))
    }
}

/// UDP link to a Tello
pub struct TelloDriver {
    socket: UdpSocket,
    config: DriverConfig,
}

impl TelloDriver {
    /// Bind the local port and connect the socket to the drone
    /// # Errors
    /// * If the local address cannot be bound or the drone address cannot be resolved
    pub async fn connect(config: &DriverConfig) -> Result<Self, SimulationError> {
        let socket = UdpSocket::bind(&config.local_address).await.map_err(|e| {
            SimulationError::Driver(format!("Failed to bind {}: {e}", config.local_address))
        })?;
        socket.connect(&config.tello_address).await.map_err(|e| {
            SimulationError::Driver(format!(
                "Failed to connect to {}: {e}",
                config.tello_address
            ))
        })?;
        log::info!("Connected to Tello at {}", config.tello_address);
        Ok(Self {
            socket,
            config: config.clone(),
        })
    }
}

#[async_trait]
impl DriverAdapter for TelloDriver {
    async fn send(&mut self, command: &str) -> Result<(), SimulationError> {
        log::info!("Sending command: {command}");
        self.socket
            .send(command.as_bytes())
            .await
            .map_err(|e| SimulationError::Driver(format!("Failed to send {command:?}: {e}")))?;
        let mut buffer = [0u8; RESPONSE_BUFFER_SIZE];
        match timeout(self.config.response_timeout(), self.socket.recv(&mut buffer)).await {
            Ok(Ok(len)) => {
                log::info!(
                    "Tello response to {command:?}: {}",
                    String::from_utf8_lossy(&buffer[..len]).trim()
                );
            }
            Ok(Err(e)) => log::warn!("Failed to read response to {command:?}: {e}"),
            Err(_) => log::warn!("No response to {command:?}, moving on"),
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn tello_driver_sends_plain_text() -> Result<(), SimulationError> {
        let drone = UdpSocket::bind("127.0.0.1:0").await?;
        let config = DriverConfig {
            tello_address: drone.local_addr()?.to_string(),
            local_address: "127.0.0.1:0".to_string(),
            response_timeout_ms: 1000,
        };
        let mut driver = TelloConnector::new(config).connect().await?;
        let echo = tokio::spawn(async move {
            let mut buffer = [0u8; 64];
            let (len, from) = drone.recv_from(&mut buffer).await.unwrap();
            drone.send_to(b"ok", from).await.unwrap();
            String::from_utf8_lossy(&buffer[..len]).to_string()
        });
        driver.send("forward 130").await?;
        assert_eq!(echo.await.unwrap(), "forward 130");
        Ok(())
    }

    #[tokio::test]
    async fn missing_response_is_not_an_error() -> Result<(), SimulationError> {
        let drone = UdpSocket::bind("127.0.0.1:0").await?;
        let config = DriverConfig {
            tello_address: drone.local_addr()?.to_string(),
            local_address: "127.0.0.1:0".to_string(),
            response_timeout_ms: 10,
        };
        let mut driver = TelloDriver::connect(&config).await?;
        driver.send("command").await?;
        Ok(())
    }
}
