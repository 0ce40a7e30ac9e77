use colored::Colorize;
use tello_sim::config::Config;
use tello_sim::driver::TelloConnector;
use tello_sim::render::{FlightRenderer, LogRenderer, RerunRenderer};
use tello_sim::{SimulationError, Simulator};

const DEFAULT_CONFIG: &str = "config/tello_sim.yaml";

/// Fly the demo plan when no command file is given
fn demo_flight(drone: &mut Simulator) -> Result<(), SimulationError> {
    drone.takeoff()?;
    drone.forward(130)?;
    drone.ccw(90)?;
    drone.forward(80)?;
    drone.land()
}

#[tokio::main]
/// Main function for the simulator
async fn main() -> Result<(), SimulationError> {
    let args: Vec<String> = std::env::args().collect();
    let deploy = args.iter().any(|arg| arg == "--deploy");
    let positional: Vec<&String> = args
        .iter()
        .skip(1)
        .filter(|arg| !arg.starts_with("--"))
        .collect();
    let config_str = match positional.first() {
        Some(path) => {
            println!(
                "[{} tello_sim] Loading configuration: {}",
                "INFO".green(),
                path
            );
            path.as_str()
        }
        None => {
            println!(
                "[{} tello_sim] Usage: {} [config.yaml] [commands.json|commands.csv] [--deploy]",
                "WARN".yellow(),
                args[0]
            );
            println!(
                "[{} tello_sim] Loading default configuration: {}",
                "WARN".yellow(),
                DEFAULT_CONFIG
            );
            DEFAULT_CONFIG
        }
    };
    let config = Config::from_yaml(config_str)?;
    println!(
        "[{} tello_sim] Use rerun.io: {}",
        "INFO".green(),
        config.render.use_rerun
    );
    let renderer: Box<dyn FlightRenderer> = if config.render.use_rerun {
        let renderer = RerunRenderer::spawn(&config.render.recording_name)?;
        rerun::Logger::new(renderer.recording().clone())
            .with_path_prefix("logs")
            .with_filter(rerun::default_log_filter())
            .init()
            .map_err(|e| SimulationError::OtherError(format!("Failed to set logger: {e}")))?;
        Box::new(renderer)
    } else {
        env_logger::builder()
            .parse_env(env_logger::Env::default().default_filter_or("info"))
            .init();
        Box::new(LogRenderer)
    };

    // The engine sleeps between commands, keep that off the async workers
    let mut drone = tokio::task::block_in_place(|| -> Result<Simulator, SimulationError> {
        let mut drone = Simulator::new(config.simulator.clone(), renderer)?
            .with_connector(Box::new(TelloConnector::new(config.driver.clone())));
        match positional.get(1) {
            Some(commands) => drone.load(commands.as_str())?,
            None => demo_flight(&mut drone)?,
        }
        Ok(drone)
    })?;
    log::info!(
        "Flight plan ready: {} commands, final bearing {} degrees",
        drone.log().len(),
        drone.state().bearing
    );
    if deploy {
        drone.deploy().await?;
    }
    log::logger().flush();
    Ok(())
}
