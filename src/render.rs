//! Flight plots
//!
//! Renderers are read-only consumers of [`crate::FlightState`] history. The simulator calls them
//! after a command has been applied; a failing renderer never undoes or fails the command.
use nalgebra::Vector2;

use crate::SimulationError;

/// Half width of the smallest plotted area in centimeters
const MIN_PLOT_EXTENT: f64 = 200.0;
/// Margin added around the path once it leaves the smallest plotted area
const PLOT_MARGIN: f64 = 40.0;

/// Axis limits of the path plot
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PlotBounds {
    pub x: (f64, f64),
    pub y: (f64, f64),
}

fn axis_limits(values: impl Iterator<Item = f64> + Clone) -> (f64, f64) {
    let low = values.clone().fold(f64::INFINITY, f64::min);
    let high = values.fold(f64::NEG_INFINITY, f64::max);
    let low = if low > -MIN_PLOT_EXTENT {
        -MIN_PLOT_EXTENT
    } else {
        low - PLOT_MARGIN
    };
    let high = if high < MIN_PLOT_EXTENT {
        MIN_PLOT_EXTENT
    } else {
        high + PLOT_MARGIN
    };
    (low, high)
}

/// Compute the axis limits of the path plot
/// Each axis shows at least [-200, 200]; a path reaching past that gets a 40 cm margin.
/// # Example
/// ```
/// use nalgebra::Vector2;
/// use tello_sim::render::plot_bounds;
/// let bounds = plot_bounds(&[Vector2::new(0.0, 0.0), Vector2::new(0.0, 300.0)]);
/// assert_eq!(bounds.x, (-200.0, 200.0));
/// assert_eq!(bounds.y, (-200.0, 340.0));
/// ```
pub fn plot_bounds(path: &[Vector2<f64>]) -> PlotBounds {
    PlotBounds {
        x: axis_limits(path.iter().map(|p| p.x)),
        y: axis_limits(path.iter().map(|p| p.y)),
    }
}

/// Types implementing this trait can draw the simulated flight
pub trait FlightRenderer {
    /// Draw the horizontal path, the flip locations and the last heading
    /// # Arguments
    /// * `path` - Positions after each move, starting at the takeoff point
    /// * `flips` - Positions where a flip was performed
    /// * `bearing` - Heading in degrees from the takeoff heading
    /// * `error_bar_width` - Width of the uncertainty band in centimeters
    fn render_path(
        &mut self,
        path: &[Vector2<f64>],
        flips: &[Vector2<f64>],
        bearing: i64,
        error_bar_width: i64,
    ) -> Result<(), SimulationError>;

    /// Draw the altitude after each altitude-changing command
    fn render_altitude(
        &mut self,
        altitude_history: &[i64],
        error_bar_width: i64,
    ) -> Result<(), SimulationError>;
}

/// Renderer that draws nothing
pub struct NullRenderer;

impl FlightRenderer for NullRenderer {
    fn render_path(
        &mut self,
        _path: &[Vector2<f64>],
        _flips: &[Vector2<f64>],
        _bearing: i64,
        _error_bar_width: i64,
    ) -> Result<(), SimulationError> {
        Ok(())
    }

    fn render_altitude(
        &mut self,
        _altitude_history: &[i64],
        _error_bar_width: i64,
    ) -> Result<(), SimulationError> {
        Ok(())
    }
}

/// Renderer that summarizes the plots through the `log` facade
pub struct LogRenderer;

fn format_points(points: &[Vector2<f64>]) -> String {
    points
        .iter()
        .map(|p| format!("({:.1}, {:.1})", p.x, p.y))
        .collect::<Vec<_>>()
        .join(" -> ")
}

impl FlightRenderer for LogRenderer {
    fn render_path(
        &mut self,
        path: &[Vector2<f64>],
        flips: &[Vector2<f64>],
        bearing: i64,
        _error_bar_width: i64,
    ) -> Result<(), SimulationError> {
        let bounds = plot_bounds(path);
        log::info!(
            "Path of Tello from takeoff location, last heading = {} degrees from start: {}",
            bearing,
            format_points(path)
        );
        if !flips.is_empty() {
            log::info!("Drone flips: {}", format_points(flips));
        }
        log::debug!("Plot bounds: x {:?}, y {:?}", bounds.x, bounds.y);
        Ok(())
    }

    fn render_altitude(
        &mut self,
        altitude_history: &[i64],
        _error_bar_width: i64,
    ) -> Result<(), SimulationError> {
        log::info!("Tello altitude by step: {:?}", altitude_history);
        Ok(())
    }
}

/// Renderer that streams the plots to a rerun.io viewer
pub struct RerunRenderer {
    rec: rerun::RecordingStream,
}

fn to_positions(points: &[Vector2<f64>]) -> Vec<[f32; 2]> {
    points.iter().map(|p| [p.x as f32, p.y as f32]).collect()
}

impl RerunRenderer {
    pub fn new(rec: rerun::RecordingStream) -> Self {
        Self { rec }
    }

    /// Spawn a rerun viewer and stream to it
    /// # Arguments
    /// * `recording_name` - Application id of the recording
    /// # Errors
    /// * If the viewer cannot be spawned
    pub fn spawn(recording_name: &str) -> Result<Self, SimulationError> {
        let rec = rerun::RecordingStreamBuilder::new(recording_name)
            .spawn()
            .map_err(|e| SimulationError::OtherError(format!("Failed to spawn rerun: {e}")))?;
        Ok(Self::new(rec))
    }

    pub fn recording(&self) -> &rerun::RecordingStream {
        &self.rec
    }
}

impl FlightRenderer for RerunRenderer {
    fn render_path(
        &mut self,
        path: &[Vector2<f64>],
        flips: &[Vector2<f64>],
        bearing: i64,
        error_bar_width: i64,
    ) -> Result<(), SimulationError> {
        let positions = to_positions(path);
        let strip = rerun::components::LineStrip2D(
            positions
                .iter()
                .map(|p| rerun::datatypes::Vec2D::from(*p))
                .collect(),
        );
        self.rec.log(
            "flight/path/band",
            &rerun::LineStrips2D::new([strip.clone()])
                .with_colors([rerun::Color::from_unmultiplied_rgba(0, 0, 255, 38)])
                .with_radii([error_bar_width as f32 / 2.0]),
        )?;
        self.rec.log(
            "flight/path/line",
            &rerun::LineStrips2D::new([strip])
                .with_colors([rerun::Color::from_rgb(0, 0, 255)])
                .with_radii([1.0]),
        )?;
        self.rec.log(
            "flight/path/moves",
            &rerun::Points2D::new(positions)
                .with_colors([rerun::Color::from_rgb(0, 0, 255)])
                .with_radii([6.0]),
        )?;
        self.rec.log(
            "flight/path/flips",
            &rerun::Points2D::new(to_positions(flips))
                .with_colors([rerun::Color::from_rgb(255, 0, 0)])
                .with_radii([6.0]),
        )?;
        let bounds = plot_bounds(path);
        self.rec.log(
            "flight/path/bounds",
            &rerun::Boxes2D::from_mins_and_sizes(
                [[bounds.x.0 as f32, bounds.y.0 as f32]],
                [[
                    (bounds.x.1 - bounds.x.0) as f32,
                    (bounds.y.1 - bounds.y.0) as f32,
                ]],
            )
            .with_colors([rerun::Color::from_rgb(128, 128, 128)]),
        )?;
        self.rec.log(
            "flight/heading",
            &rerun::TextDocument::new(format!(
                "Path of Tello from takeoff location.\nLast heading = {bearing} degrees from start"
            )),
        )?;
        Ok(())
    }

    fn render_altitude(
        &mut self,
        altitude_history: &[i64],
        _error_bar_width: i64,
    ) -> Result<(), SimulationError> {
        // The full series is re-logged so a reset session overwrites the old one step by step
        for (step, altitude) in altitude_history.iter().enumerate() {
            self.rec.set_time_sequence("step", step as i64);
            self.rec
                .log("altitude", &rerun::Scalar::new(*altitude as f64))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn small_path_uses_minimum_extent() {
        let bounds = plot_bounds(&[Vector2::zeros(), Vector2::new(-80.0, 130.0)]);
        assert_eq!(bounds.x, (-200.0, 200.0));
        assert_eq!(bounds.y, (-200.0, 200.0));
    }

    #[test]
    fn large_path_gets_margin() {
        let bounds = plot_bounds(&[Vector2::zeros(), Vector2::new(-250.0, 200.0)]);
        assert_eq!(bounds.x, (-290.0, 200.0));
        assert_eq!(bounds.y, (-200.0, 240.0));
    }

    #[test]
    fn text_renderers_accept_any_history() {
        let path = [Vector2::zeros(), Vector2::new(0.0, 130.0)];
        let mut renderer = LogRenderer;
        assert!(renderer.render_path(&path, &[path[1]], -90, 25).is_ok());
        assert!(renderer.render_altitude(&[81, 0], 25).is_ok());
        assert!(NullRenderer.render_altitude(&[], 25).is_ok());
    }

    #[test]
    fn rerun_renderer_logs_to_memory() {
        let (rec, _storage) = rerun::RecordingStreamBuilder::new("tello_sim_test")
            .memory()
            .unwrap();
        let mut renderer = RerunRenderer::new(rec);
        let path = [Vector2::zeros(), Vector2::new(0.0, 130.0)];
        renderer.render_path(&path, &[], 0, 25).unwrap();
        renderer.render_altitude(&[81, 91], 25).unwrap();
    }
}
