//! Planar geometry for the simulated flight path.
//!
//! Positions are in centimeters from the takeoff point. Bearings are in degrees, measured
//! clockwise from the positive Y axis, which is the drone's heading at takeoff.
use nalgebra::Vector2;

/// Bearing offset of a `forward` move relative to the heading
pub const FORWARD_OFFSET: i64 = 0;
/// Bearing offset of a `back` move relative to the heading
pub const BACK_OFFSET: i64 = 180;
/// Bearing offset of a `left` move relative to the heading
pub const LEFT_OFFSET: i64 = -90;
/// Bearing offset of a `right` move relative to the heading
pub const RIGHT_OFFSET: i64 = 90;

/// Move `distance` centimeters from `origin` along `bearing_degrees`
/// The bearing is used as given, it is not wrapped into [0, 360).
/// # Arguments
/// * `origin` - The starting position
/// * `bearing_degrees` - Direction of travel, clockwise from the positive Y axis
/// * `distance` - Distance to travel, may be negative
/// # Returns
/// * The new position
/// # Example
/// ```
/// use nalgebra::Vector2;
/// use tello_sim::geometry::translate;
/// let position = translate(Vector2::new(0.0, 0.0), 90.0, 10.0);
/// assert!((position - Vector2::new(10.0, 0.0)).norm() < 1e-9);
/// ```
pub fn translate(origin: Vector2<f64>, bearing_degrees: f64, distance: f64) -> Vector2<f64> {
    let (sin, cos) = bearing_degrees.to_radians().sin_cos();
    origin + Vector2::new(sin * distance, cos * distance)
}
