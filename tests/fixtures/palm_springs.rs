//! Locations around central Palm Springs.

use walk_planner::store::Location;

pub const A: (f64, f64) = (33.8303, -116.5453);
pub const B: (f64, f64) = (33.8306, -116.5459);
pub const C: (f64, f64) = (33.8450, -116.5700);

pub fn location(name: &str, coords: (f64, f64)) -> Location {
    Location::new(coords.0, coords.1).with_attribute("name", name)
}

/// The three-point scenario: two neighbours and one point ~2.8 km away.
pub fn triangle() -> Vec<Location> {
    vec![location("A", A), location("B", B), location("C", C)]
}

/// `rows x cols` points on a lattice with ~`spacing_km` between neighbours.
pub fn lattice(rows: usize, cols: usize, spacing_km: f64) -> Vec<Location> {
    let dlat = spacing_km / 111.195;
    let dlng = dlat / A.0.to_radians().cos();
    let mut points = Vec::with_capacity(rows * cols);
    for row in 0..rows {
        for col in 0..cols {
            let coords = (A.0 + row as f64 * dlat, A.1 + col as f64 * dlng);
            points.push(location(&format!("Stop {row}-{col}"), coords));
        }
    }
    points
}
