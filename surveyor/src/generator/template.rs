/// Peak-normalized dipole response at `distance` from the source, both in degrees.
pub fn dipole_anomaly(distance: f64, strength: f64, radius: f64) -> f64 {
    if radius <= 0.0 {
        return 0.0;
    }
    let ratio = distance / radius;
    strength / (1.0 + ratio * ratio).powf(1.5)
}

/// Splits a total-field magnitude into north/east/down components.
pub fn field_components(total: f64, inclination_deg: f64, declination_deg: f64) -> (f64, f64, f64) {
    let inc = inclination_deg.to_radians();
    let dec = declination_deg.to_radians();
    let horizontal = total * inc.cos();
    (horizontal * dec.cos(), horizontal * dec.sin(), total * inc.sin())
}
