//! Energy-aware sizing.
//!
//! Starts from a base quantity and damps it when moving price is
//! energetically expensive or the market is stiff:
//! ```text
//! quantity = base * min(max_energy / movement_energy, 1) * min(elasticity / min_elasticity, 1)
//! ```

/// Damping factor for movement energy, in [0, 1].
pub fn energy_factor(max_energy: f64, movement_energy: f64) -> f64 {
    if movement_energy <= 0.0 {
        return 1.0;
    }
    (max_energy / movement_energy).clamp(0.0, 1.0)
}

/// Damping factor for elasticity, in [0, 1].
pub fn elasticity_factor(elasticity: f64, min_elasticity: f64) -> f64 {
    if min_elasticity <= 0.0 {
        return 1.0;
    }
    (elasticity / min_elasticity).clamp(0.0, 1.0)
}

pub fn energy_aware_size(
    base_size: f64,
    max_energy: f64,
    movement_energy: f64,
    elasticity: f64,
    min_elasticity: f64,
) -> f64 {
    (base_size.max(0.0)
        * energy_factor(max_energy, movement_energy)
        * elasticity_factor(elasticity, min_elasticity))
    .max(0.0)
}
