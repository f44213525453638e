//! Volatility targeting: `quantity = account * (target_vol / asset_vol) / price`.

use crate::error::{ensure_finite, Component, CoreError};

/// Size so the position's volatility contribution matches `target_vol`.
///
/// Zero, negative or non-finite `asset_vol` is a data fault, not something
/// to clamp.
pub fn volatility_target_size(
    account_value: f64,
    price: f64,
    target_vol: f64,
    asset_vol: f64,
) -> Result<f64, CoreError> {
    ensure_finite(Component::PositionSizer, "asset_volatility", asset_vol)?;
    if asset_vol <= 0.0 {
        return Err(CoreError::InvalidVolatility {
            component: Component::PositionSizer,
            value: asset_vol,
        });
    }
    if price <= 0.0 || account_value <= 0.0 {
        return Ok(0.0);
    }
    Ok((account_value * (target_vol / asset_vol) / price).max(0.0))
}
