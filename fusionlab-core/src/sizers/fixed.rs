//! Fixed notional cap: the hard ceiling from `RiskParameters::max_position_size`.

/// Quantity whose notional equals `max_notional` at `price`.
pub fn fixed_cap_size(max_notional: f64, price: f64) -> f64 {
    if price <= 0.0 || max_notional <= 0.0 {
        return 0.0;
    }
    max_notional / price
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn converts_notional_to_quantity() {
        assert_eq!(fixed_cap_size(100_000.0, 50.0), 2000.0);
    }

    #[test]
    fn degenerate_inputs_are_zero() {
        assert_eq!(fixed_cap_size(100_000.0, 0.0), 0.0);
        assert_eq!(fixed_cap_size(0.0, 50.0), 0.0);
    }
}
