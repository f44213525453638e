//! Entry-relative stop and target levels.

use crate::domain::Direction;

/// `(stop_loss, take_profit)` for a trade entered at `price`.
///
/// LONG: `price * (1 - stop_pct)`, `price * (1 + target_pct)`.
/// SHORT mirrors. NEUTRAL and AVOID have no levels; both equal `price`.
pub fn trade_levels(direction: Direction, price: f64, stop_pct: f64, target_pct: f64) -> (f64, f64) {
    match direction {
        Direction::Long => (price * (1.0 - stop_pct), price * (1.0 + target_pct)),
        Direction::Short => (price * (1.0 + stop_pct), price * (1.0 - target_pct)),
        Direction::Neutral | Direction::Avoid => (price, price),
    }
}
