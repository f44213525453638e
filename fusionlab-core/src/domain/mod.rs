//! Domain types for fusionlab

pub mod bar;
pub mod engine_state;
pub mod trade;
pub mod trade_idea;

pub use bar::{Bar, BarError};
pub use engine_state::{
    EnergyRegime, EnergyState, EngineState, LiquidityRegime, LiquidityState, Regime,
    RegimeSnapshot, SentimentRegime, SentimentState, SignalSource,
};
pub use trade::{ExitReason, PositionSide, Trade, TradeCosts};
pub use trade_idea::{Direction, SignalSet, TradeIdea};
