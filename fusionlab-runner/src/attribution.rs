//! Three-way P&L attribution by dominant entry signal.
//!
//! Each closed trade's net P&L goes to whichever of the energy, liquidity or
//! sentiment signals had the largest magnitude when it was opened.

use serde::{Deserialize, Serialize};

use fusionlab_core::domain::{SignalSource, Trade};

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct SourceAttribution {
    pub trades: usize,
    pub winners: usize,
    pub net_pnl: f64,
    pub win_rate: f64,
}

impl SourceAttribution {
    fn add(&mut self, trade: &Trade) {
        self.trades += 1;
        if trade.is_winner {
            self.winners += 1;
        }
        self.net_pnl += trade.net_pnl;
        self.win_rate = self.winners as f64 / self.trades as f64;
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct PnlAttribution {
    pub energy: SourceAttribution,
    pub liquidity: SourceAttribution,
    pub sentiment: SourceAttribution,
}

impl PnlAttribution {
    pub fn from_trades(trades: &[Trade]) -> Self {
        let mut attribution = Self::default();
        for trade in trades {
            attribution.source_mut(trade.attributed_source()).add(trade);
        }
        attribution
    }

    pub fn source(&self, source: SignalSource) -> &SourceAttribution {
        match source {
            SignalSource::Energy => &self.energy,
            SignalSource::Liquidity => &self.liquidity,
            SignalSource::Sentiment => &self.sentiment,
        }
    }

    fn source_mut(&mut self, source: SignalSource) -> &mut SourceAttribution {
        match source {
            SignalSource::Energy => &mut self.energy,
            SignalSource::Liquidity => &mut self.liquidity,
            SignalSource::Sentiment => &mut self.sentiment,
        }
    }

    /// Sum of attributed net P&L; equals the total over all trades.
    pub fn total(&self) -> f64 {
        self.energy.net_pnl + self.liquidity.net_pnl + self.sentiment.net_pnl
    }
}
