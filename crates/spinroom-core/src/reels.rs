//! Cosmetic three-reel outcome generator.
//!
//! Outcomes have no bearing on the allowance; they are what the front end shows
//! after a granted spin. The machine is generic over [`rand::Rng`] so a seeded
//! generator makes outcomes reproducible.

use rand::prelude::*;
use rand_pcg::Mcg128Xsl64;
use serde::{Deserialize, Serialize};

use crate::storage::ReelsConfig;

pub const DEFAULT_SYMBOLS: [&str; 7] = ["🍒", "🍋", "🍊", "🍇", "🔔", "💎", "7️⃣"];

/// Symbols shown on the three reels once they stop.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReelOutcome {
    pub reels: [String; 3],
    /// All three reels match.
    pub jackpot: bool,
}

impl ReelOutcome {
    fn from_reels(reels: [String; 3]) -> Self {
        let jackpot = reels[0] == reels[1] && reels[1] == reels[2];
        Self { reels, jackpot }
    }
}

pub struct ReelMachine<R: Rng = Mcg128Xsl64> {
    symbols: Vec<String>,
    win_probability: f64,
    rng: R,
}

impl ReelMachine<Mcg128Xsl64> {
    /// Build from config, seeding from `config.seed` when set.
    pub fn from_config(config: &ReelsConfig) -> Self {
        let rng = match config.seed {
            Some(seed) => Mcg128Xsl64::seed_from_u64(seed),
            None => Mcg128Xsl64::from_entropy(),
        };
        Self::with_rng(config.symbols.clone(), config.win_probability, rng)
    }
}

impl<R: Rng> ReelMachine<R> {
    /// An empty symbol list falls back to [`DEFAULT_SYMBOLS`]; the probability is
    /// clamped to `0.0..=1.0`.
    pub fn with_rng(symbols: Vec<String>, win_probability: f64, rng: R) -> Self {
        let symbols = if symbols.is_empty() {
            DEFAULT_SYMBOLS.iter().map(|s| s.to_string()).collect()
        } else {
            symbols
        };
        let win_probability = if win_probability.is_nan() {
            0.0
        } else {
            win_probability.clamp(0.0, 1.0)
        };
        Self {
            symbols,
            win_probability,
            rng,
        }
    }

    pub fn symbols(&self) -> &[String] {
        &self.symbols
    }

    fn random_symbol(&mut self) -> String {
        // `symbols` is never empty, see `with_rng`.
        self.symbols
            .choose(&mut self.rng)
            .cloned()
            .unwrap_or_default()
    }

    /// Stop the reels on three symbols.
    ///
    /// Each reel draws independently; with `win_probability` the reels are then
    /// forced onto one shared symbol.
    pub fn spin(&mut self) -> ReelOutcome {
        let mut reels = [
            self.random_symbol(),
            self.random_symbol(),
            self.random_symbol(),
        ];

        if self.rng.gen_bool(self.win_probability) {
            let winner = self.random_symbol();
            reels = [winner.clone(), winner.clone(), winner];
        }

        ReelOutcome::from_reels(reels)
    }
}
