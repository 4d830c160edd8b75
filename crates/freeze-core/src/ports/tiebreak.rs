//! TiebreakSource port - 同率タイブレーク用の乱数源
//!
//! The resolver scales whatever this returns, so implementations only need
//! to produce values in `[0, 1)`.

use std::sync::Mutex;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

pub trait TiebreakSource: Send + Sync {
    /// A value in `[0, 1)`.
    fn jitter(&self) -> f64;
}

/// `StdRng` backed source. Seeded for reproducible runs, entropy otherwise.
#[derive(Debug)]
pub struct SeededTiebreak {
    rng: Mutex<StdRng>,
}

impl SeededTiebreak {
    pub fn from_seed(seed: u64) -> Self {
        Self {
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }

    pub fn from_entropy() -> Self {
        Self {
            rng: Mutex::new(StdRng::from_entropy()),
        }
    }
}

impl TiebreakSource for SeededTiebreak {
    fn jitter(&self) -> f64 {
        self.rng
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .gen_range(0.0..1.0)
    }
}

/// Always zero: exact ties keep submission order.
#[derive(Debug, Clone, Copy, Default)]
pub struct ZeroTiebreak;

impl TiebreakSource for ZeroTiebreak {
    fn jitter(&self) -> f64 {
        0.0
    }
}
