//! Waitlist → enrollment conversion estimate.
//!
//! Informational only: nothing gates on the rate.

use crate::entities::WindowRecord;

/// Rate reported before any window has closed.
pub const DEFAULT_CONVERSION_RATE: f64 = 0.35;

/// Derives the historical conversion rate from finalized windows.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConversionEstimator {
    fallback: f64,
}

impl Default for ConversionEstimator {
    fn default() -> Self {
        Self {
            fallback: DEFAULT_CONVERSION_RATE,
        }
    }
}

impl ConversionEstimator {
    #[must_use]
    pub const fn with_fallback(fallback: f64) -> Self {
        Self { fallback }
    }

    #[must_use]
    pub const fn fallback(&self) -> f64 {
        self.fallback
    }

    /// `Σenrolled / ΣwaitlistAtOpen` over finalized windows.
    ///
    /// Falls back when no window has closed or the closed windows opened on
    /// an empty waitlist.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn estimate(&self, history: &[WindowRecord]) -> f64 {
        let (waitlist, enrolled) = history
            .iter()
            .filter(|w| w.is_finalized())
            .fold((0_u64, 0_u64), |(waitlist, enrolled), w| {
                (
                    waitlist + u64::from(w.waitlist_at_open),
                    enrolled + u64::from(w.enrolled),
                )
            });

        if waitlist == 0 {
            return self.fallback;
        }
        enrolled as f64 / waitlist as f64
    }
}
