pub mod hot_cold;
pub mod odd_even;
pub mod sums;

pub use hot_cold::{hot_cold, HotColdEntry, HotColdReport, Temperature};
pub use odd_even::{odd_even_distribution, FieldStats, OddEvenDistribution, ParityBreakdown, ParityField};
pub use sums::{sum_distribution, DrawSum, SumDistribution, SumParts, SumSummary};

/// Arrondi à `decimals` décimales (présentation), demi vers le pair.
pub fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round_ties_even() / factor
}
