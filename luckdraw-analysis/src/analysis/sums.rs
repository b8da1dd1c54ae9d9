use std::collections::BTreeMap;

use serde::Serialize;
use tracing::debug;

use luckdraw_db::models::DrawNumbers;

use super::round_to;
use crate::frequency::DrawWindow;

/// Décomposition de la somme d'un tirage par groupe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "layout", rename_all = "snake_case")]
pub enum SumParts {
    FrontBack { front: u32, back: u32 },
    RedBlue { red: u32, blue: u32 },
    Digits,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DrawSum {
    pub draw_number: String,
    pub parts: SumParts,
    pub total: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SumSummary {
    pub min: u32,
    pub max: u32,
    pub mean: f64,
    pub median: f64,
    pub stddev: f64,
    /// Somme exacte → nombre de tirages (jamais regroupé en classes)
    pub histogram: BTreeMap<u32, u32>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SumDistribution {
    /// `None` quand la fenêtre est vide
    pub summary: Option<SumSummary>,
    pub per_draw: Vec<DrawSum>,
    pub total_draws: usize,
}

fn sum(values: &[u8]) -> u32 {
    values.iter().map(|&v| v as u32).sum()
}

pub fn draw_sum(numbers: &DrawNumbers) -> (SumParts, u32) {
    match numbers {
        DrawNumbers::FrontBack { front, back } => {
            let (front, back) = (sum(front), sum(back));
            (SumParts::FrontBack { front, back }, front + back)
        }
        DrawNumbers::RedBlue { red, blue } => {
            let (red, blue) = (sum(red), *blue as u32);
            (SumParts::RedBlue { red, blue }, red + blue)
        }
        DrawNumbers::Digits { hundred, ten, unit } => {
            (SumParts::Digits, sum(&[*hundred, *ten, *unit]))
        }
    }
}

fn summarize(totals: &[u32]) -> Option<SumSummary> {
    let min = *totals.iter().min()?;
    let max = *totals.iter().max()?;
    let n = totals.len() as f64;

    let mean = totals.iter().map(|&t| t as f64).sum::<f64>() / n;
    let variance = totals
        .iter()
        .map(|&t| (t as f64 - mean).powi(2))
        .sum::<f64>()
        / n;

    let mut sorted = totals.to_vec();
    sorted.sort_unstable();
    let mid = sorted.len() / 2;
    let median = if sorted.len() % 2 == 0 {
        (sorted[mid - 1] as f64 + sorted[mid] as f64) / 2.0
    } else {
        sorted[mid] as f64
    };

    let mut histogram = BTreeMap::new();
    for &t in totals {
        *histogram.entry(t).or_insert(0) += 1;
    }

    Some(SumSummary {
        min,
        max,
        mean: round_to(mean, 2),
        median: round_to(median, 2),
        stddev: round_to(variance.sqrt(), 2),
        histogram,
    })
}

/// Distribution des sommes de tirage (écart type de population).
pub fn sum_distribution(window: &DrawWindow<'_>) -> SumDistribution {
    let per_draw: Vec<DrawSum> = window
        .records()
        .iter()
        .map(|record| {
            let (parts, total) = draw_sum(record.numbers());
            DrawSum {
                draw_number: record.draw_number().to_string(),
                parts,
                total,
            }
        })
        .collect();

    let totals: Vec<u32> = per_draw.iter().map(|s| s.total).collect();
    let summary = summarize(&totals);
    debug!(draws = totals.len(), "distribution des sommes");

    SumDistribution {
        summary,
        per_draw,
        total_draws: window.len(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use luckdraw_db::fixtures::{digits_draw, front_back_draw, make_front_back_draws, red_blue_draw};
    use luckdraw_db::models::DrawRecord;

    #[test]
    fn test_front_back_breakdown() {
        let draws = vec![
            front_back_draw("002", 0, [1, 5, 12, 23, 35], [3, 8]),
            front_back_draw("001", 1, [2, 8, 15, 28, 33], [5, 11]),
        ];
        let dist = sum_distribution(&DrawWindow::all(&draws).unwrap());
        assert_eq!(dist.per_draw[0].parts, SumParts::FrontBack { front: 76, back: 11 });
        assert_eq!(dist.per_draw[0].total, 87);
        assert_eq!(dist.per_draw[1].total, 86 + 16);

        let summary = dist.summary.unwrap();
        assert_eq!(summary.min, 87);
        assert_eq!(summary.max, 102);
        assert!((summary.mean - 94.5).abs() < 1e-10);
        assert!((summary.median - 94.5).abs() < 1e-10);
        assert!((summary.stddev - 7.5).abs() < 1e-10);
        assert_eq!(summary.histogram.len(), 2);
    }

    #[test]
    fn test_red_blue_and_digits_totals() {
        let rb = red_blue_draw("001", 0, [1, 2, 3, 4, 5, 6], 16);
        assert_eq!(draw_sum(rb.numbers()), (SumParts::RedBlue { red: 21, blue: 16 }, 37));

        let d = digits_draw("001", 0, 3, 7, 7);
        assert_eq!(draw_sum(d.numbers()), (SumParts::Digits, 17));
    }

    #[test]
    fn test_histogram_is_exact_multiset() {
        let draws = vec![
            digits_draw("004", 0, 1, 2, 3),
            digits_draw("003", 1, 3, 2, 1),
            digits_draw("002", 2, 0, 0, 6),
            digits_draw("001", 3, 9, 9, 9),
        ];
        let summary = sum_distribution(&DrawWindow::all(&draws).unwrap()).summary.unwrap();
        assert_eq!(summary.histogram.get(&6), Some(&3));
        assert_eq!(summary.histogram.get(&27), Some(&1));
        assert_eq!(summary.histogram.values().sum::<u32>(), 4);
        assert!((summary.median - 6.0).abs() < 1e-10);
        // moyenne 45/4 = 11.25, écart type sqrt(82.6875) = 9.0933...
        assert!((summary.mean - 11.25).abs() < 1e-10);
        assert!((summary.stddev - 9.09).abs() < 1e-10);
    }

    #[test]
    fn test_mean_rounds_half_to_even() {
        // sept sommes à 1 et une à 2 : moyenne 9/8 = 1.125
        let mut draws: Vec<DrawRecord> = (0..7)
            .map(|i| digits_draw(&format!("{:03}", 8 - i), i as u64, 0, 0, 1))
            .collect();
        draws.push(digits_draw("001", 7, 0, 1, 1));
        let summary = sum_distribution(&DrawWindow::all(&draws).unwrap()).summary.unwrap();
        assert_eq!(summary.mean, 1.12);
        assert_eq!(summary.median, 1.0);
        assert_eq!(summary.stddev, 0.33);
    }

    #[test]
    fn test_empty_window() {
        let draws: Vec<DrawRecord> = vec![];
        let dist = sum_distribution(&DrawWindow::all(&draws).unwrap());
        assert!(dist.summary.is_none());
        assert!(dist.per_draw.is_empty());
        assert_eq!(dist.total_draws, 0);
    }

    #[test]
    fn test_idempotent() {
        let draws = make_front_back_draws(33);
        let window = DrawWindow::all(&draws).unwrap();
        assert_eq!(sum_distribution(&window), sum_distribution(&window));
    }
}
