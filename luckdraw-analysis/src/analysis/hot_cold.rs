use std::collections::HashMap;
use std::fmt;

use serde::Serialize;
use tracing::debug;

use luckdraw_db::models::Token;

use crate::frequency::DrawWindow;

const FREQUENCY_WEIGHT: f64 = 0.7;
const RECENCY_WEIGHT: f64 = 0.3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Temperature {
    Hot,
    Warm,
    Cold,
}

impl Temperature {
    pub fn from_index(index: f64) -> Self {
        if index > 0.5 {
            Temperature::Hot
        } else if index < 0.3 {
            Temperature::Cold
        } else {
            Temperature::Warm
        }
    }
}

impl fmt::Display for Temperature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Temperature::Hot => write!(f, "HOT"),
            Temperature::Warm => write!(f, "-"),
            Temperature::Cold => write!(f, "COLD"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HotColdEntry {
    pub token: Token,
    pub count: u32,
    pub last_appear_gap: u32,
    pub hot_cold_index: f64,
    pub temperature: Temperature,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct HotColdReport {
    /// Triées par indice décroissant
    pub entries: Vec<HotColdEntry>,
    pub total_draws: usize,
}

impl HotColdReport {
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Indice chaud/froid = fréquence * 0.7 + 1 / (1 + retard) * 0.3.
///
/// Après chaque tirage, le retard de *tous* les tokens déjà vus est incrémenté,
/// y compris ceux qui viennent d'apparaître : le retard minimal est donc 1, pas 0.
/// Un token compte au plus une fois par tirage (chiffres répétés du 3D).
pub fn hot_cold(window: &DrawWindow<'_>, window_size: usize) -> HotColdReport {
    let window = window.truncate(window_size);
    let total_draws = window.len();

    // (token, count, gap) dans l'ordre de première apparition
    let mut stats: Vec<(Token, u32, u32)> = Vec::new();
    let mut index: HashMap<Token, usize> = HashMap::new();

    for record in window.records() {
        let mut seen: Vec<Token> = Vec::new();
        for token in record.numbers().tokens() {
            if seen.contains(&token) {
                continue;
            }
            seen.push(token);
            let i = *index.entry(token).or_insert_with(|| {
                stats.push((token, 0, 0));
                stats.len() - 1
            });
            stats[i].1 += 1;
            stats[i].2 = 0;
        }
        for entry in &mut stats {
            entry.2 += 1;
        }
    }

    let mut entries: Vec<HotColdEntry> = stats
        .into_iter()
        .map(|(token, count, gap)| {
            let frequency = count as f64 / total_draws as f64;
            let recency = 1.0 / (1.0 + gap as f64);
            let hot_cold_index = frequency * FREQUENCY_WEIGHT + recency * RECENCY_WEIGHT;
            HotColdEntry {
                token,
                count,
                last_appear_gap: gap,
                hot_cold_index,
                temperature: Temperature::from_index(hot_cold_index),
            }
        })
        .collect();

    entries.sort_by(|a, b| {
        b.hot_cold_index
            .partial_cmp(&a.hot_cold_index)
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    debug!(draws = total_draws, tokens = entries.len(), "analyse chaud/froid");

    HotColdReport {
        entries,
        total_draws,
    }
}
