use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;
use tracing::debug;

use luckdraw_db::models::{DrawRecord, Zone};

use super::round_to;
use crate::frequency::DrawWindow;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum ParityField {
    FrontOdd,
    FrontEven,
    BackOdd,
    BackEven,
    RedOdd,
    RedEven,
    BlueOdd,
    BlueEven,
    TotalOdd,
    TotalEven,
    Odd,
    Even,
}

impl ParityField {
    /// Couple (impairs, pairs) d'une zone. Les chiffres du 3D forment un seul groupe.
    pub fn for_zone(zone: Zone) -> (ParityField, ParityField) {
        match zone {
            Zone::Front => (ParityField::FrontOdd, ParityField::FrontEven),
            Zone::Back => (ParityField::BackOdd, ParityField::BackEven),
            Zone::Red => (ParityField::RedOdd, ParityField::RedEven),
            Zone::Blue => (ParityField::BlueOdd, ParityField::BlueEven),
            Zone::Digit => (ParityField::Odd, ParityField::Even),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            ParityField::FrontOdd => "frontOdd",
            ParityField::FrontEven => "frontEven",
            ParityField::BackOdd => "backOdd",
            ParityField::BackEven => "backEven",
            ParityField::RedOdd => "redOdd",
            ParityField::RedEven => "redEven",
            ParityField::BlueOdd => "blueOdd",
            ParityField::BlueEven => "blueEven",
            ParityField::TotalOdd => "totalOdd",
            ParityField::TotalEven => "totalEven",
            ParityField::Odd => "odd",
            ParityField::Even => "even",
        }
    }
}

impl fmt::Display for ParityField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ParityBreakdown {
    pub draw_number: String,
    pub counts: Vec<(ParityField, u8)>,
}

impl ParityBreakdown {
    pub fn get(&self, field: ParityField) -> Option<u8> {
        self.counts
            .iter()
            .find(|(f, _)| *f == field)
            .map(|&(_, v)| v)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldStats {
    /// valeur → nombre de tirages
    pub histogram: BTreeMap<u8, u32>,
    pub mean: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct OddEvenDistribution {
    pub per_draw: Vec<ParityBreakdown>,
    pub fields: BTreeMap<ParityField, FieldStats>,
    pub total_draws: usize,
}

impl OddEvenDistribution {
    pub fn is_empty(&self) -> bool {
        self.per_draw.is_empty()
    }
}

/// Le nombre de pairs est déduit de la taille fixe du groupe, jamais recompté.
pub fn parity_breakdown(record: &DrawRecord) -> ParityBreakdown {
    let groups = record.numbers().groups();
    let mut counts = Vec::with_capacity(groups.len() * 2 + 2);
    let (mut total_odd, mut total_even) = (0u8, 0u8);

    for (zone, values) in &groups {
        let odd = values.iter().filter(|&&v| v % 2 == 1).count() as u8;
        let even = (zone.pick_count() as u8).saturating_sub(odd);
        let (odd_field, even_field) = ParityField::for_zone(*zone);
        counts.push((odd_field, odd));
        counts.push((even_field, even));
        total_odd += odd;
        total_even += even;
    }

    if groups.len() > 1 {
        counts.push((ParityField::TotalOdd, total_odd));
        counts.push((ParityField::TotalEven, total_even));
    }

    ParityBreakdown {
        draw_number: record.draw_number().to_string(),
        counts,
    }
}

pub fn odd_even_distribution(window: &DrawWindow<'_>) -> OddEvenDistribution {
    let per_draw: Vec<ParityBreakdown> = window.records().iter().map(parity_breakdown).collect();

    let mut values: BTreeMap<ParityField, Vec<u8>> = BTreeMap::new();
    for breakdown in &per_draw {
        for &(field, v) in &breakdown.counts {
            values.entry(field).or_default().push(v);
        }
    }

    let fields = values
        .into_iter()
        .map(|(field, vs)| {
            let mut histogram = BTreeMap::new();
            for &v in &vs {
                *histogram.entry(v).or_insert(0) += 1;
            }
            let mean = vs.iter().map(|&v| v as f64).sum::<f64>() / vs.len() as f64;
            (
                field,
                FieldStats {
                    histogram,
                    mean: round_to(mean, 2),
                },
            )
        })
        .collect();

    debug!(draws = per_draw.len(), "distribution pair/impair");

    OddEvenDistribution {
        per_draw,
        fields,
        total_draws: window.len(),
    }
}
