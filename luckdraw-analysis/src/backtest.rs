use serde::Serialize;
use tracing::{debug, warn};

use crate::analysis::round_to;
use crate::config::AnalysisConfig;
use crate::error::{AnalysisError, Result};
use crate::frequency::DrawWindow;
use crate::models::{create_model_kind, ModelKind};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BacktestPoint {
    pub draw_number: String,
    pub accuracy: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BacktestReport {
    pub model: ModelKind,
    pub train_window: usize,
    pub points: Vec<BacktestPoint>,
    /// `None` si aucun point n'a pu être évalué
    pub mean_accuracy: Option<f64>,
    pub skipped: usize,
}

/// Walk-forward : pour chaque tirage test t, un modèle neuf est entraîné sur
/// draws[t+1 .. t+1+train_window] (strictement plus anciens) puis comparé au tirage t.
///
/// draws[0] = le plus récent. Au plus `max_tests` points, répartis avec un pas régulier.
pub fn walk_forward_accuracy(
    kind: ModelKind,
    config: &AnalysisConfig,
    window: &DrawWindow<'_>,
    train_window: usize,
    max_tests: usize,
) -> Result<BacktestReport> {
    if train_window == 0 || max_tests == 0 {
        return Err(AnalysisError::Config(
            "train_window et max_tests doivent être > 0".into(),
        ));
    }

    let draws = window.records();
    let max_t = draws.len().saturating_sub(train_window);
    let stride = (max_t / max_tests).max(1);

    let mut points = Vec::new();
    let mut skipped = 0usize;

    for t in (0..max_t).step_by(stride).take(max_tests) {
        let train = DrawWindow::all(&draws[t + 1..t + 1 + train_window])?;
        let mut model = create_model_kind(kind, config);

        if !model.train(&train) {
            skipped += 1;
            continue;
        }

        let prediction = match model.predict(&train) {
            Ok(p) => p,
            Err(AnalysisError::InsufficientTokens { zone, needed, found }) => {
                warn!(
                    draw = draws[t].draw_number(),
                    %zone, needed, found,
                    "point de backtest ignoré"
                );
                skipped += 1;
                continue;
            }
            Err(e) => return Err(e),
        };

        let accuracy = model.evaluate(draws[t].numbers(), &prediction.numbers)?;
        points.push(BacktestPoint {
            draw_number: draws[t].draw_number().to_string(),
            accuracy,
        });
    }

    let mean_accuracy = if points.is_empty() {
        None
    } else {
        let sum: f64 = points.iter().map(|p| p.accuracy).sum();
        Some(round_to(sum / points.len() as f64, 4))
    };

    debug!(
        model = %kind,
        points = points.len(),
        skipped,
        "backtest terminé"
    );

    Ok(BacktestReport {
        model: kind,
        train_window,
        points,
        mean_accuracy,
        skipped,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use luckdraw_db::fixtures::{digits_draw, make_front_back_draws};
    use luckdraw_db::models::DrawRecord;

    #[test]
    fn test_walk_forward_point_count() {
        let draws = make_front_back_draws(30);
        let window = DrawWindow::all(&draws).unwrap();
        let report =
            walk_forward_accuracy(ModelKind::Frequency, &AnalysisConfig::default(), &window, 10, 100)
                .unwrap();
        assert_eq!(report.points.len(), 20);
        assert_eq!(report.skipped, 0);
        assert_eq!(report.points[0].draw_number, draws[0].draw_number());
        let mean = report.mean_accuracy.unwrap();
        assert!((0.0..=1.0).contains(&mean));
        for p in &report.points {
            assert!((0.0..=1.0).contains(&p.accuracy));
        }
    }

    #[test]
    fn test_walk_forward_stride_limits_tests() {
        let draws = make_front_back_draws(60);
        let window = DrawWindow::all(&draws).unwrap();
        let report =
            walk_forward_accuracy(ModelKind::Frequency, &AnalysisConfig::default(), &window, 10, 5)
                .unwrap();
        assert_eq!(report.points.len(), 5);
        assert_eq!(report.points[1].draw_number, draws[10].draw_number());
    }

    #[test]
    fn test_walk_forward_perfect_on_constant_history() {
        let draws: Vec<DrawRecord> = (0..8)
            .map(|i| digits_draw(&format!("{:03}", 100 - i), i as u64, 1, 2, 3))
            .collect();
        let window = DrawWindow::all(&draws).unwrap();
        let report =
            walk_forward_accuracy(ModelKind::Frequency, &AnalysisConfig::default(), &window, 3, 100)
                .unwrap();
        assert_eq!(report.points.len(), 5);
        assert_eq!(report.mean_accuracy, Some(1.0));
    }

    #[test]
    fn test_walk_forward_skips_insufficient_points() {
        let draws: Vec<DrawRecord> = (0..4)
            .map(|i| digits_draw(&format!("{:03}", 100 - i), i as u64, 5, 5, 5))
            .collect();
        let window = DrawWindow::all(&draws).unwrap();
        let report =
            walk_forward_accuracy(ModelKind::Frequency, &AnalysisConfig::default(), &window, 2, 100)
                .unwrap();
        assert!(report.points.is_empty());
        assert_eq!(report.skipped, 2);
        assert_eq!(report.mean_accuracy, None);
    }

    #[test]
    fn test_walk_forward_too_short_history() {
        let draws = make_front_back_draws(5);
        let window = DrawWindow::all(&draws).unwrap();
        let report =
            walk_forward_accuracy(ModelKind::Frequency, &AnalysisConfig::default(), &window, 10, 100)
                .unwrap();
        assert!(report.points.is_empty());
        assert!(report.mean_accuracy.is_none());
        assert!(walk_forward_accuracy(ModelKind::Frequency, &AnalysisConfig::default(), &window, 0, 10)
            .is_err());
    }
}
