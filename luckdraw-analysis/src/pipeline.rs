use serde::Serialize;
use tracing::{info, warn};

use luckdraw_db::models::{next_draw_number, GameType};
use luckdraw_db::store::{DrawSource, PredictionRecord, PredictionSink};

use crate::analysis::{
    hot_cold, odd_even_distribution, sum_distribution, HotColdReport, OddEvenDistribution,
    SumDistribution,
};
use crate::config::AnalysisConfig;
use crate::error::{AnalysisError, Result};
use crate::frequency::{aggregate, DrawWindow, FrequencyTable};
use crate::models::{create_model, ModelKind, Prediction};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PredictionOutcome {
    /// Identifiant du tirage visé, si celui du dernier tirage est numérique
    pub target_draw: Option<String>,
    pub prediction: Prediction,
}

/// Résultat de toutes les analyses pour un jeu.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalysisReport {
    pub game: GameType,
    pub draws_available: usize,
    pub frequency: FrequencyTable,
    pub hot_cold: HotColdReport,
    pub sums: SumDistribution,
    pub odd_even: OddEvenDistribution,
    pub prediction: Option<PredictionOutcome>,
}

fn max_window(config: &AnalysisConfig) -> usize {
    [
        config.frequency_window,
        config.hot_cold_window,
        config.sum_window,
        config.odd_even_window,
        config.model.window_size,
    ]
    .into_iter()
    .max()
    .unwrap_or(0)
}

/// Entraîne le modèle `label` sur la fenêtre du modèle et prédit le tirage suivant.
///
/// `Ok(None)` si l'historique ne permet pas d'entraîner ou de compléter une grille.
fn predict_next(
    window: &DrawWindow<'_>,
    label: &str,
    config: &AnalysisConfig,
) -> Result<Option<PredictionOutcome>> {
    let train_window = window.truncate(config.model.window_size);
    let mut model = create_model(label, config)?;
    if !model.train(&train_window) {
        return Ok(None);
    }

    let prediction = match model.predict(&train_window) {
        Ok(p) => p,
        Err(AnalysisError::InsufficientTokens { zone, needed, found }) => {
            warn!(%zone, needed, found, "prédiction impossible : historique trop pauvre");
            return Ok(None);
        }
        Err(e) => return Err(e),
    };

    let target_draw = window
        .latest()
        .and_then(|latest| next_draw_number(latest.draw_number()));

    Ok(Some(PredictionOutcome {
        target_draw,
        prediction,
    }))
}

/// Charge l'historique de `game` depuis `source` et exécute chaque analyse sur sa fenêtre.
pub fn run_pipeline(
    source: &dyn DrawSource,
    game: GameType,
    config: &AnalysisConfig,
) -> Result<AnalysisReport> {
    config.validate()?;

    let records = source.fetch_recent(game, max_window(config))?;
    let window = DrawWindow::all(&records)?;
    if let Some(found) = window.game() {
        if found != game {
            return Err(AnalysisError::GameMismatch {
                expected: game,
                found,
            });
        }
    }

    let frequency = aggregate(&window.truncate(config.frequency_window));
    let hot_cold = hot_cold(&window, config.hot_cold_window);
    let sums = sum_distribution(&window.truncate(config.sum_window));
    let odd_even = odd_even_distribution(&window.truncate(config.odd_even_window));
    let prediction = predict_next(&window, ModelKind::Frequency.label(), config)?;

    info!(
        game = %game,
        draws = window.len(),
        predicted = prediction.is_some(),
        "analyse complète"
    );

    Ok(AnalysisReport {
        game,
        draws_available: window.len(),
        frequency,
        hot_cold,
        sums,
        odd_even,
        prediction,
    })
}

/// Issue de `publish_prediction`.
#[derive(Debug, Clone, PartialEq)]
pub enum Publication {
    Stored(PredictionRecord),
    /// Historique vide ou trop pauvre pour compléter une grille
    InsufficientHistory,
    /// Le dernier identifiant n'est pas numérique : pas de tirage cible
    NoTargetDraw { last_draw: String },
}

/// Prédit le prochain tirage avec le modèle `label` et l'enregistre dans `sink`.
pub fn publish_prediction(
    source: &dyn DrawSource,
    sink: &mut dyn PredictionSink,
    game: GameType,
    label: &str,
    config: &AnalysisConfig,
) -> Result<Publication> {
    config.validate()?;

    let records = source.fetch_recent(game, config.model.window_size)?;
    let window = DrawWindow::all(&records)?;

    let Some(outcome) = predict_next(&window, label, config)? else {
        return Ok(Publication::InsufficientHistory);
    };
    let Some(target_draw) = outcome.target_draw else {
        let last_draw = window
            .latest()
            .map(|r| r.draw_number().to_string())
            .unwrap_or_default();
        warn!(game = %game, last = %last_draw, "identifiant du dernier tirage non numérique, prédiction non enregistrée");
        return Ok(Publication::NoTargetDraw { last_draw });
    };

    let record = PredictionRecord {
        game,
        target_draw,
        numbers: outcome.prediction.numbers,
        confidence: outcome.prediction.confidence,
        model: outcome.prediction.model.label().to_string(),
    };
    sink.store_prediction(record.clone())?;
    info!(game = %game, target = %record.target_draw, model = %record.model, "prédiction enregistrée");
    Ok(Publication::Stored(record))
}
