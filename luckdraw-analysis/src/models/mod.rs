pub mod frequency;

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use luckdraw_db::models::{DrawNumbers, PredictedNumbers};

use crate::analysis::round_to;
use crate::config::AnalysisConfig;
use crate::error::{AnalysisError, Result};
use crate::frequency::DrawWindow;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ModelKind {
    Frequency,
}

impl ModelKind {
    pub fn label(&self) -> &'static str {
        match self {
            ModelKind::Frequency => "FREQUENCY",
        }
    }

    pub fn all() -> &'static [ModelKind] {
        &[ModelKind::Frequency]
    }
}

impl fmt::Display for ModelKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for ModelKind {
    type Err = AnalysisError;

    fn from_str(s: &str) -> Result<Self> {
        ModelKind::all()
            .iter()
            .copied()
            .find(|k| k.label().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| AnalysisError::UnknownModel(s.to_string()))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Prediction {
    pub model: ModelKind,
    pub numbers: PredictedNumbers,
    /// Étiquette de qualité fixe par modèle et par jeu, pas une probabilité calibrée
    pub confidence: f64,
}

/// Cycle de vie : non entraîné → entraîné, uniquement via un `train` réussi.
/// Une instance n'est pas réentrante : `train` demande `&mut self`.
pub trait PredictionModel: Send + Sync {
    fn kind(&self) -> ModelKind;

    fn name(&self) -> &str;

    fn is_trained(&self) -> bool;

    /// Retourne false (sans modifier l'état) si la fenêtre n'apporte aucun signal.
    fn train(&mut self, window: &DrawWindow<'_>) -> bool;

    /// Le jeu cible est celui du tirage le plus récent de `window`.
    fn predict(&self, window: &DrawWindow<'_>) -> Result<Prediction>;

    fn evaluate(&self, actual: &DrawNumbers, predicted: &PredictedNumbers) -> Result<f64> {
        if !self.is_trained() {
            return Err(AnalysisError::NotTrained("evaluate"));
        }
        overlap_accuracy(actual, predicted)
    }

    fn params(&self) -> HashMap<String, f64>;
}

fn count_matches(actual: &[u8], predicted: &[u8]) -> f64 {
    actual.iter().filter(|n| predicted.contains(*n)).count() as f64
}

/// Taux de recouvrement entre un tirage réel et une prédiction, arrondi à 4 décimales.
pub fn overlap_accuracy(actual: &DrawNumbers, predicted: &PredictedNumbers) -> Result<f64> {
    let accuracy = match (actual, predicted) {
        (
            DrawNumbers::FrontBack { front, back },
            DrawNumbers::FrontBack { front: pf, back: pb },
        ) => (count_matches(front, pf) / 5.0 + count_matches(back, pb) / 2.0) / 2.0,
        (DrawNumbers::RedBlue { red, blue }, DrawNumbers::RedBlue { red: pr, blue: pb }) => {
            let blue_match = if blue == pb { 1.0 } else { 0.0 };
            (count_matches(red, pr) / 6.0 + blue_match) / 2.0
        }
        (
            DrawNumbers::Digits { hundred, ten, unit },
            DrawNumbers::Digits { hundred: ph, ten: pt, unit: pu },
        ) => {
            let hits = [(hundred, ph), (ten, pt), (unit, pu)]
                .into_iter()
                .filter(|(a, p)| a == p)
                .count();
            hits as f64 / 3.0
        }
        _ => {
            return Err(AnalysisError::GameMismatch {
                expected: actual.game(),
                found: predicted.game(),
            })
        }
    };

    Ok(round_to(accuracy, 4))
}

pub fn create_model_kind(kind: ModelKind, config: &AnalysisConfig) -> Box<dyn PredictionModel> {
    match kind {
        ModelKind::Frequency => Box::new(frequency::FrequencyModel::from_config(&config.model)),
    }
}

/// Fabrique à partir d'une étiquette ("FREQUENCY"). Une étiquette inconnue est une erreur.
pub fn create_model(label: &str, config: &AnalysisConfig) -> Result<Box<dyn PredictionModel>> {
    let kind: ModelKind = label.parse()?;
    Ok(create_model_kind(kind, config))
}
