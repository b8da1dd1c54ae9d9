use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};

use crate::models::{sort_recent_first, DrawRecord, GameType, PredictedNumbers};

/// Fournisseur d'historique. Les tirages sont rendus du plus récent au plus ancien.
pub trait DrawSource {
    fn fetch_recent(&self, game: GameType, limit: usize) -> Result<Vec<DrawRecord>>;
    fn count(&self, game: GameType) -> Result<usize>;
}

/// Destinataire des prédictions produites par le moteur.
pub trait PredictionSink {
    fn store_prediction(&mut self, prediction: PredictionRecord) -> Result<()>;
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionRecord {
    pub game: GameType,
    pub target_draw: String,
    pub numbers: PredictedNumbers,
    pub confidence: f64,
    pub model: String,
}

/// Stockage en mémoire, trié du plus récent au plus ancien après chaque insertion.
#[derive(Debug, Default)]
pub struct MemoryStore {
    draws: Vec<DrawRecord>,
    predictions: Vec<PredictionRecord>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Retourne false si le tirage (jeu + identifiant) existe déjà.
    pub fn insert_draw(&mut self, draw: DrawRecord) -> bool {
        let duplicate = self
            .draws
            .iter()
            .any(|d| d.game() == draw.game() && d.draw_number() == draw.draw_number());
        if duplicate {
            return false;
        }
        self.draws.push(draw);
        sort_recent_first(&mut self.draws);
        true
    }

    pub fn draws(&self) -> &[DrawRecord] {
        &self.draws
    }

    pub fn predictions(&self) -> &[PredictionRecord] {
        &self.predictions
    }

    /// Jeux présents dans le stockage, dans l'ordre de `GameType`.
    pub fn games(&self) -> Vec<GameType> {
        let mut games: Vec<GameType> = self.draws.iter().map(|d| d.game()).collect();
        games.sort();
        games.dedup();
        games
    }
}

impl DrawSource for MemoryStore {
    fn fetch_recent(&self, game: GameType, limit: usize) -> Result<Vec<DrawRecord>> {
        Ok(self
            .draws
            .iter()
            .filter(|d| d.game() == game)
            .take(limit)
            .cloned()
            .collect())
    }

    fn count(&self, game: GameType) -> Result<usize> {
        Ok(self.draws.iter().filter(|d| d.game() == game).count())
    }
}

impl PredictionSink for MemoryStore {
    fn store_prediction(&mut self, prediction: PredictionRecord) -> Result<()> {
        if prediction.numbers.game() != prediction.game {
            bail!(
                "Prédiction {} incohérente : numéros {} pour le jeu {}",
                prediction.target_draw,
                prediction.numbers.game(),
                prediction.game
            );
        }
        if !(0.0..=1.0).contains(&prediction.confidence) {
            bail!("Confiance hors de [0, 1] : {}", prediction.confidence);
        }
        self.predictions.push(prediction);
        Ok(())
    }
}
