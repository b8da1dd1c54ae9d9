use thiserror::Error;

use luckdraw_db::models::{GameType, Zone};

#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("modèle non entraîné : appelez train() avant {0}")]
    NotTrained(&'static str),

    #[error("jeux incompatibles : attendu {expected}, reçu {found}")]
    GameMismatch { expected: GameType, found: GameType },

    #[error("fenêtre hétérogène : tirage {draw_number} est {found}, la fenêtre est {expected}")]
    MixedGames {
        expected: GameType,
        found: GameType,
        draw_number: String,
    },

    #[error("type de modèle inconnu : '{0}'")]
    UnknownModel(String),

    #[error("pas assez de numéros appris pour la zone {zone} : {found} sur {needed}")]
    InsufficientTokens {
        zone: Zone,
        needed: usize,
        found: usize,
    },

    #[error("configuration invalide : {0}")]
    Config(String),

    #[error("erreur d'E/S : {0}")]
    Io(#[from] std::io::Error),

    #[error("erreur JSON : {0}")]
    Json(#[from] serde_json::Error),

    #[error("source de tirages : {0}")]
    Source(#[from] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, AnalysisError>;
