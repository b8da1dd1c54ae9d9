use std::collections::HashMap;

use tracing::{info, warn};

use luckdraw_db::models::{DrawNumbers, GameType, Token, Zone};

use super::{ModelKind, Prediction, PredictionModel};
use crate::config::FrequencyModelConfig;
use crate::error::{AnalysisError, Result};
use crate::frequency::{aggregate, DrawWindow};

#[derive(Debug, Clone)]
struct Learned {
    game: GameType,
    /// score = fréquence relative * facteur, dans l'ordre de première apparition
    scores: Vec<(Token, f64)>,
}

#[derive(Debug, Clone)]
enum State {
    Untrained,
    Trained(Learned),
}

/// Prédit les numéros les plus fréquents de la fenêtre d'entraînement.
#[derive(Debug, Clone)]
pub struct FrequencyModel {
    weight_factor: f64,
    state: State,
}

impl FrequencyModel {
    pub fn new(weight_factor: f64) -> Self {
        Self {
            weight_factor,
            state: State::Untrained,
        }
    }

    pub fn from_config(config: &FrequencyModelConfig) -> Self {
        Self::new(config.weight_factor)
    }

    pub fn confidence(game: GameType) -> f64 {
        match game {
            GameType::FrontBack => 0.75,
            GameType::RedBlue => 0.70,
            GameType::Digits => 0.65,
        }
    }

    pub fn trained_game(&self) -> Option<GameType> {
        match &self.state {
            State::Trained(learned) => Some(learned.game),
            State::Untrained => None,
        }
    }

    pub fn score(&self, token: &Token) -> Option<f64> {
        match &self.state {
            State::Trained(learned) => learned
                .scores
                .iter()
                .find(|(t, _)| t == token)
                .map(|&(_, s)| s),
            State::Untrained => None,
        }
    }
}

/// Les N meilleurs numéros d'une zone, score décroissant, égalités dans l'ordre d'apparition.
fn top_n<const N: usize>(learned: &Learned, zone: Zone) -> Result<[u8; N]> {
    let range = zone.range();
    let mut ranked: Vec<&(Token, f64)> = learned
        .scores
        .iter()
        .filter(|(t, _)| t.zone == zone && range.contains(&t.value))
        .collect();
    ranked.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));

    let values: Vec<u8> = ranked.iter().take(N).map(|(t, _)| t.value).collect();
    values
        .as_slice()
        .try_into()
        .map_err(|_| AnalysisError::InsufficientTokens {
            zone,
            needed: N,
            found: values.len(),
        })
}

impl PredictionModel for FrequencyModel {
    fn kind(&self) -> ModelKind {
        ModelKind::Frequency
    }

    fn name(&self) -> &str {
        "Fréquence"
    }

    fn is_trained(&self) -> bool {
        matches!(self.state, State::Trained(_))
    }

    fn train(&mut self, window: &DrawWindow<'_>) -> bool {
        let Some(game) = window.game() else {
            warn!("entraînement refusé : fenêtre vide");
            return false;
        };

        let table = aggregate(window);
        if table.is_empty() || table.total_draws() == 0 {
            warn!(game = %game, "entraînement refusé : aucun numéro observé");
            return false;
        }

        let total = table.total_draws() as f64;
        let scores = table
            .entries()
            .iter()
            .map(|e| (e.token, e.count as f64 / total * self.weight_factor))
            .collect();

        self.state = State::Trained(Learned { game, scores });
        info!(
            model = %self.kind(),
            game = %game,
            draws = table.total_draws(),
            tokens = table.len(),
            "modèle entraîné"
        );
        true
    }

    fn predict(&self, window: &DrawWindow<'_>) -> Result<Prediction> {
        let State::Trained(learned) = &self.state else {
            return Err(AnalysisError::NotTrained("predict"));
        };

        // Fenêtre vide : on vise le jeu appris
        let game = window.game().unwrap_or(learned.game);
        if game != learned.game {
            return Err(AnalysisError::GameMismatch {
                expected: learned.game,
                found: game,
            });
        }

        let numbers = match game {
            GameType::FrontBack => {
                let mut front = top_n::<5>(learned, Zone::Front)?;
                let mut back = top_n::<2>(learned, Zone::Back)?;
                front.sort_unstable();
                back.sort_unstable();
                DrawNumbers::FrontBack { front, back }
            }
            GameType::RedBlue => {
                let mut red = top_n::<6>(learned, Zone::Red)?;
                red.sort_unstable();
                let [blue] = top_n::<1>(learned, Zone::Blue)?;
                DrawNumbers::RedBlue { red, blue }
            }
            GameType::Digits => {
                let [hundred, ten, unit] = top_n::<3>(learned, Zone::Digit)?;
                DrawNumbers::Digits { hundred, ten, unit }
            }
        };

        Ok(Prediction {
            model: self.kind(),
            numbers,
            confidence: Self::confidence(game),
        })
    }

    fn params(&self) -> HashMap<String, f64> {
        HashMap::from([("weight_factor".to_string(), self.weight_factor)])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use luckdraw_db::fixtures::{
        digits_draw, front_back_draw, make_digit_draws, make_front_back_draws, make_red_blue_draws,
        red_blue_draw,
    };
    use luckdraw_db::models::DrawRecord;

    fn scenario_draws() -> Vec<DrawRecord> {
        vec![
            front_back_draw("2024002", 0, [1, 5, 12, 23, 35], [3, 8]),
            front_back_draw("2024001", 3, [2, 8, 15, 28, 33], [5, 11]),
        ]
    }

    #[test]
    fn test_scenario_front_back_prediction() {
        let draws = scenario_draws();
        let window = DrawWindow::all(&draws).unwrap();
        let mut model = FrequencyModel::new(0.8);
        assert!(model.train(&window));

        let prediction = model.predict(&window).unwrap();
        assert!((prediction.confidence - 0.75).abs() < 1e-10);
        let DrawNumbers::FrontBack { front, back } = prediction.numbers else {
            panic!("variant inattendu : {:?}", prediction.numbers);
        };
        let observed_front = [1, 5, 12, 23, 35, 2, 8, 15, 28, 33];
        let observed_back = [3, 8, 5, 11];
        assert!(front.iter().all(|n| observed_front.contains(n)));
        assert!(back.iter().all(|n| observed_back.contains(n)));
        // Scores égaux : ordre d'apparition, puis tri croissant
        assert_eq!(front, [1, 5, 12, 23, 35]);
        assert_eq!(back, [3, 8]);
    }

    #[test]
    fn test_scores_are_weighted_frequencies() {
        let draws = vec![
            front_back_draw("002", 0, [1, 2, 3, 4, 5], [1, 2]),
            front_back_draw("001", 1, [1, 6, 7, 8, 9], [3, 4]),
        ];
        let mut model = FrequencyModel::new(0.8);
        model.train(&DrawWindow::all(&draws).unwrap());
        let s1 = model.score(&Token::new(Zone::Front, 1)).unwrap();
        let s2 = model.score(&Token::new(Zone::Front, 2)).unwrap();
        assert!((s1 - 0.8).abs() < 1e-10);
        assert!((s2 - 0.4).abs() < 1e-10);
        assert!(model.score(&Token::new(Zone::Front, 30)).is_none());
    }

    #[test]
    fn test_most_frequent_selected() {
        let draws = make_front_back_draws(21);
        let window = DrawWindow::all(&draws).unwrap();
        let mut model = FrequencyModel::new(0.8);
        assert!(model.train(&window));
        let prediction = model.predict(&window).unwrap();
        // 21 tirages sur un cycle de 7 : chaque groupe avant apparaît 3 fois,
        // le premier vu (01-05) l'emporte. Arrière : 02 à 07 sortent 6 fois, 01 et 08 trois fois.
        assert_eq!(
            prediction.numbers,
            DrawNumbers::FrontBack { front: [1, 2, 3, 4, 5], back: [2, 3] }
        );
    }

    #[test]
    fn test_red_blue_prediction() {
        let draws = vec![
            red_blue_draw("003", 0, [1, 2, 3, 4, 5, 6], 9),
            red_blue_draw("002", 1, [1, 2, 3, 4, 5, 7], 9),
            red_blue_draw("001", 2, [8, 10, 11, 12, 13, 33], 16),
        ];
        let window = DrawWindow::all(&draws).unwrap();
        let mut model = FrequencyModel::new(0.8);
        assert!(model.train(&window));
        let prediction = model.predict(&window).unwrap();
        assert_eq!(
            prediction.numbers,
            DrawNumbers::RedBlue { red: [1, 2, 3, 4, 5, 6], blue: 9 }
        );
        assert!((prediction.confidence - 0.70).abs() < 1e-10);
    }

    #[test]
    fn test_digits_prediction_descending_frequency() {
        let draws = vec![
            digits_draw("003", 0, 7, 7, 1),
            digits_draw("002", 1, 7, 3, 1),
            digits_draw("001", 2, 3, 5, 7),
        ];
        let window = DrawWindow::all(&draws).unwrap();
        let mut model = FrequencyModel::new(0.8);
        assert!(model.train(&window));
        let prediction = model.predict(&window).unwrap();
        // 7 ×4, 1 ×2, 3 ×2 (1 vu avant 3)
        assert_eq!(
            prediction.numbers,
            DrawNumbers::Digits { hundred: 7, ten: 1, unit: 3 }
        );
        assert!((prediction.confidence - 0.65).abs() < 1e-10);
    }

    #[test]
    fn test_digits_evaluate_scenario() {
        let draws = make_digit_draws(10);
        let mut model = FrequencyModel::new(0.8);
        assert!(model.train(&DrawWindow::all(&draws).unwrap()));
        let actual = DrawNumbers::Digits { hundred: 3, ten: 7, unit: 7 };
        let predicted = DrawNumbers::Digits { hundred: 3, ten: 1, unit: 7 };
        assert!((model.evaluate(&actual, &predicted).unwrap() - 0.6667).abs() < 1e-10);
    }

    #[test]
    fn test_predict_before_train_fails() {
        let model = FrequencyModel::new(0.8);
        let draws = make_front_back_draws(5);
        let window = DrawWindow::all(&draws).unwrap();
        assert!(matches!(
            model.predict(&window),
            Err(AnalysisError::NotTrained("predict"))
        ));
        let n = draws[0].numbers();
        assert!(matches!(
            model.evaluate(n, n),
            Err(AnalysisError::NotTrained("evaluate"))
        ));
    }

    #[test]
    fn test_train_on_empty_window_fails_and_stays_untrained() {
        let draws: Vec<DrawRecord> = vec![];
        let mut model = FrequencyModel::new(0.8);
        assert!(!model.train(&DrawWindow::all(&draws).unwrap()));
        assert!(!model.is_trained());
        assert!(model.trained_game().is_none());
    }

    #[test]
    fn test_failed_retrain_keeps_previous_parameters() {
        let draws = make_red_blue_draws(10);
        let mut model = FrequencyModel::new(0.8);
        assert!(model.train(&DrawWindow::all(&draws).unwrap()));
        let empty: Vec<DrawRecord> = vec![];
        assert!(!model.train(&DrawWindow::all(&empty).unwrap()));
        assert!(model.is_trained());
        assert_eq!(model.trained_game(), Some(GameType::RedBlue));
    }

    #[test]
    fn test_predict_other_game_is_mismatch() {
        let fb = make_front_back_draws(10);
        let digits = make_digit_draws(10);
        let mut model = FrequencyModel::new(0.8);
        assert!(model.train(&DrawWindow::all(&fb).unwrap()));
        assert!(matches!(
            model.predict(&DrawWindow::all(&digits).unwrap()),
            Err(AnalysisError::GameMismatch {
                expected: GameType::FrontBack,
                found: GameType::Digits
            })
        ));
    }

    #[test]
    fn test_predict_empty_window_uses_trained_game() {
        let draws = make_front_back_draws(10);
        let mut model = FrequencyModel::new(0.8);
        assert!(model.train(&DrawWindow::all(&draws).unwrap()));
        let empty: Vec<DrawRecord> = vec![];
        let prediction = model.predict(&DrawWindow::all(&empty).unwrap()).unwrap();
        assert_eq!(prediction.numbers.game(), GameType::FrontBack);
    }

    #[test]
    fn test_insufficient_distinct_digits() {
        let draws = vec![digits_draw("002", 0, 7, 7, 7), digits_draw("001", 1, 1, 1, 7)];
        let window = DrawWindow::all(&draws).unwrap();
        let mut model = FrequencyModel::new(0.8);
        assert!(model.train(&window));
        assert!(matches!(
            model.predict(&window),
            Err(AnalysisError::InsufficientTokens { zone: Zone::Digit, needed: 3, found: 2 })
        ));
    }

    #[test]
    fn test_evaluate_self_is_one() {
        let draws = make_front_back_draws(10);
        let mut model = FrequencyModel::new(0.8);
        assert!(model.train(&DrawWindow::all(&draws).unwrap()));
        for d in make_front_back_draws(3)
            .iter()
            .chain(make_red_blue_draws(3).iter())
            .chain(make_digit_draws(3).iter())
        {
            assert_eq!(model.evaluate(d.numbers(), d.numbers()).unwrap(), 1.0);
        }
    }

    #[test]
    fn test_params() {
        let model = FrequencyModel::new(0.8);
        assert_eq!(model.params().get("weight_factor"), Some(&0.8));
        assert_eq!(model.name(), "Fréquence");
    }
}
