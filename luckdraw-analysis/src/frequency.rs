use std::collections::HashMap;

use serde::Serialize;
use tracing::debug;

use luckdraw_db::models::{DrawRecord, GameType, Token, Zone};

use crate::error::{AnalysisError, Result};

/// Fenêtre homogène des tirages les plus récents.
/// records[0] = le plus récent ; tous les tirages sont du même jeu.
#[derive(Debug, Clone, Copy)]
pub struct DrawWindow<'a> {
    records: &'a [DrawRecord],
    game: Option<GameType>,
}

impl<'a> DrawWindow<'a> {
    /// Garde les `size` premiers tirages et refuse les fenêtres qui mélangent les jeux.
    pub fn new(records: &'a [DrawRecord], size: usize) -> Result<Self> {
        let records = &records[..size.min(records.len())];
        let game = records.first().map(|r| r.game());
        if let Some(expected) = game {
            if let Some(other) = records.iter().find(|r| r.game() != expected) {
                return Err(AnalysisError::MixedGames {
                    expected,
                    found: other.game(),
                    draw_number: other.draw_number().to_string(),
                });
            }
        }
        Ok(Self { records, game })
    }

    pub fn all(records: &'a [DrawRecord]) -> Result<Self> {
        Self::new(records, records.len())
    }

    /// Sous-fenêtre des `size` tirages les plus récents.
    pub fn truncate(&self, size: usize) -> DrawWindow<'a> {
        DrawWindow {
            records: &self.records[..size.min(self.records.len())],
            game: self.game,
        }
    }

    pub fn records(&self) -> &'a [DrawRecord] {
        self.records
    }

    /// `None` pour une fenêtre vide.
    pub fn game(&self) -> Option<GameType> {
        self.game
    }

    pub fn latest(&self) -> Option<&'a DrawRecord> {
        self.records.first()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FrequencyEntry {
    pub token: Token,
    pub count: u32,
}

/// Comptage des tokens d'une fenêtre, dans l'ordre de première apparition.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FrequencyTable {
    entries: Vec<FrequencyEntry>,
    #[serde(skip)]
    index: HashMap<Token, usize>,
    total_draws: usize,
}

impl FrequencyTable {
    fn record(&mut self, token: Token) {
        match self.index.get(&token) {
            Some(&i) => self.entries[i].count += 1,
            None => {
                self.index.insert(token, self.entries.len());
                self.entries.push(FrequencyEntry { token, count: 1 });
            }
        }
    }

    pub fn count(&self, token: &Token) -> u32 {
        self.index
            .get(token)
            .map(|&i| self.entries[i].count)
            .unwrap_or(0)
    }

    pub fn entries(&self) -> &[FrequencyEntry] {
        &self.entries
    }

    /// Entrées d'une zone, dans l'ordre de première apparition.
    pub fn zone_entries(&self, zone: Zone) -> impl Iterator<Item = &FrequencyEntry> + '_ {
        self.entries.iter().filter(move |e| e.token.zone == zone)
    }

    /// Tokens par fréquence décroissante ; à égalité, l'ordre d'apparition est conservé.
    pub fn ranked(&self) -> Vec<FrequencyEntry> {
        let mut ranked = self.entries.clone();
        ranked.sort_by(|a, b| b.count.cmp(&a.count));
        ranked
    }

    pub fn total_draws(&self) -> usize {
        self.total_draws
    }

    pub fn total_count(&self) -> u64 {
        self.entries.iter().map(|e| e.count as u64).sum()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Compte chaque numéro de chaque tirage, une fois par position.
pub fn aggregate(window: &DrawWindow<'_>) -> FrequencyTable {
    let mut table = FrequencyTable::default();
    for record in window.records() {
        for token in record.numbers().tokens() {
            table.record(token);
        }
    }
    table.total_draws = window.len();
    debug!(
        draws = table.total_draws,
        tokens = table.len(),
        "fréquences agrégées"
    );
    table
}
