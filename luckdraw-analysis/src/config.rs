use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{AnalysisError, Result};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FrequencyModelConfig {
    /// Nombre de tirages utilisés pour l'entraînement
    pub window_size: usize,
    /// Facteur appliqué à la fréquence relative de chaque token
    pub weight_factor: f64,
}

impl Default for FrequencyModelConfig {
    fn default() -> Self {
        Self {
            window_size: 100,
            weight_factor: 0.8,
        }
    }
}

/// Fenêtres par défaut de chaque analyse.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    pub frequency_window: usize,
    pub hot_cold_window: usize,
    pub sum_window: usize,
    pub odd_even_window: usize,
    pub model: FrequencyModelConfig,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            frequency_window: 100,
            hot_cold_window: 50,
            sum_window: 100,
            odd_even_window: 100,
            model: FrequencyModelConfig::default(),
        }
    }
}

impl AnalysisConfig {
    pub fn validate(&self) -> Result<()> {
        let windows = [
            ("frequency_window", self.frequency_window),
            ("hot_cold_window", self.hot_cold_window),
            ("sum_window", self.sum_window),
            ("odd_even_window", self.odd_even_window),
            ("model.window_size", self.model.window_size),
        ];
        for (name, value) in windows {
            if value == 0 {
                return Err(AnalysisError::Config(format!("{name} doit être > 0")));
            }
        }
        let w = self.model.weight_factor;
        if !w.is_finite() || w <= 0.0 {
            return Err(AnalysisError::Config(format!(
                "model.weight_factor doit être fini et > 0, reçu {w}"
            )));
        }
        Ok(())
    }
}

pub fn save_config(config: &AnalysisConfig, path: &Path) -> Result<()> {
    let json = serde_json::to_string_pretty(config)?;
    std::fs::write(path, json)?;
    Ok(())
}

pub fn load_config(path: &Path) -> Result<AnalysisConfig> {
    let json = std::fs::read_to_string(path)?;
    let config: AnalysisConfig = serde_json::from_str(&json)?;
    config.validate()?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AnalysisConfig::default();
        assert_eq!(config.hot_cold_window, 50);
        assert_eq!(config.model.window_size, 100);
        assert!((config.model.weight_factor - 0.8).abs() < 1e-10);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: AnalysisConfig =
            serde_json::from_str(r#"{"sum_window": 30, "model": {"weight_factor": 0.5}}"#).unwrap();
        assert_eq!(config.sum_window, 30);
        assert_eq!(config.frequency_window, 100);
        assert_eq!(config.model.window_size, 100);
        assert!((config.model.weight_factor - 0.5).abs() < 1e-10);
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut config = AnalysisConfig::default();
        config.hot_cold_window = 0;
        assert!(matches!(config.validate(), Err(AnalysisError::Config(_))));

        let mut config = AnalysisConfig::default();
        config.model.weight_factor = f64::NAN;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_save_and_load() {
        let path = std::env::temp_dir().join(format!("luckdraw-config-{}.json", std::process::id()));
        let mut config = AnalysisConfig::default();
        config.odd_even_window = 42;
        save_config(&config, &path).unwrap();
        let loaded = load_config(&path).unwrap();
        std::fs::remove_file(&path).ok();
        assert_eq!(loaded, config);
    }
}
