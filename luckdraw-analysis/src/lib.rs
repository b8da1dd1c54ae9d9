pub mod analysis;
pub mod backtest;
pub mod config;
pub mod error;
pub mod frequency;
pub mod models;
pub mod pipeline;

pub use error::{AnalysisError, Result};
pub use frequency::{aggregate, DrawWindow, FrequencyEntry, FrequencyTable};
