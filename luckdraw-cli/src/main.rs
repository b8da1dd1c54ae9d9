mod display;
mod import;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use tracing::debug;
use tracing_subscriber::EnvFilter;

use luckdraw_analysis::analysis::{hot_cold, odd_even_distribution, sum_distribution};
use luckdraw_analysis::backtest::walk_forward_accuracy;
use luckdraw_analysis::config::{load_config, save_config, AnalysisConfig};
use luckdraw_analysis::models::{create_model, ModelKind};
use luckdraw_analysis::pipeline::{publish_prediction, run_pipeline, Publication};
use luckdraw_analysis::{aggregate, DrawWindow};
use luckdraw_db::models::{DrawRecord, GameType};
use luckdraw_db::store::{DrawSource, MemoryStore};

use crate::display::{
    display_backtest, display_draws, display_frequency, display_hot_cold, display_import_summary,
    display_odd_even, display_prediction, display_sums,
};

#[derive(Parser)]
#[command(name = "luckdraw", about = "Statistiques et prédictions de tirages de loterie")]
struct Cli {
    /// Historique des tirages (CSV `game;draw_number;date;numbers;sales_amount;prize_pool`)
    #[arg(short, long, global = true, default_value = "draws.csv")]
    file: PathBuf,

    /// Configuration JSON des fenêtres et du modèle
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Sortie JSON au lieu des tableaux
    #[arg(long, global = true)]
    json: bool,

    /// Journalisation détaillée sur stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Args)]
struct GameArgs {
    /// Jeu analysé
    #[arg(short, long, default_value = "dlt")]
    game: GameType,
}

#[derive(Subcommand)]
enum Command {
    /// Vérifier un fichier CSV et afficher le bilan d'import
    Import,

    /// Écrire la configuration par défaut dans un fichier JSON
    InitConfig {
        /// Fichier de destination
        path: PathBuf,
    },

    /// Lister les derniers tirages
    List {
        #[command(flatten)]
        game: GameArgs,

        /// Nombre de tirages à afficher
        #[arg(short, long, default_value = "10")]
        last: usize,
    },

    /// Fréquence de chaque numéro
    Frequency {
        #[command(flatten)]
        game: GameArgs,

        /// Fenêtre d'analyse (défaut : configuration, 100)
        #[arg(short, long)]
        window: Option<usize>,

        /// N'afficher que les N premiers
        #[arg(long)]
        top: Option<usize>,
    },

    /// Indice chaud/froid de chaque numéro
    HotCold {
        #[command(flatten)]
        game: GameArgs,

        /// Fenêtre d'analyse (défaut : configuration, 50)
        #[arg(short, long)]
        window: Option<usize>,

        /// N'afficher que les N premiers
        #[arg(long)]
        top: Option<usize>,
    },

    /// Distribution des sommes
    Sums {
        #[command(flatten)]
        game: GameArgs,

        /// Fenêtre d'analyse (défaut : configuration, 100)
        #[arg(short, long)]
        window: Option<usize>,
    },

    /// Répartition pairs / impairs
    OddEven {
        #[command(flatten)]
        game: GameArgs,

        /// Fenêtre d'analyse (défaut : configuration, 100)
        #[arg(short, long)]
        window: Option<usize>,
    },

    /// Prédire le prochain tirage
    Predict {
        #[command(flatten)]
        game: GameArgs,

        /// Modèle de prédiction
        #[arg(short, long, default_value = "FREQUENCY")]
        model: String,

        /// Fenêtre d'entraînement (défaut : configuration, 100)
        #[arg(short, long)]
        window: Option<usize>,
    },

    /// Évaluer le modèle sur le dernier tirage, entraîné sur les précédents
    Evaluate {
        #[command(flatten)]
        game: GameArgs,

        /// Modèle de prédiction
        #[arg(short, long, default_value = "FREQUENCY")]
        model: String,

        /// Fenêtre d'entraînement (défaut : configuration, 100)
        #[arg(short, long)]
        window: Option<usize>,
    },

    /// Backtest walk-forward du modèle
    Backtest {
        #[command(flatten)]
        game: GameArgs,

        /// Modèle de prédiction
        #[arg(short, long, default_value = "FREQUENCY")]
        model: String,

        /// Fenêtre d'entraînement de chaque point
        #[arg(short, long, default_value = "50")]
        window: usize,

        /// Nombre maximal de tirages testés
        #[arg(long, default_value = "100")]
        max_tests: usize,
    },

    /// Toutes les analyses et la prédiction
    Report {
        #[command(flatten)]
        game: GameArgs,
    },
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config = match &cli.config {
        Some(path) => load_config(path)
            .with_context(|| format!("Impossible de charger la configuration {:?}", path))?,
        None => AnalysisConfig::default(),
    };

    if let Command::InitConfig { path } = &cli.command {
        return cmd_init_config(&config, path);
    }

    let mut store = MemoryStore::new();
    let result = import::import_csv(&mut store, &cli.file)?;
    debug!(
        file = %cli.file.display(),
        inserted = result.inserted,
        errors = result.errors,
        "historique chargé"
    );
    let out = Output { json: cli.json };

    match cli.command {
        Command::Import => {
            if out.json {
                out.print(&result)
            } else {
                display_import_summary(&result);
                Ok(())
            }
        }
        Command::InitConfig { .. } => Ok(()),
        Command::List { game, last } => cmd_list(&store, game.game, last, out),
        Command::Frequency { game, window, top } => {
            let size = window.unwrap_or(config.frequency_window);
            let records = store.fetch_recent(game.game, size)?;
            let table = aggregate(&DrawWindow::all(&records)?);
            if out.json {
                return out.print(&table);
            }
            display_frequency(game.game, &table, top);
            Ok(())
        }
        Command::HotCold { game, window, top } => {
            let size = window.unwrap_or(config.hot_cold_window);
            let records = store.fetch_recent(game.game, size)?;
            let report = hot_cold(&DrawWindow::all(&records)?, size);
            if out.json {
                return out.print(&report);
            }
            display_hot_cold(game.game, &report, top);
            Ok(())
        }
        Command::Sums { game, window } => {
            let size = window.unwrap_or(config.sum_window);
            let records = store.fetch_recent(game.game, size)?;
            let dist = sum_distribution(&DrawWindow::all(&records)?);
            if out.json {
                return out.print(&dist);
            }
            display_sums(game.game, &dist);
            Ok(())
        }
        Command::OddEven { game, window } => {
            let size = window.unwrap_or(config.odd_even_window);
            let records = store.fetch_recent(game.game, size)?;
            let dist = odd_even_distribution(&DrawWindow::all(&records)?);
            if out.json {
                return out.print(&dist);
            }
            display_odd_even(game.game, &dist);
            Ok(())
        }
        Command::Predict {
            game,
            model,
            window,
        } => cmd_predict(&store, game.game, &model, with_model_window(config, window), out),
        Command::Evaluate {
            game,
            model,
            window,
        } => cmd_evaluate(&store, game.game, &model, with_model_window(config, window), out),
        Command::Backtest {
            game,
            model,
            window,
            max_tests,
        } => {
            let kind: ModelKind = model.parse()?;
            let records = store.fetch_recent(game.game, store.count(game.game)?)?;
            let report = walk_forward_accuracy(
                kind,
                &config,
                &DrawWindow::all(&records)?,
                window,
                max_tests,
            )?;
            if out.json {
                return out.print(&report);
            }
            display_backtest(&report);
            Ok(())
        }
        Command::Report { game } => {
            let report = run_pipeline(&store, game.game, &config)?;
            if out.json {
                return out.print(&report);
            }
            display_frequency(report.game, &report.frequency, Some(10));
            display_hot_cold(report.game, &report.hot_cold, Some(10));
            display_sums(report.game, &report.sums);
            display_odd_even(report.game, &report.odd_even);
            match &report.prediction {
                Some(outcome) => {
                    display_prediction(&outcome.prediction, outcome.target_draw.as_deref())
                }
                None => println!("\nHistorique insuffisant pour prédire."),
            }
            Ok(())
        }
    }
}

#[derive(Clone, Copy)]
struct Output {
    json: bool,
}

impl Output {
    fn print<T: Serialize>(&self, value: &T) -> Result<()> {
        println!("{}", serde_json::to_string_pretty(value)?);
        Ok(())
    }
}

fn with_model_window(mut config: AnalysisConfig, window: Option<usize>) -> AnalysisConfig {
    if let Some(size) = window {
        config.model.window_size = size;
    }
    config
}

fn cmd_init_config(config: &AnalysisConfig, path: &Path) -> Result<()> {
    save_config(config, path)
        .with_context(|| format!("Impossible d'écrire la configuration {:?}", path))?;
    println!("Configuration écrite dans {}", path.display());
    Ok(())
}

fn cmd_list(store: &MemoryStore, game: GameType, last: usize, out: Output) -> Result<()> {
    if store.count(game)? == 0 {
        println!("Aucun tirage {} dans l'historique.", game);
        return Ok(());
    }
    let draws = store.fetch_recent(game, last)?;
    if out.json {
        return out.print(&draws);
    }
    display_draws(&draws);
    Ok(())
}

fn cmd_predict(
    store: &MemoryStore,
    game: GameType,
    model: &str,
    config: AnalysisConfig,
    out: Output,
) -> Result<()> {
    let mut sink = MemoryStore::new();
    let record = match publish_prediction(store, &mut sink, game, model, &config)? {
        Publication::Stored(record) => record,
        Publication::InsufficientHistory => {
            println!("Historique {} insuffisant pour prédire.", game);
            return Ok(());
        }
        Publication::NoTargetDraw { last_draw } => {
            println!(
                "Identifiant du dernier tirage {} non numérique ('{}') : tirage cible inconnu.",
                game, last_draw
            );
            return Ok(());
        }
    };
    if out.json {
        return out.print(&record);
    }
    display::display_prediction_record(&record);
    Ok(())
}

#[derive(Serialize)]
struct Evaluation<'a> {
    draw: &'a DrawRecord,
    predicted: String,
    accuracy: f64,
}

fn cmd_evaluate(
    store: &MemoryStore,
    game: GameType,
    model: &str,
    config: AnalysisConfig,
    out: Output,
) -> Result<()> {
    let records = store.fetch_recent(game, config.model.window_size + 1)?;
    let Some((actual, history)) = records.split_first() else {
        println!("Aucun tirage {} dans l'historique.", game);
        return Ok(());
    };

    let window = DrawWindow::all(history)?;
    let mut model = create_model(model, &config)?;
    if !model.train(&window) {
        println!("Historique {} insuffisant pour entraîner le modèle.", game);
        return Ok(());
    }
    let prediction = model.predict(&window)?;
    let accuracy = model.evaluate(actual.numbers(), &prediction.numbers)?;

    let evaluation = Evaluation {
        draw: actual,
        predicted: prediction.numbers.to_string(),
        accuracy,
    };
    if out.json {
        return out.print(&evaluation);
    }
    display_prediction(&prediction, Some(actual.draw_number()));
    println!("Tirage réel : {}", actual.numbers());
    println!("Précision   : {:.4}", evaluation.accuracy);
    Ok(())
}
