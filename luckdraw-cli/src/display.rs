use comfy_table::{presets::UTF8_FULL, Cell, Color, ContentArrangement, Table};

use luckdraw_analysis::analysis::{
    HotColdReport, OddEvenDistribution, SumDistribution, SumParts, Temperature,
};
use luckdraw_analysis::backtest::BacktestReport;
use luckdraw_analysis::models::Prediction;
use luckdraw_analysis::FrequencyTable;
use luckdraw_db::models::{DrawRecord, GameType};
use luckdraw_db::store::PredictionRecord;

use crate::import::ImportResult;

fn new_table(header: Vec<&str>) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(header);
    table
}

fn amount(value: Option<f64>) -> String {
    match value {
        Some(v) => format!("{:.2}", v),
        None => "—".to_string(),
    }
}

pub fn display_draws(draws: &[DrawRecord]) {
    if draws.is_empty() {
        println!("Aucun tirage à afficher.");
        return;
    }

    let mut table = new_table(vec!["Tirage", "Date", "Jeu", "Numéros", "Ventes", "Cagnotte"]);
    for draw in draws {
        table.add_row(vec![
            draw.draw_number().to_string(),
            draw.draw_date().format("%Y-%m-%d").to_string(),
            draw.game().to_string(),
            draw.numbers().to_string(),
            amount(draw.sales_amount()),
            amount(draw.prize_pool()),
        ]);
    }
    println!("{table}");
}

pub fn display_import_summary(result: &ImportResult) {
    println!("Import terminé :");
    println!("  Total lignes lues : {}", result.total_records);
    println!("  Insérés           : {}", result.inserted);
    println!("  Doublons ignorés  : {}", result.skipped);
    if result.errors > 0 {
        println!("  Erreurs           : {}", result.errors);
    }
}

pub fn display_frequency(game: GameType, table: &FrequencyTable, top: Option<usize>) {
    println!(
        "\n📊 Fréquences {} sur les {} derniers tirages\n",
        game,
        table.total_draws()
    );
    if table.is_empty() {
        println!("Aucun tirage à analyser.");
        return;
    }

    let ranked = table.ranked();
    let limit = top.unwrap_or(ranked.len());
    let mut out = new_table(vec!["Zone", "Numéro", "Occurrences", "Fréquence"]);
    for entry in ranked.iter().take(limit) {
        let ratio = entry.count as f64 / table.total_draws() as f64;
        out.add_row(vec![
            entry.token.zone.to_string(),
            entry.token.canonical(),
            entry.count.to_string(),
            format!("{:.4}", ratio),
        ]);
    }
    println!("{out}");
}

pub fn display_hot_cold(game: GameType, report: &HotColdReport, top: Option<usize>) {
    println!(
        "\n🌡  Chaud / froid {} sur les {} derniers tirages\n",
        game, report.total_draws
    );
    if report.is_empty() {
        println!("Aucun tirage à analyser.");
        return;
    }

    let limit = top.unwrap_or(report.entries.len());
    let mut table = new_table(vec!["Zone", "Numéro", "Occurrences", "Retard", "Indice", "Tag"]);
    for entry in report.entries.iter().take(limit) {
        let color = match entry.temperature {
            Temperature::Hot => Color::Red,
            Temperature::Cold => Color::Blue,
            Temperature::Warm => Color::White,
        };
        table.add_row(vec![
            Cell::new(entry.token.zone.to_string()),
            Cell::new(entry.token.canonical()),
            Cell::new(entry.count),
            Cell::new(entry.last_appear_gap),
            Cell::new(format!("{:.4}", entry.hot_cold_index)),
            Cell::new(entry.temperature.to_string()).fg(color),
        ]);
    }
    println!("{table}");
}

pub fn display_sums(game: GameType, dist: &SumDistribution) {
    println!(
        "\n➕ Sommes {} sur les {} derniers tirages\n",
        game, dist.total_draws
    );
    let Some(summary) = &dist.summary else {
        println!("Aucun tirage à analyser.");
        return;
    };

    let mut table = new_table(vec!["Min", "Max", "Moyenne", "Médiane", "Écart-type"]);
    table.add_row(vec![
        summary.min.to_string(),
        summary.max.to_string(),
        format!("{:.2}", summary.mean),
        format!("{:.2}", summary.median),
        format!("{:.2}", summary.stddev),
    ]);
    println!("{table}");

    let mut table = new_table(vec!["Tirage", "Détail", "Somme"]);
    for sum in &dist.per_draw {
        let detail = match sum.parts {
            SumParts::FrontBack { front, back } => format!("avant {} + arrière {}", front, back),
            SumParts::RedBlue { red, blue } => format!("rouges {} + bleue {}", red, blue),
            SumParts::Digits => "—".to_string(),
        };
        table.add_row(vec![sum.draw_number.clone(), detail, sum.total.to_string()]);
    }
    println!("{table}");

    let mut table = new_table(vec!["Somme", "Tirages"]);
    for (value, count) in &summary.histogram {
        table.add_row(vec![value.to_string(), count.to_string()]);
    }
    println!("{table}");
}

pub fn display_odd_even(game: GameType, dist: &OddEvenDistribution) {
    println!(
        "\n⚖  Pairs / impairs {} sur les {} derniers tirages\n",
        game, dist.total_draws
    );
    if dist.is_empty() {
        println!("Aucun tirage à analyser.");
        return;
    }

    let mut header = vec!["Tirage".to_string()];
    if let Some(first) = dist.per_draw.first() {
        header.extend(first.counts.iter().map(|(field, _)| field.to_string()));
    }
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(header);
    for breakdown in &dist.per_draw {
        let mut row = vec![breakdown.draw_number.clone()];
        row.extend(breakdown.counts.iter().map(|(_, v)| v.to_string()));
        table.add_row(row);
    }
    println!("{table}");

    let mut table = new_table(vec!["Champ", "Moyenne", "Répartition"]);
    for (field, stats) in &dist.fields {
        let histogram = stats
            .histogram
            .iter()
            .map(|(value, count)| format!("{}:{}", value, count))
            .collect::<Vec<_>>()
            .join("  ");
        table.add_row(vec![field.to_string(), format!("{:.2}", stats.mean), histogram]);
    }
    println!("{table}");
}

pub fn display_prediction(prediction: &Prediction, target_draw: Option<&str>) {
    println!("\n🎯 Prédiction ({})\n", prediction.model);

    let mut table = new_table(vec!["Tirage visé", "Numéros", "Confiance"]);
    table.add_row(vec![
        target_draw.unwrap_or("—").to_string(),
        prediction.numbers.to_string(),
        format!("{:.2}", prediction.confidence),
    ]);
    println!("{table}");
}

pub fn display_backtest(report: &BacktestReport) {
    println!(
        "\n🔁 Backtest {} (fenêtre d'entraînement : {} tirages)\n",
        report.model, report.train_window
    );
    if report.points.is_empty() {
        println!("Historique insuffisant pour évaluer le modèle.");
        return;
    }

    let mut table = new_table(vec!["Tirage", "Précision"]);
    for point in &report.points {
        table.add_row(vec![point.draw_number.clone(), format!("{:.4}", point.accuracy)]);
    }
    println!("{table}");

    if let Some(mean) = report.mean_accuracy {
        println!("Précision moyenne : {:.4} sur {} points", mean, report.points.len());
    }
    if report.skipped > 0 {
        println!("Points ignorés    : {}", report.skipped);
    }
}

pub fn display_prediction_record(record: &PredictionRecord) {
    println!("\n🎯 Prédiction {} ({})\n", record.game, record.model);

    let mut table = new_table(vec!["Tirage visé", "Numéros", "Confiance"]);
    table.add_row(vec![
        record.target_draw.clone(),
        record.numbers.to_string(),
        format!("{:.2}", record.confidence),
    ]);
    println!("{table}");
}
