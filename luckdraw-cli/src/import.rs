use std::io::Read;
use std::path::Path;

use anyhow::{bail, Context, Result};
use chrono::NaiveDate;
use serde::Serialize;
use tracing::warn;

use luckdraw_db::models::{DrawNumbers, DrawRecord, GameType};
use luckdraw_db::store::MemoryStore;

/// Montant au format français (`109156,50`). Vide → `None`.
pub fn parse_french_decimal(s: &str) -> Result<Option<f64>> {
    let s = s.trim();
    if s.is_empty() {
        return Ok(None);
    }
    let normalized = s.replace(' ', "").replace(',', ".");
    normalized
        .parse::<f64>()
        .map(Some)
        .with_context(|| format!("Impossible de parser le nombre: '{}'", s))
}

pub fn parse_date(raw: &str) -> Result<NaiveDate> {
    let raw = raw.trim();
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .or_else(|_| NaiveDate::parse_from_str(raw, "%d/%m/%Y"))
        .with_context(|| format!("Format de date invalide: '{}'", raw))
}

fn parse_values(raw: &str) -> Result<Vec<u8>> {
    raw.split_whitespace()
        .map(|s| {
            s.parse::<u8>()
                .with_context(|| format!("Numéro invalide: '{}'", s))
        })
        .collect()
}

fn fixed<const N: usize>(values: Vec<u8>, what: &str) -> Result<[u8; N]> {
    let len = values.len();
    values
        .try_into()
        .map_err(|_| anyhow::anyhow!("{} : {} numéros attendus, {} reçus", what, N, len))
}

/// Numéros d'un tirage : `01 05 12 23 35+03 08`, `01 02 03 04 05 06+07`, `3 7 7` ou `377`.
pub fn parse_numbers(game: GameType, raw: &str) -> Result<DrawNumbers> {
    let raw = raw.trim();
    match game {
        GameType::FrontBack | GameType::RedBlue => {
            let Some((main, extra)) = raw.split_once('+') else {
                bail!("Séparateur '+' manquant dans '{}'", raw);
            };
            let main = parse_values(main)?;
            let extra = parse_values(extra)?;
            if game == GameType::FrontBack {
                DrawNumbers::front_back(fixed(main, "zone avant")?, fixed(extra, "zone arrière")?)
            } else {
                let [blue] = fixed::<1>(extra, "boule bleue")?;
                DrawNumbers::red_blue(fixed(main, "boules rouges")?, blue)
            }
        }
        GameType::Digits => {
            let values = if raw.contains(char::is_whitespace) {
                parse_values(raw)?
            } else {
                raw.chars()
                    .map(|c| {
                        c.to_digit(10)
                            .map(|d| d as u8)
                            .with_context(|| format!("Chiffre invalide: '{}'", c))
                    })
                    .collect::<Result<Vec<u8>>>()?
            };
            let [hundred, ten, unit] = fixed::<3>(values, "chiffres")?;
            DrawNumbers::digits(hundred, ten, unit)
        }
    }
}

fn parse_record(record: &csv::StringRecord) -> Result<DrawRecord> {
    let get = |idx: usize| -> Result<&str> {
        record
            .get(idx)
            .map(str::trim)
            .with_context(|| format!("Champ manquant à l'index {}", idx))
    };

    let game = GameType::from_code(get(0)?)?;
    let draw_number = get(1)?;
    if draw_number.is_empty() {
        bail!("Identifiant de tirage vide");
    }
    let date = parse_date(get(2)?)?;
    let numbers = parse_numbers(game, get(3)?)?;

    let sales = parse_french_decimal(record.get(4).unwrap_or_default())?;
    let pool = parse_french_decimal(record.get(5).unwrap_or_default())?;

    DrawRecord::new(draw_number, date, numbers).with_amounts(sales, pool)
}

#[derive(Debug, Default, PartialEq, Eq, Serialize)]
pub struct ImportResult {
    pub total_records: u32,
    pub inserted: u32,
    pub skipped: u32,
    pub errors: u32,
}

/// Lit un historique `game;draw_number;date;numbers;sales_amount;prize_pool`.
pub fn import_reader<R: Read>(store: &mut MemoryStore, input: R) -> Result<ImportResult> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(b';')
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(input);

    let mut result = ImportResult::default();

    for record_result in reader.records() {
        result.total_records += 1;
        match record_result {
            Ok(record) => match parse_record(&record) {
                Ok(draw) => {
                    if store.insert_draw(draw) {
                        result.inserted += 1;
                    } else {
                        result.skipped += 1;
                    }
                }
                Err(e) => {
                    warn!(line = result.total_records, "ligne rejetée : {:#}", e);
                    result.errors += 1;
                }
            },
            Err(e) => {
                warn!(line = result.total_records, "lecture impossible : {}", e);
                result.errors += 1;
            }
        }
    }

    Ok(result)
}

pub fn import_csv(store: &mut MemoryStore, path: &Path) -> Result<ImportResult> {
    let file = std::fs::File::open(path)
        .with_context(|| format!("Impossible d'ouvrir {:?}", path))?;
    import_reader(store, file)
}

#[cfg(test)]
mod tests {
    use super::*;
    use luckdraw_db::store::DrawSource;

    const HEADER: &str = "game;draw_number;date;numbers;sales_amount;prize_pool\n";

    #[test]
    fn test_parse_french_decimal() {
        assert!((parse_french_decimal("109156,50").unwrap().unwrap() - 109156.50).abs() < 0.001);
        assert!((parse_french_decimal("  42,5  ").unwrap().unwrap() - 42.5).abs() < 0.001);
        assert!((parse_french_decimal("1 250 000,00").unwrap().unwrap() - 1_250_000.0).abs() < 0.001);
        assert_eq!(parse_french_decimal("").unwrap(), None);
        assert!(parse_french_decimal("abc").is_err());
    }

    #[test]
    fn test_parse_date() {
        let expected = NaiveDate::from_ymd_opt(2026, 2, 17).unwrap();
        assert_eq!(parse_date("17/02/2026").unwrap(), expected);
        assert_eq!(parse_date("2026-02-17").unwrap(), expected);
        assert!(parse_date("2026/02/17").is_err());
    }

    #[test]
    fn test_parse_numbers_front_back() {
        let n = parse_numbers(GameType::FrontBack, "35 05 12 23 01+08 03").unwrap();
        assert_eq!(
            n,
            DrawNumbers::FrontBack {
                front: [1, 5, 12, 23, 35],
                back: [3, 8]
            }
        );
        assert!(parse_numbers(GameType::FrontBack, "01 05 12 23 35 03 08").is_err());
        assert!(parse_numbers(GameType::FrontBack, "01 05 12 23+03 08").is_err());
        assert!(parse_numbers(GameType::FrontBack, "01 05 12 23 36+03 08").is_err());
    }

    #[test]
    fn test_parse_numbers_red_blue() {
        let n = parse_numbers(GameType::RedBlue, "01 02 03 04 05 06+07").unwrap();
        assert_eq!(
            n,
            DrawNumbers::RedBlue {
                red: [1, 2, 3, 4, 5, 6],
                blue: 7
            }
        );
        assert!(parse_numbers(GameType::RedBlue, "01 02 03 04 05 06+07 08").is_err());
        assert!(parse_numbers(GameType::RedBlue, "01 01 03 04 05 06+07").is_err());
    }

    #[test]
    fn test_parse_numbers_digits() {
        let expected = DrawNumbers::Digits {
            hundred: 3,
            ten: 7,
            unit: 7,
        };
        assert_eq!(parse_numbers(GameType::Digits, "3 7 7").unwrap(), expected);
        assert_eq!(parse_numbers(GameType::Digits, "377").unwrap(), expected);
        assert!(parse_numbers(GameType::Digits, "3 7 10").is_err());
        assert!(parse_numbers(GameType::Digits, "37").is_err());
        assert!(parse_numbers(GameType::Digits, "3a7").is_err());
    }

    #[test]
    fn test_import_counts() {
        let csv = format!(
            "{HEADER}\
DLT;2024002;2024-06-30;01 05 12 23 35+03 08;250000000,00;800000000
DLT;2024001;28/06/2024;02 08 15 28 33+05 11;;
DLT;2024001;28/06/2024;02 08 15 28 33+05 11;;
SSQ;2024050;2024-06-30;01 02 03 04 05 06+07;;
FC3D;2024170;2024-06-30;377;;
FC3D;2024169;2024-06-29;3 7;;
XYZ;1;2024-06-29;1 2 3;;
"
        );
        let mut store = MemoryStore::new();
        let result = import_reader(&mut store, csv.as_bytes()).unwrap();
        assert_eq!(
            result,
            ImportResult {
                total_records: 7,
                inserted: 4,
                skipped: 1,
                errors: 2,
            }
        );

        let dlt = store.fetch_recent(GameType::FrontBack, 10).unwrap();
        assert_eq!(dlt.len(), 2);
        assert_eq!(dlt[0].draw_number(), "2024002");
        assert_eq!(dlt[0].sales_amount(), Some(250_000_000.0));
        assert_eq!(dlt[1].prize_pool(), None);
        assert_eq!(store.count(GameType::Digits).unwrap(), 1);
    }

    #[test]
    fn test_import_rejects_negative_amount() {
        let csv = format!("{HEADER}SSQ;2024050;2024-06-30;01 02 03 04 05 06+07;-5;\n");
        let mut store = MemoryStore::new();
        let result = import_reader(&mut store, csv.as_bytes()).unwrap();
        assert_eq!(result.errors, 1);
        assert_eq!(result.inserted, 0);
    }

    #[test]
    fn test_import_missing_file() {
        let mut store = MemoryStore::new();
        assert!(import_csv(&mut store, Path::new("/nonexistent/draws.csv")).is_err());
    }
}
