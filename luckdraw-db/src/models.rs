use std::fmt;
use std::ops::RangeInclusive;

use anyhow::{bail, Result};
use chrono::NaiveDate;
use serde::ser::SerializeStruct;
use serde::{Deserialize, Serialize, Serializer};

/// Les trois formats de jeu pris en charge.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, clap::ValueEnum,
)]
pub enum GameType {
    /// 5 numéros avant (1-35) + 2 numéros arrière (1-12)
    #[serde(rename = "DLT")]
    #[value(name = "dlt", alias = "front-back")]
    FrontBack,
    /// 6 boules rouges (1-33) + 1 boule bleue (1-16)
    #[serde(rename = "SSQ")]
    #[value(name = "ssq", alias = "red-blue")]
    RedBlue,
    /// 3 chiffres (0-9) : centaines, dizaines, unités
    #[serde(rename = "FC3D")]
    #[value(name = "fc3d", alias = "digits")]
    Digits,
}

impl GameType {
    pub fn code(&self) -> &'static str {
        match self {
            GameType::FrontBack => "DLT",
            GameType::RedBlue => "SSQ",
            GameType::Digits => "FC3D",
        }
    }

    pub fn zones(&self) -> &'static [Zone] {
        match self {
            GameType::FrontBack => &[Zone::Front, Zone::Back],
            GameType::RedBlue => &[Zone::Red, Zone::Blue],
            GameType::Digits => &[Zone::Digit],
        }
    }

    /// Nombre de numéros apportés par un tirage (7, 7 ou 3).
    pub fn numbers_per_draw(&self) -> usize {
        self.zones().iter().map(|z| z.pick_count()).sum()
    }

    pub fn from_code(code: &str) -> Result<Self> {
        match code.trim().to_ascii_uppercase().as_str() {
            "DLT" | "FRONTBACK" | "FRONT-BACK" => Ok(GameType::FrontBack),
            "SSQ" | "REDBLUE" | "RED-BLUE" => Ok(GameType::RedBlue),
            "FC3D" | "3D" | "DIGITS" => Ok(GameType::Digits),
            other => bail!("Type de jeu inconnu : '{}'", other),
        }
    }
}

impl fmt::Display for GameType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Groupe structurel de numéros à l'intérieur d'un tirage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Zone {
    Front,
    Back,
    Red,
    Blue,
    Digit,
}

impl Zone {
    pub fn range(&self) -> RangeInclusive<u8> {
        match self {
            Zone::Front => 1..=35,
            Zone::Back => 1..=12,
            Zone::Red => 1..=33,
            Zone::Blue => 1..=16,
            Zone::Digit => 0..=9,
        }
    }

    pub fn pick_count(&self) -> usize {
        match self {
            Zone::Front => 5,
            Zone::Back => 2,
            Zone::Red => 6,
            Zone::Blue => 1,
            Zone::Digit => 3,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Zone::Front => "front",
            Zone::Back => "back",
            Zone::Red => "red",
            Zone::Blue => "blue",
            Zone::Digit => "digit",
        }
    }
}

impl fmt::Display for Zone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Clé de comptage : un numéro qualifié par sa zone.
/// Le 05 avant et le 05 arrière sont deux tokens distincts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Deserialize)]
pub struct Token {
    pub zone: Zone,
    pub value: u8,
}

impl Token {
    pub fn new(zone: Zone, value: u8) -> Self {
        Self { zone, value }
    }

    /// Forme canonique : deux caractères pour avant/arrière/rouge/bleu, un chiffre sinon.
    pub fn canonical(&self) -> String {
        match self.zone {
            Zone::Digit => self.value.to_string(),
            _ => format!("{:02}", self.value),
        }
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.zone, self.canonical())
    }
}

/// Sérialisé avec sa forme canonique (`"05"`), ignorée à la relecture.
impl Serialize for Token {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("Token", 3)?;
        state.serialize_field("zone", &self.zone)?;
        state.serialize_field("value", &self.value)?;
        state.serialize_field("canonical", &self.canonical())?;
        state.end()
    }
}

/// Numéros d'un tirage, un variant par format de jeu.
/// Les ensembles (avant, arrière, rouges) sont triés par ordre croissant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "layout", rename_all = "snake_case", try_from = "RawDrawNumbers")]
pub enum DrawNumbers {
    FrontBack { front: [u8; 5], back: [u8; 2] },
    RedBlue { red: [u8; 6], blue: u8 },
    Digits { hundred: u8, ten: u8, unit: u8 },
}

/// Forme relue depuis JSON, avant validation.
#[derive(Deserialize)]
#[serde(tag = "layout", rename_all = "snake_case")]
enum RawDrawNumbers {
    FrontBack { front: [u8; 5], back: [u8; 2] },
    RedBlue { red: [u8; 6], blue: u8 },
    Digits { hundred: u8, ten: u8, unit: u8 },
}

impl TryFrom<RawDrawNumbers> for DrawNumbers {
    type Error = anyhow::Error;

    fn try_from(raw: RawDrawNumbers) -> Result<Self> {
        match raw {
            RawDrawNumbers::FrontBack { front, back } => DrawNumbers::front_back(front, back),
            RawDrawNumbers::RedBlue { red, blue } => DrawNumbers::red_blue(red, blue),
            RawDrawNumbers::Digits { hundred, ten, unit } => {
                DrawNumbers::digits(hundred, ten, unit)
            }
        }
    }
}

/// Une prédiction a exactement la forme d'un tirage.
pub type PredictedNumbers = DrawNumbers;

impl DrawNumbers {
    pub fn front_back(mut front: [u8; 5], mut back: [u8; 2]) -> Result<Self> {
        validate_distinct(&front, Zone::Front)?;
        validate_distinct(&back, Zone::Back)?;
        front.sort_unstable();
        back.sort_unstable();
        Ok(DrawNumbers::FrontBack { front, back })
    }

    pub fn red_blue(mut red: [u8; 6], blue: u8) -> Result<Self> {
        validate_distinct(&red, Zone::Red)?;
        validate_range(blue, Zone::Blue)?;
        red.sort_unstable();
        Ok(DrawNumbers::RedBlue { red, blue })
    }

    pub fn digits(hundred: u8, ten: u8, unit: u8) -> Result<Self> {
        for d in [hundred, ten, unit] {
            validate_range(d, Zone::Digit)?;
        }
        Ok(DrawNumbers::Digits { hundred, ten, unit })
    }

    pub fn game(&self) -> GameType {
        match self {
            DrawNumbers::FrontBack { .. } => GameType::FrontBack,
            DrawNumbers::RedBlue { .. } => GameType::RedBlue,
            DrawNumbers::Digits { .. } => GameType::Digits,
        }
    }

    /// Numéros regroupés par zone, dans l'ordre des zones du jeu.
    pub fn groups(&self) -> Vec<(Zone, Vec<u8>)> {
        match self {
            DrawNumbers::FrontBack { front, back } => {
                vec![(Zone::Front, front.to_vec()), (Zone::Back, back.to_vec())]
            }
            DrawNumbers::RedBlue { red, blue } => {
                vec![(Zone::Red, red.to_vec()), (Zone::Blue, vec![*blue])]
            }
            DrawNumbers::Digits { hundred, ten, unit } => {
                vec![(Zone::Digit, vec![*hundred, *ten, *unit])]
            }
        }
    }

    /// Tous les tokens du tirage, un par position (les chiffres répétés comptent deux fois).
    pub fn tokens(&self) -> Vec<Token> {
        self.groups()
            .into_iter()
            .flat_map(|(zone, values)| values.into_iter().map(move |v| Token::new(zone, v)))
            .collect()
    }

    pub fn validate(&self) -> Result<()> {
        match self {
            DrawNumbers::FrontBack { front, back } => {
                validate_distinct(front, Zone::Front)?;
                validate_distinct(back, Zone::Back)
            }
            DrawNumbers::RedBlue { red, blue } => {
                validate_distinct(red, Zone::Red)?;
                validate_range(*blue, Zone::Blue)
            }
            DrawNumbers::Digits { hundred, ten, unit } => {
                for &d in [hundred, ten, unit] {
                    validate_range(d, Zone::Digit)?;
                }
                Ok(())
            }
        }
    }
}

impl fmt::Display for DrawNumbers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let join = |zone: Zone, values: &[u8]| {
            values
                .iter()
                .map(|&v| Token::new(zone, v).canonical())
                .collect::<Vec<_>>()
                .join(" ")
        };
        match self {
            DrawNumbers::FrontBack { front, back } => {
                write!(f, "{} + {}", join(Zone::Front, front), join(Zone::Back, back))
            }
            DrawNumbers::RedBlue { red, blue } => {
                write!(f, "{} + {}", join(Zone::Red, red), join(Zone::Blue, &[*blue]))
            }
            DrawNumbers::Digits { hundred, ten, unit } => write!(f, "{}{}{}", hundred, ten, unit),
        }
    }
}

fn validate_range(value: u8, zone: Zone) -> Result<()> {
    let range = zone.range();
    if !range.contains(&value) {
        bail!(
            "Numéro {} ({}) hors limites ({}-{})",
            value,
            zone,
            range.start(),
            range.end()
        );
    }
    Ok(())
}

fn validate_distinct(values: &[u8], zone: Zone) -> Result<()> {
    for &v in values {
        validate_range(v, zone)?;
    }
    for i in 0..values.len() {
        for j in (i + 1)..values.len() {
            if values[i] == values[j] {
                bail!("Numéro {} en double : {}", zone, values[i]);
            }
        }
    }
    Ok(())
}

/// Un tirage historique. Le variant des numéros est figé à la construction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawDrawRecord")]
pub struct DrawRecord {
    draw_number: String,
    draw_date: NaiveDate,
    numbers: DrawNumbers,
    sales_amount: Option<f64>,
    prize_pool: Option<f64>,
}

#[derive(Deserialize)]
struct RawDrawRecord {
    draw_number: String,
    draw_date: NaiveDate,
    numbers: DrawNumbers,
    sales_amount: Option<f64>,
    prize_pool: Option<f64>,
}

impl TryFrom<RawDrawRecord> for DrawRecord {
    type Error = anyhow::Error;

    fn try_from(raw: RawDrawRecord) -> Result<Self> {
        if raw.draw_number.trim().is_empty() {
            bail!("Identifiant de tirage vide");
        }
        DrawRecord::new(raw.draw_number, raw.draw_date, raw.numbers)
            .with_amounts(raw.sales_amount, raw.prize_pool)
    }
}

impl DrawRecord {
    pub fn new(draw_number: impl Into<String>, draw_date: NaiveDate, numbers: DrawNumbers) -> Self {
        Self {
            draw_number: draw_number.into(),
            draw_date,
            numbers,
            sales_amount: None,
            prize_pool: None,
        }
    }

    pub fn with_amounts(mut self, sales_amount: Option<f64>, prize_pool: Option<f64>) -> Result<Self> {
        for amount in [sales_amount, prize_pool].into_iter().flatten() {
            if !amount.is_finite() || amount < 0.0 {
                bail!("Montant invalide pour le tirage {} : {}", self.draw_number, amount);
            }
        }
        self.sales_amount = sales_amount;
        self.prize_pool = prize_pool;
        Ok(self)
    }

    pub fn draw_number(&self) -> &str {
        &self.draw_number
    }

    pub fn draw_date(&self) -> NaiveDate {
        self.draw_date
    }

    pub fn numbers(&self) -> &DrawNumbers {
        &self.numbers
    }

    pub fn game(&self) -> GameType {
        self.numbers.game()
    }

    pub fn sales_amount(&self) -> Option<f64> {
        self.sales_amount
    }

    pub fn prize_pool(&self) -> Option<f64> {
        self.prize_pool
    }
}

/// Trie du plus récent au plus ancien (date puis identifiant décroissants).
pub fn sort_recent_first(records: &mut [DrawRecord]) {
    records.sort_by(|a, b| {
        b.draw_date
            .cmp(&a.draw_date)
            .then_with(|| b.draw_number.cmp(&a.draw_number))
    });
}

/// Identifiant du tirage suivant, complété par des zéros (au moins 4 caractères).
pub fn next_draw_number(draw_number: &str) -> Option<String> {
    let trimmed = draw_number.trim();
    if trimmed.is_empty() || !trimmed.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let next = trimmed.parse::<u64>().ok()?.checked_add(1)?;
    let width = trimmed.len().max(4);
    Some(format!("{:0width$}", next, width = width))
}
