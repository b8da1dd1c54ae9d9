//! Tirages de test partagés entre les crates du workspace.

use chrono::{Days, NaiveDate};

use crate::models::{DrawNumbers, DrawRecord};

/// Date du tirage le plus récent des jeux de test.
pub fn base_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 6, 30).unwrap_or_default()
}

/// Date située `days_ago` jours avant `base_date()`.
pub fn date_ago(days_ago: u64) -> NaiveDate {
    base_date()
        .checked_sub_days(Days::new(days_ago))
        .unwrap_or_default()
}

pub fn front_back_draw(id: &str, days_ago: u64, mut front: [u8; 5], mut back: [u8; 2]) -> DrawRecord {
    front.sort_unstable();
    back.sort_unstable();
    DrawRecord::new(id, date_ago(days_ago), DrawNumbers::FrontBack { front, back })
}

pub fn red_blue_draw(id: &str, days_ago: u64, mut red: [u8; 6], blue: u8) -> DrawRecord {
    red.sort_unstable();
    DrawRecord::new(id, date_ago(days_ago), DrawNumbers::RedBlue { red, blue })
}

pub fn digits_draw(id: &str, days_ago: u64, hundred: u8, ten: u8, unit: u8) -> DrawRecord {
    DrawRecord::new(id, date_ago(days_ago), DrawNumbers::Digits { hundred, ten, unit })
}

/// n tirages DLT déterministes, draws[0] = le plus récent.
pub fn make_front_back_draws(n: usize) -> Vec<DrawRecord> {
    (0..n)
        .map(|i| {
            let base = (i % 7) as u8;
            front_back_draw(
                &format!("{:07}", 2024000 + n - i),
                i as u64,
                [
                    base * 5 + 1,
                    base * 5 + 2,
                    base * 5 + 3,
                    base * 5 + 4,
                    base * 5 + 5,
                ],
                [base % 12 + 1, (base + 1) % 12 + 1],
            )
        })
        .collect()
}

/// n tirages SSQ déterministes, draws[0] = le plus récent.
pub fn make_red_blue_draws(n: usize) -> Vec<DrawRecord> {
    (0..n)
        .map(|i| {
            let base = (i % 5) as u8;
            red_blue_draw(
                &format!("{:07}", 2024000 + n - i),
                i as u64,
                [
                    base * 6 + 1,
                    base * 6 + 2,
                    base * 6 + 3,
                    base * 6 + 4,
                    base * 6 + 5,
                    base * 6 + 6,
                ],
                base % 16 + 1,
            )
        })
        .collect()
}

/// n tirages 3D déterministes, draws[0] = le plus récent.
pub fn make_digit_draws(n: usize) -> Vec<DrawRecord> {
    (0..n)
        .map(|i| {
            let base = (i % 10) as u8;
            digits_draw(
                &format!("{:07}", 2024000 + n - i),
                i as u64,
                base % 10,
                (base * 3 + 1) % 10,
                (base * 7 + 2) % 10,
            )
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixtures_are_valid() {
        for draw in make_front_back_draws(30)
            .iter()
            .chain(make_red_blue_draws(30).iter())
            .chain(make_digit_draws(30).iter())
        {
            assert!(draw.numbers().validate().is_ok(), "{:?}", draw);
        }
    }

    #[test]
    fn test_fixtures_recent_first() {
        let draws = make_front_back_draws(10);
        for pair in draws.windows(2) {
            assert!(pair[0].draw_date() > pair[1].draw_date());
            assert!(pair[0].draw_number() > pair[1].draw_number());
        }
    }
}
