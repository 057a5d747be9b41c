use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime};
use rand::Rng;
use rand::distr::Alphanumeric;
use rand::seq::IndexedRandom;

/// Length ceiling when a character column declares no maximum.
pub const DEFAULT_TEXT_MAX: usize = 32;
/// Length ceiling for text/blob columns whose declared maximum is huge.
pub const TEXT_CAP: usize = 255;
pub const DEFAULT_PRECISION: u32 = 10;
const MAX_INTEGER_DIGITS: u32 = 18;

fn date_min() -> NaiveDate {
    NaiveDate::from_ymd_opt(1971, 1, 1).unwrap_or_default()
}

fn date_max() -> NaiveDate {
    NaiveDate::from_ymd_opt(2037, 12, 31).unwrap_or_default()
}

pub fn random_int_range(min: i64, max: i64, rng: &mut impl Rng) -> i64 {
    if min >= max {
        return min;
    }
    rng.random_range(min..=max)
}

/// Non-negative decimal text with `precision - scale` integer digits and
/// exactly `scale` fractional digits.
pub fn random_decimal(precision: Option<i64>, scale: Option<i64>, rng: &mut impl Rng) -> String {
    let precision = precision
        .filter(|value| *value > 0)
        .map(|value| value as u32)
        .unwrap_or(DEFAULT_PRECISION);
    let scale = scale
        .filter(|value| *value >= 0)
        .map(|value| value as u32)
        .unwrap_or(0)
        .min(precision);
    let integer_digits = (precision - scale).min(MAX_INTEGER_DIGITS);

    let integer_part = if integer_digits == 0 {
        0
    } else {
        rng.random_range(0..10_u64.pow(integer_digits))
    };

    let mut out = integer_part.to_string();
    if scale > 0 {
        out.push('.');
        for _ in 0..scale {
            out.push(char::from(b'0' + rng.random_range(0..10_u8)));
        }
    }
    out
}

fn bounded_len(max_len: Option<i64>, rng: &mut impl Rng) -> usize {
    let max = max_len
        .map(|value| value.max(0) as usize)
        .unwrap_or(DEFAULT_TEXT_MAX)
        .min(TEXT_CAP);
    if max == 0 {
        return 0;
    }
    rng.random_range(1..=max)
}

pub fn random_string(max_len: Option<i64>, rng: &mut impl Rng) -> String {
    let len = bounded_len(max_len, rng);
    (0..len)
        .map(|_| char::from(rng.sample(Alphanumeric)))
        .collect()
}

pub fn random_binary(max_len: Option<i64>, rng: &mut impl Rng) -> Vec<u8> {
    let len = bounded_len(max_len, rng);
    (0..len).map(|_| rng.random::<u8>()).collect()
}

pub fn random_date(rng: &mut impl Rng) -> NaiveDate {
    let min = date_min();
    let span = (date_max() - min).num_days();
    min + Duration::days(rng.random_range(0..=span))
}

pub fn random_time(rng: &mut impl Rng) -> NaiveTime {
    let seconds = rng.random_range(0..86_400_u32);
    NaiveTime::from_num_seconds_from_midnight_opt(seconds, 0).unwrap_or_default()
}

pub fn random_datetime(rng: &mut impl Rng) -> NaiveDateTime {
    let date = random_date(rng);
    NaiveDateTime::new(date, random_time(rng))
}

pub fn random_year(current_year: i32, rng: &mut impl Rng) -> i64 {
    let current = i64::from(current_year);
    random_int_range(current - 1, current, rng)
}

pub fn random_enum(labels: &[String], rng: &mut impl Rng) -> Option<String> {
    labels.choose(rng).cloned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn rng() -> ChaCha8Rng {
        ChaCha8Rng::seed_from_u64(7)
    }

    #[test]
    fn int_range_stays_inside_bounds() {
        let mut rng = rng();
        for _ in 0..1000 {
            let value = random_int_range(0, 1, &mut rng);
            assert!((0..=1).contains(&value));
        }
        assert_eq!(random_int_range(5, 5, &mut rng), 5);
    }

    #[test]
    fn decimal_honors_precision_and_scale() {
        let mut rng = rng();
        for _ in 0..500 {
            let value = random_decimal(Some(5), Some(2), &mut rng);
            let (integer, fraction) = value.split_once('.').expect("fraction");
            assert!(integer.len() <= 3, "{value}");
            assert_eq!(fraction.len(), 2, "{value}");
            assert!(value.parse::<f64>().unwrap() < 1000.0);
        }
    }

    #[test]
    fn decimal_without_fraction_or_integer_digits() {
        let mut rng = rng();
        let value = random_decimal(Some(4), None, &mut rng);
        assert!(!value.contains('.'));
        assert!(value.parse::<u64>().unwrap() < 10_000);

        let value = random_decimal(Some(3), Some(3), &mut rng);
        assert!(value.starts_with("0."));
        assert_eq!(value.len(), 5);
    }

    #[test]
    fn string_respects_declared_length() {
        let mut rng = rng();
        for _ in 0..500 {
            let value = random_string(Some(5), &mut rng);
            assert!(!value.is_empty() && value.len() <= 5);
            assert!(value.chars().all(|ch| ch.is_ascii_alphanumeric()));
        }
        assert_eq!(random_string(Some(0), &mut rng), "");
        assert!(random_string(None, &mut rng).len() <= DEFAULT_TEXT_MAX);
        assert!(random_string(Some(4_294_967_295), &mut rng).len() <= TEXT_CAP);
    }

    #[test]
    fn binary_respects_declared_length() {
        let mut rng = rng();
        for _ in 0..200 {
            assert!(random_binary(Some(16), &mut rng).len() <= 16);
        }
    }

    #[test]
    fn dates_and_years_stay_in_window() {
        let mut rng = rng();
        for _ in 0..500 {
            let date = random_date(&mut rng);
            assert!(date >= date_min() && date <= date_max());
            let year = random_year(2026, &mut rng);
            assert!(year == 2025 || year == 2026);
        }
    }

    #[test]
    fn enum_picks_declared_label() {
        let mut rng = rng();
        let labels = vec!["a".to_string(), "b".to_string()];
        for _ in 0..50 {
            let picked = random_enum(&labels, &mut rng).expect("label");
            assert!(labels.contains(&picked));
        }
        assert!(random_enum(&[], &mut rng).is_none());
    }
}
