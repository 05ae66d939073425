use chrono::{DateTime, NaiveDate, NaiveDateTime};
use rust_decimal::{Decimal, RoundingStrategy};

use crate::error::{Error, Result};

const HUNDRED: Decimal = Decimal::ONE_HUNDRED;

/// Round a money amount to cents.
pub fn round_money(d: Decimal) -> Decimal {
    d.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// Round a percentage to one decimal place.
pub fn round_percent(d: Decimal) -> Decimal {
    d.round_dp_with_strategy(1, RoundingStrategy::MidpointAwayFromZero)
}

/// `part` as a percentage of `whole`, rounded; zero when `whole` is not positive.
///
/// # Errors
///
/// [`Error::AmountOverflow`] when the ratio does not fit in a `Decimal`.
pub fn percent_of(part: Decimal, whole: Decimal) -> Result<Decimal> {
    if whole <= Decimal::ZERO {
        return Ok(Decimal::ZERO);
    }
    part.checked_div(whole)
        .and_then(|ratio| ratio.checked_mul(HUNDRED))
        .map(round_percent)
        .ok_or(Error::AmountOverflow("a percentage"))
}

pub fn checked_add(a: Decimal, b: Decimal) -> Result<Decimal> {
    a.checked_add(b).ok_or(Error::AmountOverflow("a total"))
}

pub fn checked_sub(a: Decimal, b: Decimal) -> Result<Decimal> {
    a.checked_sub(b).ok_or(Error::AmountOverflow("a difference"))
}

/// Sum of `amounts`, or an error once it leaves the `Decimal` range.
pub fn checked_total<I>(amounts: I) -> Result<Decimal>
where
    I: IntoIterator<Item = Decimal>,
{
    amounts.into_iter().try_fold(Decimal::ZERO, checked_add)
}

pub fn fmt_money(d: &Decimal) -> String {
    format!("{:.2}", round_money(*d))
}

pub fn today() -> NaiveDate {
    chrono::Utc::now().date_naive()
}

/// Parse a client-supplied timestamp.
///
/// Accepts RFC 3339 (converted to UTC), `YYYY-MM-DDTHH:MM:SS[.f]`,
/// `YYYY-MM-DD HH:MM:SS[.f]` and a bare `YYYY-MM-DD` (midnight).
pub fn parse_timestamp(s: &str) -> Option<NaiveDateTime> {
    let s = s.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.naive_utc());
    }
    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, format) {
            return Some(dt);
        }
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rounds_money_half_away_from_zero() {
        assert_eq!(round_money(Decimal::new(12345, 3)), Decimal::new(1235, 2));
        assert_eq!(round_money(Decimal::new(-12345, 3)), Decimal::new(-1235, 2));
    }

    #[test]
    fn percent_of_zero_whole_is_zero() {
        assert_eq!(percent_of(Decimal::TEN, Decimal::ZERO).unwrap(), Decimal::ZERO);
        assert_eq!(percent_of(Decimal::TEN, Decimal::NEGATIVE_ONE).unwrap(), Decimal::ZERO);
    }

    #[test]
    fn percent_of_rounds_to_one_place() {
        // 1 / 3 = 33.333..%
        assert_eq!(percent_of(Decimal::ONE, Decimal::from(3)).unwrap(), Decimal::new(333, 1));
        assert_eq!(
            percent_of(Decimal::from(150), Decimal::from(100)).unwrap(),
            Decimal::from(150)
        );
    }

    #[test]
    fn oversized_ratio_is_an_error() {
        let huge = Decimal::from_i128_with_scale(10_i128.pow(27), 0);
        let cent = Decimal::new(1, 2);
        assert!(matches!(percent_of(huge, cent), Err(Error::AmountOverflow(_))));
        assert!(matches!(percent_of(Decimal::MAX, Decimal::new(5, 1)), Err(Error::AmountOverflow(_))));
    }

    #[test]
    fn totals_stop_at_the_decimal_range() {
        let amounts = [Decimal::new(1050, 2), Decimal::new(250, 2)];
        assert_eq!(checked_total(amounts).unwrap(), Decimal::from(13));
        assert_eq!(checked_total(Vec::new()).unwrap(), Decimal::ZERO);

        let half = Decimal::from_i128_with_scale(5 * 10_i128.pow(28), 0);
        assert!(matches!(checked_total([half, half]), Err(Error::AmountOverflow(_))));
        assert!(checked_sub(Decimal::MIN, Decimal::ONE).is_err());
    }

    #[test]
    fn money_formatting() {
        assert_eq!(fmt_money(&Decimal::new(425, 1)), "42.50");
        assert_eq!(fmt_money(&Decimal::ZERO), "0.00");
    }

    #[test]
    fn timestamp_formats() {
        let noon = NaiveDate::from_ymd_opt(2024, 5, 1)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap();
        assert_eq!(parse_timestamp("2024-05-01T12:00:00"), Some(noon));
        assert_eq!(parse_timestamp("2024-05-01 12:00:00"), Some(noon));
        assert_eq!(parse_timestamp("2024-05-01T12:00:00.000Z"), Some(noon));
        assert_eq!(parse_timestamp("2024-05-01T14:00:00+02:00"), Some(noon));
        assert_eq!(
            parse_timestamp("2024-05-01"),
            NaiveDate::from_ymd_opt(2024, 5, 1).unwrap().and_hms_opt(0, 0, 0)
        );
        assert_eq!(parse_timestamp("May 1st"), None);
        assert_eq!(parse_timestamp("2024-13-01"), None);
    }
}
