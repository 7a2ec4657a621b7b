//! The decimal currency type used for every amount in the application.
//!
//! Amounts are kept to two decimal places (cents). In the database they are
//! stored as integer cents so that `SUM` over a column is exact.

use std::{
    fmt::Display,
    ops::{Add, Sub},
};

use rusqlite::{
    ToSql,
    types::{FromSql, FromSqlError, FromSqlResult, ToSqlOutput, ValueRef},
};
use rust_decimal::{Decimal, prelude::ToPrimitive};
use serde::{Deserialize, Deserializer, Serialize};

/// An amount of money, e.g. an expense of R$ 1.100,00.
///
/// Serializes to and from a JSON number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize)]
#[serde(transparent)]
pub struct Money(#[serde(serialize_with = "rust_decimal::serde::float::serialize")] Decimal);

impl Money {
    /// Zero of the currency.
    pub const ZERO: Money = Money(Decimal::ZERO);

    /// The largest amount accepted for a single record, R$ 100 billion.
    ///
    /// Keeps `SUM` over many records well inside the range of an `i64` of cents.
    pub const MAX: Money = Money(Decimal::from_parts(1_316_134_912, 2_328, 0, false, 2));

    /// Create an amount from a decimal, rounding to whole cents.
    pub fn new(amount: Decimal) -> Self {
        Self(amount.round_dp(2))
    }

    /// Create an amount from a number of cents, e.g. `Money::from_cents(12345)` is 123.45.
    pub fn from_cents(cents: i64) -> Self {
        Self(Decimal::new(cents, 2))
    }

    /// The amount as a whole number of cents.
    ///
    /// Returns `None` if the amount does not fit in an `i64`.
    pub fn to_cents(self) -> Option<i64> {
        (self.0.round_dp(2) * Decimal::ONE_HUNDRED).to_i64()
    }

    /// The underlying decimal value.
    pub fn as_decimal(&self) -> Decimal {
        self.0
    }

    /// The amount as a float, for display purposes only.
    pub fn to_f64(self) -> f64 {
        self.0.to_f64().unwrap_or_default()
    }

    /// Whether the amount is strictly greater than zero.
    pub fn is_positive(&self) -> bool {
        *self > Money::ZERO
    }

    /// Whether the amount is strictly less than zero.
    pub fn is_negative(&self) -> bool {
        *self < Money::ZERO
    }

    /// Whether the amount lies between `-Money::MAX` and `Money::MAX` inclusive.
    pub fn is_within_limit(&self) -> bool {
        self.0.abs() <= Money::MAX.0
    }
}

impl From<Decimal> for Money {
    fn from(value: Decimal) -> Self {
        Self::new(value)
    }
}

impl<'de> Deserialize<'de> for Money {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        rust_decimal::serde::float::deserialize(deserializer).map(Money::new)
    }
}

impl Display for Money {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.2}", self.0)
    }
}

impl Add for Money {
    type Output = Money;

    fn add(self, rhs: Self) -> Self::Output {
        Money(self.0 + rhs.0)
    }
}

impl Sub for Money {
    type Output = Money;

    fn sub(self, rhs: Self) -> Self::Output {
        Money(self.0 - rhs.0)
    }
}

impl ToSql for Money {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        let cents = self.to_cents().ok_or_else(|| {
            rusqlite::Error::ToSqlConversionFailure(
                format!("the amount {self} is too large to store").into(),
            )
        })?;

        Ok(ToSqlOutput::from(cents))
    }
}

impl FromSql for Money {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        match value {
            ValueRef::Integer(cents) => Ok(Money::from_cents(cents)),
            _ => Err(FromSqlError::InvalidType),
        }
    }
}

#[cfg(test)]
mod money_tests {
    use rust_decimal::Decimal;

    use super::Money;

    #[test]
    fn new_rounds_to_cents() {
        let amount = Money::new(Decimal::new(123456, 3));

        assert_eq!(amount, Money::from_cents(12346));
    }

    #[test]
    fn converts_to_cents() {
        assert_eq!(Money::from_cents(110000).to_cents(), Some(110000));
    }

    #[test]
    fn deserializes_from_json_numbers() {
        let integer: Money = serde_json::from_str("100").unwrap();
        let float: Money = serde_json::from_str("0.1").unwrap();

        assert_eq!(integer, Money::from_cents(10000));
        assert_eq!(float, Money::from_cents(10));
    }

    #[test]
    fn serializes_as_json_number() {
        let json = serde_json::to_string(&Money::from_cents(5050)).unwrap();

        assert_eq!(json, "50.5");
    }

    #[test]
    fn arithmetic_is_exact() {
        let total = Money::from_cents(10) + Money::from_cents(20);

        assert_eq!(total, Money::from_cents(30));
        assert_eq!(total.to_string(), "0.30");
        assert_eq!(total - Money::from_cents(30), Money::ZERO);
    }

    #[test]
    fn max_is_one_hundred_billion() {
        assert_eq!(Money::MAX, Money::from_cents(10_000_000_000_000));
    }

    #[test]
    fn limit_is_inclusive() {
        let just_over = Money::MAX + Money::from_cents(1);

        assert!(Money::MAX.is_within_limit());
        assert!(Money::from_cents(-10_000_000_000_000).is_within_limit());
        assert!(!just_over.is_within_limit());
        assert!(!Money::new(Decimal::new(100_000_000_000_000_000, 0)).is_within_limit());
    }

    #[test]
    fn round_trips_through_sqlite() {
        let connection = rusqlite::Connection::open_in_memory().unwrap();
        connection
            .execute("CREATE TABLE amounts (amount INTEGER NOT NULL)", ())
            .unwrap();
        connection
            .execute(
                "INSERT INTO amounts (amount) VALUES (?1), (?2)",
                (Money::from_cents(1999), Money::from_cents(1)),
            )
            .unwrap();

        let total: Money = connection
            .query_row("SELECT SUM(amount) FROM amounts", [], |row| row.get(0))
            .unwrap();

        assert_eq!(total, Money::from_cents(2000));
    }
}
