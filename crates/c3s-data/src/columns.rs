//! Amounts are stored as TEXT columns, SQLite has no decimal type.

use std::str::FromStr;

use rust_decimal::Decimal;
use sqlx::{sqlite::SqliteRow, Row};

pub(crate) fn decimal(row: &SqliteRow, column: &str) -> Result<Decimal, sqlx::Error> {
    let value: String = row.try_get(column)?;
    Decimal::from_str(&value).map_err(|e| sqlx::Error::Decode(Box::new(e)))
}

pub(crate) fn optional_decimal(
    row: &SqliteRow,
    column: &str,
) -> Result<Option<Decimal>, sqlx::Error> {
    let value: Option<String> = row.try_get(column)?;
    value
        .map(|v| Decimal::from_str(&v))
        .transpose()
        .map_err(|e| sqlx::Error::Decode(Box::new(e)))
}
