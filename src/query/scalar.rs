// ABOUTME: Column decoding into homogeneous scalar types
// ABOUTME: Implements text and integer conversions for result reduction

use crate::error::{DbUriError, Result};
use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, SecondsFormat, Utc};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use std::error::Error as StdError;
use tokio_postgres::types::{FromSql, Type};
use tokio_postgres::Row;
use uuid::Uuid;

/// A value every column of a reduced result is converted into
pub trait Scalar: Sized {
    /// Human-readable type name used in decode errors
    const TYPE_NAME: &'static str;

    /// Decode the column at `idx` of `row`
    ///
    /// # Errors
    ///
    /// Returns [`DbUriError::Decode`] naming the column if the value is NULL or
    /// cannot be represented as `Self`.
    fn decode(row: &Row, idx: usize) -> Result<Self>;
}

/// Text rendering of a column
///
/// Text-like columns are returned as stored. Integers, booleans, floats,
/// `numeric`, `uuid` and `json`/`jsonb` use their usual text forms; `date`,
/// `time` and `timestamp` are ISO 8601 and `timestamptz` is RFC 3339 in UTC.
impl Scalar for String {
    const TYPE_NAME: &'static str = "text";

    fn decode(row: &Row, idx: usize) -> Result<Self> {
        if let Some(n) = get_integer::<Self>(row, idx) {
            return n.map(|n| n.to_string());
        }

        let ty = row.columns()[idx].type_();
        if *ty == Type::BOOL {
            get::<bool, Self>(row, idx).map(|b| b.to_string())
        } else if *ty == Type::FLOAT4 {
            get::<f32, Self>(row, idx).map(|f| f.to_string())
        } else if *ty == Type::FLOAT8 {
            get::<f64, Self>(row, idx).map(|f| f.to_string())
        } else if *ty == Type::NUMERIC {
            get::<Decimal, Self>(row, idx).map(|d| d.to_string())
        } else if *ty == Type::TIMESTAMPTZ {
            get::<DateTime<Utc>, Self>(row, idx).map(timestamptz_text)
        } else if *ty == Type::TIMESTAMP {
            get::<NaiveDateTime, Self>(row, idx).map(timestamp_text)
        } else if *ty == Type::DATE {
            get::<NaiveDate, Self>(row, idx).map(|d| d.to_string())
        } else if *ty == Type::TIME {
            get::<NaiveTime, Self>(row, idx).map(|t| t.to_string())
        } else if *ty == Type::UUID {
            get::<Uuid, Self>(row, idx).map(|u| u.to_string())
        } else if *ty == Type::JSON || *ty == Type::JSONB {
            get::<serde_json::Value, Self>(row, idx).map(|v| v.to_string())
        } else {
            get::<String, Self>(row, idx)
        }
    }
}

impl Scalar for i64 {
    const TYPE_NAME: &'static str = "integer";

    fn decode(row: &Row, idx: usize) -> Result<Self> {
        if let Some(n) = get_integer::<Self>(row, idx) {
            return n;
        }

        // sum() and friends over integers return numeric
        if *row.columns()[idx].type_() == Type::NUMERIC {
            let value = get::<Decimal, Self>(row, idx)?;
            return integral_decimal(value).ok_or_else(|| {
                decode_error::<Self>(row, idx, format!("'{}' is not a 64-bit integer", value))
            });
        }

        let text = get::<String, Self>(row, idx)?;
        text.trim()
            .parse::<i64>()
            .map_err(|e| decode_error::<Self>(row, idx, format!("'{}': {}", text, e)))
    }
}

/// Widen integer-typed columns to i64; `None` for any other column type
fn get_integer<S: Scalar>(row: &Row, idx: usize) -> Option<Result<i64>> {
    let ty = row.columns()[idx].type_();
    if *ty == Type::INT2 {
        Some(get::<i16, S>(row, idx).map(i64::from))
    } else if *ty == Type::INT4 {
        Some(get::<i32, S>(row, idx).map(i64::from))
    } else if *ty == Type::INT8 {
        Some(get::<i64, S>(row, idx))
    } else if *ty == Type::OID {
        Some(get::<u32, S>(row, idx).map(i64::from))
    } else {
        None
    }
}

fn integral_decimal(value: Decimal) -> Option<i64> {
    if value.fract().is_zero() {
        value.to_i64()
    } else {
        None
    }
}

fn timestamptz_text(value: DateTime<Utc>) -> String {
    value.to_rfc3339_opts(SecondsFormat::AutoSi, true)
}

fn timestamp_text(value: NaiveDateTime) -> String {
    value.format("%Y-%m-%dT%H:%M:%S%.f").to_string()
}

/// Fetch a non-NULL column as `V`, reporting failures against scalar type `S`
fn get<'a, V, S>(row: &'a Row, idx: usize) -> Result<V>
where
    V: FromSql<'a>,
    S: Scalar,
{
    match row.try_get::<_, Option<V>>(idx) {
        Ok(Some(value)) => Ok(value),
        Ok(None) => Err(decode_error::<S>(row, idx, "value is NULL".to_string())),
        Err(e) => Err(decode_error::<S>(row, idx, error_chain(&e))),
    }
}

/// Render an error followed by each of its causes
fn error_chain(err: &(dyn StdError + 'static)) -> String {
    let mut message = err.to_string();
    let mut cause = err.source();
    while let Some(e) = cause {
        message.push_str(": ");
        message.push_str(&e.to_string());
        cause = e.source();
    }
    message
}

fn decode_error<S: Scalar>(row: &Row, idx: usize, reason: String) -> DbUriError {
    DbUriError::Decode {
        column: row.columns()[idx].name().to_string(),
        expected: S::TYPE_NAME,
        reason,
    }
}
