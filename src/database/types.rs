//! SQL Server type mapping to Rust types.

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tiberius::{ColumnData, Row, ToSql};
use uuid::Uuid;

/// A scalar result cell that can be serialized to JSON.
///
/// `Null` serializes to an explicit JSON `null`, never an omitted field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SqlValue {
    Null,
    Bool(bool),
    I16(i16),
    I32(i32),
    I64(i64),
    F32(f32),
    F64(f64),
    String(String),
    Bytes(Vec<u8>),
    Decimal(Decimal),
    Uuid(Uuid),
    Date(NaiveDate),
    Time(NaiveTime),
    DateTime(NaiveDateTime),
    DateTimeUtc(DateTime<Utc>),
}

impl SqlValue {
    /// Check if this value is null.
    pub fn is_null(&self) -> bool {
        matches!(self, SqlValue::Null)
    }

    /// Convert to a display string.
    pub fn to_display_string(&self) -> String {
        match self {
            SqlValue::Null => "NULL".to_string(),
            SqlValue::Bool(v) => v.to_string(),
            SqlValue::I16(v) => v.to_string(),
            SqlValue::I32(v) => v.to_string(),
            SqlValue::I64(v) => v.to_string(),
            SqlValue::F32(v) => v.to_string(),
            SqlValue::F64(v) => v.to_string(),
            SqlValue::String(v) => v.clone(),
            SqlValue::Bytes(v) => format!("0x{}", hex::encode(v)),
            SqlValue::Decimal(v) => v.to_string(),
            SqlValue::Uuid(v) => v.to_string(),
            SqlValue::Date(v) => v.to_string(),
            SqlValue::Time(v) => v.to_string(),
            SqlValue::DateTime(v) => v.to_string(),
            SqlValue::DateTimeUtc(v) => v.to_rfc3339(),
        }
    }
}

/// A caller-supplied procedure parameter value.
///
/// Deserialized from the request payload; variant order matters for the
/// untagged representation (dates must be tried before plain text).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParamValue {
    Null,
    Bool(bool),
    Integer(i64),
    Float(f64),
    Date(NaiveDate),
    Text(String),
}

impl ToSql for ParamValue {
    fn to_sql(&self) -> ColumnData<'_> {
        match self {
            ParamValue::Null => ColumnData::String(None),
            ParamValue::Bool(v) => v.to_sql(),
            ParamValue::Integer(v) => v.to_sql(),
            ParamValue::Float(v) => v.to_sql(),
            ParamValue::Date(v) => v.to_sql(),
            ParamValue::Text(v) => v.to_sql(),
        }
    }
}

/// Type mapper for converting SQL Server column values to [`SqlValue`].
pub struct TypeMapper;

impl TypeMapper {
    /// Extract a value from a row column by index.
    pub fn extract_column(row: &Row, idx: usize) -> SqlValue {
        if row.columns().get(idx).is_none() {
            return SqlValue::Null;
        }

        // Try each type in order of likelihood. Strings first.
        if let Some(v) = row.try_get::<&str, _>(idx).ok().flatten() {
            return SqlValue::String(v.to_string());
        }

        if let Some(v) = row.try_get::<i32, _>(idx).ok().flatten() {
            return SqlValue::I32(v);
        }
        if let Some(v) = row.try_get::<i64, _>(idx).ok().flatten() {
            return SqlValue::I64(v);
        }
        if let Some(v) = row.try_get::<i16, _>(idx).ok().flatten() {
            return SqlValue::I16(v);
        }
        // TINYINT surfaces as u8.
        if let Some(v) = row.try_get::<u8, _>(idx).ok().flatten() {
            return SqlValue::I16(v as i16);
        }

        if let Some(v) = row.try_get::<f64, _>(idx).ok().flatten() {
            return SqlValue::F64(v);
        }
        if let Some(v) = row.try_get::<f32, _>(idx).ok().flatten() {
            return SqlValue::F32(v);
        }

        if let Some(v) = row.try_get::<Decimal, _>(idx).ok().flatten() {
            return SqlValue::Decimal(v);
        }

        if let Some(v) = row.try_get::<bool, _>(idx).ok().flatten() {
            return SqlValue::Bool(v);
        }

        if let Some(v) = row.try_get::<Uuid, _>(idx).ok().flatten() {
            return SqlValue::Uuid(v);
        }

        if let Some(v) = row.try_get::<NaiveDateTime, _>(idx).ok().flatten() {
            return SqlValue::DateTime(v);
        }
        if let Some(v) = row.try_get::<NaiveDate, _>(idx).ok().flatten() {
            return SqlValue::Date(v);
        }
        if let Some(v) = row.try_get::<NaiveTime, _>(idx).ok().flatten() {
            return SqlValue::Time(v);
        }
        if let Some(v) = row.try_get::<DateTime<Utc>, _>(idx).ok().flatten() {
            return SqlValue::DateTimeUtc(v);
        }

        if let Some(v) = row.try_get::<&[u8], _>(idx).ok().flatten() {
            return SqlValue::Bytes(v.to_vec());
        }

        SqlValue::Null
    }
}

/// Hex encoding helper (minimal implementation to avoid an extra dependency).
mod hex {
    pub fn encode(bytes: &[u8]) -> String {
        bytes.iter().map(|b| format!("{b:02X}")).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sql_value_display() {
        assert_eq!(SqlValue::Null.to_display_string(), "NULL");
        assert_eq!(SqlValue::I32(42).to_display_string(), "42");
        assert_eq!(
            SqlValue::String("hello".to_string()).to_display_string(),
            "hello"
        );
        assert_eq!(SqlValue::Bool(true).to_display_string(), "true");
    }

    #[test]
    fn test_null_serializes_to_json_null() {
        let json = serde_json::to_value(SqlValue::Null).unwrap();
        assert!(json.is_null());
    }

    #[test]
    fn test_scalar_serialization_shapes() {
        assert_eq!(
            serde_json::to_value(SqlValue::I64(7)).unwrap(),
            serde_json::json!(7)
        );
        assert_eq!(
            serde_json::to_value(SqlValue::String("x".into())).unwrap(),
            serde_json::json!("x")
        );
        assert_eq!(
            serde_json::to_value(SqlValue::Date(
                NaiveDate::from_ymd_opt(2024, 1, 15).unwrap()
            ))
            .unwrap(),
            serde_json::json!("2024-01-15")
        );
    }

    #[test]
    fn test_param_value_from_json() {
        let v: ParamValue = serde_json::from_value(serde_json::json!(null)).unwrap();
        assert_eq!(v, ParamValue::Null);

        let v: ParamValue = serde_json::from_value(serde_json::json!(42)).unwrap();
        assert_eq!(v, ParamValue::Integer(42));

        let v: ParamValue = serde_json::from_value(serde_json::json!(1.5)).unwrap();
        assert_eq!(v, ParamValue::Float(1.5));

        let v: ParamValue = serde_json::from_value(serde_json::json!("2024-03-01")).unwrap();
        assert_eq!(
            v,
            ParamValue::Date(NaiveDate::from_ymd_opt(2024, 3, 1).unwrap())
        );

        let v: ParamValue = serde_json::from_value(serde_json::json!("plain text")).unwrap();
        assert_eq!(v, ParamValue::Text("plain text".into()));
    }

    #[test]
    fn test_null_param_binds_as_sql_null() {
        assert!(matches!(
            ParamValue::Null.to_sql(),
            ColumnData::String(None)
        ));
    }

    #[test]
    fn test_hex_encode() {
        assert_eq!(hex::encode(&[0xDE, 0xAD, 0xBE, 0xEF]), "DEADBEEF");
        assert_eq!(hex::encode(&[]), "");
    }
}
