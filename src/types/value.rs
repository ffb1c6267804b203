use crate::common::error::{ColumnarError, ColumnarResult};
use crate::types::column_type::ColumnType;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A single column value tagged with its scalar type
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ScalarValue {
    /// Boolean value
    Boolean(bool),
    /// 8-bit signed integer
    Byte(i8),
    /// 16-bit signed integer
    Short(i16),
    /// 32-bit signed integer
    Int(i32),
    /// 64-bit signed integer
    Long(i64),
    /// 32-bit floating point
    Float(f32),
    /// 64-bit double precision
    Double(f64),
    /// String value
    String(String),
}

impl ScalarValue {
    /// Get the column type of this value
    pub fn column_type(&self) -> ColumnType {
        match self {
            ScalarValue::Boolean(_) => ColumnType::Boolean,
            ScalarValue::Byte(_) => ColumnType::Byte,
            ScalarValue::Short(_) => ColumnType::Short,
            ScalarValue::Int(_) => ColumnType::Int,
            ScalarValue::Long(_) => ColumnType::Long,
            ScalarValue::Float(_) => ColumnType::Float,
            ScalarValue::Double(_) => ColumnType::Double,
            ScalarValue::String(_) => ColumnType::String,
        }
    }

    /// Returns the boolean payload, if any
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            ScalarValue::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    /// Widens an integer payload to `i64`
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            ScalarValue::Byte(v) => Some(*v as i64),
            ScalarValue::Short(v) => Some(*v as i64),
            ScalarValue::Int(v) => Some(*v as i64),
            ScalarValue::Long(v) => Some(*v),
            _ => None,
        }
    }

    /// Narrows `v` into an integer value of `column_type`, truncating high bits
    pub fn from_i64(column_type: ColumnType, v: i64) -> ColumnarResult<Self> {
        match column_type {
            ColumnType::Byte => Ok(ScalarValue::Byte(v as i8)),
            ColumnType::Short => Ok(ScalarValue::Short(v as i16)),
            ColumnType::Int => Ok(ScalarValue::Int(v as i32)),
            ColumnType::Long => Ok(ScalarValue::Long(v)),
            other => Err(ColumnarError::TypeMismatch {
                expected: other,
                found: "integer".to_string(),
            }),
        }
    }

    /// Parses the textual form of a value of `column_type`
    pub fn parse(column_type: ColumnType, text: &str) -> ColumnarResult<Self> {
        let text = text.trim();
        let invalid = || ColumnarError::TypeMismatch {
            expected: column_type,
            found: format!("'{}'", text),
        };

        let value = match column_type {
            ColumnType::Boolean => match text.to_ascii_lowercase().as_str() {
                "true" | "t" | "1" => ScalarValue::Boolean(true),
                "false" | "f" | "0" => ScalarValue::Boolean(false),
                _ => return Err(invalid()),
            },
            ColumnType::Byte => ScalarValue::Byte(text.parse().map_err(|_| invalid())?),
            ColumnType::Short => ScalarValue::Short(text.parse().map_err(|_| invalid())?),
            ColumnType::Int => ScalarValue::Int(text.parse().map_err(|_| invalid())?),
            ColumnType::Long => ScalarValue::Long(text.parse().map_err(|_| invalid())?),
            ColumnType::Float => ScalarValue::Float(text.parse().map_err(|_| invalid())?),
            ColumnType::Double => ScalarValue::Double(text.parse().map_err(|_| invalid())?),
            ColumnType::String => ScalarValue::String(text.to_string()),
        };
        Ok(value)
    }
}

impl fmt::Display for ScalarValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScalarValue::Boolean(b) => write!(f, "{}", b),
            ScalarValue::Byte(v) => write!(f, "{}", v),
            ScalarValue::Short(v) => write!(f, "{}", v),
            ScalarValue::Int(v) => write!(f, "{}", v),
            ScalarValue::Long(v) => write!(f, "{}", v),
            ScalarValue::Float(v) => write!(f, "{}", v),
            ScalarValue::Double(v) => write!(f, "{}", v),
            ScalarValue::String(s) => write!(f, "{}", s),
        }
    }
}

impl From<bool> for ScalarValue {
    fn from(v: bool) -> Self {
        ScalarValue::Boolean(v)
    }
}

impl From<i8> for ScalarValue {
    fn from(v: i8) -> Self {
        ScalarValue::Byte(v)
    }
}

impl From<i16> for ScalarValue {
    fn from(v: i16) -> Self {
        ScalarValue::Short(v)
    }
}

impl From<i32> for ScalarValue {
    fn from(v: i32) -> Self {
        ScalarValue::Int(v)
    }
}

impl From<i64> for ScalarValue {
    fn from(v: i64) -> Self {
        ScalarValue::Long(v)
    }
}

impl From<f32> for ScalarValue {
    fn from(v: f32) -> Self {
        ScalarValue::Float(v)
    }
}

impl From<f64> for ScalarValue {
    fn from(v: f64) -> Self {
        ScalarValue::Double(v)
    }
}

impl From<String> for ScalarValue {
    fn from(v: String) -> Self {
        ScalarValue::String(v)
    }
}

impl From<&str> for ScalarValue {
    fn from(v: &str) -> Self {
        ScalarValue::String(v.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_column_type() {
        assert_eq!(ScalarValue::from(1i32).column_type(), ColumnType::Int);
        assert_eq!(ScalarValue::from("a").column_type(), ColumnType::String);
        assert_eq!(ScalarValue::from(true).column_type(), ColumnType::Boolean);
    }

    #[test]
    fn test_integer_widening() {
        assert_eq!(ScalarValue::Short(-3).as_i64(), Some(-3));
        assert_eq!(ScalarValue::Double(1.0).as_i64(), None);
        assert_eq!(
            ScalarValue::from_i64(ColumnType::Int, 7).unwrap(),
            ScalarValue::Int(7)
        );
        assert!(ScalarValue::from_i64(ColumnType::Float, 7).is_err());
    }

    #[test]
    fn test_parse() {
        assert_eq!(
            ScalarValue::parse(ColumnType::Long, " 42 ").unwrap(),
            ScalarValue::Long(42)
        );
        assert_eq!(
            ScalarValue::parse(ColumnType::Boolean, "TRUE").unwrap(),
            ScalarValue::Boolean(true)
        );
        assert!(ScalarValue::parse(ColumnType::Byte, "300").is_err());
    }
}
