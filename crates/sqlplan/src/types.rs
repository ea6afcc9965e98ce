//! Semantic column types and scalar values.

use std::fmt;

use crate::collation::{Collation, parse_collation};
use crate::errors::{PlanError, Result};
use crate::parser::ast::ColumnType;

pub const TINY_TEXT_BLOB_MAX: u64 = 255;
pub const TEXT_BLOB_MAX: u64 = 65_535;
pub const MEDIUM_TEXT_BLOB_MAX: u64 = 16_777_215;
pub const LONG_TEXT_BLOB_MAX: u64 = 4_294_967_295;
pub const VARCHAR_VARBINARY_MAX: u64 = 65_535;

pub const DECIMAL_MAX_PRECISION: u8 = 65;
pub const DECIMAL_MAX_SCALE: u8 = 30;

/// Storage family of a string type.
///
/// Whether the type is textual or binary is decided by its collation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StringKind {
    Char,
    Varchar,
    Text,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GeometryKind {
    Geometry,
    Point,
    LineString,
    Polygon,
    MultiPoint,
    MultiLineString,
    MultiPolygon,
    GeometryCollection,
}

impl fmt::Display for GeometryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Geometry => "geometry",
            Self::Point => "point",
            Self::LineString => "linestring",
            Self::Polygon => "polygon",
            Self::MultiPoint => "multipoint",
            Self::MultiLineString => "multilinestring",
            Self::MultiPolygon => "multipolygon",
            Self::GeometryCollection => "geometrycollection",
        };
        write!(f, "{s}")
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum DataType {
    Null,
    Int8,
    Uint8,
    Int16,
    Uint16,
    Int24,
    Uint24,
    Int32,
    Uint32,
    Int64,
    Uint64,
    Float32,
    Float64,
    Decimal {
        precision: u8,
        scale: u8,
    },
    Bit {
        width: u8,
    },
    Year,
    Date,
    Time,
    Datetime {
        precision: u8,
    },
    Timestamp {
        precision: u8,
    },
    String {
        kind: StringKind,
        /// Maximum length in characters.
        max_chars: u64,
        collation: Collation,
    },
    Enum {
        values: Vec<String>,
        collation: Collation,
    },
    Set {
        values: Vec<String>,
        collation: Collation,
    },
    Json,
    Geometry {
        kind: GeometryKind,
        srid: Option<u32>,
    },
}

impl DataType {
    /// Booleans are stored as signed 8-bit integers.
    pub const BOOLEAN: DataType = DataType::Int8;

    pub fn long_text(collation: Collation) -> Self {
        DataType::String {
            kind: StringKind::Text,
            max_chars: LONG_TEXT_BLOB_MAX / collation.character_set().max_len() as u64,
            collation,
        }
    }

    pub fn long_blob() -> Self {
        DataType::String {
            kind: StringKind::Text,
            max_chars: LONG_TEXT_BLOB_MAX,
            collation: Collation::BINARY,
        }
    }

    pub fn is_text(&self) -> bool {
        matches!(self, DataType::String { collation, .. } if *collation != Collation::BINARY)
    }

    pub fn is_spatial(&self) -> bool {
        matches!(self, DataType::Geometry { .. })
    }

    pub fn collation(&self) -> Option<Collation> {
        match self {
            DataType::String { collation, .. }
            | DataType::Enum { collation, .. }
            | DataType::Set { collation, .. } => Some(*collation),
            _ => None,
        }
    }

    /// Replace the collation of a character type.
    pub fn with_collation(self, new: Collation) -> Self {
        match self {
            DataType::String { kind, max_chars, .. } => DataType::String {
                kind,
                max_chars,
                collation: new,
            },
            DataType::Enum { values, .. } => DataType::Enum {
                values,
                collation: new,
            },
            DataType::Set { values, .. } => DataType::Set {
                values,
                collation: new,
            },
            other => other,
        }
    }

    pub fn with_srid(self, srid: u32) -> Self {
        match self {
            DataType::Geometry { kind, .. } => DataType::Geometry {
                kind,
                srid: Some(srid),
            },
            other => other,
        }
    }

    /// Resolve a parsed column type into a semantic type.
    pub fn from_column_type(ct: &ColumnType) -> Result<Self> {
        let name = ct.name.as_str();

        if ct.charset.is_some() && !allows_charset(name) {
            return Err(PlanError::invalid_value(
                "Only character columns, enums, and sets can have a CHARACTER SET option",
            ));
        }

        let collate = match &ct.collate {
            Some(c) => Some(c.clone()),
            None if is_binary_type(name) => Some(Collation::BINARY.name().to_string()),
            None => None,
        };
        let collation = || {
            parse_collation(ct.charset.as_deref(), collate.as_deref(), ct.binary_collate)
        };

        let typ = match name {
            "bool" | "boolean" => DataType::BOOLEAN,
            "tinyint" => {
                if let Some(width) = &ct.length {
                    let width = parse_number::<i64>(ct, width)?;
                    // Only TINYINT(1) keeps its display width, as a boolean.
                    if !ct.unsigned && width == 1 {
                        return Ok(DataType::BOOLEAN);
                    }
                }
                if ct.unsigned {
                    DataType::Uint8
                } else {
                    DataType::Int8
                }
            }
            "smallint" => signed_or(ct, DataType::Int16, DataType::Uint16),
            "mediumint" => signed_or(ct, DataType::Int24, DataType::Uint24),
            "int" | "integer" => signed_or(ct, DataType::Int32, DataType::Uint32),
            "bigint" => signed_or(ct, DataType::Int64, DataType::Uint64),
            "float" => match &ct.length {
                Some(p) => {
                    let precision = parse_number::<i64>(ct, p)?;
                    if !(0..=53).contains(&precision) {
                        return Err(PlanError::invalid_value(format!(
                            "column type {ct} is invalid: Valid range for precision is 0-24 or 25-53"
                        )));
                    }
                    if precision > 24 {
                        DataType::Float64
                    } else {
                        DataType::Float32
                    }
                }
                None => DataType::Float32,
            },
            "double" | "real" | "double precision" => DataType::Float64,
            "decimal" | "fixed" | "dec" | "numeric" => {
                let precision = match &ct.length {
                    Some(p) => parse_number::<u8>(ct, p)?,
                    None => 0,
                };
                let scale = match &ct.scale {
                    Some(s) => parse_number::<u8>(ct, s)?,
                    None => 0,
                };
                decimal_type(precision, scale)?
            }
            "bit" => {
                let width = match &ct.length {
                    Some(w) => parse_number::<u8>(ct, w)?,
                    None => 1,
                };
                if !(1..=64).contains(&width) {
                    return Err(PlanError::invalid_value(format!(
                        "{width} is not a valid bit width, must be between 1 and 64"
                    )));
                }
                DataType::Bit { width }
            }
            "tinytext" | "tinyblob" => text_type(collation()?, TINY_TEXT_BLOB_MAX),
            "text" | "blob" => {
                let collation = collation()?;
                match &ct.length {
                    Some(len) => DataType::String {
                        kind: StringKind::Text,
                        max_chars: parse_number::<u64>(ct, len)?,
                        collation,
                    },
                    None => text_type(collation, TEXT_BLOB_MAX),
                }
            }
            "mediumtext" | "mediumblob" | "long" | "long varchar" => {
                text_type(collation()?, MEDIUM_TEXT_BLOB_MAX)
            }
            "longtext" | "longblob" => text_type(collation()?, LONG_TEXT_BLOB_MAX),
            "char" | "character" | "binary" => DataType::String {
                kind: StringKind::Char,
                max_chars: optional_length(ct, 1)?,
                collation: collation()?,
            },
            "nchar" | "national char" | "national character" => DataType::String {
                kind: StringKind::Char,
                max_chars: optional_length(ct, 1)?,
                collation: Collation::from_name("utf8mb3_general_ci")?,
            },
            "varchar" | "char varying" | "character varying" => {
                let collation = collation()?;
                let len = ct
                    .length
                    .as_deref()
                    .ok_or_else(|| PlanError::invalid_value("VARCHAR requires a length"))?;
                let max_chars = if len.eq_ignore_ascii_case("max") {
                    16_383
                } else {
                    parse_number::<u64>(ct, len)?
                };
                DataType::String {
                    kind: StringKind::Varchar,
                    max_chars,
                    collation,
                }
            }
            "nvarchar"
            | "nchar varchar"
            | "nchar varying"
            | "national varchar"
            | "national char varying"
            | "national character varying" => {
                let len = ct
                    .length
                    .as_deref()
                    .ok_or_else(|| PlanError::invalid_value("VARCHAR requires a length"))?;
                DataType::String {
                    kind: StringKind::Varchar,
                    max_chars: parse_number::<u64>(ct, len)?,
                    collation: Collation::from_name("utf8mb3_general_ci")?,
                }
            }
            "varbinary" => {
                let collation = collation()?;
                let len = ct
                    .length
                    .as_deref()
                    .ok_or_else(|| PlanError::invalid_value("VARBINARY requires a length"))?;
                let max_chars = parse_number::<u64>(ct, len)?;
                if max_chars > VARCHAR_VARBINARY_MAX {
                    return Err(PlanError::invalid_value(format!(
                        "length is {max_chars} but max allowed is {VARCHAR_VARBINARY_MAX}"
                    )));
                }
                DataType::String {
                    kind: StringKind::Varchar,
                    max_chars,
                    collation,
                }
            }
            "year" => DataType::Year,
            "date" => DataType::Date,
            "time" => {
                if let Some(len) = &ct.length {
                    match parse_number::<i64>(ct, len)? {
                        0..=5 => {
                            return Err(PlanError::unsupported_feature(
                                "TIME length not yet supported",
                            ));
                        }
                        6 => (),
                        _ => {
                            return Err(PlanError::invalid_value(
                                "TIME only supports a length from 0 to 6",
                            ));
                        }
                    }
                }
                DataType::Time
            }
            "timestamp" => DataType::Timestamp {
                precision: fractional_precision(ct, "TIMESTAMP")?,
            },
            "datetime" => DataType::Datetime {
                precision: fractional_precision(ct, "DATETIME")?,
            },
            "enum" => DataType::Enum {
                values: ct.enum_values.clone(),
                collation: collation()?,
            },
            "set" => {
                if ct.enum_values.len() > 64 {
                    return Err(PlanError::invalid_value(
                        "SET column cannot have more than 64 members",
                    ));
                }
                DataType::Set {
                    values: ct.enum_values.clone(),
                    collation: collation()?,
                }
            }
            "json" => DataType::Json,
            "geometry" => geometry(GeometryKind::Geometry),
            "point" => geometry(GeometryKind::Point),
            "linestring" => geometry(GeometryKind::LineString),
            "polygon" => geometry(GeometryKind::Polygon),
            "multipoint" => geometry(GeometryKind::MultiPoint),
            "multilinestring" => geometry(GeometryKind::MultiLineString),
            "multipolygon" => geometry(GeometryKind::MultiPolygon),
            "geometrycollection" | "geomcollection" => geometry(GeometryKind::GeometryCollection),
            _ => return Err(PlanError::invalid_value(format!("unknown type: {ct}"))),
        };

        Ok(typ)
    }
}

fn allows_charset(name: &str) -> bool {
    matches!(
        name,
        "char"
            | "character"
            | "varchar"
            | "char varying"
            | "character varying"
            | "tinytext"
            | "text"
            | "mediumtext"
            | "longtext"
            | "long"
            | "long varchar"
            | "enum"
            | "set"
    )
}

fn is_binary_type(name: &str) -> bool {
    matches!(
        name,
        "binary" | "varbinary" | "tinyblob" | "blob" | "mediumblob" | "longblob"
    )
}

fn signed_or(ct: &ColumnType, signed: DataType, unsigned: DataType) -> DataType {
    if ct.unsigned { unsigned } else { signed }
}

fn geometry(kind: GeometryKind) -> DataType {
    DataType::Geometry { kind, srid: None }
}

fn text_type(collation: Collation, max_bytes: u64) -> DataType {
    DataType::String {
        kind: StringKind::Text,
        max_chars: max_bytes / collation.character_set().max_len() as u64,
        collation,
    }
}

fn optional_length(ct: &ColumnType, default: u64) -> Result<u64> {
    match &ct.length {
        Some(len) => parse_number(ct, len),
        None => Ok(default),
    }
}

fn fractional_precision(ct: &ColumnType, name: &str) -> Result<u8> {
    match &ct.length {
        Some(len) => {
            let precision = parse_number::<i64>(ct, len)?;
            if !(0..=6).contains(&precision) {
                return Err(PlanError::invalid_value(format!(
                    "{name} supports precision from 0 to 6"
                )));
            }
            Ok(precision as u8)
        }
        None => Ok(0),
    }
}

fn parse_number<T: std::str::FromStr>(ct: &ColumnType, s: &str) -> Result<T> {
    s.trim().parse::<T>().map_err(|_| {
        PlanError::invalid_value(format!("invalid length '{s}' for column type {ct}"))
    })
}

/// Create a decimal type, applying the default precision when none is given.
pub fn decimal_type(precision: u8, scale: u8) -> Result<DataType> {
    let precision = if precision == 0 { 10 } else { precision };
    if precision > DECIMAL_MAX_PRECISION {
        return Err(PlanError::invalid_value(format!(
            "Too-big precision {precision} specified. Maximum is {DECIMAL_MAX_PRECISION}."
        )));
    }
    if scale > DECIMAL_MAX_SCALE {
        return Err(PlanError::invalid_value(format!(
            "Too big scale {scale} specified. Maximum is {DECIMAL_MAX_SCALE}."
        )));
    }
    if scale > precision {
        return Err(PlanError::invalid_value(
            "For float(M,D), double(M,D) or decimal(M,D), M must be >= D",
        ));
    }
    Ok(DataType::Decimal { precision, scale })
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => write!(f, "null"),
            Self::Int8 => write!(f, "tinyint"),
            Self::Uint8 => write!(f, "tinyint unsigned"),
            Self::Int16 => write!(f, "smallint"),
            Self::Uint16 => write!(f, "smallint unsigned"),
            Self::Int24 => write!(f, "mediumint"),
            Self::Uint24 => write!(f, "mediumint unsigned"),
            Self::Int32 => write!(f, "int"),
            Self::Uint32 => write!(f, "int unsigned"),
            Self::Int64 => write!(f, "bigint"),
            Self::Uint64 => write!(f, "bigint unsigned"),
            Self::Float32 => write!(f, "float"),
            Self::Float64 => write!(f, "double"),
            Self::Decimal { precision, scale } => write!(f, "decimal({precision},{scale})"),
            Self::Bit { width } => write!(f, "bit({width})"),
            Self::Year => write!(f, "year"),
            Self::Date => write!(f, "date"),
            Self::Time => write!(f, "time(6)"),
            Self::Datetime { precision: 0 } => write!(f, "datetime"),
            Self::Datetime { precision } => write!(f, "datetime({precision})"),
            Self::Timestamp { precision: 0 } => write!(f, "timestamp"),
            Self::Timestamp { precision } => write!(f, "timestamp({precision})"),
            Self::String {
                kind,
                max_chars,
                collation,
            } => {
                let binary = *collation == Collation::BINARY;
                match kind {
                    StringKind::Char if binary => write!(f, "binary({max_chars})"),
                    StringKind::Char => write!(f, "char({max_chars})"),
                    StringKind::Varchar if binary => write!(f, "varbinary({max_chars})"),
                    StringKind::Varchar => write!(f, "varchar({max_chars})"),
                    StringKind::Text => {
                        let bytes = max_chars * collation.character_set().max_len() as u64;
                        let prefix = if bytes <= TINY_TEXT_BLOB_MAX {
                            "tiny"
                        } else if bytes <= TEXT_BLOB_MAX {
                            ""
                        } else if bytes <= MEDIUM_TEXT_BLOB_MAX {
                            "medium"
                        } else {
                            "long"
                        };
                        let base = if binary { "blob" } else { "text" };
                        write!(f, "{prefix}{base}")
                    }
                }
            }
            Self::Enum { values, .. } => write!(f, "enum({})", quoted_list(values)),
            Self::Set { values, .. } => write!(f, "set({})", quoted_list(values)),
            Self::Json => write!(f, "json"),
            Self::Geometry { kind, srid: None } => write!(f, "{kind}"),
            Self::Geometry {
                kind,
                srid: Some(srid),
            } => write!(f, "{kind} srid {srid}"),
        }
    }
}

fn quoted_list(values: &[String]) -> String {
    values
        .iter()
        .map(|v| format!("'{}'", v.replace('\'', "''")))
        .collect::<Vec<_>>()
        .join(",")
}

/// A constant value.
#[derive(Debug, Clone, PartialEq)]
pub enum ScalarValue {
    Null,
    Boolean(bool),
    Int8(i8),
    UInt8(u8),
    Int16(i16),
    UInt16(u16),
    Int32(i32),
    UInt32(u32),
    Int64(i64),
    UInt64(u64),
    Float64(f64),
    /// Exact decimal kept in its textual form.
    Decimal(String),
    Utf8(String),
    Binary(Vec<u8>),
}

impl ScalarValue {
    pub fn is_null(&self) -> bool {
        matches!(self, ScalarValue::Null)
    }

    pub fn as_u64(&self) -> Option<u64> {
        match self {
            Self::Boolean(v) => Some(*v as u64),
            Self::Int8(v) => u64::try_from(*v).ok(),
            Self::UInt8(v) => Some(*v as u64),
            Self::Int16(v) => u64::try_from(*v).ok(),
            Self::UInt16(v) => Some(*v as u64),
            Self::Int32(v) => u64::try_from(*v).ok(),
            Self::UInt32(v) => Some(*v as u64),
            Self::Int64(v) => u64::try_from(*v).ok(),
            Self::UInt64(v) => Some(*v),
            Self::Utf8(s) | Self::Decimal(s) => s.parse().ok(),
            _ => None,
        }
    }

    /// Render the value the way a user variable holding it would be read
    /// back as text.
    pub fn to_text(&self) -> String {
        match self {
            Self::Null => "NULL".to_string(),
            Self::Utf8(s) => s.clone(),
            Self::Binary(b) => String::from_utf8_lossy(b).into_owned(),
            other => other.to_string(),
        }
    }
}

impl fmt::Display for ScalarValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => write!(f, "NULL"),
            Self::Boolean(v) => write!(f, "{v}"),
            Self::Int8(v) => write!(f, "{v}"),
            Self::UInt8(v) => write!(f, "{v}"),
            Self::Int16(v) => write!(f, "{v}"),
            Self::UInt16(v) => write!(f, "{v}"),
            Self::Int32(v) => write!(f, "{v}"),
            Self::UInt32(v) => write!(f, "{v}"),
            Self::Int64(v) => write!(f, "{v}"),
            Self::UInt64(v) => write!(f, "{v}"),
            Self::Float64(v) => write!(f, "{v}"),
            Self::Decimal(v) => write!(f, "{v}"),
            Self::Utf8(v) => write!(f, "'{}'", v.replace('\'', "''")),
            Self::Binary(v) => write!(f, "0x{}", hex::encode_upper(v)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn column_type(name: &str) -> ColumnType {
        ColumnType {
            name: name.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn tinyint_one_is_boolean() {
        let mut ct = column_type("tinyint");
        ct.length = Some("1".to_string());
        assert_eq!(DataType::BOOLEAN, DataType::from_column_type(&ct).unwrap());

        ct.unsigned = true;
        assert_eq!(DataType::Uint8, DataType::from_column_type(&ct).unwrap());
    }

    #[test]
    fn text_sizes_follow_charset_width() {
        let typ = DataType::from_column_type(&column_type("text")).unwrap();
        assert_eq!(
            DataType::String {
                kind: StringKind::Text,
                max_chars: TEXT_BLOB_MAX / 4,
                collation: Collation::DEFAULT,
            },
            typ
        );
        assert_eq!("text", typ.to_string());

        let blob = DataType::from_column_type(&column_type("mediumblob")).unwrap();
        assert_eq!("mediumblob", blob.to_string());
    }

    #[test]
    fn charset_on_numeric_rejected() {
        let mut ct = column_type("int");
        ct.charset = Some("utf8mb4".to_string());
        assert!(DataType::from_column_type(&ct).is_err());
    }

    #[test]
    fn decimal_defaults_and_bounds() {
        assert_eq!(
            DataType::Decimal {
                precision: 10,
                scale: 0
            },
            decimal_type(0, 0).unwrap()
        );
        assert!(decimal_type(66, 0).is_err());
        assert!(decimal_type(40, 31).is_err());
        assert!(decimal_type(5, 6).is_err());
    }

    #[test]
    fn time_lengths() {
        let mut ct = column_type("time");
        ct.length = Some("6".to_string());
        assert_eq!(DataType::Time, DataType::from_column_type(&ct).unwrap());
        ct.length = Some("3".to_string());
        assert!(DataType::from_column_type(&ct).is_err());
        ct.length = Some("7".to_string());
        assert!(DataType::from_column_type(&ct).is_err());
    }

    #[test]
    fn scalar_display() {
        assert_eq!("'it''s'", ScalarValue::Utf8("it's".to_string()).to_string());
        assert_eq!("0x0AFF", ScalarValue::Binary(vec![0x0a, 0xff]).to_string());
        assert_eq!("NULL", ScalarValue::Null.to_text());
    }
}
