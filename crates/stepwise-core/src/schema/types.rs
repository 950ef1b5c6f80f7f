use serde::{Deserialize, Serialize};

/// PostgreSQL column types, as reported by `information_schema`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SqlType {
    /// UUID type
    Uuid,
    /// Variable-length string with optional max length
    Varchar(Option<u32>),
    /// Fixed-length string
    Char(Option<u32>),
    /// Unlimited text
    Text,
    /// 16-bit integer
    SmallInt,
    /// 32-bit integer
    Integer,
    /// 64-bit integer
    BigInt,
    /// 32-bit floating point
    Real,
    /// 64-bit floating point
    DoublePrecision,
    /// Arbitrary precision decimal
    Numeric,
    /// Boolean
    Boolean,
    /// Timestamp with timezone
    Timestamptz,
    /// Timestamp without timezone
    Timestamp,
    /// Date without time
    Date,
    /// Time of day
    Time,
    /// JSON text
    Json,
    /// JSONB for structured data
    Jsonb,
    /// Byte array
    Bytea,
    /// Array of another type
    Array(Box<SqlType>),
    /// Anything else (enums, domains, extension types)
    Other(String),
}

impl SqlType {
    /// Map an `information_schema.columns` row to a column type.
    ///
    /// `udt_name` is consulted for arrays and user-defined types, where
    /// `data_type` only says `ARRAY` or `USER-DEFINED`.
    pub fn from_information_schema(
        data_type: &str,
        udt_name: &str,
        char_max_len: Option<i32>,
    ) -> Self {
        let len = char_max_len.and_then(|l| u32::try_from(l).ok());

        match data_type.to_ascii_lowercase().as_str() {
            "uuid" => SqlType::Uuid,
            "character varying" => SqlType::Varchar(len),
            "character" => SqlType::Char(len),
            "text" => SqlType::Text,
            "smallint" => SqlType::SmallInt,
            "integer" => SqlType::Integer,
            "bigint" => SqlType::BigInt,
            "real" => SqlType::Real,
            "double precision" => SqlType::DoublePrecision,
            "numeric" => SqlType::Numeric,
            "boolean" => SqlType::Boolean,
            "timestamp with time zone" => SqlType::Timestamptz,
            "timestamp without time zone" => SqlType::Timestamp,
            "date" => SqlType::Date,
            "time without time zone" => SqlType::Time,
            "json" => SqlType::Json,
            "jsonb" => SqlType::Jsonb,
            "bytea" => SqlType::Bytea,
            "array" => {
                // Element type udt names carry a leading underscore (_int4, _text).
                let element = udt_name.trim_start_matches('_');
                SqlType::Array(Box::new(Self::from_udt_name(element)))
            }
            _ => SqlType::Other(udt_name.to_string()),
        }
    }

    /// Map a PostgreSQL internal type name (`int4`, `varchar`, ...).
    fn from_udt_name(udt_name: &str) -> Self {
        match udt_name {
            "uuid" => SqlType::Uuid,
            "varchar" => SqlType::Varchar(None),
            "bpchar" => SqlType::Char(None),
            "text" => SqlType::Text,
            "int2" => SqlType::SmallInt,
            "int4" => SqlType::Integer,
            "int8" => SqlType::BigInt,
            "float4" => SqlType::Real,
            "float8" => SqlType::DoublePrecision,
            "numeric" => SqlType::Numeric,
            "bool" => SqlType::Boolean,
            "timestamptz" => SqlType::Timestamptz,
            "timestamp" => SqlType::Timestamp,
            "date" => SqlType::Date,
            "time" => SqlType::Time,
            "json" => SqlType::Json,
            "jsonb" => SqlType::Jsonb,
            "bytea" => SqlType::Bytea,
            other => SqlType::Other(other.to_string()),
        }
    }

    /// Generate the SQL type declaration.
    pub fn to_sql(&self) -> String {
        match self {
            SqlType::Uuid => "UUID".to_string(),
            SqlType::Varchar(None) => "VARCHAR".to_string(),
            SqlType::Varchar(Some(len)) => format!("VARCHAR({})", len),
            SqlType::Char(None) => "CHAR".to_string(),
            SqlType::Char(Some(len)) => format!("CHAR({})", len),
            SqlType::Text => "TEXT".to_string(),
            SqlType::SmallInt => "SMALLINT".to_string(),
            SqlType::Integer => "INTEGER".to_string(),
            SqlType::BigInt => "BIGINT".to_string(),
            SqlType::Real => "REAL".to_string(),
            SqlType::DoublePrecision => "DOUBLE PRECISION".to_string(),
            SqlType::Numeric => "NUMERIC".to_string(),
            SqlType::Boolean => "BOOLEAN".to_string(),
            SqlType::Timestamptz => "TIMESTAMPTZ".to_string(),
            SqlType::Timestamp => "TIMESTAMP".to_string(),
            SqlType::Date => "DATE".to_string(),
            SqlType::Time => "TIME".to_string(),
            SqlType::Json => "JSON".to_string(),
            SqlType::Jsonb => "JSONB".to_string(),
            SqlType::Bytea => "BYTEA".to_string(),
            SqlType::Array(inner) => format!("{}[]", inner.to_sql()),
            SqlType::Other(name) => name.to_uppercase(),
        }
    }
}

/// Rust type information for code generation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum RustType {
    /// String type
    String,
    /// UUID from uuid crate
    Uuid,
    /// 16-bit integer
    I16,
    /// 32-bit integer
    I32,
    /// 64-bit integer
    I64,
    /// 32-bit float
    F32,
    /// 64-bit float
    F64,
    /// rust_decimal::Decimal
    Decimal,
    /// Boolean
    Bool,
    /// Chrono DateTime<Utc>
    DateTime,
    /// Chrono NaiveDateTime
    NaiveDateTime,
    /// Chrono NaiveDate
    Date,
    /// Chrono NaiveTime
    Time,
    /// serde_json::Value
    Json,
    /// Vec<u8>
    Bytes,
    /// Option wrapper
    Option(Box<RustType>),
    /// Vec wrapper
    Vec(Box<RustType>),
}

impl RustType {
    /// Map a SQL column type to the Rust type sqlx decodes it into.
    ///
    /// Unrecognised types fall back to `String`.
    pub fn from_sql_type(sql_type: &SqlType) -> Self {
        match sql_type {
            SqlType::Uuid => RustType::Uuid,
            SqlType::Varchar(_) | SqlType::Char(_) | SqlType::Text => RustType::String,
            SqlType::SmallInt => RustType::I16,
            SqlType::Integer => RustType::I32,
            SqlType::BigInt => RustType::I64,
            SqlType::Real => RustType::F32,
            SqlType::DoublePrecision => RustType::F64,
            SqlType::Numeric => RustType::Decimal,
            SqlType::Boolean => RustType::Bool,
            SqlType::Timestamptz => RustType::DateTime,
            SqlType::Timestamp => RustType::NaiveDateTime,
            SqlType::Date => RustType::Date,
            SqlType::Time => RustType::Time,
            SqlType::Json | SqlType::Jsonb => RustType::Json,
            SqlType::Bytea => RustType::Bytes,
            SqlType::Array(inner) => RustType::Vec(Box::new(Self::from_sql_type(inner))),
            SqlType::Other(_) => RustType::String,
        }
    }

    /// Check if this type is nullable.
    pub fn is_nullable(&self) -> bool {
        matches!(self, RustType::Option(_))
    }

    /// Render the type as Rust source, using fully qualified paths.
    pub fn to_rust(&self) -> String {
        match self {
            RustType::String => "String".to_string(),
            RustType::Uuid => "uuid::Uuid".to_string(),
            RustType::I16 => "i16".to_string(),
            RustType::I32 => "i32".to_string(),
            RustType::I64 => "i64".to_string(),
            RustType::F32 => "f32".to_string(),
            RustType::F64 => "f64".to_string(),
            RustType::Decimal => "rust_decimal::Decimal".to_string(),
            RustType::Bool => "bool".to_string(),
            RustType::DateTime => "chrono::DateTime<chrono::Utc>".to_string(),
            RustType::NaiveDateTime => "chrono::NaiveDateTime".to_string(),
            RustType::Date => "chrono::NaiveDate".to_string(),
            RustType::Time => "chrono::NaiveTime".to_string(),
            RustType::Json => "serde_json::Value".to_string(),
            RustType::Bytes => "Vec<u8>".to_string(),
            RustType::Option(inner) => format!("Option<{}>", inner.to_rust()),
            RustType::Vec(inner) => format!("Vec<{}>", inner.to_rust()),
        }
    }
}
