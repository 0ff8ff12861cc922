//! Rendering of query parameters as Presto SQL literals.
//!
//! The statement protocol has no bind-parameter mechanism, so values passed to
//! [`Cursor::execute_with`](crate::Cursor::execute_with) are spelled out as
//! literals inside an `EXECUTE ... USING` clause.
use crate::error::PrestoError;

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use std::collections::{BTreeMap, HashMap};
use std::fmt::Write;
use uuid::Uuid;

const DATE_FORMAT: &str = "%Y-%m-%d";
const TIME_FORMAT: &str = "%H:%M:%S%.6f";
const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.6f";


/// A query parameter, tagged with the SQL type it is rendered as.
#[derive(Clone, Debug, PartialEq)]
pub enum Param {
    Null,
    Boolean(bool),
    Integer(i64),
    Double(f64),
    Varchar(String),
    Varbinary(Vec<u8>),
    Date(NaiveDate),
    Time(NaiveTime),
    /// A time of day followed by a zone name or offset.
    TimeWithZone(NaiveTime, String),
    Timestamp(NaiveDateTime),
    /// A local date-time followed by a zone name or offset.
    TimestampWithZone(NaiveDateTime, String),
    Array(Vec<Param>),
    Row(Vec<Param>),
    Map(Vec<(Param, Param)>),
    Uuid(Uuid),
    /// A value with no Presto literal form; carries a description of its type.
    Unsupported(String),
}

/// A trait that allows automatic conversion of Rust values into [`Param`]s.
///
/// # Examples
///
/// ```rust
/// use presto_client::{Param, ToParam};
///
/// assert_eq!(42i64.to_param(), Param::Integer(42));
/// assert_eq!("hello".to_param(), Param::Varchar("hello".to_string()));
/// assert_eq!((1, "a").to_param(), Param::Row(vec![Param::Integer(1), Param::Varchar("a".into())]));
/// ```
pub trait ToParam {
    fn to_param(self) -> Param;
}

impl ToParam for Param {
    fn to_param(self) -> Param {
        self
    }
}

/// Macro to implement ToParam for a type mapping to a Param variant.
macro_rules! impl_to_param {
    ($ty:ty => $variant:ident) => {
        impl ToParam for $ty {
            fn to_param(self) -> Param {
                Param::$variant(self.into())
            }
        }
    };
}

// Primitives
impl_to_param!(i8 => Integer);
impl_to_param!(i16 => Integer);
impl_to_param!(i32 => Integer);
impl_to_param!(i64 => Integer);
impl_to_param!(u16 => Integer);
impl_to_param!(u32 => Integer);
impl_to_param!(f32 => Double);
impl_to_param!(f64 => Double);
impl_to_param!(bool => Boolean);
impl_to_param!(String => Varchar);

// Dates and identifiers
impl_to_param!(NaiveDate => Date);
impl_to_param!(NaiveTime => Time);
impl_to_param!(NaiveDateTime => Timestamp);
impl_to_param!(Uuid => Uuid);

// Special cases
impl ToParam for u64 {
    fn to_param(self) -> Param {
        match i64::try_from(self) {
            Ok(value) => Param::Integer(value),
            Err(_) => Param::Unsupported(format!("u64 value {self} outside BIGINT range")),
        }
    }
}

impl ToParam for &str {
    fn to_param(self) -> Param {
        Param::Varchar(self.to_string())
    }
}

impl ToParam for &[u8] {
    fn to_param(self) -> Param {
        Param::Varbinary(self.to_vec())
    }
}

impl ToParam for DateTime<Utc> {
    fn to_param(self) -> Param {
        Param::TimestampWithZone(self.naive_utc(), "UTC".to_string())
    }
}

impl ToParam for DateTime<FixedOffset> {
    fn to_param(self) -> Param {
        Param::TimestampWithZone(self.naive_local(), self.offset().to_string())
    }
}

impl<T: ToParam> ToParam for Option<T> {
    fn to_param(self) -> Param {
        self.map_or(Param::Null, ToParam::to_param)
    }
}

impl ToParam for Vec<u8> {
    fn to_param(self) -> Param {
        Param::Varbinary(self)
    }
}

// Containers
impl<T: ToParam> ToParam for Vec<T> {
    fn to_param(self) -> Param {
        Param::Array(self.into_iter().map(ToParam::to_param).collect())
    }
}

impl<K: ToParam, V: ToParam> ToParam for HashMap<K, V> {
    fn to_param(self) -> Param {
        Param::Map(self.into_iter().map(|(k, v)| (k.to_param(), v.to_param())).collect())
    }
}

impl<K: ToParam, V: ToParam> ToParam for BTreeMap<K, V> {
    fn to_param(self) -> Param {
        Param::Map(self.into_iter().map(|(k, v)| (k.to_param(), v.to_param())).collect())
    }
}

impl ToParam for () {
    fn to_param(self) -> Param {
        Param::Row(vec![])
    }
}

/// Macro to implement ToParam for tuples, which become `ROW(...)` values.
macro_rules! impl_to_param_tuple {
    ($($name:ident : $idx:tt),+) => {
        impl<$($name: ToParam),+> ToParam for ($($name,)+) {
            fn to_param(self) -> Param {
                Param::Row(vec![$(self.$idx.to_param()),+])
            }
        }
    };
}

impl_to_param_tuple!(A: 0);
impl_to_param_tuple!(A: 0, B: 1);
impl_to_param_tuple!(A: 0, B: 1, C: 2);
impl_to_param_tuple!(A: 0, B: 1, C: 2, D: 3);
impl_to_param_tuple!(A: 0, B: 1, C: 2, D: 3, E: 4);
impl_to_param_tuple!(A: 0, B: 1, C: 2, D: 3, E: 4, F: 5);


/// Render a parameter as SQL literal text.
pub fn to_sql_literal(param: &Param) -> Result<String, PrestoError> {
    let literal = match param {
        Param::Null => "NULL".to_string(),
        Param::Boolean(value) => value.to_string(),
        Param::Integer(value) => value.to_string(),
        Param::Double(value) => {
            if value.is_nan() {
                "nan()".to_string()
            } else if *value == f64::INFINITY {
                "infinity()".to_string()
            } else if *value == f64::NEG_INFINITY {
                "-infinity()".to_string()
            } else {
                format!("DOUBLE '{value:?}'")
            }
        }
        Param::Varchar(value) => format!("'{}'", value.replace('\'', "''")),
        Param::Varbinary(bytes) => {
            let mut hex = String::with_capacity(bytes.len() * 2);
            for byte in bytes {
                write!(hex, "{byte:02x}").map_err(|e| PrestoError::UnsupportedParameter(e.to_string()))?;
            }
            format!("X'{hex}'")
        }
        Param::Date(date) => format!("DATE '{}'", date.format(DATE_FORMAT)),
        Param::Time(time) => format!("TIME '{}'", time.format(TIME_FORMAT)),
        Param::TimeWithZone(time, zone) => {
            format!("TIME '{} {}'", time.format(TIME_FORMAT), zone.replace('\'', "''"))
        }
        Param::Timestamp(ts) => format!("TIMESTAMP '{}'", ts.format(TIMESTAMP_FORMAT)),
        Param::TimestampWithZone(ts, zone) => {
            format!("TIMESTAMP '{} {}'", ts.format(TIMESTAMP_FORMAT), zone.replace('\'', "''"))
        }
        Param::Array(items) => format!("ARRAY[{}]", join_literals(items.iter())?),
        Param::Row(items) => format!("ROW({})", join_literals(items.iter())?),
        Param::Map(entries) => format!(
            "MAP(ARRAY[{}], ARRAY[{}])",
            join_literals(entries.iter().map(|(k, _)| k))?,
            join_literals(entries.iter().map(|(_, v)| v))?,
        ),
        Param::Uuid(uuid) => format!("UUID '{}'", uuid.hyphenated()),
        Param::Unsupported(type_name) => {
            return Err(PrestoError::UnsupportedParameter(format!(
                "Query parameter of type '{type_name}' is not supported"
            )));
        }
    };
    Ok(literal)
}

/// Encode a sequence of parameters and join them with commas.
pub(crate) fn join_literals<'a>(
    params: impl Iterator<Item = &'a Param>,
) -> Result<String, PrestoError> {
    Ok(params.map(to_sql_literal).collect::<Result<Vec<_>, _>>()?.join(","))
}
