//! Attribute values and items.
//!
//! Mirrors the store's attribute value model (`S`, `N`, `B`, `BOOL`, `NULL`,
//! `L`, `M`, `SS`, `NS`, `BS`) without depending on any SDK. Backends convert
//! to and from their own representation.

use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::str::FromStr;

use base64::Engine;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// A single item: attribute name to value.
pub type Item = BTreeMap<String, Value>;

/// An attribute value.
///
/// Numbers are kept as their decimal string, as the store does, and are only
/// parsed when compared. Comparison is exact for any number of digits.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    Null,
    Bool(bool),
    N(String),
    S(String),
    B(Vec<u8>),
    L(Vec<Value>),
    M(BTreeMap<String, Value>),
    Ss(BTreeSet<String>),
    Ns(BTreeSet<String>),
    Bs(BTreeSet<Vec<u8>>),
}

impl Value {
    /// Creates a number value from anything that formats as a decimal.
    pub fn number(n: impl fmt::Display) -> Self {
        Self::N(n.to_string())
    }

    /// Creates a binary value.
    pub fn binary(bytes: impl Into<Vec<u8>>) -> Self {
        Self::B(bytes.into())
    }

    /// Creates a string set.
    pub fn string_set<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::Ss(values.into_iter().map(Into::into).collect())
    }

    /// Returns the type descriptor of this value.
    pub fn attribute_type(&self) -> AttributeType {
        match self {
            Self::Null => AttributeType::Null,
            Self::Bool(_) => AttributeType::Bool,
            Self::N(_) => AttributeType::N,
            Self::S(_) => AttributeType::S,
            Self::B(_) => AttributeType::B,
            Self::L(_) => AttributeType::L,
            Self::M(_) => AttributeType::M,
            Self::Ss(_) => AttributeType::Ss,
            Self::Ns(_) => AttributeType::Ns,
            Self::Bs(_) => AttributeType::Bs,
        }
    }

    /// Returns the string if this is an `S` value.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::S(s) => Some(s),
            _ => None,
        }
    }

    /// Whether this value may be used as a key attribute (`S`, `N` or `B`).
    pub fn is_key_type(&self) -> bool {
        matches!(self, Self::S(_) | Self::N(_) | Self::B(_))
    }

    /// Equality with the store's semantics: numbers compare numerically,
    /// everything else structurally. Values of different types are never equal.
    pub fn same_as(&self, other: &Value) -> bool {
        match (self, other) {
            (Self::N(a), Self::N(b)) => numbers_equal(a, b),
            (Self::Ns(a), Self::Ns(b)) => {
                a.len() == b.len() && a.iter().all(|x| b.iter().any(|y| numbers_equal(x, y)))
            }
            (Self::L(a), Self::L(b)) => {
                a.len() == b.len() && a.iter().zip(b).all(|(x, y)| x.same_as(y))
            }
            (Self::M(a), Self::M(b)) => {
                a.len() == b.len()
                    && a.iter()
                        .all(|(k, v)| b.get(k).is_some_and(|other| v.same_as(other)))
            }
            _ => self == other,
        }
    }

    /// Ordering for the scalar types that support it (`N`, `S`, `B`).
    ///
    /// Returns `None` for mismatched or unordered types.
    pub fn compare(&self, other: &Value) -> Option<Ordering> {
        match (self, other) {
            (Self::N(a), Self::N(b)) => Some(Number::parse(a)?.cmp(&Number::parse(b)?)),
            (Self::S(a), Self::S(b)) => Some(a.as_bytes().cmp(b.as_bytes())),
            (Self::B(a), Self::B(b)) => Some(a.cmp(b)),
            _ => None,
        }
    }

    /// The value `size()` reports for this attribute.
    ///
    /// Strings and binaries report their length in bytes, collections their
    /// number of elements. Numbers, booleans and nulls have no size.
    pub fn size(&self) -> Option<usize> {
        match self {
            Self::S(s) => Some(s.len()),
            Self::B(b) => Some(b.len()),
            Self::L(l) => Some(l.len()),
            Self::M(m) => Some(m.len()),
            Self::Ss(s) | Self::Ns(s) => Some(s.len()),
            Self::Bs(s) => Some(s.len()),
            Self::N(_) | Self::Bool(_) | Self::Null => None,
        }
    }

    /// Converts into plain JSON. Binaries become base64 strings and sets
    /// become arrays.
    pub fn to_json(&self) -> serde_json::Value {
        use serde_json::Value as Json;

        match self {
            Self::Null => Json::Null,
            Self::Bool(b) => Json::Bool(*b),
            Self::N(n) => number_to_json(n),
            Self::S(s) => Json::String(s.clone()),
            Self::B(b) => Json::String(base64::engine::general_purpose::STANDARD.encode(b)),
            Self::L(l) => Json::Array(l.iter().map(Value::to_json).collect()),
            Self::M(m) => Json::Object(m.iter().map(|(k, v)| (k.clone(), v.to_json())).collect()),
            Self::Ss(s) => Json::Array(s.iter().cloned().map(Json::String).collect()),
            Self::Ns(s) => Json::Array(s.iter().map(String::as_str).map(number_to_json).collect()),
            Self::Bs(s) => Json::Array(
                s.iter()
                    .map(|b| Json::String(base64::engine::general_purpose::STANDARD.encode(b)))
                    .collect(),
            ),
        }
    }
}

/// A decimal number normalized to `0.d1d2d3... × 10^exponent`.
///
/// `digits` has no leading or trailing zeros. Zero has no digits and is never
/// negative.
#[derive(Debug, PartialEq, Eq)]
struct Number {
    negative: bool,
    digits: Vec<u8>,
    exponent: i64,
}

impl Number {
    /// Parses `[+-]digits[.digits][(e|E)[+-]digits]`.
    fn parse(s: &str) -> Option<Self> {
        let s = s.trim();
        let (negative, unsigned) = match s.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, s.strip_prefix('+').unwrap_or(s)),
        };
        let (mantissa, exponent) = match unsigned.find(|c: char| c == 'e' || c == 'E') {
            Some(at) => (&unsigned[..at], unsigned[at + 1..].parse::<i64>().ok()?),
            None => (unsigned, 0),
        };
        let (integer, fraction) = mantissa.split_once('.').unwrap_or((mantissa, ""));
        if integer.is_empty() && fraction.is_empty() {
            return None;
        }
        let mut digits = Vec::with_capacity(integer.len() + fraction.len());
        for byte in integer.bytes().chain(fraction.bytes()) {
            if !byte.is_ascii_digit() {
                return None;
            }
            digits.push(byte - b'0');
        }

        let leading = digits.iter().take_while(|&&d| d == 0).count();
        digits.drain(..leading);
        while digits.last() == Some(&0) {
            digits.pop();
        }
        if digits.is_empty() {
            return Some(Self {
                negative: false,
                digits,
                exponent: 0,
            });
        }
        Some(Self {
            negative,
            digits,
            exponent: (integer.len() as i64 - leading as i64).checked_add(exponent)?,
        })
    }

    fn signum(&self) -> i8 {
        match (self.digits.is_empty(), self.negative) {
            (true, _) => 0,
            (false, true) => -1,
            (false, false) => 1,
        }
    }
}

impl Ord for Number {
    fn cmp(&self, other: &Self) -> Ordering {
        let sign = self.signum().cmp(&other.signum());
        if sign != Ordering::Equal || self.signum() == 0 {
            return sign;
        }
        let magnitude = self
            .exponent
            .cmp(&other.exponent)
            .then_with(|| self.digits.cmp(&other.digits));
        if self.negative {
            magnitude.reverse()
        } else {
            magnitude
        }
    }
}

impl PartialOrd for Number {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

fn numbers_equal(a: &str, b: &str) -> bool {
    match (Number::parse(a), Number::parse(b)) {
        (Some(x), Some(y)) => x == y,
        _ => a == b,
    }
}

fn number_to_json(n: &str) -> serde_json::Value {
    if let Ok(i) = n.parse::<i64>() {
        return serde_json::Value::from(i);
    }
    if let Ok(u) = n.parse::<u64>() {
        return serde_json::Value::from(u);
    }
    match n.parse::<f64>().ok().and_then(serde_json::Number::from_f64) {
        Some(f) => serde_json::Value::Number(f),
        None => serde_json::Value::String(n.to_string()),
    }
}

/// Converts an item into a JSON object.
pub fn item_to_json(item: &Item) -> serde_json::Value {
    serde_json::Value::Object(item.iter().map(|(k, v)| (k.clone(), v.to_json())).collect())
}

impl From<serde_json::Value> for Value {
    fn from(json: serde_json::Value) -> Self {
        use serde_json::Value as Json;

        match json {
            Json::Null => Self::Null,
            Json::Bool(b) => Self::Bool(b),
            Json::Number(n) => Self::N(n.to_string()),
            Json::String(s) => Self::S(s),
            Json::Array(a) => Self::L(a.into_iter().map(Value::from).collect()),
            Json::Object(o) => Self::M(o.into_iter().map(|(k, v)| (k, Value::from(v))).collect()),
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Self::S(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Self::S(s)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

macro_rules! number_from {
    ($($t:ty),*) => {
        $(
            impl From<$t> for Value {
                fn from(n: $t) -> Self {
                    Self::N(n.to_string())
                }
            }
        )*
    };
}

number_from!(i32, i64, u32, u64, usize, f64);

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_json().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Value {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        serde_json::Value::deserialize(deserializer).map(Value::from)
    }
}

/// Attribute type descriptors accepted by `attribute_type`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AttributeType {
    S,
    N,
    B,
    Bool,
    Null,
    L,
    M,
    Ss,
    Ns,
    Bs,
}

impl AttributeType {
    /// Returns the wire-format descriptor.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::S => "S",
            Self::N => "N",
            Self::B => "B",
            Self::Bool => "BOOL",
            Self::Null => "NULL",
            Self::L => "L",
            Self::M => "M",
            Self::Ss => "SS",
            Self::Ns => "NS",
            Self::Bs => "BS",
        }
    }
}

impl fmt::Display for AttributeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unknown type descriptor.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown attribute type: {0}")]
pub struct UnknownAttributeType(pub String);

impl FromStr for AttributeType {
    type Err = UnknownAttributeType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "S" => Ok(Self::S),
            "N" => Ok(Self::N),
            "B" => Ok(Self::B),
            "BOOL" => Ok(Self::Bool),
            "NULL" => Ok(Self::Null),
            "L" => Ok(Self::L),
            "M" => Ok(Self::M),
            "SS" => Ok(Self::Ss),
            "NS" => Ok(Self::Ns),
            "BS" => Ok(Self::Bs),
            other => Err(UnknownAttributeType(other.to_string())),
        }
    }
}
