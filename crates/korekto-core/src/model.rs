//! Operand and result types exchanged with the host assessment engine.
//!
//! Values carry the two QTI tags the operator validates against: a
//! cardinality and a base type. Content is kept in its string form since
//! that is all the scoring service ever receives.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// How many values a QTI variable holds, and how they are organised.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Cardinality {
    Single,
    Multiple,
    Ordered,
    Record,
}

impl fmt::Display for Cardinality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cardinality::Single => write!(f, "single"),
            Cardinality::Multiple => write!(f, "multiple"),
            Cardinality::Ordered => write!(f, "ordered"),
            Cardinality::Record => write!(f, "record"),
        }
    }
}

impl FromStr for Cardinality {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "single" => Ok(Cardinality::Single),
            "multiple" => Ok(Cardinality::Multiple),
            "ordered" => Ok(Cardinality::Ordered),
            "record" => Ok(Cardinality::Record),
            other => Err(format!(
                "unknown cardinality: {other} (expected single, multiple, ordered or record)"
            )),
        }
    }
}

/// Primitive type tag of a QTI value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum BaseType {
    Identifier,
    Boolean,
    Integer,
    Float,
    String,
    Point,
    Pair,
    DirectedPair,
    Duration,
    File,
    Uri,
    IntOrIdentifier,
}

impl BaseType {
    /// All base types, in QTI declaration order.
    pub const ALL: [BaseType; 12] = [
        BaseType::Identifier,
        BaseType::Boolean,
        BaseType::Integer,
        BaseType::Float,
        BaseType::String,
        BaseType::Point,
        BaseType::Pair,
        BaseType::DirectedPair,
        BaseType::Duration,
        BaseType::File,
        BaseType::Uri,
        BaseType::IntOrIdentifier,
    ];

    /// The QTI spelling of this base type.
    pub fn as_str(&self) -> &'static str {
        match self {
            BaseType::Identifier => "identifier",
            BaseType::Boolean => "boolean",
            BaseType::Integer => "integer",
            BaseType::Float => "float",
            BaseType::String => "string",
            BaseType::Point => "point",
            BaseType::Pair => "pair",
            BaseType::DirectedPair => "directedPair",
            BaseType::Duration => "duration",
            BaseType::File => "file",
            BaseType::Uri => "uri",
            BaseType::IntOrIdentifier => "intOrIdentifier",
        }
    }
}

impl fmt::Display for BaseType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BaseType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        BaseType::ALL
            .iter()
            .copied()
            .find(|bt| bt.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| {
                let known: Vec<&str> = BaseType::ALL.iter().map(|bt| bt.as_str()).collect();
                format!("unknown base type: {s} (expected one of {})", known.join(", "))
            })
    }
}

/// A single operand handed to the operator by the host engine.
///
/// QTI NULL has neither cardinality nor base type, hence the separate variant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum Operand {
    Null,
    Value {
        cardinality: Cardinality,
        base_type: BaseType,
        content: String,
    },
}

impl Operand {
    pub fn new(cardinality: Cardinality, base_type: BaseType, content: impl Into<String>) -> Self {
        Operand::Value {
            cardinality,
            base_type,
            content: content.into(),
        }
    }

    /// A single-cardinality string value.
    pub fn string(content: impl Into<String>) -> Self {
        Self::new(Cardinality::Single, BaseType::String, content)
    }

    /// A single-cardinality identifier value.
    pub fn identifier(content: impl Into<String>) -> Self {
        Self::new(Cardinality::Single, BaseType::Identifier, content)
    }

    pub fn null() -> Self {
        Operand::Null
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Operand::Null)
    }

    /// NULL becomes an empty single string; anything else is returned as-is.
    pub fn normalized(&self) -> (Cardinality, BaseType, &str) {
        match self {
            Operand::Null => (Cardinality::Single, BaseType::String, ""),
            Operand::Value {
                cardinality,
                base_type,
                content,
            } => (*cardinality, *base_type, content.as_str()),
        }
    }
}

/// The score handed back to the host engine: a single float.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoreResult {
    pub score: f64,
}

impl ScoreResult {
    pub fn new(score: f64) -> Self {
        Self { score }
    }

    pub fn cardinality(&self) -> Cardinality {
        Cardinality::Single
    }

    pub fn base_type(&self) -> BaseType {
        BaseType::Float
    }
}

impl fmt::Display for ScoreResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.score)
    }
}
