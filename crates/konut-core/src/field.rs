use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::text::{digit_runs, extract_digits};

/// Heating value that maps to 0; everything else maps to 1.
pub const AIR_CONDITIONED: &str = "Klimalı";
pub const FURNISHED: &str = "Eşyalı";
pub const YES: &str = "Evet";
pub const PRESENT: &str = "Var";
pub const NONE: &str = "Yok";

/// The recognized listing attributes. Labels that do not resolve to one of
/// these are ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Field {
    NetArea,
    FloorExtractedDigits,
    RoomCountSum,
    HeatingTypeBinary,
    BathroomCount,
    FurnishedBinary,
    InComplexBinary,
    BalconyBinary,
}

impl Field {
    pub const ALL: [Field; 8] = [
        Field::NetArea,
        Field::FloorExtractedDigits,
        Field::RoomCountSum,
        Field::HeatingTypeBinary,
        Field::BathroomCount,
        Field::FurnishedBinary,
        Field::InComplexBinary,
        Field::BalconyBinary,
    ];

    /// Columns whose values are categories rather than magnitudes.
    pub const CATEGORICAL: [Field; 5] = [
        Field::HeatingTypeBinary,
        Field::BathroomCount,
        Field::FurnishedBinary,
        Field::InComplexBinary,
        Field::BalconyBinary,
    ];

    /// The normalized page label this field is published under.
    pub fn label(&self) -> &'static str {
        match self {
            Field::NetArea => "Net_Metrekare",
            Field::FloorExtractedDigits => "Bulundugu_Kat",
            Field::RoomCountSum => "Oda_Sayisi",
            Field::HeatingTypeBinary => "Isitma_Tipi",
            Field::BathroomCount => "Banyo_Sayisi",
            Field::FurnishedBinary => "Esya_Durumu",
            Field::InComplexBinary => "Site_Icerisinde",
            Field::BalconyBinary => "Balkon_Durumu",
        }
    }

    /// Column name used in exported datasets.
    pub fn column(&self) -> &'static str {
        match self {
            Field::NetArea => "NetArea",
            Field::FloorExtractedDigits => "FloorExtractedDigits",
            Field::RoomCountSum => "RoomCountSum",
            Field::HeatingTypeBinary => "HeatingTypeBinary",
            Field::BathroomCount => "BathroomCount",
            Field::FurnishedBinary => "FurnishedBinary",
            Field::InComplexBinary => "InComplexBinary",
            Field::BalconyBinary => "BalconyBinary",
        }
    }

    /// Look up a label that already went through `normalize_label`.
    pub fn from_label(label: &str) -> Option<Self> {
        Field::ALL.into_iter().find(|field| field.label() == label)
    }

    /// Apply this field's transformation to a trimmed page value.
    pub fn transform(&self, value: &str) -> FieldValue {
        match self {
            Field::NetArea => {
                FieldValue::Text(value.split(' ').next().unwrap_or_default().to_string())
            }
            Field::FloorExtractedDigits => FieldValue::Text(extract_digits(value)),
            Field::RoomCountSum => match sum_digit_runs(value) {
                Some(sum) => FieldValue::Int(sum),
                None => FieldValue::Text(value.to_string()),
            },
            Field::HeatingTypeBinary => FieldValue::Int(if value == AIR_CONDITIONED { 0 } else { 1 }),
            Field::FurnishedBinary => FieldValue::Int(binary(value, FURNISHED)),
            Field::InComplexBinary => FieldValue::Int(binary(value, YES)),
            Field::BalconyBinary => FieldValue::Int(binary(value, PRESENT)),
            Field::BathroomCount => {
                if value == NONE {
                    FieldValue::Int(0)
                } else {
                    // Unparseable counts are kept as text and dropped later
                    value
                        .parse::<i64>()
                        .map(FieldValue::Int)
                        .unwrap_or_else(|_| FieldValue::Text(value.to_string()))
                }
            }
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.column())
    }
}

impl FromStr for Field {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Field::ALL
            .into_iter()
            .find(|field| field.column() == s || field.label() == s)
            .ok_or_else(|| format!("Unknown field: {}", s))
    }
}

/// 1 when `value` equals `literal`, else 0.
pub(crate) fn binary(value: &str, literal: &str) -> i64 {
    if value == literal {
        1
    } else {
        0
    }
}

/// "3+1" sums to 4. `None` only when a run does not fit in an i64.
pub(crate) fn sum_digit_runs(value: &str) -> Option<i64> {
    digit_runs(value).try_fold(0i64, |acc, run| {
        run.parse::<i64>().ok().and_then(|n| acc.checked_add(n))
    })
}

/// A normalized attribute value. Text values are numeric strings that the
/// completeness filter coerces, or raw values that failed coercion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum FieldValue {
    Int(i64),
    Text(String),
}

impl FieldValue {
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            FieldValue::Int(n) => Some(*n),
            FieldValue::Text(text) => text.trim().parse().ok(),
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Int(n) => write!(f, "{}", n),
            FieldValue::Text(text) => write!(f, "{}", text),
        }
    }
}
