use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::trace;

use crate::dataset::Features;
use crate::field::{binary, sum_digit_runs, Field, FieldValue, AIR_CONDITIONED, FURNISHED, NONE, PRESENT, YES};
use crate::text::normalize_label;
use crate::{KonutError, RawFieldPair, Result};

/// The attributes found on one listing page, after transformation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NormalizedRecord {
    fields: BTreeMap<Field, FieldValue>,
}

impl NormalizedRecord {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, field: Field, value: FieldValue) {
        self.fields.insert(field, value);
    }

    pub fn get(&self, field: Field) -> Option<&FieldValue> {
        self.fields.get(&field)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Field, &FieldValue)> {
        self.fields.iter().map(|(field, value)| (*field, value))
    }

    /// All eight fields as integers, or `None` if any is missing or
    /// does not coerce.
    pub fn features(&self) -> Option<Features> {
        let get = |field: Field| self.get(field).and_then(FieldValue::as_i64);
        Some(Features {
            floor_extracted_digits: get(Field::FloorExtractedDigits)?,
            room_count_sum: get(Field::RoomCountSum)?,
            net_area: get(Field::NetArea)?,
            heating_type_binary: get(Field::HeatingTypeBinary)?,
            bathroom_count: get(Field::BathroomCount)?,
            furnished_binary: get(Field::FurnishedBinary)?,
            in_complex_binary: get(Field::InComplexBinary)?,
            balcony_binary: get(Field::BalconyBinary)?,
        })
    }
}

/// Filter raw label/value pairs through the whitelist and apply each
/// field's transformation. Labels outside the whitelist are skipped.
pub fn normalize(pairs: &[RawFieldPair]) -> NormalizedRecord {
    let mut record = NormalizedRecord::new();

    for pair in pairs {
        let label = normalize_label(&pair.label);
        match Field::from_label(&label) {
            Some(field) => record.insert(field, field.transform(&pair.value)),
            None => trace!("Ignoring unlisted attribute {}", label),
        }
    }

    record
}

/// The eight attribute values as a user types them, before normalization.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawQuery {
    pub net_area: String,
    pub floor: String,
    pub rooms: String,
    pub heating: String,
    pub bathrooms: String,
    pub furnished: String,
    pub in_complex: String,
    pub balcony: String,
}

fn parse_int(field: Field, value: &str) -> Result<i64> {
    value.trim().parse().map_err(|_| KonutError::InvalidQuery {
        field: field.column().to_string(),
        value: value.to_string(),
    })
}

/// Normalize a hand-entered query with the same literals as page values.
///
/// Floor is parsed as a plain integer here, and BathroomCount is encoded as
/// presence (0 for "Yok", otherwise 1) rather than as a count. Training rows
/// carry the count, so the two encodings disagree for homes with more than
/// one bathroom.
pub fn normalize_query(query: &RawQuery) -> Result<Features> {
    let room_count_sum = sum_digit_runs(&query.rooms).ok_or_else(|| KonutError::InvalidQuery {
        field: Field::RoomCountSum.column().to_string(),
        value: query.rooms.clone(),
    })?;

    Ok(Features {
        floor_extracted_digits: parse_int(Field::FloorExtractedDigits, &query.floor)?,
        room_count_sum,
        net_area: parse_int(Field::NetArea, &query.net_area)?,
        heating_type_binary: if query.heating == AIR_CONDITIONED { 0 } else { 1 },
        bathroom_count: if query.bathrooms == NONE { 0 } else { 1 },
        furnished_binary: binary(&query.furnished, FURNISHED),
        in_complex_binary: binary(&query.in_complex, YES),
        balcony_binary: binary(&query.balcony, PRESENT),
    })
}
