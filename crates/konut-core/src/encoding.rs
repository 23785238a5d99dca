use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use tracing::info;

use crate::dataset::{Features, TrainingRow};
use crate::field::Field;
use crate::{KonutError, Result};

pub const ENCODING_TABLE_VERSION: u32 = 1;

/// Per-column label encoding for the categorical features, fit once on a
/// dataset and then applied unchanged to training rows and queries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncodingTable {
    pub version: u32,
    pub fitted_rows: usize,
    classes: BTreeMap<Field, Vec<i64>>,
}

impl EncodingTable {
    pub fn build(rows: &[TrainingRow]) -> Self {
        let classes = Field::CATEGORICAL
            .into_iter()
            .map(|field| {
                let observed: BTreeSet<i64> = rows
                    .iter()
                    .map(|row| row.features().value(field))
                    .collect();
                (field, observed.into_iter().collect())
            })
            .collect();

        info!("Built encoding table v{} from {} rows", ENCODING_TABLE_VERSION, rows.len());

        Self {
            version: ENCODING_TABLE_VERSION,
            fitted_rows: rows.len(),
            classes,
        }
    }

    /// Sorted distinct values seen for `field`, or `None` for numeric columns.
    pub fn classes(&self, field: Field) -> Option<&[i64]> {
        self.classes.get(&field).map(Vec::as_slice)
    }

    /// Replace each categorical value with its position among the classes
    /// observed for that column.
    pub fn encode(&self, features: &Features) -> Result<Features> {
        let mut encoded = *features;

        for (field, classes) in &self.classes {
            let slot = encoded.value_mut(*field);
            let position = classes.binary_search(&*slot).map_err(|_| KonutError::UnknownCategory {
                field: field.column().to_string(),
                value: *slot,
            })?;
            *slot = position as i64;
        }

        Ok(encoded)
    }

    pub fn encode_row(&self, row: &TrainingRow) -> Result<TrainingRow> {
        Ok(TrainingRow::new(self.encode(&row.features())?, row.price))
    }
}
