use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tabled::Tabled;
use tracing::{debug, warn};

use crate::field::Field;
use crate::normalize::NormalizedRecord;
use crate::text::extract_digits;
use crate::RawPriceText;

/// The eight numeric model inputs of one listing, in export column order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Features {
    pub floor_extracted_digits: i64,
    pub room_count_sum: i64,
    pub net_area: i64,
    pub heating_type_binary: i64,
    pub bathroom_count: i64,
    pub furnished_binary: i64,
    pub in_complex_binary: i64,
    pub balcony_binary: i64,
}

impl Features {
    /// The field at each position of `to_vec`.
    pub const FIELDS: [Field; 8] = [
        Field::FloorExtractedDigits,
        Field::RoomCountSum,
        Field::NetArea,
        Field::HeatingTypeBinary,
        Field::BathroomCount,
        Field::FurnishedBinary,
        Field::InComplexBinary,
        Field::BalconyBinary,
    ];

    pub fn value(&self, field: Field) -> i64 {
        match field {
            Field::FloorExtractedDigits => self.floor_extracted_digits,
            Field::RoomCountSum => self.room_count_sum,
            Field::NetArea => self.net_area,
            Field::HeatingTypeBinary => self.heating_type_binary,
            Field::BathroomCount => self.bathroom_count,
            Field::FurnishedBinary => self.furnished_binary,
            Field::InComplexBinary => self.in_complex_binary,
            Field::BalconyBinary => self.balcony_binary,
        }
    }

    pub fn value_mut(&mut self, field: Field) -> &mut i64 {
        match field {
            Field::FloorExtractedDigits => &mut self.floor_extracted_digits,
            Field::RoomCountSum => &mut self.room_count_sum,
            Field::NetArea => &mut self.net_area,
            Field::HeatingTypeBinary => &mut self.heating_type_binary,
            Field::BathroomCount => &mut self.bathroom_count,
            Field::FurnishedBinary => &mut self.furnished_binary,
            Field::InComplexBinary => &mut self.in_complex_binary,
            Field::BalconyBinary => &mut self.balcony_binary,
        }
    }

    pub fn to_vec(&self) -> Vec<i64> {
        vec![
            self.floor_extracted_digits,
            self.room_count_sum,
            self.net_area,
            self.heating_type_binary,
            self.bathroom_count,
            self.furnished_binary,
            self.in_complex_binary,
            self.balcony_binary,
        ]
    }
}

/// A complete dataset row: every feature plus the asking price.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Tabled)]
#[serde(rename_all = "PascalCase")]
pub struct TrainingRow {
    #[tabled(rename = "Floor")]
    pub floor_extracted_digits: i64,
    #[tabled(rename = "Rooms")]
    pub room_count_sum: i64,
    #[tabled(rename = "Net m²")]
    pub net_area: i64,
    #[tabled(rename = "Heating")]
    pub heating_type_binary: i64,
    #[tabled(rename = "Baths")]
    pub bathroom_count: i64,
    #[tabled(rename = "Furnished")]
    pub furnished_binary: i64,
    #[tabled(rename = "In complex")]
    pub in_complex_binary: i64,
    #[tabled(rename = "Balcony")]
    pub balcony_binary: i64,
    #[tabled(rename = "Price (TL)")]
    pub price: i64,
}

impl TrainingRow {
    pub fn new(features: Features, price: i64) -> Self {
        Self {
            floor_extracted_digits: features.floor_extracted_digits,
            room_count_sum: features.room_count_sum,
            net_area: features.net_area,
            heating_type_binary: features.heating_type_binary,
            bathroom_count: features.bathroom_count,
            furnished_binary: features.furnished_binary,
            in_complex_binary: features.in_complex_binary,
            balcony_binary: features.balcony_binary,
            price,
        }
    }

    pub fn features(&self) -> Features {
        Features {
            floor_extracted_digits: self.floor_extracted_digits,
            room_count_sum: self.room_count_sum,
            net_area: self.net_area,
            heating_type_binary: self.heating_type_binary,
            bathroom_count: self.bathroom_count,
            furnished_binary: self.furnished_binary,
            in_complex_binary: self.in_complex_binary,
            balcony_binary: self.balcony_binary,
        }
    }
}

/// One listing as scraped: its position on the search page, the link it
/// was read from, its normalized attributes and, once joined, its price.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListingRecord {
    pub index: usize,
    pub link: Option<String>,
    pub fields: NormalizedRecord,
    pub price: Option<i64>,
}

impl ListingRecord {
    pub fn new(index: usize, link: Option<String>, fields: NormalizedRecord) -> Self {
        Self {
            index,
            link,
            fields,
            price: None,
        }
    }

    /// The completeness filter for a single record.
    pub fn training_row(&self) -> Option<TrainingRow> {
        Some(TrainingRow::new(self.fields.features()?, self.price?))
    }
}

/// A listing whose detail page could not be fetched in a skip-and-continue run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListingFailure {
    pub index: usize,
    pub url: String,
    pub reason: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Dataset {
    pub target: String,
    pub scraped_at: DateTime<Utc>,
    pub records: Vec<ListingRecord>,
    pub failures: Vec<ListingFailure>,
}

impl Dataset {
    pub fn new(target: impl Into<String>, records: Vec<ListingRecord>) -> Self {
        Self {
            target: target.into(),
            scraped_at: Utc::now(),
            records,
            failures: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Rows with all eight features and a price; everything else is dropped.
    pub fn complete_rows(&self) -> Vec<TrainingRow> {
        let rows: Vec<TrainingRow> = self
            .records
            .iter()
            .filter_map(ListingRecord::training_row)
            .collect();

        if rows.len() < self.records.len() {
            debug!(
                "Dropped {} of {} records with missing or non-numeric fields",
                self.records.len() - rows.len(),
                self.records.len()
            );
        }

        rows
    }
}

fn parse_price(text: &str) -> Option<i64> {
    extract_digits(text).parse().ok()
}

/// Join records to prices by their shared search-page index.
///
/// Both sequences are indexed from zero in document order, so this is the
/// positional join of link `i` with price `i`. Records without a price at
/// their index are dropped, so the result is never longer than either input.
pub fn aggregate(mut records: Vec<ListingRecord>, prices: &[RawPriceText]) -> Vec<ListingRecord> {
    records.sort_by_key(|record| record.index);

    let prices_by_index: HashMap<usize, &RawPriceText> =
        prices.iter().map(|price| (price.index, price)).collect();

    let total = records.len();
    let joined: Vec<ListingRecord> = records
        .into_iter()
        .filter_map(|mut record| {
            let price = prices_by_index.get(&record.index)?;
            record.price = price.text.as_deref().and_then(parse_price);
            Some(record)
        })
        .collect();

    if joined.len() < total {
        warn!(
            "{} listings had no price at their position and were dropped",
            total - joined.len()
        );
    }

    joined
}
