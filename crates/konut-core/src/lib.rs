use serde::{Deserialize, Serialize};

mod dataset;
mod display;
mod encoding;
mod error;
pub mod export;
pub mod field;
mod model;
mod normalize;
pub mod text;

pub use dataset::{aggregate, Dataset, Features, ListingFailure, ListingRecord, TrainingRow};
pub use display::{create_dataset_table, create_importance_table};
pub use encoding::{EncodingTable, ENCODING_TABLE_VERSION};
pub use error::{KonutError, Result};
pub use field::{Field, FieldValue};
pub use model::{train_test_split, FeatureImportance, PriceModel, MODEL_SEED, TEST_FRACTION, TREE_COUNT};
pub use normalize::{normalize, normalize_query, NormalizedRecord, RawQuery};

/// A listing link as found on the search page. `href` is `None` when the
/// anchor carried no usable href attribute.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListingLink {
    pub index: usize,
    pub href: Option<String>,
}

/// Price text as found on the search page, currency and separators included.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawPriceText {
    pub index: usize,
    pub text: Option<String>,
}

/// One label/value pair from a listing detail page, trimmed but otherwise raw.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawFieldPair {
    pub label: String,
    pub value: String,
}
