use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use smartcore::ensemble::random_forest_regressor::{
    RandomForestRegressor, RandomForestRegressorParameters,
};
use smartcore::error::Failed;
use smartcore::linalg::basic::matrix::DenseMatrix;
use tabled::Tabled;
use tracing::{debug, info};

use crate::dataset::{Features, TrainingRow};
use crate::field::Field;
use crate::{KonutError, Result};

/// Share of rows held out for evaluation.
pub const TEST_FRACTION: f64 = 0.2;
/// Seed for the split, the forest and the importance shuffles.
pub const MODEL_SEED: u64 = 42;
pub const TREE_COUNT: usize = 100;
pub const MIN_TRAINING_ROWS: usize = 5;

type Forest = RandomForestRegressor<f64, f64, DenseMatrix<f64>, Vec<f64>>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Tabled)]
pub struct FeatureImportance {
    #[tabled(rename = "Feature")]
    pub field: Field,
    #[tabled(rename = "Importance", display_with = "display_importance")]
    pub importance: f64,
}

fn display_importance(importance: &f64) -> String {
    format!("{:.4}", importance)
}

/// Shuffle `rows` with a fixed seed and hold out `ceil(len * test_fraction)`
/// of them. Returns `(train, test)`.
pub fn train_test_split(
    rows: &[TrainingRow],
    test_fraction: f64,
    seed: u64,
) -> (Vec<TrainingRow>, Vec<TrainingRow>) {
    let mut test = rows.to_vec();
    test.shuffle(&mut StdRng::seed_from_u64(seed));

    let test_len = ((rows.len() as f64 * test_fraction).ceil() as usize).min(rows.len());
    let train = test.split_off(test_len);

    (train, test)
}

fn model_error(e: Failed) -> KonutError {
    KonutError::Model(e.to_string())
}

fn matrix(features: &[Features]) -> DenseMatrix<f64> {
    let values: Vec<Vec<f64>> = features
        .iter()
        .map(|f| f.to_vec().into_iter().map(|v| v as f64).collect())
        .collect();
    DenseMatrix::from_2d_vec(&values)
}

fn mean_squared_error(predicted: &[f64], actual: &[f64]) -> f64 {
    let total: f64 = predicted
        .iter()
        .zip(actual)
        .map(|(p, a)| (p - a).powi(2))
        .sum();
    total / actual.len().max(1) as f64
}

/// Random-forest rent estimator fit on encoded training rows.
pub struct PriceModel {
    forest: Forest,
    train_rows: usize,
    test_rows: usize,
    test_mae: Option<f64>,
    importances: Vec<FeatureImportance>,
}

impl PriceModel {
    /// Split `rows` 80/20, fit a 100-tree forest on the training part and
    /// score it on the held-out part. Rows must already be encoded with
    /// the same `EncodingTable` that queries will go through.
    pub fn fit(rows: &[TrainingRow]) -> Result<Self> {
        if rows.len() < MIN_TRAINING_ROWS {
            return Err(KonutError::Model(format!(
                "need at least {} complete rows, got {}",
                MIN_TRAINING_ROWS,
                rows.len()
            )));
        }

        let (train, test) = train_test_split(rows, TEST_FRACTION, MODEL_SEED);
        let features: Vec<Features> = train.iter().map(TrainingRow::features).collect();
        let prices: Vec<f64> = train.iter().map(|row| row.price as f64).collect();

        // Every feature is a split candidate at every node
        let parameters = RandomForestRegressorParameters::default()
            .with_n_trees(TREE_COUNT)
            .with_m(Features::FIELDS.len())
            .with_seed(MODEL_SEED);
        let forest = RandomForestRegressor::fit(&matrix(&features), &prices, parameters)
            .map_err(model_error)?;

        let mut model = Self {
            forest,
            train_rows: train.len(),
            test_rows: test.len(),
            test_mae: None,
            importances: Vec::new(),
        };
        model.test_mae = model.mean_absolute_error(&test)?;
        model.importances = model.permutation_importances(&features, &prices)?;

        info!(
            "Fit {} trees on {} rows, {} held out (MAE {:?})",
            TREE_COUNT, model.train_rows, model.test_rows, model.test_mae
        );

        Ok(model)
    }

    pub fn train_rows(&self) -> usize {
        self.train_rows
    }

    pub fn test_rows(&self) -> usize {
        self.test_rows
    }

    /// Mean absolute error in TL on the held-out rows.
    pub fn test_mae(&self) -> Option<f64> {
        self.test_mae
    }

    /// Features ordered from most to least important.
    pub fn importances(&self) -> &[FeatureImportance] {
        &self.importances
    }

    pub fn predict(&self, features: &Features) -> Result<f64> {
        self.predict_many(std::slice::from_ref(features))?
            .first()
            .copied()
            .ok_or_else(|| KonutError::Model("forest returned no prediction".to_string()))
    }

    fn predict_many(&self, features: &[Features]) -> Result<Vec<f64>> {
        self.forest.predict(&matrix(features)).map_err(model_error)
    }

    fn mean_absolute_error(&self, rows: &[TrainingRow]) -> Result<Option<f64>> {
        if rows.is_empty() {
            return Ok(None);
        }

        let features: Vec<Features> = rows.iter().map(TrainingRow::features).collect();
        let predicted = self.predict_many(&features)?;
        let total: f64 = predicted
            .iter()
            .zip(rows)
            .map(|(p, row)| (p - row.price as f64).abs())
            .sum();

        Ok(Some(total / rows.len() as f64))
    }

    /// Growth in training error when one column is shuffled, normalized to
    /// sum to 1. Constant columns score 0.
    fn permutation_importances(
        &self,
        features: &[Features],
        prices: &[f64],
    ) -> Result<Vec<FeatureImportance>> {
        let baseline = mean_squared_error(&self.predict_many(features)?, prices);
        let mut rng = StdRng::seed_from_u64(MODEL_SEED);

        let mut increases = Vec::with_capacity(Features::FIELDS.len());
        for field in Features::FIELDS {
            let mut column: Vec<i64> = features.iter().map(|f| f.value(field)).collect();
            column.shuffle(&mut rng);

            let permuted: Vec<Features> = features
                .iter()
                .zip(column)
                .map(|(f, value)| {
                    let mut f = *f;
                    *f.value_mut(field) = value;
                    f
                })
                .collect();

            let error = mean_squared_error(&self.predict_many(&permuted)?, prices);
            debug!("Shuffling {} moves MSE {:.1} -> {:.1}", field, baseline, error);
            increases.push((field, (error - baseline).max(0.0)));
        }

        let total: f64 = increases.iter().map(|(_, increase)| increase).sum();
        let mut importances: Vec<FeatureImportance> = increases
            .into_iter()
            .map(|(field, increase)| FeatureImportance {
                field,
                importance: if total > 0.0 { increase / total } else { 0.0 },
            })
            .collect();
        importances.sort_by(|a, b| b.importance.total_cmp(&a.importance));

        Ok(importances)
    }
}
