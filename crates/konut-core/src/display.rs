use tabled::settings::{object::Columns, Alignment, Modify, Style};
use tabled::Table;

use crate::dataset::TrainingRow;
use crate::model::FeatureImportance;

pub fn create_dataset_table(rows: &[TrainingRow]) -> String {
    let mut table = Table::new(rows);

    table
        .with(Style::modern())
        .with(Modify::new(Columns::new(..)).with(Alignment::right()));

    table.to_string()
}

pub fn create_importance_table(importances: &[FeatureImportance]) -> String {
    let mut table = Table::new(importances);

    table
        .with(Style::modern())
        .with(Modify::new(Columns::single(1)).with(Alignment::right()));

    table.to_string()
}
