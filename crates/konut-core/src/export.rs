use std::io;
use std::path::Path;
use tracing::info;

use crate::dataset::TrainingRow;
use crate::Result;

/// Column order of exported datasets.
pub const COLUMNS: [&str; 9] = [
    "FloorExtractedDigits",
    "RoomCountSum",
    "NetArea",
    "HeatingTypeBinary",
    "BathroomCount",
    "FurnishedBinary",
    "InComplexBinary",
    "BalconyBinary",
    "Price",
];

pub fn write_rows<W: io::Write>(rows: &[TrainingRow], writer: W) -> Result<()> {
    let mut writer = csv::Writer::from_writer(writer);
    if rows.is_empty() {
        writer.write_record(COLUMNS)?;
    }
    for row in rows {
        writer.serialize(row)?;
    }
    writer.flush()?;
    Ok(())
}

pub fn read_rows<R: io::Read>(reader: R) -> Result<Vec<TrainingRow>> {
    let mut reader = csv::Reader::from_reader(reader);
    let rows = reader
        .deserialize()
        .collect::<std::result::Result<Vec<TrainingRow>, csv::Error>>()?;
    Ok(rows)
}

pub fn write_csv(rows: &[TrainingRow], path: impl AsRef<Path>) -> Result<()> {
    let file = std::fs::File::create(path.as_ref())?;
    write_rows(rows, file)?;
    info!("Wrote {} rows to {}", rows.len(), path.as_ref().display());
    Ok(())
}

pub fn read_csv(path: impl AsRef<Path>) -> Result<Vec<TrainingRow>> {
    let file = std::fs::File::open(path.as_ref())?;
    let rows = read_rows(file)?;
    info!("Read {} rows from {}", rows.len(), path.as_ref().display());
    Ok(rows)
}
