//! CSV import of reference data.

use std::io::Read;
use std::path::Path;
use tracing::info;
use votings_db::models::{NewParty, NewPollingCenter, NewPollingHour};
use votings_db::repository::{insert_party, insert_polling_center, insert_polling_hour};
use votings_db::DbPool;

/// Import polling hours (`state_name,state_abbrev,state_hours`).
pub async fn import_polling_hours<R: Read>(db: &DbPool, reader: R) -> anyhow::Result<usize> {
    let mut reader = csv::Reader::from_reader(reader);
    let mut count = 0;
    for (line, result) in reader.deserialize().enumerate() {
        let record: NewPollingHour = result?;
        insert_polling_hour(db, &record)
            .await
            .map_err(|e| anyhow::anyhow!("Row {}: {}", line + 1, e))?;
        count += 1;
    }
    info!("Imported {} polling hour rows", count);
    Ok(count)
}

/// Import parties (`political_party,political_party_abbr`).
pub async fn import_parties<R: Read>(db: &DbPool, reader: R) -> anyhow::Result<usize> {
    let mut reader = csv::Reader::from_reader(reader);
    let mut count = 0;
    for (line, result) in reader.deserialize().enumerate() {
        let record: NewParty = result?;
        insert_party(db, &record)
            .await
            .map_err(|e| anyhow::anyhow!("Row {}: {}", line + 1, e))?;
        count += 1;
    }
    info!("Imported {} parties", count);
    Ok(count)
}

/// Import polling centers (`lat,lng,hours_of_operation`).
pub async fn import_polling_centers<R: Read>(db: &DbPool, reader: R) -> anyhow::Result<usize> {
    let mut reader = csv::Reader::from_reader(reader);
    let mut count = 0;
    for (line, result) in reader.deserialize().enumerate() {
        let record: NewPollingCenter = result?;
        insert_polling_center(db, &record)
            .await
            .map_err(|e| anyhow::anyhow!("Row {}: {}", line + 1, e))?;
        count += 1;
    }
    info!("Imported {} polling centers", count);
    Ok(count)
}

pub fn open_csv(path: &str) -> anyhow::Result<std::fs::File> {
    info!("Reading {}", path);
    std::fs::File::open(Path::new(path)).map_err(|e| anyhow::anyhow!("Cannot open {}: {}", path, e))
}
