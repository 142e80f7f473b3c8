use crate::charts::describe;
use crate::errors::{AppError, AppResult};
use crate::models::{EnrichedUserRecord, BASE_COLUMNS};

pub const RECORDS_FILE_NAME: &str = "usuarios.csv";
pub const STATS_FILE_NAME: &str = "estadisticas_usuarios.csv";

const STATS_VALUE_COLUMN: &str = "name_length";

/// Serializes the loaded table (base fields plus the derived columns) as
/// UTF-8 CSV with a header row and no index column.
pub fn records_csv(data: &[EnrichedUserRecord]) -> AppResult<Vec<u8>> {
    let mut writer = csv::Writer::from_writer(Vec::new());

    let mut header: Vec<&str> = BASE_COLUMNS.to_vec();
    header.push("name_length");
    header.push("email_domain");
    writer.write_record(&header)?;

    for record in data {
        writer.write_record(&[
            record.base.id.to_string(),
            record.base.name.clone(),
            record.base.username.clone(),
            record.base.email.clone(),
            record.base.phone.clone(),
            record.base.website.clone(),
            record.name_length.to_string(),
            record.email_domain.clone().unwrap_or_default(),
        ])?;
    }

    finish(writer)
}

/// Serializes the `name_length` descriptive statistics, statistic labels in
/// the first column. Undefined statistics (empty data set) export as empty
/// cells.
pub fn stats_csv(data: &[EnrichedUserRecord]) -> AppResult<Vec<u8>> {
    let values: Vec<i64> = data.iter().map(|record| record.name_length).collect();
    let stats = describe(&values);

    let rows = [
        ("count", stats.count.to_string()),
        ("mean", cell(stats.mean)),
        ("std", cell(stats.std)),
        ("min", cell(stats.min)),
        ("25%", cell(stats.q25)),
        ("50%", cell(stats.median)),
        ("75%", cell(stats.q75)),
        ("max", cell(stats.max)),
    ];

    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(["statistic", STATS_VALUE_COLUMN])?;
    for (label, value) in &rows {
        writer.write_record([*label, value.as_str()])?;
    }

    finish(writer)
}

fn cell(value: Option<f64>) -> String {
    value.map(|value| value.to_string()).unwrap_or_default()
}

fn finish(writer: csv::Writer<Vec<u8>>) -> AppResult<Vec<u8>> {
    writer
        .into_inner()
        .map_err(|err| AppError::Internal(err.to_string()))
}
