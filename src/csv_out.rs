use std::fs::File;
use std::io;
use std::path::Path;
use std::str::FromStr;

use csv::WriterBuilder;

use crate::error::ExtractError;
use crate::matrix::{RenderedTable, ScheduleMatrix};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// One row per procedure, one `X`/blank column per visit.
    Wide,
    /// One `(Procedure, Visit)` row per association.
    Long,
    Json,
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "wide" => Ok(Self::Wide),
            "long" => Ok(Self::Long),
            "json" => Ok(Self::Json),
            other => Err(format!(
                "unknown output format '{other}', expected wide, long or json"
            )),
        }
    }
}

/// Writes `table` as delimited records into `sink` and hands the sink back
/// once every record is flushed.
pub fn write_records<W: io::Write>(
    sink: W,
    table: &RenderedTable,
    delimiter: u8,
) -> Result<W, ExtractError> {
    let mut writer = WriterBuilder::new().delimiter(delimiter).from_writer(sink);
    writer.write_record(&table.headers)?;
    for row in &table.rows {
        writer.write_record(row)?;
    }
    writer
        .into_inner()
        .map_err(|error| ExtractError::Io(error.into_error()))
}

pub fn write_table(path: &Path, table: &RenderedTable, delimiter: u8) -> Result<(), ExtractError> {
    write_records(File::create(path)?, table, delimiter)?;
    Ok(())
}

pub fn write_table_to_string(table: &RenderedTable, delimiter: u8) -> Result<String, ExtractError> {
    let bytes = write_records(Vec::new(), table, delimiter)?;
    String::from_utf8(bytes)
        .map_err(|error| ExtractError::InvalidOutput(format!("invalid utf-8 csv output: {error}")))
}

/// Renders `matrix` in `format`; `delimiter` applies to the delimited forms.
pub fn render_matrix(
    matrix: &ScheduleMatrix,
    format: OutputFormat,
    delimiter: u8,
) -> Result<String, ExtractError> {
    match format {
        OutputFormat::Wide => write_table_to_string(&matrix.wide_table(), delimiter),
        OutputFormat::Long => write_table_to_string(&matrix.long_table(), delimiter),
        OutputFormat::Json => matrix.to_json_string().map_err(ExtractError::Json),
    }
}
