//! Four-column employee CSV: `Name,CardNo,Designation,DefaultTaka`.
//!
//! Quoting is disabled in both directions, so a comma inside a field splits it.

use std::io::Read;

use tracing::debug;

use super::domain::{Employee, Taka};

pub const HEADER: [&str; 4] = ["Name", "CardNo", "Designation", "DefaultTaka"];

const MIN_COLUMNS: usize = 3;

#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    #[error("failed to write CSV: {0}")]
    Csv(#[from] csv::Error),
    #[error("failed to flush CSV buffer: {0}")]
    Flush(String),
    #[error("CSV output is not valid UTF-8")]
    Utf8(#[from] std::string::FromUtf8Error),
}

/// Parse every qualifying row; malformed rows are skipped, never fatal.
pub fn parse<R: Read>(reader: R) -> Vec<Employee> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .quoting(false)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut employees = Vec::new();
    let mut skipped = 0usize;

    for result in csv_reader.records() {
        let record = match result {
            Ok(record) => record,
            Err(err) => {
                debug!(error = %err, "skipping unreadable CSV row");
                skipped += 1;
                continue;
            }
        };

        let first_line = record.position().map(|pos| pos.line() == 1).unwrap_or(false);
        if first_line && is_header(&record) {
            continue;
        }

        if record.len() < MIN_COLUMNS {
            skipped += 1;
            continue;
        }

        let default_taka = record.get(3).map(parse_taka).unwrap_or(0);
        employees.push(Employee::new(
            &record[0],
            &record[1],
            &record[2],
            default_taka,
        ));
    }

    if skipped > 0 {
        debug!(skipped, parsed = employees.len(), "CSV rows dropped during parse");
    }

    employees
}

pub fn parse_str(text: &str) -> Vec<Employee> {
    parse(text.as_bytes())
}

/// Header row followed by one line per record, in the given order.
pub fn serialize<'a, I>(records: I) -> Result<String, CodecError>
where
    I: IntoIterator<Item = &'a Employee>,
{
    let mut writer = csv::WriterBuilder::new()
        .quote_style(csv::QuoteStyle::Never)
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(Vec::new());

    writer.write_record(HEADER)?;
    for employee in records {
        let default_taka = employee.default_taka.to_string();
        writer.write_record([
            employee.name.as_str(),
            employee.card_no.as_str(),
            employee.designation.as_str(),
            default_taka.as_str(),
        ])?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|err| CodecError::Flush(err.error().to_string()))?;
    Ok(String::from_utf8(bytes)?)
}

fn is_header(record: &csv::StringRecord) -> bool {
    record
        .get(0)
        .map(|first| first.to_lowercase().contains("name"))
        .unwrap_or(false)
}

fn parse_taka(raw: &str) -> Taka {
    raw.parse().unwrap_or(0)
}
