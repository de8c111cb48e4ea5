//! Loads the raw two-column station export.
//!
//! The file has no header; each non-blank line holds a date-time string and a
//! numeric value separated by the configured delimiter (tab by default).
//! Timestamps are kept as text here and parsed during normalization so the
//! two failure modes stay distinguishable.

use std::io::Read;
use std::path::Path;

use crate::config::InputConfig;
use crate::error::PipelineError;

/// One line of the input file, value parsed, timestamp still raw.
#[derive(Debug, Clone, PartialEq)]
pub struct RawRecord {
    /// 1-based line number in the source file.
    pub line: u64,
    pub timestamp: String,
    pub value: f64,
}

/// Reads every record of the file at `path`.
pub fn read_records(path: &Path, config: &InputConfig) -> Result<Vec<RawRecord>, PipelineError> {
    let file = std::fs::File::open(path).map_err(|e| {
        PipelineError::InputParse(format!("cannot open '{}': {}", path.display(), e))
    })?;
    read_records_from(file, config)
}

/// Reads every record from an arbitrary source. Blank lines are skipped.
pub fn read_records_from<R: Read>(
    source: R,
    config: &InputConfig,
) -> Result<Vec<RawRecord>, PipelineError> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(config.delimiter as u8)
        .has_headers(false)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(source);

    let mut records = Vec::new();
    for result in reader.records() {
        let record = result.map_err(|e| {
            let line = e.position().map(|p| p.line()).unwrap_or_default();
            PipelineError::at_line(line, e)
        })?;
        let line = record.position().map(|p| p.line()).unwrap_or_default();

        if record.iter().all(str::is_empty) {
            continue;
        }
        if record.len() != 2 {
            return Err(PipelineError::at_line(
                line,
                format!("expected 2 fields (timestamp, value), found {}", record.len()),
            ));
        }

        let value: f64 = record[1].parse().map_err(|_| {
            PipelineError::at_line(line, format!("invalid numeric value {:?}", &record[1]))
        })?;

        records.push(RawRecord {
            line,
            timestamp: record[0].to_string(),
            value,
        });
    }

    log::debug!("read {} raw records", records.len());
    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn read(text: &str) -> Result<Vec<RawRecord>, PipelineError> {
        read_records_from(text.as_bytes(), &InputConfig::default())
    }

    #[test]
    fn test_reads_tab_separated_lines() {
        let records = read("2024-01-01 00:00:00\t1.25\n2024-01-01 00:01:00\t-0.5\n").unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].timestamp, "2024-01-01 00:00:00");
        assert_eq!(records[0].value, 1.25);
        assert_eq!(records[1].value, -0.5);
        assert_eq!(records[1].line, 2);
    }

    #[test]
    fn test_skips_blank_lines_and_trims_fields() {
        let records = read("\n2024-01-01 00:00:00\t 1.0 \r\n\n   \n2024-01-01 00:01:00\t2.0").unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].value, 1.0);
        assert_eq!(records[1].value, 2.0);
    }

    #[test]
    fn test_empty_input_is_not_an_error() {
        assert!(read("").unwrap().is_empty());
    }

    #[test]
    fn test_wrong_field_count_is_rejected() {
        let err = read("2024-01-01 00:00:00\t1.0\n2024-01-01 00:01:00\n").unwrap_err();
        match err {
            PipelineError::InputParse(message) => {
                assert!(message.contains("line 2"), "{}", message);
                assert!(message.contains("found 1"), "{}", message);
            }
            other => panic!("unexpected error {:?}", other),
        }
    }

    #[test]
    fn test_non_numeric_value_is_rejected() {
        let err = read("2024-01-01 00:00:00\tabc\n").unwrap_err();
        assert!(matches!(err, PipelineError::InputParse(_)));
    }

    #[test]
    fn test_custom_delimiter() {
        let config = InputConfig { delimiter: ';' };
        let records = read_records_from("2024-01-01 00:00:00;3.5\n".as_bytes(), &config).unwrap();
        assert_eq!(records[0].value, 3.5);
    }

    #[test]
    fn test_missing_file_is_an_input_error() {
        let err = read_records(Path::new("/definitely/not/here.txt"), &InputConfig::default())
            .unwrap_err();
        assert!(matches!(err, PipelineError::InputParse(_)));
    }
}
