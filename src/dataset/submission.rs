//! Prediction output files.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use tracing::info;

use super::error::DatasetError;
use crate::scoring::PredictionRecord;

/// Writes `records` to `path`.
///
/// A `.csv` path gets a `row_id,rule_violation` submission table; any other extension gets one
/// JSON object per line with the full record.
pub fn write_submission(path: &Path, records: &[PredictionRecord]) -> Result<(), DatasetError> {
    let io_err = |source| DatasetError::Io {
        path: path.to_path_buf(),
        source,
    };

    let file = File::create(path).map_err(io_err)?;
    let mut out = BufWriter::new(file);

    let is_csv = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("csv"));

    if is_csv {
        writeln!(out, "row_id,rule_violation").map_err(io_err)?;
        for record in records {
            writeln!(
                out,
                "{},{}",
                csv_field(&record.row_id),
                record.violation_score
            )
            .map_err(io_err)?;
        }
    } else {
        for record in records {
            let line = serde_json::to_string(record)?;
            writeln!(out, "{}", line).map_err(io_err)?;
        }
    }

    out.flush().map_err(io_err)?;

    info!(path = %path.display(), records = records.len(), "Wrote predictions");
    Ok(())
}

fn csv_field(value: &str) -> String {
    if value.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(row_id: &str, score: f32) -> PredictionRecord {
        PredictionRecord {
            row_id: row_id.to_string(),
            violation_score: score,
            is_violation: score > 0.0,
            confidence: 0.5,
        }
    }

    #[test]
    fn test_csv_field_quoting() {
        assert_eq!(csv_field("17"), "17");
        assert_eq!(csv_field("a,b"), "\"a,b\"");
        assert_eq!(csv_field("say \"hi\""), "\"say \"\"hi\"\"\"");
    }

    #[test]
    fn test_write_csv_submission() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("submission.csv");

        write_submission(&path, &[record("1", 0.25), record("2", -0.5)]).unwrap();

        let written = std::fs::read_to_string(&path).unwrap();
        assert_eq!(written, "row_id,rule_violation\n1,0.25\n2,-0.5\n");
    }

    #[test]
    fn test_write_jsonl_predictions() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("predictions.jsonl");

        write_submission(&path, &[record("a", 0.1)]).unwrap();

        let written = std::fs::read_to_string(&path).unwrap();
        let parsed: PredictionRecord = serde_json::from_str(written.trim()).unwrap();
        assert_eq!(parsed, record("a", 0.1));
    }

    #[test]
    fn test_write_to_missing_directory_fails() {
        let result = write_submission(Path::new("/nonexistent/dir/out.csv"), &[]);
        assert!(matches!(result, Err(DatasetError::Io { .. })));
    }
}
