//! Annotations file output.

use std::fs::File;
use std::io::Write;
use std::path::Path;

use aoi_core::error::{AnnotateError, Result};
use aoi_core::models::{Interval, ANNOTATION_HEADER};
use tracing::debug;

/// Write `intervals` to `path`, creating missing parent directories.
///
/// The header row is always written, even when there are no intervals.
pub fn write_annotations(path: &Path, intervals: &[Interval], delimiter: u8) -> Result<()> {
    let write_err = |source| AnnotateError::FileWrite {
        path: path.to_path_buf(),
        source,
    };

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(write_err)?;
    }
    let file = File::create(path).map_err(write_err)?;
    write_annotations_to(file, intervals, delimiter)?;

    debug!("Wrote {} annotations to {}", intervals.len(), path.display());
    Ok(())
}

/// Serialize `intervals` with a single header row and no index column.
/// Fields containing the delimiter, quotes or newlines are quoted.
pub fn write_annotations_to<W: Write>(sink: W, intervals: &[Interval], delimiter: u8) -> Result<()> {
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .delimiter(delimiter)
        .from_writer(sink);

    writer.write_record(ANNOTATION_HEADER)?;
    for interval in intervals {
        writer.serialize(interval)?;
    }
    writer.flush()?;
    Ok(())
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use aoi_core::models::Millis;
    use tempfile::TempDir;

    fn interval(name: &str, start: f64, end: f64) -> Interval {
        Interval {
            respondent: "P01".to_string(),
            stimulus: "Slide1".to_string(),
            marker_type: "Respondent Annotation".to_string(),
            marker_name: name.to_string(),
            start: Millis(start),
            end: Millis(end),
            comment: String::new(),
            color: "#FF0000".to_string(),
        }
    }

    fn render(intervals: &[Interval], delimiter: u8) -> String {
        let mut buf = Vec::new();
        write_annotations_to(&mut buf, intervals, delimiter).unwrap();
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn test_header_and_rows() {
        let out = render(
            &[
                interval("Logo gazed at on Slide1", 0.0, 100.0),
                interval("Logo gazed at on Slide1", 100.0, 300.5),
            ],
            b',',
        );

        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(
            lines[0],
            "Respondent Name,Stimulus Name,Marker Type,Marker Name,Start Time (ms),End Time (ms),Comment,Color"
        );
        assert_eq!(
            lines[1],
            "P01,Slide1,Respondent Annotation,Logo gazed at on Slide1,0,100,,#FF0000"
        );
        assert_eq!(
            lines[2],
            "P01,Slide1,Respondent Annotation,Logo gazed at on Slide1,100,300.5,,#FF0000"
        );
        assert_eq!(lines.len(), 3);
    }

    #[test]
    fn test_empty_output_still_has_header() {
        let out = render(&[], b',');
        assert_eq!(out.lines().count(), 1);
        assert!(out.starts_with("Respondent Name,"));
    }

    #[test]
    fn test_fields_with_delimiter_are_quoted() {
        let mut iv = interval("Logo, big gazed at on Ad, v2", 0.0, 1.0);
        iv.stimulus = "Ad, v2".to_string();

        let out = render(&[iv], b',');
        let row = out.lines().nth(1).unwrap();
        assert_eq!(
            row,
            "P01,\"Ad, v2\",Respondent Annotation,\"Logo, big gazed at on Ad, v2\",0,1,,#FF0000"
        );
    }

    #[test]
    fn test_custom_delimiter() {
        let out = render(&[interval("A gazed at on S", 5.0, 6.0)], b';');
        assert!(out.starts_with("Respondent Name;Stimulus Name;"));
        assert!(out.contains("A gazed at on S;5;6;;#FF0000"));
    }

    #[test]
    fn test_write_annotations_creates_parent_dirs() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("out").join("annotations.csv");

        write_annotations(&path, &[interval("A gazed at on S", 0.0, 1.0)], b',').unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(content.lines().count(), 2);
    }

    #[test]
    fn test_write_annotations_round_trips_through_csv_reader() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("annotations.csv");
        write_annotations(&path, &[interval("A gazed at on S", 0.0, 1.0)], b',').unwrap();

        let mut reader = csv::Reader::from_path(&path).unwrap();
        let headers = reader.headers().unwrap().clone();
        assert_eq!(headers.iter().collect::<Vec<_>>(), ANNOTATION_HEADER.to_vec());
        let records: Vec<csv::StringRecord> = reader.records().map(|r| r.unwrap()).collect();
        assert_eq!(records.len(), 1);
        assert_eq!(&records[0][6], "");
    }

    #[test]
    fn test_write_annotations_unwritable_path() {
        let dir = TempDir::new().unwrap();
        // A directory where the file should be.
        let path = dir.path().join("taken");
        std::fs::create_dir(&path).unwrap();

        let err = write_annotations(&path, &[], b',').unwrap_err();
        assert!(matches!(err, AnnotateError::FileWrite { .. }));
    }
}
