use std::io::Read;
use std::path::Path;

use anyhow::{Context, Result, bail};
use arrow::array::{
    Array, ArrayRef, AsArray, Float32Array, Float64Array, Int32Array, Int64Array, StringArray,
};
use arrow::datatypes::DataType;
use arrow::record_batch::RecordBatch;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use serde_json::Value as JsonValue;

use super::model::{CertificateType, Course, CourseTable, Difficulty};

// ---------------------------------------------------------------------------
// Column names
// ---------------------------------------------------------------------------

pub const COL_TITLE: &str = "course_title";
pub const COL_ORGANIZATION: &str = "course_organization";
pub const COL_CERTIFICATE: &str = "course_Certificate_type";
pub const COL_RATING: &str = "course_rating";
pub const COL_DIFFICULTY: &str = "course_difficulty";
pub const COL_ENROLLED: &str = "course_students_enrolled";

/// Accepted spellings of the index column. Spreadsheet exports leave the
/// header blank; Pandas round-trips the blank as "Unnamed: 0".
const INDEX_HEADERS: [&str; 3] = ["", "Unnamed: 0", "index"];

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Load a course table from a file.  Dispatch by extension.
///
/// Supported formats:
/// * `.csv`     – header row with the `course_*` columns (primary format)
/// * `.json`    – `[{ "index": 0, "course_title": "...", ... }, ...]`
/// * `.parquet` – flat scalar columns with the same names
pub fn load_file(path: &Path) -> Result<CourseTable> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    match ext.as_str() {
        "csv" => load_csv(path),
        "json" => load_json(path),
        "parquet" | "pq" => load_parquet(path),
        other => bail!("Unsupported file extension: .{other}"),
    }
}

// ---------------------------------------------------------------------------
// Enrollment notation
// ---------------------------------------------------------------------------

/// Convert compact student-count notation to a float.
///
/// `"100k"` → 100_000.0, `"3m"` → 3_000_000.0.  A bare suffix counts as one
/// unit (`"k"` → 1_000.0).  Anything without a recognized suffix, even a
/// plain number, comes back as 0.0, which downstream treats as "unknown"
/// rather than a true zero.
pub fn value_to_float(raw: &str) -> f64 {
    for (suffix, multiplier) in [('k', 1_000.0), ('m', 1_000_000.0)] {
        if raw.contains(suffix) {
            let digits: String = raw.chars().filter(|&c| c != suffix).collect();
            if digits.is_empty() {
                return multiplier;
            }
            return digits.trim().parse::<f64>().map_or(0.0, |v| v * multiplier);
        }
    }
    0.0
}

// ---------------------------------------------------------------------------
// Row assembly (shared by all loaders)
// ---------------------------------------------------------------------------

/// Coerce the categorical cells and assemble a course.  Rows with values
/// outside the category sets are dropped with a warning.
#[allow(clippy::too_many_arguments)]
fn assemble(
    id: u32,
    title: String,
    organization: String,
    certificate_raw: &str,
    rating: f64,
    difficulty_raw: &str,
    enrolled_raw: &str,
) -> Option<Course> {
    let Some(certificate_type) = CertificateType::parse(certificate_raw) else {
        log::warn!("row {id}: unrecognized certificate type '{certificate_raw}', dropping row");
        return None;
    };
    let Some(difficulty) = Difficulty::parse(difficulty_raw) else {
        log::warn!("row {id}: unrecognized difficulty '{difficulty_raw}', dropping row");
        return None;
    };
    Some(Course {
        id,
        title,
        organization,
        certificate_type,
        rating,
        difficulty,
        students_enrolled: value_to_float(enrolled_raw),
    })
}

fn finish_table(courses: Vec<Course>, dropped: usize) -> Result<CourseTable> {
    if dropped > 0 {
        log::warn!("dropped {dropped} rows with unrecognized categories");
    }
    let table = CourseTable::from_courses(courses);
    log::info!("loaded {} courses", table.len());
    Ok(table)
}

// ---------------------------------------------------------------------------
// CSV loader
// ---------------------------------------------------------------------------

fn load_csv(path: &Path) -> Result<CourseTable> {
    let file = std::fs::File::open(path).context("opening CSV")?;
    parse_csv(file)
}

/// Parse CSV from any reader.  Split from [`load_csv`] so tests can feed
/// in-memory data.
fn parse_csv<R: Read>(input: R) -> Result<CourseTable> {
    let mut reader = csv::Reader::from_reader(input);
    let headers: Vec<String> = reader
        .headers()
        .context("reading CSV headers")?
        .iter()
        .map(|h| h.to_string())
        .collect();

    let column = |name: &str| -> Result<usize> {
        headers
            .iter()
            .position(|h| h.as_str() == name)
            .with_context(|| format!("CSV missing '{name}' column"))
    };
    let index_idx = headers
        .iter()
        .position(|h| INDEX_HEADERS.contains(&h.as_str()))
        .context("CSV missing index column")?;
    let title_idx = column(COL_TITLE)?;
    let org_idx = column(COL_ORGANIZATION)?;
    let cert_idx = column(COL_CERTIFICATE)?;
    let rating_idx = column(COL_RATING)?;
    let diff_idx = column(COL_DIFFICULTY)?;
    let enrolled_idx = column(COL_ENROLLED)?;

    let mut courses = Vec::new();
    let mut dropped = 0usize;

    for (row_no, result) in reader.records().enumerate() {
        let record = result.with_context(|| format!("CSV row {row_no}"))?;
        let field = |i: usize| record.get(i).unwrap_or("");

        let id: u32 = field(index_idx)
            .trim()
            .parse()
            .with_context(|| format!("CSV row {row_no}: invalid index '{}'", field(index_idx)))?;
        let rating: f64 = field(rating_idx)
            .trim()
            .parse()
            .with_context(|| format!("CSV row {row_no}: invalid rating '{}'", field(rating_idx)))?;

        match assemble(
            id,
            field(title_idx).to_string(),
            field(org_idx).to_string(),
            field(cert_idx),
            rating,
            field(diff_idx),
            field(enrolled_idx),
        ) {
            Some(course) => courses.push(course),
            None => dropped += 1,
        }
    }

    finish_table(courses, dropped)
}

// ---------------------------------------------------------------------------
// JSON loader
// ---------------------------------------------------------------------------

/// Expected JSON schema (records-oriented, the default
/// `df.to_json(orient='records')` with the index written as a column):
///
/// ```json
/// [
///   {
///     "index": 0,
///     "course_title": "Machine Learning",
///     "course_organization": "Stanford University",
///     "course_Certificate_type": "COURSE",
///     "course_rating": 4.9,
///     "course_difficulty": "Mixed",
///     "course_students_enrolled": "3.2m"
///   },
///   ...
/// ]
/// ```
fn load_json(path: &Path) -> Result<CourseTable> {
    let text = std::fs::read_to_string(path).context("reading JSON file")?;
    let root: JsonValue = serde_json::from_str(&text).context("parsing JSON")?;

    let records = root.as_array().context("Expected top-level JSON array")?;

    let mut courses = Vec::with_capacity(records.len());
    let mut dropped = 0usize;

    for (i, rec) in records.iter().enumerate() {
        let obj = rec
            .as_object()
            .with_context(|| format!("Row {i} is not a JSON object"))?;

        let id = obj
            .get("index")
            .or_else(|| obj.get("Unnamed: 0"))
            .and_then(|v| v.as_u64())
            .with_context(|| format!("Row {i}: missing or invalid 'index'"))? as u32;
        let rating = obj
            .get(COL_RATING)
            .and_then(|v| v.as_f64())
            .with_context(|| format!("Row {i}: missing or invalid '{COL_RATING}'"))?;

        match assemble(
            id,
            json_str(obj, i, COL_TITLE)?.to_string(),
            json_str(obj, i, COL_ORGANIZATION)?.to_string(),
            json_str(obj, i, COL_CERTIFICATE)?,
            rating,
            json_str(obj, i, COL_DIFFICULTY)?,
            json_str(obj, i, COL_ENROLLED)?,
        ) {
            Some(course) => courses.push(course),
            None => dropped += 1,
        }
    }

    finish_table(courses, dropped)
}

fn json_str<'a>(
    obj: &'a serde_json::Map<String, JsonValue>,
    row: usize,
    key: &str,
) -> Result<&'a str> {
    obj.get(key)
        .and_then(|v| v.as_str())
        .with_context(|| format!("Row {row}: missing or invalid '{key}'"))
}

// ---------------------------------------------------------------------------
// Parquet loader
// ---------------------------------------------------------------------------

/// Load a Parquet export of the catalog.
///
/// Expected schema: one scalar column per CSV column, with the index as an
/// integer column named like one of the accepted index headers.  Works with
/// files written by both **Pandas** (`df.to_parquet()`) and **Polars**
/// (`df.write_parquet()`).
fn load_parquet(path: &Path) -> Result<CourseTable> {
    let file = std::fs::File::open(path).context("opening parquet file")?;
    let builder = ParquetRecordBatchReaderBuilder::try_new(file)
        .context("reading parquet metadata")?;
    let reader = builder.build().context("building parquet reader")?;

    let mut courses = Vec::new();
    let mut dropped = 0usize;

    for batch_result in reader {
        let batch = batch_result.context("reading parquet record batch")?;

        let index_col = INDEX_HEADERS
            .iter()
            .find_map(|name| parquet_column(&batch, name).ok())
            .context("Parquet file missing index column")?;
        let title_col = parquet_column(&batch, COL_TITLE)?;
        let org_col = parquet_column(&batch, COL_ORGANIZATION)?;
        let cert_col = parquet_column(&batch, COL_CERTIFICATE)?;
        let rating_col = parquet_column(&batch, COL_RATING)?;
        let diff_col = parquet_column(&batch, COL_DIFFICULTY)?;
        let enrolled_col = parquet_column(&batch, COL_ENROLLED)?;

        for row in 0..batch.num_rows() {
            let id = int_value(index_col, row)
                .with_context(|| format!("Row {row}: failed to read index"))?;
            let id = u32::try_from(id)
                .with_context(|| format!("Row {row}: negative index {id}"))?;
            let rating = float_value(rating_col, row)
                .with_context(|| format!("Row {row}: failed to read '{COL_RATING}'"))?;

            match assemble(
                id,
                string_value(title_col, row)
                    .with_context(|| format!("Row {row}: failed to read '{COL_TITLE}'"))?,
                string_value(org_col, row)
                    .with_context(|| format!("Row {row}: failed to read '{COL_ORGANIZATION}'"))?,
                &string_value(cert_col, row)
                    .with_context(|| format!("Row {row}: failed to read '{COL_CERTIFICATE}'"))?,
                rating,
                &string_value(diff_col, row)
                    .with_context(|| format!("Row {row}: failed to read '{COL_DIFFICULTY}'"))?,
                &string_value(enrolled_col, row)
                    .with_context(|| format!("Row {row}: failed to read '{COL_ENROLLED}'"))?,
            ) {
                Some(course) => courses.push(course),
                None => dropped += 1,
            }
        }
    }

    finish_table(courses, dropped)
}

// -- Parquet / Arrow helpers --

fn parquet_column<'a>(batch: &'a RecordBatch, name: &str) -> Result<&'a ArrayRef> {
    let idx = batch
        .schema()
        .index_of(name)
        .map_err(|_| anyhow::anyhow!("Parquet file missing '{name}' column"))?;
    Ok(batch.column(idx))
}

/// Extract a string cell from a Utf8 or LargeUtf8 column.
fn string_value(col: &ArrayRef, row: usize) -> Result<String> {
    if col.is_null(row) {
        bail!("null value in string column");
    }
    match col.data_type() {
        DataType::Utf8 => {
            if let Some(s) = col.as_any().downcast_ref::<StringArray>() {
                Ok(s.value(row).to_string())
            } else {
                bail!("expected StringArray")
            }
        }
        DataType::LargeUtf8 => {
            let s = col.as_string::<i64>();
            Ok(s.value(row).to_string())
        }
        other => bail!("expected Utf8 column, got {other:?}"),
    }
}

/// Extract an integer cell from an Int64 or Int32 column.
fn int_value(col: &ArrayRef, row: usize) -> Result<i64> {
    if col.is_null(row) {
        bail!("null value in integer column");
    }
    match col.data_type() {
        DataType::Int64 => {
            let arr = col.as_any().downcast_ref::<Int64Array>().unwrap();
            Ok(arr.value(row))
        }
        DataType::Int32 => {
            let arr = col.as_any().downcast_ref::<Int32Array>().unwrap();
            Ok(arr.value(row) as i64)
        }
        other => bail!("expected integer column, got {other:?}"),
    }
}

/// Extract a float cell from a Float64 or Float32 column.
fn float_value(col: &ArrayRef, row: usize) -> Result<f64> {
    if col.is_null(row) {
        bail!("null value in float column");
    }
    match col.data_type() {
        DataType::Float64 => {
            let arr = col.as_any().downcast_ref::<Float64Array>().unwrap();
            Ok(arr.value(row))
        }
        DataType::Float32 => {
            let arr = col.as_any().downcast_ref::<Float32Array>().unwrap();
            Ok(arr.value(row) as f64)
        }
        other => bail!("expected float column, got {other:?}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    const CSV_FIXTURE: &str = "\
,course_title,course_organization,course_Certificate_type,course_rating,course_difficulty,course_students_enrolled
2,Python Basics,Uni A,COURSE,4.5,Beginner,120k
0,Data Science,Uni B,SPECIALIZATION,4.8,Intermediate,1.2m
1,Business Strategy,Biz School,PROFESSIONAL CERTIFICATE,4.1,Mixed,5
";

    #[test]
    fn value_to_float_converts_compact_notation() {
        assert_eq!(value_to_float("100k"), 100_000.0);
        assert_eq!(value_to_float("3m"), 3_000_000.0);
        assert_eq!(value_to_float("1.2m"), 1_200_000.0);
        assert_eq!(value_to_float("k"), 1_000.0);
        assert_eq!(value_to_float("m"), 1_000_000.0);
        // No recognized suffix → unknown sentinel, not a parse of the digits.
        assert_eq!(value_to_float("5"), 0.0);
        assert_eq!(value_to_float(""), 0.0);
        assert_eq!(value_to_float("abck"), 0.0);
    }

    #[test]
    fn csv_rows_are_parsed_and_reindexed() {
        let table = parse_csv(Cursor::new(CSV_FIXTURE)).unwrap();
        assert_eq!(table.len(), 3);

        let ids: Vec<u32> = table.courses.iter().map(|c| c.id).collect();
        assert_eq!(ids, vec![0, 1, 2]);

        let data = &table.courses[0];
        assert_eq!(data.title, "Data Science");
        assert_eq!(data.certificate_type, CertificateType::Specialization);
        assert_eq!(data.students_enrolled, 1_200_000.0);

        // "5" has no suffix → unknown sentinel.
        assert_eq!(table.courses[1].students_enrolled, 0.0);
        assert_eq!(table.courses[2].students_enrolled, 120_000.0);
    }

    #[test]
    fn unrecognized_categories_drop_the_row() {
        let csv = "\
,course_title,course_organization,course_Certificate_type,course_rating,course_difficulty,course_students_enrolled
0,Good Course,Uni,COURSE,4.5,Beginner,10k
1,Bad Cert,Uni,DIPLOMA,4.5,Beginner,10k
2,Bad Difficulty,Uni,COURSE,4.5,Expert,10k
";
        let table = parse_csv(Cursor::new(csv)).unwrap();
        assert_eq!(table.len(), 1);
        assert_eq!(table.courses[0].title, "Good Course");
    }

    #[test]
    fn malformed_rating_is_fatal() {
        let csv = "\
,course_title,course_organization,course_Certificate_type,course_rating,course_difficulty,course_students_enrolled
0,Broken,Uni,COURSE,not-a-number,Beginner,10k
";
        assert!(parse_csv(Cursor::new(csv)).is_err());
    }

    #[test]
    fn missing_column_is_fatal() {
        let csv = "course_title,course_rating\nSomething,4.5\n";
        assert!(parse_csv(Cursor::new(csv)).is_err());
    }

    #[test]
    fn load_file_dispatches_on_extension() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("courses.csv");
        std::fs::write(&path, CSV_FIXTURE).unwrap();

        let table = load_file(&path).unwrap();
        assert_eq!(table.len(), 3);

        assert!(load_file(&dir.path().join("courses.txt")).is_err());
        assert!(load_file(&dir.path().join("missing.csv")).is_err());
    }

    #[test]
    fn json_records_are_parsed() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("courses.json");
        std::fs::write(
            &path,
            r#"[
              {"index": 1, "course_title": "AI For Everyone", "course_organization": "DL School",
               "course_Certificate_type": "COURSE", "course_rating": 4.8,
               "course_difficulty": "Beginner", "course_students_enrolled": "550k"},
              {"index": 0, "course_title": "Marketing Analytics", "course_organization": "Biz U",
               "course_Certificate_type": "SPECIALIZATION", "course_rating": 4.4,
               "course_difficulty": "Intermediate", "course_students_enrolled": "98k"}
            ]"#,
        )
        .unwrap();

        let table = load_file(&path).unwrap();
        assert_eq!(table.len(), 2);
        assert_eq!(table.courses[0].id, 0);
        assert_eq!(table.courses[1].students_enrolled, 550_000.0);
    }
}
