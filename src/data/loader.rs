use std::io;
use std::path::Path;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use arrow::array::{Array, ArrayRef, AsArray};
use arrow::compute::cast;
use arrow::datatypes::{DataType, Date32Type, Float32Type, Float64Type, Int32Type, Int64Type};
use arrow::util::display::array_value_to_string;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;

use super::model::{CellValue, RawTable};

/// Field separator of the published extracts.
pub const DELIMITER: u8 = b';';

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Load an extract from disk. Dispatch by extension.
///
/// Supported formats:
/// * `.csv` / `.txt` – semicolon-delimited text with a header row
/// * `.parquet`      – columnar extract with the same column names
pub fn load_file(path: &Path) -> Result<RawTable> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    let table = match ext.as_str() {
        "csv" | "txt" => load_csv(path),
        "parquet" | "pq" => load_parquet(path),
        other => bail!("Unsupported file extension: .{other}"),
    }
    .with_context(|| format!("Erro ao ler o arquivo {}", path.display()))?;

    if table.is_empty() {
        log::warn!("{} has no data rows", path.display());
    }
    log::debug!(
        "Read {} rows x {} columns from {}",
        table.len(),
        table.headers.len(),
        path.display()
    );
    Ok(table)
}

// ---------------------------------------------------------------------------
// Delimited text loader
// ---------------------------------------------------------------------------

fn load_csv(path: &Path) -> Result<RawTable> {
    let file = std::fs::File::open(path).context("opening CSV")?;
    read_delimited(file)
}

/// Parse semicolon-delimited text with a header row.
///
/// Malformed rows are skipped without error: rows with more fields than the
/// header and rows that fail to decode. Short rows are padded with nulls.
pub fn read_delimited<R: io::Read>(input: R) -> Result<RawTable> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(DELIMITER)
        .flexible(true)
        .from_reader(input);

    let headers: Vec<String> = reader
        .headers()
        .context("reading CSV headers")?
        .iter()
        .map(|h| h.trim_start_matches('\u{feff}').trim().to_string())
        .collect();
    if headers.is_empty() {
        bail!("CSV has no header row");
    }

    let mut table = RawTable::new(headers);
    let width = table.headers.len();
    let mut skipped = 0usize;

    for result in reader.records() {
        let record = match result {
            Ok(record) if record.len() <= width => record,
            _ => {
                skipped += 1;
                continue;
            }
        };
        let mut row: Vec<CellValue> = record.iter().map(CellValue::from_field).collect();
        row.resize(width, CellValue::Null);
        table.rows.push(row);
    }

    if skipped > 0 {
        log::debug!("Skipped {skipped} malformed rows");
    }
    Ok(table)
}

// ---------------------------------------------------------------------------
// Parquet loader
// ---------------------------------------------------------------------------

/// Load a Parquet extract. Every column becomes a raw column. Strings,
/// integers, floats and booleans map directly; dates and timestamps become
/// `YYYY-MM` periods; anything else (dictionary-encoded categories, decimals)
/// is rendered to text and typed like a delimited field.
fn load_parquet(path: &Path) -> Result<RawTable> {
    let file = std::fs::File::open(path).context("opening parquet file")?;
    let builder =
        ParquetRecordBatchReaderBuilder::try_new(file).context("reading parquet metadata")?;
    let headers: Vec<String> = builder
        .schema()
        .fields()
        .iter()
        .map(|f| f.name().clone())
        .collect();
    let reader = builder.build().context("building parquet reader")?;

    let mut table = RawTable::new(headers);

    for batch_result in reader {
        let batch = batch_result.context("reading parquet record batch")?;
        let columns = batch
            .columns()
            .iter()
            .map(normalize_column)
            .collect::<Result<Vec<_>>>()?;
        for row in 0..batch.num_rows() {
            table
                .rows
                .push(columns.iter().map(|col| extract_cell(col, row)).collect());
        }
    }

    Ok(table)
}

/// Bring every date-like column down to day precision.
fn normalize_column(col: &ArrayRef) -> Result<ArrayRef> {
    match col.data_type() {
        DataType::Date64 | DataType::Timestamp(_, _) => cast(col.as_ref(), &DataType::Date32)
            .with_context(|| format!("converting {} column to dates", col.data_type())),
        _ => Ok(Arc::clone(col)),
    }
}

/// Extract a single cell from an Arrow column at a given row.
fn extract_cell(col: &ArrayRef, row: usize) -> CellValue {
    if col.is_null(row) {
        return CellValue::Null;
    }
    match col.data_type() {
        DataType::Utf8 => CellValue::Text(col.as_string::<i32>().value(row).to_string()),
        DataType::LargeUtf8 => CellValue::Text(col.as_string::<i64>().value(row).to_string()),
        DataType::Int32 => CellValue::Integer(col.as_primitive::<Int32Type>().value(row) as i64),
        DataType::Int64 => CellValue::Integer(col.as_primitive::<Int64Type>().value(row)),
        DataType::Float32 => CellValue::Float(col.as_primitive::<Float32Type>().value(row) as f64),
        DataType::Float64 => CellValue::Float(col.as_primitive::<Float64Type>().value(row)),
        DataType::Boolean => CellValue::Integer(col.as_boolean().value(row) as i64),
        DataType::Date32 => col
            .as_primitive::<Date32Type>()
            .value_as_date(row)
            .map_or(CellValue::Null, |d| {
                CellValue::Text(d.format("%Y-%m").to_string())
            }),
        _ => match array_value_to_string(col.as_ref(), row) {
            Ok(text) => CellValue::from_field(&text),
            Err(e) => {
                log::debug!("Unreadable {} cell at row {row}: {e}", col.data_type());
                CellValue::Null
            }
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    use arrow::array::{Date32Array, DictionaryArray, Float64Array, Int64Array, StringArray};
    use arrow::datatypes::{Field, Schema};
    use arrow::record_batch::RecordBatch;
    use parquet::arrow::ArrowWriter;
    use tempfile::{Builder, NamedTempFile};

    #[test]
    fn reads_semicolon_extract() {
        let text = "Período;Instituição;Nº Cesarianas\n2024-01;ULS da Guarda;12\n2024-02;ULS da Guarda;\n";
        let table = read_delimited(text.as_bytes()).unwrap();
        assert_eq!(table.headers, vec!["Período", "Instituição", "Nº Cesarianas"]);
        assert_eq!(table.len(), 2);
        assert_eq!(table.rows[0][0], CellValue::Text("2024-01".into()));
        assert_eq!(table.rows[0][2], CellValue::Integer(12));
        assert_eq!(table.rows[1][2], CellValue::Null);
    }

    #[test]
    fn skips_rows_with_extra_fields_and_pads_short_rows() {
        let text = "a;b;c\n1;2;3\n1;2;3;4;5\n7;8\n";
        let table = read_delimited(text.as_bytes()).unwrap();
        assert_eq!(table.len(), 2);
        assert_eq!(
            table.rows[1],
            vec![CellValue::Integer(7), CellValue::Integer(8), CellValue::Null]
        );
    }

    #[test]
    fn skips_rows_that_are_not_utf8() {
        let text: &[u8] = b"a;b\n1;2\n\xff\xfe;3\n4;5\n";
        let table = read_delimited(text).unwrap();
        assert_eq!(table.len(), 2);
        assert_eq!(table.rows[1][0], CellValue::Integer(4));
    }

    #[test]
    fn strips_byte_order_mark_from_first_header() {
        let text = "\u{feff}Período;x\n2024-01;1\n";
        let table = read_delimited(text.as_bytes()).unwrap();
        assert_eq!(table.column_index("Período"), Some(0));
    }

    #[test]
    fn load_file_reads_csv_from_disk() -> Result<()> {
        let mut tmp = Builder::new().suffix(".csv").tempfile()?;
        writeln!(tmp, "Período;Entidade;Nº de Nascer Utente")?;
        writeln!(tmp, "2024-05;ULS Guarda;40")?;
        tmp.flush()?;

        let table = load_file(tmp.path())?;
        assert_eq!(table.len(), 1);
        assert_eq!(table.rows[0][2], CellValue::Integer(40));
        Ok(())
    }

    #[test]
    fn missing_file_is_an_error() {
        let err = load_file(Path::new("/nonexistent/dir/extract.csv")).unwrap_err();
        assert!(format!("{err:#}").contains("extract.csv"));
    }

    #[test]
    fn unsupported_extension_is_an_error() {
        let tmp = NamedTempFile::new().unwrap();
        assert!(load_file(tmp.path()).is_err());
    }

    #[test]
    fn load_file_reads_parquet() -> Result<()> {
        let schema = Arc::new(Schema::new(vec![
            Field::new("Período", DataType::Utf8, false),
            Field::new("Óbitos", DataType::Int64, true),
            Field::new("Internamentos", DataType::Float64, false),
        ]));
        let batch = RecordBatch::try_new(
            schema.clone(),
            vec![
                Arc::new(StringArray::from(vec!["2024-01", "2024-02"])),
                Arc::new(Int64Array::from(vec![Some(3), None])),
                Arc::new(Float64Array::from(vec![10.0, 12.5])),
            ],
        )?;

        let tmp = Builder::new().suffix(".parquet").tempfile()?;
        let mut writer = ArrowWriter::try_new(tmp.reopen()?, schema, None)?;
        writer.write(&batch)?;
        writer.close()?;

        let table = load_file(tmp.path())?;
        assert_eq!(table.headers, vec!["Período", "Óbitos", "Internamentos"]);
        assert_eq!(table.len(), 2);
        assert_eq!(table.rows[0][1], CellValue::Integer(3));
        assert_eq!(table.rows[1][1], CellValue::Null);
        assert_eq!(table.rows[1][2], CellValue::Float(12.5));
        Ok(())
    }

    #[test]
    fn parquet_categories_and_dates_keep_their_values() -> Result<()> {
        let institutions: DictionaryArray<Int32Type> =
            vec!["ULS Guarda", "ULS Viseu"].into_iter().collect();
        let schema = Arc::new(Schema::new(vec![
            Field::new("Período", DataType::Date32, false),
            Field::new(
                "Instituição",
                DataType::Dictionary(Box::new(DataType::Int32), Box::new(DataType::Utf8)),
                false,
            ),
        ]));
        // 2024-01-01 and 2024-02-01 as days since the epoch
        let batch = RecordBatch::try_new(
            schema.clone(),
            vec![
                Arc::new(Date32Array::from(vec![19723, 19754])),
                Arc::new(institutions),
            ],
        )?;

        let tmp = Builder::new().suffix(".parquet").tempfile()?;
        let mut writer = ArrowWriter::try_new(tmp.reopen()?, schema, None)?;
        writer.write(&batch)?;
        writer.close()?;

        let table = load_file(tmp.path())?;
        assert_eq!(
            table.rows[0],
            vec![
                CellValue::Text("2024-01".into()),
                CellValue::Text("ULS Guarda".into())
            ]
        );
        assert_eq!(table.rows[1][0], CellValue::Text("2024-02".into()));
        assert_eq!(table.rows[1][1], CellValue::Text("ULS Viseu".into()));
        Ok(())
    }
}
