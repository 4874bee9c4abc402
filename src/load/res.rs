//! Result file discovery and loading.

use ::parquet::file::reader::{FileReader, SerializedFileReader};
use ::parquet::record::Field;

use crate::common::{res::Row, *};
use crate::consts::data;

/// Result files directly inside a directory, sorted by path.
pub fn discover(dir: &Path) -> Res<Vec<PathBuf>> {
    let dir = ::glob::Pattern::escape(&dir.to_string_lossy());
    let mut files = vec![];
    for ext in &[data::csv_ext, data::parquet_ext] {
        for entry in ::glob::glob(&format!("{}/*.{}", dir, ext))? {
            let path = entry.map_err(|e| format!("{}", e))?;
            if path.is_file() {
                files.push(path)
            }
        }
    }
    files.sort();
    Ok(files)
}

/// Loads a result file, CSV or parquet depending on its extension.
pub fn load(path: &Path) -> Res<(Set<String>, Vec<Row>)> {
    match path.extension().and_then(|ext| ext.to_str()) {
        Some(ext) if ext == data::parquet_ext => parquet(path),
        Some(ext) if ext == data::csv_ext => csv(path),
        _ => bail!("unsupported result file `{}`", path.to_string_lossy()),
    }
}

/// Loads a CSV result file with a header row.
///
/// Returns the columns of the file and its rows. Fails if any record is
/// malformed, in which case none of the rows should be used.
pub fn csv(path: &Path) -> Res<(Set<String>, Vec<Row>)> {
    let mut reader = ::csv::ReaderBuilder::new()
        .has_headers(true)
        .from_path(path)?;
    let headers = reader.headers()?.clone();

    let mut columns = Set::new();
    for header in headers.iter() {
        // Unnamed index column.
        if header.is_empty() {
            continue;
        }
        let is_new = columns.insert(header.to_string());
        if !is_new {
            bail!("column `{}` appears twice in the header", header)
        }
    }

    let mut rows = vec![];
    for (index, record) in reader.records().enumerate() {
        let record = record.chain_err(|| format!("while reading record {}", index + 1))?;
        let row: Row = headers
            .iter()
            .zip(record.iter())
            .filter(|(header, _)| !header.is_empty())
            .map(|(header, value)| (header.to_string(), value.to_string()))
            .collect();
        rows.push(row)
    }

    Ok((columns, rows))
}

/// True for the index columns pandas adds to parquet files.
fn is_parquet_index(column: &str) -> bool {
    column.starts_with(data::parquet_index)
}

/// Raw text of a parquet field, `None` for nulls.
fn parquet_text(field: &Field) -> Option<String> {
    match field {
        Field::Null => None,
        Field::Str(s) => Some(s.clone()),
        Field::Float(f) => Some(f.to_string()),
        Field::Double(f) => Some(f.to_string()),
        other => Some(other.to_string()),
    }
}

/// Loads a parquet result file.
///
/// Same contract as [`csv`]: all of the rows, or an error.
pub fn parquet(path: &Path) -> Res<(Set<String>, Vec<Row>)> {
    let reader = SerializedFileReader::new(File::open(path)?)?;

    let mut columns = Set::new();
    for field in reader.metadata().file_metadata().schema().get_fields() {
        let name = field.name();
        if is_parquet_index(name) {
            continue;
        }
        let is_new = columns.insert(name.to_string());
        if !is_new {
            bail!("column `{}` appears twice in the schema", name)
        }
    }

    let mut rows = vec![];
    for (index, row) in reader.get_row_iter(None)?.enumerate() {
        let row = row.chain_err(|| format!("while reading record {}", index + 1))?;
        let row: Row = row
            .get_column_iter()
            .filter(|(name, _)| !is_parquet_index(name))
            .filter_map(|(name, field)| parquet_text(field).map(|text| (name.clone(), text)))
            .collect();
        rows.push(row)
    }

    Ok((columns, rows))
}

/// Test helpers, shared with the loader tests.
#[cfg(test)]
pub mod test {
    use std::sync::Arc;

    use ::parquet::data_type::{ByteArray, ByteArrayType, DoubleType};
    use ::parquet::file::properties::WriterProperties;
    use ::parquet::file::writer::SerializedFileWriter;
    use ::parquet::schema::parser::parse_message_type;

    use super::*;
    use crate::common::res::RowExt;

    /// Writes a parquet result file with a solver, a time and an optional
    /// gap per row.
    pub fn write_parquet(path: &Path, solvers: &[&str], times: &[f64], gaps: &[Option<f64>]) {
        let schema = parse_message_type(
            "message schema {
                REQUIRED BYTE_ARRAY solver_name (UTF8);
                REQUIRED DOUBLE time;
                OPTIONAL DOUBLE objective_duality_gap;
            }",
        )
        .unwrap();
        let props = Arc::new(WriterProperties::builder().build());
        let file = File::create(path).unwrap();
        let mut writer = SerializedFileWriter::new(file, Arc::new(schema), props).unwrap();
        let mut group = writer.next_row_group().unwrap();

        let names: Vec<ByteArray> = solvers.iter().map(|s| ByteArray::from(*s)).collect();
        let mut column = group.next_column().unwrap().unwrap();
        column
            .typed::<ByteArrayType>()
            .write_batch(&names, None, None)
            .unwrap();
        column.close().unwrap();

        let mut column = group.next_column().unwrap().unwrap();
        column
            .typed::<DoubleType>()
            .write_batch(times, None, None)
            .unwrap();
        column.close().unwrap();

        let present: Vec<f64> = gaps.iter().filter_map(|gap| *gap).collect();
        let levels: Vec<i16> = gaps.iter().map(|gap| gap.is_some() as i16).collect();
        let mut column = group.next_column().unwrap().unwrap();
        column
            .typed::<DoubleType>()
            .write_batch(&present, Some(&levels), None)
            .unwrap();
        column.close().unwrap();

        group.close().unwrap();
        writer.close().unwrap();
    }

    fn write(dir: &Path, name: &str, content: &str) -> PathBuf {
        let path = dir.join(name);
        ::std::fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn discover_sorted_results_only() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "b.csv", "time\n1\n");
        write(dir.path(), "a.csv", "time\n1\n");
        write(dir.path(), "ab.parquet", "");
        write(dir.path(), "notes.txt", "hello");
        ::std::fs::create_dir(dir.path().join("sub")).unwrap();
        write(&dir.path().join("sub"), "c.csv", "time\n1\n");

        let files = discover(dir.path()).unwrap();
        let names: Vec<_> = files
            .iter()
            .map(|f| f.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["a.csv", "ab.parquet", "b.csv"])
    }

    #[test]
    fn discover_escapes_the_directory() {
        let dir = tempfile::tempdir().unwrap();
        let weird = dir.path().join("run[1]");
        ::std::fs::create_dir(&weird).unwrap();
        write(&weird, "a.csv", "time\n1\n");
        assert_eq!(discover(&weird).unwrap().len(), 1)
    }

    #[test]
    fn load_csv() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(
            dir.path(),
            "res.csv",
            ",objective_name,solver_name,time,objective_duality_gap\n\
             0,\"SLOPE[reg=0.1,q=0.2]\",ADMM,0.5,1e-3\n\
             1,\"SLOPE[reg=0.1,q=0.2]\",\"PGD[acceleration=bb]\",0.7,\n",
        );
        let (columns, rows) = csv(&path).unwrap();
        assert_eq!(columns.len(), 4);
        assert!(!columns.contains(""));
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].field("objective_name"), Some("SLOPE[reg=0.1,q=0.2]"));
        assert_eq!(rows[1].field("solver_name"), Some("PGD[acceleration=bb]"));
        assert_eq!(rows[1].field("objective_duality_gap"), None)
    }

    #[test]
    fn malformed_csv_fails() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(dir.path(), "bad.csv", "time,solver_name\n1,ADMM\n2,PGD,extra\n");
        assert!(csv(&path).is_err());
        let path = write(dir.path(), "dup.csv", "time,time\n1,2\n");
        assert!(csv(&path).is_err());
        assert!(csv(&dir.path().join("nope.csv")).is_err())
    }

    #[test]
    fn load_parquet() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("res.parquet");
        write_parquet(
            &path,
            &["ADMM", "PGD[acceleration=bb]"],
            &[0.5, 0.7],
            &[Some(1e-3), None],
        );
        let (columns, rows) = load(&path).unwrap();
        let columns: Vec<_> = columns.iter().map(|c| c.as_str()).collect();
        assert_eq!(columns, vec!["objective_duality_gap", "solver_name", "time"]);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].field("solver_name"), Some("ADMM"));
        assert_eq!(rows[0].field("time"), Some("0.5"));
        assert_eq!(rows[0].field("objective_duality_gap"), Some("0.001"));
        assert_eq!(rows[1].field("solver_name"), Some("PGD[acceleration=bb]"));
        assert_eq!(rows[1].field("objective_duality_gap"), None)
    }

    #[test]
    fn malformed_parquet_fails() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(dir.path(), "bad.parquet", "time\n1\n");
        assert!(load(&path).is_err());
        let path = write(dir.path(), "res.txt", "time\n1\n");
        assert!(load(&path).is_err())
    }
}
