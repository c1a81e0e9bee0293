use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;
use serde::{Serialize, de::DeserializeOwned};

/// Error type for I/O operations
#[derive(Error, Debug)]
pub enum IoError {
    #[error("File not found: {0}")]
    FileNotFound(PathBuf),
    #[error("IO error: {0}")]
    StdIo(#[from] std::io::Error),
    #[error("Serialization error: {0}")]
    Serialization(#[from] bincode::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Reads a file to string, mapping a missing file to `FileNotFound`
pub fn read_to_string(path: impl AsRef<Path>) -> Result<String, IoError> {
    let path = path.as_ref();
    fs::read_to_string(path)
        .map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                IoError::FileNotFound(path.to_path_buf())
            } else {
                IoError::StdIo(e)
            }
        })
}

/// Creates the parent directory of `path` if it has one
fn ensure_parent(path: &Path) -> Result<(), IoError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    Ok(())
}

fn open_for_read(path: &Path) -> Result<File, IoError> {
    File::open(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            IoError::FileNotFound(path.to_path_buf())
        } else {
            IoError::StdIo(e)
        }
    })
}

/// Serializes data to a binary file using bincode, overwriting any existing file
pub fn serialize_to_file<T: Serialize>(
    path: impl AsRef<Path>,
    data: &T,
) -> Result<(), IoError> {
    let path = path.as_ref();
    ensure_parent(path)?;
    let file = File::create(path)?;
    let mut writer = BufWriter::new(file);
    bincode::serialize_into(&mut writer, data)?;
    writer.flush()?;
    Ok(())
}

/// Deserializes data from a binary file using bincode
pub fn deserialize_from_file<T: DeserializeOwned>(
    path: impl AsRef<Path>,
) -> Result<T, IoError> {
    let reader = BufReader::new(open_for_read(path.as_ref())?);
    let data = bincode::deserialize_from(reader)?;
    Ok(data)
}

/// Writes data as pretty-printed JSON
pub fn write_json<T: Serialize>(path: impl AsRef<Path>, data: &T) -> Result<(), IoError> {
    let path = path.as_ref();
    ensure_parent(path)?;
    let mut writer = BufWriter::new(File::create(path)?);
    serde_json::to_writer_pretty(&mut writer, data)?;
    writer.flush()?;
    Ok(())
}

pub fn read_json<T: DeserializeOwned>(path: impl AsRef<Path>) -> Result<T, IoError> {
    let reader = BufReader::new(open_for_read(path.as_ref())?);
    Ok(serde_json::from_reader(reader)?)
}

/// Writes rows as comma-separated lines under a header of column indices.
///
/// Cells are written verbatim; callers must not pass cells containing
/// commas, quotes or line breaks.
pub fn write_table<R, C>(
    path: impl AsRef<Path>,
    columns: usize,
    rows: R,
) -> Result<usize, IoError>
where
    R: IntoIterator,
    R::Item: IntoIterator<Item = C>,
    C: AsRef<str>,
{
    let path = path.as_ref();
    ensure_parent(path)?;
    let mut writer = BufWriter::new(File::create(path)?);

    let header: Vec<String> = (0..columns).map(|i| i.to_string()).collect();
    writeln!(writer, "{}", header.join(","))?;

    let mut written = 0;
    for row in rows {
        let cells: Vec<C> = row.into_iter().collect();
        let line: Vec<&str> = cells.iter().map(|c| c.as_ref()).collect();
        writeln!(writer, "{}", line.join(","))?;
        written += 1;
    }
    writer.flush()?;
    Ok(written)
}
