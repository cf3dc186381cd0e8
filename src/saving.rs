use bincode::{deserialize_from, serialize_into};
use flate2::Compression;
use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Error, ErrorKind};
use std::path::{Path, PathBuf};

use crate::cell::CellRecord;

/// Writes the whole cell table as gzip-compressed bincode.
///
/// The data goes to a temporary sibling file first and is renamed over
/// `path`, so readers never observe a half-written table.
pub fn save_cells(records: &[CellRecord], path: &Path) -> std::io::Result<()> {
    let tmp = temp_path(path);
    let file = File::create(&tmp)?;
    let encoder = GzEncoder::new(file, Compression::default());
    let mut writer = BufWriter::new(encoder);

    serialize_into(&mut writer, records).map_err(|e| Error::new(ErrorKind::Other, e))?;

    let encoder = writer.into_inner().map_err(|e| e.into_error())?;
    encoder.finish()?.sync_all()?;
    fs::rename(&tmp, path)?;

    Ok(())
}

pub fn load_cells(path: &Path) -> std::io::Result<Vec<CellRecord>> {
    let file = File::open(path)?;
    let decoder = GzDecoder::new(file);
    let mut reader = BufReader::new(decoder);

    let records: Vec<CellRecord> =
        deserialize_from(&mut reader).map_err(|e| Error::new(ErrorKind::InvalidData, e))?;

    Ok(records)
}

fn temp_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(id: u32, row: i32, column: i32, order: i32) -> CellRecord {
        CellRecord {
            id,
            row,
            column,
            is_active: order > 0,
            activation_order: order,
        }
    }

    #[test]
    fn saved_table_loads_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cells.bin.gz");
        let records = vec![record(1, 0, 0, 2), record(2, 3, 4, 0)];

        save_cells(&records, &path).unwrap();

        assert!(path.exists());
        assert!(!temp_path(&path).exists());
        assert_eq!(load_cells(&path).unwrap(), records);
    }

    #[test]
    fn garbage_is_invalid_data() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cells.bin.gz");
        fs::write(&path, b"not a gzip stream").unwrap();

        assert!(load_cells(&path).is_err());
    }
}
