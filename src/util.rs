use flate2::read::GzDecoder;
use serde::Serialize;
use std::fs::File;
use std::io::{self, BufWriter, Read, Write};
use std::path::Path;

/// Read a whole file, transparently decompressing it when the name ends
/// in `.gz`.
pub fn read_bytes(path: &Path) -> io::Result<Vec<u8>> {
    let file = File::open(path)?;
    let mut bytes = Vec::new();
    if path.extension().map_or(false, |ext| ext == "gz") {
        GzDecoder::new(file).read_to_end(&mut bytes)?;
    } else {
        let mut file = file;
        file.read_to_end(&mut bytes)?;
    }
    Ok(bytes)
}

pub fn read_string(path: &Path) -> io::Result<String> {
    let bytes = read_bytes(path)?;
    String::from_utf8(bytes).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
}

/// Pretty-printed JSON, newline terminated.
pub fn write_serialized<T: Serialize>(path: &Path, value: &T) -> io::Result<()> {
    let mut out = BufWriter::new(File::create(path)?);
    serde_json::to_writer_pretty(&mut out, value)?;
    writeln!(out)?;
    out.flush()
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::write::GzEncoder;
    use flate2::Compression;

    #[test]
    fn gz_files_are_decompressed() {
        let dir = tempfile::tempdir().unwrap();
        let plain = dir.path().join("votes.log");
        let packed = dir.path().join("votes.log.gz");

        std::fs::write(&plain, b"1 2 3\n").unwrap();
        let mut encoder = GzEncoder::new(File::create(&packed).unwrap(), Compression::default());
        encoder.write_all(b"1 2 3\n").unwrap();
        encoder.finish().unwrap();

        assert_eq!(read_bytes(&plain).unwrap(), b"1 2 3\n");
        assert_eq!(read_string(&packed).unwrap(), "1 2 3\n");
    }

    #[test]
    fn serialized_json_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.json");
        write_serialized(&path, &vec![1, 2, 3]).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.ends_with('\n'));
        let back: Vec<i32> = serde_json::from_str(&text).unwrap();
        assert_eq!(back, vec![1, 2, 3]);
    }
}
