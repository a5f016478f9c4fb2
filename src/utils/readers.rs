use super::Result;
use flate2::read::MultiGzDecoder;
use std::fs::File;
use std::io::{BufReader, Read as ioRead};
use std::path::Path;

fn is_gzipped(path: &Path) -> bool {
    let path_str = path.to_string_lossy().to_lowercase();
    path_str.ends_with(".gz") || path_str.ends_with(".gzip")
}

/// Opens a plain or gzip-compressed text input.
pub fn open_input_reader(path: &Path) -> Result<BufReader<Box<dyn ioRead>>> {
    let file =
        File::open(path).map_err(|e| format!("Failed to open {}: {}", path.display(), e))?;
    if is_gzipped(path) {
        let gz_decoder = MultiGzDecoder::new(file);
        if gz_decoder.header().is_some() {
            Ok(BufReader::new(Box::new(gz_decoder)))
        } else {
            Err(format!("Invalid gzip header: {}", path.to_string_lossy()))
        }
    } else {
        Ok(BufReader::new(Box::new(file)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::{write::GzEncoder, Compression};
    use std::io::{BufRead, Write};

    #[test]
    fn test_reads_plain_and_gzipped_files() {
        let dir = tempfile::tempdir().unwrap();
        let plain = dir.path().join("loci.txt");
        std::fs::write(&plain, "L1 0.05 0.01 1,1\n").unwrap();

        let gzipped = dir.path().join("loci.txt.gz");
        let mut encoder = GzEncoder::new(File::create(&gzipped).unwrap(), Compression::default());
        encoder.write_all(b"L1 0.05 0.01 1,1\n").unwrap();
        encoder.finish().unwrap();

        for path in [&plain, &gzipped] {
            let lines: Vec<String> = open_input_reader(path)
                .unwrap()
                .lines()
                .map(|l| l.unwrap())
                .collect();
            assert_eq!(lines, vec!["L1 0.05 0.01 1,1"]);
        }
    }

    #[test]
    fn test_rejects_bad_gzip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("loci.txt.gz");
        std::fs::write(&path, "not compressed\n").unwrap();
        assert!(open_input_reader(&path).is_err());
        assert!(open_input_reader(&dir.path().join("missing.txt")).is_err());
    }
}
