//! Loading pasted price history from files, stdin, or zstd archives

use anyhow::{Context, Result};
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::{Path, PathBuf};

fn is_zst(path: &Path) -> bool {
    path.extension().map_or(false, |ext| ext == "zst")
}

/// Read an input source to a string. `None` or `-` reads stdin; files ending
/// in `.zst` are decompressed on the fly.
pub fn read_input(path: Option<&Path>) -> Result<String> {
    let mut text = String::new();

    match path {
        None => {
            std::io::stdin()
                .read_to_string(&mut text)
                .context("Failed to read stdin")?;
        }
        Some(p) if p == Path::new("-") => {
            std::io::stdin()
                .read_to_string(&mut text)
                .context("Failed to read stdin")?;
        }
        Some(p) if is_zst(p) => {
            let file = File::open(p).with_context(|| format!("Failed to open file: {:?}", p))?;
            let decoder = zstd::stream::Decoder::new(file)
                .with_context(|| format!("Failed to create zstd decoder for: {:?}", p))?;
            BufReader::new(decoder)
                .read_to_string(&mut text)
                .with_context(|| format!("Failed to decompress: {:?}", p))?;
        }
        Some(p) => {
            text = std::fs::read_to_string(p)
                .with_context(|| format!("Failed to read file: {:?}", p))?;
        }
    }

    tracing::debug!("Read {} bytes of input", text.len());
    Ok(text)
}

/// Find input files in a directory whose name ends with `ext` (or
/// `ext` + ".zst"), sorted by path
pub fn find_input_files(dir: &Path, ext: &str) -> Result<Vec<PathBuf>> {
    let plain = format!(".{}", ext.trim_start_matches('.'));
    let compressed = format!("{}.zst", plain);
    let mut files = Vec::new();

    for entry in std::fs::read_dir(dir)
        .with_context(|| format!("Failed to read directory: {:?}", dir))?
    {
        let path = entry?.path();
        if !path.is_file() {
            continue;
        }

        let name = path.file_name().map(|n| n.to_string_lossy().to_string());
        if let Some(name) = name {
            if name.ends_with(&plain) || name.ends_with(&compressed) {
                files.push(path);
            }
        }
    }

    files.sort();
    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_read_plain_and_zst() {
        let dir = tempfile::tempdir().unwrap();
        let text = "Period\tTime\tClosing Price\tChange\tVolume\n1\tSun, 11/17, 19:00\t$233.40\t+$0.00\t1";

        let plain = dir.path().join("prices.txt");
        std::fs::write(&plain, text).unwrap();
        assert_eq!(read_input(Some(&plain)).unwrap(), text);

        let packed = dir.path().join("prices.txt.zst");
        let compressed = zstd::encode_all(text.as_bytes(), 3).unwrap();
        File::create(&packed).unwrap().write_all(&compressed).unwrap();
        assert_eq!(read_input(Some(&packed)).unwrap(), text);
    }

    #[test]
    fn test_missing_file_has_context() {
        let err = read_input(Some(Path::new("/definitely/not/here.txt"))).unwrap_err();
        assert!(err.to_string().contains("Failed to read file"));
    }

    #[test]
    fn test_find_input_files() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["b.txt", "a.txt.zst", "c.csv", "notes.md"] {
            std::fs::write(dir.path().join(name), "").unwrap();
        }
        std::fs::create_dir(dir.path().join("sub.txt")).unwrap();

        let files = find_input_files(dir.path(), "txt").unwrap();
        let names: Vec<String> = files
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().to_string())
            .collect();
        assert_eq!(names, vec!["a.txt.zst", "b.txt"]);
    }
}
