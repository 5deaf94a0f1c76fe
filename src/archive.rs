//! # Archive Module
//!
//! Impacchetta la cartella finale in un unico archivio compresso.
//!
//! ## Formati:
//! - `zip`: deflate, `<cartella>_compressed.zip`
//! - `tar`: tar + gzip, `<cartella>_compressed.tar.gz`
//!
//! L'archivio viene scritto accanto alla cartella sorgente; i path interni
//! sono relativi alla radice e separati da `/`.

use crate::config::ArchiveFormat;
use crate::error::OptimizeError;
use anyhow::Result;
use flate2::write::GzEncoder;
use flate2::Compression;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use walkdir::WalkDir;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

/// `<parent>/<name>_compressed.<ext>`
pub fn archive_path(folder: &Path, format: ArchiveFormat) -> Result<PathBuf> {
    let folder = folder.canonicalize()?;
    let name = folder
        .file_name()
        .ok_or_else(|| OptimizeError::Archive(format!("Cannot archive {}", folder.display())))?
        .to_string_lossy();
    Ok(folder.with_file_name(format!("{}_compressed.{}", name, format.extension())))
}

/// Regular files under `folder` with their `/`-separated relative names, sorted
fn collect_entries(folder: &Path) -> Result<Vec<(PathBuf, String)>> {
    let mut entries = Vec::new();
    for entry in WalkDir::new(folder).sort_by_file_name() {
        let entry = entry?;
        if !entry.file_type().is_file() {
            continue;
        }
        let relative = entry.path().strip_prefix(folder)?;
        let name = relative
            .components()
            .map(|c| c.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/");
        entries.push((entry.path().to_path_buf(), name));
    }
    Ok(entries)
}

/// Archive `folder` and return the path of the written archive
pub fn compress_folder(folder: &Path, format: ArchiveFormat) -> Result<PathBuf> {
    let folder = folder.canonicalize()?;
    let output = archive_path(&folder, format)?;
    let entries = collect_entries(&folder)?;

    match format {
        ArchiveFormat::Zip => write_zip(&output, &entries)?,
        ArchiveFormat::Tar => write_tar_gz(&output, &entries)?,
    }

    info!(
        "📦 Compressed {} files into: {}",
        entries.len(),
        output.file_name().unwrap_or_default().to_string_lossy()
    );
    Ok(output)
}

fn write_zip(output: &Path, entries: &[(PathBuf, String)]) -> Result<()> {
    let mut zip = ZipWriter::new(BufWriter::new(File::create(output)?));

    for (path, name) in entries {
        debug!("zip <- {}", name);
        let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);
        zip.start_file(name.as_str(), options).map_err(OptimizeError::from)?;
        let mut file = File::open(path)?;
        io::copy(&mut file, &mut zip)?;
    }

    zip.finish().map_err(OptimizeError::from)?.flush()?;
    Ok(())
}

fn write_tar_gz(output: &Path, entries: &[(PathBuf, String)]) -> Result<()> {
    let encoder = GzEncoder::new(BufWriter::new(File::create(output)?), Compression::default());
    let mut builder = tar::Builder::new(encoder);

    for (path, name) in entries {
        debug!("tar <- {}", name);
        builder.append_path_with_name(path, name)?;
    }

    builder.into_inner()?.finish()?.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::read::GzDecoder;
    use std::collections::BTreeMap;
    use std::fs;
    use std::io::Read;
    use tempfile::TempDir;

    fn sample_tree(root: &Path) -> PathBuf {
        let folder = root.join("album");
        fs::create_dir_all(folder.join("sub")).unwrap();
        fs::write(folder.join("one.jpg"), b"first image").unwrap();
        fs::write(folder.join("two.mp3"), vec![9u8; 20_000]).unwrap();
        fs::write(folder.join("sub/three.txt"), b"nested").unwrap();
        folder
    }

    fn source_contents(folder: &Path) -> BTreeMap<String, Vec<u8>> {
        collect_entries(folder)
            .unwrap()
            .into_iter()
            .map(|(path, name)| (name, fs::read(path).unwrap()))
            .collect()
    }

    #[test]
    fn test_archive_path_naming() {
        let temp_dir = TempDir::new().unwrap();
        let folder = sample_tree(temp_dir.path());
        let parent = folder.canonicalize().unwrap().parent().unwrap().to_path_buf();

        assert_eq!(archive_path(&folder, ArchiveFormat::Zip).unwrap(), parent.join("album_compressed.zip"));
        assert_eq!(archive_path(&folder, ArchiveFormat::Tar).unwrap(), parent.join("album_compressed.tar.gz"));
    }

    #[test]
    fn test_zip_round_trip() {
        let temp_dir = TempDir::new().unwrap();
        let folder = sample_tree(temp_dir.path());

        let output = compress_folder(&folder, ArchiveFormat::Zip).unwrap();
        let mut archive = zip::ZipArchive::new(File::open(&output).unwrap()).unwrap();

        let mut extracted = BTreeMap::new();
        for i in 0..archive.len() {
            let mut entry = archive.by_index(i).unwrap();
            assert_eq!(entry.compression(), CompressionMethod::Deflated);
            let mut buf = Vec::new();
            entry.read_to_end(&mut buf).unwrap();
            extracted.insert(entry.name().to_string(), buf);
        }

        assert_eq!(extracted.len(), 3);
        assert_eq!(extracted, source_contents(&folder));
    }

    #[test]
    fn test_tar_gz_round_trip() {
        let temp_dir = TempDir::new().unwrap();
        let folder = sample_tree(temp_dir.path());

        let output = compress_folder(&folder, ArchiveFormat::Tar).unwrap();
        let mut archive = tar::Archive::new(GzDecoder::new(File::open(&output).unwrap()));

        let mut extracted = BTreeMap::new();
        for entry in archive.entries().unwrap() {
            let mut entry = entry.unwrap();
            let name = entry.path().unwrap().to_string_lossy().to_string();
            let mut buf = Vec::new();
            entry.read_to_end(&mut buf).unwrap();
            extracted.insert(name, buf);
        }

        assert_eq!(extracted, source_contents(&folder));
    }
}
