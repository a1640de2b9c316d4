// src/packages/archive_utils.rs

//! Gzip-compressed tar helpers for package archives
//!
//! Package archives keep their content under a single `package/` root with a
//! `package/package.json` manifest fragment. Rebuilt archives use POSIX ustar
//! headers with fixed permissions: directories 0755, files 0644. Paths longer
//! than ustar allows get a pax extended header instead of a GNU long name.

use crate::error::{Error, Result};
use flate2::Compression;
use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::{self, Read, Write};
use std::path::Path;
use std::time::UNIX_EPOCH;
use tar::{Archive, Builder, EntryType, Header};
use tracing::debug;
use walkdir::WalkDir;

pub const DIR_MODE: u32 = 0o755;
pub const FILE_MODE: u32 = 0o644;

/// The part of an embedded package.json the resolver cares about
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ManifestFragment {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub version: Option<String>,
    /// dependency identifier -> version constraint
    #[serde(default)]
    pub dependencies: BTreeMap<String, String>,
}

fn archive_err(context: &str, e: impl std::fmt::Display) -> Error {
    Error::Archive(format!("{context}: {e}"))
}

/// Normalize an entry path so "./package/x" and "package/x" compare equal
fn normalize_entry_path(path: &str) -> &str {
    path.trim_start_matches("./")
}

/// Read the manifest fragment at `fragment_path` from a gzipped tarball
pub fn read_manifest_fragment<R: Read>(reader: R, fragment_path: &str) -> Result<ManifestFragment> {
    let mut archive = Archive::new(GzDecoder::new(reader));
    let wanted = normalize_entry_path(fragment_path);

    let entries = archive
        .entries()
        .map_err(|e| archive_err("Failed to read archive entries", e))?;

    for entry in entries {
        let mut entry = entry.map_err(|e| archive_err("Failed to read archive entry", e))?;
        let entry_path = entry
            .path()
            .map_err(|e| archive_err("Failed to get entry path", e))?
            .to_string_lossy()
            .to_string();

        if normalize_entry_path(&entry_path) != wanted {
            continue;
        }

        let mut content = String::new();
        entry
            .read_to_string(&mut content)
            .map_err(|e| archive_err(&format!("Failed to read {entry_path}"), e))?;
        return serde_json::from_str(&content)
            .map_err(|e| archive_err(&format!("Invalid {entry_path}"), e));
    }

    Err(Error::Archive(format!("Archive has no {fragment_path}")))
}

/// Extract a gzipped tarball into `dest`
pub fn unpack_archive(archive_path: &Path, dest: &Path) -> Result<()> {
    let file = File::open(archive_path)?;
    let mut archive = Archive::new(GzDecoder::new(file));
    fs::create_dir_all(dest)?;
    archive
        .unpack(dest)
        .map_err(|e| archive_err(&format!("Failed to extract {}", archive_path.display()), e))?;
    debug!("Extracted {} into {}", archive_path.display(), dest.display());
    Ok(())
}

fn modified_secs(metadata: &fs::Metadata) -> u64 {
    metadata
        .modified()
        .ok()
        .and_then(|t| t.duration_since(UNIX_EPOCH).ok())
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

/// Longest entry name that fits the ustar `name` field
const USTAR_NAME_LEN: usize = 100;

/// Set the header path, writing a pax `path` record first when the path does
/// not fit the ustar name and prefix fields
fn set_entry_path<W: Write>(
    builder: &mut Builder<W>,
    header: &mut Header,
    path: &str,
) -> Result<()> {
    if header.set_path(path).is_ok() {
        return Ok(());
    }
    debug!("Writing pax path record for {}", path);
    builder.append_pax_extensions([("path", path.as_bytes())])?;
    header.set_path(ustar_placeholder(path))?;
    Ok(())
}

/// Tail of `path` short enough for the ustar `name` field
fn ustar_placeholder(path: &str) -> &str {
    let mut start = path.len().saturating_sub(USTAR_NAME_LEN);
    while !path.is_char_boundary(start) {
        start += 1;
    }
    path[start..].trim_start_matches('/')
}

/// Build a gzipped ustar archive of `source_dir`, rooted at `root_name/`
///
/// Entries are written in file-name order. Symlinks are skipped. Paths too
/// long for ustar carry a pax `path` record. On failure the partially written
/// `output` is removed.
pub fn build_package_archive(source_dir: &Path, root_name: &str, output: &Path) -> Result<()> {
    let result = write_package_archive(source_dir, root_name, output);
    if result.is_err() {
        let _ = fs::remove_file(output);
    }
    result
}

fn write_package_archive(source_dir: &Path, root_name: &str, output: &Path) -> Result<()> {
    let file = File::create(output)?;
    let encoder = GzEncoder::new(file, Compression::default());
    let mut builder = Builder::new(encoder);

    for entry in WalkDir::new(source_dir).sort_by_file_name() {
        let entry = entry.map_err(|e| archive_err("Failed to walk package directory", e))?;
        let relative = entry
            .path()
            .strip_prefix(source_dir)
            .map_err(|e| archive_err("Entry outside package directory", e))?;

        let mut archive_path = root_name.to_string();
        for component in relative.components() {
            archive_path.push('/');
            archive_path.push_str(&component.as_os_str().to_string_lossy());
        }

        let file_type = entry.file_type();
        let metadata = entry
            .metadata()
            .map_err(|e| archive_err("Failed to stat package entry", e))?;

        let mut header = Header::new_ustar();
        header.set_mtime(modified_secs(&metadata));

        if file_type.is_dir() {
            header.set_entry_type(EntryType::Directory);
            header.set_mode(DIR_MODE);
            header.set_size(0);
            set_entry_path(&mut builder, &mut header, &format!("{archive_path}/"))?;
            header.set_cksum();
            builder.append(&header, io::empty())?;
        } else if file_type.is_file() {
            header.set_entry_type(EntryType::Regular);
            header.set_mode(FILE_MODE);
            header.set_size(metadata.len());
            set_entry_path(&mut builder, &mut header, &archive_path)?;
            header.set_cksum();
            let content = File::open(entry.path())?;
            builder.append(&header, content)?;
        } else {
            debug!("Skipping non-regular entry {}", entry.path().display());
        }
    }

    let encoder = builder.into_inner()?;
    encoder.finish()?;
    Ok(())
}
