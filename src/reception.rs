//! Package reception.
//!
//! Brings the files of a delivery (an archive, a directory or an explicit
//! list) into the destination directory, assembles them into a
//! [`Package`] and normalizes each article's XML document.

use std::collections::HashSet;
use std::fmt;
use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};

use tempfile::TempDir;
use tracing::{debug, info, warn};
use zip::ZipArchive;

use crate::error::{PackageError, Result};
use crate::package::Package;
use crate::validators::{LineEndingNormalizer, XmlNormalizer};

/// Shape of the input handed to reception.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputSource {
    Archive(PathBuf),
    Directory(PathBuf),
    FileList(Vec<PathBuf>),
}

impl InputSource {
    /// Classify a single input path.
    pub fn classify(path: &Path, archive_extensions: &[String]) -> Result<Self> {
        if path.is_dir() {
            return Ok(InputSource::Directory(path.to_path_buf()));
        }
        if path.is_file() && has_archive_extension(path, archive_extensions) {
            return Ok(InputSource::Archive(path.to_path_buf()));
        }

        let reason = if path.exists() {
            format!(
                "not a directory or an archive ({})",
                archive_extensions.join(", ")
            )
        } else {
            "path does not exist".to_string()
        };
        Err(PackageError::UnsupportedInput {
            path: path.to_path_buf(),
            reason,
        })
    }

    /// Input from command-line paths: one path is classified, several are
    /// taken as an explicit file list. A lone regular file that is not an
    /// archive is a file list of one.
    pub fn from_args(paths: &[PathBuf], archive_extensions: &[String]) -> Result<Self> {
        match paths {
            [] => Err(PackageError::UnsupportedInput {
                path: PathBuf::new(),
                reason: "no input paths given".to_string(),
            }),
            [single]
                if single.is_file() && !has_archive_extension(single, archive_extensions) =>
            {
                Ok(InputSource::FileList(vec![single.clone()]))
            }
            [single] => Self::classify(single, archive_extensions),
            many => Ok(InputSource::FileList(many.to_vec())),
        }
    }
}

/// Extension check, ignoring ASCII case.
fn has_archive_extension(path: &Path, archive_extensions: &[String]) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| {
            archive_extensions
                .iter()
                .any(|allowed| allowed.eq_ignore_ascii_case(ext))
        })
}

/// Receives a delivery into a destination directory.
pub struct PackageReception {
    normalizer: Box<dyn XmlNormalizer>,
}

impl Default for PackageReception {
    fn default() -> Self {
        Self::new(LineEndingNormalizer)
    }
}

impl fmt::Debug for PackageReception {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PackageReception").finish_non_exhaustive()
    }
}

impl PackageReception {
    pub fn new(normalizer: impl XmlNormalizer + 'static) -> Self {
        Self {
            normalizer: Box::new(normalizer),
        }
    }

    /// Copy `source` into `destination_dir`, assemble it and normalize the
    /// XML document of every valid article.
    pub fn receive(&self, source: InputSource, destination_dir: &Path) -> Result<Package> {
        match source {
            InputSource::Archive(archive_path) => {
                self.receive_archive(&archive_path, destination_dir)
            }
            InputSource::Directory(dir) => {
                let files = list_directory(&dir)?;
                info!(dir = %dir.display(), files = files.len(), "receiving directory");
                self.receive_files(&files, destination_dir)
            }
            InputSource::FileList(files) => {
                info!(files = files.len(), "receiving file list");
                self.receive_files(&files, destination_dir)
            }
        }
    }

    /// Extract every file member into a staging directory, then receive the
    /// extracted files. The staging directory is removed on return.
    pub fn receive_archive(&self, archive_path: &Path, destination_dir: &Path) -> Result<Package> {
        let staging = TempDir::new()?;
        let files = extract_archive(archive_path, staging.path())?;
        info!(
            archive = %archive_path.display(),
            files = files.len(),
            "receiving archive"
        );
        self.receive_files(&files, destination_dir)
    }

    pub fn receive_files(&self, files: &[PathBuf], destination_dir: &Path) -> Result<Package> {
        fs::create_dir_all(destination_dir).map_err(|e| PackageError::Copy {
            source_path: files.first().cloned().unwrap_or_default(),
            destination: destination_dir.to_path_buf(),
            source: e,
        })?;

        let mut seen = HashSet::new();
        let mut copied = Vec::with_capacity(files.len());
        for file in files {
            let target = copy_into(file, destination_dir)?;
            if seen.insert(target.clone()) {
                copied.push(target);
            } else {
                warn!(
                    file = %file.display(),
                    "duplicate file name; the later file replaces the earlier copy"
                );
            }
        }

        let package = Package::assemble(copied);
        for entry in package.entries() {
            debug!(file = %entry.xml_path.display(), "normalizing");
            self.normalizer.normalize(&entry.xml_path)?;
        }
        Ok(package)
    }
}

/// Regular files directly inside `dir`, sorted by name. Symlinks are
/// followed, so a link to a regular file is listed like the file itself.
pub fn list_directory(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_file() {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

fn extract_archive(archive_path: &Path, staging: &Path) -> Result<Vec<PathBuf>> {
    let file = File::open(archive_path).map_err(|e| PackageError::archive(archive_path, e))?;
    let mut archive = ZipArchive::new(file).map_err(|e| PackageError::archive(archive_path, e))?;

    let mut extracted = Vec::with_capacity(archive.len());
    for index in 0..archive.len() {
        let mut member = archive
            .by_index(index)
            .map_err(|e| PackageError::archive(archive_path, e))?;
        if member.is_dir() {
            continue;
        }
        let Some(relative) = member.enclosed_name() else {
            return Err(PackageError::archive(
                archive_path,
                format!("member escapes the archive root: {}", member.name()),
            ));
        };

        let target = staging.join(relative);
        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent).map_err(|e| PackageError::archive(archive_path, e))?;
        }
        let mut out = File::create(&target).map_err(|e| PackageError::archive(archive_path, e))?;
        io::copy(&mut member, &mut out).map_err(|e| PackageError::archive(archive_path, e))?;
        extracted.push(target);
    }
    Ok(extracted)
}

/// Copy `source` into `destination_dir` under its file name.
fn copy_into(source: &Path, destination_dir: &Path) -> Result<PathBuf> {
    let Some(name) = source.file_name() else {
        return Err(PackageError::UnsupportedInput {
            path: source.to_path_buf(),
            reason: "path has no file name".to_string(),
        });
    };
    let target = destination_dir.join(name);

    if is_same_file(source, &target) {
        debug!(file = %source.display(), "already in destination");
        return Ok(target);
    }
    fs::copy(source, &target).map_err(|e| PackageError::Copy {
        source_path: source.to_path_buf(),
        destination: target.clone(),
        source: e,
    })?;
    Ok(target)
}

fn is_same_file(a: &Path, b: &Path) -> bool {
    match (fs::canonicalize(a), fs::canonicalize(b)) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}
