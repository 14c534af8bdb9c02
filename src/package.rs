//! Package assembly.
//!
//! Turns a flat list of files back into per-article groups. An article is
//! keyed by its *prefix*: the stem of its XML document, which every asset of
//! that article shares up to the last hyphen of the asset's stem
//! (`0034-8910-rsp-48-2-0206.xml` and `0034-8910-rsp-48-2-0206-gf01.tif`).
//!
//! Assembly is two-phase. [`PackageBuilder`] accumulates files in input
//! order; [`PackageBuilder::build`] evicts every group lacking an XML
//! document and returns an immutable [`Package`].

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::{debug, warn};

/// Extension that marks an article's XML document. Compared case-sensitively.
pub const XML_EXTENSION: &str = "xml";

/// One reconstructed article: its XML document and the assets sharing its prefix.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ArticleEntry {
    pub prefix: String,
    pub xml_path: PathBuf,
    /// Assets in the order they appeared in the input.
    pub asset_paths: Vec<PathBuf>,
}

/// Assembled package: valid entries keyed by prefix plus unassignable files.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Package {
    entries: BTreeMap<String, ArticleEntry>,
    invalid_files: Vec<PathBuf>,
}

impl Package {
    /// Group `files` into a package.
    pub fn assemble<I, P>(files: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        let mut builder = PackageBuilder::new();
        for file in files {
            builder.push(file);
        }
        builder.build()
    }

    /// Entries in ascending prefix order.
    pub fn entries(&self) -> impl Iterator<Item = &ArticleEntry> {
        self.entries.values()
    }

    /// Prefixes in ascending lexicographic order.
    pub fn prefixes(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn get(&self, prefix: &str) -> Option<&ArticleEntry> {
        self.entries.get(prefix)
    }

    pub fn invalid_files(&self) -> &[PathBuf] {
        &self.invalid_files
    }

    /// Number of valid articles.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty() && self.invalid_files.is_empty()
    }

    /// Total number of files accounted for, valid or not.
    pub fn file_count(&self) -> usize {
        self.entries
            .values()
            .map(|entry| 1 + entry.asset_paths.len())
            .sum::<usize>()
            + self.invalid_files.len()
    }
}

#[derive(Debug, Default)]
struct EntryBuilder {
    xml_path: Option<PathBuf>,
    asset_paths: Vec<PathBuf>,
}

/// Mutable accumulator for [`Package`].
#[derive(Debug, Default)]
pub struct PackageBuilder {
    entries: BTreeMap<String, EntryBuilder>,
    invalid_files: Vec<PathBuf>,
}

impl PackageBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Assign one file to its group, or to the invalid set when no prefix
    /// can be derived.
    pub fn push(&mut self, file: impl Into<PathBuf>) {
        let file = file.into();
        let Some((prefix, is_xml)) = derive_prefix(&file) else {
            debug!(file = %file.display(), "no article prefix");
            self.invalid_files.push(file);
            return;
        };

        let entry = self.entries.entry(prefix).or_default();
        if is_xml {
            if let Some(displaced) = entry.xml_path.replace(file) {
                warn!(
                    file = %displaced.display(),
                    "another XML document shares this prefix; keeping the later one"
                );
                self.invalid_files.push(displaced);
            }
        } else {
            entry.asset_paths.push(file);
        }
    }

    /// Evict groups without an XML document and freeze the result.
    pub fn build(self) -> Package {
        let mut invalid_files = self.invalid_files;
        let mut entries = BTreeMap::new();

        for (prefix, entry) in self.entries {
            match entry.xml_path {
                Some(xml_path) => {
                    entries.insert(
                        prefix.clone(),
                        ArticleEntry {
                            prefix,
                            xml_path,
                            asset_paths: entry.asset_paths,
                        },
                    );
                }
                None => {
                    warn!(
                        prefix = %prefix,
                        assets = entry.asset_paths.len(),
                        "no XML document for prefix; assets are unassignable"
                    );
                    invalid_files.extend(entry.asset_paths);
                }
            }
        }

        Package {
            entries,
            invalid_files,
        }
    }
}

/// Split a file name into stem and extension (without the dot).
pub fn file_stem_and_extension(path: &Path) -> (String, Option<String>) {
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let extension = path
        .extension()
        .map(|e| e.to_string_lossy().into_owned());
    (stem, extension)
}

/// Article prefix for `path`, and whether it is the article's XML document.
///
/// XML documents are keyed by their stem; other files by the part of the
/// stem before its last hyphen. Returns `None` when neither rule applies.
pub fn derive_prefix(path: &Path) -> Option<(String, bool)> {
    let (stem, extension) = file_stem_and_extension(path);
    if extension.as_deref() == Some(XML_EXTENSION) {
        return Some((stem, true));
    }
    stem.rfind('-').map(|idx| (stem[..idx].to_string(), false))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn paths(names: &[&str]) -> Vec<PathBuf> {
        names.iter().map(PathBuf::from).collect()
    }

    #[test]
    fn test_xml_with_asset_and_unassignable_file() {
        let package = Package::assemble(["10.1-g01.tif", "10.1.xml", "weird"]);

        assert_eq!(package.len(), 1);
        let entry = package.get("10.1").unwrap();
        assert_eq!(entry.xml_path, PathBuf::from("10.1.xml"));
        assert_eq!(entry.asset_paths, paths(&["10.1-g01.tif"]));
        assert_eq!(package.invalid_files(), paths(&["weird"]).as_slice());
    }

    #[test]
    fn test_assets_without_xml_are_evicted() {
        let package = Package::assemble(["a-1.tif", "a-2.tif"]);

        assert_eq!(package.len(), 0);
        assert!(package.get("a").is_none());
        assert_eq!(
            package.invalid_files(),
            paths(&["a-1.tif", "a-2.tif"]).as_slice()
        );
    }

    #[test]
    fn test_empty_input() {
        let package = Package::assemble(Vec::<PathBuf>::new());
        assert!(package.is_empty());
        assert_eq!(package.file_count(), 0);
    }

    #[test]
    fn test_prefix_uses_last_hyphen() {
        assert_eq!(
            derive_prefix(Path::new("fig-01-02.tif")),
            Some(("fig-01".to_string(), false))
        );
        assert_eq!(
            derive_prefix(Path::new("/pkg/art-01.xml")),
            Some(("art-01".to_string(), true))
        );
        assert_eq!(derive_prefix(Path::new("readme.txt")), None);
        assert_eq!(derive_prefix(Path::new("noext")), None);
    }

    #[test]
    fn test_xml_extension_is_case_sensitive() {
        assert_eq!(derive_prefix(Path::new("ART.XML")), None);
        assert_eq!(
            derive_prefix(Path::new("a-b.XML")),
            Some(("a".to_string(), false))
        );
    }

    #[test]
    fn test_multi_hyphen_assets_group_with_matching_xml() {
        let package = Package::assemble([
            "0034-8910-rsp-48-2-0206-gf01.tif",
            "0034-8910-rsp-48-2-0206.xml",
            "0034-8910-rsp-48-2-0206-gf02.jpg",
        ]);

        let entry = package.get("0034-8910-rsp-48-2-0206").unwrap();
        assert_eq!(
            entry.asset_paths,
            paths(&[
                "0034-8910-rsp-48-2-0206-gf01.tif",
                "0034-8910-rsp-48-2-0206-gf02.jpg"
            ])
        );
        assert!(package.invalid_files().is_empty());
    }

    #[test]
    fn test_duplicate_xml_keeps_last_and_records_displaced() {
        let package = Package::assemble(["first/a.xml", "second/a.xml", "a-1.png"]);

        let entry = package.get("a").unwrap();
        assert_eq!(entry.xml_path, PathBuf::from("second/a.xml"));
        assert_eq!(package.invalid_files(), paths(&["first/a.xml"]).as_slice());
        assert_eq!(package.file_count(), 3);
    }

    #[test]
    fn test_prefixes_are_sorted() {
        let package = Package::assemble(["c.xml", "a.xml", "b.xml", "B.xml"]);
        let prefixes: Vec<&str> = package.prefixes().collect();
        assert_eq!(prefixes, vec!["B", "a", "b", "c"]);
    }

    #[test]
    fn test_every_file_lands_exactly_once() {
        let input = paths(&[
            "x.xml",
            "x-1.tif",
            "y-1.tif",
            "z",
            "x-2.jpg",
            "w.xml",
            "w-a-b.png",
            "loose.txt",
            "y-2.tif",
        ]);
        let package = Package::assemble(input.clone());

        let mut seen: Vec<PathBuf> = package
            .entries()
            .flat_map(|entry| {
                std::iter::once(entry.xml_path.clone()).chain(entry.asset_paths.iter().cloned())
            })
            .chain(package.invalid_files().iter().cloned())
            .collect();
        seen.sort();
        let mut expected = input;
        expected.sort();

        assert_eq!(seen, expected);
        assert_eq!(package.file_count(), 9);
    }

    #[test]
    fn test_grouping_is_independent_of_order() {
        let forward = Package::assemble(["a.xml", "a-1.tif", "b-1.tif", "b.xml"]);
        let backward = Package::assemble(["b.xml", "b-1.tif", "a-1.tif", "a.xml"]);

        assert_eq!(forward, backward);
    }
}
