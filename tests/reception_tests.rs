mod common;

use std::fs;

use tempfile::TempDir;
use xml_pkg_qa::{
    InputSource, Outputs, PackageQa, PackageReception, QaSettings, Validators,
};

use common::mocks::{RecordingNormalizer, RecordingStructureValidator};
use common::test_helpers::write_article;

#[test]
fn test_directory_reception_normalizes_copied_xml_once() {
    let source = TempDir::new().unwrap();
    let destination = TempDir::new().unwrap();
    write_article(source.path(), "a", "10.1590/a");
    let normalizer = RecordingNormalizer::default();

    let package = PackageReception::new(normalizer.clone())
        .receive(
            InputSource::Directory(source.path().to_path_buf()),
            destination.path(),
        )
        .unwrap();

    assert_eq!(package.len(), 1);
    let entry = package.get("a").unwrap();
    assert_eq!(entry.asset_paths, vec![destination.path().join("a-gf01.jpg")]);
    assert_eq!(
        normalizer.calls(),
        vec![(destination.path().join("a.xml"), true)]
    );
}

#[test]
fn test_normalizer_runs_in_prefix_order() {
    let source = TempDir::new().unwrap();
    let destination = TempDir::new().unwrap();
    let (c, _) = write_article(source.path(), "c", "10.1590/c");
    let (a, _) = write_article(source.path(), "a", "10.1590/a");
    let (b, _) = write_article(source.path(), "b", "10.1590/b");
    let normalizer = RecordingNormalizer::default();

    PackageReception::new(normalizer.clone())
        .receive(InputSource::FileList(vec![c, a, b]), destination.path())
        .unwrap();

    let called: Vec<String> = normalizer
        .calls()
        .iter()
        .map(|(path, _)| path.file_name().unwrap().to_string_lossy().into_owned())
        .collect();
    assert_eq!(called, vec!["a.xml", "b.xml", "c.xml"]);
}

#[test]
fn test_custom_structure_validator_sees_articles_in_order() {
    let source = TempDir::new().unwrap();
    let destination = TempDir::new().unwrap();
    write_article(source.path(), "b", "10.1590/b");
    write_article(source.path(), "a", "10.1590/a");
    let outputs = Outputs::ensure(destination.path()).unwrap();
    let package = PackageReception::default()
        .receive(
            InputSource::Directory(source.path().to_path_buf()),
            outputs.root(),
        )
        .unwrap();
    let structure = RecordingStructureValidator::default();

    let qa = PackageQa::new(
        Validators::default().with_structure(structure.clone()),
        QaSettings::default(),
    );
    qa.validate_package(&package, &outputs).unwrap();

    assert_eq!(
        structure.seen(),
        vec![outputs.root().join("a.xml"), outputs.root().join("b.xml")]
    );
    assert_eq!(
        fs::read_to_string(outputs.reports_path().join("a.dtd.txt")).unwrap(),
        "recorded\n"
    );
}
