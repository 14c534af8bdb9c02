use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use zip::CompressionMethod;
use zip::ZipWriter;
use zip::write::SimpleFileOptions;

/// A JATS article whose DOI, journal and issue are filled in and which
/// references one figure, `<prefix>-gf01`.
pub fn jats_article(prefix: &str, doi: &str) -> String {
    format!(
        r#"<?xml version="1.0" encoding="utf-8"?>
<!DOCTYPE article PUBLIC "-//NLM//DTD JATS (Z39.96) Journal Publishing DTD v1.0 20120330//EN" "JATS-journalpublishing1.dtd">
<article xmlns:xlink="http://www.w3.org/1999/xlink" article-type="research-article">
  <front>
    <journal-meta>
      <journal-title-group><journal-title>Revista de Saude Publica</journal-title></journal-title-group>
    </journal-meta>
    <article-meta>
      <article-id pub-id-type="doi">{doi}</article-id>
      <title-group><article-title>Article {prefix}</article-title></title-group>
      <pub-date pub-type="epub"><year>2014</year></pub-date>
      <volume>48</volume>
      <issue>2</issue>
    </article-meta>
  </front>
  <body>
    <fig id="f1"><graphic xlink:href="{prefix}-gf01"/></fig>
  </body>
</article>
"#
    )
}

/// Write one article (XML plus its figure) into `dir` and return both paths.
pub fn write_article(dir: &Path, prefix: &str, doi: &str) -> (PathBuf, PathBuf) {
    fs::create_dir_all(dir).unwrap();
    let xml = dir.join(format!("{prefix}.xml"));
    let figure = dir.join(format!("{prefix}-gf01.jpg"));
    fs::write(&xml, jats_article(prefix, doi)).unwrap();
    fs::write(&figure, [0xFF, 0xD8, 0xFF, 0xE0]).unwrap();
    (xml, figure)
}

/// Build a stored (uncompressed) zip from `(name, content)` members.
pub fn write_zip(path: &Path, members: &[(String, Vec<u8>)]) {
    let mut writer = ZipWriter::new(File::create(path).unwrap());
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Stored);
    for (name, content) in members {
        writer.start_file(name.as_str(), options).unwrap();
        writer.write_all(content).unwrap();
    }
    writer.finish().unwrap();
}

/// Zip every regular file of `dir` under `folder/` inside the archive.
pub fn zip_directory(dir: &Path, archive: &Path, folder: &str) {
    let mut members = Vec::new();
    let mut paths: Vec<PathBuf> = fs::read_dir(dir)
        .unwrap()
        .map(|entry| entry.unwrap().path())
        .filter(|path| path.is_file())
        .collect();
    paths.sort();
    for path in paths {
        let name = path.file_name().unwrap().to_string_lossy().into_owned();
        members.push((format!("{folder}/{name}"), fs::read(&path).unwrap()));
    }
    write_zip(archive, &members);
}

/// Sorted file names directly inside `dir`.
pub fn file_names(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = fs::read_dir(dir)
        .unwrap()
        .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}
