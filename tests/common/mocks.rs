use std::cell::RefCell;
use std::fs;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use xml_pkg_qa::Result;
use xml_pkg_qa::validators::{StructureValidator, XmlNormalizer};

/// Normalizer that records the paths it was called with, and whether the
/// file existed at that moment.
#[derive(Clone, Default)]
pub struct RecordingNormalizer {
    calls: Rc<RefCell<Vec<(PathBuf, bool)>>>,
}

impl RecordingNormalizer {
    pub fn calls(&self) -> Vec<(PathBuf, bool)> {
        self.calls.borrow().clone()
    }
}

impl XmlNormalizer for RecordingNormalizer {
    fn normalize(&self, xml_path: &Path) -> Result<()> {
        self.calls
            .borrow_mut()
            .push((xml_path.to_path_buf(), xml_path.is_file()));
        Ok(())
    }
}

/// Structure check that records the documents it saw and writes a marker
/// report.
#[derive(Clone, Default)]
pub struct RecordingStructureValidator {
    seen: Rc<RefCell<Vec<PathBuf>>>,
}

impl RecordingStructureValidator {
    pub fn seen(&self) -> Vec<PathBuf> {
        self.seen.borrow().clone()
    }
}

impl StructureValidator for RecordingStructureValidator {
    fn validate(&self, xml_path: &Path, report_path: &Path) -> Result<()> {
        self.seen.borrow_mut().push(xml_path.to_path_buf());
        fs::write(report_path, "recorded\n")?;
        Ok(())
    }
}
