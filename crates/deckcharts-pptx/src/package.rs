use std::collections::BTreeMap;
use std::io::{Cursor, Write};

use thiserror::Error;

use crate::zip_util::{read_part_with_budget, InflateBudget};

#[derive(Debug, Error)]
pub enum PptxError {
    #[error("zip error: {0}")]
    Zip(#[from] zip::result::ZipError),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("xml error: {0}")]
    Xml(#[from] quick_xml::Error),
    #[error("xml error: {0}")]
    RoXml(#[from] roxmltree::Error),
    #[error("utf-8 error: {0}")]
    Utf8(#[from] std::str::Utf8Error),
    #[error("xml attribute error: {0}")]
    Attr(#[from] quick_xml::events::attributes::AttrError),
    #[error("missing pptx part: {0}")]
    MissingPart(String),
    #[error("invalid pptx: {0}")]
    Invalid(String),
    #[error("invalid chart data: {0}")]
    ChartData(#[from] crate::chart::ChartDataError),
    #[error("pptx package part is too large to load safely: {part} is {size} bytes (max {max} bytes)")]
    PartTooLarge { part: String, size: u64, max: u64 },
    #[error("pptx package is too large to load safely: {total} bytes uncompressed (max {max})")]
    PackageTooLarge { total: u64, max: u64 },
}

/// Inflation limits applied by [`PptxPackage::from_bytes_limited`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PptxPackageLimits {
    pub max_part_bytes: u64,
    pub max_total_bytes: u64,
}

impl Default for PptxPackageLimits {
    fn default() -> Self {
        Self {
            max_part_bytes: crate::zip_util::DEFAULT_MAX_PART_BYTES,
            max_total_bytes: crate::zip_util::DEFAULT_MAX_TOTAL_BYTES,
        }
    }
}

/// An in-memory presentation package: every zip entry keyed by its part name.
///
/// Parts are kept as raw bytes so anything this crate does not understand round-trips untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PptxPackage {
    parts: BTreeMap<String, Vec<u8>>,
}

impl PptxPackage {
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, PptxError> {
        Self::from_bytes_limited(bytes, PptxPackageLimits::default())
    }

    pub fn from_bytes_limited(bytes: &[u8], limits: PptxPackageLimits) -> Result<Self, PptxError> {
        let mut zip = zip::ZipArchive::new(Cursor::new(bytes))?;

        let mut parts = BTreeMap::new();
        let mut budget = InflateBudget::new(limits.max_total_bytes);
        for i in 0..zip.len() {
            let file = zip.by_index(i)?;
            if !file.is_file() {
                continue;
            }
            let name = file.name().trim_start_matches('/').to_string();
            let size = file.size();
            let buf = read_part_with_budget(file, &name, size, limits.max_part_bytes, &mut budget)?;
            parts.insert(name, buf);
        }

        log::debug!("loaded pptx package with {} parts", parts.len());
        Ok(Self { parts })
    }

    pub fn from_parts(parts: BTreeMap<String, Vec<u8>>) -> Self {
        Self { parts }
    }

    pub fn part(&self, name: &str) -> Option<&[u8]> {
        let name = name.strip_prefix('/').unwrap_or(name);
        self.parts.get(name).map(Vec::as_slice)
    }

    pub fn has_part(&self, name: &str) -> bool {
        self.part(name).is_some()
    }

    pub(crate) fn require_part(&self, name: &str) -> Result<&[u8], PptxError> {
        self.part(name)
            .ok_or_else(|| PptxError::MissingPart(name.to_string()))
    }

    pub(crate) fn part_str(&self, name: &str) -> Result<&str, PptxError> {
        Ok(std::str::from_utf8(self.require_part(name)?)?)
    }

    pub fn set_part(&mut self, name: impl Into<String>, bytes: Vec<u8>) {
        let name = name.into();
        let name = match name.strip_prefix('/') {
            Some(stripped) => stripped.to_string(),
            None => name,
        };
        self.parts.insert(name, bytes);
    }

    pub fn remove_part(&mut self, name: &str) -> Option<Vec<u8>> {
        self.parts.remove(name.strip_prefix('/').unwrap_or(name))
    }

    pub fn part_names(&self) -> impl Iterator<Item = &str> {
        self.parts.keys().map(String::as_str)
    }

    pub fn parts(&self) -> &BTreeMap<String, Vec<u8>> {
        &self.parts
    }

    pub fn write_to<W: Write>(&self, mut w: W) -> Result<(), PptxError> {
        let cursor = Cursor::new(Vec::new());
        let mut zip = zip::ZipWriter::new(cursor);
        let options = zip::write::FileOptions::<()>::default()
            .compression_method(zip::CompressionMethod::Deflated);

        // `[Content_Types].xml` goes first; some consumers sniff it from the head of the archive.
        let content_types = self.parts.get_key_value(crate::content_types::CONTENT_TYPES_PART);
        for (name, bytes) in content_types.into_iter().chain(
            self.parts
                .iter()
                .filter(|(name, _)| name.as_str() != crate::content_types::CONTENT_TYPES_PART),
        ) {
            zip.start_file(name.as_str(), options)?;
            zip.write_all(bytes)?;
        }

        let cursor = zip.finish()?;
        w.write_all(&cursor.into_inner())?;
        Ok(())
    }

    pub fn write_to_bytes(&self) -> Result<Vec<u8>, PptxError> {
        let mut out = Vec::new();
        self.write_to(&mut out)?;
        Ok(out)
    }
}
