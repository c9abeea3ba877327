//! Document adapters: one concrete format on each side of the generic
//! tree.
//!
//! A [`Document`] couples the parsed tree with the per-leaf metadata the
//! source format carried (translator comments, fuzzy flags) and, for
//! catalogs, the parsed entry list itself so saves can join by source id.
//! Saves are atomic: the target file either fully updates or stays as it
//! was.

mod errors;
mod json;
mod po;
mod xml;
mod yaml;

pub use errors::FormatError;
pub use po::{PoEntry, PoFile};

use crate::codec::{self, Record};
use crate::fsio::atomic_write;
use crate::node::Node;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Po,
    Json,
    Yaml,
    Xml,
}

impl Format {
    /// Detect a format from a file extension.
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        Self::from_name(&ext)
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "po" | "pot" => Some(Format::Po),
            "json" => Some(Format::Json),
            "yaml" | "yml" => Some(Format::Yaml),
            "xml" => Some(Format::Xml),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Format::Po => "po",
            Format::Json => "json",
            Format::Yaml => "yaml",
            Format::Xml => "xml",
        }
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Comment and flags a format carries for one leaf.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LeafMeta {
    pub comment: Option<String>,
    pub flags: BTreeSet<String>,
}

/// A loaded document: generic tree plus format-carried leaf metadata.
#[derive(Debug, Clone)]
pub struct Document {
    format: Format,
    node: Node,
    meta: BTreeMap<String, LeafMeta>,
    /// Parsed catalog, retained so saves join records by source id.
    catalog: Option<PoFile>,
}

impl Document {
    pub fn parse(format: Format, text: &str) -> Result<Self, FormatError> {
        match format {
            Format::Po => {
                let catalog = PoFile::parse(text)?;
                let (node, meta) = po::document_parts(&catalog);
                Ok(Self {
                    format,
                    node,
                    meta,
                    catalog: Some(catalog),
                })
            }
            Format::Json => Ok(Self::bare(format, json::parse(text)?)),
            Format::Yaml => Ok(Self::bare(format, yaml::parse(text)?)),
            Format::Xml => Ok(Self::bare(format, xml::parse(text)?)),
        }
    }

    fn bare(format: Format, node: Node) -> Self {
        Self {
            format,
            node,
            meta: BTreeMap::new(),
            catalog: None,
        }
    }

    /// Load a document, detecting the format from the file extension.
    pub fn load(path: &Path) -> Result<Self, FormatError> {
        let format = Format::from_path(path).ok_or_else(|| FormatError::UnknownFormat {
            path: path.to_path_buf(),
        })?;
        Self::load_as(format, path)
    }

    pub fn load_as(format: Format, path: &Path) -> Result<Self, FormatError> {
        let text = fs::read_to_string(path)?;
        Self::parse(format, &text)
    }

    pub fn format(&self) -> Format {
        self.format
    }

    pub fn node(&self) -> &Node {
        &self.node
    }

    /// Flatten to records, merging in the per-leaf metadata.
    pub fn records(&self) -> Vec<Record> {
        let mut records = codec::flatten(&self.node);
        for record in &mut records {
            if let Some(meta) = self.meta.get(&record.path.to_string()) {
                record.comment = meta.comment.clone();
                record.flags = meta.flags.clone();
            }
        }
        records
    }

    /// Replace the document contents from an edited record list.
    ///
    /// Catalogs join by source id; the tree formats rebuild the tree from
    /// the paths.
    pub fn apply_records(&mut self, records: &[Record]) -> Result<(), FormatError> {
        match &mut self.catalog {
            Some(catalog) => {
                po::apply_records(catalog, records)?;
                let (node, meta) = po::document_parts(catalog);
                self.node = node;
                self.meta = meta;
            }
            None => {
                self.node = codec::unflatten(records)?;
            }
        }
        Ok(())
    }

    pub fn render(&self) -> Result<String, FormatError> {
        match (self.format, &self.catalog) {
            (Format::Po, Some(catalog)) => Ok(catalog.render()),
            (Format::Po, None) => Err(FormatError::malformed("po", "catalog state missing")),
            (Format::Json, _) => json::render(&self.node),
            (Format::Yaml, _) => yaml::render(&self.node),
            (Format::Xml, _) => xml::render(&self.node),
        }
    }

    /// Render and write atomically.
    pub fn save(&self, path: &Path) -> Result<(), FormatError> {
        let text = self.render()?;
        atomic_write(path, text.as_bytes())?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn format_detection_by_extension() {
        assert_eq!(Format::from_path(Path::new("x/messages.po")), Some(Format::Po));
        assert_eq!(Format::from_path(Path::new("a.JSON")), Some(Format::Json));
        assert_eq!(Format::from_path(Path::new("a.yml")), Some(Format::Yaml));
        assert_eq!(Format::from_path(Path::new("a.xml")), Some(Format::Xml));
        assert_eq!(Format::from_path(Path::new("a.txt")), None);
        assert_eq!(Format::from_path(Path::new("no_extension")), None);
    }

    #[test]
    fn po_records_carry_comments_and_flags() {
        let text = "# note\n#, fuzzy\nmsgid \"Open\"\nmsgstr \"باز\"\n";
        let document = Document::parse(Format::Po, text).unwrap();
        let records = document.records();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].comment.as_deref(), Some("note"));
        assert!(records[0].flags.contains("fuzzy"));
    }

    #[test]
    fn json_document_roundtrip_through_records() {
        let document = Document::parse(Format::Json, "{\"a\": {\"b\": 1}}").unwrap();
        let mut records = document.records();
        records[0].value = "2".to_string();
        let mut edited = document.clone();
        edited.apply_records(&records).unwrap();
        let text = edited.render().unwrap();
        assert!(text.contains("\"b\": \"2\""));
    }

    #[test]
    fn unknown_extension_is_an_error() {
        let err = Document::load(&PathBuf::from("notes.txt")).unwrap_err();
        assert!(matches!(err, FormatError::UnknownFormat { .. }));
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let err = Document::load(Path::new("no/such/file.json")).unwrap_err();
        assert!(matches!(err, FormatError::Io(_)));
    }
}
