//! Reading and writing catalog JSON files

use std::fs;
use std::io::Write;
use std::path::Path;

use serde::Serialize;
use serde_json::ser::{PrettyFormatter, Serializer};

use crate::releases::error::CatalogFileError;
use crate::releases::types::Release;

/// Indentation of written catalogs
const INDENT: &[u8] = b" ";

/// Read a JSON catalog file
pub fn load_catalog(path: &Path) -> Result<Vec<Release>, CatalogFileError> {
    let content = fs::read_to_string(path).map_err(|source| CatalogFileError::Read {
        path: path.display().to_string(),
        source,
    })?;
    serde_json::from_str(&content).map_err(|source| CatalogFileError::Parse {
        path: path.display().to_string(),
        source,
    })
}

/// Write a catalog as indented JSON followed by a newline.
pub fn write_catalog<W: Write>(mut writer: W, releases: &[Release]) -> std::io::Result<()> {
    let mut serializer = Serializer::with_formatter(&mut writer, PrettyFormatter::with_indent(INDENT));
    releases.serialize(&mut serializer)?;
    writer.write_all(b"\n")
}
