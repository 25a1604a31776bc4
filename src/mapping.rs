use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::constants::{
    ALLOWED_IMAGE_FORMATS, DOWNLOAD_TYPES, MIN_FILE_SIZE, OPTIONAL_METADATA_FIELDS, PEXELS_LICENSE_URL,
    REQUIRED_METADATA_FIELDS,
};
use crate::error::Error;

/// How a picked file ends up in the destination dataset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DownloadType {
    #[default]
    Files,
    Links,
}

impl DownloadType {
    pub fn as_str(self) -> &'static str {
        match self {
            DownloadType::Files => "files",
            DownloadType::Links => "links",
        }
    }

    pub fn description(self) -> &'static str {
        DOWNLOAD_TYPES
            .iter()
            .find(|(name, _)| *name == self.as_str())
            .map(|(_, desc)| *desc)
            .unwrap_or_default()
    }
}

impl fmt::Display for DownloadType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DownloadType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "files" => Ok(DownloadType::Files),
            "links" => Ok(DownloadType::Links),
            _ => Err(Error::InvalidDownloadType {
                name: s.to_string(),
                valid: DOWNLOAD_TYPES.iter().map(|(n, _)| n.to_string()).collect(),
            }),
        }
    }
}

fn field_text(item: &Value, field: &str) -> Option<String> {
    match item.get(field)? {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Display name -> value for one search result item.
///
/// Search items carry no license field; every item is under the Pexels
/// license, so it is filled in when absent.
pub fn extract_metadata(item: &Value) -> Result<BTreeMap<String, String>, Error> {
    let mut out = BTreeMap::new();
    for (display, field) in REQUIRED_METADATA_FIELDS {
        let value = match field_text(item, field) {
            Some(v) => v,
            None if *field == "license" => PEXELS_LICENSE_URL.to_string(),
            None => return Err(Error::MissingField(field.to_string())),
        };
        out.insert(display.to_string(), value);
    }
    for (display, field) in OPTIONAL_METADATA_FIELDS {
        if let Some(v) = field_text(item, field) {
            out.insert(display.to_string(), v);
        }
    }
    Ok(out)
}

/// Case-insensitive extension check against [`ALLOWED_IMAGE_FORMATS`].
pub fn is_allowed_format(path: &Path) -> bool {
    let Some(ext) = path.extension().and_then(|e| e.to_str()) else { return false };
    let ext = format!(".{}", ext.to_ascii_lowercase());
    ALLOWED_IMAGE_FORMATS.contains(&ext.as_str())
}

pub fn meets_min_size(bytes: u64) -> bool {
    bytes >= MIN_FILE_SIZE
}
