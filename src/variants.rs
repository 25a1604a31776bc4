use std::collections::HashMap;

use serde::{Deserialize, Deserializer, Serialize};

use crate::constants::IMAGE_SIZES;
use crate::error::{Error, Result};

/// One resolution of a media item, as listed in a video's `video_files`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Variant {
    /// Some files are listed without dimensions; those sort last.
    #[serde(deserialize_with = "null_as_zero")]
    pub width: u32,
    pub link: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quality: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_type: Option<String>,
}

impl Variant {
    pub fn new(width: u32, link: impl Into<String>) -> Self {
        Self { width, link: link.into(), height: None, id: None, quality: None, file_type: None }
    }
}

fn null_as_zero<'de, D: Deserializer<'de>>(d: D) -> Result<u32, D::Error> {
    Ok(Option::<u32>::deserialize(d)?.unwrap_or(0))
}

/// Position of `size_name` in [`IMAGE_SIZES`]; `original` is 0.
pub fn size_to_rank(size_name: &str) -> Result<usize> {
    IMAGE_SIZES.iter().position(|s| *s == size_name).ok_or_else(|| Error::InvalidSize {
        size: size_name.to_string(),
        valid: IMAGE_SIZES.iter().map(|s| s.to_string()).collect(),
    })
}

/// Link of the `rank_index`-th widest variant. Equal widths keep their input
/// order.
pub fn select_variant_link(variants: &[Variant], rank_index: usize) -> Result<String> {
    let mut sorted: Vec<&Variant> = variants.iter().collect();
    sorted.sort_by(|a, b| b.width.cmp(&a.width));
    sorted
        .get(rank_index)
        .map(|v| v.link.clone())
        .ok_or(Error::OutOfRange { index: rank_index, len: variants.len() })
}

/// Video file for a named size tier.
pub fn select_video_link(video_files: &[Variant], size_name: &str) -> Result<String> {
    select_variant_link(video_files, size_to_rank(size_name)?)
}

/// Photos come with a `src` object keyed by size name instead of a list.
pub fn select_photo_link(src: &HashMap<String, String>, size_name: &str) -> Result<String> {
    size_to_rank(size_name)?;
    src.get(size_name)
        .filter(|link| !link.is_empty())
        .cloned()
        .ok_or_else(|| Error::MissingField(format!("src.{}", size_name)))
}
