//! Fixed values shared with the download pipeline.

/// Base URL of the Pexels REST API.
pub const PEXELS_API_URL: &str = "https://api.pexels.com";

pub const IMAGES_TMP_DIR: &str = "images";
pub const CUSTOM_DATA_KEY: &str = "Pexels downloader";

/// Files smaller than this are treated as broken downloads (1 KB).
pub const MIN_FILE_SIZE: u64 = 1024;

/// Page size for search requests. 80 is the API maximum.
pub const IMAGES_PER_PAGE: u32 = 80;

/// Named size tiers, largest first. The position of a name is its rank.
pub const IMAGE_SIZES: [&str; 6] = ["original", "large2x", "large", "medium", "small", "tiny"];

/// Display name -> result item field. Every item must carry these.
pub const REQUIRED_METADATA_FIELDS: &[(&str, &str)] = &[
    ("Source URL", "url"),
    ("License", "license"),
    ("Photographer name", "photographer"),
];

/// Display name -> result item field. Copied when present.
pub const OPTIONAL_METADATA_FIELDS: &[(&str, &str)] = &[
    ("Photographer Pexels ID", "photographer_id"),
    ("Photographer URL", "photographer_url"),
    ("Image description", "alt"),
];

pub const DOWNLOAD_TYPES: &[(&str, &str)] = &[
    ("files", "Copy source file to the Supervisely dataset"),
    ("links", "Add link to source image in the Supervisely dataset"),
];

pub const ALLOWED_IMAGE_FORMATS: [&str; 3] = [".jpg", ".jpeg", ".png"];

/// The API does not send a license per item; all content is under this one.
pub const PEXELS_LICENSE_URL: &str = "https://www.pexels.com/license/";

pub const API_KEY_VAR: &str = "PEXELS_API_KEY";
/// Name of the credentials file kept in the team files.
pub const CREDENTIALS_FILE: &str = "pexels.env";
