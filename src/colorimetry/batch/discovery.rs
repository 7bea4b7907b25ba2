//! Image collection discovery
//!
//! A data folder holds one sub-directory per dye; each sub-directory holds that
//! dye's sample images. Discovery order is lexicographic by name, which makes
//! result tables reproducible.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use tracing::{debug, error};

use crate::colorimetry::common::error::{ColorimetryError, Result};

/// File extensions treated as sample images (case-insensitive).
pub const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "tif", "tiff", "bmp"];

/// Images of one dye, in discovery order.
#[derive(Debug, Clone, PartialEq)]
pub struct DyeCollection {
    pub dye: String,
    pub images: Vec<PathBuf>,
}

impl DyeCollection {
    pub fn new(dye: impl Into<String>, images: Vec<PathBuf>) -> Self {
        Self {
            dye: dye.into(),
            images,
        }
    }

    pub fn from_dir<P: AsRef<Path>>(dir: P) -> Result<Self> {
        let dir = dir.as_ref();
        let dye = file_name(dir);
        Ok(Self::new(dye, list_images(dir)?))
    }
}

/// Dye folders found under a data folder.
#[derive(Debug, Default)]
pub struct DyeDiscovery {
    pub collections: Vec<DyeCollection>,
    /// Dye folders whose contents could not be listed
    pub unreadable: BTreeMap<String, ColorimetryError>,
}

impl DyeDiscovery {
    pub fn is_empty(&self) -> bool {
        self.collections.is_empty() && self.unreadable.is_empty()
    }
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

fn is_image(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|ext| {
            IMAGE_EXTENSIONS
                .iter()
                .any(|known| ext.eq_ignore_ascii_case(known))
        })
}

fn read_dir_sorted(dir: &Path) -> Result<Vec<PathBuf>> {
    let entries = std::fs::read_dir(dir)
        .map_err(|e| ColorimetryError::ConfigError(format!("{}: {}", dir.display(), e)))?;

    let mut paths = Vec::new();
    for entry in entries {
        paths.push(entry?.path());
    }
    paths.sort_by_key(|p| file_name(p));
    Ok(paths)
}

/// Image files directly inside `dir`, sorted by file name.
pub fn list_images<P: AsRef<Path>>(dir: P) -> Result<Vec<PathBuf>> {
    let images: Vec<PathBuf> = read_dir_sorted(dir.as_ref())?
        .into_iter()
        .filter(|p| p.is_file() && is_image(p))
        .collect();
    debug!(dir = %dir.as_ref().display(), count = images.len(), "Listed images");
    Ok(images)
}

/// One collection per sub-directory of `root`, sorted by dye name. Only an
/// unreadable `root` is an error; an unreadable dye folder is reported in
/// [`DyeDiscovery::unreadable`].
pub fn discover_dye_collections<P: AsRef<Path>>(root: P) -> Result<DyeDiscovery> {
    let dirs: Vec<PathBuf> = read_dir_sorted(root.as_ref())?
        .into_iter()
        .filter(|p| p.is_dir())
        .collect();
    Ok(collections_from_dirs(dirs))
}

fn collections_from_dirs(dirs: Vec<PathBuf>) -> DyeDiscovery {
    let mut discovery = DyeDiscovery::default();
    for dir in dirs {
        match DyeCollection::from_dir(&dir) {
            Ok(collection) => discovery.collections.push(collection),
            Err(e) => {
                error!(dir = %dir.display(), error = %e, "Cannot list dye folder");
                discovery.unreadable.insert(file_name(&dir), e);
            }
        }
    }
    discovery
}

/// Known concentration encoded in a calibration filename: the first number
/// in the file stem (`2.5.jpg` -> 2.5, `std_10ppm.png` -> 10).
pub fn parse_concentration<P: AsRef<Path>>(path: P) -> Option<f64> {
    let stem = path.as_ref().file_stem()?.to_str()?;
    let bytes = stem.as_bytes();

    let start = bytes.iter().position(u8::is_ascii_digit)?;
    let mut end = start;
    while end < bytes.len() && bytes[end].is_ascii_digit() {
        end += 1;
    }
    if end + 1 < bytes.len() && bytes[end] == b'.' && bytes[end + 1].is_ascii_digit() {
        end += 1;
        while end < bytes.len() && bytes[end].is_ascii_digit() {
            end += 1;
        }
    }

    stem[start..end].parse().ok()
}
