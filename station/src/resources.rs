//! Background and icon images.
//!
//! A resources directory holds `simple.png` and `warning.png` backgrounds,
//! and one `icon-<category>.png` per weather icon.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use embedded_graphics::prelude::Size;

use crate::canvas::{create_mask, IndexedImage, Mask, TriColor};
use crate::face::Background;
use crate::icon::IconCategory;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("reading {}: {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("decoding {}: {source}", path.display())]
    Image {
        path: PathBuf,
        source: image::ImageError,
    },
}

/// An icon and the mask used to paste it.
#[derive(Debug, Clone)]
pub struct Icon {
    pub image: IndexedImage,
    pub mask: Mask,
}

impl Icon {
    /// Icon pasted wherever it has a panel colour.
    pub fn new(image: IndexedImage) -> Self {
        let mask = create_mask(&image, &TriColor::ALL);
        Icon { image, mask }
    }
}

/// Every image the face is drawn from.
#[derive(Debug, Clone)]
pub struct Resources {
    simple: IndexedImage,
    warning: IndexedImage,
    icons: HashMap<IconCategory, Icon>,
}

impl Resources {
    pub fn new(simple: IndexedImage, warning: IndexedImage) -> Self {
        Resources {
            simple,
            warning,
            icons: HashMap::new(),
        }
    }

    pub fn with_icon(mut self, category: IconCategory, icon: Icon) -> Self {
        self.icons.insert(category, icon);
        self
    }

    /// Load every image from a resources directory.
    pub fn load(dir: &Path) -> Result<Self, Error> {
        let simple = load_background(&dir.join(Background::Simple.file_name()))?;
        let warning = load_background(&dir.join(Background::Warning.file_name()))?;
        let mut resources = Resources::new(simple, warning);

        let io_error = |source| Error::Io {
            path: dir.to_owned(),
            source,
        };
        for entry in std::fs::read_dir(dir).map_err(io_error)? {
            let path = entry.map_err(io_error)?.path();
            let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
                continue;
            };
            let Some(stem) = name
                .strip_prefix("icon-")
                .and_then(|n| n.strip_suffix(".png"))
            else {
                continue;
            };
            match IconCategory::from_name(stem) {
                Some(category) => {
                    tracing::debug!("loading {} icon from {}", category, path.display());
                    let icon = Icon::new(load_icon(&path)?);
                    resources = resources.with_icon(category, icon);
                }
                None => tracing::warn!("ignoring {}: no such weather icon", path.display()),
            }
        }
        Ok(resources)
    }

    pub fn background(&self, background: Background) -> &IndexedImage {
        match background {
            Background::Simple => &self.simple,
            Background::Warning => &self.warning,
        }
    }

    pub fn icon(&self, category: IconCategory) -> Option<&Icon> {
        self.icons.get(&category)
    }
}

fn load_rgba(path: &Path) -> Result<(Size, Vec<u8>), Error> {
    let image = image::open(path)
        .map_err(|source| Error::Image {
            path: path.to_owned(),
            source,
        })?
        .into_rgba8();
    let size = Size::new(image.width(), image.height());
    Ok((size, image.into_raw()))
}

/// Backgrounds are snapped to the nearest panel colour.
fn load_background(path: &Path) -> Result<IndexedImage, Error> {
    let (size, rgba) = load_rgba(path)?;
    Ok(IndexedImage::quantized(size, &rgba))
}

/// Icons keep only their exact panel colours; everything else is transparent.
fn load_icon(path: &Path) -> Result<IndexedImage, Error> {
    let (size, rgba) = load_rgba(path)?;
    Ok(IndexedImage::from_rgba(size, &rgba))
}
