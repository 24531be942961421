use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use image::imageops::FilterType;
use image::{DynamicImage, RgbImage};
use tracing::{debug, warn};

use crate::error::{AppError, Result};
use crate::surface::pixmap::Pixmap;
use crate::transport::Crossfade;

const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "bmp", "gif"];

/// File names of the images directly inside `dir`, sorted by name.
pub fn scan_dir(dir: &Path) -> Result<Vec<String>> {
    let entries = fs::read_dir(dir).map_err(|source| AppError::PhotoDir {
        path: dir.to_path_buf(),
        source,
    })?;

    let mut names = Vec::new();
    for entry in entries {
        let path = entry?.path();
        if !path.is_file() {
            continue;
        }
        let is_image = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| IMAGE_EXTENSIONS.contains(&e.to_lowercase().as_str()));
        if let (true, Some(name)) = (is_image, path.file_name().and_then(|n| n.to_str())) {
            names.push(name.to_string());
        }
    }
    names.sort();

    if names.is_empty() {
        warn!(dir = %dir.display(), "no images found");
    } else {
        debug!(dir = %dir.display(), count = names.len(), "photos found");
    }
    Ok(names)
}

/// Decode one photo from disk.
pub fn load_photo(path: &Path) -> Result<DynamicImage> {
    image::open(path).map_err(|source| AppError::Image {
        path: path.to_path_buf(),
        source,
    })
}

/// Last composed backdrop and the blend it shows.
struct Backdrop {
    fade: Crossfade,
    pixmap: Pixmap,
}

/// The gallery's photos, decoded on first use and scaled to cover the
/// backing store.
///
/// Photos are indexed like the [`crate::transport::Gallery`] they belong to.
/// One that fails to decode is logged once and shows as black.
pub struct PhotoLibrary {
    paths: Vec<PathBuf>,
    decoded: HashMap<usize, Option<DynamicImage>>,
    fitted: HashMap<usize, RgbImage>,
    fit_size: (u32, u32),
    backdrop: Option<Backdrop>,
}

impl PhotoLibrary {
    /// Relative names resolve against `dir` when one is given.
    pub fn new(dir: Option<&Path>, names: &[String]) -> Self {
        let paths = names
            .iter()
            .map(|name| match dir {
                Some(dir) => dir.join(name),
                None => PathBuf::from(name),
            })
            .collect();
        PhotoLibrary {
            paths,
            decoded: HashMap::new(),
            fitted: HashMap::new(),
            fit_size: (0, 0),
            backdrop: None,
        }
    }

    /// The photo layer for `fade` at `width` x `height` pixels. Recomposed
    /// only when the blend or the size changed since the last call.
    pub fn backdrop(
        &mut self,
        fade: Option<Crossfade>,
        width: usize,
        height: usize,
    ) -> Option<&Pixmap> {
        let fade = fade?;
        if width == 0 || height == 0 {
            return None;
        }
        let fresh = self.backdrop.as_ref().is_some_and(|b| {
            b.fade == fade && (b.pixmap.width, b.pixmap.height) == (width, height)
        });
        if !fresh {
            let pixmap = self.compose(fade, width, height);
            self.backdrop = Some(Backdrop { fade, pixmap });
        }
        self.backdrop.as_ref().map(|b| &b.pixmap)
    }

    fn compose(&mut self, fade: Crossfade, width: usize, height: usize) -> Pixmap {
        let size = (width as u32, height as u32);
        if self.fit_size != size {
            self.fitted.clear();
            self.fit_size = size;
        }
        self.prepare(fade.to);
        if let Some(from) = fade.from {
            self.prepare(from);
        }

        let to = self.fitted.get(&fade.to);
        let from = fade.from.and_then(|i| self.fitted.get(&i));
        let w = fade.weight.clamp(0.0, 1.0) as f32;
        Pixmap::from_fn(width, height, |x, y| {
            let a = sample(from, x, y);
            let b = sample(to, x, y);
            [0, 1, 2].map(|i| a[i] * (1.0 - w) + b[i] * w)
        })
    }

    /// Decode `index` if needed and scale it to the current fit size.
    fn prepare(&mut self, index: usize) {
        if self.fitted.contains_key(&index) {
            return;
        }
        let Some(path) = self.paths.get(index) else {
            return;
        };
        let decoded = self.decoded.entry(index).or_insert_with(|| match load_photo(path) {
            Ok(img) => {
                debug!(path = %path.display(), width = img.width(), height = img.height(), "photo decoded");
                Some(img)
            }
            Err(e) => {
                warn!("{e}");
                None
            }
        });
        if let Some(img) = decoded {
            let (w, h) = self.fit_size;
            self.fitted
                .insert(index, img.resize_to_fill(w, h, FilterType::Triangle).to_rgb8());
        }
    }
}

/// Pixel of a fitted photo as `0.0..=1.0` RGB; black when absent.
fn sample(img: Option<&RgbImage>, x: usize, y: usize) -> [f32; 3] {
    match img {
        Some(img) if (x as u32) < img.width() && (y as u32) < img.height() => {
            img.get_pixel(x as u32, y as u32).0.map(|c| c as f32 / 255.0)
        }
        _ => [0.0; 3],
    }
}
