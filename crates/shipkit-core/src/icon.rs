//! Windows `.ico` generation from a single source PNG.

use ico::{IconDir, IconDirEntry, IconImage, ResourceType};
use image::imageops::{self, FilterType};
use image::RgbaImage;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use crate::error::{ShipkitError, ShipkitResult};

/// Largest edge an ICO directory entry can describe.
pub const MAX_ICON_SIZE: u32 = 256;

#[derive(Debug, Clone)]
pub struct IconOptions {
    pub sizes: Vec<u32>,
    pub png_dir: Option<PathBuf>,
}

/// Outcome of a successful icon generation.
#[derive(Debug, Clone)]
pub struct IconReport {
    pub output: PathBuf,
    pub sizes: Vec<u32>,
    pub bytes: u64,
    pub pngs: Vec<PathBuf>,
}

impl IconReport {
    pub fn kib(&self) -> f64 {
        self.bytes as f64 / 1024.0
    }

    /// e.g. `16x16, 32x32, 256x256`
    pub fn sizes_label(&self) -> String {
        self.sizes
            .iter()
            .map(|s| format!("{s}x{s}"))
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// Check the requested sizes and return them sorted and deduplicated.
pub fn normalize_sizes(sizes: &[u32]) -> ShipkitResult<Vec<u32>> {
    if sizes.is_empty() {
        return Err(ShipkitError::NoIconSizes);
    }
    if let Some(&bad) = sizes.iter().find(|&&s| s == 0 || s > MAX_ICON_SIZE) {
        return Err(ShipkitError::InvalidIconSize(bad));
    }
    let mut sizes = sizes.to_vec();
    sizes.sort_unstable();
    sizes.dedup();
    Ok(sizes)
}

/// Build a multi-size `.ico` at `output` from the PNG at `input`.
pub fn generate_icon(input: &Path, output: &Path, options: &IconOptions) -> ShipkitResult<IconReport> {
    let sizes = normalize_sizes(&options.sizes)?;

    let source = image::open(input)
        .map_err(ShipkitError::image(input))?
        .to_rgba8();
    let (w, h) = source.dimensions();
    debug!(path = %input.display(), width = w, height = h, "Loaded source image");

    if w != h {
        warn!(width = w, height = h, "Source image is not square, icon will be stretched");
    }
    let largest = sizes.last().copied().unwrap_or(MAX_ICON_SIZE);
    if w.min(h) < largest {
        warn!(source = w.min(h), target = largest, "Source image is smaller than the largest icon size");
    }

    let images: Vec<(u32, RgbaImage)> = sizes
        .iter()
        .map(|&s| (s, imageops::resize(&source, s, s, FilterType::Lanczos3)))
        .collect();

    let mut dir = IconDir::new(ResourceType::Icon);
    for (s, img) in &images {
        let icon_image = IconImage::from_rgba_data(*s, *s, img.as_raw().clone());
        let entry = IconDirEntry::encode(&icon_image).map_err(ShipkitError::io(output))?;
        dir.add_entry(entry);
    }

    if let Some(parent) = output.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(ShipkitError::io(parent))?;
    }
    let mut file = fs::File::create(output).map_err(ShipkitError::io(output))?;
    dir.write(&mut file).map_err(ShipkitError::io(output))?;
    drop(file);

    let bytes = fs::metadata(output).map_err(ShipkitError::io(output))?.len();
    info!(path = %output.display(), bytes, "Wrote icon");

    let mut pngs = Vec::new();
    if let Some(png_dir) = &options.png_dir {
        fs::create_dir_all(png_dir).map_err(ShipkitError::io(png_dir))?;
        for (s, img) in &images {
            let path = png_dir.join(format!("icon_{s}.png"));
            img.save(&path).map_err(ShipkitError::image(&path))?;
            debug!(path = %path.display(), "Wrote PNG preview");
            pngs.push(path);
        }
    }

    Ok(IconReport {
        output: output.to_path_buf(),
        sizes,
        bytes,
        pngs,
    })
}
