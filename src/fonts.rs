use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use log::{debug, info};
use plotters::style::{FontStyle, register_font};

use crate::error::{Error, Result};

/// Common locations of a sans-serif TTF on Linux, macOS and Windows.
const CANDIDATES: &[&str] = &[
    "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/TTF/DejaVuSans.ttf",
    "/usr/share/fonts/dejavu-sans-fonts/DejaVuSans.ttf",
    "/usr/share/fonts/truetype/liberation/LiberationSans-Regular.ttf",
    "/usr/share/fonts/liberation-sans/LiberationSans-Regular.ttf",
    "/usr/share/fonts/truetype/freefont/FreeSans.ttf",
    "/usr/share/fonts/noto/NotoSans-Regular.ttf",
    "/usr/share/fonts/truetype/noto/NotoSans-Regular.ttf",
    "/Library/Fonts/Arial.ttf",
    "/System/Library/Fonts/Supplemental/Arial.ttf",
    "C:\\Windows\\Fonts\\arial.ttf",
];

/// Font currently registered as the sans-serif family.
static REGISTERED: Mutex<Option<PathBuf>> = Mutex::new(None);

/// First candidate font present on this machine.
pub fn find_system_font() -> Option<PathBuf> {
    CANDIDATES
        .iter()
        .map(PathBuf::from)
        .find(|p| p.is_file())
}

/// Registers `font` (or the first system font found) as the sans-serif family
/// for image text, in normal and bold. Registering the same file again is a no-op.
pub fn register(font: Option<&Path>) -> Result<PathBuf> {
    let path = match font {
        Some(p) => p.to_path_buf(),
        None => find_system_font().ok_or_else(|| {
            Error::Font("no usable system font found; pass --font <file.ttf>".to_string())
        })?,
    };
    let mut current = REGISTERED.lock().unwrap_or_else(PoisonError::into_inner);
    if current.as_deref() == Some(path.as_path()) {
        return Ok(path);
    }

    debug!("loading font {}", path.display());
    // plotters keeps registered font data for the life of the process.
    let bytes: &'static [u8] = Box::leak(fs::read(&path)?.into_boxed_slice());
    for style in [FontStyle::Normal, FontStyle::Bold] {
        register_font("sans-serif", style, bytes).map_err(|_| {
            Error::Font(format!(
                "{}: not a valid TrueType/OpenType font",
                path.display()
            ))
        })?;
    }
    info!("using font {}", path.display());
    *current = Some(path.clone());
    Ok(path)
}
