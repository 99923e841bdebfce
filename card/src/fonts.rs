use ab_glyph::FontVec;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::errors::{CardError, CardResult};

/// Fonts tried, in order, when none is configured
pub const SYSTEM_FONT_PATHS: [&str; 2] = [
    "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/truetype/liberation/LiberationSans-Regular.ttf",
];

/// DejaVu Sans, shipped with the crate so cards always carry text
const BUNDLED_FONT: &[u8] = include_bytes!("../assets/DejaVuSans.ttf");

/// A loaded TrueType/OpenType font
pub struct CardFont {
    font: FontVec,
    /// `None` for the bundled font
    path: Option<PathBuf>,
}

impl fmt::Debug for CardFont {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CardFont").field("path", &self.path).finish()
    }
}

impl CardFont {
    pub fn from_path(path: &Path) -> CardResult<Self> {
        let bytes = fs::read(path)?;
        let font = FontVec::try_from_vec(bytes)
            .map_err(|e| CardError::FontError(format!("{}: {}", path.display(), e)))?;
        Ok(Self {
            font,
            path: Some(path.to_path_buf()),
        })
    }

    pub fn bundled() -> CardResult<Self> {
        let font = FontVec::try_from_vec(BUNDLED_FONT.to_vec())
            .map_err(|e| CardError::FontError(format!("bundled font: {}", e)))?;
        Ok(Self { font, path: None })
    }

    /// The configured font if it loads, then the first system font that does,
    /// then the bundled one
    pub fn discover(preferred: Option<&Path>) -> CardResult<Self> {
        let candidates = preferred
            .map(Path::to_path_buf)
            .into_iter()
            .chain(SYSTEM_FONT_PATHS.iter().map(PathBuf::from));

        for path in candidates {
            match Self::from_path(&path) {
                Ok(font) => {
                    debug!("Loaded card font from {}", path.display());
                    return Ok(font);
                }
                Err(e) => debug!("Skipping font {}: {}", path.display(), e),
            }
        }

        info!("No system font found; using the bundled card font");
        Self::bundled()
    }

    pub fn font(&self) -> &FontVec {
        &self.font
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_missing_file_is_io_error() {
        let dir = tempdir().unwrap();
        let err = CardFont::from_path(&dir.path().join("missing.ttf")).unwrap_err();
        assert!(matches!(err, CardError::IoError(_)));
    }

    #[test]
    fn test_garbage_file_is_font_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("garbage.ttf");
        fs::write(&path, b"definitely not a font").unwrap();
        let err = CardFont::from_path(&path).unwrap_err();
        assert!(matches!(err, CardError::FontError(_)));
    }

    #[test]
    fn test_bundled_font_loads() {
        let font = CardFont::bundled().unwrap();
        assert!(font.path().is_none());
    }

    #[test]
    fn test_configured_font_wins() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("custom.ttf");
        fs::write(&path, BUNDLED_FONT).unwrap();
        let font = CardFont::discover(Some(&path)).unwrap();
        assert_eq!(font.path(), Some(path.as_path()));
    }

    #[test]
    fn test_unusable_configured_font_still_yields_a_font() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("garbage.ttf");
        fs::write(&path, b"nope").unwrap();
        let font = CardFont::discover(Some(&path)).unwrap();
        assert_ne!(font.path(), Some(path.as_path()));
    }
}
