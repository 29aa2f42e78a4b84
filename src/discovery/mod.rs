//! Finding and decoding source textures for the CLI.
//!
//! # Example
//!
//! ```ignore
//! use texkit::discovery::discover;
//!
//! let found = discover(&[PathBuf::from("textures/")], &["Packed"]);
//! println!("Loaded {} textures", found.loaded.entries.len());
//! ```

mod loader;
mod scanner;

use std::path::PathBuf;

pub use loader::{from_dynamic, load_texture, load_textures, LoadResult};
pub use scanner::{is_texture, scan_directory, scan_paths, ScanResult, TEXTURE_EXTENSIONS};

/// Result of scanning and loading a set of paths.
#[derive(Debug)]
pub struct DiscoveryResult {
    pub scan: ScanResult,
    pub loaded: LoadResult,
}

impl DiscoveryResult {
    /// Decoded `(identifier, image)` pairs, ready for packing.
    pub fn into_entries(self) -> Vec<(String, crate::types::TextureImage)> {
        self.loaded.entries
    }
}

/// Scan `paths` and decode every texture found.
pub fn discover(paths: &[PathBuf], skip_dirs: &[&str]) -> DiscoveryResult {
    let scan = scan_paths(paths, skip_dirs);
    let loaded = load_textures(&scan);
    DiscoveryResult { scan, loaded }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{GrayImage, Luma};
    use tempfile::tempdir;

    #[test]
    fn test_discover_empty_directory() {
        let dir = tempdir().unwrap();
        let result = discover(&[dir.path().to_path_buf()], &[]);
        assert!(result.scan.is_empty());
        assert!(result.into_entries().is_empty());
    }

    #[test]
    fn test_discover_loads_textures() {
        let dir = tempdir().unwrap();
        GrayImage::from_pixel(4, 4, Luma([200]))
            .save(dir.path().join("rock_ao.png"))
            .unwrap();
        GrayImage::from_pixel(4, 4, Luma([50]))
            .save(dir.path().join("rock_roughness.png"))
            .unwrap();

        let result = discover(&[dir.path().to_path_buf()], &[]);
        assert_eq!(result.scan.total(), 2);
        let entries = result.into_entries();
        assert_eq!(entries.len(), 2);
        assert!(entries[0].0.ends_with("rock_ao.png"));
    }
}
