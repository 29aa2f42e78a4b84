//! File system scanner for source textures.
//!
//! Recursively walks directories for image files the loader can decode.

use std::path::{Path, PathBuf};

use walkdir::WalkDir;

/// Extensions picked up by the scanner (lowercase).
pub const TEXTURE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "tga", "exr"];

/// Result of scanning for textures.
#[derive(Debug, Default)]
pub struct ScanResult {
    /// Texture files, sorted per scanned root.
    pub textures: Vec<PathBuf>,
    /// Explicitly named files that are not textures.
    pub skipped: Vec<PathBuf>,
}

impl ScanResult {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn total(&self) -> usize {
        self.textures.len()
    }

    pub fn is_empty(&self) -> bool {
        self.textures.is_empty()
    }

    pub fn merge(&mut self, other: ScanResult) {
        for path in other.textures {
            if !self.textures.contains(&path) {
                self.textures.push(path);
            }
        }
        self.skipped.extend(other.skipped);
    }
}

/// Whether `path` has a texture extension.
pub fn is_texture(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| TEXTURE_EXTENSIONS.contains(&e.to_lowercase().as_str()))
        .unwrap_or(false)
}

/// Scan a directory for textures.
///
/// Directories whose name is in `skip_dirs` (output and backup folders) are
/// not descended into.
pub fn scan_directory(root: &Path, skip_dirs: &[&str]) -> ScanResult {
    let mut result = ScanResult::new();

    if !root.exists() {
        return result;
    }

    let walker = WalkDir::new(root)
        .follow_links(true)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| {
            e.depth() == 0
                || !e.file_type().is_dir()
                || !e
                    .file_name()
                    .to_str()
                    .map(|name| skip_dirs.contains(&name))
                    .unwrap_or(false)
        });

    for entry in walker.filter_map(|e| e.ok()) {
        let path = entry.path();
        if path.is_dir() {
            continue;
        }
        if is_texture(path) {
            result.textures.push(path.to_path_buf());
        }
    }

    result
}

/// Scan a mix of files and directories.
pub fn scan_paths(paths: &[PathBuf], skip_dirs: &[&str]) -> ScanResult {
    let mut result = ScanResult::new();

    for path in paths {
        if path.is_dir() {
            result.merge(scan_directory(path, skip_dirs));
        } else if is_texture(path) {
            result.merge(ScanResult {
                textures: vec![path.clone()],
                skipped: Vec::new(),
            });
        } else {
            result.skipped.push(path.clone());
        }
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_is_texture() {
        assert!(is_texture(Path::new("rock_ao.png")));
        assert!(is_texture(Path::new("dir/rock_height.EXR")));
        assert!(is_texture(Path::new("rock.Jpeg")));
        assert!(!is_texture(Path::new("rock.psd")));
        assert!(!is_texture(Path::new("readme")));
    }

    #[test]
    fn test_scan_recursive_and_skips_output_dirs() {
        let dir = tempdir().unwrap();
        fs::create_dir_all(dir.path().join("rock")).unwrap();
        fs::create_dir_all(dir.path().join("Packed")).unwrap();

        fs::write(dir.path().join("rock/rock_ao.png"), b"").unwrap();
        fs::write(dir.path().join("rock/rock_r.tga"), b"").unwrap();
        fs::write(dir.path().join("Packed/rock_ARM.png"), b"").unwrap();
        fs::write(dir.path().join("notes.txt"), b"").unwrap();

        let result = scan_directory(dir.path(), &["Packed"]);
        assert_eq!(result.total(), 2);
        assert!(result.textures[0].ends_with("rock/rock_ao.png"));
    }

    #[test]
    fn test_scan_paths_mixed() {
        let dir = tempdir().unwrap();
        let file = dir.path().join("a_ao.png");
        let other = dir.path().join("a.txt");
        fs::write(&file, b"").unwrap();
        fs::write(&other, b"").unwrap();

        let result = scan_paths(&[file.clone(), dir.path().to_path_buf(), other.clone()], &[]);
        // the file is found twice but kept once
        assert_eq!(result.textures, vec![file]);
        assert_eq!(result.skipped, vec![other]);
    }

    #[test]
    fn test_scan_nonexistent_directory() {
        assert!(scan_directory(Path::new("/nonexistent/path"), &[]).is_empty());
    }
}
