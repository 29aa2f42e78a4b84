//! `pack-manifest.json`: per-output metadata for the engine import step.

use std::fs;
use std::path::Path;

use serde::Serialize;

use crate::error::{Result, TexError};
use crate::types::PackedEntry;

pub const MANIFEST_FILENAME: &str = "pack-manifest.json";

#[derive(Debug, Default, Serialize)]
pub struct PackManifest {
    pub textures: Vec<PackedEntry>,
}

impl PackManifest {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, entry: PackedEntry) {
        self.textures.push(entry);
    }

    pub fn is_empty(&self) -> bool {
        self.textures.is_empty()
    }
}

/// Write the manifest as pretty JSON to `dir/pack-manifest.json`.
pub fn write_manifest(manifest: &PackManifest, dir: &Path) -> Result<()> {
    let json = serde_json::to_string_pretty(manifest).map_err(|e| TexError::Build {
        message: format!("Failed to serialize pack manifest: {}", e),
        help: None,
    })?;
    let path = dir.join(MANIFEST_FILENAME);
    fs::write(&path, json).map_err(|e| TexError::Io {
        path: path.to_path_buf(),
        message: format!("Failed to write pack manifest: {}", e),
    })?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::BitDepth;
    use tempfile::tempdir;

    #[test]
    fn test_manifest_json_keys() {
        let mut manifest = PackManifest::new();
        manifest.push(PackedEntry {
            file: "rock_ARM.png".into(),
            set: "rock".into(),
            mode: "ARM".into(),
            width: 512,
            height: 512,
            bit_depth: BitDepth::Eight,
            compression: "TC_MASKS".into(),
            srgb: false,
            sources: vec!["rock_ao.png".into()],
        });

        let dir = tempdir().unwrap();
        write_manifest(&manifest, dir.path()).unwrap();

        let text = fs::read_to_string(dir.path().join(MANIFEST_FILENAME)).unwrap();
        let json: serde_json::Value = serde_json::from_str(&text).unwrap();
        let entry = &json["textures"][0];
        assert_eq!(entry["file"], "rock_ARM.png");
        assert_eq!(entry["bit_depth"], "eight");
        assert_eq!(entry["compression"], "TC_MASKS");
        assert_eq!(entry["sRGB"], false);
    }
}
