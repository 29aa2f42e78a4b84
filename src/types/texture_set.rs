//! Texture sets: source maps grouped by base name and role.

use std::collections::BTreeMap;

use crate::types::TextureImage;

/// A size token declared in a filename (`_2k`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SizeToken {
    /// Upper bound on the longer side, in pixels.
    pub max_side: u32,
}

impl SizeToken {
    /// Recognised tokens, smallest first.
    pub const KNOWN: [(&'static str, u32); 5] =
        [("512", 512), ("1k", 1024), ("2k", 2048), ("4k", 4096), ("8k", 8192)];

    pub fn parse(token: &str) -> Option<Self> {
        Self::KNOWN
            .iter()
            .find(|(name, _)| name.eq_ignore_ascii_case(token))
            .map(|&(_, max_side)| Self { max_side })
    }

    /// Whether an image of this resolution fits the declared bucket:
    /// larger than the next smaller token, at most this one.
    pub fn matches(self, width: u32, height: u32) -> bool {
        let long = width.max(height);
        let floor = Self::KNOWN
            .iter()
            .map(|&(_, side)| side)
            .filter(|&side| side < self.max_side)
            .max()
            .unwrap_or(0);
        long > floor && long <= self.max_side
    }
}

/// One source image assigned to a role.
#[derive(Debug, Clone, PartialEq)]
pub struct SourceMap {
    /// Caller-supplied identifier, usually the file path.
    pub identifier: String,
    pub image: TextureImage,
}

/// Maps sharing a base name, at most one per role.
#[derive(Debug, Clone, PartialEq)]
pub struct TextureSet {
    name: String,
    maps: BTreeMap<String, SourceMap>,
}

impl TextureSet {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            maps: BTreeMap::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Source for a canonical role name.
    pub fn get(&self, role: &str) -> Option<&SourceMap> {
        self.maps.get(role)
    }

    pub fn contains(&self, role: &str) -> bool {
        self.maps.contains_key(role)
    }

    /// Assign a source to a role, returning the one it replaces.
    pub fn insert(&mut self, role: impl Into<String>, source: SourceMap) -> Option<SourceMap> {
        self.maps.insert(role.into(), source)
    }

    /// Builder-style insert.
    pub fn with_map(mut self, role: &str, identifier: &str, image: TextureImage) -> Self {
        self.insert(
            role,
            SourceMap {
                identifier: identifier.to_string(),
                image,
            },
        );
        self
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &SourceMap)> {
        self.maps.iter().map(|(role, source)| (role.as_str(), source))
    }

    pub fn len(&self) -> usize {
        self.maps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.maps.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{BitDepth, ChannelLayout};

    #[test]
    fn test_size_token_parse() {
        assert_eq!(SizeToken::parse("2K"), Some(SizeToken { max_side: 2048 }));
        assert_eq!(SizeToken::parse("512"), Some(SizeToken { max_side: 512 }));
        assert_eq!(SizeToken::parse("3k"), None);
    }

    #[test]
    fn test_size_token_buckets() {
        let k1 = SizeToken::parse("1k").unwrap();
        assert!(k1.matches(1024, 1024));
        assert!(k1.matches(1000, 200));
        assert!(!k1.matches(512, 512));
        assert!(!k1.matches(2048, 1024));
        assert!(SizeToken::parse("512").unwrap().matches(64, 64));
    }

    #[test]
    fn test_insert_replaces() {
        let img = TextureImage::uniform(1, 1, ChannelLayout::Gray, BitDepth::Eight, [0; 3]);
        let mut set = TextureSet::new("rock").with_map("AO", "a.png", img.clone());
        let old = set.insert(
            "AO",
            SourceMap {
                identifier: "b.png".into(),
                image: img,
            },
        );
        assert_eq!(old.unwrap().identifier, "a.png");
        assert_eq!(set.len(), 1);
        assert_eq!(set.get("AO").unwrap().identifier, "b.png");
    }
}
