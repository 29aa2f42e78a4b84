//! Map resolver: classifies filenames by role and groups them into texture sets.
//!
//! A name like `T_rock_roughness_2k.png` resolves to base `rock`, role
//! `Roughness` and declared size `2k`. Matching is driven entirely by the
//! role table.

use std::collections::BTreeMap;
use std::path::Path;

use crate::config::RoleTable;
use crate::types::{SizeToken, SourceMap, TextureImage, TextureSet};
use crate::validation::{Diagnostic, ValidationResult};

const SEPARATORS: [char; 3] = ['_', '-', '.'];

/// A filename that matched a role.
#[derive(Debug, Clone, PartialEq)]
pub struct Classified {
    pub identifier: String,
    /// Base name shared by all maps of the set.
    pub base: String,
    /// Canonical role name.
    pub role: String,
    pub declared_size: Option<SizeToken>,
}

/// Outcome of resolving a batch of identifiers.
#[derive(Debug, Clone, Default)]
pub struct Resolved {
    pub matched: Vec<Classified>,
    /// Identifiers that matched no role suffix.
    pub unrecognised: Vec<String>,
}

/// Classify one identifier. `None` if no role suffix matches.
pub fn classify(identifier: &str, roles: &RoleTable, prefixes: &[String]) -> Option<Classified> {
    let path = Path::new(identifier);
    let stem = path.file_stem()?.to_str()?;

    let (stem, mut declared_size) = strip_size_token(stem);

    // Longest suffix wins; the first role listed wins ties.
    let mut best: Option<(&str, usize)> = None;
    for role in roles.iter() {
        for suffix in role.suffixes() {
            let longer = best.map_or(true, |(_, len)| suffix.len() > len);
            if longer && suffix_start(stem, suffix).is_some() {
                best = Some((role.name(), suffix.len()));
            }
        }
    }
    let (role, suffix_len) = best?;

    let mut base = stem[..stem.len() - suffix_len].trim_end_matches(SEPARATORS);
    if declared_size.is_none() {
        let (stripped, size) = strip_size_token(base);
        base = stripped;
        declared_size = size;
    }
    let base = strip_prefix(base, prefixes);
    if base.is_empty() {
        return None;
    }

    Some(Classified {
        identifier: identifier.to_string(),
        base: base.to_string(),
        role: role.to_string(),
        declared_size,
    })
}

/// Display name for a single texture: the set base when the name carries a
/// role suffix, otherwise the stem with any size token and asset prefix
/// removed.
pub fn derive_name(identifier: &str, roles: &RoleTable, prefixes: &[String]) -> String {
    if let Some(classified) = classify(identifier, roles, prefixes) {
        return classified.base;
    }
    let stem = Path::new(identifier)
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or(identifier);
    let (base, _) = strip_size_token(stem);
    match strip_prefix(base.trim_end_matches(SEPARATORS), prefixes) {
        "" => stem.to_string(),
        name => name.to_string(),
    }
}

/// Classify a batch of identifiers.
pub fn resolve<'a, I>(identifiers: I, roles: &RoleTable, prefixes: &[String]) -> Resolved
where
    I: IntoIterator<Item = &'a str>,
{
    let mut resolved = Resolved::default();
    for id in identifiers {
        match classify(id, roles, prefixes) {
            Some(c) => resolved.matched.push(c),
            None => resolved.unrecognised.push(id.to_string()),
        }
    }
    resolved
}

/// Group decoded images into texture sets.
///
/// Unrecognised names, duplicate roles and declared sizes that disagree with
/// the actual resolution are reported as warnings.
pub fn group(
    entries: Vec<(String, TextureImage)>,
    roles: &RoleTable,
    prefixes: &[String],
) -> (Vec<TextureSet>, ValidationResult) {
    let mut diagnostics = ValidationResult::new();
    let mut sets: BTreeMap<String, TextureSet> = BTreeMap::new();

    for (identifier, image) in entries {
        let Some(classified) = classify(&identifier, roles, prefixes) else {
            tracing::warn!("Unrecognised texture name: {}", identifier);
            diagnostics.push(
                Diagnostic::warning(
                    "texkit::resolve::unrecognized",
                    "name matches no texture type suffix, skipped",
                )
                .with_subject(&identifier)
                .with_help(format!("Known texture types: {}", roles.names())),
            );
            continue;
        };

        if let Some(size) = classified.declared_size {
            if !size.matches(image.width(), image.height()) {
                tracing::warn!(
                    "{} declares up to {}px but is {}x{}",
                    identifier,
                    size.max_side,
                    image.width(),
                    image.height()
                );
                diagnostics.push(
                    Diagnostic::warning(
                        "texkit::resolve::size-mismatch",
                        format!(
                            "declared size (up to {}px) disagrees with actual {}x{}",
                            size.max_side,
                            image.width(),
                            image.height()
                        ),
                    )
                    .with_subject(&identifier),
                );
            }
        }

        let set = sets
            .entry(classified.base.clone())
            .or_insert_with(|| TextureSet::new(classified.base.clone()));

        let incoming = SourceMap {
            identifier: identifier.clone(),
            image,
        };
        let replaced = match set.get(&classified.role) {
            Some(existing) if existing.image.pixel_count() >= incoming.image.pixel_count() => {
                Some((incoming.identifier, existing.identifier.clone()))
            }
            Some(existing) => {
                let dropped = existing.identifier.clone();
                let kept = incoming.identifier.clone();
                set.insert(classified.role.clone(), incoming);
                Some((dropped, kept))
            }
            None => {
                set.insert(classified.role.clone(), incoming);
                None
            }
        };

        if let Some((dropped, kept)) = replaced {
            tracing::warn!(
                "Set '{}' has two {} maps, keeping {}",
                classified.base,
                classified.role,
                kept
            );
            diagnostics.push(
                Diagnostic::warning(
                    "texkit::resolve::duplicate-role",
                    format!("two {} maps, kept '{}' and ignored '{}'", classified.role, kept, dropped),
                )
                .with_subject(&classified.base),
            );
        }
    }

    (sets.into_values().collect(), diagnostics)
}

/// Byte offset of `suffix` when `stem` ends with a separator followed by it.
fn suffix_start(stem: &str, suffix: &str) -> Option<usize> {
    if suffix.is_empty() || stem.len() <= suffix.len() {
        return None;
    }
    let start = stem.len() - suffix.len();
    if !stem.is_char_boundary(start) || !stem[start..].eq_ignore_ascii_case(suffix) {
        return None;
    }
    let before = stem[..start].chars().next_back()?;
    SEPARATORS.contains(&before).then_some(start)
}

/// Strip a trailing `_2k`-style size token.
fn strip_size_token(stem: &str) -> (&str, Option<SizeToken>) {
    for (token, _) in SizeToken::KNOWN {
        if let Some(start) = suffix_start(stem, token) {
            return (&stem[..start - 1], SizeToken::parse(token));
        }
    }
    (stem, None)
}

/// Strip an asset prefix such as `T_`, case-insensitively. Longer prefixes first.
fn strip_prefix<'a>(base: &'a str, prefixes: &[String]) -> &'a str {
    let mut sorted: Vec<&String> = prefixes.iter().collect();
    sorted.sort_by_key(|p| std::cmp::Reverse(p.len()));

    for prefix in sorted {
        let n = prefix.len();
        if base.len() <= n || !base.is_char_boundary(n) || !base[..n].eq_ignore_ascii_case(prefix) {
            continue;
        }
        let rest = &base[n..];
        if rest.starts_with(SEPARATORS) {
            let stripped = rest.trim_start_matches(SEPARATORS);
            if !stripped.is_empty() {
                return stripped;
            }
        }
    }
    base
}
