//! Font resolution for the rendering pipeline.
//!
//! [`FontLibrary`] wraps a fontdb database behind a read-mostly cache and
//! resolves `(family, weight)` requests through a deterministic fallback
//! chain: the requested family, then the closest name from a fixed
//! email-safe list (case-insensitive substring match), then generic
//! sans-serif. Resolution never fails: when no face can be found or
//! loaded, a faceless [`ResolvedFont`] is returned and the backends fall
//! back to their built-in defaults. Font problems are logged, never
//! fatal to a render.
//!
//! The library is an explicit value passed into each render call; there
//! is no global font state.

use easel_types::FontWeight;
use once_cell::sync::Lazy;
use std::collections::HashMap;
use std::path::Path;
use std::sync::{Arc, RwLock};
use thiserror::Error;

/// Environment variable overriding the font directory consumed by
/// [`FontLibrary::from_env`].
pub const FONT_DIR_ENV: &str = "EASEL_FONT_DIR";

/// Substitution candidates for families that are not installed, matched
/// case-insensitively by substring in either direction.
pub static EMAIL_SAFE_FONTS: Lazy<Vec<&'static str>> = Lazy::new(|| {
    vec![
        "Arial",
        "Arial Black",
        "Helvetica",
        "Verdana",
        "Tahoma",
        "Trebuchet MS",
        "Times New Roman",
        "Times",
        "Georgia",
        "Courier New",
        "Courier",
    ]
});

/// Per-character advance estimate (in em) used when no face is loadable.
const FALLBACK_ADVANCE: f64 = 0.6;

#[derive(Error, Debug)]
pub enum FontError {
    #[error("no face found for family '{family}' at weight {weight}")]
    NotFound { family: String, weight: u16 },
}

/// Key for the resolution cache.
#[derive(Debug, Clone, Hash, PartialEq, Eq)]
struct FontCacheKey {
    family: String,
    weight: u16,
}

impl FontCacheKey {
    fn new(family: &str, weight: FontWeight) -> Self {
        Self {
            family: family.to_lowercase(),
            weight: weight.numeric_value(),
        }
    }
}

/// The outcome of a font resolution.
///
/// `data` is `None` when no face could be found or loaded; backends must
/// then continue with their built-in default face rather than aborting.
#[derive(Debug)]
pub struct ResolvedFont {
    requested_family: String,
    matched_family: Option<String>,
    postscript_name: Option<String>,
    weight: FontWeight,
    data: Option<(Arc<Vec<u8>>, u32)>,
}

impl ResolvedFont {
    fn fallback(family: &str, weight: FontWeight) -> Self {
        Self {
            requested_family: family.to_string(),
            matched_family: None,
            postscript_name: None,
            weight,
            data: None,
        }
    }

    pub fn requested_family(&self) -> &str {
        &self.requested_family
    }

    /// The family name a backend should emit: the matched face's family
    /// when one was found, otherwise the requested name.
    pub fn family_name(&self) -> &str {
        self.matched_family.as_deref().unwrap_or(&self.requested_family)
    }

    pub fn postscript_name(&self) -> Option<&str> {
        self.postscript_name.as_deref()
    }

    pub fn weight(&self) -> FontWeight {
        self.weight
    }

    pub fn has_face(&self) -> bool {
        self.data.is_some()
    }

    /// Creates a lightweight face view over the font data.
    /// Cheap (header parse only), so it is done per use instead of
    /// holding a self-referential parsed face.
    pub fn as_face(&self) -> Option<ttf_parser::Face<'_>> {
        let (data, index) = self.data.as_ref()?;
        ttf_parser::Face::parse(data.as_slice(), *index).ok()
    }

    /// Measured advance width of `text` at `size` device units.
    ///
    /// Uses per-codepoint horizontal advances from the face; without a
    /// face, a deterministic per-character estimate is used so layout
    /// stays stable across environments.
    pub fn measure(&self, text: &str, size: f64) -> f64 {
        match self.as_face() {
            Some(face) => advance_em(&face, text) * size,
            None => text.chars().count() as f64 * FALLBACK_ADVANCE * size,
        }
    }
}

/// Sum of advance widths for `text`, in em units.
fn advance_em(face: &ttf_parser::Face, text: &str) -> f64 {
    let upem = face.units_per_em() as f64;
    if upem <= 0.0 {
        return text.chars().count() as f64 * FALLBACK_ADVANCE;
    }
    text.chars()
        .map(|c| match face.glyph_index(c) {
            Some(gid) => face.glyph_hor_advance(gid).unwrap_or(0) as f64 / upem,
            None => FALLBACK_ADVANCE,
        })
        .sum()
}

/// Shared font database plus resolution cache.
///
/// Lookups vastly outnumber insertions, so both the database and the
/// cache sit behind `RwLock`s; concurrent renders share one library.
#[derive(Clone)]
pub struct FontLibrary {
    db: Arc<RwLock<fontdb::Database>>,
    cache: Arc<RwLock<HashMap<FontCacheKey, Arc<ResolvedFont>>>>,
}

impl Default for FontLibrary {
    fn default() -> Self {
        Self::new()
    }
}

impl FontLibrary {
    /// Creates an empty library. Every resolution will fall back to the
    /// faceless default until fonts are loaded.
    pub fn new() -> Self {
        Self {
            db: Arc::new(RwLock::new(fontdb::Database::new())),
            cache: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Loads system fonts into the database.
    pub fn with_system_fonts(self) -> Self {
        if let Ok(mut db) = self.db.write() {
            db.load_system_fonts();
            log::debug!("[FONTS] loaded {} system face(s)", db.len());
        }
        self
    }

    /// Loads every font file under `path` into the database.
    pub fn with_font_dir<P: AsRef<Path>>(self, path: P) -> Self {
        if let Ok(mut db) = self.db.write() {
            db.load_fonts_dir(path.as_ref());
            log::debug!(
                "[FONTS] loaded fonts from {} ({} face(s) total)",
                path.as_ref().display(),
                db.len()
            );
        }
        self
    }

    /// Builds a library from the environment: the `EASEL_FONT_DIR`
    /// override when set, system fonts otherwise.
    pub fn from_env() -> Self {
        match std::env::var(FONT_DIR_ENV) {
            Ok(dir) if !dir.is_empty() => Self::new().with_font_dir(dir),
            _ => Self::new().with_system_fonts(),
        }
    }

    /// Adds raw font data directly (used by tests and embedders).
    pub fn add_font_data(&self, data: Vec<u8>) {
        if let Ok(mut db) = self.db.write() {
            db.load_font_data(data);
        }
    }

    /// Number of faces currently in the database.
    pub fn face_count(&self) -> usize {
        self.db.read().map(|db| db.len()).unwrap_or(0)
    }

    /// Resolves a family/weight pair through the fallback chain.
    ///
    /// Infallible by design: the worst case is a faceless fallback that
    /// backends render with their own defaults. Results (including
    /// fallbacks) are cached.
    pub fn resolve(&self, family: &str, weight: FontWeight) -> Arc<ResolvedFont> {
        let key = FontCacheKey::new(family, weight);
        if let Ok(cache) = self.cache.read()
            && let Some(found) = cache.get(&key)
        {
            return found.clone();
        }

        let resolved = match self.load(family, weight) {
            Ok(found) => found,
            Err(e) => {
                log::warn!("[FONTS] {}, continuing with built-in default", e);
                Arc::new(ResolvedFont::fallback(family, weight))
            }
        };
        if let Ok(mut cache) = self.cache.write() {
            cache.insert(key, resolved.clone());
        }
        resolved
    }

    /// Fallible resolution through the same chain, for callers that need
    /// to know whether a real face was found.
    pub fn load(&self, family: &str, weight: FontWeight) -> Result<Arc<ResolvedFont>, FontError> {
        self.resolve_uncached(family, weight)
            .map(Arc::new)
            .ok_or_else(|| FontError::NotFound {
                family: family.to_string(),
                weight: weight.numeric_value(),
            })
    }

    /// Convenience: resolve then measure.
    pub fn measure(&self, family: &str, weight: FontWeight, text: &str, size: f64) -> f64 {
        self.resolve(family, weight).measure(text, size)
    }

    fn resolve_uncached(&self, family: &str, weight: FontWeight) -> Option<ResolvedFont> {
        // 1) the requested family (generic names map to fontdb generics)
        if let Some(found) = self.query_family(family, family, weight) {
            return Some(found);
        }

        // 2) email-safe substitute by case-insensitive substring match
        if let Some(substitute) = email_safe_substitute(family) {
            log::debug!(
                "[FONTS] '{}' not found, trying email-safe substitute '{}'",
                family,
                substitute
            );
            if let Some(found) = self.query_family(family, substitute, weight) {
                return Some(found);
            }
        }

        // 3) generic sans-serif
        self.query(family, &[fontdb::Family::SansSerif], weight)
    }

    fn query_family(&self, requested: &str, name: &str, weight: FontWeight) -> Option<ResolvedFont> {
        let family = match generic_family(name) {
            Some(generic) => generic,
            None => fontdb::Family::Name(name),
        };
        self.query(requested, &[family], weight)
    }

    fn query(
        &self,
        requested: &str,
        families: &[fontdb::Family],
        weight: FontWeight,
    ) -> Option<ResolvedFont> {
        let db = self.db.read().ok()?;
        let query = fontdb::Query {
            families,
            weight: fontdb::Weight(weight.numeric_value()),
            stretch: fontdb::Stretch::Normal,
            style: fontdb::Style::Normal,
        };
        let id = db.query(&query)?;
        let face = db.face(id)?;

        let matched_family = face.families.first().map(|(name, _)| name.clone());
        let postscript_name = Some(face.post_script_name.clone());
        let index = face.index;

        let data = match &face.source {
            fontdb::Source::Binary(data) => Arc::new(data.as_ref().as_ref().to_vec()),
            fontdb::Source::File(path) => match std::fs::read(path) {
                Ok(bytes) => Arc::new(bytes),
                Err(e) => {
                    // Non-fatal per the resolver contract: report and let
                    // the caller continue down the chain.
                    log::warn!(
                        "[FONTS] failed to read {}: {} (face skipped)",
                        path.display(),
                        e
                    );
                    return None;
                }
            },
            _ => return None,
        };

        Some(ResolvedFont {
            requested_family: requested.to_string(),
            matched_family,
            postscript_name,
            weight,
            data: Some((data, index)),
        })
    }
}

/// Maps the deck's generic family names onto fontdb's generic families.
fn generic_family(name: &str) -> Option<fontdb::Family<'static>> {
    match name.to_ascii_lowercase().as_str() {
        "sans" | "sans-serif" => Some(fontdb::Family::SansSerif),
        "serif" => Some(fontdb::Family::Serif),
        "mono" | "monospace" => Some(fontdb::Family::Monospace),
        _ => None,
    }
}

/// Closest email-safe family by case-insensitive substring match in
/// either direction.
pub fn email_safe_substitute(family: &str) -> Option<&'static str> {
    let needle = family.to_ascii_lowercase();
    if needle.is_empty() {
        return None;
    }
    EMAIL_SAFE_FONTS.iter().copied().find(|candidate| {
        let c = candidate.to_ascii_lowercase();
        c.contains(&needle) || needle.contains(&c)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_library_resolves_to_fallback() {
        let fonts = FontLibrary::new();
        let resolved = fonts.resolve("Nonexistent", FontWeight::Regular);
        assert!(!resolved.has_face());
        assert_eq!(resolved.family_name(), "Nonexistent");
    }

    #[test]
    fn test_fallback_measure_is_deterministic() {
        let fonts = FontLibrary::new();
        let resolved = fonts.resolve("sans", FontWeight::Regular);
        let w = resolved.measure("hello", 10.0);
        assert!((w - 5.0 * 0.6 * 10.0).abs() < 1e-9);
    }

    #[test]
    fn test_load_reports_not_found() {
        let fonts = FontLibrary::new();
        let err = fonts.load("Nonexistent", FontWeight::Regular).unwrap_err();
        assert!(matches!(err, FontError::NotFound { .. }));
    }

    #[test]
    fn test_resolution_is_cached() {
        let fonts = FontLibrary::new();
        let first = fonts.resolve("sans", FontWeight::Regular);
        let second = fonts.resolve("SANS", FontWeight::Regular);
        assert!(Arc::ptr_eq(&first, &second));
    }

    #[test]
    fn test_email_safe_substitution_matches_substring() {
        assert_eq!(email_safe_substitute("helvetica neue"), Some("Helvetica"));
        assert_eq!(email_safe_substitute("arial"), Some("Arial"));
        assert_eq!(email_safe_substitute("Courier"), Some("Courier New"));
        assert_eq!(email_safe_substitute("Zapfino"), None);
    }

    #[test]
    fn test_weight_is_part_of_cache_key() {
        let fonts = FontLibrary::new();
        let regular = fonts.resolve("sans", FontWeight::Regular);
        let bold = fonts.resolve("sans", FontWeight::Bold);
        assert!(!Arc::ptr_eq(&regular, &bold));
        assert_eq!(bold.weight(), FontWeight::Bold);
    }
}
