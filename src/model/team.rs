use std::fmt;

use serde::{Deserialize, Serialize};

use crate::text::slugify;

/// Kit-colour variant distinguishing several club squads in one category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VariantColor {
    #[default]
    None,
    Purple,
    Yellow,
    Magenta,
    Sand,
}

impl VariantColor {
    /// Label used in display names (`LAS FLORES MORADO`).
    pub fn label(self) -> Option<&'static str> {
        match self {
            VariantColor::None => None,
            VariantColor::Purple => Some("MORADO"),
            VariantColor::Yellow => Some("AMARILLO"),
            VariantColor::Magenta => Some("PÚRPURA"),
            VariantColor::Sand => Some("ALBERO"),
        }
    }
}

/// Stable identity of a team as it appears across both upstream sources.
///
/// Club identities carry the canonical base name (with the youth-program
/// marker folded in when present) plus a colour; opponents carry their
/// display text verbatim and never a colour.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TeamIdentity {
    pub canonical_name: String,
    pub variant_color: VariantColor,
    pub is_youth_program: bool,
    /// True when this is one of the operating club's own squads.
    pub is_club: bool,
    pub slug_key: String,
}

impl TeamIdentity {
    pub fn club(canonical_name: impl Into<String>, variant_color: VariantColor, is_youth_program: bool) -> Self {
        let canonical_name = canonical_name.into();
        let slug_key = slug_for(&canonical_name, variant_color);
        Self { canonical_name, variant_color, is_youth_program, is_club: true, slug_key }
    }

    pub fn opponent(display_name: impl Into<String>) -> Self {
        let canonical_name = display_name.into();
        let slug_key = slug_for(&canonical_name, VariantColor::None);
        Self { canonical_name, variant_color: VariantColor::None, is_youth_program: false, is_club: false, slug_key }
    }

    /// Name shown in summaries and calendar titles.
    pub fn display_name(&self) -> String {
        match self.variant_color.label() {
            Some(label) => format!("{} {}", self.canonical_name, label),
            None => self.canonical_name.clone(),
        }
    }
}

impl fmt::Display for TeamIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.display_name())
    }
}

fn slug_for(canonical_name: &str, color: VariantColor) -> String {
    let display = match color.label() {
        Some(label) => format!("{} {}", canonical_name, label),
        None => canonical_name.to_string(),
    };
    let slug = slugify(&display, '_');
    if slug.is_empty() { "team".to_string() } else { slug }
}
