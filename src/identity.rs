//! Team identity resolution.
//!
//! Scraped team names arrive in many spellings ("C.D. LAS FLORES SEVILLA
//! MORADO", "Las Flores Morado", "CD LAS FLORES CADETE 2025 MORADO"...). The
//! resolver folds every spelling of one club squad onto a single
//! [`TeamIdentity`]; anything that is not the club passes through as an
//! opponent display name.
//!
//! Resolution runs these steps in order:
//!
//! 1. fold diacritics, uppercase, split on anything that is not a letter or digit;
//! 2. drop noise phrases (legal form, city, age category) and season years;
//! 3. detect and drop the youth-program marker;
//! 4. detect the colour with [`ClubProfile::color_rules`], **first rule in list
//!    order wins** when several colour words are present;
//! 5. if the base-name phrase is still present, build the club identity,
//!    otherwise keep the whitespace-normalised raw text as an opponent.
//!
//! Club text without any colour word resolves to [`VariantColor::None`]. That
//! is the expected spelling when a single club squad plays a competition.

use serde::{Deserialize, Serialize};

use crate::model::team::{TeamIdentity, VariantColor};
use crate::text::{fold_diacritics, normalize_ws};

/// Colour detection rule: any of `tokens` present selects `color`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColorRule {
    pub color: VariantColor,
    pub tokens: Vec<String>,
}

impl ColorRule {
    pub fn new(color: VariantColor, tokens: &[&str]) -> Self {
        Self { color, tokens: tokens.iter().map(|t| t.to_string()).collect() }
    }

    /// True when one of the rule's words appears among `words` (already folded).
    pub fn matches(&self, words: &[String]) -> bool {
        self.tokens.iter().any(|t| {
            let t = fold_key(t);
            words.iter().any(|w| *w == t)
        })
    }
}

/// Immutable description of the operating club and the noise found around
/// its name in upstream listings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClubProfile {
    /// Base name phrase identifying the club, also its canonical name.
    pub base_name: String,
    /// Word marking the club's youth program squads.
    pub youth_marker: String,
    /// Phrases removed before detection (matched word by word).
    pub noise_phrases: Vec<String>,
    /// Drop standalone `20xx` season years.
    pub strip_season_years: bool,
    /// Colour rules in priority order.
    pub color_rules: Vec<ColorRule>,
    /// Display name used when the upstream cell is empty.
    pub unknown_team_label: String,
}

impl Default for ClubProfile {
    fn default() -> Self {
        let noise = [
            "C D", "CD", "CLUB", "VOLEIBOL", "SEVILLA", "JUVENIL", "JUVENOL", "CADETE", "INFANTIL", "ALEVIN",
            "BENJAMIN", "JUNIOR", "SENIOR", "SUB", "FEMENINO", "MASCULINO",
        ];
        Self {
            base_name: "LAS FLORES".to_string(),
            youth_marker: "EVB".to_string(),
            noise_phrases: noise.iter().map(|s| s.to_string()).collect(),
            strip_season_years: true,
            color_rules: vec![
                ColorRule::new(VariantColor::Yellow, &["AMARILLO", "AMARILLA", "AMARILLOS", "AMARILLAS"]),
                ColorRule::new(VariantColor::Sand, &["ALBERO"]),
                ColorRule::new(VariantColor::Purple, &["MORADO", "MORADA", "MORADOS", "MORADAS"]),
                ColorRule::new(VariantColor::Magenta, &["PURPURA"]),
            ],
            unknown_team_label: "POR CONFIRMAR".to_string(),
        }
    }
}

/// Resolves raw team-name text into identities using one [`ClubProfile`].
#[derive(Debug, Clone)]
pub struct Resolver {
    profile: ClubProfile,
    base_words: Vec<String>,
    youth_word: String,
    noise: Vec<Vec<String>>,
}

impl Resolver {
    pub fn new(profile: ClubProfile) -> Self {
        let base_words = words(&profile.base_name);
        let youth_word = fold_key(&profile.youth_marker);
        let mut noise: Vec<Vec<String>> =
            profile.noise_phrases.iter().map(|p| words(p)).filter(|w| !w.is_empty()).collect();
        // longest phrase first so "C D" is not left half-stripped by a shorter entry
        noise.sort_by(|a, b| b.len().cmp(&a.len()));
        Self { profile, base_words, youth_word, noise }
    }

    pub fn profile(&self) -> &ClubProfile {
        &self.profile
    }

    /// Resolve one raw name. Total: never fails, never yields an empty name.
    pub fn resolve(&self, raw: &str) -> TeamIdentity {
        let cleaned = self.strip_noise(words(raw));

        let is_youth = !self.youth_word.is_empty() && cleaned.iter().any(|w| *w == self.youth_word);
        let color = self.detect_color(&cleaned);

        if !self.base_words.is_empty() && contains_phrase(&cleaned, &self.base_words) {
            let canonical = if is_youth {
                format!("{} {}", self.profile.youth_marker.trim(), self.profile.base_name.trim())
            } else {
                self.profile.base_name.trim().to_string()
            };
            return TeamIdentity::club(canonical, color, is_youth);
        }

        let display = normalize_ws(raw);
        if display.is_empty() {
            return TeamIdentity::opponent(normalize_ws(&self.profile.unknown_team_label));
        }
        TeamIdentity::opponent(display)
    }

    /// Whether `display_name` (e.g. a standings row) names the same club squad as `identity`.
    pub fn is_own_team(&self, display_name: &str, identity: &TeamIdentity) -> bool {
        let resolved = self.resolve(display_name);
        resolved.is_club && identity.is_club && resolved.slug_key == identity.slug_key
    }

    fn strip_noise(&self, input: Vec<String>) -> Vec<String> {
        let mut out = Vec::with_capacity(input.len());
        let mut i = 0;
        'outer: while i < input.len() {
            for phrase in &self.noise {
                if input[i..].starts_with(phrase) {
                    i += phrase.len();
                    continue 'outer;
                }
            }
            if self.profile.strip_season_years && is_season_year(&input[i]) {
                i += 1;
                continue;
            }
            out.push(input[i].clone());
            i += 1;
        }
        out
    }

    fn detect_color(&self, cleaned: &[String]) -> VariantColor {
        self.profile
            .color_rules
            .iter()
            .find(|rule| rule.matches(cleaned))
            .map(|rule| rule.color)
            .unwrap_or(VariantColor::None)
    }
}

impl Default for Resolver {
    fn default() -> Self {
        Self::new(ClubProfile::default())
    }
}

fn fold_key(s: &str) -> String {
    fold_diacritics(s.trim()).to_uppercase()
}

/// Folded, uppercased words; punctuation acts as a separator.
fn words(s: &str) -> Vec<String> {
    fold_key(s)
        .split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
        .map(str::to_string)
        .collect()
}

fn contains_phrase(haystack: &[String], phrase: &[String]) -> bool {
    haystack.windows(phrase.len()).any(|w| w == phrase)
}

fn is_season_year(word: &str) -> bool {
    word.len() == 4 && word.starts_with("20") && word.chars().all(|c| c.is_ascii_digit())
}
