//! Team-name helpers for locating a matchup in free-text market titles.

use crate::config::TitleRewrite;
use crate::utils::fuzzy::partial_ratio;

/// Lower-case a market title, apply the rewrites in order, trim.
pub fn normalize_title(title: &str, rewrites: &[TitleRewrite]) -> String {
    let mut normalized = title.to_lowercase();
    for rewrite in rewrites {
        normalized = normalized.replace(&rewrite.from, &rewrite.to);
    }
    normalized.trim().to_string()
}

/// Spellings a market might use for a team name.
///
/// "Los Angeles Lakers" -> `los angeles lakers`, `losangeleslakers`,
/// `los-angeles-lakers`, `los_angeles_lakers`.
pub fn name_variants(name: &str) -> Vec<String> {
    let lower = name.to_lowercase();
    vec![
        lower.clone(),
        lower.replace(' ', ""),
        lower.replace(' ', "-"),
        lower.replace(' ', "_"),
    ]
}

/// Highest partial-ratio of any variant against `text`.
pub fn best_variant_score(variants: &[String], text: &str) -> u8 {
    variants
        .iter()
        .map(|variant| partial_ratio(variant, text))
        .max()
        .unwrap_or(0)
}
