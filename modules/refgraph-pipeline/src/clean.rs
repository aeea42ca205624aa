//! Row-level cleaning applied before classification: scrape artifacts are
//! stripped and known cross-promotion noise is dropped. The noise filters
//! are data, not code, so they are testable on their own.

use refgraph_common::RawReference;
use tracing::info;

/// Substrings (lowercase) that mark a reference as cross-promotion noise.
const NOISE_REFERENCE_PATTERNS: &[&str] = &["podcast das #minas", "podcasts das #minas"];

/// Substrings (lowercase) that mark a source episode as a non-episode page.
const NOISE_EPISODE_PATTERNS: &[&str] = &["desafio naruhodo"];

/// Strip scrape artifacts from one cell: surrounding whitespace, the list
/// marker some transcripts prefix links with, and any trailing slash.
pub fn clean_text(text: &str) -> String {
    let t = text.trim();
    let t = t.strip_prefix("==>").unwrap_or(t);
    t.trim().trim_end_matches('/').to_string()
}

fn is_noise(row: &RawReference) -> bool {
    let reference = row.reference.to_lowercase();
    let episode = row.episode.to_lowercase();
    NOISE_REFERENCE_PATTERNS.iter().any(|p| reference.contains(p))
        || NOISE_EPISODE_PATTERNS.iter().any(|p| episode.contains(p))
}

/// Clean every row and drop the noise. Returns the surviving rows and the
/// number dropped.
pub fn clean_rows(rows: Vec<RawReference>) -> (Vec<RawReference>, usize) {
    let before = rows.len();
    let cleaned: Vec<RawReference> = rows
        .into_iter()
        .map(|r| RawReference {
            episode: clean_text(&r.episode),
            reference: clean_text(&r.reference),
        })
        .filter(|r| !is_noise(r))
        .collect();
    let dropped = before - cleaned.len();
    if dropped > 0 {
        info!(dropped, "Dropped noise rows during cleaning");
    }
    (cleaned, dropped)
}
