//! Episode identity resolution. Built in one full pass over every
//! episode-identifying string before normalization runs; immutable
//! afterwards and shared by reference with the downstream stages.

use std::collections::{HashMap, HashSet};
use std::sync::OnceLock;

use regex::Regex;
use url::Url;

use refgraph_common::Episode;
use tracing::{info, warn};

/// One episode-identifying string, already split into title/URL.
#[derive(Debug, Clone)]
pub struct EpisodeCandidate {
    pub title: String,
    pub url: Option<String>,
}

/// Canonical episode set plus lookups from any observed identifying string
/// to the stable numeric identifier.
pub struct EpisodeResolver {
    episodes: Vec<Episode>,
    by_url: HashMap<String, i64>,
    by_title: HashMap<String, i64>,
    ambiguous_titles: HashSet<String>,
    unresolved: usize,
}

fn slug_number_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"naruhodo-(\d+)").expect("valid regex"))
}

/// Extract the episode number embedded in the show's URL slug, if any.
pub fn episode_number_from_url(url: &str) -> Option<i64> {
    slug_number_re()
        .captures(url)
        .and_then(|c| c[1].parse().ok())
}

fn is_tracking_param(key: &str) -> bool {
    key.starts_with("utm_") || matches!(key, "fbclid" | "gclid" | "igshid" | "ref")
}

/// Canonical form of an episode URL: parsed, fragment dropped, tracking
/// query parameters stripped, no trailing slash. Unparseable strings fall
/// back to trimmed lowercase so grouping stays deterministic.
pub fn canonicalize_url(raw: &str) -> String {
    let trimmed = raw.trim().trim_end_matches('/');
    match Url::parse(trimmed) {
        Ok(mut u) => {
            u.set_fragment(None);
            let kept: Vec<(String, String)> = u
                .query_pairs()
                .filter(|(k, _)| !is_tracking_param(k))
                .map(|(k, v)| (k.into_owned(), v.into_owned()))
                .collect();
            if kept.is_empty() {
                u.set_query(None);
            } else {
                u.query_pairs_mut().clear().extend_pairs(kept);
            }
            u.to_string().trim_end_matches('/').to_string()
        }
        Err(_) => trimmed.to_lowercase(),
    }
}

fn normalize_title(title: &str) -> String {
    title.trim().to_lowercase()
}

struct UrlEntry {
    canonical: String,
    title: String,
    slug_number: Option<i64>,
}

impl EpisodeResolver {
    /// Build the canonical episode set. URL-bearing candidates are grouped
    /// by canonical URL first; title-only candidates then resolve solely by
    /// exact normalized-title match against the URL-derived set. Anything
    /// else stays unresolved and is counted, not failed.
    pub fn build(candidates: impl IntoIterator<Item = EpisodeCandidate>) -> Self {
        let mut entries: Vec<UrlEntry> = Vec::new();
        let mut index_of: HashMap<String, usize> = HashMap::new();
        let mut title_only: Vec<String> = Vec::new();

        for cand in candidates {
            match &cand.url {
                Some(raw) => {
                    let canonical = canonicalize_url(raw);
                    match index_of.get(&canonical) {
                        Some(&i) => {
                            // First non-empty title observed for a URL wins.
                            if entries[i].title.is_empty() && !cand.title.is_empty() {
                                entries[i].title = cand.title.clone();
                            }
                        }
                        None => {
                            index_of.insert(canonical.clone(), entries.len());
                            entries.push(UrlEntry {
                                slug_number: episode_number_from_url(&canonical),
                                canonical,
                                title: cand.title.clone(),
                            });
                        }
                    }
                }
                None => {
                    if !cand.title.is_empty() {
                        title_only.push(cand.title.clone());
                    }
                }
            }
        }

        // Assign identifiers: slug numbers are authoritative; URLs without
        // one get the next free number in first-appearance order.
        let mut by_url: HashMap<String, i64> = HashMap::new();
        let mut number_of_entry: Vec<Option<i64>> = vec![None; entries.len()];
        let mut used: HashMap<i64, usize> = HashMap::new();

        for (i, entry) in entries.iter().enumerate() {
            if let Some(n) = entry.slug_number {
                match used.get(&n) {
                    // Two distinct URLs with the same slug number are the
                    // same episode scraped under two addresses; the first
                    // URL stays canonical, the second becomes an alias.
                    Some(_) => {
                        warn!(number = n, url = entry.canonical.as_str(), "Duplicate slug number, aliasing URL");
                        by_url.insert(entry.canonical.clone(), n);
                    }
                    None => {
                        used.insert(n, i);
                        by_url.insert(entry.canonical.clone(), n);
                        number_of_entry[i] = Some(n);
                    }
                }
            }
        }

        let mut next = used.keys().max().copied().unwrap_or(0) + 1;
        for (i, entry) in entries.iter().enumerate() {
            if entry.slug_number.is_none() {
                by_url.insert(entry.canonical.clone(), next);
                number_of_entry[i] = Some(next);
                used.insert(next, i);
                next += 1;
            }
        }

        let mut episodes: Vec<Episode> = entries
            .iter()
            .enumerate()
            .filter_map(|(i, entry)| {
                number_of_entry[i].map(|n| Episode {
                    episode_number: n,
                    episode_title: entry.title.clone(),
                    episode_url: entry.canonical.clone(),
                })
            })
            .collect();
        episodes.sort_by_key(|e| e.episode_number);

        // Title lookup: exact normalized titles only, never ambiguous ones.
        let mut by_title: HashMap<String, i64> = HashMap::new();
        let mut ambiguous_titles: HashSet<String> = HashSet::new();
        for ep in &episodes {
            let key = normalize_title(&ep.episode_title);
            if key.is_empty() {
                continue;
            }
            match by_title.get(&key) {
                Some(&existing) if existing != ep.episode_number => {
                    ambiguous_titles.insert(key.clone());
                    by_title.remove(&key);
                }
                _ => {
                    if !ambiguous_titles.contains(&key) {
                        by_title.insert(key, ep.episode_number);
                    }
                }
            }
        }

        let unresolved = title_only
            .iter()
            .filter(|t| {
                let key = normalize_title(t);
                !by_title.contains_key(&key)
            })
            .count();

        info!(
            episodes = episodes.len(),
            ambiguous_titles = ambiguous_titles.len(),
            unresolved,
            "Episode resolver built"
        );

        Self {
            episodes,
            by_url,
            by_title,
            ambiguous_titles,
            unresolved,
        }
    }

    /// Resolve an identifying string: URL first, then exact title match.
    pub fn resolve(&self, title: &str, url: Option<&str>) -> Option<i64> {
        if let Some(u) = url {
            if let Some(&n) = self.by_url.get(&canonicalize_url(u)) {
                return Some(n);
            }
        }
        self.resolve_title(title)
    }

    /// Resolve by exact normalized title. Ambiguous titles never resolve.
    pub fn resolve_title(&self, title: &str) -> Option<i64> {
        let key = normalize_title(title);
        if key.is_empty() || self.ambiguous_titles.contains(&key) {
            return None;
        }
        self.by_title.get(&key).copied()
    }

    /// Canonical episode set, sorted by number.
    pub fn episodes(&self) -> &[Episode] {
        &self.episodes
    }

    pub fn title_of(&self, number: i64) -> Option<&str> {
        self.episodes
            .iter()
            .find(|e| e.episode_number == number)
            .map(|e| e.episode_title.as_str())
    }

    /// Title-only candidates that matched nothing. Data-quality signal.
    pub fn unresolved_candidates(&self) -> usize {
        self.unresolved
    }
}
