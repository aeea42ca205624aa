//! Reference classification: title/URL separation plus an ordered table of
//! (domain patterns → type) rules evaluated first-match-wins. Pure functions
//! of the input and the static tables; malformed input classifies as Unknown
//! instead of erroring.

use std::sync::OnceLock;

use regex::Regex;

use refgraph_common::{ClassifiedReference, ReferenceType};

/// Substring identifying the podcast's own episode pages. Checked before
/// the external rules so episode URLs are never misclassified.
pub const EPISODE_URL_MARKER: &str = "b9.com.br/shows/naruhodo";

struct DomainRule {
    domains: &'static [&'static str],
    kind: ReferenceType,
}

/// External classification rules in priority order. Paper repositories come
/// before the `.gov` suffix rule so e.g. ncbi.nlm.nih.gov lands on
/// ScientificPaper.
const DOMAIN_RULES: &[DomainRule] = &[
    DomainRule {
        domains: &["youtube.com", "youtu.be", "vimeo.com"],
        kind: ReferenceType::Video,
    },
    DomainRule {
        domains: &[
            "doi.org",
            "sciencedirect.com",
            "springer.com",
            "ncbi.nlm.nih.gov",
            "jstor.org",
            "academia.edu",
            "arxiv.org",
            "nature.com",
            "frontiersin.org",
            "psycnet.apa.org",
            "scielo.br",
        ],
        kind: ReferenceType::ScientificPaper,
    },
    DomainRule {
        domains: &[
            "bbc.com",
            "bbc.co.uk",
            "cnn.com",
            "nytimes.com",
            "theguardian.com",
            "folha.uol.com.br",
            "g1.globo.com",
            "elpais.com",
        ],
        kind: ReferenceType::NewsArticle,
    },
    DomainRule {
        domains: &[
            "amazon.com",
            "amazon.com.br",
            "goodreads.com",
            "books.google",
            "isbn",
        ],
        kind: ReferenceType::Book,
    },
    DomainRule {
        domains: &[
            "twitter.com",
            "x.com",
            "facebook.com",
            "instagram.com",
            "linkedin.com",
            "tiktok.com",
        ],
        kind: ReferenceType::SocialMedia,
    },
];

fn url_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"https?://[^\s]+").expect("valid regex"))
}

fn slug_title_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"naruhodo-\d+-([^/?#]+)").expect("valid regex"))
}

/// Split a payload into (title, url). The first URL substring becomes the
/// URL; whatever text remains is the title. A payload with no URL is all
/// title. An empty title falls back to one derived from the URL slug.
pub fn split_title_url(payload: &str) -> (String, Option<String>) {
    match url_re().find(payload) {
        Some(m) => {
            let url = m.as_str().trim_end_matches('/').to_string();
            let mut title = String::with_capacity(payload.len());
            title.push_str(&payload[..m.start()]);
            title.push_str(&payload[m.end()..]);
            let title = title.trim().to_string();
            let title = if title.is_empty() {
                title_from_url(&url).unwrap_or_default()
            } else {
                title
            };
            (title, Some(url))
        }
        None => (payload.trim().to_string(), None),
    }
}

/// Derive a human-readable title from an episode URL slug:
/// `.../naruhodo-123-por-que-sonhamos/` → "Por Que Sonhamos".
pub fn title_from_url(url: &str) -> Option<String> {
    let caps = slug_title_re().captures(url)?;
    let words: Vec<String> = caps[1]
        .split('-')
        .filter(|w| !w.is_empty())
        .map(|w| {
            let mut chars = w.chars();
            match chars.next() {
                Some(c) => c.to_uppercase().collect::<String>() + chars.as_str(),
                None => String::new(),
            }
        })
        .collect();
    if words.is_empty() {
        None
    } else {
        Some(words.join(" "))
    }
}

/// Classify a URL against the ordered rule tables.
pub fn classify_url(url: &str) -> ReferenceType {
    let url_lower = url.to_lowercase();
    if url_lower.contains(EPISODE_URL_MARKER) {
        return ReferenceType::Episode;
    }
    for rule in DOMAIN_RULES {
        if rule.domains.iter().any(|d| url_lower.contains(d)) {
            return rule.kind;
        }
    }
    // Suffix rules last: broad, so every named domain gets first refusal.
    if url_lower.contains(".edu") {
        return ReferenceType::AcademicWebsite;
    }
    if url_lower.contains(".gov") {
        return ReferenceType::GovernmentWebsite;
    }
    ReferenceType::Unknown
}

/// Classify one raw (episode, payload) pair. Total: every input produces
/// exactly one classified reference with a type from the closed enumeration.
pub fn classify(episode: &str, payload: &str) -> ClassifiedReference {
    let (title, url) = split_title_url(payload);
    let kind = match &url {
        Some(u) => classify_url(u),
        None => ReferenceType::Unknown,
    };
    ClassifiedReference {
        episode: episode.to_string(),
        title,
        url,
        kind,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bare_url_splits_with_slug_title() {
        let (title, url) = split_title_url("https://b9.com.br/shows/naruhodo/naruhodo-10-por-que-sonhamos/");
        assert_eq!(url.as_deref(), Some("https://b9.com.br/shows/naruhodo/naruhodo-10-por-que-sonhamos"));
        assert_eq!(title, "Por Que Sonhamos");
    }

    #[test]
    fn title_with_embedded_url_splits_both_ways() {
        let (title, url) = split_title_url("Confira aqui: https://www.ncbi.nlm.nih.gov/pmc/articles/XYZ");
        assert_eq!(title, "Confira aqui:");
        assert_eq!(url.as_deref(), Some("https://www.ncbi.nlm.nih.gov/pmc/articles/XYZ"));
    }

    #[test]
    fn free_text_is_all_title() {
        let (title, url) = split_title_url("Pensar, Rápido e Devagar - Daniel Kahneman");
        assert_eq!(title, "Pensar, Rápido e Devagar - Daniel Kahneman");
        assert_eq!(url, None);
    }

    #[test]
    fn empty_payload_classifies_unknown() {
        let c = classify("https://b9.com.br/shows/naruhodo/naruhodo-10/", "");
        assert_eq!(c.kind, ReferenceType::Unknown);
        assert_eq!(c.title, "");
        assert_eq!(c.url, None);
    }

    #[test]
    fn episode_url_wins_over_every_external_rule() {
        assert_eq!(
            classify_url("https://b9.com.br/shows/naruhodo/naruhodo-05/"),
            ReferenceType::Episode
        );
    }

    #[test]
    fn domain_rules_map_to_expected_types() {
        assert_eq!(classify_url("https://www.youtube.com/watch?v=abc"), ReferenceType::Video);
        assert_eq!(classify_url("https://youtu.be/abc"), ReferenceType::Video);
        assert_eq!(classify_url("https://doi.org/10.1000/xyz"), ReferenceType::ScientificPaper);
        assert_eq!(classify_url("https://g1.globo.com/ciencia/noticia.html"), ReferenceType::NewsArticle);
        assert_eq!(classify_url("https://www.amazon.com.br/dp/123"), ReferenceType::Book);
        assert_eq!(classify_url("https://twitter.com/naruhodopodcast"), ReferenceType::SocialMedia);
        assert_eq!(classify_url("https://www.mit.edu/research"), ReferenceType::AcademicWebsite);
        assert_eq!(classify_url("https://www.cdc.gov/page"), ReferenceType::GovernmentWebsite);
        assert_eq!(classify_url("https://random.example.org/"), ReferenceType::Unknown);
    }

    #[test]
    fn paper_repositories_beat_the_gov_suffix() {
        // ncbi.nlm.nih.gov contains ".gov" but is a paper repository.
        assert_eq!(
            classify_url("https://www.ncbi.nlm.nih.gov/pmc/articles/XYZ"),
            ReferenceType::ScientificPaper
        );
    }

    #[test]
    fn every_classification_is_a_defined_type() {
        let payloads = [
            "",
            "just text",
            "https://unknown.site/x",
            "==> mangled ==> https://youtu.be/q",
            "https://b9.com.br/shows/naruhodo/naruhodo-99-teste/",
        ];
        for p in payloads {
            let c = classify("ep", p);
            assert!(ReferenceType::from_id(c.kind.id()).is_some());
        }
    }
}
