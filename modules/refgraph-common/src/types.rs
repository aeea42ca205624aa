use serde::{Deserialize, Serialize};

// --- Reference types ---

/// Closed classification of references. Ids are fixed and seeded once;
/// they appear verbatim in the external relation and in the graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReferenceType {
    Video,
    ScientificPaper,
    NewsArticle,
    Book,
    SocialMedia,
    AcademicWebsite,
    GovernmentWebsite,
    Episode,
    Unknown,
}

impl ReferenceType {
    pub const ALL: [ReferenceType; 9] = [
        ReferenceType::Video,
        ReferenceType::ScientificPaper,
        ReferenceType::NewsArticle,
        ReferenceType::Book,
        ReferenceType::SocialMedia,
        ReferenceType::AcademicWebsite,
        ReferenceType::GovernmentWebsite,
        ReferenceType::Episode,
        ReferenceType::Unknown,
    ];

    pub fn id(self) -> i64 {
        match self {
            ReferenceType::Video => 1,
            ReferenceType::ScientificPaper => 2,
            ReferenceType::NewsArticle => 3,
            ReferenceType::Book => 4,
            ReferenceType::SocialMedia => 5,
            ReferenceType::AcademicWebsite => 6,
            ReferenceType::GovernmentWebsite => 7,
            ReferenceType::Episode => 8,
            ReferenceType::Unknown => 9,
        }
    }

    pub fn from_id(id: i64) -> Option<Self> {
        Self::ALL.iter().copied().find(|t| t.id() == id)
    }

    pub fn name(self) -> &'static str {
        match self {
            ReferenceType::Video => "Video",
            ReferenceType::ScientificPaper => "Scientific Paper",
            ReferenceType::NewsArticle => "News Article",
            ReferenceType::Book => "Book",
            ReferenceType::SocialMedia => "Social Media",
            ReferenceType::AcademicWebsite => "Academic Website",
            ReferenceType::GovernmentWebsite => "Government Website",
            ReferenceType::Episode => "Episode",
            ReferenceType::Unknown => "Unknown",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            ReferenceType::Video => "Video hosted on a streaming platform",
            ReferenceType::ScientificPaper => "Peer-reviewed paper or preprint repository entry",
            ReferenceType::NewsArticle => "Article published by a news outlet",
            ReferenceType::Book => "Book or book-seller listing",
            ReferenceType::SocialMedia => "Post or profile on a social network",
            ReferenceType::AcademicWebsite => "Page on a university or academic domain",
            ReferenceType::GovernmentWebsite => "Page on a government domain",
            ReferenceType::Episode => "Another episode of the podcast",
            ReferenceType::Unknown => "Reference that matched no known pattern",
        }
    }
}

impl std::fmt::Display for ReferenceType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// One row of the fixed `reference_types.csv` seed table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReferenceTypeRow {
    pub type_id: i64,
    pub type_name: String,
    pub description: String,
}

/// The seeded nine-row reference type table, in id order.
pub fn reference_type_rows() -> Vec<ReferenceTypeRow> {
    ReferenceType::ALL
        .iter()
        .map(|t| ReferenceTypeRow {
            type_id: t.id(),
            type_name: t.name().to_string(),
            description: t.description().to_string(),
        })
        .collect()
}

// --- Records ---

/// One raw scraped row. Consumed entirely during classification.
/// Scraper exports capitalize the column headers; accept both spellings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawReference {
    #[serde(alias = "Episode")]
    pub episode: String,
    #[serde(alias = "Reference")]
    pub reference: String,
}

/// Canonical episode entity. One per distinct canonical URL; the title is
/// the first non-empty title observed for that URL. Immutable once the
/// resolver is built.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Episode {
    pub episode_number: i64,
    pub episode_title: String,
    pub episode_url: String,
}

/// Output of the classifier: exactly one per raw row, never an error.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassifiedReference {
    /// Source episode string as scraped (URL or freeform label).
    pub episode: String,
    pub title: String,
    pub url: Option<String>,
    pub kind: ReferenceType,
}

/// One row of the episode-to-episode relation. Both episode numbers are
/// guaranteed to exist in the Episode set. Field order is the sort order.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EpisodeReference {
    pub source_episode_number: i64,
    pub source_episode_title: String,
    pub referenced_episode_number: i64,
    pub referenced_episode_title: String,
}

/// One row of the external relation. `reference_url` is a deterministic
/// `unknown_reference_url_<n>` placeholder when the source had none, so
/// re-imports key reference nodes identically. Field order is the sort order.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ExternalReference {
    pub episode_number: i64,
    pub episode_title: String,
    pub reference_title: String,
    pub reference_url: Option<String>,
    pub reference_type_id: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn type_ids_are_fixed_and_bijective() {
        for t in ReferenceType::ALL {
            assert_eq!(ReferenceType::from_id(t.id()), Some(t));
        }
        assert_eq!(ReferenceType::Episode.id(), 8);
        assert_eq!(ReferenceType::Unknown.id(), 9);
        assert_eq!(ReferenceType::from_id(0), None);
        assert_eq!(ReferenceType::from_id(10), None);
    }

    #[test]
    fn seed_table_has_nine_rows_in_id_order() {
        let rows = reference_type_rows();
        assert_eq!(rows.len(), 9);
        for (i, row) in rows.iter().enumerate() {
            assert_eq!(row.type_id, i as i64 + 1);
            assert!(!row.description.is_empty());
        }
    }
}
