//! Wire records of the bibliographic record source
//!
//! Every field that the source may omit or null out is optional here;
//! deciding what to do with a missing field is the ingestion stage's job.

use serde::{Deserialize, Serialize};

/// Title used for works the source returns without one
pub const MISSING_TITLE: &str = "N/A";

/// A single work as returned by the record source
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawWork {
    /// Source-side work ID
    #[serde(default)]
    pub id: Option<String>,

    /// Work title; absent or null for some records
    #[serde(default)]
    pub title: Option<String>,

    /// Authorship entries in listed order
    #[serde(default)]
    pub authorships: Vec<RawAuthorship>,
}

/// One authorship entry of a work
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawAuthorship {
    /// Author data; absent for unresolved authorships
    #[serde(default)]
    pub author: Option<RawAuthor>,
}

/// Author data attached to an authorship
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawAuthor {
    /// Source-side author ID
    #[serde(default)]
    pub id: Option<String>,

    /// Human-readable name; the deduplication key
    #[serde(default)]
    pub display_name: Option<String>,
}

/// One page of the works listing endpoint
#[derive(Debug, Clone, Default, Deserialize)]
pub struct WorksPage {
    #[serde(default)]
    pub meta: PageMeta,

    #[serde(default)]
    pub results: Vec<RawWork>,
}

/// Pagination metadata of a works page
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PageMeta {
    /// Total matching works
    #[serde(default)]
    pub count: Option<u64>,

    /// Cursor for the following page; absent on the last page
    #[serde(default)]
    pub next_cursor: Option<String>,
}

impl RawWork {
    /// Build a work from a title and author names (replay files and tests)
    pub fn new(title: impl Into<String>, authors: &[&str]) -> Self {
        Self {
            id: None,
            title: Some(title.into()),
            authorships: authors.iter().map(|name| RawAuthorship::named(name)).collect(),
        }
    }

    /// Title with the missing-title placeholder applied
    pub fn title_or_placeholder(&self) -> &str {
        self.title.as_deref().unwrap_or(MISSING_TITLE)
    }
}

impl RawAuthorship {
    /// Authorship with a resolved author carrying only a display name
    pub fn named(display_name: &str) -> Self {
        Self {
            author: Some(RawAuthor {
                id: None,
                display_name: Some(display_name.to_string()),
            }),
        }
    }

    /// Authorship without author data
    pub fn unresolved() -> Self {
        Self { author: None }
    }

    /// Author display name and source ID, if the entry identifies an author
    pub fn identified_author(&self) -> Option<(&str, Option<&str>)> {
        let author = self.author.as_ref()?;
        let name = author.display_name.as_deref()?;
        Some((name, author.id.as_deref()))
    }
}
