//! Author registry and work index
//!
//! Deduplicates author display names into dense integer identities and maps
//! each work title to the ordered set of its authors. Both are filled in the
//! same pass over the records.
//!
//! Identity is exact display-name equality. Two people sharing a name are
//! one identity; there is no name disambiguation.
//!
//! Titles are not unique: when two works share an identical title the later
//! one replaces the earlier entry in the work index (keeping its position),
//! while the author registry still lists the title under both author sets.

use collabnet_common::records::{RawWork, MISSING_TITLE};
use collabnet_common::sink::{AuthorWorkRow, WorkRow};
use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::collections::HashMap;
use std::fmt;
use tracing::trace;

/// Dense author identifier, assigned from 0 in observation order
pub type AuthorId = u64;

/// Author display name; the identity key of the registry
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DisplayName(String);

impl DisplayName {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for DisplayName {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DisplayName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Work title; the key of the work index (last writer wins on collision)
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WorkTitle(String);

impl WorkTitle {
    pub fn new(title: impl Into<String>) -> Self {
        Self(title.into())
    }

    /// Title of a raw work, `"N/A"` when the source omitted it
    pub fn of(work: &RawWork) -> Self {
        Self::new(work.title.as_deref().unwrap_or(MISSING_TITLE))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for WorkTitle {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for WorkTitle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A deduplicated author
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthorIdentity {
    /// Dense identifier
    pub id: AuthorId,

    /// Name this identity was created for
    pub display_name: DisplayName,

    /// First source-side author ID seen under this name (informational)
    pub external_id: Option<String>,

    /// Titles of the works this author appears on, in observation order
    pub works: Vec<WorkTitle>,
}

/// A work and the ordered set of its authors
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkRecord {
    pub title: WorkTitle,
    author_ids: Vec<AuthorId>,
}

impl WorkRecord {
    pub fn new(title: WorkTitle) -> Self {
        Self {
            title,
            author_ids: Vec::new(),
        }
    }

    /// Build a record from IDs; repeated IDs collapse to the first position
    pub fn with_authors(title: WorkTitle, ids: impl IntoIterator<Item = AuthorId>) -> Self {
        let mut record = Self::new(title);
        for id in ids {
            record.insert_author(id);
        }
        record
    }

    /// Add an author; returns false if already present
    pub fn insert_author(&mut self, id: AuthorId) -> bool {
        if self.author_ids.contains(&id) {
            return false;
        }
        self.author_ids.push(id);
        true
    }

    /// Authors in first-listed order, without duplicates
    pub fn author_ids(&self) -> &[AuthorId] {
        &self.author_ids
    }

    pub fn contains(&self, id: AuthorId) -> bool {
        self.author_ids.contains(&id)
    }
}

/// Outcome of observing one authorship entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthorObservation {
    /// First time this name was seen; a new identity was created
    New(AuthorId),
    /// Known name, first listing on this work
    Known(AuthorId),
    /// Name listed again on the same work; nothing changed
    Repeated(AuthorId),
}

impl AuthorObservation {
    pub fn id(&self) -> AuthorId {
        match *self {
            AuthorObservation::New(id)
            | AuthorObservation::Known(id)
            | AuthorObservation::Repeated(id) => id,
        }
    }
}

/// Display-name keyed author registry
#[derive(Debug, Default, Clone)]
pub struct AuthorRegistry {
    by_name: HashMap<DisplayName, AuthorId>,
    identities: Vec<AuthorIdentity>,
}

impl AuthorRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolve `name` and attach it to `work`
    ///
    /// Registering a new identity, adding it to the work's author set and
    /// appending the work title to the identity's work list happen together
    /// in this call; a repeated listing on the same work changes nothing.
    pub fn observe(
        &mut self,
        name: &str,
        external_id: Option<&str>,
        work: &mut WorkRecord,
    ) -> AuthorObservation {
        if let Some(&id) = self.by_name.get(name) {
            if !work.insert_author(id) {
                return AuthorObservation::Repeated(id);
            }
            self.identities[id as usize].works.push(work.title.clone());
            return AuthorObservation::Known(id);
        }

        let id = self.identities.len() as AuthorId;
        let display_name = DisplayName::new(name);
        work.insert_author(id);

        self.by_name.insert(display_name.clone(), id);
        self.identities.push(AuthorIdentity {
            id,
            display_name,
            external_id: external_id.map(str::to_string),
            works: vec![work.title.clone()],
        });

        trace!(author_id = id, name, "Registered author");
        AuthorObservation::New(id)
    }

    /// Look up an identity by exact display name
    pub fn lookup(&self, name: &str) -> Option<AuthorId> {
        self.by_name.get(name).copied()
    }

    /// Get an identity by ID
    pub fn get(&self, id: AuthorId) -> Option<&AuthorIdentity> {
        self.identities.get(id as usize)
    }

    /// Number of distinct identities
    pub fn len(&self) -> usize {
        self.identities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.identities.is_empty()
    }

    /// Identities in ID order
    pub fn iter(&self) -> impl Iterator<Item = &AuthorIdentity> {
        self.identities.iter()
    }

    /// One row per (author, work) membership, in ID then observation order
    pub fn author_rows(&self) -> impl Iterator<Item = AuthorWorkRow<'_>> {
        self.identities.iter().flat_map(|identity| {
            identity.works.iter().map(move |title| AuthorWorkRow {
                author_id: identity.id,
                display_name: identity.display_name.as_str(),
                work_title: title.as_str(),
            })
        })
    }
}

/// Title keyed index of work records
#[derive(Debug, Default, Clone)]
pub struct WorkIndex {
    records: Vec<WorkRecord>,
    by_title: HashMap<WorkTitle, usize>,
    overwritten: usize,
}

impl WorkIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a record, replacing any record with the same title
    ///
    /// Returns the replaced record.
    pub fn insert(&mut self, record: WorkRecord) -> Option<WorkRecord> {
        match self.by_title.get(&record.title) {
            Some(&slot) => {
                self.overwritten += 1;
                Some(std::mem::replace(&mut self.records[slot], record))
            }
            None => {
                self.by_title.insert(record.title.clone(), self.records.len());
                self.records.push(record);
                None
            }
        }
    }

    /// Get the record currently stored under `title`
    pub fn get(&self, title: &str) -> Option<&WorkRecord> {
        self.by_title.get(title).map(|&slot| &self.records[slot])
    }

    /// Number of distinct titles
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// How many inserts replaced an existing title
    pub fn overwritten(&self) -> usize {
        self.overwritten
    }

    /// Records in first-insertion order of their titles
    pub fn iter(&self) -> impl Iterator<Item = &WorkRecord> {
        self.records.iter()
    }
}

/// Per-work ingestion counts
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct WorkObservation {
    pub new_authors: usize,
    pub skipped_authorships: usize,
}

/// Author registry and work index, filled together
#[derive(Debug, Default, Clone)]
pub struct Corpus {
    pub authors: AuthorRegistry,
    pub works: WorkIndex,
}

impl Corpus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register one raw work
    ///
    /// Authorship entries without an author, or whose author has no display
    /// name, are skipped and counted.
    pub fn observe_work(&mut self, raw: &RawWork) -> WorkObservation {
        let mut record = WorkRecord::new(WorkTitle::of(raw));
        let mut observation = WorkObservation::default();

        for authorship in &raw.authorships {
            match authorship.identified_author() {
                Some((name, external_id)) if !name.is_empty() => {
                    if let AuthorObservation::New(_) =
                        self.authors.observe(name, external_id, &mut record)
                    {
                        observation.new_authors += 1;
                    }
                }
                _ => observation.skipped_authorships += 1,
            }
        }

        self.works.insert(record);
        observation
    }

    /// Work table rows: author names per work, in index order
    pub fn work_rows(&self) -> impl Iterator<Item = WorkRow<'_>> {
        self.works.iter().map(|record| WorkRow {
            authors: record
                .author_ids()
                .iter()
                .filter_map(|&id| self.authors.get(id))
                .map(|identity| identity.display_name.as_str())
                .collect(),
            work_title: record.title.as_str(),
        })
    }
}
