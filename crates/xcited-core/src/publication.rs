//! Publication records and the metadata-source boundary.
//!
//! Author and publication lookup is done by an external scholarly service.
//! The downloader only needs each record's title, optional year and optional
//! eprint URL, which a [`PublicationSource`] supplies. [`JsonFileSource`] reads
//! them from an exported publication list.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::MetadataError;

/// Length of a scholar profile identifier.
pub const AUTHOR_ID_LEN: usize = 12;

/// True when `id` is exactly 12 characters of `[A-Za-z0-9_-]`.
pub fn is_author_id(id: &str) -> bool {
    id.len() == AUTHOR_ID_LEN && id.chars().all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Publication {
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pub_year: Option<String>,
    /// Link to a downloadable PDF. Publications without one are skipped.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub eprint_url: Option<String>,
}

/// Year as written by exporters: a string ("2017") or a bare number.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum YearValue {
    Text(String),
    Number(u64),
}

impl From<YearValue> for String {
    fn from(v: YearValue) -> Self {
        match v {
            YearValue::Text(s) => s,
            YearValue::Number(n) => n.to_string(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct Bib {
    title: String,
    #[serde(default)]
    pub_year: Option<YearValue>,
}

/// Either a scholarly-style record (`bib` + `eprint_url`) or a flat one.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Record {
    Nested {
        bib: Bib,
        #[serde(default)]
        eprint_url: Option<String>,
    },
    Flat {
        title: String,
        #[serde(default)]
        pub_year: Option<YearValue>,
        #[serde(default)]
        eprint_url: Option<String>,
    },
}

impl From<Record> for Publication {
    fn from(r: Record) -> Self {
        match r {
            Record::Nested { bib, eprint_url } => Publication {
                title: bib.title,
                pub_year: bib.pub_year.map(String::from),
                eprint_url,
            },
            Record::Flat {
                title,
                pub_year,
                eprint_url,
            } => Publication {
                title,
                pub_year: pub_year.map(String::from),
                eprint_url,
            },
        }
    }
}

/// A bare array of records, or an author object holding `publications`.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Document {
    List(Vec<Record>),
    Author {
        #[serde(default)]
        scholar_id: Option<String>,
        #[serde(default)]
        name: Option<String>,
        #[serde(default)]
        affiliation: Option<String>,
        #[serde(default)]
        email_domain: Option<String>,
        #[serde(default)]
        interests: Vec<String>,
        #[serde(default)]
        citedby: Option<u64>,
        publications: Vec<Record>,
    },
}

/// Author details that came with the publication list. A bare list carries none.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AuthorProfile {
    /// Profile id recorded in the export, if any.
    pub scholar_id: Option<String>,
    pub name: Option<String>,
    pub affiliation: Option<String>,
    pub email_domain: Option<String>,
    pub interests: Vec<String>,
    pub citedby: Option<u64>,
    pub publications: Vec<Publication>,
}

impl AuthorProfile {
    /// `(key, value)` pairs for the fields that are present, in display order.
    pub fn info(&self) -> Vec<(&'static str, String)> {
        let mut out = Vec::new();
        if let Some(name) = &self.name {
            out.push(("name", name.clone()));
        }
        if let Some(affiliation) = &self.affiliation {
            out.push(("affiliation", affiliation.clone()));
        }
        if let Some(domain) = &self.email_domain {
            out.push(("email_domain", domain.clone()));
        }
        if !self.interests.is_empty() {
            out.push(("interests", self.interests.join(", ")));
        }
        if let Some(citedby) = self.citedby {
            out.push(("citedby", citedby.to_string()));
        }
        out
    }
}

/// Parses an exported author document or bare publication list.
pub fn parse_author(json: &str) -> Result<AuthorProfile, serde_json::Error> {
    let profile = match serde_json::from_str::<Document>(json)? {
        Document::List(records) => AuthorProfile {
            publications: records.into_iter().map(Publication::from).collect(),
            ..AuthorProfile::default()
        },
        Document::Author {
            scholar_id,
            name,
            affiliation,
            email_domain,
            interests,
            citedby,
            publications,
        } => AuthorProfile {
            scholar_id,
            name,
            affiliation,
            email_domain,
            interests,
            citedby,
            publications: publications.into_iter().map(Publication::from).collect(),
        },
    };
    Ok(profile)
}

/// Parses an exported publication list.
pub fn parse_publications(json: &str) -> Result<Vec<Publication>, serde_json::Error> {
    parse_author(json).map(|a| a.publications)
}

/// Supplies the complete publication list of an author.
///
/// An `Err` is fatal for the run: no partial batch is attempted. An author
/// with no publications is a valid, empty result.
pub trait PublicationSource {
    fn author(&self, author_id: &str) -> Result<AuthorProfile, MetadataError>;

    fn publications(&self, author_id: &str) -> Result<Vec<Publication>, MetadataError> {
        self.author(author_id).map(|a| a.publications)
    }
}

/// Reads publications from a JSON export on disk.
#[derive(Debug, Clone)]
pub struct JsonFileSource {
    path: PathBuf,
}

impl JsonFileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl PublicationSource for JsonFileSource {
    fn author(&self, author_id: &str) -> Result<AuthorProfile, MetadataError> {
        let data = fs::read_to_string(&self.path).map_err(|source| MetadataError::Io {
            path: self.path.clone(),
            source,
        })?;
        let profile = parse_author(&data).map_err(|source| MetadataError::Parse {
            path: self.path.clone(),
            source,
        })?;
        if let Some(recorded) = profile.scholar_id.as_deref().filter(|id| *id != author_id) {
            return Err(MetadataError::AuthorLookup {
                author_id: author_id.to_string(),
                reason: format!("{} belongs to author '{}'", self.path.display(), recorded),
            });
        }
        tracing::info!(
            author_id,
            count = profile.publications.len(),
            "loaded publications from {}",
            self.path.display()
        );
        Ok(profile)
    }
}
