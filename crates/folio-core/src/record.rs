//! Content collections and their typed records.
//!
//! Every collection has its own record type. Records are decoded once when
//! content is loaded, so everything downstream works on well-typed values;
//! optional fields stay `Option` and are never coerced implicitly.

use std::{collections::BTreeMap, fmt, str::FromStr};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{
    date::{deserialize_date, deserialize_optional_date},
    error::CoreError,
};

/// Fields a record carries beyond its typed schema.
pub type Extra = BTreeMap<String, Value>;

/// The configured content collections.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Collection {
    Profile,
    Projects,
    Services,
    Testimonials,
    Blog,
    Faqs,
    ProfessionalJourney,
    CaseStudies,
}

/// How a collection's records are stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CollectionKind {
    /// Exactly one data document (site profile, project list, ...).
    Singleton,
    /// Many data records, one per file.
    Data,
    /// Markdown pages addressed by path.
    Page,
}

impl Collection {
    /// All collections, in declaration order.
    pub const ALL: [Collection; 8] = [
        Self::Profile,
        Self::Projects,
        Self::Services,
        Self::Testimonials,
        Self::Blog,
        Self::Faqs,
        Self::ProfessionalJourney,
        Self::CaseStudies,
    ];

    /// Collection name used in queries and cache keys.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Profile => "profile",
            Self::Projects => "projects",
            Self::Services => "services",
            Self::Testimonials => "testimonials",
            Self::Blog => "blog",
            Self::Faqs => "faqs",
            Self::ProfessionalJourney => "professionalJourney",
            Self::CaseStudies => "caseStudies",
        }
    }

    /// File or directory name of the collection inside the content tree.
    pub fn file_stem(&self) -> &'static str {
        match self {
            Self::ProfessionalJourney => "professional-journey",
            Self::CaseStudies => "case-studies",
            other => other.name(),
        }
    }

    pub fn kind(&self) -> CollectionKind {
        match self {
            Self::Testimonials => CollectionKind::Data,
            Self::Blog => CollectionKind::Page,
            _ => CollectionKind::Singleton,
        }
    }
}

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Collection {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|c| c.name() == s || c.file_stem() == s)
            .ok_or_else(|| CoreError::UnknownCollection(s.to_string()))
    }
}

/// Identifier of a record, unique within its collection.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RecordId {
    Numeric(i64),
    Path(String),
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Numeric(id) => write!(f, "{id}"),
            Self::Path(path) => f.write_str(path),
        }
    }
}

/// A structured document belonging to exactly one collection.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Record {
    pub id: RecordId,
    pub data: RecordData,
}

/// Record payload, one variant per collection.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum RecordData {
    Profile(Profile),
    Projects(Projects),
    Services(Services),
    Testimonial(Testimonial),
    BlogPost(BlogPost),
    Faqs(Faqs),
    ProfessionalJourney(ProfessionalJourney),
    CaseStudies(CaseStudies),
}

impl RecordData {
    /// Collection this payload belongs to.
    pub fn collection(&self) -> Collection {
        match self {
            Self::Profile(_) => Collection::Profile,
            Self::Projects(_) => Collection::Projects,
            Self::Services(_) => Collection::Services,
            Self::Testimonial(_) => Collection::Testimonials,
            Self::BlogPost(_) => Collection::Blog,
            Self::Faqs(_) => Collection::Faqs,
            Self::ProfessionalJourney(_) => Collection::ProfessionalJourney,
            Self::CaseStudies(_) => Collection::CaseStudies,
        }
    }
}

impl Record {
    /// Wrap a payload, deriving its identifier.
    ///
    /// Testimonials use their numeric `id`, blog posts their path, and
    /// singleton documents the path of their collection (e.g. `/profile`).
    pub fn new(data: impl Into<RecordData>) -> Self {
        let data = data.into();
        let id = match &data {
            RecordData::Testimonial(t) => RecordId::Numeric(t.id),
            RecordData::BlogPost(post) => RecordId::Path(post.path.clone()),
            other => RecordId::Path(format!("/{}", other.collection().file_stem())),
        };
        Self { id, data }
    }

    pub fn collection(&self) -> Collection {
        self.data.collection()
    }

    /// Path of a page-type record.
    pub fn path(&self) -> Option<&str> {
        match &self.id {
            RecordId::Path(path) => Some(path),
            RecordId::Numeric(_) => None,
        }
    }

    /// Look up a field by dotted path (`links.case_study`).
    ///
    /// Missing fields and explicit nulls are both `None`.
    pub fn field(&self, name: &str) -> Option<Value> {
        Self::lookup(&self.fields(), name).cloned()
    }

    /// The record's fields as one JSON object, for repeated [`Record::lookup`]s.
    pub fn fields(&self) -> Value {
        serde_json::to_value(&self.data).unwrap_or_default()
    }

    /// Dotted-path lookup into a value produced by [`Record::fields`].
    pub fn lookup<'a>(fields: &'a Value, name: &str) -> Option<&'a Value> {
        let mut current = fields;
        for segment in name.split('.') {
            current = current.as_object()?.get(segment)?;
        }
        (!current.is_null()).then_some(current)
    }

    /// Extract the typed payload, or `None` if the record holds another variant.
    pub fn into_typed<T: FromRecord>(self) -> Option<T> {
        T::from_record(self)
    }
}

/// Typed access to a record variant.
pub trait FromRecord: Sized {
    /// Collection holding records of this type.
    const COLLECTION: Collection;

    fn from_record(record: Record) -> Option<Self>;
}

macro_rules! record_variant {
    ($ty:ident, $collection:ident) => {
        impl FromRecord for $ty {
            const COLLECTION: Collection = Collection::$collection;

            fn from_record(record: Record) -> Option<Self> {
                match record.data {
                    RecordData::$ty(inner) => Some(inner),
                    _ => None,
                }
            }
        }

        impl From<$ty> for RecordData {
            fn from(value: $ty) -> Self {
                RecordData::$ty(value)
            }
        }
    };
}

record_variant!(Profile, Profile);
record_variant!(Projects, Projects);
record_variant!(Services, Services);
record_variant!(Testimonial, Testimonials);
record_variant!(BlogPost, Blog);
record_variant!(Faqs, Faqs);
record_variant!(ProfessionalJourney, ProfessionalJourney);
record_variant!(CaseStudies, CaseStudies);

/// Site owner profile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
    #[serde(default)]
    pub socials: Vec<SocialLink>,
    #[serde(flatten)]
    pub extra: Extra,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SocialLink {
    pub label: String,
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
}

/// The project list document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Projects {
    #[serde(default)]
    pub projects: Vec<Project>,
    #[serde(flatten)]
    pub extra: Extra,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Project {
    pub id: i64,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub featured: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub links: Option<ProjectLinks>,
    #[serde(default)]
    pub technologies: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(flatten)]
    pub extra: Extra,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProjectLinks {
    #[serde(default, alias = "caseStudy", skip_serializing_if = "Option::is_none")]
    pub case_study: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub demo: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    #[serde(flatten)]
    pub extra: Extra,
}

impl Project {
    /// An absent `featured` flag counts as `false`.
    pub fn is_featured(&self) -> bool {
        self.featured.unwrap_or(false)
    }

    /// Whether the project links to a non-empty case study.
    pub fn has_case_study(&self) -> bool {
        self.links
            .as_ref()
            .and_then(|links| links.case_study.as_deref())
            .is_some_and(|link| !link.is_empty())
    }
}

/// The services document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Services {
    #[serde(default)]
    pub services: Vec<Service>,
    #[serde(flatten)]
    pub extra: Extra,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Service {
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    #[serde(flatten)]
    pub extra: Extra,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Testimonial {
    pub id: i64,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company: Option<String>,
    pub quote: String,
    /// Project this testimonial refers to. Not checked against the project list.
    #[serde(
        default,
        rename = "projectId",
        alias = "project_id",
        skip_serializing_if = "Option::is_none"
    )]
    pub project_id: Option<i64>,
    #[serde(flatten)]
    pub extra: Extra,
}

/// A blog post page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlogPost {
    /// Page path, assigned from the file location at load time.
    #[serde(default)]
    pub path: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub headline: Option<String>,
    #[serde(default, rename = "abstract", skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(deserialize_with = "deserialize_date")]
    pub date: DateTime<Utc>,
    #[serde(
        default,
        deserialize_with = "deserialize_optional_date",
        skip_serializing_if = "Option::is_none"
    )]
    pub date_updated: Option<DateTime<Utc>>,
    pub author: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub social_image: Option<SocialImage>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub featured: Option<bool>,
    #[serde(default)]
    pub draft: bool,
    #[serde(default)]
    pub tags: Vec<String>,
    /// Markdown source after the frontmatter.
    #[serde(default)]
    pub body: String,
}

impl BlogPost {
    pub fn is_featured(&self) -> bool {
        self.featured.unwrap_or(false)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SocialImage {
    pub src: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mime: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alt: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<u32>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Faqs {
    #[serde(default)]
    pub faqs: Vec<Faq>,
    #[serde(flatten)]
    pub extra: Extra,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Faq {
    pub question: String,
    pub answer: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProfessionalJourney {
    #[serde(default, alias = "journey")]
    pub entries: Vec<JourneyEntry>,
    #[serde(flatten)]
    pub extra: Extra,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JourneyEntry {
    pub role: String,
    pub organization: String,
    pub start: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(default)]
    pub highlights: Vec<String>,
    #[serde(flatten)]
    pub extra: Extra,
}

/// Compact case study cards, authored separately from the project list.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CaseStudies {
    #[serde(default, rename = "caseStudies", alias = "case_studies")]
    pub case_studies: Vec<CompactCaseStudy>,
    #[serde(flatten)]
    pub extra: Extra,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompactCaseStudy {
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(
        default,
        rename = "projectId",
        alias = "project_id",
        skip_serializing_if = "Option::is_none"
    )]
    pub project_id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
    #[serde(flatten)]
    pub extra: Extra,
}
