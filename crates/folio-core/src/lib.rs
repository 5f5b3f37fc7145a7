//! Folio Core Library
//!
//! Typed content records, collection names, configuration, and the input
//! decoding shared by the folio crates.

pub mod config;
pub mod date;
pub mod error;
pub mod format;
pub mod frontmatter;
pub mod record;

pub use config::Config;
pub use error::{CoreError, Result};
pub use format::DataFormat;
pub use record::{
    BlogPost, CaseStudies, Collection, CollectionKind, CompactCaseStudy, Faq, Faqs, FromRecord,
    JourneyEntry, ProfessionalJourney, Profile, Project, ProjectLinks, Projects, Record,
    RecordData, RecordId, Service, Services, SocialImage, SocialLink, Testimonial,
};
