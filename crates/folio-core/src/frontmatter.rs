//! Frontmatter parsing for markdown pages.

use std::path::Path;

use serde::de::DeserializeOwned;

use crate::error::{CoreError, Result};

/// Delimiter types for frontmatter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrontmatterFormat {
    /// YAML frontmatter delimited by `---`.
    Yaml,
    /// TOML frontmatter delimited by `+++`.
    Toml,
}

impl FrontmatterFormat {
    /// Get the delimiter string for this format.
    pub fn delimiter(&self) -> &'static str {
        match self {
            Self::Yaml => "---",
            Self::Toml => "+++",
        }
    }

    fn detect(content: &str) -> Option<Self> {
        [Self::Yaml, Self::Toml]
            .into_iter()
            .find(|format| content.starts_with(format.delimiter()))
    }
}

/// Split content into frontmatter and body.
pub fn split_frontmatter(content: &str) -> Option<(FrontmatterFormat, &str, &str)> {
    let content = content.trim_start();
    let format = FrontmatterFormat::detect(content)?;
    let delimiter = format.delimiter();

    let after_open = &content[delimiter.len()..];
    let (closing, body_start) = closing_line(after_open, delimiter)?;

    let frontmatter = after_open[..closing].trim();
    let body = after_open[body_start..].trim_start();

    Some((format, frontmatter, body))
}

/// Byte range of the first line after the opening one that holds only
/// `delimiter`.
fn closing_line(after_open: &str, delimiter: &str) -> Option<(usize, usize)> {
    let mut offset = 0;
    for line in after_open.split_inclusive('\n') {
        if offset > 0 && line.trim_end() == delimiter {
            return Some((offset, offset + line.len()));
        }
        offset += line.len();
    }
    None
}

/// Decode the frontmatter of `content` into `T` and return it with the body.
///
/// Pages without a frontmatter block are rejected: every page type carries
/// required metadata.
pub fn parse_frontmatter<T: DeserializeOwned>(content: &str, path: &Path) -> Result<(T, String)> {
    let Some((format, fm_str, body)) = split_frontmatter(content) else {
        return Err(CoreError::frontmatter(path, "no frontmatter block found"));
    };

    let meta: T = match format {
        FrontmatterFormat::Yaml => {
            serde_yaml::from_str(fm_str).map_err(|e| CoreError::frontmatter(path, e.to_string()))?
        }
        FrontmatterFormat::Toml => {
            toml::from_str(fm_str).map_err(|e| CoreError::frontmatter(path, e.to_string()))?
        }
    };

    Ok((meta, body.to_string()))
}

#[cfg(test)]
mod tests {
    use serde::Deserialize;

    use super::*;

    #[derive(Debug, Deserialize)]
    struct Meta {
        title: String,
        #[serde(default)]
        tags: Vec<String>,
    }

    #[test]
    fn test_split_yaml_frontmatter() {
        let content = r#"---
title: "Hello World"
date: 2024-01-14
---

This is the body content."#;

        let (format, fm, body) = split_frontmatter(content).expect("split");
        assert_eq!(format, FrontmatterFormat::Yaml);
        assert!(fm.contains("title:"));
        assert!(body.starts_with("This is the body"));
    }

    #[test]
    fn test_split_toml_frontmatter() {
        let content = r#"+++
title = "Hello World"
+++

This is the body content."#;

        let (format, fm, body) = split_frontmatter(content).expect("split");
        assert_eq!(format, FrontmatterFormat::Toml);
        assert!(fm.contains("title ="));
        assert!(body.starts_with("This is the body"));
    }

    #[test]
    fn test_unterminated_frontmatter() {
        assert!(split_frontmatter("---\ntitle: x\nno closing").is_none());
    }

    #[test]
    fn test_delimiter_inside_value_does_not_close() {
        let content = "---\ntitle: \"Before---after\"\ndate: 2024-01-01\n---\nBody\n";

        let (meta, body): (Meta, _) =
            parse_frontmatter(content, Path::new("p.md")).expect("parse");

        assert_eq!(meta.title, "Before---after");
        assert_eq!(body, "Body\n");
    }

    #[test]
    fn test_closing_delimiter_must_be_whole_line() {
        let content = "+++\ntitle = \"a +++ b\"\n+++ trailing\n+++\r\nBody";

        let (format, fm, body) = split_frontmatter(content).expect("split");
        assert_eq!(format, FrontmatterFormat::Toml);
        assert_eq!(fm, "title = \"a +++ b\"\n+++ trailing");
        assert_eq!(body, "Body");
    }

    #[test]
    fn test_empty_frontmatter_block() {
        let (_, fm, body) = split_frontmatter("---\n---\nBody").expect("split");
        assert_eq!(fm, "");
        assert_eq!(body, "Body");
    }

    #[test]
    fn test_parse_yaml_frontmatter() {
        let content = "---\ntitle: \"Test Post\"\ntags:\n  - rust\n  - web\n---\n\nContent here.";

        let (meta, body): (Meta, _) =
            parse_frontmatter(content, Path::new("post.md")).expect("parse");

        assert_eq!(meta.title, "Test Post");
        assert_eq!(meta.tags, vec!["rust", "web"]);
        assert_eq!(body, "Content here.");
    }

    #[test]
    fn test_parse_toml_frontmatter() {
        let content = "+++\ntitle = \"Test Post\"\ntags = [\"rust\"]\n+++\n\nContent here.";

        let (meta, body): (Meta, _) =
            parse_frontmatter(content, Path::new("post.md")).expect("parse");

        assert_eq!(meta.title, "Test Post");
        assert_eq!(meta.tags, vec!["rust"]);
        assert_eq!(body, "Content here.");
    }

    #[test]
    fn test_missing_frontmatter_is_error() {
        let result: Result<(Meta, String)> =
            parse_frontmatter("Just a body.", Path::new("post.md"));
        let err = result.unwrap_err();
        assert!(err.to_string().contains("no frontmatter"));
        assert!(err.to_string().contains("post.md"));
    }

    #[test]
    fn test_invalid_frontmatter_reports_path() {
        let content = "---\ntags: [unclosed\n---\nbody";
        let result: Result<(Meta, String)> =
            parse_frontmatter(content, Path::new("blog/broken.md"));
        assert!(result.unwrap_err().to_string().contains("blog/broken.md"));
    }
}
