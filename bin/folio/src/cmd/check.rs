//! Check command - validate configuration and content

use std::{collections::HashSet, path::Path};

use color_eyre::eyre::{Result, bail};
use folio_content::{ContentService, MemoryStore};
use folio_core::{Collection, Config};

use super::Site;

/// Validation result.
#[derive(Debug, Default)]
struct ValidationResult {
    errors: Vec<String>,
    warnings: Vec<String>,
}

impl ValidationResult {
    fn add_error(&mut self, msg: impl Into<String>) {
        self.errors.push(msg.into());
    }

    fn add_warning(&mut self, msg: impl Into<String>) {
        self.warnings.push(msg.into());
    }

    fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }
}

/// Run the check command.
///
/// Loads the configuration and every collection, then reports
/// cross-reference and metadata issues.
pub async fn run(config_path: &Path, strict: bool) -> Result<()> {
    tracing::info!(?config_path, strict, "Checking configuration and content");

    let mut result = ValidationResult::default();

    println!("Checking configuration...");
    let config = match Config::load_with_env(config_path) {
        Ok(c) => {
            println!("  ✓ Configuration valid");
            check_config_values(&c, &mut result);
            Some(c)
        }
        Err(e) => {
            result.add_error(format!("Configuration error: {e}"));
            println!("  ✗ Configuration invalid: {e}");
            None
        }
    };

    if let Some(config) = config {
        println!("\nChecking content...");
        match Site::from_config(config, config_path) {
            Ok(site) => {
                print_counts(&site);
                check_references(&site.service, &mut result).await;
                check_posts(&site.service, &mut result).await;
            }
            Err(e) => {
                result.add_error(format!("Content error: {e:#}"));
                println!("  ✗ Content failed to load");
            }
        }
    }

    println!();
    println!("Summary:");
    println!("  Errors:   {}", result.errors.len());
    println!("  Warnings: {}", result.warnings.len());

    if result.has_errors() {
        println!();
        println!("Errors:");
        for err in &result.errors {
            println!("  ✗ {err}");
        }
    }

    if result.has_warnings() {
        println!();
        println!("Warnings:");
        for warn in &result.warnings {
            println!("  ⚠ {warn}");
        }
    }

    if result.has_errors() {
        bail!("Validation failed with {} error(s)", result.errors.len());
    }

    if strict && result.has_warnings() {
        bail!(
            "Validation failed with {} warning(s) (strict mode)",
            result.warnings.len()
        );
    }

    println!();
    println!("✓ All checks passed");

    Ok(())
}

fn print_counts(site: &Site) {
    for collection in Collection::ALL {
        println!(
            "  ✓ {:<20} {} record(s)",
            collection.name(),
            site.store.len(collection)
        );
    }
}

/// Testimonials naming a project that does not exist. Informational: the
/// relation is optional, so these still render.
async fn check_references(service: &ContentService<MemoryStore>, result: &mut ValidationResult) {
    let (projects, testimonials) = match (service.projects().await, service.testimonials().await) {
        (Ok(projects), Ok(testimonials)) => (projects, testimonials),
        (Err(e), _) | (_, Err(e)) => {
            result.add_error(format!("Failed to query content: {e}"));
            return;
        }
    };

    let known: HashSet<i64> = projects
        .iter()
        .flat_map(|doc| doc.projects.iter().map(|p| p.id))
        .collect();

    for testimonial in testimonials.iter() {
        if let Some(project_id) = testimonial.project_id
            && !known.contains(&project_id)
        {
            result.add_warning(format!(
                "Testimonial {} refers to unknown project {project_id}",
                testimonial.id
            ));
        }
    }
}

async fn check_posts(service: &ContentService<MemoryStore>, result: &mut ValidationResult) {
    let posts = match service.blog_posts().await {
        Ok(posts) => posts,
        Err(e) => {
            result.add_error(format!("Failed to query blog posts: {e}"));
            return;
        }
    };

    for post in posts.iter().filter(|p| p.description.trim().is_empty()) {
        result.add_warning(format!("{}: missing description", post.path));
    }
}

/// Check configuration values for common issues.
fn check_config_values(config: &Config, result: &mut ValidationResult) {
    if !config.site.base_url.starts_with("http") {
        result.add_warning("site.base_url should start with http:// or https://");
    }

    if config.site.description.is_none() {
        result.add_warning("site.description is not set");
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::*;

    fn write(root: &Path, relative: &str, content: &str) {
        let path = root.join(relative);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    fn site_dir(testimonial: &str) -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        write(
            root,
            "folio.toml",
            "[site]\ntitle = \"Jane\"\nbase_url = \"https://jane.dev\"\ndescription = \"Portfolio\"\n",
        );
        write(
            root,
            "content/data/projects.yml",
            "projects:\n  - id: 1\n    title: A\n",
        );
        write(root, "content/data/testimonials/t.yml", testimonial);
        write(
            root,
            "content/blog/post.md",
            "---\ntitle: Post\ndescription: About things\ndate: 2024-01-01\nauthor: Jane\n---\nBody\n",
        );
        dir
    }

    #[tokio::test]
    async fn test_check_passes_clean_site() {
        let dir = site_dir("id: 1\nname: Ann\nquote: Q\nprojectId: 1\n");
        run(&dir.path().join("folio.toml"), true).await.unwrap();
    }

    #[tokio::test]
    async fn test_orphan_reference_is_warning_only() {
        let dir = site_dir("id: 1\nname: Ann\nquote: Q\nprojectId: 9\n");
        let config = dir.path().join("folio.toml");

        run(&config, false).await.unwrap();
        let err = run(&config, true).await.unwrap_err();
        assert!(err.to_string().contains("strict"));
    }

    #[tokio::test]
    async fn test_missing_config_fails() {
        let dir = tempfile::tempdir().unwrap();
        assert!(run(&dir.path().join("folio.toml"), false).await.is_err());
    }
}
