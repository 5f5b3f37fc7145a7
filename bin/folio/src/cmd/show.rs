//! Show command - print one derived view as JSON

use std::{fmt, future::Future, path::Path};

use clap::ValueEnum;
use color_eyre::eyre::{Result, eyre};
use folio_content::{AsyncData, ContentService, MemoryStore};
use folio_core::{config::ViewConfig, date::format_date};
use serde::Serialize;
use serde_json::Value;

use super::Site;

/// Views available to `folio show`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum View {
    Profile,
    Projects,
    FeaturedProjects,
    CaseStudies,
    FeaturedCaseStudies,
    CompactCaseStudies,
    Services,
    ServicesPreview,
    Testimonials,
    ProjectTestimonials,
    Faqs,
    Journey,
    Blog,
    RecentPosts,
    FeaturedPosts,
    Post,
    BlogPage,
}

impl fmt::Display for View {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.to_possible_value() {
            Some(value) => f.write_str(value.get_name()),
            None => write!(f, "{self:?}"),
        }
    }
}

/// Parameters a view may take.
#[derive(Debug, Clone, Default)]
pub struct ShowArgs {
    pub count: Option<usize>,
    pub project: Option<i64>,
    pub path: Option<String>,
    pub page: Option<usize>,
}

/// Run the show command.
pub async fn run(config_path: &Path, view: View, args: &ShowArgs) -> Result<()> {
    tracing::info!(?config_path, %view, "Showing view");

    let site = Site::open(config_path)?;
    let json = render(&site.service, &site.config.views, view, args).await?;
    println!("{}", serde_json::to_string_pretty(&json)?);
    Ok(())
}

/// Resolve `view` to JSON. A view that fails to load renders its empty
/// fallback; only missing arguments are errors.
pub async fn render(
    service: &ContentService<MemoryStore>,
    defaults: &ViewConfig,
    view: View,
    args: &ShowArgs,
) -> Result<Value> {
    let count = |fallback: usize| args.count.unwrap_or(fallback);

    match view {
        View::Profile => resolve(view, service.profile()).await,
        View::Projects => resolve(view, service.projects()).await,
        View::FeaturedProjects => {
            let n = count(defaults.featured_projects);
            resolve(view, service.featured_projects(n)).await
        }
        View::CaseStudies => resolve(view, service.case_studies()).await,
        View::FeaturedCaseStudies => {
            let n = count(defaults.featured_case_studies);
            resolve(view, service.featured_case_studies(n)).await
        }
        View::CompactCaseStudies => resolve(view, service.compact_case_studies()).await,
        View::Services => resolve(view, service.services()).await,
        View::ServicesPreview => {
            let n = count(defaults.services_preview);
            resolve(view, service.services_preview(n)).await
        }
        View::Testimonials => resolve(view, service.testimonials()).await,
        View::ProjectTestimonials => {
            let id = required(args.project, view, "--project")?;
            resolve(view, service.testimonials_for_project(id)).await
        }
        View::Faqs => resolve(view, service.faqs()).await,
        View::Journey => resolve(view, service.professional_journey()).await,
        View::Blog => resolve(view, service.blog_posts()).await,
        View::RecentPosts => {
            let n = count(defaults.recent_posts);
            resolve(view, service.recent_blog_posts(n)).await
        }
        View::FeaturedPosts => {
            let n = count(defaults.featured_posts);
            resolve(view, service.featured_blog_posts(n)).await
        }
        View::Post => {
            let path = required(args.path.as_deref(), view, "--path")?;
            resolve(view, service.blog_post(path)).await
        }
        View::BlogPage => {
            let page = args.page.unwrap_or(1);
            let per_page = count(defaults.posts_per_page);
            resolve(view, service.blog_page(page, per_page)).await
        }
    }
}

fn required<T>(value: Option<T>, view: View, flag: &str) -> Result<T> {
    value.ok_or_else(|| eyre!("view {view} needs {flag}"))
}

async fn resolve<T, F>(view: View, load: F) -> Result<Value>
where
    T: Serialize + Default,
    F: Future<Output = folio_content::Result<T>>,
{
    let data = AsyncData::load(load).await;
    if let Some(err) = data.error() {
        tracing::error!(%view, error = %err, "view failed to load, showing empty fallback");
    }
    let mut value = serde_json::to_value(data.value_or_default())?;
    add_display_dates(view, &mut value);
    Ok(value)
}

/// Add a long-form `displayDate` next to the `date` of every post in `value`.
fn add_display_dates(view: View, value: &mut Value) {
    match view {
        View::Post => add_display_date(value),
        View::Blog | View::RecentPosts | View::FeaturedPosts => {
            if let Some(posts) = value.as_array_mut() {
                posts.iter_mut().for_each(add_display_date);
            }
        }
        View::BlogPage => {
            if let Some(posts) = value.get_mut("posts").and_then(Value::as_array_mut) {
                posts.iter_mut().for_each(add_display_date);
            }
        }
        _ => {}
    }
}

fn add_display_date(post: &mut Value) {
    let date = post.get("date").and_then(Value::as_str);
    if let Some(display) = date.and_then(format_date) {
        post["displayDate"] = Value::String(display);
    }
}

#[cfg(test)]
mod tests {
    use std::{fs, sync::Arc};

    use folio_content::load_dir;
    use folio_core::config::ContentConfig;
    use serde_json::json;

    use super::*;

    const PROJECTS: &str = "projects:
  - id: 1
    title: A
    featured: true
  - id: 2
    title: B
";

    const POST: &str = "---
title: Hello
date: 2024-01-14
author: Jane
---
Body
";

    fn service() -> (tempfile::TempDir, ContentService<MemoryStore>) {
        let dir = tempfile::tempdir().unwrap();
        let data = dir.path().join("data");
        let blog = dir.path().join("blog");
        fs::create_dir_all(&data).unwrap();
        fs::create_dir_all(&blog).unwrap();
        fs::write(data.join("projects.yml"), PROJECTS).unwrap();
        fs::write(blog.join("hello.md"), POST).unwrap();

        let store = load_dir(dir.path(), &ContentConfig::default()).unwrap();
        (dir, ContentService::new(Arc::new(store)))
    }

    async fn show(
        service: &ContentService<MemoryStore>,
        view: View,
        args: &ShowArgs,
    ) -> Result<Value> {
        render(service, &ViewConfig::default(), view, args).await
    }

    async fn show_default(service: &ContentService<MemoryStore>, view: View) -> Value {
        show(service, view, &ShowArgs::default()).await.unwrap()
    }

    #[tokio::test]
    async fn test_render_featured_projects() {
        let (_dir, service) = service();

        let value = show_default(&service, View::FeaturedProjects).await;
        let expected = json!([{"id": 1, "title": "A", "featured": true, "technologies": []}]);
        assert_eq!(value, expected);
    }

    #[tokio::test]
    async fn test_failed_view_renders_fallback() {
        let (_dir, service) = service();
        let args = ShowArgs {
            page: Some(0),
            ..ShowArgs::default()
        };

        let value = show(&service, View::BlogPage, &args).await.unwrap();
        assert_eq!(value["posts"], json!([]));
        assert_eq!(value["totalPages"], json!(0));
    }

    #[tokio::test]
    async fn test_missing_argument_is_error() {
        let (_dir, service) = service();
        let defaults = ShowArgs::default();

        let err = show(&service, View::Post, &defaults).await.unwrap_err();
        assert!(err.to_string().contains("--path"));
    }

    #[tokio::test]
    async fn test_absent_document_is_null() {
        let (_dir, service) = service();

        let value = show_default(&service, View::Profile).await;
        assert!(value.is_null());
    }

    #[tokio::test]
    async fn test_posts_carry_display_date() {
        let (_dir, service) = service();
        let expected = json!("Sunday, January 14, 2024");

        let args = ShowArgs {
            path: Some("/blog/hello".to_string()),
            ..ShowArgs::default()
        };
        let post = show(&service, View::Post, &args).await.unwrap();
        assert_eq!(post["date"], json!("2024-01-14T00:00:00Z"));
        assert_eq!(post["displayDate"], expected);

        let page = show_default(&service, View::BlogPage).await;
        assert_eq!(page["posts"][0]["displayDate"], expected);

        let recent = show_default(&service, View::RecentPosts).await;
        assert_eq!(recent[0]["displayDate"], expected);

        let projects = show_default(&service, View::FeaturedProjects).await;
        assert!(projects[0].get("displayDate").is_none());
    }

    #[test]
    fn test_view_names() {
        assert_eq!(
            View::FeaturedCaseStudies.to_string(),
            "featured-case-studies"
        );
        assert_eq!(View::from_str("recent-posts", false), Ok(View::RecentPosts));
    }
}
