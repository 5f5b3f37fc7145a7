//! Content directory loading.
//!
//! Layout of a content directory:
//!
//! ```text
//! content/
//! ├── data/
//! │   ├── profile.yml            one document per singleton collection
//! │   ├── projects.yml
//! │   ├── ...
//! │   └── testimonials/          one file per testimonial
//! │       └── alice.yml
//! └── blog/
//!     └── hello-world.md         one page per post
//! ```

use std::path::{Path, PathBuf};

use folio_core::{
    BlogPost, CaseStudies, Collection, CollectionKind, CoreError, DataFormat, Faqs,
    ProfessionalJourney, Profile, Projects, Record, RecordData, Services, Testimonial,
    config::ContentConfig, format::read_data_file, frontmatter::parse_frontmatter,
};
use rayon::prelude::*;
use tracing::{debug, info};
use walkdir::{DirEntry, WalkDir};

use crate::memory::MemoryStore;

/// Load every collection below `dir` into a [`MemoryStore`].
///
/// Missing files or directories mean empty collections. Any file that fails
/// to decode aborts the load.
pub fn load_dir(dir: &Path, options: &ContentConfig) -> folio_core::Result<MemoryStore> {
    info!(dir = %dir.display(), "loading content");

    let mut store = MemoryStore::new();
    let data_dir = dir.join("data");

    for collection in Collection::ALL {
        if collection.kind() != CollectionKind::Singleton {
            continue;
        }
        if let Some(data) = load_singleton(&data_dir, collection)? {
            store.insert(Record::new(data))?;
        }
    }

    for testimonial in load_testimonials(&data_dir.join(Collection::Testimonials.file_stem()))? {
        store.insert(Record::new(testimonial))?;
    }

    for post in load_blog(&dir.join(Collection::Blog.file_stem()), options.drafts)? {
        store.insert(Record::new(post))?;
    }

    info!(
        testimonials = store.len(Collection::Testimonials),
        posts = store.len(Collection::Blog),
        "content loaded"
    );
    Ok(store)
}

fn find_data_file(data_dir: &Path, stem: &str) -> Option<PathBuf> {
    DataFormat::EXTENSIONS
        .iter()
        .map(|ext| data_dir.join(format!("{stem}.{ext}")))
        .find(|path| path.is_file())
}

fn load_singleton(
    data_dir: &Path,
    collection: Collection,
) -> folio_core::Result<Option<RecordData>> {
    let Some(path) = find_data_file(data_dir, collection.file_stem()) else {
        debug!(collection = %collection, "no data file");
        return Ok(None);
    };
    debug!(collection = %collection, path = %path.display(), "reading data file");

    let data = match collection {
        Collection::Profile => read_data_file::<Profile>(&path)?.into(),
        Collection::Projects => read_data_file::<Projects>(&path)?.into(),
        Collection::Services => read_data_file::<Services>(&path)?.into(),
        Collection::Faqs => read_data_file::<Faqs>(&path)?.into(),
        Collection::ProfessionalJourney => read_data_file::<ProfessionalJourney>(&path)?.into(),
        Collection::CaseStudies => read_data_file::<CaseStudies>(&path)?.into(),
        Collection::Testimonials | Collection::Blog => return Ok(None),
    };
    Ok(Some(data))
}

/// Files below `dir` accepted by `keep`, sorted by path.
fn list_files(
    dir: &Path,
    max_depth: usize,
    keep: impl Fn(&Path) -> bool,
) -> folio_core::Result<Vec<PathBuf>> {
    if !dir.is_dir() {
        return Ok(Vec::new());
    }

    let walker = WalkDir::new(dir)
        .max_depth(max_depth)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(is_visible);

    let mut files = Vec::new();
    for entry in walker {
        let entry = entry.map_err(|e| CoreError::parse(dir, e.to_string()))?;
        if entry.file_type().is_file() && keep(entry.path()) {
            files.push(entry.into_path());
        }
    }
    Ok(files)
}

/// Hidden entries are skipped, except the root itself.
fn is_visible(entry: &DirEntry) -> bool {
    entry.depth() == 0 || !entry.file_name().to_string_lossy().starts_with('.')
}

fn is_data_file(path: &Path) -> bool {
    DataFormat::from_path(path).is_some()
}

fn is_markdown(path: &Path) -> bool {
    let ext = path.extension();
    ext.is_some_and(|ext| ext.eq_ignore_ascii_case("md"))
}

fn load_testimonials(dir: &Path) -> folio_core::Result<Vec<Testimonial>> {
    let files = list_files(dir, 1, is_data_file)?;
    files.iter().map(|path| read_data_file(path)).collect()
}

fn load_blog(dir: &Path, include_drafts: bool) -> folio_core::Result<Vec<BlogPost>> {
    let files = list_files(dir, usize::MAX, is_markdown)?;
    debug!(count = files.len(), "found blog pages");

    let posts = files
        .par_iter()
        .map(|path| parse_post(dir, path))
        .collect::<folio_core::Result<Vec<_>>>()?;

    Ok(posts
        .into_iter()
        .filter(|post| {
            let keep = include_drafts || !post.draft;
            if !keep {
                debug!(path = %post.path, "skipping draft");
            }
            keep
        })
        .collect())
}

fn parse_post(blog_dir: &Path, path: &Path) -> folio_core::Result<BlogPost> {
    let text = std::fs::read_to_string(path)?;
    let (mut post, body): (BlogPost, String) = parse_frontmatter(&text, path)?;
    let relative = path.strip_prefix(blog_dir).unwrap_or(path);
    post.path = page_path(Collection::Blog.file_stem(), relative);
    post.body = body;
    Ok(post)
}

/// `2024/hello.md` → `/blog/2024/hello`; `2024/index.md` → `/blog/2024`.
fn page_path(section: &str, relative: &Path) -> String {
    let stem = relative
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let mut segments: Vec<String> = relative
        .parent()
        .into_iter()
        .flat_map(|parent| parent.components())
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect();
    if stem != "index" {
        segments.push(stem);
    }

    let mut path = format!("/{section}");
    for segment in segments.iter().filter(|s| !s.is_empty()) {
        path.push('/');
        path.push_str(segment);
    }
    path
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

    fn post(title: &str, date: &str, extra: &str) -> String {
        format!(
            "---\ntitle: \"{title}\"\ndate: {date}\nauthor: Jane\n{extra}---\n\nBody of {title}.\n"
        )
    }

    #[test]
    fn test_page_path() {
        assert_eq!(page_path("blog", Path::new("hello.md")), "/blog/hello");
        assert_eq!(
            page_path("blog", Path::new("2024/hello.md")),
            "/blog/2024/hello"
        );
        assert_eq!(page_path("blog", Path::new("2024/index.md")), "/blog/2024");
        assert_eq!(page_path("blog", Path::new("index.md")), "/blog");
    }

    #[test]
    fn test_load_missing_dir_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = load_dir(&dir.path().join("nope"), &ContentConfig::default()).unwrap();
        assert!(store.is_empty());
    }

    #[test]
    fn test_load_full_tree() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        write(
            root,
            "data/profile.yml",
            "name: Jane Doe\ntitle: Engineer\n",
        );
        write(
            root,
            "data/projects.json",
            r#"{"projects": [{"id": 1, "title": "A", "featured": true}]}"#,
        );
        write(
            root,
            "data/services.toml",
            "[[services]]\ntitle = \"Consulting\"\n",
        );
        write(
            root,
            "data/testimonials/b.yml",
            "id: 2\nname: Bob\nquote: Great\nprojectId: 1\n",
        );
        write(
            root,
            "data/testimonials/a.yml",
            "id: 1\nname: Ann\nquote: Superb\n",
        );
        write(
            root,
            "data/testimonials/.hidden.yml",
            "id: 9\nname: X\nquote: Y\n",
        );
        write(root, "blog/first.md", &post("First", "2024-01-01", ""));
        write(
            root,
            "blog/2024/second.md",
            &post("Second", "2024-02-01", "featured: true\n"),
        );
        write(root, "blog/notes.txt", "not a post");

        let store = load_dir(root, &ContentConfig::default()).unwrap();

        assert_eq!(store.len(Collection::Profile), 1);
        assert_eq!(store.len(Collection::Projects), 1);
        assert_eq!(store.len(Collection::Services), 1);
        assert_eq!(store.len(Collection::Faqs), 0);

        let testimonials = store.records(Collection::Testimonials);
        let ids: Vec<String> = testimonials.iter().map(|r| r.id.to_string()).collect();
        assert_eq!(ids, vec!["1", "2"]);

        let paths: Vec<&str> = store
            .records(Collection::Blog)
            .iter()
            .filter_map(Record::path)
            .collect();
        assert_eq!(paths, vec!["/blog/2024/second", "/blog/first"]);

        let posts = store.records(Collection::Blog);
        let first = posts[1].clone().into_typed::<BlogPost>().unwrap();
        assert_eq!(first.body.trim(), "Body of First.");
    }

    #[test]
    fn test_drafts_skipped_unless_enabled() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        write(root, "blog/live.md", &post("Live", "2024-01-01", ""));
        write(
            root,
            "blog/wip.md",
            &post("Wip", "2024-01-02", "draft: true\n"),
        );

        let store = load_dir(root, &ContentConfig::default()).unwrap();
        assert_eq!(store.len(Collection::Blog), 1);

        let with_drafts = ContentConfig {
            drafts: true,
            ..ContentConfig::default()
        };
        let store = load_dir(root, &with_drafts).unwrap();
        assert_eq!(store.len(Collection::Blog), 2);
    }

    #[test]
    fn test_invalid_post_aborts_load() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        write(
            root,
            "blog/broken.md",
            "---\ntitle: Broken\n---\nno date or author",
        );

        let err = load_dir(root, &ContentConfig::default()).unwrap_err();
        assert!(err.to_string().contains("broken.md"));
    }

    #[test]
    fn test_duplicate_testimonial_ids_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        write(
            root,
            "data/testimonials/a.yml",
            "id: 1\nname: Ann\nquote: Q\n",
        );
        write(
            root,
            "data/testimonials/b.json",
            r#"{"id": 1, "name": "Bob", "quote": "Q"}"#,
        );

        let err = load_dir(root, &ContentConfig::default()).unwrap_err();
        assert!(matches!(err, CoreError::Duplicate { .. }));
    }
}
