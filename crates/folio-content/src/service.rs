//! Named content accessors.
//!
//! Each accessor resolves through the [`QueryCache`] under a fixed key, so a
//! view requested by several page sections is loaded once. Derived views are
//! computed from the cached base document rather than querying the store
//! again.

use std::{future::Future, sync::Arc};

use folio_core::{
    BlogPost, CaseStudies, Collection, CollectionKind, Faqs, FromRecord, ProfessionalJourney,
    Profile, Project, Projects, Record, Service, Services, Testimonial,
};
use serde::Serialize;

use crate::{
    cache::QueryCache,
    derive,
    error::{ContentError, Result},
    key::CacheKey,
    store::{ContentStore, ContentStoreExt, Direction, Operator, Query},
};

/// One page of the blog listing.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BlogPage {
    pub posts: Vec<BlogPost>,
    pub total: usize,
    pub page: usize,
    pub total_pages: usize,
}

/// Cached accessors over a [`ContentStore`].
pub struct ContentService<S: ?Sized> {
    store: Arc<S>,
    cache: QueryCache,
}

impl<S: ?Sized> Clone for ContentService<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            cache: self.cache.clone(),
        }
    }
}

impl<S: ?Sized> std::fmt::Debug for ContentService<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ContentService")
            .field("cache", &self.cache)
            .finish_non_exhaustive()
    }
}

impl<S: ContentStore + ?Sized + 'static> ContentService<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self::with_cache(store, QueryCache::new())
    }

    /// Share an existing cache, e.g. one scoped to a whole build.
    pub fn with_cache(store: Arc<S>, cache: QueryCache) -> Self {
        Self { store, cache }
    }

    pub fn cache(&self) -> &QueryCache {
        &self.cache
    }

    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    /// Run `load` through the cache with an owned handle to this service.
    async fn cached<V, F, Fut>(&self, key: CacheKey, load: F) -> Result<V>
    where
        V: Clone + Send + Sync + 'static,
        F: FnOnce(Self) -> Fut,
        Fut: Future<Output = Result<V>> + Send + 'static,
    {
        let this = self.clone();
        self.cache.get_or_load(key, move || load(this)).await
    }

    async fn cached_first(&self, query: Query) -> Result<Option<Arc<Record>>> {
        let key = query.cache_key().param("first");
        self.cached(key, move |this| async move {
            let record = this.store.execute(&query.limit(1)).await?;
            Ok(record.into_iter().next().map(Arc::new))
        })
        .await
    }

    /// All records of the collection called `name`, optionally ordered and capped.
    ///
    /// `direction` defaults to [`Direction::default_for`] the order field and
    /// is rejected when no order field is given.
    pub async fn load_collection(
        &self,
        name: &str,
        order_by: Option<&str>,
        direction: Option<Direction>,
        limit: Option<usize>,
    ) -> Result<Arc<Vec<Record>>> {
        let collection: Collection = name.parse()?;
        let mut query = Query::new(collection);
        match (order_by, direction) {
            (Some(field), direction) => {
                query = query.order(field, direction.unwrap_or(Direction::default_for(field)));
            }
            (None, Some(direction)) => {
                return Err(ContentError::malformed(format!(
                    "direction {} given for {collection} without an order field",
                    direction.as_str()
                )));
            }
            (None, None) => {}
        }
        if let Some(limit) = limit {
            query = query.limit(limit);
        }

        self.cached(query.cache_key(), move |this| async move {
            this.store.execute(&query).await.map(Arc::new)
        })
        .await
    }

    /// The record of collection `name` stored at `path`.
    pub async fn load_record_by_path(&self, name: &str, path: &str) -> Result<Option<Arc<Record>>> {
        let collection: Collection = name.parse()?;
        self.cached_first(Query::new(collection).path(path)).await
    }

    /// The single document of a singleton collection, if authored.
    pub async fn load_singleton(&self, name: &str) -> Result<Option<Arc<Record>>> {
        let collection: Collection = name.parse()?;
        if collection.kind() != CollectionKind::Singleton {
            return Err(ContentError::malformed(format!(
                "{collection} holds many records, not a single document"
            )));
        }
        self.cached_first(Query::new(collection)).await
    }

    async fn typed_singleton<T>(&self, key: CacheKey) -> Result<Option<Arc<T>>>
    where
        T: FromRecord + Send + Sync + 'static,
    {
        self.cached(key, |this| async move {
            let record = this.store.query(T::COLLECTION).first().await?;
            record
                .map(|r| expect_typed::<T>(r).map(Arc::new))
                .transpose()
        })
        .await
    }

    async fn typed_list<T>(&self, key: CacheKey, query: Query) -> Result<Arc<Vec<T>>>
    where
        T: FromRecord + Send + Sync + 'static,
    {
        self.cached(key, move |this| async move {
            let records = this.store.execute(&query).await?;
            records
                .into_iter()
                .map(expect_typed::<T>)
                .collect::<Result<Vec<_>>>()
                .map(Arc::new)
        })
        .await
    }

    /// Cache a view computed from an already cached one.
    async fn derived<B, V, L, LFut, D>(&self, key: CacheKey, base: L, compute: D) -> Result<Arc<V>>
    where
        B: Send + 'static,
        V: Send + Sync + 'static,
        L: FnOnce(Self) -> LFut + Send + 'static,
        LFut: Future<Output = Result<B>> + Send + 'static,
        D: FnOnce(B) -> V + Send + 'static,
    {
        self.cached(key, move |this| async move {
            base(this).await.map(|b| Arc::new(compute(b)))
        })
        .await
    }

    pub async fn profile(&self) -> Result<Option<Arc<Profile>>> {
        self.typed_singleton(CacheKey::new("profile-data")).await
    }

    pub async fn projects(&self) -> Result<Option<Arc<Projects>>> {
        self.typed_singleton(CacheKey::new("projects-data")).await
    }

    /// First `count` featured projects in authored order.
    pub async fn featured_projects(&self, count: usize) -> Result<Arc<Vec<Project>>> {
        self.derived(
            CacheKey::new("featured-projects").param(count),
            |this| async move { this.projects().await },
            move |doc: Option<Arc<Projects>>| {
                project_list(doc, |p| derive::featured(p, Some(count)))
            },
        )
        .await
    }

    /// Projects linking a case study or featured.
    pub async fn case_studies(&self) -> Result<Arc<Vec<Project>>> {
        self.derived(
            CacheKey::new("case-studies-data"),
            |this| async move { this.projects().await },
            |doc: Option<Arc<Projects>>| project_list(doc, derive::case_studies),
        )
        .await
    }

    /// First `count` projects that are featured and link a case study.
    pub async fn featured_case_studies(&self, count: usize) -> Result<Arc<Vec<Project>>> {
        self.derived(
            CacheKey::new("featured-case-studies").param(count),
            |this| async move { this.projects().await },
            move |doc: Option<Arc<Projects>>| {
                project_list(doc, |p| derive::featured_case_studies(p, count))
            },
        )
        .await
    }

    pub async fn compact_case_studies(&self) -> Result<Option<Arc<CaseStudies>>> {
        self.typed_singleton(CacheKey::new("compact-case-studies"))
            .await
    }

    pub async fn services(&self) -> Result<Option<Arc<Services>>> {
        self.typed_singleton(CacheKey::new("services-data")).await
    }

    pub async fn services_preview(&self, count: usize) -> Result<Arc<Vec<Service>>> {
        self.derived(
            CacheKey::new("services-preview").param(count),
            |this| async move { this.services().await },
            move |doc: Option<Arc<Services>>| {
                doc.map(|d| derive::preview(&d.services, count))
                    .unwrap_or_default()
            },
        )
        .await
    }

    /// Every testimonial by ascending `id`.
    pub async fn testimonials(&self) -> Result<Arc<Vec<Testimonial>>> {
        self.typed_list(
            CacheKey::new("testimonials-data"),
            Query::new(Collection::Testimonials).order("id", Direction::Asc),
        )
        .await
    }

    /// Testimonials referring to `project_id`, in ascending id order.
    pub async fn testimonials_for_project(&self, project_id: i64) -> Result<Arc<Vec<Testimonial>>> {
        self.derived(
            CacheKey::new("project-testimonials").param(project_id),
            |this| async move { this.testimonials().await },
            move |all: Arc<Vec<Testimonial>>| {
                derive::testimonials_for_project(all.as_slice(), project_id)
            },
        )
        .await
    }

    pub async fn faqs(&self) -> Result<Option<Arc<Faqs>>> {
        self.typed_singleton(CacheKey::new("faqs-data")).await
    }

    pub async fn professional_journey(&self) -> Result<Option<Arc<ProfessionalJourney>>> {
        self.typed_singleton(CacheKey::new("professional-journey-data"))
            .await
    }

    /// Every post, newest first.
    pub async fn blog_posts(&self) -> Result<Arc<Vec<BlogPost>>> {
        self.typed_list(
            CacheKey::new("blog-posts-all"),
            Query::new(Collection::Blog).order("date", Direction::Desc),
        )
        .await
    }

    pub async fn recent_blog_posts(&self, count: usize) -> Result<Arc<Vec<BlogPost>>> {
        self.derived(
            CacheKey::new("recent-blog-posts").param(count),
            |this| async move { this.blog_posts().await },
            move |posts: Arc<Vec<BlogPost>>| derive::recent(posts.as_slice(), Some(count)),
        )
        .await
    }

    /// Up to `count` featured posts, newest first.
    pub async fn featured_blog_posts(&self, count: usize) -> Result<Arc<Vec<BlogPost>>> {
        self.typed_list(
            CacheKey::new("featured-blog-posts").param(count),
            Query::new(Collection::Blog)
                .filter("featured", Operator::Eq, true)
                .order("date", Direction::Desc)
                .limit(count),
        )
        .await
    }

    pub async fn blog_post(&self, path: &str) -> Result<Option<Arc<BlogPost>>> {
        let query = Query::new(Collection::Blog).path(path).limit(1);
        self.cached(CacheKey::new("blog-post").param(path), move |this| async move {
            let record = this.store.execute(&query).await?.into_iter().next();
            record
                .map(|r| expect_typed::<BlogPost>(r).map(Arc::new))
                .transpose()
        })
        .await
    }

    /// Page `page` (from 1) of the listing, `per_page` posts each.
    pub async fn blog_page(&self, page: usize, per_page: usize) -> Result<Arc<BlogPage>> {
        if page == 0 || per_page == 0 {
            return Err(ContentError::malformed(format!(
                "blog page {page} with {per_page} posts per page"
            )));
        }
        self.derived(
            CacheKey::new("blog-page").param(page).param(per_page),
            |this| async move { this.blog_posts().await },
            move |posts: Arc<Vec<BlogPost>>| {
                let (slice, total_pages) =
                    derive::paginate(posts.as_slice(), page, per_page).unwrap_or_default();
                BlogPage {
                    posts: slice.to_vec(),
                    total: posts.len(),
                    page,
                    total_pages,
                }
            },
        )
        .await
    }
}

fn project_list(
    doc: Option<Arc<Projects>>,
    select: impl FnOnce(&[Project]) -> Vec<Project>,
) -> Vec<Project> {
    doc.map(|d| select(&d.projects)).unwrap_or_default()
}

fn expect_typed<T: FromRecord>(record: Record) -> Result<T> {
    let id = record.id.clone();
    record
        .into_typed::<T>()
        .ok_or(ContentError::UnexpectedRecord {
            collection: T::COLLECTION,
            id,
        })
}
