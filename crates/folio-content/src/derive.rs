//! Derived views over loaded collections.
//!
//! Every function here is total: empty input yields empty output, and an
//! absent `featured` flag reads as `false`. Inputs are never reordered unless
//! the function says so.

use chrono::{DateTime, Utc};
use folio_core::{BlogPost, Project, Testimonial};

/// Items carrying an optional `featured` flag.
pub trait Featured {
    fn is_featured(&self) -> bool;
}

/// Items carrying a publication date.
pub trait Dated {
    fn date(&self) -> DateTime<Utc>;
}

impl Featured for Project {
    fn is_featured(&self) -> bool {
        Project::is_featured(self)
    }
}

impl Featured for BlogPost {
    fn is_featured(&self) -> bool {
        BlogPost::is_featured(self)
    }
}

impl Dated for BlogPost {
    fn date(&self) -> DateTime<Utc> {
        self.date
    }
}

/// Featured items in their original order, optionally the first `limit` of them.
pub fn featured<T: Featured + Clone>(items: &[T], limit: Option<usize>) -> Vec<T> {
    items
        .iter()
        .filter(|item| item.is_featured())
        .take(limit.unwrap_or(usize::MAX))
        .cloned()
        .collect()
}

/// Items newest first, optionally the first `limit`. Equal dates keep their
/// original relative order.
pub fn recent<T: Dated + Clone>(items: &[T], limit: Option<usize>) -> Vec<T> {
    let mut sorted = items.to_vec();
    sorted.sort_by_key(|item| std::cmp::Reverse(item.date()));
    sorted.truncate(limit.unwrap_or(usize::MAX));
    sorted
}

/// The first `n` items as authored.
pub fn preview<T: Clone>(items: &[T], n: usize) -> Vec<T> {
    items.iter().take(n).cloned().collect()
}

/// A project is shown among case studies if it links one or is featured.
pub fn is_case_study_eligible(project: &Project) -> bool {
    project.has_case_study() || project.is_featured()
}

/// Stricter than [`is_case_study_eligible`]: featured and linking a case study.
pub fn is_featured_case_study(project: &Project) -> bool {
    project.has_case_study() && project.is_featured()
}

pub fn case_studies(projects: &[Project]) -> Vec<Project> {
    projects
        .iter()
        .filter(|p| is_case_study_eligible(p))
        .cloned()
        .collect()
}

pub fn featured_case_studies(projects: &[Project], limit: usize) -> Vec<Project> {
    projects
        .iter()
        .filter(|p| is_featured_case_study(p))
        .take(limit)
        .cloned()
        .collect()
}

/// Testimonials referring to `project_id`. Testimonials without a project never match.
pub fn testimonials_for_project(items: &[Testimonial], project_id: i64) -> Vec<Testimonial> {
    items
        .iter()
        .filter(|t| t.project_id == Some(project_id))
        .cloned()
        .collect()
}

/// Slice for 1-based `page`, along with the total page count.
///
/// Returns `None` when `page` or `per_page` is zero. Pages past the end are
/// empty.
pub fn paginate<T>(items: &[T], page: usize, per_page: usize) -> Option<(&[T], usize)> {
    if page == 0 || per_page == 0 {
        return None;
    }
    let total_pages = items.len().div_ceil(per_page);
    let start = (page - 1).saturating_mul(per_page).min(items.len());
    let end = start.saturating_add(per_page).min(items.len());
    Some((&items[start..end], total_pages))
}
