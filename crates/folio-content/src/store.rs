//! The content store seam and its query descriptions.
//!
//! A [`ContentStore`] answers [`Query`] values: a collection plus optional
//! path match, field filters, ordering and limit. [`Query::apply`] holds the
//! reference semantics so every store agrees on them:
//!
//! 1. path match
//! 2. filters (a record lacking the field only matches `!=`)
//! 3. stable ordering; every remaining record must carry the order field
//! 4. truncation to the limit (`0` yields nothing)

use std::cmp::Ordering;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use folio_core::{Collection, Record, date::parse_date};
use serde_json::Value;

use crate::{
    error::{ContentError, Result},
    key::CacheKey,
};

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Asc,
    Desc,
}

impl Direction {
    /// Direction used when a caller orders by `field` without choosing one:
    /// descending for date-like fields, ascending otherwise.
    pub fn default_for(field: &str) -> Self {
        let leaf = field.rsplit('.').next().unwrap_or(field);
        let lower = leaf.to_ascii_lowercase();
        if lower.ends_with("date") || lower.ends_with("updated") || leaf.ends_with("At") {
            Self::Desc
        } else {
            Self::Asc
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Asc => "asc",
            Self::Desc => "desc",
        }
    }
}

/// Comparison operator of a filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operator {
    Eq,
    Ne,
    Gt,
    Gte,
    Lt,
    Lte,
}

impl Operator {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Eq => "=",
            Self::Ne => "!=",
            Self::Gt => ">",
            Self::Gte => ">=",
            Self::Lt => "<",
            Self::Lte => "<=",
        }
    }
}

/// `field <op> value` predicate.
#[derive(Debug, Clone, PartialEq)]
pub struct Filter {
    pub field: String,
    pub op: Operator,
    pub value: Value,
}

impl Filter {
    fn matches(&self, fields: &Value) -> bool {
        let Some(actual) = Record::lookup(fields, &self.field) else {
            return self.op == Operator::Ne;
        };
        let ordering = compare_values(actual, &self.value);
        match self.op {
            Operator::Eq => ordering == Some(Ordering::Equal),
            Operator::Ne => ordering != Some(Ordering::Equal),
            Operator::Gt => ordering.is_some_and(Ordering::is_gt),
            Operator::Gte => ordering.is_some_and(Ordering::is_ge),
            Operator::Lt => ordering.is_some_and(Ordering::is_lt),
            Operator::Lte => ordering.is_some_and(Ordering::is_le),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Order {
    pub field: String,
    pub direction: Direction,
}

/// A query against one collection.
#[derive(Debug, Clone, PartialEq)]
pub struct Query {
    pub collection: Collection,
    pub path: Option<String>,
    pub filters: Vec<Filter>,
    pub order: Option<Order>,
    pub limit: Option<usize>,
}

impl Query {
    pub fn new(collection: Collection) -> Self {
        Self {
            collection,
            path: None,
            filters: Vec::new(),
            order: None,
            limit: None,
        }
    }

    #[must_use]
    pub fn path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }

    #[must_use]
    pub fn filter(
        mut self,
        field: impl Into<String>,
        op: Operator,
        value: impl Into<Value>,
    ) -> Self {
        self.filters.push(Filter {
            field: field.into(),
            op,
            value: value.into(),
        });
        self
    }

    #[must_use]
    pub fn order(mut self, field: impl Into<String>, direction: Direction) -> Self {
        self.order = Some(Order {
            field: field.into(),
            direction,
        });
        self
    }

    #[must_use]
    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Key of the form `<collection>-<descriptor>`, one parameter per clause.
    pub fn cache_key(&self) -> CacheKey {
        let mut key = CacheKey::new(self.collection.name());
        let mut clauses = 0;
        if let Some(path) = &self.path {
            key = key.param(format_args!("path:{path}"));
            clauses += 1;
        }
        for filter in &self.filters {
            key = key.param(format_args!(
                "where:{}{}{}",
                filter.field,
                filter.op.as_str(),
                filter.value
            ));
            clauses += 1;
        }
        if let Some(order) = &self.order {
            key = key.param(format_args!(
                "order:{}:{}",
                order.field,
                order.direction.as_str()
            ));
            clauses += 1;
        }
        if let Some(limit) = self.limit {
            key = key.param(format_args!("limit:{limit}"));
            clauses += 1;
        }
        if clauses == 0 {
            key = key.param("all");
        }
        key
    }

    /// Evaluate this query over `records`, ignoring records of other collections.
    pub fn apply(&self, records: &[Record]) -> Result<Vec<Record>> {
        let candidates = records
            .iter()
            .filter(|r| r.collection() == self.collection)
            .filter(|r| self.path.as_deref().is_none_or(|p| r.path() == Some(p)));

        if self.filters.is_empty() && self.order.is_none() {
            let mut matched: Vec<Record> = candidates.cloned().collect();
            if let Some(limit) = self.limit {
                matched.truncate(limit);
            }
            return Ok(matched);
        }

        // Serialize each record once for all filter and order lookups.
        let mut matched: Vec<(Value, &Record)> = candidates
            .map(|r| (r.fields(), r))
            .filter(|(fields, _)| self.filters.iter().all(|f| f.matches(fields)))
            .collect();

        if let Some(order) = &self.order {
            matched = sort_records(self.collection, order, matched)?;
        }
        if let Some(limit) = self.limit {
            matched.truncate(limit);
        }
        Ok(matched.into_iter().map(|(_, r)| r.clone()).collect())
    }
}

/// Materialized sort key of one record.
#[derive(Debug)]
enum SortKey {
    Integer(i64),
    Number(f64),
    Date(DateTime<Utc>),
    Text(String),
    Bool(bool),
}

impl SortKey {
    fn compare(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Self::Integer(a), Self::Integer(b)) => a.cmp(b),
            (Self::Number(a), Self::Number(b)) => a.total_cmp(b),
            (Self::Date(a), Self::Date(b)) => a.cmp(b),
            (Self::Text(a), Self::Text(b)) => a.cmp(b),
            (Self::Bool(a), Self::Bool(b)) => a.cmp(b),
            _ => Ordering::Equal,
        }
    }
}

fn sort_records<'a>(
    collection: Collection,
    order: &Order,
    records: Vec<(Value, &'a Record)>,
) -> Result<Vec<(Value, &'a Record)>> {
    let mut values = Vec::with_capacity(records.len());
    for (fields, record) in &records {
        let value = Record::lookup(fields, &order.field).ok_or_else(|| {
            ContentError::malformed(format!(
                "cannot order {collection} by `{}`: record {} has no such field",
                order.field, record.id
            ))
        })?;
        values.push(value.clone());
    }

    let keys = sort_keys(collection, &order.field, values)?;
    let mut keyed: Vec<(SortKey, (Value, &Record))> = keys.into_iter().zip(records).collect();
    // sort_by is stable: ties keep their relative order in either direction
    keyed.sort_by(|(a, _), (b, _)| match order.direction {
        Direction::Asc => a.compare(b),
        Direction::Desc => b.compare(a),
    });
    Ok(keyed.into_iter().map(|(_, record)| record).collect())
}

fn sort_keys(collection: Collection, field: &str, values: Vec<Value>) -> Result<Vec<SortKey>> {
    let mixed = || {
        ContentError::malformed(format!(
            "cannot order {collection} by `{field}`: values are not of one orderable type"
        ))
    };

    if values.iter().all(Value::is_i64) {
        return Ok(values
            .iter()
            .filter_map(Value::as_i64)
            .map(SortKey::Integer)
            .collect());
    }
    if values.iter().all(Value::is_number) {
        return values
            .iter()
            .map(|v| v.as_f64().map(SortKey::Number).ok_or_else(|| mixed()))
            .collect();
    }
    if values.iter().all(Value::is_boolean) {
        return Ok(values
            .iter()
            .filter_map(Value::as_bool)
            .map(SortKey::Bool)
            .collect());
    }
    if values.iter().all(Value::is_string) {
        let texts: Vec<String> = values
            .into_iter()
            .filter_map(|v| match v {
                Value::String(s) => Some(s),
                _ => None,
            })
            .collect();
        let dates: Option<Vec<SortKey>> = texts
            .iter()
            .map(|s| parse_date(s).map(SortKey::Date))
            .collect();
        return Ok(dates.unwrap_or_else(|| texts.into_iter().map(SortKey::Text).collect()));
    }
    Err(mixed())
}

/// Compare two scalar values; `None` when they are not comparable.
fn compare_values(a: &Value, b: &Value) -> Option<Ordering> {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => match (x.as_i64(), y.as_i64()) {
            (Some(x), Some(y)) => Some(x.cmp(&y)),
            _ => x.as_f64()?.partial_cmp(&y.as_f64()?),
        },
        (Value::String(x), Value::String(y)) => match (parse_date(x), parse_date(y)) {
            (Some(dx), Some(dy)) => Some(dx.cmp(&dy)),
            _ => Some(x.cmp(y)),
        },
        (Value::Bool(x), Value::Bool(y)) => Some(x.cmp(y)),
        _ => (a == b).then_some(Ordering::Equal),
    }
}

/// Source of content records.
///
/// Implementations own retries and timeouts; callers above this seam only
/// see the final result.
#[async_trait]
pub trait ContentStore: Send + Sync {
    /// Execute `query`, returning matching records in result order.
    async fn execute(&self, query: &Query) -> Result<Vec<Record>>;
}

/// Fluent query construction against a store.
pub trait ContentStoreExt: ContentStore {
    fn query(&self, collection: Collection) -> QueryBuilder<'_, Self> {
        QueryBuilder {
            store: self,
            query: Query::new(collection),
        }
    }
}

impl<S: ContentStore + ?Sized> ContentStoreExt for S {}

/// Builder returned by [`ContentStoreExt::query`].
#[derive(Debug)]
pub struct QueryBuilder<'a, S: ?Sized> {
    store: &'a S,
    query: Query,
}

impl<'a, S: ContentStore + ?Sized> QueryBuilder<'a, S> {
    /// Keep records where `field <op> value` holds.
    #[must_use]
    pub fn filter(
        mut self,
        field: impl Into<String>,
        op: Operator,
        value: impl Into<Value>,
    ) -> Self {
        self.query = self.query.filter(field, op, value);
        self
    }

    #[must_use]
    pub fn order(mut self, field: impl Into<String>, direction: Direction) -> Self {
        self.query = self.query.order(field, direction);
        self
    }

    #[must_use]
    pub fn limit(mut self, limit: usize) -> Self {
        self.query = self.query.limit(limit);
        self
    }

    #[must_use]
    pub fn path(mut self, path: impl Into<String>) -> Self {
        self.query = self.query.path(path);
        self
    }

    pub fn as_query(&self) -> &Query {
        &self.query
    }

    pub fn into_query(self) -> Query {
        self.query
    }

    /// All matching records.
    pub async fn all(self) -> Result<Vec<Record>> {
        self.store.execute(&self.query).await
    }

    /// The first matching record, if any.
    pub async fn first(self) -> Result<Option<Record>> {
        let mut query = self.query;
        query.limit = Some(query.limit.map_or(1, |limit| limit.min(1)));
        Ok(self.store.execute(&query).await?.into_iter().next())
    }
}

#[cfg(test)]
mod tests {
    use folio_core::{BlogPost, Testimonial};
    use serde_json::json;

    use super::*;

    fn testimonial(id: i64, project_id: Option<i64>, rating: Option<i64>) -> Record {
        let mut value = json!({"id": id, "name": format!("T{id}"), "quote": "q"});
        if let Some(project_id) = project_id {
            value["projectId"] = json!(project_id);
        }
        if let Some(rating) = rating {
            value["rating"] = json!(rating);
        }
        Record::new(serde_json::from_value::<Testimonial>(value).unwrap())
    }

    fn post(slug: &str, date: &str, featured: Option<bool>) -> Record {
        let mut value = json!({
            "path": format!("/blog/{slug}"),
            "title": slug,
            "date": date,
            "author": "Jane"
        });
        if let Some(featured) = featured {
            value["featured"] = json!(featured);
        }
        Record::new(serde_json::from_value::<BlogPost>(value).unwrap())
    }

    fn ids(records: &[Record]) -> Vec<String> {
        records.iter().map(|r| r.id.to_string()).collect()
    }

    #[test]
    fn test_default_direction() {
        assert_eq!(Direction::default_for("date"), Direction::Desc);
        assert_eq!(Direction::default_for("dateUpdated"), Direction::Desc);
        assert_eq!(Direction::default_for("publishedAt"), Direction::Desc);
        assert_eq!(Direction::default_for("id"), Direction::Asc);
        assert_eq!(Direction::default_for("title"), Direction::Asc);
    }

    #[test]
    fn test_apply_without_clauses_keeps_order() {
        let records = vec![testimonial(3, None, None), testimonial(1, None, None)];
        let result = Query::new(Collection::Testimonials)
            .apply(&records)
            .unwrap();
        assert_eq!(ids(&result), vec!["3", "1"]);
    }

    #[test]
    fn test_apply_ignores_other_collections() {
        let records = vec![testimonial(1, None, None), post("a", "2024-01-01", None)];
        let result = Query::new(Collection::Blog).apply(&records).unwrap();
        assert_eq!(ids(&result), vec!["/blog/a"]);
    }

    #[test]
    fn test_order_numeric_ascending() {
        let records = vec![
            testimonial(3, None, None),
            testimonial(1, None, None),
            testimonial(2, None, None),
        ];
        let result = Query::new(Collection::Testimonials)
            .order("id", Direction::Asc)
            .apply(&records)
            .unwrap();
        assert_eq!(ids(&result), vec!["1", "2", "3"]);
    }

    #[test]
    fn test_large_integer_ids_compare_exactly() {
        let big = 9_007_199_254_740_992;
        let records = vec![testimonial(big + 1, None, None), testimonial(big, None, None)];

        let sorted = Query::new(Collection::Testimonials)
            .order("id", Direction::Asc)
            .apply(&records)
            .unwrap();
        assert_eq!(ids(&sorted), vec![big.to_string(), (big + 1).to_string()]);

        let exact = Query::new(Collection::Testimonials)
            .filter("id", Operator::Eq, big + 1)
            .apply(&records)
            .unwrap();
        assert_eq!(ids(&exact), vec![(big + 1).to_string()]);
    }

    #[test]
    fn test_order_dates_descending_is_stable() {
        let records = vec![
            post("old", "2023-05-01", None),
            post("tie-a", "2024-01-01", None),
            post("new", "2024-06-01T08:00:00Z", None),
            post("tie-b", "2024-01-01", None),
        ];
        let result = Query::new(Collection::Blog)
            .order("date", Direction::Desc)
            .apply(&records)
            .unwrap();
        assert_eq!(
            ids(&result),
            vec!["/blog/new", "/blog/tie-a", "/blog/tie-b", "/blog/old"]
        );
    }

    #[test]
    fn test_order_by_missing_field_is_malformed() {
        let records = vec![testimonial(1, None, Some(5)), testimonial(2, None, None)];
        let err = Query::new(Collection::Testimonials)
            .order("rating", Direction::Desc)
            .apply(&records)
            .unwrap_err();
        assert!(err.is_malformed_query());
        assert!(err.to_string().contains("rating"));
        assert!(err.to_string().contains("record 2"));
    }

    #[test]
    fn test_order_on_empty_collection_succeeds() {
        let result = Query::new(Collection::Blog)
            .order("date", Direction::Desc)
            .apply(&[])
            .unwrap();
        assert!(result.is_empty());
    }

    #[test]
    fn test_order_by_non_scalar_is_malformed() {
        let records = vec![post("a", "2024-01-01", None), post("b", "2024-01-02", None)];
        let err = Query::new(Collection::Blog)
            .order("tags", Direction::Asc)
            .apply(&records)
            .unwrap_err();
        assert!(err.is_malformed_query());
    }

    #[test]
    fn test_filter_treats_absent_as_non_matching() {
        let records = vec![
            post("a", "2024-01-01", Some(true)),
            post("b", "2024-01-02", None),
            post("c", "2024-01-03", Some(false)),
        ];
        let featured = Query::new(Collection::Blog)
            .filter("featured", Operator::Eq, true)
            .apply(&records)
            .unwrap();
        assert_eq!(ids(&featured), vec!["/blog/a"]);

        let not_featured = Query::new(Collection::Blog)
            .filter("featured", Operator::Ne, true)
            .apply(&records)
            .unwrap();
        assert_eq!(ids(&not_featured), vec!["/blog/b", "/blog/c"]);
    }

    #[test]
    fn test_filter_comparisons() {
        let records = vec![
            testimonial(1, Some(10), None),
            testimonial(2, Some(20), None),
            testimonial(3, None, None),
        ];
        let result = Query::new(Collection::Testimonials)
            .filter("projectId", Operator::Gte, 15)
            .apply(&records)
            .unwrap();
        assert_eq!(ids(&result), vec!["2"]);

        let result = Query::new(Collection::Testimonials)
            .filter("projectId", Operator::Lt, 15.5)
            .apply(&records)
            .unwrap();
        assert_eq!(ids(&result), vec!["1"]);
    }

    #[test]
    fn test_limit_zero_yields_empty() {
        let records = vec![testimonial(1, None, None)];
        let result = Query::new(Collection::Testimonials)
            .limit(0)
            .apply(&records)
            .unwrap();
        assert!(result.is_empty());
    }

    #[test]
    fn test_path_match() {
        let records = vec![post("a", "2024-01-01", None), post("b", "2024-01-02", None)];
        let result = Query::new(Collection::Blog)
            .path("/blog/b")
            .apply(&records)
            .unwrap();
        assert_eq!(ids(&result), vec!["/blog/b"]);

        let none = Query::new(Collection::Blog)
            .path("/blog/zzz")
            .apply(&records)
            .unwrap();
        assert!(none.is_empty());
    }

    #[test]
    fn test_cache_key_descriptor() {
        let all = Query::new(Collection::Blog).cache_key();
        assert_eq!(all.as_str(), "blog-all");

        let key = Query::new(Collection::Blog)
            .filter("featured", Operator::Eq, true)
            .order("date", Direction::Desc)
            .limit(2)
            .cache_key();
        let expected = "blog-where:featured=true-order:date:desc-limit:2";
        assert_eq!(key.as_str(), expected);

        let asc = Query::new(Collection::Blog)
            .order("date", Direction::Asc)
            .cache_key();
        let desc = Query::new(Collection::Blog)
            .order("date", Direction::Desc)
            .cache_key();
        assert_ne!(asc, desc);
    }
}
