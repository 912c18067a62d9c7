//! Record sources for stops and route points.
//!
//! The tour never talks to a transport directly. It describes what it needs as a
//! [`Query`] and hands it to a [`DataSource`], which resolves to an ordered list of
//! [`Record`]s.

pub mod json_file;
pub mod memory;

use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::future::Future;
use std::pin::Pin;

use crate::foundation::core::{Point, Polyline};
use crate::foundation::error::TourResult;
use crate::foundation::spatial::SpatialReference;

/// Geometry carried by a record.
#[derive(Clone, Debug, PartialEq)]
pub enum Geometry {
    /// A single position.
    Point(Point),
    /// A multi-part line.
    Polyline(Polyline),
}

impl Geometry {
    /// Reproject every vertex from `from` into `to`.
    pub fn project(self, from: SpatialReference, to: SpatialReference) -> Self {
        if from.equivalent(to) {
            return self;
        }
        match self {
            Self::Point(p) => Self::Point(from.project_to(p, to)),
            Self::Polyline(line) => Self::Polyline(Polyline {
                paths: line
                    .paths
                    .into_iter()
                    .map(|path| path.into_iter().map(|p| from.project_to(p, to)).collect())
                    .collect(),
            }),
        }
    }
}

/// One row returned by a query: optional geometry plus named attribute values.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Record {
    /// `None` means the record has no geometry.
    pub geometry: Option<Geometry>,
    /// Field name to value.
    pub attributes: BTreeMap<String, serde_json::Value>,
}

impl Record {
    /// Record with a point geometry and no attributes.
    pub fn point(p: Point) -> Self {
        Self {
            geometry: Some(Geometry::Point(p)),
            attributes: BTreeMap::new(),
        }
    }

    /// Record without geometry.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Builder-style attribute setter.
    pub fn with_attribute(
        mut self,
        field: impl Into<String>,
        value: impl Into<serde_json::Value>,
    ) -> Self {
        self.attributes.insert(field.into(), value.into());
        self
    }

    /// `true` when `field` is present, even if its value is null.
    pub fn has_field(&self, field: &str) -> bool {
        self.attributes.contains_key(field)
    }

    /// Integer value of `field`. Integral floats and numeric strings are accepted.
    pub fn int_attribute(&self, field: &str) -> Option<i64> {
        match self.attributes.get(field)? {
            serde_json::Value::Number(n) => n.as_i64().or_else(|| {
                n.as_f64()
                    .filter(|f| f.fract() == 0.0 && f.abs() < i64::MAX as f64)
                    .map(|f| f as i64)
            }),
            serde_json::Value::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    /// Display text of `field`. Numbers are formatted, null is `None`.
    pub fn text_attribute(&self, field: &str) -> Option<String> {
        match self.attributes.get(field)? {
            serde_json::Value::String(s) => Some(s.clone()),
            serde_json::Value::Null => None,
            other => Some(other.to_string()),
        }
    }
}

/// Description of a record query.
#[derive(Clone, Debug, PartialEq)]
pub struct Query {
    /// Locator of the record collection (URL, path, table name).
    pub endpoint: String,
    /// Fields to return. Empty means every field.
    pub out_fields: Vec<String>,
    /// Return every record of the collection.
    pub filter_all: bool,
    /// Field to sort ascending by.
    pub order_by: Option<String>,
    /// Reference the returned geometry must be expressed in.
    pub out_spatial_reference: SpatialReference,
}

impl Query {
    /// Unfiltered query returning every field of `endpoint`.
    pub fn all(endpoint: impl Into<String>, out_spatial_reference: SpatialReference) -> Self {
        Self {
            endpoint: endpoint.into(),
            out_fields: Vec::new(),
            filter_all: true,
            order_by: None,
            out_spatial_reference,
        }
    }

    /// Restrict the returned fields.
    pub fn with_out_fields<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.out_fields = fields.into_iter().map(Into::into).collect();
        self
    }

    /// Sort results ascending by `field`.
    pub fn ordered_by(mut self, field: impl Into<String>) -> Self {
        self.order_by = Some(field.into());
        self
    }

    /// Shape a raw table into the result of this query: project geometry, keep
    /// only the requested fields, then stable-sort by the order-by field.
    ///
    /// Sources that hold records locally use this instead of reimplementing the
    /// query semantics.
    pub fn apply(&self, records: Vec<Record>, native: SpatialReference) -> Vec<Record> {
        let mut out: Vec<Record> = records
            .into_iter()
            .map(|r| Record {
                geometry: r
                    .geometry
                    .map(|g| g.project(native, self.out_spatial_reference)),
                attributes: if self.out_fields.is_empty() {
                    r.attributes
                } else {
                    r.attributes
                        .into_iter()
                        .filter(|(k, _)| self.out_fields.iter().any(|f| f == k))
                        .collect()
                },
            })
            .collect();

        if let Some(field) = &self.order_by {
            out.sort_by(|a, b| compare_values(a.attributes.get(field), b.attributes.get(field)));
        }
        out
    }
}

// Missing values sort last, numbers before strings.
fn compare_values(a: Option<&serde_json::Value>, b: Option<&serde_json::Value>) -> Ordering {
    use serde_json::Value;
    match (a, b) {
        (Some(Value::Number(x)), Some(Value::Number(y))) => {
            let x = x.as_f64().unwrap_or(f64::NAN);
            let y = y.as_f64().unwrap_or(f64::NAN);
            x.total_cmp(&y)
        }
        (Some(Value::String(x)), Some(Value::String(y))) => x.cmp(y),
        (Some(Value::Number(_)), Some(_)) => Ordering::Less,
        (Some(_), Some(Value::Number(_))) => Ordering::Greater,
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        _ => Ordering::Equal,
    }
}

/// Boxed future returned by [`DataSource::query`].
pub type QueryFuture<'a> = Pin<Box<dyn Future<Output = TourResult<Vec<Record>>> + 'a>>;

/// Executes record queries.
///
/// Implementations report failures as [`TourError::Query`](crate::TourError::Query).
/// Futures are not required to be `Send`: the tour runs on a single thread.
pub trait DataSource {
    /// Run `query` and resolve to the matching records in query order.
    fn query<'a>(&'a self, query: &'a Query) -> QueryFuture<'a>;
}

impl<T: DataSource + ?Sized> DataSource for std::rc::Rc<T> {
    fn query<'a>(&'a self, query: &'a Query) -> QueryFuture<'a> {
        (**self).query(query)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/source/query.rs"]
mod tests;
