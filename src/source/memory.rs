use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use crate::foundation::error::TourError;
use crate::foundation::spatial::SpatialReference;
use crate::source::{DataSource, Query, QueryFuture, Record};

/// In-memory [`DataSource`] answering queries from tables keyed by endpoint.
///
/// Every query issued is logged and can be inspected with [`MemorySource::queries`].
#[derive(Clone, Debug, Default)]
pub struct MemorySource {
    native: SpatialReference,
    tables: HashMap<String, Vec<Record>>,
    failures: HashMap<String, String>,
    log: Rc<RefCell<Vec<Query>>>,
}

impl MemorySource {
    /// Empty source whose records are expressed in `native`.
    pub fn new(native: SpatialReference) -> Self {
        Self {
            native,
            ..Self::default()
        }
    }

    /// Register the records served for `endpoint`.
    pub fn with_table(mut self, endpoint: impl Into<String>, records: Vec<Record>) -> Self {
        self.tables.insert(endpoint.into(), records);
        self
    }

    /// Make every query against `endpoint` fail with `message`.
    pub fn with_failure(mut self, endpoint: impl Into<String>, message: impl Into<String>) -> Self {
        self.failures.insert(endpoint.into(), message.into());
        self
    }

    /// Queries received so far, in arrival order.
    pub fn queries(&self) -> Vec<Query> {
        self.log.borrow().clone()
    }
}

impl DataSource for MemorySource {
    fn query<'a>(&'a self, query: &'a Query) -> QueryFuture<'a> {
        Box::pin(async move {
            self.log.borrow_mut().push(query.clone());
            // Give concurrently issued queries a chance to start.
            tokio::task::yield_now().await;

            if let Some(message) = self.failures.get(&query.endpoint) {
                return Err(TourError::query(format!("{}: {message}", query.endpoint)));
            }
            if !query.filter_all {
                return Err(TourError::query("filtered queries are not supported"));
            }
            let records = self.tables.get(&query.endpoint).ok_or_else(|| {
                TourError::query(format!("unknown endpoint '{}'", query.endpoint))
            })?;
            Ok(query.apply(records.clone(), self.native))
        })
    }
}

#[cfg(test)]
#[path = "../../tests/unit/source/memory.rs"]
mod tests;
