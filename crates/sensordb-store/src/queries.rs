//! Query builder for stored samples.
//!
//! [`SampleQuery`] follows the builder pattern; every filter is optional
//! and can be chained in any order.
//!
//! # Example
//!
//! ```
//! use sensordb_store::{Reading, Retention, SampleQuery, Store};
//!
//! let store = Store::open_in_memory(Retention::Unbounded)?;
//! store.append(&Reading::new(21.0, 1013.0, 20.8, 45.0))?;
//!
//! // The ten newest samples
//! let recent = store.query(&SampleQuery::new().limit(10))?;
//!
//! // Everything after id 42, in append order
//! let newer = store.query(&SampleQuery::new().after_id(42).oldest_first())?;
//! # assert_eq!(recent.len(), 1);
//! # assert!(newer.is_empty());
//! # Ok::<(), sensordb_store::Error>(())
//! ```

/// Fluent query builder for samples.
///
/// Use this to construct queries for [`Store::query`](crate::Store::query).
/// By default results are ordered by `id` descending (newest first) with
/// no limit.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct SampleQuery {
    /// Only samples with an id strictly greater than this.
    pub after_id: Option<i64>,
    /// Maximum number of results.
    pub limit: Option<usize>,
    /// Order by id descending (newest first).
    pub newest_first: bool,
}

impl SampleQuery {
    /// Create a new query: all samples, newest first.
    pub fn new() -> Self {
        Self {
            newest_first: true,
            ..Default::default()
        }
    }

    /// Only return samples appended after the sample with this id.
    pub fn after_id(mut self, id: i64) -> Self {
        self.after_id = Some(id);
        self
    }

    /// Limit the maximum number of results returned.
    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Order results by oldest first (ascending `id`).
    pub fn oldest_first(mut self) -> Self {
        self.newest_first = false;
        self
    }

    /// Build the SQL statement and its parameters.
    pub(crate) fn build_sql(&self) -> (String, Vec<i64>) {
        let mut params = Vec::new();

        let where_clause = match self.after_id {
            Some(id) => {
                params.push(id);
                "WHERE id > ?"
            }
            None => "",
        };

        let order = if self.newest_first { "DESC" } else { "ASC" };

        let mut sql = format!(
            "SELECT id, timestamp, bmp280_temperature, bmp280_pressure, \
             htu21d_temperature, htu21d_humidity \
             FROM SensorData {} ORDER BY id {}",
            where_clause, order
        );

        if let Some(limit) = self.limit {
            sql.push_str(" LIMIT ?");
            params.push(i64::try_from(limit).unwrap_or(i64::MAX));
        }

        (sql, params)
    }
}
