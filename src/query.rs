// src/query.rs

use std::fmt::Display;
use std::sync::OnceLock;

use regex::Regex;
use serde::de::DeserializeOwned;

use crate::client::SupabaseClient;
use crate::error::NearbyError;
use crate::geopoint::BoundingBox;

fn identifier_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").expect("identifier pattern is a valid regex")
    })
}

fn is_identifier(name: &str) -> bool {
    identifier_pattern().is_match(name)
}

/// A read query against one table, expressed in PostgREST's URL syntax
/// (`?column=op.value&order=column.asc&limit=n`).
///
/// Builder methods never fail; table and column names are checked when the query is
/// executed, and an invalid name yields [`NearbyError::InvalidQuery`].
#[derive(Debug, Clone)]
pub struct TableQuery {
    table: String,
    select: Vec<String>,
    filters: Vec<(String, String)>,
    order: Vec<String>,
    limit: Option<usize>,
    offset: Option<usize>,
}

impl TableQuery {
    /// Creates a new `TableQuery` for the specified table.
    pub fn new(table: &str) -> Self {
        Self {
            table: table.to_string(),
            select: Vec::new(),
            filters: Vec::new(),
            order: Vec::new(),
            limit: None,
            offset: None,
        }
    }

    /// Returns the table this query targets.
    pub fn table(&self) -> &str {
        &self.table
    }

    fn add_filter<V: Display>(&mut self, column: &str, operator: &str, value: V) -> &mut Self {
        self.filters
            .push((column.to_string(), format!("{}.{}", operator, value)));
        self
    }

    /// Restricts the columns returned. Defaults to every column.
    pub fn select(&mut self, columns: &[&str]) -> &mut Self {
        for column in columns {
            if !self.select.iter().any(|c| c == column) {
                self.select.push(column.to_string());
            }
        }
        self
    }

    /// Adds a constraint that a column must equal the given value.
    pub fn equal_to<V: Display>(&mut self, column: &str, value: V) -> &mut Self {
        self.add_filter(column, "eq", value)
    }

    /// Adds a constraint that a column must be greater than or equal to the given value.
    pub fn greater_than_or_equal_to<V: Display>(&mut self, column: &str, value: V) -> &mut Self {
        self.add_filter(column, "gte", value)
    }

    /// Adds a constraint that a column must be less than or equal to the given value.
    pub fn less_than_or_equal_to<V: Display>(&mut self, column: &str, value: V) -> &mut Self {
        self.add_filter(column, "lte", value)
    }

    /// Keeps only rows whose `latitude`/`longitude` columns fall inside `bbox`.
    pub fn within_bounds(&mut self, bbox: &BoundingBox) -> &mut Self {
        self.within_bounds_on("latitude", "longitude", bbox)
    }

    /// Like [`TableQuery::within_bounds`] for tables that name their coordinate columns
    /// differently.
    pub fn within_bounds_on(
        &mut self,
        latitude_column: &str,
        longitude_column: &str,
        bbox: &BoundingBox,
    ) -> &mut Self {
        self.greater_than_or_equal_to(latitude_column, bbox.min_lat)
            .less_than_or_equal_to(latitude_column, bbox.max_lat);
        // A full longitude span filters nothing, so leave it out of the URL.
        if bbox.min_lng > -180.0 || bbox.max_lng < 180.0 {
            self.greater_than_or_equal_to(longitude_column, bbox.min_lng)
                .less_than_or_equal_to(longitude_column, bbox.max_lng);
        }
        self
    }

    /// Sorts the results by a column in ascending order. Replaces existing sort order.
    pub fn order_by_ascending(&mut self, column: &str) -> &mut Self {
        self.order = vec![format!("{}.asc", column)];
        self
    }

    /// Sorts the results by a column in descending order. Replaces existing sort order.
    pub fn order_by_descending(&mut self, column: &str) -> &mut Self {
        self.order = vec![format!("{}.desc", column)];
        self
    }

    /// Sets the maximum number of rows to return.
    pub fn limit(&mut self, count: usize) -> &mut Self {
        self.limit = Some(count);
        self
    }

    /// Sets the number of rows to skip before returning.
    pub fn offset(&mut self, count: usize) -> &mut Self {
        self.offset = Some(count);
        self
    }

    /// Checks the table name and every referenced column name.
    pub fn validate(&self) -> Result<(), NearbyError> {
        if !is_identifier(&self.table) {
            return Err(NearbyError::InvalidQuery(format!(
                "'{}' is not a valid table name",
                self.table
            )));
        }
        let ordered = self
            .order
            .iter()
            .filter_map(|o| o.rsplit_once('.').map(|(column, _)| column));
        let columns = self
            .select
            .iter()
            .map(String::as_str)
            .filter(|c| *c != "*")
            .chain(self.filters.iter().map(|(c, _)| c.as_str()))
            .chain(ordered);
        for column in columns {
            if !is_identifier(column) {
                return Err(NearbyError::InvalidQuery(format!(
                    "'{}' is not a valid column name",
                    column
                )));
            }
        }
        Ok(())
    }

    /// Renders the query as URL parameters, `select` first, then filters in the order they
    /// were added, then ordering and paging.
    pub fn build_query_params(&self) -> Vec<(String, String)> {
        let mut params = Vec::new();
        let select = if self.select.is_empty() {
            "*".to_string()
        } else {
            self.select.join(",")
        };
        params.push(("select".to_string(), select));
        for (column, expression) in &self.filters {
            params.push((column.clone(), expression.clone()));
        }
        if !self.order.is_empty() {
            params.push(("order".to_string(), self.order.join(",")));
        }
        if let Some(limit_val) = self.limit {
            params.push(("limit".to_string(), limit_val.to_string()));
        }
        if let Some(offset_val) = self.offset {
            params.push(("offset".to_string(), offset_val.to_string()));
        }
        params
    }

    // --- Execution Methods ---

    /// Retrieves every row matching this query.
    pub async fn find<T: DeserializeOwned + Send + Sync + 'static>(
        &self,
        client: &SupabaseClient,
    ) -> Result<Vec<T>, NearbyError> {
        self.validate()?;
        let params = self.build_query_params();
        client._get_with_url_params(&self.table, &params).await
    }

    /// Retrieves the first row matching this query, if any.
    pub async fn first<T: DeserializeOwned + Send + Sync + 'static>(
        &self,
        client: &SupabaseClient,
    ) -> Result<Option<T>, NearbyError> {
        let mut query_clone = self.clone();
        query_clone.limit(1);
        let rows: Vec<T> = query_clone.find(client).await?;
        Ok(rows.into_iter().next())
    }
}
