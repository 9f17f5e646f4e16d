//! Query planning per entity kind
//!
//! A [`QueryPlanner`] binds one entity's base table to its related-table
//! bindings and resolves which SQL template applies to a requested table.
//! Bindings are fixed at construction; an unregistered table surfaces as
//! [`CinesyncError::UnknownRelation`].

use crate::core::extract::query;
use crate::domain::{CatalogTable, CinesyncError, Result};
use std::collections::HashMap;

/// How a related table joins back to the base table through an intermediate
/// many-to-many table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RelatedTableBinding {
    /// Intermediate table name
    pub join_table: &'static str,

    /// Column of the join table holding the base entity id
    pub base_id_column: &'static str,

    /// Column of the join table holding the related entity id
    pub related_id_column: &'static str,
}

/// Resolves extraction and transform queries for one entity kind
#[derive(Debug, Clone)]
pub struct QueryPlanner {
    base_table: CatalogTable,
    transform_sql: &'static str,
    bindings: HashMap<CatalogTable, RelatedTableBinding>,
}

impl QueryPlanner {
    /// Create a planner for `base_table` with its related-table bindings
    pub fn new(
        base_table: CatalogTable,
        transform_sql: &'static str,
        bindings: impl IntoIterator<Item = (CatalogTable, RelatedTableBinding)>,
    ) -> Self {
        Self {
            base_table,
            transform_sql,
            bindings: bindings.into_iter().collect(),
        }
    }

    /// The entity's own base table
    pub fn base_table(&self) -> CatalogTable {
        self.base_table
    }

    /// Whether this planner can build an extract query for `table`
    pub fn binds(&self, table: CatalogTable) -> bool {
        table == self.base_table || self.bindings.contains_key(&table)
    }

    /// Build the changed-id extraction query for `table`
    ///
    /// The entity's own base table gets the target-scan shape; a bound
    /// related table gets the join-through shape.
    ///
    /// # Errors
    ///
    /// Returns [`CinesyncError::UnknownRelation`] for a table with no
    /// registered binding. This is a static misconfiguration and is fatal.
    pub fn extract_query(&self, table: CatalogTable) -> Result<String> {
        if table == self.base_table {
            return Ok(query::target_query(self.base_table.qualified_name()));
        }

        let binding =
            self.bindings
                .get(&table)
                .ok_or_else(|| CinesyncError::UnknownRelation {
                    table: table.qualified_name().to_string(),
                    base: self.base_table.qualified_name().to_string(),
                })?;

        Ok(query::related_query(
            self.base_table.qualified_name(),
            table.qualified_name(),
            binding.join_table,
            binding.base_id_column,
            binding.related_id_column,
        ))
    }

    /// Denormalizing transform query for this entity kind; ids are bound at
    /// execution time.
    pub fn transform_query(&self) -> &'static str {
        self.transform_sql
    }

    /// Bootstrap query returning the base table's minimum `updated_at`
    pub fn earliest_update_query(&self) -> String {
        query::earliest_update_query(self.base_table.qualified_name())
    }
}
