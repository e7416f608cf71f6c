//! Introspect a live table's columns from `information_schema.columns`.

use crate::{
    BoxFuture, ColumnDescriptor, Connection, ConnectionExt, Diagnostics, Event, Result,
    SchemaCollection,
};
use serde_json::Number;
use tokio_postgres::Row;

/// A fully qualified table: database (catalog), schema and table name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableRef {
    pub database: String,
    pub schema: String,
    pub table: String,
}

impl TableRef {
    pub fn new(
        database: impl Into<String>,
        schema: impl Into<String>,
        table: impl Into<String>,
    ) -> Self {
        Self {
            database: database.into(),
            schema: schema.into(),
            table: table.into(),
        }
    }
}

impl std::fmt::Display for TableRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{}.{}", self.database, self.schema, self.table)
    }
}

/// Catalog query for a table's columns.
///
/// Identifiers are matched case-insensitively: both the catalog values and the
/// bound parameters are upper-cased.
pub fn columns_query() -> &'static str {
    r#"
SELECT
    column_name::text AS column_name,
    is_nullable::text AS is_nullable,
    data_type::text AS data_type,
    character_maximum_length::int8 AS character_maximum_length,
    numeric_precision::int8 AS numeric_precision,
    numeric_scale::int8 AS numeric_scale,
    datetime_precision::int8 AS datetime_precision
FROM information_schema.columns
WHERE upper(table_name) = $1
  AND upper(table_schema) = $2
  AND upper(table_catalog) = $3
ORDER BY ordinal_position
"#
}

/// Produces the actual schema of a table.
pub trait Inspector: Send + Sync {
    fn inspect<'a>(
        &'a self,
        target: &'a TableRef,
        diagnostics: &'a dyn Diagnostics,
    ) -> BoxFuture<'a, Result<SchemaCollection>>;
}

/// [`Inspector`] reading `information_schema.columns` over a Postgres connection.
pub struct CatalogInspector<'c, C: Connection> {
    conn: &'c C,
}

impl<'c, C: Connection> CatalogInspector<'c, C> {
    pub fn new(conn: &'c C) -> Self {
        Self { conn }
    }
}

impl<C: Connection> Inspector for CatalogInspector<'_, C> {
    fn inspect<'a>(
        &'a self,
        target: &'a TableRef,
        diagnostics: &'a dyn Diagnostics,
    ) -> BoxFuture<'a, Result<SchemaCollection>> {
        Box::pin(async move {
            diagnostics.emit(Event::info("querying catalog for table schema").with("table", target));

            let table = target.table.to_uppercase();
            let schema = target.schema.to_uppercase();
            let database = target.database.to_uppercase();

            let rows = match self
                .conn
                .traced()
                .query(columns_query(), &[&table, &schema, &database])
                .await
            {
                Ok(rows) => rows,
                Err(e) => {
                    diagnostics.emit(
                        Event::error("catalog query failed")
                            .with("table", target)
                            .with("error", &e),
                    );
                    return Err(e.into());
                }
            };

            let columns = rows
                .iter()
                .map(descriptor_from_row)
                .collect::<Result<SchemaCollection>>()?;

            if columns.is_empty() {
                diagnostics.emit(Event::warning("catalog returned no columns").with("table", target));
            } else {
                diagnostics.emit(
                    Event::info("retrieved actual schema")
                        .with("table", target)
                        .with("columns", columns.len()),
                );
            }

            Ok(columns)
        })
    }
}

fn descriptor_from_row(row: &Row) -> Result<ColumnDescriptor> {
    let number = |column: &str| -> Result<Option<Number>> {
        Ok(row.try_get::<_, Option<i64>>(column)?.map(Number::from))
    };

    Ok(ColumnDescriptor {
        name: row.try_get("column_name")?,
        data_type: row.try_get("data_type")?,
        is_nullable: row.try_get("is_nullable")?,
        character_maximum_length: number("character_maximum_length")?,
        numeric_precision: number("numeric_precision")?,
        numeric_scale: number("numeric_scale")?,
        datetime_precision: number("datetime_precision")?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_ref_display() {
        let target = TableRef::new("DEV_OMACL_DB", "LANDING_OMACL_SCHEMA", "CT_COUNTRY");
        assert_eq!(target.to_string(), "DEV_OMACL_DB.LANDING_OMACL_SCHEMA.CT_COUNTRY");
    }

    #[test]
    fn test_columns_query_filters_case_insensitively() {
        let sql = columns_query();
        assert!(sql.contains("FROM information_schema.columns"));
        assert!(sql.contains("upper(table_name) = $1"));
        assert!(sql.contains("upper(table_schema) = $2"));
        assert!(sql.contains("upper(table_catalog) = $3"));
        assert!(sql.contains("ORDER BY ordinal_position"));
    }
}
