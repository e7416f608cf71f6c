//! Catalog introspection against a real PostgreSQL.
//!
//! Run with: cargo nextest run -p schemacheck --features test-postgres
//!
//! Uses `POSTGRES_HOST`/`POSTGRES_PORT` when set, otherwise starts a container
//! (requires Docker).

#![cfg(feature = "test-postgres")]

use schemacheck::{
    CatalogInspector, CheckPlan, CheckStatus, CompareOptions, Inspector, RecordingDiagnostics,
    SchemaSource, Severity, TableRef, run_check,
};
use serde_json::Number;
use std::time::Duration;
use testcontainers_modules::postgres::Postgres;
use testcontainers_modules::testcontainers::ContainerAsync;
use testcontainers_modules::testcontainers::runners::AsyncRunner;
use tokio_postgres::{Client, NoTls};

/// Connect to postgres, starting a container when no server is configured.
async fn setup_postgres() -> (Option<ContainerAsync<Postgres>>, Client) {
    let (container, host, port) = match (
        std::env::var("POSTGRES_HOST"),
        std::env::var("POSTGRES_PORT"),
    ) {
        (Ok(host), Ok(port)) => (None, host, port.parse::<u16>().unwrap()),
        _ => {
            let container = Postgres::default()
                .start()
                .await
                .expect("failed to start postgres container");
            let host = container.get_host().await.unwrap().to_string();
            let port = container.get_host_port_ipv4(5432).await.unwrap();
            (Some(container), host, port)
        }
    };

    let conn_str = format!(
        "host={} port={} user=postgres password=postgres dbname=postgres",
        host, port
    );

    let mut attempts = 0;
    let (client, connection) = loop {
        attempts += 1;
        match tokio_postgres::connect(&conn_str, NoTls).await {
            Ok(result) => break result,
            Err(e) if attempts < 10 => {
                tracing::debug!("connection attempt {} failed: {}, retrying", attempts, e);
                tokio::time::sleep(Duration::from_millis(500)).await;
            }
            Err(e) => panic!("failed to connect to postgres after {} attempts: {}", attempts, e),
        }
    };

    tokio::spawn(async move {
        if let Err(e) = connection.await {
            eprintln!("connection error: {}", e);
        }
    });

    (container, client)
}

async fn create_country_table(client: &Client) {
    client
        .batch_execute(
            r#"
            DROP SCHEMA IF EXISTS landing CASCADE;
            CREATE SCHEMA landing;
            CREATE TABLE landing.ct_country (
                country_code VARCHAR(3) NOT NULL,
                country_name TEXT,
                population NUMERIC(13, 0),
                ingestion_timestamp TIMESTAMP(6)
            );
            "#,
        )
        .await
        .unwrap();
}

#[tokio::test]
async fn inspects_columns_in_ordinal_order() {
    let (_container, client) = setup_postgres().await;
    create_country_table(&client).await;

    let inspector = CatalogInspector::new(&client);
    let diagnostics = RecordingDiagnostics::new();
    let schema = inspector
        .inspect(
            &TableRef::new("POSTGRES", "Landing", "CT_COUNTRY"),
            &diagnostics,
        )
        .await
        .unwrap();

    let names: Vec<_> = schema.iter().map(|c| c.name.as_str()).collect();
    assert_eq!(
        names,
        vec![
            "country_code",
            "country_name",
            "population",
            "ingestion_timestamp"
        ]
    );

    let code = &schema.columns[0];
    assert_eq!(code.data_type.as_deref(), Some("character varying"));
    assert_eq!(code.is_nullable.as_deref(), Some("NO"));
    assert_eq!(code.character_maximum_length, Some(Number::from(3)));

    let population = &schema.columns[2];
    assert_eq!(population.numeric_precision, Some(Number::from(13)));
    assert_eq!(population.numeric_scale, Some(Number::from(0)));

    assert_eq!(schema.columns[3].datetime_precision, Some(Number::from(6)));
    assert_eq!(diagnostics.count(Severity::Warning), 0);
}

#[tokio::test]
async fn unknown_table_yields_empty_schema_with_warning() {
    let (_container, client) = setup_postgres().await;

    let inspector = CatalogInspector::new(&client);
    let diagnostics = RecordingDiagnostics::new();
    let schema = inspector
        .inspect(&TableRef::new("postgres", "public", "no_such_table"), &diagnostics)
        .await
        .unwrap();

    assert!(schema.is_empty());
    assert_eq!(diagnostics.count(Severity::Warning), 1);
}

#[tokio::test]
async fn snapshot_then_check_passes() {
    let (_container, client) = setup_postgres().await;
    create_country_table(&client).await;

    let target = TableRef::new("postgres", "landing", "ct_country");
    let inspector = CatalogInspector::new(&client);
    let snapshot = inspector
        .inspect(&target, &RecordingDiagnostics::new())
        .await
        .unwrap();

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("ct_country.json");
    std::fs::write(&path, snapshot.to_json().unwrap()).unwrap();

    let plan = CheckPlan {
        target,
        source: SchemaSource::File(camino::Utf8PathBuf::from_path_buf(path).unwrap()),
        destination: None,
        options: CompareOptions::default().with_extra_columns(true),
    };
    let outcome = run_check(&plan, &inspector, None, &RecordingDiagnostics::new())
        .await
        .unwrap();

    assert_eq!(outcome.report.status, CheckStatus::Pass);
    assert_eq!(outcome.report.extra_columns, Some(Vec::new()));
}
