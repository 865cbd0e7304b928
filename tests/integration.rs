//! Integration tests for db2-engine
//!
//! These tests require a Db2 server with SSL enabled and the IBM ODBC driver installed.
//!
//! ```bash
//! export DB2_TEST_HOST=db2.example.com DB2_TEST_PORT=50001 DB2_TEST_DATABASE=SAMPLE
//! export DB2_TEST_USER=db2inst1 DB2_TEST_PASSWORD=secret DB2_TEST_CA_CERT=/path/to/ca.pem
//! cargo test --features integration-with-db2 --test integration -- --ignored --nocapture
//! ```

#![cfg(feature = "integration-with-db2")]

use db2_engine::engine::odbc::OdbcDriver;
use db2_engine::{create_engine, verify, ConnectionParameters, DescriptorForm};
use db2_engine::{DescriptorStrategy, PoolOptions};
use std::env;

fn test_params() -> Option<ConnectionParameters> {
    let host = env::var("DB2_TEST_HOST").ok()?;
    let port = env::var("DB2_TEST_PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or(50000);

    Some(
        ConnectionParameters::builder(
            host,
            env::var("DB2_TEST_DATABASE").unwrap_or_else(|_| "SAMPLE".to_string()),
            env::var("DB2_TEST_USER").unwrap_or_else(|_| "db2inst1".to_string()),
        )
        .port(port)
        .password(env::var("DB2_TEST_PASSWORD").unwrap_or_default())
        .maybe_ca_cert_path(env::var("DB2_TEST_CA_CERT").ok())
        .build(),
    )
}

#[tokio::test]
#[ignore] // Requires Db2 running
async fn test_connect_and_query_both_forms() {
    let params = match test_params() {
        Some(params) => params,
        None => {
            eprintln!("Skipping test: DB2_TEST_HOST not set");
            return;
        }
    };

    for form in [DescriptorForm::AttributeList, DescriptorForm::EmbeddedCredentials] {
        let engine = create_engine(
            OdbcDriver::default(),
            form.build(&params),
            PoolOptions::default(),
        );
        assert!(verify(&engine).await, "verification failed for {}", form);
        assert_eq!(engine.probe().await.expect("probe"), 1);
    }
}

#[tokio::test]
#[ignore] // Requires Db2 running
async fn test_wrong_password_is_reported_not_raised() {
    let params = match test_params() {
        Some(params) => params,
        None => {
            eprintln!("Skipping test: DB2_TEST_HOST not set");
            return;
        }
    };

    let bad = ConnectionParameters::builder(params.host(), params.database(), params.user())
        .port(params.port())
        .password("definitely-not-the-password")
        .maybe_ca_cert_path(params.ca_cert_path().map(String::from))
        .build();

    let options = PoolOptions {
        checkout_timeout: std::time::Duration::from_secs(15),
        ..PoolOptions::default()
    };
    let engine = create_engine(
        OdbcDriver::default(),
        DescriptorForm::AttributeList.build(&bad),
        options,
    );
    assert!(!verify(&engine).await);
}
