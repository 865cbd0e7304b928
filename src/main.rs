//! `db2-check`: build a descriptor from `DB2_*` environment variables, open a
//! pooled engine through the Db2 ODBC driver and run the liveness query.

use db2_engine::engine::odbc::OdbcDriver;
use db2_engine::{create_engine, verify, CaBundle, Db2Config};
use std::process::ExitCode;

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let config = match Db2Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Invalid configuration: {}", e);
            return ExitCode::FAILURE;
        }
    };

    if let Err(e) = config.params.validate() {
        eprintln!("Invalid connection parameters: {}", e);
        return ExitCode::FAILURE;
    }

    if let Some(ca_path) = config.params.ca_cert_path() {
        match CaBundle::load(ca_path) {
            Ok(bundle) => tracing::info!(
                path = %bundle.path().display(),
                certificates = bundle.len(),
                rejected = bundle.rejected(),
                "CA bundle loaded"
            ),
            Err(e) => tracing::warn!("CA bundle check failed, the driver will decide: {}", e),
        }
    }

    let engine = create_engine(
        OdbcDriver::new(&config.odbc_driver),
        config.descriptor(),
        config.pool.clone(),
    );

    if verify(&engine).await {
        println!("Connected OK to DB2 over SSL.");
        ExitCode::SUCCESS
    } else {
        println!("Failed to connect to DB2. See error output above.");
        ExitCode::FAILURE
    }
}
