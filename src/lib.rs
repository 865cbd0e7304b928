//! Db2 connection descriptors over SSL, pooled engines and liveness checks.
//!
//! The crate turns a set of [`ConnectionParameters`] into a driver-consumable
//! [`ConnectionDescriptor`], hands it to a pooled [`Engine`] and checks that the
//! server answers `SELECT 1 FROM SYSIBM.SYSDUMMY1`.
//!
//! Two descriptor forms are supported:
//! * attribute list carried in a single `dsn` parameter (recommended)
//! * URL with embedded credentials and query parameters
//!
//! The TLS handshake and the Db2 wire protocol belong to the [`Driver`]
//! implementation; nothing here speaks DRDA.
//!
//! ```no_run
//! # async fn example<D: db2_engine::Driver>(driver: D) -> db2_engine::Result<()> {
//! use db2_engine::{create_engine, verify, AttributeListStrategy, ConnectionParameters};
//! use db2_engine::{DescriptorStrategy, PoolOptions};
//!
//! let params = ConnectionParameters::builder("db2-prod.example.com", "MYDB", "db2user")
//!     .password("db2pwd")
//!     .ca_cert_path("/etc/db2/ca.pem")
//!     .build();
//!
//! let descriptor = AttributeListStrategy.build(&params);
//! let engine = create_engine(driver, descriptor, PoolOptions::default());
//! assert!(verify(&engine).await);
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]

pub mod config;
pub mod connection;
pub mod descriptor;
pub mod engine;
pub mod error;
pub mod metrics;

pub use config::Db2Config;
pub use connection::{CaBundle, ConnectionParameters, ConnectionParametersBuilder, SecurityMode};
pub use descriptor::{
    AttributeListStrategy, ConnectionDescriptor, DescriptorForm, DescriptorStrategy,
    ResolvedDescriptor, UrlStrategy,
};
pub use engine::{
    create_engine, verify, Driver, DriverConnection, Engine, EngineConnection, PoolOptions,
    PoolState,
};
pub use error::{Error, Result};

/// Liveness query run against the always-present one-row system table
pub const LIVENESS_QUERY: &str = "SELECT 1 FROM SYSIBM.SYSDUMMY1";
