//! Configuration loaded from environment variables
//!
//! Values are read once into an explicit [`Db2Config`]; nothing here keeps
//! process-wide state. [`Db2Config::from_lookup`] takes any lookup function so
//! tests never touch the real environment.

use crate::connection::{ConnectionParameters, DEFAULT_PORT};
use crate::descriptor::{ConnectionDescriptor, DescriptorForm, DescriptorStrategy};
use crate::engine::PoolOptions;
use crate::{Error, Result};
use std::str::FromStr;
use std::time::Duration;

/// Environment variable names
pub mod vars {
    /// User id
    pub const USER: &str = "DB2_USER";
    /// Password
    pub const PASSWORD: &str = "DB2_PASSWORD";
    /// Server host
    pub const HOST: &str = "DB2_HOST";
    /// Server port
    pub const PORT: &str = "DB2_PORT";
    /// Database name
    pub const DATABASE: &str = "DB2_DATABASE";
    /// CA certificate path; empty disables the attribute
    pub const CA_CERT: &str = "DB2_CA_CERT";
    /// Connect timeout in seconds
    pub const CONNECT_TIMEOUT: &str = "DB2_CONNECT_TIMEOUT";
    /// Descriptor form, `dsn` or `url`
    pub const DESCRIPTOR_FORM: &str = "DB2_DESCRIPTOR_FORM";
    /// Pool size
    pub const POOL_SIZE: &str = "DB2_POOL_SIZE";
    /// Pool overflow
    pub const MAX_OVERFLOW: &str = "DB2_MAX_OVERFLOW";
    /// ODBC driver name
    pub const ODBC_DRIVER: &str = "DB2_ODBC_DRIVER";
}

/// Defaults applied when a variable is unset
pub mod defaults {
    /// Default user id
    pub const USER: &str = "db2user";
    /// Default password
    pub const PASSWORD: &str = "db2pwd";
    /// Default host
    pub const HOST: &str = "db2-prod.example.com";
    /// Default database
    pub const DATABASE: &str = "MYDB";
    /// Default CA certificate path
    pub const CA_CERT: &str = "/path/to/ca_certificate.pem";
    /// Default connect timeout in seconds
    pub const CONNECT_TIMEOUT_SECS: u64 = 10;
    /// Default ODBC driver name
    pub const ODBC_DRIVER: &str = "IBM DB2 ODBC DRIVER";
}

/// Complete runtime configuration
#[derive(Debug, Clone)]
pub struct Db2Config {
    /// Connection parameters
    pub params: ConnectionParameters,
    /// Descriptor form to build
    pub form: DescriptorForm,
    /// Pool limits
    pub pool: PoolOptions,
    /// ODBC driver name
    pub odbc_driver: String,
}

fn parse_var<T: FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    name: &str,
    default: T,
) -> Result<T> {
    match lookup(name) {
        Some(raw) => raw.trim().parse().map_err(|_| {
            Error::Config(format!(
                "{} must be an integer in range for {}, got '{}'",
                name,
                std::any::type_name::<T>(),
                raw
            ))
        }),
        None => Ok(default),
    }
}

impl Db2Config {
    /// Load from the process environment
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load using an arbitrary lookup function.
    ///
    /// # Errors
    ///
    /// Returns `Error::Config` naming the variable when a numeric value or the
    /// descriptor form does not parse.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let get = |name: &str, default: &str| lookup(name).unwrap_or_else(|| default.to_string());

        let port: u16 = parse_var(&lookup, vars::PORT, DEFAULT_PORT)?;
        let timeout: u64 = parse_var(&lookup, vars::CONNECT_TIMEOUT, defaults::CONNECT_TIMEOUT_SECS)?;
        let ca_cert = Some(get(vars::CA_CERT, defaults::CA_CERT)).filter(|p| !p.is_empty());

        let params = ConnectionParameters::builder(
            get(vars::HOST, defaults::HOST),
            get(vars::DATABASE, defaults::DATABASE),
            get(vars::USER, defaults::USER),
        )
        .port(port)
        .password(get(vars::PASSWORD, defaults::PASSWORD))
        .maybe_ca_cert_path(ca_cert)
        .connect_timeout(Duration::from_secs(timeout))
        .build();

        let form = match lookup(vars::DESCRIPTOR_FORM) {
            Some(raw) => raw.parse::<DescriptorForm>().map_err(|_| {
                Error::Config(format!(
                    "{} must be 'dsn' or 'url', got '{}'",
                    vars::DESCRIPTOR_FORM,
                    raw
                ))
            })?,
            None => DescriptorForm::default(),
        };

        let pool_defaults = PoolOptions::default();
        let pool = PoolOptions {
            pool_size: parse_var(&lookup, vars::POOL_SIZE, pool_defaults.pool_size)?,
            max_overflow: parse_var(&lookup, vars::MAX_OVERFLOW, pool_defaults.max_overflow)?,
            ..pool_defaults
        };

        Ok(Self {
            params,
            form,
            pool,
            odbc_driver: get(vars::ODBC_DRIVER, defaults::ODBC_DRIVER),
        })
    }

    /// Build the descriptor for the configured form
    pub fn descriptor(&self) -> ConnectionDescriptor {
        self.form.build(&self.params)
    }
}
