//! Connection parameters

use super::tls::parse_server_name;
use crate::descriptor::constants::keys;
use crate::{Error, Result};
use std::time::Duration;

/// Default Db2 listener port
pub const DEFAULT_PORT: u16 = 50000;

/// Default connect timeout handed to the driver
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Connection parameters
///
/// Immutable value object holding everything needed to build a
/// [`ConnectionDescriptor`](crate::ConnectionDescriptor). Use
/// `ConnectionParameters::builder()` to construct one.
///
/// The password is redacted from `Debug` output.
#[derive(Clone, PartialEq, Eq)]
pub struct ConnectionParameters {
    host: String,
    port: u16,
    database: String,
    user: String,
    password: String,
    ca_cert_path: Option<String>,
    connect_timeout: Duration,
}

impl ConnectionParameters {
    /// Create a builder
    ///
    /// # Defaults
    ///
    /// - `port`: 50000
    /// - `password`: empty
    /// - `ca_cert_path`: None
    /// - `connect_timeout`: 10 seconds
    ///
    /// # Examples
    ///
    /// ```
    /// use db2_engine::ConnectionParameters;
    /// use std::time::Duration;
    ///
    /// let params = ConnectionParameters::builder("db.example.com", "MYDB", "db2user")
    ///     .port(50001)
    ///     .password("secret")
    ///     .connect_timeout(Duration::from_secs(5))
    ///     .build();
    /// assert_eq!(params.port(), 50001);
    /// ```
    pub fn builder(
        host: impl Into<String>,
        database: impl Into<String>,
        user: impl Into<String>,
    ) -> ConnectionParametersBuilder {
        ConnectionParametersBuilder {
            host: host.into(),
            port: DEFAULT_PORT,
            database: database.into(),
            user: user.into(),
            password: String::new(),
            ca_cert_path: None,
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
        }
    }

    /// Host name (FQDN) or IP address
    pub fn host(&self) -> &str {
        &self.host
    }

    /// TCP port
    pub fn port(&self) -> u16 {
        self.port
    }

    /// Database name
    pub fn database(&self) -> &str {
        &self.database
    }

    /// User id
    pub fn user(&self) -> &str {
        &self.user
    }

    /// Password. Never log this.
    pub fn password(&self) -> &str {
        &self.password
    }

    /// CA certificate used to verify the server certificate
    pub fn ca_cert_path(&self) -> Option<&str> {
        self.ca_cert_path.as_deref()
    }

    /// Connect timeout enforced by the driver
    pub fn connect_timeout(&self) -> Duration {
        self.connect_timeout
    }

    /// Attribute keys whose values contain a DSN delimiter (`;` or `=`).
    ///
    /// Such values are passed through untouched; the returned keys let callers
    /// flag the collision. Only keys are returned so the password never leaks.
    pub fn delimiter_collisions(&self) -> Vec<&'static str> {
        let candidates: [(&'static str, &str); 5] = [
            (keys::DATABASE, self.database.as_str()),
            (keys::HOSTNAME, self.host.as_str()),
            (keys::UID, self.user.as_str()),
            (keys::PWD, self.password.as_str()),
            (
                keys::SSL_SERVER_CERTIFICATE,
                self.ca_cert_path.as_deref().unwrap_or(""),
            ),
        ];

        candidates
            .iter()
            .filter(|(_, value)| value.contains(';') || value.contains('='))
            .map(|(key, _)| *key)
            .collect()
    }

    /// Check the parameters for values no driver could use.
    ///
    /// Builders never call this; descriptor construction stays permissive.
    ///
    /// # Errors
    ///
    /// Returns `Error::Config` if:
    /// - the port is 0
    /// - host, database or user is empty
    /// - the host is not a valid hostname or IP address
    /// - the connect timeout is below one second
    pub fn validate(&self) -> Result<()> {
        if self.port == 0 {
            return Err(Error::Config("port must be between 1 and 65535".into()));
        }
        if self.host.is_empty() {
            return Err(Error::Config("host must not be empty".into()));
        }
        parse_server_name(&self.host)?;
        if self.database.is_empty() {
            return Err(Error::Config("database must not be empty".into()));
        }
        if self.user.is_empty() {
            return Err(Error::Config("user must not be empty".into()));
        }
        if self.connect_timeout.as_secs() == 0 {
            return Err(Error::Config(
                "connect timeout must be at least one second".into(),
            ));
        }
        Ok(())
    }
}

impl std::fmt::Debug for ConnectionParameters {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConnectionParameters")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("database", &self.database)
            .field("user", &self.user)
            .field("password", &"<redacted>")
            .field("ca_cert_path", &self.ca_cert_path)
            .field("connect_timeout", &self.connect_timeout)
            .finish()
    }
}

/// Builder for [`ConnectionParameters`]
#[derive(Clone)]
pub struct ConnectionParametersBuilder {
    host: String,
    port: u16,
    database: String,
    user: String,
    password: String,
    ca_cert_path: Option<String>,
    connect_timeout: Duration,
}

impl ConnectionParametersBuilder {
    /// Set the TCP port
    pub fn port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Set the password
    pub fn password(mut self, password: impl Into<String>) -> Self {
        self.password = password.into();
        self
    }

    /// Set the CA certificate path used to verify the server certificate.
    ///
    /// When unset, descriptors carry no server-certificate attribute and the
    /// driver falls back to its own trust store.
    pub fn ca_cert_path(mut self, path: impl Into<String>) -> Self {
        self.ca_cert_path = Some(path.into());
        self
    }

    /// Set or clear the CA certificate path
    pub fn maybe_ca_cert_path(mut self, path: Option<String>) -> Self {
        self.ca_cert_path = path;
        self
    }

    /// Set the connect timeout
    ///
    /// Default: 10 seconds. Sub-second precision is dropped when rendered.
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Build the parameters
    pub fn build(self) -> ConnectionParameters {
        ConnectionParameters {
            host: self.host,
            port: self.port,
            database: self.database,
            user: self.user,
            password: self.password,
            ca_cert_path: self.ca_cert_path,
            connect_timeout: self.connect_timeout,
        }
    }
}

impl std::fmt::Debug for ConnectionParametersBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConnectionParametersBuilder")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("database", &self.database)
            .field("user", &self.user)
            .field("password", &"<redacted>")
            .field("ca_cert_path", &self.ca_cert_path)
            .field("connect_timeout", &self.connect_timeout)
            .finish()
    }
}
