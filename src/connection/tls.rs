//! Transport security settings for Db2 connections.
//!
//! The TLS handshake itself is performed by the driver. This module covers what
//! the descriptor has to say about it (`Security=SSL`) and an optional preflight
//! of the CA certificate file the driver will be pointed at.

use crate::{Error, Result};
use rustls::RootCertStore;
use rustls_pemfile::Item;
use rustls_pki_types::ServerName;
use std::fs;
use std::path::{Path, PathBuf};

/// Transport security mode matching the Db2 CLI `Security` attribute.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SecurityMode {
    /// No `Security` attribute (plaintext connection)
    Plaintext,
    /// `Security=SSL`: encrypted transport
    #[default]
    Ssl,
}

impl SecurityMode {
    /// Whether the connection is encrypted
    pub fn is_encrypted(&self) -> bool {
        matches!(self, Self::Ssl)
    }
}

impl std::fmt::Display for SecurityMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Plaintext => write!(f, "NONE"),
            Self::Ssl => write!(f, "SSL"),
        }
    }
}

impl std::str::FromStr for SecurityMode {
    type Err = Error;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case("ssl") {
            Ok(Self::Ssl)
        } else if s.eq_ignore_ascii_case("none") {
            Ok(Self::Plaintext)
        } else {
            Err(Error::Config(format!(
                "invalid security mode '{}': expected SSL or NONE",
                s
            )))
        }
    }
}

/// CA certificate bundle the driver will use to verify the server certificate.
///
/// Loading parses every PEM certificate in the file into a rustls
/// [`RootCertStore`], which catches unreadable paths, empty files and
/// certificates that do not parse as X.509 before the driver is involved.
///
/// # Examples
///
/// ```ignore
/// let bundle = CaBundle::load("/etc/db2/ca.pem")?;
/// println!("{} usable certificates", bundle.len());
/// ```
#[derive(Clone)]
pub struct CaBundle {
    path: PathBuf,
    roots: RootCertStore,
    rejected: usize,
}

impl CaBundle {
    /// Load a CA bundle from a PEM file.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - the file cannot be read
    /// - the file is not valid PEM
    /// - no certificate in the file parses as a trust anchor
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let data = fs::read(path).map_err(|e| {
            Error::Config(format!(
                "Failed to read CA certificate file '{}': {}",
                path.display(),
                e
            ))
        })?;

        let mut reader = std::io::Cursor::new(&data);
        let mut roots = RootCertStore::empty();
        let mut rejected = 0;

        loop {
            match rustls_pemfile::read_one(&mut reader) {
                Ok(Some(Item::X509Certificate(cert))) => {
                    let (_, invalid) = roots.add_parsable_certificates(std::iter::once(cert));
                    rejected += invalid;
                }
                Ok(Some(_)) => {
                    // keys and CRLs are not trust anchors
                }
                Ok(None) => break,
                Err(_) => {
                    return Err(Error::Config(format!(
                        "Failed to parse CA certificate from '{}'",
                        path.display()
                    )));
                }
            }
        }

        if roots.is_empty() {
            return Err(Error::Config(format!(
                "No valid certificates found in '{}'",
                path.display()
            )));
        }

        Ok(Self {
            path: path.to_path_buf(),
            roots,
            rejected,
        })
    }

    /// Path the bundle was loaded from
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Number of usable trust anchors
    pub fn len(&self) -> usize {
        self.roots.len()
    }

    /// Always false for a loaded bundle
    pub fn is_empty(&self) -> bool {
        self.roots.is_empty()
    }

    /// Certificates present in the file that failed to parse
    pub fn rejected(&self) -> usize {
        self.rejected
    }

    /// The parsed trust anchors
    pub fn roots(&self) -> &RootCertStore {
        &self.roots
    }
}

impl std::fmt::Debug for CaBundle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CaBundle")
            .field("path", &self.path)
            .field("certificates", &self.roots.len())
            .field("rejected", &self.rejected)
            .finish()
    }
}

/// Parse a host as the TLS server name the certificate is matched against.
///
/// Accepts DNS names and IP literals; a trailing dot is dropped.
///
/// # Errors
///
/// Returns `Error::Config` if the host is neither a valid DNS name nor an IP
/// address (empty, carries a port, contains spaces, over-long labels).
pub fn parse_server_name(host: &str) -> Result<ServerName<'static>> {
    let host = host.trim_end_matches('.');
    ServerName::try_from(host)
        .map(|name| name.to_owned())
        .map_err(|e| Error::Config(format!("Invalid hostname for TLS: '{}' ({})", host, e)))
}
