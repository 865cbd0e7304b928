//! Descriptor constants

/// URL scheme of every descriptor
pub const SCHEME: &str = "db2";

/// Query parameter carrying the encoded attribute list
pub const DSN_PARAM: &str = "dsn";

/// Only protocol the builders emit
pub const PROTOCOL_TCPIP: &str = "TCPIP";

/// Attribute keys of the Db2 CLI connection string
pub mod keys {
    /// Database name
    pub const DATABASE: &str = "DATABASE";

    /// Server host name or address
    pub const HOSTNAME: &str = "HOSTNAME";

    /// Server port
    pub const PORT: &str = "PORT";

    /// Communication protocol
    pub const PROTOCOL: &str = "PROTOCOL";

    /// User id
    pub const UID: &str = "UID";

    /// Password
    pub const PWD: &str = "PWD";

    /// Transport security
    pub const SECURITY: &str = "Security";

    /// Connect timeout in seconds
    pub const CONNECT_TIMEOUT: &str = "CONNECTTIMEOUT";

    /// CA certificate used to verify the server
    pub const SSL_SERVER_CERTIFICATE: &str = "SSLServerCertificate";
}

/// Query parameter names of the embedded-credentials URL
pub mod url_params {
    /// Transport security
    pub const SECURITY: &str = "security";

    /// Connect timeout in seconds
    pub const CONNECT_TIMEOUT: &str = "connecttimeout";

    /// CA certificate used to verify the server
    pub const SSL_SERVER_CERTIFICATE: &str = "SSLServerCertificate";
}
