//! Attribute-list (DSN) descriptor form

use super::constants::{keys, DSN_PARAM, PROTOCOL_TCPIP, SCHEME};
use super::{ConnectionDescriptor, DescriptorForm, DescriptorStrategy};
use crate::connection::{ConnectionParameters, SecurityMode};

/// Builds `db2:///?dsn=<encoded attribute list>` descriptors.
///
/// Attributes are emitted in a fixed order: DATABASE, HOSTNAME, PORT, PROTOCOL,
/// UID, PWD, Security, CONNECTTIMEOUT and, when a CA path is set,
/// SSLServerCertificate. The joined list is percent-encoded as one token.
///
/// Values are not escaped individually. A value containing `;` or `=` is
/// reported with a warning but passed through as is.
#[derive(Debug, Clone, Copy, Default)]
pub struct AttributeListStrategy;

impl AttributeListStrategy {
    /// Ordered `(key, value)` attribute pairs
    pub fn attributes(params: &ConnectionParameters) -> Vec<(&'static str, String)> {
        let mut attrs = vec![
            (keys::DATABASE, params.database().to_string()),
            (keys::HOSTNAME, params.host().to_string()),
            (keys::PORT, params.port().to_string()),
            (keys::PROTOCOL, PROTOCOL_TCPIP.to_string()),
            (keys::UID, params.user().to_string()),
            (keys::PWD, params.password().to_string()),
            (keys::SECURITY, SecurityMode::Ssl.to_string()),
            (
                keys::CONNECT_TIMEOUT,
                params.connect_timeout().as_secs().to_string(),
            ),
        ];

        if let Some(ca_path) = params.ca_cert_path().filter(|p| !p.is_empty()) {
            attrs.push((keys::SSL_SERVER_CERTIFICATE, ca_path.to_string()));
        }

        attrs
    }

    /// The unencoded, semicolon-joined attribute list
    pub fn dsn(params: &ConnectionParameters) -> String {
        Self::attributes(params)
            .iter()
            .map(|(key, value)| format!("{}={}", key, value))
            .collect::<Vec<_>>()
            .join(";")
    }
}

impl DescriptorStrategy for AttributeListStrategy {
    fn form(&self) -> DescriptorForm {
        DescriptorForm::AttributeList
    }

    fn build(&self, params: &ConnectionParameters) -> ConnectionDescriptor {
        let collisions = params.delimiter_collisions();
        if !collisions.is_empty() {
            tracing::warn!(
                attributes = ?collisions,
                "attribute values contain DSN delimiters and may be split by the driver"
            );
        }

        let dsn = Self::dsn(params);
        let url = format!(
            "{}:///?{}={}",
            SCHEME,
            DSN_PARAM,
            urlencoding::encode(&dsn)
        );

        tracing::debug!(
            host = %params.host(),
            port = params.port(),
            database = %params.database(),
            "built attribute-list descriptor"
        );

        ConnectionDescriptor::new(DescriptorForm::AttributeList, url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;
    use std::sync::{Arc, Mutex};
    use std::time::Duration;
    use tracing_subscriber::fmt::MakeWriter;

    /// Collects formatted log output in memory
    #[derive(Clone, Default)]
    struct CapturedLogs(Arc<Mutex<Vec<u8>>>);

    impl CapturedLogs {
        fn contents(&self) -> String {
            String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
        }
    }

    impl io::Write for CapturedLogs {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    impl<'a> MakeWriter<'a> for CapturedLogs {
        type Writer = CapturedLogs;

        fn make_writer(&'a self) -> Self::Writer {
            self.clone()
        }
    }

    fn build_with_logs(params: &ConnectionParameters) -> (ConnectionDescriptor, String) {
        let logs = CapturedLogs::default();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(logs.clone())
            .with_max_level(tracing::Level::DEBUG)
            .with_ansi(false)
            .finish();
        let descriptor =
            tracing::subscriber::with_default(subscriber, || AttributeListStrategy.build(params));
        (descriptor, logs.contents())
    }

    fn params() -> ConnectionParameters {
        ConnectionParameters::builder("db2-prod.example.com", "MYDB", "db2user")
            .password("db2pwd")
            .build()
    }

    #[test]
    fn test_dsn_attribute_order() {
        assert_eq!(
            AttributeListStrategy::dsn(&params()),
            "DATABASE=MYDB;HOSTNAME=db2-prod.example.com;PORT=50000;PROTOCOL=TCPIP;\
             UID=db2user;PWD=db2pwd;Security=SSL;CONNECTTIMEOUT=10"
        );
    }

    #[test]
    fn test_dsn_with_ca_cert() {
        let params = ConnectionParameters::builder("h", "d", "u")
            .ca_cert_path("/path/to/ca_certificate.pem")
            .connect_timeout(Duration::from_secs(30))
            .build();
        let dsn = AttributeListStrategy::dsn(&params);
        assert!(dsn.ends_with(";CONNECTTIMEOUT=30;SSLServerCertificate=/path/to/ca_certificate.pem"));
    }

    #[test]
    fn test_empty_ca_path_is_omitted() {
        let params = ConnectionParameters::builder("h", "d", "u")
            .ca_cert_path("")
            .build();
        assert!(!AttributeListStrategy::dsn(&params).contains("SSLServerCertificate"));
    }

    #[test]
    fn test_build_encodes_whole_list() {
        let descriptor = AttributeListStrategy.build(&params());
        let url = descriptor.as_str();
        assert!(url.starts_with("db2:///?dsn="));
        let token = url.trim_start_matches("db2:///?dsn=");
        assert!(!token.contains(';'));
        assert!(!token.contains('='));
        assert!(token.contains("DATABASE%3DMYDB%3BHOSTNAME"));
    }

    #[test]
    fn test_build_is_deterministic() {
        assert_eq!(
            AttributeListStrategy.build(&params()),
            AttributeListStrategy.build(&params())
        );
    }

    #[test]
    fn test_special_characters_stay_inside_token() {
        let params = ConnectionParameters::builder("h", "d", "a b")
            .password("p@ss!&x?")
            .build();
        let descriptor = AttributeListStrategy.build(&params);
        let token = descriptor.as_str().trim_start_matches("db2:///?dsn=");
        for c in ['@', '!', '&', '?', ' '] {
            assert!(!token.contains(c), "literal {:?} in token", c);
        }
    }

    #[test]
    fn test_delimiter_collision_warns_with_keys_only() {
        let params = ConnectionParameters::builder("h", "MYDB", "u")
            .password("s3cr;et=pw")
            .build();
        let (descriptor, logs) = build_with_logs(&params);

        assert!(logs.contains("WARN"), "{}", logs);
        assert!(logs.contains("PWD"), "{}", logs);
        assert!(!logs.contains("s3cr;et=pw"), "{}", logs);
        assert!(!logs.contains("s3cr"), "{}", logs);

        // The value still passes through untouched
        assert!(descriptor
            .as_str()
            .contains(&*urlencoding::encode("PWD=s3cr;et=pw")));
    }

    #[test]
    fn test_no_warning_without_collisions() {
        let (_, logs) = build_with_logs(&params());
        assert!(!logs.contains("WARN"), "{}", logs);
        assert!(!logs.contains("db2pwd"), "{}", logs);
    }
}
