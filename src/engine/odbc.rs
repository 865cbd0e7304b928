//! Db2 driver over the IBM CLI/ODBC driver manager.
//!
//! Every connection is owned by a dedicated worker thread. Async callers send
//! queries over a channel, so the blocking ODBC calls never run on the Tokio
//! executor and the non-`Send` ODBC handle never crosses threads.

use super::{Driver, DriverConnection};
use crate::descriptor::ConnectionDescriptor;
use crate::{Error, Result};
use async_trait::async_trait;
use odbc_api::{ConnectionOptions, Cursor, Environment, Nullable};
use std::sync::{mpsc, OnceLock};
use tokio::sync::oneshot;

/// Driver name registered by the IBM Data Server Driver package
pub const DEFAULT_ODBC_DRIVER: &str = "IBM DB2 ODBC DRIVER";

static ENVIRONMENT: OnceLock<Environment> = OnceLock::new();

fn environment() -> Result<&'static Environment> {
    if let Some(env) = ENVIRONMENT.get() {
        return Ok(env);
    }
    let env = Environment::new().map_err(odbc_error)?;
    Ok(ENVIRONMENT.get_or_init(|| env))
}

fn odbc_error(err: odbc_api::Error) -> Error {
    Error::Connection(err.to_string())
}

/// Opens connections through an installed Db2 ODBC driver
#[derive(Debug, Clone)]
pub struct OdbcDriver {
    driver_name: String,
}

impl OdbcDriver {
    /// Use the named ODBC driver (as registered with the driver manager)
    pub fn new(driver_name: impl Into<String>) -> Self {
        Self {
            driver_name: driver_name.into(),
        }
    }

    /// ODBC connection string for a descriptor. Contains the password.
    pub fn connection_string(&self, descriptor: &ConnectionDescriptor) -> Result<String> {
        let resolved = descriptor.resolve()?;
        Ok(format!(
            "DRIVER={{{}}};{}",
            self.driver_name,
            resolved.to_cli_string()
        ))
    }
}

impl Default for OdbcDriver {
    fn default() -> Self {
        Self::new(DEFAULT_ODBC_DRIVER)
    }
}

#[async_trait]
impl Driver for OdbcDriver {
    type Connection = OdbcConnection;

    fn name(&self) -> &str {
        "odbc"
    }

    async fn connect(&self, descriptor: &ConnectionDescriptor) -> Result<OdbcConnection> {
        let login_timeout_sec = descriptor
            .resolve()?
            .connect_timeout
            .map(|t| t.as_secs().min(u32::MAX as u64) as u32);
        OdbcConnection::open(self.connection_string(descriptor)?, login_timeout_sec).await
    }
}

struct Request {
    sql: String,
    reply: oneshot::Sender<Result<Option<i64>>>,
}

/// Connection living on its own worker thread
pub struct OdbcConnection {
    requests: mpsc::Sender<Request>,
    broken: bool,
}

impl OdbcConnection {
    async fn open(connection_string: String, login_timeout_sec: Option<u32>) -> Result<Self> {
        let env = environment()?;
        let (ready_tx, ready_rx) = oneshot::channel();
        let (requests, inbox) = mpsc::channel::<Request>();

        std::thread::Builder::new()
            .name("db2-odbc".into())
            .spawn(move || {
                let options = ConnectionOptions {
                    login_timeout_sec,
                    ..Default::default()
                };
                let conn = match env.connect_with_connection_string(&connection_string, options)
                {
                    Ok(conn) => {
                        let _ = ready_tx.send(Ok(()));
                        conn
                    }
                    Err(e) => {
                        let _ = ready_tx.send(Err(odbc_error(e)));
                        return;
                    }
                };

                // Exits once the OdbcConnection (and its sender) is dropped
                for request in inbox {
                    let _ = request.reply.send(query_scalar(&conn, &request.sql));
                }
            })?;

        ready_rx
            .await
            .map_err(|_| Error::Connection("ODBC worker exited during connect".into()))??;

        tracing::debug!("ODBC connection established");
        Ok(Self {
            requests,
            broken: false,
        })
    }
}

fn query_scalar(conn: &odbc_api::Connection<'_>, sql: &str) -> Result<Option<i64>> {
    let Some(mut cursor) = conn.execute(sql, ()).map_err(odbc_error)? else {
        return Ok(None);
    };

    match cursor.next_row().map_err(odbc_error)? {
        Some(mut row) => {
            let mut value = Nullable::<i64>::null();
            row.get_data(1, &mut value).map_err(odbc_error)?;
            Ok(value.into_opt())
        }
        None => Ok(None),
    }
}

#[async_trait]
impl DriverConnection for OdbcConnection {
    async fn query_scalar(&mut self, sql: &str) -> Result<Option<i64>> {
        let (reply, response) = oneshot::channel();
        let request = Request {
            sql: sql.to_string(),
            reply,
        };

        if self.requests.send(request).is_err() {
            self.broken = true;
            return Err(Error::Connection("ODBC worker is gone".into()));
        }

        match response.await {
            Ok(result) => result,
            Err(_) => {
                self.broken = true;
                Err(Error::Connection("ODBC worker is gone".into()))
            }
        }
    }

    fn is_broken(&self) -> bool {
        self.broken
    }
}
