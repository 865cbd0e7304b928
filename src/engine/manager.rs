//! Pool glue between a [`Driver`] and bb8

use super::{Driver, DriverConnection};
use crate::descriptor::ConnectionDescriptor;
use crate::{Error, Result, LIVENESS_QUERY};
use async_trait::async_trait;
use std::sync::{Arc, Mutex, MutexGuard};
use tokio::sync::futures::Notified;
use tokio::sync::Notify;

/// bb8 connection manager opening connections through a driver
pub struct DriverManager<D> {
    driver: D,
    descriptor: ConnectionDescriptor,
}

impl<D: Driver> DriverManager<D> {
    pub(crate) fn new(driver: D, descriptor: ConnectionDescriptor) -> Self {
        Self { driver, descriptor }
    }
}

impl<D> std::fmt::Debug for DriverManager<D> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DriverManager")
            .field("descriptor", &self.descriptor)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl<D: Driver> bb8::ManageConnection for DriverManager<D> {
    type Connection = D::Connection;
    type Error = Error;

    async fn connect(&self) -> Result<Self::Connection> {
        tracing::debug!(driver = self.driver.name(), "opening connection");
        self.driver.connect(&self.descriptor).await
    }

    async fn is_valid(&self, conn: &mut Self::Connection) -> Result<()> {
        conn.query_scalar(LIVENESS_QUERY).await.map(|_| ())
    }

    fn has_broken(&self, conn: &mut Self::Connection) -> bool {
        conn.is_broken()
    }
}

/// Last error the pool hit while opening a connection.
///
/// bb8 opens connections on a background task and only hands the error to its
/// sink; checkouts waiting on that connection are woken through `notify`.
#[derive(Debug, Default)]
pub(crate) struct ConnectFailures {
    last: Mutex<Option<Error>>,
    notify: Notify,
}

impl ConnectFailures {
    fn record(&self, error: Error) {
        *self.lock() = Some(error);
        self.notify.notify_waiters();
    }

    pub(crate) fn take(&self) -> Option<Error> {
        self.lock().take()
    }

    pub(crate) fn notified(&self) -> Notified<'_> {
        self.notify.notified()
    }

    fn lock(&self) -> MutexGuard<'_, Option<Error>> {
        self.last.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

/// Logs errors the pool hits while opening connections and hands them to
/// waiting checkouts
#[derive(Debug, Clone)]
pub(crate) struct TracingErrorSink {
    failures: Arc<ConnectFailures>,
}

impl TracingErrorSink {
    pub(crate) fn new(failures: Arc<ConnectFailures>) -> Self {
        Self { failures }
    }
}

impl bb8::ErrorSink<Error> for TracingErrorSink {
    fn sink(&self, error: Error) {
        tracing::error!(error = %error, "pool failed to open connection");
        self.failures.record(error);
    }

    fn boxed_clone(&self) -> Box<dyn bb8::ErrorSink<Error>> {
        Box::new(self.clone())
    }
}
