//! Pooled engines and connectivity checks
//!
//! An [`Engine`] owns a bb8 pool of connections opened by a [`Driver`] from a
//! single [`ConnectionDescriptor`]. The pool does all checkout/checkin
//! synchronization. Connections are opened once per checkout with no retry; a
//! failed open fails the waiting checkout with the driver's error.

mod manager;
#[cfg(feature = "odbc")]
pub mod odbc;

pub use manager::DriverManager;

use crate::descriptor::{ConnectionDescriptor, DescriptorForm};
use crate::{Error, Result, LIVENESS_QUERY};
use async_trait::async_trait;
use manager::{ConnectFailures, TracingErrorSink};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::Instrument;

/// Opens connections from a descriptor.
///
/// Implementations own the TLS handshake and the wire protocol.
#[async_trait]
pub trait Driver: Send + Sync + 'static {
    /// Connection type produced by this driver
    type Connection: DriverConnection;

    /// Short driver name for logs
    fn name(&self) -> &str;

    /// Open one connection
    async fn connect(&self, descriptor: &ConnectionDescriptor) -> Result<Self::Connection>;
}

/// One open driver connection
#[async_trait]
pub trait DriverConnection: Send + 'static {
    /// Execute a query and read the first column of the first row as an integer.
    ///
    /// Returns `Ok(None)` when the query produced no rows.
    async fn query_scalar(&mut self, sql: &str) -> Result<Option<i64>>;

    /// Whether the connection is known to be unusable and must not return to the pool
    fn is_broken(&self) -> bool {
        false
    }
}

/// Pool limits
///
/// The pool holds up to `pool_size + max_overflow` connections. Connections are
/// opened lazily on first checkout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PoolOptions {
    /// Connections the pool is sized for (default: 5)
    pub pool_size: u32,
    /// Extra connections allowed under load (default: 10)
    pub max_overflow: u32,
    /// How long a checkout waits for a connection (default: 30 seconds)
    pub checkout_timeout: Duration,
    /// Idle connections are closed after this long (default: 10 minutes)
    pub idle_timeout: Option<Duration>,
    /// Run the liveness query on every checkout (default: false)
    pub pre_ping: bool,
}

impl Default for PoolOptions {
    fn default() -> Self {
        Self {
            pool_size: 5,
            max_overflow: 10,
            checkout_timeout: Duration::from_secs(30),
            idle_timeout: Some(Duration::from_secs(600)),
            pre_ping: false,
        }
    }
}

impl PoolOptions {
    /// Upper bound on open connections (never below one)
    pub fn max_connections(&self) -> u32 {
        self.pool_size.saturating_add(self.max_overflow).max(1)
    }
}

/// Connection counts reported by the pool
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PoolState {
    /// Open connections, idle or checked out
    pub connections: u32,
    /// Open connections waiting in the pool
    pub idle_connections: u32,
}

/// Pooled connection checked out of an engine.
///
/// Dropping it returns the connection to the pool.
pub type EngineConnection<'a, D> = bb8::PooledConnection<'a, DriverManager<D>>;

/// Handle to a pool of driver connections.
///
/// Cloning shares the pool; the pool closes when the last clone is dropped.
pub struct Engine<D: Driver> {
    pool: bb8::Pool<DriverManager<D>>,
    failures: Arc<ConnectFailures>,
    driver_name: String,
    form: DescriptorForm,
    options: PoolOptions,
}

impl<D: Driver> Clone for Engine<D> {
    fn clone(&self) -> Self {
        Self {
            pool: self.pool.clone(),
            failures: self.failures.clone(),
            driver_name: self.driver_name.clone(),
            form: self.form,
            options: self.options.clone(),
        }
    }
}

impl<D: Driver> std::fmt::Debug for Engine<D> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Engine")
            .field("driver", &self.driver_name)
            .field("form", &self.form)
            .field("options", &self.options)
            .finish()
    }
}

impl<D: Driver> Engine<D> {
    /// Create an engine. No connection is opened until the first checkout.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn new(driver: D, descriptor: ConnectionDescriptor, options: PoolOptions) -> Self {
        let form = descriptor.form();
        let driver_name = driver.name().to_string();
        let manager = DriverManager::new(driver, descriptor);
        let failures = Arc::new(ConnectFailures::default());

        let pool = bb8::Pool::builder()
            .max_size(options.max_connections())
            .min_idle(None)
            .connection_timeout(options.checkout_timeout)
            .idle_timeout(options.idle_timeout)
            .test_on_check_out(options.pre_ping)
            .retry_connection(false)
            .error_sink(Box::new(TracingErrorSink::new(failures.clone())))
            .build_unchecked(manager);

        tracing::info!(
            driver = %driver_name,
            form = %form,
            max_connections = options.max_connections(),
            "engine created"
        );
        crate::metrics::counters::engine_created(form.as_str());

        Self {
            pool,
            failures,
            driver_name,
            form,
            options,
        }
    }

    /// Descriptor form the engine was created from
    pub fn form(&self) -> DescriptorForm {
        self.form
    }

    /// Pool limits
    pub fn options(&self) -> &PoolOptions {
        &self.options
    }

    /// Name of the underlying driver
    pub fn driver_name(&self) -> &str {
        &self.driver_name
    }

    /// Current pool occupancy
    pub fn state(&self) -> PoolState {
        let state = self.pool.state();
        PoolState {
            connections: state.connections,
            idle_connections: state.idle_connections,
        }
    }

    /// Check out one connection.
    ///
    /// The connection returns to the pool when the guard is dropped, on every
    /// exit path.
    ///
    /// # Errors
    ///
    /// Returns the driver's error as soon as opening a connection fails, or
    /// `Error::PoolTimeout` if no connection became available within the
    /// checkout timeout.
    pub async fn connect(&self) -> Result<EngineConnection<'_, D>> {
        // Stale failures belong to earlier checkouts
        self.failures.take();

        let checkout = self.pool.get();
        tokio::pin!(checkout);

        loop {
            let failed = self.failures.notified();
            tokio::pin!(failed);
            failed.as_mut().enable();

            if let Some(err) = self.failures.take() {
                return Err(err);
            }

            tokio::select! {
                biased;
                result = &mut checkout => {
                    return match result {
                        Ok(conn) => Ok(conn),
                        Err(bb8::RunError::TimedOut) => {
                            Err(self.failures.take().unwrap_or(Error::PoolTimeout))
                        }
                        Err(err) => Err(err.into()),
                    };
                }
                _ = &mut failed => {}
            }
        }
    }

    /// Run the liveness query and return its scalar.
    ///
    /// # Errors
    ///
    /// Propagates checkout and driver errors; returns `Error::UnexpectedResult`
    /// if the query produced no row.
    pub async fn probe(&self) -> Result<i64> {
        let mut conn = self.connect().await?;
        conn.query_scalar(LIVENESS_QUERY)
            .await?
            .ok_or_else(|| Error::UnexpectedResult("liveness query returned no rows".into()))
    }
}

/// Create an engine from a descriptor (see [`Engine::new`])
pub fn create_engine<D: Driver>(
    driver: D,
    descriptor: ConnectionDescriptor,
    options: PoolOptions,
) -> Engine<D> {
    Engine::new(driver, descriptor, options)
}

/// Check that the engine can reach the server.
///
/// Checks out one connection, runs `SELECT 1 FROM SYSIBM.SYSDUMMY1` and reads
/// the scalar. Every failure is logged and reported as `false`; nothing is
/// propagated.
pub async fn verify<D: Driver>(engine: &Engine<D>) -> bool {
    let start = Instant::now();

    async {
        match engine.probe().await {
            Ok(value) => {
                tracing::info!("connection test returned: {}", value);
                crate::metrics::counters::verification(crate::metrics::labels::SUCCESS);
                crate::metrics::histograms::verification_duration(
                    crate::metrics::labels::SUCCESS,
                    start.elapsed().as_millis() as u64,
                );
                true
            }
            Err(e) => {
                tracing::error!("connection test failed: {}", e);
                crate::metrics::counters::verification(crate::metrics::labels::FAILURE);
                crate::metrics::histograms::verification_duration(
                    crate::metrics::labels::FAILURE,
                    start.elapsed().as_millis() as u64,
                );
                false
            }
        }
    }
    .instrument(tracing::info_span!(
        "verify",
        driver = %engine.driver_name(),
        form = %engine.form()
    ))
    .await
}
