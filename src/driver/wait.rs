//! Timeout wrapper for driver operations

use std::future::Future;
use std::time::Duration;

use super::{DriverError, DriverResult};

/// Run `operation`, failing with [`DriverError::Timeout`] once `limit` elapses.
pub async fn with_timeout<F, T>(operation: F, limit: Duration, operation_name: &str) -> DriverResult<T>
where
    F: Future<Output = DriverResult<T>>,
{
    match tokio::time::timeout(limit, operation).await {
        Ok(result) => result,
        Err(_) => Err(DriverError::Timeout {
            operation: operation_name.to_string(),
            waited: limit,
        }),
    }
}
