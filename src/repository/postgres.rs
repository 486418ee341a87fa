//! PostgreSQL-backed shipment repository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use std::time::Duration;
use tokio_postgres::{Client, NoTls, Row};

use crate::domain::Shipment;
use crate::repository::{RepositoryError, ShipmentRepository};

// Timestamps are cast so `timestamp` and `timestamptz` columns both decode
// as `DateTime<Utc>`.
const SELECT_BY_TRACKING_NUMBER: &str = "
    SELECT id::BIGINT, order_id::BIGINT, tracking_number, carrier, status,
           estimated_delivery::TIMESTAMPTZ AS estimated_delivery,
           created_at::TIMESTAMPTZ AS created_at,
           updated_at::TIMESTAMPTZ AS updated_at
    FROM shipments
    WHERE tracking_number = $1
    LIMIT 1
";

const SELECT_BY_ORDER_ID: &str = "
    SELECT id::BIGINT, order_id::BIGINT, tracking_number, carrier, status,
           estimated_delivery::TIMESTAMPTZ AS estimated_delivery,
           created_at::TIMESTAMPTZ AS created_at,
           updated_at::TIMESTAMPTZ AS updated_at
    FROM shipments
    WHERE order_id = $1::BIGINT
    LIMIT 1
";

/// Shipment repository over a `tokio-postgres` client.
#[derive(Clone)]
pub struct PostgresShipmentRepository {
    client: Arc<Client>,
}

impl PostgresShipmentRepository {
    /// Wrap an already-connected client.
    pub fn new(client: Arc<Client>) -> Self {
        Self { client }
    }

    /// Connect to the database and spawn the connection driver.
    pub async fn connect(url: &str, timeout: Duration) -> Result<Self, RepositoryError> {
        let (client, connection) = tokio::time::timeout(timeout, tokio_postgres::connect(url, NoTls))
            .await
            .map_err(|_| RepositoryError::query(format!("connect timed out after {timeout:?}")))?
            .map_err(RepositoryError::query)?;

        tokio::spawn(async move {
            if let Err(e) = connection.await {
                tracing::error!(error = %e, "PostgreSQL connection closed with error");
            } else {
                tracing::info!("PostgreSQL connection closed");
            }
        });

        tracing::info!("Connected to PostgreSQL");
        Ok(Self::new(Arc::new(client)))
    }

    fn scan_shipment(row: &Row) -> Result<Shipment, tokio_postgres::Error> {
        let carrier: Option<String> = row.try_get("carrier")?;
        let estimated_delivery: Option<DateTime<Utc>> = row.try_get("estimated_delivery")?;

        Ok(Shipment {
            id: row.try_get(0)?,
            order_id: row.try_get(1)?,
            tracking_number: row.try_get("tracking_number")?,
            carrier: Shipment::normalize_carrier(carrier),
            status: row.try_get("status")?,
            estimated_delivery,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }
}

#[async_trait]
impl ShipmentRepository for PostgresShipmentRepository {
    async fn get_by_tracking_number(&self, tracking_number: &str) -> Result<Shipment, RepositoryError> {
        let row = self
            .client
            .query_opt(SELECT_BY_TRACKING_NUMBER, &[&tracking_number])
            .await
            .map_err(RepositoryError::query)?
            .ok_or_else(|| RepositoryError::tracking_not_found(tracking_number))?;

        Self::scan_shipment(&row).map_err(RepositoryError::query)
    }

    async fn get_by_order_id(&self, order_id: i64) -> Result<Shipment, RepositoryError> {
        let row = self
            .client
            .query_opt(SELECT_BY_ORDER_ID, &[&order_id])
            .await
            .map_err(RepositoryError::query)?
            .ok_or_else(|| RepositoryError::order_not_found(order_id))?;

        Self::scan_shipment(&row).map_err(RepositoryError::query)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_queries_cast_timestamps() {
        for query in [SELECT_BY_TRACKING_NUMBER, SELECT_BY_ORDER_ID] {
            for column in ["estimated_delivery", "created_at", "updated_at"] {
                let cast = format!("{column}::TIMESTAMPTZ AS {column}");
                assert!(query.contains(&cast), "{column} not cast in {query}");
            }
            assert!(query.contains("LIMIT 1"));
        }
    }
}
