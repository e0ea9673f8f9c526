//! Broker repository for referral network database operations.

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, DbErr, EntityTrait,
    QueryFilter, QueryOrder, Set,
};
use uuid::Uuid;

use plotbook_core::commission::BrokerRef;

use crate::entities::brokers;

/// Error types for broker operations.
#[derive(Debug, thiserror::Error)]
pub enum BrokerError {
    /// Broker not found.
    #[error("Broker not found: {0}")]
    BrokerNotFound(Uuid),

    /// Referenced upline broker not found.
    #[error("Upline broker not found: {0}")]
    UplineNotFound(Uuid),

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

impl BrokerError {
    /// Returns the error code for API responses.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::BrokerNotFound(_) => "BROKER_NOT_FOUND",
            Self::UplineNotFound(_) => "UPLINE_NOT_FOUND",
            Self::Database(_) => "DATABASE_ERROR",
        }
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub fn http_status_code(&self) -> u16 {
        match self {
            Self::BrokerNotFound(_) => 404,
            Self::UplineNotFound(_) => 422,
            Self::Database(_) => 500,
        }
    }
}

/// Input for creating a broker.
#[derive(Debug, Clone)]
pub struct CreateBrokerInput {
    /// Broker display name.
    pub name: String,
    /// Contact phone number.
    pub phone: Option<String>,
    /// Recruiting broker, if any.
    pub upline_id: Option<Uuid>,
}

/// Filter options for listing brokers.
#[derive(Debug, Clone, Default)]
pub struct BrokerFilter {
    /// Filter by active status.
    pub is_active: Option<bool>,
}

/// Broker repository for network CRUD and upline traversal.
#[derive(Debug, Clone)]
pub struct BrokerRepository {
    db: DatabaseConnection,
}

impl BrokerRepository {
    /// Creates a new broker repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Creates a new broker.
    ///
    /// # Errors
    ///
    /// Returns an error if the referenced upline broker does not exist or
    /// the database operation fails.
    pub async fn create_broker(
        &self,
        input: CreateBrokerInput,
    ) -> Result<brokers::Model, BrokerError> {
        if let Some(upline_id) = input.upline_id {
            let upline = brokers::Entity::find_by_id(upline_id).one(&self.db).await?;
            if upline.is_none() {
                return Err(BrokerError::UplineNotFound(upline_id));
            }
        }

        let now = Utc::now().into();
        let broker = brokers::ActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set(input.name),
            phone: Set(input.phone),
            upline_id: Set(input.upline_id),
            is_active: Set(true),
            created_at: Set(now),
            updated_at: Set(now),
        };

        let created = broker.insert(&self.db).await?;
        Ok(created)
    }

    /// Gets a broker by ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the broker is not found or the query fails.
    pub async fn get_broker(&self, id: Uuid) -> Result<brokers::Model, BrokerError> {
        brokers::Entity::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or(BrokerError::BrokerNotFound(id))
    }

    /// Lists brokers ordered by name.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list_brokers(
        &self,
        filter: BrokerFilter,
    ) -> Result<Vec<brokers::Model>, BrokerError> {
        let mut query = brokers::Entity::find();

        if let Some(is_active) = filter.is_active {
            query = query.filter(brokers::Column::IsActive.eq(is_active));
        }

        let result = query
            .order_by_asc(brokers::Column::Name)
            .all(&self.db)
            .await?;

        Ok(result)
    }

    /// Walks the referral chain upward from the given broker.
    ///
    /// Returns the uplines closest-first, bounded by `max_depth`.
    ///
    /// # Errors
    ///
    /// Returns an error if the starting broker does not exist or a query
    /// fails.
    pub async fn upline_chain(
        &self,
        id: Uuid,
        max_depth: usize,
    ) -> Result<Vec<BrokerRef>, BrokerError> {
        let start = self.get_broker(id).await?;
        let chain = walk_upline(&self.db, &start, max_depth).await?;
        Ok(chain)
    }

    /// Lists the brokers directly recruited by the given broker.
    ///
    /// # Errors
    ///
    /// Returns an error if the broker does not exist or the query fails.
    pub async fn downline(&self, id: Uuid) -> Result<Vec<brokers::Model>, BrokerError> {
        // Existence check keeps a missing broker distinct from an empty downline.
        let broker = self.get_broker(id).await?;

        let result = brokers::Entity::find()
            .filter(brokers::Column::UplineId.eq(broker.id))
            .order_by_asc(brokers::Column::Name)
            .all(&self.db)
            .await?;

        Ok(result)
    }
}

/// Walks up the referral chain from `start`, collecting uplines closest-first.
///
/// Bounded by `max_depth` and stops at a missing upline or a broker already
/// seen, so a corrupted chain can never loop.
pub(crate) async fn walk_upline<C>(
    conn: &C,
    start: &brokers::Model,
    max_depth: usize,
) -> Result<Vec<BrokerRef>, DbErr>
where
    C: ConnectionTrait,
{
    let mut chain = Vec::new();
    let mut visited = vec![start.id];
    let mut cursor = start.upline_id;

    while let Some(upline_id) = cursor {
        if chain.len() >= max_depth || visited.contains(&upline_id) {
            break;
        }

        let Some(upline) = brokers::Entity::find_by_id(upline_id).one(conn).await? else {
            break;
        };

        visited.push(upline.id);
        cursor = upline.upline_id;
        chain.push(BrokerRef {
            id: upline.id,
            name: upline.name,
        });
    }

    Ok(chain)
}
