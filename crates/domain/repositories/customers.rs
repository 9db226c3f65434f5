use anyhow::Result;
use async_trait::async_trait;
use mockall::automock;

use crate::domain::entities::customers::CustomerEntity;

#[automock]
#[async_trait]
pub trait CustomerRepository {
    async fn find_by_id(&self, customer_id: &str) -> Result<Option<CustomerEntity>>;
}
