use anyhow::Result;
use async_trait::async_trait;
use mockall::automock;

use crate::domain::entities::items::ItemEntity;

#[automock]
#[async_trait]
pub trait ItemRepository {
    /// Loads every item whose id is in `item_ids`. Unknown ids are simply absent from the result.
    async fn find_by_ids(&self, item_ids: Vec<i32>) -> Result<Vec<ItemEntity>>;
}
