use anyhow::Result;
use async_trait::async_trait;
use diesel::prelude::*;
use std::sync::Arc;

use crate::{
    domain,
    infra::db::postgres::{postgres_connection::PgPoolSquad, schema::items},
};
use domain::{entities::items::ItemEntity, repositories::items::ItemRepository};

pub struct ItemPostgres {
    db_pool: Arc<PgPoolSquad>,
}

impl ItemPostgres {
    pub fn new(db_pool: Arc<PgPoolSquad>) -> Self {
        Self { db_pool }
    }
}

#[async_trait]
impl ItemRepository for ItemPostgres {
    async fn find_by_ids(&self, item_ids: Vec<i32>) -> Result<Vec<ItemEntity>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let results = items::table
            .filter(items::id.eq_any(item_ids))
            .select(ItemEntity::as_select())
            .order(items::id.asc())
            .load::<ItemEntity>(&mut conn)?;

        Ok(results)
    }
}
