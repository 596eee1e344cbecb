//! ClickSink implementation for LinkStore
//!
//! 点击明细和计数器在同一个事务里落库：
//! 两者要么都可见，要么都不可见，聚合口径才不会互相矛盾。

use async_trait::async_trait;
use sea_orm::ActiveValue::Set;
use sea_orm::sea_query::Expr;
use sea_orm::{ColumnTrait, EntityTrait, ExprTrait, QueryFilter, TransactionTrait};
use tracing::debug;

use super::{LinkStore, retry};
use crate::telemetry::{ClickEvent, ClickSink};

use migration::entities::{click, link};

#[async_trait]
impl ClickSink for LinkStore {
    async fn write_click(&self, event: ClickEvent) -> anyhow::Result<()> {
        let db = self.get_db();
        let event_ref = &event;

        retry::with_retry("write_click", self.retry_config(), || async {
            let txn = db.begin().await?;

            click::Entity::insert(click::ActiveModel {
                link_id: Set(event_ref.link_id.clone()),
                occurred_at: Set(event_ref.occurred_at),
                ip_address: Set(event_ref.ip_address.clone()),
                country: Set(event_ref.country.clone()),
                city: Set(event_ref.city.clone()),
                referrer: Set(event_ref.referrer.clone()),
                user_agent: Set(event_ref.user_agent.clone()),
                device_type: Set(Some(event_ref.device_type.clone())),
                browser: Set(Some(event_ref.browser.clone())),
                os: Set(Some(event_ref.os.clone())),
                ..Default::default()
            })
            .exec(&txn)
            .await?;

            link::Entity::update_many()
                .col_expr(
                    link::Column::ClickCount,
                    Expr::col(link::Column::ClickCount).add(1),
                )
                .filter(link::Column::Id.eq(&event_ref.link_id))
                .exec(&txn)
                .await?;

            txn.commit().await
        })
        .await
        .map_err(|e| anyhow::anyhow!("Failed to persist click (still failed after retries): {}", e))?;

        debug!("Click persisted for link {}", event.link_id);
        Ok(())
    }
}
