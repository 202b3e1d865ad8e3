use crate::classifier::PRODUCE_GROUPS;
use crate::entities::{prelude::*, produce};
use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let now = chrono::Utc::now().to_rfc3339();

        let mut insert = sea_orm_migration::sea_query::Query::insert()
            .into_table(Produce)
            .columns([
                produce::Column::Name,
                produce::Column::Category,
                produce::Column::CreatedAt,
            ])
            .to_owned();

        for group in &PRODUCE_GROUPS {
            insert.values_panic([group.key.into(), group.category.into(), now.clone().into()]);
        }

        manager.exec_stmt(insert).await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let keys: Vec<&str> = PRODUCE_GROUPS.iter().map(|g| g.key).collect();

        let delete = sea_orm_migration::sea_query::Query::delete()
            .from_table(Produce)
            .and_where(Expr::col(produce::Column::Name).is_in(keys))
            .to_owned();

        manager.exec_stmt(delete).await?;

        Ok(())
    }
}
