use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "reviews")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub user_id: i32,
    pub produce_id: i32,
    /// 1-5
    pub rating: i32,
    pub comment: Option<String>,
    pub created_at: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::UserId",
        to = "super::users::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    Users,
    #[sea_orm(
        belongs_to = "super::produce::Entity",
        from = "Column::ProduceId",
        to = "super::produce::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    Produce,
}

impl Related<super::users::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Users.def()
    }
}

impl Related<super::produce::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Produce.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
