use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "images")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub produce_id: i32,
    pub user_id: Option<i32>,
    /// Relative to `general.uploads_path`
    pub image_path: Option<String>,
    pub upload_timestamp: String,
    /// One of `pending`, `processing`, `analyzed`
    pub status: String,
    pub deleted: bool,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::produce::Entity",
        from = "Column::ProduceId",
        to = "super::produce::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    Produce,
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::UserId",
        to = "super::users::Column::Id",
        on_update = "NoAction",
        on_delete = "SetNull"
    )]
    Users,
    #[sea_orm(has_many = "super::analysis_results::Entity")]
    AnalysisResults,
    #[sea_orm(has_many = "super::feedback::Entity")]
    Feedback,
}

impl Related<super::produce::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Produce.def()
    }
}

impl Related<super::users::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Users.def()
    }
}

impl Related<super::analysis_results::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::AnalysisResults.def()
    }
}

impl Related<super::feedback::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Feedback.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
