use crate::config::SecurityConfig;
use crate::models::analysis::{AnalysisInput, AnalysisRecord};
use crate::models::feedback::FeedbackRecord;
use crate::models::image::{ImageRecord, ImageStatus};
use crate::models::produce::ProduceRecord;
use crate::models::review::ReviewRecord;
use anyhow::Result;
use sea_orm::{ConnectOptions, ConnectionTrait, Database, DatabaseConnection, Statement};
use std::path::Path;
use std::time::Duration;
use tracing::info;

pub mod migrator;
pub mod repositories;

pub use repositories::user::User;

#[derive(Clone)]
pub struct Store {
    pub conn: DatabaseConnection,
}

impl Store {
    pub async fn with_pool_options(
        db_url: &str,
        max_connections: u32,
        min_connections: u32,
    ) -> Result<Self> {
        use sea_orm_migration::MigratorTrait;

        if !db_url.contains(":memory:") {
            let path_str = db_url.trim_start_matches("sqlite:");
            let path_str = path_str.split('?').next().unwrap_or(path_str);
            if let Some(parent) = Path::new(path_str).parent()
                && !parent.as_os_str().is_empty()
            {
                tokio::fs::create_dir_all(parent).await.ok();
            }
            if !Path::new(path_str).exists() {
                std::fs::File::create(path_str)?;
            }
        }

        let mut opt = ConnectOptions::new(db_url.to_string());
        opt.max_connections(max_connections)
            .min_connections(min_connections)
            .connect_timeout(Duration::from_secs(10))
            .acquire_timeout(Duration::from_secs(10))
            .idle_timeout(Duration::from_secs(300))
            .max_lifetime(Duration::from_secs(600))
            .sqlx_logging(false);

        let conn = Database::connect(opt).await?;

        migrator::Migrator::up(&conn, None).await?;

        info!(
            "Database connected & migrations applied (pool: {}-{})",
            min_connections, max_connections
        );

        Ok(Self { conn })
    }

    pub async fn ping(&self) -> Result<()> {
        let backend = self.conn.get_database_backend();
        self.conn
            .query_one(Statement::from_string(backend, "SELECT 1".to_string()))
            .await?;
        Ok(())
    }

    fn user_repo(&self) -> repositories::user::UserRepository {
        repositories::user::UserRepository::new(self.conn.clone())
    }

    fn produce_repo(&self) -> repositories::produce::ProduceRepository {
        repositories::produce::ProduceRepository::new(self.conn.clone())
    }

    fn image_repo(&self) -> repositories::image::ImageRepository {
        repositories::image::ImageRepository::new(self.conn.clone())
    }

    fn analysis_repo(&self) -> repositories::analysis::AnalysisRepository {
        repositories::analysis::AnalysisRepository::new(self.conn.clone())
    }

    fn feedback_repo(&self) -> repositories::feedback::FeedbackRepository {
        repositories::feedback::FeedbackRepository::new(self.conn.clone())
    }

    fn review_repo(&self) -> repositories::review::ReviewRepository {
        repositories::review::ReviewRepository::new(self.conn.clone())
    }

    // ========================================================================
    // Users
    // ========================================================================

    pub async fn create_user(
        &self,
        username: &str,
        email: &str,
        password: &str,
        security: &SecurityConfig,
    ) -> Result<User> {
        self.user_repo()
            .create(username, email, password, security)
            .await
    }

    pub async fn user_exists(&self, username: &str) -> Result<bool> {
        self.user_repo().exists(username).await
    }

    pub async fn get_user_by_username(&self, username: &str) -> Result<Option<User>> {
        self.user_repo().get_by_username(username).await
    }

    pub async fn get_user_by_id(&self, id: i32) -> Result<Option<User>> {
        self.user_repo().get_by_id(id).await
    }

    pub async fn verify_user_password(
        &self,
        username: &str,
        password: &str,
    ) -> Result<Option<User>> {
        self.user_repo().verify_password(username, password).await
    }

    pub async fn show_instruction_popup(&self, user_id: i32) -> Result<bool> {
        self.user_repo().show_instruction_popup(user_id).await
    }

    pub async fn set_show_instruction_popup(&self, user_id: i32, show: bool) -> Result<()> {
        self.user_repo()
            .set_show_instruction_popup(user_id, show)
            .await
    }

    // ========================================================================
    // Produce
    // ========================================================================

    pub async fn get_produce(&self, id: i32) -> Result<Option<ProduceRecord>> {
        self.produce_repo().get(id).await
    }

    pub async fn list_produce(&self) -> Result<Vec<ProduceRecord>> {
        self.produce_repo().list().await
    }

    pub async fn get_or_create_produce(&self, name: &str, category: &str) -> Result<ProduceRecord> {
        self.produce_repo().get_or_create(name, category).await
    }

    // ========================================================================
    // Images
    // ========================================================================

    pub async fn create_image(
        &self,
        produce_id: i32,
        user_id: Option<i32>,
        status: ImageStatus,
    ) -> Result<ImageRecord> {
        self.image_repo().create(produce_id, user_id, status).await
    }

    pub async fn get_image(&self, id: i32) -> Result<Option<ImageRecord>> {
        self.image_repo().get(id).await
    }

    pub async fn list_images_for_user(&self, user_id: i32) -> Result<Vec<ImageRecord>> {
        self.image_repo().list_for_user(user_id).await
    }

    pub async fn set_image_path(&self, id: i32, path: &str) -> Result<()> {
        self.image_repo().set_path(id, path).await
    }

    pub async fn set_image_status(&self, id: i32, status: ImageStatus) -> Result<()> {
        self.image_repo().set_status(id, status).await
    }

    pub async fn soft_delete_image(&self, id: i32) -> Result<()> {
        self.image_repo().soft_delete(id).await
    }

    // ========================================================================
    // Analysis results
    // ========================================================================

    pub async fn record_analysis(
        &self,
        image_id: i32,
        input: AnalysisInput,
    ) -> Result<AnalysisRecord> {
        self.analysis_repo().record(image_id, input).await
    }

    pub async fn latest_analysis(&self, image_id: i32) -> Result<Option<AnalysisRecord>> {
        self.analysis_repo().latest_for_image(image_id).await
    }

    // ========================================================================
    // Feedback
    // ========================================================================

    pub async fn create_feedback(
        &self,
        image_id: i32,
        user_id: Option<i32>,
        is_helpful: Option<bool>,
        explanation: Option<&str>,
        session_key: Option<&str>,
    ) -> Result<FeedbackRecord> {
        self.feedback_repo()
            .create(image_id, user_id, is_helpful, explanation, session_key)
            .await
    }

    pub async fn get_feedback(&self, id: i32) -> Result<Option<FeedbackRecord>> {
        self.feedback_repo().get(id).await
    }

    pub async fn list_feedback_for_image(&self, image_id: i32) -> Result<Vec<FeedbackRecord>> {
        self.feedback_repo().list_for_image(image_id).await
    }

    // ========================================================================
    // Reviews
    // ========================================================================

    pub async fn create_review(
        &self,
        user_id: i32,
        produce_id: i32,
        rating: i32,
        comment: Option<&str>,
    ) -> Result<ReviewRecord> {
        self.review_repo()
            .create(user_id, produce_id, rating, comment)
            .await
    }

    pub async fn list_reviews_for_produce(&self, produce_id: i32) -> Result<Vec<ReviewRecord>> {
        self.review_repo().list_for_produce(produce_id).await
    }
}
