use crate::config::SecurityConfig;
use crate::models::content::{
    Article, ArticleInput, PortfolioItem, PortfolioItemInput, ServicePage, ServicePageInput,
};
use crate::models::user::{Role, User};
use crate::search::{ContentSource, FetchError, TextFilter, Visibility};
use anyhow::Result;
use sea_orm::{ConnectOptions, ConnectionTrait, Database, DatabaseConnection, Statement};
use std::path::Path;
use std::time::Duration;
use tracing::info;

pub mod migrator;
pub mod repositories;

pub use migrator::DEFAULT_API_KEY;

#[derive(Clone)]
pub struct Store {
    pub conn: DatabaseConnection,
}

impl Store {
    pub async fn new(db_url: &str) -> Result<Self> {
        Self::with_pool_options(db_url, 5, 1).await
    }

    pub async fn with_pool_options(
        db_url: &str,
        max_connections: u32,
        min_connections: u32,
    ) -> Result<Self> {
        use sea_orm_migration::MigratorTrait;

        let path_str = db_url.trim_start_matches("sqlite:");
        if !path_str.starts_with(":memory:") {
            if let Some(parent) = Path::new(path_str).parent() {
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

    fn post_repo(&self) -> repositories::posts::PostRepository {
        repositories::posts::PostRepository::new(self.conn.clone())
    }

    fn project_repo(&self) -> repositories::projects::ProjectRepository {
        repositories::projects::ProjectRepository::new(self.conn.clone())
    }

    fn service_page_repo(&self) -> repositories::service_pages::ServicePageRepository {
        repositories::service_pages::ServicePageRepository::new(self.conn.clone())
    }

    fn user_repo(&self) -> repositories::user::UserRepository {
        repositories::user::UserRepository::new(self.conn.clone())
    }

    pub async fn add_post(&self, input: &ArticleInput) -> Result<i32> {
        self.post_repo().add(input).await
    }

    pub async fn add_project(&self, input: &PortfolioItemInput) -> Result<i32> {
        self.project_repo().add(input).await
    }

    pub async fn add_service_page(&self, input: &ServicePageInput) -> Result<i32> {
        self.service_page_repo().add(input).await
    }

    pub async fn get_user_by_username(&self, username: &str) -> Result<Option<User>> {
        self.user_repo().get_by_username(username).await
    }

    pub async fn create_user(
        &self,
        username: &str,
        password: &str,
        role: Role,
        config: &SecurityConfig,
    ) -> Result<User> {
        self.user_repo()
            .create(username, password, role, config)
            .await
    }

    pub async fn verify_user_password(&self, username: &str, password: &str) -> Result<bool> {
        self.user_repo().verify_password(username, password).await
    }

    pub async fn verify_api_key(&self, api_key: &str) -> Result<Option<User>> {
        self.user_repo().verify_api_key(api_key).await
    }

    pub async fn regenerate_user_api_key(&self, username: &str) -> Result<String> {
        self.user_repo().regenerate_api_key(username).await
    }
}

#[async_trait::async_trait]
impl ContentSource for Store {
    async fn find_articles(
        &self,
        filter: &TextFilter,
        visibility: Visibility,
        limit: u64,
    ) -> Result<Vec<Article>, FetchError> {
        let rows = self
            .post_repo()
            .search(filter, visibility.includes_drafts(), limit)
            .await?;
        Ok(rows.into_iter().map(Article::from).collect())
    }

    async fn find_portfolio_items(
        &self,
        filter: &TextFilter,
        limit: u64,
    ) -> Result<Vec<PortfolioItem>, FetchError> {
        let rows = self.project_repo().search(filter, limit).await?;
        Ok(rows.into_iter().map(PortfolioItem::from).collect())
    }

    async fn find_portfolio_items_by_tags(
        &self,
        tags: &[String],
        limit: u64,
    ) -> Result<Vec<PortfolioItem>, FetchError> {
        let rows = self.project_repo().search_by_tags(tags, limit).await?;
        Ok(rows.into_iter().map(PortfolioItem::from).collect())
    }

    async fn find_service_pages(
        &self,
        filter: &TextFilter,
        limit: u64,
    ) -> Result<Vec<ServicePage>, FetchError> {
        let rows = self.service_page_repo().search(filter, limit).await?;
        Ok(rows.into_iter().map(ServicePage::from).collect())
    }

    async fn find_service_pages_by_content(
        &self,
        phrase: &str,
        exclude: &[i32],
        limit: u64,
    ) -> Result<Vec<ServicePage>, FetchError> {
        let rows = self
            .service_page_repo()
            .search_content(phrase, exclude, limit)
            .await?;
        Ok(rows.into_iter().map(ServicePage::from).collect())
    }
}
