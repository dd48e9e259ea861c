use std::sync::Arc;

use sea_orm::DatabaseConnection;

use crate::{config::AppConfig, db::Db};

#[derive(Clone)]
pub struct AppState {
    pub db: Db,
    pub config: Arc<AppConfig>,
}

impl AppState {
    pub fn new(db: Db, config: AppConfig) -> Self {
        Self {
            db,
            config: Arc::new(config),
        }
    }

    pub fn conn(&self) -> Arc<DatabaseConnection> {
        self.db.conn()
    }
}
