use std::sync::Arc;

use crate::db::{DbPool, OrmConn};
use crate::imaging::ImageStore;

#[derive(Clone)]
pub struct AppState {
    pub pool: DbPool,
    pub orm: OrmConn,
    pub images: Arc<dyn ImageStore>,
}
