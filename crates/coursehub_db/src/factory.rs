//! Bundles the SQL repositories that share one pool.

use crate::repositories::{
    SqlContentRepository, SqlCourseRepository, SqlProgressRepository, SqlPurchaseRepository,
};
use crate::DbClient;

#[derive(Debug, Clone)]
pub struct Repositories {
    pub courses: SqlCourseRepository,
    pub content: SqlContentRepository,
    pub purchases: SqlPurchaseRepository,
    pub progress: SqlProgressRepository,
}

impl Repositories {
    pub fn new(db_client: &DbClient) -> Self {
        Self {
            courses: SqlCourseRepository::new(db_client.clone()),
            content: SqlContentRepository::new(db_client.clone()),
            purchases: SqlPurchaseRepository::new(db_client.clone()),
            progress: SqlProgressRepository::new(db_client.clone()),
        }
    }
}
