//! Database access for coursehub
//!
//! Courses, their ordered content items, purchases and per-item progress are
//! stored in SQLite through SQLx. Each table group is reached through a
//! repository trait (`CourseRepository`, `ContentRepository`,
//! `PurchaseRepository`, `ProgressRepository`) with an SQL implementation;
//! [`Repositories`] bundles them over one [`DbClient`].
//!
//! # Example
//!
//! ```rust,no_run
//! use coursehub_db::{CourseRepository, DbClient, Repositories};
//!
//! async fn published() -> Result<(), Box<dyn std::error::Error>> {
//!     let db = DbClient::from_url("sqlite://data/coursehub.db").await?;
//!     db.init_schema().await?;
//!     let repos = Repositories::new(&db);
//!     let courses = repos.courses.list_published_courses().await?;
//!     println!("{} courses", courses.len());
//!     Ok(())
//! }
//! ```

pub mod client;
pub mod error;
pub mod factory;
pub mod models;
pub mod repositories;
mod schema;

pub use client::{DbClient, DbTransaction};
pub use error::DbError;
pub use factory::Repositories;
pub use models::{
    ContentType, Course, CourseContent, NewContent, NewCourse, NewPurchase, Progress, Purchase,
    PurchaseRecord,
};
pub use repositories::{
    ContentRepository, CourseRepository, ProgressRepository, PurchaseRepository,
    SqlContentRepository, SqlCourseRepository, SqlProgressRepository, SqlPurchaseRepository,
};
