//! Repository traits and their SQL implementations, one pair per table group.

pub mod course;
pub mod course_sql;
pub mod progress;
pub mod progress_sql;
pub mod purchase;
pub mod purchase_sql;

pub use course::{ContentRepository, CourseRepository};
pub use course_sql::{SqlContentRepository, SqlCourseRepository};
pub use progress::ProgressRepository;
pub use progress_sql::SqlProgressRepository;
pub use purchase::PurchaseRepository;
pub use purchase_sql::SqlPurchaseRepository;
