pub mod config;
pub mod course_repository;
pub mod database;
pub mod student_repository;
pub mod user_repository;

pub use config::DatabaseConfig;
pub use course_repository::CourseRepository;
pub use database::Database;
pub use student_repository::StudentRepository;
pub use user_repository::UserRepository;
