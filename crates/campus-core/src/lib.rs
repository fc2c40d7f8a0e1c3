pub mod auth;
pub mod error;
pub mod models;
pub mod update;

pub use auth::{Claims, IssuedToken, TokenSigner, hash_password, verify_password};
pub use error::AppError;
pub use models::{
    Course, CourseUpdate, Enrollment, NewCourse, NewStudent, NewUser, Role, Student,
    StudentUpdate, StudentWithCourses, User,
};
pub use update::{FieldDiff, FieldValue};
