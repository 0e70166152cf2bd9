/// Database access layer
pub mod media_repo;
pub mod section_repo;
pub mod user_repo;
