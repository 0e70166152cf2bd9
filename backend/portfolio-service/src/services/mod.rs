/// Business services layer
pub mod follow;
pub mod storage;

pub use follow::FollowService;
pub use storage::{object_key, ObjectStorage, S3Storage};
