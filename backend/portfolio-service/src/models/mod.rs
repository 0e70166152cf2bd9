/// Data models for portfolio-service
///
/// - `section`: the path-addressable section hierarchy
/// - `media`: uploaded media records, listing filters and upload DTOs
/// - `user`: accounts, auth payloads and follower lists
mod media;
mod section;
mod user;

pub use media::*;
pub use section::*;
pub use user::*;
