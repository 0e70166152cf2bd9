/// HTTP request handlers
pub mod auth;
pub mod health;
pub mod media;
pub mod sections;
pub mod users;

pub use auth::*;
pub use health::*;
pub use media::*;
pub use sections::{
    get_media_under_section, get_section_by_path, get_section_media, list_children, list_sections,
    section_tree,
};
pub use users::*;
