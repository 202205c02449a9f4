pub mod birthday;
pub mod bot;
pub mod clock;
pub mod group;
pub mod images;
pub mod lock;
pub mod members;
pub mod publisher;
pub mod vk_client;

pub use crate::domain::model::{Member, PhotoAttachment, Post};
pub use crate::domain::ports::{Clock, ImageSource};
pub use crate::utils::error::Result;
