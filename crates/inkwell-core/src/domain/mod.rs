//! Domain entities - the core business objects.

mod like;
mod post;
mod user;

pub use like::Like;
pub use post::{NewPost, Post, PostQuery, PostWithLikes};
pub use user::{NewUser, User};
