//! SeaORM entities mirroring the `users`, `posts` and `likes` tables.

pub mod like;
pub mod post;
pub mod user;
