//! Database entities.

#![allow(missing_docs)]

pub mod comment;
pub mod post;
pub mod post_favorite;
pub mod post_vote;
pub mod quote;
pub mod subscription;
pub mod tag;
pub mod user;

pub use comment::Entity as Comment;
pub use post::Entity as Post;
pub use post_favorite::Entity as PostFavorite;
pub use post_vote::Entity as PostVote;
pub use quote::Entity as Quote;
pub use subscription::Entity as Subscription;
pub use tag::Entity as Tag;
pub use user::Entity as User;
