//! Repository layer.
//!
//! Each repository wraps one table and maps `sea_orm::DbErr` into
//! [`inkwell_common::AppError::Database`].

mod comment;
mod post;
mod post_favorite;
mod post_vote;
mod quote;
mod subscription;
mod tag;
mod user;

pub use comment::CommentRepository;
pub use post::{PostListQuery, PostRepository, PostSortField};
pub use post_favorite::PostFavoriteRepository;
pub use post_vote::PostVoteRepository;
pub use quote::QuoteRepository;
pub use subscription::SubscriptionRepository;
pub use tag::TagRepository;
pub use user::UserRepository;
