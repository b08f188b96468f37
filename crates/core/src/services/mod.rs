//! Business logic services.

#![allow(missing_docs)]

pub mod activity;
pub mod auth;
pub mod comment;
pub mod post;
pub mod quote;
pub mod reaction;
pub mod scheduler;
pub mod tag;
pub mod upload;
pub mod user;

pub use activity::{ActivityService, SweepReport, classify};
pub use auth::{
    AuthService, AuthSession, Claims, LoginInput, RegisterInput, TokenPair, TokenService,
    TokenType,
};
pub use comment::{CommentService, CreateCommentInput, UpdateCommentInput};
pub use post::{CreatePostInput, PostQuery, PostService, UpdatePostInput};
pub use quote::{CreateQuoteInput, QuoteService, UpdateQuoteInput};
pub use reaction::{ReactionCounts, ReactionService};
pub use scheduler::{ActivitySweep, run_activity_sweep};
pub use tag::{CreateTagInput, TagService, UpdateTagInput};
pub use upload::{UploadService, UploadedFile};
pub use user::{SocialLinks, UpdateProfileInput, UserService};
