//! Create post vote table migration.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(PostVote::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(PostVote::Id)
                            .string_len(32)
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(PostVote::UserId).string_len(32).not_null())
                    .col(ColumnDef::new(PostVote::PostId).string_len(32).not_null())
                    .col(ColumnDef::new(PostVote::Kind).string_len(16).not_null())
                    .col(
                        ColumnDef::new(PostVote::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_post_vote_user")
                            .from(PostVote::Table, PostVote::UserId)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_post_vote_post")
                            .from(PostVote::Table, PostVote::PostId)
                            .to(Post::Table, Post::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Unique index: (user_id, post_id) - one vote per user per post
        manager
            .create_index(
                Index::create()
                    .name("idx_post_vote_user_post")
                    .table(PostVote::Table)
                    .col(PostVote::UserId)
                    .col(PostVote::PostId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // Index: (post_id, kind) - counting likes and dislikes of a post
        manager
            .create_index(
                Index::create()
                    .name("idx_post_vote_post_kind")
                    .table(PostVote::Table)
                    .col(PostVote::PostId)
                    .col(PostVote::Kind)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(PostVote::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum PostVote {
    Table,
    Id,
    UserId,
    PostId,
    Kind,
    CreatedAt,
}

#[derive(Iden)]
enum User {
    Table,
    Id,
}

#[derive(Iden)]
enum Post {
    Table,
    Id,
}
