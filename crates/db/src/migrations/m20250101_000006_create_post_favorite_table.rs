//! Create post favorite table migration.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(PostFavorite::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(PostFavorite::Id)
                            .string_len(32)
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(PostFavorite::UserId).string_len(32).not_null())
                    .col(ColumnDef::new(PostFavorite::PostId).string_len(32).not_null())
                    .col(
                        ColumnDef::new(PostFavorite::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_post_favorite_user")
                            .from(PostFavorite::Table, PostFavorite::UserId)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_post_favorite_post")
                            .from(PostFavorite::Table, PostFavorite::PostId)
                            .to(Post::Table, Post::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_post_favorite_user_post")
                    .table(PostFavorite::Table)
                    .col(PostFavorite::UserId)
                    .col(PostFavorite::PostId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_post_favorite_post_id")
                    .table(PostFavorite::Table)
                    .col(PostFavorite::PostId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(PostFavorite::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum PostFavorite {
    Table,
    Id,
    UserId,
    PostId,
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
