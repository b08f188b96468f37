//! Create user table migration.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(User::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(User::Id).string_len(32).not_null().primary_key())
                    .col(ColumnDef::new(User::Email).string_len(320).not_null())
                    .col(ColumnDef::new(User::Password).string_len(256).not_null())
                    .col(ColumnDef::new(User::Role).string_len(16).not_null().default("user"))
                    .col(
                        ColumnDef::new(User::FirstName)
                            .string_len(128)
                            .not_null()
                            .default("Jonathan"),
                    )
                    .col(ColumnDef::new(User::LastName).string_len(128).not_null().default("Doe"))
                    .col(ColumnDef::new(User::MiddleName).string_len(128))
                    .col(
                        ColumnDef::new(User::JobTitle)
                            .string_len(256)
                            .not_null()
                            .default("Collaborator & Editor"),
                    )
                    .col(ColumnDef::new(User::Description).text().not_null())
                    .col(ColumnDef::new(User::Avatar).string_len(1024).not_null().default(""))
                    .col(
                        ColumnDef::new(User::Social)
                            .json_binary()
                            .not_null()
                            .default(Expr::cust("'{}'::jsonb")),
                    )
                    .col(ColumnDef::new(User::Status).string_len(16).not_null().default("active"))
                    .col(ColumnDef::new(User::StatusUpdatedAt).timestamp_with_time_zone())
                    .col(ColumnDef::new(User::StatusComment).string_len(512))
                    .col(
                        ColumnDef::new(User::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(ColumnDef::new(User::UpdatedAt).timestamp_with_time_zone())
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_user_email")
                    .table(User::Table)
                    .col(User::Email)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // Index: status (activity sweep skips banned users)
        manager
            .create_index(
                Index::create()
                    .name("idx_user_status")
                    .table(User::Table)
                    .col(User::Status)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(User::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum User {
    Table,
    Id,
    Email,
    Password,
    Role,
    FirstName,
    LastName,
    MiddleName,
    JobTitle,
    Description,
    Avatar,
    Social,
    Status,
    StatusUpdatedAt,
    StatusComment,
    CreatedAt,
    UpdatedAt,
}
