use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[derive(DeriveIden)]
enum SocialAccounts {
    Table,
    Id,
    UserId,
    ExternalUserId,
    AccessToken,
    TokenExpiresAt,
    LastSyncedAt,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum SocialPosts {
    Table,
    Id,
    AccountId,
    UserId,
    ExternalId,
    Caption,
    MediaType,
    MediaUrl,
    Permalink,
    PostedAt,
    SyncedAt,
}

#[derive(DeriveIden)]
enum Users {
    Table,
    Id,
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(SocialAccounts::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(SocialAccounts::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(SocialAccounts::UserId)
                            .uuid()
                            .not_null()
                            .unique_key(),
                    )
                    .col(
                        ColumnDef::new(SocialAccounts::ExternalUserId)
                            .string()
                            .not_null(),
                    )
                    .col(ColumnDef::new(SocialAccounts::AccessToken).text().not_null())
                    .col(
                        ColumnDef::new(SocialAccounts::TokenExpiresAt)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(SocialAccounts::LastSyncedAt)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(SocialAccounts::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(SocialAccounts::UpdatedAt)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_social_accounts_user_id")
                            .from(SocialAccounts::Table, SocialAccounts::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(SocialPosts::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(SocialPosts::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(SocialPosts::AccountId).uuid().not_null())
                    .col(ColumnDef::new(SocialPosts::UserId).uuid().not_null())
                    .col(ColumnDef::new(SocialPosts::ExternalId).string().not_null())
                    .col(ColumnDef::new(SocialPosts::Caption).text().null())
                    .col(ColumnDef::new(SocialPosts::MediaType).string().not_null())
                    .col(ColumnDef::new(SocialPosts::MediaUrl).text().null())
                    .col(ColumnDef::new(SocialPosts::Permalink).text().null())
                    .col(
                        ColumnDef::new(SocialPosts::PostedAt)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(SocialPosts::SyncedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_social_posts_account_id")
                            .from(SocialPosts::Table, SocialPosts::AccountId)
                            .to(SocialAccounts::Table, SocialAccounts::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // One mirrored row per upstream post.
        manager
            .create_index(
                Index::create()
                    .name("idx_social_posts_account_external")
                    .table(SocialPosts::Table)
                    .col(SocialPosts::AccountId)
                    .col(SocialPosts::ExternalId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_social_posts_user_id")
                    .table(SocialPosts::Table)
                    .col(SocialPosts::UserId)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(SocialPosts::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(SocialAccounts::Table).to_owned())
            .await
    }
}
