use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(OtpCodes::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(OtpCodes::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(OtpCodes::UserId).uuid().not_null())
                    .col(ColumnDef::new(OtpCodes::Purpose).string_len(32).not_null())
                    .col(ColumnDef::new(OtpCodes::CodeHash).string().not_null())
                    .col(
                        ColumnDef::new(OtpCodes::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(OtpCodes::ExpiresAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(ColumnDef::new(OtpCodes::ConsumedAt).timestamp_with_time_zone())
                    .col(
                        ColumnDef::new(OtpCodes::Attempts)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(OtpCodes::LastSentAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(OtpCodes::Table, OtpCodes::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Active-code lookups filter on (user, purpose, consumed, expiry).
        manager
            .create_index(
                Index::create()
                    .table(OtpCodes::Table)
                    .col(OtpCodes::UserId)
                    .col(OtpCodes::Purpose)
                    .col(OtpCodes::ConsumedAt)
                    .col(OtpCodes::ExpiresAt)
                    .name("idx_otp_codes_user_purpose")
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(OtpCodes::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum OtpCodes {
    Table,
    Id,
    UserId,
    Purpose,
    CodeHash,
    CreatedAt,
    ExpiresAt,
    ConsumedAt,
    Attempts,
    LastSentAt,
}

#[derive(Iden)]
enum Users {
    Table,
    Id,
}
