//! Initial schema migration.
//!
//! Creates the two tables of the service:
//!
//! - `users`: sign-up / login identities
//! - `fails`: "coding fail" posts referencing their creator

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[derive(Iden)]
enum Users {
    Table,
    Id,
    Name,
    Email,
}

#[derive(Iden)]
enum Fails {
    Table,
    Id,
    Name,
    Description,
    Author,
    CreatedBy,
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Users::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Users::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Users::Name).string().not_null())
                    .col(ColumnDef::new(Users::Email).string().not_null())
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-users-email-unique")
                    .table(Users::Table)
                    .col(Users::Email)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Fails::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Fails::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Fails::Name).string().not_null())
                    .col(ColumnDef::new(Fails::Description).text().not_null())
                    .col(
                        ColumnDef::new(Fails::Author)
                            .string()
                            .not_null()
                            .default("Anonymous"),
                    )
                    .col(ColumnDef::new(Fails::CreatedBy).integer().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-fails-created_by")
                            .from(Fails::Table, Fails::CreatedBy)
                            .to(Users::Table, Users::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-fails-created_by")
                    .table(Fails::Table)
                    .col(Fails::CreatedBy)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Drop in reverse order of creation (respecting FK dependencies)
        manager
            .drop_table(Table::drop().table(Fails::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Users::Table).to_owned())
            .await?;
        Ok(())
    }
}
