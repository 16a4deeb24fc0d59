use crate::entities::prelude::*;
use crate::entities::users;
use sea_orm_migration::prelude::*;
use sea_orm_migration::sea_orm::Schema;

#[derive(DeriveMigrationName)]
pub struct Migration;

/// Fixed record set present on every install. Seed keys are meant to be
/// rotated through the PIN workflow.
const SEED_USERS: &[(&str, &str, &str, &str, &str)] = &[
    (
        "alice",
        "Alice",
        "admin",
        "alice@ascompany.local",
        "keywarden_seed_key_alice_rotate_me",
    ),
    (
        "bob",
        "Bob",
        "dev",
        "bob@ascompany.local",
        "keywarden_seed_key_bob_rotate_me",
    ),
    (
        "tess",
        "Tess",
        "test",
        "tess@ascompany.local",
        "keywarden_seed_key_tess_rotate_me",
    ),
];

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let backend = manager.get_database_backend();
        let schema = Schema::new(backend);

        manager
            .create_table(
                schema
                    .create_table_from_entity(Users)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        // Idempotent seeding: existing rows (and any rotated credentials on
        // them) survive a restart untouched.
        let now = chrono::Utc::now().to_rfc3339();

        for (username, name, role, email, api_key) in SEED_USERS {
            let insert = sea_orm_migration::sea_query::Query::insert()
                .into_table(Users)
                .columns([
                    users::Column::Username,
                    users::Column::Name,
                    users::Column::Role,
                    users::Column::Email,
                    users::Column::ApiKey,
                    users::Column::CreatedAt,
                    users::Column::UpdatedAt,
                ])
                .values_panic([
                    (*username).into(),
                    (*name).into(),
                    (*role).into(),
                    (*email).into(),
                    (*api_key).into(),
                    now.clone().into(),
                    now.clone().into(),
                ])
                .on_conflict(
                    sea_orm_migration::sea_query::OnConflict::column(users::Column::Username)
                        .do_nothing()
                        .to_owned(),
                )
                .to_owned();

            manager.exec_stmt(insert).await?;
        }

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Users).to_owned())
            .await?;

        Ok(())
    }
}
