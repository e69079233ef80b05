use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[derive(DeriveIden)]
enum Appointments {
    Table,
    BusinessId,
    ClientId,
}

#[derive(DeriveIden)]
enum Projects {
    Table,
    BusinessId,
    ClientId,
}

#[derive(DeriveIden)]
enum Testimonials {
    Table,
    BusinessId,
    ClientId,
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Index on appointments.business_id for listing a business's slots
        manager
            .create_index(
                Index::create()
                    .name("idx_appointments_business_id")
                    .table(Appointments::Table)
                    .col(Appointments::BusinessId)
                    .to_owned(),
            )
            .await?;

        // Index on appointments.client_id for a client's bookings
        manager
            .create_index(
                Index::create()
                    .name("idx_appointments_client_id")
                    .table(Appointments::Table)
                    .col(Appointments::ClientId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_projects_business_id")
                    .table(Projects::Table)
                    .col(Projects::BusinessId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_projects_client_id")
                    .table(Projects::Table)
                    .col(Projects::ClientId)
                    .to_owned(),
            )
            .await?;

        // Index on testimonials.business_id for the public testimonial wall
        manager
            .create_index(
                Index::create()
                    .name("idx_testimonials_business_id")
                    .table(Testimonials::Table)
                    .col(Testimonials::BusinessId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_testimonials_client_id")
                    .table(Testimonials::Table)
                    .col(Testimonials::ClientId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        for name in [
            "idx_appointments_business_id",
            "idx_appointments_client_id",
            "idx_projects_business_id",
            "idx_projects_client_id",
            "idx_testimonials_business_id",
            "idx_testimonials_client_id",
        ] {
            manager
                .drop_index(Index::drop().name(name).to_owned())
                .await?;
        }

        Ok(())
    }
}
