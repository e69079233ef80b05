use sea_orm::*;
use uuid::Uuid;

use crate::models::projects::{self, CreateProject, Status, UpdateProject};

pub async fn insert_project(
    db: &DatabaseConnection,
    business_id: Uuid,
    input: CreateProject,
) -> Result<projects::Model, DbErr> {
    let new_project = projects::ActiveModel {
        id: Set(Uuid::new_v4()),
        business_id: Set(business_id),
        client_id: Set(input.client_id),
        title: Set(input.title),
        description: Set(input.description),
        status: Set(Status::Planned),
        estimated_start: Set(input.estimated_start),
        estimated_end: Set(input.estimated_end),
        actual_start: Set(None),
        actual_end: Set(None),
        created_at: Set(chrono::Utc::now()),
        updated_at: Set(None),
    };

    new_project.insert(db).await
}

pub async fn get_project_by_id(
    db: &DatabaseConnection,
    id: Uuid,
) -> Result<Option<projects::Model>, DbErr> {
    projects::Entity::find_by_id(id).one(db).await
}

pub async fn get_projects_by_business(
    db: &DatabaseConnection,
    business_id: Uuid,
) -> Result<Vec<projects::Model>, DbErr> {
    projects::Entity::find()
        .filter(projects::Column::BusinessId.eq(business_id))
        .order_by_desc(projects::Column::CreatedAt)
        .all(db)
        .await
}

pub async fn get_projects_by_client(
    db: &DatabaseConnection,
    client_id: Uuid,
) -> Result<Vec<projects::Model>, DbErr> {
    projects::Entity::find()
        .filter(projects::Column::ClientId.eq(client_id))
        .order_by_desc(projects::Column::CreatedAt)
        .all(db)
        .await
}

pub async fn update_project(
    db: &DatabaseConnection,
    project: projects::Model,
    input: UpdateProject,
) -> Result<projects::Model, DbErr> {
    let mut active: projects::ActiveModel = project.into();

    if let Some(title) = input.title {
        active.title = Set(title);
    }
    if let Some(description) = input.description {
        active.description = Set(Some(description));
    }
    if let Some(status) = input.status {
        active.status = Set(status);
    }
    if let Some(estimated_start) = input.estimated_start {
        active.estimated_start = Set(Some(estimated_start));
    }
    if let Some(estimated_end) = input.estimated_end {
        active.estimated_end = Set(Some(estimated_end));
    }
    if let Some(actual_start) = input.actual_start {
        active.actual_start = Set(Some(actual_start));
    }
    if let Some(actual_end) = input.actual_end {
        active.actual_end = Set(Some(actual_end));
    }
    active.updated_at = Set(Some(chrono::Utc::now()));

    active.update(db).await
}
