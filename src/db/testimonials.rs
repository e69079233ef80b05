use sea_orm::*;
use uuid::Uuid;

use crate::models::testimonials::{self, CreateTestimonial, UpdateTestimonial};

pub async fn insert_testimonial(
    db: &DatabaseConnection,
    client_id: Uuid,
    input: CreateTestimonial,
) -> Result<testimonials::Model, DbErr> {
    let new_testimonial = testimonials::ActiveModel {
        id: Set(Uuid::new_v4()),
        client_id: Set(client_id),
        business_id: Set(input.business_id),
        project_id: Set(input.project_id),
        content: Set(input.content),
        rating: Set(input.rating),
        is_highlighted: Set(false),
        created_at: Set(chrono::Utc::now()),
        updated_at: Set(None),
    };

    new_testimonial.insert(db).await
}

pub async fn get_testimonial_by_id(
    db: &DatabaseConnection,
    id: Uuid,
) -> Result<Option<testimonials::Model>, DbErr> {
    testimonials::Entity::find_by_id(id).one(db).await
}

/// Testimonials about a business, highlighted ones first, then newest.
pub async fn get_testimonials_by_business(
    db: &DatabaseConnection,
    business_id: Uuid,
    highlighted: Option<bool>,
) -> Result<Vec<testimonials::Model>, DbErr> {
    let mut query = testimonials::Entity::find()
        .filter(testimonials::Column::BusinessId.eq(business_id));

    if let Some(highlighted) = highlighted {
        query = query.filter(testimonials::Column::IsHighlighted.eq(highlighted));
    }

    query
        .order_by_desc(testimonials::Column::IsHighlighted)
        .order_by_desc(testimonials::Column::CreatedAt)
        .all(db)
        .await
}

pub async fn update_testimonial(
    db: &DatabaseConnection,
    testimonial: testimonials::Model,
    input: UpdateTestimonial,
) -> Result<testimonials::Model, DbErr> {
    let mut active: testimonials::ActiveModel = testimonial.into();

    if let Some(content) = input.content {
        active.content = Set(content);
    }
    if let Some(rating) = input.rating {
        active.rating = Set(Some(rating));
    }
    active.updated_at = Set(Some(chrono::Utc::now()));

    active.update(db).await
}

/// Flip the highlight flag.
pub async fn toggle_highlight(
    db: &DatabaseConnection,
    testimonial: testimonials::Model,
) -> Result<testimonials::Model, DbErr> {
    let highlighted = !testimonial.is_highlighted;
    let mut active: testimonials::ActiveModel = testimonial.into();
    active.is_highlighted = Set(highlighted);
    active.updated_at = Set(Some(chrono::Utc::now()));

    active.update(db).await
}
