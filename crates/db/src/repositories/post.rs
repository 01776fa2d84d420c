//! Post repository for database operations.
//!
//! Implements post CRUD operations using SeaORM.

use chrono::Utc;
use sea_orm::{ActiveModelTrait, DatabaseConnection, EntityTrait, QueryOrder, Set};

use crate::entities::posts;
use quill_core::post::{CreatePostInput, Post, PostError, PostRepository as PostRepoTrait};
use quill_shared::types::PostId;

/// Post repository implementation.
#[derive(Debug)]
pub struct PostRepository {
    db: DatabaseConnection,
}

impl PostRepository {
    /// Create a new post repository.
    #[must_use]
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

impl PostRepoTrait for PostRepository {
    async fn create(&self, input: CreatePostInput) -> Result<Post, PostError> {
        let active_model = posts::ActiveModel {
            id: Set(PostId::new().into_inner()),
            title: Set(input.title),
            content: Set(input.content),
            image_key: Set(input.image_key),
            created_at: Set(Utc::now().into()),
        };

        let model = active_model
            .insert(&self.db)
            .await
            .map_err(|e| PostError::repository(e.to_string()))?;

        Ok(to_domain(model))
    }

    async fn list_all(&self) -> Result<Vec<Post>, PostError> {
        let models = posts::Entity::find()
            .order_by_asc(posts::Column::CreatedAt)
            .order_by_asc(posts::Column::Id)
            .all(&self.db)
            .await
            .map_err(|e| PostError::repository(e.to_string()))?;

        Ok(models.into_iter().map(to_domain).collect())
    }

    async fn find_by_id(&self, id: PostId) -> Result<Option<Post>, PostError> {
        let model = posts::Entity::find_by_id(id.into_inner())
            .one(&self.db)
            .await
            .map_err(|e| PostError::repository(e.to_string()))?;

        Ok(model.map(to_domain))
    }

    async fn delete_by_id(&self, id: PostId) -> Result<bool, PostError> {
        let result = posts::Entity::delete_by_id(id.into_inner())
            .exec(&self.db)
            .await
            .map_err(|e| PostError::repository(e.to_string()))?;

        Ok(result.rows_affected > 0)
    }
}

/// Convert database model to domain model.
fn to_domain(model: posts::Model) -> Post {
    Post {
        id: PostId::from_uuid(model.id),
        title: model.title,
        content: model.content,
        image_key: model.image_key,
        created_at: model.created_at.with_timezone(&Utc),
    }
}
