//! Post routes.
//!
//! - `GET /` lists posts with signed image URLs
//! - `POST /compose` uploads an image and creates a post
//! - `GET /posts/{post_id}` returns one post with a signed image URL
//! - `DELETE /posts/{post_id}` removes the image and the post

use axum::{
    Json, Router,
    extract::{Multipart, Path, State, multipart::MultipartError},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use serde::Serialize;

use crate::{AppState, error::ApiError};
use quill_core::{
    post::{ComposePostInput, ImageUpload, Post, PostRepository, PostWithImage},
    storage::{ObjectStore, PresignedUrl},
};
use quill_shared::{AppError, types::PostId};

/// Form field carrying the post title.
pub const TITLE_FIELD: &str = "postTitle";
/// Form field carrying the post body.
pub const CONTENT_FIELD: &str = "postContent";

/// Creates the post routes.
pub fn routes<R, S>() -> Router<AppState<R, S>>
where
    R: PostRepository + 'static,
    S: ObjectStore + 'static,
{
    Router::new()
        .route("/", get(list_posts::<R, S>))
        .route("/compose", post(compose_post::<R, S>))
        .route(
            "/posts/{post_id}",
            get(get_post::<R, S>).delete(delete_post::<R, S>),
        )
}

// ============================================================================
// Response Types
// ============================================================================

/// Response for a post.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PostResponse {
    /// Post ID.
    pub id: PostId,
    /// Post title.
    pub title: Option<String>,
    /// Post body.
    pub content: Option<String>,
    /// Created at timestamp (ISO 8601).
    pub created_at: String,
    /// Signed image URL, null when none could be produced.
    pub image_url: Option<String>,
    /// Signed image URL expiration (ISO 8601).
    pub image_url_expires_at: Option<String>,
}

impl PostResponse {
    fn new(post: Post, image: Option<PresignedUrl>) -> Self {
        let (image_url, image_url_expires_at) = match image {
            Some(signed) => (Some(signed.url), Some(signed.expires_at.to_rfc3339())),
            None => (None, None),
        };

        Self {
            id: post.id,
            title: post.title,
            content: post.content,
            created_at: post.created_at.to_rfc3339(),
            image_url,
            image_url_expires_at,
        }
    }
}

impl From<PostWithImage> for PostResponse {
    fn from(item: PostWithImage) -> Self {
        Self::new(item.post, item.image)
    }
}

// ============================================================================
// Helper Functions
// ============================================================================

/// Parse a path id. An id that cannot exist is reported as not found.
fn parse_post_id(raw: &str) -> Result<PostId, ApiError> {
    raw.parse()
        .map_err(|_| ApiError(AppError::NotFound(format!("post {raw}"))))
}

fn bad_form(err: &MultipartError) -> ApiError {
    ApiError(AppError::Validation(err.body_text()))
}

/// Read the compose form: the first file part is the image, `postTitle` and
/// `postContent` are text. Other text fields are ignored.
async fn read_compose_form(multipart: &mut Multipart) -> Result<ComposePostInput, ApiError> {
    let mut input = ComposePostInput::default();

    while let Some(field) = multipart.next_field().await.map_err(|e| bad_form(&e))? {
        let name = field.name().unwrap_or_default().to_string();

        if let Some(file_name) = field.file_name().map(str::to_string) {
            let content_type = field.content_type().map(str::to_string);
            let bytes = field.bytes().await.map_err(|e| bad_form(&e))?;

            // Browsers submit an empty unnamed part for an untouched file input.
            if file_name.is_empty() && bytes.is_empty() {
                continue;
            }
            if input.image.is_some() {
                return Err(ApiError(AppError::Validation(
                    "only one image file is accepted".to_string(),
                )));
            }

            input.image = Some(ImageUpload {
                field_name: name,
                file_name,
                content_type,
                bytes,
            });
            continue;
        }

        match name.as_str() {
            TITLE_FIELD => input.title = Some(field.text().await.map_err(|e| bad_form(&e))?),
            CONTENT_FIELD => input.content = Some(field.text().await.map_err(|e| bad_form(&e))?),
            _ => {}
        }
    }

    Ok(input)
}

// ============================================================================
// Route Handlers
// ============================================================================

/// GET `/`
/// List all posts with signed image URLs.
async fn list_posts<R, S>(
    State(state): State<AppState<R, S>>,
) -> Result<Json<Vec<PostResponse>>, ApiError>
where
    R: PostRepository + 'static,
    S: ObjectStore + 'static,
{
    let items = state.posts.list().await?;
    Ok(Json(items.into_iter().map(PostResponse::from).collect()))
}

/// POST `/compose`
/// Upload the image and create the post.
async fn compose_post<R, S>(
    State(state): State<AppState<R, S>>,
    mut multipart: Multipart,
) -> Result<impl IntoResponse, ApiError>
where
    R: PostRepository + 'static,
    S: ObjectStore + 'static,
{
    let input = read_compose_form(&mut multipart).await?;
    let post = state.posts.compose(input).await?;

    Ok((StatusCode::CREATED, Json(PostResponse::new(post, None))))
}

/// GET `/posts/{post_id}`
/// Get a post with a signed image URL.
async fn get_post<R, S>(
    State(state): State<AppState<R, S>>,
    Path(post_id): Path<String>,
) -> Result<Json<PostResponse>, ApiError>
where
    R: PostRepository + 'static,
    S: ObjectStore + 'static,
{
    let post_id = parse_post_id(&post_id)?;
    let item = state.posts.get(post_id).await?;
    Ok(Json(item.into()))
}

/// DELETE `/posts/{post_id}`
/// Delete the image, then the post.
async fn delete_post<R, S>(
    State(state): State<AppState<R, S>>,
    Path(post_id): Path<String>,
) -> Result<impl IntoResponse, ApiError>
where
    R: PostRepository + 'static,
    S: ObjectStore + 'static,
{
    let post_id = parse_post_id(&post_id)?;

    state.posts.delete(post_id).await?;
    Ok((StatusCode::OK, "Post deleted"))
}
