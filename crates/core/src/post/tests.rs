//! Lifecycle tests against in-memory fakes and a local-fs store.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use bytes::Bytes;
use chrono::Utc;
use quill_shared::{AppError, types::PostId};

use super::*;
use crate::storage::{
    ObjectStore, PresignedUrl, StorageConfig, StorageError, StorageProvider, StorageService,
    expires_in,
};

/// Mock repository keeping posts in insertion order.
#[derive(Default)]
struct MockPostRepository {
    posts: Mutex<Vec<Post>>,
    fail_create: AtomicBool,
    fail_list: AtomicBool,
    fail_delete: AtomicBool,
}

impl MockPostRepository {
    fn len(&self) -> usize {
        self.posts.lock().unwrap().len()
    }

    fn seed(&self, image_key: &str) -> Post {
        let post = Post {
            id: PostId::new(),
            title: Some(format!("title for {image_key}")),
            content: None,
            image_key: image_key.to_string(),
            created_at: Utc::now(),
        };
        self.posts.lock().unwrap().push(post.clone());
        post
    }
}

impl PostRepository for MockPostRepository {
    async fn create(&self, input: CreatePostInput) -> Result<Post, PostError> {
        if self.fail_create.load(Ordering::SeqCst) {
            return Err(PostError::repository("insert failed"));
        }
        let post = Post {
            id: PostId::new(),
            title: input.title,
            content: input.content,
            image_key: input.image_key,
            created_at: Utc::now(),
        };
        self.posts.lock().unwrap().push(post.clone());
        Ok(post)
    }

    async fn list_all(&self) -> Result<Vec<Post>, PostError> {
        if self.fail_list.load(Ordering::SeqCst) {
            return Err(PostError::repository("select failed"));
        }
        Ok(self.posts.lock().unwrap().clone())
    }

    async fn find_by_id(&self, id: PostId) -> Result<Option<Post>, PostError> {
        Ok(self
            .posts
            .lock()
            .unwrap()
            .iter()
            .find(|p| p.id == id)
            .cloned())
    }

    async fn delete_by_id(&self, id: PostId) -> Result<bool, PostError> {
        if self.fail_delete.load(Ordering::SeqCst) {
            return Err(PostError::repository("delete failed"));
        }
        let mut posts = self.posts.lock().unwrap();
        let before = posts.len();
        posts.retain(|p| p.id != id);
        Ok(posts.len() < before)
    }
}

/// Fake object store with per-operation failure switches.
#[derive(Default)]
struct FakeObjectStore {
    objects: Mutex<HashMap<String, Bytes>>,
    unsignable: Mutex<HashSet<String>>,
    sign_delays: Mutex<HashMap<String, Duration>>,
    fail_put: AtomicBool,
    fail_delete: AtomicBool,
}

impl FakeObjectStore {
    fn insert(&self, key: &str, bytes: &'static [u8]) {
        self.objects
            .lock()
            .unwrap()
            .insert(key.to_string(), Bytes::from_static(bytes));
    }

    fn contains(&self, key: &str) -> bool {
        self.objects.lock().unwrap().contains_key(key)
    }

    fn len(&self) -> usize {
        self.objects.lock().unwrap().len()
    }

    fn make_unsignable(&self, key: &str) {
        self.unsignable.lock().unwrap().insert(key.to_string());
    }
}

impl ObjectStore for FakeObjectStore {
    async fn put(
        &self,
        key: &str,
        payload: Bytes,
        _content_type: Option<&str>,
    ) -> Result<(), StorageError> {
        if self.fail_put.load(Ordering::SeqCst) {
            return Err(StorageError::operation("bucket unreachable"));
        }
        self.objects
            .lock()
            .unwrap()
            .insert(key.to_string(), payload);
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Bytes, StorageError> {
        self.objects
            .lock()
            .unwrap()
            .get(key)
            .cloned()
            .ok_or_else(|| StorageError::not_found(key))
    }

    async fn sign_get(&self, key: &str, ttl: Duration) -> Result<PresignedUrl, StorageError> {
        let delay = self.sign_delays.lock().unwrap().get(key).copied();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        if self.unsignable.lock().unwrap().contains(key) {
            return Err(StorageError::operation("signing failed"));
        }
        Ok(PresignedUrl {
            url: format!("https://images.test/{key}?expires={}", ttl.as_secs()),
            method: "GET".to_string(),
            expires_at: expires_in(ttl),
        })
    }

    async fn delete(&self, key: &str) -> Result<(), StorageError> {
        if self.fail_delete.load(Ordering::SeqCst) {
            return Err(StorageError::operation("bucket unreachable"));
        }
        match self.objects.lock().unwrap().remove(key) {
            Some(_) => Ok(()),
            None => Err(StorageError::not_found(key)),
        }
    }
}

type TestService = PostService<MockPostRepository, FakeObjectStore>;

fn setup() -> (TestService, Arc<MockPostRepository>, Arc<FakeObjectStore>) {
    let repo = Arc::new(MockPostRepository::default());
    let store = Arc::new(FakeObjectStore::default());
    let service = PostService::new(repo.clone(), store.clone());
    (service, repo, store)
}

fn compose_input(
    title: &str,
    content: &str,
    file_name: &str,
    bytes: &'static [u8],
) -> ComposePostInput {
    ComposePostInput {
        title: Some(title.to_string()),
        content: Some(content.to_string()),
        image: Some(ImageUpload {
            field_name: "image".to_string(),
            file_name: file_name.to_string(),
            content_type: Some("image/png".to_string()),
            bytes: Bytes::from_static(bytes),
        }),
    }
}

// ============================================================================
// Compose
// ============================================================================

#[tokio::test]
async fn test_compose_requires_image() {
    let (service, repo, store) = setup();

    let input = ComposePostInput {
        title: Some("Hello".to_string()),
        content: Some("World".to_string()),
        image: None,
    };

    let result = service.compose(input).await;
    assert!(matches!(result, Err(PostError::MissingImage)));
    assert_eq!(repo.len(), 0);
    assert_eq!(store.len(), 0);
}

#[tokio::test]
async fn test_compose_stores_image_then_record() {
    let (service, repo, store) = setup();

    let post = service
        .compose(compose_input("Hello", "World", "cat.png", b"0123456789"))
        .await
        .expect("compose should succeed");

    assert!(!post.image_key.is_empty());
    assert!(post.image_key.starts_with("Images/image_"));
    assert!(post.image_key.ends_with(".png"));
    assert_eq!(post.title.as_deref(), Some("Hello"));
    assert_eq!(post.content.as_deref(), Some("World"));
    assert_eq!(repo.len(), 1);

    let stored = store.get(&post.image_key).await.expect("image stored");
    assert_eq!(stored.as_ref(), b"0123456789");
}

#[tokio::test]
async fn test_compose_oversized_image_is_client_error() {
    let root = std::env::temp_dir().join(format!("quill-compose-{}", uuid::Uuid::new_v4()));
    std::fs::create_dir_all(&root).expect("create temp root");
    let storage = StorageService::from_config(
        StorageConfig::new(StorageProvider::local_fs(&root)).with_max_file_size(4),
    )
    .expect("should create storage");
    let repo = Arc::new(MockPostRepository::default());
    let service = PostService::new(repo.clone(), Arc::new(storage));

    let err = service
        .compose(compose_input("Hello", "World", "big.png", b"0123456789"))
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        PostError::Storage(StorageError::FileTooLarge { size: 10, max: 4 })
    ));
    assert_eq!(repo.len(), 0);
    assert_eq!(AppError::from(err).status_code(), 400);

    let _ = std::fs::remove_dir_all(root);
}

#[tokio::test]
async fn test_compose_upload_failure_creates_no_record() {
    let (service, repo, store) = setup();
    store.fail_put.store(true, Ordering::SeqCst);

    let result = service
        .compose(compose_input("Hello", "World", "cat.png", b"0123456789"))
        .await;

    assert!(matches!(result, Err(PostError::Storage(_))));
    assert_eq!(repo.len(), 0);
}

#[tokio::test]
async fn test_compose_record_failure_leaves_orphaned_image() {
    let (service, repo, store) = setup();
    repo.fail_create.store(true, Ordering::SeqCst);

    let result = service
        .compose(compose_input("Hello", "World", "cat.png", b"0123456789"))
        .await;

    assert!(matches!(result, Err(PostError::Repository(_))));
    assert_eq!(repo.len(), 0);
    // Not reconciled automatically.
    assert_eq!(store.len(), 1);
}

#[tokio::test]
async fn test_compose_allows_missing_title_and_content() {
    let (service, _repo, _store) = setup();

    let mut input = compose_input("", "", "a.gif", b"GIF89a");
    input.title = None;
    input.content = None;

    let post = service.compose(input).await.expect("compose should succeed");
    assert!(post.title.is_none());
    assert!(post.content.is_none());
    assert!(post.image_key.ends_with(".gif"));
}

// ============================================================================
// List
// ============================================================================

#[tokio::test]
async fn test_list_empty() {
    let (service, _repo, _store) = setup();
    assert!(service.list().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_list_tolerates_single_signing_failure() {
    let (service, repo, store) = setup();
    let a = repo.seed("Images/a.png");
    let b = repo.seed("Images/b.png");
    let c = repo.seed("Images/c.png");
    store.make_unsignable(&b.image_key);

    let items = service.list().await.expect("list should not fail");

    assert_eq!(items.len(), 3);
    assert_eq!(items.iter().filter(|i| i.image.is_none()).count(), 1);
    assert_eq!(items[0].post.id, a.id);
    assert_eq!(items[1].post.id, b.id);
    assert_eq!(items[2].post.id, c.id);
    assert!(items[1].image.is_none());
    assert!(items[0].image.is_some());
    assert!(items[2].image.is_some());
}

#[tokio::test]
async fn test_list_preserves_repository_order_when_signing_completes_out_of_order() {
    let (service, repo, store) = setup();
    let keys = ["Images/1.png", "Images/2.png", "Images/3.png", "Images/4.png"];
    let ids: Vec<PostId> = keys.iter().map(|k| repo.seed(k).id).collect();
    {
        let mut delays = store.sign_delays.lock().unwrap();
        // First post signs slowest, last signs fastest.
        for (i, key) in keys.iter().enumerate() {
            delays.insert((*key).to_string(), Duration::from_millis(40 - 10 * i as u64));
        }
    }

    let items = service.list().await.unwrap();

    let listed: Vec<PostId> = items.iter().map(|i| i.post.id).collect();
    assert_eq!(listed, ids);
    for (item, key) in items.iter().zip(keys) {
        let url = &item.image.as_ref().expect("signed").url;
        assert!(url.contains(key));
    }
}

#[tokio::test]
async fn test_list_repository_failure_fails_request() {
    let (service, repo, _store) = setup();
    repo.seed("Images/a.png");
    repo.fail_list.store(true, Ordering::SeqCst);

    let result = service.list().await;
    assert!(matches!(result, Err(PostError::Repository(_))));
}

#[tokio::test]
async fn test_list_signs_with_configured_ttl() {
    let (service, repo, _store) = setup();
    repo.seed("Images/a.png");

    let items = service.list().await.unwrap();
    let image = items[0].image.as_ref().expect("signed");
    assert!(image.url.ends_with("expires=3600"));

    let remaining = image.expires_at - Utc::now();
    assert!(remaining <= chrono::Duration::seconds(3600));
    assert!(remaining > chrono::Duration::seconds(3590));
}

// ============================================================================
// Detail
// ============================================================================

#[tokio::test]
async fn test_get_returns_signed_url() {
    let (service, repo, _store) = setup();
    let post = repo.seed("Images/a.png");

    let item = service.get(post.id).await.expect("get should succeed");
    assert_eq!(item.post, post);
    assert_eq!(item.image.expect("signed").method, "GET");
}

#[tokio::test]
async fn test_get_not_found() {
    let (service, _repo, _store) = setup();

    let result = service.get(PostId::new()).await;
    assert!(matches!(result, Err(PostError::NotFound(_))));
}

#[tokio::test]
async fn test_get_signing_failure_fails_request() {
    let (service, repo, store) = setup();
    let post = repo.seed("Images/a.png");
    store.make_unsignable(&post.image_key);

    let result = service.get(post.id).await;
    assert!(matches!(result, Err(PostError::Storage(_))));
}

#[tokio::test]
async fn test_custom_url_ttl() {
    let (service, repo, _store) = setup();
    let service = service.with_url_ttl(Duration::from_secs(60));
    let post = repo.seed("Images/a.png");

    assert_eq!(service.url_ttl(), Duration::from_secs(60));
    let item = service.get(post.id).await.unwrap();
    assert!(item.image.unwrap().url.ends_with("expires=60"));
}

// ============================================================================
// Delete
// ============================================================================

#[tokio::test]
async fn test_delete_removes_image_and_record() {
    let (service, repo, store) = setup();
    let post = repo.seed("Images/a.png");
    store.insert(&post.image_key, b"png");

    service.delete(post.id).await.expect("delete should succeed");

    assert!(!store.contains(&post.image_key));
    assert!(matches!(
        service.get(post.id).await,
        Err(PostError::NotFound(_))
    ));
}

#[tokio::test]
async fn test_delete_not_found() {
    let (service, _repo, _store) = setup();

    let result = service.delete(PostId::new()).await;
    assert!(matches!(result, Err(PostError::NotFound(_))));
}

#[tokio::test]
async fn test_delete_store_failure_keeps_record() {
    let (service, repo, store) = setup();
    let post = repo.seed("Images/a.png");
    store.insert(&post.image_key, b"png");
    store.fail_delete.store(true, Ordering::SeqCst);

    let result = service.delete(post.id).await;
    assert!(matches!(result, Err(PostError::Storage(_))));

    let found = repo.find_by_id(post.id).await.unwrap();
    assert_eq!(found, Some(post.clone()));
    assert!(service.get(post.id).await.is_ok());
}

#[tokio::test]
async fn test_delete_tolerates_already_missing_image() {
    let (service, repo, store) = setup();
    let post = repo.seed("Images/gone.png");
    assert!(!store.contains(&post.image_key));

    service
        .delete(post.id)
        .await
        .expect("missing image must not block deletion");
    assert_eq!(repo.len(), 0);
}

#[tokio::test]
async fn test_delete_record_failure_after_image_removed() {
    let (service, repo, store) = setup();
    let post = repo.seed("Images/a.png");
    store.insert(&post.image_key, b"png");
    repo.fail_delete.store(true, Ordering::SeqCst);

    let result = service.delete(post.id).await;

    assert!(matches!(result, Err(PostError::Repository(_))));
    // Reverse orphan: record survives, object is gone.
    assert!(!store.contains(&post.image_key));
    assert_eq!(repo.len(), 1);
}

// ============================================================================
// End to end
// ============================================================================

#[tokio::test]
async fn test_compose_list_roundtrip() {
    let (service, _repo, store) = setup();

    let created = service
        .compose(compose_input("T", "C", "photo.jpeg", b"\xff\xd8\xff\xe0bytes"))
        .await
        .unwrap();

    let items = service.list().await.unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].post.title.as_deref(), Some("T"));
    assert_eq!(items[0].post.content.as_deref(), Some("C"));
    assert!(items[0].image.is_some());

    let stored = store.get(&created.image_key).await.unwrap();
    assert_eq!(stored.as_ref(), b"\xff\xd8\xff\xe0bytes");
}

#[tokio::test]
async fn test_full_lifecycle_scenario() {
    let (service, _repo, _store) = setup();

    let post = service
        .compose(compose_input("Hello", "World", "hello.png", b"0123456789"))
        .await
        .unwrap();
    assert!(!post.image_key.is_empty());

    let items = service.list().await.unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].post.title.as_deref(), Some("Hello"));
    assert!(items[0].image.is_some());

    service.delete(post.id).await.unwrap();

    assert!(service.list().await.unwrap().is_empty());
    assert!(matches!(
        service.get(post.id).await,
        Err(PostError::NotFound(_))
    ));
}
