//! Behavior of `#[repository]` implementations against a recording session.

mod common;

use std::collections::VecDeque;
use std::sync::Arc;

use common::{params, Call, RecordingSession, Tag, User};
use neorepo::{repository, NeoRepository, NeoRepositoryImpl, RepositoryError, Result};
use serde_json::json;

const BY_NAME: &str = "MATCH (u:User {name:$name}) RETURN u";
const BY_EMAIL: &str = "MATCH (u:User {email: $email}) RETURN u";
const ACTIVE: &str = "MATCH (u:User {active: true}) RETURN u";
const PREFIX: &str = "MATCH (u:User) WHERE u.name STARTS WITH $prefix RETURN u";
const PURGE: &str = "MATCH (u:User {id: $id}) DETACH DELETE u";
const TAG_BY_NAME: &str = "MATCH (t:Tag {name: $name}) RETURN t";

#[repository]
pub trait UserRepository: NeoRepository<User, String> {
    #[query("MATCH (u:User {name:$name}) RETURN u")]
    async fn find_by_name(&self, name: String) -> Result<User>;

    #[query("MATCH (u:User {email: $email}) RETURN u")]
    async fn find_by_email(&self, email: &str) -> Result<Option<User>>;

    #[query("MATCH (u:User {active: true}) RETURN u")]
    async fn find_all_active(&self) -> Result<Vec<User>>;

    #[query("MATCH (u:User) WHERE u.name STARTS WITH $prefix RETURN u")]
    async fn with_prefix(&self, #[param("prefix")] start: &str) -> Result<VecDeque<User>>;

    #[query("MATCH (u:User {id: $id}) DETACH DELETE u")]
    async fn purge(&self, id: String) -> Result<()>;

    #[insert]
    async fn register(&self, user: User) -> Result<()>;

    #[update]
    async fn touch(&self, user: User) -> Result<User>;

    #[update]
    async fn touch_in_place(&self, user: &mut User) -> Result<()>;

    fn collection(&self) -> &'static str {
        "users"
    }
}

#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

#[repository]
pub trait TagRepository: NeoRepository<Tag, String> {
    #[query("MATCH (t:Tag {name: $name}) RETURN t")]
    async fn by_name(&self, name: String) -> std::result::Result<Tag, CatalogError>;

    #[insert]
    async fn add(&self, tag: &Tag) -> std::result::Result<(), CatalogError>;

    #[update]
    async fn rename(&self, tag: Tag) -> std::result::Result<Tag, CatalogError>;
}

fn ada() -> User {
    User::new("u1", "ada")
}

fn users(session: RecordingSession) -> (Arc<RecordingSession>, Box<dyn UserRepository>) {
    let session = Arc::new(session);
    let repo = user_repository(Arc::clone(&session));
    (session, repo)
}

#[tokio::test]
async fn test_non_null_query_returns_the_row() {
    let (session, repo) =
        users(RecordingSession::new().with_rows(BY_NAME, vec![json!({"id": "u1", "name": "ada", "email": null, "revision": 0})]));

    let user = repo.find_by_name("ada".to_string()).await.unwrap();

    assert_eq!(user, ada());
    assert_eq!(
        session.calls(),
        vec![Call::QueryForObject {
            text: BY_NAME.to_string(),
            params: params(&[("name", json!("ada"))]),
        }]
    );
}

#[tokio::test]
async fn test_non_null_query_without_rows_is_not_found() {
    let (_, repo) = users(RecordingSession::new());

    let err = repo.find_by_name("nobody".to_string()).await.unwrap_err();

    assert!(err.is_not_found());
    assert_eq!(err.to_string(), "no result for UserRepository::find_by_name");
}

#[tokio::test]
async fn test_nullable_query_yields_none() {
    let (_, repo) = users(RecordingSession::new());
    assert_eq!(repo.find_by_email("ada@example.com").await.unwrap(), None);
}

#[tokio::test]
async fn test_nullable_query_rejects_many_rows() {
    let row = json!({"id": "u1", "name": "ada", "email": "a@x", "revision": 0});
    let (_, repo) = users(RecordingSession::new().with_rows(BY_EMAIL, vec![row.clone(), row]));

    let err = repo.find_by_email("a@x").await.unwrap_err();
    assert!(matches!(err, RepositoryError::TooManyRows { count: 2, .. }));
}

#[tokio::test]
async fn test_collection_query_with_no_rows_is_empty() {
    let (session, repo) = users(RecordingSession::new());

    let active = repo.find_all_active().await.unwrap();

    assert!(active.is_empty());
    assert_eq!(
        session.calls(),
        vec![Call::Query {
            text: ACTIVE.to_string(),
            params: params(&[]),
        }]
    );
}

#[tokio::test]
async fn test_collection_query_keeps_row_order() {
    let rows = vec![
        json!({"id": "u1", "name": "ada", "email": null, "revision": 0}),
        json!({"id": "u2", "name": "alan", "email": null, "revision": 3}),
    ];
    let (session, repo) = users(RecordingSession::new().with_rows(PREFIX, rows));

    let found = repo.with_prefix("a").await.unwrap();

    let names: Vec<&str> = found.iter().map(|u| u.name.as_str()).collect();
    assert_eq!(names, vec!["ada", "alan"]);
    assert_eq!(
        session.calls(),
        vec![Call::Query {
            text: PREFIX.to_string(),
            params: params(&[("prefix", json!("a"))]),
        }]
    );
}

#[tokio::test]
async fn test_void_query_runs_and_discards() {
    let (session, repo) = users(RecordingSession::new().with_rows(PURGE, vec![json!(1)]));

    repo.purge("u1".to_string()).await.unwrap();

    assert_eq!(
        session.calls(),
        vec![Call::Query {
            text: PURGE.to_string(),
            params: params(&[("id", json!("u1"))]),
        }]
    );
}

#[tokio::test]
async fn test_insert_saves_exactly_once() {
    let (session, repo) = users(RecordingSession::new());

    repo.register(ada()).await.unwrap();

    assert_eq!(
        session.calls(),
        vec![Call::Save {
            label: "User",
            entity: json!({"id": "u1", "name": "ada", "email": null, "revision": 0}),
        }]
    );
}

#[tokio::test]
async fn test_update_runs_hook_once_then_saves() {
    let (session, repo) = users(RecordingSession::new());

    let touched = repo.touch(ada()).await.unwrap();

    assert_eq!(touched.revision, 1);
    assert_eq!(session.saved(), vec![json!({"id": "u1", "name": "ada", "email": null, "revision": 1})]);
}

#[tokio::test]
async fn test_update_through_mut_reference() {
    let (session, repo) = users(RecordingSession::new());
    let mut user = ada();

    repo.touch_in_place(&mut user).await.unwrap();
    repo.touch_in_place(&mut user).await.unwrap();

    assert_eq!(user.revision, 2);
    assert_eq!(session.saved().len(), 2);
    assert_eq!(session.saved()[1]["revision"], json!(2));
}

#[tokio::test]
async fn test_session_failures_reach_the_caller() {
    let (session, repo) = users(RecordingSession::new());
    session.fail();

    let err = repo.register(ada()).await.unwrap_err();
    assert!(matches!(err, RepositoryError::Internal(_)));

    let err = repo.find_all_active().await.unwrap_err();
    assert!(matches!(err, RepositoryError::Internal(_)));
}

#[tokio::test]
async fn test_base_capability_is_delegated() {
    let (session, repo) = users(RecordingSession::new());

    let created = repo.create(ada()).await.unwrap();
    assert_eq!(created, ada());

    let found = repo.find_by_id("u1".to_string()).await.unwrap();
    assert_eq!(found, Some(ada()));

    let updated = repo.update(ada()).await.unwrap();
    assert_eq!(updated.revision, 1);

    repo.delete_by_id("u1".to_string()).await.unwrap();
    assert_eq!(repo.find_by_id("u1".to_string()).await.unwrap(), None);

    let labels: Vec<&str> = session
        .calls()
        .iter()
        .map(|call| match call {
            Call::Save { .. } => "save",
            Call::Delete { .. } => "delete",
            Call::Load { .. } => "load",
            Call::Query { .. } | Call::QueryForObject { .. } => "query",
        })
        .collect();
    assert_eq!(labels, vec!["save", "load", "save", "load", "delete", "load"]);
}

#[tokio::test]
async fn test_base_repository_hook_is_chosen_at_construction() {
    let session = Arc::new(RecordingSession::new());

    let plain: NeoRepositoryImpl<User, String, _> = NeoRepositoryImpl::new(Arc::clone(&session));
    assert_eq!(plain.update(ada()).await.unwrap().revision, 0);

    let hooked: NeoRepositoryImpl<User, String, _> =
        NeoRepositoryImpl::updatable(Arc::clone(&session));
    assert_eq!(hooked.update(ada()).await.unwrap().revision, 1);
}

#[tokio::test]
async fn test_delete_by_missing_id_does_nothing() {
    let (session, repo) = users(RecordingSession::new());

    repo.delete_by_id("ghost".to_string()).await.unwrap();

    assert_eq!(
        session.calls(),
        vec![Call::Load {
            label: "User",
            id: json!("ghost"),
        }]
    );
}

#[tokio::test]
async fn test_default_methods_are_left_alone() {
    let (session, repo) = users(RecordingSession::new());
    assert_eq!(repo.collection(), "users");
    assert!(session.calls().is_empty());
}

#[tokio::test]
async fn test_custom_error_type() {
    let session = Arc::new(RecordingSession::new());
    let repo = tag_repository(Arc::clone(&session));

    let err = repo.by_name("rust".to_string()).await.unwrap_err();
    assert!(matches!(err, CatalogError::Repository(RepositoryError::NotFound(_))));

    let tag = Tag {
        id: "t1".to_string(),
        name: "rust".to_string(),
    };
    repo.add(&tag).await.unwrap();
    let renamed = repo.rename(tag.clone()).await.unwrap();

    assert_eq!(renamed, tag);
    assert_eq!(session.saved(), vec![json!({"id": "t1", "name": "rust"}); 2]);
    assert_eq!(
        session.calls()[0],
        Call::QueryForObject {
            text: TAG_BY_NAME.to_string(),
            params: params(&[("name", json!("rust"))]),
        }
    );
}
