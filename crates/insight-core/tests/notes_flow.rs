//! Note and auth flows through the client façade and the composer.

use std::sync::Arc;

use insight_core::api::{NoteUpdate, SignupRequest};
use insight_core::composer::ComposerFields;
use insight_core::http::{NoticeLevel, RecordingNotifier};
use insight_core::storage::{
    KeyValueStore, MemoryStore, AUTHENTICATED_KEY, TOKEN_KEY, USER_DETAILS_KEY,
    VISITED_HOME_KEY,
};
use insight_core::store::{NotesEvent, NotesPhase};
use insight_core::voice::UnsupportedRecognizer;
use insight_core::{ClientConfig, Composer, Error, InsightClient, NoteId};
use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn signed_in_storage() -> MemoryStore {
    let storage = MemoryStore::new();
    storage
        .set(USER_DETAILS_KEY, r#"{"userId":"u1","userName":"ada"}"#)
        .unwrap();
    storage.set(TOKEN_KEY, "tok-1").unwrap();
    storage.set(AUTHENTICATED_KEY, "true").unwrap();
    storage
}

fn client_for(server: &MockServer, storage: MemoryStore) -> (Arc<InsightClient>, Arc<RecordingNotifier>) {
    let notifier = Arc::new(RecordingNotifier::new());
    let client = InsightClient::new(
        &ClientConfig::new(server.uri()).unwrap(),
        Arc::new(storage),
        notifier.clone(),
    )
    .unwrap();
    (Arc::new(client), notifier)
}

fn note_json(id: &str, title: &str, content: &str, created_at: &str) -> Value {
    json!({
        "_id": id,
        "title": title,
        "content": content,
        "userId": "u1",
        "isFavourite": false,
        "createdAt": created_at,
        "updatedAt": created_at,
        "__v": 0
    })
}

async fn mount_list(server: &MockServer, notes: Vec<Value>) {
    Mock::given(method("GET"))
        .and(path("/api/v1/notes/u/u1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "notes": notes })))
        .mount(server)
        .await;
}

#[tokio::test]
async fn composer_creates_note_and_clears_fields() {
    let server = MockServer::start().await;
    mount_list(
        &server,
        vec![note_json("n0", "Older", "older", "2024-01-01T00:00:00Z")],
    )
    .await;
    Mock::given(method("POST"))
        .and(path("/api/v1/notes/create"))
        .and(body_json(json!({ "content": "Buy milk" })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "note": note_json("n1", "Groceries", "Buy milk", "2024-03-01T00:00:00Z"),
            "message": "Note created successfully"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let (client, notifier) = client_for(&server, signed_in_storage());
    client.fetch_notes().await.unwrap();
    client.apply(NotesEvent::Search("older".to_string()));

    let composer = Composer::new(Arc::clone(&client), Arc::new(UnsupportedRecognizer));
    composer.set_content("  Buy milk ");
    composer.set_url("");

    let note = composer.save().await.unwrap();

    assert_eq!(note.title, "Groceries");
    let state = client.notes();
    assert_eq!(state.phase(), NotesPhase::Ready);
    assert_eq!(state.notes.last().map(|note| note.content.as_str()), Some("Buy milk"));
    assert!(!state.search.is_active());
    assert_eq!(composer.fields(), ComposerFields::default());
    assert_eq!(
        notifier.messages(NoticeLevel::Success),
        vec!["Note created successfully"]
    );
}

#[tokio::test]
async fn composer_rejects_empty_and_invalid_input_locally() {
    let server = MockServer::start().await;
    let (client, notifier) = client_for(&server, signed_in_storage());
    let composer = Composer::new(Arc::clone(&client), Arc::new(UnsupportedRecognizer));

    assert!(matches!(composer.save().await, Err(Error::Validation(_))));
    assert_eq!(
        notifier.messages(NoticeLevel::Warning),
        vec!["Please add some content before saving"]
    );

    composer.set_content("Read later");
    composer.set_url("example.com");
    assert_eq!(
        composer.fields().url_error.as_deref(),
        Some("Please enter a valid URL starting with http:// or https://")
    );
    assert!(matches!(composer.save().await, Err(Error::Validation(_))));

    assert!(server.received_requests().await.unwrap().is_empty());
    assert_eq!(client.notes().phase(), NotesPhase::Idle);
}

#[tokio::test]
async fn update_replaces_note_and_closes_editor() {
    let server = MockServer::start().await;
    mount_list(
        &server,
        vec![note_json("n1", "Old", "old", "2024-01-01T00:00:00Z")],
    )
    .await;
    Mock::given(method("PUT"))
        .and(path("/api/v1/notes/update/n1"))
        .and(body_json(json!({
            "noteId": "n1",
            "title": "T",
            "content": "C",
            "link": ""
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "note": note_json("n1", "T", "C", "2024-01-01T00:00:00Z"),
            "message": "Note updated"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let (client, _) = client_for(&server, signed_in_storage());
    client.fetch_notes().await.unwrap();
    client.apply(NotesEvent::OpenEdit(NoteId::new("n1")));
    assert!(client.notes().is_edit_modal_open);

    client
        .update_note(&NoteUpdate {
            id: NoteId::new("n1"),
            title: "T".to_string(),
            content: "C".to_string(),
            link: String::new(),
        })
        .await
        .unwrap();

    let state = client.notes();
    assert_eq!(state.notes.len(), 1);
    assert_eq!(state.notes[0].title, "T");
    assert_eq!(state.notes[0].content, "C");
    assert!(state.selected_note.is_none());
    assert!(!state.is_edit_modal_open);
    assert!(state.processing_message.is_none());
}

#[tokio::test]
async fn favourite_toggle_is_mirrored_locally() {
    let server = MockServer::start().await;
    mount_list(
        &server,
        vec![note_json("n1", "A", "a", "2024-01-01T00:00:00Z")],
    )
    .await;
    Mock::given(method("POST"))
        .and(path("/api/v1/notes/favorite"))
        .and(body_json(json!({ "noteId": "n1", "userId": "u1" })))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "isFavorite": true, "message": "Added to favorites" })),
        )
        .mount(&server)
        .await;

    let (client, _) = client_for(&server, signed_in_storage());
    client.fetch_notes().await.unwrap();
    let toggle = client.toggle_favorite(&NoteId::new("n1")).await.unwrap();

    assert!(toggle.is_favorite);
    assert_eq!(client.notes().favourite_notes().count(), 1);
}

#[tokio::test]
async fn fetch_note_loads_detail_with_default_suggestions() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/notes/n1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "note": note_json("n1", "Rust", "ownership", "2024-01-01T00:00:00Z"),
            "suggestions": {
                "relatedTopics": ["borrowing"],
                "relatedArticles": [{ "title": "Book", "url": "https://doc.rust-lang.org", "analysis": "Intro" }]
            }
        })))
        .mount(&server)
        .await;

    let (client, _) = client_for(&server, signed_in_storage());
    let detail = client.fetch_note(&NoteId::new("n1")).await.unwrap();

    assert_eq!(detail.suggestions.related_articles[0].description, "Intro");
    assert!(detail.suggestions.related_videos.is_empty());
    let state = client.note_detail();
    assert!(!state.is_loading);
    assert_eq!(state.note.map(|note| note.title), Some("Rust".to_string()));
}

#[tokio::test]
async fn signup_never_sends_confirmation() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v1/auth/signup"))
        .and(body_json(json!({
            "userName": "ada",
            "userEmail": "ada@example.com",
            "userPassword": "secret"
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "user": { "userId": "u1", "userName": "ada", "userEmail": "ada@example.com" },
            "accessToken": "tok-new",
            "message": "User created"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let storage = MemoryStore::new();
    let (client, _) = client_for(&server, storage.clone());

    let mismatch = SignupRequest {
        user_name: "ada".to_string(),
        user_email: "ada@example.com".to_string(),
        user_password: "secret".to_string(),
        confirm_password: "other".to_string(),
    };
    assert!(matches!(client.signup(&mismatch).await, Err(Error::Validation(_))));
    assert!(!client.auth().is_loading);

    let user = client
        .signup(&SignupRequest {
            confirm_password: "secret".to_string(),
            ..mismatch
        })
        .await
        .unwrap();

    assert_eq!(user.user_id, "u1");
    assert!(client.auth().is_signed_in());
    assert_eq!(storage.get(TOKEN_KEY).unwrap().as_deref(), Some("tok-new"));
}

#[tokio::test]
async fn logout_clears_session_and_notes() {
    let server = MockServer::start().await;
    mount_list(
        &server,
        vec![note_json("n1", "A", "a", "2024-01-01T00:00:00Z")],
    )
    .await;
    Mock::given(method("POST"))
        .and(path("/api/v1/auth/logout"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "message": "Logged out" })),
        )
        .mount(&server)
        .await;

    let storage = signed_in_storage();
    storage.set(VISITED_HOME_KEY, "true").unwrap();
    let (client, notifier) = client_for(&server, storage.clone());
    client.fetch_notes().await.unwrap();

    client.logout().await.unwrap();

    assert!(storage.is_empty());
    assert!(!client.auth().has_session());
    assert_eq!(client.notes().phase(), NotesPhase::Idle);
    assert!(client.notes().notes.is_empty());
    assert_eq!(notifier.messages(NoticeLevel::Success), vec!["Logged out"]);
}

#[tokio::test]
async fn failed_logout_keeps_the_session() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v1/auth/logout"))
        .respond_with(ResponseTemplate::new(500).set_body_json(json!({ "message": "Server error" })))
        .mount(&server)
        .await;

    let storage = signed_in_storage();
    let (client, _) = client_for(&server, storage.clone());

    assert!(client.logout().await.is_err());
    assert!(client.auth().is_signed_in());
    assert_eq!(storage.get(TOKEN_KEY).unwrap().as_deref(), Some("tok-1"));
}
