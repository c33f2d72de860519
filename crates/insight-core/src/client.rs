//! Client façade.
//!
//! Owns the HTTP adapter, the remote operation groups, and the shared
//! state stores, and runs each remote call through its store lifecycle:
//! a started event, then a success or failure event. Superseded requests
//! are dropped silently and validation problems never reach a store.

use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::api::{
    AuthApi, CreatedNote, DeletedNote, FavoriteToggle, LoginRequest, NewNote, NoteDetail,
    NoteUpdate, NotesApi, SignupRequest, UpdatedNote,
};
use crate::config::ClientConfig;
use crate::error::{Error, Result};
use crate::guard::{guard_route, RouteDecision, RouteKind};
use crate::http::{HttpClient, NoticeLevel, Notifier, RequestTracker, SessionReset};
use crate::models::{NoteId, User};
use crate::storage::KeyValueStore;
use crate::store::{
    reduce_note_detail, reduce_notes, AuthEvent, AuthState, AuthStore, NoteDetailEvent,
    NoteDetailState, NotesEvent, NotesState,
};
use crate::util::require_text;
use crate::voice::{VoiceEvent, VoiceState, VoiceStore};

const SIGNED_OUT_MESSAGE: &str = "Please log in to continue";
const LOGGED_OUT_MESSAGE: &str = "Logged out successfully!";

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

fn apply_notes(notes: &Mutex<NotesState>, event: NotesEvent) {
    let mut state = lock(notes);
    *state = reduce_notes(std::mem::take(&mut *state), event);
}

fn apply_detail(detail: &Mutex<NoteDetailState>, event: NoteDetailEvent) {
    let mut state = lock(detail);
    *state = reduce_note_detail(std::mem::take(&mut *state), event);
}

/// An in-progress notes call. Dropping it before [`NotesCall::complete`]
/// settles the store.
struct NotesCall<'a> {
    notes: &'a Mutex<NotesState>,
    completed: bool,
}

impl NotesCall<'_> {
    fn complete(mut self) {
        self.completed = true;
    }
}

impl Drop for NotesCall<'_> {
    fn drop(&mut self) {
        if !self.completed {
            tracing::debug!("Notes request dropped before completion");
            apply_notes(self.notes, NotesEvent::Abandoned);
        }
    }
}

/// Session-scoped stores, shared with the forced-logout hook.
#[derive(Clone)]
struct Stores {
    notes: Arc<Mutex<NotesState>>,
    detail: Arc<Mutex<NoteDetailState>>,
    auth: Arc<Mutex<AuthStore>>,
    voice: Arc<Mutex<VoiceStore>>,
}

impl Stores {
    fn dispatch_auth(&self, event: AuthEvent) {
        if let Err(error) = lock(&self.auth).dispatch(event) {
            tracing::error!("Failed to persist session: {error}");
        }
    }

    fn dispatch_voice(&self, event: VoiceEvent) {
        if let Err(error) = lock(&self.voice).dispatch(event) {
            tracing::error!("Failed to persist transcripts: {error}");
        }
    }

    fn clear_session_data(&self) {
        apply_notes(&self.notes, NotesEvent::Reset);
        apply_detail(&self.detail, NoteDetailEvent::Clear);
    }
}

impl SessionReset for Stores {
    fn reset_session(&self) {
        self.dispatch_auth(AuthEvent::SessionExpired);
        self.clear_session_data();
    }
}

pub struct InsightClient {
    http: Arc<HttpClient>,
    notes_api: NotesApi,
    auth_api: AuthApi,
    stores: Stores,
    storage: Arc<dyn KeyValueStore>,
    notifier: Arc<dyn Notifier>,
}

impl fmt::Debug for InsightClient {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("InsightClient")
            .field("http", &self.http)
            .finish_non_exhaustive()
    }
}

impl InsightClient {
    /// Build a client, restoring the persisted session and transcripts.
    pub fn new(
        config: &ClientConfig,
        storage: Arc<dyn KeyValueStore>,
        notifier: Arc<dyn Notifier>,
    ) -> Result<Self> {
        let http = Arc::new(HttpClient::new(
            config,
            Arc::clone(&storage),
            Arc::new(RequestTracker::new()),
            Arc::clone(&notifier),
        )?);

        let stores = Stores {
            notes: Arc::new(Mutex::new(NotesState::default())),
            detail: Arc::new(Mutex::new(NoteDetailState::default())),
            auth: Arc::new(Mutex::new(AuthStore::hydrate(Arc::clone(&storage)))),
            voice: Arc::new(Mutex::new(VoiceStore::hydrate(Arc::clone(&storage)))),
        };
        http.on_session_reset(Arc::new(stores.clone()));

        tracing::debug!("Client ready for {}", http.base_url());

        Ok(Self {
            notes_api: NotesApi::new(Arc::clone(&http)),
            auth_api: AuthApi::new(Arc::clone(&http)),
            http,
            stores,
            storage,
            notifier,
        })
    }

    pub fn http(&self) -> &Arc<HttpClient> {
        &self.http
    }

    pub fn notifier(&self) -> &Arc<dyn Notifier> {
        &self.notifier
    }

    /// Wait for a pending forced logout to complete.
    pub async fn settle(&self) {
        self.http.settle().await;
    }

    pub fn notes(&self) -> NotesState {
        lock(&self.stores.notes).clone()
    }

    pub fn note_detail(&self) -> NoteDetailState {
        lock(&self.stores.detail).clone()
    }

    pub fn auth(&self) -> AuthState {
        lock(&self.stores.auth).state().clone()
    }

    pub fn voice(&self) -> VoiceState {
        lock(&self.stores.voice).state().clone()
    }

    pub fn is_recording(&self) -> bool {
        lock(&self.stores.voice).state().is_recording()
    }

    pub(crate) fn dispatch_voice(&self, event: VoiceEvent) {
        self.stores.dispatch_voice(event);
    }

    // Transcripts

    /// Drop one finalized transcript; returns whether it existed.
    pub fn remove_transcript(&self, transcript_id: &str) -> Result<bool> {
        let mut voice = lock(&self.stores.voice);
        let existed = voice
            .state()
            .history
            .iter()
            .any(|record| record.id == transcript_id);
        voice.dispatch(VoiceEvent::RemoveTranscript(transcript_id.to_string()))?;
        Ok(existed)
    }

    pub fn clear_transcripts(&self) -> Result<()> {
        let result = lock(&self.stores.voice).dispatch(VoiceEvent::ClearHistory);
        match &result {
            Ok(()) => self
                .notifier
                .notify(NoticeLevel::Success, "Cleared all saved transcripts"),
            Err(error) => {
                tracing::error!("Failed to clear transcripts: {error}");
                self.notifier
                    .notify(NoticeLevel::Error, "Failed to clear saved transcripts");
            }
        }
        result
    }

    /// Decide whether `route` may be shown right now.
    pub fn guard(&self, route: RouteKind) -> Result<RouteDecision> {
        let auth = self.auth();
        guard_route(&auth, self.storage.as_ref(), route)
    }

    // Notes

    /// Load the signed-in user's notes into the notes store.
    pub async fn fetch_notes(&self) -> Result<()> {
        let user_id = self.require_user_id()?;
        let call = self.begin_notes(NotesEvent::ListStarted);
        let result = self.notes_api.list(&user_id).await;
        call.complete();

        match result {
            Ok(notes) => {
                tracing::info!("Loaded {} notes", notes.len());
                apply_notes(&self.stores.notes, NotesEvent::ListSucceeded(notes));
                Ok(())
            }
            Err(error) => Err(self.fail_notes(error, NotesEvent::ListFailed)),
        }
    }

    pub async fn fetch_note(&self, note_id: &NoteId) -> Result<NoteDetail> {
        self.check(require_text(note_id.as_str(), "Note id is required"))?;
        apply_detail(&self.stores.detail, NoteDetailEvent::FetchStarted);

        match self.notes_api.fetch(note_id).await {
            Ok(detail) => {
                apply_detail(
                    &self.stores.detail,
                    NoteDetailEvent::FetchSucceeded(detail.clone()),
                );
                Ok(detail)
            }
            Err(error) => {
                if let Some(message) = self.report(&error) {
                    apply_detail(&self.stores.detail, NoteDetailEvent::FetchFailed(message));
                }
                Err(error)
            }
        }
    }

    pub async fn create_note(&self, input: &NewNote) -> Result<CreatedNote> {
        let input = self.check(input.validated())?;
        let call = self.begin_notes(NotesEvent::CreateStarted);
        let result = self.notes_api.create(&input).await;
        call.complete();

        match result {
            Ok(created) => {
                tracing::info!("Created note {}", created.note.id);
                apply_notes(
                    &self.stores.notes,
                    NotesEvent::CreateSucceeded(created.note.clone()),
                );
                Ok(created)
            }
            Err(error) => Err(self.fail_notes(error, NotesEvent::CreateFailed)),
        }
    }

    pub async fn update_note(&self, input: &NoteUpdate) -> Result<UpdatedNote> {
        let input = self.check(input.validated())?;
        let call = self.begin_notes(NotesEvent::UpdateStarted);
        let result = self.notes_api.update(&input).await;
        call.complete();

        match result {
            Ok(updated) => {
                tracing::info!("Updated note {}", updated.note.id);
                apply_notes(
                    &self.stores.notes,
                    NotesEvent::UpdateSucceeded(updated.note.clone()),
                );
                Ok(updated)
            }
            Err(error) => Err(self.fail_notes(error, NotesEvent::UpdateFailed)),
        }
    }

    pub async fn delete_note(&self, note_id: &NoteId) -> Result<DeletedNote> {
        self.check(require_text(note_id.as_str(), "Note id is required"))?;
        let call = self.begin_notes(NotesEvent::DeleteStarted);
        let result = self.notes_api.delete(note_id).await;
        call.complete();

        match result {
            Ok(deleted) => {
                tracing::info!("Deleted note {}", deleted.deleted_note_id);
                apply_notes(
                    &self.stores.notes,
                    NotesEvent::DeleteSucceeded(deleted.deleted_note_id.clone()),
                );
                Ok(deleted)
            }
            Err(error) => Err(self.fail_notes(error, NotesEvent::DeleteFailed)),
        }
    }

    /// Flip the favourite flag and mirror the server's answer locally.
    pub async fn toggle_favorite(&self, note_id: &NoteId) -> Result<FavoriteToggle> {
        let user_id = self.require_user_id()?;
        self.check(require_text(note_id.as_str(), "Note id is required"))?;

        match self.notes_api.toggle_favorite(note_id, &user_id).await {
            Ok(toggle) => {
                apply_notes(
                    &self.stores.notes,
                    NotesEvent::FavoriteSucceeded {
                        note_id: note_id.clone(),
                        is_favourite: toggle.is_favorite,
                    },
                );
                Ok(toggle)
            }
            Err(error) => Err(self.fail_notes(error, NotesEvent::FavoriteFailed)),
        }
    }

    /// Apply a synchronous notes event (sort, search, edit selection).
    pub fn apply(&self, event: NotesEvent) {
        apply_notes(&self.stores.notes, event);
    }

    // Auth

    pub async fn signup(&self, request: &SignupRequest) -> Result<User> {
        self.check(request.validate())?;
        self.stores.dispatch_auth(AuthEvent::SignupStarted);

        match self.auth_api.signup(request).await {
            Ok(payload) => {
                let user = payload.user.clone();
                tracing::info!("Signed up as {}", user.user_id);
                self.stores.dispatch_auth(AuthEvent::SignupSucceeded(payload));
                self.notifier
                    .notify(NoticeLevel::Success, "Successfully signed up!");
                Ok(user)
            }
            Err(error) => Err(self.fail_auth(error, AuthEvent::SignupFailed)),
        }
    }

    pub async fn login(&self, request: &LoginRequest) -> Result<User> {
        self.check(request.validate())?;
        self.stores.dispatch_auth(AuthEvent::LoginStarted);

        match self.auth_api.login(request).await {
            Ok(payload) => {
                let user = payload.user.clone();
                tracing::info!("Logged in as {}", user.user_id);
                self.stores.dispatch_auth(AuthEvent::LoginSucceeded(payload));
                self.notifier
                    .notify(NoticeLevel::Success, "Successfully logged in!");
                Ok(user)
            }
            Err(error) => Err(self.fail_auth(error, AuthEvent::LoginFailed)),
        }
    }

    /// End the session server-side, then drop every session-scoped store.
    ///
    /// A failed call leaves the local session untouched.
    pub async fn logout(&self) -> Result<()> {
        match self.auth_api.logout().await {
            Ok(message) => {
                self.stores.dispatch_auth(AuthEvent::LoggedOut);
                self.stores.clear_session_data();
                let message = if message.trim().is_empty() {
                    LOGGED_OUT_MESSAGE
                } else {
                    message.trim()
                };
                self.notifier.notify(NoticeLevel::Success, message);
                tracing::info!("Logged out");
                Ok(())
            }
            Err(error) => {
                self.report(&error);
                Err(error)
            }
        }
    }

    pub async fn fetch_profile(&self) -> Result<User> {
        self.stores.dispatch_auth(AuthEvent::ProfileStarted);

        match self.auth_api.profile().await {
            Ok(user) => {
                self.stores
                    .dispatch_auth(AuthEvent::ProfileSucceeded(user.clone()));
                Ok(user)
            }
            Err(error) => Err(self.fail_auth(error, AuthEvent::ProfileFailed)),
        }
    }

    // Failure plumbing

    fn begin_notes(&self, started: NotesEvent) -> NotesCall<'_> {
        apply_notes(&self.stores.notes, started);
        NotesCall {
            notes: &self.stores.notes,
            completed: false,
        }
    }

    fn require_user_id(&self) -> Result<String> {
        let user_id = lock(&self.stores.auth)
            .state()
            .user_id()
            .map(str::to_string);
        user_id.ok_or_else(|| self.reject(Error::Validation(SIGNED_OUT_MESSAGE.to_string())))
    }

    fn check<T>(&self, result: Result<T>) -> Result<T> {
        result.map_err(|error| self.reject(error))
    }

    fn reject(&self, error: Error) -> Error {
        self.report(&error);
        error
    }

    /// Notify the user about `error`; returns the message a store records.
    fn report(&self, error: &Error) -> Option<String> {
        match error {
            Error::Cancelled => None,
            Error::Validation(message) => {
                self.notifier.notify(NoticeLevel::Warning, message);
                None
            }
            _ => {
                let message = error.user_message();
                self.notifier.notify(NoticeLevel::Error, &message);
                Some(message)
            }
        }
    }

    fn fail_notes(&self, error: Error, event: fn(String) -> NotesEvent) -> Error {
        if let Some(message) = self.report(&error) {
            apply_notes(&self.stores.notes, event(message));
        }
        error
    }

    fn fail_auth(&self, error: Error, event: fn(String) -> AuthEvent) -> Error {
        if let Some(message) = self.report(&error) {
            self.stores.dispatch_auth(event(message));
        }
        error
    }
}
