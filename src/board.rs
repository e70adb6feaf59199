//! Complaint board state and request lifecycle
//!
//! The board owns every piece of UI state. Network calls run on spawned
//! tasks and report back through a channel; all state changes happen in
//! `handle_event`, on whichever task drives the board.

use thiserror::Error;
use tokio::sync::mpsc;

use crate::api::cancel::{CancelSet, CancelToken};
use crate::api::{ApiClient, ApiError, Complaint, NewComplaint};

pub const LOADING_MESSAGE: &str = "Loading all complains...";
pub const EMPTY_MESSAGE: &str = "No complaints available.";
pub const PLACEHOLDER_TITLE: &str = "--";
pub const SUBMIT_LABEL: &str = "Submit Complaint";
pub const SUBMITTING_LABEL: &str = "Submitting...";

/// Lifecycle of one kind of request (list or save)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RequestPhase {
    #[default]
    Idle,
    InFlight,
    Completed,
    Cancelled,
    Failed,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FormError {
    #[error("Complaint title is required")]
    MissingTitle,
    #[error("Complaint details are required")]
    MissingBody,
    #[error("A complaint is already being submitted")]
    SaveInFlight,
    #[error("The complaint board is not running")]
    NotMounted,
}

/// The two form fields
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ComplaintForm {
    pub title: String,
    pub body: String,
}

impl ComplaintForm {
    /// Both fields are required; whitespace alone does not count
    pub fn validate(&self) -> Result<NewComplaint, FormError> {
        if self.title.trim().is_empty() {
            return Err(FormError::MissingTitle);
        }
        if self.body.trim().is_empty() {
            return Err(FormError::MissingBody);
        }
        Ok(NewComplaint {
            title: self.title.clone(),
            body: self.body.clone(),
        })
    }

    pub fn reset(&mut self) {
        self.title.clear();
        self.body.clear();
    }
}

/// Completion of a spawned request
#[derive(Debug)]
pub enum BoardEvent {
    ListFinished {
        seq: u64,
        result: Result<Vec<Complaint>, ApiError>,
    },
    SaveFinished {
        ticket: u64,
        result: Result<(), ApiError>,
    },
}

/// One rendered list entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry<'a> {
    pub key: String,
    pub title: Option<&'a str>,
    pub body: Option<&'a str>,
}

impl Entry<'_> {
    pub fn heading(&self) -> &str {
        self.title.unwrap_or(PLACEHOLDER_TITLE)
    }

    /// Untitled complaints are shown as a bare placeholder
    pub fn is_placeholder(&self) -> bool {
        self.title.is_none()
    }
}

/// What the list area shows
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListArea<'a> {
    Loading,
    Entries(Vec<Entry<'a>>),
    Empty,
}

pub struct ComplaintBoard {
    client: ApiClient,

    complaints: Vec<Complaint>,
    is_loading: bool,
    is_saving: bool,
    error_message: Option<String>,
    pub form: ComplaintForm,

    list_phase: RequestPhase,
    save_phase: RequestPhase,

    // Sequence number of the most recent list request
    list_seq: u64,
    pending_saves: CancelSet,
    // Ticket of the save whose completion may still update the board
    active_save: Option<u64>,
    lifetime: Option<CancelToken>,
    mounted: bool,
    // Spawned requests whose completion has not been received yet
    in_flight: usize,

    events_tx: mpsc::UnboundedSender<BoardEvent>,
    events_rx: mpsc::UnboundedReceiver<BoardEvent>,
}

impl ComplaintBoard {
    pub fn new(client: ApiClient) -> Self {
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        Self {
            client,
            complaints: Vec::new(),
            is_loading: false,
            is_saving: false,
            error_message: None,
            form: ComplaintForm::default(),
            list_phase: RequestPhase::Idle,
            save_phase: RequestPhase::Idle,
            list_seq: 0,
            pending_saves: CancelSet::new(),
            active_save: None,
            lifetime: None,
            mounted: false,
            in_flight: 0,
            events_tx,
            events_rx,
        }
    }

    pub fn complaints(&self) -> &[Complaint] {
        &self.complaints
    }

    pub fn is_loading(&self) -> bool {
        self.is_loading
    }

    pub fn is_saving(&self) -> bool {
        self.is_saving
    }

    pub fn error_message(&self) -> Option<&str> {
        self.error_message.as_deref()
    }

    pub fn list_phase(&self) -> RequestPhase {
        self.list_phase
    }

    pub fn save_phase(&self) -> RequestPhase {
        self.save_phase
    }

    pub fn is_mounted(&self) -> bool {
        self.mounted
    }

    /// Token scoped to the board's lifetime, cancelled on unmount
    pub fn lifetime_token(&self) -> Option<CancelToken> {
        self.lifetime.clone()
    }

    /// Start the board and kick off the initial load under the lifetime token
    pub fn mount(&mut self) {
        if self.mounted {
            return;
        }
        let token = CancelToken::new();
        self.lifetime = Some(token.clone());
        self.mounted = true;
        tracing::info!("Complaint board mounted ({})", self.client.list_url());
        self.load_complaints(Some(token));
    }

    /// Cancel the lifetime token and every outstanding save.
    /// Completions that arrive afterwards are dropped.
    pub fn unmount(&mut self) {
        if !self.mounted {
            return;
        }
        self.mounted = false;
        if let Some(token) = self.lifetime.take() {
            token.cancel();
        }
        if !self.pending_saves.is_empty() {
            tracing::info!("Cancelling {} pending save(s)", self.pending_saves.len());
            self.pending_saves.cancel_all();
        }

        // Nothing from this mount may outlive it
        self.active_save = None;
        self.is_loading = false;
        self.is_saving = false;
        if self.list_phase == RequestPhase::InFlight {
            self.list_phase = RequestPhase::Cancelled;
        }
        if self.save_phase == RequestPhase::InFlight {
            self.save_phase = RequestPhase::Cancelled;
        }
        tracing::info!("Complaint board unmounted");
    }

    /// Fetch the complaint list. Returns the sequence number of the request;
    /// only the latest sequence may update the list.
    pub fn load_complaints(&mut self, cancel: Option<CancelToken>) -> u64 {
        self.list_seq += 1;
        let seq = self.list_seq;
        self.is_loading = true;
        self.list_phase = RequestPhase::InFlight;
        self.in_flight += 1;

        let client = self.client.clone();
        let tx = self.events_tx.clone();
        tokio::spawn(async move {
            let result = client.list_complaints(cancel.as_ref()).await;
            // The receiver only goes away with the board itself
            let _ = tx.send(BoardEvent::ListFinished { seq, result });
        });

        tracing::debug!("List request #{} started", seq);
        seq
    }

    /// Validate the form and POST it. At most one save runs at a time.
    pub fn submit_complaint(&mut self) -> Result<u64, FormError> {
        if !self.mounted {
            return Err(FormError::NotMounted);
        }
        let payload = self.form.validate()?;
        if self.is_saving {
            return Err(FormError::SaveInFlight);
        }

        self.error_message = None;
        let (ticket, token) = self.pending_saves.register();
        self.active_save = Some(ticket);
        self.is_saving = true;
        self.save_phase = RequestPhase::InFlight;
        self.in_flight += 1;

        let client = self.client.clone();
        let tx = self.events_tx.clone();
        tokio::spawn(async move {
            let result = client.save_complaint(&payload, Some(&token)).await;
            let _ = tx.send(BoardEvent::SaveFinished { ticket, result });
        });

        tracing::info!("Save request #{} started", ticket);
        Ok(ticket)
    }

    /// Apply a request completion to the board state
    pub fn handle_event(&mut self, event: BoardEvent) {
        self.in_flight = self.in_flight.saturating_sub(1);

        if !self.mounted {
            tracing::debug!("Ignoring completion after unmount: {:?}", event);
            return;
        }

        match event {
            BoardEvent::ListFinished { seq, result } => self.finish_list(seq, result),
            BoardEvent::SaveFinished { ticket, result } => self.finish_save(ticket, result),
        }
    }

    fn finish_list(&mut self, seq: u64, result: Result<Vec<Complaint>, ApiError>) {
        if seq != self.list_seq {
            tracing::debug!(
                "Discarding stale list response #{} (latest is #{})",
                seq,
                self.list_seq
            );
            return;
        }

        self.is_loading = false;
        match result {
            Ok(complaints) => {
                tracing::debug!("Loaded {} complaints", complaints.len());
                self.complaints = complaints;
                self.list_phase = RequestPhase::Completed;
            }
            Err(ApiError::Cancelled) => {
                self.list_phase = RequestPhase::Cancelled;
            }
            Err(e) => {
                tracing::error!("Error fetching complaints: {}", e);
                let failure = ApiError::FetchFailure(Box::new(e));
                self.error_message = failure.user_message();
                self.list_phase = RequestPhase::Failed;
            }
        }
    }

    fn finish_save(&mut self, ticket: u64, result: Result<(), ApiError>) {
        self.pending_saves.release(ticket);
        if self.active_save != Some(ticket) {
            tracing::debug!("Discarding completion of superseded save #{}", ticket);
            return;
        }
        self.active_save = None;
        self.is_saving = false;

        match result {
            Ok(()) => {
                tracing::info!("Save request #{} accepted", ticket);
                self.save_phase = RequestPhase::Completed;
                self.form.reset();
                self.load_complaints(None);
            }
            Err(ApiError::Cancelled) => {
                self.save_phase = RequestPhase::Cancelled;
            }
            Err(e) => {
                tracing::warn!("Save request #{} failed: {}", ticket, e);
                self.error_message = e.user_message();
                self.save_phase = RequestPhase::Failed;
            }
        }
    }

    /// Apply every completion that has already arrived
    pub fn drain_events(&mut self) -> usize {
        let mut applied = 0;
        while let Ok(event) = self.events_rx.try_recv() {
            self.handle_event(event);
            applied += 1;
        }
        applied
    }

    /// Wait for the next completion without applying it
    pub async fn next_event(&mut self) -> Option<BoardEvent> {
        self.events_rx.recv().await
    }

    /// Apply completions until no spawned request is outstanding,
    /// including any refresh triggered along the way
    pub async fn settle(&mut self) {
        while self.in_flight > 0 {
            match self.next_event().await {
                Some(event) => self.handle_event(event),
                None => break,
            }
        }
    }

    pub fn show_progress(&self) -> bool {
        self.is_loading || self.is_saving
    }

    pub fn submit_label(&self) -> &'static str {
        if self.is_saving {
            SUBMITTING_LABEL
        } else {
            SUBMIT_LABEL
        }
    }

    pub fn list_area(&self) -> ListArea<'_> {
        if self.is_loading {
            return ListArea::Loading;
        }
        if self.complaints.is_empty() {
            return ListArea::Empty;
        }

        ListArea::Entries(
            self.complaints
                .iter()
                .enumerate()
                .map(|(i, c)| Entry {
                    key: c.render_key(i),
                    title: c.display_title(),
                    body: c.body.as_deref(),
                })
                .collect(),
        )
    }
}

#[cfg(test)]
impl ComplaintBoard {
    /// Seed the list without a round trip
    pub(crate) fn set_complaints(&mut self, complaints: Vec<Complaint>) {
        self.complaints = complaints;
    }
}

impl Drop for ComplaintBoard {
    fn drop(&mut self) {
        self.unmount();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::SAVE_REJECTED_MESSAGE;
    use crate::config::AppConfig;
    use axum::extract::State;
    use axum::http::header;
    use axum::routing::{get, post};
    use axum::{Json, Router};
    use serde_json::{json, Value};
    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    const SLOW: Duration = Duration::from_secs(60);

    #[derive(Clone)]
    struct Reply {
        delay: Duration,
        body: String,
    }

    impl Reply {
        fn now(body: impl Into<String>) -> Self {
            Self {
                delay: Duration::ZERO,
                body: body.into(),
            }
        }

        fn after(delay: Duration, body: impl Into<String>) -> Self {
            Self {
                delay,
                body: body.into(),
            }
        }
    }

    /// In-process stand-in for the complaints API
    struct Stub {
        list_replies: Mutex<VecDeque<Reply>>,
        list_fallback: Mutex<Reply>,
        save_reply: Mutex<Reply>,
        list_hits: AtomicUsize,
        saved: Mutex<Vec<Value>>,
    }

    impl Stub {
        fn new() -> Arc<Self> {
            Arc::new(Self {
                list_replies: Mutex::new(VecDeque::new()),
                list_fallback: Mutex::new(Reply::now("[]")),
                save_reply: Mutex::new(Reply::now(r#"{"Success":true}"#)),
                list_hits: AtomicUsize::new(0),
                saved: Mutex::new(Vec::new()),
            })
        }

        fn set_list(&self, reply: Reply) {
            *self.list_fallback.lock().unwrap() = reply;
        }

        fn queue_list(&self, reply: Reply) {
            self.list_replies.lock().unwrap().push_back(reply);
        }

        fn set_save(&self, reply: Reply) {
            *self.save_reply.lock().unwrap() = reply;
        }

        fn list_hits(&self) -> usize {
            self.list_hits.load(Ordering::SeqCst)
        }

        fn saved(&self) -> Vec<Value> {
            self.saved.lock().unwrap().clone()
        }
    }

    async fn list_handler(
        State(stub): State<Arc<Stub>>,
    ) -> ([(header::HeaderName, &'static str); 1], String) {
        stub.list_hits.fetch_add(1, Ordering::SeqCst);
        let reply = stub
            .list_replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| stub.list_fallback.lock().unwrap().clone());
        tokio::time::sleep(reply.delay).await;
        ([(header::CONTENT_TYPE, "application/json")], reply.body)
    }

    async fn save_handler(
        State(stub): State<Arc<Stub>>,
        Json(payload): Json<Value>,
    ) -> ([(header::HeaderName, &'static str); 1], String) {
        stub.saved.lock().unwrap().push(payload);
        let reply = stub.save_reply.lock().unwrap().clone();
        tokio::time::sleep(reply.delay).await;
        ([(header::CONTENT_TYPE, "application/json")], reply.body)
    }

    async fn serve(stub: Arc<Stub>) -> String {
        let app = Router::new()
            .route("/TestApi/GetComplains", get(list_handler))
            .route("/TestApi/SaveComplain", post(save_handler))
            .with_state(stub);

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind listener");
        let addr = listener.local_addr().expect("local addr");
        tokio::spawn(async move { axum::serve(listener, app).await.expect("serve stub") });
        format!("http://{}/", addr)
    }

    fn board_for(base_url: String) -> ComplaintBoard {
        let config = AppConfig::default().with_base_url(Some(base_url));
        ComplaintBoard::new(ApiClient::new(&config).expect("client"))
    }

    async fn settle(board: &mut ComplaintBoard) {
        tokio::time::timeout(Duration::from_secs(5), board.settle())
            .await
            .expect("board should settle");
    }

    fn fill_form(board: &mut ComplaintBoard) {
        board.form.title = "Broken lift".to_string();
        board.form.body = "Out of order for a week".to_string();
    }

    #[tokio::test]
    async fn test_initial_load_renders_entries_in_order() {
        let stub = Stub::new();
        stub.set_list(Reply::now(
            r#"[{"Id":"1","Title":"Slow delivery","Body":"Order arrived late"},
                {"Id":"2","Title":"Cold food","Body":"Soup was cold"}]"#,
        ));
        let mut board = board_for(serve(stub.clone()).await);

        board.mount();
        assert!(board.is_loading());
        assert_eq!(board.list_area(), ListArea::Loading);
        assert!(board.show_progress());

        settle(&mut board).await;

        assert!(!board.is_loading());
        assert_eq!(board.list_phase(), RequestPhase::Completed);
        assert_eq!(board.error_message(), None);
        let ids: Vec<_> = board.complaints().iter().map(|c| c.id.as_deref()).collect();
        assert_eq!(ids, vec![Some("1"), Some("2")]);

        let ListArea::Entries(entries) = board.list_area() else {
            panic!("expected entries");
        };
        assert_eq!(entries[0].heading(), "Slow delivery");
        assert_eq!(entries[0].body, Some("Order arrived late"));
        assert_eq!(entries[0].key, "1");
        assert!(!board.show_progress());
    }

    #[tokio::test]
    async fn test_untitled_complaint_renders_placeholder() {
        let stub = Stub::new();
        stub.set_list(Reply::now(r#"[{"Id":"2"}]"#));
        let mut board = board_for(serve(stub).await);

        board.mount();
        settle(&mut board).await;

        let ListArea::Entries(entries) = board.list_area() else {
            panic!("expected entries");
        };
        assert_eq!(entries.len(), 1);
        assert!(entries[0].is_placeholder());
        assert_eq!(entries[0].heading(), "--");
        assert_eq!(entries[0].key, "2");
    }

    #[tokio::test]
    async fn test_empty_list_shows_empty_state() {
        let stub = Stub::new();
        let mut board = board_for(serve(stub).await);

        board.mount();
        settle(&mut board).await;

        assert_eq!(board.list_area(), ListArea::Empty);
    }

    #[tokio::test]
    async fn test_rejected_save_keeps_list_and_form() {
        let stub = Stub::new();
        stub.set_list(Reply::now(r#"[{"Id":"1","Title":"Slow delivery","Body":"Order arrived late"}]"#));
        stub.set_save(Reply::now(r#"{"Success":false}"#));
        let mut board = board_for(serve(stub.clone()).await);

        board.mount();
        settle(&mut board).await;
        let before = board.complaints().to_vec();

        fill_form(&mut board);
        board.submit_complaint().unwrap();
        assert!(board.is_saving());
        assert_eq!(board.submit_label(), SUBMITTING_LABEL);
        settle(&mut board).await;

        assert!(!board.is_saving());
        assert_eq!(board.submit_label(), SUBMIT_LABEL);
        assert_eq!(board.error_message(), Some(SAVE_REJECTED_MESSAGE));
        assert_eq!(board.save_phase(), RequestPhase::Failed);
        assert_eq!(board.complaints(), before.as_slice());
        assert_eq!(board.form.title, "Broken lift");
        assert_eq!(board.form.body, "Out of order for a week");
        assert_eq!(stub.list_hits(), 1);
    }

    #[tokio::test]
    async fn test_missing_success_flag_is_rejection() {
        let stub = Stub::new();
        stub.set_save(Reply::now(r#"{"Message":"ok?"}"#));
        let mut board = board_for(serve(stub).await);

        board.mount();
        settle(&mut board).await;
        fill_form(&mut board);
        board.submit_complaint().unwrap();
        settle(&mut board).await;

        assert_eq!(board.error_message(), Some(SAVE_REJECTED_MESSAGE));
    }

    #[tokio::test]
    async fn test_accepted_save_resets_form_and_refreshes_once() {
        let stub = Stub::new();
        stub.queue_list(Reply::now("[]"));
        stub.queue_list(Reply::now(r#"[{"Id":"9","Title":"Broken lift","Body":"Out of order for a week"}]"#));
        let mut board = board_for(serve(stub.clone()).await);

        board.mount();
        settle(&mut board).await;
        assert_eq!(stub.list_hits(), 1);

        fill_form(&mut board);
        board.submit_complaint().unwrap();
        settle(&mut board).await;

        assert_eq!(stub.list_hits(), 2);
        assert_eq!(board.error_message(), None);
        assert_eq!(board.form, ComplaintForm::default());
        assert_eq!(board.save_phase(), RequestPhase::Completed);
        assert_eq!(board.complaints().len(), 1);
        assert_eq!(
            stub.saved(),
            vec![json!({"title": "Broken lift", "body": "Out of order for a week"})]
        );
    }

    #[tokio::test]
    async fn test_submit_clears_previous_error() {
        let stub = Stub::new();
        stub.set_save(Reply::now(r#"{"Success":false}"#));
        let mut board = board_for(serve(stub.clone()).await);

        board.mount();
        settle(&mut board).await;
        fill_form(&mut board);
        board.submit_complaint().unwrap();
        settle(&mut board).await;
        assert!(board.error_message().is_some());

        stub.set_save(Reply::now(r#"{"Success":true}"#));
        board.submit_complaint().unwrap();
        assert_eq!(board.error_message(), None);
        settle(&mut board).await;
        assert_eq!(board.error_message(), None);
    }

    #[tokio::test]
    async fn test_cancelled_load_never_sets_error() {
        let stub = Stub::new();
        stub.set_list(Reply::after(SLOW, "[]"));
        let mut board = board_for(serve(stub).await);
        board.mounted = true;

        let token = CancelToken::new();
        board.load_complaints(Some(token.clone()));
        token.cancel();
        settle(&mut board).await;

        assert!(!board.is_loading());
        assert_eq!(board.list_phase(), RequestPhase::Cancelled);
        assert_eq!(board.error_message(), None);
    }

    #[tokio::test]
    async fn test_unmount_cancels_load_and_saves() {
        let stub = Stub::new();
        stub.queue_list(Reply::now("[]"));
        stub.set_list(Reply::after(SLOW, "[]"));
        stub.set_save(Reply::after(SLOW, r#"{"Success":true}"#));
        let mut board = board_for(serve(stub.clone()).await);

        board.mount();
        settle(&mut board).await;

        // Second load runs under the lifetime token and hangs
        board.load_complaints(board.lifetime_token());
        fill_form(&mut board);
        board.submit_complaint().unwrap();
        board.unmount();

        let mut cancelled = 0;
        for _ in 0..2 {
            let event = tokio::time::timeout(Duration::from_secs(5), board.next_event())
                .await
                .expect("cancelled request should finish promptly")
                .expect("event");
            match &event {
                BoardEvent::ListFinished { result, .. } => assert!(matches!(result, Err(ApiError::Cancelled))),
                BoardEvent::SaveFinished { result, .. } => assert!(matches!(result, Err(ApiError::Cancelled))),
            }
            board.handle_event(event);
            cancelled += 1;
        }

        assert_eq!(cancelled, 2);
        assert_eq!(board.error_message(), None);
        assert!(board.pending_saves.is_empty());
    }

    #[tokio::test]
    async fn test_stale_list_response_is_discarded() {
        let stub = Stub::new();
        stub.queue_list(Reply::after(
            Duration::from_millis(400),
            r#"[{"Id":"old","Title":"Old"}]"#,
        ));
        stub.queue_list(Reply::now(r#"[{"Id":"new","Title":"New"}]"#));
        let mut board = board_for(serve(stub.clone()).await);

        board.mount();
        // Make sure the slow request reaches the stub first
        tokio::time::sleep(Duration::from_millis(100)).await;
        let latest = board.load_complaints(None);
        settle(&mut board).await;

        assert_eq!(latest, 2);
        assert_eq!(stub.list_hits(), 2);
        assert_eq!(board.complaints()[0].id.as_deref(), Some("new"));
        assert!(!board.is_loading());
    }

    #[tokio::test]
    async fn test_failed_load_keeps_last_good_list() {
        let stub = Stub::new();
        stub.queue_list(Reply::now(r#"[{"Id":"1","Title":"Kept"}]"#));
        stub.set_list(Reply::now("<html>Service Unavailable</html>"));
        let mut board = board_for(serve(stub).await);

        board.mount();
        settle(&mut board).await;
        board.load_complaints(None);
        settle(&mut board).await;

        assert_eq!(board.error_message(), Some("Failed to load complaints"));
        assert_eq!(board.list_phase(), RequestPhase::Failed);
        assert_eq!(board.complaints()[0].id.as_deref(), Some("1"));
        assert!(!board.is_loading());
    }

    #[tokio::test]
    async fn test_second_submit_is_refused_while_saving() {
        let stub = Stub::new();
        stub.set_save(Reply::after(Duration::from_millis(300), r#"{"Success":true}"#));
        let mut board = board_for(serve(stub.clone()).await);

        board.mount();
        settle(&mut board).await;
        fill_form(&mut board);
        board.submit_complaint().unwrap();

        assert_eq!(board.submit_complaint(), Err(FormError::SaveInFlight));
        settle(&mut board).await;

        assert_eq!(stub.saved().len(), 1);
        assert!(board.pending_saves.is_empty());
    }

    #[tokio::test]
    async fn test_invalid_form_issues_no_request() {
        let stub = Stub::new();
        let mut board = board_for(serve(stub.clone()).await);

        board.mount();
        settle(&mut board).await;

        board.form.title = "   ".to_string();
        board.form.body = "details".to_string();
        assert_eq!(board.submit_complaint(), Err(FormError::MissingTitle));

        board.form.title = "title".to_string();
        board.form.body = String::new();
        assert_eq!(board.submit_complaint(), Err(FormError::MissingBody));

        assert!(!board.is_saving());
        assert!(stub.saved().is_empty());
    }

    #[tokio::test]
    async fn test_transport_failure_surfaces_underlying_message() {
        // Bind and release a port so nothing is listening on it
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let mut board = board_for(format!("http://{}/", addr));
        board.mount();
        settle(&mut board).await;
        assert_eq!(board.error_message(), Some("Failed to load complaints"));

        fill_form(&mut board);
        board.submit_complaint().unwrap();
        settle(&mut board).await;

        let message = board.error_message().expect("error message");
        assert!(!message.is_empty());
        assert_ne!(message, SAVE_REJECTED_MESSAGE);
        assert_eq!(board.save_phase(), RequestPhase::Failed);
    }

    #[tokio::test]
    async fn test_remount_after_unmount_starts_clean() {
        let stub = Stub::new();
        stub.set_save(Reply::after(SLOW, r#"{"Success":true}"#));
        let mut board = board_for(serve(stub.clone()).await);

        board.mount();
        settle(&mut board).await;
        fill_form(&mut board);
        board.submit_complaint().unwrap();
        board.unmount();

        assert!(!board.is_saving());
        assert!(!board.show_progress());
        assert_eq!(board.save_phase(), RequestPhase::Cancelled);
        assert_eq!(board.submit_label(), SUBMIT_LABEL);

        // The cancelled save from the first mount lands after remounting
        stub.set_save(Reply::now(r#"{"Success":true}"#));
        board.mount();
        board.submit_complaint().unwrap();
        settle(&mut board).await;

        assert_eq!(board.save_phase(), RequestPhase::Completed);
        assert!(!board.is_saving());
        assert_eq!(board.error_message(), None);
        assert_eq!(board.form, ComplaintForm::default());
        assert!(!stub.saved().is_empty());
    }

    #[tokio::test]
    async fn test_submit_requires_mount() {
        let mut board = board_for("http://127.0.0.1:9/".to_string());
        fill_form(&mut board);
        assert_eq!(board.submit_complaint(), Err(FormError::NotMounted));
    }
}
