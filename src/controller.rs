use std::path::Path;
use std::sync::Arc;

use tokio::sync::mpsc::UnboundedSender;
use tokio_util::sync::CancellationToken;

use crate::env::resolver::VariableResolver;
use crate::error::AppError;
use crate::event::Event;
use crate::http::executor::{build_effective_request, execute};
use crate::http::proxy::ProxyDispatch;
use crate::ident::{new_id, now_iso};
use crate::import::postman;
use crate::state::console::{ConsoleLog, ConsoleSink, LogLevel};
use crate::state::document::{FolderDef, FolderUpdate, WorkspaceDocument};
use crate::state::environment::{EnvironmentDef, EnvironmentUpdate};
use crate::state::history::{HistoryItem, HistoryLedger};
use crate::state::request::{RequestDef, RequestUpdate};
use crate::state::response::ResponseData;
use crate::state::tabs::{TabItem, TabStrip};
use crate::state::view::{ContextMenuState, PanelKind, ViewMode};
use crate::storage::document::{
    parse_document, read_document_file, serialize_document, suggested_file_name,
};
use crate::storage::kv::{HISTORY_KEY, KvStore, RECENT_FILES_KEY};
use crate::storage::recent::{RecentFile, remember};

/// Send pipeline state: at most one request is in flight per workspace.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SendState {
    Idle,
    Sending(PendingSend),
}

/// Snapshot of the request taken at dispatch time, so completion handling
/// works even if the request is edited or deleted mid-flight. `send_id` is
/// the dispatch's own identity: completions match on it, never on the
/// request id, so a queued event from a cancelled send can't be mistaken
/// for a later re-send of the same request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingSend {
    pub send_id: u64,
    pub request_id: String,
    pub request_name: String,
    pub method: String,
    pub url: String,
    pub effective_url: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CloseOutcome {
    Closed,
    /// Unsaved changes present; the caller must confirm and retry with force.
    NeedsConfirmation,
}

/// A serialized artifact ready for the shell's download/save-dialog step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SavedFile {
    pub file_name: String,
    pub contents: String,
}

/// Owns the whole workspace: open document, tabs, history, console, recent
/// files and the send pipeline. The presentation layer drives it through
/// these methods and never mutates state directly.
///
/// Single-threaded cooperative model: every method runs to completion; the
/// only concurrent work is the network dispatch, which reports back through
/// the event channel and is applied by [`WorkspaceController::handle_event`].
pub struct WorkspaceController {
    document: Option<WorkspaceDocument>,
    has_unsaved_changes: bool,
    recent_files: Vec<RecentFile>,
    tabs: TabStrip,
    view_mode: ViewMode,
    context_menu: ContextMenuState,
    response: Option<ResponseData>,
    send_state: SendState,
    send_seq: u64,
    cancel: Option<CancellationToken>,
    console: ConsoleSink,
    history: HistoryLedger,
    kv: KvStore,
    relay: Arc<dyn ProxyDispatch>,
    tx: UnboundedSender<Event>,
}

impl WorkspaceController {
    /// Persisted history and recent files are loaded once at startup.
    pub fn new(relay: Arc<dyn ProxyDispatch>, kv: KvStore, tx: UnboundedSender<Event>) -> Self {
        let recent_files = kv.load(RECENT_FILES_KEY).unwrap_or_default();
        let history = HistoryLedger::from_items(kv.load(HISTORY_KEY).unwrap_or_default());
        Self {
            document: None,
            has_unsaved_changes: false,
            recent_files,
            tabs: TabStrip::default(),
            view_mode: ViewMode::Welcome,
            context_menu: ContextMenuState::default(),
            response: None,
            send_state: SendState::Idle,
            send_seq: 0,
            cancel: None,
            console: ConsoleSink::default(),
            history,
            kv,
            relay,
            tx,
        }
    }

    // --- File management ---

    pub fn create_new_file(&mut self, name: &str) {
        self.document = Some(WorkspaceDocument::new(name));
        self.has_unsaved_changes = true;
        self.view_mode = ViewMode::Collections;
        self.tabs.clear();
        self.log(LogLevel::Success, format!("Created new file: {name}"), None);
    }

    /// Replace the in-memory document wholesale from raw file contents.
    /// On any format error nothing mutates; the error is logged and returned.
    pub fn open_file(&mut self, file_name: &str, contents: &str) -> Result<(), AppError> {
        let parsed = match parse_document(contents) {
            Ok(parsed) => parsed,
            Err(err) => {
                self.log(LogLevel::Error, "Invalid file format", None);
                return Err(err);
            }
        };

        let display_name = if parsed.name.is_empty() {
            file_name.to_string()
        } else {
            parsed.name.clone()
        };
        self.document = Some(parsed);
        self.has_unsaved_changes = false;
        self.view_mode = ViewMode::Collections;
        self.tabs.clear();

        remember(
            &mut self.recent_files,
            RecentFile {
                name: display_name,
                path: file_name.to_string(),
                last_opened: now_iso(),
            },
        );
        self.persist_recent_files();

        self.log(LogLevel::Success, format!("Opened file: {file_name}"), None);
        Ok(())
    }

    /// Async open: the read happens off the workspace, which stays fully
    /// usable until the contents arrive.
    pub async fn open_path(&mut self, path: &Path) -> Result<(), AppError> {
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        let contents = match read_document_file(path).await {
            Ok(contents) => contents,
            Err(err) => {
                self.log(LogLevel::Error, format!("Failed to read file: {err}"), None);
                return Err(err);
            }
        };
        self.open_file(&file_name, &contents)
    }

    /// Stamp `updatedAt`, serialize, clear the unsaved flag. The returned
    /// artifact is the shell's to write out; the document id never changes.
    pub fn save_file(&mut self) -> Option<SavedFile> {
        self.document.as_mut()?.touch();
        let doc = self.document.as_ref()?;
        let contents = match serialize_document(doc) {
            Ok(contents) => contents,
            Err(err) => {
                let message = format!("Failed to save: {err}");
                self.log(LogLevel::Error, message, None);
                return None;
            }
        };
        let saved = SavedFile {
            file_name: suggested_file_name(&doc.name),
            contents,
        };
        let name = doc.name.clone();
        self.has_unsaved_changes = false;
        self.log(LogLevel::Success, format!("Saved: {name}"), None);
        Some(saved)
    }

    /// Close the document. Unsaved changes require explicit confirmation
    /// (`force`) before anything is discarded.
    pub fn close_file(&mut self, force: bool) -> CloseOutcome {
        if self.has_unsaved_changes && !force {
            return CloseOutcome::NeedsConfirmation;
        }
        self.document = None;
        self.has_unsaved_changes = false;
        self.view_mode = ViewMode::Welcome;
        self.tabs.clear();
        self.response = None;
        self.log(LogLevel::Info, "Closed file", None);
        CloseOutcome::Closed
    }

    fn mark_changed(&mut self) {
        self.has_unsaved_changes = true;
        if let Some(doc) = self.document.as_mut() {
            doc.touch();
        }
    }

    // --- Tabs ---

    /// Open (or re-activate) the tab for a request. No-op for unknown ids.
    pub fn open_tab(&mut self, request_id: &str) {
        let Some(doc) = self.document.as_ref() else { return };
        let Some(request) = doc.request(request_id) else { return };
        let request = request.clone();
        self.tabs.open(&request);
        self.view_mode = ViewMode::Collections;
    }

    pub fn close_tab(&mut self, tab_id: &str) {
        self.tabs.close(tab_id);
    }

    pub fn set_active_tab(&mut self, tab_id: &str) {
        self.tabs.activate(tab_id);
    }

    pub fn tabs(&self) -> &[TabItem] {
        self.tabs.tabs()
    }

    pub fn active_tab(&self) -> Option<&TabItem> {
        self.tabs.active()
    }

    pub fn active_request_id(&self) -> Option<&str> {
        self.tabs.active_request_id()
    }

    pub fn active_request(&self) -> Option<&RequestDef> {
        let id = self.tabs.active_request_id()?;
        self.document.as_ref()?.request(id)
    }

    // --- Requests ---

    pub fn create_request(&mut self, folder_id: Option<String>) -> Option<String> {
        if self.document.is_none() {
            self.log(
                LogLevel::Error,
                "No file open. Create or open a file first.",
                None,
            );
            return None;
        }
        let in_folder = folder_id.is_some();
        let request = RequestDef::new(folder_id);
        let id = request.id.clone();
        let name = request.name.clone();
        if let Some(doc) = self.document.as_mut() {
            doc.requests.push(request);
        }
        self.mark_changed();
        self.open_tab(&id);
        let suffix = if in_folder { " in folder" } else { "" };
        self.log(
            LogLevel::Info,
            format!("Created request{suffix}: {name}"),
            None,
        );
        Some(id)
    }

    pub fn update_request(&mut self, id: &str, update: RequestUpdate) {
        let Some(doc) = self.document.as_mut() else { return };
        let Some(request) = doc.request_mut(id) else { return };
        request.apply(update);
        let name = request.name.clone();
        let method = request.method.as_str().to_string();
        // Archiving closes the tab no matter which path sets the flag.
        if request.is_archived {
            self.tabs.close_for_request(id);
        } else {
            self.tabs.sync_display(id, &name, &method);
            self.tabs.mark_dirty(id);
        }
        self.mark_changed();
    }

    /// Removing a request closes its tab in the same mutation, keeping the
    /// tab/request invariant intact.
    pub fn delete_request(&mut self, id: &str) {
        let Some(doc) = self.document.as_mut() else { return };
        let before = doc.requests.len();
        doc.requests.retain(|r| r.id != id);
        if doc.requests.len() == before {
            return;
        }
        self.tabs.close_for_request(id);
        self.mark_changed();
        self.log(LogLevel::Warn, "Deleted request", None);
    }

    pub fn duplicate_request(&mut self, id: &str) -> Option<String> {
        let doc = self.document.as_ref()?;
        let original = doc.request(id)?;
        let copy = original.duplicated();
        let copy_id = copy.id.clone();
        let original_name = original.name.clone();
        if let Some(doc) = self.document.as_mut() {
            doc.requests.push(copy);
        }
        self.mark_changed();
        self.open_tab(&copy_id);
        self.log(LogLevel::Info, format!("Duplicated: {original_name}"), None);
        Some(copy_id)
    }

    /// Archived requests leave the visible list and lose their tab, but stay
    /// in the document.
    pub fn archive_request(&mut self, id: &str) {
        let Some(doc) = self.document.as_mut() else { return };
        let Some(request) = doc.request_mut(id) else { return };
        request.is_archived = true;
        request.touch();
        self.tabs.close_for_request(id);
        self.mark_changed();
        self.log(LogLevel::Info, "Archived request", None);
    }

    pub fn restore_request(&mut self, id: &str) {
        let Some(doc) = self.document.as_mut() else { return };
        let Some(request) = doc.request_mut(id) else { return };
        request.is_archived = false;
        request.touch();
        self.mark_changed();
        self.log(LogLevel::Info, "Restored request", None);
    }

    pub fn move_request_to_folder(&mut self, request_id: &str, folder_id: Option<String>) {
        let Some(doc) = self.document.as_mut() else { return };
        let Some(request) = doc.request_mut(request_id) else { return };
        let moved_to_folder = folder_id.is_some();
        request.folder_id = folder_id;
        request.touch();
        self.mark_changed();
        let message = if moved_to_folder { "Moved to folder" } else { "Moved to root" };
        self.log(LogLevel::Info, message, None);
    }

    // --- Folders ---

    pub fn create_folder(&mut self, name: &str, parent_id: Option<String>) -> Option<String> {
        if self.document.is_none() {
            self.log(LogLevel::Error, "No file open", None);
            return None;
        }
        let folder = FolderDef::new(name, parent_id);
        let id = folder.id.clone();
        if let Some(doc) = self.document.as_mut() {
            doc.folders.push(folder);
        }
        self.mark_changed();
        self.log(LogLevel::Info, format!("Created folder: {name}"), None);
        Some(id)
    }

    pub fn update_folder(&mut self, id: &str, update: FolderUpdate) {
        let Some(doc) = self.document.as_mut() else { return };
        let Some(folder) = doc.folder_mut(id) else { return };
        folder.apply(update);
        self.mark_changed();
    }

    /// Deleting a folder reparents its requests to root; requests are never
    /// cascade-deleted.
    pub fn delete_folder(&mut self, id: &str) {
        let Some(doc) = self.document.as_mut() else { return };
        let before = doc.folders.len();
        doc.folders.retain(|f| f.id != id);
        if doc.folders.len() == before {
            return;
        }
        for request in doc.requests.iter_mut().filter(|r| r.folder_id.as_deref() == Some(id)) {
            request.folder_id = None;
        }
        self.mark_changed();
        self.log(LogLevel::Warn, "Deleted folder", None);
    }

    pub fn toggle_folder_collapse(&mut self, id: &str) {
        let Some(doc) = self.document.as_mut() else { return };
        if let Some(folder) = doc.folder_mut(id) {
            folder.collapsed = !folder.collapsed;
        }
    }

    // --- Environments ---

    pub fn create_environment(&mut self, name: &str) -> Option<String> {
        self.document.as_ref()?;
        let environment = EnvironmentDef::new(name);
        let id = environment.id.clone();
        if let Some(doc) = self.document.as_mut() {
            doc.environments.push(environment);
        }
        self.mark_changed();
        self.log(LogLevel::Info, format!("Created environment: {name}"), None);
        Some(id)
    }

    pub fn update_environment(&mut self, id: &str, update: EnvironmentUpdate) {
        let Some(doc) = self.document.as_mut() else { return };
        let Some(environment) = doc.environment_mut(id) else { return };
        environment.apply(update);
        self.mark_changed();
    }

    /// Deleting the active environment clears the active selection.
    pub fn delete_environment(&mut self, id: &str) {
        let Some(doc) = self.document.as_mut() else { return };
        let before = doc.environments.len();
        doc.environments.retain(|e| e.id != id);
        if doc.environments.len() == before {
            return;
        }
        if doc.active_environment_id.as_deref() == Some(id) {
            doc.active_environment_id = None;
        }
        self.mark_changed();
        self.log(LogLevel::Warn, "Deleted environment", None);
    }

    /// Activate an environment by id, or `None` for no active environment.
    /// Unknown ids are refused: `active_environment_id` always references an
    /// existing environment or is absent.
    pub fn set_active_environment(&mut self, id: Option<String>) {
        let Some(doc) = self.document.as_mut() else { return };
        let name = match id.as_deref() {
            Some(id) => match doc.environment(id) {
                Some(env) => Some(env.name.clone()),
                None => return,
            },
            None => None,
        };
        doc.active_environment_id = id;
        self.mark_changed();
        if let Some(name) = name {
            self.log(LogLevel::Info, format!("Environment: {name}"), None);
        }
    }

    pub fn duplicate_environment(&mut self, id: &str) -> Option<String> {
        let doc = self.document.as_ref()?;
        let original = doc.environment(id)?;
        let copy = original.duplicated();
        let copy_id = copy.id.clone();
        let original_name = original.name.clone();
        if let Some(doc) = self.document.as_mut() {
            doc.environments.push(copy);
        }
        self.mark_changed();
        self.log(
            LogLevel::Info,
            format!("Duplicated environment: {original_name}"),
            None,
        );
        Some(copy_id)
    }

    pub fn active_environment(&self) -> Option<&EnvironmentDef> {
        self.document.as_ref()?.active_environment()
    }

    pub fn resolve_variables(&self, text: &str) -> String {
        VariableResolver::from_environment(self.active_environment()).resolve(text)
    }

    // --- Request execution ---

    /// The send affordance: there is an active request with a non-empty
    /// resolved URL and nothing already in flight.
    pub fn can_send(&self) -> bool {
        self.send_state == SendState::Idle
            && self
                .active_request()
                .is_some_and(|r| !self.resolve_variables(&r.url).is_empty())
    }

    /// Dispatch the active request through the relay. Concurrency policy:
    /// one send at a time per workspace; a second send is rejected with a
    /// console warning rather than superseding the first.
    pub fn send_request(&mut self) {
        if matches!(self.send_state, SendState::Sending(_)) {
            self.log(LogLevel::Warn, "A request is already in flight", None);
            return;
        }
        let Some(request) = self.active_request().cloned() else { return };
        let Some(doc) = self.document.as_ref() else { return };

        let resolver = VariableResolver::from_environment(doc.active_environment());
        let effective = build_effective_request(&request, &resolver, doc.settings.timeout_ms);
        if effective.url.is_empty() {
            return;
        }

        self.response = None;
        self.log(
            LogLevel::Info,
            format!("Sending {} {}", request.method.as_str(), request.url),
            Some(&request.id),
        );

        self.send_seq += 1;
        let send_id = self.send_seq;
        let pending = PendingSend {
            send_id,
            request_id: request.id.clone(),
            request_name: request.name.clone(),
            method: request.method.as_str().to_string(),
            url: request.url.clone(),
            effective_url: effective.url.clone(),
        };
        let cancel = CancellationToken::new();
        self.cancel = Some(cancel.clone());
        self.send_state = SendState::Sending(pending);

        tokio::spawn(execute(
            self.relay.clone(),
            send_id,
            request.id,
            effective,
            self.tx.clone(),
            cancel,
        ));
    }

    /// Cooperative cancel: fires the token, returns to idle immediately.
    /// The in-flight task resolves as cancelled and mutates nothing.
    pub fn cancel_request(&mut self) {
        if let Some(cancel) = self.cancel.take() {
            cancel.cancel();
            self.send_state = SendState::Idle;
            self.log(LogLevel::Warn, "Request cancelled", None);
        }
    }

    /// Apply a completion event. Events that don't carry the in-flight
    /// dispatch's `send_id` (already cancelled, superseded, stale) are
    /// dropped so cancellation stays mutation-free even when the transport
    /// eventually resolves — including a cancel-then-resend of the same
    /// request, where the stale event's request id would still match.
    pub fn handle_event(&mut self, event: Event) {
        let Event::Response { send_id, request_id, duration_ms, result } = event;

        let pending = match &self.send_state {
            SendState::Sending(pending) if pending.send_id == send_id => pending.clone(),
            _ => return,
        };
        self.send_state = SendState::Idle;
        self.cancel = None;

        match result {
            Ok(response) => self.finish_send(pending, response),
            Err(err) if err.is_cancelled() => {
                // Warn already emitted by cancel_request; nothing mutates.
            }
            Err(err) => {
                let synthetic = ResponseData::transport_failure(&err.to_string(), duration_ms);
                self.response = Some(synthetic);
                self.log(
                    LogLevel::Error,
                    format!("Failed: {err}"),
                    Some(&request_id),
                );
                // Transport failures are not recorded in history, matching
                // the success-only ledger semantics.
            }
        }
    }

    fn finish_send(&mut self, pending: PendingSend, response: ResponseData) {
        let level = if response.is_success() { LogLevel::Success } else { LogLevel::Error };
        self.log(
            level,
            format!(
                "{} {} - {} ({}ms)",
                pending.method, pending.effective_url, response.status, response.time
            ),
            Some(&pending.request_id),
        );

        self.history.push(HistoryItem {
            id: new_id(),
            request_id: pending.request_id.clone(),
            request_name: pending.request_name,
            method: pending.method,
            url: pending.url,
            timestamp: now_iso(),
            duration: response.time,
            response: Some(response.clone()),
        });
        self.persist_history();

        self.tabs.mark_clean(&pending.request_id);
        self.response = Some(response);
    }

    pub fn response(&self) -> Option<&ResponseData> {
        self.response.as_ref()
    }

    pub fn is_loading(&self) -> bool {
        matches!(self.send_state, SendState::Sending(_))
    }

    pub fn send_state(&self) -> &SendState {
        &self.send_state
    }

    // --- Console ---

    pub fn console_logs(&self) -> &[ConsoleLog] {
        self.console.logs()
    }

    pub fn add_console_log(
        &mut self,
        level: LogLevel,
        message: impl Into<String>,
        request_id: Option<&str>,
    ) {
        self.console.push(level, message, request_id);
    }

    pub fn clear_console_logs(&mut self) {
        self.console.clear();
    }

    fn log(&mut self, level: LogLevel, message: impl Into<String>, request_id: Option<&str>) {
        self.console.push(level, message, request_id);
    }

    // --- History ---

    pub fn history(&self) -> &[HistoryItem] {
        self.history.items()
    }

    pub fn clear_history(&mut self) {
        self.history.clear();
        self.persist_history();
        self.log(LogLevel::Info, "Cleared history", None);
    }

    pub fn delete_history_item(&mut self, id: &str) {
        if self.history.delete(id) {
            self.persist_history();
        }
    }

    fn persist_history(&mut self) {
        if let Err(err) = self.kv.store(HISTORY_KEY, &self.history.items()) {
            self.log(LogLevel::Error, format!("Failed to save history: {err}"), None);
        }
    }

    fn persist_recent_files(&mut self) {
        if let Err(err) = self.kv.store(RECENT_FILES_KEY, &self.recent_files) {
            self.log(
                LogLevel::Error,
                format!("Failed to save recent files: {err}"),
                None,
            );
        }
    }

    // --- Import / export ---

    /// Merge a Postman collection into the open document. Malformed input
    /// logs an error and mutates nothing.
    pub fn import_postman(&mut self, raw: &str) -> Result<(), AppError> {
        if self.document.is_none() {
            self.log(LogLevel::Error, "Open a file first", None);
            return Err(AppError::Other("no open document".into()));
        }
        let imported = match postman::import_collection(raw) {
            Ok(imported) => imported,
            Err(err) => {
                self.log(LogLevel::Error, "Failed to import Postman collection", None);
                return Err(err);
            }
        };
        let count = imported.requests.len();
        if let Some(doc) = self.document.as_mut() {
            doc.requests.extend(imported.requests);
            doc.folders.extend(imported.folders);
        }
        self.mark_changed();
        self.log(
            LogLevel::Success,
            format!("Imported {count} requests from Postman"),
            None,
        );
        Ok(())
    }

    pub fn export_postman(&mut self) -> Option<SavedFile> {
        let doc = self.document.as_ref()?;
        let contents = match postman::export_collection_json(doc) {
            Ok(contents) => contents,
            Err(err) => {
                let message = format!("Failed to export: {err}");
                self.log(LogLevel::Error, message, None);
                return None;
            }
        };
        let file_name = postman::export_file_name(&doc.name);
        self.log(LogLevel::Success, "Exported as Postman collection", None);
        Some(SavedFile { file_name, contents })
    }

    // --- Context menu / view mode ---

    pub fn show_context_menu(
        &mut self,
        x: i32,
        y: i32,
        target_id: Option<String>,
        panel: PanelKind,
    ) {
        self.context_menu.show(x, y, target_id, panel);
    }

    pub fn hide_context_menu(&mut self) {
        self.context_menu.hide();
    }

    pub fn context_menu(&self) -> &ContextMenuState {
        &self.context_menu
    }

    pub fn set_view_mode(&mut self, mode: ViewMode) {
        self.view_mode = mode;
    }

    pub fn view_mode(&self) -> ViewMode {
        self.view_mode
    }

    // --- Accessors ---

    pub fn document(&self) -> Option<&WorkspaceDocument> {
        self.document.as_ref()
    }

    pub fn has_unsaved_changes(&self) -> bool {
        self.has_unsaved_changes
    }

    pub fn recent_files(&self) -> &[RecentFile] {
        &self.recent_files
    }
}
