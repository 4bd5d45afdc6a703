//! Kobi workspace core: an offline-first API client's state model and
//! request pipeline.
//!
//! Everything revolves around [`WorkspaceController`]: it owns the open
//! document (requests, folders, environments), the tab strip, the console
//! and history ledgers, and the send pipeline. Network dispatch goes
//! through the [`http::proxy::ProxyDispatch`] port so the transport can be
//! swapped out in tests; completions come back as [`Event`] values that the
//! host loop feeds into [`WorkspaceController::handle_event`].
//!
//! Documents serialize to the `*.kobi.json` format and convert to and from
//! Postman Collection v2.1 via [`import::postman`].

pub mod controller;
pub mod env;
pub mod error;
pub mod event;
pub mod http;
pub mod ident;
pub mod import;
pub mod state;
pub mod storage;

pub use controller::{CloseOutcome, PendingSend, SavedFile, SendState, WorkspaceController};
pub use error::AppError;
pub use event::Event;
