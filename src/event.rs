use crate::error::AppError;
use crate::state::response::ResponseData;

/// Completion events posted back to the controller by in-flight work.
#[derive(Debug)]
pub enum Event {
    Response {
        /// Identity of the dispatch itself, minted per send. Completions are
        /// matched on this, not on the request id: the same request can be
        /// cancelled and re-sent while the first task's event is still queued.
        send_id: u64,
        request_id: String,
        /// Wall time of the dispatch, used when the relay reports none.
        duration_ms: u64,
        result: Result<ResponseData, AppError>,
    },
}
