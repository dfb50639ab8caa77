use tracing::{Span, field};

use super::TraceId;

/// Root span for one inbound request. `tickers` and `like` are recorded once the
/// query has been parsed.
pub fn request_span(route: &'static str, trace_id: &TraceId) -> Span {
    tracing::info_span!(
        "request",
        route = %route,
        trace_id = %trace_id.as_str(),
        tickers = field::Empty,
        like = field::Empty
    )
}

/// Child span for a pipeline stage (inherits trace_id from the request span).
pub fn child_span(stage: &'static str) -> Span {
    tracing::info_span!("stage", stage = %stage)
}
