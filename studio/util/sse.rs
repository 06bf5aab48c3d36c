// ---------------------------------------------------------------------------
// SSE helpers
// ---------------------------------------------------------------------------

/// Raw response head for an event stream. tiny_http's `into_writer()` hands
/// us the bare socket, so the status line and headers are written by hand.
pub const SSE_RESPONSE_HEAD: &str = "HTTP/1.1 200 OK\r\n\
                                     Content-Type: text/event-stream\r\n\
                                     Cache-Control: no-cache\r\n\
                                     Connection: keep-alive\r\n\
                                     X-Accel-Buffering: no\r\n\
                                     \r\n";

/// Formats a named SSE event with a JSON data payload.
///
/// Output format:
/// ```text
/// event: <name>\n
/// data: <json>\n
/// \n
/// ```
pub fn format_sse_event(event_name: &str, json_data: &str) -> String {
    format!("event: {}\ndata: {}\n\n", event_name, json_data)
}

/// Formats a keep-alive SSE comment.
/// SSE comments start with `:` and are ignored by EventSource clients
/// but prevent the connection from timing out.
pub fn format_sse_keepalive() -> &'static str {
    ": ping\n\n"
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn event_frame_layout() {
        assert_eq!(format_sse_event("frame", "{\"cursor\":1}"), "event: frame\ndata: {\"cursor\":1}\n\n");
    }

    #[test]
    fn head_ends_with_blank_line() {
        assert!(SSE_RESPONSE_HEAD.starts_with("HTTP/1.1 200 OK\r\n"));
        assert!(SSE_RESPONSE_HEAD.ends_with("\r\n\r\n"));
        assert!(SSE_RESPONSE_HEAD.contains("Content-Type: text/event-stream\r\n"));
    }
}
