use std::io::Write;
use std::sync::mpsc::RecvTimeoutError;
use std::time::Duration;
use serde::Serialize;
use tiny_http::Request;
use tracing::debug;

use netpulse::SharedAnimator;
use netpulse::animator::lock as lock_animator;

use crate::state::{lock, SharedState};
use crate::svg::render_network;
use crate::util::sse::{format_sse_event, format_sse_keepalive, SSE_RESPONSE_HEAD};

/// Payload of one `frame` event.
#[derive(Serialize)]
struct Frame {
    svg: String,
    cursor: usize,
    enabled: bool,
}

/// `GET /network/events`: Server-Sent Events handler.
///
/// This handler consumes `request` (takes ownership so we can call
/// `into_writer`) and drives a long-lived loop that:
/// 1. Sends the current frame right away.
/// 2. Waits up to 500 ms for an animator event; on one, drains whatever else
///    queued up and sends a single fresh frame.
/// 3. On timeout writes a keep-alive `: ping` comment.
///
/// The loop ends when a write fails (the browser went away). The animator
/// drops the matching subscriber on its next event.
pub fn handle(request: Request, state: SharedState) {
    let mut writer = request.into_writer();
    if write_all(&mut writer, SSE_RESPONSE_HEAD.as_bytes()).is_err() {
        return;
    }

    // Clone the animator handle out so we don't hold the studio lock.
    let animator = lock(&state).animator();
    let events = lock_animator(&animator).subscribe();
    debug!("event stream opened");

    if send_frame(&mut writer, &animator).is_err() {
        return;
    }

    loop {
        match events.recv_timeout(Duration::from_millis(500)) {
            Ok(_) => {
                while events.try_recv().is_ok() {}
                if send_frame(&mut writer, &animator).is_err() {
                    break;
                }
            }
            Err(RecvTimeoutError::Timeout) => {
                if write_all(&mut writer, format_sse_keepalive().as_bytes()).is_err() {
                    break;
                }
            }
            Err(RecvTimeoutError::Disconnected) => break,
        }
    }
    debug!("event stream closed");
}

fn send_frame<W: Write>(writer: &mut W, animator: &SharedAnimator) -> std::io::Result<()> {
    let snapshot = match lock_animator(animator).snapshot() {
        Ok(s) => s,
        // Nothing to draw yet.
        Err(_) => return Ok(()),
    };
    let frame = Frame {
        svg: render_network(&snapshot),
        cursor: snapshot.cursor,
        enabled: snapshot.enabled,
    };
    let json = serde_json::to_string(&frame)?;
    write_all(writer, format_sse_event("frame", &json).as_bytes())
}

/// Writes all bytes to the writer, returning `Err` on any I/O failure.
fn write_all<W: Write>(w: &mut W, data: &[u8]) -> std::io::Result<()> {
    w.write_all(data)?;
    w.flush()
}
