use std::io::Cursor;
use tiny_http::{Header, Method, Request, Response, StatusCode};
use tracing::debug;

use crate::state::SharedState;
use crate::handlers;

// ---------------------------------------------------------------------------
// Response helpers
// ---------------------------------------------------------------------------

fn header(name: &str, value: &str) -> Header {
    Header::from_bytes(name.as_bytes(), value.as_bytes()).unwrap()
}

fn body_response(status: u16, content_type: &str, body: Vec<u8>) -> Response<Cursor<Vec<u8>>> {
    let len = body.len();
    Response::new(
        StatusCode(status),
        vec![header("Content-Type", content_type)],
        Cursor::new(body),
        Some(len),
        None,
    )
}

pub fn html_response(body: String) -> Response<Cursor<Vec<u8>>> {
    body_response(200, "text/html; charset=utf-8", body.into_bytes())
}

pub fn json_response(body: String) -> Response<Cursor<Vec<u8>>> {
    body_response(200, "application/json", body.into_bytes())
}

pub fn redirect(location: &str) -> Response<Cursor<Vec<u8>>> {
    Response::new(
        StatusCode(303),
        vec![
            header("Location", location),
            header("Content-Length", "0"),
        ],
        Cursor::new(Vec::new()),
        Some(0),
        None,
    )
}

pub fn json_download_response(body: String, filename: &str) -> Response<Cursor<Vec<u8>>> {
    let disposition = format!("attachment; filename=\"{}\"", filename);
    body_response(200, "application/json", body.into_bytes())
        .with_header(header("Content-Disposition", &disposition))
}

pub fn no_content() -> Response<Cursor<Vec<u8>>> {
    Response::new(StatusCode(204), vec![], Cursor::new(Vec::new()), Some(0), None)
}

pub fn bad_request(message: &str) -> Response<Cursor<Vec<u8>>> {
    body_response(400, "text/plain; charset=utf-8", message.as_bytes().to_vec())
}

pub fn server_error(message: &str) -> Response<Cursor<Vec<u8>>> {
    body_response(500, "text/plain; charset=utf-8", message.as_bytes().to_vec())
}

pub fn not_found() -> Response<Cursor<Vec<u8>>> {
    body_response(404, "text/plain", b"404 Not Found".to_vec())
}

// ---------------------------------------------------------------------------
// Request dispatcher
// ---------------------------------------------------------------------------

/// Dispatches incoming requests to the appropriate handler.
///
/// All handlers (except SSE) receive a `&mut Request` so that the dispatcher
/// retains ownership and can call `request.respond(response)` at the end.
/// The SSE handler takes ownership to perform long-lived streaming.
pub fn dispatch(mut request: Request, state: SharedState) {
    let method = request.method().clone();
    let url    = request.url().to_owned();
    let path   = url.split('?').next().unwrap_or("").to_owned();
    debug!(%method, %path, "request");

    // SSE: long-lived; handler takes ownership and drives the stream loop.
    if method == Method::Get && path == "/network/events" {
        handlers::network_sse::handle(request, state);
        return;
    }

    let response = match (method, path.as_str()) {
        // ── Root redirect ─────────────────────────────────────────────────
        (Method::Get, "/") => redirect("/network"),

        // ── Network ──────────────────────────────────────────────────────
        (Method::Get,  "/network")                  => handlers::network::handle_get(state),
        (Method::Get,  "/network/state")            => handlers::network::handle_state(state),
        (Method::Get,  "/network/weights.json")     => handlers::network::handle_export(state),
        (Method::Post, "/network/toggle-animation") => handlers::network::handle_toggle_animation(state),
        (Method::Post, "/network/reset")            => handlers::network::handle_reset(state),
        (Method::Post, "/network/randomize")        => handlers::network::handle_randomize(state),
        (Method::Post, "/network/neuron")           => handlers::network::handle_neuron(&mut request, state),

        // ── Classifier ───────────────────────────────────────────────────
        (Method::Get,  "/classifier")         => handlers::classifier::handle_get(state),
        (Method::Post, "/classifier/predict") => handlers::classifier::handle_predict(&mut request, state),
        (Method::Post, "/classifier/reset")   => handlers::classifier::handle_reset(state),

        // ── 404 ──────────────────────────────────────────────────────────
        _ => not_found(),
    };

    let _ = request.respond(response);
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Read, Write};
    use std::net::{SocketAddr, TcpStream};
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    use netpulse::animator::lock as lock_animator;
    use netpulse::{Animator, MockClassifier, Session, Topology};
    use tiny_http::Server;

    use crate::state::{lock, StudioState};

    fn studio_state() -> SharedState {
        let mut animator = Animator::seeded(3);
        animator.initialize(Topology::default());
        // Long interval: the timer never fires during a test.
        let session = Session::start(animator, Duration::from_secs(3600)).unwrap();
        Arc::new(Mutex::new(StudioState::new(session, MockClassifier::seeded(1, Duration::ZERO))))
    }

    /// Sends one raw request through a real socket, dispatches it and returns
    /// the status code plus the raw response text.
    fn send(state: &SharedState, method: &str, path: &str, form: &str) -> (u16, String) {
        let server = Server::http("127.0.0.1:0").unwrap();
        let addr: SocketAddr = server.server_addr().to_ip().unwrap();
        let raw = format!(
            "{method} {path} HTTP/1.1\r\nHost: localhost\r\nConnection: close\r\n\
             Content-Type: application/x-www-form-urlencoded\r\nContent-Length: {}\r\n\r\n{form}",
            form.len()
        );
        let client = std::thread::spawn(move || {
            let mut stream = TcpStream::connect(addr).unwrap();
            stream.write_all(raw.as_bytes()).unwrap();
            let mut response = String::new();
            stream.read_to_string(&mut response).unwrap();
            response
        });

        let request = server.recv().unwrap();
        dispatch(request, state.clone());
        drop(server);

        let response = client.join().unwrap();
        let status = response
            .split_whitespace()
            .nth(1)
            .and_then(|code| code.parse().ok())
            .unwrap();
        (status, response)
    }

    fn activation(state: &SharedState, layer: usize, neuron: usize) -> f64 {
        let animator = lock(state).animator();
        let value = lock_animator(&animator).get_activation(layer, neuron).unwrap();
        value
    }

    #[test]
    fn neuron_toggle_answers_no_content_and_flips_the_value() {
        let state = studio_state();
        let (status, _) = send(&state, "POST", "/network/neuron", "layer=0&neuron=2");
        assert_eq!(status, 204);
        assert_eq!(activation(&state, 0, 2), 1.0);
    }

    #[test]
    fn bad_neuron_addresses_are_rejected() {
        let state = studio_state();
        for form in ["layer=0&neuron=6", "layer=9&neuron=0", "layer=x&neuron=0", "layer=-1&neuron=0", ""] {
            let (status, _) = send(&state, "POST", "/network/neuron", form);
            assert_eq!(status, 400, "form {form:?}");
        }
        let animator = lock(&state).animator();
        let snapshot = lock_animator(&animator).snapshot().unwrap();
        assert!(snapshot.activations.iter().flatten().all(|&v| v == 0.5));
    }

    #[test]
    fn toggle_animation_redirects_and_pauses() {
        let state = studio_state();
        assert!(lock(&state).session.is_ticking());

        let (status, response) = send(&state, "POST", "/network/toggle-animation", "");
        assert_eq!(status, 303);
        assert!(response.contains("Location: /network"));
        assert!(!lock(&state).session.is_ticking());
        let animator = lock(&state).animator();
        assert_eq!(lock_animator(&animator).is_enabled(), Ok(false));
    }

    #[test]
    fn reset_and_randomize_redirect_back_to_the_network() {
        let state = studio_state();
        send(&state, "POST", "/network/neuron", "layer=1&neuron=0");
        let before = {
            let animator = lock(&state).animator();
            let weights = lock_animator(&animator).export_weights().unwrap();
            weights
        };

        assert_eq!(send(&state, "POST", "/network/reset", "").0, 303);
        assert_eq!(activation(&state, 1, 0), 0.5);

        assert_eq!(send(&state, "POST", "/network/randomize", "").0, 303);
        let animator = lock(&state).animator();
        assert_ne!(lock_animator(&animator).export_weights().unwrap(), before);
    }

    #[test]
    fn pages_and_unknown_paths() {
        let state = studio_state();
        assert_eq!(send(&state, "GET", "/", "").0, 303);
        assert_eq!(send(&state, "GET", "/network", "").0, 200);
        assert_eq!(send(&state, "GET", "/classifier", "").0, 200);
        assert_eq!(send(&state, "GET", "/nowhere", "").0, 404);
        assert_eq!(send(&state, "DELETE", "/network", "").0, 404);

        let (status, response) = send(&state, "GET", "/network/state", "");
        assert_eq!(status, 200);
        assert!(response.contains("\"layer_sizes\":[6,8,8,4]"));
    }
}
