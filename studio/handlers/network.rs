use std::io::Cursor;
use tiny_http::{Request, Response};
use tracing::{info, warn};

use netpulse::{AnimatorSnapshot, NetError};
use netpulse::animator::lock as lock_animator;

use crate::render::{html_escape, render_page, Page};
use crate::routes::{bad_request, json_download_response, json_response, no_content, redirect, server_error};
use crate::state::{lock, FlashMessage, SharedState};
use crate::svg::render_network;
use crate::util::form::{form_get, parse_form};

// ---------------------------------------------------------------------------
// GET /network
// ---------------------------------------------------------------------------

pub fn handle_get(state: SharedState) -> Response<Cursor<Vec<u8>>> {
    let mut st = lock(&state);
    let flash = st.take_flash();
    let tick_ms = st.session.tick_interval().as_millis();
    let snapshot = lock_animator(&st.animator()).snapshot();
    drop(st);

    let snapshot = match snapshot {
        Ok(s) => s,
        Err(e) => return server_error(&e.to_string()),
    };

    let page = render_page(Page::Network, flash.as_ref(), |tmpl| {
        tmpl.replace("{{NETWORK_SVG}}", &render_network(&snapshot))
            .replace("{{TOGGLE_LABEL}}", toggle_label(snapshot.enabled))
            .replace("{{TOGGLE_CLASS}}", if snapshot.enabled { "btn btn-primary" } else { "btn btn-outline" })
            .replace("{{NETWORK_STATUS}}", &status_line(&snapshot))
            .replace("{{LAYER_SIZES}}", &html_escape(&format!("{:?}", snapshot.layer_sizes)))
            .replace("{{TICK_MS}}", &tick_ms.to_string())
    });
    crate::routes::html_response(page)
}

fn toggle_label(enabled: bool) -> &'static str {
    if enabled { "Pause Animation" } else { "Resume Animation" }
}

pub fn status_line(snapshot: &AnimatorSnapshot) -> String {
    let state = if snapshot.enabled { "running" } else { "paused" };
    format!("Animation {}, cursor on layer {}", state, snapshot.cursor)
}

// ---------------------------------------------------------------------------
// GET /network/state
// ---------------------------------------------------------------------------

pub fn handle_state(state: SharedState) -> Response<Cursor<Vec<u8>>> {
    let animator = lock(&state).animator();
    let snapshot = lock_animator(&animator).snapshot();
    match snapshot.map(|s| serde_json::to_string(&s)) {
        Ok(Ok(json)) => json_response(json),
        Ok(Err(e)) => server_error(&e.to_string()),
        Err(e) => server_error(&e.to_string()),
    }
}

// ---------------------------------------------------------------------------
// GET /network/weights.json
// ---------------------------------------------------------------------------

pub fn handle_export(state: SharedState) -> Response<Cursor<Vec<u8>>> {
    let animator = lock(&state).animator();
    let file = lock_animator(&animator).export_weights();
    match file.map(|f| serde_json::to_string_pretty(&f)) {
        Ok(Ok(json)) => json_download_response(json, "weights.json"),
        Ok(Err(e)) => server_error(&e.to_string()),
        Err(e) => server_error(&e.to_string()),
    }
}

// ---------------------------------------------------------------------------
// POST /network/toggle-animation, /network/reset, /network/randomize
// ---------------------------------------------------------------------------

pub fn handle_toggle_animation(state: SharedState) -> Response<Cursor<Vec<u8>>> {
    let mut st = lock(&state);
    if let Err(e) = st.session.toggle_enabled() {
        st.flash = Some(FlashMessage::error(e.to_string()));
    }
    redirect("/network")
}

pub fn handle_reset(state: SharedState) -> Response<Cursor<Vec<u8>>> {
    let mut st = lock(&state);
    match st.session.with(|a| a.reset_neurons()) {
        Ok(()) => st.flash = Some(FlashMessage::success("All neurons reset to 0.50.")),
        Err(e) => st.flash = Some(FlashMessage::error(e.to_string())),
    }
    redirect("/network")
}

pub fn handle_randomize(state: SharedState) -> Response<Cursor<Vec<u8>>> {
    let mut st = lock(&state);
    match st.session.with(|a| a.randomize_weights()) {
        Ok(()) => {
            info!("weights randomized from the studio");
            st.flash = Some(FlashMessage::success("Weights randomized."));
        }
        Err(e) => st.flash = Some(FlashMessage::error(e.to_string())),
    }
    redirect("/network")
}

// ---------------------------------------------------------------------------
// POST /network/neuron
// ---------------------------------------------------------------------------

/// Toggles one neuron. Called from the page script, so it answers with a bare
/// status code; the new picture arrives over the event stream.
pub fn handle_neuron(request: &mut Request, state: SharedState) -> Response<Cursor<Vec<u8>>> {
    let mut body = String::new();
    let _ = request.as_reader().read_to_string(&mut body);
    let pairs = parse_form(&body);

    let (layer, neuron) = match parse_neuron_address(&pairs) {
        Some(address) => address,
        None => return bad_request("layer and neuron must be non-negative integers"),
    };

    let result = lock(&state).session.with(|a| a.toggle_neuron(layer, neuron));
    match result {
        Ok(_) => no_content(),
        Err(e @ NetError::IndexOutOfRange { .. }) => {
            warn!(layer, neuron, "neuron toggle rejected");
            bad_request(&e.to_string())
        }
        Err(e) => server_error(&e.to_string()),
    }
}

fn parse_neuron_address(pairs: &[(String, String)]) -> Option<(usize, usize)> {
    let layer  = form_get(pairs, "layer")?.trim().parse().ok()?;
    let neuron = form_get(pairs, "neuron")?.trim().parse().ok()?;
    Some((layer, neuron))
}
