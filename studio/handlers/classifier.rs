use std::io::Cursor;
use tiny_http::{Request, Response};
use tracing::{info, warn};

use netpulse::Prediction;

use crate::render::{html_escape, render_page, Page};
use crate::routes::redirect;
use crate::state::{lock, FlashMessage, SharedState};
use crate::util::multipart::{extract_boundary, extract_file};

// ---------------------------------------------------------------------------
// GET /classifier
// ---------------------------------------------------------------------------

pub fn handle_get(state: SharedState) -> Response<Cursor<Vec<u8>>> {
    let mut st = lock(&state);
    let flash      = st.take_flash();
    let prediction = st.prediction.clone();
    drop(st);

    let page = render_page(Page::Classifier, flash.as_ref(), |tmpl| {
        tmpl.replace("{{CLASSIFIER_RESULT}}", &result_html(prediction.as_ref()))
    });
    crate::routes::html_response(page)
}

fn result_html(prediction: Option<&Prediction>) -> String {
    match prediction {
        None => String::new(),
        Some(p) => format!(
            r#"<div class="result">
  <h3>Prediction Result</h3>
  <p class="result-label">This image is a <strong>{label}</strong></p>
  <p class="hint">Confidence: {confidence:.2}% &middot; image size {w}x{h}</p>
  <form method="POST" action="/classifier/reset"><button type="submit" class="btn btn-outline">Clear</button></form>
</div>"#,
            label      = html_escape(&p.label.to_string()),
            confidence = p.confidence,
            w          = p.width,
            h          = p.height,
        ),
    }
}

// ---------------------------------------------------------------------------
// POST /classifier/predict
// ---------------------------------------------------------------------------

pub fn handle_predict(request: &mut Request, state: SharedState) -> Response<Cursor<Vec<u8>>> {
    let content_type = request.headers().iter()
        .find(|h| h.field.equiv("Content-Type"))
        .map(|h| h.value.as_str().to_owned())
        .unwrap_or_default();

    let upload = match extract_boundary(&content_type) {
        Some(boundary) if content_type.starts_with("multipart/form-data") => {
            let mut body_bytes: Vec<u8> = Vec::new();
            let _ = request.as_reader().read_to_end(&mut body_bytes);
            extract_file(&body_bytes, &boundary, "image")
        }
        _ => None,
    };
    if let Some(part) = &upload {
        info!(filename = %part.filename, bytes = part.data.len(), "classifying upload");
    }

    // The classifier sleeps to mimic a round trip, so only its own lock is
    // held while it runs.
    let classifier = lock(&state).classifier.clone();
    let result = {
        let mut c = classifier.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
        c.classify(upload.as_ref().map(|part| part.data.as_slice()))
    };

    let mut st = lock(&state);
    match result {
        Ok(prediction) => {
            st.prediction = Some(prediction);
        }
        Err(e) => {
            warn!(error = %e, "classification failed");
            st.prediction = None;
            st.flash = Some(FlashMessage::error(e.to_string()));
        }
    }
    redirect("/classifier")
}

// ---------------------------------------------------------------------------
// POST /classifier/reset
// ---------------------------------------------------------------------------

pub fn handle_reset(state: SharedState) -> Response<Cursor<Vec<u8>>> {
    lock(&state).prediction = None;
    redirect("/classifier")
}
