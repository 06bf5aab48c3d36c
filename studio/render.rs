/// Central template renderer for the netpulse studio.
///
/// The studio uses a single HTML template (`studio/assets/studio.html`) with
/// placeholder tokens like `{{TOKEN}}`.  This module loads the template at
/// compile time and exposes `render_page`, which takes a closure for the
/// page-specific substitutions.
///
/// `{{ACTIVE_TAB}}` and `{{FLASH}}` are resolved here; anything the closure
/// leaves behind is blanked.

use crate::state::{FlashKind, FlashMessage};

const TEMPLATE: &str = include_str!("assets/studio.html");

/// Which page is active. Drives the active tab CSS class and the JS
/// `ACTIVE_TAB` variable.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Page {
    Network    = 0,
    Classifier = 1,
}

pub fn render_page<F>(page: Page, flash: Option<&FlashMessage>, fill: F) -> String
where
    F: FnOnce(String) -> String,
{
    let mut html = TEMPLATE.to_owned();

    html = html.replace("{{ACTIVE_TAB}}", &(page as u8).to_string());
    html = html.replace("{{FLASH}}", &render_flash_html(flash));

    html = fill(html);

    blank_remaining(html)
}

/// Replaces any `{{TOKEN}}` that wasn't already substituted with an empty
/// string.
fn blank_remaining(mut html: String) -> String {
    while let Some(start) = html.find("{{") {
        if let Some(end) = html[start..].find("}}") {
            let abs_end = start + end + 2;
            html.replace_range(start..abs_end, "");
        } else {
            break;
        }
    }
    html
}

pub fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
     .replace('<', "&lt;")
     .replace('>', "&gt;")
     .replace('"', "&quot;")
}

pub fn render_flash_html(flash: Option<&FlashMessage>) -> String {
    match flash {
        None => String::new(),
        Some(f) => {
            let class = match f.kind {
                FlashKind::Success => "flash flash-success",
                FlashKind::Error   => "flash flash-error",
            };
            format!(r#"<div class="{}">{}</div>"#, class, html_escape(&f.text))
        }
    }
}
