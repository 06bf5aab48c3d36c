use std::fmt::Write;

use netpulse::AnimatorSnapshot;

// Diagram geometry.
const LAYER_SPACING: f64 = 220.0;
const CENTER_Y:      f64 = 250.0;
const NEURON_GAP:    f64 = 60.0;
const MAX_RADIUS:    f64 = 16.0;
const LABEL_OFFSET:  f64 = 32.0;

const POSITIVE_STROKE: &str = "rgba(59, 130, 246, 0.5)";
const NEGATIVE_STROKE: &str = "rgba(239, 68, 68, 0.5)";

pub fn neuron_x(layer: usize) -> f64 {
    (layer as f64 + 1.0) * LAYER_SPACING
}

pub fn neuron_y(layer_size: usize, neuron: usize) -> f64 {
    CENTER_Y + (neuron as f64 - (layer_size as f64 - 1.0) / 2.0) * NEURON_GAP
}

/// Renders the whole diagram. Connections are drawn first so neurons sit on
/// top of them.
pub fn render_network(snapshot: &AnimatorSnapshot) -> String {
    let mut svg = String::with_capacity(16 * 1024);
    svg.push_str(r#"<svg id="network-svg" viewBox="0 0 1200 500" xmlns="http://www.w3.org/2000/svg">"#);

    for (k, matrix) in snapshot.weights.iter().enumerate() {
        let pulsing = snapshot.enabled && snapshot.cursor == k;
        let class = if pulsing { " class=\"animate-pulse\"" } else { "" };
        let (start_x, end_x) = (neuron_x(k), neuron_x(k + 1));
        let ctrl_x1 = start_x + (end_x - start_x) * 0.4;
        let ctrl_x2 = start_x + (end_x - start_x) * 0.6;

        for (i, row) in matrix.data.iter().enumerate() {
            let start_y = neuron_y(matrix.rows, i);
            for (j, &weight) in row.iter().enumerate() {
                let end_y = neuron_y(matrix.cols, j);
                let stroke = if weight > 0.0 { POSITIVE_STROKE } else { NEGATIVE_STROKE };
                let _ = write!(
                    svg,
                    r#"<path d="M {sx} {sy} C {c1} {sy}, {c2} {ey}, {ex} {ey}" stroke="{stroke}" stroke-width="{w:.3}" fill="none"{class}/>"#,
                    sx = start_x, sy = start_y, c1 = ctrl_x1, c2 = ctrl_x2,
                    ex = end_x, ey = end_y, w = weight.abs() * 2.5,
                );
            }
        }
    }

    for (layer, values) in snapshot.activations.iter().enumerate() {
        let x = neuron_x(layer);
        for (i, &activation) in values.iter().enumerate() {
            let y = neuron_y(values.len(), i);
            let _ = write!(
                svg,
                concat!(
                    r#"<g class="neuron" data-layer="{layer}" data-neuron="{i}">"#,
                    r#"<circle cx="{x}" cy="{y}" r="{outer}" fill="white" stroke="gray" stroke-width="2"/>"#,
                    r#"<circle cx="{x}" cy="{y}" r="{inner:.3}" fill="rgb(59, 130, 246)"/>"#,
                    r#"<text x="{x}" y="{ty}" text-anchor="middle" class="neuron-label">{a:.2}</text>"#,
                    "</g>"
                ),
                layer = layer, i = i, x = x, y = y, outer = MAX_RADIUS,
                inner = MAX_RADIUS * activation, ty = y + LABEL_OFFSET, a = activation,
            );
        }
    }

    svg.push_str("</svg>");
    svg
}
