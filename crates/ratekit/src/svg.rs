use crate::animator::{Frame, PULSE_SCALE};
use crate::band::to_hex;
use crate::geometry::{BACKGROUND_COLOR, Point, Sector, ring_radius};
use palette::Srgba;

fn rgba(color: Srgba<f64>) -> String {
    let (r, g, b, a) = color.into_components();
    format!(
        "rgba({},{},{},{})",
        (r * 255.0).round() as u8,
        (g * 255.0).round() as u8,
        (b * 255.0).round() as u8,
        a
    )
}

/// Standalone SVG document of one frame in a `size`×`size` box.
pub fn render(frame: &Frame, size: f64) -> String {
    let c = size / 2.0;
    let center = Point::new(c, c);
    let radius = ring_radius(size);

    let mut out = format!(
        "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{size}\" height=\"{size}\" viewBox=\"0 0 {size} {size}\">\n"
    );
    out.push_str(&format!(
        "  <circle cx=\"{c}\" cy=\"{c}\" r=\"{radius}\" fill=\"{}\"/>\n",
        to_hex(BACKGROUND_COLOR)
    ));

    for layer in &frame.layers {
        let Some(shape) = layer.sector(center, radius) else {
            continue;
        };
        let fill = to_hex(layer.color);

        match layer.rotation_degrees.filter(|deg| *deg != 0.0) {
            Some(deg) => out.push_str(&format!("  <g transform=\"rotate({deg:.3} {c} {c})\">\n")),
            None => out.push_str("  <g>\n"),
        }
        let element = match shape {
            Sector::Disc { .. } => {
                format!("    <circle cx=\"{c}\" cy=\"{c}\" r=\"{radius}\" fill=\"{fill}\"/>\n")
            }
            Sector::Slice { .. } => {
                format!("    <path d=\"{}\" fill=\"{fill}\"/>\n", shape.svg_path())
            }
        };
        out.push_str(&element);
        out.push_str("  </g>\n");
    }

    let shadow = frame.contrast.shadow.shadow();
    let scale = if frame.pulse { PULSE_SCALE } else { 1.0 };
    out.push_str(&format!(
        "  <text x=\"{c}\" y=\"{c}\" text-anchor=\"middle\" dominant-baseline=\"central\" font-weight=\"800\" font-size=\"{:.1}\" fill=\"{}\" stroke=\"{}\" stroke-width=\"0.8\" style=\"filter: drop-shadow({o}px {o}px {}px rgba(0,0,0,{}))\">{}</text>\n",
        size * 0.22 * scale,
        frame.band.hex(),
        rgba(frame.contrast.outline),
        shadow.blur,
        shadow.alpha,
        frame.rating,
        o = shadow.offset,
    ));
    out.push_str("</svg>\n");
    out
}
