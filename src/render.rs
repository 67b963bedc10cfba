use crate::config::RenderConfig;
use crate::layout::{Connector, ConnectorKind, Layout};
use crate::theme::Theme;
use anyhow::Result;
use std::path::Path;

const CHAR_WIDTH_RATIO: f32 = 0.6;
const NODE_MARGIN: f32 = 8.0;

struct Geometry<'a> {
    config: &'a RenderConfig,
    node_half_width: f32,
    node_half_height: f32,
}

impl Geometry<'_> {
    /// Grid coordinates (1-indexed, possibly fractional) to pixel centre.
    fn to_px(&self, x: f64, y: f64) -> (f32, f32) {
        (
            (x as f32 - 0.5) * self.config.cell_width,
            (y as f32 - 0.5) * self.config.cell_height,
        )
    }

    /// Pull `target` back from a node centre to its box edge along the line
    /// coming from `toward`.
    fn clip(&self, target: (f32, f32), toward: (f32, f32)) -> (f32, f32) {
        let dx = toward.0 - target.0;
        let dy = toward.1 - target.1;
        if dx.abs() < f32::EPSILON && dy.abs() < f32::EPSILON {
            return target;
        }
        let tx = if dx.abs() > f32::EPSILON {
            self.node_half_width / dx.abs()
        } else {
            f32::INFINITY
        };
        let ty = if dy.abs() > f32::EPSILON {
            self.node_half_height / dy.abs()
        } else {
            f32::INFINITY
        };
        let t = tx.min(ty).min(1.0);
        (target.0 + dx * t, target.1 + dy * t)
    }
}

fn label_width(label: &str, theme: &Theme) -> f32 {
    label.chars().count() as f32 * theme.font_size * CHAR_WIDTH_RATIO
}

pub fn render_svg(layout: &Layout, theme: &Theme, config: &RenderConfig) -> String {
    let widest_label = layout
        .positions
        .keys()
        .map(|id| label_width(id, theme))
        .fold(0.0f32, f32::max);
    let node_width = (widest_label + config.node_padding_x * 2.0)
        .min(config.cell_width - NODE_MARGIN)
        .max(config.node_height);
    let geometry = Geometry {
        config,
        node_half_width: node_width / 2.0,
        node_half_height: config.node_height / 2.0,
    };

    let max_curve_row = layout
        .connectors
        .iter()
        .filter_map(|connector| match connector.kind {
            ConnectorKind::Curved { cy, .. } => Some(cy as f32),
            ConnectorKind::Straight => None,
        })
        .fold(0.0f32, f32::max);
    let rows = (layout.matrix.height() as f32).max(max_curve_row.ceil());
    let width = (layout.matrix.width() as f32 * config.cell_width).max(200.0);
    let height = (rows * config.cell_height).max(200.0);

    let mut svg = String::new();
    svg.push_str(&format!(
        "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{width}\" height=\"{height}\" viewBox=\"0 0 {width} {height}\">"
    ));
    svg.push_str(&format!(
        "<rect width=\"100%\" height=\"100%\" fill=\"{}\"/>",
        config.background
    ));
    svg.push_str("<defs>");
    svg.push_str(&format!(
        "<marker id=\"arrow\" viewBox=\"0 0 10 10\" refX=\"10\" refY=\"5\" markerWidth=\"6\" markerHeight=\"6\" orient=\"auto-start-reverse\"><path d=\"M 0 0 L 10 5 L 0 10 z\" fill=\"{}\"/></marker>",
        theme.line_color
    ));
    svg.push_str("</defs>");

    for connector in &layout.connectors {
        let (d, color) = connector_path(connector, &geometry, theme);
        svg.push_str(&format!(
            "<path d=\"{d}\" fill=\"none\" stroke=\"{color}\" stroke-width=\"1.4\" marker-end=\"url(#arrow)\"/>"
        ));
    }

    for (id, position) in &layout.positions {
        let (cx, cy) = geometry.to_px(position.x as f64, position.y as f64);
        svg.push_str(&format!(
            "<rect x=\"{:.2}\" y=\"{:.2}\" width=\"{:.2}\" height=\"{:.2}\" rx=\"10\" ry=\"10\" fill=\"{}\" stroke=\"{}\" stroke-width=\"1.4\"/>",
            cx - geometry.node_half_width,
            cy - geometry.node_half_height,
            node_width,
            config.node_height,
            theme.node_fill,
            theme.node_border
        ));
        svg.push_str(&format!(
            "<text x=\"{cx:.2}\" y=\"{cy:.2}\" text-anchor=\"middle\" dominant-baseline=\"central\" font-family=\"{}\" font-size=\"{}\" fill=\"{}\">{}</text>",
            escape_xml(&theme.font_family),
            theme.font_size,
            theme.node_text_color,
            escape_xml(id)
        ));
    }

    svg.push_str("</svg>");
    svg
}

fn connector_path(connector: &Connector, geometry: &Geometry<'_>, theme: &Theme) -> (String, String) {
    let start = geometry.to_px(connector.x1 as f64, connector.y1 as f64);
    let end = geometry.to_px(connector.x2 as f64, connector.y2 as f64);
    match connector.kind {
        ConnectorKind::Straight => {
            let from = geometry.clip(start, end);
            let to = geometry.clip(end, start);
            (
                format!("M {:.2} {:.2} L {:.2} {:.2}", from.0, from.1, to.0, to.1),
                theme.line_color.clone(),
            )
        }
        ConnectorKind::Curved { cx, cy } => {
            let control = geometry.to_px(cx, cy);
            let from = geometry.clip(start, control);
            let to = geometry.clip(end, control);
            (
                format!(
                    "M {:.2} {:.2} Q {:.2} {:.2} {:.2} {:.2}",
                    from.0, from.1, control.0, control.1, to.0, to.1
                ),
                theme.curve_color.clone(),
            )
        }
    }
}

pub fn write_output_svg(svg: &str, output: Option<&Path>) -> Result<()> {
    match output {
        Some(path) => {
            std::fs::write(path, svg)?;
        }
        None => {
            print!("{}", svg);
        }
    }
    Ok(())
}

#[cfg(feature = "png")]
pub fn write_output_png(
    svg: &str,
    output: &Path,
    render_cfg: &RenderConfig,
    theme: &Theme,
) -> Result<()> {
    let mut opt = usvg::Options::default();
    opt.font_family = theme
        .font_family
        .split(',')
        .next()
        .map(|family| family.trim().trim_matches('"').to_string())
        .unwrap_or_else(|| "Inter".to_string());
    opt.default_size = usvg::Size::from_wh(render_cfg.width, render_cfg.height)
        .or_else(|| usvg::Size::from_wh(800.0, 600.0))
        .ok_or_else(|| anyhow::anyhow!("Invalid render size"))?;
    opt.fontdb_mut().load_system_fonts();

    let tree = usvg::Tree::from_str(svg, &opt)?;
    let size = tree.size().to_int_size();
    let mut pixmap = resvg::tiny_skia::Pixmap::new(size.width(), size.height())
        .ok_or_else(|| anyhow::anyhow!("Failed to allocate pixmap"))?;

    let mut pixmap_mut = pixmap.as_mut();
    resvg::render(&tree, resvg::tiny_skia::Transform::default(), &mut pixmap_mut);
    pixmap.save_png(output)?;
    Ok(())
}

fn escape_xml(input: &str) -> String {
    input
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}
