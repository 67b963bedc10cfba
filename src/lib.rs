//! Turn lists of directed node connections into a grid layout with straight
//! or curved connectors.
//!
//! The pipeline is [`parser`] → [`layout::enumerate_paths`] →
//! [`layout::place_paths`] → [`layout::route_connectors`]; the [`render`] and
//! [`layout_dump`] modules turn the result into SVG, PNG or JSON.

#[cfg(feature = "cli")]
pub mod cli;
pub mod config;
pub mod diagnostics;
pub mod ir;
pub mod layout;
pub mod layout_dump;
pub mod parser;
pub mod render;
pub mod theme;

#[cfg(feature = "cli")]
pub use cli::run;
pub use config::{Config, LayoutConfig, RenderConfig, load_config};
pub use diagnostics::{Diagnostic, DiagnosticSink, NullSink, TracingSink};
pub use ir::{Connection, Graph, NodeId};
pub use layout::{Layout, compute_layout, layout_from_text};
pub use parser::{parse_connections, parse_input};
pub use render::render_svg;
pub use theme::Theme;
