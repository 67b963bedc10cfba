use crate::layout::{ConnectorKind, Layout};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LayoutDump {
    pub root_paths: Vec<Vec<String>>,
    pub matrix: Vec<Vec<Option<String>>>,
    pub positions: BTreeMap<String, [usize; 2]>,
    pub connectors: Vec<ConnectorDump>,
}

#[derive(Debug, Serialize)]
pub struct ConnectorDump {
    pub from: String,
    pub to: String,
    pub x1: usize,
    pub y1: usize,
    pub x2: usize,
    pub y2: usize,
    #[serde(flatten)]
    pub kind: ConnectorKindDump,
}

#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ConnectorKindDump {
    Straight,
    Curved { cx: f64, cy: f64 },
}

impl From<ConnectorKind> for ConnectorKindDump {
    fn from(kind: ConnectorKind) -> Self {
        match kind {
            ConnectorKind::Straight => Self::Straight,
            ConnectorKind::Curved { cx, cy } => Self::Curved { cx, cy },
        }
    }
}

impl LayoutDump {
    pub fn from_layout(layout: &Layout) -> Self {
        let positions = layout
            .positions
            .iter()
            .map(|(id, position)| (id.clone(), [position.x, position.y]))
            .collect();

        let connectors = layout
            .connectors
            .iter()
            .map(|connector| ConnectorDump {
                from: connector.from.clone(),
                to: connector.to.clone(),
                x1: connector.x1,
                y1: connector.y1,
                x2: connector.x2,
                y2: connector.y2,
                kind: connector.kind.into(),
            })
            .collect();

        Self {
            root_paths: layout.root_paths.clone(),
            matrix: layout.matrix.rows.clone(),
            positions,
            connectors,
        }
    }
}

pub fn write_layout_dump(path: Option<&Path>, layout: &Layout) -> anyhow::Result<()> {
    let dump = LayoutDump::from_layout(layout);
    match path {
        Some(path) => {
            let file = File::create(path)?;
            let mut writer = BufWriter::new(file);
            serde_json::to_writer_pretty(&mut writer, &dump)?;
            writer.flush()?;
        }
        None => {
            let stdout = io::stdout();
            let mut writer = stdout.lock();
            serde_json::to_writer_pretty(&mut writer, &dump)?;
            writeln!(writer)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LayoutConfig;
    use crate::diagnostics::NullSink;
    use crate::layout::layout_from_text;

    #[test]
    fn dump_uses_flat_connector_shape() {
        let layout = layout_from_text("a,b,c\na,c", &LayoutConfig::default(), &mut NullSink);
        let value = serde_json::to_value(LayoutDump::from_layout(&layout)).unwrap();

        assert_eq!(value["positions"]["B"], serde_json::json!([2, 1]));
        assert_eq!(value["rootPaths"][0], serde_json::json!(["A", "B", "C"]));
        assert_eq!(value["matrix"][1], serde_json::json!([null, null, null]));

        let connectors = value["connectors"].as_array().unwrap();
        let straight = &connectors[0];
        assert_eq!(straight["type"], "straight");
        assert!(straight.get("cx").is_none());
        let curved = &connectors[2];
        assert_eq!(curved["type"], "curved");
        assert_eq!(curved["cx"], 2.0);
        assert_eq!(curved["cy"], 1.25);
        assert_eq!(curved["x2"], 3);
    }
}
