use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;
use tracing::debug;

use super::{EdgeAttributes, EdgeSource};
use crate::error::{ModelError, Result};

#[derive(Debug, Deserialize)]
struct NetXml {
    #[serde(rename = "edge", default)]
    edges: Vec<EdgeXml>,
}

#[derive(Debug, Deserialize)]
struct EdgeXml {
    #[serde(rename = "@id")]
    id: String,
    #[serde(rename = "@function", default)]
    function: Option<String>,
    #[serde(rename = "lane", default)]
    lanes: Vec<LaneXml>,
}

#[derive(Debug, Deserialize)]
struct LaneXml {
    #[serde(rename = "@speed")]
    speed: f64,
    #[serde(rename = "@length")]
    length: f64,
}

/// Edge attributes read from a SUMO network (`.net.xml`).
///
/// Lane count is the number of `<lane>` children of an `<edge>`; length and
/// speed limit are those of the last lane listed. Only `normal` and
/// `connector` edges are kept; `internal`, `crossing` and `walkingarea` edges
/// are left out.
#[derive(Debug, Default)]
pub struct SumoNetwork {
    edges: HashMap<String, EdgeAttributes>,
}

impl SumoNetwork {
    /// Reads and parses the network file at `path`.
    #[tracing::instrument(skip_all, fields(path = %path.display()))]
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_xml(&content).map_err(|e| match e {
            ModelError::Data(msg) => ModelError::data(format!("{}: {msg}", path.display())),
            other => other,
        })
    }

    pub fn from_xml(xml: &str) -> Result<Self> {
        let net: NetXml = quick_xml::de::from_str(xml)
            .map_err(|e| ModelError::data(format!("malformed network description: {e}")))?;

        let edges: HashMap<_, _> = net
            .edges
            .into_iter()
            .filter(|e| matches!(e.function.as_deref(), None | Some("" | "normal" | "connector")))
            .map(|e| {
                let (length, max_speed) = e
                    .lanes
                    .last()
                    .map(|l| (l.length, l.speed))
                    .unwrap_or((0.0, 0.0));
                let attrs = EdgeAttributes::new(e.id.clone(), length, max_speed, e.lanes.len() as u32);
                (e.id, attrs)
            })
            .collect();

        debug!(edges = edges.len(), "Network edges loaded");
        Ok(Self { edges })
    }

    pub fn len(&self) -> usize {
        self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }
}

impl EdgeSource for SumoNetwork {
    fn edge(&self, edge_id: &str) -> Result<&EdgeAttributes> {
        self.edges.edge(edge_id)
    }
}
