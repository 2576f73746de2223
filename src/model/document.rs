//! Serialized form of a model.
//!
//! The same tree is used for import/export files and for history snapshots.
//! Transient interaction flags are never part of it.

use serde::{Deserialize, Serialize};

use crate::math::Point3;

/// Top-level model document.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct ModelDoc {
    /// Display name of the model.
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub vertices: Vec<VertexDoc>,
    #[serde(default)]
    pub edges: Vec<EdgeDoc>,
    #[serde(default)]
    pub surfaces: Vec<SurfaceDoc>,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct VertexDoc {
    pub id: String,
    pub position: PositionDoc,
    #[serde(default)]
    pub hidden: bool,
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq)]
pub struct PositionDoc {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl From<Point3> for PositionDoc {
    fn from(p: Point3) -> Self {
        Self {
            x: p.x,
            y: p.y,
            z: p.z,
        }
    }
}

impl From<PositionDoc> for Point3 {
    fn from(p: PositionDoc) -> Self {
        Point3::new(p.x, p.y, p.z)
    }
}

/// Edge endpoints are vertex ids.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct EdgeDoc {
    pub id: String,
    pub a: String,
    pub b: String,
}

/// Surface boundary as vertex ids in winding order.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct SurfaceDoc {
    pub id: String,
    pub vertices: Vec<String>,
}

impl ModelDoc {
    /// Parses a document from JSON text.
    ///
    /// # Errors
    ///
    /// Returns a JSON error if the text is not a valid model document.
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }

    /// Renders the document as pretty-printed JSON.
    ///
    /// # Errors
    ///
    /// Returns a JSON error if serialization fails.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}
