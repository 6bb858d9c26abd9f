use serde::{Deserialize, Serialize};

/// Raw click position on the floor plan, image-top-origin pixels.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct ClickPoint {
    pub x: f64,
    pub y: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Placement {
    pub sensor: String,
    pub x: f64,
    pub y: f64,
}
