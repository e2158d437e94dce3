//! Generic content blocks that make up a conversation story.

use serde::{Deserialize, Serialize};

/// Canvas position of a block in the story editor.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BlockPosition {
    pub x: f64,
    pub y: f64,
}

/// Fields shared by every block in a story.
///
/// Specialised blocks (e.g. [`AssessmentQuestion`](crate::assessment::AssessmentQuestion))
/// embed this with `#[serde(flatten)]` so the wire shape stays flat.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoryBlock {
    pub id: String,
    /// Block kind as understood by the story editor.
    #[serde(rename = "type")]
    pub block_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<BlockPosition>,
}
