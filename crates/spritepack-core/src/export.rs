use crate::model::Layout;
use serde_json::{Value, json};

/// Serialize the layout as `{ frames: [...], meta }`, one entry per sprite in placement order.
pub fn to_json_array<K: ToString>(layout: &Layout<K>) -> Value {
    let frames: Vec<Value> = layout
        .placements
        .iter()
        .map(|p| {
            json!({
                "key": p.key.to_string(),
                "frame": {"x": p.x, "y": p.y, "w": p.w, "h": p.h},
                "depth": p.depth,
            })
        })
        .collect();
    json!({ "frames": frames, "meta": &layout.meta })
}

/// Frames keyed by name: `{ frames: { name: { frame, depth } }, meta }`.
/// Later duplicates of a key overwrite earlier ones.
pub fn to_json_hash<K: ToString>(layout: &Layout<K>) -> Value {
    let mut frames = serde_json::Map::new();
    for p in &layout.placements {
        frames.insert(
            p.key.to_string(),
            json!({
                "frame": {"x": p.x, "y": p.y, "w": p.w, "h": p.h},
                "depth": p.depth,
            }),
        );
    }
    json!({ "frames": frames, "meta": &layout.meta })
}
