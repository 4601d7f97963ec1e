//! Host view snapshots.
//!
//! A [`ShadowView`] is an immutable description of a mounted (or about to be
//! mounted) host view: its identity, component, geometry and property set.
//! Views are cloned freely; the property set sits behind an [`Arc`] so a clone
//! only bumps a reference count.

use std::sync::Arc;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::{SurfaceId, Tag, NO_TAG};

/// Value of a single view property.
pub type PropValue = serde_json::Value;

/// Axis-aligned frame of a view in its parent's coordinate space.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub const ZERO: Rect = Rect {
        x: 0.0,
        y: 0.0,
        width: 0.0,
        height: 0.0,
    };

    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }
}

/// Ordered property set of a view.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Props {
    values: IndexMap<String, PropValue>,
}

impl Props {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<PropValue>) -> Self {
        self.set(key, value);
        self
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<PropValue>) {
        self.values.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&PropValue> {
        self.values.get(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &PropValue)> {
        self.values.iter().map(|(key, value)| (key.as_str(), value))
    }

    pub fn number(&self, key: &str) -> Option<f64> {
        self.get(key).and_then(PropValue::as_f64)
    }

    pub fn string(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(PropValue::as_str)
    }

    /// Declared opacity; views without an explicit opacity are fully opaque.
    pub fn opacity(&self) -> f64 {
        self.number("opacity").unwrap_or(1.0)
    }

    /// Returns a copy of `self` with every entry of `overrides` applied on top.
    pub fn merged(&self, overrides: &Props) -> Props {
        let mut merged = self.clone();
        for (key, value) in &overrides.values {
            merged.values.insert(key.clone(), value.clone());
        }
        merged
    }
}

/// Partial geometry written by the animation driver for a single frame.
///
/// Absent fields keep the value of the view the update is applied to.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct FrameUpdate {
    pub x: Option<f64>,
    pub y: Option<f64>,
    pub width: Option<f64>,
    pub height: Option<f64>,
}

impl FrameUpdate {
    /// Reads `originX`, `originY`, `width` and `height` from an animation style.
    pub fn from_style(style: &Props) -> Self {
        Self {
            x: style.number("originX"),
            y: style.number("originY"),
            width: style.number("width"),
            height: style.number("height"),
        }
    }

    pub fn apply(&self, frame: &mut Rect) {
        if let Some(x) = self.x {
            frame.x = x;
        }
        if let Some(y) = self.y {
            frame.y = y;
        }
        if let Some(width) = self.width {
            frame.width = width;
        }
        if let Some(height) = self.height {
            frame.height = height;
        }
    }
}

/// Snapshot of a host view as carried by a mutation.
#[derive(Clone, Debug, PartialEq)]
pub struct ShadowView {
    pub tag: Tag,
    pub component_name: Arc<str>,
    pub surface_id: SurfaceId,
    pub frame: Rect,
    pub props: Arc<Props>,
}

impl Default for ShadowView {
    fn default() -> Self {
        Self {
            tag: NO_TAG,
            component_name: Arc::from(""),
            surface_id: 0,
            frame: Rect::ZERO,
            props: Arc::new(Props::default()),
        }
    }
}

impl ShadowView {
    pub fn new(tag: Tag, component_name: impl Into<Arc<str>>, surface_id: SurfaceId) -> Self {
        Self {
            tag,
            component_name: component_name.into(),
            surface_id,
            ..Self::default()
        }
    }

    pub fn with_frame(mut self, frame: Rect) -> Self {
        self.frame = frame;
        self
    }

    pub fn with_props(mut self, props: Props) -> Self {
        self.props = Arc::new(props);
        self
    }

    pub fn with_prop(mut self, key: impl Into<String>, value: impl Into<PropValue>) -> Self {
        Arc::make_mut(&mut self.props).set(key, value);
        self
    }
}

#[cfg(test)]
#[path = "tests/view_tests.rs"]
mod tests;
