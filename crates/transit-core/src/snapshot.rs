//! Geometry payload handed to the animation manager when an animation starts.

use serde::Serialize;

use crate::view::ShadowView;

/// Size of the window hosting a surface.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct WindowSize {
    pub width: f64,
    pub height: f64,
}

impl WindowSize {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

/// Geometry of one view relative to its window.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ViewSnapshot {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub window_width: f64,
    pub window_height: f64,
}

impl ViewSnapshot {
    pub fn new(view: &ShadowView, window: WindowSize) -> Self {
        Self {
            x: view.frame.x,
            y: view.frame.y,
            width: view.frame.width,
            height: view.frame.height,
            window_width: window.width,
            window_height: window.height,
        }
    }
}

/// Named geometry fields passed to
/// [`start_layout_animation`](crate::LayoutAnimationsManager::start_layout_animation).
///
/// Every field is always present. Entering animations only fill the target
/// side, exiting animations only the current side; the other side stays zero.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GeometrySnapshot {
    pub current_origin_x: f64,
    pub current_origin_y: f64,
    pub current_global_origin_x: f64,
    pub current_global_origin_y: f64,
    pub current_width: f64,
    pub current_height: f64,
    pub target_origin_x: f64,
    pub target_origin_y: f64,
    pub target_global_origin_x: f64,
    pub target_global_origin_y: f64,
    pub target_width: f64,
    pub target_height: f64,
    pub window_width: f64,
    pub window_height: f64,
}

impl GeometrySnapshot {
    pub fn entering(target: ViewSnapshot) -> Self {
        Self::default().with_target(target)
    }

    pub fn exiting(current: ViewSnapshot) -> Self {
        Self::default().with_current(current)
    }

    pub fn layout(current: ViewSnapshot, target: ViewSnapshot) -> Self {
        Self::default().with_current(current).with_target(target)
    }

    fn with_current(mut self, current: ViewSnapshot) -> Self {
        self.current_origin_x = current.x;
        self.current_origin_y = current.y;
        self.current_global_origin_x = current.x;
        self.current_global_origin_y = current.y;
        self.current_width = current.width;
        self.current_height = current.height;
        self.window_width = current.window_width;
        self.window_height = current.window_height;
        self
    }

    fn with_target(mut self, target: ViewSnapshot) -> Self {
        self.target_origin_x = target.x;
        self.target_origin_y = target.y;
        self.target_global_origin_x = target.x;
        self.target_global_origin_y = target.y;
        self.target_width = target.width;
        self.target_height = target.height;
        self.window_width = target.window_width;
        self.window_height = target.window_height;
        self
    }

    /// Payload as a JSON object keyed by the camel-cased field names.
    pub fn to_json(&self) -> serde_json::Result<serde_json::Value> {
        serde_json::to_value(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::view::Rect;

    fn view() -> ShadowView {
        ShadowView::new(3, "View", 1).with_frame(Rect::new(10.0, 20.0, 100.0, 50.0))
    }

    #[test]
    fn entering_fills_target_side_only() {
        let window = WindowSize::new(400.0, 800.0);
        let values = GeometrySnapshot::entering(ViewSnapshot::new(&view(), window));
        assert_eq!(values.target_origin_x, 10.0);
        assert_eq!(values.target_global_origin_y, 20.0);
        assert_eq!(values.target_width, 100.0);
        assert_eq!(values.current_width, 0.0);
        assert_eq!(values.window_height, 800.0);
    }

    #[test]
    fn layout_fills_both_sides() {
        let window = WindowSize::new(400.0, 800.0);
        let moved = view().with_frame(Rect::new(0.0, 0.0, 30.0, 30.0));
        let values = GeometrySnapshot::layout(
            ViewSnapshot::new(&view(), window),
            ViewSnapshot::new(&moved, window),
        );
        assert_eq!(values.current_origin_x, 10.0);
        assert_eq!(values.target_width, 30.0);
        assert_eq!(values.window_width, 400.0);
    }

    #[test]
    fn json_payload_carries_every_field() {
        let json = GeometrySnapshot::exiting(ViewSnapshot::new(&view(), WindowSize::default()))
            .to_json()
            .expect("serializable");
        let object = json.as_object().expect("payload is an object");
        assert_eq!(object.len(), 14);
        assert_eq!(object["currentHeight"], serde_json::json!(50.0));
        assert_eq!(object["targetHeight"], serde_json::json!(0.0));
    }
}
