use transit_core::{Props, ShadowView, Tag};

/// In-flight animation tracked for one view.
#[derive(Clone, Debug, PartialEq)]
pub struct LayoutAnimation {
    /// View the animation settles on.
    pub final_view: ShadowView,
    /// Last view handed to the mounting layer for this tag.
    pub current_view: ShadowView,
    pub parent_tag: Tag,
    /// Declared opacity of an entering view, restored on its first frame.
    pub opacity: Option<f64>,
    /// Number of overlapping triggers that have not ended yet.
    pub count: u32,
}

impl LayoutAnimation {
    pub fn new(final_view: ShadowView, current_view: ShadowView, parent_tag: Tag) -> Self {
        Self {
            final_view,
            current_view,
            parent_tag,
            opacity: None,
            count: 1,
        }
    }

    pub fn with_opacity(mut self, opacity: f64) -> Self {
        self.opacity = Some(opacity);
        self
    }

    /// Writes the saved opacity into `style` unless the style already sets
    /// one. The saved value is consumed once written.
    pub fn restore_opacity(&mut self, style: &mut Props) {
        if style.contains("opacity") {
            return;
        }
        if let Some(opacity) = self.opacity.take() {
            style.set("opacity", opacity);
        }
    }
}
