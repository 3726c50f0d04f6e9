use std::ops::RangeInclusive;

use lamina_engine::coords::{Rect, Vec2};

use crate::painter::{Layer, Painter};
use crate::widgets::slider;
use crate::{FrameInput, Id, Style};

/// What happened to a widget this frame.
#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct Response {
    /// The bound value was modified this frame.
    pub changed: bool,
    /// The pointer is over the widget.
    pub hovered: bool,
    /// The widget holds the pointer (being dragged).
    pub active: bool,
    /// Interactive area of the widget (label excluded).
    pub rect: Rect,
}

/// Lays out widgets top to bottom inside a window.
pub struct Ui<'a> {
    pub(crate) painter: Painter<'a>,
    pub(crate) style: &'a Style,
    pub(crate) input: &'a FrameInput,
    pub(crate) active: &'a mut Option<Id>,
    pub(crate) id: Id,
    /// Top-left of the next widget.
    pub(crate) cursor: Vec2,
    pub(crate) width: f32,
}

impl Ui<'_> {
    /// Reserves a full-width row of `height` and advances the cursor.
    fn allocate_row(&mut self, height: f32) -> Rect {
        let row = Rect::new(self.cursor.x, self.cursor.y, self.width, height);
        self.cursor.y += height + self.style.item_spacing;
        row
    }

    /// Claims the pointer for `id` when pressed over `rect`; returns whether
    /// `id` holds it now.
    fn interact(&mut self, id: Id, rect: Rect) -> (bool, bool) {
        let hovered = self.input.hovers(rect);
        if self.input.primary_pressed && hovered && self.active.is_none() {
            *self.active = Some(id);
        }
        (hovered, *self.active == Some(id))
    }

    /// Three side-by-side sliders editing `values` within `range`, followed
    /// by `label`.
    ///
    /// Pressing a component captures it; while the button stays down its
    /// value follows the pointer horizontally, clamped to `range`.
    pub fn slider_float3(
        &mut self,
        label: &str,
        values: &mut [f32; 3],
        range: RangeInclusive<f32>,
    ) -> Response {
        let style = self.style;
        let row = self.allocate_row(style.item_height);

        let label_w = self.painter.text_size(label).x;
        let area_w = (row.size.x - label_w - style.item_spacing).max(0.0);
        let area = Rect::new(row.origin.x, row.origin.y, area_w, row.size.y);

        let mut response = Response { rect: area, ..Response::default() };

        for (i, frame) in slider::split3(area, style.item_spacing).into_iter().enumerate() {
            let id = self.id.with((label, i));
            let (hovered, active) = self.interact(id, frame);
            response.hovered |= hovered;
            response.active |= active;

            if active {
                if let Some(p) = self.input.pointer {
                    let v = slider::value_at(p.x, frame, style.grab_width, &range);
                    if v != values[i] {
                        values[i] = v;
                        response.changed = true;
                    }
                }
            }

            let bg = if active {
                style.frame_bg_active
            } else if hovered {
                style.frame_bg_hovered
            } else {
                style.frame_bg
            };
            self.painter.fill_rect(Layer::Frame, frame, bg);

            let grab = slider::grab_rect(values[i], frame, style.grab_width, &range);
            let grab_color = if active { style.grab_active } else { style.grab };
            self.painter.fill_rect(Layer::Grab, grab, grab_color);

            self.painter.push_clip(frame);
            self.painter.text_centered(frame, &format!("{:.3}", values[i]), style.text);
            self.painter.pop_clip();
        }

        let label_rect = Rect::new(
            area.max().x + style.item_spacing,
            row.origin.y,
            label_w,
            row.size.y,
        );
        self.painter.text_left(label_rect, 0.0, label, style.text);

        if response.changed {
            log::trace!("{label} -> {values:?}");
        }
        response
    }
}
