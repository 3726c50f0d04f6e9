use lamina_engine::coords::{Rect, Vec2};
use lamina_engine::paint::Color;
use lamina_engine::scene::{DrawList, ZIndex};
use lamina_engine::text::{FontId, FontSystem};

/// Paint layers inside one window, back to front.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd)]
pub(crate) enum Layer {
    Panel = 0,
    Frame = 1,
    Grab = 2,
    Text = 3,
}

impl Layer {
    pub(crate) const COUNT: i32 = 4;
}

/// Thin wrapper over the engine `DrawList` for one window.
///
/// Every window gets its own z range so later windows paint over earlier
/// ones regardless of the order primitives are recorded in.
pub(crate) struct Painter<'a> {
    draw_list: &'a mut DrawList,
    fonts: &'a FontSystem,
    font: Option<FontId>,
    font_size: f32,
    z_base: i32,
}

impl<'a> Painter<'a> {
    pub(crate) fn new(
        draw_list: &'a mut DrawList,
        fonts: &'a FontSystem,
        font: Option<FontId>,
        font_size: f32,
        window_index: i32,
    ) -> Self {
        Self {
            draw_list,
            fonts,
            font,
            font_size,
            z_base: window_index * Layer::COUNT,
        }
    }

    #[inline]
    fn z(&self, layer: Layer) -> ZIndex {
        ZIndex::new(self.z_base + layer as i32)
    }

    pub(crate) fn fill_rect(&mut self, layer: Layer, rect: Rect, color: Color) {
        let z = self.z(layer);
        self.draw_list.push_rect(z, rect, color);
    }

    /// Size of `text` at the GUI font size. Without a font, glyphs are
    /// assumed to be about half as wide as they are tall.
    pub(crate) fn text_size(&self, text: &str) -> Vec2 {
        match self.font {
            Some(font) => self.fonts.measure_text(text, font, self.font_size),
            None => Vec2::new(text.chars().count() as f32 * self.font_size * 0.5, self.font_size),
        }
    }

    /// Records `text` with its top-left at `origin`. No-op without a font.
    pub(crate) fn text(&mut self, origin: Vec2, text: &str, color: Color) {
        let Some(font) = self.font else { return };
        let z = self.z(Layer::Text);
        self.draw_list.push_text(z, text, font, self.font_size, color, origin);
    }

    /// Text vertically centered in `rect`, starting `inset` from its left.
    pub(crate) fn text_left(&mut self, rect: Rect, inset: f32, text: &str, color: Color) {
        let size = self.text_size(text);
        let origin = Vec2::new(rect.origin.x + inset, rect.origin.y + (rect.size.y - size.y) * 0.5);
        self.text(origin, text, color);
    }

    /// Text centered in `rect`.
    pub(crate) fn text_centered(&mut self, rect: Rect, text: &str, color: Color) {
        let size = self.text_size(text);
        let origin = rect.center() - size * 0.5;
        self.text(origin, text, color);
    }

    pub(crate) fn push_clip(&mut self, rect: Rect) {
        self.draw_list.push_clip(rect);
    }

    pub(crate) fn pop_clip(&mut self) {
        self.draw_list.pop_clip();
    }
}
