use std::collections::HashMap;

use lamina_engine::coords::{Rect, Vec2, Viewport};
use lamina_engine::scene::DrawList;
use lamina_engine::text::{FontId, FontSystem, SYSTEM_FONT_CANDIDATES};

use crate::painter::{Layer, Painter};
use crate::{FrameInput, Id, Style, Ui};

/// State that outlives a frame.
#[derive(Debug, Default)]
struct Memory {
    /// Top-left of each window by title.
    window_pos: HashMap<String, Vec2>,
    /// Rect each window covered last frame.
    window_rect: HashMap<String, Rect>,
    /// Widget or title bar holding the pointer.
    active: Option<Id>,
    /// Pointer offset from the dragged window's origin.
    drag_offset: Vec2,
}

/// Immediate-mode GUI context: owns fonts, the output draw list, and the
/// little state that survives between frames.
pub struct Context {
    style: Style,
    fonts: FontSystem,
    font: Option<FontId>,
    draw_list: DrawList,
    memory: Memory,

    input: FrameInput,
    viewport: Viewport,
    windows_this_frame: i32,
}

impl Context {
    pub fn new(style: Style) -> Self {
        Self {
            style,
            fonts: FontSystem::new(),
            font: None,
            draw_list: DrawList::new(),
            memory: Memory::default(),
            input: FrameInput::default(),
            viewport: Viewport::default(),
            windows_this_frame: 0,
        }
    }

    /// Loads the first available system font for all GUI text.
    ///
    /// Returns `false` when none is found; widgets still work, text is not
    /// drawn.
    pub fn load_system_font(&mut self) -> bool {
        match self.fonts.load_first_available(SYSTEM_FONT_CANDIDATES) {
            Some(id) => {
                self.font = Some(id);
                true
            }
            None => {
                log::warn!("no system font found; GUI text will not be drawn");
                false
            }
        }
    }

    #[inline]
    pub fn style(&self) -> &Style {
        &self.style
    }

    /// Rect `title` covered in the last frame it was shown.
    pub fn window_rect(&self, title: &str) -> Option<Rect> {
        self.memory.window_rect.get(title).copied()
    }

    /// Starts a frame. Releasing the primary button ends any drag.
    pub fn begin_frame(&mut self, input: FrameInput, viewport: Viewport) {
        self.draw_list.clear();
        self.input = input;
        self.viewport = viewport;
        self.windows_this_frame = 0;

        if !input.primary_down {
            self.memory.active = None;
        }
    }

    /// A floating window with a title bar. `contents` lays out its widgets;
    /// its return value is passed through.
    ///
    /// Dragging the title bar moves the window. The window is kept on screen.
    pub fn window<R>(&mut self, title: &str, contents: impl FnOnce(&mut Ui<'_>) -> R) -> R {
        let style = &self.style;
        let id = Id::new(title);
        let index = self.windows_this_frame;
        self.windows_this_frame += 1;

        let default_pos = style.window_origin + Vec2::new(30.0, 30.0) * index as f32;
        let pos = self
            .memory
            .window_pos
            .entry(title.to_owned())
            .or_insert(default_pos);

        // Title bar drag.
        let title_rect = Rect::new(pos.x, pos.y, style.window_width, style.title_height);
        if self.input.primary_pressed
            && self.memory.active.is_none()
            && self.input.hovers(title_rect)
        {
            self.memory.active = Some(id);
            if let Some(p) = self.input.pointer {
                self.memory.drag_offset = p - *pos;
            }
        }
        let dragging = self.memory.active == Some(id);
        if dragging {
            if let Some(p) = self.input.pointer {
                // Keep the title bar reachable.
                let max = self.viewport.size() - Vec2::new(style.window_width, style.title_height);
                *pos = (p - self.memory.drag_offset).clamp(Vec2::zero(), max);
            }
        }
        let pos = *pos;

        let painter = Painter::new(&mut self.draw_list, &self.fonts, self.font, style.font_size, index);
        let mut ui = Ui {
            painter,
            style,
            input: &self.input,
            active: &mut self.memory.active,
            id,
            cursor: pos + Vec2::new(style.padding, style.title_height + style.padding),
            width: style.window_width - 2.0 * style.padding,
        };

        let result = contents(&mut ui);

        // Panel height is known only after the contents ran; layers keep the
        // background behind them.
        let bottom = (ui.cursor.y - style.item_spacing + style.padding).max(pos.y + style.title_height);
        let window_rect = Rect::new(pos.x, pos.y, style.window_width, bottom - pos.y);
        let title_rect = Rect::new(pos.x, pos.y, style.window_width, style.title_height);

        let mut painter = ui.painter;
        painter.fill_rect(Layer::Panel, window_rect, style.window_bg);
        let title_bg = if dragging { style.title_bg_active } else { style.title_bg };
        painter.fill_rect(Layer::Frame, title_rect, title_bg);
        painter.push_clip(title_rect);
        painter.text_left(title_rect, style.padding, title, style.text);
        painter.pop_clip();

        self.memory.window_rect.insert(title.to_owned(), window_rect);
        result
    }

    /// Ends the frame and hands out what the renderers need.
    pub fn end_frame(&mut self) -> (&mut DrawList, &FontSystem) {
        (&mut self.draw_list, &self.fonts)
    }
}

impl Default for Context {
    fn default() -> Self {
        Self::new(Style::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::widgets::slider::split3;
    use crate::Response;
    use lamina_engine::scene::DrawCmd;

    const VIEWPORT: Viewport = Viewport::new(800.0, 600.0);

    fn idle(pointer: Option<Vec2>) -> FrameInput {
        FrameInput { pointer, ..FrameInput::default() }
    }

    fn press(at: Vec2) -> FrameInput {
        FrameInput {
            pointer: Some(at),
            primary_down: true,
            primary_pressed: true,
            primary_released: false,
        }
    }

    fn hold(at: Vec2) -> FrameInput {
        FrameInput { pointer: Some(at), primary_down: true, ..FrameInput::default() }
    }

    fn release(at: Vec2) -> FrameInput {
        FrameInput { pointer: Some(at), primary_released: true, ..FrameInput::default() }
    }

    fn frame(ctx: &mut Context, input: FrameInput, light: &mut [f32; 3]) -> Response {
        ctx.begin_frame(input, VIEWPORT);
        let r = ctx.window("Light Direction", |ui| {
            ui.slider_float3("Direction", light, -1.0..=1.0)
        });
        ctx.end_frame();
        r
    }

    fn components(ctx: &mut Context, light: &mut [f32; 3]) -> [Rect; 3] {
        let area = frame(ctx, idle(None), light).rect;
        split3(area, ctx.style().item_spacing)
    }

    #[test]
    fn no_interaction_means_unchanged() {
        let mut ctx = Context::default();
        let mut light = [0.0, 0.0, -1.0];
        for _ in 0..3 {
            let r = frame(&mut ctx, idle(Some(Vec2::new(1.0, 1.0))), &mut light);
            assert!(!r.changed);
            assert!(!r.hovered);
        }
        assert_eq!(light, [0.0, 0.0, -1.0]);
    }

    #[test]
    fn drag_updates_only_the_pressed_component() {
        let mut ctx = Context::default();
        let mut light = [0.0, 0.0, -1.0];
        let cols = components(&mut ctx, &mut light);
        let y = cols[1].center().y;

        // Press right of center on the middle component.
        let r = frame(&mut ctx, press(Vec2::new(cols[1].origin.x + cols[1].size.x * 0.75, y)), &mut light);
        assert!(r.changed && r.active);
        assert!(light[1] > 0.0);
        assert_eq!((light[0], light[2]), (0.0, -1.0));

        // Drag far past the right edge, across the third component: clamped,
        // still editing the captured one.
        let r = frame(&mut ctx, hold(Vec2::new(cols[2].max().x + 200.0, y)), &mut light);
        assert!(r.changed);
        assert_eq!(light, [0.0, 1.0, -1.0]);

        // Holding still changes nothing.
        let r = frame(&mut ctx, hold(Vec2::new(cols[2].max().x + 200.0, y)), &mut light);
        assert!(!r.changed && r.active);
    }

    #[test]
    fn release_ends_capture() {
        let mut ctx = Context::default();
        let mut light = [0.0, 0.0, -1.0];
        let cols = components(&mut ctx, &mut light);
        let y = cols[0].center().y;

        frame(&mut ctx, press(cols[0].center()), &mut light);
        let r = frame(&mut ctx, release(Vec2::new(cols[0].origin.x, y)), &mut light);
        assert!(!r.changed && !r.active);

        // Moving with the button up does not edit.
        let before = light;
        let r = frame(&mut ctx, idle(Some(Vec2::new(cols[0].max().x, y))), &mut light);
        assert!(!r.changed);
        assert_eq!(light, before);
    }

    #[test]
    fn press_outside_components_does_not_capture() {
        let mut ctx = Context::default();
        let mut light = [0.0, 0.0, -1.0];
        let cols = components(&mut ctx, &mut light);

        frame(&mut ctx, press(Vec2::new(790.0, 590.0)), &mut light);
        // Dragging onto a component while still held must not grab it.
        let r = frame(&mut ctx, hold(cols[0].center()), &mut light);
        assert!(!r.changed && !r.active);
        assert_eq!(light, [0.0, 0.0, -1.0]);
    }

    #[test]
    fn title_bar_drag_moves_window() {
        let mut ctx = Context::default();
        let mut light = [0.0, 0.0, -1.0];
        frame(&mut ctx, idle(None), &mut light);
        let before = ctx.window_rect("Light Direction").unwrap();

        let grip = before.origin + Vec2::new(40.0, 5.0);
        frame(&mut ctx, press(grip), &mut light);
        frame(&mut ctx, hold(grip + Vec2::new(30.0, 20.0)), &mut light);
        frame(&mut ctx, release(grip + Vec2::new(30.0, 20.0)), &mut light);

        let after = ctx.window_rect("Light Direction").unwrap();
        assert_eq!(after.origin, before.origin + Vec2::new(30.0, 20.0));
        assert_eq!(after.size, before.size);
        assert_eq!(light, [0.0, 0.0, -1.0]);
    }

    #[test]
    fn window_stays_on_screen() {
        let mut ctx = Context::default();
        let mut light = [0.0; 3];
        frame(&mut ctx, idle(None), &mut light);
        let grip = ctx.window_rect("Light Direction").unwrap().origin + Vec2::new(5.0, 5.0);

        frame(&mut ctx, press(grip), &mut light);
        frame(&mut ctx, hold(Vec2::new(-400.0, -400.0)), &mut light);
        assert_eq!(ctx.window_rect("Light Direction").unwrap().origin, Vec2::zero());
    }

    #[test]
    fn draw_list_has_panel_frames_and_grabs() {
        let mut ctx = Context::default();
        let mut light = [0.0, 0.0, -1.0];
        frame(&mut ctx, idle(None), &mut light);
        let (dl, _) = ctx.end_frame();
        let rects = dl.items().iter().filter(|i| matches!(i.cmd, DrawCmd::Rect(_))).count();
        // panel + title + 3 frames + 3 grabs
        assert_eq!(rects, 8);
    }

    #[test]
    fn draw_list_contains_title_and_values_when_a_font_exists() {
        let mut ctx = Context::default();
        if !ctx.load_system_font() {
            // Text is skipped without a font; nothing else to check here.
            return;
        }
        let mut light = [0.0, 0.0, -1.0];
        frame(&mut ctx, idle(None), &mut light);
        let (dl, _) = ctx.end_frame();
        let texts: Vec<&str> = dl
            .items()
            .iter()
            .filter_map(|i| match &i.cmd {
                DrawCmd::Text(t) => Some(t.text.as_str()),
                DrawCmd::Rect(_) => None,
            })
            .collect();
        assert!(texts.contains(&"Light Direction"));
        assert!(texts.contains(&"Direction"));
        assert!(texts.contains(&"-1.000"));
        assert_eq!(texts.iter().filter(|t| **t == "0.000").count(), 2);
    }
}
