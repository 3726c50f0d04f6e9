use lamina_gui::Context;

pub const WINDOW_TITLE: &str = "Light Direction";
pub const SLIDER_LABEL: &str = "Direction";

/// The light-direction panel. Returns whether `light` was edited this frame.
pub fn light_overlay(gui: &mut Context, light: &mut [f32; 3]) -> bool {
    gui.window(WINDOW_TITLE, |ui| {
        ui.slider_float3(SLIDER_LABEL, light, -1.0..=1.0).changed
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use lamina_engine::coords::{Vec2, Viewport};
    use lamina_gui::FrameInput;

    const VIEWPORT: Viewport = Viewport::new(800.0, 600.0);

    #[test]
    fn idle_frames_leave_light_untouched() {
        let mut gui = Context::default();
        let mut light = [0.0, 0.0, -1.0];
        for _ in 0..2 {
            gui.begin_frame(FrameInput::default(), VIEWPORT);
            assert!(!light_overlay(&mut gui, &mut light));
            gui.end_frame();
        }
        assert_eq!(light, [0.0, 0.0, -1.0]);
        assert!(gui.window_rect(WINDOW_TITLE).is_some());
    }

    #[test]
    fn dragging_the_first_component_edits_x() {
        let mut gui = Context::default();
        let mut light = [0.0, 0.0, -1.0];
        gui.begin_frame(FrameInput::default(), VIEWPORT);
        light_overlay(&mut gui, &mut light);
        gui.end_frame();

        let style = gui.style();
        let panel = gui.window_rect(WINDOW_TITLE).unwrap();
        // First component starts at the content's left edge.
        let start = panel.origin
            + Vec2::new(style.padding + 1.0, style.title_height + style.padding + style.item_height * 0.5);

        gui.begin_frame(
            FrameInput {
                pointer: Some(start),
                primary_down: true,
                primary_pressed: true,
                primary_released: false,
            },
            VIEWPORT,
        );
        assert!(light_overlay(&mut gui, &mut light));
        gui.end_frame();

        assert_eq!(light, [-1.0, 0.0, -1.0]);
    }
}
