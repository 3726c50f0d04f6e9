use lamina_engine::coords::Vec2;
use lamina_engine::paint::Color;

/// Colors and metrics, in logical pixels.
#[derive(Debug, Clone)]
pub struct Style {
    pub window_bg: Color,
    pub title_bg: Color,
    pub title_bg_active: Color,
    pub frame_bg: Color,
    pub frame_bg_hovered: Color,
    pub frame_bg_active: Color,
    pub grab: Color,
    pub grab_active: Color,
    pub text: Color,

    pub font_size: f32,
    pub window_width: f32,
    /// Where the first window opens; later windows cascade from here.
    pub window_origin: Vec2,
    pub title_height: f32,
    pub padding: f32,
    pub item_spacing: f32,
    pub item_height: f32,
    pub grab_width: f32,
}

impl Default for Style {
    fn default() -> Self {
        Self {
            window_bg: Color::from_straight(0.06, 0.06, 0.06, 0.94),
            title_bg: Color::from_straight(0.04, 0.04, 0.04, 1.0),
            title_bg_active: Color::from_straight(0.16, 0.29, 0.48, 1.0),
            frame_bg: Color::from_straight(0.16, 0.29, 0.48, 0.54),
            frame_bg_hovered: Color::from_straight(0.26, 0.59, 0.98, 0.40),
            frame_bg_active: Color::from_straight(0.26, 0.59, 0.98, 0.67),
            grab: Color::from_straight(0.24, 0.52, 0.88, 1.0),
            grab_active: Color::from_straight(0.26, 0.59, 0.98, 1.0),
            text: Color::WHITE,

            font_size: 14.0,
            window_width: 360.0,
            window_origin: Vec2::new(60.0, 60.0),
            title_height: 20.0,
            padding: 8.0,
            item_spacing: 4.0,
            item_height: 20.0,
            grab_width: 10.0,
        }
    }
}
