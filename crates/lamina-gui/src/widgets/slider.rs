//! Horizontal drag-to-set slider math.
//!
//! The grab is `grab_width` wide and travels inside the frame, so the value
//! range maps onto `[x + grab/2, x + w - grab/2]`.

use std::ops::RangeInclusive;

use lamina_engine::coords::Rect;

/// Splits `area` into three equal columns separated by `spacing`.
pub fn split3(area: Rect, spacing: f32) -> [Rect; 3] {
    let w = ((area.size.x - 2.0 * spacing) / 3.0).max(0.0);
    std::array::from_fn(|i| {
        Rect::new(
            area.origin.x + i as f32 * (w + spacing),
            area.origin.y,
            w,
            area.size.y,
        )
    })
}

/// Value under pointer `x`, clamped to `range`.
pub fn value_at(x: f32, frame: Rect, grab_width: f32, range: &RangeInclusive<f32>) -> f32 {
    let (min, max) = (*range.start(), *range.end());
    let travel = (frame.size.x - grab_width).max(f32::EPSILON);
    let t = ((x - frame.origin.x - grab_width * 0.5) / travel).clamp(0.0, 1.0);
    (min + t * (max - min)).clamp(min.min(max), max.max(min))
}

/// Where the grab sits for `value`. Out-of-range values pin to the ends.
pub fn grab_rect(value: f32, frame: Rect, grab_width: f32, range: &RangeInclusive<f32>) -> Rect {
    let (min, max) = (*range.start(), *range.end());
    let t = if (max - min).abs() <= f32::EPSILON {
        0.0
    } else {
        ((value - min) / (max - min)).clamp(0.0, 1.0)
    };
    let g = grab_width.min(frame.size.x);
    let x = frame.origin.x + t * (frame.size.x - g);
    Rect::new(x, frame.origin.y + 2.0, g, (frame.size.y - 4.0).max(0.0))
}

#[cfg(test)]
mod tests {
    use super::*;

    const FRAME: Rect = Rect::new(100.0, 0.0, 110.0, 20.0);
    const RANGE: RangeInclusive<f32> = -1.0..=1.0;

    #[test]
    fn ends_of_travel_map_to_range_ends() {
        assert_eq!(value_at(105.0, FRAME, 10.0, &RANGE), -1.0);
        assert_eq!(value_at(205.0, FRAME, 10.0, &RANGE), 1.0);
        assert_eq!(value_at(155.0, FRAME, 10.0, &RANGE), 0.0);
    }

    #[test]
    fn pointer_outside_is_clamped() {
        assert_eq!(value_at(-500.0, FRAME, 10.0, &RANGE), -1.0);
        assert_eq!(value_at(5000.0, FRAME, 10.0, &RANGE), 1.0);
    }

    #[test]
    fn grab_follows_value() {
        assert_eq!(grab_rect(-1.0, FRAME, 10.0, &RANGE).origin.x, 100.0);
        assert_eq!(grab_rect(1.0, FRAME, 10.0, &RANGE).origin.x, 200.0);
        assert_eq!(grab_rect(0.0, FRAME, 10.0, &RANGE).origin.x, 150.0);
        // Pinned, not extrapolated.
        assert_eq!(grab_rect(7.0, FRAME, 10.0, &RANGE).origin.x, 200.0);
    }

    #[test]
    fn value_and_grab_agree() {
        for v in [-1.0f32, -0.25, 0.5, 1.0] {
            let g = grab_rect(v, FRAME, 10.0, &RANGE);
            let back = value_at(g.center().x, FRAME, 10.0, &RANGE);
            assert!((back - v).abs() < 1e-5, "{v} -> {back}");
        }
    }

    #[test]
    fn split_leaves_spacing_between_columns() {
        let cols = split3(Rect::new(0.0, 0.0, 308.0, 20.0), 4.0);
        assert_eq!(cols[0], Rect::new(0.0, 0.0, 100.0, 20.0));
        assert_eq!(cols[1], Rect::new(104.0, 0.0, 100.0, 20.0));
        assert_eq!(cols[2], Rect::new(208.0, 0.0, 100.0, 20.0));
    }
}
