//! Diagonal stripe patterns.

use super::surface::{Fill, RectF, Surface};
use crate::color::Rgba;

/// Paints every pixel whose diagonal index is a multiple of `spacing`.
///
/// With `main_diagonal` the painted pixels satisfy `(x - y) % spacing == 0`,
/// otherwise `(x + y) % spacing == 0`. Each row starts at its first matching
/// column and steps by `spacing`. A spacing of zero paints nothing.
pub fn paint_stripes<S: Surface + ?Sized>(
    surface: &mut S,
    spacing: u32,
    main_diagonal: bool,
    color: Rgba,
) {
    if spacing == 0 {
        return;
    }
    let (width, height) = surface.size();
    let fill = Fill::Solid(color);

    for y in 0..height {
        let phase = y % spacing;
        let first = if main_diagonal {
            phase
        } else {
            (spacing - phase) % spacing
        };
        for x in (first..width).step_by(spacing as usize) {
            surface.fill_rect(RectF::new(x as f32, y as f32, 1.0, 1.0), &fill);
        }
    }
}

/// Stripes in both directions: anti-diagonal first, then main diagonal.
pub fn paint_crosshatch<S: Surface + ?Sized>(surface: &mut S, spacing: u32, color: Rgba) {
    paint_stripes(surface, spacing, false, color);
    paint_stripes(surface, spacing, true, color);
}
