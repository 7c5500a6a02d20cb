//! The coordinate engine: percentage space to device units.
//!
//! Percentage space runs 0-100 on both axes with Y measured as distance
//! from the canvas *bottom*. Every backend converts through these
//! functions and nowhere else; a backend doing its own conversion is how
//! mirrored output happens.

/// Empirical factor mapping the DSL's size units onto device units,
/// relative to canvas width. Applies to font and stroke sizes alike.
pub const FONT_SCALE: f64 = 0.024;

/// `value` percent of `measure`.
pub fn pct(value: f64, measure: f64) -> f64 {
    value / 100.0 * measure
}

/// Device X for a percentage X coordinate.
pub fn device_x(canvas_w: f64, xp: f64) -> f64 {
    pct(xp, canvas_w)
}

/// Device Y for a percentage Y coordinate. Percentage Y grows upward
/// from the bottom edge; device Y grows downward from the top edge.
pub fn device_y(canvas_h: f64, yp: f64) -> f64 {
    canvas_h * (100.0 - yp) / 100.0
}

/// Device size for a DSL size unit (font or stroke).
pub fn device_size(canvas_w: f64, sp: f64) -> f64 {
    sp * canvas_w * FONT_SCALE
}

/// Converts an anchor point plus size in one call:
/// `(device_x, device_y, device_size)`.
pub fn dimen(canvas_w: f64, canvas_h: f64, xp: f64, yp: f64, sp: f64) -> (f64, f64, f64) {
    (
        device_x(canvas_w, xp),
        device_y(canvas_h, yp),
        device_size(canvas_w, sp),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pct_is_linear() {
        for p in 0..=100 {
            let p = p as f64;
            assert_eq!(pct(p, 792.0), p / 100.0 * 792.0);
        }
    }

    #[test]
    fn test_y_flip_is_involutive() {
        // Re-deriving the percentage from the device Y recovers yp.
        let h = 612.0;
        for yp in [-20.0, 0.0, 12.5, 50.0, 75.0, 100.0, 140.0] {
            let dy = device_y(h, yp);
            let recovered = 100.0 - dy / h * 100.0;
            assert!((recovered - yp).abs() < 1e-9, "yp={yp} recovered={recovered}");
        }
    }

    #[test]
    fn test_dimen_reference_values() {
        let (x, y, s) = dimen(792.0, 612.0, 50.0, 50.0, 3.0);
        assert_eq!(x, 396.0);
        assert_eq!(y, 306.0);
        assert!((s - 3.0 * 792.0 * FONT_SCALE).abs() < 1e-9);
    }

    #[test]
    fn test_out_of_range_extrapolates() {
        assert_eq!(device_x(100.0, 150.0), 150.0);
        assert_eq!(device_y(100.0, -50.0), 150.0);
    }
}
