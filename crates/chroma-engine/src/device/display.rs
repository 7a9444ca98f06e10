/// A drawing surface with a logical (layout) size and a backing (pixel) size.
pub trait DisplaySurface {
    /// Displayed size in logical pixels.
    fn logical_size(&self) -> (f64, f64);

    /// Backing store size in physical pixels.
    fn backing_size(&self) -> (u32, u32);

    fn set_backing_size(&mut self, width: u32, height: u32);
}

/// Resizes the backing store to `floor(logical * multiplier)` if it differs.
///
/// Pass the window scale factor as `multiplier` for native pixels. A
/// non-positive or non-finite multiplier counts as `1.0`.
///
/// Returns `true` if the backing size was written.
pub fn resize_surface_to_display_size<S: DisplaySurface + ?Sized>(
    surface: &mut S,
    multiplier: f64,
) -> bool {
    let multiplier = if multiplier.is_finite() && multiplier > 0.0 { multiplier } else { 1.0 };

    let (logical_w, logical_h) = surface.logical_size();
    let width = (logical_w * multiplier).floor().max(0.0) as u32;
    let height = (logical_h * multiplier).floor().max(0.0) as u32;

    match_backing_size(surface, width, height)
}

/// Sets the backing store to exactly `width` x `height` physical pixels if it
/// differs.
///
/// Feed it the physical size from window events. A logical round trip can
/// floor a pixel away at fractional scale factors.
///
/// Returns `true` if the backing size was written.
pub fn match_backing_size<S: DisplaySurface + ?Sized>(
    surface: &mut S,
    width: u32,
    height: u32,
) -> bool {
    if surface.backing_size() == (width, height) {
        return false;
    }

    log::debug!("resizing backing store to {width}x{height}");
    surface.set_backing_size(width, height);
    true
}

/// [`resize_surface_to_display_size`] with a multiplier of `1.0`.
pub fn resize_surface_to_display_size_default<S: DisplaySurface + ?Sized>(surface: &mut S) -> bool {
    resize_surface_to_display_size(surface, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FakeSurface {
        logical: (f64, f64),
        backing: (u32, u32),
        writes: u32,
    }

    impl FakeSurface {
        fn new(logical: (f64, f64), backing: (u32, u32)) -> Self {
            Self {
                logical,
                backing,
                writes: 0,
            }
        }
    }

    impl DisplaySurface for FakeSurface {
        fn logical_size(&self) -> (f64, f64) {
            self.logical
        }

        fn backing_size(&self) -> (u32, u32) {
            self.backing
        }

        fn set_backing_size(&mut self, width: u32, height: u32) {
            self.backing = (width, height);
            self.writes += 1;
        }
    }

    #[test]
    fn second_call_is_a_no_op() {
        let mut s = FakeSurface::new((400.0, 300.0), (300, 150));
        assert!(resize_surface_to_display_size_default(&mut s));
        assert!(!resize_surface_to_display_size_default(&mut s));
        assert_eq!(s.backing, (400, 300));
        assert_eq!(s.writes, 1);
    }

    #[test]
    fn matching_size_is_untouched() {
        let mut s = FakeSurface::new((190.0, 320.0), (190, 320));
        assert!(!resize_surface_to_display_size(&mut s, 1.0));
        assert_eq!(s.writes, 0);
    }

    #[test]
    fn multiplier_one() {
        let mut s = FakeSurface::new((190.5, 320.9), (1, 1));
        resize_surface_to_display_size(&mut s, 1.0);
        assert_eq!(s.backing, (190, 320));
    }

    #[test]
    fn multiplier_two() {
        let mut s = FakeSurface::new((190.5, 320.0), (1, 1));
        resize_surface_to_display_size(&mut s, 2.0);
        assert_eq!(s.backing, (381, 640));
    }

    #[test]
    fn multiplier_half() {
        let mut s = FakeSurface::new((191.0, 321.0), (1, 1));
        resize_surface_to_display_size(&mut s, 0.5);
        assert_eq!(s.backing, (95, 160));
    }

    #[test]
    fn zero_multiplier_falls_back_to_one() {
        let mut s = FakeSurface::new((64.0, 32.0), (1, 1));
        resize_surface_to_display_size(&mut s, 0.0);
        assert_eq!(s.backing, (64, 32));
    }

    #[test]
    fn only_height_differs() {
        let mut s = FakeSurface::new((64.0, 48.0), (64, 32));
        assert!(resize_surface_to_display_size(&mut s, 1.0));
        assert_eq!(s.backing, (64, 48));
    }

    /// A 230 px window at scale 1.75 is 131.43 logical px; scaling back floors to 229.
    fn window_at_fractional_scale() -> FakeSurface {
        let physical = 230u32;
        let scale = 1.75;
        let logical = f64::from(physical) / scale;
        FakeSurface::new((logical, logical), (physical, physical))
    }

    #[test]
    fn physical_size_survives_fractional_scale() {
        let mut s = window_at_fractional_scale();
        assert!(!match_backing_size(&mut s, 230, 230));
        assert_eq!(s.backing, (230, 230));
        assert_eq!(s.writes, 0);
    }

    #[test]
    fn logical_round_trip_loses_a_pixel_at_fractional_scale() {
        let mut s = window_at_fractional_scale();
        assert!(resize_surface_to_display_size(&mut s, 1.75));
        assert_eq!(s.backing, (229, 229));

        // The exact physical size from the window event restores it.
        assert!(match_backing_size(&mut s, 230, 230));
        assert_eq!(s.backing, (230, 230));
    }

    #[test]
    fn match_backing_size_writes_once() {
        let mut s = FakeSurface::new((100.0, 100.0), (100, 100));
        assert!(match_backing_size(&mut s, 320, 200));
        assert!(!match_backing_size(&mut s, 320, 200));
        assert_eq!(s.writes, 1);
    }
}
