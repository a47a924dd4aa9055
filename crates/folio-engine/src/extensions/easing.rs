// extensions/easing.rs
//
// Easing curves used by tweens: box bounce, collectible rise, camera zoom.

use std::f32::consts::PI;

/// Overshoot factor for [`Easing::BackOut`].
const BACK_OVERSHOOT: f32 = 1.70158;

/// Shape of progress over a normalized `[0, 1]` time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Easing {
    #[default]
    Linear,
    /// Decelerates into the end.
    QuadOut,
    /// Half a cosine: gentle at both ends.
    SineInOut,
    /// Runs past the end, then settles back.
    BackOut,
}

impl Easing {
    /// Map `t` (clamped to `[0, 1]`) to eased progress. Every curve maps
    /// 0 to 0 and 1 to 1; `BackOut` exceeds 1 in between.
    pub fn apply(self, t: f32) -> f32 {
        let t = t.clamp(0.0, 1.0);
        let rest = 1.0 - t;
        match self {
            Easing::Linear => t,
            Easing::QuadOut => 1.0 - rest * rest,
            Easing::SineInOut => 0.5 - 0.5 * (PI * t).cos(),
            Easing::BackOut => {
                let u = t - 1.0;
                1.0 + u * u * ((BACK_OVERSHOOT + 1.0) * u + BACK_OVERSHOOT)
            }
        }
    }
}

#[inline]
pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

/// `lerp` with eased progress.
#[inline]
pub fn ease(a: f32, b: f32, t: f32, easing: Easing) -> f32 {
    lerp(a, b, easing.apply(t))
}

#[cfg(test)]
mod tests {
    use super::*;

    const CURVES: [Easing; 4] = [Easing::Linear, Easing::QuadOut, Easing::SineInOut, Easing::BackOut];

    #[test]
    fn curves_start_at_zero_and_end_at_one() {
        for e in CURVES {
            assert!(e.apply(0.0).abs() < 1e-5, "{:?} at 0", e);
            assert!((e.apply(1.0) - 1.0).abs() < 1e-5, "{:?} at 1", e);
        }
    }

    #[test]
    fn input_is_clamped() {
        for e in CURVES {
            assert_eq!(e.apply(-3.0), e.apply(0.0));
            assert_eq!(e.apply(7.0), e.apply(1.0));
        }
    }

    #[test]
    fn quad_out_front_loads_progress() {
        assert!((Easing::QuadOut.apply(0.5) - 0.75).abs() < 1e-5);
    }

    #[test]
    fn sine_in_out_is_symmetric() {
        assert!((Easing::SineInOut.apply(0.5) - 0.5).abs() < 1e-5);
        let a = Easing::SineInOut.apply(0.2);
        let b = Easing::SineInOut.apply(0.8);
        assert!((a + b - 1.0).abs() < 1e-5);
    }

    #[test]
    fn back_out_overshoots_before_settling() {
        let peak = (1..100).map(|i| Easing::BackOut.apply(i as f32 / 100.0)).fold(0.0f32, f32::max);
        assert!(peak > 1.05 && peak < 1.15, "peak {}", peak);
    }

    #[test]
    fn ease_maps_into_range() {
        assert!((ease(100.0, 200.0, 0.5, Easing::Linear) - 150.0).abs() < 1e-3);
        assert!((ease(0.0, -12.0, 1.0, Easing::QuadOut) + 12.0).abs() < 1e-4);
    }
}
