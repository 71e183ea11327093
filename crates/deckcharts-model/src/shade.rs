use serde::{Deserialize, Serialize};

use crate::config::ConfigError;
use crate::Rgb;

pub const DEFAULT_DARKEN_STEP: f64 = 0.15;
pub const DEFAULT_DARKEN_FLOOR: f64 = 0.3;
pub const DEFAULT_LIGHTEN_STEP: f64 = 0.1;
pub const DEFAULT_LIGHTEN_CAP: f64 = 0.7;

/// Ordinal shading constants.
///
/// Negative ordinals scale every channel by `max(darken_floor, 1 + ordinal * darken_step)`;
/// non-negative ordinals blend toward white by `min(lighten_cap, ordinal * lighten_step)`.
/// The floor keeps old vintages from going black and the cap keeps new ones from going white.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ShadeConfig {
    pub darken_step: f64,
    pub darken_floor: f64,
    pub lighten_step: f64,
    pub lighten_cap: f64,
}

impl Default for ShadeConfig {
    fn default() -> Self {
        Self {
            darken_step: DEFAULT_DARKEN_STEP,
            darken_floor: DEFAULT_DARKEN_FLOOR,
            lighten_step: DEFAULT_LIGHTEN_STEP,
            lighten_cap: DEFAULT_LIGHTEN_CAP,
        }
    }
}

impl ShadeConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (name, value) in [
            ("darkenStep", self.darken_step),
            ("darkenFloor", self.darken_floor),
            ("lightenStep", self.lighten_step),
            ("lightenCap", self.lighten_cap),
        ] {
            if !value.is_finite() || !(0.0..=1.0).contains(&value) {
                return Err(ConfigError::ShadeFactor { name, value });
            }
        }
        Ok(())
    }

    /// Channel multiplier for a negative ordinal.
    pub fn darken_factor(&self, ordinal: i32) -> f64 {
        (1.0 + f64::from(ordinal) * self.darken_step).max(self.darken_floor)
    }

    /// Blend-toward-white amount for a non-negative ordinal.
    pub fn lighten_factor(&self, ordinal: i32) -> f64 {
        (f64::from(ordinal) * self.lighten_step).min(self.lighten_cap)
    }

    pub fn shade(&self, base: Rgb, ordinal: Option<i32>) -> Rgb {
        match ordinal {
            None => base,
            Some(ordinal) if ordinal < 0 => {
                let factor = self.darken_factor(ordinal);
                base.map_channels(|c| darken_channel(c, factor))
            }
            Some(ordinal) => {
                let factor = self.lighten_factor(ordinal);
                base.map_channels(|c| lighten_channel(c, factor))
            }
        }
    }
}

/// Shade `base` with the default constants.
pub fn shade(base: Rgb, ordinal: Option<i32>) -> Rgb {
    ShadeConfig::default().shade(base, ordinal)
}

// `as u8` truncates toward zero and saturates, so out-of-range factors cannot wrap.
fn darken_channel(channel: u8, factor: f64) -> u8 {
    (f64::from(channel) * factor) as u8
}

fn lighten_channel(channel: u8, factor: f64) -> u8 {
    let channel = f64::from(channel);
    (channel + (255.0 - channel) * factor) as u8
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const BASE: Rgb = Rgb::from_u32(0x2E75B6);

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn absent_ordinal_is_identity() {
        assert_eq!(shade(BASE, None), BASE);
        assert_eq!(shade(Rgb::BLACK, None), Rgb::BLACK);
    }

    #[test]
    fn darkening_is_linear_then_clamped() {
        let cfg = ShadeConfig::default();
        assert!(approx(cfg.darken_factor(-1), 0.85));
        assert!(approx(cfg.darken_factor(-2), 0.70));
        assert!(approx(cfg.darken_factor(-3), 0.55));
        assert!(approx(cfg.darken_factor(-4), 0.40));
        assert!(approx(cfg.darken_factor(-10), 0.30));
        assert!(approx(cfg.darken_factor(i32::MIN), 0.30));
    }

    #[test]
    fn lightening_is_linear_then_clamped() {
        let cfg = ShadeConfig::default();
        assert!(approx(cfg.lighten_factor(0), 0.0));
        assert!(approx(cfg.lighten_factor(3), 0.3));
        assert!(approx(cfg.lighten_factor(7), 0.7));
        assert!(approx(cfg.lighten_factor(20), 0.7));
        assert!(approx(cfg.lighten_factor(i32::MAX), 0.7));
    }

    #[test]
    fn channels_are_truncated() {
        // 0x2E=46, 0x75=117, 0xB6=182; * 0.85 = 39.1, 99.45, 154.7
        assert_eq!(shade(BASE, Some(-1)), Rgb::new(39, 99, 154));
        // 46 + 209 * 0.1 = 66.9, 117 + 138 * 0.1 = 130.8, 182 + 73 * 0.1 = 189.3
        assert_eq!(shade(BASE, Some(1)), Rgb::new(66, 130, 189));
    }

    #[test]
    fn ordinal_zero_keeps_the_base_color() {
        assert_eq!(shade(BASE, Some(0)), BASE);
    }

    #[test]
    fn extremes_never_reach_black_or_white() {
        let darkest = shade(Rgb::WHITE, Some(-100));
        assert_eq!(darkest, Rgb::new(76, 76, 76));
        let lightest = shade(Rgb::BLACK, Some(100));
        assert_eq!(lightest, Rgb::new(178, 178, 178));
    }

    #[test]
    fn validate_rejects_out_of_range_factors() {
        let cfg = ShadeConfig {
            darken_step: -0.1,
            ..ShadeConfig::default()
        };
        assert!(matches!(
            cfg.validate(),
            Err(ConfigError::ShadeFactor { name: "darkenStep", .. })
        ));
        let cfg = ShadeConfig {
            lighten_cap: f64::NAN,
            ..ShadeConfig::default()
        };
        assert!(cfg.validate().is_err());
        assert!(ShadeConfig::default().validate().is_ok());
    }

    proptest! {
        #[test]
        fn darker_for_more_negative_ordinals(r in any::<u8>(), g in any::<u8>(), b in any::<u8>(), ordinal in -20i32..0) {
            let base = Rgb::new(r, g, b);
            let shaded = shade(base, Some(ordinal));
            let darker = shade(base, Some(ordinal - 1));
            prop_assert!(shaded.r <= base.r && shaded.g <= base.g && shaded.b <= base.b);
            prop_assert!(darker.r <= shaded.r && darker.g <= shaded.g && darker.b <= shaded.b);
        }

        #[test]
        fn lighter_for_larger_ordinals(r in any::<u8>(), g in any::<u8>(), b in any::<u8>(), ordinal in 0i32..20) {
            let base = Rgb::new(r, g, b);
            let shaded = shade(base, Some(ordinal));
            let lighter = shade(base, Some(ordinal + 1));
            prop_assert!(shaded.r >= base.r && shaded.g >= base.g && shaded.b >= base.b);
            prop_assert!(lighter.r >= shaded.r && lighter.g >= shaded.g && lighter.b >= shaded.b);
        }
    }
}
