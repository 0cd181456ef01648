/// Colour of regions without a value at the current slice.
pub const NO_DATA_COLOR: [u8; 4] = [255, 255, 255, 255];

/// Hue span of the region ramp: blue (low) through green to red (high).
pub const RAMP_HUE_SPAN: f64 = 0.6666;

/// Region colour for a normalized value; `None` means no data.
pub fn region_color(normalized: Option<f64>) -> [u8; 4] {
    let Some(n) = normalized else {
        return NO_DATA_COLOR;
    };
    let [r, g, b] = hsl_to_rgb((1.0 - n.clamp(0.0, 1.0)) * RAMP_HUE_SPAN, 1.0, 0.5);
    [float_to_byte(r), float_to_byte(g), float_to_byte(b), 255]
}

/// HSL to RGB, all components in [0, 1]. Hue wraps.
pub fn hsl_to_rgb(hue: f64, saturation: f64, lightness: f64) -> [f64; 3] {
    let hue = hue.rem_euclid(1.0);
    if saturation == 0.0 {
        return [lightness; 3];
    }
    let m2 = if lightness < 0.5 {
        lightness * (1.0 + saturation)
    } else {
        lightness + saturation - lightness * saturation
    };
    let m1 = 2.0 * lightness - m2;
    [
        hue_channel(m1, m2, hue + 1.0 / 3.0),
        hue_channel(m1, m2, hue),
        hue_channel(m1, m2, hue - 1.0 / 3.0),
    ]
}

fn hue_channel(m1: f64, m2: f64, mut h: f64) -> f64 {
    if h < 0.0 {
        h += 1.0;
    }
    if h > 1.0 {
        h -= 1.0;
    }
    if h * 6.0 < 1.0 {
        m1 + (m2 - m1) * 6.0 * h
    } else if h * 2.0 < 1.0 {
        m2
    } else if h * 3.0 < 2.0 {
        m1 + (m2 - m1) * (2.0 / 3.0 - h) * 6.0
    } else {
        m1
    }
}

fn float_to_byte(v: f64) -> u8 {
    if v >= 1.0 {
        255
    } else {
        (v.max(0.0) * 256.0) as u8
    }
}

/// Vertex-shader colour ramp over a displayed height: 0 is red, 0.5 green,
/// 1 blue.
pub fn hue_ramp(value: f32) -> [f32; 3] {
    let r = 2.0 - value * 4.0;
    let b = value * 4.0 - 2.0;
    let mut g = value * 4.0;
    if g >= 2.0 {
        g = 4.0 - g;
    }
    [r.clamp(0.0, 1.0), g.clamp(0.0, 1.0), b.clamp(0.0, 1.0)]
}

/// Height shown for a region at the given blend between its two channels.
pub fn displayed_height(height1: f32, height2: f32, blend: f32) -> f32 {
    height1 + (height2 - height1) * blend
}

/// Regions whose displayed height is the no-data sentinel are not drawn.
pub fn is_visible(height: f32) -> bool {
    height >= -0.5
}

#[cfg(test)]
mod tests {
    use super::{NO_DATA_COLOR, displayed_height, hue_ramp, is_visible, region_color};

    #[test]
    fn ramp_runs_blue_to_red() {
        assert_eq!(region_color(Some(0.0)), [0, 0, 255, 255]);
        assert_eq!(region_color(Some(0.5)), [0, 255, 0, 255]);
        assert_eq!(region_color(Some(1.0)), [255, 0, 0, 255]);
        assert_eq!(region_color(None), NO_DATA_COLOR);
    }

    #[test]
    fn shader_hue_clamps() {
        assert_eq!(hue_ramp(0.0), [1.0, 0.0, 0.0]);
        assert_eq!(hue_ramp(0.5), [0.0, 1.0, 0.0]);
        assert_eq!(hue_ramp(1.0), [0.0, 0.0, 1.0]);
    }

    #[test]
    fn no_data_heights_are_hidden() {
        assert_eq!(displayed_height(0.0, 1.0, 0.25), 0.25);
        assert!(is_visible(0.0));
        assert!(!is_visible(displayed_height(-1.0, -1.0, 0.7)));
    }
}
