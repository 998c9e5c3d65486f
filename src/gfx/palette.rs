//! Colours used to draw the balance
//!
//! Apparatus parts use wood tones. Weight objects use a ten-step green (pro) or
//! red (con) ramp indexed by weight, so heavier items read darker.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::Side;

/// RGBA colour, each channel in `0.0..=1.0`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Rgba(pub [f32; 4]);

#[derive(Debug, Error, PartialEq)]
#[error("`{0}` is not a #rrggbb or #rrggbbaa colour")]
pub struct ParseColorError(String);

impl Rgba {
    pub const TRANSPARENT: Rgba = Rgba([0.0, 0.0, 0.0, 0.0]);

    pub fn rgb8(r: u8, g: u8, b: u8) -> Self {
        Self([r as f32 / 255.0, g as f32 / 255.0, b as f32 / 255.0, 1.0])
    }

    /// Parse `#rrggbb` or `#rrggbbaa`
    pub fn from_hex(hex: &str) -> Result<Self, ParseColorError> {
        let digits = hex
            .strip_prefix('#')
            .filter(|d| (d.len() == 6 || d.len() == 8) && d.is_ascii())
            .ok_or_else(|| ParseColorError(hex.to_string()))?;

        let mut channels = [1.0f32; 4];
        for (i, channel) in channels.iter_mut().enumerate().take(digits.len() / 2) {
            let byte = u8::from_str_radix(&digits[i * 2..i * 2 + 2], 16)
                .map_err(|_| ParseColorError(hex.to_string()))?;
            *channel = f32::from(byte) / 255.0;
        }
        Ok(Self(channels))
    }

    pub fn to_hex(&self) -> String {
        let [r, g, b, a] = self.0.map(|c| (c.clamp(0.0, 1.0) * 255.0).round() as u8);
        if a == 255 {
            format!("#{r:02x}{g:02x}{b:02x}")
        } else {
            format!("#{r:02x}{g:02x}{b:02x}{a:02x}")
        }
    }
}

impl TryFrom<String> for Rgba {
    type Error = ParseColorError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::from_hex(&value)
    }
}

impl From<Rgba> for String {
    fn from(value: Rgba) -> Self {
        value.to_hex()
    }
}

/// Fill and outline for one drawn body
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Style {
    pub fill: Rgba,
    pub stroke: Rgba,
    pub line_width: f32,
}

/// Colour assignments for every body role
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Palette {
    pub ground: Rgba,
    pub post: Rgba,
    pub beam: Rgba,
    pub platform: Rgba,
    pub pro_shades: [Rgba; 10],
    pub con_shades: [Rgba; 10],
    pub weight_line_width: f32,
}

impl Default for Palette {
    fn default() -> Self {
        Self {
            ground: Rgba::rgb8(0x8b, 0x45, 0x13),
            post: Rgba::rgb8(0x65, 0x43, 0x21),
            beam: Rgba::rgb8(0x65, 0x43, 0x21),
            platform: Rgba::rgb8(0xd2, 0x69, 0x1e),
            pro_shades: [
                Rgba::rgb8(0xd4, 0xf8, 0xe8),
                Rgba::rgb8(0xaa, 0xf0, 0xc6),
                Rgba::rgb8(0x7e, 0xe6, 0xa2),
                Rgba::rgb8(0x4e, 0xd9, 0x7a),
                Rgba::rgb8(0x28, 0xc9, 0x5a),
                Rgba::rgb8(0x20, 0xb3, 0x4e),
                Rgba::rgb8(0x1a, 0x9c, 0x43),
                Rgba::rgb8(0x15, 0x86, 0x38),
                Rgba::rgb8(0x10, 0x6f, 0x2d),
                Rgba::rgb8(0x0b, 0x59, 0x23),
            ],
            con_shades: [
                Rgba::rgb8(0xff, 0xd6, 0xd6),
                Rgba::rgb8(0xff, 0xb3, 0xb3),
                Rgba::rgb8(0xff, 0x8f, 0x8f),
                Rgba::rgb8(0xff, 0x6a, 0x6a),
                Rgba::rgb8(0xff, 0x45, 0x45),
                Rgba::rgb8(0xe6, 0x3b, 0x3b),
                Rgba::rgb8(0xcc, 0x32, 0x32),
                Rgba::rgb8(0xb3, 0x29, 0x29),
                Rgba::rgb8(0x99, 0x1f, 0x1f),
                Rgba::rgb8(0x80, 0x16, 0x16),
            ],
            weight_line_width: 2.0,
        }
    }
}

impl Palette {
    /// Style of a weight object: the weight's own shade, outlined one step darker
    pub fn weight_style(&self, side: Side, weight: u8) -> Style {
        let shades = match side {
            Side::Pro => &self.pro_shades,
            Side::Con => &self.con_shades,
        };
        let index = usize::from(weight.clamp(1, 10)) - 1;
        Style {
            fill: shades[index],
            stroke: shades[(index + 1).min(shades.len() - 1)],
            line_width: self.weight_line_width,
        }
    }

    /// Style of an apparatus part; wood is drawn without an outline
    pub fn solid(fill: Rgba) -> Style {
        Style {
            fill,
            stroke: fill,
            line_width: 0.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hex_parsing() {
        assert_eq!(Rgba::from_hex("#ffffff").unwrap(), Rgba([1.0, 1.0, 1.0, 1.0]));
        assert_eq!(Rgba::from_hex("#00000000").unwrap(), Rgba::TRANSPARENT);
        assert!(Rgba::from_hex("ffffff").is_err());
        assert!(Rgba::from_hex("#fffff").is_err());
        assert!(Rgba::from_hex("#gggggg").is_err());
    }

    #[test]
    fn test_hex_roundtrip_of_palette_entry() {
        let palette = Palette::default();
        assert_eq!(palette.platform.to_hex(), "#d2691e");
    }

    #[test]
    fn test_weight_style_darkens_with_weight() {
        let palette = Palette::default();
        let light = palette.weight_style(Side::Pro, 1);
        let dark = palette.weight_style(Side::Pro, 10);
        let luminance = |c: Rgba| c.0[0] + c.0[1] + c.0[2];
        assert!(luminance(dark.fill) < luminance(light.fill));
        assert_eq!(dark.stroke, dark.fill);
        assert_eq!(light.stroke, palette.pro_shades[1]);
    }

    #[test]
    fn test_sides_use_distinct_ramps() {
        let palette = Palette::default();
        let pro = palette.weight_style(Side::Pro, 5).fill;
        let con = palette.weight_style(Side::Con, 5).fill;
        assert!(pro.0[1] > pro.0[0], "pro shades are green");
        assert!(con.0[0] > con.0[1], "con shades are red");
    }
}
