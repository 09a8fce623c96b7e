use std::str::FromStr;

use anyhow::{Context, Result};
use eframe::egui::Color32;
use palette::{Hsl, IntoColor, Srgb};

use crate::charts::BarTone;
use crate::config::ThemeColors;

// ---------------------------------------------------------------------------
// Chart theme: semantic tone → Color32
// ---------------------------------------------------------------------------

/// Resolved chart colours.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Theme {
    pub positive: Color32,
    pub negative: Color32,
    pub accent: Color32,
}

impl Theme {
    /// Parse the configured hex colours.
    pub fn from_colors(colors: &ThemeColors) -> Result<Self> {
        Ok(Theme {
            positive: parse_hex(&colors.positive).context("positive colour")?,
            negative: parse_hex(&colors.negative).context("negative colour")?,
            accent: parse_hex(&colors.accent).context("accent colour")?,
        })
    }

    /// Look up the colour for a bar tone.
    pub fn color_for(&self, tone: BarTone) -> Color32 {
        match tone {
            BarTone::Positive => self.positive,
            BarTone::Negative => self.negative,
            BarTone::Accent => self.accent,
        }
    }

    /// A lighter shade of `tone`, used for hovered/selected widgets.
    pub fn highlight(&self, tone: BarTone) -> Color32 {
        let c = self.color_for(tone);
        let rgb = Srgb::new(c.r(), c.g(), c.b()).into_format::<f32>();
        let mut hsl: Hsl = rgb.into_color();
        hsl.lightness = (hsl.lightness + 0.15).min(0.95);
        let rgb: Srgb = hsl.into_color();
        to_color32(rgb)
    }
}

impl Default for Theme {
    fn default() -> Self {
        Theme {
            positive: Color32::from_rgb(0x10, 0xc7, 0x59),
            negative: Color32::from_rgb(0xfa, 0x3e, 0x3e),
            accent: Color32::from_rgb(0x27, 0x0f, 0xfc),
        }
    }
}

/// Parse `#rrggbb` (or `#rgb`) into a Color32.
pub fn parse_hex(hex: &str) -> Result<Color32> {
    let rgb = Srgb::<u8>::from_str(hex.trim())
        .map_err(|e| anyhow::anyhow!("invalid hex colour '{hex}': {e}"))?;
    Ok(Color32::from_rgb(rgb.red, rgb.green, rgb.blue))
}

fn to_color32(rgb: Srgb) -> Color32 {
    Color32::from_rgb(
        (rgb.red.clamp(0.0, 1.0) * 255.0).round() as u8,
        (rgb.green.clamp(0.0, 1.0) * 255.0).round() as u8,
        (rgb.blue.clamp(0.0, 1.0) * 255.0).round() as u8,
    )
}
