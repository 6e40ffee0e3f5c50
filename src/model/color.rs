//! Run color model and two-tier color resolution.
//!
//! DrawingML expresses a run's color two ways: the structured view on
//! `a:rPr` (a direct solid-fill child, classified here as [`Color`]) and
//! the raw markup anywhere under the run element ([`RawFill`]). The
//! structured view misses fills that sit below other elements, so copying
//! a run's formatting must consult both; see [`Color::resolve`].

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A direct RGB color value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RgbColor {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl RgbColor {
    /// Parse a six-digit hex value, e.g. `"1F4E79"`.
    pub fn from_hex(hex: &str) -> Result<Self> {
        let hex = hex.trim();
        if hex.len() != 6 || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(Error::XmlParse(format!("invalid RGB value: {hex}")));
        }
        Ok(Self {
            r: u8::from_str_radix(&hex[0..2], 16).unwrap_or(0),
            g: u8::from_str_radix(&hex[2..4], 16).unwrap_or(0),
            b: u8::from_str_radix(&hex[4..6], 16).unwrap_or(0),
        })
    }
}

impl fmt::Display for RgbColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02X}{:02X}{:02X}", self.r, self.g, self.b)
    }
}

/// Scheme color slots the structured accessor accepts.
///
/// Anything outside this set (e.g. `phClr`) fails to parse and is
/// discarded by Tier-2 resolution rather than raised as an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ThemeSlot {
    Accent1,
    Accent2,
    Accent3,
    Accent4,
    Accent5,
    Accent6,
    Dark1,
    Dark2,
    Light1,
    Light2,
    Text1,
    Text2,
    Background1,
    Background2,
    Hyperlink,
    FollowedHyperlink,
}

impl ThemeSlot {
    /// The `val` attribute of `<a:schemeClr>` for this slot.
    pub fn xml_value(&self) -> &'static str {
        match self {
            ThemeSlot::Accent1 => "accent1",
            ThemeSlot::Accent2 => "accent2",
            ThemeSlot::Accent3 => "accent3",
            ThemeSlot::Accent4 => "accent4",
            ThemeSlot::Accent5 => "accent5",
            ThemeSlot::Accent6 => "accent6",
            ThemeSlot::Dark1 => "dk1",
            ThemeSlot::Dark2 => "dk2",
            ThemeSlot::Light1 => "lt1",
            ThemeSlot::Light2 => "lt2",
            ThemeSlot::Text1 => "tx1",
            ThemeSlot::Text2 => "tx2",
            ThemeSlot::Background1 => "bg1",
            ThemeSlot::Background2 => "bg2",
            ThemeSlot::Hyperlink => "hlink",
            ThemeSlot::FollowedHyperlink => "folHlink",
        }
    }
}

impl FromStr for ThemeSlot {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "accent1" => Ok(ThemeSlot::Accent1),
            "accent2" => Ok(ThemeSlot::Accent2),
            "accent3" => Ok(ThemeSlot::Accent3),
            "accent4" => Ok(ThemeSlot::Accent4),
            "accent5" => Ok(ThemeSlot::Accent5),
            "accent6" => Ok(ThemeSlot::Accent6),
            "dk1" => Ok(ThemeSlot::Dark1),
            "dk2" => Ok(ThemeSlot::Dark2),
            "lt1" => Ok(ThemeSlot::Light1),
            "lt2" => Ok(ThemeSlot::Light2),
            "tx1" => Ok(ThemeSlot::Text1),
            "tx2" => Ok(ThemeSlot::Text2),
            "bg1" => Ok(ThemeSlot::Background1),
            "bg2" => Ok(ThemeSlot::Background2),
            "hlink" => Ok(ThemeSlot::Hyperlink),
            "folHlink" => Ok(ThemeSlot::FollowedHyperlink),
            _ => Err(Error::XmlParse(format!("unknown scheme slot: {s}"))),
        }
    }
}

/// A run color as surfaced by the structured accessor.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", tag = "kind")]
pub enum Color {
    /// No color set on the run; inherited from paragraph/shape/theme
    /// defaults and never written back.
    #[default]
    Unset,
    /// Direct RGB value.
    Rgb(RgbColor),
    /// Theme slot reference with optional brightness adjustment
    /// (−1.0..1.0, `None` when zero).
    Theme {
        slot: ThemeSlot,
        brightness: Option<f32>,
    },
    /// Scheme slot recovered from raw markup; no brightness carried.
    Scheme(ThemeSlot),
}

/// The first solid fill found anywhere under the run element.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", tag = "kind")]
pub enum RawFill {
    /// `<a:srgbClr val="…"/>` inside the fill.
    Rgb(RgbColor),
    /// `<a:schemeClr val="…"/>` inside the fill; the value is kept as a
    /// string because it may name a slot the structured accessor rejects.
    Scheme(String),
    /// A solid fill whose color child is neither of the above
    /// (e.g. `sysClr`). Present but contributes nothing.
    Other,
}

impl Color {
    /// Two-tier color reconciliation.
    ///
    /// Tier 1 takes the structured color as-is. Tier 2 independently
    /// consults the raw markup and may override Tier 1: a raw RGB value
    /// always wins, and a raw scheme reference wins when its slot name is
    /// one the structured accessor accepts (otherwise it is silently
    /// dropped). Both tiers run unconditionally, in this order. Omitting
    /// Tier 2 would lose color on runs whose fill the structured view
    /// fails to surface.
    pub fn resolve(structured: &Color, raw: Option<&RawFill>) -> Color {
        let mut resolved = match structured {
            Color::Rgb(rgb) => Color::Rgb(*rgb),
            Color::Theme { slot, brightness } => Color::Theme {
                slot: *slot,
                brightness: *brightness,
            },
            Color::Scheme(slot) => Color::Scheme(*slot),
            Color::Unset => Color::Unset,
        };

        match raw {
            Some(RawFill::Rgb(rgb)) => resolved = Color::Rgb(*rgb),
            Some(RawFill::Scheme(name)) => {
                if let Ok(slot) = name.parse::<ThemeSlot>() {
                    resolved = Color::Scheme(slot);
                }
            }
            Some(RawFill::Other) | None => {}
        }

        resolved
    }

    /// Render this color as an `<a:solidFill>` element, or `None` for
    /// [`Color::Unset`].
    ///
    /// Writing a fill replaces the previous fill element wholesale, so any
    /// extra transforms it carried (alpha, saturation) are dropped. That
    /// mirrors how the host object model reassigns run colors.
    pub fn to_solid_fill_xml(&self) -> Option<String> {
        match self {
            Color::Unset => None,
            Color::Rgb(rgb) => Some(format!(
                "<a:solidFill><a:srgbClr val=\"{rgb}\"/></a:solidFill>"
            )),
            Color::Theme { slot, brightness } => {
                let val = slot.xml_value();
                match brightness {
                    Some(b) if *b > 0.0 => {
                        let lum_mod = (((1.0 - b) * 100_000.0).round()) as i64;
                        let lum_off = ((b * 100_000.0).round()) as i64;
                        Some(format!(
                            "<a:solidFill><a:schemeClr val=\"{val}\">\
                             <a:lumMod val=\"{lum_mod}\"/><a:lumOff val=\"{lum_off}\"/>\
                             </a:schemeClr></a:solidFill>"
                        ))
                    }
                    Some(b) if *b < 0.0 => {
                        let lum_mod = (((1.0 + b) * 100_000.0).round()) as i64;
                        Some(format!(
                            "<a:solidFill><a:schemeClr val=\"{val}\">\
                             <a:lumMod val=\"{lum_mod}\"/>\
                             </a:schemeClr></a:solidFill>"
                        ))
                    }
                    _ => Some(format!(
                        "<a:solidFill><a:schemeClr val=\"{val}\"/></a:solidFill>"
                    )),
                }
            }
            Color::Scheme(slot) => Some(format!(
                "<a:solidFill><a:schemeClr val=\"{}\"/></a:solidFill>",
                slot.xml_value()
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rgb_hex_round_trip() {
        let rgb = RgbColor::from_hex("1F4E79").unwrap();
        assert_eq!(rgb, RgbColor { r: 0x1F, g: 0x4E, b: 0x79 });
        assert_eq!(rgb.to_string(), "1F4E79");
    }

    #[test]
    fn test_rgb_rejects_bad_input() {
        assert!(RgbColor::from_hex("12345").is_err());
        assert!(RgbColor::from_hex("GGGGGG").is_err());
    }

    #[test]
    fn test_theme_slot_parsing() {
        assert_eq!("accent3".parse::<ThemeSlot>().unwrap(), ThemeSlot::Accent3);
        assert_eq!("folHlink".parse::<ThemeSlot>().unwrap(), ThemeSlot::FollowedHyperlink);
        assert!("phClr".parse::<ThemeSlot>().is_err());
        assert!("".parse::<ThemeSlot>().is_err());
    }

    #[test]
    fn test_resolve_structured_only() {
        let rgb = RgbColor::from_hex("FF0000").unwrap();
        let resolved = Color::resolve(&Color::Rgb(rgb), None);
        assert_eq!(resolved, Color::Rgb(rgb));

        let theme = Color::Theme {
            slot: ThemeSlot::Accent1,
            brightness: Some(0.4),
        };
        assert_eq!(Color::resolve(&theme, None), theme);
    }

    #[test]
    fn test_raw_rgb_overrides_structured() {
        let structured = Color::Theme {
            slot: ThemeSlot::Accent1,
            brightness: None,
        };
        let raw = RawFill::Rgb(RgbColor::from_hex("00FF00").unwrap());
        assert_eq!(
            Color::resolve(&structured, Some(&raw)),
            Color::Rgb(RgbColor::from_hex("00FF00").unwrap())
        );
    }

    #[test]
    fn test_raw_scheme_recovers_unset() {
        let raw = RawFill::Scheme("accent2".to_string());
        assert_eq!(
            Color::resolve(&Color::Unset, Some(&raw)),
            Color::Scheme(ThemeSlot::Accent2)
        );
    }

    #[test]
    fn test_unknown_raw_scheme_discarded() {
        let raw = RawFill::Scheme("phClr".to_string());
        assert_eq!(Color::resolve(&Color::Unset, Some(&raw)), Color::Unset);

        let structured = Color::Rgb(RgbColor::from_hex("112233").unwrap());
        assert_eq!(Color::resolve(&structured, Some(&raw)), structured);
    }

    #[test]
    fn test_raw_other_contributes_nothing() {
        assert_eq!(
            Color::resolve(&Color::Unset, Some(&RawFill::Other)),
            Color::Unset
        );
    }

    #[test]
    fn test_solid_fill_xml() {
        assert_eq!(Color::Unset.to_solid_fill_xml(), None);

        let rgb = Color::Rgb(RgbColor::from_hex("AABBCC").unwrap());
        assert_eq!(
            rgb.to_solid_fill_xml().unwrap(),
            "<a:solidFill><a:srgbClr val=\"AABBCC\"/></a:solidFill>"
        );

        let scheme = Color::Scheme(ThemeSlot::Background1);
        assert_eq!(
            scheme.to_solid_fill_xml().unwrap(),
            "<a:solidFill><a:schemeClr val=\"bg1\"/></a:solidFill>"
        );
    }

    #[test]
    fn test_brightness_encoding() {
        let positive = Color::Theme {
            slot: ThemeSlot::Accent1,
            brightness: Some(0.4),
        };
        let xml = positive.to_solid_fill_xml().unwrap();
        assert!(xml.contains("<a:lumMod val=\"60000\"/>"));
        assert!(xml.contains("<a:lumOff val=\"40000\"/>"));

        let negative = Color::Theme {
            slot: ThemeSlot::Accent1,
            brightness: Some(-0.25),
        };
        let xml = negative.to_solid_fill_xml().unwrap();
        assert!(xml.contains("<a:lumMod val=\"75000\"/>"));
        assert!(!xml.contains("lumOff"));

        let flat = Color::Theme {
            slot: ThemeSlot::Accent1,
            brightness: None,
        };
        let xml = flat.to_solid_fill_xml().unwrap();
        assert!(!xml.contains("lumMod"));
    }
}
