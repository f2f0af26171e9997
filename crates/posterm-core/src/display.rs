//! Screen geometry and colour theme.
//!
//! The renderer receives a [`Theme`] and [`Layout`] by reference at startup;
//! nothing here is global.

use std::str::FromStr;

use crate::error::ConfigError;

/// Pixels the terminal firmware reserves for its status icons.
pub const STATUS_BAR_HEIGHT: u32 = 28;

/// Widths above this get the side-by-side widescreen layout.
const WIDESCREEN_MIN_WIDTH: u32 = 600;

const GRID_GAP: u32 = 8;

/// Supported terminal screens.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScreenProfile {
    /// 3.5" handheld, 320x480 LCD.
    Compact,
    /// 8" counter unit, 800x480 LCD.
    Widescreen,
}

impl ScreenProfile {
    /// Full LCD size in pixels.
    #[must_use]
    pub fn lcd_size(self) -> (u32, u32) {
        match self {
            Self::Compact => (320, 480),
            Self::Widescreen => (800, 480),
        }
    }

    /// LCD size minus the status bar.
    #[must_use]
    pub fn usable_size(self) -> (u32, u32) {
        let (w, h) = self.lcd_size();
        (w, h - STATUS_BAR_HEIGHT)
    }

    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Compact => "3.5",
            Self::Widescreen => "8",
        }
    }
}

impl FromStr for ScreenProfile {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "3.5" | "compact" => Ok(Self::Compact),
            "8" | "wide" | "widescreen" => Ok(Self::Widescreen),
            other => Err(ConfigError::InvalidEnvVar {
                var: "screen".to_string(),
                reason: format!("unknown screen size '{other}'; expected 3.5 or 8"),
            }),
        }
    }
}

/// Region sizes for one screen, in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Layout {
    pub width: u32,
    pub height: u32,
    pub widescreen: bool,
    pub header_height: u32,
    pub category_bar_height: u32,
    pub product_button_size: u32,
    /// Width of the product grid area after padding.
    pub grid_width: u32,
    /// Compact: full-width strip this tall at the bottom.
    /// Widescreen: right-hand column this wide.
    pub cart_panel_extent: u32,
}

impl Layout {
    #[must_use]
    pub fn for_screen(width: u32, height: u32) -> Self {
        if width > WIDESCREEN_MIN_WIDTH {
            let cart_panel_extent = 280;
            let padding = 12;
            Self {
                width,
                height,
                widescreen: true,
                header_height: 52,
                category_bar_height: 46,
                product_button_size: 115,
                grid_width: width.saturating_sub(cart_panel_extent + 2 * padding),
                cart_panel_extent,
            }
        } else {
            let padding = 8;
            Self {
                width,
                height,
                widescreen: false,
                header_height: 44,
                category_bar_height: 40,
                product_button_size: 95,
                grid_width: width.saturating_sub(2 * padding),
                cart_panel_extent: 150,
            }
        }
    }

    #[must_use]
    pub fn for_profile(profile: ScreenProfile) -> Self {
        let (w, h) = profile.usable_size();
        Self::for_screen(w, h)
    }

    /// How many product buttons fit on one grid row (at least one).
    #[must_use]
    pub fn product_columns(&self) -> u32 {
        ((self.grid_width + GRID_GAP) / (self.product_button_size + GRID_GAP)).max(1)
    }

    /// Height left for the product grid.
    #[must_use]
    pub fn product_area_height(&self) -> u32 {
        let chrome = self.header_height + self.category_bar_height;
        if self.widescreen {
            self.height.saturating_sub(chrome)
        } else {
            self.height.saturating_sub(chrome + self.cart_panel_extent)
        }
    }
}

/// 24-bit RGB colour.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb(pub u32);

impl Rgb {
    #[must_use]
    pub fn hex(self) -> String {
        format!("#{:06X}", self.0 & 0x00FF_FFFF)
    }

    /// Parses `"#D4A574"` or `"D4A574"`.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        let digits = s.trim().trim_start_matches('#');
        if digits.len() != 6 {
            return None;
        }
        u32::from_str_radix(digits, 16).ok().map(Self)
    }
}

/// Colour palette handed to the renderer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Theme {
    pub bg_primary: Rgb,
    pub bg_secondary: Rgb,
    pub bg_card: Rgb,
    pub accent: Rgb,
    pub accent_green: Rgb,
    pub accent_orange: Rgb,
    pub text_primary: Rgb,
    pub text_secondary: Rgb,
    pub danger: Rgb,
    pub success: Rgb,
    pub divider: Rgb,
}

impl Theme {
    #[must_use]
    pub fn dark() -> Self {
        Self {
            bg_primary: Rgb(0x1A_1A2E),
            bg_secondary: Rgb(0x16_213E),
            bg_card: Rgb(0x0F_3460),
            accent: Rgb(0x00_D9FF),
            accent_green: Rgb(0x00_C853),
            accent_orange: Rgb(0xFF_6B35),
            text_primary: Rgb(0xFF_FFFF),
            text_secondary: Rgb(0xA0_A0A0),
            danger: Rgb(0xFF_5252),
            success: Rgb(0x4C_AF50),
            divider: Rgb(0x2A_2A4A),
        }
    }

    /// Button colour for a product, falling back to the card colour when
    /// the product has none or it does not parse.
    #[must_use]
    pub fn product_color(&self, display_color: Option<&str>) -> Rgb {
        display_color.and_then(Rgb::parse).unwrap_or(self.bg_card)
    }
}

impl Default for Theme {
    fn default() -> Self {
        Self::dark()
    }
}

/// `"1 item"` / `"3 items"`.
#[must_use]
pub fn item_count_label(count: u32) -> String {
    if count == 1 {
        "1 item".to_string()
    } else {
        format!("{count} items")
    }
}
