//! Grid Scale
//!
//! Zoom percentage and the pixel metrics derived from it.

use serde::{Deserialize, Serialize};

/// Zoom percentage, always within `[MIN, MAX]`
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Scale(u32);

impl Scale {
    pub const MIN: u32 = 50;
    pub const MAX: u32 = 200;
    pub const STEP: u32 = 10;
    pub const DEFAULT: Scale = Scale(100);

    /// Clamp an arbitrary percentage into range
    pub fn new(percent: i64) -> Self {
        Scale(percent.clamp(Self::MIN as i64, Self::MAX as i64) as u32)
    }

    /// Clamp and snap to the nearest step (slider input)
    pub fn snapped(percent: i64) -> Self {
        let step = Self::STEP as i64;
        let percent = percent.clamp(Self::MIN as i64, Self::MAX as i64);
        let snapped = (percent + step / 2).div_euclid(step) * step;
        Self::new(snapped)
    }

    pub fn percent(self) -> u32 {
        self.0
    }

    pub fn zoomed_in(self) -> Self {
        Self::new(self.0 as i64 + Self::STEP as i64)
    }

    pub fn zoomed_out(self) -> Self {
        Self::new(self.0 as i64 - Self::STEP as i64)
    }

    pub fn can_zoom_in(self) -> bool {
        self.0 < Self::MAX
    }

    pub fn can_zoom_out(self) -> bool {
        self.0 > Self::MIN
    }

    pub fn density(self) -> Density {
        if self.0 < 80 {
            Density::Small
        } else if self.0 > 120 {
            Density::Large
        } else {
            Density::Middle
        }
    }

    /// Select and input controls switch to their compact size below 80%
    pub fn compact_editors(self) -> bool {
        self.0 < 80
    }

    pub fn px(self, metric: Metric) -> u32 {
        let (base, floor) = metric.base_and_floor();
        // Round half up
        let scaled = (base * self.0 + 50) / 100;
        scaled.max(floor)
    }

    pub fn metrics(self) -> ScaleMetrics {
        ScaleMetrics {
            column_width: self.px(Metric::ColumnWidth),
            font_size: self.px(Metric::FontSize),
            row_height: self.px(Metric::RowHeight),
            padding_y: self.px(Metric::PaddingY),
            padding_x: self.px(Metric::PaddingX),
        }
    }
}

impl Default for Scale {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Size class of the grid's table control
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Density {
    Small,
    Middle,
    Large,
}

/// Scaled dimension
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Metric {
    ColumnWidth,
    FontSize,
    RowHeight,
    PaddingY,
    PaddingX,
}

impl Metric {
    /// Pixels at 100% and the lower bound
    fn base_and_floor(self) -> (u32, u32) {
        match self {
            Metric::ColumnWidth => (140, 60),
            Metric::FontSize => (14, 10),
            Metric::RowHeight => (32, 24),
            Metric::PaddingY => (8, 2),
            Metric::PaddingX => (8, 4),
        }
    }
}

/// Pixel sizes at one scale
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScaleMetrics {
    pub column_width: u32,
    pub font_size: u32,
    pub row_height: u32,
    pub padding_y: u32,
    pub padding_x: u32,
}
