//! ROI and channel statistics types

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::colorimetry::common::error::{ColorimetryError, Result};

/// Rectangular region of interest in pixel units, relative to the image top-left.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Roi {
    pub x: usize,
    pub y: usize,
    pub width: usize,
    pub height: usize,
}

impl Roi {
    pub fn new(x: usize, y: usize, width: usize, height: usize) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(ColorimetryError::InvalidRoi(format!(
                "width and height must be positive, got {}x{}",
                width, height
            )));
        }
        Ok(Self { x, y, width, height })
    }

    pub fn area(&self) -> usize {
        self.width * self.height
    }

    /// Fails with `RoiOutOfBoundsError` unless the ROI lies fully inside a
    /// `width` x `height` image.
    pub fn check_bounds(&self, width: usize, height: usize) -> Result<()> {
        let right = self.x.checked_add(self.width);
        let bottom = self.y.checked_add(self.height);
        match (right, bottom) {
            (Some(r), Some(b)) if r <= width && b <= height => Ok(()),
            _ => Err(ColorimetryError::RoiOutOfBoundsError {
                roi: self.to_string(),
                width,
                height,
            }),
        }
    }
}

impl fmt::Display for Roi {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{},{},{}", self.x, self.y, self.width, self.height)
    }
}

impl FromStr for Roi {
    type Err = ColorimetryError;

    /// Parses `x,y,width,height`.
    fn from_str(s: &str) -> Result<Self> {
        let parts: Vec<&str> = s.split(',').map(str::trim).collect();
        if parts.len() != 4 {
            return Err(ColorimetryError::InvalidRoi(format!(
                "ROI must be in format x,y,width,height, got: {}",
                s
            )));
        }

        let mut values = [0usize; 4];
        for (value, (part, name)) in values
            .iter_mut()
            .zip(parts.iter().zip(["x", "y", "width", "height"]))
        {
            *value = part
                .parse()
                .map_err(|_| ColorimetryError::InvalidRoi(format!("Invalid {}: {}", name, part)))?;
        }

        Self::new(values[0], values[1], values[2], values[3])
    }
}

/// Color channel used as the calibration intensity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Channel {
    R,
    G,
    B,
}

impl Channel {
    pub const ALL: [Channel; 3] = [Channel::R, Channel::G, Channel::B];

    pub fn index(self) -> usize {
        match self {
            Channel::R => 0,
            Channel::G => 1,
            Channel::B => 2,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Channel::R => "Red",
            Channel::G => "Green",
            Channel::B => "Blue",
        }
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let letter = match self {
            Channel::R => "R",
            Channel::G => "G",
            Channel::B => "B",
        };
        f.write_str(letter)
    }
}

impl FromStr for Channel {
    type Err = ColorimetryError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_uppercase().as_str() {
            "R" | "RED" => Ok(Channel::R),
            "G" | "GREEN" => Ok(Channel::G),
            "B" | "BLUE" => Ok(Channel::B),
            other => Err(ColorimetryError::ConfigError(format!(
                "unknown channel selector '{}', expected one of R, G, B",
                other
            ))),
        }
    }
}

/// Mean intensity per RGB channel, on the 0-255 scale.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct RgbMeans {
    pub r: f64,
    pub g: f64,
    pub b: f64,
}

impl RgbMeans {
    pub fn new(r: f64, g: f64, b: f64) -> Self {
        Self { r, g, b }
    }

    pub fn channel(&self, channel: Channel) -> f64 {
        match channel {
            Channel::R => self.r,
            Channel::G => self.g,
            Channel::B => self.b,
        }
    }

    pub fn as_array(&self) -> [f64; 3] {
        [self.r, self.g, self.b]
    }

    /// Channel-wise `self - other`, floored at zero.
    pub fn saturating_sub(&self, other: &RgbMeans) -> RgbMeans {
        RgbMeans {
            r: (self.r - other.r).max(0.0),
            g: (self.g - other.g).max(0.0),
            b: (self.b - other.b).max(0.0),
        }
    }
}

/// Mean CIE L*a*b* values (D65) of a region.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct LabMeans {
    pub l: f64,
    pub a: f64,
    pub b: f64,
}

/// Statistics sampled from one image.
#[derive(Debug, Clone, PartialEq)]
pub struct ChannelStatistics {
    /// Raw mean of the target region
    pub target: RgbMeans,
    /// Raw mean of the background region, when one was sampled
    pub background: Option<RgbMeans>,
    /// Perceptual statistics of the target region, when requested
    pub lab: Option<LabMeans>,
}

impl ChannelStatistics {
    /// Target means with the background subtracted, or the raw target means
    /// when no background was sampled.
    pub fn corrected(&self) -> RgbMeans {
        match &self.background {
            Some(bg) => self.target.saturating_sub(bg),
            None => self.target,
        }
    }

    /// Intensity fed to the calibration model for `channel`.
    pub fn intensity(&self, channel: Channel) -> f64 {
        self.corrected().channel(channel)
    }
}
