use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Free-rectangle choice heuristics for MaxRects placement.
///
/// Every page size trial evaluates all of them in declaration order; when two
/// heuristics reach the same occupancy the one declared first wins.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum MaxRectsHeuristic {
    /// Minimize the shorter leftover side, then the longer one.
    BestShortSideFit,
    /// Minimize the longer leftover side, then the shorter one.
    BestLongSideFit,
    /// Minimize the wasted area of the free rectangle, then the shorter leftover side.
    BestAreaFit,
    /// Minimize the resulting top edge, then the x coordinate.
    BottomLeft,
    /// Maximize the edge length touching the page border and placed rectangles.
    ContactPoint,
}

impl MaxRectsHeuristic {
    /// All heuristics in evaluation (and tie-break) order.
    pub const ALL: [MaxRectsHeuristic; 5] = [
        MaxRectsHeuristic::BestShortSideFit,
        MaxRectsHeuristic::BestLongSideFit,
        MaxRectsHeuristic::BestAreaFit,
        MaxRectsHeuristic::BottomLeft,
        MaxRectsHeuristic::ContactPoint,
    ];

    pub fn short_name(&self) -> &'static str {
        match self {
            Self::BestShortSideFit => "bssf",
            Self::BestLongSideFit => "blsf",
            Self::BestAreaFit => "baf",
            Self::BottomLeft => "bl",
            Self::ContactPoint => "cp",
        }
    }
}

impl FromStr for MaxRectsHeuristic {
    type Err = ();
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "baf" | "bestareafit" => Ok(Self::BestAreaFit),
            "bssf" | "bestshortsidefit" => Ok(Self::BestShortSideFit),
            "blsf" | "bestlongsidefit" => Ok(Self::BestLongSideFit),
            "bl" | "bottomleft" => Ok(Self::BottomLeft),
            "cp" | "contactpoint" => Ok(Self::ContactPoint),
            _ => Err(()),
        }
    }
}

/// How a page is filled for one trial size and heuristic.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum PackMode {
    /// Rescore every pending sprite after each placement and take the global best.
    Exhaustive,
    /// Insert sprites in a fixed size-descending order; stop at the first miss.
    Fast,
}

impl FromStr for PackMode {
    type Err = ();
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "exhaustive" | "quality" => Ok(Self::Exhaustive),
            "fast" => Ok(Self::Fast),
            _ => Err(()),
        }
    }
}

/// Immutable packing settings passed to every stage.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PackerConfig {
    /// Maximum page width in pixels.
    pub max_width: u32,
    /// Maximum page height in pixels.
    pub max_height: u32,
    /// Lower bound for the page width search.
    #[serde(default = "default_min_dim")]
    pub min_width: u32,
    /// Lower bound for the page height search.
    #[serde(default = "default_min_dim")]
    pub min_height: u32,

    /// Pixels added to the right of every sprite.
    pub padding_x: u32,
    /// Pixels added below every sprite.
    pub padding_y: u32,
    /// Repeat padding around the outer page edge.
    #[serde(default = "default_edge_padding")]
    pub edge_padding: bool,
    /// Padding is filled by duplicating edge pixels; halves the edge pad.
    #[serde(default)]
    pub duplicate_padding: bool,

    /// Allow 90° rotation for sprites that permit it.
    pub allow_rotation: bool,
    /// Page sizes are searched over powers of two; max dimensions must be powers of two.
    pub power_of_two: bool,
    /// Force the written canvas to be square.
    #[serde(default)]
    pub square: bool,

    #[serde(default = "default_mode")]
    pub mode: PackMode,
    /// Early stop window of the linear size search. None picks 15 (exhaustive) or 25 (fast).
    #[serde(default)]
    pub fuzziness: Option<u32>,
    /// Evaluate heuristics in parallel when feature "parallel" is on.
    #[serde(default)]
    pub parallel: bool,
}

impl Default for PackerConfig {
    fn default() -> Self {
        Self {
            max_width: 1024,
            max_height: 1024,
            min_width: default_min_dim(),
            min_height: default_min_dim(),
            padding_x: 2,
            padding_y: 2,
            edge_padding: default_edge_padding(),
            duplicate_padding: false,
            allow_rotation: false,
            power_of_two: true,
            square: false,
            mode: default_mode(),
            fuzziness: None,
            parallel: false,
        }
    }
}

impl PackerConfig {
    /// Validates the configuration parameters.
    ///
    /// Returns an error if:
    /// - Dimensions are zero or the minimum exceeds the maximum
    /// - Power-of-two mode is on with non power-of-two maxima
    /// - Padding leaves no usable page area
    pub fn validate(&self) -> crate::error::Result<()> {
        use crate::error::PagePackError;

        if self.max_width == 0 || self.max_height == 0 {
            return Err(PagePackError::InvalidDimensions {
                width: self.max_width,
                height: self.max_height,
            });
        }
        if self.min_width > self.max_width || self.min_height > self.max_height {
            return Err(PagePackError::InvalidConfig(format!(
                "min page size {}x{} exceeds max page size {}x{}",
                self.min_width, self.min_height, self.max_width, self.max_height
            )));
        }
        if self.power_of_two {
            if !self.max_width.is_power_of_two() {
                return Err(PagePackError::NotPowerOfTwo {
                    axis: "width",
                    value: self.max_width,
                });
            }
            if !self.max_height.is_power_of_two() {
                return Err(PagePackError::NotPowerOfTwo {
                    axis: "height",
                    value: self.max_height,
                });
            }
        }
        let (reserve_x, reserve_y) = self.edge_reserve();
        if reserve_x >= self.max_width || reserve_y >= self.max_height {
            return Err(PagePackError::InvalidConfig(format!(
                "padding {},{} leaves no usable space in {}x{}",
                self.padding_x, self.padding_y, self.max_width, self.max_height
            )));
        }
        Ok(())
    }

    /// Space held back from each trial size so the canvas can carry edge padding.
    pub fn edge_reserve(&self) -> (u32, u32) {
        if self.edge_padding && !self.duplicate_padding {
            (self.padding_x, self.padding_y)
        } else {
            (0, 0)
        }
    }

    /// Usable bin size at the configured maximum.
    pub fn usable_max(&self) -> (u32, u32) {
        let (rx, ry) = self.edge_reserve();
        (
            self.max_width.saturating_sub(rx),
            self.max_height.saturating_sub(ry),
        )
    }

    /// True when heuristics will actually run on rayon: requested and compiled with feature "parallel".
    pub fn effective_parallel(&self) -> bool {
        self.parallel && cfg!(feature = "parallel")
    }

    /// Convergence window for the linear size search.
    pub fn search_fuzziness(&self) -> u32 {
        if self.power_of_two {
            return 0;
        }
        self.fuzziness.unwrap_or(match self.mode {
            PackMode::Exhaustive => 15,
            PackMode::Fast => 25,
        })
    }
}

fn default_min_dim() -> u32 {
    16
}
fn default_edge_padding() -> bool {
    true
}
fn default_mode() -> PackMode {
    PackMode::Exhaustive
}

/// Builder for `PackerConfig` for ergonomic construction.
#[derive(Debug, Default, Clone)]
pub struct PackerConfigBuilder {
    cfg: PackerConfig,
}

impl PackerConfigBuilder {
    pub fn new() -> Self {
        Self {
            cfg: PackerConfig::default(),
        }
    }
    pub fn with_max_dimensions(mut self, w: u32, h: u32) -> Self {
        self.cfg.max_width = w;
        self.cfg.max_height = h;
        self
    }
    pub fn with_min_dimensions(mut self, w: u32, h: u32) -> Self {
        self.cfg.min_width = w;
        self.cfg.min_height = h;
        self
    }
    pub fn padding(mut self, x: u32, y: u32) -> Self {
        self.cfg.padding_x = x;
        self.cfg.padding_y = y;
        self
    }
    pub fn edge_padding(mut self, v: bool) -> Self {
        self.cfg.edge_padding = v;
        self
    }
    pub fn duplicate_padding(mut self, v: bool) -> Self {
        self.cfg.duplicate_padding = v;
        self
    }
    pub fn allow_rotation(mut self, v: bool) -> Self {
        self.cfg.allow_rotation = v;
        self
    }
    pub fn pow2(mut self, v: bool) -> Self {
        self.cfg.power_of_two = v;
        self
    }
    pub fn square(mut self, v: bool) -> Self {
        self.cfg.square = v;
        self
    }
    pub fn mode(mut self, v: PackMode) -> Self {
        self.cfg.mode = v;
        self
    }
    pub fn fuzziness(mut self, v: Option<u32>) -> Self {
        self.cfg.fuzziness = v;
        self
    }
    pub fn parallel(mut self, v: bool) -> Self {
        self.cfg.parallel = v;
        self
    }
    pub fn build(self) -> PackerConfig {
        self.cfg
    }
}

impl PackerConfig {
    /// Create a fluent builder for `PackerConfig`.
    pub fn builder() -> PackerConfigBuilder {
        PackerConfigBuilder::new()
    }
}
