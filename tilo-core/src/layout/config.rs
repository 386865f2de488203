//! Layout options.
//!
//! Field and variant names follow the frontend settings store (camelCase
//! fields, kebab-case values) so the options JSON can be passed through
//! unchanged. Missing fields take the desktop defaults.

use serde::{Deserialize, Serialize};

use super::LayoutError;
use super::algorithms::{LayoutStrategy, RowLayout, SquareLayout, SweepLayout};

/// Top-level layout algorithm.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LayoutAlgorithm {
    /// Uniform grid of equal-size square tiles.
    Square,
    /// Rows of weight-proportioned rectangles.
    Row,
    /// Leaves swept to one edge, non-leaves in rows.
    Sweep,
}

impl LayoutAlgorithm {
    pub fn strategy(self) -> &'static dyn LayoutStrategy {
        match self {
            LayoutAlgorithm::Square => &SquareLayout,
            LayoutAlgorithm::Row => &RowLayout,
            LayoutAlgorithm::Sweep => &SweepLayout,
        }
    }
}

/// Which row groupings the row layout searches.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RowMode {
    SingleRow,
    SingleColumn,
    /// One row, then one column.
    Linear,
    /// Every grouping into contiguous rows.
    Exhaustive,
    /// Every first-row length, later rows filled greedily by weight.
    ExhaustiveFirstRow,
}

/// Edge the leaf block is swept to.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SweepEdge {
    Left,
    Top,
    /// Left on landscape viewports, top on portrait ones.
    Shorter,
    /// Whichever leaves less empty space.
    Auto,
}

/// How the swept strip's share of the area grows with the leaf count.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SweptShare {
    Linear,
    Sqrt,
    #[serde(rename = "pow-2/3")]
    Pow2Over3,
}

impl SweptShare {
    /// Fraction of the extent given to `leaves` leaf tiles when the
    /// non-leaf siblings hold `others` tiles in total.
    pub fn ratio(self, leaves: usize, others: usize) -> f64 {
        let (a, b) = (leaves as f64, others as f64);
        let (a, b) = match self {
            SweptShare::Linear => (a, b),
            SweptShare::Sqrt => (a.sqrt(), b.sqrt()),
            SweptShare::Pow2Over3 => (a.powf(2.0 / 3.0), b.powf(2.0 / 3.0)),
        };
        if a + b == 0.0 { 0.0 } else { a / (a + b) }
    }
}

/// Whether a node may place its leaves in an area offered by its parent.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SweepToParent {
    None,
    /// Try the parent's area first.
    Prefer,
    /// Try the parent's area only if the node's own area fails.
    Fallback,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LayoutOptions {
    /// Spacing between tiles, in pixels.
    pub tile_spacing: f64,
    /// Height of a tile header, in pixels.
    pub header_size: f64,
    /// Minimum tile edge, in pixels.
    pub min_tile_size: f64,
    /// Maximum tile edge, in pixels.
    pub max_tile_size: f64,
    pub algorithm: LayoutAlgorithm,
    pub row_mode: RowMode,
    /// A later row grouping replaces the best so far only when its empty
    /// space is below `best * row_sensitivity`.
    pub row_sensitivity: f64,
    pub sweep_edge: SweepEdge,
    pub swept_share: SweptShare,
    pub sweep_to_parent: SweepToParent,
    /// Viewport width over height, for `SweepEdge::Shorter`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub viewport_aspect: Option<f64>,
}

impl Default for LayoutOptions {
    fn default() -> Self {
        Self {
            tile_spacing: 9.0,
            header_size: 22.0,
            min_tile_size: 80.0,
            max_tile_size: 200.0,
            algorithm: LayoutAlgorithm::Sweep,
            row_mode: RowMode::ExhaustiveFirstRow,
            row_sensitivity: 0.9,
            sweep_edge: SweepEdge::Left,
            swept_share: SweptShare::Sqrt,
            sweep_to_parent: SweepToParent::Fallback,
            viewport_aspect: None,
        }
    }
}

impl LayoutOptions {
    pub fn validate(&self) -> Result<(), LayoutError> {
        let invalid = |msg: String| Err(LayoutError::InvalidOptions(msg));
        let sizes = [
            ("tileSpacing", self.tile_spacing),
            ("headerSize", self.header_size),
            ("minTileSize", self.min_tile_size),
            ("maxTileSize", self.max_tile_size),
            ("rowSensitivity", self.row_sensitivity),
        ];
        for (name, value) in sizes {
            if !value.is_finite() {
                return invalid(format!("{name} must be finite, got {value}"));
            }
            if value < 0.0 {
                return invalid(format!("{name} must not be negative, got {value}"));
            }
        }
        if self.min_tile_size <= 0.0 {
            return invalid("minTileSize must be positive".to_string());
        }
        if self.min_tile_size > self.max_tile_size {
            return invalid(format!(
                "minTileSize ({}) exceeds maxTileSize ({})",
                self.min_tile_size, self.max_tile_size
            ));
        }
        if self.row_sensitivity > 1.0 {
            return invalid(format!(
                "rowSensitivity must be within [0, 1], got {}",
                self.row_sensitivity
            ));
        }
        if let Some(aspect) = self.viewport_aspect
            && !(aspect.is_finite() && aspect > 0.0)
        {
            return invalid(format!("viewportAspect must be positive, got {aspect}"));
        }
        Ok(())
    }

    pub(crate) fn header(&self, show_header: bool) -> f64 {
        if show_header { self.header_size } else { 0.0 }
    }
}
