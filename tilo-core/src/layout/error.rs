use thiserror::Error;

use crate::tree::TreeError;

/// Why a layout attempt failed.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LayoutError {
    #[error("area cannot fit a tile of the minimum size")]
    AreaTooSmall,

    #[error("row grouping cannot satisfy the minimum tile size")]
    GroupingInfeasible,

    #[error("no feasible arrangement among the candidate groupings")]
    NoFeasibleArrangement,

    #[error("a child node could not be laid out")]
    ChildLayoutFailed,

    #[error("invalid layout options: {0}")]
    InvalidOptions(String),

    #[error(transparent)]
    Tree(#[from] TreeError),
}

pub type LayoutResult<T> = Result<T, LayoutError>;

impl LayoutError {
    /// Stable kebab-case name for the frontend.
    pub fn kind(&self) -> &'static str {
        match self {
            LayoutError::AreaTooSmall => "area-too-small",
            LayoutError::GroupingInfeasible => "grouping-infeasible",
            LayoutError::NoFeasibleArrangement => "no-feasible-arrangement",
            LayoutError::ChildLayoutFailed => "child-layout-failed",
            LayoutError::InvalidOptions(_) => "invalid-options",
            LayoutError::Tree(TreeError::UnknownNode(_)) => "unknown-node",
            LayoutError::Tree(TreeError::StaleNode(_)) => "stale-node",
            LayoutError::Tree(TreeError::NothingToExpand(_)) => "nothing-to-expand",
        }
    }
}
