//! Static difficulty tiers and the constraint tables attached to them

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Colors shared by every level, assigned round-robin to vines
pub const COLOR_PALETTE: [&str; 8] = [
    "#888888", "#7CB342", "#FF9800", "#FFC107", "#7C4DFF", "#29B6F6", "#FF6E40", "#CDDC39",
];

/// Allowed grid dimensions for a tier (inclusive)
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GridRange {
    /// Smallest width
    pub min_width: usize,
    /// Smallest height
    pub min_height: usize,
    /// Largest width
    pub max_width: usize,
    /// Largest height
    pub max_height: usize,
}

/// Generation constraints for one difficulty tier
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DifficultySpec {
    /// Inclusive range of vine counts
    pub vine_count: (usize, usize),
    /// Inclusive range of average vine lengths
    pub average_length: (usize, usize),
    /// Longest tolerated chain in the blocking graph
    pub max_blocking_depth: usize,
    /// Inclusive range of distinct colors
    pub color_count: (usize, usize),
    /// Fraction of cells vines should occupy
    pub min_occupancy: f64,
    /// Lives granted to the player
    pub default_grace: u32,
    /// Complexity label written to the level record
    pub complexity: &'static str,
    /// Grid sizes used by this tier
    pub grid: GridRange,
    /// Coverage target for strategies without the LIFO guarantee
    pub non_lifo_coverage: f64,
}

impl DifficultySpec {
    /// Midpoint of the average-length range
    pub const fn target_average_length(&self) -> usize {
        (self.average_length.0 + self.average_length.1) / 2
    }

    /// Midpoint of the tier's grid range as (width, height)
    pub const fn default_grid(&self) -> (usize, usize) {
        (
            (self.grid.min_width + self.grid.max_width) / 2,
            (self.grid.min_height + self.grid.max_height) / 2,
        )
    }
}

const TUTORIAL: DifficultySpec = DifficultySpec {
    vine_count: (3, 8),
    average_length: (6, 8),
    max_blocking_depth: 0,
    color_count: (1, 5),
    min_occupancy: 0.30,
    default_grace: 3,
    complexity: "simple",
    grid: GridRange { min_width: 5, min_height: 8, max_width: 9, max_height: 12 },
    non_lifo_coverage: 0.70,
};

const SEEDLING: DifficultySpec = DifficultySpec {
    vine_count: (4, 60),
    average_length: (6, 8),
    max_blocking_depth: 1,
    color_count: (1, 5),
    min_occupancy: 0.93,
    default_grace: 3,
    complexity: "low",
    grid: GridRange { min_width: 6, min_height: 8, max_width: 9, max_height: 12 },
    non_lifo_coverage: 0.85,
};

const SPROUT: DifficultySpec = DifficultySpec {
    vine_count: (8, 80),
    average_length: (3, 8),
    max_blocking_depth: 2,
    color_count: (1, 5),
    min_occupancy: 0.93,
    default_grace: 3,
    complexity: "medium",
    grid: GridRange { min_width: 9, min_height: 12, max_width: 12, max_height: 16 },
    non_lifo_coverage: 0.80,
};

const NURTURING: DifficultySpec = DifficultySpec {
    vine_count: (12, 100),
    average_length: (3, 8),
    max_blocking_depth: 3,
    color_count: (1, 6),
    min_occupancy: 0.93,
    default_grace: 3,
    complexity: "medium",
    grid: GridRange { min_width: 9, min_height: 16, max_width: 12, max_height: 20 },
    non_lifo_coverage: 0.75,
};

const FLOURISHING: DifficultySpec = DifficultySpec {
    vine_count: (15, 150),
    average_length: (2, 6),
    max_blocking_depth: 4,
    color_count: (1, 6),
    min_occupancy: 0.93,
    default_grace: 3,
    complexity: "high",
    grid: GridRange { min_width: 12, min_height: 20, max_width: 16, max_height: 24 },
    non_lifo_coverage: 0.70,
};

const TRANSCENDENT: DifficultySpec = DifficultySpec {
    vine_count: (15, 200),
    average_length: (2, 6),
    max_blocking_depth: 4,
    color_count: (1, 6),
    min_occupancy: 0.93,
    default_grace: 4,
    complexity: "extreme",
    grid: GridRange { min_width: 16, min_height: 28, max_width: 24, max_height: 40 },
    non_lifo_coverage: 0.60,
};

/// Difficulty tier of a level
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Difficulty {
    /// Introductory levels
    Tutorial,
    /// Early levels
    #[default]
    Seedling,
    /// Low-middle levels
    Sprout,
    /// Middle levels
    Nurturing,
    /// Late levels
    Flourishing,
    /// Final levels
    Transcendent,
}

impl Difficulty {
    /// Every tier in ascending order
    pub const ALL: [Self; 6] = [
        Self::Tutorial,
        Self::Seedling,
        Self::Sprout,
        Self::Nurturing,
        Self::Flourishing,
        Self::Transcendent,
    ];

    /// Constraint table for this tier
    pub const fn spec(self) -> &'static DifficultySpec {
        match self {
            Self::Tutorial => &TUTORIAL,
            Self::Seedling => &SEEDLING,
            Self::Sprout => &SPROUT,
            Self::Nurturing => &NURTURING,
            Self::Flourishing => &FLOURISHING,
            Self::Transcendent => &TRANSCENDENT,
        }
    }

    /// Tier assigned to a level by its position in the campaign
    pub const fn for_level(level_id: u32) -> Self {
        match level_id {
            0..=5 => Self::Tutorial,
            6..=15 => Self::Seedling,
            16..=30 => Self::Sprout,
            31..=44 => Self::Nurturing,
            45..=50 => Self::Flourishing,
            _ => Self::Transcendent,
        }
    }

    /// Display name as written in level files
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Tutorial => "Tutorial",
            Self::Seedling => "Seedling",
            Self::Sprout => "Sprout",
            Self::Nurturing => "Nurturing",
            Self::Flourishing => "Flourishing",
            Self::Transcendent => "Transcendent",
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Difficulty {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|tier| tier.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("unknown difficulty '{s}'"))
    }
}
