use std::iter;

use serde::Serialize;

use crate::{BoardAnalysis, ZombieBoard};

pub const AGGREGATE_HEIGHT_WEIGHT: f64 = -0.510_066;
pub const COMPLETED_LINES_WEIGHT: f64 = 0.760_666;
pub const HOLES_WEIGHT: f64 = -0.356_63;
pub const BUMPINESS_WEIGHT: f64 = -0.184_483;

/// Weights in [`BoardMetrics::to_array`] order.
pub const FITNESS_WEIGHTS: [f64; 4] = [
    AGGREGATE_HEIGHT_WEIGHT,
    COMPLETED_LINES_WEIGHT,
    HOLES_WEIGHT,
    BUMPINESS_WEIGHT,
];

/// The four grid measurements the fitness is made of.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct BoardMetrics {
    pub aggregate_height: u32,
    pub completed_lines: u32,
    pub holes: u32,
    pub bumpiness: u32,
}

impl BoardMetrics {
    #[must_use]
    pub fn measure<B>(board: &B) -> Self
    where
        B: ZombieBoard + ?Sized,
    {
        Self::from_analysis(&board.analyze())
    }

    #[must_use]
    pub fn from_analysis(analysis: &BoardAnalysis) -> Self {
        Self {
            aggregate_height: analysis.aggregate_height(),
            completed_lines: analysis.completed_lines(),
            holes: analysis.num_holes(),
            bumpiness: analysis.surface_bumpiness(),
        }
    }

    #[must_use]
    pub fn to_array(&self) -> [f64; 4] {
        [
            f64::from(self.aggregate_height),
            f64::from(self.completed_lines),
            f64::from(self.holes),
            f64::from(self.bumpiness),
        ]
    }

    /// Linear combination of the metrics with [`FITNESS_WEIGHTS`]. Higher is better.
    #[must_use]
    pub fn fitness(&self) -> f64 {
        iter::zip(self.to_array(), FITNESS_WEIGHTS)
            .map(|(m, w)| m * w)
            .sum()
    }
}
