//! Occupancy snapshot aggregation.

use lodgr_core::repository::BuildingCounts;
use serde::Serialize;

/// Occupancy figures for one building.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct BuildingOccupancy {
    pub building: String,
    pub total: u64,
    pub occupied: u64,
    pub vacant: u64,
    /// `round(occupied / total × 100)`; 0 for an empty building.
    pub percentage: u32,
}

/// Point-in-time occupancy across all buildings.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct OccupancySnapshot {
    pub total_units: u64,
    pub occupied_units: u64,
    pub available_units: u64,
    /// Global `round(occupied / total × 100)`; 0 when there are no units.
    pub occupancy_rate: u32,
    /// Sorted by building name.
    pub buildings: Vec<BuildingOccupancy>,
}

fn rate(occupied: u64, total: u64) -> u32 {
    if total == 0 {
        0
    } else {
        ((occupied as f64 / total as f64) * 100.0).round() as u32
    }
}

/// Aggregate per-building counts into a snapshot.
pub fn build_snapshot(mut counts: Vec<BuildingCounts>) -> OccupancySnapshot {
    counts.sort_by(|a, b| a.building.cmp(&b.building));

    let total_units: u64 = counts.iter().map(|c| c.total).sum();
    let occupied_units: u64 = counts.iter().map(|c| c.occupied).sum();

    let buildings = counts
        .into_iter()
        .map(|c| BuildingOccupancy {
            percentage: rate(c.occupied, c.total),
            vacant: c.total - c.occupied,
            building: c.building,
            total: c.total,
            occupied: c.occupied,
        })
        .collect();

    OccupancySnapshot {
        total_units,
        occupied_units,
        available_units: total_units - occupied_units,
        occupancy_rate: rate(occupied_units, total_units),
        buildings,
    }
}
