//! Parameter grid expansion.

use candlelab_core::strategy::MaCrossoverParams;

use crate::config::MaCrossoverGrid;

/// Every `(short, long)` pair from the grid's window lists with
/// `short < long`, in product order (short-major).
pub fn generate_parameter_sets(grid: &MaCrossoverGrid) -> Vec<MaCrossoverParams> {
    let mut sets = Vec::with_capacity(grid.short_window.len() * grid.long_window.len());
    for &short in &grid.short_window {
        for &long in &grid.long_window {
            // Skip invalid combinations (short >= long)
            if short >= long {
                continue;
            }
            sets.push(grid.params(short, long));
        }
    }
    sets
}

/// Number of valid grid points, without building them.
pub fn grid_size(grid: &MaCrossoverGrid) -> usize {
    grid.short_window
        .iter()
        .map(|&s| grid.long_window.iter().filter(|&&l| s < l).count())
        .sum()
}
