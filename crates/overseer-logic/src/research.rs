//! Research pricing.
//!
//! Options are priced by their 1-based position in the catalog. The first
//! option always costs exactly the base cost; later options scale linearly
//! with their position and the current cost exponent, then snap down to the
//! nearest quarter so prices read cleanly.
//!
//! ```
//! use overseer_logic::research::option_cost;
//!
//! assert_eq!(option_cost(1, 0.75, 3.25), 0.75);
//! assert_eq!(option_cost(2, 0.75, 3.25), 2.25);
//! ```

/// Position multiplier shared by cost and display thresholds.
pub fn cost_multiplier(index: u32, cost_exponent: f64) -> f64 {
    if index <= 1 {
        1.0
    } else {
        (index - 1) as f64 * cost_exponent
    }
}

/// Rounds `value` down to the nearest 0.25 by trimming its fractional part.
pub fn snap_to_quarter(value: f64) -> f64 {
    let mut fraction = value.fract();
    fraction -= fraction % 0.25;
    value.trunc() + fraction
}

/// Reliability cost of the option at 1-based `index`.
pub fn option_cost(index: u32, base_cost: f64, cost_exponent: f64) -> f64 {
    snap_to_quarter(base_cost * cost_multiplier(index, cost_exponent))
}

/// Reliability at which the option at `index` becomes visible.
pub fn display_threshold(index: u32, base_display: f64, cost_exponent: f64) -> f64 {
    base_display * cost_multiplier(index, cost_exponent)
}
