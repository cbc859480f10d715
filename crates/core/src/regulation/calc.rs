//! Pure transition rules shared by the phased-search strategies.

use super::types::CeilingGrowth;

/// Complexity a simplifying population must drop below before complexifying
/// may resume.
#[must_use]
pub fn relaxation_threshold(ceiling: f64, relaxation_margin: f64) -> f64 {
    ceiling * (1.0 - relaxation_margin)
}

/// Complexifying → Simplifying: the ceiling is met or exceeded.
#[must_use]
pub fn reaches_ceiling(mean_complexity: f64, ceiling: f64) -> bool {
    mean_complexity >= ceiling
}

/// Simplifying → Complexifying: the dwell floor has been served AND
/// complexity is strictly below the relaxation threshold.
#[must_use]
pub fn may_resume_complexifying(
    generations_in_simplifying_mode: u32,
    min_simplifying_generations: u32,
    mean_complexity: f64,
    threshold: f64,
) -> bool {
    generations_in_simplifying_mode >= min_simplifying_generations && mean_complexity < threshold
}

/// Ceiling established from an early-generation baseline.
#[must_use]
pub fn relative_ceiling(baseline: f64, headroom: f64, cap: Option<f64>) -> f64 {
    apply_cap(baseline + headroom, cap)
}

/// New ceiling after a simplifying phase ends at `mean_complexity`.
#[must_use]
pub fn rebased_ceiling(mean_complexity: f64, growth: CeilingGrowth, cap: Option<f64>) -> f64 {
    let grown = match growth {
        CeilingGrowth::Factor(factor) => mean_complexity * factor,
        CeilingGrowth::Increment(step) => mean_complexity + step,
    };
    apply_cap(grown, cap)
}

fn apply_cap(ceiling: f64, cap: Option<f64>) -> f64 {
    match cap {
        Some(cap) => ceiling.min(cap),
        None => ceiling,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_relaxation_threshold() {
        assert!((relaxation_threshold(100.0, 0.1) - 90.0).abs() < 1e-9);
        assert!((relaxation_threshold(100.0, 0.0) - 100.0).abs() < 1e-9);
    }

    #[test]
    fn test_reaches_ceiling_is_inclusive() {
        assert!(reaches_ceiling(100.0, 100.0));
        assert!(reaches_ceiling(100.5, 100.0));
        assert!(!reaches_ceiling(99.99, 100.0));
    }

    #[test]
    fn test_resume_requires_both_conditions() {
        // dwell not served
        assert!(!may_resume_complexifying(9, 10, 50.0, 90.0));
        // complexity not low enough
        assert!(!may_resume_complexifying(10, 10, 90.0, 90.0));
        assert!(may_resume_complexifying(10, 10, 89.9, 90.0));
        assert!(may_resume_complexifying(25, 10, 0.0, 90.0));
    }

    #[test]
    fn test_rebased_ceiling_factor() {
        let c = rebased_ceiling(80.0, CeilingGrowth::Factor(1.2), None);
        assert!((c - 96.0).abs() < 1e-9);
    }

    #[test]
    fn test_rebased_ceiling_increment() {
        let c = rebased_ceiling(80.0, CeilingGrowth::Increment(25.0), None);
        assert!((c - 105.0).abs() < 1e-9);
    }

    #[test]
    fn test_cap_bounds_growth() {
        let c = rebased_ceiling(200.0, CeilingGrowth::Factor(2.0), Some(250.0));
        assert!((c - 250.0).abs() < 1e-9);
        let c = relative_ceiling(40.0, 30.0, Some(60.0));
        assert!((c - 60.0).abs() < 1e-9);
        let c = relative_ceiling(40.0, 30.0, None);
        assert!((c - 70.0).abs() < 1e-9);
    }
}
