//! Optimizer: least-cost solve of the blend linear program
//!
//! Backed by `good_lp` with the pure-Rust `microlp` simplex. One solve per
//! call, no retries; the simplex is deterministic and terminates finitely so
//! identical inputs always produce identical quantities.

use good_lp::{
    constraint, default_solver, variable, Expression, ProblemVariables, ResolutionError,
    Solution, SolverModel, Variable,
};
use tracing::{debug, info, warn};

use super::constraints::{build_problem, BlendProblem, ConstraintKind, QuantityBounds};
use crate::config::SolverConfig;
use crate::types::{BlendSolution, CoalSource, FailureKind, SourceQuantity, TargetSpecification};

/// `Σ coefficients[i] · x[i]`
fn row_expression(coefficients: &[f64], x: &[Variable]) -> Expression {
    x.iter().zip(coefficients).map(|(v, c)| *v * *c).sum()
}

/// Remove solver round-off: values within tolerance of a bound snap onto it,
/// everything is clamped into `[lower, upper]`.
fn snap(value: f64, bounds: &QuantityBounds, tolerance: f64) -> f64 {
    if (value - bounds.lower).abs() <= tolerance {
        return bounds.lower;
    }
    if (value - bounds.upper).abs() <= tolerance * bounds.upper.max(1.0) {
        return bounds.upper;
    }
    value.clamp(bounds.lower, bounds.upper)
}

/// Round-off snapping for a whole assignment.
///
/// The tolerance shrinks with requirements below one tonne so a tiny blend is
/// not snapped to zero. Snapped values are kept only if every equality row
/// stays as balanced as the raw solver output; otherwise plain clamping wins.
fn snap_all(problem: &BlendProblem, raw: &[f64], tolerance: f64) -> Vec<f64> {
    let scaled = tolerance * problem.total_required().abs().min(1.0);
    let snapped: Vec<f64> = raw
        .iter()
        .zip(&problem.bounds)
        .map(|(v, b)| snap(*v, b, scaled))
        .collect();

    let balanced = problem
        .constraints
        .iter()
        .filter(|row| row.kind == ConstraintKind::Equality)
        .all(|row| {
            row.residual(&snapped).abs() <= row.residual(raw).abs() + scaled * row.rhs.abs()
        });
    if balanced {
        return snapped;
    }

    debug!("Snapping would unbalance an equality row, clamping only");
    raw.iter()
        .zip(&problem.bounds)
        .map(|(v, b)| v.clamp(b.lower, b.upper))
        .collect()
}

fn classify(err: &ResolutionError) -> FailureKind {
    match err {
        ResolutionError::Infeasible => FailureKind::Infeasible,
        ResolutionError::Unbounded => FailureKind::Unbounded,
        _ => FailureKind::SolverError,
    }
}

/// Solve a prepared problem.
pub fn solve_problem(problem: &BlendProblem, config: &SolverConfig) -> BlendSolution {
    let mut vars = ProblemVariables::new();
    let x: Vec<Variable> = problem
        .bounds
        .iter()
        .map(|b| vars.add(variable().min(b.lower).max(b.upper)))
        .collect();

    let objective = row_expression(&problem.objective, &x);
    let mut model = vars.minimise(objective).using(default_solver);

    for row in &problem.constraints {
        let lhs = row_expression(&row.coefficients, &x);
        let c = match row.kind {
            ConstraintKind::Equality => constraint::eq(lhs, row.rhs),
            ConstraintKind::AtLeast => constraint::geq(lhs, row.rhs),
        };
        model = model.with(c);
    }

    debug!(
        variables = problem.num_variables(),
        constraints = problem.num_constraints(),
        "Solving blend LP"
    );

    match model.solve() {
        Ok(solution) => {
            let raw: Vec<f64> = x.iter().map(|v| solution.value(*v)).collect();
            let values = snap_all(problem, &raw, config.tolerance);
            let total_cost = problem.cost(&values);

            info!(total_cost, "Blend optimization converged");

            BlendSolution {
                success: true,
                quantities: problem
                    .source_names
                    .iter()
                    .zip(values)
                    .map(|(name, quantity)| SourceQuantity {
                        source: name.clone(),
                        quantity,
                    })
                    .collect(),
                total_cost,
                failure_kind: None,
                failure_reason: None,
            }
        }
        Err(e) => {
            let kind = classify(&e);
            warn!(failure = %kind, reason = %e, "Blend optimization failed");
            BlendSolution::failed(kind, e.to_string())
        }
    }
}

/// Find the least-cost blend of `sources` that meets `target`.
///
/// Inputs are expected to have passed [`super::model::validate`]. Infeasibility
/// is reported through `success = false`, never as an error.
pub fn optimize(
    sources: &[CoalSource],
    target: &TargetSpecification,
    config: &SolverConfig,
) -> BlendSolution {
    let problem = build_problem(sources, target);
    solve_problem(&problem, config)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn coal(name: &str, gcv: f64, ash: f64, cost: f64, available: f64) -> CoalSource {
        CoalSource {
            name: name.to_string(),
            gcv,
            ash,
            sulfur: 0.5,
            moisture: 8.0,
            unit_cost: cost,
            available,
        }
    }

    fn reference_sources() -> Vec<CoalSource> {
        vec![
            CoalSource {
                name: "A".into(),
                gcv: 6000.0,
                ash: 10.0,
                sulfur: 0.5,
                moisture: 8.0,
                unit_cost: 100.0,
                available: 10000.0,
            },
            CoalSource {
                name: "B".into(),
                gcv: 5500.0,
                ash: 12.0,
                sulfur: 0.6,
                moisture: 10.0,
                unit_cost: 80.0,
                available: 15000.0,
            },
        ]
    }

    fn reference_target(total: f64) -> TargetSpecification {
        TargetSpecification {
            gcv_min: Some(5800.0),
            ash_max: Some(12.0),
            sulfur_max: Some(0.6),
            moisture_max: Some(10.0),
            total_required: total,
        }
    }

    #[test]
    fn reference_blend_binds_gcv() {
        let solution = optimize(&reference_sources(), &reference_target(5000.0), &SolverConfig::default());
        assert!(solution.success, "{:?}", solution.failure_reason);

        let a = solution.quantity_of("A").unwrap();
        let b = solution.quantity_of("B").unwrap();
        // GCV >= 5800 needs at least 60% of A; cheapest blend sits on the bound
        assert!((a - 3000.0).abs() < 1e-3, "A = {a}");
        assert!((b - 2000.0).abs() < 1e-3, "B = {b}");
        assert!((solution.total_cost - 460_000.0).abs() < 1e-2);
    }

    #[test]
    fn shortfall_is_reported_not_clamped() {
        let solution = optimize(&reference_sources(), &reference_target(30000.0), &SolverConfig::default());
        assert!(!solution.success);
        assert!(solution.quantities.is_empty());
        assert_eq!(solution.failure_kind, Some(FailureKind::Infeasible));
        assert!(solution.failure_reason.is_some());
    }

    #[test]
    fn unreachable_quality_is_infeasible() {
        let mut target = reference_target(5000.0);
        target.gcv_min = Some(6500.0);
        let solution = optimize(&reference_sources(), &target, &SolverConfig::default());
        assert!(!solution.success);
        assert_eq!(solution.failure_kind, Some(FailureKind::Infeasible));
    }

    #[test]
    fn zero_quantities_are_retained() {
        let sources = vec![
            coal("Cheap", 6000.0, 8.0, 50.0, 1000.0),
            coal("Pricey", 6000.0, 8.0, 90.0, 1000.0),
        ];
        let target = TargetSpecification {
            total_required: 500.0,
            ..Default::default()
        };
        let solution = optimize(&sources, &target, &SolverConfig::default());
        assert!(solution.success);
        assert_eq!(solution.quantities.len(), 2);
        assert_eq!(solution.quantity_of("Pricey"), Some(0.0));
        assert!((solution.quantity_of("Cheap").unwrap() - 500.0).abs() < 1e-6);
    }

    #[test]
    fn availability_caps_cheapest_source() {
        let sources = vec![
            coal("Cheap", 6000.0, 8.0, 50.0, 300.0),
            coal("Pricey", 6000.0, 8.0, 90.0, 1000.0),
        ];
        let target = TargetSpecification {
            total_required: 500.0,
            ..Default::default()
        };
        let solution = optimize(&sources, &target, &SolverConfig::default());
        assert!(solution.success);
        assert_eq!(solution.quantity_of("Cheap"), Some(300.0));
        assert!((solution.quantity_of("Pricey").unwrap() - 200.0).abs() < 1e-6);
    }

    #[test]
    fn identical_inputs_give_identical_quantities() {
        let config = SolverConfig::default();
        let first = optimize(&reference_sources(), &reference_target(5000.0), &config);
        let second = optimize(&reference_sources(), &reference_target(5000.0), &config);
        assert_eq!(first.quantities, second.quantities);
    }

    #[test]
    fn snap_clamps_round_off() {
        let bounds = QuantityBounds { lower: 0.0, upper: 100.0 };
        assert_eq!(snap(-1e-9, &bounds, 1e-6), 0.0);
        assert_eq!(snap(100.000_000_01, &bounds, 1e-6), 100.0);
        assert_eq!(snap(150.0, &bounds, 1e-6), 100.0);
        assert_eq!(snap(42.5, &bounds, 1e-6), 42.5);
    }

    #[test]
    fn tiny_requirement_keeps_mass_balance() {
        let sources = reference_sources();
        let target = reference_target(5e-7);
        let solution = optimize(&sources, &target, &SolverConfig::default());
        assert!(solution.success, "{:?}", solution.failure_reason);

        let sum = solution.total_quantity();
        assert!((sum - 5e-7).abs() <= 5e-10, "sum = {sum}");
        assert!(solution.quantity_of("A").unwrap() > 0.0);
        assert!(crate::blend::project(&solution, &sources, 0.1).is_ok());
    }

    #[test]
    fn snapping_that_breaks_total_falls_back_to_clamp() {
        let sources = vec![
            coal("X", 6000.0, 8.0, 50.0, 10.0),
            coal("Y", 6000.0, 8.0, 60.0, 10.0),
            coal("Z", 6000.0, 8.0, 70.0, 10.0),
        ];
        let target = TargetSpecification {
            total_required: 1.0,
            ..Default::default()
        };
        let problem = build_problem(&sources, &target);

        // Y and Z each sit inside the tolerance, together they exceed it
        let raw = [1.0 - 1.8e-6, 9e-7, 9e-7];
        assert_eq!(snap_all(&problem, &raw, 1e-6), raw.to_vec());

        // A single stray value still snaps
        let raw = [1.0 - 1e-9, 1e-9, 0.0];
        assert_eq!(snap_all(&problem, &raw, 1e-6), vec![1.0 - 1e-9, 0.0, 0.0]);
    }
}
