//! Derivative-free minimization (Nelder-Mead simplex).

/// Simplex search settings.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SimplexConfig {
    /// Maximum simplex iterations.
    pub max_iterations: usize,
    /// Convergence threshold on the spread of objective values, relative to
    /// `1 + |best value|`.
    pub f_tolerance: f64,
    /// Convergence threshold on the simplex diameter.
    pub x_tolerance: f64,
}

impl Default for SimplexConfig {
    fn default() -> Self {
        Self {
            max_iterations: 2000,
            f_tolerance: 1e-8,
            x_tolerance: 1e-4,
        }
    }
}

/// Result of a simplex search.
#[derive(Debug, Clone, PartialEq)]
pub struct Minimum {
    /// Best point found.
    pub point: Vec<f64>,
    /// Objective value at `point`.
    pub value: f64,
    /// Iterations used.
    pub iterations: usize,
    /// Whether both tolerances were met.
    pub converged: bool,
}

const REFLECTION: f64 = 1.0;
const EXPANSION: f64 = 2.0;
const CONTRACTION: f64 = 0.5;
const SHRINK: f64 = 0.5;

/// Minimize `objective` starting from `start`.
///
/// Non-finite objective values are treated as `+inf`, so infeasible regions
/// can be expressed by returning `f64::INFINITY`.
pub fn nelder_mead<F>(objective: F, start: &[f64], config: &SimplexConfig) -> Minimum
where
    F: Fn(&[f64]) -> f64,
{
    let dim = start.len();
    let eval = |x: &[f64]| {
        let v = objective(x);
        if v.is_finite() { v } else { f64::INFINITY }
    };

    let mut simplex: Vec<(Vec<f64>, f64)> = Vec::with_capacity(dim + 1);
    simplex.push((start.to_vec(), eval(start)));
    for i in 0..dim {
        let mut vertex = start.to_vec();
        vertex[i] = if vertex[i] == 0.0 {
            0.000_25
        } else {
            vertex[i] * 1.05
        };
        let value = eval(&vertex);
        simplex.push((vertex, value));
    }

    let mut iterations = 0;
    let mut converged = false;

    while iterations < config.max_iterations {
        simplex.sort_by(|a, b| a.1.total_cmp(&b.1));

        if has_converged(&simplex, config) {
            converged = true;
            break;
        }
        iterations += 1;

        let centroid = centroid(&simplex[..dim]);
        let worst = simplex[dim].clone();

        let reflected = affine(&centroid, &worst.0, -REFLECTION);
        let f_reflected = eval(&reflected);

        if f_reflected < simplex[0].1 {
            let expanded = affine(&centroid, &worst.0, -EXPANSION);
            let f_expanded = eval(&expanded);
            simplex[dim] = if f_expanded < f_reflected {
                (expanded, f_expanded)
            } else {
                (reflected, f_reflected)
            };
            continue;
        }

        if f_reflected < simplex[dim - 1].1 {
            simplex[dim] = (reflected, f_reflected);
            continue;
        }

        // Contract toward the better of the worst and reflected points.
        let (contracted, f_contracted) = if f_reflected < worst.1 {
            let c = affine(&centroid, &worst.0, -CONTRACTION);
            let f = eval(&c);
            (c, f)
        } else {
            let c = affine(&centroid, &worst.0, CONTRACTION);
            let f = eval(&c);
            (c, f)
        };

        if f_contracted < worst.1.min(f_reflected) {
            simplex[dim] = (contracted, f_contracted);
            continue;
        }

        let best = simplex[0].0.clone();
        for vertex in simplex.iter_mut().skip(1) {
            let shrunk: Vec<f64> = best
                .iter()
                .zip(&vertex.0)
                .map(|(b, x)| b + SHRINK * (x - b))
                .collect();
            let value = eval(&shrunk);
            *vertex = (shrunk, value);
        }
    }

    simplex.sort_by(|a, b| a.1.total_cmp(&b.1));
    let (point, value) = simplex.swap_remove(0);

    Minimum {
        point,
        value,
        iterations,
        converged,
    }
}

fn centroid(vertices: &[(Vec<f64>, f64)]) -> Vec<f64> {
    let n = vertices.len() as f64;
    let dim = vertices.first().map_or(0, |v| v.0.len());
    (0..dim)
        .map(|i| vertices.iter().map(|v| v.0[i]).sum::<f64>() / n)
        .collect()
}

/// `centroid + coef * (point - centroid)`.
fn affine(centroid: &[f64], point: &[f64], coef: f64) -> Vec<f64> {
    centroid
        .iter()
        .zip(point)
        .map(|(c, p)| c + coef * (p - c))
        .collect()
}

fn has_converged(sorted: &[(Vec<f64>, f64)], config: &SimplexConfig) -> bool {
    let best = &sorted[0];
    let f_spread = sorted
        .iter()
        .skip(1)
        .map(|v| (v.1 - best.1).abs())
        .fold(0.0, f64::max);
    let x_spread = sorted
        .iter()
        .skip(1)
        .flat_map(|v| v.0.iter().zip(&best.0).map(|(a, b)| (a - b).abs()))
        .fold(0.0, f64::max);

    f_spread.is_finite()
        && f_spread <= config.f_tolerance * (1.0 + best.1.abs())
        && x_spread <= config.x_tolerance
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rosenbrock(x: &[f64]) -> f64 {
        (1.0 - x[0]).powi(2) + 100.0 * (x[1] - x[0] * x[0]).powi(2)
    }

    #[test]
    fn test_minimizes_quadratic() {
        let result = nelder_mead(
            |x| (x[0] - 3.0).powi(2) + (x[1] + 1.0).powi(2),
            &[0.0, 0.0],
            &SimplexConfig::default(),
        );

        assert!(result.converged);
        assert!((result.point[0] - 3.0).abs() < 1e-3);
        assert!((result.point[1] + 1.0).abs() < 1e-3);
    }

    #[test]
    fn test_minimizes_rosenbrock() {
        let config = SimplexConfig {
            max_iterations: 5000,
            ..SimplexConfig::default()
        };
        let result = nelder_mead(rosenbrock, &[-1.2, 1.0], &config);

        assert!(result.converged);
        assert!((result.point[0] - 1.0).abs() < 1e-3);
        assert!((result.point[1] - 1.0).abs() < 1e-3);
    }

    #[test]
    fn test_respects_infeasible_region() {
        // Minimum of x^2 subject to x >= 0.5.
        let result = nelder_mead(
            |x| if x[0] < 0.5 { f64::INFINITY } else { x[0] * x[0] },
            &[2.0],
            &SimplexConfig::default(),
        );

        assert!(result.point[0] >= 0.5);
        assert!((result.point[0] - 0.5).abs() < 1e-3);
    }

    #[test]
    fn test_iteration_cap_reports_not_converged() {
        let config = SimplexConfig {
            max_iterations: 3,
            ..SimplexConfig::default()
        };
        let result = nelder_mead(rosenbrock, &[-1.2, 1.0], &config);

        assert!(!result.converged);
        assert_eq!(result.iterations, 3);
    }
}
