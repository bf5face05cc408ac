//! GARCH conditional-variance model.
//!
//! Fits a constant-mean GARCH model with one lag of squared shocks and three
//! lags of conditional variance by Gaussian maximum likelihood, then produces
//! the one-step-ahead variance forecast:
//!
//! ```text
//! e[t]      = r[t] - mu
//! sigma2[t] = omega + alpha * e[t-1]^2 + beta1 * sigma2[t-1] + beta2 * sigma2[t-2] + beta3 * sigma2[t-3]
//! ```
//!
//! Pre-sample shocks and variances use an exponentially weighted backcast
//! (decay 0.94) of the first 75 squared residuals. Returns are rescaled to
//! unit sample variance before fitting and the forecast is mapped back to the
//! original units.

use std::f64::consts::PI;

use thiserror::Error;

use super::math::{mean, sample_variance};
use super::optimizer::{SimplexConfig, nelder_mead};

/// Number of squared-shock lags.
pub const ARCH_LAGS: usize = 1;

/// Number of conditional-variance lags.
pub const GARCH_LAGS: usize = 3;

/// Smallest window that can be fitted.
pub const MIN_OBSERVATIONS: usize = 10;

const BACKCAST_DECAY: f64 = 0.94;
const BACKCAST_SPAN: usize = 75;
const VARIANCE_FLOOR: f64 = 1e-12;

/// Reasons a window could not produce a forecast.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum FitError {
    /// Window contains non-finite values or too few observations.
    #[error("Invalid input: {reason}")]
    InvalidInput {
        /// What was wrong with the window.
        reason: String,
    },

    /// Window has no dispersion.
    #[error("Degenerate window: zero variance")]
    Degenerate,

    /// Likelihood search did not converge.
    #[error("Likelihood search did not converge after {iterations} iterations")]
    NonConvergence {
        /// Iterations used.
        iterations: usize,
    },

    /// Fitted model produced a non-finite quantity.
    #[error("Numerical failure: {reason}")]
    Numerical {
        /// Which quantity failed.
        reason: String,
    },
}

/// GARCH(1,3) parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GarchParams {
    /// Constant mean.
    pub mu: f64,
    /// Variance intercept.
    pub omega: f64,
    /// Squared-shock coefficient.
    pub alpha: f64,
    /// Conditional-variance coefficients, most recent lag first.
    pub beta: [f64; GARCH_LAGS],
}

impl GarchParams {
    fn from_slice(theta: &[f64]) -> Self {
        Self {
            mu: theta[0],
            omega: theta[1],
            alpha: theta[2],
            beta: [theta[3], theta[4], theta[5]],
        }
    }

    fn to_vec(self) -> Vec<f64> {
        vec![
            self.mu,
            self.omega,
            self.alpha,
            self.beta[0],
            self.beta[1],
            self.beta[2],
        ]
    }

    /// Sum of the shock and variance coefficients.
    #[must_use]
    pub fn persistence(&self) -> f64 {
        self.alpha + self.beta.iter().sum::<f64>()
    }

    /// Whether the parameters describe a covariance-stationary process.
    #[must_use]
    pub fn is_stationary(&self) -> bool {
        self.omega > 0.0
            && self.alpha >= 0.0
            && self.beta.iter().all(|b| *b >= 0.0)
            && self.persistence() < 1.0
    }
}

/// Result of fitting one window.
#[derive(Debug, Clone, PartialEq)]
pub struct GarchFit {
    /// Parameters in the units of the input returns.
    pub params: GarchParams,
    /// Maximized log-likelihood of the rescaled series.
    pub log_likelihood: f64,
    /// One-step-ahead conditional variance, in the units of the input returns.
    pub forecast_variance: f64,
    /// Simplex iterations used.
    pub iterations: usize,
}

/// GARCH(1,3) estimator.
#[derive(Debug, Clone, Default)]
pub struct GarchModel {
    simplex: SimplexConfig,
}

impl GarchModel {
    /// Create an estimator with the given search settings.
    #[must_use]
    pub const fn new(simplex: SimplexConfig) -> Self {
        Self { simplex }
    }

    /// Fit the window and return the one-step-ahead variance forecast.
    ///
    /// # Errors
    ///
    /// Returns [`FitError`] when the window is unusable or the likelihood
    /// search fails.
    pub fn forecast(&self, returns: &[f64]) -> Result<f64, FitError> {
        self.fit(returns).map(|fit| fit.forecast_variance)
    }

    /// Fit the window.
    ///
    /// # Errors
    ///
    /// Returns [`FitError`] when the window is unusable or the likelihood
    /// search fails.
    pub fn fit(&self, returns: &[f64]) -> Result<GarchFit, FitError> {
        if returns.len() < MIN_OBSERVATIONS {
            return Err(FitError::InvalidInput {
                reason: format!(
                    "{} observations, need at least {MIN_OBSERVATIONS}",
                    returns.len()
                ),
            });
        }
        if returns.iter().any(|r| !r.is_finite()) {
            return Err(FitError::InvalidInput {
                reason: "non-finite return".to_string(),
            });
        }

        let variance = sample_variance(returns).ok_or(FitError::Degenerate)?;
        if !(variance > 0.0 && variance.is_finite()) {
            return Err(FitError::Degenerate);
        }
        let scale = variance.sqrt();
        let y: Vec<f64> = returns.iter().map(|r| r / scale).collect();

        let sample_mean = mean(&y).ok_or(FitError::Degenerate)?;
        let backcast = backcast(&y, sample_mean);

        let objective = |theta: &[f64]| {
            let params = GarchParams::from_slice(theta);
            if !params.is_stationary() {
                return f64::INFINITY;
            }
            -log_likelihood(&y, &params, backcast)
        };

        let start = starting_values(&y, sample_mean, backcast);
        let first = nelder_mead(objective, &start.to_vec(), &self.simplex);
        // Restart from the optimum to escape a prematurely collapsed simplex.
        let result = nelder_mead(objective, &first.point, &self.simplex);
        let iterations = first.iterations + result.iterations;

        if !result.converged || !result.value.is_finite() {
            return Err(FitError::NonConvergence { iterations });
        }

        let fitted = GarchParams::from_slice(&result.point);
        let sigma2 = conditional_variance(&y, &fitted, backcast);
        let scaled_forecast = one_step_forecast(&y, &fitted, &sigma2, backcast);
        let forecast_variance = scaled_forecast * variance;

        if !forecast_variance.is_finite() || forecast_variance <= 0.0 {
            return Err(FitError::Numerical {
                reason: format!("forecast variance {forecast_variance}"),
            });
        }

        Ok(GarchFit {
            params: GarchParams {
                mu: fitted.mu * scale,
                omega: fitted.omega * variance,
                alpha: fitted.alpha,
                beta: fitted.beta,
            },
            log_likelihood: -result.value,
            forecast_variance,
            iterations,
        })
    }
}

/// Exponentially weighted backcast of the leading squared residuals.
fn backcast(y: &[f64], mu: f64) -> f64 {
    let span = y.len().min(BACKCAST_SPAN);
    let mut weight = 1.0;
    let mut weighted = 0.0;
    let mut total = 0.0;
    for r in &y[..span] {
        let e = r - mu;
        weighted += weight * e * e;
        total += weight;
        weight *= BACKCAST_DECAY;
    }
    (weighted / total).max(VARIANCE_FLOOR)
}

/// Conditional variance path for the in-sample observations.
fn conditional_variance(y: &[f64], params: &GarchParams, backcast: f64) -> Vec<f64> {
    let mut sigma2 = Vec::with_capacity(y.len());
    for t in 0..y.len() {
        let shock_sq = if t >= 1 {
            let e = y[t - 1] - params.mu;
            e * e
        } else {
            backcast
        };
        let mut value = params.omega + params.alpha * shock_sq;
        for (lag, beta) in params.beta.iter().enumerate() {
            let prior = if t > lag { sigma2[t - 1 - lag] } else { backcast };
            value += beta * prior;
        }
        sigma2.push(value.max(VARIANCE_FLOOR));
    }
    sigma2
}

/// Gaussian log-likelihood of the series under `params`.
fn log_likelihood(y: &[f64], params: &GarchParams, backcast: f64) -> f64 {
    let sigma2 = conditional_variance(y, params, backcast);
    let ln_2pi = (2.0 * PI).ln();
    y.iter()
        .zip(&sigma2)
        .map(|(r, s2)| {
            let e = r - params.mu;
            -0.5 * (ln_2pi + s2.ln() + e * e / s2)
        })
        .sum()
}

/// Variance forecast for the observation after the window.
fn one_step_forecast(y: &[f64], params: &GarchParams, sigma2: &[f64], backcast: f64) -> f64 {
    let n = y.len();
    let e = y[n - 1] - params.mu;
    let mut value = params.omega + params.alpha * e * e;
    for (lag, beta) in params.beta.iter().enumerate() {
        let prior = if n > lag { sigma2[n - 1 - lag] } else { backcast };
        value += beta * prior;
    }
    value
}

/// Best likelihood over a small grid of stationary starting points.
fn starting_values(y: &[f64], mu: f64, backcast: f64) -> GarchParams {
    const ALPHAS: [f64; 3] = [0.05, 0.1, 0.2];
    const PERSISTENCE: [f64; 3] = [0.5, 0.9, 0.98];

    let mut best: Option<(GarchParams, f64)> = None;
    for alpha in ALPHAS {
        for persistence in PERSISTENCE {
            let beta_total = (persistence - alpha).max(0.0);
            let candidate = GarchParams {
                mu,
                // Rescaled series has unit variance.
                omega: 1.0 - persistence,
                alpha,
                beta: [beta_total / GARCH_LAGS as f64; GARCH_LAGS],
            };
            let ll = log_likelihood(y, &candidate, backcast);
            if ll.is_finite() && best.is_none_or(|(_, b)| ll > b) {
                best = Some((candidate, ll));
            }
        }
    }

    best.map_or(
        GarchParams {
            mu,
            omega: 0.1,
            alpha: 0.1,
            beta: [0.8 / GARCH_LAGS as f64; GARCH_LAGS],
        },
        |(params, _)| params,
    )
}
