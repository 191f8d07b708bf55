//! Hysteron weight distributions over the Preisach plane.

use ndarray::Array1;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// An error raised while evaluating a [`Density`] on the hysteron grid.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DensityError {
    #[error("covariance matrix is not positive definite")]
    BadCovariance,
    #[error("mixture needs equal, nonzero counts of means, covariances, and weights")]
    MismatchedMixture,
}

/// The hysteron weight distribution, evaluated on the normalized
/// `[-1, 1]^2` alpha/beta grid before scaling. Distribution parameters are
/// therefore in normalized grid units.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Density {
    /// Equal weight on every grid point.
    Uniform,
    /// A single bivariate Gaussian.
    Gaussian { mean: [f64; 2], cov: [[f64; 2]; 2] },
    /// A weighted sum of bivariate Gaussians.
    GaussianMixture {
        means: Vec<[f64; 2]>,
        covs: Vec<[[f64; 2]; 2]>,
        weights: Vec<f64>,
    },
}

impl Default for Density {
    fn default() -> Self {
        Self::Gaussian {
            mean: [0.0, 0.0],
            cov: [[0.1, 0.0], [0.0, 0.1]],
        }
    }
}

impl Density {
    /// Evaluates the density at every grid point, normalized to unit sum.
    ///
    /// # Errors
    ///
    /// Returns a [`DensityError`] if a covariance matrix is not positive
    /// definite or the mixture components disagree in length.
    pub(crate) fn evaluate(&self, grid: &[[f64; 2]]) -> Result<Array1<f64>, DensityError> {
        let mut density = match self {
            Self::Uniform => Array1::from_elem(grid.len(), 1.0),
            Self::Gaussian { mean, cov } => gaussian(grid, *mean, *cov)?,
            Self::GaussianMixture {
                means,
                covs,
                weights,
            } => {
                if means.is_empty() || means.len() != covs.len() || means.len() != weights.len() {
                    return Err(DensityError::MismatchedMixture);
                }
                let mut sum = Array1::zeros(grid.len());
                for ((&mean, &cov), &weight) in means.iter().zip(covs).zip(weights) {
                    sum += &(gaussian(grid, mean, cov)? * weight);
                }
                sum
            }
        };
        let total = density.sum();
        density /= total;
        Ok(density)
    }
}

/// An unnormalized bivariate Gaussian over the grid, including the
/// determinant prefactor so mixture components keep their relative mass.
fn gaussian(
    grid: &[[f64; 2]],
    mean: [f64; 2],
    cov: [[f64; 2]; 2],
) -> Result<Array1<f64>, DensityError> {
    let det = cov[0][0] * cov[1][1] - cov[0][1] * cov[1][0];
    if det <= 0.0 || cov[0][0] <= 0.0 {
        return Err(DensityError::BadCovariance);
    }
    let inv = [
        [cov[1][1] / det, -cov[0][1] / det],
        [-cov[1][0] / det, cov[0][0] / det],
    ];
    let reg = ((2.0 * std::f64::consts::PI).powi(2) * det).powf(-0.5);

    Ok(grid
        .iter()
        .map(|point| {
            let d = [point[0] - mean[0], point[1] - mean[1]];
            let quad = d[0] * (inv[0][0] * d[0] + inv[0][1] * d[1])
                + d[1] * (inv[1][0] * d[0] + inv[1][1] * d[1]);
            reg * (-0.5 * quad).exp()
        })
        .collect())
}
