//! Substitutable next-position predictors
//!
//! Both predictors answer the same question: given the trailing `lookback`
//! positions of a transect, what is the position one epoch later?

use shorewatch_core::{Error, PredictorKind, Result};
use tracing::{debug, info, warn};

use super::forward_fill;
use crate::timeseries::SequenceTensor;

/// Next-position predictor over a fixed lookback window
pub trait Predictor: Send + Sync {
    fn name(&self) -> &'static str;

    /// Predict the value following `window` (oldest first).
    fn predict_next(&self, window: &[f64]) -> Result<f64>;
}

/// Straight-line extrapolation through the window
#[derive(Debug, Clone, Copy, Default)]
pub struct LinearExtrapolation;

impl Predictor for LinearExtrapolation {
    fn name(&self) -> &'static str {
        "linear"
    }

    fn predict_next(&self, window: &[f64]) -> Result<f64> {
        let n = window.len();
        if n == 0 {
            return Err(Error::invalid("window", 0, "must hold at least one value"));
        }
        if n == 1 {
            return Ok(window[0]);
        }

        // Least-squares line over x = 0..n, evaluated at x = n.
        let nf = n as f64;
        let x_mean = (nf - 1.0) / 2.0;
        let y_mean = window.iter().sum::<f64>() / nf;
        let mut sxy = 0.0;
        let mut sxx = 0.0;
        for (i, &y) in window.iter().enumerate() {
            let dx = i as f64 - x_mean;
            sxy += dx * (y - y_mean);
            sxx += dx * dx;
        }
        let slope = sxy / sxx;
        Ok(y_mean + slope * (nf - x_mean))
    }
}

/// Ridge term added to the non-intercept diagonal
const RIDGE: f64 = 1e-8;

/// Least-squares model trained on sliding windows of every transect.
///
/// Inputs and targets share one standardisation (they are the same
/// quantity), fitted as `z_next = b0 + Σ b_i z_i`.
#[derive(Debug, Clone)]
pub struct RegressionPredictor {
    lookback: usize,
    mean: f64,
    scale: f64,
    /// Intercept followed by one weight per window position
    coefficients: Vec<f64>,
    num_training_windows: usize,
}

impl RegressionPredictor {
    /// Fit on `windows[i] → targets[i]`.
    ///
    /// # Errors
    /// [`Error::InsufficientTrainingData`] with fewer than `lookback + 1`
    /// windows; [`Error::Algorithm`] for a singular system.
    pub fn fit(windows: &[Vec<f64>], targets: &[f64], lookback: usize) -> Result<Self> {
        if lookback == 0 {
            return Err(Error::invalid("lookback", 0, "must be at least 1"));
        }
        if windows.len() != targets.len() || windows.iter().any(|w| w.len() != lookback) {
            return Err(Error::Other(format!(
                "training data mismatch: {} windows, {} targets, lookback {}",
                windows.len(),
                targets.len(),
                lookback
            )));
        }
        let required = lookback + 1;
        if windows.len() < required {
            return Err(Error::InsufficientTrainingData {
                available: windows.len(),
                required,
            });
        }

        let values = || windows.iter().flatten().chain(targets.iter()).copied();
        let count = (windows.len() * lookback + targets.len()) as f64;
        let mean = values().sum::<f64>() / count;
        let var = values().map(|v| (v - mean).powi(2)).sum::<f64>() / count;
        let scale = if var > 0.0 { var.sqrt() } else { 1.0 };

        // Normal equations (XᵀX + λI) β = Xᵀy, X = [1 | z]
        let n = lookback + 1;
        let mut mat = vec![0.0_f64; n * n];
        let mut rhs = vec![0.0_f64; n];
        let mut row = vec![0.0_f64; n];
        for (w, &t) in windows.iter().zip(targets) {
            row[0] = 1.0;
            for (k, &v) in w.iter().enumerate() {
                row[k + 1] = (v - mean) / scale;
            }
            let y = (t - mean) / scale;
            for i in 0..n {
                rhs[i] += row[i] * y;
                for j in 0..n {
                    mat[i * n + j] += row[i] * row[j];
                }
            }
        }
        for i in 1..n {
            mat[i * n + i] += RIDGE;
        }

        let coefficients = solve_dense(n, &mut mat, &mut rhs)?;
        debug!("Regression coefficients: {:?}", coefficients);

        Ok(Self {
            lookback,
            mean,
            scale,
            coefficients,
            num_training_windows: windows.len(),
        })
    }

    /// Fit on every complete sliding window of the forward-filled tensor
    pub fn fit_tensor(tensor: &SequenceTensor, lookback: usize) -> Result<Self> {
        let (windows, targets) = training_windows(tensor, lookback);
        Self::fit(&windows, &targets, lookback)
    }

    pub fn lookback(&self) -> usize {
        self.lookback
    }

    pub fn coefficients(&self) -> &[f64] {
        &self.coefficients
    }

    pub fn num_training_windows(&self) -> usize {
        self.num_training_windows
    }
}

impl Predictor for RegressionPredictor {
    fn name(&self) -> &'static str {
        "regression"
    }

    fn predict_next(&self, window: &[f64]) -> Result<f64> {
        if window.len() != self.lookback {
            return Err(Error::invalid(
                "window",
                window.len(),
                format!("model was trained on windows of {}", self.lookback),
            ));
        }
        let z = window
            .iter()
            .zip(&self.coefficients[1..])
            .fold(self.coefficients[0], |acc, (&v, &b)| {
                acc + b * (v - self.mean) / self.scale
            });
        Ok(z * self.scale + self.mean)
    }
}

/// Sliding `(window, next value)` pairs from every forward-filled tensor row.
///
/// Pairs touching a leading gap are skipped.
pub fn training_windows(tensor: &SequenceTensor, lookback: usize) -> (Vec<Vec<f64>>, Vec<f64>) {
    let mut windows = Vec::new();
    let mut targets = Vec::new();
    if lookback == 0 {
        return (windows, targets);
    }
    for i in 0..tensor.num_transects() {
        let filled = forward_fill(tensor.row(i));
        for chunk in filled.windows(lookback + 1) {
            if chunk.iter().all(|v| v.is_finite()) {
                windows.push(chunk[..lookback].to_vec());
                targets.push(chunk[lookback]);
            }
        }
    }
    (windows, targets)
}

/// Pick the predictor for `kind`.
///
/// `Auto` trains the regression model and falls back to linear
/// extrapolation (with a warning) when that fails.
pub fn select_predictor(
    kind: PredictorKind,
    tensor: &SequenceTensor,
    lookback: usize,
) -> Result<Box<dyn Predictor>> {
    match kind {
        PredictorKind::Linear => Ok(Box::new(LinearExtrapolation)),
        PredictorKind::Regression => {
            let model = RegressionPredictor::fit_tensor(tensor, lookback)?;
            info!(
                "Trained regression predictor on {} windows",
                model.num_training_windows()
            );
            Ok(Box::new(model))
        }
        PredictorKind::Auto => match RegressionPredictor::fit_tensor(tensor, lookback) {
            Ok(model) => {
                info!(
                    "Trained regression predictor on {} windows",
                    model.num_training_windows()
                );
                Ok(Box::new(model))
            }
            Err(e) => {
                warn!("Regression predictor unavailable ({}); using linear extrapolation", e);
                Ok(Box::new(LinearExtrapolation))
            }
        },
    }
}

/// Gaussian elimination with partial pivoting on a row-major `n × n` system
fn solve_dense(n: usize, mat: &mut [f64], rhs: &mut [f64]) -> Result<Vec<f64>> {
    for col in 0..n {
        let mut max_val = mat[col * n + col].abs();
        let mut max_row = col;
        for row in (col + 1)..n {
            let val = mat[row * n + col].abs();
            if val > max_val {
                max_val = val;
                max_row = row;
            }
        }

        if max_val < 1e-14 {
            return Err(Error::Algorithm("Regression: singular normal matrix".into()));
        }

        if max_row != col {
            for j in 0..n {
                mat.swap(col * n + j, max_row * n + j);
            }
            rhs.swap(col, max_row);
        }

        let pivot = mat[col * n + col];
        for row in (col + 1)..n {
            let factor = mat[row * n + col] / pivot;
            mat[row * n + col] = 0.0;
            for j in (col + 1)..n {
                mat[row * n + j] -= factor * mat[col * n + j];
            }
            rhs[row] -= factor * rhs[col];
        }
    }

    let mut x = vec![0.0_f64; n];
    for col in (0..n).rev() {
        let mut sum = rhs[col];
        for j in (col + 1)..n {
            sum -= mat[col * n + j] * x[j];
        }
        x[col] = sum / mat[col * n + col];
    }
    Ok(x)
}
