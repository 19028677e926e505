use itertools::Itertools;
use statrs::function::beta::beta_reg;

/// Pearson correlation coefficient and its two-sided p-value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Correlation {
    pub r: f64,
    pub pvalue: f64,
}

/// Changes between consecutive values.
pub fn deltas(values: &[f64]) -> Vec<f64> {
    values
        .iter()
        .tuple_windows()
        .map(|(prev, next)| next - prev)
        .collect()
}

/// Area under `y` over `x` with the trapezoidal rule.
pub fn trapezoid(x: &[f64], y: &[f64]) -> f64 {
    x.iter()
        .zip(y)
        .tuple_windows()
        .map(|((x0, y0), (x1, y1))| (x1 - x0) * (y0 + y1) / 2.0)
        .sum()
}

pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        0.0
    } else {
        values.iter().sum::<f64>() / values.len() as f64
    }
}

/// Pearson correlation with a Student-t test on `n - 2` degrees of freedom.
///
/// Returns `None` when fewer than three pairs are given or either series has no variance.
///
/// ```
/// use lineage::libs::stats::pearson;
///
/// let corr = pearson(&[1.0, 2.0, 3.0, 4.0, 5.0], &[2.0, 1.0, 4.0, 3.0, 5.0]).unwrap();
/// assert!((corr.r - 0.8).abs() < 1e-12);
/// assert!((corr.pvalue - 0.104088).abs() < 1e-6);
/// ```
pub fn pearson(x: &[f64], y: &[f64]) -> Option<Correlation> {
    let n = x.len();
    if n != y.len() || n < 3 {
        return None;
    }

    let mean_x = mean(x);
    let mean_y = mean(y);
    let (sxy, sxx, syy) = x.iter().zip(y).fold((0.0, 0.0, 0.0), |acc, (a, b)| {
        let dx = a - mean_x;
        let dy = b - mean_y;
        (acc.0 + dx * dy, acc.1 + dx * dx, acc.2 + dy * dy)
    });
    if sxx <= 0.0 || syy <= 0.0 {
        return None;
    }

    let r = (sxy / (sxx * syy).sqrt()).clamp(-1.0, 1.0);
    let df = (n - 2) as f64;
    let rest = 1.0 - r * r;
    let pvalue = if rest <= 0.0 {
        0.0
    } else {
        // P(|T| > t) = I_{df / (df + t^2)}(df / 2, 1 / 2)
        let t2 = r * r * df / rest;
        beta_reg(df / 2.0, 0.5, df / (df + t2))
    };

    Some(Correlation { r, pvalue })
}
