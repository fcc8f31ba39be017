//! Risk and return metrics over an equity history

use crate::Amount;
use statrs::statistics::Statistics;

/// Largest peak-to-trough decline, in percent
///
/// The running peak starts at 0 and never resets, so the first recorded
/// equity sets the initial peak. Steps with a non-positive peak are skipped.
#[must_use]
pub fn max_drawdown(equity_history: &[Amount]) -> f64 {
    let mut peak: Amount = 0;
    let mut max_dd = 0.0_f64;

    for &equity in equity_history {
        if equity > peak {
            peak = equity;
        }
        if peak > 0 {
            let dd = (peak - equity) as f64 / peak as f64;
            if dd > max_dd {
                max_dd = dd;
            }
        }
    }

    max_dd * 100.0
}

/// Total return in percent, 0 when there was no starting capital
#[must_use]
pub fn total_return(initial: Amount, final_equity: Amount) -> f64 {
    if initial == 0 {
        return 0.0;
    }
    (final_equity - initial) as f64 / initial as f64 * 100.0
}

/// Step-to-step equity returns as fractions, skipping steps from zero equity
#[must_use]
pub fn step_returns(equity_history: &[Amount]) -> Vec<f64> {
    equity_history
        .windows(2)
        .filter(|w| w[0] != 0)
        .map(|w| (w[1] - w[0]) as f64 / w[0] as f64)
        .collect()
}

/// Sample standard deviation of step returns, in percent
///
/// 0 when fewer than two returns exist.
#[must_use]
pub fn volatility(equity_history: &[Amount]) -> f64 {
    let returns = step_returns(equity_history);
    if returns.len() < 2 {
        return 0.0;
    }
    let std_dev = (&returns[..]).std_dev();
    if std_dev.is_finite() { std_dev * 100.0 } else { 0.0 }
}
