//! Rolling-window indicator math.
//!
//! Pure functions over a slice of values (closing prices unless noted),
//! each returning one `Option<f64>` per input element. `None` marks the
//! warm-up prefix where the trailing window is not yet full; every window
//! includes the element it is aligned to.

/// Simple moving average over a trailing window.
#[must_use]
pub fn sma(values: &[f64], window: usize) -> Vec<Option<f64>> {
    let mut out = vec![None; values.len()];
    if window == 0 || values.len() < window {
        return out;
    }
    let mut sum: f64 = values[..window].iter().sum();
    out[window - 1] = Some(sum / window as f64);
    for i in window..values.len() {
        sum += values[i] - values[i - window];
        out[i] = Some(sum / window as f64);
    }
    out
}

/// Rolling sample standard deviation (ddof = 1) over a trailing window.
#[must_use]
pub fn rolling_std(values: &[f64], window: usize) -> Vec<Option<f64>> {
    let mut out = vec![None; values.len()];
    if window < 2 || values.len() < window {
        return out;
    }
    for i in (window - 1)..values.len() {
        let slice = &values[i + 1 - window..=i];
        let mean = slice.iter().sum::<f64>() / window as f64;
        let variance =
            slice.iter().map(|v| (v - mean) * (v - mean)).sum::<f64>() / (window as f64 - 1.0);
        out[i] = Some(variance.sqrt());
    }
    out
}

/// Exponential moving average with smoothing `2 / (span + 1)`, seeded by
/// the first full SMA of the span. Defined from the span-th element on.
#[must_use]
pub fn ema(values: &[f64], span: usize) -> Vec<Option<f64>> {
    let mut out = vec![None; values.len()];
    if span == 0 || values.len() < span {
        return out;
    }
    let alpha = 2.0 / (span as f64 + 1.0);
    let mut current = values[..span].iter().sum::<f64>() / span as f64;
    out[span - 1] = Some(current);
    for i in span..values.len() {
        current = alpha * values[i] + (1.0 - alpha) * current;
        out[i] = Some(current);
    }
    out
}

/// Relative Strength Index with Wilder's smoothing.
///
/// The first averages are plain means of the first `period` gains and
/// losses; each later average folds the new delta in with weight
/// `1 / period`. Defined from element `period` on, clamped to [0, 100],
/// and 100 when the average loss is zero.
#[must_use]
pub fn rsi(values: &[f64], period: usize) -> Vec<Option<f64>> {
    let mut out = vec![None; values.len()];
    if period == 0 || values.len() <= period {
        return out;
    }
    let mut avg_gain = 0.0;
    let mut avg_loss = 0.0;
    for i in 1..=period {
        let delta = values[i] - values[i - 1];
        if delta > 0.0 {
            avg_gain += delta;
        } else {
            avg_loss -= delta;
        }
    }
    avg_gain /= period as f64;
    avg_loss /= period as f64;
    out[period] = Some(rsi_value(avg_gain, avg_loss));

    let weight = period as f64 - 1.0;
    for i in (period + 1)..values.len() {
        let delta = values[i] - values[i - 1];
        let (gain, loss) = if delta > 0.0 {
            (delta, 0.0)
        } else {
            (0.0, -delta)
        };
        avg_gain = (avg_gain * weight + gain) / period as f64;
        avg_loss = (avg_loss * weight + loss) / period as f64;
        out[i] = Some(rsi_value(avg_gain, avg_loss));
    }
    out
}

fn rsi_value(avg_gain: f64, avg_loss: f64) -> f64 {
    if avg_loss == 0.0 {
        return 100.0;
    }
    let rs = avg_gain / avg_loss;
    (100.0 - 100.0 / (1.0 + rs)).clamp(0.0, 100.0)
}

/// MACD line, signal line, and histogram.
#[derive(Debug, Clone)]
pub struct Macd {
    pub line: Vec<Option<f64>>,
    pub signal: Vec<Option<f64>>,
    pub histogram: Vec<Option<f64>>,
}

/// MACD = EMA(fast) − EMA(slow); signal = EMA(`signal_span`) of the MACD
/// line; histogram = MACD − signal.
///
/// The signal EMA runs over the defined portion of the MACD line, so it
/// becomes available `signal_span` elements after the line does.
#[must_use]
pub fn macd(values: &[f64], fast: usize, slow: usize, signal_span: usize) -> Macd {
    let n = values.len();
    let ema_fast = ema(values, fast);
    let ema_slow = ema(values, slow);

    let mut line = vec![None; n];
    for i in 0..n {
        if let (Some(f), Some(s)) = (ema_fast[i], ema_slow[i]) {
            line[i] = Some(f - s);
        }
    }

    let defined: Vec<f64> = line.iter().filter_map(|v| *v).collect();
    let offset = n - defined.len();
    let mut signal = vec![None; n];
    for (j, value) in ema(&defined, signal_span).into_iter().enumerate() {
        signal[offset + j] = value;
    }

    let mut histogram = vec![None; n];
    for i in 0..n {
        if let (Some(m), Some(s)) = (line[i], signal[i]) {
            histogram[i] = Some(m - s);
        }
    }

    Macd {
        line,
        signal,
        histogram,
    }
}

/// Bollinger band columns.
#[derive(Debug, Clone)]
pub struct Bollinger {
    pub upper: Vec<Option<f64>>,
    pub middle: Vec<Option<f64>>,
    pub lower: Vec<Option<f64>>,
    pub width: Vec<Option<f64>>,
}

/// Bollinger bands: middle = SMA(window); upper/lower = middle ± k × rolling
/// sample std; width = (upper − lower) / middle.
#[must_use]
pub fn bollinger(values: &[f64], window: usize, k: f64) -> Bollinger {
    let n = values.len();
    let middle = sma(values, window);
    let std = rolling_std(values, window);

    let mut upper = vec![None; n];
    let mut lower = vec![None; n];
    let mut width = vec![None; n];
    for i in 0..n {
        if let (Some(m), Some(s)) = (middle[i], std[i]) {
            let u = m + k * s;
            let l = m - k * s;
            upper[i] = Some(u);
            lower[i] = Some(l);
            width[i] = Some((u - l) / m);
        }
    }

    Bollinger {
        upper,
        middle,
        lower,
        width,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_close(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() < 1e-9,
            "expected {expected}, got {actual}"
        );
    }

    #[test]
    fn sma_warms_up_then_tracks_window() {
        let out = sma(&[1.0, 2.0, 3.0, 4.0, 5.0], 2);
        assert_eq!(out[0], None);
        assert_close(out[1].unwrap(), 1.5);
        assert_close(out[4].unwrap(), 4.5);
    }

    #[test]
    fn sma_on_short_series_is_all_none() {
        assert!(sma(&[1.0, 2.0], 5).iter().all(Option::is_none));
    }

    #[test]
    fn ema_is_seeded_by_first_sma() {
        // span 3 -> alpha 0.5; seed = mean(1,2,3) = 2
        let out = ema(&[1.0, 2.0, 3.0, 4.0, 5.0], 3);
        assert_eq!(out[1], None);
        assert_close(out[2].unwrap(), 2.0);
        assert_close(out[3].unwrap(), 3.0);
        assert_close(out[4].unwrap(), 4.0);
    }

    #[test]
    fn rolling_std_uses_sample_variance() {
        let out = rolling_std(&[1.0, 2.0, 3.0, 4.0], 3);
        assert_eq!(out[1], None);
        assert_close(out[2].unwrap(), 1.0);
        assert_close(out[3].unwrap(), 1.0);
    }

    #[test]
    fn rsi_is_100_when_only_gains() {
        let values: Vec<f64> = (1..=20).map(f64::from).collect();
        let out = rsi(&values, 14);
        assert_eq!(out[13], None);
        assert_close(out[14].unwrap(), 100.0);
        assert_close(out[19].unwrap(), 100.0);
    }

    #[test]
    fn rsi_flat_series_reads_100_by_convention() {
        // No gains and no losses: average loss is zero.
        let out = rsi(&[5.0; 16], 14);
        assert_close(out[15].unwrap(), 100.0);
    }

    #[test]
    fn rsi_wilder_smoothing_hand_computed() {
        // period 2 over deltas +1, -0.5, +0.3
        let out = rsi(&[1.0, 2.0, 1.5, 1.8], 2);
        assert_close(out[2].unwrap(), 100.0 - 100.0 / 3.0);
        // avg_gain = (0.5 + 0.3)/2 = 0.4, avg_loss = 0.25/2 = 0.125
        assert_close(out[3].unwrap(), 100.0 - 100.0 / (1.0 + 0.4 / 0.125));
    }

    #[test]
    fn macd_defined_once_slow_ema_exists() {
        let values: Vec<f64> = (1..=12).map(f64::from).collect();
        let out = macd(&values, 2, 4, 3);
        assert_eq!(out.line[2], None);
        assert!(out.line[3].is_some());
        // Signal needs 3 defined MACD values: indexes 3, 4, 5.
        assert_eq!(out.signal[4], None);
        assert!(out.signal[5].is_some());
        let (m, s, h) = (
            out.line[6].unwrap(),
            out.signal[6].unwrap(),
            out.histogram[6].unwrap(),
        );
        assert_close(h, m - s);
    }

    #[test]
    fn bollinger_bands_bracket_the_mean() {
        let out = bollinger(&[1.0, 2.0, 3.0, 4.0, 5.0], 3, 2.0);
        assert_eq!(out.middle[1], None);
        // mean 2, std 1 -> upper 4, lower 0, width 4/2
        assert_close(out.middle[2].unwrap(), 2.0);
        assert_close(out.upper[2].unwrap(), 4.0);
        assert_close(out.lower[2].unwrap(), 0.0);
        assert_close(out.width[2].unwrap(), 2.0);
    }
}
