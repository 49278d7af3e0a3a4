/// Trailing moving average.
///
/// Element `i` is the mean of `series[i + 1 - window ..= i]`, shortened at the
/// start of the series instead of padded. A window of 0 or 1 returns the input.
pub fn moving_average(series: &[f64], window: usize) -> Vec<f64> {
    if window <= 1 {
        return series.to_vec();
    }

    let mut averages = Vec::with_capacity(series.len());
    let mut sum = 0.0;
    for (i, value) in series.iter().enumerate() {
        sum += value;
        if i >= window {
            sum -= series[i - window];
        }
        let len = (i + 1).min(window);
        averages.push(sum / len as f64);
    }
    averages
}
