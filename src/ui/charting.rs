use wordrush::{time_series::WpmSample, ResultRecord};

/// Compute X (seconds) and Y (WPM) bounds for the results chart
pub fn compute_chart_params(samples: &[WpmSample], duration_secs: u32) -> (f64, f64) {
    let highest_wpm = wordrush::time_series::peak_wpm(samples);

    let overall_duration = samples
        .last()
        .map(|s| s.t)
        .unwrap_or(f64::from(duration_secs))
        .max(1.0);

    (overall_duration, highest_wpm.round().max(1.0))
}

/// (test number, wpm) and (test number, accuracy) series for past results
pub fn history_series(records: &[ResultRecord]) -> (Vec<(f64, f64)>, Vec<(f64, f64)>) {
    records
        .iter()
        .enumerate()
        .map(|(i, r)| {
            let x = (i + 1) as f64;
            ((x, f64::from(r.wpm())), (x, f64::from(r.accuracy())))
        })
        .unzip()
}

/// Saved wpm values at x = 1..=n and the current test at n + 1
pub fn trend_series(previous: &[u32], current: u32) -> (Vec<(f64, f64)>, (f64, f64)) {
    let series = previous
        .iter()
        .enumerate()
        .map(|(i, &wpm)| ((i + 1) as f64, f64::from(wpm)))
        .collect();
    (series, ((previous.len() + 1) as f64, f64::from(current)))
}

/// Format a simple numeric label consistently
pub fn format_label(val: f64) -> String {
    if (val - val.round()).abs() < f64::EPSILON {
        format!("{}", val.round())
    } else {
        format!("{val:.2}")
    }
}
