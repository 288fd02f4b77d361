/// Live wpm observed at `t` seconds into a session
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WpmSample {
    pub t: f64,
    pub wpm: f64,
}

impl WpmSample {
    pub fn new(t: u32, wpm: u32) -> Self {
        Self {
            t: f64::from(t),
            wpm: f64::from(wpm),
        }
    }
}

impl From<WpmSample> for (f64, f64) {
    fn from(p: WpmSample) -> Self {
        (p.t, p.wpm)
    }
}

/// Highest wpm in a series, 0 when empty
pub fn peak_wpm(samples: &[WpmSample]) -> f64 {
    samples.iter().map(|s| s.wpm).fold(0.0, f64::max)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sample_into_tuple() {
        let tuple: (f64, f64) = WpmSample::new(3, 42).into();
        assert_eq!(tuple, (3.0, 42.0));
    }

    #[test]
    fn test_peak_wpm() {
        assert_eq!(peak_wpm(&[]), 0.0);
        let samples = [WpmSample::new(1, 20), WpmSample::new(2, 55), WpmSample::new(3, 40)];
        assert_eq!(peak_wpm(&samples), 55.0);
    }
}
