// src/binarize.rs
// Energy series to on/off presence signal

/// Presence threshold for `series`: `ratio` times its mean energy.
///
/// Relative to the recording's own level, so it follows signal strength and
/// input gain. An empty series gives a threshold of zero.
pub fn threshold(series: &[f32], ratio: f32) -> f32 {
    if series.is_empty() {
        return 0.0;
    }
    let mean = series.iter().sum::<f32>() / series.len() as f32;
    ratio * mean
}

/// Marks every step whose energy is strictly above `threshold`.
pub fn binarize(series: &[f32], threshold: f32) -> Vec<bool> {
    series.iter().map(|&e| e > threshold).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn threshold_is_fraction_of_mean() {
        let series = [0.0, 4.0, 0.0, 4.0];
        assert_eq!(threshold(&series, 0.5), 1.0);
        assert_eq!(threshold(&[], 0.5), 0.0);
    }

    #[test]
    fn binarize_uses_strict_comparison() {
        let series = [0.0, 1.0, 2.0, 1.0, 0.5];
        assert_eq!(
            binarize(&series, 1.0),
            vec![false, false, true, false, false]
        );
    }

    #[test]
    fn silence_is_all_off() {
        let series = vec![0.0; 16];
        let t = threshold(&series, 0.5);
        assert!(binarize(&series, t).iter().all(|&on| !on));
    }

    #[test]
    fn threshold_scales_with_gain() {
        let quiet = [0.0, 0.01, 0.01, 0.0];
        let loud: Vec<f32> = quiet.iter().map(|e| e * 1000.0).collect();
        assert_eq!(
            binarize(&quiet, threshold(&quiet, 0.5)),
            binarize(&loud, threshold(&loud, 0.5))
        );
    }
}
