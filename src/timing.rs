// src/timing.rs
// Edge timing analysis: dot-length estimation and Morse token classification

use crate::config::UnitMode;
use crate::morse::WORD_MARKER;
use std::iter;

// --- Timing Constants ---
// Seconds per dot at 1 WPM; "PARIS" plus its word gap spans 50 dot units.
pub const WPM_DOT_SECONDS: f32 = 1.2;
// Gaps shorter than half a dot are treated as noise.
const NOISE_BOUNDARY: f32 = 0.5;
// Ideal ratios are 1:3, so 2.0 separates dots from dashes (and element gaps
// from letter gaps).
const DIT_DAH_BOUNDARY: f32 = 2.0;
// Letter gaps are 3 dots and word gaps 7; 5.0 sits between them.
const WORD_SPACE_BOUNDARY: f32 = 5.0;

// --- Dot Length Fit ---
const UNIT_MULTIPLES: [f32; 3] = [1.0, 3.0, 7.0];
const FIT_MIN_WPM: u32 = 5;
const FIT_MAX_WPM: u32 = 60;
const FIT_MAX_ITERATIONS: usize = 100;

pub fn wpm(dot_seconds: f32) -> f32 {
    WPM_DOT_SECONDS / dot_seconds
}

pub fn dot_seconds_for_wpm(wpm: f32) -> f32 {
    WPM_DOT_SECONDS / wpm
}

/// Indices `i` where `signal[i] != signal[i - 1]`.
pub fn find_edges(signal: &[bool]) -> Vec<usize> {
    (1..signal.len())
        .filter(|&i| signal[i] != signal[i - 1])
        .collect()
}

fn steps_to_seconds(steps: usize, hop: usize, sample_rate: u32) -> f32 {
    (steps * hop) as f32 / sample_rate as f32
}

/// Durations in seconds between consecutive edges.
pub fn edge_gaps(edges: &[usize], hop: usize, sample_rate: u32) -> Vec<f32> {
    edges
        .windows(2)
        .map(|pair| steps_to_seconds(pair[1] - pair[0], hop, sample_rate))
        .collect()
}

fn nearest_multiple(gap: f32, dot: f32) -> usize {
    let mut best = 0;
    for (k, m) in UNIT_MULTIPLES.iter().enumerate().skip(1) {
        if (gap - m * dot).abs() < (gap - UNIT_MULTIPLES[best] * dot).abs() {
            best = k;
        }
    }
    best
}

/// Sum of squared distances from each gap to the closest of 1, 3 or 7 dots.
pub fn fit_cost(gaps: &[f32], dot: f32) -> f32 {
    gaps.iter()
        .map(|&g| {
            UNIT_MULTIPLES
                .iter()
                .map(|m| (g - m * dot).powi(2))
                .fold(f32::MAX, f32::min)
        })
        .sum()
}

/// Alternates nearest-cluster assignment with the closed-form least-squares
/// dot length for that assignment until the assignment settles.
fn refine_dot(gaps: &[f32], seed: f32) -> f32 {
    let mut dot = seed;
    let mut assignment = vec![usize::MAX; gaps.len()];
    for _ in 0..FIT_MAX_ITERATIONS {
        let mut changed = false;
        let mut num = 0.0;
        let mut den = 0.0;
        for (&g, slot) in gaps.iter().zip(assignment.iter_mut()) {
            let k = nearest_multiple(g, dot);
            if *slot != k {
                *slot = k;
                changed = true;
            }
            let m = UNIT_MULTIPLES[k];
            num += m * g;
            den += m * m;
        }
        if !changed {
            break;
        }
        dot = num / den;
    }
    dot
}

/// Fits the dot length that best explains `gaps` as multiples of 1, 3 and 7
/// dots. The fit is started from `seed` and from the dot length of every
/// whole WPM in 5..=60; the lowest-cost result wins, earliest start on ties.
///
/// With fewer than two gaps there is nothing to fit and `seed` is returned.
pub fn estimate_dot_unit(gaps: &[f32], seed: f32) -> f32 {
    if gaps.len() < 2 {
        return seed;
    }
    let tolerance = gaps.iter().map(|g| g * g).sum::<f32>() * 1e-6;

    let starts = iter::once(seed)
        .chain((FIT_MIN_WPM..=FIT_MAX_WPM).map(|w| dot_seconds_for_wpm(w as f32)));

    let mut best_dot = seed;
    let mut best_cost = f32::MAX;
    for start in starts {
        let dot = refine_dot(gaps, start);
        if !(dot.is_finite() && dot > 0.0) {
            continue;
        }
        let cost = fit_cost(gaps, dot);
        if cost < best_cost - tolerance {
            best_cost = cost;
            best_dot = dot;
        }
    }
    log::debug!(
        "Dot length fit over {} gaps: {:.4} s (cost {:.3e})",
        gaps.len(),
        best_dot,
        best_cost
    );
    best_dot
}

/// Turns edges into a token string.
///
/// `edges` must be ascending indices into `signal`, as from [`find_edges`].
/// Each edge is classified by the time since the last accepted edge and the
/// state of the signal just before it.
pub fn classify(
    signal: &[bool],
    edges: &[usize],
    hop: usize,
    sample_rate: u32,
    dot_seconds: f32,
) -> String {
    let mut tokens = String::new();
    let mut last_index = 0;

    for &edge in edges {
        let gap = steps_to_seconds(edge.saturating_sub(last_index), hop, sample_rate);
        let was_on = edge
            .checked_sub(1)
            .and_then(|i| signal.get(i))
            .copied()
            .unwrap_or(false);

        if gap < NOISE_BOUNDARY * dot_seconds {
            // last_index stays put: the next gap is measured across the blip.
            log::trace!("edge {edge}: {gap:.4} s blip skipped");
            continue;
        }

        if gap < DIT_DAH_BOUNDARY * dot_seconds {
            if was_on {
                tokens.push('.');
            }
        } else if gap < WORD_SPACE_BOUNDARY * dot_seconds {
            tokens.push(if was_on { '-' } else { ' ' });
        } else {
            tokens.push_str(WORD_MARKER);
        }
        log::trace!("edge {edge}: {gap:.4} s, on = {was_on}");
        last_index = edge;
    }
    tokens
}

#[derive(Debug, Clone, PartialEq)]
pub struct TimingAnalysis {
    pub tokens: String,
    pub dot_seconds: f32,
    /// Whether `dot_seconds` was fitted to the recording.
    pub estimated: bool,
    pub edge_count: usize,
}

impl TimingAnalysis {
    /// Words per minute, reported only for a fitted dot length.
    pub fn wpm(&self) -> Option<f32> {
        self.estimated.then(|| wpm(self.dot_seconds))
    }
}

pub fn analyze(signal: &[bool], hop: usize, sample_rate: u32, mode: UnitMode) -> TimingAnalysis {
    let edges = find_edges(signal);
    let (dot_seconds, estimated) = match mode {
        UnitMode::Estimate { seed } => {
            let gaps = edge_gaps(&edges, hop, sample_rate);
            (estimate_dot_unit(&gaps, seed), true)
        }
        UnitMode::Fixed(dot) => (dot, false),
    };
    log::debug!(
        "{} edges over {} steps, dot = {:.4} s",
        edges.len(),
        signal.len(),
        dot_seconds
    );

    let tokens = classify(signal, &edges, hop, sample_rate, dot_seconds);
    TimingAnalysis {
        tokens,
        dot_seconds,
        estimated,
        edge_count: edges.len(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::morse::decode;

    // hop 64 at 64 kHz: one step per millisecond.
    const HOP: usize = 64;
    const RATE: u32 = 64000;

    fn runs(parts: &[(bool, usize)]) -> Vec<bool> {
        parts
            .iter()
            .flat_map(|&(on, len)| iter::repeat_n(on, len))
            .collect()
    }

    #[test]
    fn edges_mark_every_transition() {
        let signal = runs(&[(false, 2), (true, 3), (false, 1)]);
        assert_eq!(find_edges(&signal), vec![2, 5]);
        assert!(find_edges(&[]).is_empty());
        assert!(find_edges(&[true; 10]).is_empty());
    }

    #[test]
    fn gaps_are_in_seconds() {
        let gaps = edge_gaps(&[10, 70, 250], HOP, RATE);
        assert_eq!(gaps.len(), 2);
        assert!((gaps[0] - 0.06).abs() < 1e-6);
        assert!((gaps[1] - 0.18).abs() < 1e-6);
    }

    #[test]
    fn letter_a_yields_dot_dash() {
        let signal = runs(&[
            (false, 60),
            (true, 60),
            (false, 60),
            (true, 180),
            (false, 180),
            (true, 30),
        ]);
        let analysis = analyze(&signal, HOP, RATE, UnitMode::Fixed(0.06));
        assert_eq!(analysis.tokens, ".- ");
        assert_eq!(analysis.wpm(), None);
        assert_eq!(decode(&analysis.tokens), "A");
    }

    #[test]
    fn half_dot_gap_is_not_noise() {
        let signal = runs(&[(true, 30), (false, 200)]);
        assert_eq!(classify(&signal, &find_edges(&signal), HOP, RATE, 0.06), ".");

        let signal = runs(&[(true, 29), (false, 200)]);
        assert_eq!(classify(&signal, &find_edges(&signal), HOP, RATE, 0.06), "");
    }

    #[test]
    fn long_gap_emits_word_marker() {
        let signal = runs(&[(true, 60), (false, 420), (true, 60), (false, 10)]);
        let tokens = classify(&signal, &find_edges(&signal), HOP, RATE, 0.06);
        assert_eq!(tokens, ". / .");
        assert_eq!(decode(&tokens), "E E");
    }

    #[test]
    fn skipped_blip_keeps_previous_reference() {
        // A 5 ms tone blip inside a gap. The gap after the blip is measured from
        // the edge before it (121 ms), which makes it a letter space.
        let signal = runs(&[
            (false, 60),
            (true, 60),
            (false, 100),
            (true, 5),
            (false, 116),
            (true, 60),
            (false, 99),
        ]);
        let tokens = classify(&signal, &find_edges(&signal), HOP, RATE, 0.06);
        assert_eq!(tokens, ". .");
    }

    #[test]
    fn recovers_dot_from_ideal_gaps() {
        for &dt in &[0.06f32, 0.08, 0.1, 0.045] {
            let gaps: Vec<f32> = [1.0, 3.0, 1.0, 7.0, 3.0, 1.0, 3.0, 1.0, 7.0]
                .iter()
                .map(|m| m * dt)
                .collect();
            let recovered = estimate_dot_unit(&gaps, 0.06);
            assert!((recovered - dt).abs() < 1e-3, "dt {dt}, got {recovered}");
            assert!((wpm(recovered) - 1.2 / recovered).abs() < 1e-6);
        }
    }

    #[test]
    fn too_few_gaps_return_seed() {
        assert_eq!(estimate_dot_unit(&[], 0.06), 0.06);
        assert_eq!(estimate_dot_unit(&[0.2], 0.06), 0.06);
    }

    #[test]
    fn fit_cost_is_zero_on_ideal_gaps() {
        let gaps = [0.05, 0.15, 0.35];
        assert!(fit_cost(&gaps, 0.05) < 1e-9);
        assert!(fit_cost(&gaps, 0.07) > fit_cost(&gaps, 0.05));
    }

    #[test]
    fn estimated_analysis_reports_wpm() {
        // "AN E" at 80 ms per dot (15 WPM).
        let signal = runs(&[
            (false, 80),
            (true, 80),
            (false, 80),
            (true, 240),
            (false, 240),
            (true, 240),
            (false, 80),
            (true, 80),
            (false, 560),
            (true, 80),
            (false, 80),
        ]);
        let analysis = analyze(&signal, HOP, RATE, UnitMode::Estimate { seed: 0.06 });
        assert!((analysis.dot_seconds - 0.08).abs() < 1e-3);
        let wpm = analysis.wpm().unwrap();
        assert!((wpm - 15.0).abs() < 0.2, "wpm {wpm}");
        assert_eq!(analysis.tokens, ".- -. / .");
        assert_eq!(decode(&analysis.tokens), "AN E");
    }

    #[test]
    fn no_edges_no_tokens() {
        let analysis = analyze(&[false; 100], HOP, RATE, UnitMode::Estimate { seed: 0.06 });
        assert_eq!(analysis.tokens, "");
        assert_eq!(analysis.dot_seconds, 0.06);
        assert_eq!(analysis.edge_count, 0);
    }
}
