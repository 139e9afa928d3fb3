// src/trace.rs
// ASCII trace of the energy series against the presence threshold

use std::io::{self, Write};

const BAR_WIDTH: usize = 100;

/// Writes one line per spectrogram step: a bar scaled to the loudest step,
/// `|` at the threshold and a trailing `*` when the step counts as present.
pub fn write_trace<W: Write>(
    out: &mut W,
    energies: &[f32],
    threshold: f32,
    hop: usize,
    sample_rate: u32,
) -> io::Result<()> {
    writeln!(
        out,
        "# steps: {}, hop: {} samples, threshold: {:.4e}",
        energies.len(),
        hop,
        threshold
    )?;
    let max_val = energies.iter().copied().fold(0.0f32, f32::max);
    if max_val <= 0.0 {
        return Ok(());
    }

    let thresh_pos = (threshold / max_val * BAR_WIDTH as f32).round() as usize;
    for (i, &val) in energies.iter().enumerate() {
        let bar_len = ((val / max_val * BAR_WIDTH as f32).round() as usize).min(BAR_WIDTH);
        let mut line = vec![' '; BAR_WIDTH + 1];
        line[..bar_len].fill('#');
        if thresh_pos <= BAR_WIDTH {
            line[thresh_pos] = '|';
        }
        let seconds = (i * hop) as f32 / sample_rate as f32;
        let marker = if val > threshold { '*' } else { ' ' };
        writeln!(
            out,
            "{seconds:9.4} {}{marker}",
            line.into_iter().collect::<String>()
        )?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn marks_steps_above_threshold() {
        let mut buf = Vec::new();
        write_trace(&mut buf, &[0.0, 1.0, 0.25], 0.5, 64, 64000).unwrap();
        let text = String::from_utf8(buf).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 4);
        assert!(lines[0].starts_with("# steps: 3"));
        assert!(lines[1].ends_with(' '));
        assert!(lines[2].ends_with('*'));
        assert!(lines[2].contains(&"#".repeat(50)));
        assert!(lines[3].contains('|'));
    }

    #[test]
    fn silent_series_writes_header_only() {
        let mut buf = Vec::new();
        write_trace(&mut buf, &[0.0; 5], 0.0, 64, 48000).unwrap();
        assert_eq!(String::from_utf8(buf).unwrap().lines().count(), 1);
    }
}
