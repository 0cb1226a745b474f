//! Tabulate what the PWM is programmed with for each note of a melody.

use keytone_core::{pwm_period, Note, PwmPeriod, ToneError};

pub struct ToneRow {
    pub note: Note,
    pub period: Result<PwmPeriod, ToneError>,
}

pub fn table(clock_hz: u32, melody: &[Note]) -> Vec<ToneRow> {
    melody
        .iter()
        .map(|&note| ToneRow {
            note,
            period: pwm_period(clock_hz, note.frequency_hz.into()),
        })
        .collect()
}

/// Plain-text rendering, one line per note.
pub fn render(clock_hz: u32, rows: &[ToneRow]) -> String {
    let mut out = format!("Timer clock: {} Hz\n", clock_hz);
    out.push_str(&format!(
        "{:>3}  {:>7}  {:>6}  {:>6}  {:>6}  {:>9}\n",
        "#", "note Hz", "ms", "wrap", "duty", "actual Hz"
    ));

    for (index, row) in rows.iter().enumerate() {
        let line = match &row.period {
            Ok(period) => format!(
                "{:>3}  {:>7}  {:>6}  {:>6}  {:>6}  {:>9}\n",
                index + 1,
                row.note.frequency_hz,
                row.note.duration_ms,
                period.wrap,
                period.duty,
                period.frequency_hz(clock_hz)
            ),
            Err(e) => format!(
                "{:>3}  {:>7}  {:>6}  {}\n",
                index + 1,
                row.note.frequency_hz,
                row.note.duration_ms,
                e
            ),
        };
        out.push_str(&line);
    }

    out
}
