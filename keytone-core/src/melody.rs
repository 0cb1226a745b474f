//! Melodies as (frequency, duration) sequences.

/// Silence inserted after every note so repeated pitches stay distinct.
pub const NOTE_GAP_MS: u32 = 50;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Note {
    /// Pitch in Hz. Zero is a rest.
    pub frequency_hz: u16,
    pub duration_ms: u16,
}

impl Note {
    pub const fn new(frequency_hz: u16, duration_ms: u16) -> Self {
        Self {
            frequency_hz,
            duration_ms,
        }
    }

    pub const fn rest(duration_ms: u16) -> Self {
        Self::new(0, duration_ms)
    }

    pub fn is_rest(&self) -> bool {
        self.frequency_hz == 0
    }
}

/// Total playing time of a melody, gaps included.
pub fn duration_ms(melody: &[Note]) -> u32 {
    melody
        .iter()
        .map(|n| n.duration_ms as u32 + NOTE_GAP_MS)
        .sum()
}

const fn n(frequency_hz: u16, duration_ms: u16) -> Note {
    Note::new(frequency_hz, duration_ms)
}

/// Opening bars of the Imperial March.
#[rustfmt::skip]
pub static IMPERIAL_MARCH: [Note; 18] = [
    // A4 A4 A4 F4 C4 A4 F4 C4 A4
    n(440, 500), n(440, 500), n(440, 500), n(349, 350), n(262, 150),
    n(440, 500), n(349, 350), n(262, 150), n(440, 1000),
    // A5 A5 A5 F5 C5 A4 F4 C4 A4
    n(880, 500), n(880, 500), n(880, 500), n(698, 350), n(523, 150),
    n(440, 500), n(349, 350), n(262, 150), n(440, 1000),
];
