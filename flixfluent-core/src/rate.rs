//! Playback rate selection

use serde::{Deserialize, Serialize};
use std::fmt;

/// One of the fixed playback speeds offered by the player
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum PlaybackRate {
    /// 0.5x
    Half,
    /// 0.75x
    ThreeQuarters,
    /// 1x
    #[default]
    Normal,
    /// 1.25x
    OneAndAQuarter,
    /// 1.5x
    OneAndAHalf,
    /// 2x
    Double,
}

impl PlaybackRate {
    /// All rates in cycling order
    pub const ALL: [PlaybackRate; 6] = [
        PlaybackRate::Half,
        PlaybackRate::ThreeQuarters,
        PlaybackRate::Normal,
        PlaybackRate::OneAndAQuarter,
        PlaybackRate::OneAndAHalf,
        PlaybackRate::Double,
    ];

    /// Speed multiplier
    pub fn as_f64(self) -> f64 {
        match self {
            PlaybackRate::Half => 0.5,
            PlaybackRate::ThreeQuarters => 0.75,
            PlaybackRate::Normal => 1.0,
            PlaybackRate::OneAndAQuarter => 1.25,
            PlaybackRate::OneAndAHalf => 1.5,
            PlaybackRate::Double => 2.0,
        }
    }

    /// Look up the rate for an exact multiplier
    pub fn from_f64(value: f64) -> Option<Self> {
        Self::ALL.into_iter().find(|r| r.as_f64() == value)
    }

    /// Position in [`PlaybackRate::ALL`]
    pub fn index(self) -> usize {
        match self {
            PlaybackRate::Half => 0,
            PlaybackRate::ThreeQuarters => 1,
            PlaybackRate::Normal => 2,
            PlaybackRate::OneAndAQuarter => 3,
            PlaybackRate::OneAndAHalf => 4,
            PlaybackRate::Double => 5,
        }
    }

    /// Next rate, wrapping from 2x back to 0.5x
    pub fn next(self) -> Self {
        Self::ALL[(self.index() + 1) % Self::ALL.len()]
    }
}

impl fmt::Display for PlaybackRate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x", self.as_f64())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cycle_wraps() {
        assert_eq!(PlaybackRate::Normal.next(), PlaybackRate::OneAndAQuarter);
        assert_eq!(PlaybackRate::Double.next(), PlaybackRate::Half);
    }

    #[test]
    fn test_cycle_length_is_six() {
        for start in PlaybackRate::ALL {
            let mut rate = start;
            for _ in 0..6 {
                rate = rate.next();
            }
            assert_eq!(rate, start);
        }
    }

    #[test]
    fn test_multipliers_and_display() {
        assert_eq!(PlaybackRate::from_f64(1.25), Some(PlaybackRate::OneAndAQuarter));
        assert_eq!(PlaybackRate::from_f64(3.0), None);
        assert_eq!(PlaybackRate::Normal.to_string(), "1x");
        assert_eq!(PlaybackRate::ThreeQuarters.to_string(), "0.75x");
    }
}
