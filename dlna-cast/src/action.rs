//! Transport verbs accepted by [`ControlPoint::send_to_tv`](crate::ControlPoint::send_to_tv)

use std::fmt;
use std::str::FromStr;

use crate::error::CastError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TvAction {
    /// Subscribe to events, load the current media, then play it
    Play1,
    /// Resume whatever is loaded
    Play,
    Pause,
    /// Drop every subscription of the session, then stop
    Stop,
}

impl TvAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            TvAction::Play1 => "Play1",
            TvAction::Play => "Play",
            TvAction::Pause => "Pause",
            TvAction::Stop => "Stop",
        }
    }
}

impl fmt::Display for TvAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TvAction {
    type Err = CastError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Play1" => Ok(TvAction::Play1),
            "Play" => Ok(TvAction::Play),
            "Pause" => Ok(TvAction::Pause),
            "Stop" => Ok(TvAction::Stop),
            other => Err(CastError::UnknownAction(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("Play1", TvAction::Play1)]
    #[case("Play", TvAction::Play)]
    #[case("Pause", TvAction::Pause)]
    #[case("Stop", TvAction::Stop)]
    fn test_parse_action(#[case] input: &str, #[case] expected: TvAction) {
        assert_eq!(input.parse::<TvAction>().unwrap(), expected);
        assert_eq!(expected.to_string(), input);
    }

    #[rstest]
    #[case("play")]
    #[case("STOP")]
    #[case("Seek")]
    #[case("")]
    fn test_unknown_action(#[case] input: &str) {
        assert!(matches!(
            input.parse::<TvAction>(),
            Err(CastError::UnknownAction(action)) if action == input
        ));
    }
}
