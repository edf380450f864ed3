use std::str::FromStr;

use crate::error::UnknownAction;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Forward,
    Backward,
}

impl Direction {
    pub const fn step(self) -> isize {
        match self {
            Direction::Forward => 1,
            Direction::Backward => -1,
        }
    }
}

/// Discrete input delivered by the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Next,
    Previous,
    TogglePause,
    /// Lengthen the slide interval by one step.
    SpeedUp,
    /// Shorten the slide interval by one step.
    SpeedDown,
    ToggleCaption,
    Exit,
}

impl FromStr for Action {
    type Err = UnknownAction;

    fn from_str(key: &str) -> Result<Self, Self::Err> {
        let action = match key.trim().to_ascii_lowercase().as_str() {
            "n" | "right" | "next" => Action::Next,
            "p" | "left" | "prev" | "previous" => Action::Previous,
            "" | "space" | "enter" | "pause" => Action::TogglePause,
            "+" | "up" | "longer" => Action::SpeedUp,
            "-" | "down" | "shorter" => Action::SpeedDown,
            "c" | "m" | "caption" => Action::ToggleCaption,
            "q" | "x" | "esc" | "exit" | "quit" => Action::Exit,
            other => return Err(UnknownAction(other.to_string())),
        };
        Ok(action)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationLevel {
    Info,
    Warning,
    Error,
}

/// Non-blocking user-facing message (heading + body).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub level: NotificationLevel,
    pub heading: String,
    pub message: String,
}

impl Notification {
    pub fn info(heading: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            level: NotificationLevel::Info,
            heading: heading.into(),
            message: message.into(),
        }
    }

    pub fn warning(heading: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            level: NotificationLevel::Warning,
            heading: heading.into(),
            message: message.into(),
        }
    }

    pub fn error(heading: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            level: NotificationLevel::Error,
            heading: heading.into(),
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_host_keys() {
        assert_eq!("n".parse::<Action>().unwrap(), Action::Next);
        assert_eq!("Left".parse::<Action>().unwrap(), Action::Previous);
        assert_eq!("".parse::<Action>().unwrap(), Action::TogglePause);
        assert_eq!("+".parse::<Action>().unwrap(), Action::SpeedUp);
        assert_eq!("down".parse::<Action>().unwrap(), Action::SpeedDown);
        assert_eq!("m".parse::<Action>().unwrap(), Action::ToggleCaption);
        assert_eq!(" esc ".parse::<Action>().unwrap(), Action::Exit);
    }

    #[test]
    fn rejects_unknown_keys() {
        let err = "zoom".parse::<Action>().unwrap_err();
        assert_eq!(err, UnknownAction("zoom".into()));
        assert_eq!(err.to_string(), "unknown action key \"zoom\"");
    }
}
