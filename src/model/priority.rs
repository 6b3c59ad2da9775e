use std::fmt;
use std::str::FromStr;

/// Error for priority values typed by the user or sent by the remote
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PriorityError {
    #[error("priority must be a number, got '{0}'")]
    NotANumber(String),
    #[error("priority must be between 1 and 4, got {0}")]
    OutOfRange(i64),
}

/// Task priority on the display scale, where 1 is the most urgent.
///
/// The remote stores the inverse (`remote = 5 - display`), so 4 there is the
/// most urgent. Values are always within `1..=4`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Priority(u8);

impl Priority {
    pub const HIGHEST: Priority = Priority(1);
    pub const LOWEST: Priority = Priority(4);

    pub fn from_display(value: i64) -> Result<Self, PriorityError> {
        match value {
            1..=4 => Ok(Priority(value as u8)),
            _ => Err(PriorityError::OutOfRange(value)),
        }
    }

    pub fn from_remote(value: i64) -> Result<Self, PriorityError> {
        match value {
            1..=4 => Ok(Priority(5 - value as u8)),
            _ => Err(PriorityError::OutOfRange(value)),
        }
    }

    pub fn display(self) -> u8 {
        self.0
    }

    pub fn remote(self) -> u8 {
        5 - self.0
    }
}

impl FromStr for Priority {
    type Err = PriorityError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let value: i64 = s
            .trim()
            .parse()
            .map_err(|_| PriorityError::NotANumber(s.to_string()))?;
        Priority::from_display(value)
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
