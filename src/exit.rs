use std::fmt::{self, Display, Formatter};

use crate::monitor::MonitorError;

/// How the process ended, as reported to whoever started it.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum ExitStatus {
    /// Stopped on request.
    Normal,

    /// The player could not be reached for too long.
    PollerFatal,

    /// Any other error, including display and setup failures.
    Unexpected,

    /// A panic.
    Abnormal,
}

impl ExitStatus {
    /// Returns the process exit code.
    ///
    /// # Examples
    ///
    /// ```
    /// use mpdlcd::ExitStatus;
    ///
    /// assert_eq!(0, ExitStatus::Normal.code());
    /// assert_eq!(3, ExitStatus::Abnormal.code());
    /// ```
    pub fn code(self) -> i32 {
        match self {
            ExitStatus::Normal => 0,
            ExitStatus::PollerFatal => 1,
            ExitStatus::Unexpected => 2,
            ExitStatus::Abnormal => 3,
        }
    }
}

impl From<&MonitorError> for ExitStatus {
    fn from(error: &MonitorError) -> Self {
        match error {
            MonitorError::BudgetExhausted { .. } => ExitStatus::PollerFatal,
            _ => ExitStatus::Unexpected,
        }
    }
}

impl Display for ExitStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let description = match self {
            ExitStatus::Normal => "Normal exit",
            ExitStatus::PollerFatal => "Fatal poller error",
            ExitStatus::Unexpected => "Unexpected error",
            ExitStatus::Abnormal => "Abnormal exit",
        };
        write!(f, "{} ({})", description, self.code())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::poller::PollerError;

    #[test]
    fn codes_are_distinct() {
        let codes: Vec<i32> = [
            ExitStatus::Normal,
            ExitStatus::PollerFatal,
            ExitStatus::Unexpected,
            ExitStatus::Abnormal,
        ]
        .iter()
        .map(|status| status.code())
        .collect();
        assert_eq!(vec![0, 1, 2, 3], codes);
    }

    #[test]
    fn budget_exhaustion_maps_to_poller_fatal() {
        let error = MonitorError::BudgetExhausted {
            source: PollerError::BudgetExhausted { failures: 20 },
        };
        assert_eq!(ExitStatus::PollerFatal, ExitStatus::from(&error));
    }

    #[test]
    fn display() {
        assert_eq!("Abnormal exit (3)", ExitStatus::Abnormal.to_string());
    }
}
