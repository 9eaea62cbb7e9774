//! The result a host sees for one flush.

use crate::{FlushError, FlushReport, FlushState};
use std::process::ExitCode;
use strum::Display;

/// Host-visible flush result.
///
/// The discriminants are the host's status codes. The forwarder never
/// asks the host to retry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[repr(i32)]
pub enum FlushStatus {
    /// Unrecoverable for this flush.
    #[strum(serialize = "error")]
    Error = 0,
    /// Handled, including per-record skips and remote item rejections.
    #[strum(serialize = "ok")]
    Ok = 1,
}

impl FlushStatus {
    /// The host status code.
    pub fn code(self) -> i32 {
        self as i32
    }

    /// Process exit code for the command-line host.
    pub fn exit_code(self) -> ExitCode {
        match self {
            Self::Ok => ExitCode::SUCCESS,
            Self::Error => ExitCode::FAILURE,
        }
    }
}

impl From<FlushState> for FlushStatus {
    /// Only a flush that reached `Done` is handled.
    fn from(state: FlushState) -> Self {
        match state {
            FlushState::Done => Self::Ok,
            _ => Self::Error,
        }
    }
}

impl From<&Result<FlushReport, FlushError>> for FlushStatus {
    fn from(result: &Result<FlushReport, FlushError>) -> Self {
        match result {
            Ok(report) => Self::from(report.state),
            Err(_) => Self::Error,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::IdentityError;

    #[test]
    fn test_host_codes() {
        assert_eq!(FlushStatus::Ok.code(), 1);
        assert_eq!(FlushStatus::Error.code(), 0);
        assert_eq!(FlushStatus::Ok.to_string(), "ok");
    }

    #[test]
    fn test_from_state() {
        assert_eq!(FlushStatus::from(FlushState::Done), FlushStatus::Ok);
        assert_eq!(FlushStatus::from(FlushState::Aborted), FlushStatus::Error);
        assert_eq!(FlushStatus::from(FlushState::Submitting), FlushStatus::Error);
    }

    #[test]
    fn test_from_result() {
        let done = FlushReport {
            state: FlushState::Done,
            ..FlushReport::default()
        };
        let ok: Result<FlushReport, FlushError> = Ok(done);
        assert_eq!(FlushStatus::from(&ok), FlushStatus::Ok);

        let unfinished: Result<FlushReport, FlushError> = Ok(FlushReport::default());
        assert_eq!(FlushStatus::from(&unfinished), FlushStatus::Error);

        let err: Result<FlushReport, FlushError> =
            Err(IdentityError::Incomplete { field: "Account" }.into());
        assert_eq!(FlushStatus::from(&err), FlushStatus::Error);
    }
}
