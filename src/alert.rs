//! Messages that interrupt the user

use std::fmt::{Display, Error, Formatter};

/// Something the user is explicitly told about
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Alert {
    /// The chosen deadline is not later than now
    DeadlineNotAfterNow,
    /// The chosen deadline is not today
    DeadlineNotToday,
    /// A task could not be deleted (only reported for direct deletions)
    DeleteFailed,
}

impl Display for Alert {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), Error> {
        match self {
            Alert::DeadlineNotAfterNow => write!(f, "현재 시간보다 이후의 시간을 선택해주세요."),
            Alert::DeadlineNotToday => write!(f, "오늘 날짜의 과제만 입력할 수 있습니다."),
            Alert::DeleteFailed => write!(f, "삭제 중 오류가 발생했습니다."),
        }
    }
}

impl std::error::Error for Alert {}
