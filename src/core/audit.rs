//! 감사 정보 제공자
//!
//! 저장 시점의 사용자와 시간을 엔티티의 감사 필드에 채우기 위한 협력자입니다.

use mongodb::bson::DateTime;

/// 현재 사용자와 시각을 제공하는 협력자
pub trait AuditorAware: Send + Sync {
    /// 현재 작업 주체. 알 수 없으면 `None`.
    fn current_auditor(&self) -> Option<String>;

    /// 감사 시각
    fn now(&self) -> DateTime {
        DateTime::now()
    }
}

/// 작업 주체를 기록하지 않는 기본 제공자
#[derive(Debug, Clone, Copy, Default)]
pub struct NoAuditor;

impl AuditorAware for NoAuditor {
    fn current_auditor(&self) -> Option<String> {
        None
    }
}

/// 고정된 사용자를 기록하는 제공자
///
/// 배치 작업이나 시스템 계정처럼 주체가 하나뿐인 경우에 사용합니다.
/// `at` 으로 시각까지 고정할 수 있습니다.
#[derive(Debug, Clone, PartialEq)]
pub struct FixedAuditor {
    auditor: String,
    clock: Option<DateTime>,
}

impl FixedAuditor {
    pub fn new(auditor: impl Into<String>) -> Self {
        FixedAuditor {
            auditor: auditor.into(),
            clock: None,
        }
    }

    pub fn at(mut self, now: DateTime) -> Self {
        self.clock = Some(now);
        self
    }
}

impl AuditorAware for FixedAuditor {
    fn current_auditor(&self) -> Option<String> {
        Some(self.auditor.clone())
    }

    fn now(&self) -> DateTime {
        self.clock.unwrap_or_else(DateTime::now)
    }
}
