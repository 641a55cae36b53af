//! 데이터 액세스 계층 전역에서 사용하는 에러 시스템
//!
//! `thiserror`를 사용하여 타입 안전하고 일관된 에러 처리를 제공합니다.
//! 모든 저장소 오류는 작업 이름, 컬렉션, 필터 요약을 포함한 메시지로 전달되며,
//! 이 계층은 어떤 오류도 재시도하지 않습니다.
//!
//! ## 사용 예제
//!
//! ```rust,ignore
//! use mongo_support::errors::DataError;
//!
//! match repo.get_one(id).await {
//!     Ok(order) => println!("found {:?}", order.id),
//!     Err(DataError::NotFound(msg)) => println!("없음: {}", msg),
//!     Err(e) => return Err(e),
//! }
//! ```

use thiserror::Error;

/// 데이터 액세스 계층 에러 타입
///
/// 조회 조건 구성, 프로젝션, 업데이트, 저장소 통신 과정에서 발생할 수 있는
/// 모든 종류의 에러를 포괄하는 열거형입니다.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DataError {
    /// 잘못된 필드 이름, 컴파일되지 않는 정규식 등 조회 조건 입력 오류
    #[error("Malformed criteria: {0}")]
    MalformedCriteriaError(String),

    /// include 와 exclude 프로젝션을 한 스펙에 섞으려 한 경우
    #[error("Conflicting projection: {0}")]
    ConflictingProjectionError(String),

    /// 필수 조회 또는 원자적 업데이트 대상이 존재하지 않음
    #[error("Not found: {0}")]
    NotFound(String),

    /// 드라이버/전송 계층 오류 (재시도하지 않고 그대로 전파)
    #[error("Store unavailable: {0}")]
    StoreUnavailableError(String),

    /// 빈 업데이트, 0 크기 페이지 등 요청 값 검증 오류
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// BSON 직렬화/역직렬화 오류
    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl DataError {
    /// 저장소 오류를 작업 컨텍스트와 함께 감쌉니다.
    ///
    /// 메시지 형식: `{operation} on {collection} [filter: {filter}]: {cause}`
    pub fn store(
        operation: &str,
        collection: &str,
        filter: &mongodb::bson::Document,
        cause: impl std::fmt::Display,
    ) -> Self {
        DataError::StoreUnavailableError(format!(
            "{} on {} [filter: {}]: {}",
            operation, collection, filter, cause
        ))
    }

    /// 원자적 업데이트 또는 필수 조회 대상이 없을 때의 에러를 생성합니다.
    pub fn not_found(operation: &str, collection: &str, filter: &mongodb::bson::Document) -> Self {
        DataError::NotFound(format!(
            "{} on {} matched no document [filter: {}]",
            operation, collection, filter
        ))
    }
}

impl From<mongodb::bson::ser::Error> for DataError {
    fn from(e: mongodb::bson::ser::Error) -> Self {
        DataError::SerializationError(e.to_string())
    }
}

impl From<mongodb::bson::de::Error> for DataError {
    fn from(e: mongodb::bson::de::Error) -> Self {
        DataError::SerializationError(e.to_string())
    }
}

/// 편의성을 위한 Result 타입 별칭
pub type DataResult<T> = Result<T, DataError>;

/// 외부 라이브러리 에러를 DataError로 변환하는 확장 trait
pub trait ErrorContext<T> {
    /// 컨텍스트 정보와 함께 저장소 에러로 변환합니다.
    fn context(self, msg: &str) -> DataResult<T>;

    /// 클로저를 사용하여 지연 평가된 컨텍스트를 제공합니다.
    fn with_context<F>(self, f: F) -> DataResult<T>
    where
        F: FnOnce() -> String;
}

impl<T, E> ErrorContext<T> for Result<T, E>
where
    E: std::fmt::Display,
{
    fn context(self, msg: &str) -> DataResult<T> {
        self.map_err(|e| DataError::StoreUnavailableError(format!("{}: {}", msg, e)))
    }

    fn with_context<F>(self, f: F) -> DataResult<T>
    where
        F: FnOnce() -> String,
    {
        self.map_err(|e| DataError::StoreUnavailableError(format!("{}: {}", f(), e)))
    }
}
