//! 에러 타입 모듈
//!
//! [`DataError`] 분류 체계와 [`ErrorContext`] 확장 trait을 제공합니다.

#[allow(clippy::module_inception)]
pub mod errors;

pub use errors::*;
