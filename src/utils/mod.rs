//! 공통 유틸리티 함수 모듈
//!
//! # Modules
//!
//! - [`string_utils`] - 필드 경로 검증, 정규식 이스케이프

pub mod string_utils;
