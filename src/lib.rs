//! MongoDB 데이터 액세스 지원 라이브러리
//!
//! 엔티티 타입마다 반복되는 조회, 페이지, 부분 업데이트, 논리 삭제 코드를
//! 하나의 범용 리포지토리로 제공합니다.
//!
//! # Features
//!
//! - **조회 조건 구성**: 불변 조건 트리, 평탄한 AND/OR 병합, 안전한 부분 문자열 검색
//! - **프로젝션**: include / exclude 모드 충돌 검사
//! - **페이지 조회**: 개수 + 내용 두 단계 조회
//! - **부분 업데이트**: set-or-unset, 원자적 find-and-apply
//! - **논리 삭제**: `deleted` 플래그 기반 삭제와 물리 삭제
//! - **필드 값 추출**: 엔티티별 필드 접근자 테이블
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────┐
//! │  SupportRepository  │ ← 엔티티별 범용 연산
//! └─────────────────────┘
//!          │  Criteria / Projection / Update / PageRequest
//!          ▼
//! ┌─────────────────────┐
//! │    DocumentStore    │ ← 렌더링된 BSON 요청
//! └─────────────────────┘
//!          │
//!          ▼
//! ┌─────────────────────┐
//! │ MongoStore │ Memory │ ← 드라이버 / 프로세스 내 구현
//! └─────────────────────┘
//! ```
//!
//! # Examples
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use mongo_support::config::{init_logging, load_env_file};
//! use mongo_support::db::Database;
//! use mongo_support::domain::{Criteria, Update};
//! use mongo_support::repositories::SupportRepository;
//!
//! load_env_file();
//! init_logging();
//!
//! let database = Database::new().await?;
//! let orders = SupportRepository::<Order>::new(Arc::new(database.store()));
//!
//! let open = orders
//!     .find_many(&Criteria::is("status", "open").with_deleted(Some(false)), None, None)
//!     .await?;
//! let closed = orders
//!     .update_field_by_id(open[0].id.unwrap(), "status", Some("closed"))
//!     .await?;
//! ```

pub mod config;
pub mod core;
pub mod db;
pub mod domain;
pub mod errors;
pub mod repositories;
pub mod store;
pub mod utils;

#[cfg(test)]
pub(crate) mod test_support;
