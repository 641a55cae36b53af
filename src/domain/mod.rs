//! # Domain Layer Module
//!
//! 저장소에 보낼 요청을 값으로 표현하는 타입들입니다. 이 계층의 타입은
//! 저장소에 접근하지 않으며, 렌더링(`to_document`) 시점에 입력을 검증합니다.
//!
//! ```text
//! domain/
//! ├── criteria     - 조회 조건 트리 (is / in / regex / and / or)
//! ├── projection   - include / exclude 필드 프로젝션
//! ├── update       - $set / $unset / $inc ... 부분 업데이트
//! ├── page         - 정렬, 페이지 요청, 페이지 결과
//! └── entities     - 엔티티 계약, 감사 필드, 필드 접근자
//! ```
//!
//! ## 사용 예제
//!
//! ```rust,ignore
//! use mongo_support::domain::{Criteria, PageRequest, Projection, Sort, Update};
//!
//! let criteria = Criteria::is("status", "open")
//!     .with_contains("title", Some("a.b*c"))
//!     .with_deleted(Some(false));
//! let projection = Projection::exclude_only(["payload"]);
//! let request = PageRequest::of(0, 20)?.with_sort(Sort::desc("createdDate"));
//! let update = Update::new().set_or_unset("note", None::<String>);
//! ```

pub mod criteria;
pub mod entities;
pub mod page;
pub mod projection;
pub mod update;

pub use criteria::Criteria;
pub use entities::{AuditFields, DocumentRef, FieldAccessors, SupportModel};
pub use page::{Direction, Page, PageRequest, Sort};
pub use projection::{Projection, ProjectionMode};
pub use update::Update;
