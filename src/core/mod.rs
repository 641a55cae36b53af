//! # Core Collaborators
//!
//! 리포지토리가 저장 시점에 의존하는 협력자들입니다.
//!
//! - [`audit`] - 작업 주체와 시각 ([`AuditorAware`])
//! - [`ids`] - 신규 문서 식별자 ([`IdGenerator`])
//!
//! 두 협력자 모두 `Arc<dyn ...>` 로 리포지토리에 주입되며, 기본값은
//! [`NoAuditor`] 와 [`ObjectIdGenerator`] 입니다.
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use mongo_support::core::FixedAuditor;
//!
//! let repo = SupportRepository::<Order>::new(store)
//!     .with_auditor(Arc::new(FixedAuditor::new("batch")));
//! ```

pub mod audit;
pub mod ids;

pub use audit::{AuditorAware, FixedAuditor, NoAuditor};
pub use ids::{IdGenerator, ObjectIdGenerator};
