//! 데이터 액세스 계층을 담당하는 리포지토리 모듈
//!
//! 엔티티마다 리포지토리를 새로 작성하는 대신, [`SupportModel`](crate::domain::SupportModel)
//! 을 구현한 타입이면 [`SupportRepository`] 하나로 조회와 업데이트를 모두 처리합니다.
//!
//! # Examples
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use mongo_support::db::Database;
//! use mongo_support::repositories::SupportRepository;
//!
//! let database = Database::new().await?;
//! let orders = SupportRepository::<Order>::new(Arc::new(database.store()));
//! let order = orders.get_one(order_id).await?;
//! ```

pub mod support;

pub use support::SupportRepository;
