//! # Configuration Module
//!
//! 환경 변수 기반 설정을 한곳에서 읽습니다.
//!
//! - [`data_config`] - 실행 환경과 MongoDB 연결 설정
//! - [`bootstrap`] - `.env` 파일 로딩과 로깅 초기화
//!
//! ## 사용 예제
//!
//! ```rust,ignore
//! use mongo_support::config::{init_logging, load_env_file, MongoConfig};
//!
//! load_env_file();
//! init_logging();
//! println!("connecting to {}/{}", MongoConfig::uri(), MongoConfig::database_name());
//! ```
//!
//! ## 환경 변수
//!
//! ```bash
//! export MONGODB_URI="mongodb://localhost:27017"
//! export DATABASE_NAME="support_dev"
//! export MONGODB_APP_NAME="mongo_support"
//! export ENVIRONMENT="development"   # development, test, staging, production
//! export PROFILE="dev"               # .env.<profile> 선택
//! export RUST_LOG="mongo_support=debug"
//! ```

pub mod bootstrap;
pub mod data_config;

pub use bootstrap::*;
pub use data_config::*;
