//! 데이터 저장소 및 실행 환경 설정
//!
//! 저장소 연결 정보와 실행 환경을 환경 변수에서 읽습니다.

use std::env;

/// 애플리케이션 실행 환경
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    /// 개발 환경
    Development,
    /// 테스트 환경
    Test,
    /// 스테이징 환경
    Staging,
    /// 프로덕션 환경
    Production,
}

impl Environment {
    /// 현재 실행 환경을 감지합니다.
    ///
    /// `ENVIRONMENT` 또는 `NODE_ENV` 환경 변수를 확인하며,
    /// 설정되지 않은 경우 `Production`을 기본값으로 사용합니다.
    pub fn current() -> Self {
        let name = env::var("ENVIRONMENT")
            .or_else(|_| env::var("NODE_ENV"))
            .unwrap_or_else(|_| "production".to_string());
        Self::parse(&name)
    }

    /// 환경 이름(대소문자 무관)을 해석합니다. 알 수 없는 값은 `Production`.
    pub fn parse(name: &str) -> Self {
        match name.to_lowercase().as_str() {
            "development" | "dev" => Environment::Development,
            "test" | "testing" => Environment::Test,
            "staging" | "stage" => Environment::Staging,
            _ => Environment::Production,
        }
    }
}

/// MongoDB 연결 설정
pub struct MongoConfig;

impl MongoConfig {
    /// MongoDB 연결 URI
    ///
    /// # Environment Variables
    ///
    /// - `MONGODB_URI` (기본값: `mongodb://localhost:27017`)
    pub fn uri() -> String {
        env::var("MONGODB_URI").unwrap_or_else(|_| "mongodb://localhost:27017".to_string())
    }

    /// 사용할 데이터베이스 이름
    ///
    /// # Environment Variables
    ///
    /// - `DATABASE_NAME` (기본값: `support_dev`)
    pub fn database_name() -> String {
        env::var("DATABASE_NAME").unwrap_or_else(|_| "support_dev".to_string())
    }

    /// 드라이버에 전달할 애플리케이션 이름 (서버 로그와 모니터링에 표시됨)
    ///
    /// # Environment Variables
    ///
    /// - `MONGODB_APP_NAME` (기본값: `mongo_support`)
    pub fn app_name() -> String {
        env::var("MONGODB_APP_NAME").unwrap_or_else(|_| "mongo_support".to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_environment_parse() {
        assert_eq!(Environment::parse("development"), Environment::Development);
        assert_eq!(Environment::parse("DEV"), Environment::Development);
        assert_eq!(Environment::parse("test"), Environment::Test);
        assert_eq!(Environment::parse("stage"), Environment::Staging);
        assert_eq!(Environment::parse("unknown"), Environment::Production);
    }

    #[test]
    fn test_mongo_config_defaults() {
        if env::var("MONGODB_URI").is_err() {
            assert_eq!(MongoConfig::uri(), "mongodb://localhost:27017");
        }

        if env::var("DATABASE_NAME").is_err() {
            assert_eq!(MongoConfig::database_name(), "support_dev");
        }

        if env::var("MONGODB_APP_NAME").is_err() {
            assert_eq!(MongoConfig::app_name(), "mongo_support");
        }
    }
}
