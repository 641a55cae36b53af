//! 프로세스 시작 시 한 번 호출하는 환경 파일 로딩과 로깅 초기화

use env_logger::Env;
use log::{info, warn};

/// `PROFILE` 에 맞는 환경 파일을 로드합니다.
///
/// * `prod` - `.env.prod`
/// * `dev` (기본값) - `.env.dev`
/// * 기타 - `.env`
///
/// 파일이 없으면 경고만 남기고 기존 환경 변수를 그대로 사용합니다.
///
/// ```bash
/// PROFILE=prod ./my-service
/// ```
pub fn load_env_file() {
    let profile = std::env::var("PROFILE").unwrap_or_else(|_| "dev".to_string());

    info!("Current profile: {}", profile);

    let filename = match profile.as_str() {
        "prod" => ".env.prod",
        "dev" => ".env.dev",
        _ => ".env",
    };
    match dotenv::from_filename(filename) {
        Ok(_) => info!("{} 파일 로드 됨", filename),
        Err(e) => warn!("{} 파일 로드 실패: {}", filename, e),
    }
}

/// 로깅 시스템을 초기화합니다
///
/// `RUST_LOG` 가 없으면 `info` 레벨을 사용합니다. 이미 초기화된 경우
/// 아무것도 하지 않으므로 테스트에서 여러 번 호출해도 됩니다.
///
/// ```bash
/// RUST_LOG=mongo_support=debug ./my-service
/// ```
pub fn init_logging() {
    let _ = env_logger::Builder::from_env(Env::default().default_filter_or("info")).try_init();
}
