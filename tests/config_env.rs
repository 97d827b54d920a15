// tests/config_env.rs
use std::{env, fs};
use std::time::Duration;

use stock_news_sentinel::config::{AppConfig, ENV_KEYWORDS_PATH};
use stock_news_sentinel::error::ConfigError;
use stock_news_sentinel::sentiment::{Category, SentimentClassifier};

const REQUIRED: [&str; 4] = ["OPENAI_API_KEY", "TELEGRAM_TOKEN", "CHAT_ID", "DART_API_KEY"];
const OPTIONAL: [&str; 4] = [
    "WATCH_LIST",
    "POLL_INTERVAL_SECS",
    "DIGEST_INTERVAL_MIN",
    ENV_KEYWORDS_PATH,
];

fn reset() {
    for k in REQUIRED.iter().chain(OPTIONAL.iter()) {
        env::remove_var(k);
    }
}

#[serial_test::serial]
#[test]
fn missing_credentials_fail_fast() {
    reset();
    env::set_var("OPENAI_API_KEY", "sk");
    env::set_var("TELEGRAM_TOKEN", "t");
    let err = AppConfig::from_env().err().expect("must fail");
    assert!(matches!(err, ConfigError::Missing("CHAT_ID")));
    reset();
}

#[serial_test::serial]
#[test]
fn full_environment_with_keyword_file() {
    reset();
    for k in REQUIRED {
        env::set_var(k, "x");
    }
    env::set_var("WATCH_LIST", "대원산업, 삼지전자");
    env::set_var("POLL_INTERVAL_SECS", "60");
    env::set_var("DIGEST_INTERVAL_MIN", "30");

    let dir = tempfile::tempdir().unwrap();
    let kw = dir.path().join("keywords.toml");
    fs::write(
        &kw,
        r#"
strong_bull = ["상한가"]
strong_bear = ["하한가"]
weak_bull = ["반등"]
"#,
    )
    .unwrap();
    env::set_var(ENV_KEYWORDS_PATH, kw.display().to_string());

    let cfg = AppConfig::from_env().unwrap();
    assert_eq!(cfg.watch_list, vec!["대원산업".to_string(), "삼지전자".to_string()]);
    assert_eq!(cfg.poll_interval, Duration::from_secs(60));
    assert_eq!(cfg.digest_interval, Duration::from_secs(30 * 60));

    let c = SentimentClassifier::new(&cfg.keywords);
    assert_eq!(c.classify("삼지전자 상한가"), Category::StrongBull);
    assert_eq!(c.classify("삼지전자 반등"), Category::WeakBull);
    // Built-in lists are replaced, not merged.
    assert_eq!(c.classify("삼지전자 무상증자"), Category::Neutral);

    reset();
}
