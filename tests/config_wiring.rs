//! Config file to client factory wiring.

use std::io::Write;
use std::sync::{Mutex, OnceLock};

use lmgen::{client_from_config, ClientError, Config};

// Env-var mutation is process-global; serialize the tests that touch it.
static ENV_LOCK: OnceLock<Mutex<()>> = OnceLock::new();

fn env_lock() -> &'static Mutex<()> {
    ENV_LOCK.get_or_init(|| Mutex::new(()))
}

#[test]
fn test_load_and_build_openai_client() {
    let _guard = env_lock().lock().unwrap();
    // SAFETY: guarded by ENV_LOCK, no concurrent env access in this process.
    unsafe { std::env::set_var("LMGEN_TEST_WIRING_KEY", "sk-test") };

    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(
        file,
        r#"
        [llm]
        provider = "openai"

        [llm.openai]
        base_url = "https://example.invalid/v1"
        api_key_env = "LMGEN_TEST_WIRING_KEY"
        model = "gpt-4o-mini"
        "#
    )
    .unwrap();

    let config = Config::load(file.path()).unwrap();
    let client = client_from_config(&config).unwrap();
    assert_eq!(client.provider(), "openai");

    unsafe { std::env::remove_var("LMGEN_TEST_WIRING_KEY") };
}

#[test]
fn test_unknown_provider_is_rejected() {
    let _guard = env_lock().lock().unwrap();
    // Validation catches the unknown provider before the factory runs.
    let error = Config::from_toml_str(
        r#"
        [llm]
        provider = "anthropic"
        "#,
    )
    .unwrap_err();
    assert!(error.to_string().contains("anthropic"));
}

#[test]
fn test_missing_api_key_is_misconfiguration() {
    let _guard = env_lock().lock().unwrap();
    // SAFETY: guarded by ENV_LOCK, no concurrent env access in this process.
    unsafe { std::env::remove_var("LMGEN_TEST_ABSENT_KEY") };

    let config = Config::from_toml_str(
        r#"
        [llm]
        provider = "openai"

        [llm.openai]
        api_key_env = "LMGEN_TEST_ABSENT_KEY"
        model = "gpt-4o-mini"
        "#,
    )
    .unwrap();

    let result = client_from_config(&config);
    assert!(matches!(result, Err(ClientError::Misconfiguration(_))));
}
