//! Live endpoint integration tests.
//!
//! These tests require a reachable SQL execution endpoint.
//! Set SEEDER_TEST_BASE_URL and SEEDER_TEST_PROJECT_REF to run them.

use sql_seeder::client::{ExecutionClient, HttpClientConfig, HttpExecutionClient};

/// Helper to create a client for the test endpoint.
fn get_test_client() -> Option<HttpExecutionClient> {
    let base_url = std::env::var("SEEDER_TEST_BASE_URL").ok()?;
    let project_ref = std::env::var("SEEDER_TEST_PROJECT_REF").ok()?;
    let mut config = HttpClientConfig::new(base_url, project_ref).with_timeout(30);
    if let Ok(api_key) = std::env::var("SEEDER_TEST_API_KEY") {
        config = config.with_api_key(api_key);
    }
    HttpExecutionClient::new(config).ok()
}

#[tokio::test]
async fn test_health() {
    let Some(client) = get_test_client() else {
        eprintln!("Skipping test: SEEDER_TEST_BASE_URL not set");
        return;
    };

    client.health().await.unwrap();
}

#[tokio::test]
async fn test_execute_and_list_tables() {
    let Some(client) = get_test_client() else {
        eprintln!("Skipping test: SEEDER_TEST_BASE_URL not set");
        return;
    };

    client
        .execute_sql("CREATE TABLE IF NOT EXISTS seeder_probe (id int);")
        .await
        .unwrap();

    let tables = client.list_tables("public").await.unwrap();
    assert!(tables.iter().any(|t| t.name == "seeder_probe"));

    client
        .execute_sql("DROP TABLE IF EXISTS seeder_probe;")
        .await
        .unwrap();
}

#[tokio::test]
async fn test_invalid_sql_is_execution_error() {
    let Some(client) = get_test_client() else {
        eprintln!("Skipping test: SEEDER_TEST_BASE_URL not set");
        return;
    };

    let err = client.execute_sql("SELEC 1;").await.unwrap_err();
    assert_eq!(err.category(), "Execution Error");
}
