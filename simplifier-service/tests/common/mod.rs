use secrecy::Secret;
use service_core::config::Config;
use simplifier_service::config::{
    CorsSettings, GeminiSettings, ProviderKind, SimplifierConfig, SimplifySettings,
    DEFAULT_GEMINI_API_BASE, DEFAULT_GEMINI_MODEL, DEFAULT_MAX_INPUT_CHARS,
};
use simplifier_service::services::providers::TextProvider;
use simplifier_service::startup::Application;
use std::sync::Arc;
use std::time::Duration;

pub struct TestApp {
    pub http_address: String,
    pub client: reqwest::Client,
}

/// Configuration bound to a random local port, no CORS restrictions.
pub fn test_config(provider: ProviderKind, api_key: &str) -> SimplifierConfig {
    SimplifierConfig {
        common: Config {
            host: "127.0.0.1".to_string(),
            port: 0,
        },
        provider,
        gemini: GeminiSettings {
            api_key: Secret::new(api_key.to_string()),
            model: DEFAULT_GEMINI_MODEL.to_string(),
            api_base: DEFAULT_GEMINI_API_BASE.to_string(),
            timeout_secs: 5,
            temperature: None,
            max_output_tokens: None,
        },
        simplify: SimplifySettings {
            max_input_chars: DEFAULT_MAX_INPUT_CHARS,
        },
        cors: CorsSettings {
            allowed_origins: Vec::new(),
        },
    }
}

impl TestApp {
    /// Spawn the relay around the given provider.
    pub async fn spawn_with_provider(provider: Arc<dyn TextProvider>) -> Self {
        let config = test_config(ProviderKind::Mock, "");
        let app = Application::build_with_provider(config, provider)
            .await
            .expect("Failed to build test application");
        Self::start(app).await
    }

    /// Spawn the relay with the provider chosen by `config`.
    pub async fn spawn_with_config(config: SimplifierConfig) -> Self {
        let app = Application::build(config)
            .await
            .expect("Failed to build test application");
        Self::start(app).await
    }

    async fn start(app: Application) -> Self {
        let http_port = app.http_port();
        let http_address = format!("http://127.0.0.1:{}", http_port);

        tokio::spawn(async move {
            app.run_until_stopped().await.ok();
        });

        // Wait for HTTP server to be ready by polling health endpoint
        let client = reqwest::Client::new();
        let health_url = format!("{}/health", http_address);
        for _ in 0..50 {
            if let Ok(response) = client.get(&health_url).send().await {
                if response.status().is_success() {
                    break;
                }
            }
            tokio::time::sleep(Duration::from_millis(20)).await;
        }

        Self {
            http_address,
            client,
        }
    }

    /// POST a raw body to `/simplify` with a JSON content type.
    pub async fn post_simplify(&self, body: impl Into<reqwest::Body>) -> reqwest::Response {
        self.client
            .post(format!("{}/simplify", self.http_address))
            .header("Content-Type", "application/json")
            .body(body)
            .send()
            .await
            .expect("Failed to execute request")
    }
}
