use depdocs::config::Config;
use mockito::ServerGuard;

pub mod test_helpers {
    use super::*;

    pub const MODEL: &str = "gemini-test";

    /// Configuration pointing every upstream at the mock server
    pub fn config_for(server: &ServerGuard) -> Config {
        let mut config = Config::default();
        config.resolver.search_endpoint = format!("{}/search", server.url());
        config.resolver.gemini_endpoint = format!("{}/v1beta", server.url());
        config.resolver.gemini_model = MODEL.to_string();
        config.resolver.request_timeout_secs = 5;
        config
    }

    pub fn gemini_path() -> String {
        format!("/v1beta/models/{}:generateContent", MODEL)
    }

    pub fn gemini_reply(text: &str) -> String {
        serde_json::json!({
            "candidates": [{ "content": { "role": "model", "parts": [{ "text": text }] } }]
        })
        .to_string()
    }

    pub fn search_reply(links: &[String]) -> String {
        let results: Vec<_> = links
            .iter()
            .enumerate()
            .map(|(i, link)| serde_json::json!({ "position": i + 1, "title": format!("Result {}", i + 1), "link": link }))
            .collect();
        serde_json::json!({ "organic_results": results }).to_string()
    }

    pub fn setup_test_logger() {
        let _ = env_logger::builder()
            .filter_level(log::LevelFilter::Debug)
            .is_test(true)
            .try_init();
    }
}
