use crate::config::AppConfig;
use crate::model::FetchError;

use reqwest::blocking::Client;

pub trait Fetch {
    fn fetch(&self, phone: &str) -> Result<String, FetchError>;
}

pub struct PhoneFetcher {
    client: Client,
    base_url: String,
}

impl PhoneFetcher {
    pub fn new(config: &AppConfig) -> Self {
        let client = Client::builder()
            .user_agent(config.user_agent.clone())
            .build()
            .expect("failed to create HTTP client");

        Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        }
    }

    fn build_url(&self, phone: &str) -> String {
        format!("{}/mobile.asp?mobile={}&action=mobile", self.base_url, phone)
    }
}

impl Fetch for PhoneFetcher {
    fn fetch(&self, phone: &str) -> Result<String, FetchError> {
        let url = self.build_url(phone);

        let response = self
            .client
            .get(&url)
            .send()
            .map_err(|e| FetchError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::HttpStatus(status.as_u16()));
        }

        // The site labels its charset inconsistently; the payload is UTF-8,
        // so decode the raw bytes ourselves instead of trusting the header.
        let bytes = response
            .bytes()
            .map_err(|e| FetchError::Network(e.to_string()))?;
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn build_url_substitutes_phone_into_template() {
        let fetcher = PhoneFetcher::new(&AppConfig::default());
        assert_eq!(
            fetcher.build_url("13800138000"),
            "https://www.ip138.com/mobile.asp?mobile=13800138000&action=mobile"
        );
    }

    #[test]
    fn build_url_tolerates_trailing_slash_in_config() {
        let config = AppConfig {
            base_url: "http://localhost:9000/".to_string(),
            ..AppConfig::default()
        };
        let fetcher = PhoneFetcher::new(&config);
        assert_eq!(
            fetcher.build_url("13900139000"),
            "http://localhost:9000/mobile.asp?mobile=13900139000&action=mobile"
        );
    }
}
