//! Device API client

use maa_models::Device;
use url::form_urlencoded;

use crate::errors::ConsoleError;
use crate::http::client::HttpClient;

impl HttpClient {
    /// List devices, scoped to `user_key` when one is given
    pub async fn fetch_devices(&self, user_key: Option<&str>) -> Result<Vec<Device>, ConsoleError> {
        let path = match user_key.filter(|key| !key.is_empty()) {
            Some(key) => {
                let query = form_urlencoded::Serializer::new(String::new())
                    .append_pair("user", key)
                    .finish();
                format!("/api/devices?{}", query)
            }
            None => "/api/devices".to_string(),
        };

        let devices: Option<Vec<Device>> = self.get(&path).await?;
        Ok(devices.unwrap_or_default())
    }
}
