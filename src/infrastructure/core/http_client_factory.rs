use crate::domain::errors::MetricsError;
use reqwest::Client;
use std::time::Duration;

pub struct HttpClientFactory;

impl HttpClientFactory {
    /// Creates the HTTP client used for outbound pushes.
    ///
    /// No retry middleware: a failed push is reported and dropped.
    /// Without `timeout` a hung request is bounded only by the transport.
    pub fn create_client(timeout: Option<Duration>) -> Result<Client, MetricsError> {
        let mut builder = Client::builder()
            .pool_max_idle_per_host(2)
            .user_agent(concat!(
                env!("CARGO_PKG_NAME"),
                "/",
                env!("CARGO_PKG_VERSION")
            ));

        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }

        Ok(builder.build()?)
    }
}
