use reqwest::{blocking::Client, header};

use crate::TransportError;

/// Delivers a request document to Sell Online and returns the raw response body.
pub trait Transport: Send + Sync {
    fn post(&self, url: &str, body: &str) -> Result<String, TransportError>;
}

/// Posts requests over HTTP(S) with a blocking reqwest client.
#[derive(Clone, Debug, Default)]
pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

impl Transport for HttpTransport {
    fn post(&self, url: &str, body: &str) -> Result<String, TransportError> {
        let resp = self
            .client
            .post(url)
            .header(
                header::CONTENT_TYPE,
                header::HeaderValue::from_static("application/x-www-form-urlencoded"),
            )
            .body(body.to_string())
            .send()?;

        let status = resp.status();
        let text = resp.text()?;
        if !status.is_success() {
            return Err(TransportError::Status { status, body: text });
        }

        Ok(text)
    }
}
