use std::{error, fmt, io, string::FromUtf8Error};

use reqwest::StatusCode;
use thiserror::Error;

use crate::{status, RateResponse};

#[derive(Debug, Error)]
pub enum CanadaPostError {
    /// The response body is not an XML document.
    #[error("Malformed response XML: {0}")]
    Xml(#[from] XmlError),
    /// The response is valid, but Canada Post refused to quote.
    #[error(transparent)]
    Response(#[from] ResponseError),
    #[error("Transport failed: {0}")]
    Transport(#[from] TransportError),
    #[error("Failed to write request XML: {0}")]
    Write(#[from] io::Error),
    #[error("Request XML is not valid UTF-8: {0}")]
    Encoding(#[from] FromUtf8Error),
    #[error("Missing environment variable {0}")]
    MissingEnv(&'static str),
}

/// Errors that make a response body unreadable as an XML document.
#[derive(Debug, Error)]
pub enum XmlError {
    #[error("XML processing error: {0}")]
    QuickXml(#[from] quick_xml::Error),
    #[error("unclosed XML element: {0}")]
    Unclosed(String),
    #[error("unexpected XML element after the root: {0}")]
    UnexpectedElement(String),
    #[error("missing root XML element")]
    MissingRoot,
}

/// Raised when the status code of a response is anything but a success. The parsed
/// response is kept, with empty rate, box and outlet lists.
#[derive(Debug)]
pub struct ResponseError {
    pub code: String,
    pub message: String,
    pub response: RateResponse,
}

impl ResponseError {
    pub(crate) fn new(response: RateResponse) -> Self {
        Self {
            code: response.status_code.to_string(),
            message: response.message.to_string(),
            response,
        }
    }

    /// The documented meaning of the status code.
    pub fn description(&self) -> Option<&'static str> {
        status::describe(&self.code)
    }

    /// The vendor's message, or the documented meaning of the code if the vendor sent none.
    pub fn explanation(&self) -> &str {
        if !self.message.trim().is_empty() {
            return &self.message;
        }
        self.description().unwrap_or("unknown status")
    }
}

impl fmt::Display for ResponseError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "Canada Post responded with status {}: {}",
            self.code,
            self.explanation()
        )
    }
}

impl error::Error for ResponseError {}

/// Errors from the transport collaborator. These are passed through untouched.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("Inner request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("status code -> {status}, body -> {body}")]
    Status { status: StatusCode, body: String },
}
