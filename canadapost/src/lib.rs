/*!
 * A rust library for getting shipping rates from Canada Post.
 *
 * Rates come from the Sell Online eParcel service: a shipment is described as an
 * `eparcel` XML document, posted to Canada Post, and the response lists a rate per
 * service, the boxes the items were packed into and the post offices nearest to the
 * origin.
 *
 * Example:
 *
 * ```no_run
 * use canadapost::{CanadaPost, LineItem, Location, RateRequest};
 * use rust_decimal_macros::dec;
 *
 * fn get_rates() {
 *     // Initialize the Canada Post client.
 *     let canada_post = CanadaPost::new_from_env().unwrap();
 *
 *     let request = RateRequest {
 *         origin: Some(Location::default_location()),
 *         destination: Location {
 *             city: "Beverly Hills".to_string(),
 *             province: "CA".to_string(),
 *             country: "United States".to_string(),
 *             postal_code: "90210".to_string(),
 *             ..Default::default()
 *         },
 *         turn_around_time: Some(24),
 *         line_items: vec![LineItem {
 *             quantity: 1,
 *             weight: 5.0,
 *             length: 2.0,
 *             width: 3.0,
 *             height: 4.0,
 *             description: "a box full of stuff".to_string(),
 *             price: dec!(10.00),
 *             ready_to_ship: None,
 *         }],
 *     };
 *
 *     // Get the rates.
 *     let response = canada_post.find_rates(request).unwrap();
 *
 *     for rate in response.rates {
 *         println!("{}: {}", rate.service_name, rate.total_price);
 *     }
 * }
 * ```
 */
use std::{env, sync::Arc};

use reqwest::Url;

mod error;
mod lenient;
pub mod request;
pub mod response;
pub mod status;
pub mod transport;
mod types;
mod xml;

pub use error::{CanadaPostError, ResponseError, TransportError, XmlError};
pub use request::{build_rate_request, DOCTYPE};
pub use response::parse_rate_response;
pub use transport::{HttpTransport, Transport};
pub use types::*;

/// The carrier name on every rate estimate.
pub const CARRIER_NAME: &str = "Canada Post";

/// Turnaround time, in hours, used when checking credentials.
pub const DEFAULT_TURN_AROUND_TIME: u32 = 5;

/// Entrypoint for getting rates from Canada Post.
#[derive(Clone)]
pub struct CanadaPost {
    merchant_id: String,
    language: Language,
    base_url: Option<Url>,

    transport: Arc<dyn Transport>,
}

impl CanadaPost {
    /// Create a new Canada Post client struct. It takes the merchant CPC id assigned by
    /// Canada Post, e.g. `CPC_DEMO_XML`.
    pub fn new<K>(merchant_id: K) -> Self
    where
        K: ToString,
    {
        Self {
            merchant_id: merchant_id.to_string(),
            language: Language::default(),
            base_url: None,

            transport: Arc::new(HttpTransport::default()),
        }
    }

    /// Create a new Canada Post client struct from the `CANADA_POST_MERCHANT_ID`
    /// environment variable.
    pub fn new_from_env() -> Result<Self, CanadaPostError> {
        let merchant_id = env::var("CANADA_POST_MERCHANT_ID")
            .map_err(|_| CanadaPostError::MissingEnv("CANADA_POST_MERCHANT_ID"))?;

        Ok(CanadaPost::new(merchant_id))
    }

    /// Set the language rates are requested in. This also picks the endpoint.
    pub fn language(mut self, language: Language) -> Self {
        self.language = language;
        self
    }

    /// Send every request to `url` instead of the endpoint of the language.
    pub fn base_url(mut self, url: Url) -> Self {
        self.base_url = Some(url);
        self
    }

    /// Replace the HTTP transport.
    pub fn with_transport<T>(mut self, transport: T) -> Self
    where
        T: Transport + 'static,
    {
        self.transport = Arc::new(transport);
        self
    }

    pub fn merchant_id(&self) -> &str {
        &self.merchant_id
    }

    fn endpoint(&self, language: Language) -> String {
        match &self.base_url {
            Some(url) => url.to_string(),
            None => language.endpoint().to_string(),
        }
    }

    /// Build the request document for `request` in the configured language.
    pub fn build_rate_request(&self, request: &RateRequest) -> Result<String, CanadaPostError> {
        build_rate_request(&self.merchant_id, self.language, request)
    }

    /// Get rates for a shipment in the configured language.
    pub fn find_rates(&self, request: RateRequest) -> Result<RateResponse, CanadaPostError> {
        self.find_rates_in(self.language, request)
    }

    /// Get rates for a shipment in the given language.
    ///
    /// A refusal from Canada Post is returned as [`CanadaPostError::Response`], transport
    /// failures as [`CanadaPostError::Transport`].
    pub fn find_rates_in(
        &self,
        language: Language,
        request: RateRequest,
    ) -> Result<RateResponse, CanadaPostError> {
        let body = build_rate_request(&self.merchant_id, language, &request)?;
        let url = self.endpoint(language);

        log::info!(
            "requesting Canada Post rates for {} line items from {}",
            request.line_items.len(),
            url
        );
        let raw = self.transport.post(&url, &body)?;

        match parse_rate_response(&raw) {
            Ok(mut response) => {
                response.request = Some(request);
                Ok(response)
            }
            Err(CanadaPostError::Response(mut e)) => {
                e.response.request = Some(request);
                Err(CanadaPostError::Response(e))
            }
            Err(e) => Err(e),
        }
    }

    /// Check the merchant id by asking for rates from Ottawa to Ottawa.
    ///
    /// Returns false when Canada Post refuses to quote. Any other error is returned.
    pub fn valid_credentials(&self) -> Result<bool, CanadaPostError> {
        let location = Location::default_location();
        let request = RateRequest {
            origin: Some(location.clone()),
            destination: location,
            turn_around_time: Some(DEFAULT_TURN_AROUND_TIME),
            line_items: vec![],
        };

        match self.find_rates(request) {
            Ok(_) => Ok(true),
            Err(CanadaPostError::Response(e)) => {
                log::info!("Canada Post rejected the credentials: {}", e);
                Ok(false)
            }
            Err(e) => Err(e),
        }
    }
}
