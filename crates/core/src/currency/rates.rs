//! Exchange rate tables and the providers that fetch them.
//!
//! The live provider is [open.er-api.com](https://open.er-api.com), which
//! returns every rate relative to the requested base currency.

use std::collections::HashMap;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::RateError;

/// Rates relative to one base currency, as returned by a single fetch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RateTable {
    /// Base currency code (uppercase).
    pub base: String,
    /// Units of each currency per one unit of `base`.
    pub rates: HashMap<String, f64>,
    /// When the provider last refreshed its data.
    pub last_updated: Option<DateTime<Utc>>,
}

impl RateTable {
    #[must_use]
    pub fn new(base: &str, rates: HashMap<String, f64>) -> Self {
        Self {
            base: base.to_uppercase(),
            rates,
            last_updated: None,
        }
    }

    #[must_use]
    pub fn with_last_updated(mut self, at: DateTime<Utc>) -> Self {
        self.last_updated = Some(at);
        self
    }

    /// Units of `code` per one unit of the table's base.
    ///
    /// Zero and non-finite entries count as missing.
    #[must_use]
    pub fn rate(&self, code: &str) -> Option<f64> {
        let code = code.to_uppercase();
        if code == self.base {
            return Some(1.0);
        }
        self.rates
            .get(&code)
            .copied()
            .filter(|r| r.is_finite() && *r > 0.0)
    }

    /// Rate between any two currencies in the table, crossing through the
    /// base when neither side is the base.
    #[must_use]
    pub fn cross_rate(&self, from: &str, to: &str) -> Option<f64> {
        if from.eq_ignore_ascii_case(to) {
            return Some(1.0);
        }
        Some(self.rate(to)? / self.rate(from)?)
    }

    /// `last_updated` in Unix milliseconds, for front-ends that want it.
    #[must_use]
    pub fn last_updated_millis(&self) -> Option<i64> {
        self.last_updated.map(|t| t.timestamp_millis())
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.rates.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rates.is_empty()
    }
}

/// Source of exchange rate tables.
pub trait RateProvider: Send + Sync {
    /// Fetch all rates relative to `base`. May block.
    fn fetch(&self, base: &str) -> Result<RateTable, RateError>;
}

impl<F> RateProvider for F
where
    F: Fn(&str) -> Result<RateTable, RateError> + Send + Sync,
{
    fn fetch(&self, base: &str) -> Result<RateTable, RateError> {
        self(base)
    }
}

/// Response body from open.er-api.com.
#[derive(Debug, Deserialize)]
struct ErApiResponse {
    result: Option<String>,
    base_code: Option<String>,
    #[serde(default)]
    rates: HashMap<String, f64>,
    time_last_update_unix: Option<i64>,
    #[serde(rename = "error-type")]
    error_type: Option<String>,
}

/// Live rates from open.er-api.com over HTTPS.
#[derive(Debug, Clone)]
pub struct OpenErApi {
    endpoint: String,
    timeout: Duration,
}

impl Default for OpenErApi {
    fn default() -> Self {
        Self {
            endpoint: Self::DEFAULT_ENDPOINT.to_string(),
            timeout: Duration::from_secs(Self::DEFAULT_TIMEOUT_SECS),
        }
    }
}

impl OpenErApi {
    pub const DEFAULT_ENDPOINT: &'static str = "https://open.er-api.com/v6/latest";
    pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

    #[must_use]
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> Self {
        Self {
            endpoint: endpoint.into(),
            timeout,
        }
    }

    #[must_use]
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    #[must_use]
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    fn url_for(&self, base: &str) -> String {
        format!("{}/{}", self.endpoint.trim_end_matches('/'), base)
    }

    /// Turn a decoded response body into a table.
    fn decode(base: &str, body: ErApiResponse) -> Result<RateTable, RateError> {
        if let Some(result) = body.result.as_deref() {
            if result != "success" {
                let reason = body.error_type.unwrap_or_else(|| result.to_string());
                return Err(RateError::Provider(reason));
            }
        }
        if body.rates.is_empty() {
            return Err(RateError::Decode("response contained no rates".to_string()));
        }

        let base = body.base_code.unwrap_or_else(|| base.to_string());
        let mut table = RateTable::new(&base, body.rates);
        // Seconds on the wire; DateTime keeps millisecond precision for display.
        table.last_updated = body
            .time_last_update_unix
            .and_then(|secs| DateTime::from_timestamp(secs, 0));
        Ok(table)
    }
}

impl RateProvider for OpenErApi {
    fn fetch(&self, base: &str) -> Result<RateTable, RateError> {
        let base = base.trim().to_uppercase();
        if base.len() != 3 || !base.chars().all(|c| c.is_ascii_alphabetic()) {
            return Err(RateError::UnknownCurrency(base));
        }

        let url = self.url_for(&base);
        tracing::debug!(%url, "fetching exchange rates");

        match ureq::get(&url).timeout(self.timeout).call() {
            Ok(response) => {
                let body: ErApiResponse = response
                    .into_json()
                    .map_err(|e| RateError::Decode(e.to_string()))?;
                let table = Self::decode(&base, body)?;
                tracing::debug!(base = %table.base, count = table.len(), "exchange rates loaded");
                Ok(table)
            }
            Err(ureq::Error::Status(status, response)) => {
                // The service reports unsupported codes as JSON with an error status.
                let reason = response
                    .into_json::<ErApiResponse>()
                    .ok()
                    .and_then(|body| Self::decode(&base, body).err());
                match reason {
                    Some(err @ RateError::Provider(_)) => Err(err),
                    _ => Err(RateError::Http { status }),
                }
            }
            Err(ureq::Error::Transport(transport)) => {
                Err(RateError::Transport(transport.to_string()))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const SAMPLE: &str = r#"{
        "result": "success",
        "provider": "https://www.exchangerate-api.com",
        "time_last_update_unix": 1700006401,
        "base_code": "USD",
        "rates": { "USD": 1, "EUR": 0.92, "INR": 83.2, "JPY": 150.1 }
    }"#;

    fn decode_str(base: &str, json: &str) -> Result<RateTable, RateError> {
        let body: ErApiResponse =
            serde_json::from_str(json).map_err(|e| RateError::Decode(e.to_string()))?;
        OpenErApi::decode(base, body)
    }

    /// Answer a single HTTP request on a loopback port with `status` and `body`.
    fn serve_once(status: &str, body: &'static str) -> OpenErApi {
        use std::io::{BufRead, BufReader, Write};
        use std::net::TcpListener;

        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();
        let status = status.to_string();
        std::thread::spawn(move || {
            let (stream, _) = listener.accept().unwrap();
            let mut reader = BufReader::new(stream);
            let mut line = String::new();
            while reader.read_line(&mut line).unwrap() > 2 {
                line.clear();
            }
            let mut stream = reader.into_inner();
            write!(
                stream,
                "HTTP/1.1 {status}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                body.len()
            )
            .unwrap();
        });
        OpenErApi::new(
            format!("http://127.0.0.1:{port}/v6/latest"),
            Duration::from_secs(5),
        )
    }

    fn table() -> RateTable {
        RateTable::new(
            "usd",
            HashMap::from([
                ("USD".to_string(), 1.0),
                ("EUR".to_string(), 0.92),
                ("INR".to_string(), 83.2),
                ("XXX".to_string(), 0.0),
            ]),
        )
    }

    #[test]
    fn test_decode_success() {
        let table = decode_str("USD", SAMPLE).unwrap();
        assert_eq!(table.base, "USD");
        assert_eq!(table.len(), 4);
        assert_eq!(table.rate("eur"), Some(0.92));
        assert_eq!(table.last_updated_millis(), Some(1_700_006_401_000));
    }

    #[test]
    fn test_decode_provider_error() {
        let json = r#"{"result": "error", "error-type": "unsupported-code"}"#;
        assert_eq!(
            decode_str("ZZZ", json),
            Err(RateError::Provider("unsupported-code".into()))
        );
    }

    #[test]
    fn test_decode_garbage() {
        assert!(matches!(
            decode_str("USD", "<html>"),
            Err(RateError::Decode(_))
        ));
        assert!(matches!(
            decode_str("USD", r#"{"result": "success", "rates": {}}"#),
            Err(RateError::Decode(_))
        ));
    }

    #[test]
    fn test_fetch_decodes_json_body() {
        let api = serve_once("200 OK", SAMPLE);
        let table = api.fetch("usd").unwrap();
        assert_eq!(table.base, "USD");
        assert_eq!(table.rate("INR"), Some(83.2));
    }

    #[test]
    fn test_fetch_error_status() {
        let api = serve_once(
            "404 Not Found",
            r#"{"result": "error", "error-type": "unsupported-code"}"#,
        );
        assert_eq!(
            api.fetch("ZZZ"),
            Err(RateError::Provider("unsupported-code".into()))
        );

        let api = serve_once("503 Service Unavailable", "<html>down</html>");
        assert_eq!(api.fetch("USD"), Err(RateError::Http { status: 503 }));
    }

    #[test]
    fn test_fetch_rejects_malformed_body() {
        let api = serve_once("200 OK", "<html>");
        assert!(matches!(api.fetch("USD"), Err(RateError::Decode(_))));
    }

    #[test]
    fn test_rate_lookup() {
        let table = table();
        assert_eq!(table.base, "USD");
        assert_eq!(table.rate("USD"), Some(1.0));
        assert_eq!(table.rate("inr"), Some(83.2));
        assert_eq!(table.rate("GBP"), None);
        assert_eq!(table.rate("XXX"), None);
    }

    #[test]
    fn test_cross_rate() {
        let table = table();
        let eur_to_inr = table.cross_rate("EUR", "INR").unwrap();
        assert!((eur_to_inr - 83.2 / 0.92).abs() < 1e-9);
        assert_eq!(table.cross_rate("EUR", "eur"), Some(1.0));
        assert_eq!(table.cross_rate("EUR", "GBP"), None);
    }

    #[test]
    fn test_rejects_malformed_codes_before_network() {
        let api = OpenErApi::new("http://127.0.0.1:9", Duration::from_millis(10));
        assert_eq!(
            api.fetch("US/D"),
            Err(RateError::UnknownCurrency("US/D".into()))
        );
    }

    #[test]
    fn test_url_for() {
        let api = OpenErApi::new("https://example.test/v6/latest/", Duration::from_secs(1));
        assert_eq!(api.url_for("SEK"), "https://example.test/v6/latest/SEK");
        assert_eq!(OpenErApi::default().endpoint(), OpenErApi::DEFAULT_ENDPOINT);
    }

    #[test]
    fn test_closure_provider() {
        let provider =
            |base: &str| -> Result<RateTable, RateError> { Ok(RateTable::new(base, HashMap::new())) };
        assert_eq!(provider.fetch("eur").unwrap().base, "EUR");
    }
}
