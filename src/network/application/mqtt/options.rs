//! Client configuration.

use super::error::Error;
use core::fmt::Write as _;
use heapless::String;
use serde::{Deserialize, Serialize};

/// Broker used when no host is configured.
pub const DEFAULT_HOST: &str = "iot.mosquitto.org";
/// Standard unencrypted MQTT port.
pub const DEFAULT_PORT: u16 = 1883;
/// Keep-alive interval used when none is configured.
pub const DEFAULT_KEEP_ALIVE_SECONDS: u16 = 15;
/// How long to wait for CONNACK when none is configured.
pub const DEFAULT_CONNECT_TIMEOUT_MS: u32 = 10_000;
/// Longest `host:port` string [`Options::remote`] can produce.
pub const MAX_REMOTE_LEN: usize = 128;

fn default_host() -> &'static str {
    DEFAULT_HOST
}

fn default_port() -> u16 {
    DEFAULT_PORT
}

fn default_keep_alive() -> u16 {
    DEFAULT_KEEP_ALIVE_SECONDS
}

fn default_clean_session() -> bool {
    true
}

fn default_connect_timeout() -> u32 {
    DEFAULT_CONNECT_TIMEOUT_MS
}

/// Configuration options for an MQTT client session.
///
/// Only `client_id` is mandatory; everything else has a default. Options can
/// be written as a struct literal, built with [`Options::new`], or parsed from
/// a JSON document with [`Options::from_json`].
///
/// # Examples
///
/// ```rust
/// use libmqisdp::network::application::mqtt::Options;
///
/// let options = Options::from_json(
///     r#"{"client_id":"weather-station","host":"broker.local","keep_alive_seconds":60}"#,
/// )
/// .unwrap();
///
/// assert_eq!(options.client_id, "weather-station");
/// assert_eq!(options.host, "broker.local");
/// assert_eq!(options.port, 1883);
/// assert_eq!(options.keep_alive_seconds, 60);
/// assert!(options.clean_session);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Options<'a> {
    /// Broker host name or address.
    #[serde(borrow, default = "default_host")]
    pub host: &'a str,

    /// Broker TCP port.
    #[serde(default = "default_port")]
    pub port: u16,

    /// The client identifier sent in CONNECT.
    ///
    /// # Constraints
    /// - At most 255 characters
    /// - Characters up to U+00FF only
    #[serde(borrow)]
    pub client_id: &'a str,

    /// Keep-alive interval in seconds. Zero disables keepalive pings.
    #[serde(default = "default_keep_alive")]
    pub keep_alive_seconds: u16,

    /// Whether to ask the broker for a clean session.
    #[serde(default = "default_clean_session")]
    pub clean_session: bool,

    /// How long to wait for CONNACK before the handshake is declared failed.
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_ms: u32,
}

impl<'a> Options<'a> {
    /// Options for `client_id` with every other field at its default.
    pub const fn new(client_id: &'a str) -> Self {
        Self {
            host: DEFAULT_HOST,
            port: DEFAULT_PORT,
            client_id,
            keep_alive_seconds: DEFAULT_KEEP_ALIVE_SECONDS,
            clean_session: true,
            connect_timeout_ms: DEFAULT_CONNECT_TIMEOUT_MS,
        }
    }

    /// Parse options from JSON. Strings are borrowed from `json`, so they must
    /// not contain escape sequences.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidConfig`] if the document is not valid options JSON.
    pub fn from_json(json: &'a str) -> Result<Self, Error> {
        serde_json_core::from_str::<Options<'a>>(json)
            .map(|(options, _)| options)
            .map_err(|_| Error::InvalidConfig)
    }

    /// Serialise the options as JSON into `buf`, returning the bytes used.
    ///
    /// # Errors
    ///
    /// [`Error::BufferOverflow`] if `buf` is too small.
    pub fn to_json(&self, buf: &mut [u8]) -> Result<usize, Error> {
        serde_json_core::to_slice(self, buf).map_err(|_| Error::BufferOverflow)
    }

    /// The `host:port` string handed to a connector.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidAddress`] if the host is empty or too long.
    pub fn remote(&self) -> Result<String<MAX_REMOTE_LEN>, Error> {
        if self.host.is_empty() {
            return Err(Error::InvalidAddress);
        }
        let mut remote = String::new();
        write!(remote, "{}:{}", self.host, self.port).map_err(|_| Error::InvalidAddress)?;
        Ok(remote)
    }
}

/// Build a client identifier of the form `myMQTT-NN`.
///
/// `entropy` is reduced to two decimal digits; pass any random or
/// device-unique value the platform has.
///
/// ```rust
/// use libmqisdp::network::application::mqtt::default_client_id;
///
/// assert_eq!(default_client_id(7).as_str(), "myMQTT-7");
/// assert_eq!(default_client_id(1234).as_str(), "myMQTT-34");
/// ```
pub fn default_client_id(entropy: u32) -> String<16> {
    let mut id = String::new();
    // "myMQTT-" plus at most two digits always fits.
    let _ = write!(id, "myMQTT-{}", entropy % 100);
    id
}
