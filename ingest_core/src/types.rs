use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// One ingested event. Keys are unordered; values are arbitrary JSON.
pub type Fact = Map<String, Value>;

/// Top-level key marking where the fact came from.
pub const SRC_KEY: &str = "src";
/// Value of [`SRC_KEY`] for server-to-server submissions.
pub const API_SRC: &str = "api";
/// Top-level key holding the client ip extracted from the request.
pub const SOURCE_IP_KEY: &str = "source_ip";

/// Nested object with device information.
pub const DEVICE_CTX_KEY: &str = "device_ctx";
/// Raw ip inside the device context.
pub const DEVICE_IP_KEY: &str = "ip";
/// Raw user-agent inside the device context.
pub const UA_KEY: &str = "ua";
/// Resolved geo data inside the device context. Present on input means "do not resolve".
pub const GEO_DATA_KEY: &str = "geo";
/// Parsed user-agent inside the device context. Present on input means "do not resolve".
pub const PARSED_UA_KEY: &str = "parsed_ua";

/// Geolocation for an ip address.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GeoData {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub country: String,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub region: String,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub city: String,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub zip: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lat: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lon: Option<f64>
}

impl GeoData {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    pub fn to_value(&self) -> Value {
        serde_json::to_value(self).unwrap_or_default()
    }
}

/// Best-effort breakdown of a user-agent string.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParsedUa {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub ua_family: String,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub ua_version: String,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub os_family: String,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub os_version: String,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub device_family: String,

    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub bot: bool
}

impl ParsedUa {
    pub fn to_value(&self) -> Value {
        serde_json::to_value(self).unwrap_or_default()
    }
}
