use std::{fmt, marker::PhantomData, str::FromStr, time::Duration};

use ascii::AsciiString;
use duration_str::deserialize_option_duration;
use serde::{
    Deserialize, Deserializer,
    de::{self, SeqAccess, Visitor},
};
use url::Url;

/// Cross-origin settings for the gateway endpoints.
#[derive(Clone, Default, Debug, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CorsConfig {
    /// Whether credentials are allowed in cross-origin requests.
    pub allow_credentials: bool,
    /// Origins from which requests are accepted. Entries may contain glob characters.
    pub allow_origins: Option<AnyOrUrlArray>,
    /// How long browsers may cache a preflight response.
    #[serde(deserialize_with = "deserialize_option_duration")]
    pub max_age: Option<Duration>,
    /// Allowed request methods.
    pub allow_methods: Option<AnyOrHttpMethodArray>,
    /// Allowed request headers.
    pub allow_headers: Option<AnyOrAsciiStringArray>,
    /// Response headers exposed to the browser.
    pub expose_headers: Option<AnyOrAsciiStringArray>,
}

/// HTTP methods the gateway routes can be called with.
#[derive(Debug, PartialEq, Eq, Clone, Copy, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    /// GET
    Get,
    /// POST
    Post,
    /// HEAD
    Head,
    /// OPTIONS
    Options,
}

impl FromStr for HttpMethod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "GET" => Ok(Self::Get),
            "POST" => Ok(Self::Post),
            "HEAD" => Ok(Self::Head),
            "OPTIONS" => Ok(Self::Options),
            _ => Err(format!("Unsupported HTTP method: {s}")),
        }
    }
}

impl From<HttpMethod> for http::Method {
    fn from(value: HttpMethod) -> Self {
        match value {
            HttpMethod::Get => http::Method::GET,
            HttpMethod::Post => http::Method::POST,
            HttpMethod::Head => http::Method::HEAD,
            HttpMethod::Options => http::Method::OPTIONS,
        }
    }
}

/// Origins, either `"*"` or a list of URLs.
pub type AnyOrUrlArray = AnyOrArray<Url>;

/// Methods, either `"*"` or a list.
pub type AnyOrHttpMethodArray = AnyOrArray<HttpMethod>;

/// Header names, either `"*"` or a list.
pub type AnyOrAsciiStringArray = AnyOrArray<AsciiString>;

/// A wildcard (`"*"`), a single value, or an explicit list of values.
#[derive(Clone, Debug, PartialEq)]
pub enum AnyOrArray<T> {
    /// Everything is allowed.
    Any,
    /// Only the listed values are allowed.
    Explicit(Vec<T>),
}

impl<'de, T> Deserialize<'de> for AnyOrArray<T>
where
    T: Deserialize<'de> + FromStr<Err: fmt::Display>,
{
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct AnyOrArrayVisitor<T>(PhantomData<T>);

        impl<'de, T> Visitor<'de> for AnyOrArrayVisitor<T>
        where
            T: Deserialize<'de> + FromStr<Err: fmt::Display>,
        {
            type Value = AnyOrArray<T>;

            fn expecting(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
                formatter.write_str("the string \"*\", a single value, or an array of values")
            }

            fn visit_str<E: de::Error>(self, value: &str) -> Result<Self::Value, E> {
                if value == "*" {
                    return Ok(AnyOrArray::Any);
                }

                let value = value.parse::<T>().map_err(E::custom)?;

                Ok(AnyOrArray::Explicit(vec![value]))
            }

            fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<Self::Value, A::Error> {
                let mut values = Vec::with_capacity(seq.size_hint().unwrap_or_default());

                while let Some(value) = seq.next_element()? {
                    values.push(value);
                }

                Ok(AnyOrArray::Explicit(values))
            }
        }

        deserializer.deserialize_any(AnyOrArrayVisitor(PhantomData))
    }
}
