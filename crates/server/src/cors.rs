use config::{AnyOrAsciiStringArray, AnyOrHttpMethodArray, AnyOrUrlArray, CorsConfig};
use http::{HeaderName, HeaderValue, Method};
use tower_http::cors::{AllowHeaders, AllowMethods, AllowOrigin, CorsLayer, ExposeHeaders};
use url::Url;

const GLOB_CHARACTERS: &str = "?*[]{}!\\";

pub(super) fn generate(
    CorsConfig {
        allow_credentials,
        allow_origins,
        max_age,
        allow_methods,
        allow_headers,
        expose_headers,
    }: &CorsConfig,
) -> CorsLayer {
    let mut cors_layer = CorsLayer::new().allow_credentials(*allow_credentials);

    if let Some(allow_origins) = allow_origins {
        cors_layer = cors_layer.allow_origin(match allow_origins {
            AnyOrUrlArray::Any => AllowOrigin::any(),
            AnyOrUrlArray::Explicit(origins) => allow_origin(origins),
        });
    }

    if let Some(max_age) = max_age {
        cors_layer = cors_layer.max_age(*max_age);
    }

    if let Some(allow_methods) = allow_methods {
        cors_layer = cors_layer.allow_methods(match allow_methods {
            AnyOrHttpMethodArray::Any => AllowMethods::any(),
            AnyOrHttpMethodArray::Explicit(methods) => {
                let mut methods: Vec<Method> = methods.iter().map(|method| Method::from(*method)).collect();

                // Preflight requests must always be answered.
                if !methods.contains(&Method::OPTIONS) {
                    methods.push(Method::OPTIONS);
                }

                AllowMethods::list(methods)
            }
        });
    }

    if let Some(allow_headers) = allow_headers {
        cors_layer = cors_layer.allow_headers(match allow_headers {
            AnyOrAsciiStringArray::Any => AllowHeaders::any(),
            AnyOrAsciiStringArray::Explicit(headers) => AllowHeaders::list(header_names(headers)),
        });
    }

    if let Some(expose_headers) = expose_headers {
        cors_layer = cors_layer.expose_headers(match expose_headers {
            AnyOrAsciiStringArray::Any => ExposeHeaders::any(),
            AnyOrAsciiStringArray::Explicit(headers) => ExposeHeaders::list(header_names(headers)),
        });
    }

    cors_layer
}

/// Exact origins are compared as header values, entries with glob characters
/// are matched with `fast_glob`.
fn allow_origin(origins: &[Url]) -> AllowOrigin {
    let mut constants = Vec::new();
    let mut globs = Vec::new();

    for origin in origins {
        let origin = &origin[..url::Position::BeforePath];

        if origin.chars().any(|c| GLOB_CHARACTERS.contains(c)) {
            globs.push(origin.to_owned());
            continue;
        }

        match HeaderValue::from_str(origin) {
            Ok(value) => constants.push(value),
            Err(e) => log::warn!("Ignoring CORS origin '{origin}': {e}"),
        }
    }

    if globs.is_empty() {
        return AllowOrigin::list(constants);
    }

    AllowOrigin::predicate(move |origin: &HeaderValue, _| {
        if constants.contains(origin) {
            return true;
        }

        let Ok(origin) = origin.to_str() else {
            return false;
        };

        globs.iter().any(|glob| fast_glob::glob_match(glob, origin))
    })
}

fn header_names(headers: &[ascii::AsciiString]) -> Vec<HeaderName> {
    headers
        .iter()
        .filter_map(|header| match HeaderName::from_bytes(header.as_bytes()) {
            Ok(name) => Some(name),
            Err(e) => {
                log::warn!("Ignoring CORS header '{header}': {e}");
                None
            }
        })
        .collect()
}
