use crate::constants;
use crate::error::PrestoError;
use crate::session::ClientSession;

use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use std::collections::HashMap;
use std::str::FromStr;
use url::form_urlencoded;


/// Builds the request headers that carry a [`ClientSession`] to the coordinator.
///
/// Custom headers are inserted first, so the protocol headers always win a
/// name clash. Values that cannot travel as HTTP header values fail with
/// [`PrestoError::InvalidHeader`] instead of being dropped.
pub(crate) fn session_headers(session: &ClientSession) -> Result<HeaderMap, PrestoError> {
    let mut headers = HeaderMap::new();

    for (key, value) in &session.headers {
        insert(&mut headers, key, value)?;
    }

    insert(&mut headers, constants::HEADER_USER, &session.user)?;
    insert(&mut headers, constants::HEADER_SOURCE, &session.source)?;
    if let Some(catalog) = &session.catalog {
        insert(&mut headers, constants::HEADER_CATALOG, catalog)?;
    }
    if let Some(schema) = &session.schema {
        insert(&mut headers, constants::HEADER_SCHEMA, schema)?;
    }

    if !session.properties.is_empty() {
        insert(&mut headers, constants::HEADER_SESSION, &encode_pairs(&session.properties))?;
    }
    if !session.prepared_statements.is_empty() {
        insert(
            &mut headers,
            constants::HEADER_PREPARED_STATEMENT,
            &encode_pairs(&session.prepared_statements),
        )?;
    }

    insert(&mut headers, constants::HEADER_TRANSACTION, &session.transaction_id)?;

    Ok(headers)
}

fn insert(headers: &mut HeaderMap, key: &str, value: &str) -> Result<(), PrestoError> {
    let name = HeaderName::from_str(key)
        .map_err(|_| PrestoError::InvalidHeader(format!("Invalid header key: {}", key)))?;
    let value = HeaderValue::from_str(value)
        .map_err(|_| PrestoError::InvalidHeader(format!("Invalid header value: {}", value)))?;

    headers.insert(name, value);
    Ok(())
}

/// `name=value` pairs joined by commas, values form-url-encoded. Sorted by
/// name so the header is stable between requests.
fn encode_pairs(pairs: &HashMap<String, String>) -> String {
    let mut names: Vec<&String> = pairs.keys().collect();
    names.sort();

    names
        .into_iter()
        .map(|name| {
            let value: String = form_urlencoded::byte_serialize(pairs[name].as_bytes()).collect();
            format!("{}={}", name, value)
        })
        .collect::<Vec<_>>()
        .join(",")
}

/// Split a `name=value` directive, decoding the value.
pub(crate) fn decode_pair(directive: &str) -> Option<(String, String)> {
    let (name, value) = directive.split_once('=')?;
    let value = form_urlencoded::parse(format!("v={}", value).as_bytes())
        .next()
        .map(|(_, v)| v.into_owned())
        .unwrap_or_default();

    Some((name.trim().to_string(), value))
}
