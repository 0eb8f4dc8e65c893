//! Envelope parsing and page fetching

use serde_json::Value;
use tracing::debug;

use crate::config::SourceConfig;
use crate::endpoints::{EndpointProfile, ObjectType};
use crate::error::{Error, Result};
use crate::http::ApiClient;
use crate::types::JsonValue;

/// Envelope field consulted for the has-more inference when the profile
/// names no more field.
const TOTAL_FIELD: &str = "total";

/// One page of a paged response, parsed against an endpoint profile.
#[derive(Debug, Clone, PartialEq)]
pub struct Page {
    /// Items lifted out of the envelope, in response order.
    pub items: Vec<JsonValue>,

    /// Whether the API reported more data. `None` means the profile gives
    /// no way to tell and the page is terminal.
    pub has_more: Option<bool>,

    /// Continuation offset reported by the response, stringified.
    pub offset: Option<String>,
}

impl Page {
    /// Parse a response body against a profile.
    ///
    /// A missing or mistyped envelope field named by the profile is a
    /// `MalformedResponse` error, never an empty default: silently treating
    /// a missing field as "no data" would corrupt pagination termination.
    pub fn parse(body: &str, profile: &EndpointProfile) -> Result<Page> {
        let root: Value = serde_json::from_str(body)?;

        let items = match profile.items_field {
            Some(field) => {
                let value = root
                    .get(field)
                    .ok_or_else(|| Error::malformed(field, "expected field is missing"))?;
                value
                    .as_array()
                    .ok_or_else(|| Error::malformed(field, "expected a JSON array"))?
                    .clone()
            }
            None => vec![root.clone()],
        };

        let mut has_more = match profile.more_field {
            Some(field) => {
                let value = root
                    .get(field)
                    .ok_or_else(|| Error::malformed(field, "expected field is missing"))?;
                let more = value
                    .as_bool()
                    .ok_or_else(|| Error::malformed(field, "expected a boolean"))?;
                Some(more)
            }
            None => None,
        };

        let offset = match profile.offset_field {
            Some(field) => root
                .get(field)
                .map(|value| scalar_text(field, value))
                .transpose()?,
            None => None,
        };

        // Endpoints without a more field sometimes report an offset plus a
        // total count. Only then can exhaustion be inferred; without a
        // total the page stays terminal.
        if has_more.is_none() {
            if let (Some(offset_text), Some(total)) = (&offset, root.get(TOTAL_FIELD)) {
                let total_text = scalar_text(TOTAL_FIELD, total)?;
                has_more = Some(offset_text != &total_text && offset_text != "0");
            }
        }

        Ok(Page {
            items,
            has_more,
            offset,
        })
    }
}

fn scalar_text(field: &str, value: &Value) -> Result<String> {
    match value {
        Value::String(s) => Ok(s.clone()),
        Value::Number(n) => Ok(n.to_string()),
        _ => Err(Error::malformed(field, "expected a scalar value")),
    }
}

/// Fetch one page at the given offset (`None` for the first page).
pub async fn fetch_page(
    client: &ApiClient,
    profile: &EndpointProfile,
    config: &SourceConfig,
    offset: Option<&str>,
) -> Result<Page> {
    let path = request_path(profile, config)?;
    let query = request_query(profile, config, offset);

    let response = client.get(&path, &query).await?;
    let body = response.text().await?;
    let page = Page::parse(&body, profile)?;

    debug!(
        object_type = %profile.object_type,
        items = page.items.len(),
        has_more = ?page.has_more,
        offset = ?page.offset,
        "fetched page"
    );
    Ok(page)
}

/// Endpoint path for the request. Analytics appends the configured
/// `{report}/{period}` segments.
pub(crate) fn request_path(profile: &EndpointProfile, config: &SourceConfig) -> Result<String> {
    if profile.object_type == ObjectType::Analytics {
        Ok(format!("{}/{}", profile.path, config.report_path()?))
    } else {
        Ok(profile.path.to_string())
    }
}

/// Query parameters for a page request: date range, repeated filter params,
/// page size when the profile takes one, and the continuation offset when
/// both the offset and a profile offset param exist.
pub(crate) fn request_query(
    profile: &EndpointProfile,
    config: &SourceConfig,
    offset: Option<&str>,
) -> Vec<(String, String)> {
    let mut query = Vec::new();
    if let Some(start) = &config.start_date {
        query.push(("start".to_string(), start.clone()));
    }
    if let Some(end) = &config.end_date {
        query.push(("end".to_string(), end.clone()));
    }
    for filter in config.filter_list() {
        query.push(("f".to_string(), filter));
    }
    if let Some(limit_param) = profile.limit_param {
        query.push((limit_param.to_string(), config.page_size.to_string()));
    }
    if let (Some(offset), Some(offset_param)) = (offset, profile.offset_param) {
        query.push((offset_param.to_string(), offset.to_string()));
    }
    query
}
