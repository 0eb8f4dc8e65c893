//! Tests for the pagination module

use super::page::{request_path, request_query};
use super::*;
use crate::auth::Credential;
use crate::config::{ReportType, SourceConfig, TimePeriod};
use crate::endpoints::{EndpointProfile, EndpointTable, ObjectType};
use crate::error::Error;
use crate::http::ApiClient;
use pretty_assertions::assert_eq;
use serde_json::json;
use wiremock::matchers::{method, path, query_param, query_param_is_missing};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn test_client(base_url: &str) -> ApiClient {
    ApiClient::builder()
        .base_url(base_url)
        .credential(Credential::ApiKey("demo".to_string()))
        .build()
        .unwrap()
}

fn analytics_config() -> SourceConfig {
    let mut config = SourceConfig::new(ObjectType::Analytics);
    config.report_type = Some(ReportType::Category);
    config.report_category = Some("totals".to_string());
    config.time_period = Some(TimePeriod::Total);
    config.start_date = Some("20190101".to_string());
    config.end_date = Some("20191111".to_string());
    config.filters = Some("client".to_string());
    config
}

/// Profile with no envelope fields at all, for the whole-body case.
fn bare_profile() -> EndpointProfile {
    EndpointProfile {
        object_type: ObjectType::DealPipelines,
        path: "/crm-pipelines/v1/pipelines/deals",
        limit_param: None,
        offset_param: None,
        offset_field: None,
        more_field: None,
        items_field: None,
        write_path: None,
    }
}

// ============================================================================
// Page parsing
// ============================================================================

#[test]
fn test_parse_contact_lists_envelope() {
    let table = EndpointTable::new();
    let profile = table.profile(ObjectType::ContactLists).unwrap();
    let body = json!({
        "lists": [{"testobj": 0}, {"testobj": 1}],
        "has-more": true,
        "offset": 2
    });

    let page = Page::parse(&body.to_string(), profile).unwrap();

    assert_eq!(page.items, vec![json!({"testobj": 0}), json!({"testobj": 1})]);
    assert_eq!(page.has_more, Some(true));
    assert_eq!(page.offset, Some("2".to_string()));
}

#[test]
fn test_parse_missing_items_field_is_malformed() {
    let table = EndpointTable::new();
    let profile = table.profile(ObjectType::ContactLists).unwrap();
    let body = json!({"has-more": false});

    let err = Page::parse(&body.to_string(), profile).unwrap_err();
    assert!(matches!(err, Error::MalformedResponse { .. }));
    assert!(err.to_string().contains("lists"));
}

#[test]
fn test_parse_non_array_items_field_is_malformed() {
    let table = EndpointTable::new();
    let profile = table.profile(ObjectType::ContactLists).unwrap();
    let body = json!({"lists": {"testobj": 0}, "has-more": false});

    let err = Page::parse(&body.to_string(), profile).unwrap_err();
    assert!(err.to_string().contains("array"));
}

#[test]
fn test_parse_missing_more_field_is_malformed() {
    let table = EndpointTable::new();
    let profile = table.profile(ObjectType::ContactLists).unwrap();
    let body = json!({"lists": []});

    let err = Page::parse(&body.to_string(), profile).unwrap_err();
    assert!(err.to_string().contains("has-more"));
}

#[test]
fn test_parse_non_bool_more_field_is_malformed() {
    let table = EndpointTable::new();
    let profile = table.profile(ObjectType::ContactLists).unwrap();
    let body = json!({"lists": [], "has-more": "yes"});

    let err = Page::parse(&body.to_string(), profile).unwrap_err();
    assert!(err.to_string().contains("boolean"));
}

#[test]
fn test_parse_whole_body_when_no_items_field() {
    let profile = bare_profile();
    let body = json!({"results": [], "label": "default"});

    let page = Page::parse(&body.to_string(), &profile).unwrap();

    assert_eq!(page.items, vec![body]);
    assert_eq!(page.has_more, None);
    assert_eq!(page.offset, None);
}

#[test]
fn test_parse_infers_has_more_from_offset_and_total() {
    // Marketing Email reports an offset but no more field.
    let table = EndpointTable::new();
    let profile = table.profile(ObjectType::MarketingEmail).unwrap();

    let page = Page::parse(
        &json!({"objects": [], "offset": "100", "total": 250}).to_string(),
        profile,
    )
    .unwrap();
    assert_eq!(page.has_more, Some(true));

    let page = Page::parse(
        &json!({"objects": [], "offset": "250", "total": 250}).to_string(),
        profile,
    )
    .unwrap();
    assert_eq!(page.has_more, Some(false));

    let page = Page::parse(
        &json!({"objects": [], "offset": "0", "total": 250}).to_string(),
        profile,
    )
    .unwrap();
    assert_eq!(page.has_more, Some(false));

    // Numbers compare through their string forms.
    let page = Page::parse(
        &json!({"objects": [], "offset": 100, "total": 100}).to_string(),
        profile,
    )
    .unwrap();
    assert_eq!(page.has_more, Some(false));
}

#[test]
fn test_parse_no_total_means_terminal() {
    let table = EndpointTable::new();
    let profile = table.profile(ObjectType::MarketingEmail).unwrap();
    let body = json!({"objects": [], "offset": "0"});

    let page = Page::parse(&body.to_string(), profile).unwrap();

    assert_eq!(page.has_more, None);
    assert_eq!(page.offset, Some("0".to_string()));
}

#[test]
fn test_parse_absent_offset_is_terminal() {
    let table = EndpointTable::new();
    let profile = table.profile(ObjectType::ContactLists).unwrap();
    let body = json!({"lists": [{"testobj": 2}], "has-more": false});

    let page = Page::parse(&body.to_string(), profile).unwrap();

    assert_eq!(page.offset, None);
    assert_eq!(page.has_more, Some(false));
}

#[test]
fn test_parse_offset_must_be_scalar() {
    let table = EndpointTable::new();
    let profile = table.profile(ObjectType::ContactLists).unwrap();
    let body = json!({"lists": [], "has-more": false, "offset": {"vid": 1}});

    let err = Page::parse(&body.to_string(), profile).unwrap_err();
    assert!(err.to_string().contains("offset"));
}

#[test]
fn test_parse_rejects_invalid_json() {
    let table = EndpointTable::new();
    let profile = table.profile(ObjectType::ContactLists).unwrap();

    let err = Page::parse("not json", profile).unwrap_err();
    assert!(matches!(err, Error::JsonParse(_)));
}

// ============================================================================
// Request building
// ============================================================================

#[test]
fn test_request_query_for_analytics() {
    let table = EndpointTable::new();
    let profile = table.profile(ObjectType::Analytics).unwrap();
    let config = analytics_config();

    let query = request_query(profile, &config, Some("5"));

    assert_eq!(
        query,
        vec![
            ("start".to_string(), "20190101".to_string()),
            ("end".to_string(), "20191111".to_string()),
            ("f".to_string(), "client".to_string()),
            ("limit".to_string(), "100".to_string()),
            ("offset".to_string(), "5".to_string()),
        ]
    );
}

#[test]
fn test_request_query_skips_params_the_profile_lacks() {
    let table = EndpointTable::new();
    let profile = table.profile(ObjectType::DealPipelines).unwrap();
    let config = SourceConfig::new(ObjectType::DealPipelines);

    // No limit param, no offset param: the offset has nowhere to go.
    let query = request_query(profile, &config, Some("9"));
    assert!(query.is_empty());
}

#[test]
fn test_request_query_contacts_uses_vid_offset() {
    let table = EndpointTable::new();
    let profile = table.profile(ObjectType::Contacts).unwrap();
    let config = SourceConfig::new(ObjectType::Contacts);

    let query = request_query(profile, &config, Some("200"));

    assert_eq!(
        query,
        vec![
            ("count".to_string(), "100".to_string()),
            ("vidOffset".to_string(), "200".to_string()),
        ]
    );
}

#[test]
fn test_request_path_appends_analytics_report() {
    let table = EndpointTable::new();
    let profile = table.profile(ObjectType::Analytics).unwrap();
    let config = analytics_config();

    assert_eq!(
        request_path(profile, &config).unwrap(),
        "/analytics/v2/reports/totals/total"
    );
}

#[test]
fn test_request_path_passthrough_for_other_types() {
    let table = EndpointTable::new();
    let profile = table.profile(ObjectType::Deals).unwrap();
    let config = SourceConfig::new(ObjectType::Deals);

    assert_eq!(request_path(profile, &config).unwrap(), "/deals/v1/deal/paged");
}

#[test]
fn test_request_path_analytics_requires_report_settings() {
    let table = EndpointTable::new();
    let profile = table.profile(ObjectType::Analytics).unwrap();
    let config = SourceConfig::new(ObjectType::Analytics);

    assert!(request_path(profile, &config).is_err());
}

// ============================================================================
// Pages cursor
// ============================================================================

#[tokio::test]
async fn test_fetch_page_sends_profile_params() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/contacts/v1/lists"))
        .and(query_param("hapikey", "demo"))
        .and(query_param("count", "100"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "lists": [{"testobj": 0}],
            "has-more": false
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = test_client(&mock_server.uri());
    let table = EndpointTable::new();
    let profile = table.profile(ObjectType::ContactLists).unwrap();
    let config = SourceConfig::new(ObjectType::ContactLists);

    let page = fetch_page(&client, profile, &config, None).await.unwrap();
    assert_eq!(page.items.len(), 1);
}

#[tokio::test]
async fn test_cursor_walks_pages_in_order() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/contacts/v1/lists"))
        .and(query_param_is_missing("offset"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "lists": [{"testobj": 0}, {"testobj": 1}],
            "has-more": true,
            "offset": "2"
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/contacts/v1/lists"))
        .and(query_param("offset", "2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "lists": [{"testobj": 2}, {"testobj": 3}],
            "has-more": false
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = test_client(&mock_server.uri());
    let table = EndpointTable::new();
    let profile = table.profile(ObjectType::ContactLists).unwrap();
    let config = SourceConfig::new(ObjectType::ContactLists);

    let mut cursor = PagesCursor::open(&client, profile, &config).await.unwrap();
    let mut items = Vec::new();
    while cursor.has_next().await.unwrap() {
        items.push(cursor.next().unwrap());
    }

    assert_eq!(
        items,
        vec![
            json!({"testobj": 0}),
            json!({"testobj": 1}),
            json!({"testobj": 2}),
            json!({"testobj": 3}),
        ]
    );
}

#[tokio::test]
async fn test_cursor_rejects_empty_page_claiming_more() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/contacts/v1/lists"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "lists": [],
            "has-more": true,
            "offset": "2"
        })))
        .mount(&mock_server)
        .await;

    let client = test_client(&mock_server.uri());
    let table = EndpointTable::new();
    let profile = table.profile(ObjectType::ContactLists).unwrap();
    let config = SourceConfig::new(ObjectType::ContactLists);

    let err = PagesCursor::open(&client, profile, &config)
        .await
        .unwrap_err();
    assert!(matches!(err, Error::MalformedResponse { .. }));
    assert!(err.to_string().contains("no items"));
}

#[tokio::test]
async fn test_cursor_rejects_more_without_continuation_offset() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/contacts/v1/lists"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "lists": [{"testobj": 0}],
            "has-more": true
        })))
        .mount(&mock_server)
        .await;

    let client = test_client(&mock_server.uri());
    let table = EndpointTable::new();
    let profile = table.profile(ObjectType::ContactLists).unwrap();
    let config = SourceConfig::new(ObjectType::ContactLists);

    let mut cursor = PagesCursor::open(&client, profile, &config).await.unwrap();
    assert!(cursor.has_next().await.unwrap());
    cursor.next().unwrap();

    let err = cursor.has_next().await.unwrap_err();
    assert!(err.to_string().contains("no continuation offset"));
}

#[tokio::test]
async fn test_cursor_checkpoint_tracks_fetch_offset() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/contacts/v1/lists"))
        .and(query_param_is_missing("offset"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "lists": [{"testobj": 0}],
            "has-more": true,
            "offset": "2"
        })))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/contacts/v1/lists"))
        .and(query_param("offset", "2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "lists": [{"testobj": 2}],
            "has-more": false
        })))
        .mount(&mock_server)
        .await;

    let client = test_client(&mock_server.uri());
    let table = EndpointTable::new();
    let profile = table.profile(ObjectType::ContactLists).unwrap();
    let config = SourceConfig::new(ObjectType::ContactLists);

    let mut cursor = PagesCursor::open(&client, profile, &config).await.unwrap();
    assert_eq!(
        cursor.checkpoint(),
        PageCheckpoint {
            page_offset: None,
            index_in_page: 0
        }
    );

    // Drain page one, step into page two.
    assert!(cursor.has_next().await.unwrap());
    cursor.next().unwrap();
    assert!(cursor.has_next().await.unwrap());
    cursor.next().unwrap();

    assert_eq!(
        cursor.checkpoint(),
        PageCheckpoint {
            page_offset: Some("2".to_string()),
            index_in_page: 1
        }
    );
}

#[tokio::test]
async fn test_cursor_resume_emits_only_trailing_items() {
    let mock_server = MockServer::start().await;

    // The page at offset 2 grew by one item since the checkpoint was taken.
    Mock::given(method("GET"))
        .and(path("/contacts/v1/lists"))
        .and(query_param("offset", "2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "lists": [{"testobj": 2}, {"testobj": 4}],
            "has-more": false
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = test_client(&mock_server.uri());
    let table = EndpointTable::new();
    let profile = table.profile(ObjectType::ContactLists).unwrap();
    let config = SourceConfig::new(ObjectType::ContactLists);

    let checkpoint = PageCheckpoint {
        page_offset: Some("2".to_string()),
        index_in_page: 1,
    };
    let mut cursor = PagesCursor::resume(&client, profile, &config, &checkpoint)
        .await
        .unwrap();

    let mut items = Vec::new();
    while cursor.has_next().await.unwrap() {
        items.push(cursor.next().unwrap());
    }

    assert_eq!(items, vec![json!({"testobj": 4})]);
}

#[tokio::test]
async fn test_cursor_single_terminal_page() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/crm-pipelines/v1/pipelines/deals"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "results": [{"pipelineId": "default"}, {"pipelineId": "custom"}]
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = test_client(&mock_server.uri());
    let table = EndpointTable::new();
    let profile = table.profile(ObjectType::DealPipelines).unwrap();
    let config = SourceConfig::new(ObjectType::DealPipelines);

    let mut cursor = PagesCursor::open(&client, profile, &config).await.unwrap();
    let mut items = Vec::new();
    while cursor.has_next().await.unwrap() {
        items.push(cursor.next().unwrap());
    }

    assert_eq!(items.len(), 2);
    assert_eq!(cursor.continuation_offset(), None);
}
