use makler_client::{AdminApi, ClientSettings, FailureKind, ReqwestAdminApi};
use makler_core::{ExportScope, FilterSpec, PostalCode, SearchSpec};
use pretty_assertions::assert_eq;
use serde_json::json;
use wiremock::matchers::{body_json, method, path, query_param, query_param_is_missing};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn api_for(server: &MockServer) -> ReqwestAdminApi {
    ReqwestAdminApi::new(ClientSettings::default().with_base_url(server.uri())).expect("client")
}

#[tokio::test]
async fn lists_brokers_from_makler_map() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/makler"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "makler": {
                "Meyer": {
                    "name": "Meyer",
                    "links": ["https://www.kleinanzeigen.de/s-immobilien/10115"],
                    "created_at": "2026-01-02T10:00:00",
                    "updated_at": "2026-01-03T10:00:00"
                },
                "Schmidt": { "name": "Schmidt", "links": [] }
            }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let brokers = api_for(&server).list_brokers().await.expect("brokers");
    assert_eq!(brokers.keys().cloned().collect::<Vec<_>>(), vec!["Meyer", "Schmidt"]);
    assert_eq!(brokers["Meyer"].links.len(), 1);
    assert_eq!(brokers["Schmidt"].created_at, None);
}

#[tokio::test]
async fn broker_names_are_percent_encoded_in_paths() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/makler/Meyer%20%2F%20Partner/links"))
        .and(body_json(json!({ "link": "https://example.com/s-immobilien/10115" })))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "message": "Link hinzugefügt" })),
        )
        .expect(1)
        .mount(&server)
        .await;

    let message = api_for(&server)
        .add_link("Meyer / Partner", "https://example.com/s-immobilien/10115")
        .await
        .expect("add link");
    assert_eq!(message, "Link hinzugefügt");
}

#[tokio::test]
async fn add_broker_sends_name_as_query() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/makler"))
        .and(query_param("name", "Meyer Immobilien"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "message": "ok" })))
        .expect(1)
        .mount(&server)
        .await;

    api_for(&server)
        .add_broker("Meyer Immobilien")
        .await
        .expect("add broker");
}

#[tokio::test]
async fn remove_link_passes_link_as_query() {
    let server = MockServer::start().await;
    let link = "https://www.kleinanzeigen.de/s-immobilien/10115/anbieter:privat";
    Mock::given(method("DELETE"))
        .and(path("/makler/Meyer/links"))
        .and(query_param("link", link))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "message": "entfernt" })))
        .expect(1)
        .mount(&server)
        .await;

    let message = api_for(&server).remove_link("Meyer", link).await.unwrap();
    assert_eq!(message, "entfernt");
}

#[tokio::test]
async fn backend_detail_becomes_error_message() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path("/makler/Unbekannt"))
        .respond_with(
            ResponseTemplate::new(404)
                .set_body_json(json!({ "detail": "Makler 'Unbekannt' nicht gefunden" })),
        )
        .mount(&server)
        .await;

    let err = api_for(&server).remove_broker("Unbekannt").await.unwrap_err();
    assert_eq!(err.kind, FailureKind::HttpStatus(404));
    assert_eq!(err.message, "Makler 'Unbekannt' nicht gefunden");
}

#[tokio::test]
async fn error_without_detail_falls_back_to_status() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path("/blacklist"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .mount(&server)
        .await;

    let err = api_for(&server).clear_blacklist().await.unwrap_err();
    assert_eq!(err.kind, FailureKind::HttpStatus(500));
    assert!(err.message.contains("500"));
}

#[tokio::test]
async fn list_and_delete_share_filter_query() {
    let server = MockServer::start().await;
    let filter = FilterSpec::new()
        .with_brokers(["B", "A"])
        .with_year(2026)
        .with_month(7)
        .unwrap()
        .last_search_only(true);

    Mock::given(method("GET"))
        .and(path("/links/grouped"))
        .and(query_param("makler_names", "A,B"))
        .and(query_param("year", "2026"))
        .and(query_param("month", "7"))
        .and(query_param("last_search_only", "true"))
        .and(query_param_is_missing("day"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "grouped": {
                "A": [{ "url": "https://x/1", "makler_names": "A", "scraped_at": "2026-07-02T08:00:00" }]
            },
            "makler_names": ["A", "B"],
            "total_count": 10,
            "filtered_count": 1
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/links"))
        .and(query_param("makler_names", "A,B"))
        .and(query_param("year", "2026"))
        .and(query_param("month", "7"))
        .and(query_param_is_missing("last_search_only"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "message": "1 Links gelöscht",
            "deleted_count": 1
        })))
        .expect(1)
        .mount(&server)
        .await;

    let api = api_for(&server);
    let groups = api.list_links(&filter).await.expect("list");
    assert_eq!(groups.filtered_count, 1);
    assert_eq!(groups.grouped["A"][0].brokers, vec!["A".to_string()]);

    let deleted = api
        .delete_links(&filter.last_search_only(false))
        .await
        .expect("delete");
    assert_eq!(deleted.deleted_count, 1);
}

#[tokio::test]
async fn search_posts_selected_brokers() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/search/makler"))
        .and(body_json(json!({ "makler_names": ["Meyer", "Schmidt"] })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "new_links": ["https://x/1"],
            "total_links": 12,
            "message": "1 neue Anzeigen gefunden"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let summary = api_for(&server)
        .start_search(&["Meyer".to_string(), "Schmidt".to_string()])
        .await
        .expect("search");
    assert!(summary.success);
    assert_eq!(summary.total_links, 12);
    assert_eq!(summary.new_links, vec!["https://x/1".to_string()]);
}

#[tokio::test]
async fn export_prefers_server_filename() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/export/last"))
        .and(query_param("makler_names", "Meyer"))
        .and(query_param_is_missing("last_search_only"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header(
                    "content-disposition",
                    "attachment; filename=letzte_suche_Meyer.csv",
                )
                .set_body_raw("URL,Makler\nhttps://x/1,Meyer\n", "text/csv"),
        )
        .expect(1)
        .mount(&server)
        .await;

    let filter = FilterSpec::new().with_broker("Meyer").last_search_only(true);
    let export = api_for(&server)
        .export_links(ExportScope::LastSearch, &filter)
        .await
        .expect("export");
    assert_eq!(export.filename, "letzte_suche_Meyer.csv");
    assert_eq!(export.bytes, b"URL,Makler\nhttps://x/1,Meyer\n");
}

#[tokio::test]
async fn export_synthesizes_filename_without_header() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/export/filtered"))
        .and(query_param("year", "2026"))
        .and(query_param("month", "3"))
        .and(query_param("day", "9"))
        .respond_with(ResponseTemplate::new(200).set_body_raw("URL\n", "text/csv"))
        .mount(&server)
        .await;

    let filter = FilterSpec::new()
        .with_brokers(["A", "B"])
        .with_year(2026)
        .with_month(3)
        .unwrap()
        .with_day(9)
        .unwrap();
    let export = api_for(&server)
        .export_links(ExportScope::Dated, &filter)
        .await
        .expect("export");
    assert_eq!(export.filename, "links_2026_03_09_mehrere_makler.csv");
}

#[tokio::test]
async fn export_respects_byte_cap() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/export/all"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(vec![b'x'; 4096], "text/csv"))
        .mount(&server)
        .await;

    let settings = ClientSettings {
        max_export_bytes: 1024,
        ..ClientSettings::default().with_base_url(server.uri())
    };
    let api = ReqwestAdminApi::new(settings).unwrap();
    let err = api
        .export_links(ExportScope::All, &FilterSpec::new())
        .await
        .unwrap_err();
    assert!(matches!(err.kind, FailureKind::TooLarge { max_bytes: 1024, .. }));
}

#[tokio::test]
async fn located_urls_post_postal_codes_and_filters() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/generate-urls"))
        .and(body_json(json!({
            "plz_list": ["10115", "04109"],
            "filters": { "kategorie": "immobilien", "anbieter": "privat", "suchbegriff": "haus" },
            "reference_url": null
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "urls": [
                "https://www.kleinanzeigen.de/s-immobilien/10115/anbieter:privat/haus/k0c195l3331",
                "https://www.kleinanzeigen.de/s-immobilien/04109/anbieter:privat/haus/k0c195l4233"
            ],
            "count": 2,
            "results": {}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let template = SearchSpec::default()
        .with_provider_type("privat")
        .with_keyword("haus");
    let codes = vec![
        PostalCode::parse("10115").unwrap(),
        PostalCode::parse("04109").unwrap(),
    ];
    let urls = api_for(&server)
        .generate_located_urls(&codes, &template)
        .await
        .expect("urls");
    assert_eq!(urls.len(), 2);
    assert!(urls[0].ends_with("/k0c195l3331"));
}

#[tokio::test]
async fn malformed_json_is_a_decode_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/makler"))
        .respond_with(ResponseTemplate::new(200).set_body_raw("<html></html>", "text/html"))
        .mount(&server)
        .await;

    let err = api_for(&server).list_brokers().await.unwrap_err();
    assert_eq!(err.kind, FailureKind::Decode);
}

#[test]
fn rejects_unusable_base_url() {
    let err = ReqwestAdminApi::new(ClientSettings::default().with_base_url("not a url")).unwrap_err();
    assert_eq!(err.kind, FailureKind::InvalidUrl);

    let err =
        ReqwestAdminApi::new(ClientSettings::default().with_base_url("mailto:ops@example.com"))
            .unwrap_err();
    assert_eq!(err.kind, FailureKind::InvalidUrl);
}
