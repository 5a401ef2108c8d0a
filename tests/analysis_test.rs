use rs_page_analyzer::generate::SourceType;
use rs_page_analyzer::sources::xhr::ResponseMatches;
use rs_page_analyzer::sources::CapturedResponse;
use rs_page_analyzer::{analyze_page, analyze_page_bytes, AnalyzerInput, Error, Options, PageInput, SearchQuery, Source};
use serde_json::json;

const MOVIE_PAGE: &str = r#"<html><head>
    <meta name="description" content="Blade Runner 2049 official site">
    <meta property="og:title" content="Blade Runner 2049">
    <script type="application/ld+json">{"name": "Blade Runner 2049", "rating": "8.5"}</script>
</head><body>
    <h1>Blade Runner 2049</h1>
    <p>Rated 8.5 by critics</p>
</body></html>"#;

fn movie_page() -> PageInput {
    PageInput {
        url: "www.example.com/movies/blade-runner-2049".into(),
        html: MOVIE_PAGE.into(),
        search_for: SearchQuery::from_fields([("title", "blade runner 2049"), ("rating", "8.5")]),
        ..PageInput::default()
    }
}

#[test]
fn metadata_title_and_json_ld_rating_win() {
    let report = analyze_page(&movie_page(), &Options::default()).expect("expected Ok(_)");

    let title = report.ranked[0].winner().expect("title candidate");
    assert_eq!(title.source_type, SourceType::Metadata);
    assert!(!title.case_exact);
    let rating = report.ranked[1].winner().expect("rating candidate");
    assert_eq!(rating.source_type, SourceType::JsonLd);

    // the description also mentions the title, but with extra text
    let title_sources: Vec<SourceType> = report.ranked[0].candidates.iter().map(|c| c.source_type).collect();
    assert_eq!(title_sources.iter().filter(|s| **s == SourceType::Metadata).count(), 2);

    let crawler = &report.crawler;
    assert!(crawler.inject_jquery);
    assert_eq!(crawler.custom_id, "www-example.com");
    assert_eq!(crawler.start_urls[0].value, "http://www.example.com/movies/blade-runner-2049");
    assert!(crawler.page_function.contains(r#"meta[property="og:title"]"#));
    assert!(crawler.page_function.contains(".get(0);"));
    assert!(!crawler.page_function.contains("extractMicrodata"));
    assert!(report.analysis_started <= report.analysis_ended);
}

#[test]
fn report_serializes_per_source_sections() {
    let report = analyze_page(&movie_page(), &Options::default()).expect("expected Ok(_)");
    let json = serde_json::to_value(&report).expect("serializable");

    assert_eq!(json["metaData"]["og:title"], "Blade Runner 2049");
    assert_eq!(json["allJsonLDData"][0]["rating"], "8.5");
    assert_eq!(json["jsonLDData"], json!({"0": {"name": "Blade Runner 2049", "rating": "8.5"}}));
    assert_eq!(json["jsonLDDataFound"].as_array().map(Vec::len), Some(2));
    assert_eq!(json["htmlFound"][0]["selector"], "h1");
    assert_eq!(json["ranked"][1]["candidates"][0]["sourceType"], "jsonLD");
    assert_eq!(json["ranked"][1]["candidates"][0]["locator"], "[0].rating");
    assert!(json["analysisStarted"].is_string());
}

#[test]
fn microdata_window_and_xhr_sources() {
    let page = PageInput {
        url: "https://shop.example.com/anvil".into(),
        html: r#"<body><div itemscope itemtype="http://schema.org/Product">
            <span itemprop="name">Acme Anvil</span><span itemprop="price">199.99</span>
        </div></body>"#
            .into(),
        window_properties: json!({
            "navigator": {"userAgent": "Acme Anvil crawler"},
            "__STATE__": {"product": {"sku": "ANV-1", "featured": false}}
        })
        .as_object()
        .cloned(),
        native_window_properties: ["navigator"].into_iter().collect(),
        xhr_requests: vec![
            CapturedResponse {
                method: "GET".into(),
                url: "https://shop.example.com/api/stock".into(),
                status: 200,
                content_type: Some("application/json".into()),
                body: Some(json!({"stock": {"sku": "ANV-1", "count": 3}})),
            },
            CapturedResponse {
                method: "GET".into(),
                url: "https://shop.example.com/api/missing".into(),
                status: 404,
                content_type: Some("application/json".into()),
                body: Some(json!({"sku": "ANV-1"})),
            },
        ],
        search_for: SearchQuery::from_fields([("name", "Acme Anvil"), ("sku", "ANV-1")]),
        ..PageInput::default()
    };

    let report = analyze_page(&page, &Options::default()).expect("expected Ok(_)");

    assert_eq!(report.schema_org_data_found[0].path.to_string(), "[0].name");
    assert_eq!(report.window_properties_found.len(), 1);
    assert_eq!(report.window_properties_found[0].path.to_string(), ".__STATE__.product.sku");
    assert!(report.all_window_properties.get("navigator").is_none());

    assert_eq!(report.xhr_requests_found.len(), 1);
    assert_eq!(report.xhr_requests_found[0].request, "GET https://shop.example.com/api/stock");
    let ResponseMatches::Tree(found) = &report.xhr_requests_found[0].search_results else {
        panic!("expected tree matches");
    };
    assert_eq!(found[0].path.to_string(), ".stock.sku");

    assert_eq!(report.ranked[0].winner().map(|w| w.source_type), Some(SourceType::Microdata));
    assert_eq!(report.ranked[1].winner().map(|w| w.source_type), Some(SourceType::Window));
    assert!(report.crawler.page_function.contains("var schemaOrg = extractMicrodata($);"));
    assert!(report.crawler.page_function.contains("window.__STATE__.product.sku"));
    assert!(report.warnings.is_empty());
}

#[test]
fn disabled_sources_are_not_searched() {
    let page = PageInput {
        tests: Some(vec![Source::Html]),
        ..movie_page()
    };
    let report = analyze_page(&page, &Options::default()).expect("expected Ok(_)");
    assert!(report.meta_data_found.is_empty());
    assert!(report.json_ld_data_found.is_empty());
    assert!(!report.html_found.is_empty());
    assert_eq!(report.ranked[0].winner().map(|w| w.source_type), Some(SourceType::Html));
    // window was not requested, so its absence is not a warning
    assert!(report.warnings.is_empty());
}

#[test]
fn decodes_page_bytes() {
    let page = PageInput {
        url: "https://cafe.example.fr".into(),
        search_for: SearchQuery::from_terms(["Café Noir"]),
        tests: Some(vec![Source::Html]),
        ..PageInput::default()
    };
    let html = b"<html><head><meta charset=\"windows-1252\"></head><body><h1>Caf\xE9 Noir</h1></body></html>";
    let report = analyze_page_bytes(page, html, None, &Options::default()).expect("expected Ok(_)");
    assert_eq!(report.html_found[0].text, "Café Noir");
}

#[test]
fn analyzer_input_runs_every_page() {
    let input = AnalyzerInput::from_json(
        &json!({
            "pages": [
                {"url": "example.com/a", "html": MOVIE_PAGE, "searchFor": ["Blade Runner 2049"]},
                {"url": "http://", "searchFor": ["x"]}
            ],
            "tests": ["META", "JSON-LD"]
        })
        .to_string(),
    )
    .expect("expected Ok(_)");

    let outcomes = input.analyze(&Options::default());
    assert_eq!(outcomes.len(), 2);
    let first = outcomes[0].as_ref().expect("first page analyzed");
    assert!(first.html_found.is_empty());
    assert_eq!(first.meta_data_found.len(), 2);
    assert!(matches!(outcomes[1], Err(Error::InvalidUrl(_))));
}

#[test]
fn description_only_title_loses_to_json_ld_name() {
    let page = PageInput {
        url: "www.example.com/movies/blade-runner-2049".into(),
        html: r#"<html><head>
            <meta name="description" content="Blade Runner 2049 official site">
            <script type="application/ld+json">{"name": "Blade Runner 2049", "rating": "8.5"}</script>
        </head><body></body></html>"#
            .into(),
        search_for: SearchQuery::from_fields([("title", "blade runner 2049"), ("rating", "8.5")]),
        tests: Some(vec![Source::Meta, Source::JsonLd]),
        ..PageInput::default()
    };
    let report = analyze_page(&page, &Options::default()).expect("expected Ok(_)");

    // description: (1.0 - 12 extra * 0.01) * 0.9; JSON-LD name: 0.9 * 0.9
    let title = &report.ranked[0].candidates;
    assert_eq!(title.len(), 2);
    assert_eq!(title[0].source_type, SourceType::JsonLd);
    assert!((title[0].score - 0.81).abs() < 1e-9);
    assert_eq!(title[1].source_type, SourceType::Metadata);
    assert!((title[1].score - 0.792).abs() < 1e-9);

    assert_eq!(report.ranked[1].winner().map(|w| w.source_type), Some(SourceType::JsonLd));
    assert!(report.crawler.inject_jquery);
    assert!(!report.crawler.page_function.contains("extractMicrodata"));
}
