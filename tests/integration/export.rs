use konut_core::export::{read_csv, write_csv, COLUMNS};
use konut_core::{normalize_query, EncodingTable, KonutError, RawQuery};
use konut_scrapers::{ListingScraper, ScraperFactory, ScraperType, SearchTarget};
use tempfile::tempdir;
use tokio_util::sync::CancellationToken;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use konut_integration_tests::{detail_page, search_page, test_config};

async fn serve(server: &MockServer, page_path: &str, body: String) {
    Mock::given(method("GET"))
        .and(path(page_path))
        .respond_with(ResponseTemplate::new(200).set_body_string(body))
        .mount(server)
        .await;
}

fn listing(heating: &str, bathrooms: &str, furnished: &str) -> String {
    detail_page(&[
        ("Net Metrekare", "100 m²"),
        ("Bulunduğu Kat", "2. Kat"),
        ("Oda Sayısı", "3+1"),
        ("Isıtma Tipi", heating),
        ("Banyo Sayısı", bathrooms),
        ("Eşya Durumu", furnished),
        ("Site İçerisinde", "Hayır"),
        ("Balkon Durumu", "Var"),
    ])
}

#[tokio::test]
async fn test_scraped_dataset_exports_and_encodes_queries() {
    let server = MockServer::start().await;
    serve(
        &server,
        "/kiralik-konut/izmir-bornova",
        search_page(
            &[Some("/ilan/a"), Some("/ilan/b"), Some("/ilan/c")],
            &["12.000 TL", "15.500 TL", "9.750 TL"],
        ),
    )
    .await;
    serve(&server, "/ilan/a", listing("Klimalı", "1", "Eşyalı")).await;
    serve(&server, "/ilan/b", listing("Kombi (Doğalgaz)", "2", "Eşyasız")).await;
    serve(&server, "/ilan/c", listing("Kombi (Doğalgaz)", "Yok", "Eşyasız")).await;

    let scraper = ScraperFactory::create_scraper(ScraperType::Emlakjet, test_config(&server)).unwrap();
    let dataset = scraper
        .scrape(&SearchTarget::new("izmir", Some("bornova")), &CancellationToken::new())
        .await
        .unwrap();
    let rows = dataset.complete_rows();
    assert_eq!(rows.len(), 3);

    let dir = tempdir().unwrap();
    let csv_path = dir.path().join("dataset.csv");
    write_csv(&rows, &csv_path).unwrap();

    let content = std::fs::read_to_string(&csv_path).unwrap();
    assert_eq!(content.lines().next(), Some(COLUMNS.join(",").as_str()));
    assert_eq!(content.lines().nth(1), Some("2,4,100,0,1,1,0,1,12000"));

    let loaded = read_csv(&csv_path).unwrap();
    assert_eq!(loaded, rows);

    let table = EncodingTable::build(&loaded);
    assert_eq!(table.fitted_rows, 3);

    let query = RawQuery {
        net_area: "110".into(),
        floor: "4".into(),
        rooms: "2+1".into(),
        heating: "Klimalı".into(),
        bathrooms: "1".into(),
        furnished: "Eşyalı".into(),
        in_complex: "Hayır".into(),
        balcony: "Var".into(),
    };
    let encoded = table.encode(&normalize_query(&query).unwrap()).unwrap();
    assert_eq!(encoded.net_area, 110);
    assert_eq!(encoded.room_count_sum, 3);
    assert_eq!(encoded.heating_type_binary, 0);
    // bathroom classes seen in training are [0, 1, 2]; the query's presence flag 1 sits at position 1
    assert_eq!(encoded.bathroom_count, 1);
    assert_eq!(encoded.furnished_binary, 1);

    let balcony_free = RawQuery {
        balcony: "Yok".into(),
        ..query
    };
    let err = table.encode(&normalize_query(&balcony_free).unwrap()).unwrap_err();
    assert!(matches!(err, KonutError::UnknownCategory { .. }));
}
