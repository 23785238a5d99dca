use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use konut_core::{aggregate, normalize, ListingRecord, RawFieldPair, RawPriceText};
use konut_scrapers::emlakjet::{extract_links_and_prices, extract_raw_pairs, ListingSelectors};
use konut_scrapers::MarkupConfig;

const ATTRIBUTES: [(&str, &str); 12] = [
    ("İlan Numarası", "15432876"),
    ("Net Metrekare", "120 m²"),
    ("Brüt Metrekare", "135 m²"),
    ("Bulunduğu Kat", "3. Kat"),
    ("Oda Sayısı", "3+1"),
    ("Isıtma Tipi", "Kombi (Doğalgaz)"),
    ("Banyo Sayısı", "2"),
    ("Eşya Durumu", "Eşyalı"),
    ("Site İçerisinde", "Evet"),
    ("Balkon Durumu", "Var"),
    ("Bina Yaşı", "5-10"),
    ("Kullanım Durumu", "Boş"),
];

fn detail_html() -> String {
    let cells: String = ATTRIBUTES
        .iter()
        .map(|(label, value)| format!(r#"<div class="_1bVOdb">{}</div><div class="_1bVOdb">{}</div>"#, label, value))
        .collect();
    format!("<html><body>{}</body></html>", cells)
}

fn search_html(listings: usize) -> String {
    let items: String = (0..listings)
        .map(|i| {
            format!(
                r#"<div><a class="_3qUI9q" href="/ilan/{}">İlan {}</a><p class="_2C5UCT"><span>{}.500 TL</span></p></div>"#,
                i, i, 10 + i
            )
        })
        .collect();
    format!("<html><body>{}</body></html>", items)
}

fn bench_extraction(c: &mut Criterion) {
    let selectors = ListingSelectors::new(&MarkupConfig::default()).unwrap();
    let mut group = c.benchmark_group("extraction");

    for size in [10, 30, 100].iter() {
        let html = search_html(*size);
        group.bench_with_input(BenchmarkId::new("search_page", size), &html, |b, html| {
            b.iter(|| black_box(extract_links_and_prices(html, &selectors)));
        });
    }

    let detail = detail_html();
    group.bench_function("detail_page", |b| {
        b.iter(|| black_box(extract_raw_pairs(&detail, &selectors)));
    });

    group.finish();
}

fn bench_normalization(c: &mut Criterion) {
    let pairs: Vec<RawFieldPair> = ATTRIBUTES
        .iter()
        .map(|(label, value)| RawFieldPair {
            label: label.to_string(),
            value: value.to_string(),
        })
        .collect();

    c.bench_function("normalize_detail_page", |b| {
        b.iter(|| black_box(normalize(&pairs)));
    });

    let record = normalize(&pairs);
    let mut group = c.benchmark_group("aggregate");
    for size in [10, 100, 1000].iter() {
        let records: Vec<ListingRecord> = (0..*size)
            .map(|i| ListingRecord::new(i, Some(format!("/ilan/{}", i)), record.clone()))
            .collect();
        let prices: Vec<RawPriceText> = (0..*size)
            .map(|i| RawPriceText {
                index: i,
                text: Some(format!("{}.000 TL", i + 1)),
            })
            .collect();

        group.bench_with_input(BenchmarkId::from_parameter(size), size, |b, _| {
            b.iter(|| black_box(aggregate(records.clone(), &prices)));
        });
    }
    group.finish();
}

criterion_group!(benches, bench_extraction, bench_normalization);
criterion_main!(benches);
