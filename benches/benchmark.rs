//! Performance benchmarks for rs-page-analyzer.
//!
//! Run with: `cargo bench`
//!
//! Benchmarks include:
//! - Tree search over a JSON-LD style catalogue
//! - DOM search with selector synthesis over a product listing
//! - Full page analysis across every source

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use rs_page_analyzer::search::{DomSearcher, TreeSearcher};
use rs_page_analyzer::tree::TreeNode;
use rs_page_analyzer::{analyze_page, Options, PageInput, SearchQuery};
use serde_json::json;

fn listing_html(items: usize) -> String {
    let rows: String = (0..items)
        .map(|i| {
            format!(
                r#"<li class="product col-md-4 {}"><h2 class="name">Product {i}</h2><span class="price">{i},99 USD</span></li>"#,
                if i % 2 == 0 { "even" } else { "odd" }
            )
        })
        .collect();
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta property="og:title" content="Product 7">
    <script type="application/ld+json">{{"@type": "Product", "name": "Product 7", "offers": {{"price": "7.99"}}}}</script>
</head>
<body>
    <nav><a href="/">Home</a></nav>
    <div id="listing"><ul>{rows}</ul></div>
    <footer><p>Copyright 2026</p></footer>
</body>
</html>"#
    )
}

fn catalogue(items: usize) -> TreeNode {
    let products: Vec<_> = (0..items)
        .map(|i| json!({"name": format!("Product {i}"), "offers": {"price": format!("{i}.99"), "currency": "USD"}}))
        .collect();
    TreeNode::from(json!({"@graph": products}))
}

fn bench_tree_search(c: &mut Criterion) {
    let options = Options::default();
    let searcher = TreeSearcher::new(&options);
    let mut group = c.benchmark_group("tree_search");

    for items in [10, 100, 1000] {
        let data = catalogue(items);
        group.throughput(Throughput::Elements(items as u64));
        group.bench_with_input(BenchmarkId::from_parameter(items), &data, |b, data| {
            b.iter(|| searcher.find(black_box(data), &["Product 7", "7.99"]));
        });
    }

    group.finish();
}

fn bench_dom_search(c: &mut Criterion) {
    let options = Options::default();
    let mut group = c.benchmark_group("dom_search");

    for items in [10, 100] {
        let html = listing_html(items);
        group.throughput(Throughput::Bytes(html.len() as u64));
        group.bench_with_input(BenchmarkId::from_parameter(items), &html, |b, html| {
            b.iter(|| {
                DomSearcher::from_html(black_box(html), &options).and_then(|searcher| searcher.find(&["7,99"]))
            });
        });
    }

    group.finish();
}

fn bench_analyze_page(c: &mut Criterion) {
    let options = Options::default();
    let page = PageInput {
        url: "https://shop.example.com/listing".into(),
        html: listing_html(50),
        search_for: SearchQuery::from_fields([("name", "Product 7"), ("price", "7.99")]),
        ..PageInput::default()
    };

    c.bench_function("analyze_page", |b| {
        b.iter(|| analyze_page(black_box(&page), black_box(&options)));
    });
}

criterion_group!(benches, bench_tree_search, bench_dom_search, bench_analyze_page);
criterion_main!(benches);
