//! Performance benchmarks for content tree operations
//!
//! Run with: `cargo bench -p carehub-core`
//!
//! These benchmarks measure the paths every admin edit and viewer search hits:
//! - Path-addressed item updates on a large document
//! - Reordering a long sibling list
//! - Search projection over a heavily populated tab
//! - Whole-document validation before a save

use carehub_core::services::ViewProjection;
use carehub_core::{
    ContentDocument, ContentItem, ItemUpdate, Section, Tab, TreeOperations, CAREGIVER_PAGE,
};
use criterion::{black_box, criterion_group, criterion_main, Criterion};

const P: &str = CAREGIVER_PAGE;

/// Generate a document with `tabs` × `sections` × `items` nodes
fn generate_document(tabs: usize, sections: usize, items: usize) -> ContentDocument {
    let mut doc = ContentDocument::default_document();

    for t in 0..tabs {
        let tab_id = format!("tab-{}", t);
        TreeOperations::add_tab(&mut doc, P, Tab::new(&tab_id, format!("Tab {}", t))).unwrap();

        for s in 0..sections {
            let section_id = format!("section-{}", s);
            TreeOperations::add_section(
                &mut doc,
                P,
                &tab_id,
                Section::new(&section_id, format!("Section {}", s)),
            )
            .unwrap();

            for i in 0..items {
                let content = format!(
                    "<p>Resource {} covers eligibility, enrollment and appeals for program {}.</p>",
                    i, s
                );
                TreeOperations::add_item(
                    &mut doc,
                    P,
                    &tab_id,
                    &section_id,
                    ContentItem::new(format!("item-{}", i), format!("Item {}", i), content),
                )
                .unwrap();
            }
        }
    }

    doc
}

/// Benchmark a single item update deep in the tree
fn bench_update_item(c: &mut Criterion) {
    let doc = generate_document(10, 20, 25);

    c.bench_function("update_item_5000_items", |b| {
        b.iter(|| {
            let mut draft = doc.clone();
            TreeOperations::update_item(
                &mut draft,
                P,
                "tab-9",
                "section-19",
                "item-24",
                ItemUpdate::new().with_content("<p>updated</p>"),
            )
            .unwrap();
            black_box(draft)
        })
    });
}

/// Benchmark reversing a 500-item section
fn bench_reorder_items(c: &mut Criterion) {
    let doc = generate_document(1, 1, 500);
    let reversed: Vec<String> = (0..500).rev().map(|i| format!("item-{}", i)).collect();

    c.bench_function("reorder_500_items", |b| {
        b.iter(|| {
            let mut draft = doc.clone();
            TreeOperations::reorder_items(&mut draft, P, "tab-0", "section-0", &reversed).unwrap();
            black_box(draft)
        })
    });
}

/// Benchmark search projection over one tab
fn bench_search_projection(c: &mut Criterion) {
    let doc = generate_document(1, 50, 40);

    let mut group = c.benchmark_group("search_projection");
    group.bench_function("empty_query", |b| {
        b.iter(|| black_box(ViewProjection::project(&doc, P, "tab-0", "")))
    });
    group.bench_function("matching_query", |b| {
        b.iter(|| black_box(ViewProjection::project(&doc, P, "tab-0", "ENROLLMENT")))
    });
    group.bench_function("missing_query", |b| {
        b.iter(|| black_box(ViewProjection::project(&doc, P, "tab-0", "zzz")))
    });
    group.finish();
}

/// Benchmark validation of a large document
fn bench_validate(c: &mut Criterion) {
    let doc = generate_document(10, 20, 25);

    c.bench_function("validate_5000_items", |b| {
        b.iter(|| black_box(doc.validate()).unwrap())
    });
}

criterion_group!(
    benches,
    bench_update_item,
    bench_reorder_items,
    bench_search_projection,
    bench_validate
);
criterion_main!(benches);
