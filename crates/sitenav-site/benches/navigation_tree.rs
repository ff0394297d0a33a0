//! Benchmarks for navigation tree operations.

use criterion::{Criterion, criterion_group, criterion_main};
use sitenav_site::{
    NodeKind, SiblingOrder, SitemapItem, UrlRules, breadcrumb_links, context_links,
    rebuild_parent_links,
};

/// Create a navigation tree with specified depth and breadth.
fn create_tree(depth: usize, breadth: usize) -> SitemapItem {
    fn create_level(url: &str, current_depth: usize, max_depth: usize, breadth: usize) -> SitemapItem {
        let rules = UrlRules::default();
        let id = format!("sg{url}");
        let item = SitemapItem::new(id, &format!("Level {current_depth}"), NodeKind::StructureGroup)
            .with_url(url, &rules)
            .with_visible(true);
        if current_depth >= max_depth {
            return item;
        }

        let base = url.trim_end_matches('/');
        let mut items: Vec<SitemapItem> = (0..breadth)
            .map(|i| create_level(&format!("{base}/section-{i}"), current_depth + 1, max_depth, breadth))
            .collect();
        items.push(
            SitemapItem::new(format!("page{base}"), "Page", NodeKind::Page)
                .with_url(&format!("{base}/page.html"), &rules)
                .with_visible(true),
        );
        item.with_items(items)
    }

    create_level("/", 0, depth, breadth)
}

fn bench_rebuild(c: &mut Criterion) {
    let root = create_tree(4, 5);

    let mut group = c.benchmark_group("rebuild_parent_links");

    group.bench_function("original_title", |b| {
        b.iter(|| rebuild_parent_links(root.clone(), SiblingOrder::OriginalTitle));
    });

    group.finish();
}

fn bench_lookup(c: &mut Criterion) {
    let tree = rebuild_parent_links(create_tree(4, 5), SiblingOrder::OriginalTitle);

    let mut group = c.benchmark_group("tree_lookup");

    group.bench_function("find_by_id_hit", |b| {
        b.iter(|| tree.find_by_id("sg/section-4/section-4/section-4"));
    });

    group.bench_function("find_by_id_miss", |b| {
        b.iter(|| tree.find_by_id("t1-k999"));
    });

    group.bench_function("ancestors_depth_4", |b| {
        let leaf = tree
            .find_by_id("sg/section-3/section-3/section-3/section-3")
            .unwrap_or_default();
        b.iter(|| tree.ancestors(leaf));
    });

    group.finish();
}

fn bench_links(c: &mut Criterion) {
    let tree = rebuild_parent_links(create_tree(4, 5), SiblingOrder::OriginalTitle);
    let rules = UrlRules::default();

    let mut group = c.benchmark_group("links");

    group.bench_function("breadcrumb_depth_4", |b| {
        b.iter(|| breadcrumb_links(&tree, "/section-4/section-4/section-4/section-4/page.html", &rules));
    });

    group.bench_function("context_depth_2", |b| {
        b.iter(|| context_links(&tree, "/section-2/section-2/page.html", &rules));
    });

    group.finish();
}

criterion_group!(benches, bench_rebuild, bench_lookup, bench_links);
criterion_main!(benches);
