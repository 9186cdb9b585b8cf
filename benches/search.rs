use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use reg_appsearch::{find_applications, fuzzy_match, MemoryStore, SearchConfig, UNINSTALL_SUBTREE};

fn populated_store(apps: usize) -> MemoryStore {
    (0..apps).fold(MemoryStore::new(), |store, i| {
        store.with_key(
            &format!(r"{}\{{{:08X}-APP}}", UNINSTALL_SUBTREE, i),
            [
                ("DisplayName", format!("Application {} Suite", i)),
                ("DisplayVersion", format!("{}.0.{}", i % 10, i)),
                ("Publisher", "Example Corp".to_string()),
            ],
        )
    })
}

fn bench_fuzzy_match(c: &mut Criterion) {
    c.bench_function("fuzzy_match", |b| {
        b.iter(|| fuzzy_match(black_box("  notepad "), black_box("Notepad++ (64-bit x64)")))
    });
}

fn bench_find_applications(c: &mut Criterion) {
    let mut group = c.benchmark_group("find_applications");
    let config = SearchConfig::default();
    for apps in [10, 100, 1000] {
        let store = populated_store(apps);
        group.bench_with_input(BenchmarkId::from_parameter(apps), &store, |b, store| {
            b.iter(|| find_applications(store, black_box("suite 5"), &config).unwrap())
        });
    }
    group.finish();
}

criterion_group!(benches, bench_fuzzy_match, bench_find_applications);
criterion_main!(benches);
