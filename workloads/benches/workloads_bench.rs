use criterion::{Criterion, criterion_group, criterion_main};
use ndarray::Array2;
use skperf_core::Mapper;
use skperf_workloads::compress::{DEFAULT_PRESET, compress_xz};
use skperf_workloads::hash::sha3_512;
use skperf_workloads::ml::Candidate;
use skperf_workloads::ml::forest::{Criterion as Split, ForestParams};
use skperf_workloads::ml::lle::{LleParams, locally_linear_embedding};
use skperf_workloads::word_count::{split_words, word_count};
use skperf_workloads::xml::parse_document;
use std::hint::black_box;

fn synthetic_xml(records: usize) -> String {
    let mut doc = String::from("<datasets>");
    for idx in 0..records {
        doc.push_str(&format!(
            "<dataset subject=\"s{idx}\"><title>Record {idx}</title><value>{}</value></dataset>",
            idx * 7
        ));
    }
    doc.push_str("</datasets>");
    doc
}

fn synthetic_points(rows: usize) -> Array2<f64> {
    Array2::from_shape_fn((rows, 2), |(row, col)| {
        let t = row as f64 * 0.37;
        if col == 0 { t.sin() * 10.0 } else { (t * 1.3).cos() * 5.0 + row as f64 * 0.01 }
    })
}

fn byte_workloads(c: &mut Criterion) {
    let xml = synthetic_xml(2_000);

    c.bench_function("xml_parse_2k_records", |b| {
        b.iter(|| black_box(parse_document(xml.as_bytes()).unwrap()))
    });
    c.bench_function("xz_preset6_2k_records", |b| {
        b.iter(|| black_box(compress_xz(xml.as_bytes(), DEFAULT_PRESET).unwrap()))
    });
    c.bench_function("sha3_512_2k_records", |b| b.iter(|| black_box(sha3_512(xml.as_bytes()))));
}

fn word_count_bench(c: &mut Criterion) {
    let text = "the quick brown fox jumps over the lazy dog ".repeat(2_000);
    let vocabulary = "the quick brown fox jumps over lazy dog cat mouse horse ".repeat(50);
    let words = split_words(&vocabulary);
    let sequential = Mapper::Sequential;
    let pool = Mapper::with_workers(4).unwrap();

    c.bench_function("word_count_sequential", |b| {
        b.iter(|| black_box(word_count(&text, &words, 1, &sequential)))
    });
    c.bench_function("word_count_pool4", |b| {
        b.iter(|| black_box(word_count(&text, &words, 4, &pool)))
    });
}

fn ml_bench(c: &mut Criterion) {
    let points = synthetic_points(300);
    let labels: Vec<usize> = (0..300).map(|row| row % 3).collect();
    let forest = ForestParams {
        n_trees: 20,
        ..ForestParams::new(Split::Gini, 2)
    };

    c.bench_function("forest_20_trees_300_rows", |b| {
        b.iter(|| black_box(forest.fit(points.view(), &labels, 3).unwrap()))
    });
    c.bench_function("lle_300_rows", |b| {
        b.iter(|| {
            black_box(locally_linear_embedding(points.view(), &LleParams::default(), &Mapper::Sequential).unwrap())
        })
    });
}

criterion_group!(benches, byte_workloads, word_count_bench, ml_bench);
criterion_main!(benches);
