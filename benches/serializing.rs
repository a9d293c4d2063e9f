use bytesize::ByteSize;
use chisel_dom::{Document, JsonValue};
use criterion::{criterion_group, criterion_main, Criterion};
use pprof::criterion::{Output, PProfProfiler};

fn wide_document(entries: usize) -> Document {
    let mut doc = Document::new();
    let mut root = doc.value_mut();
    root.init_array();
    for index in 0..entries {
        let entry = JsonValue::Object(vec![
            ("id".to_string(), JsonValue::Integer(index as i32)),
            ("score".to_string(), JsonValue::Float(index as f64 / 3.0)),
            ("label".to_string(), format!("label \t{}", index).into()),
            ("flags".to_string(), JsonValue::Array(vec![true.into(), JsonValue::Null])),
        ]);
        root.append(entry).unwrap();
    }
    doc
}

fn benchmark_serialize(c: &mut Criterion) {
    let doc = wide_document(10000);
    let size = ByteSize(doc.to_json_string().len() as u64);
    c.bench_function(&format!("serialize of wide document ({})", size), |b| {
        b.iter(|| doc.to_json_string())
    });
}

fn benchmark_round_trip(c: &mut Criterion) {
    let text = wide_document(1000).to_json_string();
    c.bench_function(
        &format!("parse and serialize ({})", ByteSize(text.len() as u64)),
        |b| {
            b.iter(|| {
                let mut doc = Document::new();
                doc.parse(&text);
                doc.to_json_string()
            })
        },
    );
}

fn benchmark_to_value(c: &mut Criterion) {
    let doc = wide_document(10000);
    c.bench_function("conversion into freestanding values", |b| {
        b.iter(|| doc.value().to_value())
    });
}

criterion_group! {
    name = serializing_benches;
    config = Criterion::default().with_profiler(PProfProfiler::new(100, Output::Flamegraph(None)));
    targets = benchmark_serialize, benchmark_round_trip, benchmark_to_value
}
criterion_main!(serializing_benches);
