//! Parse and convert throughput on generated build files.
//!
//! Run with: cargo bench -p buildbridge-bench

use buildbridge_syntax::{Direction, convert, parse_cmake, parse_gn};
use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};

/// A BUILD.gn with `count` libraries, each depending on the previous one.
fn generate_gn(count: usize) -> String {
    (0..count)
        .map(|i| {
            let deps = if i == 0 {
                String::new()
            } else {
                format!("  public_deps = [ \":lib_{}\" ]\n", i - 1)
            };
            format!(
                r#"static_library("lib_{i}") {{
  sources = [
    "lib_{i}/a.cc",
    "lib_{i}/b.cc",
  ]
{deps}  defines = [ "LIB_{i}=1" ]
  if (is_win) {{
    sources += [ "lib_{i}/win.cc" ]
  }}
}}

"#
            )
        })
        .collect()
}

fn bench_parse(c: &mut Criterion) {
    let mut group = c.benchmark_group("parse");
    for size in [10, 100, 1000] {
        let gn = generate_gn(size);
        let cmake = convert(&gn, Direction::GnToCmake);
        group.throughput(Throughput::Elements(size as u64));
        group.bench_with_input(BenchmarkId::new("gn", size), &gn, |b, text| {
            b.iter(|| parse_gn(black_box(text)));
        });
        group.bench_with_input(BenchmarkId::new("cmake", size), &cmake, |b, text| {
            b.iter(|| parse_cmake(black_box(text)));
        });
    }
    group.finish();
}

fn bench_convert(c: &mut Criterion) {
    let mut group = c.benchmark_group("convert");
    for size in [10, 100, 1000] {
        let gn = generate_gn(size);
        let cmake = convert(&gn, Direction::GnToCmake);
        group.throughput(Throughput::Elements(size as u64));
        group.bench_with_input(BenchmarkId::new("gn_to_cmake", size), &gn, |b, text| {
            b.iter(|| convert(black_box(text), Direction::GnToCmake));
        });
        group.bench_with_input(BenchmarkId::new("cmake_to_gn", size), &cmake, |b, text| {
            b.iter(|| convert(black_box(text), Direction::CmakeToGn));
        });
    }
    group.finish();
}

criterion_group!(benches, bench_parse, bench_convert);
criterion_main!(benches);
