use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};

use dos2unix_rs::dos2unix::convert_bytes;

/// Build `bytes` of text using the given line ending.
fn generate_text(bytes: usize, ending: &[u8]) -> Vec<u8> {
    let mut data = Vec::with_capacity(bytes + 64);
    while data.len() < bytes {
        data.extend_from_slice(b"the quick brown fox jumps over the lazy dog");
        data.extend_from_slice(ending);
    }
    data.truncate(bytes);
    data
}

/// Mixed input: LF lines with a CRLF line every 16 lines.
fn generate_mixed(bytes: usize) -> Vec<u8> {
    let mut data = Vec::with_capacity(bytes + 64);
    let mut line = 0usize;
    while data.len() < bytes {
        data.extend_from_slice(b"the quick brown fox jumps over the lazy dog");
        data.extend_from_slice(if line % 16 == 0 { b"\r\n" } else { b"\n" });
        line += 1;
    }
    data.truncate(bytes);
    data
}

fn bench_convert(c: &mut Criterion) {
    let mut group = c.benchmark_group("dos2unix");
    for size_mb in [1, 10] {
        let bytes = size_mb * 1024 * 1024;
        let inputs = [
            ("lf_only", generate_text(bytes, b"\n")),
            ("crlf", generate_text(bytes, b"\r\n")),
            ("mixed", generate_mixed(bytes)),
        ];
        for (name, data) in &inputs {
            let mut out = Vec::with_capacity(data.len());
            group.bench_with_input(
                BenchmarkId::new(*name, format!("{}MB", size_mb)),
                data,
                |b, data| {
                    b.iter(|| {
                        out.clear();
                        convert_bytes(black_box(data), &mut out).unwrap();
                        out.len()
                    })
                },
            );
        }
    }
    group.finish();
}

criterion_group!(benches, bench_convert);
criterion_main!(benches);
