use criterion::{black_box, criterion_group, criterion_main, Criterion};
use bvh_track_parser::{parse_bvh, to_animation};
use std::fmt::Write;

/// A chain of `depth` joints under the root, each with three rotation channels, and `frames` frames.
fn synthetic_bvh(depth: usize, frames: usize) -> String {
    let mut s = String::from("HIERARCHY\nROOT Hips\n{\nOFFSET 0 0 0\nCHANNELS 6 Xposition Yposition Zposition Zrotation Xrotation Yrotation\n");
    for i in 0..depth {
        writeln!(s, "JOINT Bone{}\n{{\nOFFSET 0 1.5 0\nCHANNELS 3 Zrotation Xrotation Yrotation", i).unwrap();
    }
    s.push_str("End Site\n{\nOFFSET 0 1 0\n}\n");
    for _ in 0..=depth {
        s.push_str("}\n");
    }

    let values = 6 + 3 * depth;
    writeln!(s, "MOTION\nFrames: {}\nFrame Time: 0.0083333", frames).unwrap();
    for frame in 0..frames {
        let line: Vec<String> = (0..values).map(|v| format!("{:.4}", (frame * values + v) as f64 * 0.01)).collect();
        writeln!(s, "{}", line.join(" ")).unwrap();
    }
    s
}

pub fn criterion_benchmark(c: &mut Criterion) {
    let source = synthetic_bvh(30, 600);

    let mut group = c.benchmark_group("bvh");
    group.sample_size(10);
    group.bench_function("parse", |b| b.iter(|| parse_bvh(black_box(&source)).unwrap()));
    let bvh = parse_bvh(&source).unwrap();
    group.bench_function("build clip", |b| b.iter(|| to_animation(black_box(&bvh))));
    group.finish();
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);
