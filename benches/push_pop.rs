//
// Copyright (c) 2025 Nathan Fiedler
//
use criterion::{Criterion, black_box, criterion_group, criterion_main};
use succarray::SuccinctArray;

const COUNT: usize = 100_000;

fn bench_push(c: &mut Criterion) {
    let mut group = c.benchmark_group("push");

    group.bench_function("succarray", |b| {
        b.iter(|| {
            let mut array: SuccinctArray<usize> = SuccinctArray::new();
            for value in 0..COUNT {
                array.push(black_box(value));
            }
            array
        })
    });

    group.bench_function("vec", |b| {
        b.iter(|| {
            let mut array: Vec<usize> = Vec::new();
            for value in 0..COUNT {
                array.push(black_box(value));
            }
            array
        })
    });
}

fn bench_get(c: &mut Criterion) {
    let mut group = c.benchmark_group("get");
    let mut array: SuccinctArray<usize> = SuccinctArray::new();
    let mut vector: Vec<usize> = Vec::new();
    for value in 0..COUNT {
        array.push(value);
        vector.push(value);
    }

    group.bench_function("succarray", |b| {
        b.iter(|| {
            for index in 0..COUNT {
                black_box(array[index]);
            }
        })
    });

    group.bench_function("vec", |b| {
        b.iter(|| {
            for index in 0..COUNT {
                black_box(vector[index]);
            }
        })
    });
}

fn bench_boundary_oscillation(c: &mut Criterion) {
    let mut group = c.benchmark_group("push_pop_boundary");
    let mut array: SuccinctArray<usize> = SuccinctArray::new();
    // the last of 65 buffers of 256 is one short of full, so every push
    // moves on to the extra buffer and every pop gives it back
    for value in 0..16_639 {
        array.push(value);
    }

    group.bench_function("succarray", |b| {
        b.iter(|| {
            for value in 0..1000 {
                array.push(black_box(value));
                black_box(array.pop());
            }
        })
    });
}

criterion_group!(benches, bench_push, bench_get, bench_boundary_oscillation);
criterion_main!(benches);
