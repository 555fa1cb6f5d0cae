//
// Copyright (c) 2025 Nathan Fiedler
//
use std::time::Instant;
use succarray::SuccinctArray;

//
// Compares the time to grow (and then shrink) a succinct array against a
// vector, along with the space each ends up reserving. The succinct array is
// expected to be slower but to waste far less memory.
//

fn create_succarray(size: u64) {
    let start = Instant::now();
    let mut coll: SuccinctArray<u64> = SuccinctArray::new();
    for value in 0..size {
        coll.push(value);
    }
    let duration = start.elapsed();
    println!(
        "succarray: {:?} (len: {}, capacity: {})",
        duration,
        coll.len(),
        coll.capacity()
    );
    let start = Instant::now();
    while coll.pop().is_some() {}
    println!("succarray pop all: {:?}", start.elapsed());
}

fn create_vector(size: u64) {
    let start = Instant::now();
    let mut coll: Vec<u64> = Vec::new();
    for value in 0..size {
        coll.push(value);
    }
    let duration = start.elapsed();
    println!(
        "vector: {:?} (len: {}, capacity: {})",
        duration,
        coll.len(),
        coll.capacity()
    );
    let start = Instant::now();
    while coll.pop().is_some() {}
    println!("vector pop all: {:?}", start.elapsed());
}

fn main() {
    println!("creating SuccinctArray...");
    create_succarray(100_000_000);
    println!("creating Vec...");
    create_vector(100_000_000);
}
