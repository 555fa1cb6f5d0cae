//
// Copyright (c) 2025 Nathan Fiedler
//
use succarray::SuccinctArray;

//
// Basically useless except that it can be tested with a memory analyzer to
// determine if the succinct array is leaking memory. By storing `String`
// instead of numbers, this is more interesting in terms of memory management
// since the array must drop all of the values that remain, and must not drop
// the values it moves while merging and splitting buffers.
//
fn main() {
    let mut array: SuccinctArray<String> = SuccinctArray::new();
    // add enough values to merge buffers several times over
    for _ in 0..15_020 {
        let value = ulid::Ulid::new().to_string();
        array.push(value);
    }

    // a deep copy must own its own strings
    let copy = array.clone();

    // shrink far enough to split the buffers again
    for _ in 0..14_000 {
        array.pop();
    }
    println!("1: {}", array[1]);
    println!("1000: {}", array[1000]);
    println!("15_000: {}", copy[15_000]);

    // now the Drop implementation will be invoked for both arrays and the
    // memory analyzer can catch even more issues
}
