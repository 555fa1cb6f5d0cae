//
// Copyright (c) 2025 Nathan Fiedler
//
use proptest::prelude::*;
use succarray::SuccinctArray;

#[derive(Clone, Debug)]
enum Op {
    Push(u32),
    Pop,
    Set(usize, u32),
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        3 => any::<u32>().prop_map(Op::Push),
        2 => Just(Op::Pop),
        1 => (any::<usize>(), any::<u32>()).prop_map(|(i, v)| Op::Set(i, v)),
    ]
}

/// Apply `op` to both the array and the reference vector.
fn apply(sut: &mut SuccinctArray<u32>, model: &mut Vec<u32>, op: &Op) {
    match op {
        Op::Push(value) => {
            sut.push(*value);
            model.push(*value);
        }
        Op::Pop => {
            assert_eq!(sut.pop(), model.pop());
        }
        Op::Set(index, value) => {
            if !model.is_empty() {
                let index = index % model.len();
                sut[index] = *value;
                model[index] = *value;
            }
        }
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn test_matches_vec_model(ops in prop::collection::vec(op_strategy(), 0..2000)) {
        let mut sut: SuccinctArray<u32> = SuccinctArray::new();
        let mut model: Vec<u32> = Vec::new();
        for op in &ops {
            apply(&mut sut, &mut model, op);
            prop_assert!(sut.validate().is_ok(), "{}", sut);
            prop_assert_eq!(sut.len(), model.len());
        }
        for (index, expected) in model.iter().enumerate() {
            prop_assert_eq!(sut.get(index), Some(expected));
        }
        prop_assert_eq!(sut.get(model.len()), None);
    }

    #[test]
    fn test_push_then_pop_round_trip(values in prop::collection::vec(any::<u64>(), 0..5000)) {
        let mut sut: SuccinctArray<u64> = SuccinctArray::new();
        for value in &values {
            sut.push(*value);
        }
        for expected in values.iter().rev() {
            prop_assert_eq!(sut.pop(), Some(*expected));
        }
        prop_assert!(sut.is_empty());
        prop_assert_eq!(sut.pop(), None);

        // refilling identically reproduces the same contents
        for value in &values {
            sut.push(*value);
        }
        for (index, expected) in values.iter().enumerate() {
            prop_assert_eq!(sut[index], *expected);
        }
    }

    #[test]
    fn test_space_overhead_is_sqrt(pushes in 0usize..50_000, pops in 0usize..50_000) {
        let mut sut: SuccinctArray<u8> = SuccinctArray::new();
        for value in 0..pushes {
            sut.push(value as u8);
        }
        for _ in 0..pops.min(pushes) {
            sut.pop();
        }
        let len = sut.len();
        let unused = (sut.capacity() - len) as f64;
        prop_assert!(unused <= 6.0 * (len as f64).sqrt() + 32.0, "{}", sut);
    }

    #[test]
    fn test_clone_is_independent(
        values in prop::collection::vec(any::<i64>(), 1..3000),
        extra in prop::collection::vec(any::<i64>(), 0..500),
        pops in 0usize..3000,
    ) {
        let mut original: SuccinctArray<i64> = SuccinctArray::new();
        for value in &values {
            original.push(*value);
        }
        let mut copy = original.clone();
        prop_assert!(copy.validate().is_ok());
        prop_assert_eq!(copy.capacity(), original.capacity());

        for _ in 0..pops.min(values.len()) {
            original.pop();
        }
        for value in &extra {
            original.push(*value);
        }
        for (index, expected) in values.iter().enumerate() {
            prop_assert_eq!(copy[index], *expected);
        }

        copy[0] = copy[0].wrapping_add(1);
        if !original.is_empty() && pops == 0 {
            prop_assert_eq!(original[0], values[0]);
        }
    }
}
