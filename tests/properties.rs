//! Property-based tests for encoding round-trips.

use std::collections::HashMap;

use proptest::prelude::*;

use typewire::sorted::{Sorted, TimeCounters, TimeSeries};
use typewire::{decode, encode};

typewire::schema! {
    #[derive(Debug, Default, Clone, PartialEq)]
    pub struct Record {
        pub id: u64,
        pub name: String,
        pub score: i32,
        pub bytes: Vec<u8>,
        pub flags: Vec<bool>,
        pub children: Vec<Record>,
        pub note: Option<String>,
    }
}

fn arb_record() -> impl Strategy<Value = Record> {
    let leaf = (
        any::<u64>(),
        ".*",
        any::<i32>(),
        prop::collection::vec(any::<u8>(), 0..64),
        prop::collection::vec(any::<bool>(), 0..32),
        prop::option::of(".*"),
    )
        .prop_map(|(id, name, score, bytes, flags, note)| Record {
            id,
            name,
            score,
            bytes,
            flags,
            children: Vec::new(),
            note,
        });

    leaf.prop_recursive(3, 24, 4, |inner| {
        (
            inner.clone(),
            prop::collection::vec(inner, 0..4),
        )
            .prop_map(|(mut record, children)| {
                record.children = children;
                record
            })
    })
}

proptest! {
    #[test]
    fn roundtrip_record(v in arb_record()) {
        let bytes = encode(&v).unwrap();
        let mut out = Record::default();
        decode(&bytes, &mut out).unwrap();
        prop_assert_eq!(v, out);
    }

    #[test]
    fn roundtrip_unsigned(v in any::<u64>()) {
        let bytes = encode(&v).unwrap();
        let mut out = 0u64;
        decode(&bytes, &mut out).unwrap();
        prop_assert_eq!(v, out);
    }

    #[test]
    fn roundtrip_signed(v in any::<i64>()) {
        let bytes = encode(&v).unwrap();
        let mut out = 0i64;
        decode(&bytes, &mut out).unwrap();
        prop_assert_eq!(v, out);
    }

    #[test]
    fn roundtrip_string(v in ".*") {
        let bytes = encode(&v).unwrap();
        let mut out = String::new();
        decode(&bytes, &mut out).unwrap();
        prop_assert_eq!(v, out);
    }

    #[test]
    fn roundtrip_float_sequence(v in prop::collection::vec(
        any::<f64>().prop_filter("not NaN", |f| !f.is_nan()),
        0..32,
    )) {
        let bytes = encode(&v).unwrap();
        let mut out: Vec<f64> = Vec::new();
        decode(&bytes, &mut out).unwrap();
        prop_assert_eq!(v, out);
    }

    #[test]
    fn roundtrip_map(v in prop::collection::hash_map(".*", any::<u64>(), 0..16)) {
        let bytes = encode(&v).unwrap();
        let mut out: HashMap<String, u64> = HashMap::new();
        decode(&bytes, &mut out).unwrap();
        prop_assert_eq!(v, out);
    }

    #[test]
    fn roundtrip_sorted_is_sorted(v in prop::collection::vec(any::<i64>(), 0..64)) {
        let mut expect = v.clone();
        expect.sort_unstable();

        let bytes = encode(&Sorted(v)).unwrap();
        let mut out: Sorted<i64> = Sorted::new();
        decode(&bytes, &mut out).unwrap();
        prop_assert_eq!(expect, out.into_inner());
    }

    #[test]
    fn roundtrip_time_counters(pairs in prop::collection::vec(any::<(u64, u64)>(), 0..64)) {
        let series: TimeCounters = pairs.iter().copied().collect();

        let bytes = encode(&series).unwrap();
        let mut out = TimeCounters::new();
        decode(&bytes, &mut out).unwrap();

        let mut expect: Vec<(u64, u64)> = pairs;
        expect.sort_by_key(|&(time, _)| time);
        let got: Vec<(u64, u64)> = out.iter().collect();
        prop_assert_eq!(expect, got);
    }

    #[test]
    fn time_series_preserves_f32_precision(pairs in prop::collection::vec(
        (any::<u32>(), any::<f32>().prop_filter("not NaN", |f| !f.is_nan())),
        0..64,
    )) {
        let series: TimeSeries = pairs
            .iter()
            .map(|&(time, value)| (time as u64, value as f64))
            .collect();

        let bytes = encode(&series).unwrap();
        let mut out = TimeSeries::new();
        decode(&bytes, &mut out).unwrap();

        let mut expect: Vec<(u64, f64)> = pairs
            .iter()
            .map(|&(time, value)| (time as u64, value as f64))
            .collect();
        expect.sort_by_key(|&(time, _)| time);
        let got: Vec<(u64, f64)> = out.iter().collect();
        prop_assert_eq!(expect, got);
    }

    #[test]
    fn decoding_arbitrary_bytes_never_panics(input in prop::collection::vec(any::<u8>(), 0..256)) {
        let mut out = Record::default();
        let _ = decode(&input, &mut out);
    }
}
