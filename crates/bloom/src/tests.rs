use super::*;

// -------------------- Construction --------------------

#[test]
fn new_creates_valid_filter() {
    let bf = BloomFilter::new(100, 0.01);
    assert!(bf.num_bits() > 0);
    assert!(bf.num_hashes() > 0);
    assert!(!bf.bits.is_empty());
}

#[test]
#[should_panic(expected = "expected_items must be > 0")]
fn new_panics_on_zero_items() {
    BloomFilter::new(0, 0.01);
}

#[test]
#[should_panic(expected = "false_positive_rate must be in (0, 1)")]
fn new_panics_on_zero_fpr() {
    BloomFilter::new(100, 0.0);
}

#[test]
#[should_panic(expected = "false_positive_rate must be in (0, 1)")]
fn new_panics_on_one_fpr() {
    BloomFilter::new(100, 1.0);
}

// -------------------- Insert / Contains --------------------

#[test]
fn inserted_key_is_found() {
    let mut bf = BloomFilter::new(100, 0.01);
    bf.insert(b"hello");
    assert!(bf.may_contain(b"hello"));
}

#[test]
fn missing_key_is_not_found() {
    let bf = BloomFilter::new(100, 0.01);
    assert!(!bf.may_contain(b"hello"));
}

#[test]
fn many_keys_all_found() {
    let mut bf = BloomFilter::new(1000, 0.01);
    for i in 0..1000u64 {
        bf.insert(&i.to_le_bytes());
    }
    for i in 0..1000u64 {
        assert!(
            bf.may_contain(&i.to_le_bytes()),
            "key {} should be found",
            i
        );
    }
}

#[test]
fn false_positive_rate_is_reasonable() {
    let n = 10_000;
    let fpr = 0.01;
    let mut bf = BloomFilter::new(n, fpr);

    for i in 0..n as u64 {
        bf.insert(&i.to_le_bytes());
    }

    let mut false_positives = 0;
    let test_count = 10_000;
    for i in (n as u64)..(n as u64 + test_count) {
        if bf.may_contain(&i.to_le_bytes()) {
            false_positives += 1;
        }
    }

    let actual_fpr = false_positives as f64 / test_count as f64;
    assert!(
        actual_fpr < fpr * 3.0,
        "FPR too high: {:.4} (target {:.4})",
        actual_fpr,
        fpr
    );
}

#[test]
fn empty_key() {
    let mut bf = BloomFilter::new(10, 0.01);
    bf.insert(b"");
    assert!(bf.may_contain(b""));
}

#[test]
fn binary_key() {
    let mut bf = BloomFilter::new(10, 0.01);
    let key = vec![0u8, 1, 2, 255, 254, 253];
    bf.insert(&key);
    assert!(bf.may_contain(&key));
}

// -------------------- Debug --------------------

#[test]
fn debug_impl_works() {
    let bf = BloomFilter::new(100, 0.01);
    let debug = format!("{:?}", bf);
    assert!(debug.contains("BloomFilter"));
    assert!(debug.contains("num_bits"));
    assert!(debug.contains("num_hashes"));
}

// -------------------- fnv1a_32 --------------------

#[test]
fn fnv32_is_deterministic_and_sensitive() {
    assert_eq!(fnv1a_32(b"hello"), fnv1a_32(b"hello"));
    assert_ne!(fnv1a_32(b"hello"), fnv1a_32(b"world"));
}

// -------------------- Edge cases --------------------

#[test]
fn single_item_filter() {
    let mut bf = BloomFilter::new(1, 0.01);
    bf.insert(b"only");
    assert!(bf.may_contain(b"only"));
}

#[test]
fn very_low_fpr() {
    let bf = BloomFilter::new(100, 0.0001);
    assert!(bf.num_bits() > 1000);
    assert!(bf.num_hashes() > 5);
}

#[test]
fn high_fpr_still_works() {
    let mut bf = BloomFilter::new(100, 0.5);
    bf.insert(b"test");
    assert!(bf.may_contain(b"test"));
}
