use heapless::String as HeaplessString;
use serde::Serialize;
use std::hash::Hasher;
use twox_hash::XxHash64;

/// Hashes serializable data into an i64 using CBOR serialization and XxHash64.
///
/// CBOR gives a deterministic binary form and the fixed seed (0) keeps the
/// hash stable across runs and hosts, so it can be stored and compared in
/// optimistic-concurrency guards.
pub fn hash_as_i64<T: Serialize>(data: &T) -> Result<i64, String> {
    let mut hasher = XxHash64::with_seed(0);
    let mut cbor = Vec::new();
    ciborium::ser::into_writer(data, &mut cbor)
        .map_err(|e| format!("Failed to serialize data for hashing: {e}"))?;
    hasher.write(&cbor);
    Ok(hasher.finish() as i64)
}

/// Copies text into a bounded string, failing instead of truncating.
pub fn bounded<const N: usize>(field: &str, value: &str) -> Result<HeaplessString<N>, String> {
    HeaplessString::try_from(value)
        .map_err(|_| format!("Value for '{field}' is too long (max {N} bytes)"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_is_stable_and_content_sensitive() {
        let a = hash_as_i64(&("activity", 1_i64)).unwrap();
        let b = hash_as_i64(&("activity", 1_i64)).unwrap();
        let c = hash_as_i64(&("activity", 2_i64)).unwrap();
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn test_bounded_rejects_overflow() {
        assert!(bounded::<4>("code", "abcd").is_ok());
        assert!(bounded::<4>("code", "abcde").is_err());
    }
}
