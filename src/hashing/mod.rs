use blake3::Hasher;

/// BLAKE3 digest of a corpus document's content.
///
/// The corpus index keys cached sentence/embedding pairs by this digest, so any edit to
/// `content` (even a single trailing space) yields a new key and forces a rebuild.
#[inline]
pub fn hash_content(content: &str) -> [u8; 32] {
    *blake3::hash(content.as_bytes()).as_bytes()
}

/// Seed for a deterministic embedding of `text` under `model_id`.
///
/// Stable across Rust releases, unlike `std::hash::DefaultHasher`, so stub vectors stay
/// reproducible between toolchains.
#[inline]
pub fn hash_embedding_seed(model_id: &str, text: &str) -> u64 {
    let mut hasher = Hasher::new();
    hasher.update(model_id.as_bytes());
    hasher.update(b"|");
    hasher.update(text.as_bytes());

    let hash = hasher.finalize();
    let mut bytes = [0u8; 8];
    bytes.copy_from_slice(&hash.as_bytes()[0..8]);
    u64::from_le_bytes(bytes)
}

/// Lowercase hex rendering of a digest, for logs.
pub fn short_hex(hash: &[u8; 32]) -> String {
    hash[..6].iter().map(|b| format!("{:02x}", b)).collect()
}
