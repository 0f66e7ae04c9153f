//! Hash helpers – abstracción para permitir cambiar de algoritmo sin tocar resto del core.

use blake3::Hasher;

/// Hashea un string y devuelve hex.
pub fn hash_str(input: &str) -> String {
    let mut h = Hasher::new();
    h.update(input.as_bytes());
    h.finalize().to_hex().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_text_same_hash() {
        assert_eq!(hash_str("jobs: []\n"), hash_str("jobs: []\n"));
        assert_ne!(hash_str("jobs: []\n"), hash_str("jobs: []"));
        assert_eq!(hash_str("").len(), 64);
    }
}
