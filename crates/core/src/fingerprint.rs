//! Ownership fingerprints for temporary containers.
//!
//! A container's name is the only durable ownership signal this service
//! has: there is no persistent storage, and any process instance must be
//! able to decide "did we create this?" from the name and the container's
//! id alone. Names are therefore tamper-evident certificates: a random
//! seed byte plus a truncated digest over the seed and the id. Renaming a
//! container breaks the certificate and releases the container.
//!
//! The fingerprint format has evolved; verification runs an ordered list
//! of versioned rules so containers stamped by older releases are still
//! recognized and reaped.

use rand::Rng;
use sha2::{Digest, Sha256};
use tmpc_directory::ContainerId;

/// Prefix shared by every fingerprinted name, old or new.
pub const NAME_PREFIX: &str = "Temp ";

/// Sentinel name marking a container for adoption.
///
/// Any container whose name equals this exactly - however it was created -
/// is converted into a fingerprinted temporary container on next
/// observation. This lets other tooling (or the user) request a temporary
/// container without going through [`crate::App::create_container`].
pub const CONTAINER_MARK: &str = "%NEW_TEMP_CONTAINER%";

/// Hex digits of digest appended after the seed in current-format names.
const DIGEST_CHARS: usize = 6;
/// Hex digits of seed in current-format names.
const SEED_CHARS: usize = 2;

fn sha256_hex(input: &str) -> String {
    let digest = Sha256::digest(input.as_bytes());
    digest.iter().map(|b| format!("{b:02x}")).collect()
}

/// Digest of several strings under explicit length-prefixing.
///
/// Each part is encoded as `<hex length>.<part>` before hashing, so the
/// part boundaries are part of the digest: `("ab", "c")` and `("a", "bc")`
/// hash differently.
pub fn digest_concat(parts: &[&str]) -> String {
    let mut data = String::new();
    for part in parts {
        data.push_str(&format!("{:x}.{}", part.len(), part));
    }
    sha256_hex(&data)
}

/// Generate a fingerprinted name for the container with the given id.
///
/// Draws one random seed byte, renders it as two hex characters, and
/// appends the first [`DIGEST_CHARS`] hex characters of the length-prefixed
/// digest over `(seed, id)`.
pub fn generate_fingerprint(id: &ContainerId) -> String {
    let seed_byte: u8 = rand::thread_rng().r#gen();
    let seed = format!("{seed_byte:02x}");
    let digest = digest_concat(&[&seed, id.as_str()]);
    format!("{NAME_PREFIX}{seed}{}", &digest[..DIGEST_CHARS])
}

/// A versioned name-verification rule.
///
/// Each rule re-derives the expected digest fragment from the observed
/// name and the container's id. Rules are pure and never fail: a malformed
/// name simply verifies under none of them.
#[derive(Debug, Clone, Copy)]
enum NameRule {
    /// 0.1 format: `Temp ` + first 8 hex chars of `sha256(id)`. No seed,
    /// no length prefix.
    V1,
    /// Current format: `Temp ` + 2-char seed + first 6 hex chars of the
    /// length-prefixed digest over `(seed, id)`.
    V2,
}

/// Ordered, fixed list of all rules ever used to stamp containers.
const NAME_RULES: [NameRule; 2] = [NameRule::V2, NameRule::V1];

impl NameRule {
    fn verify(self, suffix: &str, id: &ContainerId) -> bool {
        if suffix.len() != SEED_CHARS + DIGEST_CHARS || !is_lower_hex(suffix) {
            return false;
        }
        match self {
            NameRule::V1 => suffix == &sha256_hex(id.as_str())[..SEED_CHARS + DIGEST_CHARS],
            NameRule::V2 => {
                let (seed, fragment) = suffix.split_at(SEED_CHARS);
                let expected = digest_concat(&[seed, id.as_str()]);
                fragment == &expected[..DIGEST_CHARS]
            }
        }
    }
}

fn is_lower_hex(s: &str) -> bool {
    s.chars()
        .all(|c| c.is_ascii_digit() || ('a'..='f').contains(&c))
}

/// Whether a container name proves ownership by this service.
///
/// True iff the name carries the [`NAME_PREFIX`] and at least one
/// versioned rule re-derives its digest fragment from `id`.
pub fn is_owned(name: &str, id: &ContainerId) -> bool {
    let Some(suffix) = name.strip_prefix(NAME_PREFIX) else {
        return false;
    };
    NAME_RULES.iter().any(|rule| rule.verify(suffix, id))
}

/// Whether a container name is the adoption sentinel.
pub fn is_marked(name: &str) -> bool {
    name == CONTAINER_MARK
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(s: &str) -> ContainerId {
        ContainerId::from(s)
    }

    #[test]
    fn generated_names_verify_against_their_id() {
        for raw in ["store-1", "", "a", "firefox-container-41"] {
            let cid = id(raw);
            let name = generate_fingerprint(&cid);
            assert!(is_owned(&name, &cid), "{name} should verify for {raw:?}");
        }
    }

    #[test]
    fn generated_names_do_not_verify_against_other_ids() {
        let name = generate_fingerprint(&id("store-1"));
        assert!(!is_owned(&name, &id("store-2")));
    }

    #[test]
    fn length_prefixing_keeps_part_boundaries() {
        assert_ne!(
            digest_concat(&["hello", "world"]),
            digest_concat(&["hell", "oworld"])
        );
        assert_ne!(digest_concat(&["ab", "c"]), digest_concat(&["a", "bc"]));
    }

    #[test]
    fn legacy_v1_names_still_verify() {
        let cid = id("store-legacy");
        let legacy = format!("{NAME_PREFIX}{}", &sha256_hex(cid.as_str())[..8]);
        assert!(is_owned(&legacy, &cid));
    }

    #[test]
    fn malformed_names_fail_all_rules() {
        let cid = id("store-1");
        for name in [
            "",
            "Temp",
            "Temp ",
            "Temp zzzzzzzz",
            "Temp AB123456",
            "Temp ab1234",
            "Temp ab1234567",
            "Shopping",
            "temp ab123456",
        ] {
            assert!(!is_owned(name, &cid), "{name:?} must not verify");
        }
    }

    #[test]
    fn fingerprint_shaped_name_with_wrong_digest_fails() {
        let cid = id("store-1");
        let mut name = generate_fingerprint(&cid);
        // Flip the last digest character.
        let last = name.pop().unwrap();
        name.push(if last == '0' { '1' } else { '0' });
        assert!(!is_owned(&name, &cid));
    }

    #[test]
    fn mark_is_exact_equality() {
        assert!(is_marked(CONTAINER_MARK));
        assert!(!is_marked("%new_temp_container%"));
        assert!(!is_marked(" %NEW_TEMP_CONTAINER%"));
    }
}
