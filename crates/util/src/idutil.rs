//! Id generation: a snowflake-style sequential generator plus random secret
//! material.
//!
//! The generator is an explicitly constructed component the caller owns and
//! injects; there is no process-wide instance. Callers that share one across
//! threads wrap it in their own lock.

use chrono::Utc;
use rand::Rng;
use uuid::Uuid;

pub const ALPHABET_62: &str = "abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ1234567890";
pub const ALPHABET_36: &str = "abcdefghijklmnopqrstuvwxyz1234567890";

const SECRET_ID_LEN: usize = 36;
const SECRET_KEY_LEN: usize = 32;
const INSTANCE_ID_MIN_LEN: usize = 6;

// sonyflake bit layout: 39-bit time in 10ms units | 8-bit sequence | 16-bit machine
const TIME_UNIT_MS: i64 = 10;
const SEQUENCE_BITS: u32 = 8;
const MACHINE_BITS: u32 = 16;
const SEQUENCE_MASK: u64 = (1 << SEQUENCE_BITS) - 1;

/// Sequential unique-id source. Ids are time-ordered and collision-free per
/// (machine_id, 10ms tick, sequence) triple.
#[derive(Debug)]
pub struct IdGenerator {
    machine_id: u16,
    last_tick: i64,
    sequence: u64,
}

impl IdGenerator {
    pub fn new(machine_id: u16) -> IdGenerator {
        IdGenerator { machine_id, last_tick: 0, sequence: 0 }
    }

    pub fn next_id(&mut self) -> u64 {
        let mut tick = Utc::now().timestamp_millis() / TIME_UNIT_MS;

        if tick == self.last_tick {
            self.sequence = (self.sequence + 1) & SEQUENCE_MASK;
            if self.sequence == 0 {
                // sequence exhausted within this tick; busy-wait to the next
                while tick <= self.last_tick {
                    tick = Utc::now().timestamp_millis() / TIME_UNIT_MS;
                }
            }
        } else {
            self.sequence = 0;
        }
        self.last_tick = tick;

        ((tick as u64) << (SEQUENCE_BITS + MACHINE_BITS))
            | (self.sequence << MACHINE_BITS)
            | u64::from(self.machine_id)
    }

    /// A short human-safe id: prefix + reversed base36 rendering of the next
    /// sequential id. Reversal moves the fast-changing low digits to the
    /// front so neighboring ids do not share a long common prefix.
    pub fn instance_id(&mut self, prefix: &str) -> String {
        let encoded = encode_base36(self.next_id(), INSTANCE_ID_MIN_LEN);

        format!("{prefix}{}", reverse(&encoded))
    }
}

/// A base36 rendering of a fresh v4 uuid, prefixed.
pub fn uuid36(prefix: &str) -> String {
    format!("{prefix}{}", encode_base36_u128(Uuid::new_v4().as_u128()))
}

/// A random string of `n` characters drawn uniformly from `sample`.
pub fn rand_string(sample: &str, n: usize) -> String {
    let chars: Vec<char> = sample.chars().collect();
    let mut rng = rand::thread_rng();

    (0..n).map(|_| chars[rng.gen_range(0..chars.len())]).collect()
}

pub fn new_secret_id() -> String {
    rand_string(ALPHABET_62, SECRET_ID_LEN)
}

pub fn new_secret_key() -> String {
    rand_string(ALPHABET_36, SECRET_KEY_LEN)
}

fn encode_base36(mut v: u64, min_len: usize) -> String {
    const DIGITS: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";
    let mut out = Vec::new();

    loop {
        out.push(DIGITS[(v % 36) as usize]);
        v /= 36;
        if v == 0 {
            break;
        }
    }
    while out.len() < min_len {
        out.push(b'0');
    }
    out.reverse();

    String::from_utf8(out).unwrap_or_default()
}

fn encode_base36_u128(mut v: u128) -> String {
    const DIGITS: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";
    let mut out = Vec::new();

    loop {
        out.push(DIGITS[(v % 36) as usize]);
        v /= 36;
        if v == 0 {
            break;
        }
    }
    out.reverse();

    String::from_utf8(out).unwrap_or_default()
}

fn reverse(s: &str) -> String {
    s.chars().rev().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn next_id_is_unique_and_ordered() {
        let mut generator = IdGenerator::new(7);
        let ids: Vec<u64> = (0..1000).map(|_| generator.next_id()).collect();

        let distinct: HashSet<u64> = ids.iter().copied().collect();
        assert_eq!(distinct.len(), ids.len());
        let mut sorted = ids.clone();
        sorted.sort_unstable();
        assert_eq!(sorted, ids);
        // machine id occupies the low 16 bits
        assert!(ids.iter().all(|id| id & 0xffff == 7));
    }

    #[test]
    fn machine_ids_partition_the_space() {
        let a = IdGenerator::new(1).next_id();
        let b = IdGenerator::new(2).next_id();
        assert_ne!(a, b);
    }

    #[test]
    fn instance_ids_carry_prefix_and_min_length() {
        let mut generator = IdGenerator::new(0);
        let id = generator.instance_id("secret-");
        assert!(id.starts_with("secret-"));
        assert!(id.len() >= "secret-".len() + 6);
        assert_ne!(generator.instance_id("secret-"), id);
    }

    #[test]
    fn uuid36_is_lowercase_alphanumeric() {
        let id = uuid36("user-");
        assert!(id.starts_with("user-"));
        assert!(id["user-".len()..].chars().all(|c| c.is_ascii_lowercase() || c.is_ascii_digit()));
        assert_ne!(uuid36("user-"), id);
    }

    #[test]
    fn secrets_use_their_alphabets() {
        let sid = new_secret_id();
        let skey = new_secret_key();
        assert_eq!(sid.len(), 36);
        assert_eq!(skey.len(), 32);
        assert!(sid.chars().all(|c| ALPHABET_62.contains(c)));
        assert!(skey.chars().all(|c| ALPHABET_36.contains(c)));
        assert_ne!(new_secret_id(), sid);
    }

    #[test]
    fn base36_padding() {
        assert_eq!(encode_base36(0, 6), "000000");
        assert_eq!(encode_base36(35, 1), "z");
        assert_eq!(encode_base36(36, 1), "10");
    }
}
