use chrono::{DateTime, Utc};
use rand::Rng;

pub const PREFIX: &str = "BK";
const TIME_DIGITS: usize = 4;
const RANDOM_DIGITS: usize = 6;
const ALPHABET: &[u8; 36] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ";

fn to_base36(mut n: u64) -> String {
    if n == 0 {
        return "0".to_string();
    }
    let mut digits = Vec::new();
    while n > 0 {
        digits.push(ALPHABET[(n % 36) as usize]);
        n /= 36;
    }
    digits.reverse();
    String::from_utf8(digits).unwrap_or_default()
}

/// `BK-{last 4 base-36 digits of epoch millis}-{6 random base-36 chars}`.
///
/// Uniqueness is probabilistic; the repository rejects duplicates.
#[derive(Debug, Clone, Copy, Default)]
pub struct BookingIdGenerator;

impl BookingIdGenerator {
    pub fn generate(&self) -> String {
        self.generate_at(Utc::now(), &mut rand::thread_rng())
    }

    pub fn generate_at<R: Rng>(&self, now: DateTime<Utc>, rng: &mut R) -> String {
        let millis = u64::try_from(now.timestamp_millis()).unwrap_or_default();
        let encoded = to_base36(millis);
        let time_part = &encoded[encoded.len().saturating_sub(TIME_DIGITS)..];

        let random_part: String = (0..RANDOM_DIGITS)
            .map(|_| ALPHABET[rng.gen_range(0..ALPHABET.len())] as char)
            .collect();

        format!("{PREFIX}-{time_part}-{random_part}")
    }
}

/// Shape check for generated identifiers.
pub fn is_booking_id(candidate: &str) -> bool {
    let mut parts = candidate.split('-');
    let (Some(prefix), Some(time), Some(random), None) = (parts.next(), parts.next(), parts.next(), parts.next()) else {
        return false;
    };
    let base36 = |s: &str| s.bytes().all(|b| b.is_ascii_digit() || b.is_ascii_uppercase());
    prefix == PREFIX
        && (1..=TIME_DIGITS).contains(&time.len())
        && random.len() == RANDOM_DIGITS
        && base36(time)
        && base36(random)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn base36_encoding() {
        assert_eq!(to_base36(0), "0");
        assert_eq!(to_base36(35), "Z");
        assert_eq!(to_base36(36), "10");
        assert_eq!(to_base36(1_700_000_000_000), "LOYW3V28");
    }

    #[test]
    fn keeps_least_significant_time_digits() {
        let now = Utc.timestamp_millis_opt(1_700_000_000_000).unwrap();
        let id = BookingIdGenerator.generate_at(now, &mut StdRng::seed_from_u64(7));
        assert!(id.starts_with("BK-3V28-"), "{id}");
        assert!(is_booking_id(&id));
    }

    #[test]
    fn rapid_ids_differ() {
        let generator = BookingIdGenerator;
        let a = generator.generate();
        let b = generator.generate();
        assert_ne!(a, b);
        assert!(is_booking_id(&a) && is_booking_id(&b));
    }

    #[test]
    fn shape_check_rejects_foreign_ids() {
        assert!(!is_booking_id("BK-3V28"));
        assert!(!is_booking_id("XX-3V28-ABCDEF"));
        assert!(!is_booking_id("BK-3V28-abcdef"));
        assert!(!is_booking_id("BK-3V28-ABCDEF-1"));
    }
}
