//! Random helpers shared by content generation.
//!
//! Everything here is a thin, shape-preserving wrapper over `rand` so the
//! rest of the game never has to think about empty ranges or retry loops.

use rand::distributions::uniform::SampleUniform;
use rand::seq::SliceRandom;
use rand::Rng;

/// Upper-case letters and digits, used for passwords and wheel rings.
pub const ALPHANUMERIC: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

/// Lower-case letters, used for filler text.
pub const LOWERCASE: &[u8] = b"abcdefghijklmnopqrstuvwxyz";

/// Upper-case hexadecimal digits.
pub const HEX_DIGITS: &[u8] = b"0123456789ABCDEF";

/// Uniform value in `[min, max)`. An empty range yields `min`.
pub fn random_range<T, R>(rng: &mut R, min: T, max: T) -> T
where
    T: SampleUniform + PartialOrd + Copy,
    R: Rng + ?Sized,
{
    if min >= max {
        min
    } else {
        rng.gen_range(min..max)
    }
}

/// Uniform element of `items`, or `None` when empty.
pub fn random_choice<'a, T, R: Rng + ?Sized>(rng: &mut R, items: &'a [T]) -> Option<&'a T> {
    items.choose(rng)
}

/// Fair coin flip.
pub fn coin_flip<R: Rng + ?Sized>(rng: &mut R) -> bool {
    rng.gen_bool(0.5)
}

/// Fisher-Yates shuffle in place.
pub fn shuffle<T, R: Rng + ?Sized>(rng: &mut R, items: &mut [T]) {
    items.shuffle(rng);
}

/// Rolls a percentage: true when `percent > random(0, 100)`.
pub fn roll_percent<R: Rng + ?Sized>(rng: &mut R, percent: f64) -> bool {
    percent > rng.gen_range(0.0..100.0)
}

/// Draws up to `count` distinct values from `generate`.
///
/// Duplicates are redrawn until `retries` extra draws have been spent, so the
/// result may be shorter than `count` when the generator's space is small.
pub fn unique_sample<T, R, F>(rng: &mut R, count: usize, retries: usize, mut generate: F) -> Vec<T>
where
    T: PartialEq,
    R: Rng + ?Sized,
    F: FnMut(&mut R) -> T,
{
    let mut out = Vec::with_capacity(count);
    let mut misses = 0;
    while out.len() < count {
        let candidate = generate(rng);
        if out.contains(&candidate) {
            misses += 1;
            if misses > retries {
                break;
            }
        } else {
            out.push(candidate);
        }
    }
    out
}

/// Random string of `len` characters drawn from `alphabet`.
pub fn random_string<R: Rng + ?Sized>(rng: &mut R, len: usize, alphabet: &[u8]) -> String {
    (0..len)
        .filter_map(|_| alphabet.choose(rng).map(|&b| b as char))
        .collect()
}

/// Two lower-case hex digits, e.g. `"3f"`.
pub fn random_hex_pair<R: Rng + ?Sized>(rng: &mut R) -> String {
    format!("{:02x}", rng.gen::<u8>())
}
