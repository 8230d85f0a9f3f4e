use std::num::NonZeroUsize;

use rand::Rng;

pub const VOWELS: [char; 5] = ['A', 'E', 'I', 'O', 'U'];
pub const ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ";

pub struct LetterGenerator;

impl LetterGenerator {
    /// Generate `count` letters, the first of which is always a vowel
    pub fn generate(count: NonZeroUsize) -> Vec<char> {
        let mut rng = rand::rng();
        Self::generate_with(count, &mut rng)
    }

    pub fn generate_with(count: NonZeroUsize, rng: &mut impl Rng) -> Vec<char> {
        let mut letters = Vec::with_capacity(count.get());

        letters.push(Self::random_vowel(rng));
        for _ in 1..count.get() {
            letters.push(Self::random_letter(rng));
        }

        debug_assert!(letters.iter().any(|&c| is_vowel(c)));
        letters
    }

    fn random_vowel(rng: &mut impl Rng) -> char {
        VOWELS[rng.random_range(0..VOWELS.len())]
    }

    fn random_letter(rng: &mut impl Rng) -> char {
        ALPHABET[rng.random_range(0..ALPHABET.len())] as char
    }
}

pub fn is_vowel(letter: char) -> bool {
    VOWELS.contains(&letter.to_ascii_uppercase())
}
