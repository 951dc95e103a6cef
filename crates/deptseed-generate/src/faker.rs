//! Faker value sources (en_US) and text shaping for column widths.

use fake::faker::company::en::CatchPhrase;
use fake::faker::internet::en::SafeEmail;
use fake::faker::name::en::Name;
use fake::{Dummy, Fake, Faker};
use rand::Rng;

use deptseed_core::{MAX_SALARY, MAX_TEXT_LEN, MIN_SALARY};

/// Employee fields that come straight from faker.
#[derive(Debug, Dummy)]
pub struct EmployeeProfile {
    #[dummy(faker = "Name()")]
    pub name: String,
    #[dummy(faker = "SafeEmail()")]
    pub email: String,
    #[dummy(faker = "MIN_SALARY..=MAX_SALARY")]
    pub salary: i64,
}

pub fn employee_profile<R: Rng + ?Sized>(rng: &mut R) -> EmployeeProfile {
    let mut profile: EmployeeProfile = Faker.fake_with_rng(rng);
    profile.name = shorten(&profile.name, MAX_TEXT_LEN);
    profile.email = shorten(&profile.email, MAX_TEXT_LEN);
    profile
}

pub fn department_name<R: Rng + ?Sized>(rng: &mut R) -> String {
    let phrase: String = CatchPhrase().fake_with_rng(rng);
    shorten(&phrase, MAX_TEXT_LEN)
}

/// Collapse whitespace and drop trailing words until `text` fits in `width`
/// characters. A single word longer than `width` is cut.
pub fn shorten(text: &str, width: usize) -> String {
    let words: Vec<&str> = text.split_whitespace().collect();
    let mut out = String::new();
    let mut len = 0;

    for word in &words {
        let word_len = word.chars().count();
        let needed = if out.is_empty() { word_len } else { word_len + 1 };
        if len + needed > width {
            break;
        }
        if !out.is_empty() {
            out.push(' ');
        }
        out.push_str(word);
        len += needed;
    }

    if out.is_empty()
        && let Some(first) = words.first()
    {
        return first.chars().take(width).collect();
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shorten_collapses_whitespace() {
        assert_eq!(shorten("  Cross-group \t static\n hub ", 100), "Cross-group static hub");
    }

    #[test]
    fn shorten_breaks_on_word_boundary() {
        assert_eq!(shorten("alpha beta gamma", 10), "alpha beta");
        assert_eq!(shorten("alpha beta gamma", 9), "alpha");
    }

    #[test]
    fn shorten_cuts_oversized_word() {
        assert_eq!(shorten("abcdefghij", 4), "abcd");
        assert_eq!(shorten("", 4), "");
    }
}
