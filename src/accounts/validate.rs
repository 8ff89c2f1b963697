use lazy_static::lazy_static;
use regex::Regex;

/// Logins and passwords allow Latin letters and digits only.
pub fn login_is_correct(login: &str) -> bool {
    lazy_static! {
        static ref LOGIN_RE: Regex = Regex::new(r"^[a-zA-Z0-9]+$").unwrap();
    }
    LOGIN_RE.is_match(login)
}

pub fn password_is_correct(password: &str) -> bool {
    login_is_correct(password)
}

/// Names allow Latin and Cyrillic letters only, as a single token.
pub fn name_is_correct(name: &str) -> bool {
    lazy_static! {
        static ref NAME_RE: Regex = Regex::new(r"^[a-zA-Zа-яА-Я]+$").unwrap();
    }
    NAME_RE.is_match(name)
}

/// 0 - female, 1 - male, 2 - unknown.
pub fn gender_is_correct(gender: i32) -> bool {
    (0..=2).contains(&gender)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn login_accepts_alphanumerics() {
        assert!(login_is_correct("bob1"));
        assert!(login_is_correct("ABC123"));
        assert!(login_is_correct("0"));
    }

    #[test]
    fn login_rejects_anything_else() {
        assert!(!login_is_correct(""));
        assert!(!login_is_correct("bob 1"));
        assert!(!login_is_correct("bob-1"));
        assert!(!login_is_correct("bob_1"));
        assert!(!login_is_correct("bob@mail"));
        assert!(!login_is_correct("боб"));
    }

    #[test]
    fn password_uses_the_same_rule_as_login() {
        assert!(password_is_correct("Secret1"));
        assert!(!password_is_correct("Secret 1"));
        assert!(!password_is_correct("p@ss"));
    }

    #[test]
    fn name_accepts_latin_and_cyrillic() {
        assert!(name_is_correct("Bob"));
        assert!(name_is_correct("Иван"));
        assert!(name_is_correct("ИванIvan"));
    }

    #[test]
    fn name_rejects_digits_punctuation_and_spaces() {
        assert!(!name_is_correct(""));
        assert!(!name_is_correct("Bob1"));
        assert!(!name_is_correct("Bob Smith"));
        assert!(!name_is_correct("Anne-Marie"));
        assert!(!name_is_correct("O'Brien"));
    }

    #[test]
    fn gender_is_a_three_value_enum() {
        assert!(gender_is_correct(0));
        assert!(gender_is_correct(1));
        assert!(gender_is_correct(2));
        assert!(!gender_is_correct(-1));
        assert!(!gender_is_correct(3));
    }
}
