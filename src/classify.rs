use crate::config::Taxonomy;

/// Lowercased alphanumeric tokens of `text`, in order.
pub fn tokenize(text: &str) -> Vec<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
        .map(str::to_lowercase)
        .collect()
}

const INFLECTIONS: [&str; 9] = ["s", "es", "r", "rs", "er", "ers", "ing", "ist", "ists"];

/// Whole-token match, or the keyword plus a plural/agent suffix ("coder", "dancers").
/// Keywords shorter than three letters only match exactly.
fn token_matches(token: &str, keyword: &str) -> bool {
    if token == keyword {
        return true;
    }
    keyword.len() >= 3
        && token
            .strip_prefix(keyword)
            .is_some_and(|suffix| INFLECTIONS.contains(&suffix))
}

fn contains_phrase(tokens: &[String], phrase: &[String]) -> bool {
    if phrase.is_empty() || phrase.len() > tokens.len() {
        return false;
    }
    tokens.windows(phrase.len()).any(|window| {
        window
            .iter()
            .zip(phrase)
            .all(|(token, keyword)| token_matches(token, keyword))
    })
}

/// Assigns one category by first match in priority order.
///
/// A keyword matches when its tokens appear as a contiguous run of tokens in the
/// club name followed by the associated text, so `"ai"` does not fire on `"chair"`
/// while `"code"` still fires on `"Coders"`.
/// Clubs that match no keyword fall back to the taxonomy's last group.
pub fn classify<'a, S: AsRef<str>>(
    taxonomy: &'a Taxonomy,
    club_name: &str,
    associated_text: &[S],
) -> &'a str {
    let mut tokens = tokenize(club_name);
    for text in associated_text {
        tokens.extend(tokenize(text.as_ref()));
    }

    for group in taxonomy.keyword_groups() {
        let hit = group
            .keywords
            .iter()
            .any(|keyword| contains_phrase(&tokens, &tokenize(keyword)));
        if hit {
            return &group.name;
        }
    }

    taxonomy.fallback()
}
