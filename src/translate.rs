//! Token-wise keyword translation between language entries.

use crate::frontend::Lexer;
use crate::lang::LanguageEntry;

/// Re-spell a program's keywords and builtin names from one language into
/// another.
///
/// The source is lexed with the `from` entry; keyword and identifier tokens
/// whose surface the entry recognizes are replaced with the `to` entry's
/// spelling, in place. Everything else (identifiers, literals, operators,
/// layout) is preserved exactly, so translating there and back restores
/// the original text.
pub fn translate_with(source: &str, from: &LanguageEntry, to: &LanguageEntry) -> String {
    let tokens = Lexer::new(source, from).tokenize();
    let mut lines: Vec<String> = source.split('\n').map(str::to_string).collect();

    // Rightmost-first so earlier replacements on a line cannot shift the
    // columns of the ones still pending.
    for token in tokens.iter().rev() {
        if !token.kind.is_word() {
            continue;
        }

        let replacement = if let Some(kw) = from.keyword_of(&token.text) {
            Some(to.keyword(kw))
        } else if let Some(builtin) = from.builtin_of(&token.text) {
            Some(to.builtin(builtin))
        } else {
            None
        };

        let Some(replacement) = replacement else {
            continue;
        };

        if let Some(line) = lines.get_mut(token.line - 1) {
            replace_span(line, token.col, token.text.chars().count(), replacement);
        }
    }

    lines.join("\n")
}

/// Replace `len` characters starting at 1-based character column `col`.
fn replace_span(line: &mut String, col: usize, len: usize, replacement: &str) {
    let start = byte_offset(line, col - 1);
    let end = byte_offset(line, col - 1 + len);
    if let (Some(start), Some(end)) = (start, end) {
        line.replace_range(start..end, replacement);
    }
}

fn byte_offset(line: &str, char_idx: usize) -> Option<usize> {
    line.char_indices()
        .map(|(i, _)| i)
        .chain(std::iter::once(line.len()))
        .nth(char_idx)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lang::lookup;

    fn en_to_hi(source: &str) -> String {
        translate_with(source, lookup("en").unwrap(), lookup("hi").unwrap())
    }

    #[test]
    fn test_keywords_and_builtins_translate() {
        assert_eq!(
            en_to_hi("if (x) { print(x); } else { print(2); }"),
            "agar (x) { dikhaao(x); } warna { dikhaao(2); }"
        );
    }

    #[test]
    fn test_identifiers_and_strings_are_untouched() {
        assert_eq!(
            en_to_hi("var whiles = \"while\";"),
            "badal whiles = \"while\";"
        );
    }

    #[test]
    fn test_round_trip_restores_source() {
        let source = "function fact(n) {\n    if (n <= 1) { return 1; }\n    return n * fact(n - 1);\n}\nprint(fact(5));";
        let hi = en_to_hi(source);
        assert_ne!(hi, source);
        let back = translate_with(&hi, lookup("hi").unwrap(), lookup("en").unwrap());
        assert_eq!(back, source);
    }

    #[test]
    fn test_multiline_positions() {
        let source = "var a = 1;\nvar b = 2;\nwhile (a < b) { a = a + 1; }";
        let hi = en_to_hi(source);
        assert_eq!(hi, "badal a = 1;\nbadal b = 2;\njabtak (a < b) { a = a + 1; }");
    }

    #[test]
    fn test_translate_between_non_english_pairs() {
        let ta = lookup("ta").unwrap();
        let sa = lookup("sa").unwrap();
        assert_eq!(
            translate_with("maari x = unmai;", ta, sa),
            "parimaan x = satyam;"
        );
    }
}
