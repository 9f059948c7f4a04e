//! Static catalog of keyword tables, one per supported natural language.
//!
//! Each entry maps the ten canonical keywords and the two builtin callables
//! to their surface spellings. The catalog is process-lifetime data; nothing
//! here mutates at runtime, and the lexer resolves identifiers against
//! exactly one entry at a time.

use serde::Serialize;

/// Canonical keyword identifiers.
///
/// These are the internal names for the syntactic roles; the surface
/// spelling is looked up through a [`LanguageEntry`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Keyword {
    If,
    Else,
    While,
    For,
    Function,
    Return,
    Var,
    True,
    False,
    Null,
}

impl Keyword {
    pub const ALL: [Keyword; 10] = [
        Keyword::If,
        Keyword::Else,
        Keyword::While,
        Keyword::For,
        Keyword::Function,
        Keyword::Return,
        Keyword::Var,
        Keyword::True,
        Keyword::False,
        Keyword::Null,
    ];

    /// The canonical (English-internal) name of this keyword.
    pub fn canonical(self) -> &'static str {
        match self {
            Keyword::If => "if",
            Keyword::Else => "else",
            Keyword::While => "while",
            Keyword::For => "for",
            Keyword::Function => "function",
            Keyword::Return => "return",
            Keyword::Var => "var",
            Keyword::True => "true",
            Keyword::False => "false",
            Keyword::Null => "null",
        }
    }

    fn index(self) -> usize {
        match self {
            Keyword::If => 0,
            Keyword::Else => 1,
            Keyword::While => 2,
            Keyword::For => 3,
            Keyword::Function => 4,
            Keyword::Return => 5,
            Keyword::Var => 6,
            Keyword::True => 7,
            Keyword::False => 8,
            Keyword::Null => 9,
        }
    }
}

/// Builtin callables resolved through the language table at compile time.
///
/// Builtins are not keywords: their surfaces lex as plain identifiers, and
/// the compiler recognizes them when they appear in call position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Builtin {
    Print,
    Input,
}

/// One natural-language keyword mapping.
///
/// All surfaces are required to match the identifier lexical class
/// `[A-Za-z_][A-Za-z0-9_]*` and to be pairwise distinct within the entry,
/// so a lexeme classifies unambiguously.
#[derive(Debug, Clone, Serialize)]
pub struct LanguageEntry {
    /// Short language code, e.g. `"hi"`.
    pub code: &'static str,
    /// Display name, possibly in native script.
    pub name: &'static str,
    /// Surfaces for the ten canonical keywords, in [`Keyword::ALL`] order.
    keywords: [&'static str; 10],
    /// Surfaces for `print` and `input`, in that order.
    builtins: [&'static str; 2],
}

impl LanguageEntry {
    /// Surface spelling of a canonical keyword in this language.
    pub fn keyword(&self, kw: Keyword) -> &'static str {
        self.keywords[kw.index()]
    }

    /// Surface spelling of a builtin in this language.
    pub fn builtin(&self, builtin: Builtin) -> &'static str {
        match builtin {
            Builtin::Print => self.builtins[0],
            Builtin::Input => self.builtins[1],
        }
    }

    /// Classify an identifier lexeme as a keyword of this language.
    pub fn keyword_of(&self, surface: &str) -> Option<Keyword> {
        Keyword::ALL
            .iter()
            .copied()
            .find(|kw| self.keywords[kw.index()] == surface)
    }

    /// Classify an identifier lexeme as a builtin of this language.
    pub fn builtin_of(&self, surface: &str) -> Option<Builtin> {
        if surface == self.builtins[0] {
            Some(Builtin::Print)
        } else if surface == self.builtins[1] {
            Some(Builtin::Input)
        } else {
            None
        }
    }
}

/// Keyword order: if, else, while, for, function, return, var, true, false, null.
static LANGUAGES: [LanguageEntry; 6] = [
    LanguageEntry {
        code: "en",
        name: "English",
        keywords: [
            "if", "else", "while", "for", "function", "return", "var", "true", "false", "null",
        ],
        builtins: ["print", "input"],
    },
    LanguageEntry {
        code: "ta",
        name: "தமிழ்",
        keywords: [
            "yenil",
            "illaiyal",
            "varaikum",
            "ondrumuttal",
            "seyalpaadu",
            "thiruppu",
            "maari",
            "unmai",
            "poi",
            "illai",
        ],
        builtins: ["veliyidu", "ulle"],
    },
    LanguageEntry {
        code: "ml",
        name: "മലയാളം",
        keywords: [
            "yendaa",
            "allenkil",
            "vare",
            "vendii",
            "pani",
            "thiriche",
            "madhu",
            "sathyam",
            "jhooth",
            "onnumilla",
        ],
        builtins: ["parakuu", "keraluu"],
    },
    LanguageEntry {
        code: "te",
        name: "తెలుగు",
        keywords: [
            "ayite", "leda", "varaku", "kosam", "pani", "tirigi", "chaala", "nijam", "abaddham",
            "sunna",
        ],
        builtins: ["cheppu", "teesuko"],
    },
    LanguageEntry {
        code: "hi",
        name: "हिन्दी",
        keywords: [
            "agar", "warna", "jabtak", "keliye", "kaam", "wapas", "badal", "sach", "jhooth",
            "khaali",
        ],
        builtins: ["dikhaao", "input"],
    },
    LanguageEntry {
        code: "sa",
        name: "संस्कृत",
        keywords: [
            "yadi", "anya", "yavat", "artham", "kriya", "nivrit", "parimaan", "satyam", "asatyam",
            "shunya",
        ],
        builtins: ["darshaya", "grah"],
    },
];

/// Look up a language entry by its code.
pub fn lookup(code: &str) -> Option<&'static LanguageEntry> {
    LANGUAGES.iter().find(|entry| entry.code == code)
}

/// All supported language entries, in catalog order.
pub fn list_all() -> &'static [LanguageEntry] {
    &LANGUAGES
}
