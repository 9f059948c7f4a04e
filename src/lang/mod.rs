//! Language catalog and runtime values.
//!
//! A program is always lexed against exactly one [`table::LanguageEntry`]:
//! the entry decides which surface spellings map to the canonical keywords
//! and to the `print`/`input` builtins. Values are what the virtual machine
//! pushes around at run time.

pub mod table;
pub mod value;

pub use table::{list_all, lookup, Builtin, Keyword, LanguageEntry};
pub use value::Value;
