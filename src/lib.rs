//! # motext
//!
//! An embedded message-catalogue library compatible with the GNU
//! gettext binary format (MO files). It resolves original English
//! messages — optionally qualified by a disambiguation context and/or a
//! plural count — to localized strings drawn from one or more loaded
//! catalogues.
//!
//! Three pieces make up the crate:
//!
//! - [`parse_plural_rules`]/[`PluralExpr`] — compiles the C-like
//!   expression from a catalogue's `Plural-Forms:` header and evaluates
//!   it to a plural-form index.
//! - [`MoCatalog`] — a strict loader for a single MO byte buffer with
//!   constant-time, zero-copy access to its entries.
//! - [`TransLibrary`] — any number of catalogues merged into one
//!   binary-searchable pool with the four classic gettext lookup
//!   flavours (`get`, `get_ctx`, `get_pl`, `get_ctx_pl`).
//!
//! Catalogues are validated eagerly at load time; lookups never fail
//! and instead fall back to the caller's own strings, so call sites can
//! stay branch-free:
//!
//! ```no_run
//! use motext::{MoCatalog, TransLibrary};
//!
//! # fn main() -> Result<(), motext::Error> {
//! let catalogue = MoCatalog::load_from_file("lang/ru.mo")?;
//! let library = TransLibrary::create(vec![catalogue]);
//!
//! println!("{}", library.get("Cataclysm"));
//! println!("{}", library.get_pl("%d item", "%d items", 5));
//! # Ok(())
//! # }
//! ```
//!
//! The library is build-once, read-many: construction is not
//! thread-safe, but a finished [`TransLibrary`] is `Send + Sync` and
//! every returned `&str` borrows from its catalogue buffers for the
//! library's whole lifetime.

mod catalogue;
mod error;
mod library;
mod plural;

pub use catalogue::MoCatalog;
pub use error::Error;
pub use library::TransLibrary;
pub use plural::{parse_plural_rules, BinOp, PluralExpr};
