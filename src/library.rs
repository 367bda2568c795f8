//! Translation library: catalogues merged into one lookup pool.
//!
//! The library owns its catalogues and a single index of string
//! descriptors sorted by original-string bytes, so every lookup flavour
//! is one binary search. Construction happens once; afterwards the
//! library is immutable and lookups are plain `&self` reads, safe to
//! share across threads.

use crate::catalogue::MoCatalog;

/// Locates one original/translation pair within the pool.
#[derive(Debug, Clone, Copy)]
struct StringDescriptor {
	catalogue: u32,
	entry: u32,
}

/// A pool of one or more catalogues merged into a single lookup surface.
///
/// Where several catalogues translate the same original, the one listed
/// last wins. Unknown keys fall back to the caller's own strings, so
/// lookups never fail.
#[derive(Debug)]
pub struct TransLibrary {
	catalogues: Vec<MoCatalog>,
	string_table: Vec<StringDescriptor>,
}

impl TransLibrary {
	/// Builds a library from the given catalogues, taking ownership.
	pub fn create(catalogues: Vec<MoCatalog>) -> Self {
		let string_table = build_string_table(&catalogues);
		Self {
			catalogues,
			string_table,
		}
	}

	/// Returns the translation of `msgid`, or `msgid` itself when no
	/// catalogue provides one.
	pub fn get<'a>(&'a self, msgid: &'a str) -> &'a str {
		match self.find_in_table(msgid.as_bytes()) {
			Some(d) => self.catalogues[d.catalogue as usize].get_nth_translation(d.entry),
			None => msgid,
		}
	}

	/// Returns the translation of `msgid` disambiguated by the context
	/// `ctx`, or `msgid` itself when absent.
	pub fn get_ctx<'a>(&'a self, ctx: &str, msgid: &'a str) -> &'a str {
		let key = compose_ctx_key(ctx, msgid);
		match self.find_in_table(key.as_bytes()) {
			Some(d) => self.catalogues[d.catalogue as usize].get_nth_translation(d.entry),
			None => msgid,
		}
	}

	/// Returns the plural translation of `msgid` appropriate for `n`
	/// objects, selected by the owning catalogue's plural rule.
	///
	/// `msgid_pl` never participates in the lookup; it is only the
	/// fallback served for `n != 1` when the key is untranslated.
	pub fn get_pl<'a>(&'a self, msgid: &'a str, msgid_pl: &'a str, n: u64) -> &'a str {
		match self.find_in_table(msgid.as_bytes()) {
			Some(d) => self.catalogues[d.catalogue as usize].get_nth_pl_translation(d.entry, n),
			None if n == 1 => msgid,
			None => msgid_pl,
		}
	}

	/// Returns the plural translation of `msgid` disambiguated by `ctx`,
	/// with the same fallback rules as [`get_pl`](Self::get_pl).
	pub fn get_ctx_pl<'a>(
		&'a self,
		ctx: &str,
		msgid: &'a str,
		msgid_pl: &'a str,
		n: u64,
	) -> &'a str {
		let key = compose_ctx_key(ctx, msgid);
		match self.find_in_table(key.as_bytes()) {
			Some(d) => self.catalogues[d.catalogue as usize].get_nth_pl_translation(d.entry, n),
			None if n == 1 => msgid,
			None => msgid_pl,
		}
	}

	fn find_in_table(&self, key: &[u8]) -> Option<StringDescriptor> {
		self.string_table
			.binary_search_by(|d| self.orig_bytes(*d).cmp(key))
			.ok()
			.map(|i| self.string_table[i])
	}

	fn orig_bytes(&self, d: StringDescriptor) -> &[u8] {
		self.catalogues[d.catalogue as usize]
			.get_nth_orig_string(d.entry)
			.as_bytes()
	}
}

/// Indexes every non-metadata entry of every catalogue, sorted by
/// original bytes. Duplicate originals keep only the descriptor from
/// the highest catalogue index ("last catalogue wins").
fn build_string_table(catalogues: &[MoCatalog]) -> Vec<StringDescriptor> {
	let orig = |d: &StringDescriptor| {
		catalogues[d.catalogue as usize]
			.get_nth_orig_string(d.entry)
			.as_bytes()
	};

	let total: usize = catalogues
		.iter()
		.map(|c| c.get_num_strings().saturating_sub(1) as usize)
		.sum();
	let mut table = Vec::with_capacity(total);
	for (index, catalogue) in catalogues.iter().enumerate() {
		for entry in 1..catalogue.get_num_strings() {
			table.push(StringDescriptor {
				catalogue: index as u32,
				entry,
			});
		}
	}
	table.sort_by(|a, b| orig(a).cmp(orig(b)).then_with(|| b.catalogue.cmp(&a.catalogue)));
	table.dedup_by(|a, b| orig(a) == orig(b));
	table
}

/// Composes the MO lookup key for a context-qualified message: context
/// and msgid joined by U+0004 (EOT).
fn compose_ctx_key(ctx: &str, msgid: &str) -> String {
	let mut key = String::with_capacity(ctx.len() + msgid.len() + 1);
	key.push_str(ctx);
	key.push('\u{4}');
	key.push_str(msgid);
	key
}
