//! GNU MO catalogue loader.
//!
//! A MO file is a table-based binary catalogue: a 28-byte header, two
//! parallel descriptor tables of `(length, address)` pairs, and the
//! string data itself. Entry 0 pairs an empty original with the
//! metadata block (`Key: Value` lines), which carries the charset and
//! the plural rule. See the 'GNU gettext utilities' manual:
//! <https://www.gnu.org/software/gettext/manual/html_node/MO-Files.html>
//!
//! [`MoCatalog`] validates the whole buffer up front — table bounds,
//! NUL terminators, UTF-8, plural-form counts — so that the accessors
//! can serve zero-copy `&str` slices without any failure path.

use std::path::Path;

use crate::error::Error;
use crate::plural::{parse_plural_rules, PluralExpr};

/// Magic number as it appears in a little-endian file.
const MAGIC_LE: [u8; 4] = [0xde, 0x12, 0x04, 0x95];
/// Magic number as it appears in a big-endian file.
const MAGIC_BE: [u8; 4] = [0x95, 0x04, 0x12, 0xde];

/// Metadata lines of entry 0, split on `\n`.
type MetaHeaders = Vec<String>;

/// Endian-tagged bounds-checked reads over the raw file buffer.
struct ByteReader<'a> {
	buf: &'a [u8],
	little_endian: bool,
}

impl ByteReader<'_> {
	fn get_u32(&self, addr: u32) -> Result<u32, Error> {
		let start = addr as usize;
		let bytes = self
			.buf
			.get(start..start + 4)
			.ok_or(Error::UnexpectedEof { addr })?;
		let word = [bytes[0], bytes[1], bytes[2], bytes[3]];
		Ok(if self.little_endian {
			u32::from_le_bytes(word)
		} else {
			u32::from_be_bytes(word)
		})
	}

	/// Reads the `(length, address)` descriptor `index` of the table at
	/// `table_offs`.
	fn string_info(&self, table_offs: u32, index: u32) -> Result<(u32, u32), Error> {
		let descr = descriptor_offset(table_offs, index)?;
		Ok((self.get_u32(descr)?, self.get_u32(descr + 4)?))
	}
}

fn descriptor_offset(table_offs: u32, index: u32) -> Result<u32, Error> {
	let descr = u64::from(table_offs) + u64::from(index) * 8;
	u32::try_from(descr).map_err(|_| Error::UnexpectedEof { addr: table_offs })
}

/// One loaded MO file.
///
/// The catalogue owns the raw file buffer; every string handed out by
/// the accessors is a slice of that buffer and lives as long as the
/// catalogue does.
#[derive(Debug)]
pub struct MoCatalog {
	buf: Vec<u8>,
	is_little_endian: bool,
	number_of_strings: u32,
	offs_orig_table: u32,
	offs_trans_table: u32,
	num_plural_forms: usize,
	plf_rules: PluralExpr,
}

impl MoCatalog {
	/// Loads a translation catalogue from the MO file at `path`.
	pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, Error> {
		let buf = std::fs::read(path.as_ref()).map_err(Error::FailedToOpenFile)?;
		Self::load_from_buffer(buf)
	}

	/// Loads a translation catalogue from a raw MO byte buffer.
	///
	/// Rejects anything malformed eagerly; no partially-valid catalogue
	/// is ever returned.
	pub fn load_from_buffer(buf: Vec<u8>) -> Result<Self, Error> {
		let is_little_endian = match buf.get(0..4) {
			Some(magic) if magic == MAGIC_LE => true,
			Some(magic) if magic == MAGIC_BE => false,
			_ => return Err(Error::NotAMoFile),
		};
		let reader = ByteReader {
			buf: &buf,
			little_endian: is_little_endian,
		};

		let revision = reader.get_u32(4)?;
		if revision >> 16 > 1 {
			return Err(Error::UnsupportedRevision);
		}
		let number_of_strings = reader.get_u32(8)?;
		let offs_orig_table = reader.get_u32(12)?;
		let offs_trans_table = reader.get_u32(16)?;
		// words at 20/24 describe the optional hash table, which binary
		// search over the sorted originals makes redundant

		check_string_table(&reader, offs_orig_table, number_of_strings)?;
		check_string_table(&reader, offs_trans_table, number_of_strings)?;

		let headers = read_metadata(&reader, offs_orig_table, offs_trans_table)?;
		check_encoding(&headers)?;
		let (num_plural_forms, plf_rules) = parse_plf_header(&headers)?;
		check_string_plurals(
			&reader,
			offs_orig_table,
			offs_trans_table,
			number_of_strings,
			num_plural_forms,
		)?;

		tracing::debug!(
			"loaded MO catalogue: {} strings, {} plural forms, {} endian",
			number_of_strings,
			num_plural_forms,
			if is_little_endian { "little" } else { "big" }
		);

		Ok(Self {
			buf,
			is_little_endian,
			number_of_strings,
			offs_orig_table,
			offs_trans_table,
			num_plural_forms,
			plf_rules,
		})
	}

	/// Number of original/translation pairs, including the metadata
	/// entry at index 0.
	pub fn get_num_strings(&self) -> u32 {
		self.number_of_strings
	}

	/// The `n`-th original string (for plural entries: the singular
	/// msgid, which doubles as the lookup key).
	///
	/// # Panics
	/// Panics if `n >= get_num_strings()`.
	pub fn get_nth_orig_string(&self, n: u32) -> &str {
		let (_, addr) = self.entry_info(self.offs_orig_table, n);
		self.cstr_at(addr)
	}

	/// The `n`-th translation (for plural entries: the first form).
	///
	/// # Panics
	/// Panics if `n >= get_num_strings()`.
	pub fn get_nth_translation(&self, n: u32) -> &str {
		let (_, addr) = self.entry_info(self.offs_trans_table, n);
		self.cstr_at(addr)
	}

	/// The plural form of the `n`-th translation appropriate for `num`
	/// objects, selected by this catalogue's compiled plural rule and
	/// clamped to the declared number of forms.
	///
	/// # Panics
	/// Panics if `n >= get_num_strings()`.
	pub fn get_nth_pl_translation(&self, n: u32, num: u64) -> &str {
		let form = self
			.plf_rules
			.eval(num)
			.min(self.num_plural_forms as u64 - 1) as usize;
		let (len, addr) = self.entry_info(self.offs_trans_table, n);
		let entry = &self.buf[addr as usize..(u64::from(addr) + u64::from(len)) as usize];
		let mut start = 0usize;
		for _ in 0..form {
			match entry[start..].iter().position(|&b| b == 0) {
				Some(nul) => start += nul + 1,
				// fewer forms than the rule asks for: serve the last one
				None => break,
			}
		}
		self.cstr_at(addr + start as u32)
	}

	fn u32_at(&self, addr: u32) -> u32 {
		let start = addr as usize;
		let word = [
			self.buf[start],
			self.buf[start + 1],
			self.buf[start + 2],
			self.buf[start + 3],
		];
		if self.is_little_endian {
			u32::from_le_bytes(word)
		} else {
			u32::from_be_bytes(word)
		}
	}

	fn entry_info(&self, table_offs: u32, n: u32) -> (u32, u32) {
		let descr = table_offs + 8 * n;
		(self.u32_at(descr), self.u32_at(descr + 4))
	}

	/// The NUL-terminated string starting at `addr`, without the NUL.
	fn cstr_at(&self, addr: u32) -> &str {
		let tail = &self.buf[addr as usize..];
		let end = tail.iter().position(|&b| b == 0).unwrap_or(tail.len());
		// every string was UTF-8-checked at load time
		std::str::from_utf8(&tail[..end]).unwrap_or("")
	}
}

/// Validates every descriptor of one table: the string must lie inside
/// the buffer, be NUL-terminated, and hold valid UTF-8.
fn check_string_table(reader: &ByteReader<'_>, table_offs: u32, count: u32) -> Result<(), Error> {
	let size = reader.buf.len() as u64;
	for index in 0..count {
		let descr = descriptor_offset(table_offs, index)?;
		let len = reader.get_u32(descr)?;
		let addr = reader.get_u32(descr + 4)?;
		let start = u64::from(addr);
		let end = start + u64::from(len);
		if end + 1 > size {
			return Err(Error::StringOutOfBounds {
				descr,
				len,
				addr,
				size,
			});
		}
		if reader.buf[end as usize] != 0 {
			return Err(Error::MissingNullTerminator { descr });
		}
		if std::str::from_utf8(&reader.buf[start as usize..end as usize]).is_err() {
			return Err(Error::InvalidUtf8 { addr });
		}
	}
	Ok(())
}

/// Extracts entry 0's translation as `Key: Value` lines, dropping
/// trailing empties. Entry 0's original must be the empty string.
fn read_metadata(
	reader: &ByteReader<'_>,
	offs_orig_table: u32,
	offs_trans_table: u32,
) -> Result<MetaHeaders, Error> {
	let (orig_len, _) = reader.string_info(offs_orig_table, 0)?;
	if orig_len != 0 {
		return Err(Error::BadMetadataEntry);
	}
	let (len, addr) = reader.string_info(offs_trans_table, 0)?;
	let bytes = &reader.buf[addr as usize..(u64::from(addr) + u64::from(len)) as usize];
	// UTF-8 validity was established by check_string_table
	let block = std::str::from_utf8(bytes).unwrap_or("");
	let mut headers: MetaHeaders = block.split('\n').map(str::to_string).collect();
	while headers.last().is_some_and(|line| line.is_empty()) {
		headers.pop();
	}
	Ok(headers)
}

fn find_header<'a>(headers: &'a [String], key: &str) -> Option<&'a str> {
	headers
		.iter()
		.find_map(|line| line.strip_prefix(key))
		.map(str::trim)
}

/// Only UTF-8 catalogues are accepted; the check is case-sensitive,
/// matching what msgfmt emits.
fn check_encoding(headers: &MetaHeaders) -> Result<(), Error> {
	let value = find_header(headers, "Content-Type:").ok_or(Error::MissingContentType)?;
	if !value.contains("charset=UTF-8") {
		return Err(Error::WrongCharset);
	}
	Ok(())
}

/// Parses `Plural-Forms: nplurals=<N>; plural=<expr>;` and compiles the
/// expression.
fn parse_plf_header(headers: &MetaHeaders) -> Result<(usize, PluralExpr), Error> {
	let value = find_header(headers, "Plural-Forms:").ok_or(Error::MissingPluralForms)?;

	let nplurals_at = value.find("nplurals=").ok_or(Error::BadPluralForms)?;
	let digits: String = value[nplurals_at + "nplurals=".len()..]
		.chars()
		.take_while(char::is_ascii_digit)
		.collect();
	let num_plural_forms: usize = digits.parse().map_err(|_| Error::BadPluralForms)?;
	if num_plural_forms == 0 {
		return Err(Error::BadPluralForms);
	}

	let plural_at = value.find("plural=").ok_or(Error::BadPluralForms)?;
	let expr_text = &value[plural_at + "plural=".len()..];
	let end = expr_text.rfind(';').ok_or(Error::BadPluralForms)?;
	let plf_rules = parse_plural_rules(expr_text[..end].trim())?;

	Ok((num_plural_forms, plf_rules))
}

/// Every translation whose original carries a plural variant must store
/// exactly `nplurals` NUL-separated forms.
fn check_string_plurals(
	reader: &ByteReader<'_>,
	offs_orig_table: u32,
	offs_trans_table: u32,
	count: u32,
	num_plural_forms: usize,
) -> Result<(), Error> {
	for index in 1..count {
		let (orig_len, orig_addr) = reader.string_info(offs_orig_table, index)?;
		let orig = &reader.buf
			[orig_addr as usize..(u64::from(orig_addr) + u64::from(orig_len)) as usize];
		if !orig.contains(&0) {
			continue;
		}
		let (len, addr) = reader.string_info(offs_trans_table, index)?;
		let trans = &reader.buf[addr as usize..(u64::from(addr) + u64::from(len)) as usize];
		let found = trans.iter().filter(|&&b| b == 0).count() + 1;
		if found != num_plural_forms {
			return Err(Error::PluralCountMismatch {
				index,
				expected: num_plural_forms,
				found,
			});
		}
	}
	Ok(())
}

#[cfg(test)]
mod tests {
	use rstest::rstest;

	use super::*;

	fn headers(lines: &[&str]) -> MetaHeaders {
		lines.iter().map(|line| line.to_string()).collect()
	}

	#[rstest]
	#[case("nplurals=1; plural=0;", 1, "0")]
	#[case("nplurals=2; plural=(n != 1);", 2, "(n!=1)")]
	#[case(
		"nplurals=3; plural=(n%10==1 && n%100!=11 ? 0 : n != 0 ? 1 : 2);",
		3,
		"((((n%10)==1)&&((n%100)!=11))?0:((n!=0)?1:2))"
	)]
	fn parses_plural_forms_header(
		#[case] value: &str,
		#[case] expected_nplurals: usize,
		#[case] expected_dump: &str,
	) {
		// Arrange
		let line = format!("Plural-Forms: {value}");
		let headers = headers(&[line.as_str()]);

		// Act
		let (nplurals, rules) = parse_plf_header(&headers).unwrap();

		// Assert
		assert_eq!(nplurals, expected_nplurals);
		assert_eq!(rules.to_string(), expected_dump);
	}

	#[rstest]
	#[case(&["Plural-Forms: plural=0;"], "failed to parse Plural-Forms header")]
	#[case(&["Plural-Forms: nplurals=0; plural=0;"], "failed to parse Plural-Forms header")]
	#[case(&["Plural-Forms: nplurals=2; plural=(n != 1)"], "failed to parse Plural-Forms header")]
	#[case(&["Language: ru"], "failed to find Plural-Forms header")]
	fn rejects_bad_plural_forms_header(#[case] lines: &[&str], #[case] expected: &str) {
		let err = parse_plf_header(&headers(lines)).unwrap_err();
		assert_eq!(err.to_string(), expected);
	}

	#[rstest]
	#[case("Content-Type: text/plain; charset=UTF-8")]
	#[case("Content-Type: text/plain; charset=UTF-8; foo=bar")]
	fn accepts_utf8_content_type(#[case] line: &str) {
		assert!(check_encoding(&headers(&[line])).is_ok());
	}

	#[rstest]
	#[case(
		&["Content-Type: text/plain; charset=KOI8-R"],
		"unexpected value in Content-Type header (wrong charset?)"
	)]
	#[case(
		&["Content-Type: text/plain; charset=utf-8"],
		"unexpected value in Content-Type header (wrong charset?)"
	)]
	#[case(&["Language: ru"], "failed to find Content-Type header")]
	fn rejects_non_utf8_content_type(#[case] lines: &[&str], #[case] expected: &str) {
		let err = check_encoding(&headers(lines)).unwrap_err();
		assert_eq!(err.to_string(), expected);
	}
}
