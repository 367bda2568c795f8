//! Shared MO-image builder for the integration tests.
//!
//! Assembles a well-formed MO byte buffer in either endianness:
//! a 28-byte header, the two descriptor tables, and the string blobs,
//! with originals sorted ascending on raw bytes as the format requires.
//! Entry 0 is generated from the builder's metadata settings.

#![allow(dead_code)]

/// `Plural-Forms:` value for the Russian fixtures.
pub const RU_PLURAL_FORMS: &str =
	"nplurals=3; plural=(n%10==1 && n%100!=11 ? 0 : n%10>=2 && n%10<=4 && (n%100<10 || n%100>=20) ? 1 : 2);";

/// `Plural-Forms:` value for the French fixtures.
pub const FR_PLURAL_FORMS: &str = "nplurals=2; plural=(n > 1);";

/// `Plural-Forms:` value for English-like fixtures.
pub const EN_PLURAL_FORMS: &str = "nplurals=2; plural=(n != 1);";

pub struct MoBuilder {
	little_endian: bool,
	charset: String,
	plural_forms: String,
	omit_content_type: bool,
	omit_metadata: bool,
	entries: Vec<(Vec<u8>, Vec<u8>)>,
}

impl MoBuilder {
	/// Starts a little-endian builder with a UTF-8 charset and the
	/// given `Plural-Forms:` value (pass `""` to omit the line).
	pub fn new(plural_forms: &str) -> Self {
		Self {
			little_endian: true,
			charset: "UTF-8".to_string(),
			plural_forms: plural_forms.to_string(),
			omit_content_type: false,
			omit_metadata: false,
			entries: Vec::new(),
		}
	}

	pub fn big_endian(mut self) -> Self {
		self.little_endian = false;
		self
	}

	pub fn charset(mut self, charset: &str) -> Self {
		self.charset = charset.to_string();
		self
	}

	pub fn no_content_type(mut self) -> Self {
		self.omit_content_type = true;
		self
	}

	/// Skips the metadata entry entirely, producing a malformed image.
	pub fn no_metadata(mut self) -> Self {
		self.omit_metadata = true;
		self
	}

	pub fn msg(self, msgid: &str, msgstr: &str) -> Self {
		self.entry(None, msgid, None, &[msgstr])
	}

	pub fn msg_ctx(self, ctx: &str, msgid: &str, msgstr: &str) -> Self {
		self.entry(Some(ctx), msgid, None, &[msgstr])
	}

	pub fn msg_pl(self, msgid: &str, msgid_pl: &str, forms: &[&str]) -> Self {
		self.entry(None, msgid, Some(msgid_pl), forms)
	}

	pub fn msg_ctx_pl(self, ctx: &str, msgid: &str, msgid_pl: &str, forms: &[&str]) -> Self {
		self.entry(Some(ctx), msgid, Some(msgid_pl), forms)
	}

	fn entry(
		mut self,
		ctx: Option<&str>,
		msgid: &str,
		msgid_pl: Option<&str>,
		forms: &[&str],
	) -> Self {
		let mut key = Vec::new();
		if let Some(ctx) = ctx {
			key.extend_from_slice(ctx.as_bytes());
			key.push(0x04);
		}
		key.extend_from_slice(msgid.as_bytes());
		if let Some(plural) = msgid_pl {
			key.push(0);
			key.extend_from_slice(plural.as_bytes());
		}
		let mut value = Vec::new();
		for (i, form) in forms.iter().enumerate() {
			if i > 0 {
				value.push(0);
			}
			value.extend_from_slice(form.as_bytes());
		}
		self.entries.push((key, value));
		self
	}

	pub fn build(&self) -> Vec<u8> {
		let mut entries = self.entries.clone();
		if !self.omit_metadata {
			let mut metadata = String::from("Project-Id-Version: motext test fixture\n");
			if !self.omit_content_type {
				metadata.push_str(&format!(
					"Content-Type: text/plain; charset={}\n",
					self.charset
				));
			}
			metadata.push_str("Content-Transfer-Encoding: 8bit\n");
			if !self.plural_forms.is_empty() {
				metadata.push_str(&format!("Plural-Forms: {}\n", self.plural_forms));
			}
			entries.push((Vec::new(), metadata.into_bytes()));
		}
		entries.sort_by(|a, b| a.0.cmp(&b.0));

		let count = entries.len() as u32;
		let offs_orig = 28u32;
		let offs_trans = offs_orig + count * 8;
		let data_start = offs_trans + count * 8;

		let mut blob = Vec::new();
		let mut orig_table = Vec::new();
		let mut trans_table = Vec::new();
		for (key, _) in &entries {
			orig_table.push((key.len() as u32, data_start + blob.len() as u32));
			blob.extend_from_slice(key);
			blob.push(0);
		}
		for (_, value) in &entries {
			trans_table.push((value.len() as u32, data_start + blob.len() as u32));
			blob.extend_from_slice(value);
			blob.push(0);
		}

		let mut out = Vec::new();
		self.push_u32(&mut out, 0x950412de); // magic, in file byte order
		self.push_u32(&mut out, 0); // format revision
		self.push_u32(&mut out, count);
		self.push_u32(&mut out, offs_orig);
		self.push_u32(&mut out, offs_trans);
		self.push_u32(&mut out, 0); // hash table size (unused)
		self.push_u32(&mut out, 0); // hash table offset (unused)
		for (len, addr) in orig_table.into_iter().chain(trans_table) {
			self.push_u32(&mut out, len);
			self.push_u32(&mut out, addr);
		}
		out.extend_from_slice(&blob);
		out
	}

	fn push_u32(&self, out: &mut Vec<u8>, value: u32) {
		if self.little_endian {
			out.extend_from_slice(&value.to_le_bytes());
		} else {
			out.extend_from_slice(&value.to_be_bytes());
		}
	}
}

/// The Russian fixture used across the integration tests.
pub fn russian_catalog() -> MoBuilder {
	MoBuilder::new(RU_PLURAL_FORMS)
		.msg("Cataclysm", "Катаклизм")
		.msg_ctx("noun", "Test", "Тест")
		.msg_ctx("verb", "Test", "Тестировать")
		.msg_pl(
			"%d item",
			"%d items",
			&["%d предмет", "%d предмета", "%d предметов"],
		)
		.msg_ctx_pl(
			"source of water",
			"%d spring",
			"%d springs",
			&["%d родник", "%d родника", "%d родников"],
		)
		.msg_ctx_pl(
			"metal coil",
			"%d spring",
			"%d springs",
			&["%d пружина", "%d пружины", "%d пружин"],
		)
}
