//! Gettext plural-form expression engine.
//!
//! A catalogue's `Plural-Forms:` metadata line carries a restricted
//! C-like expression over the single variable `n`, for example
//! `nplurals=3; plural=(n%10==1 && n%100!=11 ? 0 : ...);`. This module
//! compiles such an expression into an owning AST and evaluates it to
//! the index of the plural form to serve.
//!
//! The grammar, by precedence (lowest first): ternary `?:`, `||`, `&&`,
//! `==`/`!=`, `>`/`>=`/`<`/`<=`, `%`, then atoms (integer literals, `n`,
//! parenthesized expressions). All binary operators nest to the right,
//! which is visible in the canonical [`Display`](std::fmt::Display) dump
//! and matches the catalogues produced by GNU tooling.

use std::fmt;

use crate::error::Error;

/// Binary operators accepted in plural-form expressions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinOp {
	/// `a % b`
	Mod,
	/// `a == b`
	Eq,
	/// `a != b`
	NotEq,
	/// `a >= b`
	GreaterEq,
	/// `a > b`
	Greater,
	/// `a <= b`
	LessEq,
	/// `a < b`
	Less,
	/// `a && b`
	And,
	/// `a || b`
	Or,
}

impl BinOp {
	fn symbol(self) -> &'static str {
		match self {
			BinOp::Mod => "%",
			BinOp::Eq => "==",
			BinOp::NotEq => "!=",
			BinOp::GreaterEq => ">=",
			BinOp::Greater => ">",
			BinOp::LessEq => "<=",
			BinOp::Less => "<",
			BinOp::And => "&&",
			BinOp::Or => "||",
		}
	}

	fn apply(self, a: u64, b: u64) -> u64 {
		match self {
			// real-world plural rules never divide by zero; evaluating
			// to 0 keeps the lookup path panic-free regardless
			BinOp::Mod => {
				if b == 0 {
					0
				} else {
					a % b
				}
			}
			BinOp::Eq => u64::from(a == b),
			BinOp::NotEq => u64::from(a != b),
			BinOp::GreaterEq => u64::from(a >= b),
			BinOp::Greater => u64::from(a > b),
			BinOp::LessEq => u64::from(a <= b),
			BinOp::Less => u64::from(a < b),
			BinOp::And => u64::from(a != 0 && b != 0),
			BinOp::Or => u64::from(a != 0 || b != 0),
		}
	}
}

/// Compiled plural-form expression.
///
/// A node owns its children; the tree is immutable once parsed and is
/// only ever traversed top-down.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PluralExpr {
	/// Decimal literal. The source text must fit 32 bits unsigned.
	Literal(u64),
	/// The free variable `n`.
	Variable,
	/// `a <op> b`.
	Binary(BinOp, Box<PluralExpr>, Box<PluralExpr>),
	/// `a ? b : c`.
	Ternary(Box<PluralExpr>, Box<PluralExpr>, Box<PluralExpr>),
}

impl PluralExpr {
	/// Evaluates the expression for the given `n`.
	///
	/// Comparison and logical operators yield 0 or 1. `&&` and `||`
	/// evaluate both operands; since evaluation has no side effects the
	/// result is identical to short-circuit semantics. The ternary
	/// evaluates its condition and then exactly one branch.
	pub fn eval(&self, n: u64) -> u64 {
		match self {
			PluralExpr::Literal(value) => *value,
			PluralExpr::Variable => n,
			PluralExpr::Binary(op, a, b) => {
				let a = a.eval(n);
				let b = b.eval(n);
				op.apply(a, b)
			}
			PluralExpr::Ternary(cond, then, other) => {
				if cond.eval(n) != 0 {
					then.eval(n)
				} else {
					other.eval(n)
				}
			}
		}
	}
}

/// Renders the fully parenthesized canonical form, e.g.
/// `(((n%10)==1)&&((n%100)!=11))`. Re-parsing the dump yields a
/// structurally equal tree.
impl fmt::Display for PluralExpr {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			PluralExpr::Literal(value) => write!(f, "{value}"),
			PluralExpr::Variable => f.write_str("n"),
			PluralExpr::Binary(op, a, b) => write!(f, "({a}{}{b})", op.symbol()),
			PluralExpr::Ternary(cond, then, other) => write!(f, "({cond}?{then}:{other})"),
		}
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TokenKind {
	Literal(u64),
	Variable,
	Op(BinOp),
	Question,
	Colon,
	BrOpen,
	BrClose,
	Eof,
}

#[derive(Debug, Clone, Copy)]
struct Token {
	kind: TokenKind,
	/// 0-based byte offset into the source text.
	pos: usize,
}

fn tokenize(text: &str) -> Result<Vec<Token>, Error> {
	let mut tokens = Vec::new();
	let mut chars = text.char_indices().peekable();

	while let Some(&(pos, ch)) = chars.peek() {
		match ch {
			c if c.is_ascii_whitespace() => {
				chars.next();
			}
			'0'..='9' => {
				let mut end = pos;
				while let Some(&(p, c)) = chars.peek() {
					if !c.is_ascii_digit() {
						break;
					}
					end = p + 1;
					chars.next();
				}
				let digits = &text[pos..end];
				let value = digits.parse::<u32>().map_err(|_| Error::InvalidNumber {
					text: digits.to_string(),
					pos,
				})?;
				tokens.push(Token {
					kind: TokenKind::Literal(u64::from(value)),
					pos,
				});
			}
			'n' => {
				chars.next();
				tokens.push(Token {
					kind: TokenKind::Variable,
					pos,
				});
			}
			'%' => {
				chars.next();
				tokens.push(Token {
					kind: TokenKind::Op(BinOp::Mod),
					pos,
				});
			}
			'(' => {
				chars.next();
				tokens.push(Token {
					kind: TokenKind::BrOpen,
					pos,
				});
			}
			')' => {
				chars.next();
				tokens.push(Token {
					kind: TokenKind::BrClose,
					pos,
				});
			}
			'?' => {
				chars.next();
				tokens.push(Token {
					kind: TokenKind::Question,
					pos,
				});
			}
			':' => {
				chars.next();
				tokens.push(Token {
					kind: TokenKind::Colon,
					pos,
				});
			}
			'=' | '!' | '<' | '>' | '&' | '|' => {
				chars.next();
				let next = chars.peek().map(|&(_, c)| c);
				// maximal munch: two-character operators win
				let kind = match (ch, next) {
					('=', Some('=')) => {
						chars.next();
						TokenKind::Op(BinOp::Eq)
					}
					('!', Some('=')) => {
						chars.next();
						TokenKind::Op(BinOp::NotEq)
					}
					('>', Some('=')) => {
						chars.next();
						TokenKind::Op(BinOp::GreaterEq)
					}
					('<', Some('=')) => {
						chars.next();
						TokenKind::Op(BinOp::LessEq)
					}
					('&', Some('&')) => {
						chars.next();
						TokenKind::Op(BinOp::And)
					}
					('|', Some('|')) => {
						chars.next();
						TokenKind::Op(BinOp::Or)
					}
					('>', _) => TokenKind::Op(BinOp::Greater),
					('<', _) => TokenKind::Op(BinOp::Less),
					_ => return Err(Error::UnexpectedCharacter { ch, pos }),
				};
				tokens.push(Token { kind, pos });
			}
			_ => return Err(Error::UnexpectedCharacter { ch, pos }),
		}
	}

	tokens.push(Token {
		kind: TokenKind::Eof,
		pos: text.len(),
	});
	Ok(tokens)
}

struct Parser {
	tokens: Vec<Token>,
	pos: usize,
}

impl Parser {
	fn peek(&self) -> Token {
		self.tokens[self.pos]
	}

	fn eat_op(&mut self, op: BinOp) -> bool {
		if self.peek().kind == TokenKind::Op(op) {
			self.pos += 1;
			true
		} else {
			false
		}
	}

	fn ternary(&mut self) -> Result<PluralExpr, Error> {
		let cond = self.or_expr()?;
		if self.peek().kind != TokenKind::Question {
			return Ok(cond);
		}
		self.pos += 1;
		// both branches are full ternaries, so `n?1?2:3:4` nests as
		// `n ? (1 ? 2 : 3) : 4`
		let then = self.ternary()?;
		let delim = self.peek();
		if delim.kind != TokenKind::Colon {
			return Err(Error::ExpectedTernaryDelimiter(delim.pos));
		}
		self.pos += 1;
		let other = self.ternary()?;
		Ok(PluralExpr::Ternary(
			Box::new(cond),
			Box::new(then),
			Box::new(other),
		))
	}

	fn or_expr(&mut self) -> Result<PluralExpr, Error> {
		let lhs = self.and_expr()?;
		if self.eat_op(BinOp::Or) {
			let rhs = self.or_expr()?;
			return Ok(PluralExpr::Binary(BinOp::Or, Box::new(lhs), Box::new(rhs)));
		}
		Ok(lhs)
	}

	fn and_expr(&mut self) -> Result<PluralExpr, Error> {
		let lhs = self.eq_expr()?;
		if self.eat_op(BinOp::And) {
			let rhs = self.and_expr()?;
			return Ok(PluralExpr::Binary(BinOp::And, Box::new(lhs), Box::new(rhs)));
		}
		Ok(lhs)
	}

	fn eq_expr(&mut self) -> Result<PluralExpr, Error> {
		let lhs = self.rel_expr()?;
		match self.peek().kind {
			TokenKind::Op(op @ (BinOp::Eq | BinOp::NotEq)) => {
				self.pos += 1;
				let rhs = self.eq_expr()?;
				Ok(PluralExpr::Binary(op, Box::new(lhs), Box::new(rhs)))
			}
			_ => Ok(lhs),
		}
	}

	fn rel_expr(&mut self) -> Result<PluralExpr, Error> {
		let lhs = self.mod_expr()?;
		match self.peek().kind {
			TokenKind::Op(
				op @ (BinOp::Greater | BinOp::GreaterEq | BinOp::Less | BinOp::LessEq),
			) => {
				self.pos += 1;
				let rhs = self.rel_expr()?;
				Ok(PluralExpr::Binary(op, Box::new(lhs), Box::new(rhs)))
			}
			_ => Ok(lhs),
		}
	}

	fn mod_expr(&mut self) -> Result<PluralExpr, Error> {
		let lhs = self.atom()?;
		if self.eat_op(BinOp::Mod) {
			let rhs = self.mod_expr()?;
			return Ok(PluralExpr::Binary(BinOp::Mod, Box::new(lhs), Box::new(rhs)));
		}
		Ok(lhs)
	}

	fn atom(&mut self) -> Result<PluralExpr, Error> {
		let token = self.peek();
		match token.kind {
			TokenKind::Literal(value) => {
				self.pos += 1;
				Ok(PluralExpr::Literal(value))
			}
			TokenKind::Variable => {
				self.pos += 1;
				Ok(PluralExpr::Variable)
			}
			TokenKind::BrOpen => {
				self.pos += 1;
				let inner = self.ternary()?;
				let close = self.peek();
				if close.kind != TokenKind::BrClose {
					return Err(Error::ExpectedClosingBracket(close.pos));
				}
				self.pos += 1;
				Ok(inner)
			}
			_ => Err(Error::ExpectedExpression(token.pos)),
		}
	}
}

/// Parses a gettext plural-form expression into an AST.
///
/// # Example
/// ```
/// use motext::parse_plural_rules;
///
/// let rule = parse_plural_rules("n != 1").unwrap();
/// assert_eq!(rule.to_string(), "(n!=1)");
/// assert_eq!(rule.eval(1), 0);
/// assert_eq!(rule.eval(5), 1);
/// ```
pub fn parse_plural_rules(text: &str) -> Result<PluralExpr, Error> {
	let tokens = tokenize(text)?;
	let mut parser = Parser { tokens, pos: 0 };
	let expr = parser.ternary()?;
	let trailing = parser.peek();
	if trailing.kind != TokenKind::Eof {
		return Err(Error::UnexpectedToken(trailing.pos));
	}
	Ok(expr)
}
