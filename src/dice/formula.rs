//! Dice formula parsing.
//!
//! Accepts the notation used by effect formulas: `NdM`, `dM`, integer
//! constants and `@key` roll-data references, joined by `+`/`-`.
//!
//! ```
//! use ability_effects::dice::{DiceFormula, Term};
//!
//! let formula = DiceFormula::parse("3d8 + @key - 2").unwrap();
//! assert_eq!(formula.terms().len(), 3);
//! assert_eq!(formula.terms()[0].term, Term::Dice { count: 3, faces: 8 });
//! ```

use rustc_hash::FxHashMap;
use smallvec::SmallVec;

/// Errors raised while parsing a formula.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum FormulaError {
    #[error("formula is empty")]
    Empty,

    #[error("unexpected `{found}` at position {position} in `{formula}`")]
    Unexpected {
        formula: String,
        position: usize,
        found: char,
    },

    #[error("formula `{0}` ends with an operator")]
    TrailingOperator(String),

    #[error("dice must have at least one face in `{0}`")]
    ZeroFaces(String),

    #[error("number out of range in `{0}`")]
    Overflow(String),
}

/// One operand of a formula.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Term {
    /// `count` dice with `faces` sides.
    Dice { count: u32, faces: u32 },
    /// A flat number.
    Constant(i64),
    /// A roll-data reference, without the leading `@`.
    Reference(String),
}

/// A term with its sign.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SignedTerm {
    pub negative: bool,
    pub term: Term,
}

/// A parsed dice formula.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DiceFormula {
    source: String,
    terms: SmallVec<[SignedTerm; 4]>,
}

impl DiceFormula {
    /// Parse a formula string.
    pub fn parse(source: &str) -> Result<Self, FormulaError> {
        let chars: Vec<char> = source.chars().collect();
        let mut pos = 0;
        let mut terms = SmallVec::new();
        let mut negative = false;
        let mut expect_term = true;

        skip_ws(&chars, &mut pos);
        if pos == chars.len() {
            return Err(FormulaError::Empty);
        }

        while pos < chars.len() {
            let c = chars[pos];
            if expect_term {
                if c == '+' || c == '-' {
                    // Leading sign or sign following an operator.
                    negative ^= c == '-';
                    pos += 1;
                } else {
                    let term = parse_term(source, &chars, &mut pos)?;
                    terms.push(SignedTerm { negative, term });
                    negative = false;
                    expect_term = false;
                }
            } else if c == '+' || c == '-' {
                negative = c == '-';
                pos += 1;
                expect_term = true;
            } else {
                return Err(FormulaError::Unexpected {
                    formula: source.to_string(),
                    position: pos,
                    found: c,
                });
            }
            skip_ws(&chars, &mut pos);
        }

        if expect_term {
            return Err(FormulaError::TrailingOperator(source.to_string()));
        }

        Ok(Self {
            source: source.to_string(),
            terms,
        })
    }

    /// The text this formula was parsed from.
    #[must_use]
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Signed terms in order.
    #[must_use]
    pub fn terms(&self) -> &[SignedTerm] {
        &self.terms
    }

    /// Replace `@key` references with constants from roll data.
    ///
    /// Unknown keys resolve to 0.
    #[must_use]
    pub fn resolve(&self, roll_data: &FxHashMap<String, i64>) -> Self {
        let terms = self
            .terms
            .iter()
            .map(|signed| match &signed.term {
                Term::Reference(key) => {
                    let value = roll_data.get(key).copied().unwrap_or_else(|| {
                        tracing::debug!(key = %key, formula = %self.source, "unknown roll data reference");
                        0
                    });
                    SignedTerm {
                        negative: signed.negative,
                        term: Term::Constant(value),
                    }
                }
                _ => signed.clone(),
            })
            .collect();

        Self {
            source: self.source.clone(),
            terms,
        }
    }

    /// Index of the primary dice term: the first positive dice term.
    #[must_use]
    pub fn primary_term(&self) -> Option<usize> {
        self.terms
            .iter()
            .position(|t| !t.negative && matches!(t.term, Term::Dice { count, .. } if count > 0))
    }
}

impl std::fmt::Display for DiceFormula {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for (i, signed) in self.terms.iter().enumerate() {
            match (i, signed.negative) {
                (0, true) => f.write_str("-")?,
                (0, false) => {}
                (_, true) => f.write_str(" - ")?,
                (_, false) => f.write_str(" + ")?,
            }
            match &signed.term {
                Term::Dice { count, faces } => write!(f, "{count}d{faces}")?,
                Term::Constant(value) => write!(f, "{value}")?,
                Term::Reference(key) => write!(f, "@{key}")?,
            }
        }
        Ok(())
    }
}

fn skip_ws(chars: &[char], pos: &mut usize) {
    while *pos < chars.len() && chars[*pos].is_whitespace() {
        *pos += 1;
    }
}

fn read_number(source: &str, chars: &[char], pos: &mut usize) -> Result<Option<u64>, FormulaError> {
    let start = *pos;
    while *pos < chars.len() && chars[*pos].is_ascii_digit() {
        *pos += 1;
    }
    if start == *pos {
        return Ok(None);
    }
    let digits: String = chars[start..*pos].iter().collect();
    digits
        .parse::<u64>()
        .map(Some)
        .map_err(|_| FormulaError::Overflow(source.to_string()))
}

fn parse_term(source: &str, chars: &[char], pos: &mut usize) -> Result<Term, FormulaError> {
    if chars[*pos] == '@' {
        *pos += 1;
        let start = *pos;
        while *pos < chars.len() && (chars[*pos].is_ascii_alphanumeric() || matches!(chars[*pos], '_' | '.')) {
            *pos += 1;
        }
        if start == *pos {
            return Err(FormulaError::Unexpected {
                formula: source.to_string(),
                position: start.saturating_sub(1),
                found: '@',
            });
        }
        return Ok(Term::Reference(chars[start..*pos].iter().collect()));
    }

    let leading = read_number(source, chars, pos)?;
    if *pos < chars.len() && matches!(chars[*pos], 'd' | 'D') {
        *pos += 1;
        let faces = read_number(source, chars, pos)?.ok_or_else(|| FormulaError::Unexpected {
            formula: source.to_string(),
            position: *pos,
            found: chars.get(*pos).copied().unwrap_or(' '),
        })?;
        if faces == 0 {
            return Err(FormulaError::ZeroFaces(source.to_string()));
        }
        let count = leading.unwrap_or(1);
        let count = u32::try_from(count).map_err(|_| FormulaError::Overflow(source.to_string()))?;
        let faces = u32::try_from(faces).map_err(|_| FormulaError::Overflow(source.to_string()))?;
        return Ok(Term::Dice { count, faces });
    }

    match leading {
        Some(value) => i64::try_from(value)
            .map(Term::Constant)
            .map_err(|_| FormulaError::Overflow(source.to_string())),
        None => Err(FormulaError::Unexpected {
            formula: source.to_string(),
            position: *pos,
            found: chars[*pos],
        }),
    }
}
