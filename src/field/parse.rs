//! Field-name grammar.
//!
//! A requested field is one of:
//!
//! ```text
//! field     := column                      (exact schema key)
//!            | increment field             (longest increment prefix wins)
//!            | composite                   (named ratio of two fields)
//! increment := "incremento_relativo_percentuale_" | "incremento_relativo_" | "incremento_"
//!            | "relative_percentage_increase_"   | "relative_increase_"   | "increase_"
//! ```
//!
//! Names are tokenized on `_`; prefixes are matched on whole tokens, so a
//! column merely containing a prefix word is never mistaken for an increment.

use crate::domain::Source;
use crate::error::LoadError;
use crate::schema::ColumnSchema;

/// Parsed form of a requested field.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldExpr {
    /// Direct column lookup.
    Literal(String),
    /// `d[i] = v[i] - v[i-1]`
    AbsoluteIncrement(Box<FieldExpr>),
    /// `d[i] = (v[i] - v[i-1]) / v[i-1]`
    RelativeIncrement(Box<FieldExpr>),
    /// `RelativeIncrement` scaled by 100.
    PercentageRelativeIncrement(Box<FieldExpr>),
    /// `r[i] = scale * num[i] / den[i]`
    Ratio {
        numerator: Box<FieldExpr>,
        denominator: Box<FieldExpr>,
        scale: f64,
    },
}

impl std::fmt::Display for FieldExpr {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FieldExpr::Literal(name) => f.write_str(name),
            FieldExpr::AbsoluteIncrement(inner) => write!(f, "increment({inner})"),
            FieldExpr::RelativeIncrement(inner) => write!(f, "relative_increment({inner})"),
            FieldExpr::PercentageRelativeIncrement(inner) => write!(f, "percentage_increment({inner})"),
            FieldExpr::Ratio {
                numerator,
                denominator,
                scale,
            } => write!(f, "{scale} * {numerator} / {denominator}"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IncrementKind {
    Absolute,
    Relative,
    Percentage,
}

/// A named ratio of two fields.
#[derive(Debug, Clone, Copy)]
pub struct Composite {
    pub name: &'static str,
    pub numerator: &'static str,
    pub denominator: &'static str,
    pub scale: f64,
}

/// Derived-metric words of one data source.
///
/// Increment prefixes are listed longest first; the parser takes the first
/// one that matches and never backtracks to a shorter one.
#[derive(Debug)]
pub struct Vocabulary {
    pub increments: &'static [(&'static [&'static str], IncrementKind)],
    pub composites: &'static [Composite],
}

pub static ITALIAN: Vocabulary = Vocabulary {
    increments: &[
        (&["incremento", "relativo", "percentuale"], IncrementKind::Percentage),
        (&["incremento", "relativo"], IncrementKind::Relative),
        (&["incremento"], IncrementKind::Absolute),
    ],
    composites: &[
        Composite {
            name: "frazione_tamponi_positivi",
            numerator: "totale_casi",
            denominator: "tamponi",
            scale: 1.0,
        },
        Composite {
            name: "percentuale_tamponi_positivi",
            numerator: "totale_casi",
            denominator: "tamponi",
            scale: 100.0,
        },
        Composite {
            name: "frazione_nuovi_tamponi_positivi",
            numerator: "incremento_totale_casi",
            denominator: "incremento_tamponi",
            scale: 1.0,
        },
        Composite {
            name: "percentuale_nuovi_tamponi_positivi",
            numerator: "incremento_totale_casi",
            denominator: "incremento_tamponi",
            scale: 100.0,
        },
    ],
};

pub static ENGLISH: Vocabulary = Vocabulary {
    increments: &[
        (&["relative", "percentage", "increase"], IncrementKind::Percentage),
        (&["relative", "increase"], IncrementKind::Relative),
        (&["increase"], IncrementKind::Absolute),
    ],
    composites: &[],
};

impl Vocabulary {
    pub fn for_source(source: Source) -> &'static Vocabulary {
        match source {
            Source::Italy => &ITALIAN,
            Source::World => &ENGLISH,
        }
    }
}

/// Parse a requested field name against a schema.
///
/// Fails with `FieldName` naming the whole request when any part of it is not
/// understood.
pub fn parse_field(raw: &str, schema: &ColumnSchema, vocab: &Vocabulary) -> Result<FieldExpr, LoadError> {
    let tokens = tokenize(raw);
    let parser = Parser { schema, vocab };
    parser
        .parse(&tokens)
        .ok_or_else(|| LoadError::FieldName(raw.to_string()))
}

pub fn tokenize(raw: &str) -> Vec<&str> {
    raw.split('_').collect()
}

struct Parser<'a> {
    schema: &'a ColumnSchema,
    vocab: &'a Vocabulary,
}

impl Parser<'_> {
    fn parse(&self, tokens: &[&str]) -> Option<FieldExpr> {
        let joined = tokens.join("_");
        if self.schema.contains(&joined) {
            return Some(FieldExpr::Literal(joined));
        }

        if let Some((prefix, kind)) = self
            .vocab
            .increments
            .iter()
            .find(|(prefix, _)| tokens.len() > prefix.len() && tokens.starts_with(prefix))
        {
            let inner = self.parse(&tokens[prefix.len()..])?;
            if !self.is_numeric(&inner) {
                return None;
            }
            let inner = Box::new(inner);
            return Some(match kind {
                IncrementKind::Absolute => FieldExpr::AbsoluteIncrement(inner),
                IncrementKind::Relative => FieldExpr::RelativeIncrement(inner),
                IncrementKind::Percentage => FieldExpr::PercentageRelativeIncrement(inner),
            });
        }

        let composite = self.vocab.composites.iter().find(|c| c.name == joined)?;
        let numerator = self.parse(&tokenize(composite.numerator))?;
        let denominator = self.parse(&tokenize(composite.denominator))?;
        if !(self.is_numeric(&numerator) && self.is_numeric(&denominator)) {
            return None;
        }
        Some(FieldExpr::Ratio {
            numerator: Box::new(numerator),
            denominator: Box::new(denominator),
            scale: composite.scale,
        })
    }

    fn is_numeric(&self, expr: &FieldExpr) -> bool {
        match expr {
            FieldExpr::Literal(name) => self.schema.is_numeric_operand(name),
            _ => true,
        }
    }
}
