use std::fmt;

use fitsio_pure::header::Card as RawCard;
use fitsio_pure::value::Value;

/// A typed FITS header value.
#[derive(Clone, Debug, PartialEq)]
pub enum HeaderValue {
    Str(String),
    Int(i64),
    Float(f64),
    Bool(bool),
}

impl HeaderValue {
    /// Numeric view of the value. Quoted strings holding a number are
    /// accepted since some writers quote numeric keywords.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            HeaderValue::Float(v) => Some(*v),
            HeaderValue::Int(v) => Some(*v as f64),
            HeaderValue::Str(s) => parse_float(s.trim()),
            HeaderValue::Bool(_) => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            HeaderValue::Int(v) => Some(*v),
            HeaderValue::Float(v) if v.fract() == 0.0 => Some(*v as i64),
            HeaderValue::Str(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            HeaderValue::Str(s) => Some(s),
            _ => None,
        }
    }
}

impl fmt::Display for HeaderValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HeaderValue::Str(s) => write!(f, "'{}'", s.replace('\'', "''")),
            HeaderValue::Int(v) => write!(f, "{v}"),
            HeaderValue::Float(v) => write!(f, "{v:E}"),
            HeaderValue::Bool(true) => write!(f, "T"),
            HeaderValue::Bool(false) => write!(f, "F"),
        }
    }
}

impl From<&str> for HeaderValue {
    fn from(s: &str) -> Self {
        HeaderValue::Str(s.to_string())
    }
}

impl From<String> for HeaderValue {
    fn from(s: String) -> Self {
        HeaderValue::Str(s)
    }
}

impl From<f64> for HeaderValue {
    fn from(v: f64) -> Self {
        HeaderValue::Float(v)
    }
}

impl From<i64> for HeaderValue {
    fn from(v: i64) -> Self {
        HeaderValue::Int(v)
    }
}

impl From<bool> for HeaderValue {
    fn from(v: bool) -> Self {
        HeaderValue::Bool(v)
    }
}

/// One 80-character header record.
#[derive(Clone, Debug, PartialEq)]
pub struct Card {
    pub keyword: String,
    pub value: Option<HeaderValue>,
    /// Free text of commentary cards, or the comment after `/`.
    pub text: Option<String>,
}

impl Card {
    pub fn is_commentary(&self) -> bool {
        matches!(self.keyword.as_str(), "HISTORY" | "COMMENT" | "")
    }
}

impl From<&RawCard> for Card {
    fn from(raw: &RawCard) -> Self {
        let value = raw.value.as_ref().and_then(|v| match v {
            Value::Logical(b) => Some(HeaderValue::Bool(*b)),
            Value::Integer(n) => Some(HeaderValue::Int(*n)),
            Value::Float(f) => Some(HeaderValue::Float(*f)),
            Value::String(s) => Some(HeaderValue::Str(s.clone())),
            // Complex values never describe a radio map.
            Value::ComplexInt(..) | Value::ComplexFloat(..) => None,
        });
        Card {
            keyword: raw.keyword_str().to_string(),
            value,
            text: raw.comment.clone(),
        }
    }
}

/// Ordered FITS header with case-insensitive keyword lookup.
///
/// Value keywords resolve to their first occurrence; `HISTORY` records are
/// kept in file order and exposed through [`FitsHeader::history`].
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FitsHeader {
    cards: Vec<Card>,
}

impl FitsHeader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Lookup view over the cards of a parsed HDU, `END` excluded.
    pub fn from_cards(raw: &[RawCard]) -> Self {
        Self {
            cards: raw
                .iter()
                .filter(|c| !c.is_end())
                .map(Card::from)
                .collect(),
        }
    }

    pub fn cards(&self) -> &[Card] {
        &self.cards
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    /// Raw value of a keyword. `None` covers both an absent keyword and
    /// a keyword whose value field is empty.
    pub fn get(&self, key: &str) -> Option<&HeaderValue> {
        self.cards
            .iter()
            .find(|c| !c.is_commentary() && c.keyword.eq_ignore_ascii_case(key))
            .and_then(|c| c.value.as_ref())
    }

    pub fn contains(&self, key: &str) -> bool {
        self.cards
            .iter()
            .any(|c| !c.is_commentary() && c.keyword.eq_ignore_ascii_case(key))
    }

    pub fn get_f64(&self, key: &str) -> Option<f64> {
        self.get(key).and_then(HeaderValue::as_f64)
    }

    pub fn get_i64(&self, key: &str) -> Option<i64> {
        self.get(key).and_then(HeaderValue::as_i64)
    }

    /// String value with trailing padding removed.
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(HeaderValue::as_str).map(str::trim_end)
    }

    pub fn history(&self) -> impl Iterator<Item = &str> {
        self.cards
            .iter()
            .filter(|c| c.keyword == "HISTORY")
            .filter_map(|c| c.text.as_deref())
    }

    /// Set a keyword, replacing the first existing value card.
    pub fn set(&mut self, key: &str, value: impl Into<HeaderValue>) {
        let key = key.to_ascii_uppercase();
        let value = Some(value.into());
        match self
            .cards
            .iter_mut()
            .find(|c| !c.is_commentary() && c.keyword == key)
        {
            Some(card) => card.value = value,
            None => self.cards.push(Card {
                keyword: key,
                value,
                text: None,
            }),
        }
    }

    pub fn push_history(&mut self, text: &str) {
        self.cards.push(Card {
            keyword: "HISTORY".into(),
            value: None,
            text: Some(text.to_string()),
        });
    }

}

/// Parse a FITS real, accepting Fortran `D` exponents.
fn parse_float(s: &str) -> Option<f64> {
    s.parse::<f64>()
        .ok()
        .or_else(|| s.replace(['D', 'd'], "E").parse::<f64>().ok())
}
