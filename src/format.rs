//! printf-style formatting with locale-aware numbers.
//!
//! Supported verbs: `%d %s %v %f %F %t %%`, with the flags `-+0`, a width, a
//! precision and an explicit argument index (`%[2]d`). A verb without a matching
//! argument renders as `%!d(MISSING)`, a verb of the wrong type as
//! `%!d(string=x)` and a trailing `%` as `%!(NOVERB)`. Surplus arguments are
//! ignored.

use std::fmt;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::locale::LocaleTag;

static VERB_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"%(?:\[(\d+)\])?([-+0]*)(\d+)?(?:\.(\d+))?([a-zA-Z%]|$)").unwrap()
});

/// A run-time argument substituted into a message.
#[derive(Debug, Clone, PartialEq)]
pub enum Arg {
    Int(i64),
    UInt(u64),
    Float(f64),
    Str(String),
    Bool(bool),
}

impl Arg {
    /// True for the variants plural selection can run on.
    pub fn is_numeric(&self) -> bool {
        matches!(self, Arg::Int(_) | Arg::UInt(_) | Arg::Float(_))
    }

    fn type_name(&self) -> &'static str {
        match self {
            Arg::Int(_) => "int",
            Arg::UInt(_) => "uint",
            Arg::Float(_) => "float64",
            Arg::Str(_) => "string",
            Arg::Bool(_) => "bool",
        }
    }
}

impl fmt::Display for Arg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Arg::Int(v) => v.fmt(f),
            Arg::UInt(v) => v.fmt(f),
            Arg::Float(v) => v.fmt(f),
            Arg::Str(v) => f.write_str(v),
            Arg::Bool(v) => v.fmt(f),
        }
    }
}

macro_rules! arg_from {
    ($variant:ident: $($ty:ty),*) => {
        $(impl From<$ty> for Arg {
            fn from(value: $ty) -> Self {
                Arg::$variant(value.into())
            }
        })*
    };
}

arg_from!(Int: i8, i16, i32, i64);
arg_from!(UInt: u8, u16, u32, u64);
arg_from!(Float: f32, f64);
arg_from!(Str: String, &str, &String);
arg_from!(Bool: bool);

impl From<usize> for Arg {
    fn from(value: usize) -> Self {
        Arg::UInt(value as u64)
    }
}

impl From<isize> for Arg {
    fn from(value: isize) -> Self {
        Arg::Int(value as i64)
    }
}

// ---------- Numbers ----------

const NBSP: char = '\u{a0}';

/// `(languages, decimal separator, group separator)`. Other languages use `.`
/// and `,`.
const SEPARATORS: &[(&[&str], char, char)] = &[
    (
        &[
            "be", "bg", "cs", "et", "fi", "fr", "hu", "hy", "ka", "kk", "ky", "lt", "lv", "nb",
            "nn", "no", "pl", "ru", "sk", "sq", "sv", "uk", "uz",
        ],
        ',',
        NBSP,
    ),
    (
        &[
            "az", "bs", "ca", "da", "de", "el", "es", "eu", "gl", "hr", "id", "is", "it", "mk",
            "nl", "pt", "ro", "sl", "sr", "tr", "vi",
        ],
        ',',
        '.',
    ),
];

/// Per-locale separators for the integer groups and the fraction.
///
/// ```rust
/// use intl_catalog::{sprint, Arg, LocaleTag, NumberFormat};
///
/// let ru = NumberFormat::for_locale(&LocaleTag::parse("ru").unwrap());
/// assert_eq!(sprint(&Arg::from(1234567.5), ru), "1\u{a0}234\u{a0}567,5");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NumberFormat {
    decimal: char,
    group: char,
}

impl NumberFormat {
    /// Separators for the language of `locale`.
    pub fn for_locale(locale: &LocaleTag) -> Self {
        SEPARATORS
            .iter()
            .find(|(languages, _, _)| languages.contains(&locale.language()))
            .map_or_else(Self::default, |&(_, decimal, group)| Self { decimal, group })
    }

    pub fn decimal_separator(&self) -> char {
        self.decimal
    }

    pub fn group_separator(&self) -> char {
        self.group
    }

    /// Rewrites plain `1234.5`-style digits with this locale's separators.
    fn localize(&self, number: &str) -> String {
        match number.split_once('.') {
            Some((int, frac)) => format!("{}{}{frac}", self.group_digits(int), self.decimal),
            None => self.group_digits(number),
        }
    }

    fn group_digits(&self, digits: &str) -> String {
        let len = digits.chars().count();
        let mut out = String::with_capacity(digits.len() + len / 3 * self.group.len_utf8());
        for (i, c) in digits.chars().enumerate() {
            if i > 0 && (len - i) % 3 == 0 {
                out.push(self.group);
            }
            out.push(c);
        }
        out
    }
}

impl Default for NumberFormat {
    fn default() -> Self {
        Self {
            decimal: '.',
            group: ',',
        }
    }
}

// ---------- Formatting ----------

/// Formats `template`, consuming `args` positionally.
pub fn sprintf(template: &str, args: &[Arg], numbers: NumberFormat) -> String {
    let mut out = String::with_capacity(template.len());
    let mut last = 0;
    let mut next = 0usize;

    for caps in VERB_RE.captures_iter(template) {
        let Some(whole) = caps.get(0) else { continue };
        out.push_str(&template[last..whole.start()]);
        last = whole.end();

        let Some(verb) = caps.get(5).and_then(|m| m.as_str().chars().next()) else {
            out.push_str("%!(NOVERB)");
            continue;
        };
        if verb == '%' {
            out.push('%');
            continue;
        }
        if let Some(index) = caps.get(1).and_then(|m| m.as_str().parse::<usize>().ok()) {
            next = index.saturating_sub(1);
        }

        let spec = Spec {
            flags: caps.get(2).map_or("", |m| m.as_str()),
            width: caps.get(3).and_then(|m| m.as_str().parse().ok()),
            precision: caps.get(4).and_then(|m| m.as_str().parse().ok()),
            verb,
        };
        match args.get(next) {
            Some(arg) => out.push_str(&spec.render(arg, numbers)),
            None => out.push_str(&format!("%!{verb}(MISSING)")),
        }
        next += 1;
    }

    out.push_str(&template[last..]);
    out
}

/// Formats a single value the way `%v` would.
pub fn sprint(arg: &Arg, numbers: NumberFormat) -> String {
    Spec {
        flags: "",
        width: None,
        precision: None,
        verb: 'v',
    }
    .render(arg, numbers)
}

struct Spec<'a> {
    flags: &'a str,
    width: Option<usize>,
    precision: Option<usize>,
    verb: char,
}

impl Spec<'_> {
    fn render(&self, arg: &Arg, numbers: NumberFormat) -> String {
        match (self.verb, arg) {
            ('d' | 'v', Arg::Int(v)) => {
                self.number(*v < 0, numbers.localize(&v.unsigned_abs().to_string()))
            }
            ('d' | 'v', Arg::UInt(v)) => self.number(false, numbers.localize(&v.to_string())),
            ('v', Arg::Float(v)) => {
                self.number(v.is_sign_negative(), numbers.localize(&v.abs().to_string()))
            }
            ('f' | 'F', Arg::Float(v)) => {
                let digits = format!("{:.*}", self.precision.unwrap_or(6), v.abs());
                self.number(v.is_sign_negative(), numbers.localize(&digits))
            }
            ('s' | 'v', Arg::Str(v)) => {
                let text = match self.precision {
                    Some(p) => v.chars().take(p).collect(),
                    None => v.clone(),
                };
                self.pad("", text, false)
            }
            ('t' | 'v', Arg::Bool(v)) => self.pad("", v.to_string(), false),
            (verb, arg) => format!("%!{verb}({}={arg})", arg.type_name()),
        }
    }

    fn number(&self, negative: bool, digits: String) -> String {
        let sign = match (negative, self.flags.contains('+')) {
            (true, _) => "-",
            (false, true) => "+",
            (false, false) => "",
        };
        self.pad(sign, digits, true)
    }

    fn pad(&self, sign: &str, body: String, numeric: bool) -> String {
        let len = sign.chars().count() + body.chars().count();
        let Some(fill) = self.width.and_then(|w| w.checked_sub(len)).filter(|f| *f > 0) else {
            return format!("{sign}{body}");
        };
        if self.flags.contains('-') {
            format!("{sign}{body}{}", " ".repeat(fill))
        } else if numeric && self.flags.contains('0') {
            format!("{sign}{}{body}", "0".repeat(fill))
        } else {
            format!("{}{sign}{body}", " ".repeat(fill))
        }
    }
}
