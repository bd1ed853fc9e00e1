//! Plural rules: parsing selectors, compiling rules into ordered cases and
//! picking the case for a numeric argument.
//!
//! Grammatical categories come from CLDR cardinal rules via `intl_pluralrules`;
//! this module only decides which template wins.

use std::fmt;

use intl_pluralrules::{PluralCategory, PluralRuleType, PluralRules};
use tracing::debug;

use crate::error::I18nError;
use crate::format::Arg;
use crate::locale::LocaleTag;

/// A CLDR plural category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    Zero,
    One,
    Two,
    Few,
    Many,
    Other,
}

impl Category {
    /// Every category, in evaluation order.
    pub const ALL: [Category; 6] = [
        Category::Zero,
        Category::One,
        Category::Two,
        Category::Few,
        Category::Many,
        Category::Other,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Category::Zero => "zero",
            Category::One => "one",
            Category::Two => "two",
            Category::Few => "few",
            Category::Many => "many",
            Category::Other => "other",
        }
    }

    /// Parses the lowercase CLDR name.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.as_str() == name)
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<PluralCategory> for Category {
    fn from(category: PluralCategory) -> Self {
        match category {
            PluralCategory::ZERO => Category::Zero,
            PluralCategory::ONE => Category::One,
            PluralCategory::TWO => Category::Two,
            PluralCategory::FEW => Category::Few,
            PluralCategory::MANY => Category::Many,
            PluralCategory::OTHER => Category::Other,
        }
    }
}

/// How a plural case matches a numeric argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Selector {
    /// `=N`: the argument equals `N` exactly.
    Exact(i64),
    /// `<N`: the argument is strictly less than `N`.
    LessThan(i64),
    Category(Category),
}

impl Selector {
    /// Parses `zero`..`other`, `=N` or `<N`.
    pub fn parse(raw: &str) -> Result<Self, I18nError> {
        if let Some(category) = Category::from_name(raw) {
            return Ok(Selector::Category(category));
        }
        let numeric = |digits: &str| {
            digits.trim().parse::<i64>().map_err(|_| {
                I18nError::Parse(format!("invalid numeric plural selector '{raw}'"))
            })
        };
        if let Some(digits) = raw.strip_prefix('=') {
            return numeric(digits).map(Selector::Exact);
        }
        if let Some(digits) = raw.strip_prefix('<') {
            return numeric(digits).map(Selector::LessThan);
        }

        let hint = Category::ALL
            .into_iter()
            .find(|c| is_near_miss(raw, c.as_str()))
            .map(|c| format!(" (did you mean '{c}'?)"))
            .unwrap_or_default();
        Err(I18nError::Parse(format!("unknown plural selector '{raw}'{hint}")))
    }

    fn matches(&self, arg: &Arg, category: Category) -> bool {
        match self {
            Selector::Exact(n) => match arg {
                Arg::Int(v) => v == n,
                Arg::UInt(v) => i128::from(*v) == i128::from(*n),
                Arg::Float(v) => v.fract() == 0.0 && *v == *n as f64,
                _ => false,
            },
            Selector::LessThan(n) => match arg {
                Arg::Int(v) => v < n,
                Arg::UInt(v) => i128::from(*v) < i128::from(*n),
                Arg::Float(v) => *v < *n as f64,
                _ => false,
            },
            Selector::Category(Category::Other) => true,
            Selector::Category(c) => *c == category,
        }
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Selector::Exact(n) => write!(f, "={n}"),
            Selector::LessThan(n) => write!(f, "<{n}"),
            Selector::Category(c) => c.fmt(f),
        }
    }
}

// Same length with one substitution, or one transposition/insertion/deletion away.
fn is_near_miss(raw: &str, name: &str) -> bool {
    let a: Vec<char> = raw.to_lowercase().chars().collect();
    let b: Vec<char> = name.chars().collect();
    if a == b {
        return true;
    }
    match a.len() as isize - b.len() as isize {
        0 => {
            let diff: Vec<usize> = (0..a.len()).filter(|&i| a[i] != b[i]).collect();
            diff.len() == 1
                || (diff.len() == 2
                    && diff[1] == diff[0] + 1
                    && a[diff[0]] == b[diff[1]]
                    && a[diff[1]] == b[diff[0]])
        }
        1 => (0..a.len()).any(|i| a[..i] == b[..i] && a[i + 1..] == b[i..]),
        -1 => (0..b.len()).any(|i| b[..i] == a[..i] && b[i + 1..] == a[i..]),
        _ => false,
    }
}

/// A parsed plural rule set.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PluralRule {
    pub zero: Option<String>,
    pub one: Option<String>,
    pub two: Option<String>,
    pub few: Option<String>,
    pub many: Option<String>,
    pub other: String,
    /// `=N` and `<N` selectors.
    pub custom: Vec<(Selector, String)>,
}

impl PluralRule {
    /// Classifies each key of a decoded plural object.
    ///
    /// Fails on keys that are neither a category nor a numeric selector, and on a
    /// rule without `other`.
    pub fn from_entries<I>(entries: I) -> Result<Self, I18nError>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let mut rule = PluralRule::default();
        let mut other = None;
        for (key, template) in entries {
            match Selector::parse(&key)? {
                Selector::Category(Category::Zero) => rule.zero = Some(template),
                Selector::Category(Category::One) => rule.one = Some(template),
                Selector::Category(Category::Two) => rule.two = Some(template),
                Selector::Category(Category::Few) => rule.few = Some(template),
                Selector::Category(Category::Many) => rule.many = Some(template),
                Selector::Category(Category::Other) => other = Some(template),
                selector => rule.custom.push((selector, template)),
            }
        }
        rule.other = other
            .filter(|t| !t.is_empty())
            .ok_or_else(|| I18nError::Parse("plural rule must define 'other'".to_string()))?;
        Ok(rule)
    }

    fn category(&self, category: Category) -> Option<&str> {
        match category {
            Category::Zero => self.zero.as_deref(),
            Category::One => self.one.as_deref(),
            Category::Two => self.two.as_deref(),
            Category::Few => self.few.as_deref(),
            Category::Many => self.many.as_deref(),
            Category::Other => Some(&self.other),
        }
    }

    /// Orders the cases for evaluation: `=N` ascending, `<N` ascending, then the
    /// named categories from `zero` to `other`. Empty templates are dropped.
    pub fn compile(&self) -> CompiledPlural {
        let mut custom: Vec<(Selector, String)> = self
            .custom
            .iter()
            .filter(|(_, template)| !template.is_empty())
            .cloned()
            .collect();
        custom.sort_by_key(|(selector, _)| match selector {
            Selector::Exact(n) => (0, *n),
            Selector::LessThan(n) => (1, *n),
            Selector::Category(_) => (2, 0),
        });

        let mut cases = custom;
        for category in Category::ALL {
            if let Some(template) = self.category(category).filter(|t| !t.is_empty()) {
                cases.push((Selector::Category(category), template.to_string()));
            }
        }

        let (placeholders, verb) = placeholders(&self.other);
        CompiledPlural {
            cases,
            placeholders,
            verb,
        }
    }
}

/// Counts the `%` verbs of `template` and returns the first verb character.
///
/// `%%` is a literal percent sign and is not counted.
pub fn placeholders(template: &str) -> (usize, Option<char>) {
    let mut count = 0;
    let mut verb = None;
    let mut chars = template.chars();
    while let Some(c) = chars.next() {
        if c != '%' {
            continue;
        }
        match chars.next() {
            Some('%') => {}
            next => {
                count += 1;
                if verb.is_none() {
                    verb = next;
                }
            }
        }
    }
    (count, verb)
}

/// A plural rule ready for selection.
#[derive(Debug, Clone, PartialEq)]
pub struct CompiledPlural {
    cases: Vec<(Selector, String)>,
    placeholders: usize,
    verb: Option<char>,
}

impl CompiledPlural {
    /// The cases in evaluation order.
    pub fn cases(&self) -> &[(Selector, String)] {
        &self.cases
    }

    /// Number of verbs in the `other` template and the first verb.
    pub fn placeholders(&self) -> (usize, Option<char>) {
        (self.placeholders, self.verb)
    }

    /// The argument plural selection runs on: the first numeric one.
    ///
    /// An integer verb (`%d`) selects on the integer part of a float.
    pub fn operand(&self, args: &[Arg]) -> Option<Arg> {
        let arg = args.iter().find(|a| a.is_numeric())?;
        Some(match (self.verb, arg) {
            (Some('d'), Arg::Float(v)) => Arg::Int(v.trunc() as i64),
            _ => arg.clone(),
        })
    }

    /// Picks the template for `operand`, falling back to `other`.
    pub fn select(&self, operand: &Arg, category: Category) -> &str {
        self.cases
            .iter()
            .find(|(selector, _)| selector.matches(operand, category))
            .map_or_else(|| self.other(), |(_, template)| template.as_str())
    }

    /// The fallback template.
    pub fn other(&self) -> &str {
        self.cases
            .iter()
            .rev()
            .find(|(selector, _)| *selector == Selector::Category(Category::Other))
            .map_or("", |(_, template)| template.as_str())
    }
}

/// CLDR cardinal classification for one locale.
pub struct PluralClassifier {
    rules: Option<PluralRules>,
}

impl PluralClassifier {
    /// Looks up rules for the tag, then for its base language. Locales without
    /// CLDR data classify every number as `other`.
    pub fn for_locale(locale: &LocaleTag) -> Self {
        let rules = [locale.clone(), locale.base()].into_iter().find_map(|tag| {
            PluralRules::create(tag.as_langid().clone(), PluralRuleType::CARDINAL).ok()
        });
        if rules.is_none() {
            debug!(%locale, "no plural rules for locale, every number is 'other'");
        }
        Self { rules }
    }

    /// CLDR category of a numeric operand; non-numeric operands are `other`.
    pub fn category(&self, operand: &Arg) -> Category {
        let Some(rules) = &self.rules else {
            return Category::Other;
        };
        let selected = match operand {
            Arg::Int(v) => rules.select(*v),
            Arg::UInt(v) => rules.select(*v),
            Arg::Float(v) => rules.select(*v),
            _ => return Category::Other,
        };
        selected.map(Category::from).unwrap_or(Category::Other)
    }
}

impl fmt::Debug for PluralClassifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PluralClassifier")
            .field("has_rules", &self.rules.is_some())
            .finish()
    }
}
