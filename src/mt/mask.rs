/// Placeholder masking for protecting interpolation syntax during machine translation
///
/// Translation backends happily translate, reorder or "fix" placeholder syntax:
/// `{{count}}` becomes `{{compte}}`, `%s` grows a space, `<b>` gets dropped.
/// Before a string is sent, every recognized placeholder is replaced by an
/// opaque token of the form `__PH{n}__` (zero-based, in order of appearance);
/// after translation the tokens are swapped back for the original text.
///
/// ```ignore
/// let set = PlaceholderSet::default();
/// let (masked, mapping) = set.mask("Hello {{name}}, you have %d <b>new</b> messages");
/// assert_eq!(masked, "Hello __PH0__, you have __PH1__ __PH2__new__PH3__ messages");
/// assert_eq!(unmask(&masked, &mapping), "Hello {{name}}, you have %d <b>new</b> messages");
/// ```
use crate::error::{MtError, MtResult};
use regex::Regex;
use std::borrow::Cow;
use std::str::FromStr;
use std::sync::LazyLock;

/// Token text as it may come back from a backend: case and inner spacing can drift
const TOKEN_PATTERN: &str = r"(?i:__\s*PH\s*(\d+)\s*__)";

static TOKEN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(TOKEN_PATTERN).expect("token pattern is valid"));

/// The synthetic token standing in for the `index`-th placeholder of a string
pub fn token(index: usize) -> String {
    format!("__PH{}__", index)
}

/// A family of placeholder syntax recognized by the masker
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaceholderFamily {
    /// `{{ name }}`
    DoubleBrace,
    /// `%(name)s`
    PrintfNamed,
    /// `%s`, `%d`, `%1$s`, `%.2f`, `%%`
    Printf,
    /// `{name}`
    SingleBrace,
    /// `:name`
    Colon,
    /// `<b>`, `</b>`, `<br/>`, `<a href="...">`
    Tag,
}

impl PlaceholderFamily {
    /// All built-in families, in matching priority order
    pub const ALL: [PlaceholderFamily; 6] = [
        PlaceholderFamily::DoubleBrace,
        PlaceholderFamily::PrintfNamed,
        PlaceholderFamily::Printf,
        PlaceholderFamily::SingleBrace,
        PlaceholderFamily::Colon,
        PlaceholderFamily::Tag,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            PlaceholderFamily::DoubleBrace => "double-brace",
            PlaceholderFamily::PrintfNamed => "printf-named",
            PlaceholderFamily::Printf => "printf",
            PlaceholderFamily::SingleBrace => "single-brace",
            PlaceholderFamily::Colon => "colon",
            PlaceholderFamily::Tag => "tag",
        }
    }

    fn pattern(&self) -> &'static str {
        match self {
            PlaceholderFamily::DoubleBrace => r"\{\{[^{}]*\}\}",
            PlaceholderFamily::PrintfNamed => {
                r"%\([A-Za-z_][A-Za-z0-9_]*\)[-#0 +]*\d*(?:\.\d+)?[sdifuxXoeEgGcr]"
            }
            PlaceholderFamily::Printf => r"%(?:\d+\$)?[-#0+]*\d*(?:\.\d+)?[sdifuxXoeEgGc@%]",
            PlaceholderFamily::SingleBrace => r"\{[^{}\s][^{}]*\}",
            PlaceholderFamily::Colon => r":[A-Za-z_][A-Za-z0-9_]*",
            PlaceholderFamily::Tag => r#"</?[A-Za-z][A-Za-z0-9-]*(?:\s+[^<>]*?)?\s*/?>"#,
        }
    }
}

impl FromStr for PlaceholderFamily {
    type Err = MtError;

    fn from_str(name: &str) -> MtResult<Self> {
        PlaceholderFamily::ALL
            .iter()
            .find(|family| family.name() == name)
            .copied()
            .ok_or_else(|| {
                MtError::Config(format!(
                    "Unknown placeholder family '{}' (expected one of: {})",
                    name,
                    PlaceholderFamily::ALL.map(|f| f.name()).join(", ")
                ))
            })
    }
}

/// Placeholders found in one string, indexed by their token number
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlaceholderMapping {
    originals: Vec<String>,
}

impl PlaceholderMapping {
    pub fn len(&self) -> usize {
        self.originals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.originals.is_empty()
    }

    /// Original text behind token number `index`
    pub fn original(&self, index: usize) -> Option<&str> {
        self.originals.get(index).map(String::as_str)
    }

    /// `(token, original)` pairs in match order
    pub fn iter(&self) -> impl Iterator<Item = (String, &str)> + '_ {
        self.originals
            .iter()
            .enumerate()
            .map(|(index, original)| (token(index), original.as_str()))
    }

    /// Originals that do not survive in `text` as often as they were masked
    pub fn missing_in(&self, text: &str) -> Vec<&str> {
        let mut missing: Vec<&str> = Vec::new();
        for original in &self.originals {
            if missing.contains(&original.as_str()) {
                continue;
            }
            let expected = self.originals.iter().filter(|o| *o == original).count();
            if text.matches(original.as_str()).count() < expected {
                missing.push(original);
            }
        }
        missing
    }
}

/// A compiled set of placeholder families
#[derive(Debug, Clone)]
pub struct PlaceholderSet {
    regex: Regex,
    families: Vec<PlaceholderFamily>,
    extra: Vec<String>,
}

impl Default for PlaceholderSet {
    fn default() -> Self {
        PlaceholderSet::new(&PlaceholderFamily::ALL, &[])
            .expect("built-in placeholder patterns are valid")
    }
}

impl PlaceholderSet {
    /// Build a set from built-in families plus extra user patterns
    ///
    /// Lookalikes of the synthetic token are always matched first, so a source
    /// string that happens to contain `__PH0__` is itself protected. Extra
    /// patterns take priority over the built-in families.
    pub fn new(families: &[PlaceholderFamily], extra: &[String]) -> MtResult<Self> {
        let mut alternatives = vec![TOKEN_PATTERN.to_string()];
        for pattern in extra {
            // Compile each one alone first so the error names the offending pattern
            Regex::new(pattern)?;
            alternatives.push(format!("(?:{})", pattern));
        }
        for family in families {
            alternatives.push(format!("(?:{})", family.pattern()));
        }

        Ok(PlaceholderSet {
            regex: Regex::new(&alternatives.join("|"))?,
            families: families.to_vec(),
            extra: extra.to_vec(),
        })
    }

    pub fn families(&self) -> &[PlaceholderFamily] {
        &self.families
    }

    pub fn extra_patterns(&self) -> &[String] {
        &self.extra
    }

    /// Replace every placeholder in `text`, left to right, with `__PH{n}__`
    pub fn mask(&self, text: &str) -> (String, PlaceholderMapping) {
        let mut mapping = PlaceholderMapping::default();
        let masked = self.regex.replace_all(text, |caps: &regex::Captures| {
            let index = mapping.originals.len();
            mapping.originals.push(caps[0].to_string());
            token(index)
        });
        (masked.into_owned(), mapping)
    }
}

/// Put the original placeholders back in place of their tokens
///
/// Runs in a single pass, so restored text is never re-scanned. Tokens with
/// no entry in `mapping` are left exactly as the backend returned them.
pub fn unmask(text: &str, mapping: &PlaceholderMapping) -> String {
    if mapping.is_empty() {
        return text.to_string();
    }
    let restored: Cow<'_, str> = TOKEN_RE.replace_all(text, |caps: &regex::Captures| {
        caps[1]
            .parse::<usize>()
            .ok()
            .and_then(|index| mapping.original(index))
            .map(str::to_string)
            .unwrap_or_else(|| caps[0].to_string())
    });
    restored.into_owned()
}
