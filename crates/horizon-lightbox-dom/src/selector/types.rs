//! Selector type definitions.

use std::fmt;

/// A comma-separated list of selectors (e.g., `"img.zoomable, svg[data-zoom]"`).
///
/// A node matches the list when it matches any member.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SelectorList {
    /// The selectors in source order.
    pub selectors: Vec<Selector>,
}

impl SelectorList {
    /// Wrap a single selector.
    pub fn single(selector: Selector) -> Self {
        Self {
            selectors: vec![selector],
        }
    }
}

impl fmt::Display for SelectorList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, selector) in self.selectors.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", selector)?;
        }
        Ok(())
    }
}

/// A complex selector (e.g., `"article > figure img.zoomable"`).
///
/// A selector consists of one or more compound parts connected by combinators.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Selector {
    /// Chain of compound parts, leftmost first.
    pub parts: Vec<SelectorPart>,
    /// Combinators between parts (length = parts.len() - 1).
    /// `combinators[i]` joins `parts[i]` and `parts[i + 1]`.
    pub combinators: Vec<Combinator>,
}

impl Selector {
    /// Create a simple type selector.
    pub fn type_selector(tag: impl Into<String>) -> Self {
        Self::from_part(SelectorPart::type_only(tag))
    }

    /// Create a class selector.
    pub fn class(class_name: impl Into<String>) -> Self {
        Self::from_part(SelectorPart::class_only(class_name))
    }

    /// Create an ID selector.
    pub fn id(id: impl Into<String>) -> Self {
        Self::from_part(SelectorPart::id_only(id))
    }

    /// Create a selector from a single compound part.
    pub fn from_part(part: SelectorPart) -> Self {
        Self {
            parts: vec![part],
            combinators: vec![],
        }
    }

    /// Add a descendant selector part.
    pub fn descendant(self, part: SelectorPart) -> Self {
        self.combine(Combinator::Descendant, part)
    }

    /// Add a child selector part.
    pub fn child(self, part: SelectorPart) -> Self {
        self.combine(Combinator::Child, part)
    }

    fn combine(mut self, combinator: Combinator, part: SelectorPart) -> Self {
        if !self.parts.is_empty() {
            self.combinators.push(combinator);
        }
        self.parts.push(part);
        self
    }

    /// Get the rightmost (subject) selector part.
    pub fn subject(&self) -> Option<&SelectorPart> {
        self.parts.last()
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, part) in self.parts.iter().enumerate() {
            if i > 0 {
                match &self.combinators[i - 1] {
                    Combinator::Descendant => write!(f, " ")?,
                    Combinator::Child => write!(f, " > ")?,
                    Combinator::AdjacentSibling => write!(f, " + ")?,
                    Combinator::GeneralSibling => write!(f, " ~ ")?,
                }
            }
            write!(f, "{}", part)?;
        }
        Ok(())
    }
}

/// A compound selector (e.g., `"img.zoomable[data-src]:first-child"`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct SelectorPart {
    /// Type selector (tag name or universal).
    pub type_selector: Option<TypeSelector>,
    /// ID selector (#id).
    pub id: Option<String>,
    /// Class selectors (.class).
    pub classes: Vec<String>,
    /// Attribute selectors ([name], [name=value], ...).
    pub attributes: Vec<AttributeSelector>,
    /// Pseudo-class selectors (:first-child, :not(...), ...).
    pub pseudo_classes: Vec<PseudoClass>,
}

impl SelectorPart {
    /// Create a new empty selector part.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a type-only selector.
    pub fn type_only(tag: impl Into<String>) -> Self {
        Self {
            type_selector: Some(TypeSelector::Type(tag.into())),
            ..Default::default()
        }
    }

    /// Create a class-only selector.
    pub fn class_only(class_name: impl Into<String>) -> Self {
        Self {
            classes: vec![class_name.into()],
            ..Default::default()
        }
    }

    /// Create an ID-only selector.
    pub fn id_only(id: impl Into<String>) -> Self {
        Self {
            id: Some(id.into()),
            ..Default::default()
        }
    }

    /// Add a class selector.
    pub fn with_class(mut self, class: impl Into<String>) -> Self {
        self.classes.push(class.into());
        self
    }

    /// Add an attribute selector.
    pub fn with_attribute(mut self, attribute: AttributeSelector) -> Self {
        self.attributes.push(attribute);
        self
    }

    /// Add a pseudo-class selector.
    pub fn with_pseudo(mut self, pseudo: PseudoClass) -> Self {
        self.pseudo_classes.push(pseudo);
        self
    }

    /// Check if the part has no constraints at all.
    pub fn is_empty(&self) -> bool {
        self.type_selector.is_none()
            && self.id.is_none()
            && self.classes.is_empty()
            && self.attributes.is_empty()
            && self.pseudo_classes.is_empty()
    }
}

impl fmt::Display for SelectorPart {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.type_selector {
            Some(TypeSelector::Universal) => write!(f, "*")?,
            Some(TypeSelector::Type(t)) => write!(f, "{}", t)?,
            None => {}
        }

        if let Some(id) = &self.id {
            write!(f, "#{}", id)?;
        }

        for class in &self.classes {
            write!(f, ".{}", class)?;
        }

        for attribute in &self.attributes {
            write!(f, "{}", attribute)?;
        }

        for pseudo in &self.pseudo_classes {
            write!(f, ":{}", pseudo)?;
        }

        Ok(())
    }
}

/// Type selector - matches the element's tag name.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TypeSelector {
    /// Universal selector (*) - matches any element.
    Universal,
    /// Named tag (e.g., "img", "svg"). Compared case-insensitively.
    Type(String),
}

/// Combinator between selector parts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Combinator {
    /// Descendant combinator (space): matches any descendant.
    Descendant,
    /// Child combinator (>): matches direct child only.
    Child,
    /// Adjacent sibling (+): matches immediately following sibling.
    AdjacentSibling,
    /// General sibling (~): matches any following sibling.
    GeneralSibling,
}

/// An attribute selector.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AttributeSelector {
    /// Attribute name, compared case-insensitively.
    pub name: String,
    /// How the value is compared.
    pub operation: AttributeMatch,
}

impl AttributeSelector {
    /// `[name]`
    pub fn exists(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            operation: AttributeMatch::Exists,
        }
    }

    /// `[name="value"]`
    pub fn equals(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            operation: AttributeMatch::Equals(value.into()),
        }
    }

    /// Check an attribute value (`None` when the attribute is absent).
    pub fn matches(&self, value: Option<&str>) -> bool {
        let Some(value) = value else {
            return false;
        };
        match &self.operation {
            AttributeMatch::Exists => true,
            AttributeMatch::Equals(expected) => value == expected,
            AttributeMatch::Includes(expected) => {
                !expected.is_empty() && value.split_ascii_whitespace().any(|w| w == expected)
            }
            AttributeMatch::DashMatch(expected) => {
                value == expected
                    || value
                        .strip_prefix(expected.as_str())
                        .is_some_and(|rest| rest.starts_with('-'))
            }
            AttributeMatch::Prefix(expected) => {
                !expected.is_empty() && value.starts_with(expected.as_str())
            }
            AttributeMatch::Suffix(expected) => {
                !expected.is_empty() && value.ends_with(expected.as_str())
            }
            AttributeMatch::Substring(expected) => {
                !expected.is_empty() && value.contains(expected.as_str())
            }
        }
    }
}

impl fmt::Display for AttributeSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (op, value) = match &self.operation {
            AttributeMatch::Exists => return write!(f, "[{}]", self.name),
            AttributeMatch::Equals(v) => ("=", v),
            AttributeMatch::Includes(v) => ("~=", v),
            AttributeMatch::DashMatch(v) => ("|=", v),
            AttributeMatch::Prefix(v) => ("^=", v),
            AttributeMatch::Suffix(v) => ("$=", v),
            AttributeMatch::Substring(v) => ("*=", v),
        };
        write!(f, "[{}{}\"{}\"]", self.name, op, value)
    }
}

/// Attribute value comparison.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum AttributeMatch {
    /// `[a]` - attribute present.
    Exists,
    /// `[a=v]` - exact value.
    Equals(String),
    /// `[a~=v]` - whitespace-separated word.
    Includes(String),
    /// `[a|=v]` - exact or followed by `-`.
    DashMatch(String),
    /// `[a^=v]` - prefix.
    Prefix(String),
    /// `[a$=v]` - suffix.
    Suffix(String),
    /// `[a*=v]` - substring.
    Substring(String),
}

/// Structural pseudo-classes.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PseudoClass {
    /// :first-child - first element among siblings.
    FirstChild,
    /// :last-child - last element among siblings.
    LastChild,
    /// :nth-child(An+B) - nth element among siblings.
    NthChild(NthExpr),
    /// :only-child - only element child of its parent.
    OnlyChild,
    /// :empty - has no child nodes.
    Empty,
    /// :not(compound) - negation.
    Not(Box<SelectorPart>),
}

impl fmt::Display for PseudoClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PseudoClass::FirstChild => write!(f, "first-child"),
            PseudoClass::LastChild => write!(f, "last-child"),
            PseudoClass::NthChild(expr) => write!(f, "nth-child({})", expr),
            PseudoClass::OnlyChild => write!(f, "only-child"),
            PseudoClass::Empty => write!(f, "empty"),
            PseudoClass::Not(inner) => write!(f, "not({})", inner),
        }
    }
}

impl PseudoClass {
    /// Parse an argument-less pseudo-class name.
    pub fn from_css(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "first-child" => Some(Self::FirstChild),
            "last-child" => Some(Self::LastChild),
            "only-child" => Some(Self::OnlyChild),
            "empty" => Some(Self::Empty),
            _ => None,
        }
    }
}

/// Expression for :nth-child (An+B).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NthExpr {
    /// Coefficient (A in An+B).
    pub a: i32,
    /// Offset (B in An+B).
    pub b: i32,
}

impl NthExpr {
    /// Create a new nth expression.
    pub fn new(a: i32, b: i32) -> Self {
        Self { a, b }
    }

    /// Check if a 0-indexed position matches this expression.
    pub fn matches(&self, index: usize) -> bool {
        // Widened so offsets near the i32 bounds cannot overflow.
        let Some(n) = i64::try_from(index).ok().and_then(|i| i.checked_add(1)) else {
            return false;
        };
        let (a, b) = (i64::from(self.a), i64::from(self.b));
        if a == 0 {
            n == b
        } else {
            let Some(diff) = n.checked_sub(b) else {
                return false;
            };
            if a > 0 {
                diff >= 0 && diff % a == 0
            } else {
                diff <= 0 && diff % a == 0
            }
        }
    }

    /// :nth-child(odd) = 2n+1.
    pub fn odd() -> Self {
        Self { a: 2, b: 1 }
    }

    /// :nth-child(even) = 2n.
    pub fn even() -> Self {
        Self { a: 2, b: 0 }
    }

    /// :nth-child(n) - matches all.
    pub fn all() -> Self {
        Self { a: 1, b: 0 }
    }
}

impl fmt::Display for NthExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.a, self.b) {
            (2, 1) => write!(f, "odd"),
            (2, 0) => write!(f, "even"),
            (0, b) => write!(f, "{}", b),
            (1, 0) => write!(f, "n"),
            (a, 0) => write!(f, "{}n", a),
            (1, b) if b > 0 => write!(f, "n+{}", b),
            (1, b) => write!(f, "n{}", b),
            (a, b) if b > 0 => write!(f, "{}n+{}", a, b),
            (a, b) => write!(f, "{}n{}", a, b),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn selector_display() {
        let sel = Selector::type_selector("figure")
            .descendant(SelectorPart::type_only("img").with_class("zoomable"));
        assert_eq!(sel.to_string(), "figure img.zoomable");

        let sel = Selector::id("lightbox").child(
            SelectorPart::new().with_attribute(AttributeSelector::exists("data-close-lightbox")),
        );
        assert_eq!(sel.to_string(), "#lightbox > [data-close-lightbox]");
    }

    #[test]
    fn attribute_operators() {
        let sel = AttributeSelector {
            name: "class".into(),
            operation: AttributeMatch::Includes("prose".into()),
        };
        assert!(sel.matches(Some("post prose lg")));
        assert!(!sel.matches(Some("prose-lg")));
        assert!(!sel.matches(None));

        let sel = AttributeSelector {
            name: "lang".into(),
            operation: AttributeMatch::DashMatch("en".into()),
        };
        assert!(sel.matches(Some("en")));
        assert!(sel.matches(Some("en-GB")));
        assert!(!sel.matches(Some("english")));

        let sel = AttributeSelector {
            name: "src".into(),
            operation: AttributeMatch::Suffix("".into()),
        };
        assert!(!sel.matches(Some("diagram.svg")));

        assert!(AttributeSelector::exists("data-zoom").matches(Some("")));
    }

    #[test]
    fn nth_expr_matches() {
        let expr = NthExpr::new(0, 3);
        assert!(!expr.matches(0));
        assert!(!expr.matches(1));
        assert!(expr.matches(2));
        assert!(!expr.matches(3));

        let expr = NthExpr::odd();
        assert!(expr.matches(0));
        assert!(!expr.matches(1));
        assert!(expr.matches(2));

        let expr = NthExpr::even();
        assert!(!expr.matches(0));
        assert!(expr.matches(1));
    }

    #[test]
    fn nth_expr_extreme_offsets() {
        let expr = NthExpr::new(2, i32::MIN);
        assert!(!expr.matches(0));
        assert!(expr.matches(1));

        let expr = NthExpr::new(-1, i32::MAX);
        assert!(expr.matches(0));
        assert!(expr.matches(1_000_000));

        let expr = NthExpr::new(i32::MIN, 0);
        assert!(!expr.matches(0));
    }
}
