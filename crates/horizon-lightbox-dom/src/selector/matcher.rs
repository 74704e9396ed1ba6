//! Selector matching algorithm.
//!
//! Matching runs right to left: the subject part is checked against the
//! node, then each combinator walks to candidate ancestors or preceding
//! siblings. Descendant and general-sibling combinators backtrack, so
//! `"a b c"` finds a match even when the nearest `b` ancestor has no `a`
//! above it but a farther one does.

use super::{Combinator, PseudoClass, Selector, SelectorList, SelectorPart, TypeSelector};
use crate::{Document, NodeId};

/// Selector matching engine.
pub struct SelectorMatcher;

impl SelectorMatcher {
    /// Check whether a node matches any selector in the list.
    pub fn matches_list(list: &SelectorList, document: &Document, node: NodeId) -> bool {
        list.selectors
            .iter()
            .any(|selector| Self::matches(selector, document, node))
    }

    /// Check whether a node matches a complex selector, including combinators.
    pub fn matches(selector: &Selector, document: &Document, node: NodeId) -> bool {
        if selector.parts.is_empty() {
            return false;
        }
        Self::matches_from(selector, selector.parts.len() - 1, document, node)
    }

    fn matches_from(selector: &Selector, index: usize, document: &Document, node: NodeId) -> bool {
        if !Self::part_matches(&selector.parts[index], document, node) {
            return false;
        }
        if index == 0 {
            return true;
        }

        let next = index - 1;
        match selector.combinators[next] {
            Combinator::Descendant => {
                let mut current = document.parent(node);
                while let Some(ancestor) = current {
                    if Self::matches_from(selector, next, document, ancestor) {
                        return true;
                    }
                    current = document.parent(ancestor);
                }
                false
            }
            Combinator::Child => document
                .parent(node)
                .is_some_and(|parent| Self::matches_from(selector, next, document, parent)),
            Combinator::AdjacentSibling => document
                .previous_element_sibling(node)
                .is_some_and(|sibling| Self::matches_from(selector, next, document, sibling)),
            Combinator::GeneralSibling => {
                let mut current = document.previous_element_sibling(node);
                while let Some(sibling) = current {
                    if Self::matches_from(selector, next, document, sibling) {
                        return true;
                    }
                    current = document.previous_element_sibling(sibling);
                }
                false
            }
        }
    }

    /// Check if a compound selector matches a node. Text nodes never match.
    pub fn part_matches(part: &SelectorPart, document: &Document, node: NodeId) -> bool {
        let Some(element) = document.element(node) else {
            return false;
        };

        if let Some(TypeSelector::Type(name)) = &part.type_selector {
            if !element.has_tag(name) {
                return false;
            }
        }

        if let Some(id) = &part.id {
            if element.attribute("id") != Some(id.as_str()) {
                return false;
            }
        }

        for class in &part.classes {
            if !element.classes().any(|c| c == class) {
                return false;
            }
        }

        for attribute in &part.attributes {
            if !attribute.matches(element.attribute(&attribute.name)) {
                return false;
            }
        }

        part.pseudo_classes
            .iter()
            .all(|pseudo| Self::pseudo_matches(pseudo, document, node))
    }

    fn pseudo_matches(pseudo: &PseudoClass, document: &Document, node: NodeId) -> bool {
        match pseudo {
            PseudoClass::FirstChild => document
                .element_position(node)
                .is_some_and(|(index, _)| index == 0),
            PseudoClass::LastChild => document
                .element_position(node)
                .is_some_and(|(index, count)| index + 1 == count),
            PseudoClass::OnlyChild => document
                .element_position(node)
                .is_some_and(|(_, count)| count == 1),
            PseudoClass::NthChild(expr) => document
                .element_position(node)
                .is_some_and(|(index, _)| expr.matches(index)),
            PseudoClass::Empty => document.children(node).is_empty(),
            PseudoClass::Not(inner) => !Self::part_matches(inner, document, node),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::selector::parse_selector_list;

    fn fixture() -> Document {
        Document::from_markup(
            r#"<article class="prose">
                 <figure id="first"><img src="a.png" alt="A"/><figcaption>A</figcaption></figure>
                 <section>
                   <figure id="second"><svg viewBox="0 0 10 10"><rect width="10" height="10"/></svg></figure>
                 </section>
                 <p class="note">Text</p>
                 <p class="note skip"></p>
               </article>"#,
        )
        .unwrap()
    }

    fn select(document: &Document, selector: &str) -> Vec<NodeId> {
        document.query_selector_all(selector).unwrap()
    }

    #[test]
    fn descendant_backtracks_past_non_matching_ancestors() {
        let doc = fixture();
        let hits = select(&doc, "article figure svg");
        assert_eq!(hits.len(), 1);
        assert!(doc.element(hits[0]).unwrap().has_tag("svg"));
    }

    #[test]
    fn child_combinator_requires_direct_parent() {
        let doc = fixture();
        assert_eq!(select(&doc, "article > figure").len(), 1);
        assert_eq!(select(&doc, "section > figure").len(), 1);
        assert_eq!(select(&doc, "article > svg").len(), 0);
    }

    #[test]
    fn sibling_combinators() {
        let doc = fixture();
        assert_eq!(select(&doc, "img + figcaption").len(), 1);
        assert_eq!(select(&doc, "figure ~ p").len(), 2);
        assert_eq!(select(&doc, "section + p.note").len(), 1);
    }

    #[test]
    fn structural_pseudo_classes() {
        let doc = fixture();
        assert_eq!(select(&doc, "p:empty").len(), 1);
        assert_eq!(select(&doc, "figure > :first-child").len(), 2);
        assert_eq!(select(&doc, "p:not(.skip)").len(), 1);
        assert_eq!(select(&doc, "svg:only-child").len(), 1);
        assert_eq!(select(&doc, "article > :nth-child(2)").len(), 1);
    }

    #[test]
    fn list_matches_any_member() {
        let doc = fixture();
        let list = parse_selector_list("img, svg").unwrap();
        let hits: Vec<_> = doc
            .descendants(doc.root())
            .into_iter()
            .filter(|&n| SelectorMatcher::matches_list(&list, &doc, n))
            .collect();
        assert_eq!(hits.len(), 2);
    }

    #[test]
    fn type_selectors_ignore_case() {
        let doc = fixture();
        assert_eq!(select(&doc, "IMG").len(), 1);
        assert_eq!(select(&doc, "[viewbox]").len(), 1);
    }
}
