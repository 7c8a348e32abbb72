//! Foreign content parsing support for SVG and MathML.
//!
//! [§ 13.2.6.3 Creating and inserting nodes](https://html.spec.whatwg.org/multipage/parsing.html#creating-and-inserting-nodes)
//! [§ 13.2.6.5 The rules for parsing tokens in foreign content](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-inforeign)
//!
//! Everything here is a pure table lookup. The tree builder decides when an
//! adjustment applies.

pub mod mathml;
pub mod svg;

pub use mathml::{adjust_mathml_attributes, adjusted_mathml_attribute_name};
pub use svg::{adjust_svg_attributes, adjusted_svg_attribute_name, adjusted_svg_tag_name};

use koala_dom::{Attr, Namespace};

use crate::tokenizer::Attribute;

/// A namespaced attribute produced by [`adjust_foreign_attribute`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ForeignAttribute {
    /// "the prefix being the string in the second column"
    pub prefix: Option<&'static str>,
    /// "the local name being the string in the third column"
    pub local_name: &'static str,
    /// "the namespace being the namespace in the fourth column"
    pub namespace: Namespace,
}

/// [§ 13.2.6.3 Adjust foreign attributes](https://html.spec.whatwg.org/multipage/parsing.html#adjust-foreign-attributes)
///
/// "When the steps below require the user agent to adjust foreign attributes
/// for a token, then, if any of the attributes on the token match the strings
/// in the first column of the following table, let the attribute be a namespaced
/// attribute, with the prefix being the string in the second column, the local
/// name being the string in the third column, and the namespace being the
/// namespace in the fourth column."
///
/// Format: (`attribute_name`, prefix, `local_name`, namespace)
const FOREIGN_ATTRIBUTE_ADJUSTMENTS: &[(&str, Option<&str>, &str, Namespace)] = &[
    ("xlink:actuate", Some("xlink"), "actuate", Namespace::XLink),
    ("xlink:arcrole", Some("xlink"), "arcrole", Namespace::XLink),
    ("xlink:href", Some("xlink"), "href", Namespace::XLink),
    ("xlink:role", Some("xlink"), "role", Namespace::XLink),
    ("xlink:show", Some("xlink"), "show", Namespace::XLink),
    ("xlink:title", Some("xlink"), "title", Namespace::XLink),
    ("xlink:type", Some("xlink"), "type", Namespace::XLink),
    ("xml:lang", Some("xml"), "lang", Namespace::Xml),
    ("xml:space", Some("xml"), "space", Namespace::Xml),
    ("xmlns", None, "xmlns", Namespace::Xmlns),
    ("xmlns:xlink", Some("xmlns"), "xlink", Namespace::Xmlns),
];

/// Look `name` up in the namespaced attribute table.
#[must_use]
pub fn adjust_foreign_attribute(name: &str) -> Option<ForeignAttribute> {
    FOREIGN_ATTRIBUTE_ADJUSTMENTS
        .iter()
        .find(|&&(from, ..)| from == name)
        .map(|&(_, prefix, local_name, namespace)| ForeignAttribute {
            prefix,
            local_name,
            namespace,
        })
}

/// The corrected element name for a tag in `namespace`. Only SVG has a table.
#[must_use]
pub fn adjusted_tag_name(namespace: Namespace, name: &str) -> &str {
    match namespace {
        Namespace::Svg => adjusted_svg_tag_name(name).unwrap_or(name),
        _ => name,
    }
}

/// The corrected attribute name for an attribute on an element in `namespace`.
#[must_use]
pub fn adjusted_attribute_name(namespace: Namespace, name: &str) -> &str {
    let adjusted = match namespace {
        Namespace::Svg => adjusted_svg_attribute_name(name),
        Namespace::MathMl => adjusted_mathml_attribute_name(name),
        _ => None,
    };
    adjusted.unwrap_or(name)
}

/// Attributes of a token inserted as an HTML element: names kept as tokenized.
#[must_use]
pub fn html_attributes(attributes: &[Attribute]) -> Vec<Attr> {
    attributes
        .iter()
        .map(|attr| Attr::new(attr.name.as_str(), attr.value.as_str()))
        .collect()
}

/// [§ 13.2.6.1 Insert a foreign element](https://html.spec.whatwg.org/multipage/parsing.html#insert-a-foreign-element)
///
/// Attributes of a token inserted into `namespace`: "adjust MathML attributes"
/// or "adjust SVG attributes" as appropriate, then "adjust foreign attributes".
#[must_use]
pub fn foreign_attributes(namespace: Namespace, attributes: &[Attribute]) -> Vec<Attr> {
    let mut attributes = attributes.to_vec();
    match namespace {
        Namespace::Svg => adjust_svg_attributes(&mut attributes),
        Namespace::MathMl => adjust_mathml_attributes(&mut attributes),
        _ => {}
    }
    attributes
        .into_iter()
        .map(|attr| match adjust_foreign_attribute(&attr.name) {
            Some(foreign) => Attr {
                local_name: foreign.local_name.to_string(),
                namespace: Some(foreign.namespace),
                prefix: foreign.prefix.map(str::to_string),
                value: attr.value,
            },
            None => Attr::new(attr.name, attr.value),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_xlink_href_is_namespaced() {
        let attrs = foreign_attributes(Namespace::Svg, &[Attribute::new("xlink:href", "#Foo")]);
        assert_eq!(attrs[0].local_name, "href");
        assert_eq!(attrs[0].prefix.as_deref(), Some("xlink"));
        assert_eq!(attrs[0].namespace, Some(Namespace::XLink));
        assert_eq!(attrs[0].qualified_name(), "xlink:href");
    }

    #[test]
    fn test_xmlns_has_no_prefix() {
        let adjusted = adjust_foreign_attribute("xmlns");
        assert_eq!(
            adjusted,
            Some(ForeignAttribute {
                prefix: None,
                local_name: "xmlns",
                namespace: Namespace::Xmlns,
            })
        );
        assert!(adjust_foreign_attribute("xlink").is_none());
    }

    #[test]
    fn test_adjustments_follow_namespace() {
        assert_eq!(adjusted_attribute_name(Namespace::Svg, "viewbox"), "viewBox");
        assert_eq!(adjusted_attribute_name(Namespace::Html, "viewbox"), "viewbox");
        assert_eq!(
            adjusted_attribute_name(Namespace::MathMl, "definitionurl"),
            "definitionURL"
        );
        assert_eq!(adjusted_tag_name(Namespace::Svg, "textpath"), "textPath");
        assert_eq!(adjusted_tag_name(Namespace::MathMl, "textpath"), "textpath");
    }
}
