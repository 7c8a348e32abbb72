//! [§ 13.4 Parsing HTML fragments](https://html.spec.whatwg.org/multipage/parsing.html#parsing-html-fragments)

use std::str::FromStr;

use koala_dom::{DomTree, ElementData, Namespace, NodeId, NodeType};

use super::core::{HTMLParser, InsertionMode};
use crate::config::ParserConfig;
use crate::error::ContextParseError;
use crate::tokenizer::TokenizerState;

/// The context element a fragment is parsed in, such as the element whose
/// `innerHTML` is being set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FragmentContext {
    /// Local name of the context element.
    pub tag_name: String,
    /// Namespace of the context element.
    pub namespace: Namespace,
}

impl FragmentContext {
    /// A context element named `tag_name` in `namespace`.
    pub fn new(tag_name: impl Into<String>, namespace: Namespace) -> Self {
        Self {
            tag_name: tag_name.into(),
            namespace,
        }
    }

    /// An HTML context element.
    pub fn html(tag_name: impl Into<String>) -> Self {
        Self::new(tag_name, Namespace::Html)
    }
}

/// Parses `div`, `html:div`, `svg:foreignObject` or `math:mi`.
impl FromStr for FragmentContext {
    type Err = ContextParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (namespace, name) = match s.split_once(':') {
            Some((prefix, name)) => {
                let namespace = match prefix.to_ascii_lowercase().as_str() {
                    "html" => Namespace::Html,
                    "svg" => Namespace::Svg,
                    "math" | "mathml" => Namespace::MathMl,
                    _ => return Err(ContextParseError::UnknownNamespace(prefix.to_string())),
                };
                (namespace, name)
            }
            None => (Namespace::Html, s),
        };
        let name = name.trim();
        if name.is_empty() {
            return Err(ContextParseError::EmptyName);
        }
        let name = if namespace == Namespace::Html {
            name.to_ascii_lowercase()
        } else {
            name.to_string()
        };
        Ok(Self::new(name, namespace))
    }
}

impl HTMLParser {
    /// Create a parser for the fragment parsing algorithm with `context` as
    /// the context element.
    ///
    /// The resulting tree's root is a `DocumentFragment` holding the parsed
    /// nodes.
    pub fn new_fragment(input: &str, context: &FragmentContext) -> Self {
        // STEP 1: "Create a new Document node, and mark it as being an HTML
        //          document."
        // STEP 4: "Create a new HTML parser, and associate it with the just
        //          created Document node."
        let mut parser = Self::with_tree(input, DomTree::new_fragment());

        // STEP 2: "If the node document of the context element is in quirks
        //          mode, then let the Document be in quirks mode." The context
        //          element has no document here, so no-quirks applies.

        // STEP 5: "Set the state of the HTML parser's tokenization stage as
        //          follows, switching on the context element:"
        if context.namespace == Namespace::Html {
            let state = match context.tag_name.as_str() {
                // "title", "textarea": "Switch the tokenizer to the RCDATA state."
                "title" | "textarea" => Some(TokenizerState::RCDATA),
                // "style", "xmp", "iframe", "noembed", "noframes": "Switch the
                // tokenizer to the RAWTEXT state."
                "style" | "xmp" | "iframe" | "noembed" | "noframes" => {
                    Some(TokenizerState::RAWTEXT)
                }
                // "script": "Switch the tokenizer to the script data state."
                "script" => Some(TokenizerState::ScriptData),
                // "noscript": "If the scripting flag is enabled, switch the
                // tokenizer to the RAWTEXT state. Otherwise, leave the tokenizer
                // in the data state."
                "noscript" if ParserConfig::SCRIPTING => Some(TokenizerState::RAWTEXT),
                // "plaintext": "Switch the tokenizer to the PLAINTEXT state."
                "plaintext" => Some(TokenizerState::PLAINTEXT),
                // "Any other element": "Leave the tokenizer in the data state."
                _ => None,
            };
            if let Some(state) = state {
                parser.tokenizer.set_state(state);
            }
        }

        // The context element lives in the arena but is never attached.
        let context_element = parser.tree.alloc(NodeType::Element(ElementData::new(
            context.tag_name.as_str(),
            context.namespace,
        )));
        parser.context_element = Some(context_element);

        // STEP 7: "Let root be the result of creating an element given document,
        //          "html", and the HTML namespace."
        // STEP 8: "Append the element root to the Document node created above."
        let root = parser.tree.alloc(NodeType::Element(ElementData::new(
            "html",
            Namespace::Html,
        )));
        parser.tree.append_child(NodeId::ROOT, root);

        // STEP 9: "Set up the parser's stack of open elements so that it
        //          contains just the single element root."
        parser.stack_of_open_elements.push(root);

        // STEP 10: "If the context element is a template element, then push
        //           "in template" onto the stack of template insertion modes so
        //           that it is the new current template insertion mode."
        if context.namespace == Namespace::Html && context.tag_name == "template" {
            parser
                .template_insertion_modes
                .push(InsertionMode::InTemplate);
        }

        // STEP 11: "Create a start tag token whose name is the local name of
        //           context and whose attributes are the attributes of
        //           context." (Only used for the adjusted current node.)

        // STEP 12: "Reset the parser's insertion mode appropriately."
        parser.reset_insertion_mode_appropriately();

        // STEP 13: "Set the HTML parser's form element pointer to the nearest
        //           node to the context element that is a form element (going
        //           straight up the ancestor chain, and including the element
        //           itself, if it is one)."
        if context.namespace == Namespace::Html && context.tag_name == "form" {
            parser.form_element_pointer = Some(context_element);
        }

        tracing::debug!(
            context = %context.tag_name,
            namespace = %context.namespace.prefix(),
            mode = %parser.insertion_mode,
            "fragment parser created"
        );
        parser
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_context_names() {
        assert_eq!(
            "div".parse::<FragmentContext>().unwrap(),
            FragmentContext::html("div")
        );
        assert_eq!(
            "TD".parse::<FragmentContext>().unwrap(),
            FragmentContext::html("td")
        );
        assert_eq!(
            "svg:foreignObject".parse::<FragmentContext>().unwrap(),
            FragmentContext::new("foreignObject", Namespace::Svg)
        );
        assert_eq!(
            "math:mi".parse::<FragmentContext>().unwrap(),
            FragmentContext::new("mi", Namespace::MathMl)
        );
    }

    #[test]
    fn test_parse_context_errors() {
        assert_eq!(
            "".parse::<FragmentContext>(),
            Err(ContextParseError::EmptyName)
        );
        assert_eq!(
            "xul:box".parse::<FragmentContext>(),
            Err(ContextParseError::UnknownNamespace("xul".to_string()))
        );
    }
}
