//! [§ 13.2.6.5 The adoption agency algorithm](https://html.spec.whatwg.org/multipage/parsing.html#adoption-agency-algorithm)
//!
//! Repairs mis-nested formatting elements such as `<b><i></b></i>` by
//! cloning formatting elements around the block that ended up inside them.

use koala_dom::{Namespace, NodeId};

use super::core::{ActiveFormattingElement, HTMLParser};
use crate::tokenizer::Token;

/// "The outer loop counter is greater than or equal to 8" terminates.
const OUTER_LOOP_LIMIT: usize = 8;

/// Past this many inner loop iterations, nodes are dropped from the list of
/// active formatting elements.
const INNER_LOOP_LIMIT: usize = 3;

/// "Let a bookmark note the position of formatting element in the list of
/// active formatting elements relative to the elements on either side of it
/// in the list."
#[derive(Debug, Clone, Copy)]
enum Bookmark {
    /// The new element takes the formatting element's entry.
    Replace,
    /// The new element goes immediately after this entry.
    After(NodeId),
}

impl HTMLParser {
    /// Run the adoption agency algorithm for `token`, an end tag (or the
    /// implied end tag of a nested `a` or `nobr` start tag).
    pub(super) fn run_adoption_agency(&mut self, token: &Token) {
        // STEP 1: "Let subject be token's tag name."
        let Some(subject) = token.tag_name().map(str::to_string) else {
            return;
        };

        // STEP 2: "If the current node is an HTML element whose tag name is
        //          subject, and the current node is not in the list of active
        //          formatting elements, then pop the current node off the stack
        //          of open elements and return."
        if let Some(current) = self.current_node()
            && self.is_html(current, &subject)
            && self.formatting_index_of(current).is_none()
        {
            let _ = self.stack_of_open_elements.pop();
            return;
        }

        tracing::debug!(subject = %subject, "adoption agency");

        // STEP 3: "Let outerLoopCounter be 0."
        // STEP 4: "While true:"
        for _ in 0..OUTER_LOOP_LIMIT {
            // STEP 4.1: "If outerLoopCounter is greater than or equal to 8,
            //            then return."
            // STEP 4.2: "Increment outerLoopCounter by 1."

            // STEP 4.3: "Let formattingElement be the last element in the list
            //            of active formatting elements that: is between the end
            //            of the list and the last marker in the list, if any, or
            //            the start of the list otherwise, and has the tag name
            //            subject."
            //            "If there is no such element, then return and instead
            //            act as described in the "any other end tag" entry
            //            above."
            let Some(formatting_index) = self.formatting_element_after_last_marker(&subject)
            else {
                self.any_other_end_tag(&subject);
                return;
            };
            let ActiveFormattingElement::Element {
                node_id: formatting_element,
                token: formatting_token,
            } = self.active_formatting_elements[formatting_index].clone()
            else {
                return;
            };

            // STEP 4.4: "If formattingElement is not in the stack of open
            //            elements, then this is a parse error; remove the
            //            element from the list, and return."
            let Some(formatting_stack_index) = self
                .stack_of_open_elements
                .iter()
                .position(|&id| id == formatting_element)
            else {
                self.parse_error(format!("formatting element <{subject}> is not open"));
                let _ = self.active_formatting_elements.remove(formatting_index);
                return;
            };

            // STEP 4.5: "If formattingElement is in the stack of open elements,
            //            but the element is not in scope, then this is a parse
            //            error; return."
            if !self.has_node_in_scope(formatting_element) {
                self.parse_error(format!("formatting element <{subject}> is not in scope"));
                return;
            }

            // STEP 4.6: "If formattingElement is not the current node, this is a
            //            parse error. (But do not return.)"
            if self.current_node() != Some(formatting_element) {
                self.parse_error(format!("end tag </{subject}> closes mis-nested elements"));
            }

            // STEP 4.7: "Let furthestBlock be the topmost node in the stack of
            //            open elements that is lower in the stack than
            //            formattingElement, and is an element in the special
            //            category. There might not be one."
            let furthest_block_index = (formatting_stack_index + 1
                ..self.stack_of_open_elements.len())
                .find(|&i| self.is_special(self.stack_of_open_elements[i]));

            // STEP 4.8: "If there is no furthestBlock, then the UA must first
            //            pop all the nodes from the bottom of the stack of open
            //            elements, from the current node up to and including
            //            formattingElement, then remove formattingElement from
            //            the list of active formatting elements, and finally
            //            return."
            let Some(furthest_block_index) = furthest_block_index else {
                self.stack_of_open_elements.truncate(formatting_stack_index);
                let _ = self.active_formatting_elements.remove(formatting_index);
                return;
            };
            let furthest_block = self.stack_of_open_elements[furthest_block_index];

            // STEP 4.9: "Let commonAncestor be the element immediately above
            //            formattingElement in the stack of open elements."
            let Some(common_ancestor) = formatting_stack_index
                .checked_sub(1)
                .map(|i| self.stack_of_open_elements[i])
            else {
                return;
            };

            // STEP 4.10: "Let a bookmark note the position of formattingElement
            //             in the list of active formatting elements relative to
            //             the elements on either side of it in the list."
            let mut bookmark = Bookmark::Replace;

            // STEP 4.11: "Let node and lastNode be furthestBlock."
            let mut node_index = furthest_block_index;
            let mut last_node = furthest_block;

            // STEP 4.12: "Let innerLoopCounter be 0."
            let mut inner_loop_counter = 0;

            // STEP 4.13: "While true:"
            loop {
                // STEP 4.13.1: "Increment innerLoopCounter by 1."
                inner_loop_counter += 1;

                // STEP 4.13.2: "Let node be the element immediately above node
                //               in the stack of open elements, or if node is no
                //               longer in the stack of open elements (e.g.
                //               because it got removed by this algorithm), the
                //               element that was immediately above node in the
                //               stack of open elements before node was removed."
                node_index -= 1;
                let node = self.stack_of_open_elements[node_index];

                // STEP 4.13.3: "If node is formattingElement, then break."
                if node == formatting_element {
                    break;
                }

                // STEP 4.13.4: "If innerLoopCounter is greater than 3 and node
                //               is in the list of active formatting elements,
                //               then remove node from the list of active
                //               formatting elements."
                let mut node_formatting_index = self.formatting_index_of(node);
                if inner_loop_counter > INNER_LOOP_LIMIT
                    && let Some(index) = node_formatting_index.take()
                {
                    let _ = self.active_formatting_elements.remove(index);
                }

                // STEP 4.13.5: "If node is not in the list of active formatting
                //               elements, then remove node from the stack of
                //               open elements and continue."
                let Some(node_formatting_index) = node_formatting_index else {
                    let _ = self.stack_of_open_elements.remove(node_index);
                    continue;
                };

                // STEP 4.13.6: "Create an element for the token for which the
                //               element node was created, in the HTML namespace,
                //               with commonAncestor as the intended parent;
                //               replace the entry for node in the list of active
                //               formatting elements with an entry for the new
                //               element, replace the entry for node in the stack
                //               of open elements with an entry for the new
                //               element, and let node be the new element."
                let ActiveFormattingElement::Element {
                    token: node_token, ..
                } = self.active_formatting_elements[node_formatting_index].clone()
                else {
                    break;
                };
                let new_element = self.create_element_for_token(&node_token, Namespace::Html);
                self.active_formatting_elements[node_formatting_index] =
                    ActiveFormattingElement::Element {
                        node_id: new_element,
                        token: node_token,
                    };
                self.stack_of_open_elements[node_index] = new_element;

                // STEP 4.13.7: "If lastNode is furthestBlock, then move the
                //               aforementioned bookmark to be immediately after
                //               the new node in the list of active formatting
                //               elements."
                if last_node == furthest_block {
                    bookmark = Bookmark::After(new_element);
                }

                // STEP 4.13.8: "Append lastNode to node."
                self.tree.append_child(new_element, last_node);

                // STEP 4.13.9: "Set lastNode to node."
                last_node = new_element;
            }

            // STEP 4.14: "Insert whatever lastNode ended up being in the
            //             previous step at the appropriate place for inserting
            //             a node, but using commonAncestor as the override
            //             target."
            self.tree.detach(last_node);
            let location = self.appropriate_place_for_inserting(Some(common_ancestor));
            self.insert_node_at(location, last_node);

            // STEP 4.15: "Create an element for the token for which
            //             formattingElement was created, in the HTML namespace,
            //             with furthestBlock as the intended parent."
            let new_element = self.create_element_for_token(&formatting_token, Namespace::Html);

            // STEP 4.16: "Take all of the child nodes of furthestBlock and
            //             append them to the element created in the last step."
            self.tree.move_children(furthest_block, new_element);

            // STEP 4.17: "Append that new element to furthestBlock."
            self.tree.append_child(furthest_block, new_element);

            // STEP 4.18: "Remove formattingElement from the list of active
            //             formatting elements, and insert the new element into
            //             the list of active formatting elements at the position
            //             of the aforementioned bookmark."
            let entry = ActiveFormattingElement::Element {
                node_id: new_element,
                token: formatting_token,
            };
            match bookmark {
                Bookmark::Replace => {
                    if let Some(index) = self.formatting_index_of(formatting_element) {
                        self.active_formatting_elements[index] = entry;
                    }
                }
                Bookmark::After(anchor) => {
                    self.remove_from_active_formatting_elements(formatting_element);
                    let index = self
                        .formatting_index_of(anchor)
                        .map_or(self.active_formatting_elements.len(), |i| i + 1);
                    self.active_formatting_elements.insert(index, entry);
                }
            }

            // STEP 4.19: "Remove formattingElement from the stack of open
            //             elements, and insert the new element into the stack of
            //             open elements immediately below the position of
            //             furthestBlock in that stack."
            self.remove_from_stack(formatting_element);
            let below_furthest_block = self
                .stack_of_open_elements
                .iter()
                .position(|&id| id == furthest_block)
                .map_or(self.stack_of_open_elements.len(), |i| i + 1);
            self.stack_of_open_elements
                .insert(below_furthest_block, new_element);
        }
    }
}
