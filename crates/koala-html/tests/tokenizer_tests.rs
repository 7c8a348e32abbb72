//! Integration tests for the HTML tokenizer.

use koala_html::tokenizer::TokenizerState;
use koala_html::{HTMLTokenizer, ParseError, Token};

/// Helper to tokenize a string and return the tokens
fn tokenize(input: &str) -> Vec<Token> {
    let mut tokenizer = HTMLTokenizer::new(input);
    tokenizer.run();
    tokenizer.into_tokens()
}

/// Tokenize and also return the error codes, in order.
fn tokenize_with_errors(input: &str) -> (Vec<Token>, Vec<String>) {
    let mut tokenizer = HTMLTokenizer::new(input);
    let mut tokens = Vec::new();
    loop {
        let token = tokenizer.next_token();
        let done = matches!(token, Token::EndOfFile);
        tokens.push(token);
        if done {
            break;
        }
    }
    let codes = tokenizer
        .take_errors()
        .into_iter()
        .map(|error| error.message)
        .collect();
    (tokens, codes)
}

/// Tokenize starting in `state`, as the tree builder does after a `<title>`,
/// `<style>` or `<script>` start tag.
fn tokenize_in(state: TokenizerState, last_start_tag: &str, input: &str) -> Vec<Token> {
    let mut tokenizer = HTMLTokenizer::new(input);
    tokenizer.set_state(state);
    tokenizer.set_last_start_tag(Some(last_start_tag.to_string()));
    tokenizer.run();
    tokenizer.into_tokens()
}

/// Concatenate the leading run of character tokens.
fn leading_text(tokens: &[Token]) -> String {
    tokens
        .iter()
        .map_while(|token| match token {
            Token::Character { data } => Some(*data),
            _ => None,
        })
        .collect()
}

#[test]
fn test_plain_text() {
    let tokens = tokenize("Hello");
    assert_eq!(tokens.len(), 6); // 5 chars + EOF
    assert_eq!(leading_text(&tokens), "Hello");
    assert!(matches!(tokens[5], Token::EndOfFile));
}

#[test]
fn test_end_of_file_repeats() {
    let mut tokenizer = HTMLTokenizer::new("");
    assert_eq!(tokenizer.next_token(), Token::EndOfFile);
    assert_eq!(tokenizer.next_token(), Token::EndOfFile);
}

#[test]
fn test_doctype_with_identifiers() {
    let tokens = tokenize(
        r#"<!DOCTYPE html PUBLIC "-//W3C//DTD HTML 4.01//EN" 'http://www.w3.org/TR/html4/strict.dtd'>"#,
    );
    assert_eq!(tokens.len(), 2);
    match &tokens[0] {
        Token::Doctype {
            name,
            public_identifier,
            system_identifier,
            force_quirks,
        } => {
            assert_eq!(name.as_deref(), Some("html"));
            assert_eq!(public_identifier.as_deref(), Some("-//W3C//DTD HTML 4.01//EN"));
            assert_eq!(
                system_identifier.as_deref(),
                Some("http://www.w3.org/TR/html4/strict.dtd")
            );
            assert!(!force_quirks);
        }
        _ => panic!("Expected DOCTYPE token"),
    }
}

#[test]
fn test_doctype_missing_name_forces_quirks() {
    let (tokens, errors) = tokenize_with_errors("<!DOCTYPE>");
    match &tokens[0] {
        Token::Doctype {
            name, force_quirks, ..
        } => {
            assert!(name.is_none());
            assert!(force_quirks);
        }
        _ => panic!("Expected DOCTYPE token"),
    }
    assert_eq!(errors, vec!["missing-doctype-name"]);
}

#[test]
fn test_tag_name_is_lowercased() {
    let tokens = tokenize("<DiV></SPAN>");
    assert_eq!(tokens[0], Token::start_tag("div"));
    assert_eq!(tokens[1], Token::end_tag("span"));
}

#[test]
fn test_attribute_value_forms() {
    let tokens = tokenize(r#"<input type="text" name='q' value=plain disabled>"#);
    match &tokens[0] {
        Token::StartTag { attributes, .. } => {
            let pairs: Vec<(&str, &str)> = attributes
                .iter()
                .map(|attr| (attr.name.as_str(), attr.value.as_str()))
                .collect();
            assert_eq!(
                pairs,
                vec![
                    ("type", "text"),
                    ("name", "q"),
                    ("value", "plain"),
                    ("disabled", "")
                ]
            );
        }
        _ => panic!("Expected StartTag token"),
    }
}

#[test]
fn test_duplicate_attribute_keeps_first() {
    let (tokens, errors) = tokenize_with_errors(r#"<a href="one" HREF="two">"#);
    assert_eq!(tokens[0].attributes().len(), 1);
    assert_eq!(tokens[0].attribute("href"), Some("one"));
    assert_eq!(errors, vec!["duplicate-attribute"]);
}

#[test]
fn test_self_closing_tag() {
    let tokens = tokenize("<br/>");
    assert_eq!(tokens.len(), 2);
    match &tokens[0] {
        Token::StartTag {
            name, self_closing, ..
        } => {
            assert_eq!(name, "br");
            assert!(self_closing);
        }
        _ => panic!("Expected self-closing StartTag token"),
    }
}

#[test]
fn test_end_tag_with_attributes_is_an_error() {
    let (tokens, errors) = tokenize_with_errors("</p class=x>");
    assert!(tokens[0].is_end_tag("p"));
    assert_eq!(errors, vec!["end-tag-with-attributes"]);
}

#[test]
fn test_comment() {
    let tokens = tokenize("<!-- hello -->");
    assert_eq!(
        tokens[0],
        Token::Comment {
            data: " hello ".to_string()
        }
    );
}

#[test]
fn test_abrupt_empty_comment() {
    let (tokens, errors) = tokenize_with_errors("<!-->");
    assert_eq!(
        tokens[0],
        Token::Comment {
            data: String::new()
        }
    );
    assert_eq!(errors, vec!["abrupt-closing-of-empty-comment"]);
}

#[test]
fn test_unterminated_tag_is_dropped() {
    let (tokens, errors) = tokenize_with_errors("<div class=");
    assert_eq!(tokens, vec![Token::EndOfFile]);
    assert_eq!(errors, vec!["eof-in-tag"]);
}

#[test]
fn test_lone_less_than_is_text() {
    let (tokens, errors) = tokenize_with_errors("a < b");
    assert_eq!(leading_text(&tokens), "a < b");
    assert_eq!(errors, vec!["invalid-first-character-of-tag-name"]);
}

#[test]
fn test_newline_normalization() {
    let tokens = tokenize("a\r\nb\rc\n");
    assert_eq!(leading_text(&tokens), "a\nb\nc\n");
}

#[test]
fn test_token_positions() {
    let mut tokenizer = HTMLTokenizer::new("<p>\n  <b>x");
    assert!(tokenizer.next_token().is_start_tag("p"));
    let position = tokenizer.token_position();
    assert_eq!((position.line, position.column, position.offset), (1, 1, 0));

    // '\n', ' ', ' '
    for _ in 0..3 {
        assert!(matches!(tokenizer.next_token(), Token::Character { .. }));
    }
    assert!(tokenizer.next_token().is_start_tag("b"));
    let position = tokenizer.token_position();
    assert_eq!((position.line, position.column, position.offset), (2, 3, 6));
}

#[test]
fn test_error_positions_after_crlf() {
    let mut tokenizer = HTMLTokenizer::new("a\r\n<a x x>");
    tokenizer.run();
    let errors: Vec<ParseError> = tokenizer.take_errors();
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].message, "duplicate-attribute");
    assert_eq!(errors[0].line, 2);
}

#[test]
fn test_cdata_outside_foreign_content_is_a_bogus_comment() {
    let (tokens, errors) = tokenize_with_errors("<![CDATA[x]]>");
    assert_eq!(
        tokens[0],
        Token::Comment {
            data: "[CDATA[x]]".to_string()
        }
    );
    assert_eq!(errors, vec!["cdata-in-html-content"]);
}

#[test]
fn test_cdata_section_when_allowed() {
    let mut tokenizer = HTMLTokenizer::new("<![CDATA[a]b]]c]]>");
    tokenizer.set_cdata_allowed(true);
    tokenizer.run();
    let tokens = tokenizer.into_tokens();
    assert_eq!(
        tokens[0],
        Token::CData {
            data: "a]b]]c".to_string()
        }
    );
    assert!(matches!(tokens[1], Token::EndOfFile));
}

#[test]
fn test_unterminated_cdata_section() {
    let mut tokenizer = HTMLTokenizer::new("<![CDATA[abc");
    tokenizer.set_cdata_allowed(true);
    tokenizer.run();
    let codes: Vec<String> = tokenizer
        .take_errors()
        .into_iter()
        .map(|error| error.message)
        .collect();
    assert_eq!(codes, vec!["eof-in-cdata"]);
    assert_eq!(
        tokenizer.into_tokens(),
        vec![
            Token::CData {
                data: "abc".to_string()
            },
            Token::EndOfFile
        ]
    );
}

#[test]
fn test_processing_instruction() {
    let tokens = tokenize("<?php echo 1 ?>");
    assert_eq!(
        tokens[0],
        Token::ProcessingInstruction {
            target: "php".to_string(),
            data: "echo 1 ".to_string()
        }
    );
}

#[test]
fn test_processing_instruction_without_data() {
    let tokens = tokenize("<?xml?>x");
    assert_eq!(
        tokens[0],
        Token::ProcessingInstruction {
            target: "xml".to_string(),
            data: String::new()
        }
    );
    assert!(matches!(tokens[1], Token::Character { data: 'x' }));
}

#[test]
fn test_processing_instruction_at_eof() {
    let (tokens, errors) = tokenize_with_errors("<?pi data");
    assert!(matches!(
        &tokens[0],
        Token::ProcessingInstruction { target, data } if target == "pi" && data == "data"
    ));
    assert_eq!(errors, vec!["eof-in-processing-instruction"]);
}

#[test]
fn test_question_mark_without_target_is_a_bogus_comment() {
    let (tokens, errors) = tokenize_with_errors("<?>");
    assert_eq!(
        tokens[0],
        Token::Comment {
            data: "?".to_string()
        }
    );
    assert_eq!(errors, vec!["unexpected-question-mark-instead-of-tag-name"]);
}

#[test]
fn test_rcdata_decodes_references() {
    let tokens = tokenize_in(
        TokenizerState::RCDATA,
        "title",
        "a &amp; <b></title>",
    );
    assert_eq!(leading_text(&tokens), "a & <b>");
    assert!(tokens.iter().any(|token| token.is_end_tag("title")));
}

#[test]
fn test_rawtext_ignores_other_end_tags() {
    let tokens = tokenize_in(
        TokenizerState::RAWTEXT,
        "style",
        "p { } </p> &amp;</STYLE>",
    );
    assert_eq!(leading_text(&tokens), "p { } </p> &amp;");
    assert!(tokens.iter().any(|token| token.is_end_tag("style")));
}

#[test]
fn test_script_double_escape() {
    let tokens = tokenize_in(
        TokenizerState::ScriptData,
        "script",
        "<!--<script>x</script>--></script>",
    );
    assert_eq!(leading_text(&tokens), "<!--<script>x</script>-->");
    let end_tags = tokens
        .iter()
        .filter(|token| token.is_end_tag("script"))
        .count();
    assert_eq!(end_tags, 1);
}

#[test]
fn test_script_comment_at_eof() {
    let mut tokenizer = HTMLTokenizer::new("<!-- x");
    tokenizer.set_state(TokenizerState::ScriptData);
    tokenizer.set_last_start_tag(Some("script".to_string()));
    tokenizer.run();
    let codes: Vec<String> = tokenizer
        .take_errors()
        .into_iter()
        .map(|error| error.message)
        .collect();
    assert_eq!(codes, vec!["eof-in-script-html-comment-like-text"]);
}

#[test]
fn test_plaintext_never_ends() {
    let tokens = tokenize_in(TokenizerState::PLAINTEXT, "plaintext", "</plaintext><b>");
    assert_eq!(leading_text(&tokens), "</plaintext><b>");
}

#[test]
fn test_numeric_character_references() {
    let (tokens, errors) = tokenize_with_errors("&#x41;&#66;&#128;&#0;");
    assert_eq!(leading_text(&tokens), "AB\u{20AC}\u{FFFD}");
    assert_eq!(
        errors,
        vec!["control-character-reference", "null-character-reference"]
    );
}

#[test]
fn test_named_reference_without_semicolon() {
    let (tokens, errors) = tokenize_with_errors("&notit;");
    assert_eq!(leading_text(&tokens), "\u{AC}it;");
    assert_eq!(errors, vec!["missing-semicolon-after-character-reference"]);
}

#[test]
fn test_unknown_named_reference_is_kept() {
    let (tokens, errors) = tokenize_with_errors("&zzzz;");
    assert_eq!(leading_text(&tokens), "&zzzz;");
    assert_eq!(errors, vec!["unknown-named-character-reference"]);
}

#[test]
fn test_named_references_beyond_the_legacy_set() {
    let (tokens, errors) = tokenize_with_errors("&check;&half;&hearts;&rarr;&among;");
    assert_eq!(leading_text(&tokens), "\u{2713}\u{BD}\u{2665}\u{2192}&among;");
    // `among;` is not in the table
    assert_eq!(errors, vec!["unknown-named-character-reference"]);
}

#[test]
fn test_references_in_attribute_values() {
    let tokens = tokenize(r#"<a href="?x=1&amp;y=2&copy=3&lt">"#);
    assert_eq!(tokens[0].attribute("href"), Some("?x=1&y=2&copy=3<"));
}

#[test]
fn test_null_in_data_is_passed_through() {
    let (tokens, errors) = tokenize_with_errors("a\0b");
    assert_eq!(leading_text(&tokens), "a\0b");
    assert_eq!(errors, vec!["unexpected-null-character"]);
}
