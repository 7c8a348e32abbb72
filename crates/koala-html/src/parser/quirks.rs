//! [§ 13.2.6.4.1 The "initial" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#the-initial-insertion-mode)
//!
//! Document mode determination from the DOCTYPE token.

use koala_dom::DocumentMode;

/// "The public identifier starts with" any of these: quirks mode.
const QUIRKS_PUBLIC_ID_PREFIXES: &[&str] = &[
    "+//silmaril//dtd html pro v0r11 19970101//",
    "-//as//dtd html 3.0 aswedit + extensions//",
    "-//advasoft ltd//dtd html 3.0 aswedit + extensions//",
    "-//ietf//dtd html 2.0 level 1//",
    "-//ietf//dtd html 2.0 level 2//",
    "-//ietf//dtd html 2.0 strict level 1//",
    "-//ietf//dtd html 2.0 strict level 2//",
    "-//ietf//dtd html 2.0 strict//",
    "-//ietf//dtd html 2.0//",
    "-//ietf//dtd html 2.1e//",
    "-//ietf//dtd html 3.0//",
    "-//ietf//dtd html 3.2 final//",
    "-//ietf//dtd html 3.2//",
    "-//ietf//dtd html 3//",
    "-//ietf//dtd html level 0//",
    "-//ietf//dtd html level 1//",
    "-//ietf//dtd html level 2//",
    "-//ietf//dtd html level 3//",
    "-//ietf//dtd html strict level 0//",
    "-//ietf//dtd html strict level 1//",
    "-//ietf//dtd html strict level 2//",
    "-//ietf//dtd html strict level 3//",
    "-//ietf//dtd html strict//",
    "-//ietf//dtd html//",
    "-//metrius//dtd metrius presentational//",
    "-//microsoft//dtd internet explorer 2.0 html strict//",
    "-//microsoft//dtd internet explorer 2.0 html//",
    "-//microsoft//dtd internet explorer 2.0 tables//",
    "-//microsoft//dtd internet explorer 3.0 html strict//",
    "-//microsoft//dtd internet explorer 3.0 html//",
    "-//microsoft//dtd internet explorer 3.0 tables//",
    "-//netscape comm. corp.//dtd html//",
    "-//netscape comm. corp.//dtd strict html//",
    "-//o'reilly and associates//dtd html 2.0//",
    "-//o'reilly and associates//dtd html extended 1.0//",
    "-//o'reilly and associates//dtd html extended relaxed 1.0//",
    "-//sq//dtd html 2.0 hotmetal + extensions//",
    "-//softquad software//dtd hotmetal pro 6.0::19990601::extensions to html 4.0//",
    "-//softquad//dtd hotmetal pro 4.0::19971010::extensions to html 4.0//",
    "-//spyglass//dtd html 2.0 extended//",
    "-//sun microsystems corp.//dtd hotjava html//",
    "-//sun microsystems corp.//dtd hotjava strict html//",
    "-//w3c//dtd html 3 1995-03-24//",
    "-//w3c//dtd html 3.2 draft//",
    "-//w3c//dtd html 3.2 final//",
    "-//w3c//dtd html 3.2//",
    "-//w3c//dtd html 3.2s draft//",
    "-//w3c//dtd html 4.0 frameset//",
    "-//w3c//dtd html 4.0 transitional//",
    "-//w3c//dtd html experimental 19960712//",
    "-//w3c//dtd html experimental 970421//",
    "-//w3c//dtd w3 html//",
    "-//w3o//dtd w3 html 3.0//",
    "-//webtechs//dtd mozilla html 2.0//",
    "-//webtechs//dtd mozilla html//",
];

/// "The public identifier is set to" any of these: quirks mode.
const QUIRKS_PUBLIC_IDS: &[&str] = &[
    "-//w3o//dtd w3 html strict 3.0//en//",
    "-/w3c/dtd html 4.0 transitional/en",
    "html",
];

const QUIRKS_SYSTEM_ID: &str = "http://www.ibm.com/data/dtd/v11/ibmxhtml1-transitional.dtd";

/// Quirks when the system identifier is missing, limited quirks otherwise.
const HTML401_PREFIXES: &[&str] = &[
    "-//w3c//dtd html 4.01 frameset//",
    "-//w3c//dtd html 4.01 transitional//",
];

const LIMITED_QUIRKS_PREFIXES: &[&str] = &[
    "-//w3c//dtd xhtml 1.0 frameset//",
    "-//w3c//dtd xhtml 1.0 transitional//",
];

fn starts_with_any(value: &str, prefixes: &[&str]) -> bool {
    prefixes.iter().any(|prefix| value.starts_with(prefix))
}

/// The document mode a DOCTYPE token selects.
///
/// "Then, if the document is not an iframe srcdoc document, and the parser
/// cannot change the mode flag is false, and the DOCTYPE token matches one of
/// the conditions in the following list, then set the Document to quirks mode"
///
/// All comparisons are ASCII case-insensitive.
#[must_use]
pub fn document_mode_for_doctype(
    name: Option<&str>,
    public_id: Option<&str>,
    system_id: Option<&str>,
    force_quirks: bool,
) -> DocumentMode {
    let public = public_id.map(str::to_ascii_lowercase);
    let system = system_id.map(str::to_ascii_lowercase);
    let public_str = public.as_deref().unwrap_or_default();

    // "The force-quirks flag is set to on."
    // "The name is not "html"."
    if force_quirks || name != Some("html") {
        return DocumentMode::Quirks;
    }
    if public.as_deref().is_some_and(|id| {
        QUIRKS_PUBLIC_IDS.contains(&id) || starts_with_any(id, QUIRKS_PUBLIC_ID_PREFIXES)
    }) {
        return DocumentMode::Quirks;
    }
    if system.as_deref() == Some(QUIRKS_SYSTEM_ID) {
        return DocumentMode::Quirks;
    }
    // "The system identifier is missing and the public identifier starts
    // with: "-//W3C//DTD HTML 4.01 Frameset//" ..."
    if system.is_none() && starts_with_any(public_str, HTML401_PREFIXES) {
        return DocumentMode::Quirks;
    }

    // "Otherwise, if the document is not an iframe srcdoc document, and the
    // parser cannot change the mode flag is false, and the DOCTYPE token
    // matches one of the conditions in the following list, then set the
    // Document to limited-quirks mode"
    if starts_with_any(public_str, LIMITED_QUIRKS_PREFIXES)
        || (system.is_some() && starts_with_any(public_str, HTML401_PREFIXES))
    {
        return DocumentMode::LimitedQuirks;
    }
    DocumentMode::NoQuirks
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_html5_doctype_is_no_quirks() {
        assert_eq!(
            document_mode_for_doctype(Some("html"), None, None, false),
            DocumentMode::NoQuirks
        );
    }

    #[test]
    fn test_legacy_public_ids() {
        assert_eq!(
            document_mode_for_doctype(
                Some("html"),
                Some("-//W3C//DTD HTML 3.2 Final//EN"),
                None,
                false
            ),
            DocumentMode::Quirks
        );
        assert_eq!(
            document_mode_for_doctype(
                Some("html"),
                Some("-//W3C//DTD HTML 4.01 Transitional//EN"),
                None,
                false
            ),
            DocumentMode::Quirks
        );
        assert_eq!(
            document_mode_for_doctype(
                Some("html"),
                Some("-//W3C//DTD HTML 4.01 Transitional//EN"),
                Some("http://www.w3.org/TR/html4/loose.dtd"),
                false
            ),
            DocumentMode::LimitedQuirks
        );
    }

    #[test]
    fn test_force_quirks_and_wrong_name() {
        assert_eq!(
            document_mode_for_doctype(Some("html"), None, None, true),
            DocumentMode::Quirks
        );
        assert_eq!(
            document_mode_for_doctype(Some("svg"), None, None, false),
            DocumentMode::Quirks
        );
    }
}
