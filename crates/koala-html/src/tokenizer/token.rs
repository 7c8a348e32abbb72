use std::fmt;

/// An attribute on a start or end tag token.
///
/// Per [§ 13.2.5 Tokenization](https://html.spec.whatwg.org/multipage/parsing.html#tokenization):
/// "a list of attributes, each of which has a name and a value"
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    /// "each of which has a name"
    pub name: String,
    /// "and a value"
    pub value: String,
}

impl Attribute {
    /// Create a new attribute with the given name and value.
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// [§ 13.2.5 Tokenization](https://html.spec.whatwg.org/multipage/parsing.html#tokenization)
///
/// "The output of the tokenization step is a series of zero or more of the following
/// tokens: DOCTYPE, start tag, end tag, comment, character, end-of-file."
///
/// Two kinds are added on top of that list: a CDATA section is delivered as a
/// single [`Token::CData`] rather than a run of characters, so the tree keeps
/// it as a CDATA node, and `<?target data?>` is a [`Token::ProcessingInstruction`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    /// "DOCTYPE tokens have a name, a public identifier, a system identifier,
    /// and a force-quirks flag. When a DOCTYPE token is created, its name,
    /// public identifier, and system identifier must be marked as missing
    /// (which is a distinct state from the empty string), and the force-quirks
    /// flag must be set to off (its other state is on)."
    Doctype {
        /// "a name"
        name: Option<String>,
        /// "a public identifier"
        public_identifier: Option<String>,
        /// "a system identifier"
        system_identifier: Option<String>,
        /// "a force-quirks flag"
        force_quirks: bool,
    },

    /// "Start and end tag tokens have a tag name, a self-closing flag, and a
    /// list of attributes, each of which has a name and a value."
    StartTag {
        /// "a tag name"
        name: String,
        /// "a self-closing flag"
        self_closing: bool,
        /// "a list of attributes"
        attributes: Vec<Attribute>,
    },

    /// End tag token. Attributes and the self-closing flag are parsed but
    /// only reported as errors when the token is emitted.
    EndTag {
        /// "a tag name"
        name: String,
        /// "a self-closing flag"
        self_closing: bool,
        /// "a list of attributes"
        attributes: Vec<Attribute>,
    },

    /// "Comment and character tokens have data."
    Comment {
        /// "data"
        data: String,
    },

    /// "Comment and character tokens have data."
    Character {
        /// "data"
        data: char,
    },

    /// The contents of a `<![CDATA[ ... ]]>` section in foreign content.
    CData {
        /// Everything between `<![CDATA[` and `]]>`.
        data: String,
    },

    /// A processing instruction, `<?target data?>`.
    ProcessingInstruction {
        /// The name directly after `<?`.
        target: String,
        /// Everything after the target and its trailing whitespace, up to `?>`.
        data: String,
    },

    /// "end-of-file"
    EndOfFile,
}

impl Token {
    /// [§ 13.2.5.53 DOCTYPE state](https://html.spec.whatwg.org/multipage/parsing.html#doctype-state)
    ///
    /// All identifiers missing, force-quirks off.
    #[must_use]
    pub const fn new_doctype() -> Self {
        Self::Doctype {
            name: None,
            public_identifier: None,
            system_identifier: None,
            force_quirks: false,
        }
    }

    /// [§ 13.2.5.6 Tag open state](https://html.spec.whatwg.org/multipage/parsing.html#tag-open-state)
    ///
    /// "Create a new start tag token, set its tag name to the empty string."
    #[must_use]
    pub const fn new_start_tag() -> Self {
        Self::StartTag {
            name: String::new(),
            self_closing: false,
            attributes: Vec::new(),
        }
    }

    /// "Create a new end tag token, set its tag name to the empty string."
    #[must_use]
    pub const fn new_end_tag() -> Self {
        Self::EndTag {
            name: String::new(),
            self_closing: false,
            attributes: Vec::new(),
        }
    }

    /// "Create a comment token whose data is the empty string."
    #[must_use]
    pub const fn new_comment() -> Self {
        Self::Comment {
            data: String::new(),
        }
    }

    /// A character token.
    #[must_use]
    pub const fn new_character(data: char) -> Self {
        Self::Character { data }
    }

    /// A CDATA section token with empty data.
    #[must_use]
    pub const fn new_cdata() -> Self {
        Self::CData {
            data: String::new(),
        }
    }

    /// A processing instruction token with empty target and data.
    #[must_use]
    pub const fn new_processing_instruction() -> Self {
        Self::ProcessingInstruction {
            target: String::new(),
            data: String::new(),
        }
    }

    /// A start tag built directly, used by the tree builder for implied tags
    /// ("insert an HTML element for a "body" start tag token with no attributes").
    #[must_use]
    pub fn start_tag(name: &str) -> Self {
        Self::StartTag {
            name: name.to_string(),
            self_closing: false,
            attributes: Vec::new(),
        }
    }

    /// An end tag built directly ("act as if an end tag token with the tag
    /// name "p" had been seen").
    #[must_use]
    pub fn end_tag(name: &str) -> Self {
        Self::EndTag {
            name: name.to_string(),
            self_closing: false,
            attributes: Vec::new(),
        }
    }

    /// The tag name, for start and end tags.
    #[must_use]
    pub fn tag_name(&self) -> Option<&str> {
        match self {
            Self::StartTag { name, .. } | Self::EndTag { name, .. } => Some(name),
            _ => None,
        }
    }

    /// The tag's attributes, empty for other token kinds.
    #[must_use]
    pub fn attributes(&self) -> &[Attribute] {
        match self {
            Self::StartTag { attributes, .. } | Self::EndTag { attributes, .. } => attributes,
            _ => &[],
        }
    }

    /// The value of the attribute named `name`, if the token is a tag carrying it.
    #[must_use]
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes()
            .iter()
            .find(|a| a.name == name)
            .map(|a| a.value.as_str())
    }

    /// Whether this is a start tag with the given name.
    #[must_use]
    pub fn is_start_tag(&self, tag: &str) -> bool {
        matches!(self, Self::StartTag { name, .. } if name == tag)
    }

    /// Whether this is an end tag with the given name.
    #[must_use]
    pub fn is_end_tag(&self, tag: &str) -> bool {
        matches!(self, Self::EndTag { name, .. } if name == tag)
    }

    // ----- DOCTYPE builders -----

    /// "Append the current input character to the current DOCTYPE token's name."
    ///
    /// A missing name becomes present on the first append.
    pub fn append_to_doctype_name(&mut self, c: char) {
        if let Self::Doctype { name, .. } = self {
            name.get_or_insert_with(String::new).push(c);
        }
    }

    /// "Set the DOCTYPE token's public identifier to the empty string (not missing)."
    pub fn set_public_identifier_empty(&mut self) {
        if let Self::Doctype {
            public_identifier, ..
        } = self
        {
            *public_identifier = Some(String::new());
        }
    }

    /// "Append the current input character to the current DOCTYPE token's public identifier."
    pub fn append_to_public_identifier(&mut self, c: char) {
        if let Self::Doctype {
            public_identifier, ..
        } = self
        {
            public_identifier.get_or_insert_with(String::new).push(c);
        }
    }

    /// "Set the DOCTYPE token's system identifier to the empty string (not missing)."
    pub fn set_system_identifier_empty(&mut self) {
        if let Self::Doctype {
            system_identifier, ..
        } = self
        {
            *system_identifier = Some(String::new());
        }
    }

    /// "Append the current input character to the current DOCTYPE token's system identifier."
    pub fn append_to_system_identifier(&mut self, c: char) {
        if let Self::Doctype {
            system_identifier, ..
        } = self
        {
            system_identifier.get_or_insert_with(String::new).push(c);
        }
    }

    /// "Set the current DOCTYPE token's force-quirks flag to on."
    pub const fn set_force_quirks(&mut self) {
        if let Self::Doctype { force_quirks, .. } = self {
            *force_quirks = true;
        }
    }

    // ----- tag builders -----

    /// "Append the current input character to the current tag token's tag name."
    pub fn append_to_tag_name(&mut self, c: char) {
        if let Self::StartTag { name, .. } | Self::EndTag { name, .. } = self {
            name.push(c);
        }
    }

    /// "Set the self-closing flag of the current tag token."
    pub const fn set_self_closing(&mut self) {
        if let Self::StartTag { self_closing, .. } | Self::EndTag { self_closing, .. } = self {
            *self_closing = true;
        }
    }

    /// "Start a new attribute in the current tag token. Set that attribute's
    /// name and value to the empty string."
    pub fn start_new_attribute(&mut self) {
        if let Self::StartTag { attributes, .. } | Self::EndTag { attributes, .. } = self {
            attributes.push(Attribute::new(String::new(), String::new()));
        }
    }

    /// "Append the current input character to the current attribute's name."
    pub fn append_to_current_attribute_name(&mut self, c: char) {
        if let Some(attr) = self.current_attribute_mut() {
            attr.name.push(c);
        }
    }

    /// "Append the current input character to the current attribute's value."
    pub fn append_to_current_attribute_value(&mut self, c: char) {
        if let Some(attr) = self.current_attribute_mut() {
            attr.value.push(c);
        }
    }

    /// [§ 13.2.5.33 Attribute name state](https://html.spec.whatwg.org/multipage/parsing.html#attribute-name-state)
    ///
    /// "if there is already an attribute on the token with the exact same name"
    #[must_use]
    pub fn current_attribute_name_is_duplicate(&self) -> bool {
        match self.attributes().split_last() {
            Some((current, earlier)) => earlier.iter().any(|a| a.name == current.name),
            None => false,
        }
    }

    /// "the new attribute must be removed from the token"
    pub fn remove_current_attribute(&mut self) {
        if let Self::StartTag { attributes, .. } | Self::EndTag { attributes, .. } = self {
            let _ = attributes.pop();
        }
    }

    fn current_attribute_mut(&mut self) -> Option<&mut Attribute> {
        match self {
            Self::StartTag { attributes, .. } | Self::EndTag { attributes, .. } => {
                attributes.last_mut()
            }
            _ => None,
        }
    }

    // ----- text builders -----

    /// "Append the current input character to the comment token's data."
    ///
    /// Also used for CDATA and processing instruction data.
    pub fn append_to_comment(&mut self, c: char) {
        match self {
            Self::Comment { data }
            | Self::CData { data }
            | Self::ProcessingInstruction { data, .. } => {
                data.push(c);
            }
            _ => {}
        }
    }

    /// Append to a processing instruction's target.
    pub fn append_to_target(&mut self, c: char) {
        if let Self::ProcessingInstruction { target, .. } = self {
            target.push(c);
        }
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Doctype {
                name,
                public_identifier,
                system_identifier,
                force_quirks,
            } => {
                write!(f, "DOCTYPE")?;
                if let Some(n) = name {
                    write!(f, " {n}")?;
                }
                if let Some(pub_id) = public_identifier {
                    write!(f, " PUBLIC \"{pub_id}\"")?;
                }
                if let Some(sys_id) = system_identifier {
                    write!(f, " SYSTEM \"{sys_id}\"")?;
                }
                if *force_quirks {
                    write!(f, " (force-quirks)")?;
                }
                Ok(())
            }
            Self::StartTag {
                name,
                self_closing,
                attributes,
            } => {
                write!(f, "<{name}")?;
                for attr in attributes {
                    write!(f, " {}=\"{}\"", attr.name, attr.value)?;
                }
                if *self_closing {
                    write!(f, " /")?;
                }
                write!(f, ">")
            }
            Self::EndTag { name, .. } => write!(f, "</{name}>"),
            Self::Comment { data } => write!(f, "<!--{data}-->"),
            Self::Character { data } => match data {
                '\n' => write!(f, "Character(\\n)"),
                '\t' => write!(f, "Character(\\t)"),
                ' ' => write!(f, "Character(SPACE)"),
                c => write!(f, "Character({c})"),
            },
            Self::CData { data } => write!(f, "<![CDATA[{data}]]>"),
            Self::ProcessingInstruction { target, data } => write!(f, "<?{target} {data}?>"),
            Self::EndOfFile => write!(f, "EOF"),
        }
    }
}
