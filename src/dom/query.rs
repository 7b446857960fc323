//! Selector sublanguage used to locate guide targets
//!
//! Supported syntax: type and universal selectors, `#id`, `.class`, attribute
//! conditions (`[a]`, `[a=v]`, `[a^=v]`, `[a$=v]`, `[a*=v]`, `[a~=v]`), the structural
//! pseudo-classes `:first-child`, `:last-child`, `:nth-child(n)` and `:nth-of-type(n)`,
//! child (`>`) and descendant combinators, and comma-separated groups.

use crate::dom::{LiveDocument, NodeHandle};
use crate::error::{GuideError, Result};

/// Parsed, comma-separated selector groups
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectorList {
    groups: Vec<Vec<SelectorPart>>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct SelectorPart {
    compound: Compound,
    // Relation to the part on the left.
    combinator: Option<Combinator>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Combinator {
    Descendant,
    Child,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct Compound {
    tag: Option<String>,
    universal: bool,
    id: Option<String>,
    classes: Vec<String>,
    attrs: Vec<AttrCondition>,
    pseudo_classes: Vec<PseudoClass>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum AttrCondition {
    Exists { name: String },
    Equals { name: String, value: String },
    Prefix { name: String, value: String },
    Suffix { name: String, value: String },
    Substring { name: String, value: String },
    Word { name: String, value: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum PseudoClass {
    FirstChild,
    LastChild,
    NthChild(usize),
    NthOfType(usize),
}

impl SelectorList {
    pub fn parse(selector: &str) -> Result<Self> {
        Parser::new(selector).parse_list()
    }

    /// Whether `node` matches any group of this selector
    pub fn matches<D: LiveDocument + ?Sized>(&self, doc: &D, node: NodeHandle) -> bool {
        doc.tag_name(node).is_some()
            && self
                .groups
                .iter()
                .any(|parts| matches_from(doc, node, parts, parts.len() - 1))
    }
}

/// Evaluate `selector` against the whole document, returning matches in document order
pub fn select_all<D: LiveDocument + ?Sized>(doc: &D, selector: &str) -> Result<Vec<NodeHandle>> {
    let list = SelectorList::parse(selector)?;

    let mut matched = Vec::new();
    let mut stack = vec![doc.root()];
    while let Some(node) = stack.pop() {
        if list.matches(doc, node) {
            matched.push(node);
        }
        let children = doc.children(node);
        stack.extend(children.into_iter().rev());
    }
    Ok(matched)
}

/// Escape `ident` so it can be used after `#` or `.`
///
/// Follows `CSS.escape`: a leading digit (or a digit after a leading `-`) and control
/// characters become code point escapes such as `\31 `.
pub fn escape_ident(ident: &str) -> String {
    let mut out = String::with_capacity(ident.len());
    let starts_with_dash = ident.starts_with('-');
    for (i, ch) in ident.chars().enumerate() {
        let leading_digit = ch.is_ascii_digit() && (i == 0 || (i == 1 && starts_with_dash));
        match ch {
            '\0' => out.push('\u{FFFD}'),
            _ if leading_digit || (ch.is_control() && ch.is_ascii()) => {
                out.push_str(&format!("\\{:x} ", u32::from(ch)));
            }
            '-' if i == 0 && ident.len() == 1 => out.push_str("\\-"),
            _ if is_ident_char(ch) => out.push(ch),
            _ => {
                out.push('\\');
                out.push(ch);
            }
        }
    }
    out
}

/// Quote `value` for use inside an attribute condition
pub fn quote_attr_value(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    out.push('"');
    for ch in value.chars() {
        if ch == '"' || ch == '\\' {
            out.push('\\');
        }
        out.push(ch);
    }
    out.push('"');
    out
}

fn is_ident_char(ch: char) -> bool {
    ch.is_ascii_alphanumeric() || ch == '-' || ch == '_' || !ch.is_ascii()
}

fn matches_from<D: LiveDocument + ?Sized>(
    doc: &D,
    node: NodeHandle,
    parts: &[SelectorPart],
    idx: usize,
) -> bool {
    if !matches_compound(doc, node, &parts[idx].compound) {
        return false;
    }
    if idx == 0 {
        return true;
    }

    match parts[idx].combinator.unwrap_or(Combinator::Descendant) {
        Combinator::Child => doc
            .parent(node)
            .is_some_and(|parent| matches_from(doc, parent, parts, idx - 1)),
        Combinator::Descendant => {
            let mut cursor = doc.parent(node);
            while let Some(ancestor) = cursor {
                if matches_from(doc, ancestor, parts, idx - 1) {
                    return true;
                }
                cursor = doc.parent(ancestor);
            }
            false
        }
    }
}

fn matches_compound<D: LiveDocument + ?Sized>(doc: &D, node: NodeHandle, compound: &Compound) -> bool {
    let Some(tag_name) = doc.tag_name(node) else {
        return false;
    };

    if let Some(tag) = &compound.tag {
        if !tag_name.eq_ignore_ascii_case(tag) {
            return false;
        }
    }

    if let Some(id) = &compound.id {
        if doc.attribute(node, "id") != Some(id.as_str()) {
            return false;
        }
    }

    if !compound.classes.is_empty() {
        let classes = doc.class_list(node);
        if compound
            .classes
            .iter()
            .any(|class_name| !classes.contains(&class_name.as_str()))
        {
            return false;
        }
    }

    let attrs_match = compound.attrs.iter().all(|cond| match cond {
        AttrCondition::Exists { name } => doc.attribute(node, name).is_some(),
        AttrCondition::Equals { name, value } => doc.attribute(node, name) == Some(value.as_str()),
        AttrCondition::Prefix { name, value } => {
            !value.is_empty() && doc.attribute(node, name).is_some_and(|v| v.starts_with(value.as_str()))
        }
        AttrCondition::Suffix { name, value } => {
            !value.is_empty() && doc.attribute(node, name).is_some_and(|v| v.ends_with(value.as_str()))
        }
        AttrCondition::Substring { name, value } => {
            !value.is_empty() && doc.attribute(node, name).is_some_and(|v| v.contains(value.as_str()))
        }
        AttrCondition::Word { name, value } => doc
            .attribute(node, name)
            .is_some_and(|v| v.split_whitespace().any(|word| word == value)),
    });
    if !attrs_match {
        return false;
    }

    compound
        .pseudo_classes
        .iter()
        .all(|pseudo| matches_pseudo(doc, node, tag_name, pseudo))
}

fn matches_pseudo<D: LiveDocument + ?Sized>(
    doc: &D,
    node: NodeHandle,
    tag_name: &str,
    pseudo: &PseudoClass,
) -> bool {
    let Some(parent) = doc.parent(node) else {
        return false;
    };
    let siblings = doc.children(parent);

    match pseudo {
        PseudoClass::FirstChild => siblings.first() == Some(&node),
        PseudoClass::LastChild => siblings.last() == Some(&node),
        PseudoClass::NthChild(n) => siblings.iter().position(|s| *s == node) == Some(n - 1),
        PseudoClass::NthOfType(n) => siblings
            .iter()
            .filter(|s| {
                doc.tag_name(**s)
                    .is_some_and(|t| t.eq_ignore_ascii_case(tag_name))
            })
            .position(|s| *s == node)
            == Some(n - 1),
    }
}

struct Parser<'a> {
    source: &'a str,
    chars: Vec<char>,
    pos: usize,
}

impl<'a> Parser<'a> {
    fn new(source: &'a str) -> Self {
        Self {
            source,
            chars: source.chars().collect(),
            pos: 0,
        }
    }

    fn error(&self) -> GuideError {
        GuideError::UnsupportedSelector(self.source.to_string())
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn bump(&mut self) -> Option<char> {
        let ch = self.peek()?;
        self.pos += 1;
        Some(ch)
    }

    fn eat(&mut self, expected: char) -> bool {
        if self.peek() == Some(expected) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn skip_whitespace(&mut self) -> bool {
        let start = self.pos;
        while self.peek().is_some_and(char::is_whitespace) {
            self.pos += 1;
        }
        self.pos > start
    }

    fn parse_list(mut self) -> Result<SelectorList> {
        let mut groups = Vec::new();
        loop {
            self.skip_whitespace();
            groups.push(self.parse_complex()?);
            self.skip_whitespace();
            match self.bump() {
                Some(',') => continue,
                None => break,
                Some(_) => return Err(self.error()),
            }
        }
        Ok(SelectorList { groups })
    }

    fn parse_complex(&mut self) -> Result<Vec<SelectorPart>> {
        let mut parts = vec![SelectorPart {
            compound: self.parse_compound()?,
            combinator: None,
        }];

        loop {
            let had_space = self.skip_whitespace();
            let combinator = match self.peek() {
                None | Some(',') => {
                    // Leave trailing whitespace and commas to the list parser.
                    break;
                }
                Some('>') => {
                    self.pos += 1;
                    self.skip_whitespace();
                    Combinator::Child
                }
                Some(_) if had_space => Combinator::Descendant,
                Some(_) => return Err(self.error()),
            };
            parts.push(SelectorPart {
                compound: self.parse_compound()?,
                combinator: Some(combinator),
            });
        }

        Ok(parts)
    }

    fn parse_compound(&mut self) -> Result<Compound> {
        let mut compound = Compound::default();
        let start = self.pos;

        loop {
            match self.peek() {
                Some('*') if self.pos == start => {
                    self.pos += 1;
                    compound.universal = true;
                }
                Some(ch) if self.pos == start && (is_ident_char(ch) || ch == '\\') => {
                    compound.tag = Some(self.parse_ident()?.to_ascii_lowercase());
                }
                Some('#') => {
                    self.pos += 1;
                    let id = self.parse_ident()?;
                    if compound.id.replace(id).is_some() {
                        return Err(self.error());
                    }
                }
                Some('.') => {
                    self.pos += 1;
                    compound.classes.push(self.parse_ident()?);
                }
                Some('[') => {
                    self.pos += 1;
                    compound.attrs.push(self.parse_attr()?);
                }
                Some(':') => {
                    self.pos += 1;
                    compound.pseudo_classes.push(self.parse_pseudo()?);
                }
                _ => break,
            }
        }

        if self.pos == start {
            return Err(self.error());
        }
        Ok(compound)
    }

    fn parse_ident(&mut self) -> Result<String> {
        let mut ident = String::new();
        while let Some(ch) = self.peek() {
            if ch == '\\' {
                self.pos += 1;
                ident.push(self.parse_escape()?);
            } else if is_ident_char(ch) {
                self.pos += 1;
                ident.push(ch);
            } else {
                break;
            }
        }
        if ident.is_empty() {
            return Err(self.error());
        }
        Ok(ident)
    }

    /// The character after a `\\`: either taken literally or a 1-6 digit hex code point
    /// closed by one optional whitespace
    fn parse_escape(&mut self) -> Result<char> {
        let mut code = String::new();
        while code.len() < 6 && self.peek().is_some_and(|c| c.is_ascii_hexdigit()) {
            code.extend(self.bump());
        }
        if code.is_empty() {
            return self.bump().ok_or_else(|| self.error());
        }
        if self.peek().is_some_and(char::is_whitespace) {
            self.pos += 1;
        }

        let decoded = u32::from_str_radix(&code, 16)
            .ok()
            .filter(|&c| c != 0)
            .and_then(char::from_u32)
            .unwrap_or(char::REPLACEMENT_CHARACTER);
        Ok(decoded)
    }

    fn parse_attr(&mut self) -> Result<AttrCondition> {
        self.skip_whitespace();
        let name = self.parse_ident()?;
        self.skip_whitespace();

        if self.eat(']') {
            return Ok(AttrCondition::Exists { name });
        }

        let operator = match self.bump() {
            Some('=') => '=',
            Some(op @ ('^' | '$' | '*' | '~')) if self.eat('=') => op,
            _ => return Err(self.error()),
        };
        self.skip_whitespace();
        let value = match self.peek() {
            Some(quote @ ('"' | '\'')) => {
                self.pos += 1;
                self.parse_quoted(quote)?
            }
            _ => self.parse_ident()?,
        };
        self.skip_whitespace();
        if !self.eat(']') {
            return Err(self.error());
        }

        Ok(match operator {
            '=' => AttrCondition::Equals { name, value },
            '^' => AttrCondition::Prefix { name, value },
            '$' => AttrCondition::Suffix { name, value },
            '*' => AttrCondition::Substring { name, value },
            _ => AttrCondition::Word { name, value },
        })
    }

    fn parse_quoted(&mut self, quote: char) -> Result<String> {
        let mut value = String::new();
        loop {
            match self.bump() {
                Some('\\') => value.push(self.bump().ok_or_else(|| self.error())?),
                Some(ch) if ch == quote => return Ok(value),
                Some(ch) => value.push(ch),
                None => return Err(self.error()),
            }
        }
    }

    fn parse_pseudo(&mut self) -> Result<PseudoClass> {
        let name = self.parse_ident()?.to_ascii_lowercase();
        match name.as_str() {
            "first-child" => Ok(PseudoClass::FirstChild),
            "last-child" => Ok(PseudoClass::LastChild),
            "nth-child" => Ok(PseudoClass::NthChild(self.parse_position()?)),
            "nth-of-type" => Ok(PseudoClass::NthOfType(self.parse_position()?)),
            _ => Err(self.error()),
        }
    }

    fn parse_position(&mut self) -> Result<usize> {
        if !self.eat('(') {
            return Err(self.error());
        }
        self.skip_whitespace();
        let mut digits = String::new();
        while let Some(ch) = self.peek().filter(char::is_ascii_digit) {
            self.pos += 1;
            digits.push(ch);
        }
        self.skip_whitespace();
        if !self.eat(')') {
            return Err(self.error());
        }
        match digits.parse::<usize>() {
            Ok(n) if n >= 1 => Ok(n),
            _ => Err(self.error()),
        }
    }
}
