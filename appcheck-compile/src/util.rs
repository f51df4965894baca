use std::borrow::Cow;

use lazy_static::lazy_static;
use regex::{Captures, Regex};

const LIST_PREFIX: &str = "List[";
const LIST_SUFFIX: &str = "]";

pub fn is_ty_list(ty: &str) -> bool {
    ty.len() > LIST_PREFIX.len() + LIST_SUFFIX.len()
        && ty.starts_with(LIST_PREFIX)
        && ty.ends_with(LIST_SUFFIX)
}

/// Element type of a `List[T]`, or the type itself when it is not a list.
pub fn strip_ty_list(ty: &str) -> &str {
    if is_ty_list(ty) {
        return &ty[LIST_PREFIX.len()..(ty.len() - LIST_SUFFIX.len())];
    }

    ty
}

/// Maps a project field type onto its declaration type.
pub fn map_type(ty: &str) -> Cow<'_, str> {
    match ty {
        "Number" => Cow::Borrowed("number"),
        "String" => Cow::Borrowed("string"),
        "Boolean" => Cow::Borrowed("boolean"),
        "Date" => Cow::Borrowed("Date"),
        "Dynamic" => Cow::Borrowed("unknown"),
        ty if is_ty_list(ty) => Cow::Owned(format!("List<{}>", map_type(strip_ty_list(ty)))),
        ty => Cow::Borrowed(ty),
    }
}

/// Uppercases the first character, leaving the rest untouched.
pub fn capitalize(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Renders `name` or `name<arg, ...>`.
pub fn type_reference(name: &str, args: &[String]) -> String {
    if args.is_empty() {
        name.to_string()
    } else {
        format!("{}<{}>", name, args.join(", "))
    }
}

lazy_static! {
    static ref HEX_ESCAPE_RE: Regex = Regex::new(r"&#x([0-9a-fA-F]+);").unwrap();
    static ref QUERY_IDENT_RE: Regex = Regex::new(r"\bquery\b").unwrap();
}

/// Decodes `&#x<hex>;` character references. Invalid code points are left as-is.
pub fn decode_hex_escapes(text: &str) -> Cow<'_, str> {
    HEX_ESCAPE_RE.replace_all(text, |caps: &Captures| {
        u32::from_str_radix(&caps[1], 16)
            .ok()
            .and_then(char::from_u32)
            .map(String::from)
            .unwrap_or_else(|| caps[0].to_string())
    })
}

pub fn references_query(code: &str) -> bool {
    QUERY_IDENT_RE.is_match(code)
}

/// Trims trailing whitespace, collapses blank line runs and ends with one newline.
pub fn canonicalize(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    // leading blank lines are dropped
    let mut blank_run = true;

    for line in text.lines() {
        let line = line.trim_end();
        if line.is_empty() {
            if !blank_run {
                out.push('\n');
            }
            blank_run = true;
            continue;
        }
        blank_run = false;
        out.push_str(line);
        out.push('\n');
    }

    if out.ends_with("\n\n") {
        out.pop();
    }

    out
}
