//! Expression evaluation results and the child-lookup callback.
//!
//! Evaluation is a secondary capability of the symbol host used for
//! interactive inspection. Composite values are expanded lazily: the host
//! asks the caller for named children through a [`ChildVisitor`] while the
//! evaluation is running, never afterwards.

use crate::error::{IlmapError, IlmapResult};
use crate::types::ValueHandle;

/// How an evaluation result is represented.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeClass
{
    /// A live value in the debuggee.
    Value,
    /// A composite whose members are fetched on demand.
    Object,
    /// A string rendered as text.
    String,
    /// A primitive carried as raw little-endian bytes.
    Primitive,
}

/// Result payload of an evaluation or of a child lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EvalValue
{
    /// Handle to a debuggee value.
    Value(ValueHandle),
    /// Composite object without an inline representation.
    Object,
    /// Text result.
    Text(String),
    /// Raw primitive bytes.
    Bytes(Vec<u8>),
}

impl EvalValue
{
    /// Classification of this payload.
    #[must_use]
    pub fn type_class(&self) -> TypeClass
    {
        match self {
            Self::Value(_) => TypeClass::Value,
            Self::Object => TypeClass::Object,
            Self::Text(_) => TypeClass::String,
            Self::Bytes(_) => TypeClass::Primitive,
        }
    }
}

/// Successful evaluation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EvalOutcome
{
    /// The produced value.
    pub value: EvalValue,
}

impl EvalOutcome
{
    /// Classification of the result.
    #[must_use]
    pub fn type_class(&self) -> TypeClass
    {
        self.value.type_class()
    }
}

/// A parsed literal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParsedValue
{
    /// `System.String` literal contents.
    Text(String),
    /// Little-endian bytes of any other primitive.
    Bytes(Vec<u8>),
}

/// Resolves a named member of a value during evaluation.
///
/// `parent` is `None` for names looked up in the current scope (locals,
/// arguments). Returns `None` when no such member exists.
pub trait ChildVisitor
{
    /// Look up `name` on `parent`.
    fn child(&mut self, parent: Option<&ValueHandle>, name: &str) -> Option<EvalValue>;
}

impl<F> ChildVisitor for F
where
    F: FnMut(Option<&ValueHandle>, &str) -> Option<EvalValue>,
{
    fn child(&mut self, parent: Option<&ValueHandle>, name: &str) -> Option<EvalValue>
    {
        self(parent, name)
    }
}

/// Evaluate a dotted member path (`a`, `a.b.c`) through `children`.
///
/// Every segment but the last must resolve to a debuggee value so the next
/// lookup has a parent.
///
/// ## Errors
///
/// `Provider` with a user-facing message when the expression is not a member
/// path or a member is missing.
pub fn evaluate_member_path(expression: &str, children: &mut dyn ChildVisitor) -> IlmapResult<EvalOutcome>
{
    let expression = expression.trim();
    if expression.is_empty() {
        return Err(IlmapError::Provider("empty expression".to_string()));
    }

    let segments: Vec<&str> = expression.split('.').map(str::trim).collect();
    if let Some(bad) = segments.iter().find(|segment| !is_identifier(segment)) {
        return Err(IlmapError::Provider(format!(
            "unsupported expression '{expression}' near '{bad}'"
        )));
    }

    let Some((last, path)) = segments.split_last() else {
        return Err(IlmapError::Provider("empty expression".to_string()));
    };

    let mut parent: Option<ValueHandle> = None;
    for segment in path {
        match lookup(children, parent.as_ref(), segment)? {
            EvalValue::Value(handle) => parent = Some(handle),
            _ => {
                return Err(IlmapError::Provider(format!("'{segment}' has no members")));
            }
        }
    }

    let value = lookup(children, parent.as_ref(), last)?;
    Ok(EvalOutcome { value })
}

fn lookup(children: &mut dyn ChildVisitor, parent: Option<&ValueHandle>, name: &str) -> IlmapResult<EvalValue>
{
    children
        .child(parent, name)
        .ok_or_else(|| IlmapError::Provider(format!("'{name}' does not exist in the current context")))
}

/// Parse a literal of the given runtime type.
///
/// ## Errors
///
/// `Provider` when the text does not fit the type or the type has no literal
/// form.
pub fn parse_literal(text: &str, type_name: &str) -> IlmapResult<ParsedValue>
{
    let text = text.trim();

    macro_rules! integer {
        ($ty:ty) => {
            parse_integer(text)
                .and_then(|value| <$ty>::try_from(value).ok())
                .map(|value| value.to_le_bytes().to_vec())
        };
    }

    let bytes = match type_name {
        "System.String" => return parse_string(text).map(ParsedValue::Text),
        "System.Boolean" => match text {
            "true" => Some(vec![1]),
            "false" => Some(vec![0]),
            _ => None,
        },
        "System.Char" => parse_char(text).map(|c| c.to_le_bytes().to_vec()),
        "System.SByte" => integer!(i8),
        "System.Byte" => integer!(u8),
        "System.Int16" => integer!(i16),
        "System.UInt16" => integer!(u16),
        "System.Int32" => integer!(i32),
        "System.UInt32" => integer!(u32),
        "System.Int64" => integer!(i64),
        "System.UInt64" => integer!(u64),
        "System.Single" => text.parse::<f32>().ok().map(|v| v.to_le_bytes().to_vec()),
        "System.Double" => text.parse::<f64>().ok().map(|v| v.to_le_bytes().to_vec()),
        _ => {
            return Err(IlmapError::Provider(format!("no literal syntax for type {type_name}")));
        }
    };

    bytes
        .map(ParsedValue::Bytes)
        .ok_or_else(|| IlmapError::Provider(format!("'{text}' is not a valid {type_name} literal")))
}

fn is_identifier(segment: &str) -> bool
{
    let mut chars = segment.chars();
    match chars.next() {
        Some(first) if first == '_' || first.is_alphabetic() => chars.all(|c| c == '_' || c.is_alphanumeric()),
        _ => false,
    }
}

fn parse_integer(text: &str) -> Option<i128>
{
    let (negative, digits) = match text.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, text),
    };

    let (radix, digits) = match digits.strip_prefix("0x").or_else(|| digits.strip_prefix("0X")) {
        Some(hex) => (16, hex),
        None => (10, digits),
    };

    // at most one leading '-'
    if digits.starts_with(['+', '-']) {
        return None;
    }

    let magnitude = i128::from_str_radix(digits, radix).ok()?;
    if negative {
        magnitude.checked_neg()
    } else {
        Some(magnitude)
    }
}

fn parse_string(text: &str) -> IlmapResult<String>
{
    let inner = text
        .strip_prefix('"')
        .and_then(|rest| rest.strip_suffix('"'))
        .ok_or_else(|| IlmapError::Provider(format!("{text} is not a string literal")))?;

    let mut out = String::with_capacity(inner.len());
    let mut chars = inner.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some('0') => out.push('\0'),
            Some(other @ ('"' | '\\')) => out.push(other),
            _ => return Err(IlmapError::Provider(format!("invalid escape in {text}"))),
        }
    }
    Ok(out)
}

fn parse_char(text: &str) -> Option<u16>
{
    let inner = text.strip_prefix('\'')?.strip_suffix('\'')?;
    let mut chars = inner.chars();
    let c = chars.next()?;
    if chars.next().is_some() {
        return None;
    }
    u16::try_from(u32::from(c)).ok()
}

#[cfg(test)]
mod tests
{
    use super::*;

    #[test]
    fn test_member_path_walks_children_in_order()
    {
        let mut calls = Vec::new();
        let mut visitor = |parent: Option<&ValueHandle>, name: &str| -> Option<EvalValue> {
            calls.push((parent.copied(), name.to_string()));
            match name {
                "order" => Some(EvalValue::Value(ValueHandle(1))),
                "customer" => Some(EvalValue::Value(ValueHandle(2))),
                "name" => Some(EvalValue::Text("Ada".to_string())),
                _ => None,
            }
        };

        let outcome = evaluate_member_path("order.customer.name", &mut visitor).unwrap();
        assert_eq!(outcome.value, EvalValue::Text("Ada".to_string()));
        assert_eq!(outcome.type_class(), TypeClass::String);
        assert_eq!(
            calls,
            vec![
                (None, "order".to_string()),
                (Some(ValueHandle(1)), "customer".to_string()),
                (Some(ValueHandle(2)), "name".to_string()),
            ]
        );
    }

    #[test]
    fn test_member_path_reports_missing_member()
    {
        let mut visitor = |_: Option<&ValueHandle>, _: &str| -> Option<EvalValue> { None };
        let err = evaluate_member_path("missing", &mut visitor).unwrap_err();
        assert!(matches!(err, IlmapError::Provider(msg) if msg.contains("missing")));
    }

    #[test]
    fn test_member_path_rejects_non_paths()
    {
        let mut visitor = |_: Option<&ValueHandle>, _: &str| -> Option<EvalValue> { Some(EvalValue::Object) };
        assert!(evaluate_member_path("a + b", &mut visitor).is_err());
        assert!(evaluate_member_path("1x", &mut visitor).is_err());
        assert!(evaluate_member_path("  ", &mut visitor).is_err());
    }

    #[test]
    fn test_member_path_needs_value_to_descend()
    {
        let mut visitor = |_: Option<&ValueHandle>, _: &str| -> Option<EvalValue> { Some(EvalValue::Bytes(vec![1, 0, 0, 0])) };
        let err = evaluate_member_path("count.x", &mut visitor).unwrap_err();
        assert_eq!(err, IlmapError::Provider("'count' has no members".to_string()));
    }

    #[test]
    fn test_parse_literals()
    {
        assert_eq!(parse_literal("1", "System.Int32").unwrap(), ParsedValue::Bytes(vec![1, 0, 0, 0]));
        assert_eq!(parse_literal("-1", "System.Int16").unwrap(), ParsedValue::Bytes(vec![0xff, 0xff]));
        assert_eq!(parse_literal("0x10", "System.Byte").unwrap(), ParsedValue::Bytes(vec![0x10]));
        assert_eq!(parse_literal("true", "System.Boolean").unwrap(), ParsedValue::Bytes(vec![1]));
        assert_eq!(parse_literal("'A'", "System.Char").unwrap(), ParsedValue::Bytes(vec![0x41, 0]));
        assert_eq!(
            parse_literal(r#""a\"b""#, "System.String").unwrap(),
            ParsedValue::Text("a\"b".to_string())
        );
        assert_eq!(
            parse_literal("1.5", "System.Double").unwrap(),
            ParsedValue::Bytes(1.5f64.to_le_bytes().to_vec())
        );
    }

    #[test]
    fn test_parse_literal_errors()
    {
        assert!(parse_literal("256", "System.Byte").is_err());
        assert!(parse_literal("abc", "System.Int32").is_err());
        assert!(parse_literal("unquoted", "System.String").is_err());
        assert!(parse_literal("1", "System.Object").is_err());
    }

    #[test]
    fn test_parse_literal_rejects_repeated_signs()
    {
        assert!(parse_literal("--5", "System.Int32").is_err());
        assert!(parse_literal("-+5", "System.Int32").is_err());
        assert!(parse_literal("+5", "System.Int32").is_err());
        assert!(parse_literal("0x-5", "System.Int32").is_err());
        assert!(parse_literal("--170141183460469231731687303715884105728", "System.Int64").is_err());
        assert!(parse_literal("-0x", "System.Int32").is_err());

        assert_eq!(parse_literal("-5", "System.Int32").unwrap(), ParsedValue::Bytes((-5_i32).to_le_bytes().to_vec()));
        assert_eq!(parse_literal("-0x10", "System.Int64").unwrap(), ParsedValue::Bytes((-16_i64).to_le_bytes().to_vec()));
    }
}
