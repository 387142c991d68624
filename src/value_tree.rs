//! Purpose: Render a parsed value as an indented, optionally colorized tree for terminals.
//! Exports: `render_parsed`, `render_value`.
//! Role: Human counterpart of `api::parsed_json`, used by `parse` on a tty.
//! Invariants: ANSI escapes appear only when explicitly enabled.
//! Invariants: Leaf payloads use the same literal text the parser accepts.
use dbus_tool::api::{BasicKind, BasicValue, Parsed, Value};

const INDENT: &str = "  ";

const COLOR_TYPE: &str = "36";
const COLOR_STRING: &str = "32";
const COLOR_NUMBER: &str = "33";
const COLOR_BOOL: &str = "35";
const COLOR_DIM: &str = "2";

pub fn render_parsed(signature: &str, text: &str, parsed: &Parsed, use_color: bool) -> String {
    let mut out = render_value(&parsed.value, use_color);
    out.push('\n');
    push_colored("consumed:", COLOR_DIM, use_color, &mut out);
    out.push_str(&format!(
        " signature {}/{}, text {}/{}",
        parsed.consumed.signature,
        signature.len(),
        parsed.consumed.text,
        text.len()
    ));
    let rest = &text[parsed.consumed.text..];
    if !rest.is_empty() {
        out.push('\n');
        push_colored("remaining:", COLOR_DIM, use_color, &mut out);
        out.push(' ');
        out.push_str(rest);
    }
    out
}

pub fn render_value(value: &Value, use_color: bool) -> String {
    let mut out = String::new();
    write_value(value, 0, use_color, &mut out);
    out
}

fn write_value(value: &Value, indent: usize, use_color: bool, out: &mut String) {
    match value {
        Value::Basic(basic) => write_basic(basic, use_color, out),
        Value::Array {
            element_signature,
            items,
        } => {
            push_colored(&format!("array<{element_signature}>"), COLOR_TYPE, use_color, out);
            write_children(items.iter(), "[", "]", indent, use_color, out);
        }
        Value::Struct(fields) => {
            push_colored("struct", COLOR_TYPE, use_color, out);
            write_children(fields.iter(), "(", ")", indent, use_color, out);
        }
        Value::Variant(inner) => {
            push_colored(&format!("variant<{}>", inner.signature()), COLOR_TYPE, use_color, out);
            out.push(' ');
            write_value(inner, indent, use_color, out);
        }
        Value::DictEntry { key, value } => {
            push_colored("dict_entry", COLOR_TYPE, use_color, out);
            out.push_str(" {\n");
            push_indent(indent + 1, out);
            write_basic(key, use_color, out);
            out.push('\n');
            push_indent(indent + 1, out);
            write_value(value, indent + 1, use_color, out);
            out.push('\n');
            push_indent(indent, out);
            out.push('}');
        }
    }
}

fn write_children<'a>(
    children: impl ExactSizeIterator<Item = &'a Value>,
    open: &str,
    close: &str,
    indent: usize,
    use_color: bool,
    out: &mut String,
) {
    out.push(' ');
    if children.len() == 0 {
        out.push_str(open);
        out.push_str(close);
        return;
    }
    out.push_str(open);
    out.push('\n');
    for child in children {
        push_indent(indent + 1, out);
        write_value(child, indent + 1, use_color, out);
        out.push('\n');
    }
    push_indent(indent, out);
    out.push_str(close);
}

fn write_basic(basic: &BasicValue, use_color: bool, out: &mut String) {
    let kind = basic.kind();
    push_colored(kind.name(), COLOR_TYPE, use_color, out);
    out.push(' ');
    let color = match kind {
        BasicKind::Boolean => COLOR_BOOL,
        BasicKind::String | BasicKind::ObjectPath | BasicKind::Signature => COLOR_STRING,
        _ => COLOR_NUMBER,
    };
    push_colored(&basic.to_string(), color, use_color, out);
}

fn push_indent(level: usize, out: &mut String) {
    for _ in 0..level {
        out.push_str(INDENT);
    }
}

fn push_colored(text: &str, color: &str, use_color: bool, out: &mut String) {
    if !use_color {
        out.push_str(text);
        return;
    }
    out.push_str("\u{1b}[");
    out.push_str(color);
    out.push('m');
    out.push_str(text);
    out.push_str("\u{1b}[0m");
}

#[cfg(test)]
mod tests {
    use super::{render_parsed, render_value};
    use dbus_tool::api::parse_value;

    #[test]
    fn plain_tree_has_no_escapes() {
        let parsed = parse_value("a{sv}", r#"[{"k",i_1}]"#).expect("parse");
        let plain = render_value(&parsed.value, false);
        assert_eq!(
            plain,
            "array<{sv}> [\n  dict_entry {\n    string \"k\"\n    variant<i> int32 1\n  }\n]"
        );
        assert!(!plain.contains('\u{1b}'));
    }

    #[test]
    fn empty_containers_stay_on_one_line() {
        let parsed = parse_value("ai", "[]").expect("parse");
        assert_eq!(render_value(&parsed.value, false), "array<i> []");
    }

    #[test]
    fn colored_tree_marks_types_and_leaves() {
        let parsed = parse_value("(bs)", r#"(true,"x")"#).expect("parse");
        let colored = render_value(&parsed.value, true);
        assert!(colored.contains("\u{1b}[36mstruct\u{1b}[0m"));
        assert!(colored.contains("\u{1b}[35mtrue\u{1b}[0m"));
        assert!(colored.contains("\u{1b}[32m\"x\"\u{1b}[0m"));
    }

    #[test]
    fn parsed_summary_reports_leftovers() {
        let parsed = parse_value("is", "12abc").expect("parse");
        let text = render_parsed("is", "12abc", &parsed, false);
        assert!(text.starts_with("int32 12\n"));
        assert!(text.contains("consumed: signature 1/2, text 2/5"));
        assert!(text.ends_with("remaining: abc"));
    }
}
