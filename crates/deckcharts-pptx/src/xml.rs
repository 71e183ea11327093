pub const CHART_NS: &str = "http://schemas.openxmlformats.org/drawingml/2006/chart";
pub const DRAWINGML_NS: &str = "http://schemas.openxmlformats.org/drawingml/2006/main";
pub const PRESENTATIONML_NS: &str = "http://schemas.openxmlformats.org/presentationml/2006/main";
pub const REL_NS: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships";

pub fn local_name(name: &[u8]) -> &[u8] {
    match name.iter().rposition(|b| *b == b':') {
        Some(idx) => &name[idx + 1..],
        None => name,
    }
}

/// `c:ser` -> `Some("c")`.
pub(crate) fn prefix_of(name: &[u8]) -> Option<&[u8]> {
    name.iter().position(|b| *b == b':').map(|idx| &name[..idx])
}

/// `prefixed("c", "spPr")` -> `c:spPr`; an empty prefix yields the bare local name.
pub(crate) fn prefixed(prefix: &str, local: &str) -> String {
    if prefix.is_empty() {
        local.to_string()
    } else {
        format!("{prefix}:{local}")
    }
}

pub(crate) fn escape_attr(value: &str) -> std::borrow::Cow<'_, str> {
    quick_xml::escape::escape(value)
}

/// The prefix bound to `ns` at `node`, `""` for the default namespace.
pub(crate) fn prefix_for<'input>(node: roxmltree::Node<'_, 'input>, ns: &str) -> Option<&'input str> {
    let mut bindings = node.namespaces().filter(|binding| binding.uri() == ns);
    let first = bindings.next()?;
    match first.name() {
        Some(name) => Some(name),
        None => Some(bindings.find_map(|binding| binding.name()).unwrap_or("")),
    }
}

pub(crate) fn child<'a, 'input>(
    node: roxmltree::Node<'a, 'input>,
    ns: &str,
    local: &str,
) -> Option<roxmltree::Node<'a, 'input>> {
    node.children()
        .find(|n| n.is_element() && n.tag_name().name() == local && n.tag_name().namespace() == Some(ns))
}

pub(crate) fn children<'a, 'input: 'a>(
    node: roxmltree::Node<'a, 'input>,
    ns: &'a str,
    local: &'a str,
) -> impl Iterator<Item = roxmltree::Node<'a, 'input>> + 'a {
    node.children()
        .filter(move |n| n.is_element() && n.tag_name().name() == local && n.tag_name().namespace() == Some(ns))
}

/// `@val` of the first `ns:local` child.
pub(crate) fn child_val<'a>(node: roxmltree::Node<'a, '_>, ns: &str, local: &str) -> Option<&'a str> {
    child(node, ns, local).and_then(|n| n.attribute("val"))
}

/// Insert `content` as the last children of `node`, expanding a self-closing element.
pub(crate) fn insert_before_end(xml: &str, node: roxmltree::Node<'_, '_>, content: &str) -> String {
    let range = node.range();
    let element = &xml[range.clone()];
    let mut out = String::with_capacity(xml.len() + content.len() + 32);
    out.push_str(&xml[..range.start]);
    if let Some(open) = element.strip_suffix("/>") {
        let qname_len = open[1..]
            .find(|c: char| c.is_whitespace())
            .unwrap_or(open.len() - 1);
        let qname = &open[1..1 + qname_len];
        out.push_str(open.trim_end());
        out.push('>');
        out.push_str(content);
        out.push_str("</");
        out.push_str(qname);
        out.push('>');
    } else {
        let close = element.rfind("</").unwrap_or(element.len());
        out.push_str(&element[..close]);
        out.push_str(content);
        out.push_str(&element[close..]);
    }
    out.push_str(&xml[range.end..]);
    out
}
