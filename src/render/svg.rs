//! Minimal markup tree for SVG/HTML output.

use std::fmt::Write;

#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Element(Element),
    Text(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Element {
    pub name: &'static str,
    pub attrs: Vec<(&'static str, String)>,
    pub children: Vec<Node>,
}

impl Element {
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            attrs: Vec::new(),
            children: Vec::new(),
        }
    }

    pub fn attr(mut self, key: &'static str, value: impl ToString) -> Self {
        self.attrs.push((key, value.to_string()));
        self
    }

    pub fn child(mut self, el: Element) -> Self {
        self.children.push(Node::Element(el));
        self
    }

    pub fn children(mut self, els: impl IntoIterator<Item = Element>) -> Self {
        self.children.extend(els.into_iter().map(Node::Element));
        self
    }

    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.children.push(Node::Text(text.into()));
        self
    }

    pub fn get_attr(&self, key: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(k, _)| *k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Depth-first search for the first element with `id`.
    pub fn find_by_id(&self, id: &str) -> Option<&Element> {
        if self.get_attr("id") == Some(id) {
            return Some(self);
        }
        self.children.iter().find_map(|c| match c {
            Node::Element(e) => e.find_by_id(id),
            Node::Text(_) => None,
        })
    }

    /// All descendants (and self) with the given class.
    pub fn find_by_class<'a>(&'a self, class: &str, out: &mut Vec<&'a Element>) {
        if self
            .get_attr("class")
            .map(|c| c.split_whitespace().any(|c| c == class))
            .unwrap_or(false)
        {
            out.push(self);
        }
        for c in &self.children {
            if let Node::Element(e) = c {
                e.find_by_class(class, out);
            }
        }
    }

    pub fn render(&self) -> String {
        let mut out = String::new();
        self.write_to(&mut out, 0);
        out
    }

    fn write_to(&self, out: &mut String, depth: usize) {
        let pad = "  ".repeat(depth);
        let _ = write!(out, "{}<{}", pad, self.name);
        for (k, v) in &self.attrs {
            let _ = write!(out, " {}=\"{}\"", k, escape(v));
        }
        if self.children.is_empty() {
            out.push_str("/>\n");
            return;
        }
        out.push('>');
        if let [Node::Text(t)] = self.children.as_slice() {
            let _ = writeln!(out, "{}</{}>", escape(t), self.name);
            return;
        }
        out.push('\n');
        for c in &self.children {
            match c {
                Node::Element(e) => e.write_to(out, depth + 1),
                Node::Text(t) => {
                    let _ = writeln!(out, "{}  {}", pad, escape(t));
                }
            }
        }
        let _ = writeln!(out, "{}</{}>", pad, self.name);
    }
}

pub fn escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for ch in s.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(ch),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape() {
        assert_eq!(escape("a<br>\"b\" & c"), "a&lt;br&gt;&quot;b&quot; &amp; c");
    }

    #[test]
    fn test_render_nested() {
        let el = Element::new("g")
            .attr("id", "x-axis")
            .child(Element::new("text").text("1900"))
            .child(Element::new("line").attr("y2", 6));
        assert_eq!(
            el.render(),
            "<g id=\"x-axis\">\n  <text>1900</text>\n  <line y2=\"6\"/>\n</g>\n"
        );
    }

    #[test]
    fn test_find_helpers() {
        let el = Element::new("svg")
            .child(Element::new("rect").attr("class", "cell"))
            .child(Element::new("g").attr("id", "y-axis").child(
                Element::new("rect").attr("class", "cell other"),
            ));
        assert!(el.find_by_id("y-axis").is_some());
        assert!(el.find_by_id("nope").is_none());
        let mut cells = Vec::new();
        el.find_by_class("cell", &mut cells);
        assert_eq!(cells.len(), 2);
    }
}
