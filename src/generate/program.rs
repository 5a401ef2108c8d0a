//! The generated extraction program and its JavaScript rendering.
//!
//! One [`FieldStatement`] per requested field; each renders to a statement
//! assigning `parsedData['field']` inside a crawler page function.

use std::fmt;

use serde::Serialize;

use crate::path::{Path, PathStep};
use crate::patterns::JS_IDENTIFIER;
use crate::sources::json_ld::JSON_LD_SELECTOR;

const INDENT: &str = "    ";

/// Microdata walker shipped with programs that read microdata.
///
/// Produces the same `{ _type, ...props }` shape as
/// [`crate::sources::microdata::parse_microdata`].
pub const MICRODATA_WALKER: &str = r"function extractMicrodata($) {
    function extractValue($elem) {
        var value = $elem.attr('content') || $elem.text() || $elem.attr('src') || $elem.attr('href') || null;
        return typeof value === 'string' ? value.trim() : value;
    }
    function extractItemScope($itemScope) {
        var item = {};
        if ($itemScope.attr('itemtype')) item._type = $itemScope.attr('itemtype');
        var count = 0;
        $itemScope.find('[itemprop]').filter(function () {
            return $($(this).parents('[itemscope]')[0]).is($itemScope);
        }).each(function () {
            var $itemProp = $(this);
            var value = $itemProp.is('[itemscope]') ? extractItemScope($itemProp) : extractValue($itemProp);
            var name = $itemProp.attr('itemprop');
            if (Array.isArray(item[name])) item[name].push(value);
            else if (typeof item[name] !== 'undefined') item[name] = [item[name], value];
            else item[name] = value;
            count++;
        });
        if (count === 0) item._value = extractValue($itemScope);
        return item;
    }
    var result = [];
    $('[itemscope]').filter(function () {
        return $(this).parents('[itemscope]').length === 0;
    }).each(function () {
        result.push(extractItemScope($(this)));
    });
    return result;
}
";

/// Where a field's value is read from at crawl time.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "source", rename_all = "camelCase")]
pub enum Lookup {
    /// No candidate; the field is always `''`.
    Empty,
    /// `content` of the `<meta>` with this name or property.
    Meta { name: String },
    /// Path into the walked microdata items.
    Microdata { path: Path },
    /// Path into the `block`-th JSON-LD script.
    JsonLd { block: usize, path: Path },
    /// Path from the window object.
    Window { path: Path },
    /// Text of the element matching this selector.
    Html { selector: String },
}

impl Lookup {
    #[must_use]
    pub fn requires_selector_engine(&self) -> bool {
        matches!(
            self,
            Lookup::Meta { .. } | Lookup::Microdata { .. } | Lookup::JsonLd { .. } | Lookup::Html { .. }
        )
    }

    #[must_use]
    pub fn requires_microdata_walker(&self) -> bool {
        matches!(self, Lookup::Microdata { .. })
    }
}

/// Extraction of one field.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldStatement {
    pub field: String,
    pub lookup: Lookup,
}

impl FieldStatement {
    /// JavaScript assigning the field into `parsedData`.
    #[must_use]
    pub fn render(&self) -> String {
        let target = format!("parsedData[{}]", js_string(&self.field));
        match &self.lookup {
            Lookup::Empty => format!("{target} = '';"),
            Lookup::Meta { name } => {
                let name = css_string_content(name);
                let selector = format!(r#"meta[property="{name}"], meta[name="{name}"]"#);
                format!("{target} = $({}).attr('content');", js_string(&selector))
            }
            Lookup::Microdata { path } => format!("{target} = schemaOrg{};", js_accessor(path)),
            Lookup::JsonLd { block, path } => [
                format!("{target} = $({}).get({block});", js_string(JSON_LD_SELECTOR)),
                format!("if ({target}) {target} = JSON.parse({target}.text);"),
                format!("if ({target}) {target} = {target}{};", js_accessor(path)),
                format!("else {target} = '';"),
            ]
            .join("\n"),
            Lookup::Window { path } => format!("{target} = window{};", js_accessor(path)),
            Lookup::Html { selector } => format!("{target} = $({}).text();", js_string(selector)),
        }
    }
}

/// Per-field statements plus the runtime capabilities they need.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractionProgram {
    pub requires_selector_engine: bool,
    pub requires_microdata_walker: bool,
    pub field_statements: Vec<FieldStatement>,
}

impl ExtractionProgram {
    /// Program from statements, deriving the capability flags.
    #[must_use]
    pub fn new(field_statements: Vec<FieldStatement>) -> Self {
        Self {
            requires_selector_engine: field_statements.iter().any(|s| s.lookup.requires_selector_engine()),
            requires_microdata_walker: field_statements.iter().any(|s| s.lookup.requires_microdata_walker()),
            field_statements,
        }
    }

    /// Complete `pageFunction(context)` source for the crawler.
    #[must_use]
    pub fn page_function(&self) -> String {
        self.to_string()
    }
}

/// Renders the page function, microdata walker first when needed.
impl fmt::Display for ExtractionProgram {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.requires_microdata_walker {
            writeln!(f, "{MICRODATA_WALKER}")?;
        }
        writeln!(f, "function pageFunction(context) {{")?;
        if self.requires_selector_engine {
            writeln!(f, "{INDENT}var $ = context.jQuery;")?;
        }
        writeln!(f, "{INDENT}var parsedData = {{}};")?;
        if self.requires_microdata_walker {
            writeln!(f, "{INDENT}var schemaOrg = extractMicrodata($);")?;
        }
        for statement in &self.field_statements {
            for line in statement.render().lines() {
                writeln!(f, "{INDENT}{line}")?;
            }
        }
        writeln!(f, "{INDENT}return parsedData;")?;
        writeln!(f, "}}")
    }
}

/// Single-quoted JavaScript string literal.
fn js_string(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + 2);
    out.push('\'');
    for c in text.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\'' => out.push_str("\\'"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            other => out.push(other),
        }
    }
    out.push('\'');
    out
}

/// Escape text for a double-quoted CSS attribute value.
fn css_string_content(text: &str) -> String {
    text.replace('\\', "\\\\").replace('"', "\\\"")
}

/// Member-access chain for a path: `.name`, `['og:title']`, `[0]`.
fn js_accessor(path: &Path) -> String {
    path.steps()
        .iter()
        .map(|step| match step {
            PathStep::Field(name) if JS_IDENTIFIER.is_match(name) => format!(".{name}"),
            PathStep::Field(name) => format!("[{}]", js_string(name)),
            PathStep::Index(i) => format!("[{i}]"),
        })
        .collect()
}
