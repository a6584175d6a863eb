//! Vendor entry rendering
//!
//! A vendor chunk is built from a synthetic entry module that re-exports
//! exactly the symbols consumers require. Packages that ship one file per
//! export can be mapped through a [`VendorResolver`] so the chunk pulls in
//! only the files it needs.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Sub-path mapping for a vendor package
///
/// `path` and `side_effects` are templates; `{name}` expands to the symbol
/// and `{kebab}` to its kebab-case form after `strip_prefix` is removed.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct VendorResolver {
    /// Per-symbol module path, relative to the package root
    pub path: String,

    /// Per-symbol module imported for its side effects (styles)
    #[serde(default)]
    pub side_effects: Option<String>,

    /// Prefix removed from the symbol before `{kebab}` expansion
    #[serde(default)]
    pub strip_prefix: Option<String>,
}

impl VendorResolver {
    fn expand(&self, template: &str, symbol: &str) -> String {
        let stem = self
            .strip_prefix
            .as_deref()
            .and_then(|prefix| symbol.strip_prefix(prefix))
            .filter(|rest| !rest.is_empty())
            .unwrap_or(symbol);
        template
            .replace("{name}", symbol)
            .replace("{kebab}", &kebab_case(stem))
    }
}

/// Convert `DatePicker` to `date-picker`
pub fn kebab_case(name: &str) -> String {
    let mut out = String::with_capacity(name.len() + 4);
    for (i, c) in name.chars().enumerate() {
        if c.is_ascii_uppercase() {
            if i > 0 {
                out.push('-');
            }
            out.push(c.to_ascii_lowercase());
        } else {
            out.push(c);
        }
    }
    out
}

/// Render the body of the synthetic entry for `vendor`
///
/// A vendor imported only for its side effects gets a bare import.
pub fn render_vendor_entry(
    vendor: &str,
    symbols: &BTreeSet<String>,
    resolver: Option<&VendorResolver>,
) -> String {
    if symbols.is_empty() {
        return format!("import \"{vendor}\";");
    }
    match resolver {
        Some(resolver) => symbols
            .iter()
            .map(|symbol| {
                let mut body = String::new();
                if let Some(side_effects) = &resolver.side_effects {
                    body.push_str(&format!(
                        "import \"{vendor}/{}\";\n",
                        resolver.expand(side_effects, symbol)
                    ));
                }
                body.push_str(&format!(
                    "export {{ default as {symbol} }} from \"{vendor}/{}\";",
                    resolver.expand(&resolver.path, symbol)
                ));
                body
            })
            .collect::<Vec<_>>()
            .join("\n"),
        None => {
            let list = symbols.iter().cloned().collect::<Vec<_>>().join(", ");
            format!("export {{ {list} }} from \"{vendor}\";")
        }
    }
}
