//! ANSI color codes for terminal output.
//!
//! Two layers:
//! - [`Colors`]: fixed semantic palette for CLI chrome (names, values, metadata)
//! - [`ColorMap`]: user-configurable mapping from match type to SGR code,
//!   used by the `color` encoder (`ROSIE_COLORS`, rc file `colors = ...`)

/// ANSI color palette for CLI output.
///
/// Uses only standard 16-color ANSI codes (no RGB).
#[derive(Clone, Copy, Debug)]
pub struct Colors {
    pub blue: &'static str,
    pub green: &'static str,
    pub red: &'static str,
    pub dim: &'static str,
    pub reset: &'static str,
}

impl Default for Colors {
    fn default() -> Self {
        Self::OFF
    }
}

impl Colors {
    /// Colors enabled (ANSI escape codes).
    pub const ON: Self = Self {
        blue: "\x1b[34m",
        green: "\x1b[32m",
        red: "\x1b[31m",
        dim: "\x1b[2m",
        reset: "\x1b[0m",
    };

    /// Colors disabled (empty strings).
    pub const OFF: Self = Self {
        blue: "",
        green: "",
        red: "",
        dim: "",
        reset: "",
    };

    /// Create colors based on enabled flag.
    pub fn new(enabled: bool) -> Self {
        if enabled { Self::ON } else { Self::OFF }
    }

    /// Check if colors are enabled.
    pub fn is_enabled(&self) -> bool {
        !self.blue.is_empty()
    }
}

/// Error produced by [`ColorMap::parse`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ColorSpecError {
    #[error("color entry '{0}' is not of the form <type>=<color>")]
    MalformedEntry(String),

    #[error("unknown color '{0}'")]
    UnknownColor(String),
}

/// Mapping from match type names to SGR parameter strings.
///
/// Spec syntax: `entry(:entry)*` where each entry is `<selector>=<color>(;<color>)*`.
/// A selector is an exact type name (`net.ipv4`), a package wildcard
/// (`net.*`) or the catch-all `*`. Exact selectors win over package
/// wildcards, which win over the catch-all.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ColorMap {
    rules: Vec<(String, String)>,
}

impl Default for ColorMap {
    fn default() -> Self {
        // DEFAULT_SPEC only names known colors.
        Self::parse(Self::DEFAULT_SPEC).unwrap_or(Self { rules: Vec::new() })
    }
}

impl ColorMap {
    pub const DEFAULT_SPEC: &'static str = "*=default:net.*=red:num.*=underline:word.*=yellow";

    pub fn parse(spec: &str) -> Result<Self, ColorSpecError> {
        let mut rules = Vec::new();
        for entry in spec.split(':').map(str::trim).filter(|e| !e.is_empty()) {
            let (selector, colors) = entry
                .split_once('=')
                .ok_or_else(|| ColorSpecError::MalformedEntry(entry.to_owned()))?;
            let selector = selector.trim();
            if selector.is_empty() {
                return Err(ColorSpecError::MalformedEntry(entry.to_owned()));
            }
            let sgr = colors
                .split(';')
                .map(str::trim)
                .map(|c| sgr_code(c).ok_or_else(|| ColorSpecError::UnknownColor(c.to_owned())))
                .collect::<Result<Vec<_>, _>>()?
                .join(";");
            rules.push((selector.to_owned(), sgr));
        }
        Ok(Self { rules })
    }

    /// SGR parameters for a match type, or `None` when no rule applies.
    pub fn lookup(&self, type_name: &str) -> Option<&str> {
        let package = type_name.split_once('.').map(|(pkg, _)| pkg);
        let find = |selector: &dyn Fn(&str) -> bool| {
            self.rules
                .iter()
                .rev()
                .find(|(s, _)| selector(s.as_str()))
                .map(|(_, sgr)| sgr.as_str())
        };

        find(&|s: &str| s == type_name)
            .or_else(|| {
                package.and_then(|pkg| {
                    find(&|s: &str| s.strip_suffix(".*").is_some_and(|p| p == pkg))
                })
            })
            .or_else(|| find(&|s: &str| s == "*"))
    }

    /// Wrap `text` in the escape sequence for `type_name`.
    pub fn paint(&self, type_name: &str, text: &[u8], out: &mut Vec<u8>) {
        match self.lookup(type_name) {
            Some(sgr) => {
                out.extend_from_slice(b"\x1b[");
                out.extend_from_slice(sgr.as_bytes());
                out.push(b'm');
                out.extend_from_slice(text);
                out.extend_from_slice(Colors::ON.reset.as_bytes());
            }
            None => out.extend_from_slice(text),
        }
    }
}

fn sgr_code(name: &str) -> Option<&'static str> {
    let code = match name {
        "default" => "39",
        "black" => "30",
        "red" => "31",
        "green" => "32",
        "yellow" => "33",
        "blue" => "34",
        "magenta" => "35",
        "cyan" => "36",
        "white" => "37",
        "bold" => "1",
        "dim" => "2",
        "underline" => "4",
        "reverse" => "7",
        _ => return None,
    };
    Some(code)
}
