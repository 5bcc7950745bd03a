//! Built-in standard library modules, used by `require` when the home
//! directory does not provide its own `rpl/<name>.rpl`.

pub const NUM: &str = r"package num
-- Numbers
alias sign = [+-]
alias digits = [0-9]+
int = ${sign}?${digits}
frac = \.${digits}
exp = [eE]${sign}?${digits}
float = ${sign}?${digits}${frac}${exp}?
hex = 0[xX][0-9A-Fa-f]+
";

pub const WORD: &str = r"package word
-- Words
any = [[:alpha:]]+
upper = [[:upper:]]+
lower = [[:lower:]]+
contraction = [[:alpha:]]+'[[:alpha:]]+
";

pub const NET: &str = r"package net
-- Network addresses
alias octet = 25[0-5]|2[0-4][0-9]|1[0-9][0-9]|[1-9]?[0-9]
ipv4 = ${octet}\.${octet}\.${octet}\.${octet}
alias label = [A-Za-z0-9](?:[A-Za-z0-9-]{0,61}[A-Za-z0-9])?
fqdn = ${label}(?:\.${label})+
port = [0-9]{1,5}
email = [A-Za-z0-9._%+-]+@${fqdn}
url = https?://${fqdn}(?::${port})?(?:/[^\s]*)?
";

/// Names of the built-in modules.
pub const NAMES: [&str; 3] = ["num", "word", "net"];

/// Source of a built-in module.
pub fn source(name: &str) -> Option<&'static str> {
    match name {
        "num" => Some(NUM),
        "word" => Some(WORD),
        "net" => Some(NET),
        _ => None,
    }
}
