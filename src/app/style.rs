use console::style;
use std::fmt::Display;

/// Green bold: success checkmarks, confirmations
pub fn success<D: Display>(text: D) -> String {
    style(text).green().bold().to_string()
}

/// White bold: section headers, titles
pub fn header<D: Display>(text: D) -> String {
    style(text).white().bold().to_string()
}

/// Dim: hints, secondary text
pub fn dim<D: Display>(text: D) -> String {
    style(text).dim().to_string()
}

/// Red bold: failures shown to the user
pub fn error<D: Display>(text: D) -> String {
    style(text).red().bold().to_string()
}

/// Green: configured values, user names
pub fn value<D: Display>(text: D) -> String {
    style(text).green().to_string()
}

/// Cyan bold: the "you" prompt label
pub fn user_label<D: Display>(text: D) -> String {
    style(text).cyan().bold().to_string()
}

/// Magenta bold: the coach/mentor label
pub fn assistant_label<D: Display>(text: D) -> String {
    style(text).magenta().bold().to_string()
}

/// Cyan underlined: URLs, links
pub fn url<D: Display>(text: D) -> String {
    style(text).cyan().underlined().to_string()
}
