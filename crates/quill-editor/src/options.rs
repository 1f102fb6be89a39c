//! Editor options and the `set` directive grammar.
//!
//! Options come from the configuration file and the `--set` command-line
//! flag, both written as space-separated directives:
//!
//! | Syntax         | Effect                 |
//! |----------------|------------------------|
//! | `option`       | Enable boolean         |
//! | `nooption`     | Disable boolean        |
//! | `option!`      | Toggle boolean         |
//! | `option=value` | Assign value           |
//!
//! # Option names
//!
//! | Full name   | Abbrev | Type    | Default |
//! |-------------|--------|---------|---------|
//! | `tabspaces` | `ts`   | integer | 2       |
//! | `hints`     |        | bool    | true    |
//! | `loglevel`  |        | level   | warn    |

use tracing::level_filters::LevelFilter;

use crate::error::OptionError;

/// Smallest and largest accepted `tabspaces`.
pub const TAB_SPACES_RANGE: std::ops::RangeInclusive<usize> = 1..=16;

/// A parsed `set` directive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SetDirective {
    /// `option` — enable a boolean option.
    On(String),

    /// `nooption` — disable a boolean option.
    Off(String),

    /// `option!` — toggle a boolean option.
    Toggle(String),

    /// `option=value` — assign a value.
    Assign(String, String),
}

/// Returns `true` if `name` is a known boolean option.
#[must_use]
pub fn is_bool_option(name: &str) -> bool {
    matches!(name, "hints")
}

/// Returns `true` if `name` is a known numeric option (full name or abbreviation).
#[must_use]
pub fn is_numeric_option(name: &str) -> bool {
    matches!(name, "tabspaces" | "ts")
}

/// Returns `true` if `name` is any known option.
#[must_use]
pub fn is_known_option(name: &str) -> bool {
    is_bool_option(name) || is_numeric_option(name) || name == "loglevel"
}

/// Parse space-separated directives. An empty string yields none.
#[must_use]
pub fn parse_set(args: &str) -> Vec<SetDirective> {
    args.split_whitespace().map(parse_set_arg).collect()
}

/// Parse a single directive.
#[must_use]
pub fn parse_set_arg(arg: &str) -> SetDirective {
    if let Some((name, value)) = arg.split_once('=') {
        return SetDirective::Assign(name.to_string(), value.to_string());
    }

    if let Some(name) = arg.strip_suffix('!') {
        return SetDirective::Toggle(name.to_string());
    }

    // Only strip "no" when the remainder is a boolean option, so a future
    // option whose name starts with "no" isn't mangled.
    if let Some(name) = arg.strip_prefix("no") {
        if is_bool_option(name) {
            return SetDirective::Off(name.to_string());
        }
    }

    SetDirective::On(arg.to_string())
}

// ---------------------------------------------------------------------------
// Options
// ---------------------------------------------------------------------------

/// Option values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Options {
    /// Spaces per indentation level and per tab stop.
    pub tab_spaces: usize,

    /// Show the two hint rows under the status line.
    pub hints: bool,

    /// Minimum level written to the log file.
    pub log_level: LevelFilter,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            tab_spaces: 2,
            hints: true,
            log_level: LevelFilter::WARN,
        }
    }
}

impl Options {
    /// Apply one directive.
    ///
    /// # Errors
    ///
    /// Unknown names, booleans given a value, numbers out of range and
    /// unparsable levels are rejected; the options are left unchanged.
    pub fn apply(&mut self, directive: &SetDirective) -> Result<(), OptionError> {
        match directive {
            SetDirective::On(name) if is_bool_option(name) => self.hints = true,
            SetDirective::Off(name) if is_bool_option(name) => self.hints = false,
            SetDirective::Toggle(name) if is_bool_option(name) => self.hints = !self.hints,
            SetDirective::Assign(name, value) if is_numeric_option(name) => {
                self.tab_spaces = value
                    .parse()
                    .ok()
                    .filter(|n| TAB_SPACES_RANGE.contains(n))
                    .ok_or_else(|| invalid(name, value))?;
            }
            SetDirective::Assign(name, value) if name == "loglevel" => {
                self.log_level = value.parse().map_err(|_| invalid(name, value))?;
            }
            SetDirective::On(name)
            | SetDirective::Off(name)
            | SetDirective::Toggle(name)
            | SetDirective::Assign(name, _) => {
                return Err(if is_known_option(name) {
                    invalid(name, &directive_value(directive))
                } else {
                    OptionError::Unknown(name.clone())
                });
            }
        }
        Ok(())
    }

    /// Parse and apply a directive list, stopping at the first error.
    ///
    /// # Errors
    ///
    /// Returns the first rejected directive's error.
    pub fn apply_all(&mut self, args: &str) -> Result<(), OptionError> {
        for directive in parse_set(args) {
            self.apply(&directive)?;
        }
        Ok(())
    }
}

fn invalid(name: &str, value: &str) -> OptionError {
    OptionError::InvalidValue {
        name: name.to_string(),
        value: value.to_string(),
    }
}

fn directive_value(directive: &SetDirective) -> String {
    match directive {
        SetDirective::On(_) => "(on)".into(),
        SetDirective::Off(_) => "(off)".into(),
        SetDirective::Toggle(_) => "(toggle)".into(),
        SetDirective::Assign(_, value) => value.clone(),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    // -- parse_set_arg ------------------------------------------------------

    #[test]
    fn parse_boolean_forms() {
        assert_eq!(parse_set_arg("hints"), SetDirective::On("hints".into()));
        assert_eq!(parse_set_arg("nohints"), SetDirective::Off("hints".into()));
        assert_eq!(parse_set_arg("hints!"), SetDirective::Toggle("hints".into()));
    }

    #[test]
    fn parse_assign() {
        assert_eq!(
            parse_set_arg("ts=4"),
            SetDirective::Assign("ts".into(), "4".into())
        );
        assert_eq!(
            parse_set_arg("loglevel=debug"),
            SetDirective::Assign("loglevel".into(), "debug".into())
        );
    }

    #[test]
    fn no_prefix_only_for_bool_options() {
        assert_eq!(parse_set_arg("nots"), SetDirective::On("nots".into()));
    }

    #[test]
    fn parse_multiple() {
        assert_eq!(
            parse_set("  ts=4   nohints "),
            vec![
                SetDirective::Assign("ts".into(), "4".into()),
                SetDirective::Off("hints".into()),
            ]
        );
        assert!(parse_set("").is_empty());
    }

    // -- apply --------------------------------------------------------------

    #[test]
    fn defaults() {
        let o = Options::default();
        assert_eq!(o.tab_spaces, 2);
        assert!(o.hints);
        assert_eq!(o.log_level, LevelFilter::WARN);
    }

    #[test]
    fn apply_all_sets_values() {
        let mut o = Options::default();
        o.apply_all("tabspaces=4 nohints loglevel=trace").unwrap();
        assert_eq!(o.tab_spaces, 4);
        assert!(!o.hints);
        assert_eq!(o.log_level, LevelFilter::TRACE);

        o.apply_all("hints!").unwrap();
        assert!(o.hints);
    }

    #[test]
    fn tab_spaces_out_of_range() {
        let mut o = Options::default();
        assert_eq!(
            o.apply_all("ts=0"),
            Err(OptionError::InvalidValue {
                name: "ts".into(),
                value: "0".into()
            })
        );
        assert!(o.apply_all("ts=17").is_err());
        assert!(o.apply_all("ts=many").is_err());
        assert_eq!(o.tab_spaces, 2);
    }

    #[test]
    fn unknown_option() {
        let mut o = Options::default();
        assert_eq!(
            o.apply_all("wrap"),
            Err(OptionError::Unknown("wrap".into()))
        );
    }

    #[test]
    fn numeric_option_without_value() {
        let mut o = Options::default();
        assert!(matches!(
            o.apply_all("ts"),
            Err(OptionError::InvalidValue { .. })
        ));
    }

    #[test]
    fn bad_log_level() {
        let mut o = Options::default();
        assert!(o.apply_all("loglevel=loud").is_err());
    }
}
