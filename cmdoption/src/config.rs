/// Settings shared by every parse level of one parser.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParserConfig {
    /// Shown in the usage line of help output.
    pub program_name: String,
    pub about: Option<String>,
    pub epilogue: Option<String>,
    /// Tokens starting with this (and longer than it) look like options.
    pub option_prefix: String,
    /// Token ending option scanning; discarded. `None` disables it.
    pub separator: Option<String>,
    /// Accept unambiguous prefixes of option names.
    pub abbreviations: bool,
    /// Accept `-abc` for `-a -b -c`.
    pub aggregate_short_options: bool,
    /// Stop scanning options once a positional parameter was bound.
    pub stop_at_first_parameter: bool,
    /// Line width of the plain-text help renderer.
    pub help_width: usize,
}

impl ParserConfig {
    pub fn new(program_name: &str) -> Self {
        ParserConfig {
            program_name: program_name.to_string(),
            about: None,
            epilogue: None,
            option_prefix: "-".to_string(),
            separator: Some("--".to_string()),
            abbreviations: true,
            aggregate_short_options: false,
            stop_at_first_parameter: false,
            help_width: 79,
        }
    }

    pub(crate) fn looks_like_option(&self, token: &str) -> bool {
        !self.option_prefix.is_empty()
            && token.len() > self.option_prefix.len()
            && token.starts_with(&self.option_prefix)
    }

    pub(crate) fn is_separator(&self, token: &str) -> bool {
        self.separator.as_deref() == Some(token)
    }
}

impl Default for ParserConfig {
    fn default() -> Self {
        ParserConfig::new("")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn option_lookalikes() {
        let c = ParserConfig::new("prog");
        assert!(c.looks_like_option("-v"));
        assert!(c.looks_like_option("--verbose"));
        assert!(!c.looks_like_option("-"));
        assert!(!c.looks_like_option("file"));
    }

    #[test]
    fn custom_prefix() {
        let c = ParserConfig {
            option_prefix: "/".into(),
            ..ParserConfig::new("prog")
        };
        assert!(c.looks_like_option("/help"));
        assert!(!c.looks_like_option("-help"));
    }

    #[test]
    fn separator_can_be_disabled() {
        let mut c = ParserConfig::new("prog");
        assert!(c.is_separator("--"));
        c.separator = None;
        assert!(!c.is_separator("--"));
    }
}
