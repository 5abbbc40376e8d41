use std::env;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct OutputConfig {
    pub format: OutputFormat,
    pub pretty: bool,
    pub color: bool,
}

impl OutputConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|k| env::var(k).ok())
    }

    fn from_lookup<F>(get: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let format = match get("SUBTRACK_OUTPUT_FORMAT").as_deref() {
            Some("json") => OutputFormat::Json,
            _ => OutputFormat::Text,
        };
        let pretty = get("SUBTRACK_OUTPUT_PRETTY").as_deref().is_some_and(truthy);
        // colour is opt-in so piped output stays plain
        let color = get("SUBTRACK_COLOR").as_deref().is_some_and(truthy) && get("NO_COLOR").is_none();
        OutputConfig { format, pretty, color }
    }

    /// `--json` on the command line wins over the environment.
    pub fn with_json_flag(mut self, json: bool) -> Self {
        if json {
            self.format = OutputFormat::Json;
        }
        self
    }
}

fn truthy(v: &str) -> bool {
    v.eq_ignore_ascii_case("1") || v.eq_ignore_ascii_case("true") || v.eq_ignore_ascii_case("yes")
}
