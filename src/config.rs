use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Language level consulted by version-dependent token actions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum PhpVersion {
    #[serde(rename = "5.2")]
    Php52,
    #[serde(rename = "5.3")]
    Php53,
    #[serde(rename = "5.4")]
    Php54,
    #[serde(rename = "5.5")]
    Php55,
    #[serde(rename = "5.6")]
    Php56,
    #[serde(rename = "7.0")]
    Php70,
    #[serde(rename = "7.3")]
    Php73,
    #[serde(rename = "7.4")]
    Php74,
    #[serde(rename = "8.0")]
    Php80,
}

impl PhpVersion {
    pub const LATEST: PhpVersion = PhpVersion::Php80;

    pub fn parse(s: &str) -> Option<PhpVersion> {
        use PhpVersion::*;
        Some(match s.trim() {
            "5.2" => Php52,
            "5.3" => Php53,
            "5.4" => Php54,
            "5.5" => Php55,
            "5.6" => Php56,
            "7.0" | "7.1" | "7.2" => Php70,
            "7.3" => Php73,
            "7.4" => Php74,
            "8.0" | "8" => Php80,
            _ => return None,
        })
    }
}

impl Default for PhpVersion {
    fn default() -> Self {
        PhpVersion::LATEST
    }
}

/// Scanner options.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LexerOptions {
    /// Enables `<%`, `<%=` and `%>`.
    #[serde(default)]
    pub allow_asp_tags: bool,
    /// Enables `<?` and `<?=` without `php`.
    #[serde(default)]
    pub allow_short_tags: bool,
    #[serde(default)]
    pub version: PhpVersion,
}

impl Default for LexerOptions {
    fn default() -> Self {
        Self {
            allow_asp_tags: false,
            allow_short_tags: false,
            version: PhpVersion::LATEST,
        }
    }
}

/// Load options from a JSON file; a missing file yields the defaults.
pub fn load_options(path: &Path) -> std::io::Result<LexerOptions> {
    if !path.exists() {
        return Ok(LexerOptions::default());
    }
    let text = fs::read_to_string(path)?;
    let opts: LexerOptions = serde_json::from_str(&text)
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
    Ok(opts)
}

/// Environment variable naming an options file for the binaries.
pub const CONFIG_ENV: &str = "PHPLEX_CONFIG";

/// Options for a binary: the file named by `PHPLEX_CONFIG` (if any), then
/// `--asp-tags`, `--short-tags` and `--php <ver>` from `args`.
/// Returns the options and the arguments that were not consumed.
pub fn options_from_args<I>(args: I) -> Result<(LexerOptions, Vec<String>), String>
where
    I: IntoIterator<Item = String>,
{
    let mut opts = match std::env::var_os(CONFIG_ENV) {
        Some(path) => load_options(Path::new(&path))
            .map_err(|e| format!("{CONFIG_ENV}={}: {e}", Path::new(&path).display()))?,
        None => LexerOptions::default(),
    };

    let mut rest = Vec::new();
    let mut args = args.into_iter();
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--asp-tags" => opts.allow_asp_tags = true,
            "--short-tags" => opts.allow_short_tags = true,
            "--php" => {
                let v = args.next().ok_or("--php needs a version")?;
                opts.version =
                    PhpVersion::parse(&v).ok_or_else(|| format!("unknown PHP version {v:?}"))?;
            }
            _ => rest.push(arg),
        }
    }
    Ok((opts, rest))
}
