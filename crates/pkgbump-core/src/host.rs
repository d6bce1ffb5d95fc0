use std::{
    fs::OpenOptions,
    io::{self, Write},
    path::PathBuf,
};

use uuid::Uuid;

/// Environment variable naming the file that collects step outputs.
pub const OUTPUT_FILE_ENV: &str = "GITHUB_OUTPUT";

/// The automation system that receives a run's result or failure.
pub trait Host {
    fn set_output(&mut self, name: &str, value: &str) -> io::Result<()>;
    fn set_failed(&mut self, message: &str);
}

/// Reports through GitHub Actions workflow commands and the output file.
pub struct GithubHost<W: Write> {
    output_file: Option<PathBuf>,
    out: W,
    failed: bool,
}

impl GithubHost<io::Stdout> {
    pub fn from_env() -> Self {
        let output_file = std::env::var_os(OUTPUT_FILE_ENV)
            .filter(|value| !value.is_empty())
            .map(PathBuf::from);
        GithubHost::new(output_file, io::stdout())
    }
}

impl<W: Write> GithubHost<W> {
    pub fn new(output_file: Option<PathBuf>, out: W) -> Self {
        Self {
            output_file,
            out,
            failed: false,
        }
    }

    pub fn failed(&self) -> bool {
        self.failed
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> Host for GithubHost<W> {
    fn set_output(&mut self, name: &str, value: &str) -> io::Result<()> {
        match &self.output_file {
            Some(path) => {
                let delimiter = format!("ghadelimiter_{}", Uuid::new_v4());
                let mut file = OpenOptions::new().create(true).append(true).open(path)?;
                writeln!(file, "{name}<<{delimiter}")?;
                writeln!(file, "{value}")?;
                writeln!(file, "{delimiter}")
            }
            None => writeln!(
                self.out,
                "::set-output name={}::{}",
                escape_property(name),
                escape_data(value)
            ),
        }
    }

    fn set_failed(&mut self, message: &str) {
        self.failed = true;
        if let Err(err) = writeln!(self.out, "::error::{}", escape_data(message)) {
            tracing::error!(error = %err, "failed to emit error command");
        }
    }
}

fn escape_data(value: &str) -> String {
    value
        .replace('%', "%25")
        .replace('\r', "%0D")
        .replace('\n', "%0A")
}

fn escape_property(value: &str) -> String {
    escape_data(value).replace(':', "%3A").replace(',', "%2C")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stdout_text(host: GithubHost<Vec<u8>>) -> String {
        String::from_utf8(host.into_inner()).unwrap()
    }

    #[test]
    fn output_without_file_uses_workflow_command() {
        let mut host = GithubHost::new(None, Vec::new());
        host.set_output("result", "1.2.3").unwrap();
        assert_eq!(stdout_text(host), "::set-output name=result::1.2.3\n");
    }

    #[test]
    fn output_file_gets_delimited_block() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("output");
        let mut host = GithubHost::new(Some(path.clone()), Vec::new());
        host.set_output("result", "1.2.3").unwrap();

        let written = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<_> = written.lines().collect();
        assert_eq!(lines.len(), 3);
        let delimiter = lines[0].strip_prefix("result<<").unwrap();
        assert!(delimiter.starts_with("ghadelimiter_"));
        assert_eq!(lines[1], "1.2.3");
        assert_eq!(lines[2], delimiter);
        assert!(stdout_text(host).is_empty());
    }

    #[test]
    fn failure_is_escaped_and_recorded() {
        let mut host = GithubHost::new(None, Vec::new());
        host.set_failed("100% broken\nsecond line");
        assert!(host.failed());
        assert_eq!(stdout_text(host), "::error::100%25 broken%0Asecond line\n");
    }

    #[test]
    fn property_escaping_covers_separators() {
        assert_eq!(escape_property("a:b,c"), "a%3Ab%2Cc");
    }
}
