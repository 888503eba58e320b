use colored::Colorize;
use wirecode_build::{ExpansionReport, Finding};

use crate::theme::{ICONS, THEME};

/// Global CLI options that affect output
#[derive(Clone, Debug, Default)]
pub struct GlobalOptions {
    pub quiet: bool,
    pub verbose: bool,
    pub no_color: bool,
}

/// Output manager handles formatting and display.
///
/// Generated code goes to stdout; everything else goes to stderr so the
/// expansion can be redirected on its own.
pub struct OutputManager {
    pub options: GlobalOptions,
}

impl OutputManager {
    pub fn new(options: GlobalOptions) -> Self {
        Self { options }
    }

    fn line(&self, icon: &str, message: &str, color: colored::Color) -> String {
        if self.options.no_color {
            format!("{icon} {message}")
        } else {
            format!("{} {}", icon.color(color), message.color(color))
        }
    }

    /// Display a success message with color and icon
    pub fn success(&self, message: &str) {
        if !self.options.quiet {
            eprintln!("{}", self.line(ICONS.success, message, THEME.success));
        }
    }

    /// Display an error message with color and icon
    pub fn error(&self, message: &str) {
        eprintln!("{}", self.line(ICONS.error, message, THEME.error));
    }

    /// Display a warning message
    pub fn warning(&self, message: &str) {
        eprintln!("{}", self.line(ICONS.warning, message, THEME.warning));
    }

    /// Display info message with color and icon
    pub fn info(&self, message: &str) {
        if !self.options.quiet {
            eprintln!("{}", self.line(ICONS.info, message, THEME.info));
        }
    }

    /// Display a finding, coloured by severity, with its location underneath
    pub fn finding(&self, finding: &Finding) {
        let message = finding.diagnostic.to_string();
        if finding.is_error() {
            self.error(&message);
        } else {
            self.warning(&message);
        }

        let (line, column) = finding.location();
        let location = format!("{}:{line}:{column} in `{}`", finding.file.display(), finding.item);
        if self.options.no_color {
            eprintln!("  {} {location}", ICONS.arrow);
        } else {
            eprintln!("  {} {}", ICONS.arrow.color(THEME.muted), location.color(THEME.muted));
        }
    }

    /// Display every finding of a report
    pub fn findings(&self, report: &ExpansionReport) {
        for finding in &report.findings {
            self.finding(finding);
        }
    }

    /// List the items a report covers (verbose only)
    pub fn items(&self, report: &ExpansionReport) {
        if !self.options.verbose || self.options.quiet {
            return;
        }
        for item in &report.items {
            let status = match &item.code {
                Some(code) if code.is_empty() => "nothing to generate",
                Some(_) => "expanded",
                None => "failed",
            };
            let text = format!("{} #[{}] {status}", item.name, item.macro_name);
            if self.options.no_color {
                eprintln!("  {} {text}", ICONS.file);
            } else {
                eprintln!("  {} {}", ICONS.file.color(THEME.muted), text.color(THEME.primary));
            }
        }
    }

    /// Print generated code to stdout
    pub fn code(&self, code: &str) {
        if self.options.no_color {
            println!("{code}");
        } else {
            println!("{}", code.color(THEME.code));
        }
    }
}
