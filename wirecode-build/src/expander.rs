//! Runs the expansion pipeline over every annotated item of a source tree.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use syn::spanned::Spanned;
use wirecode_codegen::diagnostics::classify;
use wirecode_codegen::{
    CollectingSink, Diagnostic, Expander, Formatter, InternalError, PlanContext, PlanError, PrettyFormatter,
};

use crate::scanner::{AnnotatedItem, Scanner};

const LISTING_HEADER: &str = "// @generated by wirecode. Do not edit.\n";

/// Builder for configuring and running an expansion over source paths.
#[derive(Debug, Clone)]
pub struct SourceExpander {
    scan_paths: Vec<PathBuf>,
    output_file: Option<PathBuf>,
    crate_name: String,
    runtime: Option<String>,
    deny_warnings: bool,
}

impl SourceExpander {
    /// Create an expander with default settings.
    pub fn new() -> Self {
        Self {
            scan_paths: Vec::new(),
            output_file: None,
            crate_name: "crate".to_string(),
            runtime: None,
            deny_warnings: false,
        }
    }

    /// Add a file or directory to scan.
    ///
    /// Can be called multiple times. Default: `src/`
    pub fn scan_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.scan_paths.push(path.into());
        self
    }

    /// Write the expansion listing to `path` on [`run`](Self::run).
    pub fn output_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.output_file = Some(path.into());
        self
    }

    /// Set the crate name used in module paths.
    ///
    /// Default: `crate`
    pub fn crate_name(mut self, name: impl Into<String>) -> Self {
        self.crate_name = name.into();
        self
    }

    /// Runtime crate path for items without `#[coding(crate = "...")]`.
    ///
    /// Default: `::wirecode`
    pub fn runtime_path(mut self, path: impl Into<String>) -> Self {
        self.runtime = Some(path.into());
        self
    }

    /// Fail [`run`](Self::run) on warnings as well as errors.
    pub fn deny_warnings(mut self, deny: bool) -> Self {
        self.deny_warnings = deny;
        self
    }

    /// Scan and expand without writing anything or failing on diagnostics.
    pub fn collect(&self) -> Result<ExpansionReport> {
        let runtime = self
            .runtime
            .as_deref()
            .map(|runtime| {
                syn::parse_str::<syn::Path>(runtime).with_context(|| format!("invalid runtime path `{runtime}`"))
            })
            .transpose()?;

        let mut scanner = Scanner::new(&self.crate_name);
        if let Some(output) = &self.output_file {
            scanner = scanner.exclude(output);
        }
        if let Some(runtime) = &runtime {
            scanner = scanner.runtime(runtime);
        }

        let default_paths = [PathBuf::from("src/")];
        let scan_paths = if self.scan_paths.is_empty() {
            &default_paths[..]
        } else {
            &self.scan_paths[..]
        };

        let mut report = ExpansionReport::default();
        for path in scan_paths {
            let annotated = scanner
                .scan_path(path)
                .with_context(|| format!("Failed to scan {}", path.display()))?;

            for item in annotated {
                let mut expander = Expander::new(item.identity).existing(item.existing);
                if let Some(runtime) = &runtime {
                    expander = expander.runtime(runtime.clone());
                }
                report.add(item, &expander, &PrettyFormatter);
            }
        }

        log::debug!(
            "expanded {} item(s) with {} finding(s)",
            report.items.len(),
            report.findings.len()
        );
        Ok(report)
    }

    /// Expand, print findings, fail on errors, then write the listing if
    /// one is configured and its content changed.
    ///
    /// Meant for `build.rs`; the CLI drives [`collect`](Self::collect) itself.
    pub fn run(self) -> Result<ExpansionReport> {
        let report = self.collect()?;

        for finding in &report.findings {
            eprintln!("wirecode-build: {finding}");
        }
        if !report.passes(self.deny_warnings) {
            bail!(
                "wirecode-build: {} error(s), {} warning(s)",
                report.errors().count(),
                report.warnings().count()
            );
        }

        if let Some(output) = &self.output_file
            && report.write_to(output)?
        {
            eprintln!(
                "wirecode-build: Generated {} with {} expansions",
                output.display(),
                report.expanded().count()
            );
        }

        Ok(report)
    }
}

impl Default for SourceExpander {
    fn default() -> Self {
        Self::new()
    }
}

/// One annotated item and what became of it.
#[derive(Debug, Clone)]
pub struct ExpandedItem {
    pub name: String,
    pub file: PathBuf,
    pub macro_name: &'static str,
    /// Formatted expansion; `None` when planning failed. Empty when there was
    /// nothing left to generate.
    pub code: Option<String>,
}

/// A diagnostic tied to the item and file it came from.
#[derive(Debug, Clone)]
pub struct Finding {
    pub file: PathBuf,
    pub item: String,
    pub diagnostic: Diagnostic,
}

impl Finding {
    pub fn is_error(&self) -> bool {
        self.diagnostic.is_error()
    }

    /// 1-based line and column of the reported span.
    pub fn location(&self) -> (usize, usize) {
        let start = self.diagnostic.span.start();
        (start.line, start.column + 1)
    }
}

impl fmt::Display for Finding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (line, column) = self.location();
        write!(
            f,
            "{}:{line}:{column}: {} (in `{}`)",
            self.file.display(),
            self.diagnostic,
            self.item
        )
    }
}

#[derive(Debug, Clone, Default)]
pub struct ExpansionReport {
    pub items: Vec<ExpandedItem>,
    pub findings: Vec<Finding>,
}

impl ExpansionReport {
    /// Expand one item. Every failure stays with the item; siblings are unaffected.
    fn add(&mut self, item: AnnotatedItem, expander: &Expander, formatter: &dyn Formatter) {
        let name = item.qualified_name();
        let mut sink = CollectingSink::new();
        let tokens = expander.expand_item(&item.item, &mut sink);

        let mut diagnostics = sink.into_inner();
        let code = match tokens.map(|tokens| formatter.format(tokens)) {
            Some(Ok(code)) => Some(code),
            Some(Err(err)) => {
                let err = PlanError::from(InternalError::new("format", err.to_string()));
                let ctx = PlanContext::new(item.identity, PlanContext::default_runtime());
                diagnostics.push(classify(&err, &ctx, item.item.span()));
                None
            }
            None => None,
        };

        for diagnostic in diagnostics {
            log::debug!("{name}: {diagnostic}");
            self.findings.push(Finding {
                file: item.file.clone(),
                item: name.clone(),
                diagnostic,
            });
        }

        self.items.push(ExpandedItem {
            name,
            file: item.file,
            macro_name: item.identity.name(),
            code,
        });
    }

    pub fn errors(&self) -> impl Iterator<Item = &Finding> {
        self.findings.iter().filter(|f| f.is_error())
    }

    pub fn warnings(&self) -> impl Iterator<Item = &Finding> {
        self.findings.iter().filter(|f| !f.is_error())
    }

    pub fn has_errors(&self) -> bool {
        self.errors().next().is_some()
    }

    pub fn passes(&self, deny_warnings: bool) -> bool {
        !self.has_errors() && !(deny_warnings && self.warnings().next().is_some())
    }

    /// Items that produced code.
    pub fn expanded(&self) -> impl Iterator<Item = &ExpandedItem> {
        self.items
            .iter()
            .filter(|item| item.code.as_deref().is_some_and(|code| !code.is_empty()))
    }

    /// Every expansion, labelled with the item and macro it belongs to.
    pub fn listing(&self) -> String {
        let mut listing = String::from(LISTING_HEADER);
        for item in self.expanded() {
            listing.push_str(&format!("\n// {} (#[{}])\n", item.name, item.macro_name));
            if let Some(code) = &item.code {
                listing.push_str(code);
            }
        }
        listing
    }

    /// Write the listing to `path`, creating parent directories.
    ///
    /// Returns `false` without touching the file when its content is unchanged.
    pub fn write_to(&self, path: &Path) -> Result<bool> {
        let listing = self.listing();

        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent).with_context(|| format!("Failed to create directory {}", parent.display()))?;
        }

        let should_write = match fs::read_to_string(path) {
            Ok(existing) => existing != listing,
            Err(_) => true,
        };

        if should_write {
            fs::write(path, &listing).with_context(|| format!("Failed to write {}", path.display()))?;
        }
        Ok(should_write)
    }
}
