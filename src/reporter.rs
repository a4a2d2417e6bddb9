//! The reporter interface: progress ticks, per-project summaries, and
//! per-symbol diagnostics, behind a closed five-method set (begin, end,
//! reportProgress, reportStatus, reportInternalSymbol).

use std::fs::File;
use std::io::Write;
use std::sync::Mutex;

#[derive(Debug, Clone)]
pub struct ProjectSummary {
    pub project_name: String,
    pub symbol_count: u64,
    pub document_count: u64,
    pub elapsed_ms: u128,
}

#[derive(Debug, Clone)]
pub struct SymbolDiagnostic {
    pub identity: String,
    pub display_name: String,
    pub message: String,
}

pub trait Reporter: Send + Sync {
    fn begin(&self) {}
    fn end(&self) {}
    fn report_progress(&self, documents_indexed: u64);
    fn report_status(&self, summary: &ProjectSummary);
    fn report_internal_symbol(&self, diagnostic: SymbolDiagnostic);
}

/// Discards every event. The default when no reporter is configured.
pub struct NullReporter;

impl Reporter for NullReporter {
    fn report_progress(&self, _documents_indexed: u64) {}
    fn report_status(&self, _summary: &ProjectSummary) {}
    fn report_internal_symbol(&self, _diagnostic: SymbolDiagnostic) {}
}

/// Writes a human-readable progress trace to stdout via a single
/// `indicatif::ProgressBar`, driven by the five-event interface.
pub struct StdoutReporter {
    bar: indicatif::ProgressBar,
}

impl StdoutReporter {
    pub fn new(total_documents: u64) -> Self {
        let bar = indicatif::ProgressBar::new(total_documents);
        bar.set_style(
            indicatif::ProgressStyle::default_bar()
                .template("{bar:40.cyan/blue} {pos}/{len} documents indexed"),
        );
        Self { bar }
    }
}

impl Reporter for StdoutReporter {
    fn begin(&self) {
        self.bar.set_message("indexing");
    }

    fn end(&self) {
        self.bar.finish_with_message("done");
    }

    fn report_progress(&self, documents_indexed: u64) {
        self.bar.set_position(documents_indexed);
    }

    fn report_status(&self, summary: &ProjectSummary) {
        self.bar.println(format!(
            "project {}: {} symbols, {} documents, {}ms",
            summary.project_name, summary.symbol_count, summary.document_count, summary.elapsed_ms
        ));
    }

    fn report_internal_symbol(&self, diagnostic: SymbolDiagnostic) {
        self.bar.println(format!(
            "warning: `{}` is treated as internal although referenced outside its declaring document ({})",
            diagnostic.display_name, diagnostic.message
        ));
    }
}

/// Writes a newline-delimited trace of events to a file; used so
/// progress output never interleaves with the dump itself when the dump
/// is written to stdout.
pub struct FileReporter {
    file: Mutex<File>,
}

impl FileReporter {
    pub fn new(file: File) -> Self {
        Self { file: Mutex::new(file) }
    }

    fn write_line(&self, line: &str) {
        if let Ok(mut f) = self.file.lock() {
            let _ = writeln!(f, "{}", line);
        }
    }
}

impl Reporter for FileReporter {
    fn begin(&self) {
        self.write_line("begin");
    }

    fn end(&self) {
        self.write_line("end");
    }

    fn report_progress(&self, documents_indexed: u64) {
        self.write_line(&format!("progress {}", documents_indexed));
    }

    fn report_status(&self, summary: &ProjectSummary) {
        self.write_line(&format!(
            "status project={} symbols={} documents={} elapsed_ms={}",
            summary.project_name, summary.symbol_count, summary.document_count, summary.elapsed_ms
        ));
    }

    fn report_internal_symbol(&self, diagnostic: SymbolDiagnostic) {
        self.write_line(&format!(
            "internal-symbol identity={} display={} message={}",
            diagnostic.identity, diagnostic.display_name, diagnostic.message
        ));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_reporter_writes_one_line_per_event() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("report.log");
        let reporter = FileReporter::new(File::create(&path).unwrap());
        reporter.begin();
        reporter.report_progress(3);
        reporter.end();

        let contents = std::fs::read_to_string(&path).unwrap();
        assert_eq!(contents.lines().count(), 3);
        assert!(contents.contains("progress 3"));
    }

    #[test]
    fn null_reporter_does_not_panic_on_any_event() {
        let reporter = NullReporter;
        reporter.begin();
        reporter.report_progress(1);
        reporter.report_status(&ProjectSummary {
            project_name: "p".into(),
            symbol_count: 1,
            document_count: 1,
            elapsed_ms: 1,
        });
        reporter.report_internal_symbol(SymbolDiagnostic {
            identity: "a".into(),
            display_name: "a".into(),
            message: "m".into(),
        });
        reporter.end();
    }
}
