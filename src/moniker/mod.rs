//! Computes cross-project identity strings for symbols.

pub mod export;
pub mod import;
pub mod manifest;

use std::path::Path;

use crate::protocol::types::{Moniker, MonikerKind, PackageInformation};

pub use export::ExportResolver;
pub use import::ImportResolver;
pub use manifest::{find_owning_manifest, CargoManifestReader, ManifestReader};

/// The `moniker` configuration mode: `strict` surfaces a diagnostic
/// whenever a symbol falls back to `local` despite being referenced
/// outside its declaring document; `lenient` stays silent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MonikerMode {
    Strict,
    Lenient,
}

/// What a symbol resolution produced. A symbol that is simultaneously
/// imported and re-exported gets both monikers, with a `next` edge from
/// the export alias's ResultSet to the imported one —
/// `ImportedAndReExported` carries both so the data manager can wire
/// that edge.
pub enum MonikerDecision {
    Resolved(Moniker, Option<PackageInformation>),
    ImportedAndReExported {
        import: (Moniker, PackageInformation),
        export: (Moniker, PackageInformation),
    },
    /// Local moniker, with `true` when the strict-mode diagnostic should
    /// fire (symbol referenced outside its declaring document despite
    /// being internal).
    Local { moniker: Moniker, report_as_internal: bool },
}

pub struct SymbolContext<'a> {
    pub declaration_file: &'a Path,
    pub canonical_identity: &'a str,
    pub is_re_export: bool,
    pub reachable_from_export_entry: bool,
    pub referenced_outside_declaring_document: bool,
}

/// Combines the Import and Export sub-resolvers with the `local`
/// fallback.
pub struct Resolver {
    pub import: Option<ImportResolver>,
    pub export: Option<ExportResolver>,
    pub mode: MonikerMode,
    pub local_scheme: String,
}

impl Resolver {
    pub fn resolve(&self, ctx: &SymbolContext) -> MonikerDecision {
        let export = self
            .export
            .as_ref()
            .and_then(|r| r.resolve(ctx.declaration_file, ctx.canonical_identity, ctx.reachable_from_export_entry));
        let import = self
            .import
            .as_ref()
            .and_then(|r| r.resolve(ctx.declaration_file, ctx.canonical_identity));

        match (import, export) {
            (Some(import), Some(export)) => MonikerDecision::ImportedAndReExported { import, export },
            (None, Some((moniker, package))) => MonikerDecision::Resolved(moniker, Some(package)),
            (Some((moniker, package)), None) => MonikerDecision::Resolved(moniker, Some(package)),
            (None, None) => {
                let report_as_internal =
                    self.mode == MonikerMode::Strict && ctx.referenced_outside_declaring_document;
                MonikerDecision::Local {
                    moniker: Moniker {
                        kind: MonikerKind::Local,
                        scheme: self.local_scheme.clone(),
                        identifier: ctx.canonical_identity.to_string(),
                    },
                    report_as_internal,
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn falls_back_to_local_with_diagnostic_in_strict_mode() {
        let resolver = Resolver {
            import: None,
            export: None,
            mode: MonikerMode::Strict,
            local_scheme: "local".to_string(),
        };
        let ctx = SymbolContext {
            declaration_file: Path::new("/ws/a.rs"),
            canonical_identity: "a.helper",
            is_re_export: false,
            reachable_from_export_entry: false,
            referenced_outside_declaring_document: true,
        };
        match resolver.resolve(&ctx) {
            MonikerDecision::Local { report_as_internal, .. } => assert!(report_as_internal),
            _ => panic!("expected a local decision"),
        }
    }

    #[test]
    fn lenient_mode_never_reports_locals() {
        let resolver = Resolver {
            import: None,
            export: None,
            mode: MonikerMode::Lenient,
            local_scheme: "local".to_string(),
        };
        let ctx = SymbolContext {
            declaration_file: Path::new("/ws/a.rs"),
            canonical_identity: "a.helper",
            is_re_export: false,
            reachable_from_export_entry: false,
            referenced_outside_declaring_document: true,
        };
        match resolver.resolve(&ctx) {
            MonikerDecision::Local { report_as_internal, .. } => assert!(!report_as_internal),
            _ => panic!("expected a local decision"),
        }
    }
}
