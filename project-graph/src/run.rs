use crate::{
    analysis::{AnalysisContext, SymbolProcessor, resolve_this_fields, transform_raw_symbols},
    config::AnalysisConfig,
    errors::Result,
    graph::GraphBuilder,
    lsp::LanguageService,
    metrics::{GraphSummary, calculate_node_degrees, data_flow_paths},
    model::{graph::ProjectGraphModel, package::ExternalPackageInfo, symbol::{FileSymbols, RawSymbol}},
    packages::{collect_external_symbols, find_all_packages},
    validation::{ValidationReport, validate_enriched_data, validate_graph},
};
use futures::future::join_all;
use serde::Serialize;
use std::{collections::BTreeMap, path::PathBuf};
use tracing::{info, warn};

/// One source file handed to the pipeline.
#[derive(Debug, Clone, Default)]
pub struct SourceFile {
    pub file_id: String,
    pub text: String,
    /// Pre-fetched symbol forest; fetched through the service when `None`.
    pub symbols: Option<Vec<RawSymbol>>,
}

#[derive(Debug, Clone, Default)]
pub struct AnalysisRequest {
    /// Where to look for `pubspec.yaml` and the package config. Without it
    /// package integration is skipped.
    pub project_root: Option<PathBuf>,
    pub files: Vec<SourceFile>,
}

#[derive(Debug, Clone, Serialize)]
pub struct AnalysisOutput {
    pub graph: ProjectGraphModel,
    pub files: Vec<FileSymbols>,
    pub packages: Vec<ExternalPackageInfo>,
    pub report: ValidationReport,
    /// Writer → node → reader chains, keyed by start node id.
    pub data_flows: BTreeMap<String, Vec<String>>,
}

/// Full run: symbols → enrichment → this.field closure → nodes → edges →
/// packages → degrees → data flow. Per-file, per-symbol and per-package failures are
/// logged and absorbed; only an invalid config fails the run.
#[tracing::instrument(level = "info", skip_all, fields(files = request.files.len()))]
pub async fn analyze_project(
    request: AnalysisRequest,
    service: &dyn LanguageService,
    config: AnalysisConfig,
) -> Result<AnalysisOutput> {
    config.validate()?;

    let mut files = load_symbols(request.files, service).await;
    let mut ctx = AnalysisContext::new(config);
    ctx.prepare(&files);

    let processor = SymbolProcessor::new(&ctx, service);
    processor.process_files(&mut files).await;
    resolve_this_fields(&mut files);
    let mut report = validate_enriched_data(&files);

    let features = &ctx.config.features;
    let packages = match request.project_root.as_deref() {
        Some(root) if features.package_integration => find_all_packages(root, &ctx.config.limits),
        _ => Vec::new(),
    };

    let mut external = if features.external_symbols && !packages.is_empty() {
        collect_external_symbols(&packages, &ctx.config.filters, service).await
    } else {
        Vec::new()
    };
    if !external.is_empty() {
        processor.process_files(&mut external).await;
        resolve_this_fields(&mut external);
    }

    let mut builder = GraphBuilder::new();
    builder.add_files(&files);
    builder.add_files(&external);
    builder.add_edges(service, features.reads_from_edges).await;
    if !packages.is_empty() {
        let label = request
            .project_root
            .as_deref()
            .and_then(|r| r.file_name())
            .map_or_else(|| "project".to_string(), |n| n.to_string_lossy().into_owned());
        builder.integrate_packages(&packages, &ctx.config.filters, &label);
    }

    let mut graph = builder.finish();
    calculate_node_degrees(&mut graph);
    report.merge(validate_graph(&graph));
    let data_flows = data_flow_paths(&graph, ctx.config.limits.data_flow_max_hops);
    GraphSummary::of(&graph).log();
    info!(
        errors = report.errors.len(),
        warnings = report.warnings.len(),
        packages = packages.len(),
        data_flows = data_flows.len(),
        "Analysis finished"
    );

    Ok(AnalysisOutput {
        graph,
        files,
        packages,
        report,
        data_flows,
    })
}

/// Transform every file's forest, fetching missing ones concurrently.
async fn load_symbols(sources: Vec<SourceFile>, service: &dyn LanguageService) -> Vec<FileSymbols> {
    join_all(sources.into_iter().map(|src| async move {
        let raw = match src.symbols {
            Some(raw) => raw,
            None => service.lookup_symbols(&src.file_id).await.unwrap_or_else(|err| {
                warn!(file = %src.file_id, error = %err, "Symbol lookup failed");
                Vec::new()
            }),
        };
        FileSymbols {
            symbols: transform_raw_symbols(&raw, &src.file_id),
            file_id: src.file_id,
            text: src.text,
        }
    }))
    .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        model::{
            graph::EdgeLabel,
            span::{Position, Range},
        },
        test_support::{CannedService, location},
    };
    use std::{collections::HashSet, fs};
    use tempfile::TempDir;

    const SRC: &str = "\
class Counter extends Base {
  int value = 0;
  Counter(this.value);
  void tick() {
    bump();
    bump();
  }
  void bump() {}
}
class Base {}
";

    fn raw(name: &str, kind: u32, detail: &str, lines: (u32, u32), children: Vec<RawSymbol>) -> RawSymbol {
        RawSymbol {
            name: name.into(),
            kind,
            detail: Some(detail.into()),
            range: Some(Range::new(Position::new(lines.0, 0), Position::new(lines.1, 80))),
            selection_range: Some(Range::new(Position::new(lines.0, 2), Position::new(lines.0, 4))),
            children,
        }
    }

    fn counter_symbols() -> Vec<RawSymbol> {
        vec![
            raw(
                "Counter",
                5,
                "class Counter extends Base",
                (0, 8),
                vec![
                    raw("value", 8, "int value", (1, 1), vec![]),
                    raw("Counter", 9, "(this.value)", (2, 2), vec![]),
                    raw("tick", 6, "void tick()", (3, 6), vec![]),
                    raw("bump", 6, "void bump()", (7, 7), vec![]),
                ],
            ),
            raw("Base", 5, "class Base", (9, 9), vec![]),
        ]
    }

    fn request(file_id: &str, root: Option<PathBuf>) -> AnalysisRequest {
        AnalysisRequest {
            project_root: root,
            files: vec![SourceFile {
                file_id: file_id.into(),
                text: SRC.into(),
                symbols: None,
            }],
        }
    }

    #[tokio::test]
    async fn end_to_end_without_packages() {
        let file_id = "file:///work/app/lib/counter.dart";
        let mut svc = CannedService::default();
        svc.symbols.insert(file_id.into(), counter_symbols());

        let out = analyze_project(request(file_id, None), &svc, AnalysisConfig::default())
            .await
            .unwrap();

        let ctor = &out.files[0].symbols[0].children[1];
        assert_eq!(ctor.parameters.as_ref().unwrap()[0].ty, "int");

        let labels: HashSet<_> = out.graph.edges.iter().map(|e| e.label).collect();
        assert_eq!(labels, HashSet::from([EdgeLabel::Extends, EdgeLabel::Calls]));
        assert_eq!(out.graph.edges.iter().filter(|e| e.label == EdgeLabel::Calls).count(), 1);

        let tick = out.graph.nodes.iter().find(|n| n.label == "tick").unwrap();
        assert_eq!(tick.out_degree, 1);
        assert!(out.report.errors.is_empty(), "{:?}", out.report.errors);
        assert!(out.packages.is_empty());
        assert!(out.data_flows.is_empty());
    }

    #[tokio::test]
    async fn reads_show_up_as_data_flow() {
        let file_id = "file:///work/app/lib/counter.dart";
        // Second call in `tick` replaced by a read of `Base`.
        let src = SRC.replacen("    bump();\n    bump();", "    bump();\n    Base();", 1);
        let mut svc = CannedService::default().with_references(file_id, 9, vec![location(file_id, 5)]);
        svc.symbols.insert(file_id.into(), counter_symbols());
        let mut req = request(file_id, None);
        req.files[0].text = src;

        let out = analyze_project(req, &svc, AnalysisConfig::default()).await.unwrap();

        let id = |label: &str| out.graph.nodes.iter().find(|n| n.label == label).unwrap().id.clone();
        let (tick, base) = (id("tick"), id("Base"));
        assert!(out.graph.edges.iter().any(|e| e.label == EdgeLabel::ReadsFrom && e.source == tick && e.target == base));
        assert_eq!(out.data_flows.get(&tick), Some(&vec![tick.clone(), base]));
    }

    #[tokio::test]
    async fn packages_add_containers_and_keep_ids_unique() {
        let tmp = TempDir::new().unwrap();
        let root = tmp.path().join("app");
        let http = tmp.path().join("cache/http");
        fs::create_dir_all(root.join(".dart_tool")).unwrap();
        fs::create_dir_all(http.join("lib")).unwrap();
        let (root, http) = (dunce::canonicalize(&root).unwrap(), dunce::canonicalize(&http).unwrap());
        fs::write(root.join("pubspec.yaml"), "name: app\ndependencies:\n  http: ^1.0.0\n").unwrap();
        fs::write(http.join("pubspec.yaml"), "name: http\nversion: 1.2.0\n").unwrap();
        fs::write(http.join("lib/http.dart"), "class HttpClient {}\n").unwrap();
        let http_uri = url::Url::from_directory_path(&http).unwrap();
        fs::write(
            root.join(".dart_tool/package_config.json"),
            serde_json::json!({ "packages": [{ "name": "http", "rootUri": http_uri.as_str() }] }).to_string(),
        )
        .unwrap();

        let entry = url::Url::from_file_path(http.join("lib/http.dart")).unwrap().to_string();
        let file_id = url::Url::from_file_path(root.join("lib/counter.dart")).unwrap().to_string();

        let mut svc = CannedService::default();
        svc.symbols.insert(file_id.clone(), counter_symbols());
        svc.symbols.insert(entry, vec![raw("HttpClient", 5, "class HttpClient", (0, 0), vec![])]);

        let out = analyze_project(request(&file_id, Some(root)), &svc, AnalysisConfig::default())
            .await
            .unwrap();

        assert_eq!(out.packages.len(), 1);
        let container = out.graph.node("package_container:http").unwrap();
        assert_eq!(container.label, "http");
        let client = out.graph.nodes.iter().find(|n| n.label == "🔗 HttpClient").unwrap();
        assert_eq!(client.parent.as_deref(), Some("package_container:http"));

        let ids: HashSet<_> = out.graph.nodes.iter().map(|n| n.id.as_str()).collect();
        assert_eq!(ids.len(), out.graph.nodes.len());
        assert!(out.report.errors.is_empty(), "{:?}", out.report.errors);
    }
}
