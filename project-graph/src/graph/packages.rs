//! Package integration.
//!
//! - one container node per relevant package (`package_container:<name>`)
//! - nodes from an external package become children of its container and
//!   get a `🔗 ` label marker; SDK nodes get `⚙️ `
//! - USES_AS_TYPE between containers whenever an edge crosses packages, and
//!   from the `project_root` container when a project node reaches a package

use crate::{
    config::Filters,
    graph::builder::GraphBuilder,
    model::{
        graph::{
            EdgeLabel, Layer, NodeData, PACKAGE_CONTAINER_KIND, PROJECT_CONTAINER_KIND,
            ProjectGraphNode,
        },
        package::{ExternalPackageInfo, FileSource, PackageType, SourceKind},
        span::{Position, Range},
        symbol::Access,
    },
    packages::determine_file_source,
};
use tracing::{debug, info};

pub const PROJECT_ROOT_ID: &str = "project_root";
pub const EXTERNAL_MARKER: &str = "🔗 ";
pub const SDK_MARKER: &str = "⚙️ ";

pub fn container_id(package: &str) -> String {
    format!("package_container:{package}")
}

/// Packages worth a container: third-party, custom, and official Flutter
/// packages minus the configured framework ones.
pub fn relevant_packages<'p>(
    packages: &'p [ExternalPackageInfo],
    filters: &Filters,
) -> Vec<&'p ExternalPackageInfo> {
    packages
        .iter()
        .filter(|pkg| match pkg.package_type {
            PackageType::ThirdParty | PackageType::Custom => true,
            PackageType::FlutterOfficial => !filters.framework_packages.contains(&pkg.name),
            PackageType::Sdk => false,
        })
        .collect()
}

impl GraphBuilder<'_> {
    #[tracing::instrument(level = "info", skip_all, fields(packages = packages.len()))]
    pub fn integrate_packages(&mut self, packages: &[ExternalPackageInfo], filters: &Filters, project_label: &str) {
        if packages.is_empty() {
            debug!("No packages to integrate");
            return;
        }
        let containers = self.add_package_containers(&relevant_packages(packages, filters));
        let assigned = self.assign_nodes_to_packages(packages);
        let cross = self.add_package_dependency_edges(project_label);
        info!(containers, assigned, cross, "Packages integrated");
    }

    fn add_package_containers(&mut self, packages: &[&ExternalPackageInfo]) -> usize {
        packages
            .iter()
            .filter(|pkg| self.add_node(package_container(pkg)))
            .count()
    }

    /// Tag every symbol node with its origin; reparent external ones.
    fn assign_nodes_to_packages(&mut self, packages: &[ExternalPackageInfo]) -> usize {
        let mut assigned = 0;
        for i in 0..self.graph.nodes.len() {
            if self.graph.nodes[i].is_container() {
                continue;
            }
            let source = determine_file_source(&self.graph.nodes[i].data.file_id, packages);
            let container = source
                .package_name
                .as_deref()
                .map(container_id)
                .filter(|id| self.has_node(id));

            let node = &mut self.graph.nodes[i];
            match source.kind {
                SourceKind::ExternalPackage => {
                    if let Some(container) = container {
                        node.parent = Some(container);
                        assigned += 1;
                    }
                    node.label = format!("{EXTERNAL_MARKER}{}", node.label);
                }
                SourceKind::Sdk => node.label = format!("{SDK_MARKER}{}", node.label),
                SourceKind::Project => {}
            }
            node.data.source = Some(source);
        }
        assigned
    }

    fn add_package_dependency_edges(&mut self, project_label: &str) -> usize {
        let crossings: Vec<(Option<String>, String)> = self
            .graph
            .edges
            .iter()
            .filter_map(|e| {
                let from = self.package_of(&e.source);
                let to = self.package_of(&e.target)?;
                (from.as_deref() != Some(to.as_str())).then_some((from, to))
            })
            .collect();

        let mut created = 0;
        for (from, to) in crossings {
            let target = container_id(&to);
            if !self.has_node(&target) {
                continue;
            }
            let source = match from {
                Some(pkg) => container_id(&pkg),
                None => {
                    self.add_node(project_container(project_label));
                    PROJECT_ROOT_ID.to_string()
                }
            };
            if self.create_edge(&source, &target, EdgeLabel::UsesAsType) {
                debug!(%source, %target, "Package dependency");
                created += 1;
            }
        }
        created
    }

    fn package_of(&self, node_id: &str) -> Option<String> {
        self.node(node_id)?.data.source.as_ref()?.package_name.clone()
    }
}

fn name_range(name: &str) -> Option<Range> {
    Some(Range::new(
        Position::new(0, 0),
        Position::new(0, name.encode_utf16().count() as u32),
    ))
}

fn package_container(pkg: &ExternalPackageInfo) -> ProjectGraphNode {
    ProjectGraphNode {
        id: container_id(&pkg.name),
        label: pkg.name.clone(),
        kind: PACKAGE_CONTAINER_KIND.to_string(),
        data: NodeData {
            file_id: format!("file:///packages/{}", pkg.name),
            range: name_range(&pkg.name),
            selection_range: name_range(&pkg.name),
            access: Some(Access::Public),
            is_sdk: pkg.package_type == PackageType::Sdk,
            layer: Layer::Utility,
            source: Some(FileSource {
                kind: SourceKind::ExternalPackage,
                package_name: Some(pkg.name.clone()),
                package_version: Some(pkg.version.clone()),
                package_type: Some(pkg.package_type),
                relative_path: None,
            }),
        },
        parent: None,
        in_degree: 0,
        out_degree: 0,
    }
}

fn project_container(label: &str) -> ProjectGraphNode {
    ProjectGraphNode {
        id: PROJECT_ROOT_ID.to_string(),
        label: label.to_string(),
        kind: PROJECT_CONTAINER_KIND.to_string(),
        data: NodeData {
            file_id: format!("file:///{PROJECT_ROOT_ID}"),
            range: name_range(label),
            selection_range: name_range(label),
            access: Some(Access::Public),
            is_sdk: false,
            layer: Layer::Utility,
            source: Some(FileSource::project()),
        },
        ..Default::default()
    }
}
