//! pg-autodoc: documentation generator for PostgreSQL catalogs
//!
//! This library turns a catalog snapshot into a documentation model:
//! comments are scanned for `\depends`, `\affects` and `\param`
//! annotations, references are resolved against the model, and the
//! resulting dependency forest and annotated comments are rendered for
//! the output templates.

pub mod annotation;
pub mod catalog;
pub mod config;
pub mod dependency;
pub mod error;
pub mod model;
pub mod render;

use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use anyhow::Result;
use serde::Serialize;
use tracing::{debug, info};

use annotation::{KeywordError, KeywordKind};
use config::{AutodocConfig, Registries};
use dependency::{DependencyForest, SchemaObjectRef};
use model::DatabaseModel;
use render::{DocBookMarkup, HtmlMarkup, Locale, Markup, PlainMarkup};

pub use error::AutodocError;

/// Output format of rendered fragments
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Html,
    DocBook,
    Plain,
}

impl OutputFormat {
    pub fn markup(&self) -> &'static dyn Markup {
        match self {
            OutputFormat::Html => &HtmlMarkup,
            OutputFormat::DocBook => &DocBookMarkup,
            OutputFormat::Plain => &PlainMarkup,
        }
    }

    /// File extension of the dependency section
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Html => "html",
            OutputFormat::DocBook => "xml",
            OutputFormat::Plain => "txt",
        }
    }
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "html" => Ok(OutputFormat::Html),
            "docbook" | "dbk" => Ok(OutputFormat::DocBook),
            "plain" | "text" => Ok(OutputFormat::Plain),
            other => Err(format!("unknown output format '{}'", other)),
        }
    }
}

/// Annotated model plus its dependency forest
#[derive(Debug, Clone, Serialize)]
pub struct Documentation {
    pub model: DatabaseModel,
    pub forest: DependencyForest,
}

impl Documentation {
    /// Rendered comment of every commented table and function, keyed by
    /// object id
    pub fn render_comments(&self, markup: &dyn Markup, locale: Locale) -> BTreeMap<String, String> {
        let tables = self.model.tables().filter_map(|table| {
            render::render_comment(table.description.as_deref(), &table.keywords, markup, locale)
                .map(|text| (SchemaObjectRef::for_table(table).id, text))
        });
        let functions = self.model.functions().filter_map(|function| {
            render::render_comment(function.comment.as_deref(), &function.keywords, markup, locale)
                .map(|text| (SchemaObjectRef::for_function(function).id, text))
        });
        tables.chain(functions).collect()
    }

    /// The dependency section, if any dependency was declared
    pub fn render_dependencies(&self, markup: &dyn Markup, locale: Locale) -> Option<String> {
        render::render_forest(&self.forest, markup, locale)
    }

    /// Every keyword carrying an error, in model order
    pub fn annotation_issues(&self) -> Vec<AnnotationIssue> {
        let tables = self
            .model
            .tables()
            .map(|t| (format!("{}.{}", t.schema, t.name), &t.keywords));
        let functions = self
            .model
            .functions()
            .map(|f| (format!("{}.{}", f.schema, f.signature), &f.keywords));

        let mut issues = Vec::new();
        for (object, keywords) in tables.chain(functions) {
            for keyword in keywords {
                if let Some(error) = keyword.error {
                    issues.push(AnnotationIssue {
                        object: object.clone(),
                        keyword: keyword.name.clone(),
                        kind: keyword.kind,
                        position: keyword.position,
                        error,
                    });
                }
            }
        }
        issues
    }
}

/// One broken annotation, as reported by `lint`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AnnotationIssue {
    /// `schema.table` or `schema.signature`
    pub object: String,
    pub keyword: String,
    pub kind: KeywordKind,
    pub position: usize,
    pub error: KeywordError,
}

impl fmt::Display for AnnotationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: {} at {}: {}",
            self.object, self.keyword, self.position, self.error
        )
    }
}

/// Parse and resolve all annotations of `model`, then build its
/// dependency forest
pub fn postprocess(mut model: DatabaseModel, registries: &Registries) -> Result<Documentation> {
    annotation::annotate_model(&mut model, registries);
    let forest = dependency::build_dependency_forest(&model)?;
    Ok(Documentation { model, forest })
}

/// Read the snapshot and config, build the model and post-process it
pub fn load_documentation(catalog_path: &Path, config_path: Option<&Path>) -> Result<Documentation> {
    let config = match config_path {
        Some(path) => config::load_config(path)?,
        None => AutodocConfig::default(),
    };
    let registries = config.registries();
    debug!(
        "Loaded {} layers and {} services",
        registries.layer_count(),
        registries.service_count()
    );

    let snapshot = catalog::read_snapshot(catalog_path)?;
    let model = model::build_model(&snapshot, &config)?;
    info!(
        "Built model for {}: {} tables, {} functions",
        model.name,
        model.table_count(),
        model.function_count()
    );

    postprocess(model, &registries)
}

/// Options for a documentation run
#[derive(Debug, Clone)]
pub struct DocumentOptions {
    /// Path to the catalog snapshot JSON
    pub catalog_path: PathBuf,
    /// Path to the config JSON
    pub config_path: Option<PathBuf>,
    /// Output file prefix (defaults to the database name)
    pub output_prefix: Option<PathBuf>,
    pub format: OutputFormat,
    pub locale: Locale,
}

/// Everything handed to the output templates
#[derive(Serialize)]
struct DocumentFile<'a> {
    database: &'a str,
    comment: Option<&'a str>,
    dumped_on: String,
    format: OutputFormat,
    locale: Locale,
    model: &'a DatabaseModel,
    forest: &'a DependencyForest,
    rendered_comments: BTreeMap<String, String>,
    dependencies: Option<String>,
}

/// Generate the documentation for one catalog snapshot.
///
/// Writes `<prefix>.json` and, when any dependency is declared,
/// `<prefix>.dependencies.<ext>`. Returns the path of the JSON file.
pub fn document_database(options: DocumentOptions) -> Result<PathBuf> {
    info!("Documenting catalog: {}", options.catalog_path.display());

    let documentation =
        load_documentation(&options.catalog_path, options.config_path.as_deref())?;

    let markup = options.format.markup();
    let dependencies = documentation.render_dependencies(markup, options.locale);
    let document = DocumentFile {
        database: &documentation.model.name,
        comment: documentation.model.comment.as_deref(),
        dumped_on: chrono::Local::now().format("%Y-%m-%d %H:%M:%S").to_string(),
        format: options.format,
        locale: options.locale,
        model: &documentation.model,
        forest: &documentation.forest,
        rendered_comments: documentation.render_comments(markup, options.locale),
        dependencies: dependencies.clone(),
    };

    let prefix = options
        .output_prefix
        .unwrap_or_else(|| PathBuf::from(&documentation.model.name));

    let json_path = with_suffix(&prefix, "json");
    let json = serde_json::to_string_pretty(&document)?;
    write_output(&json_path, &json)?;
    info!("Wrote {}", json_path.display());

    if let Some(section) = dependencies {
        let path = with_suffix(&prefix, &format!("dependencies.{}", options.format.extension()));
        write_output(&path, &section)?;
        info!("Wrote {}", path.display());
    }

    Ok(json_path)
}

/// Every annotation error in the catalog
pub fn lint(catalog_path: &Path, config_path: Option<&Path>) -> Result<Vec<AnnotationIssue>> {
    let documentation = load_documentation(catalog_path, config_path)?;
    Ok(documentation.annotation_issues())
}

/// `prefix` + `.` + `suffix`, keeping any dots already in the prefix
fn with_suffix(prefix: &Path, suffix: &str) -> PathBuf {
    let mut name = prefix.as_os_str().to_os_string();
    name.push(".");
    name.push(suffix);
    PathBuf::from(name)
}

fn write_output(path: &Path, content: &str) -> Result<()> {
    std::fs::write(path, content).map_err(|e| {
        AutodocError::OutputWriteError {
            path: path.to_path_buf(),
            source: e,
        }
        .into()
    })
}
