use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::catalog::{SchemaIntrospector, SqliteIntrospector};
use crate::config::{TableErrorPolicy, TranslatorConfig};
use crate::error::LitepgResult;
use crate::monitoring::RunMetrics;
use crate::translator::ddl_emitter::DdlEmitter;
use crate::types::{DdlStatement, SkippedObject, StatementKind};

/// Output banner, first line
pub const BANNER: &str = "-- Schema translated from SQLite to PostgreSQL";

/// Section order of the rendered output
pub const SECTION_ORDER: [StatementKind; 3] =
    [StatementKind::Table, StatementKind::View, StatementKind::Index];

/// Everything a translation run produced
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranslationOutput {
    pub source_label: String,
    /// Tables, then views, then indexes, each in enumeration order
    pub statements: Vec<DdlStatement>,
    pub skipped: Vec<SkippedObject>,
}

impl TranslationOutput {
    pub fn new(source_label: impl Into<String>) -> Self {
        Self {
            source_label: source_label.into(),
            statements: Vec::new(),
            skipped: Vec::new(),
        }
    }

    pub fn statements_of(&self, kind: StatementKind) -> impl Iterator<Item = &DdlStatement> {
        self.statements.iter().filter(move |s| s.kind == kind)
    }

    pub fn count(&self, kind: StatementKind) -> usize {
        self.statements_of(kind).count()
    }

    /// Render as a SQL script: banner, then one commented section per object kind
    pub fn render_sql(&self) -> String {
        let mut out = String::new();
        out.push_str(BANNER);
        out.push('\n');
        out.push_str(&format!("-- Source: {}\n", comment_text(&self.source_label)));

        for kind in SECTION_ORDER {
            out.push_str(&format!("\n-- {}\n", kind.section()));
            for statement in self.statements_of(kind) {
                out.push_str(&format!(
                    "\n-- {}: {}\n{}\n",
                    kind.label(),
                    comment_text(&statement.name),
                    statement.sql
                ));
            }
        }

        out
    }

    pub fn to_json(&self) -> LitepgResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn summary(&self) -> String {
        format!(
            "{} tables, {} views, {} indexes, {} skipped",
            self.count(StatementKind::Table),
            self.count(StatementKind::View),
            self.count(StatementKind::Index),
            self.skipped.len()
        )
    }
}

/// Runs introspection and emission as one pass
pub struct SchemaTranslator {
    config: TranslatorConfig,
    emitter: DdlEmitter,
}

impl SchemaTranslator {
    /// Create a new translator with default configuration
    pub fn new() -> Self {
        Self::with_config(TranslatorConfig::default())
    }

    /// Create a new translator with custom configuration
    pub fn with_config(config: TranslatorConfig) -> Self {
        let emitter = DdlEmitter::with_identity(config.identity.clone());
        Self { config, emitter }
    }

    /// Translate the whole catalog behind `introspector`.
    ///
    /// Catalog read failures always abort. A table that cannot be described or
    /// emitted is handled according to [`TableErrorPolicy`]. Views and indexes
    /// without a stored definition are skipped.
    pub async fn translate<I: SchemaIntrospector>(
        &self,
        introspector: &mut I,
        metrics: &mut RunMetrics,
    ) -> LitepgResult<TranslationOutput> {
        let mut output = TranslationOutput::new(self.config.source_label.clone());

        let tracker = metrics.start("tables");
        match self.translate_tables(introspector, &mut output).await {
            Ok(count) => metrics.complete_success(tracker, count),
            Err(e) => {
                metrics.complete_failure(tracker, &e.to_string());
                return Err(e);
            }
        }

        let tracker = metrics.start("views");
        match introspector.views().await {
            Ok(views) => {
                for view in &views {
                    match self.emitter.emit_view(view) {
                        Some(statement) => output.statements.push(statement),
                        None => skip_without_definition(&mut output, StatementKind::View, &view.name),
                    }
                }
                metrics.complete_success(tracker, views.len() as u64);
            }
            Err(e) => {
                metrics.complete_failure(tracker, &e.to_string());
                return Err(e);
            }
        }

        let tracker = metrics.start("indexes");
        match introspector.indexes().await {
            Ok(indexes) => {
                for index in &indexes {
                    match self.emitter.emit_index(index) {
                        Some(statement) => output.statements.push(statement),
                        None => skip_without_definition(&mut output, StatementKind::Index, &index.name),
                    }
                }
                metrics.complete_success(tracker, indexes.len() as u64);
            }
            Err(e) => {
                metrics.complete_failure(tracker, &e.to_string());
                return Err(e);
            }
        }

        info!("Translation finished: {}", output.summary());
        Ok(output)
    }

    /// Translate the catalog, then close the introspector whether or not translation succeeded
    pub async fn translate_and_close<I: SchemaIntrospector>(
        &self,
        mut introspector: I,
        metrics: &mut RunMetrics,
    ) -> LitepgResult<TranslationOutput> {
        let result = self.translate(&mut introspector, metrics).await;

        if let Err(close_error) = introspector.close().await {
            warn!(error = %close_error, "Failed to close source catalog");
        }

        result
    }

    async fn translate_tables<I: SchemaIntrospector>(
        &self,
        introspector: &mut I,
        output: &mut TranslationOutput,
    ) -> LitepgResult<u64> {
        let names = introspector.table_names().await?;
        info!(tables = names.len(), "Enumerated source tables");

        let mut emitted = 0;
        for name in &names {
            let result = match introspector.describe_table(name).await {
                Ok(table) => self.emitter.emit_table(&table),
                Err(e) => Err(e),
            };

            match result {
                Ok(statement) => {
                    debug!(table = %name, "Emitted table");
                    output.statements.push(statement);
                    emitted += 1;
                }
                Err(e) if e.is_connectivity() => return Err(e),
                Err(e) => match self.config.on_table_error {
                    TableErrorPolicy::Abort => return Err(e),
                    TableErrorPolicy::Skip => {
                        warn!(table = %name, error = %e, "Skipping table");
                        output.skipped.push(SkippedObject {
                            kind: StatementKind::Table,
                            name: name.clone(),
                            reason: e.to_string(),
                        });
                    }
                },
            }
        }

        Ok(emitted)
    }
}

impl Default for SchemaTranslator {
    fn default() -> Self {
        Self::new()
    }
}

/// Text placed after `--` must stay on one line
fn comment_text(text: &str) -> String {
    text.replace(['\r', '\n'], " ")
}

fn skip_without_definition(output: &mut TranslationOutput, kind: StatementKind, name: &str) {
    debug!(kind = kind.label(), name = name, "Skipping object without stored definition");
    output.skipped.push(SkippedObject {
        kind,
        name: name.to_string(),
        reason: "no stored definition".to_string(),
    });
}

/// Open a SQLite file, translate its catalog and close the connection
pub async fn translate_sqlite_file(
    path: impl AsRef<Path>,
    config: TranslatorConfig,
    metrics: &mut RunMetrics,
) -> LitepgResult<TranslationOutput> {
    let translator = SchemaTranslator::with_config(config);

    let tracker = metrics.start("open_source");
    let introspector = match SqliteIntrospector::open(path.as_ref()).await {
        Ok(introspector) => {
            metrics.complete_success(tracker, 0);
            introspector
        }
        Err(e) => {
            metrics.complete_failure(tracker, &e.to_string());
            return Err(e);
        }
    };

    translator.translate_and_close(introspector, metrics).await
}
