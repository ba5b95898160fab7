use super::*;
use crate::catalog::SchemaIntrospector;
use crate::config::{IdentityDetection, TableErrorPolicy, TranslatorConfig};
use crate::error::{LitepgError, LitepgResult};
use crate::monitoring::{OperationStatus, RunMetrics};
use crate::types::*;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// In-memory catalog used to drive the pipeline without a database
#[derive(Default)]
struct MemoryIntrospector {
    tables: Vec<TableDescriptor>,
    views: Vec<ViewDescriptor>,
    indexes: Vec<IndexDescriptor>,
    broken_tables: HashMap<String, String>,
    fail_listing: bool,
    closed: Arc<AtomicBool>,
}

impl SchemaIntrospector for MemoryIntrospector {
    async fn table_names(&mut self) -> LitepgResult<Vec<String>> {
        if self.fail_listing {
            return Err(LitepgError::connectivity("catalog went away"));
        }
        Ok(self.tables.iter().map(|t| t.name.clone()).collect())
    }

    async fn describe_table(&mut self, name: &str) -> LitepgResult<TableDescriptor> {
        if let Some(message) = self.broken_tables.get(name) {
            return Err(LitepgError::emission(format!("table {}", name), message.clone()));
        }
        self.tables
            .iter()
            .find(|t| t.name == name)
            .cloned()
            .ok_or_else(|| LitepgError::emission(format!("table {}", name), "not found in source catalog"))
    }

    async fn views(&mut self) -> LitepgResult<Vec<ViewDescriptor>> {
        Ok(self.views.clone())
    }

    async fn indexes(&mut self) -> LitepgResult<Vec<IndexDescriptor>> {
        Ok(self.indexes.clone())
    }

    async fn close(self) -> LitepgResult<()> {
        self.closed.store(true, Ordering::SeqCst);
        Ok(())
    }
}

/// id auto-increment key, nombre text not null, activo boolean default 0
fn operadores_table() -> TableDescriptor {
    TableDescriptor::new("operadores")
        .with_column(ColumnDescriptor::new("id", "INTEGER").primary_key(1).rowid_alias())
        .with_column(ColumnDescriptor::new("nombre", "TEXT").not_null())
        .with_column(ColumnDescriptor::new("activo", "BOOLEAN").with_default("0"))
}

fn warehouse_catalog() -> MemoryIntrospector {
    let articulos = TableDescriptor::new("articulos")
        .with_column(ColumnDescriptor::new("id", "INTEGER").primary_key(1).rowid_alias().not_null().with_default("7"))
        .with_column(ColumnDescriptor::new("codigo", "VARCHAR(20)").not_null())
        .with_column(ColumnDescriptor::new("precio", "REAL").with_default("0"))
        .with_column(ColumnDescriptor::new("unidad", "TEXT").with_default("'UN'"))
        .with_column(ColumnDescriptor::new("observaciones", "TEXT").with_default("NULL"))
        .with_column(ColumnDescriptor::new("foto", "BLOB"));

    let detalle = TableDescriptor::new("inventario_detalle")
        .with_column(ColumnDescriptor::new("articulo_id", "INTEGER").not_null().primary_key(2))
        .with_column(ColumnDescriptor::new("inventario_id", "INTEGER").not_null().primary_key(1))
        .with_column(ColumnDescriptor::new("cantidad", "REAL").not_null().with_default("0"));

    MemoryIntrospector {
        tables: vec![articulos, detalle, operadores_table()],
        views: vec![
            ViewDescriptor {
                name: "v_stock".to_string(),
                definition: Some("CREATE VIEW v_stock AS SELECT codigo FROM articulos".to_string()),
            },
            ViewDescriptor {
                name: "v_roto".to_string(),
                definition: None,
            },
        ],
        indexes: vec![IndexDescriptor {
            name: "idx_articulos_codigo".to_string(),
            definition: Some("CREATE UNIQUE INDEX idx_articulos_codigo ON articulos (codigo)".to_string()),
        }],
        ..Default::default()
    }
}

#[cfg(test)]
mod emitter_tests {
    use super::*;

    #[test]
    fn test_operadores_scenario() {
        let emitter = DdlEmitter::new();
        let statement = emitter.emit_table(&operadores_table()).unwrap();

        assert_eq!(
            statement.sql,
            "CREATE TABLE IF NOT EXISTS operadores (\n    id SERIAL PRIMARY KEY,\n    nombre TEXT NOT NULL,\n    activo SMALLINT DEFAULT 0\n);"
        );
        assert_eq!(statement.kind, StatementKind::Table);
        assert_eq!(statement.name, "operadores");
    }

    #[test]
    fn test_identity_column_drops_not_null_and_default() {
        let emitter = DdlEmitter::new();
        let column = ColumnDescriptor::new("id", "INTEGER")
            .primary_key(1)
            .rowid_alias()
            .not_null()
            .with_default("7");

        let definition = emitter.column_definition(&column);

        assert_eq!(definition, "id SERIAL PRIMARY KEY");
        assert!(!definition.contains("NOT NULL"));
        assert!(!definition.contains("DEFAULT"));
    }

    #[test]
    fn test_composite_key_clause_in_key_order() {
        let emitter = DdlEmitter::new();
        let catalog = warehouse_catalog();
        let statement = emitter.emit_table(&catalog.tables[1]).unwrap();

        assert!(statement.sql.contains("    articulo_id INTEGER NOT NULL,\n"));
        assert!(statement.sql.contains("    cantidad NUMERIC(10,2) NOT NULL DEFAULT 0,\n"));
        assert!(statement.sql.ends_with("    PRIMARY KEY (inventario_id, articulo_id)\n);"));
    }

    #[test]
    fn test_identity_column_never_in_composite_clause() {
        let emitter = DdlEmitter::with_identity(IdentityDetection::ColumnName("id".to_string()));
        let table = TableDescriptor::new("recepciones_items")
            .with_column(ColumnDescriptor::new("id", "INTEGER").primary_key(1))
            .with_column(ColumnDescriptor::new("recepcion_id", "INTEGER").primary_key(2))
            .with_column(ColumnDescriptor::new("linea", "INTEGER").primary_key(3));

        let statement = emitter.emit_table(&table).unwrap();

        assert!(statement.sql.contains("id SERIAL PRIMARY KEY"));
        assert!(statement.sql.contains("PRIMARY KEY (recepcion_id, linea)"));
        assert!(!statement.sql.contains("(id"));
    }

    #[test]
    fn test_single_leftover_key_next_to_identity_gets_no_clause() {
        let emitter = DdlEmitter::with_identity(IdentityDetection::ColumnName("id".to_string()));
        let table = TableDescriptor::new("devoluciones")
            .with_column(ColumnDescriptor::new("id", "INTEGER").primary_key(1))
            .with_column(ColumnDescriptor::new("remito", "TEXT").primary_key(2));

        let statement = emitter.emit_table(&table).unwrap();

        assert_eq!(statement.sql.matches("PRIMARY KEY").count(), 1);
    }

    #[test]
    fn test_single_natural_key_gets_clause() {
        let emitter = DdlEmitter::new();
        let table = TableDescriptor::new("ubicaciones")
            .with_column(ColumnDescriptor::new("codigo", "TEXT").primary_key(1))
            .with_column(ColumnDescriptor::new("descripcion", "TEXT"));

        let statement = emitter.emit_table(&table).unwrap();

        assert!(statement.sql.contains("    codigo TEXT,\n"));
        assert!(statement.sql.contains("    PRIMARY KEY (codigo)\n"));
    }

    #[test]
    fn test_name_based_detection_ignores_rowid_alias_under_other_name() {
        // legacy mode: an INTEGER key not named "id" stays a plain key
        let emitter = DdlEmitter::with_identity(IdentityDetection::ColumnName("id".to_string()));
        let table = TableDescriptor::new("proveedores")
            .with_column(ColumnDescriptor::new("proveedor_id", "INTEGER").primary_key(1).rowid_alias())
            .with_column(ColumnDescriptor::new("razon_social", "TEXT").not_null());

        let statement = emitter.emit_table(&table).unwrap();

        assert!(statement.sql.contains("proveedor_id INTEGER,"));
        assert!(statement.sql.contains("PRIMARY KEY (proveedor_id)"));
        assert!(!statement.sql.contains("SERIAL"));
    }

    #[test]
    fn test_default_rendering_in_table() {
        let emitter = DdlEmitter::new();
        let table = TableDescriptor::new("usuarios")
            .with_column(ColumnDescriptor::new("rol", "TEXT").with_default("admin"))
            .with_column(ColumnDescriptor::new("intentos", "INT").with_default("5"))
            .with_column(ColumnDescriptor::new("baja", "TEXT").with_default("'null'"));

        let sql = emitter.emit_table(&table).unwrap().sql;

        assert!(sql.contains("rol TEXT DEFAULT 'admin'"));
        assert!(sql.contains("intentos INTEGER DEFAULT 5"));
        assert!(sql.contains("baja TEXT DEFAULT NULL"));
    }

    #[test]
    fn test_quoted_identifiers() {
        let emitter = DdlEmitter::new();
        let table = TableDescriptor::new("perdidas material")
            .with_column(ColumnDescriptor::new("nro remito", "TEXT").primary_key(1));

        let sql = emitter.emit_table(&table).unwrap().sql;

        assert!(sql.starts_with("CREATE TABLE IF NOT EXISTS \"perdidas material\" ("));
        assert!(sql.contains("PRIMARY KEY (\"nro remito\")"));
    }

    #[test]
    fn test_table_without_columns_is_an_emission_error() {
        let emitter = DdlEmitter::new();
        let err = emitter.emit_table(&TableDescriptor::new("vacia")).unwrap_err();
        assert!(matches!(err, LitepgError::Emission { .. }));
    }
}

#[cfg(test)]
mod pipeline_tests {
    use super::*;

    #[tokio::test]
    async fn test_sections_in_order() {
        let translator = SchemaTranslator::new();
        let mut catalog = warehouse_catalog();
        let mut metrics = RunMetrics::new();

        let output = translator.translate(&mut catalog, &mut metrics).await.unwrap();

        let kinds: Vec<StatementKind> = output.statements.iter().map(|s| s.kind).collect();
        assert_eq!(
            kinds,
            vec![
                StatementKind::Table,
                StatementKind::Table,
                StatementKind::Table,
                StatementKind::View,
                StatementKind::Index,
            ]
        );

        let names: Vec<&str> = output.statements.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(
            names,
            vec!["articulos", "inventario_detalle", "operadores", "v_stock", "idx_articulos_codigo"]
        );
    }

    #[tokio::test]
    async fn test_view_without_definition_is_skipped() {
        let translator = SchemaTranslator::new();
        let mut catalog = warehouse_catalog();

        let output = translator.translate(&mut catalog, &mut RunMetrics::new()).await.unwrap();

        assert_eq!(output.count(StatementKind::View), 1);
        assert_eq!(output.skipped.len(), 1);
        assert_eq!(output.skipped[0].name, "v_roto");
        assert_eq!(output.skipped[0].kind, StatementKind::View);
        assert!(!output.render_sql().contains("v_roto"));
    }

    #[tokio::test]
    async fn test_rendered_script_layout() {
        let config = TranslatorConfig::default().with_source_label("inventario.db");
        let translator = SchemaTranslator::with_config(config);
        let mut catalog = warehouse_catalog();

        let sql = translator
            .translate(&mut catalog, &mut RunMetrics::new())
            .await
            .unwrap()
            .render_sql();

        assert!(sql.starts_with("-- Schema translated from SQLite to PostgreSQL\n-- Source: inventario.db\n\n-- Tables\n\n-- Table: articulos\nCREATE TABLE IF NOT EXISTS articulos (\n"));
        assert!(sql.contains("\n-- Views\n\n-- View: v_stock\nCREATE OR REPLACE VIEW v_stock AS SELECT codigo FROM articulos;\n"));
        assert!(sql.ends_with("\n-- Indexes\n\n-- Index: idx_articulos_codigo\nCREATE UNIQUE INDEX IF NOT EXISTS idx_articulos_codigo ON articulos (codigo);\n"));

        let tables = sql.find("-- Tables").unwrap();
        let views = sql.find("-- Views").unwrap();
        let indexes = sql.find("-- Indexes").unwrap();
        assert!(tables < views && views < indexes);
    }

    #[tokio::test]
    async fn test_object_names_cannot_break_out_of_header_comment() {
        let translator = SchemaTranslator::new();
        let mut catalog = MemoryIntrospector {
            tables: vec![TableDescriptor::new("x\nDROP TABLE articulos; --")
                .with_column(ColumnDescriptor::new("a", "TEXT"))],
            ..Default::default()
        };

        let sql = translator
            .translate(&mut catalog, &mut RunMetrics::new())
            .await
            .unwrap()
            .render_sql();

        // the only line break left in the name sits inside the quoted identifier
        assert!(sql.contains(
            "\n-- Table: x DROP TABLE articulos; --\nCREATE TABLE IF NOT EXISTS \"x\nDROP TABLE articulos; --\" (\n"
        ));
        assert!(!sql.contains("-- Table: x\n"));
    }

    #[tokio::test]
    async fn test_empty_catalog_renders_only_banner() {
        let translator = SchemaTranslator::with_config(TranslatorConfig::default().with_source_label("vacio.db"));
        let mut catalog = MemoryIntrospector::default();

        let output = translator.translate(&mut catalog, &mut RunMetrics::new()).await.unwrap();

        assert!(output.statements.is_empty());
        assert_eq!(
            output.render_sql(),
            "-- Schema translated from SQLite to PostgreSQL\n-- Source: vacio.db\n\n-- Tables\n\n-- Views\n\n-- Indexes\n"
        );
        assert!(output.render_sql().lines().all(|line| line.is_empty() || line.starts_with("--")));
    }

    #[tokio::test]
    async fn test_translation_is_idempotent() {
        let translator = SchemaTranslator::new();

        let first = translator
            .translate(&mut warehouse_catalog(), &mut RunMetrics::new())
            .await
            .unwrap();
        let second = translator
            .translate(&mut warehouse_catalog(), &mut RunMetrics::new())
            .await
            .unwrap();

        assert_eq!(first.render_sql(), second.render_sql());
        assert_eq!(first.to_json().unwrap(), second.to_json().unwrap());
    }

    #[tokio::test]
    async fn test_abort_policy_stops_on_broken_table() {
        let translator = SchemaTranslator::new();
        let mut catalog = warehouse_catalog();
        catalog
            .broken_tables
            .insert("inventario_detalle".to_string(), "malformed".to_string());
        let mut metrics = RunMetrics::new();

        let result = translator.translate(&mut catalog, &mut metrics).await;

        assert!(matches!(result, Err(LitepgError::Emission { .. })));
        assert_eq!(metrics.stages.last().unwrap().status, OperationStatus::Failed);
    }

    #[tokio::test]
    async fn test_catalog_is_closed_after_abort() {
        let translator = SchemaTranslator::new();
        let mut catalog = warehouse_catalog();
        catalog
            .broken_tables
            .insert("articulos".to_string(), "malformed".to_string());
        let closed = Arc::clone(&catalog.closed);

        let result = translator.translate_and_close(catalog, &mut RunMetrics::new()).await;

        assert!(result.is_err());
        assert!(closed.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn test_catalog_is_closed_after_connectivity_failure() {
        let translator = SchemaTranslator::new();
        let catalog = MemoryIntrospector {
            fail_listing: true,
            ..Default::default()
        };
        let closed = Arc::clone(&catalog.closed);

        let err = translator
            .translate_and_close(catalog, &mut RunMetrics::new())
            .await
            .unwrap_err();

        assert!(err.is_connectivity());
        assert!(closed.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn test_catalog_is_closed_after_success() {
        let translator = SchemaTranslator::new();
        let catalog = warehouse_catalog();
        let closed = Arc::clone(&catalog.closed);

        let output = translator
            .translate_and_close(catalog, &mut RunMetrics::new())
            .await
            .unwrap();

        assert_eq!(output.count(StatementKind::Table), 3);
        assert!(closed.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn test_skip_policy_continues_past_broken_table() {
        let config = TranslatorConfig::default().with_table_error_policy(TableErrorPolicy::Skip);
        let translator = SchemaTranslator::with_config(config);
        let mut catalog = warehouse_catalog();
        catalog
            .broken_tables
            .insert("inventario_detalle".to_string(), "malformed".to_string());

        let output = translator.translate(&mut catalog, &mut RunMetrics::new()).await.unwrap();

        assert_eq!(output.count(StatementKind::Table), 2);
        assert!(output
            .skipped
            .iter()
            .any(|s| s.kind == StatementKind::Table && s.name == "inventario_detalle"));
        assert_eq!(output.count(StatementKind::Index), 1);
    }

    #[tokio::test]
    async fn test_connectivity_errors_abort_even_when_skipping() {
        let config = TranslatorConfig::default().with_table_error_policy(TableErrorPolicy::Skip);
        let translator = SchemaTranslator::with_config(config);
        let mut catalog = warehouse_catalog();
        catalog.fail_listing = true;

        let err = translator
            .translate(&mut catalog, &mut RunMetrics::new())
            .await
            .unwrap_err();

        assert!(err.is_connectivity());
    }

    #[tokio::test]
    async fn test_metrics_cover_every_stage() {
        let translator = SchemaTranslator::new();
        let mut metrics = RunMetrics::new();

        translator.translate(&mut warehouse_catalog(), &mut metrics).await.unwrap();

        let stages: Vec<&str> = metrics.stages.iter().map(|s| s.operation_name.as_str()).collect();
        assert_eq!(stages, vec!["tables", "views", "indexes"]);
        assert_eq!(metrics.stages[0].records_processed, 3);
        assert_eq!(metrics.failed_stages(), 0);
    }

    #[tokio::test]
    async fn test_json_output_lists_statements_and_skips() {
        let translator = SchemaTranslator::new();
        let output = translator
            .translate(&mut warehouse_catalog(), &mut RunMetrics::new())
            .await
            .unwrap();

        let json: serde_json::Value = serde_json::from_str(&output.to_json().unwrap()).unwrap();

        assert_eq!(json["statements"].as_array().unwrap().len(), 5);
        assert_eq!(json["statements"][0]["kind"], "Table");
        assert_eq!(json["skipped"][0]["name"], "v_roto");
    }
}
