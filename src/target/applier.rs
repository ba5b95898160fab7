use serde::{Deserialize, Serialize};
use tokio_postgres::{Client, NoTls};
use tracing::{debug, error, info, warn};

use crate::config::ApplyConfig;
use crate::error::LitepgResult;
use crate::types::DdlStatement;

/// A statement PostgreSQL rejected while continuing on errors
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FailedStatement {
    pub name: String,
    pub error: String,
}

/// Result of applying DDL to the target server
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ApplyReport {
    pub executed: usize,
    pub failed: Vec<FailedStatement>,
}

impl ApplyReport {
    pub fn is_successful(&self) -> bool {
        self.failed.is_empty()
    }

    pub fn summary(&self) -> String {
        format!("{} statements executed, {} failed", self.executed, self.failed.len())
    }
}

/// Executes DDL statements against a PostgreSQL server
pub struct PostgresApplier {
    client: Client,
    config: ApplyConfig,
}

impl PostgresApplier {
    /// Connect to the server named in `config`
    pub async fn connect(config: ApplyConfig) -> LitepgResult<Self> {
        config.validate()?;

        let (client, connection) = tokio_postgres::connect(&config.postgres_url, NoTls).await?;

        // the connection drives the socket until the client is dropped
        tokio::spawn(async move {
            if let Err(e) = connection.await {
                error!(error = %e, "PostgreSQL connection error");
            }
        });

        info!("PostgreSQL connection established");
        Ok(Self { client, config })
    }

    /// Execute statements in order
    pub async fn apply(&mut self, statements: &[DdlStatement]) -> LitepgResult<ApplyReport> {
        let mut report = ApplyReport::default();

        if self.config.single_transaction {
            let transaction = self.client.transaction().await?;
            for statement in statements {
                debug!(name = %statement.name, sql = %statement.sql, "Executing statement");
                transaction.batch_execute(&statement.sql).await?;
                report.executed += 1;
            }
            transaction.commit().await?;
            info!("Committed {} statements", report.executed);
            return Ok(report);
        }

        for statement in statements {
            debug!(name = %statement.name, sql = %statement.sql, "Executing statement");
            match self.client.batch_execute(&statement.sql).await {
                Ok(()) => report.executed += 1,
                Err(e) if self.config.continue_on_error => {
                    warn!(name = %statement.name, error = %e, "Statement failed, continuing");
                    report.failed.push(FailedStatement {
                        name: statement.name.clone(),
                        error: e.to_string(),
                    });
                }
                Err(e) => return Err(e.into()),
            }
        }

        Ok(report)
    }
}
