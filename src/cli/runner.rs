//! CLI runner - executes commands

use crate::catalog::{load_service_file, Catalog};
use crate::cli::commands::{Cli, Commands, OutputFormat};
use crate::config::ClientConfig;
use crate::error::{Error, Result};
use crate::pagination::{CancelToken, ListFetcher, PagingOptions};
use crate::service::JsonPageSource;
use serde_json::{json, Value};
use std::path::Path;
use tracing::{debug, info};

/// CLI runner
pub struct Runner {
    cli: Cli,
}

impl Runner {
    /// Create a new runner
    pub fn new(cli: Cli) -> Self {
        Self { cli }
    }

    /// Run the CLI command
    pub async fn run(&self) -> Result<()> {
        match &self.cli.command {
            Commands::List {
                service,
                operation,
                filters,
                starting_token,
                max_items,
                page_size,
                no_auto_iteration,
            } => {
                let options = paging_options(
                    starting_token.as_deref(),
                    *max_items,
                    *page_size,
                    *no_auto_iteration,
                );
                self.list(service, operation, filters, options).await
            }
            Commands::Operations { service } => self.operations(service.as_deref()),
            Commands::Describe { service, operation } => self.describe(service, operation),
            Commands::Validate { file } => self.validate(file),
        }
    }

    /// Build the client configuration: file, then environment, then flags
    pub fn client_config(&self) -> Result<ClientConfig> {
        self.client_config_with_env(|key| std::env::var(key).ok())
    }

    fn client_config_with_env(
        &self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<ClientConfig> {
        let mut config = match &self.cli.config {
            Some(path) => ClientConfig::from_file(path)?,
            None => ClientConfig::default(),
        }
        .with_env_from(lookup);

        if let Some(region) = &self.cli.region {
            config.region = Some(region.clone());
        }
        if let Some(url) = &self.cli.endpoint_url {
            config.endpoint_url = Some(url.clone());
        }
        Ok(config)
    }

    /// Built-in services plus custom definitions from config and flags
    fn load_catalog(&self, config: &ClientConfig) -> Result<Catalog> {
        let mut catalog = Catalog::builtin()?;
        for path in config.services.iter().chain(&self.cli.services) {
            let def = catalog.load_file(path)?;
            debug!("Loaded service '{}' from {}", def.service, path.display());
        }
        Ok(catalog)
    }

    /// Run a listing and stream its items to stdout
    async fn list(
        &self,
        service: &str,
        operation: &str,
        filters: &[String],
        options: PagingOptions,
    ) -> Result<()> {
        let config = self.client_config()?;
        let catalog = self.load_catalog(&config)?;
        let (service_def, op) = catalog.find_operation(service, operation)?;

        if options.page_size.is_some() && op.page_size.is_none() {
            return Err(Error::invalid_argument(
                "page_size",
                format!("operation '{}' does not accept a page size", op.name),
            ));
        }

        let source = JsonPageSource::new(&config, service_def, op)?;
        let template = source.request(filters)?;
        let bounds = source.bounds();

        let cancel = CancelToken::new();
        let watcher = {
            let cancel = cancel.clone();
            tokio::spawn(async move {
                if tokio::signal::ctrl_c().await.is_ok() {
                    info!("Interrupted, stopping before the next page");
                    cancel.cancel();
                }
            })
        };

        let mut fetcher = ListFetcher::with_bounds(source, template, options, bounds)?
            .with_cancel_token(cancel)
            .with_label(format!("{}/{}", service_def.service, op.name));

        let result = loop {
            match fetcher.next_page().await {
                Ok(Some(page)) => {
                    for item in &page.items {
                        self.output_message(item);
                    }
                }
                Ok(None) => break Ok(()),
                Err(e) => break Err(e),
            }
        };
        watcher.abort();
        result?;

        if let Some(cursor) = fetcher.manual_next_cursor() {
            eprintln!("NextToken: {cursor}");
        }
        Ok(())
    }

    /// List services, or the operations of one service
    fn operations(&self, service: Option<&str>) -> Result<()> {
        let config = self.client_config()?;
        let catalog = self.load_catalog(&config)?;

        match service {
            None => {
                let services: Vec<Value> = catalog
                    .list_services()
                    .into_iter()
                    .map(|def| {
                        json!({
                            "service": def.service,
                            "title": def.title,
                            "operations": def.operation_names(),
                        })
                    })
                    .collect();

                self.output_message(&json!({
                    "type": "SERVICES",
                    "services": services
                }));
            }
            Some(name) => {
                let def = catalog.get_service(name)?;
                let operations: Vec<Value> = def
                    .operations
                    .iter()
                    .map(|op| {
                        json!({
                            "name": op.name,
                            "action": op.action,
                            "description": op.description,
                        })
                    })
                    .collect();

                self.output_message(&json!({
                    "type": "OPERATIONS",
                    "service": def.service,
                    "operations": operations
                }));
            }
        }

        Ok(())
    }

    /// Print an operation definition
    fn describe(&self, service: &str, operation: &str) -> Result<()> {
        let config = self.client_config()?;
        let catalog = self.load_catalog(&config)?;
        let (def, op) = catalog.find_operation(service, operation)?;

        self.output_message(&json!({
            "type": "OPERATION",
            "service": def.service,
            "target": def.target_for(op),
            "operation": serde_json::to_value(op)?,
        }));
        Ok(())
    }

    /// Validate a service definition file
    fn validate(&self, file: &Path) -> Result<()> {
        let def = load_service_file(file)?;

        self.output_message(&json!({
            "type": "VALIDATION",
            "status": "valid",
            "service": def.service,
            "operations": def.operation_names(),
        }));
        Ok(())
    }

    /// Output a message
    fn output_message(&self, msg: &Value) {
        match self.cli.format {
            OutputFormat::Json => {
                println!("{}", serde_json::to_string(msg).unwrap_or_default());
            }
            OutputFormat::Pretty => {
                println!("{}", serde_json::to_string_pretty(msg).unwrap_or_default());
            }
        }
    }
}

/// Map the `list` flags onto paging options
///
/// An empty starting token means "start from the beginning".
pub fn paging_options(
    starting_token: Option<&str>,
    max_items: Option<u64>,
    page_size: Option<u32>,
    no_auto_iteration: bool,
) -> PagingOptions {
    let mut options = PagingOptions::new();
    if let Some(token) = starting_token {
        options = options.with_starting_cursor(token);
    }
    if let Some(limit) = max_items {
        options = options.with_emit_limit(limit);
    }
    if let Some(size) = page_size {
        options = options.with_page_size(size);
    }
    if no_auto_iteration {
        options = options.manual();
    }
    options
}
