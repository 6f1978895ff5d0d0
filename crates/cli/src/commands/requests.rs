//! Customer request commands: list, add, delete, matches.
//!
//! # Environment Variables
//!
//! - `CLASSIC_MATCHER_STORE` - `rest` (default), `postgres` or `memory`
//! - `SUPABASE_URL`, `SUPABASE_ANON_KEY` - REST backend
//! - `DATABASE_URL` - postgres backend
//! - `CLASSIC_MATCHER_BASE_URL` - Running web app, for `matches`

use std::io::{self, BufRead, Write};

use thiserror::Error;

use classic_matcher_core::matching::{self, decompose_all, filter_and_sort, matched_requests};
use classic_matcher_core::{
    CustomerRequest, FilterCriteria, NewCustomerRequest, RequestId, ValidationError,
};
use classic_matcher_web::config::{ConfigError, ToolConfig};
use classic_matcher_web::inventory::{InventoryError, InventoryService, RelayClient};
use classic_matcher_web::store::{self, SharedStore, StoreError};

/// Errors that can occur while running request commands.
#[derive(Debug, Error)]
pub enum RequestCommandError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("Invalid request: {0}")]
    Validation(#[from] ValidationError),

    #[error("Inventory error: {0}")]
    Inventory(#[from] InventoryError),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

async fn connect() -> Result<(ToolConfig, SharedStore), RequestCommandError> {
    let config = ToolConfig::from_env()?;
    let store = store::connect(&config.store, config.http_timeout).await?;
    Ok((config, store))
}

/// One line per request.
fn format_row(request: &CustomerRequest) -> String {
    let contact = [request.email.as_str(), request.phone.as_str()]
        .into_iter()
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join(", ");

    format!(
        "{:>6}  {:<24}  {:<32}  {}",
        request.id,
        request.name,
        request.vehicle_request,
        contact
    )
}

/// List requests through the same filter the web page uses.
pub async fn list(criteria: &FilterCriteria) -> Result<(), RequestCommandError> {
    let (_, store) = connect().await?;
    let records = store.list().await?;

    let decomposed = decompose_all(&records);
    let facets = matching::facets(&decomposed, &criteria.make);
    let criteria = criteria.clone().normalized(&facets);
    let view = filter_and_sort(&decomposed, &criteria);

    #[allow(clippy::print_stdout)]
    {
        if view.is_empty() {
            println!("No customer requests found.");
        }
        for row in &view {
            println!("{}", format_row(row.request));
        }
    }
    tracing::debug!(total = records.len(), shown = view.len(), "Listed requests");
    Ok(())
}

/// Validate and insert a request.
pub async fn add(request: NewCustomerRequest) -> Result<(), RequestCommandError> {
    let request = request.validated()?;
    let (_, store) = connect().await?;
    let created = store.insert(&request).await?;

    tracing::info!(id = %created.id, "Customer added");
    #[allow(clippy::print_stdout)]
    {
        println!("{}", format_row(&created));
    }
    Ok(())
}

/// Delete a request, asking first unless `yes` is set.
pub async fn delete(id: &str, yes: bool) -> Result<(), RequestCommandError> {
    let id = RequestId::new(id);

    if !yes && !confirm(&format!("Are you sure you want to delete request {id}?"))? {
        tracing::info!("Delete cancelled");
        return Ok(());
    }

    let (_, store) = connect().await?;
    store.delete(&id).await?;
    tracing::info!(id = %id, "Deleted successfully");
    Ok(())
}

/// Print requests whose vehicle is in the current inventory.
///
/// Inventory comes from the web app's relay; the vendor key is not needed here.
pub async fn matches() -> Result<(), RequestCommandError> {
    let (config, store) = connect().await?;
    let records = store.list().await?;

    if records.is_empty() {
        #[allow(clippy::print_stdout)]
        {
            println!("No matches found.");
        }
        return Ok(());
    }

    let relay = RelayClient::new(&config.base_url, config.http_timeout)?;
    let service = InventoryService::new(std::sync::Arc::new(relay));
    // Unlike the web page, a failed fetch is an error here: there is no
    // previous inventory to fall back on.
    let inventory = service.refresh().await?;

    let decomposed = decompose_all(&records);
    let matched = matched_requests(&decomposed, &inventory);

    #[allow(clippy::print_stdout)]
    {
        if matched.is_empty() {
            println!("No matches found.");
        }
        for request in matched {
            println!("{}", format_row(request));
        }
    }
    tracing::info!(inventory = inventory.len(), "Matched against inventory");
    Ok(())
}

/// Ask a yes/no question on stderr; anything but `y`/`yes` is no.
fn confirm(prompt: &str) -> Result<bool, io::Error> {
    let mut stderr = io::stderr();
    write!(stderr, "{prompt} [y/N] ")?;
    stderr.flush()?;

    let mut answer = String::new();
    io::stdin().lock().read_line(&mut answer)?;
    Ok(is_yes(&answer))
}

fn is_yes(answer: &str) -> bool {
    matches!(answer.trim().to_lowercase().as_str(), "y" | "yes")
}
