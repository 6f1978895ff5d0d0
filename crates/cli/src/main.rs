//! Classic Car Matcher CLI - migrations and terminal access to requests.
//!
//! # Usage
//!
//! ```bash
//! # Create the customer_requests table (postgres backend)
//! cm-cli migrate
//!
//! # List requests, optionally filtered and sorted
//! cm-cli list --search jane --make Ford --sort model
//!
//! # Add a request
//! cm-cli add -n "Jane Doe" -v "1967 Ford Mustang Fastback" -e jane@example.com
//!
//! # Delete a request (asks for confirmation unless --yes)
//! cm-cli delete 42
//!
//! # Show requests matched by current inventory (through the web app's relay)
//! cm-cli matches
//! ```
//!
//! The record store backend is chosen with `CLASSIC_MATCHER_STORE`, exactly
//! as for the web app.

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};

use classic_matcher_core::{FilterCriteria, NewCustomerRequest, SortKey};

mod commands;

#[derive(Parser)]
#[command(name = "cm-cli")]
#[command(author, version, about = "Classic Car Matcher CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run database migrations (requires `DATABASE_URL`)
    Migrate,
    /// List customer requests, newest first
    List {
        /// Case-insensitive substring of the customer name
        #[arg(short, long, default_value = "")]
        search: String,

        /// Exact make
        #[arg(long, default_value = "")]
        make: String,

        /// Exact model (ignored without --make)
        #[arg(long, default_value = "")]
        model: String,

        /// Sort by `make` or `model`
        #[arg(long, default_value = "")]
        sort: SortKey,
    },
    /// Add a customer request
    Add {
        /// Customer name
        #[arg(short, long)]
        name: String,

        /// Requested vehicle, "Year Make Model"
        #[arg(short, long)]
        vehicle: String,

        /// Email address
        #[arg(short, long, default_value = "")]
        email: String,

        /// Phone number
        #[arg(short, long, default_value = "")]
        phone: String,
    },
    /// Delete a customer request
    Delete {
        /// Request ID
        id: String,

        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
    /// Show requests whose vehicle is currently in inventory
    Matches,
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn,cm_cli=info".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let result: Result<(), Box<dyn std::error::Error>> = run(cli).await;

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Migrate => commands::migrate::run().await?,
        Commands::List {
            search,
            make,
            model,
            sort,
        } => {
            let criteria = FilterCriteria {
                search,
                make,
                model,
                sort,
            };
            commands::requests::list(&criteria).await?;
        }
        Commands::Add {
            name,
            vehicle,
            email,
            phone,
        } => {
            let request = NewCustomerRequest {
                name,
                email,
                phone,
                vehicle_request: vehicle,
            };
            commands::requests::add(request).await?;
        }
        Commands::Delete { id, yes } => commands::requests::delete(&id, yes).await?,
        Commands::Matches => commands::requests::matches().await?,
    }
    Ok(())
}
