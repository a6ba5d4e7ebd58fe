use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use estate_manager::config::Config;
use estate_manager::models::{Attachment, Estate, NewAgent, NewEstate};
use estate_manager::{
    CatalogApi, EstateMirror, FileMirror, FilterParams, HttpCatalogClient, MemoryMirror, ViewState,
};
use std::path::PathBuf;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "estate-manager")]
#[command(about = "Browse and manage real-estate listings and agents")]
struct Cli {
    /// Keep the estate snapshot in memory instead of on disk
    #[arg(long, global = true)]
    no_mirror: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List listings, optionally filtered
    List(FilterArgs),

    /// Show one listing with its agent
    Show { id: u64 },

    /// Create a listing
    AddListing(ListingArgs),

    /// Register an agent
    AddAgent(AgentArgs),

    /// Delete a listing
    Delete { id: u64 },

    /// List agents
    Agents,

    /// List regions
    Regions,

    /// List cities, optionally only those in one region
    Cities {
        #[arg(long)]
        region: Option<u64>,
    },
}

#[derive(Args)]
struct FilterArgs {
    #[arg(long)]
    min_price: Option<i64>,
    #[arg(long)]
    max_price: Option<i64>,
    #[arg(long)]
    min_area: Option<f64>,
    #[arg(long)]
    max_area: Option<f64>,
    /// Exact number of bedrooms
    #[arg(long)]
    bedrooms: Option<u32>,
    #[arg(long)]
    region: Option<u64>,
}

impl From<FilterArgs> for FilterParams {
    fn from(args: FilterArgs) -> Self {
        Self {
            min_price: args.min_price,
            max_price: args.max_price,
            min_area: args.min_area,
            max_area: args.max_area,
            bedrooms: args.bedrooms,
            region_id: args.region,
        }
    }
}

#[derive(Args)]
struct ListingArgs {
    #[arg(long)]
    address: String,
    #[arg(long)]
    zip_code: String,
    #[arg(long)]
    description: String,
    #[arg(long)]
    price: i64,
    #[arg(long)]
    area: f64,
    #[arg(long)]
    bedrooms: u32,
    #[arg(long)]
    region: u64,
    #[arg(long)]
    city: u64,
    #[arg(long)]
    agent: u64,
    /// List for rent instead of sale
    #[arg(long)]
    rental: bool,
    /// Path to the listing photo
    #[arg(long)]
    image: PathBuf,
}

#[derive(Args)]
struct AgentArgs {
    #[arg(long)]
    name: String,
    #[arg(long)]
    surname: String,
    #[arg(long)]
    email: String,
    #[arg(long)]
    phone: String,
    /// Path to the agent's photo
    #[arg(long)]
    avatar: PathBuf,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging; stdout is reserved for listings
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = Config::from_env()?;

    if config.api_token.is_none() {
        warn!("ESTATE_API_TOKEN is not set; the API will reject writes");
    }

    let catalog = HttpCatalogClient::new(config.catalog_options())
        .context("Failed to create HTTP client")?;

    if cli.no_mirror {
        run(ViewState::new(catalog, MemoryMirror::new()), cli.command).await
    } else {
        info!("Using estate mirror in {}", config.mirror_dir.display());
        run(ViewState::new(catalog, FileMirror::new(&config.mirror_dir)), cli.command).await
    }
}

async fn run<C, M>(mut state: ViewState<C, M>, command: Commands) -> Result<()>
where
    C: CatalogApi,
    M: EstateMirror,
{
    let report = state.load().await;
    if !report.is_complete() {
        warn!("Continuing without: {}", report.failed.join(", "));
    }

    match command {
        Commands::List(args) => {
            state.set_filter(args.into());
            let visible = state.visible();
            info!("{} of {} listings match {}", visible.len(), state.estates().len(), state.filter());

            if visible.is_empty() {
                println!("No listings match these filters");
            }
            for (i, estate) in visible.iter().enumerate() {
                print_card(&state, i + 1, estate);
            }
        }

        Commands::Show { id } => {
            let estate = state
                .estate(id)
                .cloned()
                .with_context(|| format!("No listing with id {id}"))?;

            print_card(&state, 1, &estate);
            println!("   Description: {}", estate.description);
            println!("   Image: {}", estate.image);
            match state.agent_for(&estate) {
                Some(agent) => println!("   Agent: {} <{}> {}", agent.full_name(), agent.email, agent.phone),
                None => println!("   Agent: unknown"),
            }
        }

        Commands::AddListing(args) => {
            let image = Attachment::from_path(&args.image)
                .await
                .with_context(|| format!("Failed to read image {}", args.image.display()))?;
            let listing = NewEstate {
                address: args.address,
                zip_code: args.zip_code,
                description: args.description,
                price: args.price,
                area: args.area,
                bedrooms: args.bedrooms,
                region_id: args.region,
                city_id: args.city,
                agent_id: args.agent,
                is_rental: args.rental,
                image: Some(image),
            };

            let estate = state
                .add_estate(listing)
                .await
                .context("Error while adding listing")?;
            info!("✅ Added listing #{}", estate.id);
            print_card(&state, 1, &estate);
        }

        Commands::AddAgent(args) => {
            let avatar = Attachment::from_path(&args.avatar)
                .await
                .with_context(|| format!("Failed to read avatar {}", args.avatar.display()))?;
            let agent = NewAgent {
                name: args.name,
                surname: args.surname,
                email: args.email,
                phone: args.phone,
                avatar: Some(avatar),
            };

            let agent = state
                .add_agent(agent)
                .await
                .context("Error while adding agent")?;
            info!("✅ Added agent #{} {}", agent.id, agent.full_name());
        }

        Commands::Delete { id } => {
            state
                .remove_estate(id)
                .await
                .with_context(|| format!("Error while deleting listing {id}"))?;
            info!("🗑️  Deleted listing #{}", id);
        }

        Commands::Agents => {
            for agent in state.agents() {
                println!("{}. {} <{}> {}", agent.id, agent.full_name(), agent.email, agent.phone);
            }
        }

        Commands::Regions => {
            for region in state.regions() {
                println!("{}. {}", region.id, region.name);
            }
        }

        Commands::Cities { region } => {
            let cities = match region {
                Some(region_id) => state.cities_in_region(region_id),
                None => state.cities().iter().collect(),
            };
            for city in cities {
                let region = state
                    .region(city.region_id)
                    .map(|r| r.name.as_str())
                    .unwrap_or("?");
                println!("{}. {} ({})", city.id, city.name, region);
            }
        }
    }

    Ok(())
}

fn print_card<C, M>(state: &ViewState<C, M>, n: usize, estate: &Estate) {
    println!("{}. {}, {} ({} ₾, for {})", n, state.city_name(estate), estate.address, estate.price, estate.deal_kind());
    let bedrooms = estate
        .bedrooms
        .map(|n| n.to_string())
        .unwrap_or_else(|| "?".to_string());
    println!("   {} bedrooms, {} m², zip {}", bedrooms, estate.area, estate.zip_code);
    println!("   ID: {}", estate.id);
    println!();
}
