use clap::{Parser, Subcommand};
use log::info;
use recipe_wildcard::{
    acquire::is_valid_url, wildcard, Difficulty, FreeFormRequest, Orchestrator, Provider,
    RecipeDraft, RecipeWildcard,
};
use std::path::PathBuf;
use std::time::Duration;

#[derive(Parser, Debug)]
#[command(name = "recipe-wildcard")]
#[command(author, version, about = "Generate, import and remix recipes with an AI model", long_about = None)]
struct Cli {
    /// Model provider (google, openai, anthropic, ollama); defaults to config.toml
    #[arg(long, global = true)]
    provider: Option<Provider>,

    /// Model name, overriding the provider default
    #[arg(long, global = true)]
    model: Option<String>,

    /// HTTP timeout in seconds
    #[arg(long, global = true)]
    timeout: Option<u64>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Generate a new recipe from a description
    Generate {
        /// What to cook, e.g. "a cozy lentil soup"
        prompt: String,
        #[arg(long)]
        cuisine: Option<String>,
        /// easy, medium or hard
        #[arg(long)]
        difficulty: Option<Difficulty>,
        /// Dietary restriction; may be repeated
        #[arg(long = "diet")]
        diet: Vec<String>,
        /// Include one surprising wildcard ingredient
        #[arg(long)]
        wildcard: bool,
    },
    /// Import a recipe from a URL or a text file
    Import {
        /// http(s) URL or path to a text file
        source: String,
    },
    /// Add wildcard ingredients to a recipe draft saved as JSON
    Augment {
        draft: PathBuf,
    },
    /// Suggest one wildcard ingredient for a list of ingredients
    Suggest {
        #[arg(required = true)]
        ingredients: Vec<String>,
        #[arg(long)]
        cuisine: Option<String>,
    },
    /// List the built-in wildcard catalog
    Wildcards {
        /// Only show entries matching this text
        query: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Generate {
            prompt,
            cuisine,
            difficulty,
            diet,
            wildcard,
        } => {
            let orchestrator = orchestrator(cli.provider, cli.model, cli.timeout)?;
            let request = FreeFormRequest {
                prompt_text: prompt,
                cuisine,
                dietary_restrictions: diet,
                difficulty,
                include_wildcard: wildcard,
            };
            print_draft(&orchestrator.generate(request).await?)?;
        }
        Commands::Import { source } => {
            let orchestrator = orchestrator(cli.provider, cli.model, cli.timeout)?;
            let draft = if is_valid_url(&source) {
                orchestrator.import_url(&source).await?
            } else {
                info!("Reading recipe text from {}", source);
                let text = tokio::fs::read_to_string(&source).await?;
                orchestrator.import_text(&text).await?
            };
            print_draft(&draft)?;
        }
        Commands::Augment { draft } => {
            let orchestrator = orchestrator(cli.provider, cli.model, cli.timeout)?;
            let json = tokio::fs::read_to_string(&draft).await?;
            let existing = parse_draft(&json)?;
            print_draft(&orchestrator.augment(&existing).await?)?;
        }
        Commands::Suggest {
            ingredients,
            cuisine,
        } => {
            let orchestrator = orchestrator(cli.provider, cli.model, cli.timeout)?;
            let suggestion =
                wildcard::suggest_wildcard(&orchestrator, &ingredients, cuisine.as_deref()).await?;
            println!("{}", serde_json::to_string_pretty(&suggestion)?);
        }
        Commands::Wildcards { query } => {
            let catalog = wildcard::fallback_catalog();
            let entries = match query {
                Some(query) => wildcard::search(&catalog, &query),
                None => catalog,
            };
            for (category, group) in wildcard::group_by_category(&entries) {
                println!("{category}");
                for entry in group {
                    println!("  {} - {}", entry.name, entry.description);
                }
            }
        }
    }

    Ok(())
}

fn orchestrator(
    provider: Option<Provider>,
    model: Option<String>,
    timeout: Option<u64>,
) -> Result<Orchestrator, recipe_wildcard::IngestError> {
    let mut builder = RecipeWildcard::builder();
    if let Some(provider) = provider {
        builder = builder.provider(provider);
    }
    if let Some(model) = model {
        builder = builder.model(model);
    }
    if let Some(timeout) = timeout {
        builder = builder.timeout(Duration::from_secs(timeout));
    }
    builder.build()
}

/// Read a saved draft; hand-edited files may carry stale or duplicate indices
fn parse_draft(json: &str) -> Result<RecipeDraft, serde_json::Error> {
    let mut draft: RecipeDraft = serde_json::from_str(json)?;
    draft.reindex();
    Ok(draft)
}

fn print_draft(draft: &RecipeDraft) -> Result<(), serde_json::Error> {
    println!("{}", serde_json::to_string_pretty(draft)?);
    Ok(())
}
