//! Command-line entry point.
//!
//! A thin shell over the action dispatcher: every subcommand builds one
//! named-action request, sends it through the same path any other surface
//! would use, and prints the JSON response.

use anyhow::Result;
use chrono::{DateTime, Utc};

use virtual_closet::application::dto::{
    DeleteItemPayload, DeleteOutfitPayload, GenerateOutfitPayload, ScrapePayload,
};
use virtual_closet::application::state::{
    CategoryFilter, SessionAction, SessionState, reduce,
};
use virtual_closet::commands::{ActionRequest, Dispatcher};
use virtual_closet::domain::item::{Category, WardrobeItem};
use virtual_closet::domain::outfit::KNOWN_OCCASIONS;
use virtual_closet::infrastructure::config::ConfigManager;
use virtual_closet::infrastructure::logging::init_logging;

#[tokio::main]
async fn main() -> Result<()> {
    let config = ConfigManager::new()?.initialize_on_first_run().await?;
    init_logging(&config.logging, &config.log_dir()?)?;

    let args: Vec<String> = std::env::args().skip(1).collect();
    let Some(command) = args.first().map(String::as_str) else {
        print_usage();
        return Ok(());
    };

    let dispatcher = Dispatcher::from_config(&config).await?;

    match command {
        "scrape" => {
            let Some(url) = positional(&args, 1) else {
                print_usage();
                std::process::exit(2);
            };
            let request = ActionRequest::ScrapePage(ScrapePayload {
                url,
                save: has_flag(&args, "--save"),
                image_url: flag_value(&args, "--image"),
                fallback_image_url: flag_value(&args, "--fallback-image"),
            });
            respond(&dispatcher, request).await?;
        }
        "wardrobe" => {
            let response = dispatcher.handle(ActionRequest::GetWardrobe).await;
            if !response.success {
                println!("{}", serde_json::to_string_pretty(&response)?);
                std::process::exit(1);
            }
            let items: Vec<WardrobeItem> = match response.data {
                Some(data) => serde_json::from_value(data)?,
                None => Vec::new(),
            };

            // Run the listed items through the same state cycle a UI would.
            let mut state = reduce(SessionState::default(), SessionAction::WardrobeLoaded(items));
            if let Some(raw) = flag_value(&args, "--category") {
                let category: Category = raw
                    .parse()
                    .map_err(|e: String| anyhow::anyhow!(e))?;
                state = reduce(
                    state,
                    SessionAction::SetCategoryFilter(CategoryFilter::Only(category)),
                );
            }
            if let Some(query) = flag_value(&args, "--search") {
                state = reduce(state, SessionAction::SetSearchQuery(query));
            }
            println!("{}", serde_json::to_string_pretty(&state.visible_items())?);
        }
        "remove-item" => {
            let Some(raw) = positional(&args, 1) else {
                print_usage();
                std::process::exit(2);
            };
            let added_at: DateTime<Utc> = DateTime::parse_from_rfc3339(&raw)
                .map_err(|e| anyhow::anyhow!("invalid addedAt timestamp '{raw}': {e}"))?
                .with_timezone(&Utc);
            respond(
                &dispatcher,
                ActionRequest::DeleteItem(DeleteItemPayload { added_at }),
            )
            .await?;
        }
        "outfits" => {
            respond(&dispatcher, ActionRequest::GetOutfits).await?;
        }
        "remove-outfit" => {
            let Some(id) = positional(&args, 1) else {
                print_usage();
                std::process::exit(2);
            };
            respond(
                &dispatcher,
                ActionRequest::DeleteOutfit(DeleteOutfitPayload { id }),
            )
            .await?;
        }
        "generate" => {
            let Some(occasion) = positional(&args, 1) else {
                print_usage();
                std::process::exit(2);
            };
            respond(
                &dispatcher,
                ActionRequest::GenerateOutfit(GenerateOutfitPayload {
                    occasion,
                    hints: flag_value(&args, "--hints"),
                }),
            )
            .await?;
        }
        _ => {
            print_usage();
            std::process::exit(2);
        }
    }

    Ok(())
}

async fn respond(dispatcher: &Dispatcher, request: ActionRequest) -> Result<()> {
    let response = dispatcher.handle(request).await;
    println!("{}", serde_json::to_string_pretty(&response)?);
    if !response.success {
        std::process::exit(1);
    }
    Ok(())
}

/// Positional argument at `index`, skipping `--flag value` pairs.
fn positional(args: &[String], index: usize) -> Option<String> {
    let mut seen = 0;
    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        if arg.starts_with("--") {
            if !matches!(arg.as_str(), "--save") {
                let _ = iter.next(); // skip the flag's value
            }
            continue;
        }
        if seen == index {
            return Some(arg.clone());
        }
        seen += 1;
    }
    None
}

fn has_flag(args: &[String], name: &str) -> bool {
    args.iter().any(|arg| arg == name)
}

fn flag_value(args: &[String], name: &str) -> Option<String> {
    let position = args.iter().position(|arg| arg == name)?;
    args.get(position + 1).cloned()
}

fn print_usage() {
    eprintln!(
        "virtual-closet - capture clothing products and compose outfits\n\
         \n\
         Usage:\n\
         \x20 virtual-closet scrape <url> [--save] [--image <url>] [--fallback-image <url>]\n\
         \x20 virtual-closet wardrobe [--category <name>] [--search <query>]\n\
         \x20 virtual-closet remove-item <addedAt>\n\
         \x20 virtual-closet outfits\n\
         \x20 virtual-closet remove-outfit <id>\n\
         \x20 virtual-closet generate <occasion> [--hints <text>]\n\
         \n\
         Occasions: {}",
        KNOWN_OCCASIONS.join(", ")
    );
}
