use anyhow::anyhow;
use clap::Subcommand;
use serde_json::json;
use std::path::PathBuf;
use std::sync::Arc;

use crate::cli::utils::{output_item, output_items, output_success};
use crate::cli::OutputFormat;
use crate::config::config;
use crate::database::{DatabaseHandle, PgMenuStore};
use crate::menu::{
    default_menu, load_defaults, DefaultItem, Initializer, MenuAdminService, MenuQueryService, MenuStore, Role,
};

#[derive(Subcommand)]
pub enum MenuCommands {
    #[command(about = "Seed the registry with the default menu (idempotent)")]
    Init {
        #[arg(long, help = "YAML defaults table to use instead of the built-in one")]
        defaults: Option<PathBuf>,
    },

    #[command(about = "Validate the defaults table without touching storage")]
    Check {
        #[arg(long, help = "YAML defaults table to use instead of the built-in one")]
        defaults: Option<PathBuf>,
    },

    #[command(about = "List all items, or the visible menu for a role")]
    List {
        #[arg(long, help = "Show only what this role can see")]
        role: Option<Role>,
    },

    #[command(about = "Show one menu item")]
    Show {
        #[arg(help = "Menu id")]
        menu_id: String,
    },

    #[command(about = "Enable a menu item")]
    Enable {
        #[arg(help = "Menu id")]
        menu_id: String,
    },

    #[command(about = "Disable a menu item")]
    Disable {
        #[arg(help = "Menu id")]
        menu_id: String,
    },

    #[command(about = "Change the display order of a menu item")]
    Reorder {
        #[arg(help = "Menu id")]
        menu_id: String,
        #[arg(help = "New order within its category", allow_hyphen_values = true)]
        order: i32,
    },

    #[command(about = "Remove a menu item")]
    Remove {
        #[arg(help = "Menu id")]
        menu_id: String,
    },
}

pub async fn handle(
    cmd: MenuCommands,
    database_url: Option<String>,
    output_format: OutputFormat,
) -> anyhow::Result<()> {
    if let MenuCommands::Check { defaults } = &cmd {
        let items = read_defaults(defaults.as_ref())?;
        Initializer::check_defaults(&items)?;
        return output_success(
            &output_format,
            &format!("{} default entries are valid", items.len()),
            Some(json!({ "entries": items.len() })),
        );
    }

    let settings = &config().database;
    let url = database_url
        .or_else(|| settings.url.clone())
        .ok_or_else(|| anyhow!("DATABASE_URL is not set; pass --database-url"))?;
    let format = &output_format;

    DatabaseHandle::scoped(&url, settings, |handle| async move {
        let store = PgMenuStore::new(&handle, settings.query_timeout());
        if let MenuCommands::Init { .. } = &cmd {
            store.ensure_schema().await?;
        }
        execute(cmd, Arc::new(store), format).await
    })
    .await
}

async fn execute(cmd: MenuCommands, store: Arc<dyn MenuStore>, format: &OutputFormat) -> anyhow::Result<()> {
    let admin = MenuAdminService::new(store.clone());

    match cmd {
        MenuCommands::Init { defaults } => {
            let items = read_defaults(defaults.as_ref())?;
            // Validation runs inside the initializer before any write
            let report = Initializer::new(store, items)
                .run_with_retry(&config().initializer.retry)
                .await?;
            let mut message = format!("created: {}, skipped: {}", report.created, report.skipped);
            if report.patched > 0 {
                message.push_str(&format!(", patched: {}", report.patched));
            }
            output_success(format, &message, Some(json!({ "report": report })))
        }
        MenuCommands::Check { .. } => Ok(()),
        MenuCommands::List { role: None } => {
            let items = MenuQueryService::new(store).all_items().await?;
            output_items(format, &items)
        }
        MenuCommands::List { role: Some(role) } => {
            let sections = MenuQueryService::new(store).visible_items(role).await?;
            match format {
                OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&sections)?),
                OutputFormat::Text => {
                    if sections.is_empty() {
                        println!("Nothing visible for role {}", role);
                    }
                    for section in &sections {
                        println!("[{}]", section.category);
                        for entry in &section.items {
                            println!("  {:>3}  {:<24} {}", entry.order, entry.label, entry.path);
                        }
                    }
                }
            }
            Ok(())
        }
        MenuCommands::Show { menu_id } => output_item(format, &admin.get(&menu_id).await?),
        MenuCommands::Enable { menu_id } => {
            let item = admin.set_enabled(&menu_id, true).await?;
            output_success(format, &format!("Enabled '{}'", item.menu_id), None)
        }
        MenuCommands::Disable { menu_id } => {
            let item = admin.set_enabled(&menu_id, false).await?;
            output_success(format, &format!("Disabled '{}'", item.menu_id), None)
        }
        MenuCommands::Reorder { menu_id, order } => {
            let item = admin.reorder(&menu_id, order).await?;
            output_success(
                format,
                &format!("Moved '{}' to order {}", item.menu_id, item.order),
                Some(json!({ "order": item.order })),
            )
        }
        MenuCommands::Remove { menu_id } => {
            admin.remove(&menu_id).await?;
            output_success(format, &format!("Removed '{}'", menu_id), None)
        }
    }
}

fn read_defaults(path: Option<&PathBuf>) -> anyhow::Result<Vec<DefaultItem>> {
    match path {
        Some(path) => load_defaults(path),
        None => Ok(default_menu()),
    }
}
