//! Category management commands for CLI.

use clap::Subcommand;
use timekeep_core::category::Category;
use timekeep_core::storage::Database;

#[derive(Subcommand)]
pub enum CategoryAction {
    /// Add a category
    Add {
        /// Category name
        name: String,
        /// Hex color
        #[arg(long, default_value = "#3b82f6")]
        color: String,
    },
    /// List categories as JSON
    List,
    /// Remove a category
    Remove {
        /// Category ID
        id: String,
    },
}

pub fn run(action: CategoryAction) -> Result<(), Box<dyn std::error::Error>> {
    let db = Database::open()?;
    let mut categories = db.load_categories()?;

    match action {
        CategoryAction::Add { name, color } => {
            let category = Category::new(name, color);
            println!("{}", serde_json::to_string_pretty(&category)?);
            categories.push(category);
        }
        CategoryAction::List => {
            println!("{}", serde_json::to_string_pretty(&categories)?);
        }
        CategoryAction::Remove { id } => {
            let before = categories.len();
            categories.retain(|category| category.id != id);
            if categories.len() == before {
                return Err(format!("category not found: {id}").into());
            }
            println!("removed: {id}");
        }
    }

    db.save_categories(&categories)?;
    Ok(())
}
