//! Product catalog CLI commands

use anyhow::Result;
use clap::Subcommand;

use super::output::Output;
use crate::domain::{categories, demo_catalog, Product};

#[derive(Subcommand)]
pub enum ProductCommands {
    /// List catalog products
    List {
        /// Filter by category (case-insensitive)
        #[arg(long)]
        category: Option<String>,

        /// Filter by a name substring (case-insensitive)
        #[arg(long)]
        search: Option<String>,
    },

    /// List catalog categories
    Categories,
}

pub fn run(cmd: ProductCommands, output: &Output) -> Result<()> {
    match cmd {
        ProductCommands::List { category, search } => {
            list_products(output, category.as_deref(), search.as_deref())
        }
        ProductCommands::Categories => list_categories(output),
    }
}

fn list_products(output: &Output, category: Option<&str>, search: Option<&str>) -> Result<()> {
    let catalog = demo_catalog();
    let products: Vec<&Product> = catalog
        .iter()
        .filter(|p| p.matches(category, search))
        .collect();

    output.verbose_ctx(
        "products",
        &format!("{} of {} products match", products.len(), catalog.len()),
    );

    if output.is_json() {
        output.data(&products);
    } else if products.is_empty() {
        println!("No products match the given filters");
    } else {
        println!(
            "{:<4} {:<28} {:<12} {:>9}  DESCRIPTION",
            "ID", "NAME", "CATEGORY", "PRICE"
        );
        println!("{}", "-".repeat(90));

        for product in &products {
            println!(
                "{:<4} {:<28} {:<12} {:>9.2}  {}",
                product.id, product.name, product.category, product.price, product.description
            );
        }
    }

    Ok(())
}

fn list_categories(output: &Output) -> Result<()> {
    let catalog = demo_catalog();
    let cats = categories(&catalog);

    if output.is_json() {
        output.data(&cats);
    } else {
        for cat in &cats {
            let count = catalog.iter().filter(|p| p.category == *cat).count();
            println!("{:<16} {} product(s)", cat, count);
        }
    }

    Ok(())
}
