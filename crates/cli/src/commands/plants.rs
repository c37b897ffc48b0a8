//! `greenhouse plants ...`

use greenhouse_core::PlantId;
use greenhouse_storefront::Session;
use greenhouse_storefront::catalog::{CatalogFilter, CatalogPage};
use greenhouse_storefront::forms::AddPlantForm;
use tracing::info;

use super::{CommandResult, Output, plant_by_id};

/// List the catalog, filtered locally like the catalog screen.
///
/// # Errors
///
/// Returns an error if the plant list cannot be fetched.
pub async fn list(
    session: &Session,
    output: &Output,
    search: Option<String>,
    category: Option<String>,
    in_stock: bool,
) -> CommandResult {
    session.start().await;
    let catalog = session.catalog().with_filter(
        CatalogFilter::new()
            .with_search(search.unwrap_or_default())
            .with_category(category.unwrap_or_default())
            .in_stock_only(in_stock),
    );
    // The error is rendered by the page below.
    let _ = catalog.load().await;

    match catalog.page() {
        CatalogPage::Loading => Ok(()),
        CatalogPage::Error { message } => {
            Err(format!("Error loading plants: {message}").into())
        }
        CatalogPage::Ready {
            cards,
            plants_found,
            wishlist_count,
            cart_count,
        } => {
            if output.is_json() {
                let plants: Vec<_> = cards.iter().map(|c| &c.plant).collect();
                return output.json(&plants);
            }
            for card in &cards {
                let heart = if card.wishlisted { "♥" } else { " " };
                output.line(&format!(
                    "{heart} {:<24} {:>10}  {:<12} [{}]  {}",
                    card.plant.name,
                    card.plant.price.display(),
                    card.stock_label(),
                    card.plant.categories.join(", "),
                    card.plant.id,
                ));
            }
            output.line(&format!(
                "{plants_found} plants found · {wishlist_count} in wishlist · {cart_count} in cart"
            ));
            Ok(())
        }
    }
}

/// # Errors
///
/// Returns an error if the plant cannot be fetched.
pub async fn show(session: &Session, output: &Output, id: &str) -> CommandResult {
    let plant = plant_by_id(session, id).await?;
    if output.is_json() {
        return output.json(&plant);
    }

    output.line(&plant.name);
    if let Some(scientific) = &plant.scientific_name {
        output.line(&format!("  {scientific}"));
    }
    output.line(&format!("  Price:      {}", plant.price));
    output.line(&format!("  Categories: {}", plant.categories.join(", ")));
    output.line(&format!(
        "  Stock:      {}",
        if plant.is_available { "In Stock" } else { "Out of Stock" }
    ));
    output.line(&format!("  Care:       {}", plant.care_level));
    output.line(&format!("  Light:      {}", plant.light_requirement));
    if let Some(description) = &plant.description {
        output.line(&format!("  {description}"));
    }
    Ok(())
}

/// # Errors
///
/// Returns an error if the category list cannot be fetched.
pub async fn categories(session: &Session, output: &Output) -> CommandResult {
    let categories = session.plants().categories().await?;
    if output.is_json() {
        return output.json(categories.as_slice());
    }
    for category in categories.iter() {
        output.line(category);
    }
    Ok(())
}

/// Submit the add-plant form.
///
/// # Errors
///
/// Returns an error if validation fails or the backend refuses the plant.
pub async fn add(session: &Session, output: &Output, mut form: AddPlantForm) -> CommandResult {
    let plant = form.submit(session.client(), session.plants()).await?;
    info!(plant_id = %plant.id, "Added plant");

    if output.is_json() {
        return output.json(&plant);
    }
    output.line(&format!("Added {} ({})", plant.name, plant.id));
    Ok(())
}

/// # Errors
///
/// Returns an error if the backend refuses the deletion.
pub async fn delete(session: &Session, output: &Output, id: &str) -> CommandResult {
    session.client().delete_plant(&PlantId::new(id)).await?;
    output.line(&format!("Deleted {id}"));
    Ok(())
}
