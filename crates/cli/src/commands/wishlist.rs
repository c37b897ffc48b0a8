//! `greenhouse wishlist ...`

use greenhouse_core::PlantId;
use greenhouse_storefront::Session;

use super::{CommandResult, Output, plant_by_id};

/// Print wishlisted plants with details.
///
/// # Errors
///
/// Returns an error if the wishlist cannot be fetched.
pub async fn show(session: &Session, output: &Output) -> CommandResult {
    let page = session.wishlist_page();
    page.load().await?;

    if output.is_json() {
        return output.json(&page.plants());
    }
    if page.is_empty() {
        output.line("Your wishlist is empty");
        return Ok(());
    }

    for plant in page.plants() {
        let cart = if page.can_add_to_cart(&plant) {
            ""
        } else if plant.is_available {
            "(in cart)"
        } else {
            "(unavailable)"
        };
        output.line(&format!(
            "{:<24} {:>10}  {} {cart}",
            plant.name,
            plant.price.display(),
            plant.id
        ));
    }
    output.line(&format!("{} plants in wishlist", page.plants().len()));
    Ok(())
}

/// # Errors
///
/// Returns an error if the plant cannot be fetched or the add fails.
pub async fn add(session: &Session, output: &Output, id: &str) -> CommandResult {
    let plant = plant_by_id(session, id).await?;
    let outcome = session.wishlist().add(&plant).await;
    output.finish(outcome)
}

/// # Errors
///
/// Returns an error if the removal fails.
pub async fn remove(session: &Session, output: &Output, id: &str) -> CommandResult {
    let outcome = session.wishlist().remove(&PlantId::new(id)).await;
    output.finish(outcome)
}

/// # Errors
///
/// Returns an error if the plant cannot be fetched or the mutation fails.
pub async fn toggle(session: &Session, output: &Output, id: &str) -> CommandResult {
    let plant = plant_by_id(session, id).await?;
    let outcome = session.wishlist().toggle(&plant).await;
    output.finish(outcome)
}
