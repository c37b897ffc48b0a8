//! `greenhouse cart ...`

use greenhouse_core::PlantId;
use greenhouse_storefront::Session;

use super::{CommandResult, Output, plant_by_id};

/// Print the cart and its order summary.
///
/// # Errors
///
/// Returns an error if the cart could not be fetched, or serialization
/// fails.
pub fn show(session: &Session, output: &Output) -> CommandResult {
    if let Some(error) = session.cart().error() {
        return Err(format!("Failed to load cart: {error}").into());
    }

    if output.is_json() {
        return output.json(&session.cart().contents());
    }

    let view = session.cart_page().view();
    if view.is_empty() {
        output.line("Your cart is empty");
        return Ok(());
    }

    for item in &view.items {
        output.line(&format!(
            "{:<24} {:>3} × {:>10} = {:>10}  {}",
            item.name, item.quantity, item.price, item.line_price, item.plant_id
        ));
    }
    output.line(&format!("Items:    {}", view.item_count));
    output.line(&format!("Subtotal: {}", view.subtotal));
    output.line(&format!("Shipping: {}", view.shipping));
    output.line(&format!("Tax:      {}", view.tax));
    output.line(&format!("Total:    {}", view.total));
    Ok(())
}

/// # Errors
///
/// Returns an error if the plant cannot be fetched or the add fails.
pub async fn add(session: &Session, output: &Output, id: &str, quantity: u32) -> CommandResult {
    let plant = plant_by_id(session, id).await?;
    let outcome = session.cart().add(&plant, quantity).await;
    output.finish(outcome)
}

/// # Errors
///
/// Returns an error if the update fails.
pub async fn set(session: &Session, output: &Output, id: &str, quantity: i64) -> CommandResult {
    let outcome = session
        .cart()
        .set_quantity(&PlantId::new(id), quantity)
        .await;
    output.finish(outcome)
}

/// # Errors
///
/// Returns an error if the removal fails.
pub async fn remove(session: &Session, output: &Output, id: &str) -> CommandResult {
    let outcome = session.cart().remove(&PlantId::new(id)).await;
    output.finish(outcome)
}

/// # Errors
///
/// Returns an error if the backend refuses to clear the cart.
pub async fn clear(session: &Session, output: &Output) -> CommandResult {
    let outcome = session.cart().clear().await;
    output.finish(outcome)
}

/// # Errors
///
/// Always fails: checkout is not available.
pub fn checkout(session: &Session, output: &Output) -> CommandResult {
    let result = session.cart_page().checkout();
    output.flush_notices();
    result.map_err(Into::into)
}
