use crate::error::Result;
use tracing::info;

/// Handle order list command
pub async fn handle_order_list() -> Result<()> {
    info!("Listing ACME orders...");
    println!("ACME v2 currently doesn't support listing all historical orders via client storage.");
    println!(
        "Please check the 'orders' endpoint of your ACME account for a list of recent order URLs."
    );
    Ok(())
}

/// Handle order show command
pub async fn handle_order_show(order_id: String) -> Result<()> {
    info!("Showing details for order: {}", order_id);
    // TODO: Implement order detail retrieval
    Ok(())
}
