use crate::api::ApiClient;
use crate::args::ClientArgs;
use crate::commands::Out;
use crate::model::Summary;
use crate::{view, Result};

/// Asks the server at `--server-url` for every expense and renders them with the total.
pub async fn list(args: &ClientArgs) -> Result<Out<Summary>> {
    let client = ApiClient::new(args.server_url())?;
    let summary = client.fetch_expenses().await?;
    let table = view::render(summary.expenses(), summary.total_amount(), args.currency());
    Ok(Out::new(format!("\n{table}"), summary))
}
