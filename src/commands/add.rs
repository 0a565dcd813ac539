use crate::api::{ApiClient, Change};
use crate::args::AddArgs;
use crate::commands::Out;
use crate::error::ErrorType;
use crate::model::{DraftAmount, ExpenseDraft};
use crate::{pub_bail, view, Result};
use chrono::Local;

/// Sends a new expense to the server at `--server-url` and renders the updated collection.
///
/// The same checks the server makes are run first so that an incomplete expense never leaves
/// the terminal. When `--date` is not given, today's local date is used.
pub async fn add(args: &AddArgs) -> Result<Out<Change>> {
    let date = match args.date() {
        Some(date) => date.to_string(),
        None => Local::now().date_naive().format("%Y-%m-%d").to_string(),
    };
    if [args.description(), args.category(), args.amount(), date.as_str()]
        .iter()
        .any(|field| field.trim().is_empty())
    {
        pub_bail!(ErrorType::Validation, "Please fill all the fields");
    }
    let draft = ExpenseDraft::new(
        args.description(),
        args.category(),
        DraftAmount::Text(args.amount().to_string()),
        date,
    );
    draft.validate()?;

    let client = ApiClient::new(args.client().server_url())?;
    let change = client.create_expense(&draft).await?;
    let table = view::render(
        &change.expenses,
        change.total_amount,
        args.client().currency(),
    );
    Ok(Out::new(format!("{}\n\n{table}", change.message), change))
}
