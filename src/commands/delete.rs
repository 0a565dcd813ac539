use crate::api::{ApiClient, Change};
use crate::args::DeleteArgs;
use crate::commands::Out;
use crate::model::ExpenseId;
use crate::{view, Result};

/// Asks the server at `--server-url` to delete one expense and renders what remains.
pub async fn delete(args: &DeleteArgs) -> Result<Out<Change>> {
    let client = ApiClient::new(args.client().server_url())?;
    let change = client.delete_expense(ExpenseId::new(args.id())).await?;
    let table = view::render(
        &change.expenses,
        change.total_amount,
        args.client().currency(),
    );
    Ok(Out::new(format!("{}\n\n{table}", change.message), change))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::args::ClientArgs;
    use crate::error::{find_error_type, ErrorType};
    use crate::model::{Amount, ExpenseDraft};
    use crate::test::TestServer;
    use std::str::FromStr;

    #[tokio::test]
    async fn test_delete() {
        let server = TestServer::start().await;
        let store = server.env().store();
        let draft = |description: &str| {
            ExpenseDraft::new(
                description,
                "Bills",
                Amount::from_str("20").unwrap(),
                "2024-02-01",
            )
        };
        let (first, _) = store.create(&draft("Phone")).await.unwrap();
        store.create(&draft("Power")).await.unwrap();

        let args = DeleteArgs::new(ClientArgs::new(server.url(), "$"), first.id().get());
        let out = delete(&args).await.unwrap();
        assert!(out.message().starts_with("Expense deleted successfully"));
        assert!(out.message().contains("Total spent: $20.00 (1 expense)"));
        assert!(!out.message().contains("Phone"));
        assert_eq!(store.list().await.count(), 1);
    }

    #[tokio::test]
    async fn test_delete_unknown_id() {
        let server = TestServer::start().await;
        let args = DeleteArgs::new(ClientArgs::new(server.url(), "₹"), 42);
        let e = delete(&args).await.unwrap_err();
        assert_eq!(find_error_type(&e), Some(ErrorType::NotFound));
        assert!(e.to_string().contains("42"));
    }
}
