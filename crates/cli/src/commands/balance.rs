//! Balance overview.

use super::{CommandError, Context, hint_on_auth};
use crate::output;

/// Fetch the balance and print the overview.
pub async fn show(ctx: &Context, json: bool) -> Result<(), CommandError> {
    let session = ctx.session()?;
    let overview = ctx
        .client
        .balance_overview(&session)
        .await
        .map_err(hint_on_auth)?;

    if !overview.warnings.is_empty() {
        tracing::warn!(
            count = overview.warnings.len(),
            "Some balance fields were unusable and are shown as zero"
        );
    }

    if json {
        output::line(&serde_json::to_string_pretty(&overview)?);
    } else {
        output::overview(&overview);
    }
    Ok(())
}
