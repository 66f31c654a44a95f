//! Demo data command.

use shoplist_api::db::{PgListRepository, seed};
use shoplist_core::{Awid, Identity};

use super::{CommandError, connect};

/// Insert the demo lists for `owner` into workspace `awid`.
///
/// # Errors
///
/// Returns `CommandError` for invalid arguments or database failures.
pub async fn demo_lists(awid: &str, owner: &str) -> Result<(), CommandError> {
    let awid = Awid::parse(awid).map_err(|e| CommandError::InvalidArgument {
        field: "awid",
        message: e.to_string(),
    })?;
    let owner = Identity::parse(owner).map_err(|e| CommandError::InvalidArgument {
        field: "owner",
        message: e.to_string(),
    })?;

    let repository = PgListRepository::new(connect().await?);
    let ids = seed::seed(&repository, &awid, &owner).await?;

    tracing::info!(count = ids.len(), awid = %awid, owner = %owner, "Demo lists created");
    Ok(())
}
