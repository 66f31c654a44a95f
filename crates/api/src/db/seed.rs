//! Demo shopping lists.
//!
//! Three lists shared between the given owner and two demo users, `kate` and
//! `ben`. Used by `shoplist-cli seed` and by `SHOPLIST_SEED_DEMO` on the memory
//! backend.

use chrono::{DateTime, Duration, Utc};
use thiserror::Error;

use shoplist_core::{
    Awid, Identity, ItemId, ItemName, ListError, ListId, ListName, Measure, NewItem, Quantity,
    QuantityError, ShoppingList, TextError,
};

use super::{ListRepository, RepositoryError};

/// Workspace used when seeding the memory backend at startup.
pub const DEMO_AWID: &str = "demo";

/// Owner of the demo lists seeded at startup.
pub const DEMO_OWNER: &str = "alex";

/// Errors that can occur while seeding.
#[derive(Debug, Error)]
pub enum SeedError {
    #[error("invalid demo text: {0}")]
    Text(#[from] TextError),
    #[error("invalid demo quantity: {0}")]
    Quantity(#[from] QuantityError),
    #[error("invalid demo list: {0}")]
    List(#[from] ListError),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

struct DemoList {
    name: &'static str,
    owner: Option<&'static str>,
    members: &'static [&'static str],
    age_days: i64,
    items: &'static [(&'static str, u32, &'static str, bool)],
}

const DEMO_LISTS: [DemoList; 3] = [
    DemoList {
        name: "Car care",
        owner: None,
        members: &["kate", "ben"],
        age_days: 0,
        items: &[
            ("Winter tires", 4, "pcs", true),
            ("Brake pads", 2, "pcs", false),
            ("Engine oil", 5, "liters", false),
        ],
    },
    DemoList {
        name: "Garden care",
        owner: Some("kate"),
        members: &["ben"],
        age_days: 9,
        items: &[
            ("Fertilizer", 10, "kg", false),
            ("Seeds", 3, "pcs", false),
            ("Garden tools", 5, "pcs", false),
            ("Watering can", 2, "pcs", false),
        ],
    },
    DemoList {
        name: "Tools",
        owner: Some("ben"),
        members: &["kate"],
        age_days: 48,
        items: &[
            ("Hammer", 1, "pcs", true),
            ("Screwdriver set", 1, "pcs", false),
        ],
    },
];

/// Build the demo lists for `owner` in workspace `awid`.
///
/// `owner` owns "Car care" and is a member of the other two lists.
///
/// # Errors
///
/// Returns `SeedError` if a demo value fails validation.
pub fn demo_lists(
    awid: &Awid,
    owner: &Identity,
    now: DateTime<Utc>,
) -> Result<Vec<ShoppingList>, SeedError> {
    DEMO_LISTS
        .iter()
        .map(|demo| build(demo, awid, owner, now))
        .collect()
}

fn build(
    demo: &DemoList,
    awid: &Awid,
    owner: &Identity,
    now: DateTime<Utc>,
) -> Result<ShoppingList, SeedError> {
    let at = now - Duration::days(demo.age_days);
    let list_owner = demo.owner.map_or_else(|| Ok(owner.clone()), Identity::parse)?;
    let mut list = ShoppingList::new(
        ListId::generate(),
        awid.clone(),
        ListName::parse(demo.name)?,
        list_owner,
        at,
    );

    let mut members = demo
        .members
        .iter()
        .map(|m| Identity::parse(m))
        .collect::<Result<Vec<_>, _>>()?;
    members.push(owner.clone());
    for member in members {
        if !list.is_member(&member) {
            list.add_member(member, at)?;
        }
    }

    for &(name, quantity, measure, resolved) in demo.items {
        let id = ItemId::generate();
        list.add_item(
            id,
            NewItem {
                name: ItemName::parse(name)?,
                quantity: Quantity::new(quantity)?,
                measure: Measure::parse(measure)?,
            },
            at,
        );
        if resolved {
            list.toggle_resolved(id, at)?;
        }
    }

    Ok(list)
}

/// Save the demo lists into `repo`. Returns the new list ids.
///
/// # Errors
///
/// Returns `SeedError` if a demo value is invalid or a save fails.
pub async fn seed(
    repo: &dyn ListRepository,
    awid: &Awid,
    owner: &Identity,
) -> Result<Vec<ListId>, SeedError> {
    let lists = demo_lists(awid, owner, Utc::now())?;
    let mut ids = Vec::with_capacity(lists.len());
    for list in &lists {
        repo.save(list).await?;
        tracing::info!(list_id = %list.id(), name = %list.name(), "Seeded demo list");
        ids.push(list.id());
    }
    Ok(ids)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use shoplist_core::{PageRequest, Progress};

    use super::*;
    use crate::db::{InMemoryListRepository, ListQuery};

    fn awid() -> Awid {
        Awid::parse("awid-demo").unwrap()
    }

    #[test]
    fn test_demo_lists_shape() {
        let alex = Identity::parse("alex").unwrap();
        let lists = demo_lists(&awid(), &alex, Utc::now()).unwrap();
        assert_eq!(lists.len(), 3);

        let car = &lists[0];
        assert_eq!(car.name().as_str(), "Car care");
        assert!(car.is_owner(&alex));
        assert_eq!(car.member_count(), 3);
        assert_eq!(car.progress(), Progress { completed: 1, total: 3 });

        assert_eq!(lists[1].progress(), Progress { completed: 0, total: 4 });
        assert_eq!(lists[2].progress(), Progress { completed: 1, total: 2 });
        assert!(lists.iter().all(|l| l.is_member(&alex)));
    }

    #[test]
    fn test_demo_owner_matching_demo_user_is_not_duplicated() {
        let kate = Identity::parse("kate").unwrap();
        let lists = demo_lists(&awid(), &kate, Utc::now()).unwrap();
        assert_eq!(lists[1].member_count(), 2);
        assert_eq!(lists[2].member_count(), 2);
    }

    #[tokio::test]
    async fn test_seed_saves_visible_lists() {
        let repo = InMemoryListRepository::new();
        let alex = Identity::parse("alex").unwrap();
        let ids = seed(&repo, &awid(), &alex).await.unwrap();
        assert_eq!(ids.len(), 3);

        let page = repo
            .find(&ListQuery {
                awid: awid(),
                member: alex,
                state: None,
                page: PageRequest::new(0, 10),
            })
            .await
            .unwrap();
        assert_eq!(page.total, 3);
        assert_eq!(page.items[0].name().as_str(), "Car care");
    }
}
