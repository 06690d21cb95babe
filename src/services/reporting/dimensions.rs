//! Built-in dimensions over test results.

use async_trait::async_trait;
use std::collections::{BTreeSet, HashMap};

use super::catalog::{Dimension, DimensionMember};
use crate::domain::errors::DomainResult;
use crate::domain::models::{DisplayValue, EntityKind, GroupField, GroupValue, ResultState, Scope};
use crate::domain::ports::ResultStore;

/// Result state (passed, failed, ...).
pub struct StateDimension;

#[async_trait]
impl Dimension for StateDimension {
    fn id(&self) -> &str {
        "state"
    }

    fn label(&self) -> &str {
        "State"
    }

    fn group_by_field(&self) -> GroupField {
        GroupField::State
    }

    async fn enumerate(&self, store: &dyn ResultStore, scope: &Scope) -> DomainResult<Vec<DimensionMember>> {
        let values = store.distinct_values(scope, GroupField::State).await?;
        Ok(values
            .into_iter()
            .filter_map(|value| {
                let GroupValue::Text(raw) = &value else {
                    return None;
                };
                let state = ResultState::from_str(raw)?;
                Some(
                    DimensionMember::named(value.clone(), state.display_name())
                        .with_attributes([("color".to_string(), state.color().to_string())].into()),
                )
            })
            .collect())
    }

    fn display(&self, member: &DimensionMember) -> DisplayValue {
        named(member)
    }
}

/// Dimension hydrated from a related entity (assignee user, run).
///
/// Grouped ids without a matching entity are left out of the enumeration, so
/// orphaned references render as unknown.
pub struct EntityDimension {
    id: &'static str,
    label: &'static str,
    field: GroupField,
    kind: EntityKind,
}

impl EntityDimension {
    pub const fn assignee() -> Self {
        Self {
            id: "assignee",
            label: "Assignee",
            field: GroupField::Assignee,
            kind: EntityKind::User,
        }
    }

    pub const fn run() -> Self {
        Self {
            id: "run",
            label: "Test Run",
            field: GroupField::Run,
            kind: EntityKind::Run,
        }
    }
}

#[async_trait]
impl Dimension for EntityDimension {
    fn id(&self) -> &str {
        self.id
    }

    fn label(&self) -> &str {
        self.label
    }

    fn group_by_field(&self) -> GroupField {
        self.field
    }

    async fn enumerate(&self, store: &dyn ResultStore, scope: &Scope) -> DomainResult<Vec<DimensionMember>> {
        let (values, entities) = tokio::try_join!(
            store.distinct_values(scope, self.field),
            store.list_entities(scope, self.kind),
        )?;

        let mut by_id: HashMap<String, _> = entities.into_iter().map(|e| (e.id.clone(), e)).collect();
        Ok(values
            .into_iter()
            .filter_map(|value| {
                let entity = by_id.remove(&value.as_key_string())?;
                Some(DimensionMember::named(value, entity.name).with_attributes(entity.attributes))
            })
            .collect())
    }

    fn display(&self, member: &DimensionMember) -> DisplayValue {
        named(member)
    }
}

/// UTC day the result was recorded on.
pub struct DayDimension;

#[async_trait]
impl Dimension for DayDimension {
    fn id(&self) -> &str {
        "day"
    }

    fn label(&self) -> &str {
        "Day"
    }

    fn group_by_field(&self) -> GroupField {
        GroupField::Day
    }

    async fn enumerate(&self, store: &dyn ResultStore, scope: &Scope) -> DomainResult<Vec<DimensionMember>> {
        let days: BTreeSet<GroupValue> = store
            .distinct_values(scope, GroupField::Day)
            .await?
            .into_iter()
            .map(GroupValue::day_bucket)
            .filter(|v| matches!(v, GroupValue::Date(_)))
            .collect();
        Ok(days.into_iter().map(DimensionMember::new).collect())
    }

    fn display(&self, member: &DimensionMember) -> DisplayValue {
        match member.value.clone().day_bucket() {
            GroupValue::Date(date) => DisplayValue::DateBucket { date },
            other => DisplayValue::Unknown { id: other.as_key_string() },
        }
    }
}

/// Automated versus manual execution.
pub struct AutomationDimension;

#[async_trait]
impl Dimension for AutomationDimension {
    fn id(&self) -> &str {
        "automated"
    }

    fn label(&self) -> &str {
        "Automation"
    }

    fn group_by_field(&self) -> GroupField {
        GroupField::Automated
    }

    async fn enumerate(&self, store: &dyn ResultStore, scope: &Scope) -> DomainResult<Vec<DimensionMember>> {
        let values = store.distinct_values(scope, GroupField::Automated).await?;
        Ok(values
            .into_iter()
            .filter_map(|value| match value {
                GroupValue::Bool(true) => Some(DimensionMember::named(value, "Automated")),
                GroupValue::Bool(false) => Some(DimensionMember::named(value, "Manual")),
                _ => None,
            })
            .collect())
    }

    fn display(&self, member: &DimensionMember) -> DisplayValue {
        named(member)
    }
}

fn named(member: &DimensionMember) -> DisplayValue {
    let id = member.value.as_key_string();
    DisplayValue::Named {
        name: member.name.clone().unwrap_or_else(|| id.clone()),
        id,
        attributes: member.attributes.clone(),
    }
}
