use std::collections::BTreeMap;

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Free-form string attributes stored next to a section's typed fields.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize, FromJsonQueryResult)]
pub struct ExtraAttributes(pub BTreeMap<String, String>);

#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "page_section")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    /// Which homepage section this row feeds (e.g. "hero", "footer").
    #[sea_orm(unique)]
    pub slug: String,

    pub title: String,
    pub subtitle: String,

    #[sea_orm(column_type = "Text")]
    pub description: String,

    pub image_url: String,

    #[sea_orm(column_type = "Json")]
    pub extra_attributes: ExtraAttributes,

    pub is_active: bool,

    pub updated_at: DateTimeUtc,
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    /// Template context for this section.
    ///
    /// Extra attributes are laid down first so the typed fields overwrite any
    /// extra key of the same name.
    pub fn to_context(&self) -> Map<String, Value> {
        let mut context: Map<String, Value> = self
            .extra_attributes
            .0
            .iter()
            .map(|(k, v)| (k.clone(), Value::String(v.clone())))
            .collect();

        context.insert("title".into(), self.title.clone().into());
        context.insert("subtitle".into(), self.subtitle.clone().into());
        context.insert("description".into(), self.description.clone().into());
        context.insert("image_url".into(), self.image_url.clone().into());
        context
    }
}
