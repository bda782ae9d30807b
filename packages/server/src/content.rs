//! Homepage sections stored in `page_section`.

use std::fmt;
use std::str::FromStr;

use chrono::Utc;
use sea_orm::sea_query::OnConflict;
use sea_orm::*;
use serde_json::{Map, Value};
use tracing::instrument;

use crate::config::SiteConfig;
use crate::entity::page_section::{self, ExtraAttributes};
use crate::models::content::SectionRequest;

/// The sections the homepage renders, in page order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Section {
    Hero,
    About,
    Services,
    Portfolio,
    Faq,
    Contact,
    Footer,
}

/// What to serve for a section with no active row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AbsentPolicy {
    /// Leave the key out of the homepage object.
    Omit,
    /// Serve a built-in default context.
    Default,
}

impl Section {
    pub const ALL: [Section; 7] = [
        Section::Hero,
        Section::About,
        Section::Services,
        Section::Portfolio,
        Section::Faq,
        Section::Contact,
        Section::Footer,
    ];

    pub fn slug(self) -> &'static str {
        match self {
            Section::Hero => "hero",
            Section::About => "about",
            Section::Services => "services_section",
            Section::Portfolio => "portfolio",
            Section::Faq => "faq_section",
            Section::Contact => "contact",
            Section::Footer => "footer",
        }
    }

    pub fn absent_policy(self) -> AbsentPolicy {
        match self {
            Section::Footer => AbsentPolicy::Default,
            _ => AbsentPolicy::Omit,
        }
    }

    /// Context of a present section, with section-specific key aliases.
    fn context(self, model: &page_section::Model) -> Map<String, Value> {
        let mut context = model.to_context();
        if self == Section::Footer {
            context.insert("copyright_text".into(), model.title.clone().into());
        }
        context
    }

    fn default_context(self, site: &SiteConfig) -> Option<Map<String, Value>> {
        match self.absent_policy() {
            AbsentPolicy::Omit => None,
            AbsentPolicy::Default => {
                let mut context = Map::new();
                context.insert(
                    "copyright_text".into(),
                    site.default_copyright.clone().into(),
                );
                Some(context)
            }
        }
    }
}

impl fmt::Display for Section {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.slug())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownSection(pub String);

impl fmt::Display for UnknownSection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let known: Vec<_> = Section::ALL.iter().map(|s| s.slug()).collect();
        write!(
            f,
            "Unknown section '{}'; expected one of: {}",
            self.0,
            known.join(", ")
        )
    }
}

impl FromStr for Section {
    type Err = UnknownSection;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Section::ALL
            .into_iter()
            .find(|section| section.slug() == s)
            .ok_or_else(|| UnknownSection(s.to_string()))
    }
}

/// Lookup result for one section.
#[derive(Debug, Clone, PartialEq)]
pub enum SectionState {
    Present(page_section::Model),
    /// No row, or the row is inactive.
    Absent,
}

#[instrument(skip(db), fields(section = %section))]
pub async fn fetch_section<C: ConnectionTrait>(
    db: &C,
    section: Section,
) -> Result<SectionState, DbErr> {
    let row = page_section::Entity::find()
        .filter(page_section::Column::Slug.eq(section.slug()))
        .filter(page_section::Column::IsActive.eq(true))
        .one(db)
        .await?;

    Ok(match row {
        Some(model) => SectionState::Present(model),
        None => SectionState::Absent,
    })
}

/// Everything the public homepage needs, keyed by section slug.
#[instrument(skip(db, site))]
pub async fn homepage<C: ConnectionTrait>(
    db: &C,
    site: &SiteConfig,
) -> Result<Map<String, Value>, DbErr> {
    let mut page = Map::new();

    for section in Section::ALL {
        let context = match fetch_section(db, section).await? {
            SectionState::Present(model) => Some(section.context(&model)),
            SectionState::Absent => section.default_context(site),
        };
        if let Some(context) = context {
            page.insert(section.slug().into(), Value::Object(context));
        }
    }

    Ok(page)
}

/// Create or replace the row for `section`.
#[instrument(skip(db, request), fields(section = %section))]
pub async fn upsert_section<C: ConnectionTrait>(
    db: &C,
    section: Section,
    request: SectionRequest,
) -> Result<page_section::Model, DbErr> {
    let model = page_section::ActiveModel {
        slug: Set(section.slug().to_string()),
        title: Set(request.title.trim().to_string()),
        subtitle: Set(request.subtitle),
        description: Set(request.description),
        image_url: Set(request.image_url),
        extra_attributes: Set(ExtraAttributes(request.extra_attributes)),
        is_active: Set(request.is_active),
        updated_at: Set(Utc::now()),
        ..Default::default()
    };

    page_section::Entity::insert(model)
        .on_conflict(
            OnConflict::column(page_section::Column::Slug)
                .update_columns([
                    page_section::Column::Title,
                    page_section::Column::Subtitle,
                    page_section::Column::Description,
                    page_section::Column::ImageUrl,
                    page_section::Column::ExtraAttributes,
                    page_section::Column::IsActive,
                    page_section::Column::UpdatedAt,
                ])
                .to_owned(),
        )
        .exec_without_returning(db)
        .await?;

    page_section::Entity::find()
        .filter(page_section::Column::Slug.eq(section.slug()))
        .one(db)
        .await?
        .ok_or_else(|| DbErr::RecordNotFound(format!("page section {section}")))
}
