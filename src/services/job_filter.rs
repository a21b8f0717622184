// ============================================================================
// FILTRES DES OFFRES D'EMPLOI
// ============================================================================
//
// Paramètres GET acceptés par /api/jobs (tous optionnels, combinés en ET) :
//   - ?location=Paris       : lieu contient (insensible à la casse)
//   - ?company=TechCorp     : nom de l'entreprise contient
//   - ?salary_min=30000     : salaire >= valeur
//   - ?salary_max=80000     : salaire <= valeur
//   - ?search=python        : titre OU description OU entreprise contient
//   - ?ordering=-salary     : tri sur created_at, salary, title ("-" = décroissant)
//
// Une valeur invalide (salaire non numérique, champ de tri inconnu) est ignorée.
//
// ============================================================================

use std::str::FromStr;

use rust_decimal::Decimal;
use sea_orm::sea_query::{Expr, Func, LikeExpr, Order, SimpleExpr};
use sea_orm::{ColumnTrait, Condition, QueryFilter, QueryOrder, SelectTwo};
use serde::Deserialize;

use crate::models::{company, job_offer};

/// Paramètres bruts : tout est String pour qu'une valeur invalide soit ignorée
/// au lieu de produire une 400
#[derive(Debug, Default, Deserialize)]
pub struct JobOfferQuery {
    pub location: Option<String>,
    pub company: Option<String>,
    pub salary_min: Option<String>,
    pub salary_max: Option<String>,
    pub search: Option<String>,
    pub ordering: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortField {
    CreatedAt,
    Salary,
    Title,
}

impl SortField {
    fn column(&self) -> job_offer::Column {
        match self {
            SortField::CreatedAt => job_offer::Column::CreatedAt,
            SortField::Salary => job_offer::Column::Salary,
            SortField::Title => job_offer::Column::Title,
        }
    }
}

impl FromStr for SortField {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "created_at" => Ok(SortField::CreatedAt),
            "salary" => Ok(SortField::Salary),
            "title" => Ok(SortField::Title),
            _ => Err(()),
        }
    }
}

/// Spécification de requête validée, construite depuis JobOfferQuery
#[derive(Debug, Clone, PartialEq)]
pub struct JobOfferFilter {
    pub location: Option<String>,
    pub company: Option<String>,
    pub salary_min: Option<Decimal>,
    pub salary_max: Option<Decimal>,
    pub search: Option<String>,
    pub ordering: Vec<(SortField, Order)>,
}

impl Default for JobOfferFilter {
    fn default() -> Self {
        Self {
            location: None,
            company: None,
            salary_min: None,
            salary_max: None,
            search: None,
            ordering: default_ordering(),
        }
    }
}

fn default_ordering() -> Vec<(SortField, Order)> {
    vec![(SortField::CreatedAt, Order::Desc)]
}

impl From<JobOfferQuery> for JobOfferFilter {
    fn from(query: JobOfferQuery) -> Self {
        Self {
            location: non_empty(query.location),
            company: non_empty(query.company),
            salary_min: parse_decimal(query.salary_min),
            salary_max: parse_decimal(query.salary_max),
            search: non_empty(query.search),
            ordering: query
                .ordering
                .as_deref()
                .map(parse_ordering)
                .filter(|fields| !fields.is_empty())
                .unwrap_or_else(default_ordering),
        }
    }
}

impl JobOfferFilter {
    /// Tous les prédicats fournis, combinés en ET
    pub fn condition(&self) -> Condition {
        let mut condition = Condition::all();

        if let Some(location) = &self.location {
            condition = condition.add(icontains(job_offer::Column::Location, location));
        }
        if let Some(company_name) = &self.company {
            condition = condition.add(icontains(company::Column::Name, company_name));
        }
        if let Some(min) = self.salary_min {
            condition = condition.add(job_offer::Column::Salary.gte(min));
        }
        if let Some(max) = self.salary_max {
            condition = condition.add(job_offer::Column::Salary.lte(max));
        }
        if let Some(term) = &self.search {
            condition = condition.add(
                Condition::any()
                    .add(icontains(job_offer::Column::Title, term))
                    .add(icontains(job_offer::Column::Description, term))
                    .add(icontains(company::Column::Name, term)),
            );
        }

        condition
    }

    /// Applique filtres + tri sur la requête offre ⟕ entreprise.
    /// L'id départage les offres créées au même instant.
    pub fn apply(
        &self,
        query: SelectTwo<job_offer::Entity, company::Entity>,
    ) -> SelectTwo<job_offer::Entity, company::Entity> {
        let mut query = query.filter(self.condition());

        for (field, order) in &self.ordering {
            query = query.order_by(field.column(), order.clone());
        }

        let tie_breaker = match self.ordering.first() {
            Some((_, Order::Asc)) => Order::Asc,
            _ => Order::Desc,
        };
        query.order_by(job_offer::Column::Id, tie_breaker)
    }
}

/// Les offres "tendances" : les plus récentes, sans filtre
pub fn newest_first<Q: QueryOrder>(query: Q) -> Q {
    query
        .order_by_desc(job_offer::Column::CreatedAt)
        .order_by_desc(job_offer::Column::Id)
}

/// `LOWER(col) LIKE '%term%'` avec échappement des jokers saisis par l'utilisateur
pub fn icontains<C: ColumnTrait>(column: C, term: &str) -> SimpleExpr {
    let escaped = term
        .to_lowercase()
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");

    Expr::expr(Func::lower(Expr::col(column.as_column_ref())))
        .like(LikeExpr::new(format!("%{}%", escaped)).escape('\\'))
}

/// "-salary,title" -> [(Salary, Desc), (Title, Asc)] ; champs inconnus ignorés
fn parse_ordering(raw: &str) -> Vec<(SortField, Order)> {
    raw.split(',')
        .map(str::trim)
        .filter_map(|item| {
            let (name, order) = match item.strip_prefix('-') {
                Some(name) => (name, Order::Desc),
                None => (item, Order::Asc),
            };
            name.parse::<SortField>().ok().map(|field| (field, order))
        })
        .collect()
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn parse_decimal(value: Option<String>) -> Option<Decimal> {
    non_empty(value).and_then(|v| Decimal::from_str(&v).ok())
}
