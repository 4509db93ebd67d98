//! Derived crop budget metrics.
//!
//! Crops with a planned budget of zero or less are excluded from every figure
//! here. When no crop qualifies the functions return `None` instead of `0%`,
//! which would read as "fully under budget".

use rust_decimal::Decimal;
use serde::Serialize;

use crate::types::CropBudgetSummary;

const HUNDRED: Decimal = Decimal::ONE_HUNDRED;

/// Aggregate spend against plan across every budgeted crop.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BudgetUtilization {
    /// `total_spent / total_planned × 100`.
    pub percent: Decimal,
    pub total_planned: Decimal,
    pub total_spent: Decimal,
    /// Number of crops that contributed to the totals.
    pub crops_counted: usize,
}

/// Crop with the highest spent/planned ratio.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TopCrop {
    pub name: String,
    pub percent: Decimal,
    pub planned_budget: Decimal,
    pub total_spent: Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CropUtilization {
    pub name: String,
    pub percent: Decimal,
    pub over_budget: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BudgetOverview {
    pub utilization: Option<BudgetUtilization>,
    pub top_crop: Option<TopCrop>,
    pub crops: Vec<CropUtilization>,
    /// Crops left out because their planned budget is not positive.
    pub excluded_crops: Vec<String>,
}

fn budgeted(crops: &[CropBudgetSummary]) -> impl Iterator<Item = &CropBudgetSummary> {
    crops.iter().filter(|c| c.planned_budget > Decimal::ZERO)
}

fn ratio_percent(spent: Decimal, planned: Decimal) -> Option<Decimal> {
    spent
        .checked_div(planned)
        .and_then(|r| r.checked_mul(HUNDRED))
}

/// Overall utilization, or `None` when no crop has a positive planned budget.
#[must_use]
pub fn budget_utilization(crops: &[CropBudgetSummary]) -> Option<BudgetUtilization> {
    let mut total_planned = Decimal::ZERO;
    let mut total_spent = Decimal::ZERO;
    let mut crops_counted = 0usize;

    for crop in budgeted(crops) {
        total_planned = total_planned.checked_add(crop.planned_budget)?;
        total_spent = total_spent.checked_add(crop.total_spent)?;
        crops_counted += 1;
    }

    if crops_counted == 0 {
        return None;
    }

    Some(BudgetUtilization {
        percent: ratio_percent(total_spent, total_planned)?,
        total_planned,
        total_spent,
        crops_counted,
    })
}

/// Highest-ratio crop; the first one in input order wins a tie.
#[must_use]
pub fn top_crop(crops: &[CropBudgetSummary]) -> Option<TopCrop> {
    let mut best: Option<(&CropBudgetSummary, Decimal)> = None;
    for crop in budgeted(crops) {
        let Some(percent) = ratio_percent(crop.total_spent, crop.planned_budget) else {
            continue;
        };
        match best {
            Some((_, best_percent)) if percent <= best_percent => {}
            _ => best = Some((crop, percent)),
        }
    }

    best.map(|(crop, percent)| TopCrop {
        name: crop.name.clone(),
        percent,
        planned_budget: crop.planned_budget,
        total_spent: crop.total_spent,
    })
}

/// Per-crop utilization for every budgeted crop, in input order.
#[must_use]
pub fn crop_utilizations(crops: &[CropBudgetSummary]) -> Vec<CropUtilization> {
    budgeted(crops)
        .filter_map(|crop| {
            let percent = ratio_percent(crop.total_spent, crop.planned_budget)?;
            Some(CropUtilization {
                name: crop.name.clone(),
                percent: percent.round_dp(2),
                over_budget: crop.total_spent > crop.planned_budget,
            })
        })
        .collect()
}

#[must_use]
pub fn budget_overview(crops: &[CropBudgetSummary]) -> BudgetOverview {
    BudgetOverview {
        utilization: budget_utilization(crops),
        top_crop: top_crop(crops),
        crops: crop_utilizations(crops),
        excluded_crops: crops
            .iter()
            .filter(|c| c.planned_budget <= Decimal::ZERO)
            .map(|c| c.name.clone())
            .collect(),
    }
}
