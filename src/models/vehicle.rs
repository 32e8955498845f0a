use chrono::NaiveDate;
use mongodb::bson::oid::ObjectId;
use serde::{Deserialize, Serialize};

/// A date-range-scoped price override. Both ends are inclusive; the first
/// rule in stored order that contains a day wins.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct SeasonRule {
    #[serde(default)]
    pub id: String,
    pub name: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub price_per_day: i64,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Vehicle {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub name: String,
    pub description: String,
    pub license_plate: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vin: Option<String>,
    /// Whole currency units (CZK) per day outside any season rule.
    pub base_price: i64,
    pub min_days: i64,
    pub deposit: i64,
    pub km_limit_per_day: i64,
    pub images: Vec<String>,
    pub is_active: bool,
    pub seasonal_pricing: Vec<SeasonRule>,
    pub equipment: Vec<String>,
}

impl Vehicle {
    /// First pair of season rules with intersecting date ranges, if any.
    /// Used to reject ambiguous pricing data at admin write time.
    pub fn overlapping_season_rules(&self) -> Option<(&SeasonRule, &SeasonRule)> {
        for (i, a) in self.seasonal_pricing.iter().enumerate() {
            for b in &self.seasonal_pricing[i + 1..] {
                if a.start_date <= b.end_date && a.end_date >= b.start_date {
                    return Some((a, b));
                }
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rule(id: &str, start: &str, end: &str) -> SeasonRule {
        SeasonRule {
            id: id.to_string(),
            name: id.to_string(),
            start_date: start.parse().unwrap(),
            end_date: end.parse().unwrap(),
            price_per_day: 4000,
        }
    }

    fn vehicle(rules: Vec<SeasonRule>) -> Vehicle {
        Vehicle {
            id: None,
            name: "Laika Kreos 7010".to_string(),
            description: String::new(),
            license_plate: "7BM 2026".to_string(),
            vin: None,
            base_price: 3200,
            min_days: 3,
            deposit: 25000,
            km_limit_per_day: 300,
            images: vec![],
            is_active: true,
            seasonal_pricing: rules,
            equipment: vec![],
        }
    }

    #[test]
    fn disjoint_rules_are_accepted() {
        let v = vehicle(vec![
            rule("summer", "2026-06-01", "2026-08-31"),
            rule("autumn", "2026-09-01", "2026-09-30"),
        ]);
        assert!(v.overlapping_season_rules().is_none());
    }

    #[test]
    fn intersecting_rules_are_detected() {
        let v = vehicle(vec![
            rule("summer", "2026-06-01", "2026-08-31"),
            rule("july-special", "2026-07-01", "2026-07-15"),
        ]);
        let (a, b) = v.overlapping_season_rules().unwrap();
        assert_eq!(a.id, "summer");
        assert_eq!(b.id, "july-special");
    }

    #[test]
    fn touching_boundary_counts_as_overlap() {
        // Inclusive ranges: a rule ending 06-30 and one starting 06-30 both
        // claim that day.
        let v = vehicle(vec![
            rule("spring", "2026-04-01", "2026-06-30"),
            rule("summer", "2026-06-30", "2026-08-31"),
        ]);
        assert!(v.overlapping_season_rules().is_some());
    }
}
