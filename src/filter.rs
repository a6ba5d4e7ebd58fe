use crate::models::Estate;
use std::fmt;

/// Optional constraints applied to the estate list for display.
/// An unset field leaves that dimension unconstrained.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterParams {
    /// Minimum price (inclusive)
    pub min_price: Option<i64>,
    /// Maximum price (inclusive)
    pub max_price: Option<i64>,
    /// Minimum area in square meters (inclusive)
    pub min_area: Option<f64>,
    /// Maximum area in square meters (inclusive)
    pub max_area: Option<f64>,
    /// Exact bedroom count
    pub bedrooms: Option<u32>,
    /// Region the estate's city must belong to
    pub region_id: Option<u64>,
}

impl FilterParams {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// True when the estate satisfies every active constraint
    pub fn matches(&self, estate: &Estate) -> bool {
        self.price_in_range(estate)
            && self.area_in_range(estate)
            && self.bedrooms.map_or(true, |n| estate.bedrooms == Some(n))
            && self.region_id.map_or(true, |id| estate.region_id() == Some(id))
    }

    fn price_in_range(&self, estate: &Estate) -> bool {
        if self.min_price.is_none() && self.max_price.is_none() {
            return true;
        }
        match estate.price.as_integer() {
            Some(price) => {
                self.min_price.map_or(true, |min| price >= min)
                    && self.max_price.map_or(true, |max| price <= max)
            }
            None => false,
        }
    }

    fn area_in_range(&self, estate: &Estate) -> bool {
        if self.min_area.is_none() && self.max_area.is_none() {
            return true;
        }
        match estate.area.as_float() {
            Some(area) => {
                self.min_area.map_or(true, |min| area >= min)
                    && self.max_area.map_or(true, |max| area <= max)
            }
            None => false,
        }
    }
}

impl fmt::Display for FilterParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return f.write_str("no filters");
        }

        let mut parts = Vec::new();
        if self.min_price.is_some() || self.max_price.is_some() {
            parts.push(format!("price {}", range(self.min_price, self.max_price)));
        }
        if self.min_area.is_some() || self.max_area.is_some() {
            parts.push(format!("area {} m²", range(self.min_area, self.max_area)));
        }
        if let Some(n) = self.bedrooms {
            parts.push(format!("{n} bedrooms"));
        }
        if let Some(id) = self.region_id {
            parts.push(format!("region #{id}"));
        }
        f.write_str(&parts.join(", "))
    }
}

fn range<T: fmt::Display>(min: Option<T>, max: Option<T>) -> String {
    let bound = |b: Option<T>| b.map(|v| v.to_string()).unwrap_or_else(|| "*".to_string());
    format!("{}..{}", bound(min), bound(max))
}

/// Estates satisfying `params`, in input order
pub fn filter_estates<'a>(estates: &'a [Estate], params: &FilterParams) -> Vec<&'a Estate> {
    estates.iter().filter(|estate| params.matches(estate)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{City, Numeric};

    fn estate(id: u64, price: Numeric, area: Numeric, bedrooms: u32, region: u64) -> Estate {
        Estate {
            id,
            address: format!("Street {id}"),
            zip_code: "0100".to_string(),
            description: String::new(),
            price,
            area,
            bedrooms: Some(bedrooms),
            image: String::new(),
            city_id: region * 10,
            agent_id: None,
            is_rental: false,
            city: Some(City {
                id: region * 10,
                name: format!("City {region}"),
                region_id: region,
                region: None,
            }),
        }
    }

    fn sample() -> Vec<Estate> {
        vec![
            estate(1, Numeric::from(1000_i64), Numeric::from(50.0), 2, 1),
            estate(2, Numeric::from(2000_i64), Numeric::from(80.0), 3, 2),
        ]
    }

    fn ids(estates: &[&Estate]) -> Vec<u64> {
        estates.iter().map(|e| e.id).collect()
    }

    #[test]
    fn min_price_keeps_only_dearer_listing() {
        let estates = sample();
        let params = FilterParams {
            min_price: Some(1500),
            ..Default::default()
        };
        assert_eq!(ids(&filter_estates(&estates, &params)), vec![2]);
    }

    #[test]
    fn bounds_are_inclusive() {
        let estates = sample();
        let params = FilterParams {
            min_price: Some(1000),
            max_price: Some(2000),
            min_area: Some(50.0),
            max_area: Some(80.0),
            ..Default::default()
        };
        assert_eq!(ids(&filter_estates(&estates, &params)), vec![1, 2]);
    }

    #[test]
    fn bedrooms_is_exact_match() {
        let estates = sample();
        let params = FilterParams {
            bedrooms: Some(3),
            ..Default::default()
        };
        assert_eq!(ids(&filter_estates(&estates, &params)), vec![2]);

        let none = FilterParams {
            bedrooms: Some(4),
            ..Default::default()
        };
        assert!(filter_estates(&estates, &none).is_empty());
    }

    #[test]
    fn region_uses_embedded_city() {
        let mut estates = sample();
        estates.push(Estate {
            city: None,
            ..estate(3, Numeric::from(500_i64), Numeric::from(30.0), 1, 1)
        });
        let params = FilterParams {
            region_id: Some(1),
            ..Default::default()
        };
        // estate 3 has no resolved city and cannot match a region
        assert_eq!(ids(&filter_estates(&estates, &params)), vec![1]);
    }

    #[test]
    fn unparseable_numbers_fail_active_bounds_only() {
        let estates = vec![
            estate(1, Numeric::from("on request"), Numeric::from("big"), 2, 1),
            estate(2, Numeric::from("1200"), Numeric::from("64.5"), 2, 1),
        ];

        let by_price = FilterParams {
            max_price: Some(5000),
            ..Default::default()
        };
        assert_eq!(ids(&filter_estates(&estates, &by_price)), vec![2]);

        let by_area = FilterParams {
            min_area: Some(10.0),
            ..Default::default()
        };
        assert_eq!(ids(&filter_estates(&estates, &by_area)), vec![2]);

        let by_bedrooms = FilterParams {
            bedrooms: Some(2),
            ..Default::default()
        };
        assert_eq!(ids(&filter_estates(&estates, &by_bedrooms)), vec![1, 2]);
    }

    #[test]
    fn no_filters_is_identity() {
        let estates = sample();
        let params = FilterParams::default();
        assert!(params.is_empty());
        let all: Vec<Estate> = filter_estates(&estates, &params).into_iter().cloned().collect();
        assert_eq!(all, estates);
    }

    #[test]
    fn filtering_is_idempotent() {
        let estates: Vec<Estate> = (0..12)
            .map(|i| estate(i, Numeric::from(i as i64 * 250), Numeric::from(20.0 + i as f64 * 7.5), (i % 4) as u32, i % 3))
            .collect();
        let params = FilterParams {
            min_price: Some(500),
            max_area: Some(90.0),
            region_id: Some(1),
            ..Default::default()
        };

        let once: Vec<Estate> = filter_estates(&estates, &params).into_iter().cloned().collect();
        let twice: Vec<Estate> = filter_estates(&once, &params).into_iter().cloned().collect();
        assert!(!once.is_empty());
        assert_eq!(once, twice);
    }

    #[test]
    fn result_is_sound_and_complete() {
        let estates: Vec<Estate> = (0..40)
            .map(|i| {
                let price = if i % 9 == 0 {
                    Numeric::from("n/a")
                } else {
                    Numeric::from(i as i64 * 100)
                };
                estate(i, price, Numeric::from(i as f64 * 3.0), (i % 5) as u32, i % 4)
            })
            .collect();

        let grid = [
            FilterParams {
                min_price: Some(800),
                max_price: Some(3000),
                ..Default::default()
            },
            FilterParams {
                min_area: Some(15.0),
                bedrooms: Some(2),
                ..Default::default()
            },
            FilterParams {
                max_price: Some(2500),
                region_id: Some(3),
                max_area: Some(60.0),
                ..Default::default()
            },
        ];

        for params in &grid {
            let kept = ids(&filter_estates(&estates, params));
            for e in &estates {
                let price = e.price.as_integer();
                let area = e.area.as_float().unwrap();
                let expected = params.min_price.map_or(true, |m| price.is_some_and(|p| p >= m))
                    && params.max_price.map_or(true, |m| price.is_some_and(|p| p <= m))
                    && params.min_area.map_or(true, |m| area >= m)
                    && params.max_area.map_or(true, |m| area <= m)
                    && params.bedrooms.map_or(true, |b| e.bedrooms == Some(b))
                    && params.region_id.map_or(true, |r| e.region_id() == Some(r));
                assert_eq!(kept.contains(&e.id), expected, "estate {} with {params}", e.id);
            }
            // order preserved
            assert!(kept.windows(2).all(|w| w[0] < w[1]));
        }
    }

    #[test]
    fn display_summarises_active_bounds() {
        let params = FilterParams {
            min_price: Some(1500),
            bedrooms: Some(2),
            ..Default::default()
        };
        assert_eq!(params.to_string(), "price 1500..*, 2 bedrooms");
        assert_eq!(FilterParams::default().to_string(), "no filters");
    }
}
