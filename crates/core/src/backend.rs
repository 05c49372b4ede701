//! Collaborator seams: the remote search call and the recommendations source.

use async_trait::async_trait;

use crate::error::Result;
use crate::types::{HotHotel, HotRegion, Recommendations, SearchPage, SearchRequest};

/// The remote search endpoint, shared by suggestions and full search.
#[async_trait]
pub trait SearchBackend: Send + Sync {
    async fn search(&self, request: &SearchRequest) -> Result<SearchPage>;
}

/// Where the hot-recommendations payload comes from.
#[async_trait]
pub trait RecommendationSource: Send + Sync {
    async fn recommendations(&self) -> Result<Recommendations>;
}

/// Fixed popular regions and hotels served without a network call.
#[derive(Debug, Clone, Copy, Default)]
pub struct BuiltinRecommendations;

impl BuiltinRecommendations {
    pub fn payload() -> Recommendations {
        let regions = [
            ("上海", "Shanghai", 12580),
            ("北京", "Beijing", 11200),
            ("杭州", "Hangzhou", 8900),
            ("广州", "Guangzhou", 7800),
            ("深圳", "Shenzhen", 6500),
            ("成都", "Chengdu", 5800),
            ("三亚", "Sanya", 4500),
            ("厦门", "Xiamen", 3200),
        ];
        let hotels = [
            (1, "上海外滩W酒店", "W Shanghai - The Bund", "上海", "W酒店"),
            (2, "北京国贸大酒店", "China World Hotel Beijing", "北京", "香格里拉"),
            (3, "杭州西湖洲际酒店", "InterContinental Hangzhou", "杭州", "洲际"),
            (4, "广州四季酒店", "Four Seasons Guangzhou", "广州", "四季"),
            (5, "三亚亚龙湾丽思卡尔顿", "The Ritz-Carlton Sanya", "三亚", "丽思卡尔顿"),
            (6, "成都华尔道夫酒店", "Waldorf Astoria Chengdu", "成都", "华尔道夫"),
        ];
        Recommendations {
            popular_regions: regions
                .iter()
                .map(|(name, en, count)| HotRegion {
                    name: name.to_string(),
                    name_en: Some(en.to_string()),
                    count: Some(*count),
                })
                .collect(),
            popular_hotels: hotels
                .iter()
                .map(|(id, name, en, city, brand)| HotHotel {
                    id: *id,
                    name: name.to_string(),
                    name_en: Some(en.to_string()),
                    city: city.to_string(),
                    brand: Some(brand.to_string()),
                })
                .collect(),
        }
    }
}

#[async_trait]
impl RecommendationSource for BuiltinRecommendations {
    async fn recommendations(&self) -> Result<Recommendations> {
        Ok(Self::payload())
    }
}
