//! Fixed help texts: the start-here workflow and the curated dataset list.

use crate::tools;

/// Curated dataset ids by theme, `(id, what it holds)`
pub const POPULAR: &[(&str, &[(&str, &str)])] = &[
    (
        "🍽️ **Food & Safety**",
        &[
            ("dinesafe", "Restaurant inspections, health scores, violations"),
            ("mobile-food-vendors", "Food trucks and street vendors"),
        ],
    ),
    (
        "🏢 **Business & Permits**",
        &[
            (
                "municipal-licensing-and-standards-business-licences-and-permits",
                "Licensed businesses with addresses (160,000+ establishments)",
            ),
            ("building-permits", "Construction and renovation permits"),
            ("sign-permits", "Sign and billboard permits"),
        ],
    ),
    (
        "🚦 **Transportation & Traffic**",
        &[
            ("traffic-signals", "Traffic light locations and timing"),
            ("traffic-volumes", "Traffic counts on major roads"),
            ("ttc-routes-and-schedules", "Transit routes and stops"),
            ("cycling-network", "Bike lanes and cycling infrastructure"),
        ],
    ),
    (
        "🏛️ **City Services & Facilities**",
        &[
            ("parks-facilities", "Parks, pools, rinks, community centres"),
            ("library-branch-general-information", "Public library branches"),
            ("fire-station-locations", "Fire stations and emergency services"),
            ("polling-locations", "Voting locations"),
        ],
    ),
    (
        "💰 **Finance & Budget**",
        &[
            ("budget-operating", "Operating budget details"),
            ("budget-capital", "Capital projects and spending"),
            ("property-tax-rates", "Tax rates by property class"),
        ],
    ),
    (
        "🌡️ **Environment & Weather**",
        &[
            ("rain-gauge-locations-and-precipitation", "Rain gauges and rainfall"),
            ("air-quality-health-index", "Air quality measurements"),
            ("green-bins-collection", "Waste collection schedules"),
        ],
    ),
    (
        "🏠 **Housing & Development**",
        &[
            ("neighbourhood-profiles", "Demographics by neighbourhood"),
            ("wellbeing-toronto", "Community health and social indicators"),
            ("zoning-by-law-amendments", "Zoning changes and development"),
        ],
    ),
];

pub fn start_here() -> String {
    format!(
        r#"
🚀 **Toronto Open Data MCP Server - START HERE**
===============================================

**BEST APPROACH:** Treat this server as the source for the City of Toronto's official datasets, and pair it with web search when you need context the catalog does not hold.

**📋 Workflow:**
1. **Find a dataset:** `{search}(query="your topic")`, or browse `{popular}()`
2. **Get data:** `{helper}(dataset_id="found_id", user_question="what you want to know")`
   → works out whether the dataset is a live API table or downloadable files
3. **Refine:** `{schema}(dataset_id)` for exact field names, then `{query}(dataset_id, filters=..., sort=...)`
4. **Files:** `{details}(dataset_id)` lists every file; `{fetch}(csv_url)` reads the head of a CSV

**🔧 Data types:**
• **API data** (queryable): inspections, permits, locations, frequently updated tables
• **Downloadable files**: historical extracts, annual reports, spreadsheets

**💡 Tips:**
• For a business address, start with the `municipal-licensing-and-standards-business-licences-and-permits` dataset
• Filter values must match exactly (case-sensitive)
• `{stats}(dataset_id)` shows record and field counts before you pull rows

**🚀 Next Step:** Try `{search}(query="your topic")` or `{popular}()`.
"#,
        search = tools::SEARCH_DATASETS,
        popular = tools::POPULAR_DATASETS,
        helper = tools::SMART_DATA_HELPER,
        schema = tools::DATASET_SCHEMA,
        query = tools::QUERY_DATASET,
        details = tools::DATASET_DETAILS,
        fetch = tools::FETCH_CSV,
        stats = tools::DATASET_STATS,
    )
}

pub fn popular_datasets() -> String {
    let mut output = vec![
        String::new(),
        "⭐ **Most Popular Toronto Open Datasets**".to_string(),
        "========================================".to_string(),
    ];
    for (theme, datasets) in POPULAR {
        output.push(String::new());
        output.push(theme.to_string());
        for (id, summary) in datasets.iter() {
            output.push(format!("• `{}` - {}", id, summary));
        }
    }
    output.push(String::new());
    output.push("🚀 **Next Steps:**".to_string());
    output.push(format!(
        "1. **Get data:** {}(dataset_id=\"ID_from_above\", user_question=\"what you want to know\")",
        tools::SMART_DATA_HELPER
    ));
    output.push(format!(
        "2. **Search topics:** {}(query=\"your keywords\")",
        tools::SEARCH_DATASETS
    ));
    output.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn start_here_names_the_workflow_tools() {
        let guide = start_here();
        assert!(guide.contains("START HERE"));
        assert!(guide.contains("BEST APPROACH"));
        assert!(guide.contains(tools::SEARCH_DATASETS));
        assert!(guide.contains(tools::SMART_DATA_HELPER));
    }

    #[test]
    fn popular_lists_curated_ids() {
        let popular = popular_datasets();
        assert!(popular.contains("Most Popular"));
        for id in ["dinesafe", "traffic-signals", "parks-facilities"] {
            assert!(popular.contains(id), "{id}");
        }
        assert!(popular.contains(tools::SMART_DATA_HELPER));
    }
}
