//! Names under which the operations are exposed as tools. Reports use them
//! in their next-step guidance.

pub const START_HERE: &str = "toronto_start_here";
pub const POPULAR_DATASETS: &str = "toronto_popular_datasets";
pub const LIST_DATASETS: &str = "toronto_list_datasets";
pub const SEARCH_DATASETS: &str = "toronto_search_datasets";
pub const DATASET_DETAILS: &str = "toronto_get_dataset_details";
pub const DATASET_SCHEMA: &str = "toronto_get_dataset_schema";
pub const SMART_DATA_HELPER: &str = "toronto_smart_data_helper";
pub const QUERY_DATASET: &str = "toronto_query_dataset_data";
pub const DATASET_STATS: &str = "toronto_get_dataset_stats";
pub const FETCH_CSV: &str = "toronto_fetch_csv_data";
