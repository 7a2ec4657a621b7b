mod core;
mod create_endpoint;
mod edit_endpoint;
mod list_endpoint;

pub use core::{
    Revenue, RevenueCategory, RevenueData, create_revenue, create_revenue_table,
    get_revenues_received_in, update_revenue,
};
pub use create_endpoint::{RevenueRequest, create_revenue_endpoint};
pub use edit_endpoint::edit_revenue_endpoint;
pub use list_endpoint::list_revenues_endpoint;
